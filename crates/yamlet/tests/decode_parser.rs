use yamlet::{Error, Options, Parser, Value, parse_str};

fn doc(body: &str) -> String {
    format!("%YAML 1.2\n---\n{}", body)
}

fn parse(body: &str) -> Value {
    parse_str(&doc(body)).expect("document parses")
}

fn syntax_message(body: &str) -> String {
    match parse_str(&doc(body)) {
        Err(Error::Syntax(e)) => e.message,
        other => panic!("expected syntax error, got {:?}", other),
    }
}

fn str_(s: &str) -> Value {
    Value::Str(s.to_string())
}

fn map(entries: &[(&str, Value)]) -> Value {
    Value::Mapping(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

#[test]
#[allow(clippy::approx_constant)]
fn top_level_scalars_are_typed() {
    let cases = [
        ("~", Value::Null),
        ("null", Value::Null),
        ("true", Value::Bool(true)),
        ("False", Value::Bool(false)),
        ("42", Value::Int(42)),
        ("-7", Value::Int(-7)),
        ("0o17", Value::Int(15)),
        ("0x1F", Value::Int(31)),
        ("3.14", Value::Float(3.14)),
    ];
    for (src, expected) in cases {
        assert_eq!(parse(&format!("{}\n", src)), expected, "{src:?}");
    }
}

#[test]
fn wrapped_scalar_stays_a_string() {
    assert_eq!(parse("42\n  43\n"), str_("42 43"));
    assert_eq!(parse("- 1\n  2\n"), Value::Sequence(vec![str_("1 2")]));
}

#[test]
fn simple_mapping() {
    let v = parse("foo: 1\nbar: 2\n");
    assert_eq!(
        v,
        Value::Mapping(vec![
            ("foo".to_string(), Value::Int(1)),
            ("bar".to_string(), Value::Int(2)),
        ])
    );
}

#[test]
fn mapping_keeps_insertion_order() {
    let src = doc("zeta: 1\nalpha: 2\nmid: 3\n");
    let first = parse_str(&src).unwrap();
    let second = parse_str(&src).unwrap();
    let keys = |v: &Value| {
        v.as_mapping()
            .unwrap()
            .iter()
            .map(|(k, _)| k.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(keys(&first), vec!["zeta", "alpha", "mid"]);
    assert_eq!(keys(&first), keys(&second));
}

#[test]
fn duplicate_key_replaces_value_in_place() {
    let v = parse("a: 1\nb: 2\na: 3\n");
    assert_eq!(v, map(&[("a", Value::Int(3)), ("b", Value::Int(2))]));
}

#[test]
fn sequence_of_mappings() {
    let v = parse("- a: 1\n  b: 2\n- a: 3\n  b: 4\n");
    assert_eq!(
        v,
        Value::Sequence(vec![
            map(&[("a", Value::Int(1)), ("b", Value::Int(2))]),
            map(&[("a", Value::Int(3)), ("b", Value::Int(4))]),
        ])
    );
}

#[test]
fn nested_mappings_and_sequences() {
    let src = "\
server:
  host: example.org
  ports:
    - 80
    - 443
  tls:
    enabled: yes
name: demo
";
    let v = parse(src);
    assert_eq!(
        v,
        map(&[
            (
                "server",
                map(&[
                    ("host", str_("example.org")),
                    (
                        "ports",
                        Value::Sequence(vec![Value::Int(80), Value::Int(443)])
                    ),
                    ("tls", map(&[("enabled", str_("yes"))])),
                ])
            ),
            ("name", str_("demo")),
        ])
    );
}

#[test]
fn sequence_at_key_indentation() {
    let v = parse("list:\n- 1\n- 2\nother: x\n");
    assert_eq!(
        v,
        map(&[
            ("list", Value::Sequence(vec![Value::Int(1), Value::Int(2)])),
            ("other", str_("x")),
        ])
    );
}

#[test]
fn inline_nested_sequences() {
    let v = parse("- - a\n  - b\n- c\n");
    assert_eq!(
        v,
        Value::Sequence(vec![
            Value::Sequence(vec![str_("a"), str_("b")]),
            str_("c"),
        ])
    );
}

#[test]
fn empty_values_are_null() {
    assert_eq!(
        parse("a:\nb:\n"),
        map(&[("a", Value::Null), ("b", Value::Null)])
    );
    assert_eq!(
        parse("-\n- b\n"),
        Value::Sequence(vec![Value::Null, str_("b")])
    );
}

#[test]
fn dash_alone_starts_wrapped_mapping() {
    let v = parse("-\n  a: 1\n  b: 2\n");
    assert_eq!(
        v,
        Value::Sequence(vec![map(&[("a", Value::Int(1)), ("b", Value::Int(2))])])
    );
}

#[test]
fn wrapped_scalar_in_mapping() {
    let v = parse("a: this is\n  wrapped text\nb: 2\n");
    assert_eq!(
        v,
        map(&[("a", str_("this is wrapped text")), ("b", Value::Int(2))])
    );
}

#[test]
fn quoted_strings() {
    let v = parse("a: \"42\"\nb: 'single'\nc: \"\"\n");
    assert_eq!(
        v,
        map(&[("a", str_("42")), ("b", str_("single")), ("c", str_(""))])
    );
}

#[test]
fn multi_line_quoted_string() {
    let v = parse("a: \"first\n  second\n  third\"\nb: 1\n");
    assert_eq!(
        v,
        map(&[("a", str_("first second third")), ("b", Value::Int(1))])
    );
}

#[test]
fn quoted_top_level_value() {
    assert_eq!(parse("'hello'\n"), str_("hello"));
}

#[test]
fn quoted_value_on_its_own_line_keeps_quotes() {
    let v = parse("a:\n  \"x\"\n");
    assert_eq!(v, map(&[("a", str_("\"x\""))]));
}

#[test]
fn value_after_start_marker() {
    let v = parse_str("%YAML 1.2\n--- hello\n").unwrap();
    assert_eq!(v, str_("hello"));
    let v = parse_str("%YAML 1.2\n--- \"quoted\"\n").unwrap();
    assert_eq!(v, str_("quoted"));
}

#[test]
fn empty_document_is_null() {
    assert_eq!(parse_str("%YAML 1.2\n---\n").unwrap(), Value::Null);
    assert_eq!(parse_str("%YAML 1.2\n---").unwrap(), Value::Null);
}

#[test]
fn comments_are_ignored() {
    let src = "# leading comment\n%YAML 1.2 # version\n--- # start\n# section\na: 1 # one\n\n  # indented comment\nb: 2\n";
    let v = parse_str(src).unwrap();
    assert_eq!(v, map(&[("a", Value::Int(1)), ("b", Value::Int(2))]));
}

#[test]
fn hash_inside_quotes_still_starts_comment() {
    let msg = syntax_message("a: 'x # y'\n");
    assert!(msg.contains("unterminated string"), "{msg}");
}

#[test]
fn key_whitespace_is_trimmed() {
    assert_eq!(parse("a   : 1\n"), map(&[("a", Value::Int(1))]));
}

#[test]
fn colon_without_space_is_not_a_key() {
    assert_eq!(
        parse("url: http://example.org\ntime: 12:30\n"),
        map(&[
            ("url", str_("http://example.org")),
            ("time", str_("12:30")),
        ])
    );
}

#[test]
fn tab_indentation() {
    let v = parse("a:\n\tb: 1\n");
    assert_eq!(v, map(&[("a", map(&[("b", Value::Int(1))]))]));
}

#[test]
fn tab_after_dash_advances_to_tab_stop() {
    assert_eq!(
        parse("-\t- x\n\t- y\n"),
        Value::Sequence(vec![Value::Sequence(vec![str_("x"), str_("y")])])
    );
    assert_eq!(
        parse("- \tfoo: 1\n\tbar: 2\n"),
        Value::Sequence(vec![map(&[
            ("foo", Value::Int(1)),
            ("bar", Value::Int(2)),
        ])])
    );
}

#[test]
fn dash_prefix_uses_configured_tab_width() {
    let parser = Parser::with_options(Options {
        tab_width: 4,
        ..Options::default()
    });
    let v = parser.parse_string(&doc("-\t- x\n    - y\n")).unwrap();
    assert_eq!(
        v,
        Value::Sequence(vec![Value::Sequence(vec![str_("x"), str_("y")])])
    );
}

#[test]
fn missing_directive_is_rejected() {
    let err = parse_str("---\na: 1\n").unwrap_err();
    assert!(err.to_string().contains("expected directive"), "{err}");
    let err = parse_str("%YAML 1.1\n---\na: 1\n").unwrap_err();
    assert!(err.to_string().contains("expected directive"), "{err}");
    let err = parse_str("").unwrap_err();
    assert!(err.to_string().contains("expected directive"), "{err}");
}

#[test]
fn missing_document_start_is_rejected() {
    let err = parse_str("%YAML 1.2\na: 1\n").unwrap_err();
    assert!(err.to_string().contains("expected document start"), "{err}");
    let err = parse_str("%YAML 1.2\n---a\n").unwrap_err();
    assert!(err.to_string().contains("expected document start"), "{err}");
}

#[test]
fn excessive_indentation() {
    let msg = syntax_message("- a: 1\n - b\n");
    assert!(msg.contains("excessive indentation"), "{msg}");
    let msg = syntax_message("- \"x\"\n  - y\n");
    assert!(msg.contains("excessive indentation"), "{msg}");
}

#[test]
fn colon_in_scalar_continuation() {
    let msg = syntax_message("a: b\n  c: d\n");
    assert!(
        msg.contains("mapping key not allowed in scalar continuation"),
        "{msg}"
    );
}

#[test]
fn implicit_container_on_key_line() {
    let msg = syntax_message("a: b: c\n");
    assert!(msg.contains("mapping not expected in this context"), "{msg}");
    let msg = syntax_message("a: - x\n");
    assert!(
        msg.contains("sequence element not expected in this context"),
        "{msg}"
    );
    let err = parse_str("%YAML 1.2\n--- a: 1\n").unwrap_err();
    assert!(err.to_string().contains("mapping not expected"), "{err}");
}

#[test]
fn non_key_line_inside_mapping() {
    let msg = syntax_message("a: 1\n- b\n");
    assert!(msg.contains("expected mapping key"), "{msg}");
}

#[test]
fn trailing_content_is_invalid() {
    let msg = syntax_message("- a\nb: 1\n");
    assert!(msg.contains("invalid token"), "{msg}");
    let msg = syntax_message("\"x\"\ny\n");
    assert!(msg.contains("invalid token"), "{msg}");
}

#[test]
fn quoted_string_errors() {
    let msg = syntax_message("a: \"x\" y\n");
    assert!(msg.contains("unexpected content after closing quote"), "{msg}");
    let msg = syntax_message("a: \"never closed\nb: 1\n");
    assert!(msg.contains("unterminated string"), "{msg}");
}

#[test]
fn syntax_error_carries_position() {
    let err = parse_str("%YAML 1.2\n---\na: 1\n- b\n").unwrap_err();
    let e = err.as_syntax().expect("syntax error");
    assert_eq!(e.source_name, "<string>");
    assert_eq!(e.line, 4);
    assert_eq!(e.text, "- b");
    assert!(err.to_string().starts_with("<string>:4: "), "{err}");
}

#[test]
fn parser_is_reusable_after_failure() {
    let parser = Parser::new();
    let good = doc("a: 1\nb:\n  - x\n");
    let first = parser.parse_string(&good).unwrap();
    assert!(parser.parse_string(&doc("a: 1\n- b\n")).is_err());
    let second = parser.parse_string(&good).unwrap();
    assert_eq!(first, second);
}

#[test]
fn nesting_depth_limit() {
    let parser = Parser::with_options(Options {
        max_depth: Some(3),
        ..Options::default()
    });
    let err = parser.parse_string(&doc("- - - - a\n")).unwrap_err();
    assert!(
        err.to_string().contains("maximum nesting depth exceeded"),
        "{err}"
    );

    let unlimited = Parser::with_options(Options {
        max_depth: None,
        ..Options::default()
    });
    let v = unlimited.parse_string(&doc("- - - - a\n")).unwrap();
    assert_eq!(
        v,
        Value::Sequence(vec![Value::Sequence(vec![Value::Sequence(vec![
            Value::Sequence(vec![str_("a")])
        ])])])
    );
}

#[test]
fn parse_file_uses_path_as_source_name() -> Result<(), Box<dyn std::error::Error>> {
    use std::io::Write;

    let mut good = tempfile::NamedTempFile::new()?;
    write!(good, "{}", doc("k: v\n"))?;
    assert_eq!(yamlet::parse_file(good.path())?, map(&[("k", str_("v"))]));

    let mut bad = tempfile::NamedTempFile::new()?;
    write!(bad, "%YAML 1.2\n")?;
    let err = yamlet::parse_file(bad.path()).unwrap_err();
    let e = err.as_syntax().expect("syntax error");
    assert_eq!(e.source_name, bad.path().display().to_string());
    assert!(e.message.contains("expected document start"));
    Ok(())
}

#[test]
fn missing_file_is_io_error() {
    let err = yamlet::parse_file("/nonexistent/definitely/missing.yaml").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn parse_reader_names_source() {
    let parser = Parser::new();
    let err = parser
        .parse_reader("oops\n".as_bytes(), "config.yaml")
        .unwrap_err();
    assert!(err.to_string().starts_with("config.yaml:1:"), "{err}");
}
