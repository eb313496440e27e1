use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::decode::resolve::resolve_scalar;
use crate::decode::scanner::{Line, LineSource};
use crate::error::{Result, SyntaxError};
use crate::options::Options;
use crate::tags::{TagAction, TagError, TagRegistry, builtin_tag, default_tag};
use crate::value::Value;

const DIRECTIVE: &str = "%YAML 1.2";
const STRING_SOURCE: &str = "<string>";

type PResult<T> = core::result::Result<T, SyntaxError>;

static DOC_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---(?:\s+(.*))?$").expect("valid document start pattern"));
static SEQ_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-(?:\s+|$)").expect("valid sequence item pattern"));
static MAP_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:]+):(?:\s+|$)").expect("valid mapping key pattern"));
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(!!?)(\S*)\s*").expect("valid tag pattern"));

/// Parses documents of the form
///
/// ```text
/// %YAML 1.2
/// ---
/// key: value
/// ```
///
/// into [`Value`] trees. All state of a parse lives on the stack of the
/// call, so one `Parser` can be reused for any number of documents, including
/// after a failed one.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: Options,
    tags: TagRegistry,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            tags: TagRegistry::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Make `!name` available to this parser only. Takes precedence over the
    /// process-wide registry; a second registration replaces the first.
    pub fn register_local_tag<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(Value) -> core::result::Result<Value, TagError> + Send + Sync + 'static,
    {
        self.tags.register(name, constructor);
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Ok(self.parse_source(&source, &path.display().to_string())?)
    }

    pub fn parse_reader<R: Read>(&self, mut reader: R, source_name: &str) -> Result<Value> {
        let mut s = String::new();
        reader.read_to_string(&mut s)?;
        Ok(self.parse_source(&s, source_name)?)
    }

    pub fn parse_string(&self, source: &str) -> Result<Value> {
        Ok(self.parse_source(source, STRING_SOURCE)?)
    }

    fn parse_source(&self, source: &str, source_name: &str) -> PResult<Value> {
        debug!(source = source_name, bytes = source.len(), "parsing document");
        let mut state = ParserState::new(self, source, source_name);
        let result = state.parse_document();
        match &result {
            Ok(_) => debug!(
                source = source_name,
                lines = state.lines.line_number(),
                "parsed document"
            ),
            Err(e) => debug!(source = source_name, error = %e, "document rejected"),
        }
        result
    }
}

/// Minimum indentation a line needs to continue each kind of container.
///
/// Passed by value: a container parser hands its children a fresh copy and
/// its caller's thresholds are never touched.
#[derive(Debug, Clone, Copy, Default)]
struct Thresholds {
    mapping: usize,
    sequence: usize,
    scalar_wrap: usize,
}

/// Where in the document a value is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Inline after the `---` marker.
    Marker,
    /// On its own line below the `---` marker.
    Document,
    /// Inline after a `key:`.
    MapValue,
    /// Inline after a `- `.
    SequenceItem,
}

impl Context {
    fn allows_implicit(self) -> bool {
        matches!(self, Context::Document | Context::SequenceItem)
    }
}

/// How the dispatcher found the start of a value.
#[derive(Debug, Clone, Copy)]
enum Start {
    /// Text remains on the line that introduced the value.
    Inline { allow_implicit: bool },
    /// The value begins on a freshly fetched line.
    Wrapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Quoted,
    Sequence,
    Mapping,
    Scalar,
    Empty,
}

struct Tag {
    action: Option<TagAction>,
    line: usize,
    text: String,
}

struct ParserState<'a> {
    parser: &'a Parser,
    source_name: &'a str,
    lines: LineSource<'a>,
    /// Current line; its `text` shrinks as prefixes are consumed.
    current: Option<Line<'a>>,
    /// Current line as it was fetched, for diagnostics.
    line_text: &'a str,
    depth: usize,
}

impl<'a> ParserState<'a> {
    fn new(parser: &'a Parser, source: &'a str, source_name: &'a str) -> Self {
        Self {
            parser,
            source_name,
            lines: LineSource::new(source, parser.options.tab_width),
            current: None,
            line_text: "",
            depth: 0,
        }
    }

    fn advance(&mut self) {
        self.current = self.lines.next_line();
        self.line_text = self.current.map_or("", |l| l.text);
    }

    fn buffer_is_empty(&self) -> bool {
        self.current.is_none_or(|l| l.text.is_empty())
    }

    fn match_line(&self, pattern: &Regex) -> Option<Captures<'a>> {
        let line = self.current?;
        pattern.captures(line.text)
    }

    /// Drop the first `len` bytes of the current line. With `shift_indent`
    /// the dropped text counts towards the line's indentation.
    /// Drops the first `len` bytes of the current line. With `shift_indent`
    /// the dropped prefix counts toward the line's indentation, tabs
    /// advancing to the next tab stop as they do in leading whitespace.
    fn consume_prefix(&mut self, len: usize, shift_indent: bool) {
        let tab_width = self.parser.options.tab_width.max(1);
        if let Some(line) = self.current.as_mut() {
            if shift_indent {
                line.indent = line.text.as_bytes()[..len]
                    .iter()
                    .fold(line.indent, |col, &b| match b {
                        b'\t' => col + tab_width - col % tab_width,
                        _ => col + 1,
                    });
            }
            line.text = line.text[len..].trim_start();
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            source_name: self.source_name.to_string(),
            line: self
                .current
                .map_or_else(|| self.lines.line_number(), |l| l.number),
            message: message.into(),
            text: self.line_text.to_string(),
        }
    }

    fn parse_document(&mut self) -> PResult<Value> {
        self.advance();
        if self.current.map(|l| l.text) != Some(DIRECTIVE) {
            return Err(self.error(format!("expected directive {:?}", DIRECTIVE)));
        }
        self.advance();
        let caps = self
            .match_line(&DOC_START)
            .ok_or_else(|| self.error("expected document start \"---\""))?;
        let value = match caps.get(1).filter(|m| !m.as_str().is_empty()) {
            Some(rest) => {
                if let Some(line) = self.current.as_mut() {
                    line.text = rest.as_str();
                }
                self.consume_object(Context::Marker, Thresholds::default())?
            }
            None => {
                self.advance();
                self.consume_object(Context::Document, Thresholds::default())?
            }
        };
        if self.current.is_some() {
            return Err(self.error("invalid token"));
        }
        Ok(value)
    }

    fn consume_object(&mut self, ctx: Context, th: Thresholds) -> PResult<Value> {
        if let Some(max) = self.parser.options.max_depth {
            if self.depth >= max {
                return Err(self.error(format!("maximum nesting depth exceeded ({})", max)));
            }
        }
        self.depth += 1;
        let result = self.dispatch(ctx, th);
        self.depth -= 1;
        result
    }

    fn dispatch(&mut self, ctx: Context, th: Thresholds) -> PResult<Value> {
        let mut start = if self.buffer_is_empty() {
            self.advance();
            Start::Wrapped
        } else {
            Start::Inline {
                allow_implicit: ctx.allows_implicit(),
            }
        };

        let tag = self.consume_tag()?;
        if tag.is_some() && self.buffer_is_empty() {
            self.advance();
            start = Start::Wrapped;
        }

        let value = match self.choose_branch(start, th)? {
            Branch::Quoted => self.consume_string_explicit()?,
            Branch::Sequence => self.consume_sequence_implicit()?,
            Branch::Mapping => self.consume_map_implicit()?,
            Branch::Scalar => self.consume_scalar(th)?,
            Branch::Empty => Value::Null,
        };

        match tag {
            Some(Tag {
                action: Some(action),
                line,
                text,
            }) => action.apply(value).map_err(|e| SyntaxError {
                source_name: self.source_name.to_string(),
                line,
                message: format!("tag constructor failed: {}", e),
                text,
            }),
            _ => Ok(value),
        }
    }

    fn choose_branch(&self, start: Start, th: Thresholds) -> PResult<Branch> {
        let Some(line) = self.current else {
            return Ok(Branch::Empty);
        };
        let (inline, allow_implicit) = match start {
            Start::Inline { allow_implicit } => (true, allow_implicit),
            Start::Wrapped => (false, true),
        };
        if inline && (line.text.starts_with('"') || line.text.starts_with('\'')) {
            return Ok(Branch::Quoted);
        }
        if (inline || line.indent >= th.sequence) && SEQ_ITEM.is_match(line.text) {
            if !allow_implicit {
                return Err(self.error("sequence element not expected in this context"));
            }
            return Ok(Branch::Sequence);
        }
        if (inline || line.indent >= th.mapping) && MAP_KEY.is_match(line.text) {
            if !allow_implicit {
                return Err(self.error("mapping not expected in this context"));
            }
            return Ok(Branch::Mapping);
        }
        if inline || line.indent >= th.scalar_wrap {
            return Ok(Branch::Scalar);
        }
        Ok(Branch::Empty)
    }

    fn consume_tag(&mut self) -> PResult<Option<Tag>> {
        let Some(caps) = self.match_line(&TAG) else {
            return Ok(None);
        };
        let name = caps.get(2).map_or("", |m| m.as_str());
        let action = match caps.get(1).map(|m| m.as_str()) {
            Some("!!") => Some(
                builtin_tag(name)
                    .ok_or_else(|| self.error(format!("unknown built-in tag !!{}", name)))?,
            ),
            _ if name.is_empty() => None,
            _ => {
                let ctor = self
                    .parser
                    .tags
                    .get(name)
                    .or_else(|| default_tag(name))
                    .ok_or_else(|| self.error(format!("unknown tag !{}", name)))?;
                Some(TagAction::Custom(ctor))
            }
        };
        trace!(tag = name, "resolved tag");
        let tag = Tag {
            action,
            line: self.current.map_or(0, |l| l.number),
            text: self.line_text.to_string(),
        };
        let end = caps.get(0).map_or(0, |m| m.end());
        self.consume_prefix(end, false);
        Ok(Some(tag))
    }

    fn consume_map_implicit(&mut self) -> PResult<Value> {
        let anchor = self.current.map_or(0, |l| l.indent);
        trace!(anchor, line = self.lines.line_number(), "mapping");
        let th = Thresholds {
            mapping: anchor + 1,
            sequence: anchor,
            scalar_wrap: anchor + 1,
        };
        let mut entries: Vec<(String, Value)> = Vec::new();
        loop {
            let caps = self
                .match_line(&MAP_KEY)
                .ok_or_else(|| self.error("expected mapping key"))?;
            let key = caps.get(1).map_or("", |m| m.as_str()).trim_end().to_string();
            let end = caps.get(0).map_or(0, |m| m.end());
            self.consume_prefix(end, false);
            let value = self.consume_object(Context::MapValue, th)?;
            Value::insert_entry(&mut entries, key, value);
            match self.current {
                Some(line) if line.indent >= anchor => {
                    if !MAP_KEY.is_match(line.text) {
                        return Err(self.error("expected mapping key"));
                    }
                }
                _ => break,
            }
        }
        Ok(Value::Mapping(entries))
    }

    fn consume_sequence_implicit(&mut self) -> PResult<Value> {
        let anchor = self.current.map_or(0, |l| l.indent);
        trace!(anchor, line = self.lines.line_number(), "sequence");
        let mut items = Vec::new();
        loop {
            let dash = self
                .match_line(&SEQ_ITEM)
                .and_then(|caps| caps.get(0))
                .map_or(0, |m| m.end());
            self.consume_prefix(dash, true);
            let item_indent = self.current.map_or(anchor + dash, |l| l.indent);
            let th = Thresholds {
                mapping: item_indent,
                sequence: item_indent,
                scalar_wrap: anchor + 1,
            };
            items.push(self.consume_object(Context::SequenceItem, th)?);
            match self.current {
                Some(line) if line.indent > anchor => {
                    return Err(self.error("excessive indentation"));
                }
                Some(line) if line.indent == anchor && SEQ_ITEM.is_match(line.text) => {}
                _ => break,
            }
        }
        Ok(Value::Sequence(items))
    }

    fn consume_scalar(&mut self, th: Thresholds) -> PResult<Value> {
        let mut text = self.current.map_or("", |l| l.text).to_string();
        let mut multiline = false;
        while self
            .lines
            .line_indent_lookahead()
            .is_some_and(|indent| indent >= th.scalar_wrap)
        {
            self.advance();
            let next = self.current.map_or("", |l| l.text);
            if next.contains(':') {
                return Err(self.error("mapping key not allowed in scalar continuation"));
            }
            text.push(' ');
            text.push_str(next);
            multiline = true;
        }
        self.advance();
        if multiline {
            Ok(Value::Str(text))
        } else {
            Ok(resolve_scalar(&text))
        }
    }

    fn consume_string_explicit(&mut self) -> PResult<Value> {
        let first = self.current.map_or("", |l| l.text);
        let Some(quote) = first.chars().next() else {
            return Err(self.error("expected quoted string"));
        };
        let body = &first[quote.len_utf8()..];
        let mut text = String::new();
        let tail = match body.find(quote) {
            Some(end) => {
                text.push_str(&body[..end]);
                &body[end + quote.len_utf8()..]
            }
            None => {
                text.push_str(body);
                loop {
                    self.advance();
                    let Some(line) = self.current else {
                        return Err(self.error("unterminated string"));
                    };
                    text.push(' ');
                    if let Some(end) = line.text.find(quote) {
                        text.push_str(&line.text[..end]);
                        break &line.text[end + quote.len_utf8()..];
                    }
                    text.push_str(line.text);
                }
            }
        };
        if !tail.trim().is_empty() {
            return Err(self.error("unexpected content after closing quote"));
        }
        self.advance();
        Ok(Value::Str(text))
    }
}

pub fn parse_str(input: &str) -> Result<Value> {
    Parser::new().parse_string(input)
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Value> {
    Parser::new().parse_file(path)
}
