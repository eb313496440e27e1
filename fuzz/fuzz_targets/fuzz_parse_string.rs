#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parser = yamlet::Parser::new();
        let first = parser.parse_string(s);
        let second = parser.parse_string(s);
        assert_eq!(first.is_ok(), second.is_ok());
        let _ = parser.parse_string(&format!("%YAML 1.2\n---\n{}", s));
    }
});
