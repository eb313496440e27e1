#[derive(Debug, Clone)]
pub struct Options {
    /// Tab stop used when expanding tabs in leading indentation (default: 8)
    pub tab_width: usize,
    /// Maximum nesting of values (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_width: 8,
            max_depth: Some(256),
        }
    }
}
