//! Line source: yields logical lines with comments and indentation removed.

/// One non-blank line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based physical line number.
    pub number: usize,
    /// Width of the leading whitespace, tabs expanded.
    pub indent: usize,
    /// Content without indentation, comment or trailing whitespace.
    pub text: &'a str,
}

/// Iterator over the content-bearing lines of a document.
///
/// Cloning is cheap (a slice and two counters), which is what makes
/// [`LineSource::line_indent_lookahead`] a pure peek.
#[derive(Debug, Clone)]
pub struct LineSource<'a> {
    rest: &'a str,
    line_no: usize,
    tab_width: usize,
}

pub fn scan(input: &str, tab_width: usize) -> Vec<Line<'_>> {
    LineSource::new(input, tab_width).collect()
}

impl<'a> LineSource<'a> {
    pub fn new(input: &'a str, tab_width: usize) -> Self {
        Self {
            rest: input,
            line_no: 0,
            tab_width: tab_width.max(1),
        }
    }

    /// Consume the next line that still has content after comment and
    /// whitespace stripping. `None` at end of input.
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        while let Some(raw) = self.next_raw() {
            let line = self.strip(raw);
            if !line.text.is_empty() {
                return Some(line);
            }
        }
        None
    }

    /// Indentation of the line [`next_line`](Self::next_line) would return,
    /// without consuming it.
    pub fn line_indent_lookahead(&self) -> Option<usize> {
        let mut probe = self.clone();
        probe.next_line().map(|l| l.indent)
    }

    /// Number of physical lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    fn next_raw(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        self.line_no += 1;
        let (raw, remaining) = match self.rest.find('\n') {
            Some(pos) => (&self.rest[..pos], &self.rest[pos + 1..]),
            None => (self.rest, ""),
        };
        self.rest = remaining;
        Some(raw.strip_suffix('\r').unwrap_or(raw))
    }

    fn strip(&self, raw: &'a str) -> Line<'a> {
        let content = match find_comment_start(raw) {
            Some(idx) => &raw[..idx],
            None => raw,
        };
        let (indent, body_start) = measure_indent(content, self.tab_width);
        Line {
            number: self.line_no,
            indent,
            text: content[body_start..].trim_end(),
        }
    }
}

impl<'a> Iterator for LineSource<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}

/// Returns (expanded width, byte length) of the leading whitespace.
fn measure_indent(s: &str, tab_width: usize) -> (usize, usize) {
    let mut width = 0usize;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b' ' => width += 1,
            b'\t' => width += tab_width - width % tab_width,
            _ => return (width, i),
        }
    }
    (width, s.len())
}

// Quoting is not taken into account: `'a # b'` loses everything from the
// `#` onward. Only a backslash directly before `#` protects it.
#[inline]
fn find_comment_start(s: &str) -> Option<usize> {
    #[cfg(feature = "perf_memchr")]
    {
        find_comment_start_memchr(s)
    }
    #[cfg(not(feature = "perf_memchr"))]
    {
        find_comment_start_bytes(s)
    }
}

#[cfg(any(feature = "perf_memchr", test))]
fn find_comment_start_memchr(s: &str) -> Option<usize> {
    let b = s.as_bytes();
    let mut from = 0usize;
    while let Some(rel) = memchr::memchr(b'#', &b[from..]) {
        let idx = from + rel;
        if idx == 0 || b[idx - 1] != b'\\' {
            return Some(idx);
        }
        from = idx + 1;
    }
    None
}

#[cfg(any(not(feature = "perf_memchr"), test))]
fn find_comment_start_bytes(s: &str) -> Option<usize> {
    let b = s.as_bytes();
    for (i, &ch) in b.iter().enumerate() {
        if ch == b'#' && (i == 0 || b[i - 1] != b'\\') {
            return Some(i);
        }
    }
    None
}
