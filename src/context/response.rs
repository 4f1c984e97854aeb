/// Response sink receiving content fragments in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    buf: String,
}

impl Response {
    /// Empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal (already safe) content.
    pub fn append_content(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    /// Append text, escaping HTML-significant characters.
    pub fn append_escaped(&mut self, s: &str) {
        escape_html_into(&mut self.buf, s);
    }

    /// Content so far.
    pub fn content(&self) -> &str {
        &self.buf
    }

    /// Take the content, leaving the response empty.
    pub fn take_content(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }

    /// Byte length of the content so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// `true` if nothing was appended.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Escape `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_html_into(&mut out, s);
    out
}

fn escape_html_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
