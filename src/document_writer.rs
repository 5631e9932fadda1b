use serde::Deserialize;

/// Layout of compiled documents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentStyle {
    pub indent: String,
    pub line_break: String,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        DocumentStyle {
            indent: "  ".to_string(),
            line_break: "\n".to_string(),
        }
    }
}

pub(crate) struct DocumentWriter {
    line_break: String,
    indent_sign: String,
    indent_level: usize,
    content: String,
}

impl DocumentWriter {
    pub fn new(style: &DocumentStyle) -> DocumentWriter {
        DocumentWriter {
            line_break: style.line_break.clone(),
            indent_sign: style.indent.clone(),
            indent_level: 0,
            content: String::new(),
        }
    }

    pub fn line(&mut self, code: &str) {
        for _ in 0..self.indent_level {
            self.content.push_str(&self.indent_sign);
        }
        self.content.push_str(code);
        self.content.push_str(&self.line_break);
    }

    pub fn begin_indent(&mut self, code: &str) {
        self.line(code);
        self.indent_level += 1;
    }

    pub fn end_indent(&mut self, code: &str) {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.line(code);
    }

    pub fn build_string(self) -> String {
        self.content
    }
}
