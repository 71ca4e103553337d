//! Line-oriented text buffer shared by the text renderers.

/// Width of the banner and separator rules.
pub const RULE_WIDTH: usize = 80;

const INDENT: &str = "    ";

pub struct TextWriter {
    buffer: String,
    indents: usize,
}

impl TextWriter {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            indents: 0,
        }
    }

    /// Writes the value at the current indentation and ends the line.
    pub fn line(&mut self, val: &str) {
        if !val.is_empty() {
            for _ in 0..self.indents {
                self.buffer.push_str(INDENT);
            }
            self.buffer.push_str(val);
        }
        self.newline();
    }

    pub fn newline(&mut self) {
        self.buffer.push('\n');
    }

    /// A line of `RULE_WIDTH` copies of the character.
    pub fn rule(&mut self, ch: char) {
        let rule: String = std::iter::repeat(ch).take(RULE_WIDTH).collect();
        self.line(&rule);
    }

    pub fn indent(&mut self) {
        self.indents += 1;
    }

    pub fn outdent(&mut self) {
        self.indents = self.indents.saturating_sub(1);
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

impl Default for TextWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::TextWriter;

    #[test]
    fn line_when_indented_then_prefixed() {
        let mut writer = TextWriter::new();
        writer.line("IF");
        writer.indent();
        writer.line("X;");
        writer.outdent();
        writer.line("END_IF;");

        assert_eq!(writer.finish(), "IF\n    X;\nEND_IF;\n");
    }

    #[test]
    fn line_when_empty_then_no_trailing_whitespace() {
        let mut writer = TextWriter::new();
        writer.indent();
        writer.line("");

        assert_eq!(writer.finish(), "\n");
    }

    #[test]
    fn rule_when_called_then_80_characters() {
        let mut writer = TextWriter::new();
        writer.rule('-');

        assert_eq!(writer.finish().trim_end().len(), 80);
    }
}
