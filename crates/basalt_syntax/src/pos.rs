/// A position in the original source text. Both fields are zero-based, and
/// `column` is measured in bytes from the start of the line, not characters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct SourcePos {
    line: u32,
    column: u32,
}

impl SourcePos {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }
}

impl std::fmt::Display for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
