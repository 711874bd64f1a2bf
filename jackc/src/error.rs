use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Lexical, fatal
    #[error("Unterminated comment starting at line {0}")]
    UnterminatedComment(usize),

    #[error("Unterminated string starting at line {0}")]
    UnterminatedString(usize),

    #[error("Unexpected character `{0}` at line {1}")]
    InvalidChar(char, usize),

    #[error("Integer constant `{0}` at line {1} is out of range [0, 32767]")]
    IntOverflow(String, usize),

    // Syntax
    #[error("No more tokens")]
    OutOfRange,

    #[error("Expected {expected}, found `{found}`")]
    Expected {
        expected: &'static str,
        found: String,
        line: usize,
    },

    #[error("Expected {0}, found end of file")]
    UnexpectedEof(&'static str),

    #[error("Unexpected tokens after the end of the class")]
    TrailingTokens(usize),

    // Semantic
    #[error("Undeclared variable: `{0}`")]
    Undeclared(String, usize),

    #[error("Duplicate declaration: `{0}`")]
    Duplicate(String, usize),

    #[error("Void subroutine `{0}` returns a value")]
    ReturnFromVoid(String, usize),

    #[error("Subroutine `{0}` must return a value")]
    MissingReturnValue(String, usize),

    #[error("Method `{0}` called from a function")]
    MethodFromFunction(String, usize),

    #[error("Field `{0}` used in a function")]
    FieldInFunction(String, usize),

    #[error("Not supported: {0}")]
    Unsupported(&'static str, usize),

    // I/O
    #[error("No `.jack` files in {0}")]
    NoInput(String),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

impl Error {
    /// Source line the error points at, when it carries one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::UnterminatedComment(line)
            | Error::UnterminatedString(line)
            | Error::InvalidChar(_, line)
            | Error::IntOverflow(_, line)
            | Error::Expected { line, .. }
            | Error::TrailingTokens(line)
            | Error::Undeclared(_, line)
            | Error::Duplicate(_, line)
            | Error::ReturnFromVoid(_, line)
            | Error::MissingReturnValue(_, line)
            | Error::MethodFromFunction(_, line)
            | Error::FieldInFunction(_, line)
            | Error::Unsupported(_, line) => Some(*line),
            _ => None,
        }
    }
}
