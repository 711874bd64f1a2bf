use crate::command::Segment;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown command: `{0}`")]
    UnknownCommand(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("Unexpected argument: `{0}`")]
    ExtraArgument(String),

    #[error("Unknown segment: `{0}`")]
    UnknownSegment(String),

    #[error("Invalid index: `{0}`")]
    InvalidIndex(String),

    #[error("Invalid count: `{0}`")]
    InvalidCount(String),

    #[error("Invalid label: `{0}`")]
    InvalidLabel(String),

    #[error("Cannot pop into the constant segment")]
    PopConstant,

    #[error("Index {1} out of range for segment `{0}`, valid range is [0, {2}]")]
    IndexOutOfRange(Segment, u16, u16),

    #[error("No `.vm` files in {0}")]
    NoInput(String),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}
