use arch::inst::ADDR_MAX;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown computation: `{0}`")]
    UnknownComp(String),

    #[error("Unknown destination: `{0}`")]
    UnknownDest(String),

    #[error("Unknown jump: `{0}`")]
    UnknownJump(String),

    #[error("Missing computation")]
    MissingComp,

    #[error("Address `{0}` out of range, valid range is [0, {max}]", max = ADDR_MAX)]
    AddressOverflow(String),

    #[error("Invalid symbol: `{0}`")]
    InvalidSymbol(String),

    #[error("Invalid label definition: `{0}`")]
    InvalidLabel(String),

    #[error("Re-defined label: `{0}`")]
    RedefinedLabel(String),

    #[error("Program exceeds instruction memory at `{0}`")]
    ProgramOverflow(String),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}
