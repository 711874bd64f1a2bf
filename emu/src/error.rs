use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Line {0}: not a 16-bit binary word: `{1}`")]
    InvalidWord(usize, String),

    #[error("Program has {0} words, ROM holds {max}", max = arch::symbol::ROM_SIZE)]
    ProgramTooLarge(usize),

    #[error("Failed to read dump config {0}: {1}")]
    DumpConfig(String, #[source] serde_yaml::Error),
}
