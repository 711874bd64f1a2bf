pub mod assembler;
pub mod error;
pub mod parser;
pub mod symbol;
pub mod util;

pub use assembler::{assemble, Assembled};
pub use error::Error;
