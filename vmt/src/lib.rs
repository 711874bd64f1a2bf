pub mod command;
pub mod error;
pub mod parser;
pub mod translator;
pub mod writer;

pub use error::Error;
pub use translator::{translate, Options, Source, Translated};
