pub mod compile;
pub mod error;
pub mod grammer;
pub mod symbols;

use arch::msg::Msgs;
use vmt::command::Command;

pub use error::Error;

/// Bytecode for one class.
pub struct Compiled {
    pub class: String,
    pub commands: Vec<Command>,
    pub msgs: Msgs,
}

impl Compiled {
    pub fn is_ok(&self) -> bool {
        !self.msgs.has_error()
    }

    /// `.vm` text, one command per line.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for cmd in &self.commands {
            text.push_str(&cmd.to_string());
            text.push('\n');
        }
        text
    }
}

/// Compile one `.jack` source. Lexical errors abort with `Err`; everything
/// else is collected in [`Compiled::msgs`].
pub fn compile(file: &str, source: &str) -> Result<Compiled, Error> {
    let tokens = grammer::lexer::tokenize(source)?;
    let engine = compile::engine::Engine::new(file, source, tokens);
    Ok(engine.run())
}
