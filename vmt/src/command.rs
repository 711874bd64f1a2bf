use std::fmt;
use strum::{Display, EnumString};

/// Memory segment addressed by `push`/`pop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithOp {
    pub fn is_unary(self) -> bool {
        matches!(self, ArithOp::Neg | ArithOp::Not)
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, ArithOp::Eq | ArithOp::Gt | ArithOp::Lt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Arith(ArithOp),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl Command {
    /// Name used when reporting diagnostics about this command.
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Arith(_) => "arithmetic",
            Command::Push(..) => "push",
            Command::Pop(..) => "pop",
            Command::Label(_) => "label",
            Command::Goto(_) => "goto",
            Command::IfGoto(_) => "if-goto",
            Command::Function(..) => "function",
            Command::Call(..) => "call",
            Command::Return => "return",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arith(op) => write!(f, "{}", op),
            Command::Push(seg, idx) => write!(f, "push {} {}", seg, idx),
            Command::Pop(seg, idx) => write!(f, "pop {} {}", seg, idx),
            Command::Label(name) => write!(f, "label {}", name),
            Command::Goto(name) => write!(f, "goto {}", name),
            Command::IfGoto(name) => write!(f, "if-goto {}", name),
            Command::Function(name, n) => write!(f, "function {} {}", name, n),
            Command::Call(name, n) => write!(f, "call {} {}", name, n),
            Command::Return => write!(f, "return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!("this".parse::<Segment>(), Ok(Segment::This));
        assert!("heap".parse::<Segment>().is_err());
        assert_eq!(ArithOp::Lt.to_string(), "lt");
        assert_eq!(Command::Push(Segment::Constant, 7).to_string(), "push constant 7");
        assert_eq!(Command::IfGoto("L".into()).to_string(), "if-goto L");
    }
}
