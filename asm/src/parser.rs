use arch::inst::ADDR_MAX;
use color_print::cformat;

use crate::error::Error;

// ----------------------------------------------------------------------------
// Line

#[derive(Debug, Clone)]
pub struct Line {
    idx: usize,
    raw: String,
    comment: Option<String>,
    pub stmt: Option<Stmt>,
    /// Address of the instruction, filled in by pass 1.
    pub pc: Option<u16>,
    /// Encoded word, filled in by pass 2.
    pub bin: Option<u16>,
}

impl Line {
    pub fn parse(idx: usize, raw: &str) -> (Line, Option<Error>) {
        let (code, comment) = match raw.split_once("//") {
            Some((code, comment)) => (code, Some(comment.to_string())),
            None => (raw, None),
        };
        let (stmt, err) = match Stmt::parse(code) {
            Ok(stmt) => (stmt, None),
            Err(err) => (None, Some(err)),
        };
        let line = Line {
            idx,
            raw: raw.to_string(),
            comment,
            stmt,
            pc: None,
            bin: None,
        };
        (line, err)
    }

    /// 1-based line number.
    pub fn no(&self) -> usize {
        self.idx + 1
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `@value`
    A(Imm),
    /// `dest=comp;jump`, mnemonics kept raw until encoding
    C {
        dest: String,
        comp: String,
        jump: String,
    },
    /// `(name)`
    Label(String),
}

impl Stmt {
    pub fn parse(code: &str) -> Result<Option<Stmt>, Error> {
        let code: String = code.split_whitespace().collect();
        if code.is_empty() {
            return Ok(None);
        }

        if let Some(value) = code.strip_prefix('@') {
            return Ok(Some(Stmt::A(Imm::parse(value)?)));
        }

        if let Some(inner) = code.strip_prefix('(') {
            return match inner.strip_suffix(')') {
                Some(name) if is_symbol(name) => Ok(Some(Stmt::Label(name.to_string()))),
                _ => Err(Error::InvalidLabel(code.clone())),
            };
        }

        let (dest, rest) = match code.split_once('=') {
            Some((dest, rest)) => (dest, rest),
            None => ("", code.as_str()),
        };
        let (comp, jump) = match rest.split_once(';') {
            Some((comp, jump)) => (comp, jump),
            None => (rest, ""),
        };
        Ok(Some(Stmt::C {
            dest: dest.to_string(),
            comp: comp.to_string(),
            jump: jump.to_string(),
        }))
    }

    /// Name used when reporting diagnostics about this statement.
    pub fn kind(&self) -> &'static str {
        match self {
            Stmt::A(_) => "address",
            Stmt::C { .. } => "compute",
            Stmt::Label(_) => "label",
        }
    }

    pub fn cformat(&self) -> String {
        match self {
            Stmt::A(imm) => cformat!("<r>@</>{}", imm.cformat()),
            Stmt::C { dest, comp, jump } => {
                let dest = match dest.as_str() {
                    "" => String::new(),
                    _ => cformat!("<b>{}</>=", dest),
                };
                let jump = match jump.as_str() {
                    "" => String::new(),
                    _ => cformat!(";<r>{}</>", jump),
                };
                cformat!("{}<g>{}</>{}", dest, comp, jump)
            }
            Stmt::Label(name) => cformat!("<g,s>({})</>", name),
        }
    }
}

// ----------------------------------------------------------------------------
// Immediate

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imm {
    Literal(u16),
    Symbol(String),
}

impl Imm {
    fn parse(s: &str) -> Result<Imm, Error> {
        if s.starts_with(|c: char| c.is_ascii_digit()) {
            if !s.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::InvalidSymbol(s.to_string()));
            }
            return match s.parse::<u16>() {
                Ok(v) if v <= ADDR_MAX => Ok(Imm::Literal(v)),
                _ => Err(Error::AddressOverflow(s.to_string())),
            };
        }
        if is_symbol(s) {
            Ok(Imm::Symbol(s.to_string()))
        } else {
            Err(Error::InvalidSymbol(s.to_string()))
        }
    }

    fn cformat(&self) -> String {
        match self {
            Imm::Literal(v) => cformat!("<y>{}</>", v),
            Imm::Symbol(name) => cformat!("<c>{}</>", name),
        }
    }
}

/// Letters, digits, `_`, `.`, `$` and `:`, not starting with a digit.
fn is_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if !c.is_ascii_digit() && is_symbol_char(c) => chars.all(is_symbol_char),
        _ => false,
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(dest: &str, comp: &str, jump: &str) -> Stmt {
        Stmt::C {
            dest: dest.to_string(),
            comp: comp.to_string(),
            jump: jump.to_string(),
        }
    }

    macro_rules! case {
        ($name:ident, $code:expr, $expect:expr) => {
            #[test]
            fn $name() {
                assert_eq!(Stmt::parse($code).unwrap(), $expect);
            }
        };
    }

    case!(empty, "   ", None);
    case!(literal, "@21", Some(Stmt::A(Imm::Literal(21))));
    case!(symbol, "@Main.loop$1", Some(Stmt::A(Imm::Symbol("Main.loop$1".into()))));
    case!(label, "(LOOP)", Some(Stmt::Label("LOOP".into())));
    case!(full, "D=D+1;JGT", Some(c("D", "D+1", "JGT")));
    case!(no_jump, "AM=M-1", Some(c("AM", "M-1", "")));
    case!(no_dest, "0;JMP", Some(c("", "0", "JMP")));
    case!(spaces, " D = M ", Some(c("D", "M", "")));

    #[test]
    fn comment_is_stripped() {
        let (line, err) = Line::parse(4, "  @SP // stack pointer");
        assert!(err.is_none());
        assert_eq!(line.stmt, Some(Stmt::A(Imm::Symbol("SP".into()))));
        assert_eq!(line.comment(), Some(" stack pointer"));
        assert_eq!(line.no(), 5);
    }

    #[test]
    fn rejects_bad_operands() {
        assert!(matches!(Stmt::parse("@32768"), Err(Error::AddressOverflow(_))));
        assert!(matches!(Stmt::parse("@1abc"), Err(Error::InvalidSymbol(_))));
        assert!(matches!(Stmt::parse("@"), Err(Error::InvalidSymbol(_))));
        assert!(matches!(Stmt::parse("(LOOP"), Err(Error::InvalidLabel(_))));
        assert!(matches!(Stmt::parse("()"), Err(Error::InvalidLabel(_))));
    }
}
