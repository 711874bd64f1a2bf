use crate::{
    command::{ArithOp, Command, Segment},
    error::Error,
};

#[derive(Debug, Clone)]
pub struct Line {
    idx: usize,
    raw: String,
    pub cmd: Option<Command>,
}

impl Line {
    /// Parse one source line. On failure the error comes back together with
    /// the command kind it was attempting, for diagnostics.
    pub fn parse(idx: usize, raw: &str) -> (Line, Option<(Error, String)>) {
        let code = match raw.split_once("//") {
            Some((code, _)) => code,
            None => raw,
        };
        let (cmd, err) = match parse_command(code) {
            Ok(cmd) => (cmd, None),
            Err(err) => {
                let kind = code.split_whitespace().next().unwrap_or("").to_string();
                (None, Some((err, kind)))
            }
        };
        let line = Line {
            idx,
            raw: raw.to_string(),
            cmd,
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
}

/// Parse the code part of a line. Blank input yields `Ok(None)`.
pub fn parse_command(code: &str) -> Result<Option<Command>, Error> {
    let mut words = code.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let cmd = match head {
        "push" | "pop" => {
            let seg = words.next().ok_or(Error::MissingArgument("segment"))?;
            let seg: Segment = seg
                .parse()
                .map_err(|_| Error::UnknownSegment(seg.to_string()))?;
            let idx = words.next().ok_or(Error::MissingArgument("index"))?;
            let idx: u16 = idx.parse().map_err(|_| Error::InvalidIndex(idx.to_string()))?;
            if head == "push" {
                Command::Push(seg, idx)
            } else {
                Command::Pop(seg, idx)
            }
        }
        "label" => Command::Label(label(words.next())?),
        "goto" => Command::Goto(label(words.next())?),
        "if-goto" => Command::IfGoto(label(words.next())?),
        "function" | "call" => {
            let name = label(words.next())?;
            let n = words.next().ok_or(Error::MissingArgument("count"))?;
            let n: u16 = n.parse().map_err(|_| Error::InvalidCount(n.to_string()))?;
            if head == "function" {
                Command::Function(name, n)
            } else {
                Command::Call(name, n)
            }
        }
        "return" => Command::Return,
        op => match op.parse::<ArithOp>() {
            Ok(op) => Command::Arith(op),
            Err(_) => return Err(Error::UnknownCommand(op.to_string())),
        },
    };

    match words.next() {
        Some(extra) => Err(Error::ExtraArgument(extra.to_string())),
        None => Ok(Some(cmd)),
    }
}

fn label(word: Option<&str>) -> Result<String, Error> {
    let word = word.ok_or(Error::MissingArgument("label"))?;
    if is_symbol(word) {
        Ok(word.to_string())
    } else {
        Err(Error::InvalidLabel(word.to_string()))
    }
}

/// `$` is left out: the translator uses it to qualify names in assembly.
fn is_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || "_.:".contains(c) => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || "_.:".contains(c))
}
