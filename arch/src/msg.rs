use color_print::{cformat, cprintln};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warn,
}

/// A diagnostic anchored to a line of some input file.
#[derive(Debug, Clone)]
pub struct Msg {
    level: Level,
    text: String,
    file: String,
    line: usize,
    kind: Option<String>,
    raw: Option<String>,
}

impl Msg {
    fn new(level: Level, text: impl Into<String>, file: &str, line: usize) -> Self {
        Msg {
            level,
            text: text.into(),
            file: file.to_string(),
            line,
            kind: None,
            raw: None,
        }
    }

    pub fn error(text: impl Into<String>, file: &str, line: usize) -> Self {
        Msg::new(Level::Error, text, file, line)
    }

    pub fn warn(text: impl Into<String>, file: &str, line: usize) -> Self {
        Msg::new(Level::Warn, text, file, line)
    }

    /// Attach the kind of command the message is about (`push`, `compute`, ...).
    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    /// Attach the offending source line.
    pub fn raw(mut self, raw: &str) -> Self {
        self.raw = Some(raw.to_string());
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// 1-based line number.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn command_kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }

    pub fn print(&self) {
        match self.level {
            Level::Error => cprintln!("<red,bold>error</>: {}", self.text),
            Level::Warn => cprintln!("<yellow,bold>warn</>: {}", self.text),
        }
        let kind = match &self.kind {
            Some(kind) => cformat!(" <dim>({})</>", kind),
            None => String::new(),
        };
        cprintln!(
            "     <blue>--></> <underline>{}:{}</>{}",
            self.file,
            self.line,
            kind
        );
        if let Some(raw) = &self.raw {
            cprintln!("      <blue>|</>");
            cprintln!(" <blue>{:>4} |</> {}", self.line, raw);
            cprintln!("      <blue>|</>");
        }
    }
}

impl fmt::Display for Msg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            Level::Error => "error",
            Level::Warn => "warn",
        };
        write!(f, "{}: {} at {}:{}", level, self.text, self.file, self.line)?;
        if let Some(kind) = &self.kind {
            write!(f, " ({})", kind)?;
        }
        Ok(())
    }
}

/// Accumulated diagnostics of one run.
#[derive(Debug, Clone, Default)]
pub struct Msgs(Vec<Msg>);

impl Msgs {
    pub fn new() -> Self {
        Msgs(Vec::new())
    }

    pub fn push(&mut self, msg: Msg) {
        self.0.push(msg);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(Msg::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Msg> {
        self.0.iter().filter(|msg| msg.level == Level::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Msg> {
        self.0.iter().filter(|msg| msg.level == Level::Warn)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Msg> {
        self.0.iter()
    }

    pub fn dump(&self) {
        for msg in &self.0 {
            msg.print();
        }
    }
}
