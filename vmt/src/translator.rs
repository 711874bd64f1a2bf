use std::path::Path;

use arch::msg::{Msg, Msgs};

use crate::{parser::Line, writer::CodeWriter};

pub const DEFAULT_ENTRY: &str = "Sys.init";

/// One bytecode file to translate.
#[derive(Debug, Clone)]
pub struct Source {
    /// File name as reported in diagnostics, e.g. `Main.vm`.
    pub name: String,
    pub text: String,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Source {
            name: name.into(),
            text: text.into(),
        }
    }

    /// File stem, used to qualify statics and top-level labels.
    pub fn stem(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    pub bootstrap: bool,
    pub entry: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            bootstrap: true,
            entry: DEFAULT_ENTRY.to_string(),
        }
    }
}

pub struct Translated {
    pub asm: String,
    pub msgs: Msgs,
}

impl Translated {
    pub fn is_ok(&self) -> bool {
        !self.msgs.has_error()
    }
}

/// Translate all sources, in order, into one assembly program.
/// Bad lines are reported and skipped; translation always runs to the end.
pub fn translate(sources: &[Source], options: &Options) -> Translated {
    let mut writer = CodeWriter::new();
    let mut msgs = Msgs::new();

    if options.bootstrap {
        writer.bootstrap(&options.entry);
    }

    for source in sources {
        writer.set_file(&source.stem());
        for (idx, raw) in source.text.lines().enumerate() {
            let (line, err) = Line::parse(idx, raw);
            if let Some((err, kind)) = err {
                msgs.push(
                    Msg::error(err.to_string(), &source.name, line.no())
                        .kind(&kind)
                        .raw(line.raw()),
                );
                continue;
            }
            let Some(cmd) = &line.cmd else { continue };
            if let Err(err) = writer.write(cmd) {
                msgs.push(
                    Msg::error(err.to_string(), &source.name, line.no())
                        .kind(cmd.keyword())
                        .raw(line.raw()),
                );
            }
        }
    }

    Translated {
        asm: writer.finish(),
        msgs,
    }
}
