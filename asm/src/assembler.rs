use arch::{
    comp::Comp,
    dest::Dest,
    inst::{self, Inst},
    jump::Jump,
    msg::{Msg, Msgs},
    symbol::ROM_SIZE,
};

use crate::{
    error::Error,
    parser::{Imm, Line, Stmt},
    symbol::SymbolTable,
};

/// Result of one assembly run.
pub struct Assembled {
    pub lines: Vec<Line>,
    pub words: Vec<u16>,
    pub symbols: SymbolTable,
    pub msgs: Msgs,
}

impl Assembled {
    pub fn is_ok(&self) -> bool {
        !self.msgs.has_error()
    }

    /// `.hack` text: one 16-character line per word.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.words.len() * 17);
        for word in &self.words {
            text.push_str(&inst::to_line(*word));
            text.push('\n');
        }
        text
    }
}

pub fn assemble(file: &str, source: &str) -> Assembled {
    let mut asm = Assembler::new(file);
    let mut lines = asm.parse(source);
    asm.bind_labels(&mut lines);
    let words = asm.generate(&mut lines);
    Assembled {
        lines,
        words,
        symbols: asm.symbols,
        msgs: asm.msgs,
    }
}

struct Assembler<'a> {
    file: &'a str,
    symbols: SymbolTable,
    msgs: Msgs,
}

impl<'a> Assembler<'a> {
    fn new(file: &'a str) -> Self {
        Assembler {
            file,
            symbols: SymbolTable::new(),
            msgs: Msgs::new(),
        }
    }

    fn report(&mut self, err: Error, line: &Line, kind: &str) {
        self.msgs.push(
            Msg::error(err.to_string(), self.file, line.no())
                .kind(kind)
                .raw(line.raw()),
        );
    }

    fn parse(&mut self, source: &str) -> Vec<Line> {
        let mut lines = Vec::new();
        for (idx, raw) in source.lines().enumerate() {
            let (line, err) = Line::parse(idx, raw);
            if let Some(err) = err {
                self.report(err, &line, "syntax");
            }
            lines.push(line);
        }
        lines
    }

    /// Pass 1: bind every label to the address of the next instruction.
    fn bind_labels(&mut self, lines: &mut [Line]) {
        let mut pc: usize = 0;
        for line in lines.iter_mut() {
            match &line.stmt {
                Some(Stmt::Label(name)) => {
                    let name = name.clone();
                    if let Err(err) = self.symbols.define_label(&name, pc as u16) {
                        self.report(err, line, "label");
                    }
                }
                Some(stmt) => {
                    if pc == ROM_SIZE {
                        let kind = stmt.kind();
                        self.report(Error::ProgramOverflow(line.raw().trim().to_string()), line, kind);
                    }
                    line.pc = Some(pc as u16);
                    pc += 1;
                }
                None => {}
            }
        }
    }

    /// Pass 2: encode instructions in source order, allocating variables on first use.
    fn generate(&mut self, lines: &mut [Line]) -> Vec<u16> {
        let mut words = Vec::new();
        for line in lines.iter_mut() {
            let bin = match &line.stmt {
                Some(Stmt::A(Imm::Literal(value))) => Inst::A(*value).to_bin(),
                Some(Stmt::A(Imm::Symbol(name))) => Inst::A(self.symbols.resolve(name)).to_bin(),
                Some(Stmt::C { dest, comp, jump }) => match encode(dest, comp, jump) {
                    Ok(inst) => inst.to_bin(),
                    Err(err) => {
                        self.report(err, line, "compute");
                        0
                    }
                },
                Some(Stmt::Label(_)) | None => continue,
            };
            line.bin = Some(bin);
            words.push(bin);
        }
        words
    }
}

fn encode(dest: &str, comp: &str, jump: &str) -> Result<Inst, Error> {
    if comp.is_empty() {
        return Err(Error::MissingComp);
    }
    let comp = Comp::parse(comp).map_err(|_| Error::UnknownComp(comp.to_string()))?;
    let dest = Dest::parse(dest).map_err(|_| Error::UnknownDest(dest.to_string()))?;
    let jump = Jump::parse(jump).map_err(|_| Error::UnknownJump(jump.to_string()))?;
    Ok(Inst::C(dest, comp, jump))
}
