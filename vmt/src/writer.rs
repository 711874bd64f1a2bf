use arch::symbol::{STACK_BASE, TEMP_BASE, TEMP_SIZE};

use crate::{
    command::{ArithOp, Command, Segment},
    error::Error,
};

macro_rules! emit {
    ($w:expr, $($line:expr),+ $(,)?) => {
        { $( $w.out.push(String::from($line)); )+ }
    };
}

/// Largest value `push constant` can load through an A-instruction.
const CONSTANT_MAX: u16 = 0x7FFF;

#[derive(Debug, Default)]
struct Counters {
    eq: usize,
    gt: usize,
    lt: usize,
    ret: usize,
}

/// Emits Hack assembly for stack machine commands.
///
/// Generated labels end in `$<n>`. Bytecode names cannot contain `$`, so they
/// never collide with the `<function>$<label>` names of user labels.
///
/// Memory layout: `SP` points one past the top of the stack, `LCL`/`ARG`/`THIS`/`THAT`
/// hold segment bases, temp lives at `R5..R12`, `R13`/`R14` are scratch for return.
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: Vec<String>,
    file: String,
    function: Option<String>,
    counters: Counters,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start translating a new source file. `name` is the file stem used for statics.
    pub fn set_file(&mut self, name: &str) {
        self.file = name.to_string();
        self.function = None;
    }

    /// `SP = 256`, `call entry 0`, then halt once the entry function returns.
    pub fn bootstrap(&mut self, entry: &str) {
        emit!(self, "// bootstrap", format!("@{}", STACK_BASE), "D=A", "@SP", "M=D");
        self.write_call(entry, 0);
        emit!(self, "(bootstrap$halt$0)", "@bootstrap$halt$0", "0;JMP");
    }

    pub fn write(&mut self, cmd: &Command) -> Result<(), Error> {
        let mark = self.out.len();
        self.out.push(format!("// {}", cmd));
        let res = match cmd {
            Command::Arith(op) => {
                self.write_arith(*op);
                Ok(())
            }
            Command::Push(seg, idx) => self.write_push(*seg, *idx),
            Command::Pop(seg, idx) => self.write_pop(*seg, *idx),
            Command::Label(name) => {
                let label = self.label(name);
                emit!(self, format!("({})", label));
                Ok(())
            }
            Command::Goto(name) => {
                let label = self.label(name);
                emit!(self, format!("@{}", label), "0;JMP");
                Ok(())
            }
            Command::IfGoto(name) => {
                let label = self.label(name);
                self.pop_d();
                emit!(self, format!("@{}", label), "D;JNE");
                Ok(())
            }
            Command::Function(name, locals) => {
                self.write_function(name, *locals);
                Ok(())
            }
            Command::Call(name, args) => {
                self.write_call(name, *args);
                Ok(())
            }
            Command::Return => {
                self.write_return();
                Ok(())
            }
        };
        if res.is_err() {
            self.out.truncate(mark);
        }
        res
    }

    pub fn finish(self) -> String {
        let mut text = self.out.join("\n");
        text.push('\n');
        text
    }

    // ------------------------------------------------------------------------
    // Stack helpers

    /// `*SP++ = D`
    fn push_d(&mut self) {
        emit!(self, "@SP", "AM=M+1", "A=A-1", "M=D");
    }

    /// `D = *--SP`
    fn pop_d(&mut self) {
        emit!(self, "@SP", "AM=M-1", "D=M");
    }

    fn label(&self, name: &str) -> String {
        match &self.function {
            Some(func) => format!("{}${}", func, name),
            None => format!("{}${}", self.file, name),
        }
    }

    // ------------------------------------------------------------------------
    // Arithmetic

    fn write_arith(&mut self, op: ArithOp) {
        if op.is_unary() {
            let comp = match op {
                ArithOp::Neg => "M=-M",
                _ => "M=!M",
            };
            emit!(self, "@SP", "A=M-1", comp);
            return;
        }

        self.pop_d();
        emit!(self, "A=A-1");
        match op {
            ArithOp::Add => emit!(self, "M=D+M"),
            ArithOp::Sub => emit!(self, "M=M-D"),
            ArithOp::And => emit!(self, "M=D&M"),
            ArithOp::Or => emit!(self, "M=D|M"),
            _ => self.write_compare(op),
        }
    }

    /// Top of stack becomes `-1` when `x op y` holds, else `0`.
    fn write_compare(&mut self, op: ArithOp) {
        let (kind, jump, n) = match op {
            ArithOp::Eq => ("EQ", "JEQ", &mut self.counters.eq),
            ArithOp::Gt => ("GT", "JGT", &mut self.counters.gt),
            _ => ("LT", "JLT", &mut self.counters.lt),
        };
        let label = format!("{}_TRUE${}", kind, n);
        *n += 1;
        emit!(
            self,
            "D=M-D",
            "M=-1",
            format!("@{}", label),
            format!("D;{}", jump),
            "@SP",
            "A=M-1",
            "M=0",
            format!("({})", label),
        );
    }

    // ------------------------------------------------------------------------
    // Memory access

    fn check_range(seg: Segment, idx: u16) -> Result<(), Error> {
        let max = match seg {
            Segment::Pointer => 1,
            Segment::Temp => TEMP_SIZE - 1,
            Segment::Constant => CONSTANT_MAX,
            _ => return Ok(()),
        };
        if idx > max {
            return Err(Error::IndexOutOfRange(seg, idx, max));
        }
        Ok(())
    }

    /// Fixed address for segments that do not go through a base pointer.
    fn direct(&self, seg: Segment, idx: u16) -> Option<String> {
        match seg {
            Segment::Static => Some(format!("{}.{}", self.file, idx)),
            Segment::Temp => Some((TEMP_BASE + idx).to_string()),
            Segment::Pointer if idx == 0 => Some("THIS".to_string()),
            Segment::Pointer => Some("THAT".to_string()),
            _ => None,
        }
    }

    fn base(seg: Segment) -> &'static str {
        match seg {
            Segment::Local => "LCL",
            Segment::Argument => "ARG",
            Segment::This => "THIS",
            _ => "THAT",
        }
    }

    fn write_push(&mut self, seg: Segment, idx: u16) -> Result<(), Error> {
        Self::check_range(seg, idx)?;
        if seg == Segment::Constant {
            emit!(self, format!("@{}", idx), "D=A");
        } else if let Some(addr) = self.direct(seg, idx) {
            emit!(self, format!("@{}", addr), "D=M");
        } else {
            emit!(
                self,
                format!("@{}", Self::base(seg)),
                "D=M",
                format!("@{}", idx),
                "A=D+A",
                "D=M",
            );
        }
        self.push_d();
        Ok(())
    }

    fn write_pop(&mut self, seg: Segment, idx: u16) -> Result<(), Error> {
        if seg == Segment::Constant {
            return Err(Error::PopConstant);
        }
        Self::check_range(seg, idx)?;
        if let Some(addr) = self.direct(seg, idx) {
            self.pop_d();
            emit!(self, format!("@{}", addr), "M=D");
        } else {
            emit!(
                self,
                format!("@{}", Self::base(seg)),
                "D=M",
                format!("@{}", idx),
                "D=D+A",
                "@R13",
                "M=D",
            );
            self.pop_d();
            emit!(self, "@R13", "A=M", "M=D");
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Functions

    fn write_function(&mut self, name: &str, locals: u16) {
        self.function = Some(name.to_string());
        emit!(self, format!("({})", name));
        if locals > 0 {
            emit!(self, "D=0");
            for _ in 0..locals {
                self.push_d();
            }
        }
    }

    fn write_call(&mut self, name: &str, args: u16) {
        let scope = self.function.clone().unwrap_or_else(|| match self.file.as_str() {
            "" => "bootstrap".to_string(),
            file => file.to_string(),
        });
        let ret = format!("{}$ret${}", scope, self.counters.ret);
        self.counters.ret += 1;

        emit!(self, format!("@{}", ret), "D=A");
        self.push_d();
        for reg in ["LCL", "ARG", "THIS", "THAT"] {
            emit!(self, format!("@{}", reg), "D=M");
            self.push_d();
        }
        emit!(
            self,
            "@SP",
            "D=M",
            "@LCL",
            "M=D",
            format!("@{}", args as u32 + 5),
            "D=D-A",
            "@ARG",
            "M=D",
            format!("@{}", name),
            "0;JMP",
            format!("({})", ret),
        );
    }

    fn write_return(&mut self) {
        emit!(
            self,
            // R13 = frame
            "@LCL",
            "D=M",
            "@R13",
            "M=D",
            // R14 = return address
            "@5",
            "A=D-A",
            "D=M",
            "@R14",
            "M=D",
        );
        // *ARG = return value
        self.pop_d();
        emit!(self, "@ARG", "A=M", "M=D", "@ARG", "D=M+1", "@SP", "M=D");
        for reg in ["THAT", "THIS", "ARG", "LCL"] {
            emit!(self, "@R13", "AM=M-1", "D=M", format!("@{}", reg), "M=D");
        }
        emit!(self, "@R14", "A=M", "0;JMP");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(w: &CodeWriter) -> Vec<&str> {
        w.out.iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn compare_labels_are_unique_per_kind() {
        let mut w = CodeWriter::new();
        w.set_file("Main");
        w.write(&Command::Arith(ArithOp::Lt)).unwrap();
        w.write(&Command::Arith(ArithOp::Lt)).unwrap();
        w.write(&Command::Arith(ArithOp::Eq)).unwrap();
        let out = lines(&w);
        assert!(out.contains(&"(LT_TRUE$0)"));
        assert!(out.contains(&"(LT_TRUE$1)"));
        assert!(out.contains(&"(EQ_TRUE$0)"));
    }

    #[test]
    fn binary_ops_combine_in_place() {
        let mut w = CodeWriter::new();
        w.set_file("Main");
        for (op, comp) in [
            (ArithOp::Add, "M=D+M"),
            (ArithOp::Sub, "M=M-D"),
            (ArithOp::And, "M=D&M"),
            (ArithOp::Or, "M=D|M"),
        ] {
            w.write(&Command::Arith(op)).unwrap();
            let out = lines(&w);
            assert_eq!(&out[out.len() - 5..], &["@SP", "AM=M-1", "D=M", "A=A-1", comp]);
        }
    }

    #[test]
    fn labels_are_scoped() {
        let mut w = CodeWriter::new();
        w.set_file("Main");
        w.write(&Command::Label("TOP".into())).unwrap();
        w.write(&Command::Function("Main.loop".into(), 0)).unwrap();
        w.write(&Command::Goto("TOP".into())).unwrap();
        let out = lines(&w);
        assert!(out.contains(&"(Main$TOP)"));
        assert!(out.contains(&"@Main.loop$TOP"));
    }

    #[test]
    fn statics_use_file_name() {
        let mut w = CodeWriter::new();
        w.set_file("Foo");
        w.write(&Command::Pop(Segment::Static, 3)).unwrap();
        assert!(lines(&w).contains(&"@Foo.3"));
    }

    #[test]
    fn return_labels_count_globally() {
        let mut w = CodeWriter::new();
        w.set_file("Main");
        w.write(&Command::Function("Main.main".into(), 0)).unwrap();
        w.write(&Command::Call("Foo.f".into(), 0)).unwrap();
        w.set_file("Foo");
        w.write(&Command::Function("Foo.f".into(), 0)).unwrap();
        w.write(&Command::Call("Foo.g".into(), 1)).unwrap();
        let out = lines(&w);
        assert!(out.contains(&"(Main.main$ret$0)"));
        assert!(out.contains(&"(Foo.f$ret$1)"));
        assert!(out.contains(&"@6"));
    }

    #[test]
    fn range_errors_emit_nothing() {
        let mut w = CodeWriter::new();
        w.set_file("Main");
        assert!(matches!(
            w.write(&Command::Push(Segment::Temp, 8)),
            Err(Error::IndexOutOfRange(Segment::Temp, 8, 7))
        ));
        assert!(matches!(
            w.write(&Command::Pop(Segment::Pointer, 2)),
            Err(Error::IndexOutOfRange(Segment::Pointer, 2, 1))
        ));
        assert!(matches!(
            w.write(&Command::Pop(Segment::Constant, 0)),
            Err(Error::PopConstant)
        ));
        assert!(w.out.is_empty());
    }

    #[test]
    fn bootstrap_calls_entry() {
        let mut w = CodeWriter::new();
        w.bootstrap("Sys.init");
        let out = lines(&w);
        assert_eq!(&out[1..5], &["@256", "D=A", "@SP", "M=D"]);
        assert!(out.contains(&"@Sys.init"));
        assert!(out.contains(&"(bootstrap$ret$0)"));
        assert_eq!(
            &out[out.len() - 3..],
            &["(bootstrap$halt$0)", "@bootstrap$halt$0", "0;JMP"]
        );
    }

    #[test]
    fn user_labels_never_shadow_generated_ones() {
        let mut w = CodeWriter::new();
        w.set_file("Foo");
        w.write(&Command::Function("Foo.f".into(), 0)).unwrap();
        w.write(&Command::Label("ret.0".into())).unwrap();
        w.write(&Command::Label("EQ_TRUE".into())).unwrap();
        w.write(&Command::Call("Foo.g".into(), 0)).unwrap();
        w.write(&Command::Arith(ArithOp::Eq)).unwrap();
        let defs: Vec<&str> = lines(&w).into_iter().filter(|l| l.starts_with('(')).collect();
        assert_eq!(
            defs,
            ["(Foo.f)", "(Foo.f$ret.0)", "(Foo.f$EQ_TRUE)", "(Foo.f$ret$0)", "(EQ_TRUE$0)"]
        );
    }
}
