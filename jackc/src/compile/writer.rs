use vmt::command::{ArithOp, Command, Segment};

/// Collects emitted bytecode commands in program order.
#[derive(Debug, Default)]
pub struct VmWriter {
    cmds: Vec<Command>,
}

impl VmWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, seg: Segment, idx: u16) {
        self.cmds.push(Command::Push(seg, idx));
    }

    pub fn pop(&mut self, seg: Segment, idx: u16) {
        self.cmds.push(Command::Pop(seg, idx));
    }

    pub fn arith(&mut self, op: ArithOp) {
        self.cmds.push(Command::Arith(op));
    }

    pub fn label(&mut self, name: String) {
        self.cmds.push(Command::Label(name));
    }

    pub fn goto(&mut self, name: String) {
        self.cmds.push(Command::Goto(name));
    }

    pub fn if_goto(&mut self, name: String) {
        self.cmds.push(Command::IfGoto(name));
    }

    pub fn call(&mut self, name: &str, args: u16) {
        self.cmds.push(Command::Call(name.to_string(), args));
    }

    pub fn function(&mut self, name: &str, locals: u16) {
        self.cmds.push(Command::Function(name.to_string(), locals));
    }

    pub fn ret(&mut self) {
        self.cmds.push(Command::Return);
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.cmds
    }
}
