use arch::{
    alu::alu,
    dest::Dest,
    inst::{self, Inst},
    jump::Jump,
    symbol::{RAM_SIZE, ROM_SIZE},
};

use crate::error::Error;

/// Machine state: 32K words of ROM and RAM plus the `A`, `D` and `PC` registers.
pub struct State {
    rom: Vec<u16>,
    ram: Vec<u16>,
    len: usize,
    a: u16,
    d: u16,
    pc: u16,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

// Memory access
impl State {
    pub fn get(&self, addr: u16) -> u16 {
        self.ram[addr as usize % RAM_SIZE]
    }

    pub fn set(&mut self, addr: u16, val: u16) {
        self.ram[addr as usize % RAM_SIZE] = val;
    }

    pub fn a(&self) -> u16 {
        self.a
    }

    pub fn d(&self) -> u16 {
        self.d
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Number of words loaded into ROM.
    pub fn program_len(&self) -> usize {
        self.len
    }

    pub fn rom(&self, addr: u16) -> u16 {
        self.rom[addr as usize % ROM_SIZE]
    }
}

impl State {
    pub fn new() -> Self {
        State {
            rom: vec![0; ROM_SIZE],
            ram: vec![0; RAM_SIZE],
            len: 0,
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    pub fn load(&mut self, words: &[u16]) -> Result<(), Error> {
        if words.len() > ROM_SIZE {
            return Err(Error::ProgramTooLarge(words.len()));
        }
        self.rom.fill(0);
        self.rom[..words.len()].copy_from_slice(words);
        self.len = words.len();
        self.pc = 0;
        Ok(())
    }

    /// Load a program in the `.hack` text format. Blank lines are skipped.
    pub fn load_text(&mut self, text: &str) -> Result<(), Error> {
        let mut words = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let word =
                inst::parse_line(line).ok_or_else(|| Error::InvalidWord(idx + 1, line.to_string()))?;
            words.push(word);
        }
        self.load(&words)
    }

    pub fn load_rom_file(&mut self, fname: &str) -> Result<(), Error> {
        let text =
            std::fs::read_to_string(fname).map_err(|e| Error::FileOpen(fname.to_string(), e))?;
        self.load_text(&text)
    }

    /// True once `PC` has left the program, or sits on the `(L) @L 0;JMP` halt loop.
    pub fn is_terminated(&self) -> bool {
        let pc = self.pc as usize;
        if pc >= self.len {
            return true;
        }
        if pc == 0 {
            return false;
        }
        let is_jmp = matches!(Inst::from_bin(self.rom[pc]), Some(Inst::C(Dest::Null, _, Jump::JMP)));
        is_jmp && self.rom[pc - 1] == (pc - 1) as u16 && self.a == (pc - 1) as u16
    }

    /// Execute one instruction. Returns the address and word executed.
    pub fn exec(&mut self, _time: u64) -> (u16, u16) {
        let pc = self.pc;
        let code = self.rom(pc);

        let (dest, comp, jump) = match Inst::from_bin(code) {
            Some(Inst::C(dest, comp, jump)) => (dest, comp, jump),
            Some(Inst::A(addr)) => {
                self.a = addr;
                self.pc = pc.wrapping_add(1);
                return (pc, code);
            }
            // computation bits outside the ALU table: no-op
            None => {
                self.pc = pc.wrapping_add(1);
                return (pc, code);
            }
        };

        let a = self.a;
        let y = if comp.reads_memory() { self.get(a) } else { a };
        let out = alu((comp.bits() & 0x3F) as u8, self.d, y);

        // M is addressed by A as it was before this instruction.
        if dest.m() {
            self.set(a, out);
        }
        if dest.d() {
            self.d = out;
        }
        if dest.a() {
            self.a = out;
        }

        self.pc = if jump.taken(out) {
            a
        } else {
            pc.wrapping_add(1)
        };
        (pc, code)
    }

    /// Run until termination or `max_steps` instructions. Returns the steps taken.
    pub fn run(&mut self, max_steps: u64) -> u64 {
        let mut time = 0;
        while time < max_steps && !self.is_terminated() {
            self.exec(time);
            time += 1;
        }
        time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch::comp::Comp;

    fn program(insts: &[Inst]) -> State {
        let words: Vec<u16> = insts.iter().map(Inst::to_bin).collect();
        let mut state = State::new();
        state.load(&words).unwrap();
        state
    }

    #[test]
    fn add_two_constants() {
        let mut state = program(&[
            Inst::A(2),
            Inst::C(Dest::D, Comp::A, Jump::Null),
            Inst::A(3),
            Inst::C(Dest::D, Comp::DPlusA, Jump::Null),
            Inst::A(0),
            Inst::C(Dest::M, Comp::D, Jump::Null),
        ]);
        assert_eq!(state.run(100), 6);
        assert_eq!(state.get(0), 5);
        assert!(state.is_terminated());
    }

    #[test]
    fn memory_write_uses_old_a() {
        let mut state = program(&[Inst::A(7), Inst::C(Dest::AM, Comp::One, Jump::Null)]);
        state.run(10);
        assert_eq!(state.get(7), 1);
        assert_eq!(state.a(), 1);
    }

    #[test]
    fn halt_loop_terminates() {
        let mut state = program(&[
            Inst::A(1),
            Inst::C(Dest::D, Comp::A, Jump::Null),
            Inst::A(2),
            Inst::C(Dest::Null, Comp::Zero, Jump::JMP),
        ]);
        assert_eq!(state.run(1000), 3);
        assert_eq!(state.pc(), 3);
        assert_eq!(state.d(), 1);
    }

    #[test]
    fn conditional_jump() {
        // if D < 0 goto 6 else R1 = 1
        let mut state = program(&[
            Inst::A(1),
            Inst::C(Dest::D, Comp::NegA, Jump::Null),
            Inst::A(6),
            Inst::C(Dest::Null, Comp::D, Jump::JLT),
            Inst::A(1),
            Inst::C(Dest::M, Comp::One, Jump::Null),
        ]);
        state.run(100);
        assert_eq!(state.get(1), 0);
        assert_eq!(state.pc(), 6);
    }

    #[test]
    fn reads_memory_when_a_bit_set() {
        let mut state = program(&[
            Inst::A(9),
            Inst::C(Dest::D, Comp::A, Jump::Null),
            Inst::C(Dest::AMD, Comp::DPlusM, Jump::Null),
        ]);
        state.set(9, 30);
        state.run(10);
        assert_eq!(state.get(9), 39);
        assert_eq!(state.d(), 39);
        assert_eq!(state.a(), 39);
    }

    #[test]
    fn unknown_computation_is_skipped() {
        // dest D with comp bits 000001, which no mnemonic encodes
        let mut state = State::new();
        let load_d = Inst::C(Dest::D, Comp::A, Jump::Null).to_bin();
        state.load(&[5, load_d, 0xE050]).unwrap();
        assert_eq!(state.run(10), 3);
        assert_eq!(state.d(), 5);
        assert_eq!(state.pc(), 3);
    }

    #[test]
    fn text_format() {
        let mut state = State::new();
        state.load_text("0000000000000101\n\n1110110000010000\n").unwrap();
        assert_eq!(state.program_len(), 2);
        state.run(10);
        assert_eq!(state.d(), 5);

        assert!(matches!(
            state.load_text("0101\n"),
            Err(Error::InvalidWord(1, _))
        ));
    }
}
