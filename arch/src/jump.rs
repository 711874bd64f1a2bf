use num_enum::{FromPrimitive, IntoPrimitive};
use strum::{Display, EnumString};

/// Jump field of a C-instruction. Discriminants are the `j1 j2 j3` bits
/// (less-than, equal, greater-than).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, FromPrimitive, IntoPrimitive, EnumString, Display,
)]
#[repr(u8)]
pub enum Jump {
    #[default]
    #[strum(to_string = "", serialize = "null")]
    Null = 0b000,
    JGT = 0b001,
    JEQ = 0b010,
    JGE = 0b011,
    JLT = 0b100,
    JNE = 0b101,
    JLE = 0b110,
    JMP = 0b111,
}

impl Jump {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(jump) => Ok(jump),
            Err(_) => Err(format!("Unknown jump: `{s}`")),
        }
    }

    pub fn bits(self) -> u16 {
        u8::from(self) as u16
    }

    pub fn from_bits(bits: u16) -> Self {
        Jump::from((bits & 0b111) as u8)
    }

    /// Whether the jump is taken for the given ALU output.
    pub fn taken(self, out: u16) -> bool {
        let out = out as i16;
        let bits = self.bits();
        (bits & 0b100 != 0 && out < 0) || (bits & 0b010 != 0 && out == 0) || (bits & 0b001 != 0 && out > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!(Jump::parse(""), Ok(Jump::Null));
        assert_eq!(Jump::parse("JGT"), Ok(Jump::JGT));
        assert!(Jump::parse("JXX").is_err());
    }

    #[test]
    fn conditions() {
        assert!(Jump::JGT.taken(1));
        assert!(!Jump::JGT.taken(0));
        assert!(Jump::JLT.taken(0xFFFF));
        assert!(Jump::JLE.taken(0));
        assert!(Jump::JNE.taken(0x8000));
        assert!(Jump::JMP.taken(0));
        assert!(!Jump::Null.taken(0));
    }
}
