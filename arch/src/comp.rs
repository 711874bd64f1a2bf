use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Computation field of a C-instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter)]
pub enum Comp {
    #[strum(to_string = "0")]
    Zero,
    #[strum(to_string = "1")]
    One,
    #[strum(to_string = "-1")]
    MinusOne,
    #[strum(to_string = "D")]
    D,
    #[strum(to_string = "A")]
    A,
    #[strum(to_string = "!D")]
    NotD,
    #[strum(to_string = "!A")]
    NotA,
    #[strum(to_string = "-D")]
    NegD,
    #[strum(to_string = "-A")]
    NegA,
    #[strum(to_string = "D+1")]
    DPlusOne,
    #[strum(to_string = "A+1")]
    APlusOne,
    #[strum(to_string = "D-1")]
    DMinusOne,
    #[strum(to_string = "A-1")]
    AMinusOne,
    #[strum(to_string = "D+A", serialize = "A+D")]
    DPlusA,
    #[strum(to_string = "D-A")]
    DMinusA,
    #[strum(to_string = "A-D")]
    AMinusD,
    #[strum(to_string = "D&A", serialize = "A&D")]
    DAndA,
    #[strum(to_string = "D|A", serialize = "A|D")]
    DOrA,

    #[strum(to_string = "M")]
    M,
    #[strum(to_string = "!M")]
    NotM,
    #[strum(to_string = "-M")]
    NegM,
    #[strum(to_string = "M+1")]
    MPlusOne,
    #[strum(to_string = "M-1")]
    MMinusOne,
    #[strum(to_string = "D+M", serialize = "M+D")]
    DPlusM,
    #[strum(to_string = "D-M")]
    DMinusM,
    #[strum(to_string = "M-D")]
    MMinusD,
    #[strum(to_string = "D&M", serialize = "M&D")]
    DAndM,
    #[strum(to_string = "D|M", serialize = "M|D")]
    DOrM,
}

impl Comp {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(comp) => Ok(comp),
            Err(_) => Err(format!("Unknown computation: `{s}`")),
        }
    }

    /// Seven bits: the `a` source selector followed by `c1..c6`.
    pub fn bits(self) -> u16 {
        use Comp::*;
        match self {
            Zero => 0b0_101010,
            One => 0b0_111111,
            MinusOne => 0b0_111010,
            D => 0b0_001100,
            A => 0b0_110000,
            NotD => 0b0_001101,
            NotA => 0b0_110001,
            NegD => 0b0_001111,
            NegA => 0b0_110011,
            DPlusOne => 0b0_011111,
            APlusOne => 0b0_110111,
            DMinusOne => 0b0_001110,
            AMinusOne => 0b0_110010,
            DPlusA => 0b0_000010,
            DMinusA => 0b0_010011,
            AMinusD => 0b0_000111,
            DAndA => 0b0_000000,
            DOrA => 0b0_010101,
            M => 0b1_110000,
            NotM => 0b1_110001,
            NegM => 0b1_110011,
            MPlusOne => 0b1_110111,
            MMinusOne => 0b1_110010,
            DPlusM => 0b1_000010,
            DMinusM => 0b1_010011,
            MMinusD => 0b1_000111,
            DAndM => 0b1_000000,
            DOrM => 0b1_010101,
        }
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        Comp::iter().find(|comp| comp.bits() == bits & 0x7F)
    }

    /// Whether the `y` operand is read from memory instead of the A register.
    pub fn reads_memory(self) -> bool {
        self.bits() & 0b1_000000 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mnemonics() {
        assert_eq!(Comp::parse("D+1"), Ok(Comp::DPlusOne));
        assert_eq!(Comp::parse("0"), Ok(Comp::Zero));
        assert_eq!(Comp::parse("-1"), Ok(Comp::MinusOne));
        assert_eq!(Comp::parse("M+D"), Ok(Comp::DPlusM));
        assert_eq!(Comp::parse("A|D"), Ok(Comp::DOrA));
        assert!(Comp::parse("D+2").is_err());
        assert!(Comp::parse("d+1").is_err());
        assert!(Comp::parse("").is_err());
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(Comp::DPlusA.to_string(), "D+A");
        assert_eq!(Comp::MMinusOne.to_string(), "M-1");
        assert_eq!("A&D".parse::<Comp>().map(|c| c.to_string()), Ok("D&A".to_string()));
    }

    #[test]
    fn bit_patterns_are_unique() {
        let all: Vec<Comp> = Comp::iter().collect();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.bits(), b.bits(), "{a} and {b} share an encoding");
            }
        }
        assert_eq!(Comp::from_bits(0b1_110000), Some(Comp::M));
        assert_eq!(Comp::from_bits(0b0_111000), None);
    }

    #[test]
    fn memory_operand() {
        assert!(Comp::DPlusM.reads_memory());
        assert!(!Comp::DPlusA.reads_memory());
    }
}
