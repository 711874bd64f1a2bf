use crate::{comp::Comp, dest::Dest, jump::Jump};

use color_print::cformat;
use std::fmt;

/// Largest value an A-instruction can carry.
pub const ADDR_MAX: u16 = 0x7FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    A(u16),
    C(Dest, Comp, Jump),
}

impl Inst {
    /// `0vvv vvvv vvvv vvvv` or `111a cccc ccdd djjj`
    pub fn to_bin(&self) -> u16 {
        match self {
            Inst::A(addr) => addr & ADDR_MAX,
            Inst::C(dest, comp, jump) => {
                0b111 << 13 | comp.bits() << 6 | dest.bits() << 3 | jump.bits()
            }
        }
    }

    pub fn from_bin(bin: u16) -> Option<Inst> {
        if bin & 0x8000 == 0 {
            return Some(Inst::A(bin));
        }
        let comp = Comp::from_bits(bin >> 6)?;
        Some(Inst::C(Dest::from_bits(bin >> 3), comp, Jump::from_bits(bin)))
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::A(addr) => write!(f, "@{}", addr),
            Inst::C(dest, comp, jump) => {
                if *dest != Dest::Null {
                    write!(f, "{}=", dest)?;
                }
                write!(f, "{}", comp)?;
                if *jump != Jump::Null {
                    write!(f, ";{}", jump)?;
                }
                Ok(())
            }
        }
    }
}

impl Inst {
    pub fn cformat(&self) -> String {
        match self {
            Inst::A(addr) => cformat!("<r>@</><y>{}</>", addr),
            Inst::C(dest, comp, jump) => {
                let dest = match dest {
                    Dest::Null => String::new(),
                    _ => cformat!("<b>{}</>=", dest),
                };
                let jump = match jump {
                    Jump::Null => String::new(),
                    _ => cformat!(";<r>{}</>", jump),
                };
                cformat!("{}<g>{}</>{}", dest, comp, jump)
            }
        }
    }
}

/// One instruction word as a line of the `.hack` text format.
pub fn to_line(bin: u16) -> String {
    format!("{:016b}", bin)
}

pub fn parse_line(line: &str) -> Option<u16> {
    let line = line.trim();
    if line.len() != 16 || !line.chars().all(|c| c == '0' || c == '1') {
        return None;
    }
    u16::from_str_radix(line, 2).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_bin {
        ($($name:ident: $inst:expr => $bin:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(to_line($inst.to_bin()), $bin);
                }
            )*
        }
    }

    test_bin! {
        a_small: Inst::A(2) => "0000000000000010",
        a_max: Inst::A(ADDR_MAX) => "0111111111111111",
        c_inc_d_jgt: Inst::C(Dest::D, Comp::DPlusOne, Jump::JGT) => "1110011111010001",
        c_am_m_minus_one: Inst::C(Dest::AM, Comp::MMinusOne, Jump::Null) => "1111110010101000",
        c_unconditional: Inst::C(Dest::Null, Comp::Zero, Jump::JMP) => "1110101010000111",
        c_m_eq_d: Inst::C(Dest::M, Comp::D, Jump::Null) => "1110001100001000",
    }

    #[test]
    fn disassemble() {
        assert_eq!(Inst::from_bin(0b1110011111010001), Some(Inst::C(Dest::D, Comp::DPlusOne, Jump::JGT)));
        assert_eq!(Inst::from_bin(21), Some(Inst::A(21)));
        assert_eq!(Inst::from_bin(0b1110111000000000), None);
    }

    #[test]
    fn display() {
        assert_eq!(Inst::A(17).to_string(), "@17");
        assert_eq!(Inst::C(Dest::MD, Comp::MPlusOne, Jump::Null).to_string(), "MD=M+1");
        assert_eq!(Inst::C(Dest::Null, Comp::D, Jump::JNE).to_string(), "D;JNE");
    }

    #[test]
    fn text_format() {
        assert_eq!(parse_line("0000000000000010"), Some(2));
        assert_eq!(parse_line("1111111111111111\r"), Some(0xFFFF));
        assert_eq!(parse_line("000000000000001"), None);
        assert_eq!(parse_line("000000000000002x"), None);
    }
}
