use num_enum::{FromPrimitive, IntoPrimitive};
use strum::{Display, EnumString};

/// Destination field of a C-instruction. Discriminants are the `d1 d2 d3` bits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, FromPrimitive, IntoPrimitive, EnumString, Display,
)]
#[repr(u8)]
pub enum Dest {
    #[default]
    #[strum(to_string = "", serialize = "null")]
    Null = 0b000,
    M = 0b001,
    D = 0b010,
    #[strum(to_string = "MD", serialize = "DM")]
    MD = 0b011,
    A = 0b100,
    AM = 0b101,
    AD = 0b110,
    AMD = 0b111,
}

impl Dest {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(dest) => Ok(dest),
            Err(_) => Err(format!("Unknown destination: `{s}`")),
        }
    }

    pub fn bits(self) -> u16 {
        u8::from(self) as u16
    }

    pub fn from_bits(bits: u16) -> Self {
        Dest::from((bits & 0b111) as u8)
    }

    pub fn a(self) -> bool {
        self.bits() & 0b100 != 0
    }

    pub fn d(self) -> bool {
        self.bits() & 0b010 != 0
    }

    pub fn m(self) -> bool {
        self.bits() & 0b001 != 0
    }
}
