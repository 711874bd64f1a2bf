use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const SP: u16 = 0;
pub const LCL: u16 = 1;
pub const ARG: u16 = 2;
pub const THIS: u16 = 3;
pub const THAT: u16 = 4;

/// `temp 0..7` lives in R5..R12.
pub const TEMP_BASE: u16 = 5;
pub const TEMP_SIZE: u16 = 8;

/// First address handed out to assembler variables.
pub const VAR_BASE: u16 = 16;
/// Initial stack pointer set by the bootstrap.
pub const STACK_BASE: u16 = 256;

pub const SCREEN: u16 = 0x4000;
pub const KBD: u16 = 0x6000;

/// Memory words addressable by the CPU.
pub const RAM_SIZE: usize = 0x8000;
pub const ROM_SIZE: usize = 0x8000;

/// Names every assembly program starts with.
pub static PREDEFINED: Lazy<HashMap<String, u16>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (name, addr) in [
        ("SP", SP),
        ("LCL", LCL),
        ("ARG", ARG),
        ("THIS", THIS),
        ("THAT", THAT),
        ("SCREEN", SCREEN),
        ("KBD", KBD),
    ] {
        map.insert(name.to_string(), addr);
    }
    for n in 0..16 {
        map.insert(format!("R{n}"), n);
    }
    map
});

pub fn predefined(name: &str) -> Option<u16> {
    PREDEFINED.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers() {
        assert_eq!(predefined("SP"), Some(0));
        assert_eq!(predefined("THAT"), Some(4));
        assert_eq!(predefined("R13"), Some(13));
        assert_eq!(predefined("R16"), None);
        assert_eq!(predefined("KBD"), Some(24576));
        assert_eq!(PREDEFINED.len(), 23);
    }
}
