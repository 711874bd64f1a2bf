/// Hack ALU.
///
/// `ctrl` carries the six control bits `zx nx zy ny f no`, most significant first.
pub fn alu(ctrl: u8, x: u16, y: u16) -> u16 {
    let bit = |n: u8| (ctrl >> (5 - n)) & 1 == 1;

    let x = if bit(0) { 0 } else { x };
    let x = if bit(1) { !x } else { x };
    let y = if bit(2) { 0 } else { y };
    let y = if bit(3) { !y } else { y };
    let out = if bit(4) { x.wrapping_add(y) } else { x & y };
    if bit(5) {
        !out
    } else {
        out
    }
}
