pub mod dump;

use crate::model::State;

/// Side effect run around the instruction loop.
pub trait Hook {
    fn init(&mut self, state: State) -> State;
    fn exec(&mut self, time: u64, addr: u16, code: u16, state: State) -> State;
}
