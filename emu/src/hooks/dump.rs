use arch::{
    inst::Inst,
    symbol::{ARG, LCL, SP, STACK_BASE, THAT, THIS},
};
use color_print::cprintln;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

use crate::{error::Error, model::State};

use super::Hook;

/// Prints machine state when execution reaches configured ROM addresses.
#[derive(Debug)]
pub struct Dump {
    file: Option<String>,
    all: bool,
    list: List,
}

/// ROM address -> what to print when that address executes.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct List(pub HashMap<u16, Config>);

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stack: bool,
    #[serde(default)]
    pub heap: Vec<u16>,
}

impl Dump {
    pub fn arg(file: Option<String>, all: bool) -> Result<Self, Error> {
        let list = match &file {
            Some(fname) => {
                let f = File::open(fname).map_err(|e| Error::FileOpen(fname.clone(), e))?;
                serde_yaml::from_reader(BufReader::new(f))
                    .map_err(|e| Error::DumpConfig(fname.clone(), e))?
            }
            None => List::default(),
        };
        Ok(Self { file, all, list })
    }

    pub fn from_list(list: List, all: bool) -> Self {
        Self {
            file: None,
            all,
            list,
        }
    }

    fn get(&self, pc: u16) -> Option<&Config> {
        self.list.0.get(&pc)
    }
}

impl Hook for Dump {
    fn init(&mut self, state: State) -> State {
        if self.all {
            println!(" * Dump all");
        }
        if let Some(fname) = &self.file {
            println!(" * Dump[{}] {:?}", self.list.0.len(), fname);
        }
        state
    }

    fn exec(&mut self, time: u64, addr: u16, code: u16, cpu: State) -> State {
        if let Some(cfg) = self.get(addr) {
            self.print_inst(time, addr, code);
            self.print_reg(&cpu);
            if cfg.stack {
                self.print_stack(&cpu);
            }
            self.print_heap(&cpu, &cfg.heap);
        } else if self.all {
            self.print_inst(time, addr, code);
            self.print_reg(&cpu);
        }
        cpu
    }
}

impl Dump {
    fn print_inst(&self, time: u64, addr: u16, code: u16) {
        match Inst::from_bin(code) {
            Some(inst) => cprintln!("[{:0>6}] {:0>4X}: {}", time, addr, inst.cformat()),
            None => cprintln!("[{:0>6}] {:0>4X}: <red>{:016b}</>", time, addr, code),
        }
    }

    fn print_reg(&self, cpu: &State) {
        println!(" +-----------+-----------+-----------+-----------+");
        println!(
            " |  A: {:0>4X} |  D: {:0>4X} | PC: {:0>4X} | SP: {:0>4X} |",
            cpu.a(),
            cpu.d(),
            cpu.pc(),
            cpu.get(SP)
        );
        println!(
            " |LCL: {:0>4X} |ARG: {:0>4X} |THS: {:0>4X} |THT: {:0>4X} |",
            cpu.get(LCL),
            cpu.get(ARG),
            cpu.get(THIS),
            cpu.get(THAT)
        );
        println!(" +-----------+-----------+-----------+-----------+");
    }

    fn print_stack(&self, cpu: &State) {
        let sp = cpu.get(SP);
        for addr in STACK_BASE..sp {
            println!(" | {:0>4X} : {:0>4X}  {:>6}", addr, cpu.get(addr), cpu.get(addr) as i16);
        }
        println!(" +-----------------------------------------------+");
    }

    fn print_heap(&self, cpu: &State, addrs: &[u16]) {
        for addr in addrs {
            println!(" | {:0>4X} : {:0>4X}  {:>6}", addr, cpu.get(*addr), cpu.get(*addr) as i16);
        }
        if !addrs.is_empty() {
            println!(" +-----------------------------------------------+");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_yaml() {
        let list: List = serde_yaml::from_str("12:\n  stack: true\n  heap: [16, 17]\n40: {}\n").unwrap();
        assert!(list.0[&12].stack);
        assert_eq!(list.0[&12].heap, vec![16, 17]);
        assert!(!list.0[&40].stack);

        let mut dump = Dump::from_list(list, false);
        let state = dump.exec(0, 5, 0, State::new());
        assert_eq!(state.pc(), 0);
    }
}
