use arch::symbol::{PREDEFINED, VAR_BASE};
use indexmap::IndexMap;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Predefined,
    Label,
    Variable,
}

/// Name to address bindings. Bindings are never overwritten.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    map: IndexMap<String, (SymbolKind, u16)>,
    next_var: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut predefined: Vec<_> = PREDEFINED.iter().collect();
        predefined.sort_by_key(|(name, addr)| (**addr, name.as_str()));
        let map = predefined
            .into_iter()
            .map(|(name, addr)| (name.clone(), (SymbolKind::Predefined, *addr)))
            .collect();
        SymbolTable {
            map,
            next_var: VAR_BASE,
        }
    }

    /// Bind a label to the address of the next instruction.
    pub fn define_label(&mut self, name: &str, addr: u16) -> Result<(), Error> {
        if self.map.contains_key(name) {
            return Err(Error::RedefinedLabel(name.to_string()));
        }
        self.map.insert(name.to_string(), (SymbolKind::Label, addr));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.map.get(name).map(|(_, addr)| *addr)
    }

    pub fn kind(&self, name: &str) -> Option<SymbolKind> {
        self.map.get(name).map(|(kind, _)| *kind)
    }

    /// Look a symbol up, allocating it as a variable on first use.
    pub fn resolve(&mut self, name: &str) -> u16 {
        if let Some(addr) = self.get(name) {
            return addr;
        }
        let addr = self.next_var;
        self.next_var += 1;
        self.map
            .insert(name.to_string(), (SymbolKind::Variable, addr));
        addr
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolKind, u16)> {
        self.map
            .iter()
            .map(|(name, (kind, addr))| (name.as_str(), *kind, *addr))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}
