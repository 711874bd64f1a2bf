use indexmap::IndexMap;
use std::collections::HashMap;
use strum::Display;
use vmt::command::Segment;

/// Storage class of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Kind {
    Static,
    Field,
    Arg,
    Var,
}

impl Kind {
    pub fn segment(self) -> Segment {
        match self {
            Kind::Static => Segment::Static,
            Kind::Field => Segment::This,
            Kind::Arg => Segment::Argument,
            Kind::Var => Segment::Local,
        }
    }

    fn is_class_scope(self) -> bool {
        matches!(self, Kind::Static | Kind::Field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub ty: String,
    pub kind: Kind,
    pub index: u16,
}

/// Class scope (static, field) and subroutine scope (arg, var).
#[derive(Debug, Default)]
pub struct SymbolTable {
    class: IndexMap<String, Symbol>,
    sub: IndexMap<String, Symbol>,
    counts: HashMap<Kind, u16>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_class(&mut self) {
        self.class.clear();
        self.sub.clear();
        self.counts.clear();
    }

    pub fn start_subroutine(&mut self) {
        self.sub.clear();
        self.counts.remove(&Kind::Arg);
        self.counts.remove(&Kind::Var);
    }

    /// Bind `name` to the next slot of `kind`. A repeated name gets a fresh slot.
    pub fn define(&mut self, name: &str, ty: &str, kind: Kind) -> u16 {
        let count = self.counts.entry(kind).or_insert(0);
        let index = *count;
        *count += 1;
        let symbol = Symbol {
            ty: ty.to_string(),
            kind,
            index,
        };
        if kind.is_class_scope() {
            self.class.insert(name.to_string(), symbol);
        } else {
            self.sub.insert(name.to_string(), symbol);
        }
        index
    }

    /// Whether `name` is already bound in the scope `kind` belongs to.
    pub fn is_defined_in_scope(&self, name: &str, kind: Kind) -> bool {
        if kind.is_class_scope() {
            self.class.contains_key(name)
        } else {
            self.sub.contains_key(name)
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.sub.get(name).or_else(|| self.class.get(name))
    }

    pub fn count(&self, kind: Kind) -> u16 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_per_kind() {
        let mut table = SymbolTable::new();
        assert_eq!(table.define("x", "int", Kind::Field), 0);
        assert_eq!(table.define("y", "int", Kind::Field), 1);
        assert_eq!(table.define("n", "int", Kind::Static), 0);
        assert_eq!(table.define("a", "Array", Kind::Arg), 0);
        assert_eq!(table.define("i", "int", Kind::Var), 0);
        assert_eq!(table.count(Kind::Field), 2);
        assert_eq!(table.count(Kind::Var), 1);
        assert_eq!(table.lookup("a").map(|s| s.kind.segment()), Some(Segment::Argument));
    }

    #[test]
    fn subroutine_scope_shadows_class_scope() {
        let mut table = SymbolTable::new();
        table.define("x", "int", Kind::Field);
        table.define("x", "char", Kind::Var);
        assert_eq!(table.lookup("x").map(|s| s.kind), Some(Kind::Var));

        table.start_subroutine();
        assert_eq!(table.lookup("x").map(|s| s.kind), Some(Kind::Field));
        assert_eq!(table.count(Kind::Var), 0);
        assert_eq!(table.count(Kind::Field), 1);

        table.start_class();
        assert!(table.lookup("x").is_none());
    }

    #[test]
    fn redefinition_takes_fresh_slot() {
        let mut table = SymbolTable::new();
        table.define("i", "int", Kind::Var);
        assert!(table.is_defined_in_scope("i", Kind::Var));
        assert!(!table.is_defined_in_scope("i", Kind::Field));
        assert_eq!(table.define("i", "int", Kind::Var), 1);
        assert_eq!(table.lookup("i").map(|s| s.index), Some(1));
    }
}
