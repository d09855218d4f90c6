use std::ops::Range;

use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use miette::SourceSpan;

// Symbol table of label -> address or EQU value
type FxMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Labels allowed in a single assembly.
pub const MAX_LABELS: usize = 1024;
/// Significant characters of a label. Anything after is ignored.
pub const MAX_LABEL_LEN: usize = 31;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InsertError {
    /// Already defined. The first definition is kept.
    Duplicate,
    /// Table holds [`MAX_LABELS`] entries.
    Full,
}

/// Case-insensitive label table, built fresh for every assembly.
#[derive(Clone, Default, Debug)]
pub struct SymbolTable {
    map: FxMap<String, u16>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.chars()
            .take(MAX_LABEL_LEN)
            .map(|c| c.to_ascii_uppercase())
            .collect()
    }

    pub fn insert(&mut self, name: &str, value: u16) -> Result<(), InsertError> {
        let key = Self::key(name);
        if self.map.contains_key(&key) {
            return Err(InsertError::Duplicate);
        }
        if self.map.len() >= MAX_LABELS {
            return Err(InsertError::Full);
        }
        self.map.insert(key, value);
        Ok(())
    }

    /// Rebind an existing label. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: u16) {
        if let Some(slot) = self.map.get_mut(&Self::key(name)) {
            *slot = value;
        }
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.map.get(&Self::key(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Labels in definition order, with their stored (upper-cased) names.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.map.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

/// Location within source
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Span {
    offs: SrcOffset,
    len: usize,
}

impl Span {
    pub fn new(offs: SrcOffset, len: usize) -> Self {
        Span { offs, len }
    }

    pub fn dummy() -> Self {
        Span {
            offs: SrcOffset(0),
            len: 0,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        let start = self.offs().min(other.offs());
        let end = self.end().max(other.end());
        Span::new(SrcOffset(start), end - start)
    }

    pub fn range(&self) -> Range<usize> {
        self.offs.0..self.offs.0 + self.len
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn offs(&self) -> usize {
        self.offs.0
    }

    pub fn end(&self) -> usize {
        self.offs.0 + self.len
    }
}

impl From<Span> for SourceSpan {
    fn from(value: Span) -> Self {
        SourceSpan::new(value.offs().into(), value.len())
    }
}

impl From<Span> for Range<usize> {
    fn from(value: Span) -> Self {
        value.range()
    }
}

/// Used to refer to offsets from the start of a source file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct SrcOffset(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let mut table = SymbolTable::new();
        table.insert("Loop", 0x10).unwrap();
        assert_eq!(table.get("LOOP"), Some(0x10));
        assert_eq!(table.get("loop"), Some(0x10));
        assert_eq!(table.get("other"), None);
    }

    #[test]
    fn first_definition_wins() {
        let mut table = SymbolTable::new();
        table.insert("start", 1).unwrap();
        assert_eq!(table.insert("START", 2), Err(InsertError::Duplicate));
        assert_eq!(table.get("start"), Some(1));
    }

    #[test]
    fn long_names_truncate() {
        let mut table = SymbolTable::new();
        let long = "a".repeat(40);
        table.insert(&long, 7).unwrap();
        assert_eq!(table.get(&"A".repeat(31)), Some(7));
        assert_eq!(
            table.insert(&format!("{}b", "a".repeat(31)), 8),
            Err(InsertError::Duplicate)
        );
    }

    #[test]
    fn capacity() {
        let mut table = SymbolTable::new();
        for i in 0..MAX_LABELS {
            table.insert(&format!("L{i}"), i as u16).unwrap();
        }
        assert_eq!(table.insert("ONE_MORE", 0), Err(InsertError::Full));
        assert_eq!(table.len(), MAX_LABELS);
    }

    #[test]
    fn set_rebinds_existing_only() {
        let mut table = SymbolTable::new();
        table.insert("foo", 0x20).unwrap();
        table.set("FOO", 5);
        table.set("bar", 6);
        assert_eq!(table.get("foo"), Some(5));
        assert_eq!(table.get("bar"), None);
    }

    #[test]
    fn span_join() {
        let a = Span::new(SrcOffset(4), 2);
        let b = Span::new(SrcOffset(10), 3);
        assert_eq!(a.to(b).range(), 4..13);
    }
}
