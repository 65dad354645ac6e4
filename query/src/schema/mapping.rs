//! Logical field to physical column mapping

use std::collections::BTreeMap;

/// Which physical column(s) back one logical field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnLocator {
    /// No column; the decoder uses the caller's fallback
    #[default]
    Absent,
    /// One column, converted to its declared type
    Single(usize),
    /// Several columns joined as text with the table's concatenator
    List(Vec<usize>),
    /// Several columns composed into one object, key by key
    Dict(Vec<(String, usize)>),
}

impl ColumnLocator {
    /// Every physical index this locator touches, in declaration order
    pub fn indices(&self) -> Vec<usize> {
        match self {
            ColumnLocator::Absent => Vec::new(),
            ColumnLocator::Single(i) => vec![*i],
            ColumnLocator::List(indices) => indices.clone(),
            ColumnLocator::Dict(pairs) => pairs.iter().map(|(_, i)| *i).collect(),
        }
    }
}

static ABSENT: ColumnLocator = ColumnLocator::Absent;

/// Logical field name -> locator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    locators: BTreeMap<String, ColumnLocator>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, locator: ColumnLocator) -> Self {
        self.insert(field, locator);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, locator: ColumnLocator) {
        self.locators.insert(field.into(), locator);
    }

    /// Locator for a field; unmapped fields are `Absent`
    pub fn get(&self, field: &str) -> &ColumnLocator {
        self.locators.get(field).unwrap_or(&ABSENT)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnLocator)> {
        self.locators.iter().map(|(k, v)| (k.as_str(), v))
    }
}
