//! Converter configuration

/// Key order of objects in the emitted JSON
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyOrder {
    /// Document order, except where a converter sorts on purpose
    #[default]
    Insertion,
    /// Every object's keys in ascending order
    Sorted,
}

/// How a lookup that expects exactly one node treats several matches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    /// More than one match is a `NotFound` error
    #[default]
    Strict,
    /// Take the first match in document order
    First,
}

/// Configuration shared by all converters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub key_order: KeyOrder,
    pub selection: Selection,
}

impl Config {
    pub const fn new(key_order: KeyOrder, selection: Selection) -> Self {
        Self {
            key_order,
            selection,
        }
    }

    /// Sorted keys everywhere and first match wins, as the old dump scripts behaved
    pub const fn legacy() -> Self {
        Self::new(KeyOrder::Sorted, Selection::First)
    }

    pub const fn with_key_order(mut self, key_order: KeyOrder) -> Self {
        self.key_order = key_order;
        self
    }

    pub const fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }
}
