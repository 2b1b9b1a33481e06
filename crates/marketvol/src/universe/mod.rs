//! Ticker registries.
//!
//! A universe is the static, ordered list of symbols a refresh run covers,
//! with a display name for each.

pub mod b3;

pub use b3::{B3Universe, Constituent};

/// Trait for ticker registries.
pub trait Universe {
    /// Get all symbols in registry order.
    fn symbols(&self) -> Vec<String>;

    /// Display name registered for `symbol`.
    fn display_name(&self, symbol: &str) -> Option<&str>;

    /// Display name, falling back to the symbol itself when unregistered.
    fn name_or_symbol<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.display_name(symbol).unwrap_or(symbol)
    }

    /// Check if a symbol is in the universe.
    fn contains(&self, symbol: &str) -> bool {
        self.display_name(symbol).is_some()
    }

    /// Get the number of constituents.
    fn size(&self) -> usize {
        self.symbols().len()
    }
}

impl Universe for B3Universe {
    fn symbols(&self) -> Vec<String> {
        self.symbols()
    }

    fn display_name(&self, symbol: &str) -> Option<&str> {
        self.name(symbol)
    }
}
