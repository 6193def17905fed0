//! Construction parameters for the two hash tables.

use crate::error::DictionaryError;

/// Initial capacity both hash tables fall back to.
pub const DEFAULT_HASH_CAPACITY: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainedHashConfig {
    /// Requested bucket count; rounded up to a prime.
    pub initial_capacity: usize,
    /// Average chain length that triggers a rehash once exceeded.
    pub max_load_factor: f64,
}

impl Default for ChainedHashConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_HASH_CAPACITY,
            max_load_factor: 2.0,
        }
    }
}

impl ChainedHashConfig {
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_max_load_factor(mut self, load_factor: f64) -> Self {
        self.max_load_factor = load_factor;
        self
    }

    pub fn validate(&self) -> Result<(), DictionaryError> {
        if !self.max_load_factor.is_finite() || self.max_load_factor <= 0.0 {
            return Err(DictionaryError::invalid(format!(
                "chained max_load_factor must be finite and > 0, got {}",
                self.max_load_factor
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbingHashConfig {
    /// Requested slot count; rounded up to a prime congruent to 3 mod 4.
    pub initial_capacity: usize,
    /// Load factor at which the table grows before the next insert.
    pub max_load_factor: f64,
}

impl Default for ProbingHashConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_HASH_CAPACITY,
            max_load_factor: 0.66,
        }
    }
}

impl ProbingHashConfig {
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_max_load_factor(mut self, load_factor: f64) -> Self {
        self.max_load_factor = load_factor;
        self
    }

    /// The factor lies in (0, 1); at 1 or above the table would fill before
    /// it ever grew.
    pub fn validate(&self) -> Result<(), DictionaryError> {
        if !(self.max_load_factor > 0.0 && self.max_load_factor < 1.0) {
            return Err(DictionaryError::invalid(format!(
                "probing max_load_factor must be in (0, 1), got {}",
                self.max_load_factor
            )));
        }
        Ok(())
    }
}
