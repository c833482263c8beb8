//! Bounded, newest-first record of consumed tokens.

use crate::token::RawToken;

/// Number of tokens kept for backward context lookups.
pub const HISTORY_CAPACITY: usize = 20;

/// Fixed-capacity ring of recently consumed tokens.
///
/// Pushing past [`HISTORY_CAPACITY`] evicts the oldest entry in O(1). Iteration yields the
/// newest entry first.
#[derive(Debug, Clone)]
pub struct History {
    slots: Vec<RawToken>,
    // Index of the slot the next push writes to, once `slots` is full.
    head: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(HISTORY_CAPACITY),
            head: 0,
        }
    }

    /// Record a token as the newest entry.
    pub fn push(&mut self, token: RawToken) {
        if self.slots.len() < HISTORY_CAPACITY {
            self.slots.push(token);
            self.head = self.slots.len() % HISTORY_CAPACITY;
        } else {
            self.slots[self.head] = token;
            self.head = (self.head + 1) % HISTORY_CAPACITY;
        }
    }

    /// Number of retained tokens.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The most recently pushed token.
    pub fn newest(&self) -> Option<&RawToken> {
        self.get(0)
    }

    /// Token `age` steps back from the newest (0 = newest).
    pub fn get(&self, age: usize) -> Option<&RawToken> {
        let len = self.slots.len();
        if age >= len {
            return None;
        }
        // The newest entry always sits just before `head` (wrapping).
        let newest = (self.head + HISTORY_CAPACITY - 1) % HISTORY_CAPACITY;
        let idx = (newest + len - age) % len;
        self.slots.get(idx)
    }

    /// Iterate newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &RawToken> + '_ {
        (0..self.slots.len()).filter_map(move |age| self.get(age))
    }
}
