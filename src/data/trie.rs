//! Codepoint → glyph index map
//!
//! An 8-level, 16-way trie over 32-bit keys, most significant nibble first.
//! All nodes live in one flat `Vec<u32>`: a node is 16 consecutive slots, and
//! an internal slot holds the offset of its child node (0 = no child, since
//! the root sits at offset 0 and can never be anybody's child). Leaf slots hold
//! the mapped value directly.

use thiserror::Error;

const NODE_SLOTS: usize = 16;
const INITIAL_SLOTS: usize = 1024;

/// Trie storage could not grow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrieError {
    #[error("codepoint trie allocation failed")]
    Alloc,
}

impl From<std::collections::TryReserveError> for TrieError {
    fn from(_: std::collections::TryReserveError) -> Self {
        TrieError::Alloc
    }
}

#[derive(Debug, Clone)]
pub struct CodepointTrie {
    slots: Vec<u32>,
    next_offset: usize,
}

impl Default for CodepointTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl CodepointTrie {
    /// Empty trie with the root node already allocated
    pub fn new() -> Self {
        Self {
            slots: vec![0; INITIAL_SLOTS],
            next_offset: NODE_SLOTS,
        }
    }

    /// Map `key` to `value`, overwriting any previous mapping.
    ///
    /// Intermediate nodes are created on first write. Fails only when the
    /// backing array cannot grow.
    pub fn set(&mut self, key: u32, value: u32) -> Result<(), TrieError> {
        let mut node = 0usize;
        for shift in (4..=28).rev().step_by(4) {
            let slot = node + nibble(key, shift);
            if self.slots[slot] == 0 {
                let child = self.alloc_node()?;
                self.slots[slot] = child as u32;
            }
            node = self.slots[slot] as usize;
        }
        self.slots[node + nibble(key, 0)] = value;
        Ok(())
    }

    /// Look up `key`; 0 when absent (indistinguishable from a mapping to 0)
    pub fn get(&self, key: u32) -> u32 {
        let mut node = 0usize;
        for shift in (4..=28).rev().step_by(4) {
            node = self.slots[node + nibble(key, shift)] as usize;
            if node == 0 {
                return 0;
            }
        }
        self.slots[node + nibble(key, 0)]
    }

    /// Number of allocated nodes, root included
    pub fn node_count(&self) -> usize {
        self.next_offset / NODE_SLOTS
    }

    /// Length of the backing array in slots
    pub fn allocated_len(&self) -> usize {
        self.slots.len()
    }

    fn alloc_node(&mut self) -> Result<usize, TrieError> {
        let offset = self.next_offset;
        if offset + NODE_SLOTS > self.slots.len() {
            let grown = self.slots.len() * 2;
            self.slots.try_reserve_exact(grown - self.slots.len())?;
            self.slots.resize(grown, 0);
        }
        self.next_offset += NODE_SLOTS;
        Ok(offset)
    }
}

#[inline]
fn nibble(key: u32, shift: u32) -> usize {
    ((key >> shift) & 0xF) as usize
}
