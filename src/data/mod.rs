//! Core data structures
//!
//! Small, allocation-conscious containers used by the loader and the
//! triangulator: the codepoint trie and the arena-backed linked list.

pub mod linked_list;
pub mod trie;

pub use linked_list::{ListHead, NodeId, NodePool};
pub use trie::{CodepointTrie, TrieError};
