//! Key-value maps built on two interchangeable storage engines.
//!
//! [`TreeMap`] is an unbalanced binary search tree whose nodes keep parent
//! handles, and [`HashTable`] is a separate-chaining hash table whose bucket
//! count grows through a fixed sequence of primes. Both implement the [`Map`]
//! contract, so a client can swap one for the other and only observe a
//! difference in cost and iteration order.
//!
//! ```rust
//! use twin_map::{HashTable, Map, TreeMap};
//!
//! fn count<M: Map<&'static str, usize>>(map: &mut M, words: &[&'static str]) {
//!     for &word in words {
//!         let count = map.get(&word).copied().unwrap_or(0);
//!         map.put(word, count + 1);
//!     }
//! }
//!
//! let words = ["to", "be", "or", "not", "to", "be"];
//! let mut tree = TreeMap::new();
//! let mut table = HashTable::new();
//!
//! count(&mut tree, &words);
//! count(&mut table, &words);
//!
//! assert_eq!(tree.get("be"), Some(&2));
//! assert_eq!(table.get("be"), Some(&2));
//! assert_eq!(tree.to_string(), "[be, not, or, to]");
//! ```

mod error;
mod hash_table;
mod key_value;
mod map;
#[cfg(test)]
mod proptests;
mod tree;
mod utilities;

pub use error::Error;
pub use hash_table::{HashIterator, HashTable, MAX_DISPLAY_ENTRIES, MAX_LOAD_FACTOR, PRIMES};
pub use key_value::KeyValue;
pub use map::Map;
pub use tree::{Layout, Traversal, TreeIterator, TreeMap};
