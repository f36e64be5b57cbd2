//! Huffman minimum-redundancy codes for an arbitrary alphabet.
//!
//! ```
//! use huffman_table::{build_code_table, build_tree};
//!
//! let root = build_tree(vec![('a', 3u64), ('b', 1), ('c', 1)]).unwrap();
//! let table = build_code_table(&root).unwrap();
//!
//! assert_eq!(table.get(&'b').unwrap().to_string(), "00");
//! assert_eq!(table.get(&'a').unwrap().to_string(), "1");
//! assert!(table.is_prefix_free());
//! ```

pub mod code;
pub mod error;
pub mod queue;
pub mod tree;
pub mod weight;

pub use code::{build_code_table, code_words, Code, CodeTable, CodeWords, SerializableCodeTable};
pub use error::{HuffmanError, Result};
pub use queue::PriorityQueue;
pub use tree::{build_tree, count_frequencies, huffman, probabilities, Node};
pub use weight::Weight;
pub use total_float_wrap::TotalF64;
