use thiserror::Error;

pub type Result<T> = std::result::Result<T, HuffmanError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HuffmanError {
    #[error("cannot build a Huffman tree from zero symbols")]
    EmptyInput,

    #[error("extract_min called on an empty priority queue")]
    EmptyQueue,

    #[error("symbol at position {second} duplicates the symbol at position {first}")]
    DuplicateSymbol { first: usize, second: usize },

    #[error("frequency at position {index} is not positive")]
    NonPositiveFrequency { index: usize },

    #[error("sum of frequencies overflows the weight type")]
    WeightOverflow,
}
