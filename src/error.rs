use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuffmanError {
    #[error("distribution has {weights} weights but {symbols} symbols were given")]
    LengthMismatch { weights: usize, symbols: usize },

    #[error("symbol {0:#04x} appears more than once in the alphabet")]
    DuplicateSymbol(u8),

    #[error("weight {weight} at index {index} is not a non-negative number")]
    InvalidWeight { index: usize, weight: f32 },

    #[error("a tree needs at least one leaf")]
    NoLeaves,

    #[error("constructed tree failed the consistency check")]
    Inconsistent,

    #[error("priority queue underflow")]
    HeapUnderflow,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HuffmanError>;
