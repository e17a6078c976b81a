//! # huffstream
//!
//! Huffman prefix coding over a fixed byte alphabet, written through a
//! bit-level output stream.
//!
//! Bytes outside the alphabet are never lost: they are written as the code of
//! a zero-weight escape symbol followed by the raw byte.
//!
//! ## Quick Start
//!
//! ```rust
//! use huffstream::{english_letter_distribution, HuffmanCodec};
//!
//! let codec = HuffmanCodec::new(english_letter_distribution(), "abcdefghijklmnopqrstuvwxyz")?;
//! assert!(codec.code_for(b'e').len() < codec.code_for(b'z').len());
//!
//! let mut output = Vec::new();
//! codec.encode(&b"attention"[..], &mut output)?;
//! assert!(output.len() < b"attention".len());
//! # Ok::<(), huffstream::HuffmanError>(())
//! ```

pub mod bit_stream;
pub mod distribution;
pub mod error;
pub mod huffman_codec;
pub mod hufftree;

// Internal modules - not part of public API
mod min_heap;

// Re-export main types for convenience
pub use bit_stream::{BitOutStreamer, BitStreamConfig};
pub use distribution::{english_letter_distribution, SymbolDistribution};
pub use error::{HuffmanError, Result};
pub use huffman_codec::HuffmanCodec;
pub use hufftree::HuffmanTree;
