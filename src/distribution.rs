use std::collections::BTreeMap;

// Relative frequency of English letters a-z, in percent.
const ENGLISH_LETTER_PERCENT: [f32; 26] = [
    8.167,  // a
    1.492,  // b
    2.782,  // c
    4.253,  // d
    12.702, // e
    2.228,  // f
    2.015,  // g
    6.094,  // h
    6.966,  // i
    0.153,  // j
    0.772,  // k
    4.025,  // l
    2.406,  // m
    6.749,  // n
    7.507,  // o
    1.929,  // p
    0.095,  // q
    5.987,  // r
    6.327,  // s
    9.056,  // t
    2.758,  // u
    0.978,  // v
    2.361,  // w
    0.150,  // x
    1.974,  // y
    0.074,  // z
];

pub const ENGLISH_LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";

/// Frequencies of `a` through `z` as fractions, in alphabet order.
pub fn english_letter_distribution() -> Vec<f32> {
    ENGLISH_LETTER_PERCENT.iter().map(|p| p / 100.0).collect()
}

/// Weights paired with the symbols they belong to, ready for
/// [`HuffmanCodec::new`](crate::HuffmanCodec::new).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymbolDistribution {
    pub weights: Vec<f32>,
    pub symbols: Vec<u8>,
}

impl SymbolDistribution {
    /// Relative frequency of every byte seen in `sample`, in ascending byte order.
    pub fn from_sample(sample: &[u8]) -> Self {
        let counts: BTreeMap<u8, usize> = sample.iter().copied().fold(BTreeMap::new(), |mut acc, byte| {
            *acc.entry(byte).or_insert(0) += 1;
            acc
        });

        let total = sample.len() as f32;
        let (symbols, weights): (Vec<u8>, Vec<f32>) = counts
            .into_iter()
            .map(|(byte, count)| (byte, count as f32 / total))
            .unzip();
        SymbolDistribution { weights, symbols }
    }

    pub fn english_letters() -> Self {
        SymbolDistribution {
            weights: english_letter_distribution(),
            symbols: ENGLISH_LETTERS.as_bytes().to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
