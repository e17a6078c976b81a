use std::collections::{BTreeMap, HashMap};
use std::io::{self, Read, Write};

use crate::bit_stream::{BitOutStreamer, BitStreamConfig};
use crate::error::{HuffmanError, Result};
use crate::hufftree::{HuffmanTree, NodeIndex};

/// Prefix coder over a fixed byte alphabet.
///
/// Bytes outside the alphabet are escaped: the code of a synthetic zero-weight
/// escape symbol followed by the raw byte, most significant bit first.
#[derive(Debug, Clone)]
pub struct HuffmanCodec {
    tree: HuffmanTree,
    symbol_map: HashMap<u8, NodeIndex>, // byte -> leaf index
}

impl HuffmanCodec {
    /// Builds the code from one weight per symbol, in matching order.
    ///
    /// `symbols` may be a byte slice or a string.
    pub fn new(distribution: Vec<f32>, symbols: impl AsRef<[u8]>) -> Result<Self> {
        let symbols = symbols.as_ref();
        if distribution.len() != symbols.len() {
            log::warn!(
                "rejecting alphabet: {} weights for {} symbols",
                distribution.len(),
                symbols.len()
            );
            return Err(HuffmanError::LengthMismatch {
                weights: distribution.len(),
                symbols: symbols.len(),
            });
        }
        if let Some((index, &weight)) = distribution
            .iter()
            .enumerate()
            .find(|(_, w)| w.is_nan() || **w < 0.0)
        {
            return Err(HuffmanError::InvalidWeight { index, weight });
        }

        let mut symbol_map = HashMap::with_capacity(symbols.len());
        for (index, &symbol) in symbols.iter().enumerate() {
            if symbol_map.insert(symbol, index).is_some() {
                return Err(HuffmanError::DuplicateSymbol(symbol));
            }
        }

        let mut weights = distribution;
        weights.push(0.0); // escape
        let tree = HuffmanTree::from_weights(&weights)?;

        let codec = HuffmanCodec { tree, symbol_map };
        log::debug!(
            "built huffman tree: {} symbols, {} nodes, escape code length {}",
            codec.vocabulary_size(),
            codec.tree.node_count(),
            codec.tree.path_bits(codec.escape_index()).len()
        );
        Ok(codec)
    }

    /// Number of known symbols, not counting the escape symbol.
    pub fn vocabulary_size(&self) -> usize {
        self.symbol_map.len()
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    fn escape_index(&self) -> NodeIndex {
        self.vocabulary_size()
    }

    // Unknown symbols resolve to the escape leaf.
    fn leaf_of(&self, symbol: u8) -> NodeIndex {
        self.symbol_map
            .get(&symbol)
            .copied()
            .unwrap_or_else(|| self.escape_index())
    }

    pub fn is_known(&self, symbol: u8) -> bool {
        self.symbol_map.contains_key(&symbol)
    }

    /// Code of `symbol` as `'0'`/`'1'` characters, root first. Unknown
    /// symbols get the escape code.
    pub fn code_for(&self, symbol: u8) -> String {
        self.tree.code_string(self.leaf_of(symbol))
    }

    /// Always the longest code, or tied for longest.
    pub fn escape_code(&self) -> String {
        self.tree.code_string(self.escape_index())
    }

    /// Full bit string written for `symbol`: its code if known, otherwise the
    /// escape code followed by the eight bits of the byte.
    pub fn encoded(&self, symbol: u8) -> String {
        if self.is_known(symbol) {
            return self.code_for(symbol);
        }
        let mut encoded = self.escape_code();
        encoded.push_str(&format!("{:08b}", symbol));
        encoded
    }

    /// Codes of all known symbols ordered by byte value.
    pub fn code_book(&self) -> BTreeMap<u8, String> {
        self.symbol_map
            .iter()
            .map(|(&symbol, &leaf)| (symbol, self.tree.code_string(leaf)))
            .collect()
    }

    /// Streams every byte of `input` through the code into `output`, then
    /// pads and flushes the final partial byte.
    pub fn encode<R: Read, W: Write + ?Sized>(&self, input: R, output: &mut W) -> Result<()> {
        self.encode_with_config(input, output, BitStreamConfig::default())
    }

    pub fn encode_with_config<R: Read, W: Write + ?Sized>(
        &self,
        mut input: R,
        output: &mut W,
        config: BitStreamConfig,
    ) -> Result<()> {
        let mut bits = BitOutStreamer::with_config(output, config);
        let mut chunk = [0u8; 4096];
        loop {
            let n = match input.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &byte in &chunk[..n] {
                self.push_symbol(byte, &mut bits)?;
            }
        }
        bits.flush()?;
        Ok(())
    }

    /// In-memory form of [`encode`](Self::encode).
    pub fn encode_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(data.len());
        self.encode(data, &mut output)?;
        Ok(output)
    }

    fn push_symbol<W: Write + ?Sized>(&self, byte: u8, bits: &mut BitOutStreamer<'_, W>) -> io::Result<()> {
        let leaf = self.leaf_of(byte);
        self.tree.for_each_bit(leaf, &mut |bit| bits.push_bit(bit))?;
        if leaf == self.escape_index() {
            bits.push_byte(byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn all_prefixes_unique(codes: &[String]) -> bool {
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !b.starts_with(a.as_str()))
        })
    }

    // Packs a '0'/'1' string the slow way.
    fn pack_bit_string(bits: &str) -> Vec<u8> {
        let mut output = Vec::new();
        {
            let mut stream = BitOutStreamer::new(&mut output);
            for c in bits.chars() {
                stream.push_bit(c == '1').unwrap();
            }
            stream.flush().unwrap();
        }
        output
    }

    fn produce_equivalent(codec: &HuffmanCodec, plaintext: &[u8]) -> Vec<u8> {
        let bits: String = plaintext.iter().map(|&b| codec.encoded(b)).collect();
        pack_bit_string(&bits)
    }

    #[test]
    fn test_empty_alphabet() {
        let codec = HuffmanCodec::new(vec![], "").unwrap();
        assert_eq!(codec.vocabulary_size(), 0);
        assert!(codec.escape_code().is_empty());
        assert!(codec.code_for(b'x').is_empty());
        assert_eq!(codec.encoded(b'g'), "01100111");
    }

    #[test]
    fn test_simple_construction() {
        let codec = HuffmanCodec::new(vec![0.5, 0.1, 0.3, 0.4], "5134").unwrap();
        assert_eq!(codec.vocabulary_size(), 4);
        assert_eq!(codec.tree().node_count(), 9);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            HuffmanCodec::new(vec![0.4], ""),
            Err(HuffmanError::LengthMismatch { weights: 1, symbols: 0 })
        ));
        assert!(matches!(
            HuffmanCodec::new(vec![0.4], "45"),
            Err(HuffmanError::LengthMismatch { weights: 1, symbols: 2 })
        ));
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        assert!(matches!(
            HuffmanCodec::new(vec![0.4, 0.2, 0.1], "aba"),
            Err(HuffmanError::DuplicateSymbol(b'a'))
        ));
    }

    #[test]
    fn test_invalid_weight_rejected() {
        assert!(matches!(
            HuffmanCodec::new(vec![0.4, -0.2], "ab"),
            Err(HuffmanError::InvalidWeight { index: 1, .. })
        ));
        assert!(matches!(
            HuffmanCodec::new(vec![f32::NAN], "a"),
            Err(HuffmanError::InvalidWeight { index: 0, .. })
        ));
    }

    #[test]
    fn test_debug_codes() {
        let codec = HuffmanCodec::new(vec![0.5, 0.1, 0.3, 0.4], "abcd").unwrap();
        let escape = codec.escape_code();
        assert_eq!(escape, codec.code_for(b'g'));

        // 'g' == 0x67 == 0110 0111
        assert_eq!(codec.encoded(b'g'), format!("{}01100111", escape));
        assert_eq!(codec.code_for(b'a'), codec.encoded(b'a'));
    }

    #[test]
    fn test_exact_codes() {
        let codec = HuffmanCodec::new(vec![0.5, 0.1, 0.3, 0.4], "abcd").unwrap();
        let book = codec.code_book();
        assert_eq!(book[&b'a'], "1");
        assert_eq!(book[&b'b'], "0010");
        assert_eq!(book[&b'c'], "000");
        assert_eq!(book[&b'd'], "01");
        assert_eq!(codec.escape_code(), "0011");
    }

    #[test]
    fn test_simple_codes_consistent() {
        let distr = vec![0.5, 0.1, 0.3, 0.4];
        let codec = HuffmanCodec::new(distr.clone(), "abcd").unwrap();
        let codes: Vec<String> = b"abcd".iter().map(|&s| codec.code_for(s)).collect();
        assert!(all_prefixes_unique(&codes));
        for i in 0..codes.len() {
            for j in 0..codes.len() {
                if distr[i] > distr[j] {
                    assert!(codes[i].len() <= codes[j].len(), "{:?}", codes);
                }
            }
        }
    }

    #[test]
    fn test_encode_empty_alphabet_is_identity() {
        let codec = HuffmanCodec::new(vec![], "").unwrap();
        let input = b"Many chars represented!\t #indeed, @hi./?\\";
        assert_eq!(codec.encode_bytes(input).unwrap(), input);
    }

    #[test]
    fn test_encode_simple() {
        let codec = HuffmanCodec::new(vec![0.5, 0.1, 0.3, 0.4], "abcd").unwrap();
        let input = b"bbbacddc";
        let output = codec.encode_bytes(input).unwrap();
        assert_eq!(output, produce_equivalent(&codec, input));
        // 0010 0010 0010 1 000 01 01 000 -> 0010_0010 0010_1000 0101_000(0)
        assert_eq!(output, vec![0x22, 0x28, 0x50]);
    }

    #[test]
    fn test_encode_escaping() {
        let codec = HuffmanCodec::new(vec![0.5, 0.1, 0.3, 0.4], "abcd").unwrap();
        let input = b"bb b a cddc.";
        let output = codec.encode_bytes(input).unwrap();
        assert_eq!(output, produce_equivalent(&codec, input));
    }

    #[test]
    fn test_encode_with_small_threshold() {
        let codec = HuffmanCodec::new(vec![0.5, 0.1, 0.3, 0.4], "abcd").unwrap();
        let input = b"abcdefgabcd";
        let mut output = Vec::new();
        codec
            .encode_with_config(&input[..], &mut output, BitStreamConfig::new(1))
            .unwrap();
        assert_eq!(output, codec.encode_bytes(input).unwrap());
    }

    #[test]
    fn test_encode_empty_input() {
        let codec = HuffmanCodec::new(vec![0.5, 0.5], "ab").unwrap();
        assert!(codec.encode_bytes(b"").unwrap().is_empty());
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    // Yields `data`, but fails with `error` once before the first byte.
    struct HiccupReader<'a> {
        data: &'a [u8],
        error: Option<io::ErrorKind>,
    }

    impl Read for HiccupReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if let Some(kind) = self.error {
                if kind != io::ErrorKind::Other {
                    self.error = None;
                }
                return Err(io::Error::new(kind, "reader hiccup"));
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn test_encode_into_failing_sink() {
        let codec = HuffmanCodec::new(vec![0.5, 0.1, 0.3, 0.4], "abcd").unwrap();
        let mut sink = FailingSink;
        match codec.encode(&b"abcdefg"[..], &mut sink) {
            Err(HuffmanError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_propagates_reader_error() {
        let codec = HuffmanCodec::new(vec![0.5, 0.1, 0.3, 0.4], "abcd").unwrap();
        let reader = HiccupReader {
            data: b"abcd",
            error: Some(io::ErrorKind::Other),
        };
        let mut output = Vec::new();
        match codec.encode(reader, &mut output) {
            Err(HuffmanError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::Other),
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_retries_interrupted_read() {
        let codec = HuffmanCodec::new(vec![0.5, 0.1, 0.3, 0.4], "abcd").unwrap();
        let input = b"bb b a cddc.";
        let reader = HiccupReader {
            data: input,
            error: Some(io::ErrorKind::Interrupted),
        };
        let mut output = Vec::new();
        codec.encode(reader, &mut output).unwrap();
        assert_eq!(output, codec.encode_bytes(input).unwrap());
    }
}
