//! Bit-level output stream.
//!
//! Codes of varying bit length are pushed one bit at a time and leave the
//! stream packed into whole bytes, most significant bit first:
//!
//! ```text
//! 110, 00, 111011, flush -> 1100 0111 0110 0000
//! ```

use std::collections::VecDeque;
use std::io::{self, Write};

pub const DEFAULT_BUFFER_THRESHOLD: usize = 10;

/// Buffering settings for a [`BitOutStreamer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitStreamConfig {
    /// Number of whole bytes to hold before draining to the sink.
    pub buffer_threshold: usize,
}

impl BitStreamConfig {
    /// A threshold of zero is ignored and the default is kept.
    pub fn new(buffer_threshold: usize) -> Self {
        let mut config = Self::default();
        if buffer_threshold > 0 {
            config.buffer_threshold = buffer_threshold;
        }
        config
    }
}

impl Default for BitStreamConfig {
    fn default() -> Self {
        BitStreamConfig {
            buffer_threshold: DEFAULT_BUFFER_THRESHOLD,
        }
    }
}

/// Packs pushed bits into bytes written to a borrowed sink.
///
/// Whatever is still buffered when the streamer is dropped gets flushed, so
/// no bits are lost on early returns. Call [`BitOutStreamer::flush`] explicitly
/// to observe write errors; the drop path can only log them.
pub struct BitOutStreamer<'a, W: Write + ?Sized> {
    sink: &'a mut W,
    buffer: VecDeque<bool>,
    config: BitStreamConfig,
}

impl<'a, W: Write + ?Sized> BitOutStreamer<'a, W> {
    pub fn new(sink: &'a mut W) -> Self {
        Self::with_config(sink, BitStreamConfig::default())
    }

    pub fn with_config(sink: &'a mut W, config: BitStreamConfig) -> Self {
        BitOutStreamer {
            sink,
            buffer: VecDeque::new(),
            config,
        }
    }

    pub fn set_buffer_threshold(&mut self, bytes: usize) {
        if bytes < 1 {
            return;
        }
        self.config.buffer_threshold = bytes;
    }

    pub fn buffer_threshold(&self) -> usize {
        self.config.buffer_threshold
    }

    /// True iff no bits are buffered. Says nothing about what reached the sink.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn pending_bits(&self) -> usize {
        self.buffer.len()
    }

    pub fn push_bit(&mut self, bit: bool) -> io::Result<()> {
        self.buffer.push_back(bit);
        self.drain_if_full()
    }

    pub fn push_byte(&mut self, byte: u8) -> io::Result<()> {
        for bit_pos in (0..8).rev() {
            self.buffer.push_back((byte >> bit_pos) & 1 == 1);
        }
        self.drain_if_full()
    }

    /// Writes every buffered bit. A trailing partial byte is emitted with its
    /// bits in the high positions and zeros below.
    ///
    /// ```text
    /// 1101 1001 110 -> 1101 1001 1100 0000
    /// ```
    pub fn flush(&mut self) -> io::Result<()> {
        self.drain_complete_bytes()?;
        if self.buffer.is_empty() {
            return Ok(());
        }

        let remaining = self.buffer.len();
        debug_assert!(remaining < 8, "{remaining} bits left after draining");
        let mut out_byte = 0u8;
        for bit in self.buffer.drain(..) {
            out_byte = (out_byte << 1) | u8::from(bit);
        }
        out_byte <<= 8 - remaining;
        self.sink.write_all(&[out_byte])
    }

    fn drain_if_full(&mut self) -> io::Result<()> {
        if self.buffer.len() >= self.config.buffer_threshold.saturating_mul(8) {
            self.drain_complete_bytes()?;
        }
        Ok(())
    }

    // Leaves fewer than 8 bits in the buffer.
    fn drain_complete_bytes(&mut self) -> io::Result<()> {
        let byte_count = self.buffer.len() / 8;
        if byte_count == 0 {
            return Ok(());
        }
        let bytes: Vec<u8> = self
            .buffer
            .drain(..byte_count * 8)
            .collect::<Vec<bool>>()
            .chunks_exact(8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit)))
            .collect();
        log::trace!("draining {} bytes, {} bits stay buffered", bytes.len(), self.buffer.len());
        self.sink.write_all(&bytes)
    }
}

impl<W: Write + ?Sized> Drop for BitOutStreamer<'_, W> {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        if let Err(e) = self.flush() {
            log::error!("failed to flush {} pending bits on drop: {}", self.buffer.len(), e);
        }
    }
}
