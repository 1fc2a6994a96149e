//! MSB-first bit buffer shared by the mnemonic checksum, the v1 word
//! encoder and the v2 sentence encoder.
//!
//! All three slice a byte string into fixed-width groups (11 bits for
//! dictionary words, 6 bits for codebook slots) and stitch groups back
//! into bytes. Doing it once here keeps the bit order identical across
//! every encoder.

/// A growable sequence of bits, most significant bit of each byte first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bits: Vec<bool>,
}

impl BitBuffer {
    /// Empty buffer with room for `capacity` bits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: Vec::with_capacity(capacity),
        }
    }

    /// Unpack bytes, MSB first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = Self::with_capacity(bytes.len() * 8);
        for &byte in bytes {
            buf.push(u32::from(byte), 8);
        }
        buf
    }

    /// Number of bits held.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True when no bits are held.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Append the low `width` bits of `value`, MSB first.
    pub fn push(&mut self, value: u32, width: usize) {
        debug_assert!(width <= 32);
        for shift in (0..width).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
    }

    /// Append every bit of another buffer.
    pub fn extend(&mut self, other: &BitBuffer) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Read `width` bits starting at `offset`. Bits past the end read as 0,
    /// which is exactly the zero padding the encoders want for a final
    /// partial group.
    pub fn read(&self, offset: usize, width: usize) -> u32 {
        (offset..offset + width).fold(0u32, |acc, i| {
            (acc << 1) | u32::from(self.bits.get(i).copied().unwrap_or(false))
        })
    }

    /// Split into `width`-bit groups, zero-padding the last one.
    pub fn groups(&self, width: usize) -> Vec<u32> {
        (0..self.bits.len().div_ceil(width))
            .map(|g| self.read(g * width, width))
            .collect()
    }

    /// Drop everything after the first `len` bits.
    pub fn truncate(&mut self, len: usize) {
        self.bits.truncate(len);
    }

    /// Pack into bytes, MSB first. A trailing partial byte is zero-filled.
    pub fn to_bytes(&self) -> Vec<u8> {
        (0..self.bits.len().div_ceil(8))
            .map(|i| self.read(i * 8, 8) as u8)
            .collect()
    }
}
