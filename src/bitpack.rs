//! Bit descriptors and fixed-width packing into 256-bit words.
//!
//! This module provides a `BitPack` type for reading and writing
//! variable-width values to a byte buffer, a tagged [`BitDescriptor`] for
//! the two field widths the curve layout uses (1-bit flags and 8-bit
//! exponents), and the assembly of a packed bitstring into 256-bit storage
//! words.
//!
//! ## Bit order
//!
//! Bits are written most-significant first, in call order: descriptor 0's
//! first bit becomes the most significant bit of the assembled bitstring.
//! [`unpack`] is the exact inverse of [`pack`] for every valid descriptor
//! sequence.
//!
//! ## Word assembly
//!
//! [`PackedBits::to_words`] reinterprets the bitstring as 256-bit unsigned
//! integers:
//!
//! - up to 256 bits: a single word holding the integer value of the
//!   bitstring (left-padded with zero bits);
//! - longer: consecutive 256-bit windows, each an independent big-endian
//!   integer, the final partial window right-padded with zero bits.
//!
//! The on-chain consumer decodes with the identical bit order, so this
//! layout is part of the storage contract.

use num_bigint::BigUint;

use crate::error::CurveError;

/// Maximum number of bits that can be written in a single operation.
pub const MAX_BITS: usize = 32;

/// Number of bits in a byte.
const BYTE_BITS: usize = 8;

/// Number of bits in a packed storage word.
pub const WORD_BITS: usize = 256;

const WORD_BYTES: usize = WORD_BITS / BYTE_BITS;

/// A tagged fixed-width bit quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDescriptor {
    /// A single-bit flag.
    Bool(bool),
    /// An 8-bit unsigned integer.
    Uint8(u8),
}

impl BitDescriptor {
    /// Wrap a boolean flag.
    pub fn from_bool(v: bool) -> Self {
        BitDescriptor::Bool(v)
    }

    /// Wrap an 8-bit unsigned integer.
    pub fn from_uint8(v: u8) -> Self {
        BitDescriptor::Uint8(v)
    }

    /// The number of bits this descriptor occupies.
    pub fn width(self) -> usize {
        match self {
            BitDescriptor::Bool(_) => 1,
            BitDescriptor::Uint8(_) => 8,
        }
    }

    /// The descriptor's payload as an unsigned value.
    pub fn value(self) -> u32 {
        match self {
            BitDescriptor::Bool(v) => v as u32,
            BitDescriptor::Uint8(v) => v as u32,
        }
    }

    fn from_width_value(width: usize, value: u32) -> Result<Self, CurveError> {
        match width {
            1 => Ok(BitDescriptor::Bool(value != 0)),
            8 => Ok(BitDescriptor::Uint8(value as u8)),
            _ => Err(CurveError::UnsupportedDescriptorWidth(width)),
        }
    }
}

/// A bit packer for reading and writing variable-width values.
///
/// This supports both reading from a byte slice and writing to a growable
/// Vec. Bits go most-significant first within each value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitPack<B> {
    buff: B,
    cursor: usize,
    bits: usize,
}

impl<B> BitPack<B> {
    /// Create a new BitPack with the given buffer.
    #[inline]
    pub fn new(buff: B) -> Self {
        BitPack {
            buff,
            cursor: 0,
            bits: 0,
        }
    }

    /// Get the total number of bits processed so far.
    #[inline]
    pub fn sum_bits(&self) -> usize {
        self.cursor * BYTE_BITS + self.bits
    }
}

impl<B: AsRef<[u8]>> BitPack<B> {
    /// Get a reference to the underlying buffer as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.buff.as_ref()
    }
}

// Reading operations for byte slices
impl BitPack<&[u8]> {
    /// Read `bits` bits from the buffer and return as u32.
    ///
    /// # Arguments
    /// * `bits` - Number of bits to read (max 32)
    ///
    /// # Returns
    /// The value read, or an error if there are not enough bits available.
    pub fn read(&mut self, mut bits: usize) -> Result<u32, CurveError> {
        if bits > MAX_BITS {
            return Err(CurveError::BitWidthExceeded(bits));
        }
        if self.buff.len() * BYTE_BITS < self.sum_bits() + bits {
            return Err(CurveError::BufferOverflow {
                attempted: bits,
                available: self.buff.len() * BYTE_BITS - self.sum_bits(),
            });
        }

        let mut output = 0u32;

        loop {
            let byte_left = BYTE_BITS - self.bits;

            if bits <= byte_left {
                let bb =
                    (self.buff[self.cursor] as u32 >> (byte_left - bits)) & ((1u32 << bits) - 1);
                output = (output << bits) | bb;
                self.bits += bits;
                if self.bits >= BYTE_BITS {
                    self.cursor += 1;
                    self.bits = 0;
                }
                break;
            }

            let bb = (self.buff[self.cursor] as u32) & ((1u32 << byte_left) - 1);
            output = (output << byte_left) | bb;
            self.cursor += 1;
            self.bits = 0;
            bits -= byte_left;
        }

        Ok(output)
    }
}

// Writing operations for mutable byte slices
impl BitPack<&mut [u8]> {
    /// Write the low `bits` bits of `value` to the buffer.
    pub fn write(&mut self, mut value: u32, mut bits: usize) -> Result<(), CurveError> {
        if bits > MAX_BITS {
            return Err(CurveError::BitWidthExceeded(bits));
        }
        if self.buff.len() * BYTE_BITS < self.sum_bits() + bits {
            return Err(CurveError::BufferOverflow {
                attempted: bits,
                available: self.buff.len() * BYTE_BITS - self.sum_bits(),
            });
        }

        if bits < MAX_BITS {
            value &= (1u32 << bits) - 1;
        }

        loop {
            let byte_left = BYTE_BITS - self.bits;

            if bits <= byte_left {
                self.buff[self.cursor] |= (value << (byte_left - bits)) as u8;
                self.bits += bits;
                if self.bits >= BYTE_BITS {
                    self.cursor += 1;
                    self.bits = 0;
                }
                break;
            }

            let bb = value >> (bits - byte_left);
            self.buff[self.cursor] |= bb as u8;
            self.cursor += 1;
            self.bits = 0;
            bits -= byte_left;
            value &= (1u32 << bits) - 1;
        }

        Ok(())
    }
}

impl Default for BitPack<Vec<u8>> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

// Writing operations for growable Vec
impl BitPack<Vec<u8>> {
    /// Create a new BitPack with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(Vec::with_capacity(capacity))
    }

    /// Write the low `bits` bits of `value` to the buffer.
    ///
    /// The buffer will grow as needed.
    #[inline]
    pub fn write(&mut self, value: u32, bits: usize) -> Result<(), CurveError> {
        if bits > MAX_BITS {
            return Err(CurveError::BitWidthExceeded(bits));
        }

        let len = self.buff.len();
        if let Some(bits_needed) = (self.sum_bits() + bits).checked_sub(len * BYTE_BITS) {
            self.buff.resize(len + bits_needed.div_ceil(BYTE_BITS), 0x0);
        }

        let mut bitpack = BitPack {
            buff: self.buff.as_mut_slice(),
            cursor: self.cursor,
            bits: self.bits,
        };

        bitpack.write(value, bits)?;

        self.bits = bitpack.bits;
        self.cursor = bitpack.cursor;

        Ok(())
    }

    /// Consume the BitPack and return the underlying buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.buff
    }
}

/// A packed bitstring with its exact bit length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBits {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl PackedBits {
    /// Rebuild a bitstring from raw bytes and its payload bit length.
    ///
    /// The counterpart of [`PackedBits::as_bytes`], for consumers that
    /// reassemble a bitstring out of storage words before unpacking.
    pub fn from_bytes(bytes: Vec<u8>, bit_len: usize) -> Self {
        PackedBits { bytes, bit_len }
    }

    /// Number of payload bits (excluding trailing byte padding).
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// The underlying bytes, most-significant bit first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reinterpret the bitstring as 256-bit unsigned storage words.
    pub fn to_words(&self) -> Vec<BigUint> {
        if self.bit_len <= WORD_BITS {
            let value = BigUint::from_bytes_be(&self.bytes);
            let pad = self.bytes.len() * BYTE_BITS - self.bit_len;
            return vec![value >> pad];
        }
        let mut words = Vec::with_capacity(self.bytes.len().div_ceil(WORD_BYTES));
        for chunk in self.bytes.chunks(WORD_BYTES) {
            let mut word = BigUint::from_bytes_be(chunk);
            if chunk.len() < WORD_BYTES {
                word <<= (WORD_BYTES - chunk.len()) * BYTE_BITS;
            }
            words.push(word);
        }
        words
    }
}

/// Pack a descriptor sequence into a bitstring, in descriptor order.
pub fn pack(descriptors: &[BitDescriptor]) -> Result<PackedBits, CurveError> {
    let bit_len: usize = descriptors.iter().map(|d| d.width()).sum();
    let mut bitpack = BitPack::<Vec<u8>>::with_capacity(bit_len.div_ceil(BYTE_BITS));
    for d in descriptors {
        bitpack.write(d.value(), d.width())?;
    }
    Ok(PackedBits {
        bytes: bitpack.into_vec(),
        bit_len,
    })
}

/// Unpack a bitstring back into descriptors, given their widths in order.
///
/// Inverse of [`pack`]: `unpack(&pack(d)?, &widths) == d` whenever `widths`
/// lists `d[i].width()` in order.
pub fn unpack(bits: &PackedBits, widths: &[usize]) -> Result<Vec<BitDescriptor>, CurveError> {
    let mut reader = BitPack::<&[u8]>::new(&bits.bytes);
    let mut out = Vec::with_capacity(widths.len());
    for &width in widths {
        let value = reader.read(width)?;
        out.push(BitDescriptor::from_width_value(width, value)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_roundtrip() {
        let mut bitpack_vec = BitPack::<Vec<u8>>::with_capacity(8);
        bitpack_vec.write(10, 4).unwrap();
        bitpack_vec.write(1021, 10).unwrap();
        bitpack_vec.write(3, 2).unwrap();

        let mut bitpack = BitPack::<&[u8]>::new(bitpack_vec.as_slice());
        assert_eq!(bitpack.read(4).unwrap(), 10);
        assert_eq!(bitpack.read(10).unwrap(), 1021);
        assert_eq!(bitpack.read(2).unwrap(), 3);
    }

    #[test]
    fn test_single_bits() {
        let mut bitpack_vec = BitPack::<Vec<u8>>::with_capacity(1);
        bitpack_vec.write(1, 1).unwrap();
        bitpack_vec.write(0, 1).unwrap();
        bitpack_vec.write(0, 1).unwrap();
        bitpack_vec.write(1, 1).unwrap();

        // MSB-first: 1001 in the top nibble
        assert_eq!(bitpack_vec.as_slice(), &[0b1001_0000]);

        let mut bitpack = BitPack::<&[u8]>::new(bitpack_vec.as_slice());
        assert_eq!(bitpack.read(1).unwrap(), 1);
        assert_eq!(bitpack.read(1).unwrap(), 0);
        assert_eq!(bitpack.read(1).unwrap(), 0);
        assert_eq!(bitpack.read(1).unwrap(), 1);
    }

    #[test]
    fn test_full_bytes() {
        let mut bitpack_vec = BitPack::<Vec<u8>>::with_capacity(8);
        bitpack_vec.write(255, 8).unwrap();
        bitpack_vec.write(65535, 16).unwrap();
        bitpack_vec.write(255, 8).unwrap();

        let mut bitpack = BitPack::<&[u8]>::new(bitpack_vec.as_slice());
        assert_eq!(bitpack.read(8).unwrap(), 255);
        assert_eq!(bitpack.read(16).unwrap(), 65535);
        assert_eq!(bitpack.read(8).unwrap(), 255);
    }

    #[test]
    fn test_unaligned_spans_bytes() {
        let mut bitpack_vec = BitPack::<Vec<u8>>::with_capacity(4);
        bitpack_vec.write(0b101, 3).unwrap();
        bitpack_vec.write(0b11001100_1, 9).unwrap();
        bitpack_vec.write(0b1111, 4).unwrap();

        let mut bitpack = BitPack::<&[u8]>::new(bitpack_vec.as_slice());
        assert_eq!(bitpack.read(3).unwrap(), 0b101);
        assert_eq!(bitpack.read(9).unwrap(), 0b11001100_1);
        assert_eq!(bitpack.read(4).unwrap(), 0b1111);
    }

    #[test]
    fn test_bit_width_exceeded() {
        let mut bitpack_vec = BitPack::<Vec<u8>>::with_capacity(8);
        let result = bitpack_vec.write(0, 33);
        assert!(matches!(result, Err(CurveError::BitWidthExceeded(33))));
    }

    #[test]
    fn test_read_past_end() {
        let buf = [0u8; 2];
        let mut bitpack = BitPack::<&[u8]>::new(&buf);
        bitpack.read(12).unwrap();
        let result = bitpack.read(8);
        assert!(matches!(
            result,
            Err(CurveError::BufferOverflow {
                attempted: 8,
                available: 4
            })
        ));
    }

    #[test]
    fn test_descriptor_roundtrip() {
        let descriptors = vec![
            BitDescriptor::from_bool(true),
            BitDescriptor::from_uint8(24),
            BitDescriptor::from_bool(false),
            BitDescriptor::from_uint8(255),
            BitDescriptor::from_bool(true),
        ];
        let widths: Vec<usize> = descriptors.iter().map(|d| d.width()).collect();
        let packed = pack(&descriptors).unwrap();
        assert_eq!(packed.bit_len(), 19);
        assert_eq!(unpack(&packed, &widths).unwrap(), descriptors);
    }

    #[test]
    fn test_unpack_rejects_odd_width() {
        let packed = pack(&[BitDescriptor::from_uint8(7)]).unwrap();
        let result = unpack(&packed, &[4]);
        assert!(matches!(
            result,
            Err(CurveError::UnsupportedDescriptorWidth(4))
        ));
    }

    #[test]
    fn test_first_descriptor_is_most_significant() {
        // 256 flags, only the first set: the word is 2^255
        let mut flags = vec![BitDescriptor::from_bool(false); 256];
        flags[0] = BitDescriptor::from_bool(true);
        let words = pack(&flags).unwrap().to_words();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0], BigUint::from(1u8) << 255);
    }

    #[test]
    fn test_short_bitstring_single_word_value() {
        // 16 flags: 1111 1100 0000 0000 -> 0xFC00
        let mut flags = vec![BitDescriptor::from_bool(false); 16];
        for f in flags.iter_mut().take(6) {
            *f = BitDescriptor::from_bool(true);
        }
        let words = pack(&flags).unwrap().to_words();
        assert_eq!(words, vec![BigUint::from(0xFC00u32)]);
    }

    #[test]
    fn test_sub_byte_padding_dropped_from_word() {
        // 3 bits "101": value 5, not 0b1010_0000
        let packed = pack(&[
            BitDescriptor::from_bool(true),
            BitDescriptor::from_bool(false),
            BitDescriptor::from_bool(true),
        ])
        .unwrap();
        assert_eq!(packed.to_words(), vec![BigUint::from(5u8)]);
    }

    #[test]
    fn test_word_split_exact_chunks() {
        // 256 exponent bytes = 2048 bits = 8 words
        let descriptors: Vec<BitDescriptor> =
            (0..256).map(|i| BitDescriptor::from_uint8(i as u8)).collect();
        let packed = pack(&descriptors).unwrap();
        let words = packed.to_words();
        assert_eq!(words.len(), 8);

        // Each word is the big-endian value of its 32-byte window and
        // round-trips independently
        for (w, chunk) in words.iter().zip(packed.as_bytes().chunks(32)) {
            assert_eq!(*w, BigUint::from_bytes_be(chunk));
            let mut bytes = w.to_bytes_be();
            while bytes.len() < 32 {
                bytes.insert(0, 0);
            }
            assert_eq!(bytes, chunk);
        }
    }

    #[test]
    fn test_final_partial_window_right_padded() {
        // 34 bytes of descriptors: second window carries 2 bytes shifted to
        // the most-significant end
        let descriptors: Vec<BitDescriptor> =
            (0..34).map(|_| BitDescriptor::from_uint8(0xAB)).collect();
        let words = pack(&descriptors).unwrap().to_words();
        assert_eq!(words.len(), 2);
        let expected = BigUint::from(0xABABu32) << 240;
        assert_eq!(words[1], expected);
    }

    #[test]
    fn test_empty_descriptor_sequence() {
        let packed = pack(&[]).unwrap();
        assert_eq!(packed.bit_len(), 0);
        assert_eq!(packed.to_words(), vec![BigUint::default()]);
        assert_eq!(unpack(&packed, &[]).unwrap(), vec![]);
    }
}
