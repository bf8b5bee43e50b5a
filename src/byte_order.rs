//! Byte-order permutations for multi-byte fields.
//!
//! A [`Permutation`] maps the logical byte index of a value (0 = least significant)
//! to the physical offset inside the field where that byte is stored.
//!
//! # Word swap
//!
//! Legacy PLC data files store 32- and 64-bit values as a sequence of 16-bit words.
//! With word swap enabled the order of the *words* is reversed relative to the
//! field's endianness, while the two bytes of each word keep that endianness.
//! For a little-endian 4-byte field this gives the layout `[b2, b3, b0, b1]`.
//!
//! | Width | Endian | Word swap | Physical offset of logical byte 0..n |
//! |-------|--------|:---------:|--------------------------------------|
//! | 4 | little | no | `0 1 2 3` |
//! | 4 | big | no | `3 2 1 0` |
//! | 4 | little | yes | `2 3 0 1` |
//! | 4 | big | yes | `1 0 3 2` |
//!
//! Word swap has no effect on 1- and 2-byte fields.
//!
//! # Example
//!
//! ```
//! use ab_server::{ByteOrder, Width};
//!
//! let perm = ByteOrder::LITTLE_WORD_SWAPPED.permutation(Width::Four);
//! assert_eq!(perm.as_slice(), &[2, 3, 0, 1]);
//! ```

use std::fmt;

use crate::error::{AbError, Result};

/// Byte order within a 16-bit word and across the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endian {
    /// Least significant byte first (EtherNet/IP, CIP, PCCC).
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// Width of a scalar field in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Width {
    /// 1 byte.
    One,
    /// 2 bytes.
    Two,
    /// 4 bytes.
    Four,
    /// 8 bytes.
    Eight,
}

impl Width {
    /// Returns the width in bytes.
    pub fn bytes(self) -> usize {
        match self {
            Width::One => 1,
            Width::Two => 2,
            Width::Four => 4,
            Width::Eight => 8,
        }
    }

    /// Returns the width in bits.
    pub fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }
}

impl TryFrom<usize> for Width {
    type Error = AbError;

    fn try_from(bytes: usize) -> Result<Self> {
        match bytes {
            1 => Ok(Width::One),
            2 => Ok(Width::Two),
            4 => Ok(Width::Four),
            8 => Ok(Width::Eight),
            other => Err(AbError::bad_input(format!(
                "field width must be 1, 2, 4 or 8 bytes, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bytes())
    }
}

/// Endianness plus the word-swap flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteOrder {
    /// Byte order within the field (and within each word when swapped).
    pub endian: Endian,
    /// Reverse the order of 16-bit words.
    pub word_swap: bool,
}

impl ByteOrder {
    /// Plain little-endian.
    pub const LITTLE: ByteOrder = ByteOrder::new(Endian::Little, false);
    /// Plain big-endian.
    pub const BIG: ByteOrder = ByteOrder::new(Endian::Big, false);
    /// Little-endian words in big-endian word order (legacy PLC layout).
    pub const LITTLE_WORD_SWAPPED: ByteOrder = ByteOrder::new(Endian::Little, true);
    /// Big-endian words in little-endian word order.
    pub const BIG_WORD_SWAPPED: ByteOrder = ByteOrder::new(Endian::Big, true);

    /// Creates a byte order.
    pub const fn new(endian: Endian, word_swap: bool) -> Self {
        Self { endian, word_swap }
    }

    /// Computes the logical-to-physical byte mapping for a field of `width`.
    pub fn permutation(self, width: Width) -> Permutation {
        let n = width.bytes();
        let words = n / 2;
        let mut table = [0u8; 8];

        for (logical, slot) in table.iter_mut().enumerate().take(n) {
            let physical = if self.word_swap && n > 2 {
                let word = logical / 2;
                let byte = logical % 2;
                let (word_pos, byte_pos) = match self.endian {
                    Endian::Little => (words - 1 - word, byte),
                    Endian::Big => (word, 1 - byte),
                };
                word_pos * 2 + byte_pos
            } else {
                match self.endian {
                    Endian::Little => logical,
                    Endian::Big => n - 1 - logical,
                }
            };
            *slot = physical as u8;
        }

        Permutation { table, width }
    }
}

/// Logical-to-physical byte mapping for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permutation {
    table: [u8; 8],
    width: Width,
}

impl Permutation {
    /// Width of the field this mapping applies to.
    pub fn width(&self) -> Width {
        self.width
    }

    /// Physical offset of each logical byte, least significant first.
    pub fn as_slice(&self) -> &[u8] {
        &self.table[..self.width.bytes()]
    }

    /// Lays out the low `width` bytes of `value` in wire order.
    pub fn scatter(&self, value: u64, out: &mut [u8]) {
        for (logical, &physical) in self.as_slice().iter().enumerate() {
            out[physical as usize] = (value >> (logical * 8)) as u8;
        }
    }

    /// Assembles a value from bytes in wire order.
    pub fn gather(&self, bytes: &[u8]) -> u64 {
        self.as_slice()
            .iter()
            .enumerate()
            .fold(0u64, |acc, (logical, &physical)| {
                acc | (u64::from(bytes[physical as usize]) << (logical * 8))
            })
    }

    /// Applies the mapping to a field in place: the byte at logical position `i`
    /// moves to physical offset `self.as_slice()[i]`.
    pub fn apply(&self, field: &mut [u8]) {
        let n = self.width.bytes();
        let mut tmp = [0u8; 8];
        for (logical, &physical) in self.as_slice().iter().enumerate() {
            tmp[physical as usize] = field[logical];
        }
        field[..n].copy_from_slice(&tmp[..n]);
    }
}

/// Swaps the two bytes of every 16-bit word in `data`.
///
/// # Errors
///
/// Returns `AbError::BadInput` if `data` has an odd length.
pub fn swap_word_bytes(data: &mut [u8]) -> Result<()> {
    if data.len() % 2 != 0 {
        return Err(AbError::bad_input(format!(
            "word-swapped data must have an even length, got {}",
            data.len()
        )));
    }
    for pair in data.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
    Ok(())
}
