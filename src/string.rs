//! Byte-string codecs.
//!
//! Two wire encodings are supported:
//!
//! - **Counted** strings: a length prefix (1, 2, 4 or 8 bytes, in any [`ByteOrder`])
//!   followed by the payload. The decoded count is multiplied by a configurable
//!   multiplier to get the payload size in bytes. The payload may be stored with
//!   the two bytes of each 16-bit word swapped, as PCCC string data files do; a
//!   swapped payload of odd length occupies one extra pad byte on the wire.
//! - **Terminated** strings: the payload followed by a sentinel byte. With word
//!   swap the payload and sentinel are padded to whole 16-bit words and swapped
//!   together, and the sentinel is searched for in logical byte order.
//!
//! Decoding never copies. It yields views into the input buffer, and a
//! [`ByteString`] undoes any word swap only when its bytes are copied out.
//!
//! The fixed-width helpers [`slice_to_string`] and [`string_to_slice`] convert
//! between a raw tag buffer and a NUL-terminated text buffer.
//!
//! # Example
//!
//! ```
//! use ab_server::{decode_counted, encode_counted, ByteOrder, CountedFormat, Slice, SliceMut, Width};
//!
//! let format = CountedFormat::new(Width::Two, ByteOrder::LITTLE);
//! let mut buf = [0u8; 8];
//! let written = encode_counted(&mut SliceMut::new(&mut buf), &format, b"AB").unwrap();
//! assert_eq!(written, 4);
//! assert_eq!(&buf[..4], &[0x02, 0x00, b'A', b'B']);
//!
//! let (text, consumed) = decode_counted(Slice::new(&buf), &format).unwrap();
//! assert_eq!(consumed, 4);
//! assert_eq!(text.to_vec(), b"AB");
//! ```

use crate::byte_order::{swap_word_bytes, ByteOrder, Width};
use crate::error::{AbError, Result};
use crate::scalar::ScalarRead;
use crate::slice::{Bounded, Slice, SliceMut};

/// Layout of a counted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountedFormat {
    /// Width of the length prefix.
    pub count_width: Width,
    /// Byte order of the length prefix.
    pub order: ByteOrder,
    /// Bytes per counted unit.
    pub multiplier: u32,
    /// Payload stored with the bytes of each 16-bit word swapped.
    pub word_swap: bool,
}

impl CountedFormat {
    /// CIP `STRING`: 4-byte little-endian character count.
    pub const CIP_STRING: CountedFormat = CountedFormat::new(Width::Four, ByteOrder::LITTLE);

    /// PCCC `ST` element: 2-byte little-endian character count, word-swapped text.
    pub const PCCC_STRING: CountedFormat =
        CountedFormat::new(Width::Two, ByteOrder::LITTLE).with_word_swap(true);

    /// Creates a format with a multiplier of 1 and no payload swap.
    pub const fn new(count_width: Width, order: ByteOrder) -> Self {
        Self {
            count_width,
            order,
            multiplier: 1,
            word_swap: false,
        }
    }

    /// Sets the number of payload bytes per counted unit.
    pub const fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets whether the payload is word-swapped.
    pub const fn with_word_swap(mut self, word_swap: bool) -> Self {
        self.word_swap = word_swap;
        self
    }

    fn check_multiplier(&self) -> Result<usize> {
        if self.multiplier == 0 {
            return Err(AbError::bad_input("string count multiplier must not be zero"));
        }
        Ok(self.multiplier as usize)
    }
}

/// Layout of a sentinel-terminated string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminatedFormat {
    /// Byte that ends the payload.
    pub terminator: u8,
    /// Treat the end of the slice as a terminator when no sentinel is present.
    pub allow_unterminated: bool,
    /// Payload and sentinel stored with the bytes of each 16-bit word swapped.
    pub word_swap: bool,
}

impl TerminatedFormat {
    /// NUL-terminated, sentinel required.
    pub const NUL: TerminatedFormat = TerminatedFormat::new(0);

    /// Creates a format that requires `terminator` to be present.
    pub const fn new(terminator: u8) -> Self {
        Self {
            terminator,
            allow_unterminated: false,
            word_swap: false,
        }
    }

    /// Accepts a payload that runs to the end of the slice.
    pub const fn allow_unterminated(mut self) -> Self {
        self.allow_unterminated = true;
        self
    }

    /// Sets whether the payload is word-swapped.
    pub const fn with_word_swap(mut self, word_swap: bool) -> Self {
        self.word_swap = word_swap;
        self
    }
}

/// A decoded byte string: a view over its wire bytes, undoing word swap on copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteString<'a> {
    raw: Slice<'a>,
    len: usize,
    word_swapped: bool,
}

impl<'a> ByteString<'a> {
    /// An empty string positioned at `pos`.
    pub fn empty_at(pos: usize) -> Self {
        Self {
            raw: Slice::empty_at(pos),
            len: 0,
            word_swapped: false,
        }
    }

    /// Wire bytes of the payload, including a swap pad byte if present.
    pub fn raw(&self) -> Slice<'a> {
        self.raw
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the wire bytes are word-swapped.
    pub fn is_word_swapped(&self) -> bool {
        self.word_swapped
    }

    /// Returns payload byte `index` in logical order.
    pub fn byte(&self, index: usize) -> Option<u8> {
        if index >= self.len {
            return None;
        }
        let physical = if self.word_swapped { index ^ 1 } else { index };
        self.raw.as_bytes().get(physical).copied()
    }

    /// Copies the payload into `dest` in logical order and returns its length.
    ///
    /// # Errors
    ///
    /// Returns `AbError::NoResource` if `dest` is shorter than the payload.
    pub fn copy_to(&self, dest: &mut [u8]) -> Result<usize> {
        if dest.len() < self.len {
            return Err(AbError::no_resource(self.len, dest.len()));
        }
        let raw = self.raw.as_bytes();
        if self.word_swapped {
            for (i, out) in dest[..self.len].iter_mut().enumerate() {
                *out = raw[i ^ 1];
            }
        } else {
            dest[..self.len].copy_from_slice(&raw[..self.len]);
        }
        Ok(self.len)
    }

    /// Returns the payload in logical order.
    pub fn to_vec(&self) -> Vec<u8> {
        (0..self.len).filter_map(|i| self.byte(i)).collect()
    }
}

impl Default for ByteString<'_> {
    fn default() -> Self {
        Self::empty_at(0)
    }
}

impl<'a> From<Slice<'a>> for ByteString<'a> {
    fn from(raw: Slice<'a>) -> Self {
        Self {
            len: raw.len(),
            raw,
            word_swapped: false,
        }
    }
}

#[inline]
fn padded_len(len: usize, word_swap: bool) -> usize {
    if word_swap {
        len + (len & 1)
    } else {
        len
    }
}

/// Decodes a counted string at the start of `data`.
///
/// Returns the payload and the number of bytes consumed (prefix plus payload).
///
/// # Errors
///
/// - `AbError::OutOfBounds` if the prefix or the payload does not fit in `data`,
///   or the scaled count overflows.
/// - `AbError::BadInput` if the multiplier is zero.
pub fn decode_counted<'a>(data: Slice<'a>, format: &CountedFormat) -> Result<(ByteString<'a>, usize)> {
    let multiplier = format.check_multiplier()?;
    let prefix = format.count_width.bytes();
    let count = data.get_uint(0, format.count_width, format.order)?;

    let len = usize::try_from(count)
        .ok()
        .and_then(|c| c.checked_mul(multiplier))
        .ok_or_else(|| AbError::out_of_bounds(prefix, usize::MAX, data.len()))?;
    let span = if format.word_swap {
        len.checked_add(len & 1)
            .ok_or_else(|| AbError::out_of_bounds(prefix, len, data.len()))?
    } else {
        len
    };

    let body_start = data.start() + prefix;
    let body_end = body_start
        .checked_add(span)
        .ok_or_else(|| AbError::out_of_bounds(prefix, span, data.len()))?;
    if body_end > data.end() {
        return Err(AbError::out_of_bounds(prefix, span, data.len()));
    }
    let raw = data.sub_slice(body_start, body_end)?;

    Ok((
        ByteString {
            raw,
            len,
            word_swapped: format.word_swap,
        },
        prefix + span,
    ))
}

/// Encodes `payload` as a counted string at the start of `dest`.
///
/// Returns the number of bytes written. Nothing is written on failure.
///
/// # Errors
///
/// - `AbError::BadInput` if the multiplier is zero, the payload length is not a
///   multiple of it, or the count does not fit the prefix width.
/// - `AbError::OutOfBounds` if `dest` cannot hold the prefix and payload.
pub fn encode_counted(dest: &mut SliceMut<'_>, format: &CountedFormat, payload: &[u8]) -> Result<usize> {
    let multiplier = format.check_multiplier()?;
    if payload.len() % multiplier != 0 {
        return Err(AbError::bad_input(format!(
            "string length {} is not a multiple of {}",
            payload.len(),
            multiplier
        )));
    }

    let count = (payload.len() / multiplier) as u64;
    let width = format.count_width;
    if width != Width::Eight && count >> width.bits() != 0 {
        return Err(AbError::bad_input(format!(
            "string count {} does not fit in a {}-byte prefix",
            count, width
        )));
    }

    let prefix = width.bytes();
    let span = padded_len(payload.len(), format.word_swap);
    dest.check_access(0, prefix + span)?;

    let body = &mut dest.as_bytes_mut()[prefix..prefix + span];
    body[..payload.len()].copy_from_slice(payload);
    body[payload.len()..].fill(0);
    if format.word_swap {
        swap_word_bytes(body)?;
    }
    dest.set_uint(0, width, format.order, count)?;

    Ok(prefix + span)
}

/// Decodes a terminated string at the start of `data`.
///
/// Returns the payload (without the sentinel) and the number of bytes consumed,
/// which includes the sentinel and any swap pad byte when a sentinel was found.
/// With word swap only whole 16-bit words are searched.
///
/// # Errors
///
/// - `AbError::OutOfBounds` if no sentinel is present and the format does not
///   allow unterminated payloads.
/// - `AbError::BadInput` if an unterminated word-swapped payload has an odd length.
pub fn decode_terminated<'a>(data: Slice<'a>, format: &TerminatedFormat) -> Result<(ByteString<'a>, usize)> {
    let raw = data.as_bytes();
    let found = if format.word_swap {
        (0..raw.len() & !1).find(|&i| raw[i ^ 1] == format.terminator)
    } else {
        raw.iter().position(|&b| b == format.terminator)
    };

    let (len, consumed) = match found {
        Some(len) => (len, padded_len(len + 1, format.word_swap)),
        None if format.allow_unterminated => {
            if format.word_swap && raw.len() % 2 != 0 {
                return Err(AbError::bad_input(format!(
                    "word-swapped string data must have an even length, got {}",
                    raw.len()
                )));
            }
            (raw.len(), raw.len())
        }
        None => return Err(AbError::out_of_bounds(0, data.len() + 1, data.len())),
    };

    let body = data.sub_slice(data.start(), data.start() + padded_len(len, format.word_swap))?;
    Ok((
        ByteString {
            raw: body,
            len,
            word_swapped: format.word_swap,
        },
        consumed,
    ))
}

/// Encodes `payload` followed by the sentinel at the start of `dest`.
///
/// With word swap, payload and sentinel are padded with a zero byte to an even
/// length before the bytes of each word are exchanged. Returns the number of
/// bytes written. Nothing is written on failure.
///
/// # Errors
///
/// - `AbError::BadInput` if the payload contains the sentinel byte.
/// - `AbError::OutOfBounds` if `dest` cannot hold the payload and sentinel.
pub fn encode_terminated(dest: &mut SliceMut<'_>, format: &TerminatedFormat, payload: &[u8]) -> Result<usize> {
    if payload.contains(&format.terminator) {
        return Err(AbError::bad_input(format!(
            "payload contains the terminator byte 0x{:02X}",
            format.terminator
        )));
    }
    let total = padded_len(payload.len() + 1, format.word_swap);
    dest.check_access(0, total)?;

    let out = &mut dest.as_bytes_mut()[..total];
    out[..payload.len()].copy_from_slice(payload);
    out[payload.len()] = format.terminator;
    out[payload.len() + 1..].fill(0);
    if format.word_swap {
        swap_word_bytes(out)?;
    }
    Ok(total)
}

/// Copies raw string data into a text buffer, NUL-terminating it.
///
/// With `byte_swap` the two bytes of every 16-bit word are exchanged. Bytes of
/// `result` past the data are zeroed.
///
/// # Errors
///
/// - `AbError::BadInput` if `byte_swap` is set and the data length is odd.
/// - `AbError::OutOfBounds` if `result` cannot hold the data plus a NUL.
pub fn slice_to_string(slice: Slice<'_>, result: &mut [u8], byte_swap: bool) -> Result<()> {
    let data = slice.as_bytes();
    if byte_swap && data.len() % 2 != 0 {
        return Err(AbError::bad_input(format!(
            "byte-swapped string data must have an even length, got {}",
            data.len()
        )));
    }
    if data.len() + 1 > result.len() {
        return Err(AbError::out_of_bounds(0, data.len() + 1, result.len()));
    }

    for (i, out) in result.iter_mut().enumerate() {
        let index = if byte_swap { i ^ 1 } else { i };
        *out = if i < data.len() { data[index] } else { 0 };
    }
    Ok(())
}

/// Copies text into a raw string buffer and truncates `dest` to the bytes used.
///
/// With `byte_swap` the two bytes of every 16-bit word are exchanged and an odd
/// length is padded with one zero byte.
///
/// # Errors
///
/// Returns `AbError::NoResource` if `dest` is too small; `dest` is unchanged.
pub fn string_to_slice(source: &[u8], dest: &mut SliceMut<'_>, byte_swap: bool) -> Result<()> {
    let required = padded_len(source.len(), byte_swap);
    if required > dest.len() {
        return Err(AbError::no_resource(required, dest.len()));
    }

    let out = dest.as_bytes_mut();
    for i in 0..required {
        let index = if byte_swap { i ^ 1 } else { i };
        out[index] = source.get(i).copied().unwrap_or(0);
    }
    dest.truncate_to_len(required)
}
