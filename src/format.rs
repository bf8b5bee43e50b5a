//! Format-driven encoding and decoding of whole messages.
//!
//! A message layout is an ordered list of fields. For decoding each field carries
//! the slot that receives its value ([`Decode`]); for encoding each field carries
//! the value to write ([`Encode`]). [`decode`] and [`encode`] walk the list in
//! order, and after every field the working slice is advanced past the bytes that
//! field consumed, so each field only ever sees the bytes that remain.
//!
//! The first failing field stops the walk and its error is returned unchanged.
//! Bytes written by earlier fields of the same [`encode`] call are **not** rolled
//! back: a failed encode leaves the destination partially written and it must not
//! be sent.
//!
//! # Example
//!
//! ```
//! use ab_server::{
//!     decode, encode, Bounded, ByteOrder, CountedFormat, Decode, Encode, ScalarFormat, Slice,
//!     SliceMut, Width,
//! };
//!
//! let name = CountedFormat::new(Width::One, ByteOrder::LITTLE);
//! let mut buf = [0u8; 16];
//! let written = encode(
//!     &mut SliceMut::new(&mut buf),
//!     &[
//!         Encode::Unsigned(ScalarFormat::le(Width::Two), 0x006F),
//!         Encode::Counted(name, b"N7"),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(written, 5);
//!
//! let mut command = 0u64;
//! let mut text = Default::default();
//! let rest = decode(
//!     Slice::new(&buf[..written]),
//!     &mut [
//!         Decode::Unsigned(ScalarFormat::le(Width::Two), &mut command),
//!         Decode::Counted(name, &mut text),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(command, 0x6F);
//! assert_eq!(text.to_vec(), b"N7");
//! assert!(rest.is_empty());
//! ```

use crate::byte_order::{ByteOrder, Width};
use crate::error::{AbError, Result};
use crate::scalar::{sign_extend, ScalarRead};
use crate::slice::{Slice, SliceMut};
use crate::string::{
    decode_counted, decode_terminated, encode_counted, encode_terminated, ByteString,
    CountedFormat, TerminatedFormat,
};

/// Width and byte order of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarFormat {
    /// Field width.
    pub width: Width,
    /// Byte order and word swap.
    pub order: ByteOrder,
}

impl ScalarFormat {
    /// Creates a scalar format.
    pub const fn new(width: Width, order: ByteOrder) -> Self {
        Self { width, order }
    }

    /// Little-endian field of `width`.
    pub const fn le(width: Width) -> Self {
        Self::new(width, ByteOrder::LITTLE)
    }

    /// Big-endian field of `width`.
    pub const fn be(width: Width) -> Self {
        Self::new(width, ByteOrder::BIG)
    }
}

/// One entry of a message layout, without a value attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Two's complement integer.
    Signed(ScalarFormat),
    /// Unsigned integer.
    Unsigned(ScalarFormat),
    /// IEEE-754 float; the width must be 4 or 8.
    Float(ScalarFormat),
    /// Length-prefixed byte string.
    Counted(CountedFormat),
    /// Sentinel-terminated byte string.
    Terminated(TerminatedFormat),
}

impl Directive {
    /// Size on the wire for fixed-size fields, `None` for strings.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Directive::Signed(f) | Directive::Unsigned(f) | Directive::Float(f) => {
                Some(f.width.bytes())
            }
            Directive::Counted(_) | Directive::Terminated(_) => None,
        }
    }
}

/// A field to decode together with the slot that receives its value.
#[derive(Debug)]
pub enum Decode<'s, 'a> {
    /// Signed integer, sign-extended into an `i64`.
    Signed(ScalarFormat, &'s mut i64),
    /// Unsigned integer, widened into a `u64`.
    Unsigned(ScalarFormat, &'s mut u64),
    /// 4-byte float.
    F32(ByteOrder, &'s mut f32),
    /// 8-byte float.
    F64(ByteOrder, &'s mut f64),
    /// Counted string; the slot receives a view into the input.
    Counted(CountedFormat, &'s mut ByteString<'a>),
    /// Terminated string; the slot receives a view into the input.
    Terminated(TerminatedFormat, &'s mut ByteString<'a>),
}

impl Decode<'_, '_> {
    /// The layout entry this field decodes.
    pub fn directive(&self) -> Directive {
        match self {
            Decode::Signed(f, _) => Directive::Signed(*f),
            Decode::Unsigned(f, _) => Directive::Unsigned(*f),
            Decode::F32(order, _) => Directive::Float(ScalarFormat::new(Width::Four, *order)),
            Decode::F64(order, _) => Directive::Float(ScalarFormat::new(Width::Eight, *order)),
            Decode::Counted(f, _) => Directive::Counted(*f),
            Decode::Terminated(f, _) => Directive::Terminated(*f),
        }
    }
}

/// A field to encode together with its value.
#[derive(Debug, Clone, Copy)]
pub enum Encode<'s> {
    /// Signed integer; must fit the field width.
    Signed(ScalarFormat, i64),
    /// Unsigned integer; must fit the field width.
    Unsigned(ScalarFormat, u64),
    /// 4-byte float.
    F32(ByteOrder, f32),
    /// 8-byte float.
    F64(ByteOrder, f64),
    /// Counted string payload.
    Counted(CountedFormat, &'s [u8]),
    /// Terminated string payload.
    Terminated(TerminatedFormat, &'s [u8]),
}

impl Encode<'_> {
    /// The layout entry this field encodes.
    pub fn directive(&self) -> Directive {
        match self {
            Encode::Signed(f, _) => Directive::Signed(*f),
            Encode::Unsigned(f, _) => Directive::Unsigned(*f),
            Encode::F32(order, _) => Directive::Float(ScalarFormat::new(Width::Four, *order)),
            Encode::F64(order, _) => Directive::Float(ScalarFormat::new(Width::Eight, *order)),
            Encode::Counted(f, _) => Directive::Counted(*f),
            Encode::Terminated(f, _) => Directive::Terminated(*f),
        }
    }
}

fn decode_field<'a>(data: Slice<'a>, field: &mut Decode<'_, 'a>) -> Result<usize> {
    match field {
        Decode::Signed(f, slot) => {
            **slot = sign_extend(data.get_uint(0, f.width, f.order)?, f.width);
            Ok(f.width.bytes())
        }
        Decode::Unsigned(f, slot) => {
            **slot = data.get_uint(0, f.width, f.order)?;
            Ok(f.width.bytes())
        }
        Decode::F32(order, slot) => {
            **slot = data.get_f32(0, *order)?;
            Ok(4)
        }
        Decode::F64(order, slot) => {
            **slot = data.get_f64(0, *order)?;
            Ok(8)
        }
        Decode::Counted(f, slot) => {
            let (text, used) = decode_counted(data, f)?;
            **slot = text;
            Ok(used)
        }
        Decode::Terminated(f, slot) => {
            let (text, used) = decode_terminated(data, f)?;
            **slot = text;
            Ok(used)
        }
    }
}

fn check_signed(value: i64, width: Width) -> Result<()> {
    if width == Width::Eight || sign_extend(value as u64, width) == value {
        Ok(())
    } else {
        Err(AbError::bad_input(format!(
            "value {} does not fit in a {}-byte signed field",
            value, width
        )))
    }
}

fn check_unsigned(value: u64, width: Width) -> Result<()> {
    if width == Width::Eight || value >> width.bits() == 0 {
        Ok(())
    } else {
        Err(AbError::bad_input(format!(
            "value {} does not fit in a {}-byte unsigned field",
            value, width
        )))
    }
}

fn encode_field(dest: &mut SliceMut<'_>, field: &Encode<'_>) -> Result<usize> {
    match *field {
        Encode::Signed(f, value) => {
            check_signed(value, f.width)?;
            dest.set_uint(0, f.width, f.order, value as u64)?;
            Ok(f.width.bytes())
        }
        Encode::Unsigned(f, value) => {
            check_unsigned(value, f.width)?;
            dest.set_uint(0, f.width, f.order, value)?;
            Ok(f.width.bytes())
        }
        Encode::F32(order, value) => {
            dest.set_f32(0, order, value)?;
            Ok(4)
        }
        Encode::F64(order, value) => {
            dest.set_f64(0, order, value)?;
            Ok(8)
        }
        Encode::Counted(f, payload) => encode_counted(dest, &f, payload),
        Encode::Terminated(f, payload) => encode_terminated(dest, &f, payload),
    }
}

/// Decodes `fields` in order from the start of `data`.
///
/// Returns the unconsumed remainder of `data`.
///
/// # Errors
///
/// Returns the error of the first field that fails; slots of earlier fields have
/// already been filled.
pub fn decode<'a>(data: Slice<'a>, fields: &mut [Decode<'_, 'a>]) -> Result<Slice<'a>> {
    let mut rest = data;
    for field in fields.iter_mut() {
        let used = decode_field(rest, field)?;
        rest.advance(used)?;
    }
    Ok(rest)
}

/// Encodes `fields` in order at the start of `dest`.
///
/// Returns the number of bytes written. `dest` itself is not advanced.
///
/// # Errors
///
/// Returns the error of the first field that fails. Earlier fields stay written.
///
/// # Example
///
/// ```
/// use ab_server::{encode, ByteOrder, CountedFormat, Encode, ScalarFormat, SliceMut, Status, Width};
///
/// let mut buf = [0u8; 3];
/// let err = encode(
///     &mut SliceMut::new(&mut buf),
///     &[
///         Encode::Unsigned(ScalarFormat::le(Width::Two), 0x1234),
///         Encode::Counted(CountedFormat::new(Width::Two, ByteOrder::LITTLE), b"AB"),
///     ],
/// )
/// .unwrap_err();
/// assert_eq!(err.status(), Status::OutOfBounds);
/// assert_eq!(buf, [0x34, 0x12, 0x00]);
/// ```
pub fn encode(dest: &mut SliceMut<'_>, fields: &[Encode<'_>]) -> Result<usize> {
    let mut rest = dest.reborrow();
    let mut written = 0;
    for field in fields {
        let used = encode_field(&mut rest, field)?;
        rest.advance(used)?;
        written += used;
    }
    Ok(written)
}
