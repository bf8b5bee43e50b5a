//! Tag definitions and tag storage.
//!
//! A tag is a named, typed block of element data exposed by the emulated PLC.
//! CIP controllers address tags by name, PCCC controllers by data file number.
//!
//! # Tag syntax
//!
//! | Family | Syntax | Example |
//! |--------|--------|---------|
//! | CIP | `<name>:<type>[<d1>[,<d2>[,<d3>]]]` | `MyTag:DINT[10,10]` |
//! | PCCC | `<file><number>[<size>]` | `N7[10]`, `ST18[4]` |
//!
//! CIP types: `BOOL`, `SINT`, `INT`, `DINT`, `LINT`, `USINT`, `UINT`, `UDINT`,
//! `ULINT`, `REAL`, `LREAL`, `STRING`. PCCC files: `N` (INT), `L` (DINT),
//! `F` (REAL), `ST` (STRING).
//!
//! # Example
//!
//! ```
//! use ab_server::{CipType, TagDef, TagType};
//!
//! let def = TagDef::parse_cip("MyTag:DINT[10,10]").unwrap();
//! assert_eq!(def.name, "MyTag");
//! assert_eq!(def.tag_type, TagType::Cip(CipType::Dint));
//! assert_eq!(def.elem_count(), 100);
//! ```

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use tracing::{trace, warn};

use crate::byte_order::{ByteOrder, Width};
use crate::error::{AbError, Result};
use crate::format::{Directive, ScalarFormat};
use crate::slice::{Slice, SliceMut};
use crate::string::CountedFormat;

/// Maximum number of array dimensions of a CIP tag.
pub const MAX_DIMENSIONS: usize = 3;

/// Largest tag data block, in bytes, that a definition may describe (16 MiB).
pub const MAX_TAG_BYTES: usize = 1 << 24;

/// CIP element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CipType {
    /// 8-bit boolean.
    Bool,
    /// Signed 8-bit integer.
    Sint,
    /// Signed 16-bit integer.
    Int,
    /// Signed 32-bit integer.
    Dint,
    /// Signed 64-bit integer.
    Lint,
    /// Unsigned 8-bit integer.
    Usint,
    /// Unsigned 16-bit integer.
    Uint,
    /// Unsigned 32-bit integer.
    Udint,
    /// Unsigned 64-bit integer.
    Ulint,
    /// IEEE-754 single.
    Real,
    /// IEEE-754 double.
    Lreal,
    /// 88-byte string: 4-byte count, 82 bytes of text, 2 bytes of padding.
    String,
}

impl CipType {
    const ALL: [CipType; 12] = [
        CipType::Bool,
        CipType::Sint,
        CipType::Int,
        CipType::Dint,
        CipType::Lint,
        CipType::Usint,
        CipType::Uint,
        CipType::Udint,
        CipType::Ulint,
        CipType::Real,
        CipType::Lreal,
        CipType::String,
    ];

    /// Returns the CIP type code.
    pub fn code(self) -> u16 {
        match self {
            CipType::Bool => 0x00C1,
            CipType::Sint => 0x00C2,
            CipType::Int => 0x00C3,
            CipType::Dint => 0x00C4,
            CipType::Lint => 0x00C5,
            CipType::Usint => 0x00C6,
            CipType::Uint => 0x00C7,
            CipType::Udint => 0x00C8,
            CipType::Ulint => 0x00C9,
            CipType::Real => 0x00CA,
            CipType::Lreal => 0x00CB,
            CipType::String => 0x00D0,
        }
    }

    /// Looks up a type by its CIP code.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Returns the size of one element in bytes.
    pub fn elem_size(self) -> usize {
        match self {
            CipType::Bool | CipType::Sint | CipType::Usint => 1,
            CipType::Int | CipType::Uint => 2,
            CipType::Dint | CipType::Udint | CipType::Real => 4,
            CipType::Lint | CipType::Ulint | CipType::Lreal => 8,
            CipType::String => 88,
        }
    }

    /// Returns the type name used in tag definitions.
    pub fn name(self) -> &'static str {
        match self {
            CipType::Bool => "BOOL",
            CipType::Sint => "SINT",
            CipType::Int => "INT",
            CipType::Dint => "DINT",
            CipType::Lint => "LINT",
            CipType::Usint => "USINT",
            CipType::Uint => "UINT",
            CipType::Udint => "UDINT",
            CipType::Ulint => "ULINT",
            CipType::Real => "REAL",
            CipType::Lreal => "LREAL",
            CipType::String => "STRING",
        }
    }

    /// Parses a type name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

/// PCCC data file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PcccType {
    /// `N` file: signed 16-bit integer.
    Int,
    /// `L` file: signed 32-bit integer.
    Dint,
    /// `F` file: IEEE-754 single.
    Real,
    /// `ST` file: 2-byte count and 82 bytes of word-swapped text.
    String,
}

impl PcccType {
    const ALL: [PcccType; 4] = [PcccType::Int, PcccType::Dint, PcccType::Real, PcccType::String];

    /// Returns the PCCC type code.
    pub fn code(self) -> u8 {
        match self {
            PcccType::Int => 0x89,
            PcccType::Dint => 0x91,
            PcccType::Real => 0x8A,
            PcccType::String => 0x8D,
        }
    }

    /// Looks up a type by its PCCC code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Returns the size of one element in bytes.
    pub fn elem_size(self) -> usize {
        match self {
            PcccType::Int => 2,
            PcccType::Dint | PcccType::Real => 4,
            PcccType::String => 84,
        }
    }

    /// Returns the data file prefix letter(s).
    pub fn file_prefix(self) -> &'static str {
        match self {
            PcccType::Int => "N",
            PcccType::Dint => "L",
            PcccType::Real => "F",
            PcccType::String => "ST",
        }
    }

    /// Parses a data file prefix, ignoring case.
    pub fn from_file_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.file_prefix().eq_ignore_ascii_case(prefix))
    }
}

/// Element type of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagType {
    /// CIP (Logix-style) tag.
    Cip(CipType),
    /// PCCC data file.
    Pccc(PcccType),
}

impl TagType {
    /// Returns the size of one element in bytes.
    pub fn elem_size(self) -> usize {
        match self {
            TagType::Cip(t) => t.elem_size(),
            TagType::Pccc(t) => t.elem_size(),
        }
    }

    /// Layout of the leading value of one element, as fed to the codec.
    ///
    /// PCCC 32-bit values are stored as word-swapped pairs of 16-bit words.
    pub fn element_directive(self) -> Directive {
        let le = ScalarFormat::le;
        match self {
            TagType::Cip(t) => match t {
                CipType::Bool | CipType::Usint => Directive::Unsigned(le(Width::One)),
                CipType::Sint => Directive::Signed(le(Width::One)),
                CipType::Int => Directive::Signed(le(Width::Two)),
                CipType::Dint => Directive::Signed(le(Width::Four)),
                CipType::Lint => Directive::Signed(le(Width::Eight)),
                CipType::Uint => Directive::Unsigned(le(Width::Two)),
                CipType::Udint => Directive::Unsigned(le(Width::Four)),
                CipType::Ulint => Directive::Unsigned(le(Width::Eight)),
                CipType::Real => Directive::Float(le(Width::Four)),
                CipType::Lreal => Directive::Float(le(Width::Eight)),
                CipType::String => Directive::Counted(CountedFormat::CIP_STRING),
            },
            TagType::Pccc(t) => {
                let swapped = ScalarFormat::new(Width::Four, ByteOrder::LITTLE_WORD_SWAPPED);
                match t {
                    PcccType::Int => Directive::Signed(le(Width::Two)),
                    PcccType::Dint => Directive::Signed(swapped),
                    PcccType::Real => Directive::Float(swapped),
                    PcccType::String => Directive::Counted(CountedFormat::PCCC_STRING),
                }
            }
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagType::Cip(t) => write!(f, "{}", t.name()),
            TagType::Pccc(t) => write!(f, "{}", t.file_prefix()),
        }
    }
}

/// A parsed tag definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagDef {
    /// Tag name; for PCCC tags the data file name such as `N7`.
    pub name: String,
    /// Element type.
    pub tag_type: TagType,
    /// Array dimensions (1 to 3).
    pub dimensions: Vec<usize>,
    /// PCCC data file number.
    pub data_file: Option<u16>,
}

/// Splits `TYPE[1,2,3]` into `TYPE` and its dimensions.
fn split_dimensions(text: &str) -> Result<(&str, Vec<usize>)> {
    let (head, rest) = text
        .split_once('[')
        .ok_or_else(|| AbError::bad_input(format!("tag '{}' is missing array dimensions", text)))?;
    let dims = rest
        .strip_suffix(']')
        .ok_or_else(|| AbError::bad_input(format!("tag '{}' is missing a closing ']'", text)))?;

    let dimensions = dims
        .split(',')
        .map(|d| match d.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(AbError::bad_input(format!(
                "invalid dimension '{}' in tag '{}'",
                d, text
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    if dimensions.len() > MAX_DIMENSIONS {
        return Err(AbError::bad_input(format!(
            "tag '{}' has more than {} dimensions",
            text, MAX_DIMENSIONS
        )));
    }
    Ok((head, dimensions))
}

fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AbError::bad_input(format!(
            "tag name '{}' must be alphanumeric and start with a letter",
            name
        )))
    }
}

impl TagDef {
    /// Parses a CIP tag definition, `<name>:<type>[<dims>]`.
    ///
    /// # Errors
    ///
    /// Returns `AbError::BadInput` for a malformed name, an unknown type,
    /// missing, zero or more than three dimensions, or data larger than
    /// [`MAX_TAG_BYTES`].
    pub fn parse_cip(text: &str) -> Result<Self> {
        let (name, rest) = text
            .split_once(':')
            .ok_or_else(|| AbError::bad_input(format!("tag '{}' must be <name>:<type>[<sizes>]", text)))?;
        check_name(name)?;

        let (type_name, dimensions) = split_dimensions(rest)?;
        let cip_type = CipType::from_name(type_name)
            .ok_or_else(|| AbError::bad_input(format!("unknown CIP type '{}'", type_name)))?;

        let def = Self {
            name: name.to_string(),
            tag_type: TagType::Cip(cip_type),
            dimensions,
            data_file: None,
        };
        def.validate()?;
        Ok(def)
    }

    /// Parses a PCCC data file definition, `<file><number>[<size>]`.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_server::{PcccType, TagDef, TagType};
    ///
    /// let def = TagDef::parse_pccc("ST18[4]").unwrap();
    /// assert_eq!(def.tag_type, TagType::Pccc(PcccType::String));
    /// assert_eq!(def.data_file, Some(18));
    /// assert_eq!(def.elem_count(), 4);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `AbError::BadInput` for an unknown file letter, a missing file
    /// number, a size other than one non-zero dimension, or data larger than
    /// [`MAX_TAG_BYTES`].
    pub fn parse_pccc(text: &str) -> Result<Self> {
        let (file, dimensions) = split_dimensions(text)?;
        if dimensions.len() != 1 {
            return Err(AbError::bad_input(format!(
                "data file '{}' takes exactly one size",
                text
            )));
        }

        let digits_at = file
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| AbError::bad_input(format!("data file '{}' has no file number", file)))?;
        let (prefix, number) = file.split_at(digits_at);
        let pccc_type = PcccType::from_file_prefix(prefix)
            .ok_or_else(|| AbError::bad_input(format!("unsupported data file type '{}'", prefix)))?;
        let data_file = number
            .parse::<u16>()
            .map_err(|_| AbError::bad_input(format!("invalid data file number '{}'", number)))?;

        let def = Self {
            name: format!("{}{}", pccc_type.file_prefix(), data_file),
            tag_type: TagType::Pccc(pccc_type),
            dimensions,
            data_file: Some(data_file),
        };
        def.validate()?;
        Ok(def)
    }

    /// Checks the dimensions and that the data size stays within [`MAX_TAG_BYTES`].
    ///
    /// Definitions built by the parsers are already valid; this covers ones
    /// assembled by hand or deserialized from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AbError::BadInput` for no, zero or too many dimensions, or for a
    /// size that overflows or exceeds the limit.
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.is_empty() || self.dimensions.len() > MAX_DIMENSIONS {
            return Err(AbError::bad_input(format!(
                "tag '{}' needs 1 to {} dimensions, got {}",
                self.name,
                MAX_DIMENSIONS,
                self.dimensions.len()
            )));
        }
        if self.dimensions.contains(&0) {
            return Err(AbError::bad_input(format!("tag '{}' has a zero dimension", self.name)));
        }

        let bytes = self
            .dimensions
            .iter()
            .try_fold(self.tag_type.elem_size(), |acc, &d| acc.checked_mul(d))
            .filter(|&n| n <= MAX_TAG_BYTES);
        match bytes {
            Some(_) => Ok(()),
            None => Err(AbError::bad_input(format!(
                "tag '{}' {:?} is larger than {} bytes",
                self.name, self.dimensions, MAX_TAG_BYTES
            ))),
        }
    }

    /// Total number of elements, saturating at `usize::MAX`.
    pub fn elem_count(&self) -> usize {
        self.dimensions
            .iter()
            .fold(1usize, |acc, &d| acc.saturating_mul(d))
    }

    /// Size of the tag data in bytes, saturating at `usize::MAX`.
    pub fn byte_len(&self) -> usize {
        self.elem_count().saturating_mul(self.tag_type.elem_size())
    }
}

/// A tag with its data, guarded by a per-tag mutex.
///
/// All access to the data goes through [`with_data`](Tag::with_data) or
/// [`with_data_mut`](Tag::with_data_mut), which hold the lock for the whole
/// closure so at most one reader or writer touches the tag at a time.
#[derive(Debug)]
pub struct Tag {
    def: TagDef,
    data: Mutex<Vec<u8>>,
}

impl Tag {
    /// Creates a tag with zero-filled data.
    ///
    /// # Errors
    ///
    /// Returns `AbError::BadInput` if the definition fails [`TagDef::validate`].
    pub fn new(def: TagDef) -> Result<Self> {
        def.validate()?;
        let data = vec![0u8; def.byte_len()];
        Ok(Self {
            def,
            data: Mutex::new(data),
        })
    }

    /// Tag name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Element type.
    pub fn tag_type(&self) -> TagType {
        self.def.tag_type
    }

    /// Size of one element in bytes.
    pub fn elem_size(&self) -> usize {
        self.def.tag_type.elem_size()
    }

    /// Number of elements.
    pub fn elem_count(&self) -> usize {
        self.def.elem_count()
    }

    /// Array dimensions.
    pub fn dimensions(&self) -> &[usize] {
        &self.def.dimensions
    }

    /// PCCC data file number.
    pub fn data_file(&self) -> Option<u16> {
        self.def.data_file
    }

    /// The definition this tag was built from.
    pub fn def(&self) -> &TagDef {
        &self.def
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        trace!(tag = %self.def.name, "locking tag data");
        self.data.lock().unwrap_or_else(|poisoned| {
            warn!(tag = %self.def.name, "tag lock was poisoned, recovering data");
            poisoned.into_inner()
        })
    }

    /// Runs `f` over a shared view of the tag data while holding the lock.
    pub fn with_data<R>(&self, f: impl FnOnce(Slice<'_>) -> Result<R>) -> Result<R> {
        let guard = self.lock();
        f(Slice::new(&guard))
    }

    /// Runs `f` over an exclusive view of the tag data while holding the lock.
    pub fn with_data_mut<R>(&self, f: impl FnOnce(SliceMut<'_>) -> Result<R>) -> Result<R> {
        let mut guard = self.lock();
        f(SliceMut::new(&mut guard))
    }

    fn element_range(&self, first: usize, count: usize) -> Result<(usize, usize)> {
        let size = self.elem_size();
        let start = first.checked_mul(size);
        let end = first
            .checked_add(count)
            .and_then(|last| last.checked_mul(size));
        match (start, end) {
            (Some(start), Some(end)) if end <= self.def.byte_len() => Ok((start, end)),
            _ => Err(AbError::out_of_bounds(
                first.saturating_mul(size),
                count.saturating_mul(size),
                self.def.byte_len(),
            )),
        }
    }

    /// Copies `count` elements starting at element `first` into `out`.
    ///
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// - `AbError::OutOfBounds` if the element range exceeds the tag.
    /// - `AbError::NoResource` if `out` is too small.
    pub fn read(&self, first: usize, count: usize, out: &mut [u8]) -> Result<usize> {
        let (start, end) = self.element_range(first, count)?;
        if out.len() < end - start {
            return Err(AbError::no_resource(end - start, out.len()));
        }
        self.with_data(|data| {
            let elements = data.sub_slice(start, end)?;
            out[..end - start].copy_from_slice(elements.as_bytes());
            Ok(end - start)
        })
    }

    /// Overwrites elements starting at element `first` with `bytes`.
    ///
    /// # Errors
    ///
    /// - `AbError::BadInput` if `bytes` is not a whole number of elements.
    /// - `AbError::OutOfBounds` if the element range exceeds the tag.
    pub fn write(&self, first: usize, bytes: &[u8]) -> Result<()> {
        let size = self.elem_size();
        if bytes.len() % size != 0 {
            return Err(AbError::bad_input(format!(
                "{} byte(s) is not a whole number of {}-byte elements",
                bytes.len(),
                size
            )));
        }
        let (start, end) = self.element_range(first, bytes.len() / size)?;
        self.with_data_mut(|mut data| {
            let mut elements = data.sub_slice(start, end)?;
            elements.as_bytes_mut().copy_from_slice(bytes);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Status;
    use crate::format::{decode, encode, Decode, Encode};
    use crate::scalar::ScalarRead;

    #[test]
    fn test_cip_codes() {
        assert_eq!(CipType::Bool.code(), 0xC1);
        assert_eq!(CipType::Lreal.code(), 0xCB);
        assert_eq!(CipType::String.code(), 0xD0);
        assert_eq!(CipType::from_code(0xC4), Some(CipType::Dint));
        assert_eq!(CipType::from_code(0xFF), None);
    }

    #[test]
    fn test_pccc_codes() {
        assert_eq!(PcccType::Int.code(), 0x89);
        assert_eq!(PcccType::Dint.code(), 0x91);
        assert_eq!(PcccType::from_code(0x8A), Some(PcccType::Real));
        assert_eq!(PcccType::String.elem_size(), 84);
    }

    #[test]
    fn test_parse_cip() {
        let def = TagDef::parse_cip("Counts:int[5]").unwrap();
        assert_eq!(def.name, "Counts");
        assert_eq!(def.tag_type, TagType::Cip(CipType::Int));
        assert_eq!(def.dimensions, vec![5]);
        assert_eq!(def.byte_len(), 10);

        let def = TagDef::parse_cip("Grid:LREAL[2,3,4]").unwrap();
        assert_eq!(def.elem_count(), 24);
        assert_eq!(def.byte_len(), 192);
    }

    #[test]
    fn test_parse_cip_errors() {
        for bad in [
            "NoType",
            "1Tag:DINT[1]",
            "Tag:DINT",
            "Tag:DINT[1",
            "Tag:DINT[0]",
            "Tag:DINT[1,2,3,4]",
            "Tag:WORD[1]",
            "Tag-x:DINT[1]",
            "A:LINT[4294967296,4294967296,4294967296]",
            "A:LINT[100000,100000,100000]",
            "A:SINT[16777217]",
        ] {
            let err = TagDef::parse_cip(bad).unwrap_err();
            assert_eq!(err.status(), Status::BadInput, "{}", bad);
        }
    }

    #[test]
    fn test_parse_pccc() {
        let def = TagDef::parse_pccc("N7[10]").unwrap();
        assert_eq!(def.name, "N7");
        assert_eq!(def.tag_type, TagType::Pccc(PcccType::Int));
        assert_eq!(def.data_file, Some(7));

        let def = TagDef::parse_pccc("l19[2]").unwrap();
        assert_eq!(def.name, "L19");
        assert_eq!(def.byte_len(), 8);

        assert!(TagDef::parse_pccc("B3[1]").is_err());
        assert!(TagDef::parse_pccc("N[1]").is_err());
        assert!(TagDef::parse_pccc("N7[1,2]").is_err());
        assert_eq!(
            TagDef::parse_pccc("ST9[1000000]").unwrap_err().status(),
            Status::BadInput
        );
    }

    #[test]
    fn test_size_limit() {
        let def = TagDef::parse_cip("Big:SINT[16777216]").unwrap();
        assert_eq!(def.byte_len(), MAX_TAG_BYTES);
        assert!(TagDef::parse_cip("Big:SINT[4096,4096,2]").is_err());

        let huge = TagDef {
            name: "Huge".to_string(),
            tag_type: TagType::Cip(CipType::Lint),
            dimensions: vec![usize::MAX, 2],
            data_file: None,
        };
        assert_eq!(huge.elem_count(), usize::MAX);
        assert_eq!(huge.byte_len(), usize::MAX);
        assert_eq!(Tag::new(huge).unwrap_err().status(), Status::BadInput);

        let flat = TagDef {
            name: "Flat".to_string(),
            tag_type: TagType::Cip(CipType::Int),
            dimensions: Vec::new(),
            data_file: None,
        };
        assert_eq!(flat.validate().unwrap_err().status(), Status::BadInput);
    }

    #[test]
    fn test_tag_read_write() {
        let tag = Tag::new(TagDef::parse_cip("Values:DINT[4]").unwrap()).unwrap();
        tag.write(1, &[1, 0, 0, 0, 2, 0, 0, 0]).unwrap();

        let mut out = [0u8; 8];
        assert_eq!(tag.read(1, 2, &mut out).unwrap(), 8);
        assert_eq!(out, [1, 0, 0, 0, 2, 0, 0, 0]);

        assert_eq!(tag.read(3, 2, &mut out).unwrap_err().status(), Status::OutOfBounds);
        assert_eq!(tag.write(0, &[1, 2, 3]).unwrap_err().status(), Status::BadInput);
        let mut small = [0u8; 2];
        assert_eq!(tag.read(0, 1, &mut small).unwrap_err().status(), Status::NoResource);
    }

    #[test]
    fn test_codec_on_tag_data() {
        let tag = Tag::new(TagDef::parse_pccc("L19[2]").unwrap()).unwrap();
        let directive = tag.tag_type().element_directive();
        let Directive::Signed(format) = directive else {
            panic!("unexpected directive {:?}", directive);
        };

        tag.with_data_mut(|mut data| {
            encode(&mut data, &[Encode::Signed(format, 0x1234_5678), Encode::Signed(format, -1)])
                .map(|_| ())
        })
        .unwrap();

        let mut out = [0u8; 4];
        tag.read(0, 1, &mut out).unwrap();
        assert_eq!(out, [0x34, 0x12, 0x78, 0x56]);

        let value = tag
            .with_data(|data| {
                let mut second = 0i64;
                let (_, rest) = data.split_at_offset(4)?;
                decode(rest, &mut [Decode::Signed(format, &mut second)])?;
                Ok(second)
            })
            .unwrap();
        assert_eq!(value, -1);
    }

    #[test]
    fn test_cip_string_element() {
        let tag = Tag::new(TagDef::parse_cip("Msg:STRING[1]").unwrap()).unwrap();
        let Directive::Counted(format) = tag.tag_type().element_directive() else {
            panic!("STRING must map to a counted string");
        };
        tag.with_data_mut(|mut data| {
            encode(&mut data, &[Encode::Counted(format, b"hello")]).map(|_| ())
        })
        .unwrap();
        let count = tag
            .with_data(|data| data.get_u32(0, ByteOrder::LITTLE))
            .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_display() {
        assert_eq!(TagType::Cip(CipType::Lreal).to_string(), "LREAL");
        assert_eq!(TagType::Pccc(PcccType::String).to_string(), "ST");
    }
}
