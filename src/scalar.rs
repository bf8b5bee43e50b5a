//! Typed scalar access at an offset inside a slice.
//!
//! Reads are provided for both views through the [`ScalarRead`] trait; writes are
//! inherent methods on [`SliceMut`]. Every access first checks that the offset is
//! inside the view and that the whole field fits before the end, and fails with
//! `AbError::OutOfBounds` otherwise. Values are assembled byte by byte through the
//! [`Permutation`](crate::Permutation) of the requested [`ByteOrder`], so the same
//! code handles little-endian, big-endian and word-swapped fields.
//!
//! Floats are a bit-level reinterpretation of the unsigned integer of the same
//! width. NaN payloads, infinities and denormals pass through unchanged.
//!
//! # Example
//!
//! ```
//! use ab_server::{ByteOrder, ScalarRead, Slice, SliceMut};
//!
//! let mut buf = [0u8; 6];
//! let mut out = SliceMut::new(&mut buf);
//! out.set_u16(0, ByteOrder::LITTLE, 0x1234).unwrap();
//! out.set_u32(2, ByteOrder::LITTLE_WORD_SWAPPED, 0xAABB_CCDD).unwrap();
//! assert_eq!(buf, [0x34, 0x12, 0xBB, 0xAA, 0xDD, 0xCC]);
//!
//! let input = Slice::new(&buf);
//! assert_eq!(input.get_u16(0, ByteOrder::LITTLE).unwrap(), 0x1234);
//! assert!(input.get_u32(4, ByteOrder::LITTLE).is_err());
//! ```

use crate::byte_order::{ByteOrder, Width};
use crate::error::Result;
use crate::slice::{Bounded, Slice, SliceMut};

/// Sign-extends the low `width` bytes of `raw` to an `i64`.
#[inline]
pub fn sign_extend(raw: u64, width: Width) -> i64 {
    let shift = 64 - width.bits();
    ((raw << shift) as i64) >> shift
}

/// Bounds-checked scalar reads.
pub trait ScalarRead: Bounded {
    /// Bytes covered by the view.
    fn bytes(&self) -> &[u8];

    /// Reads an unsigned integer of `width` bytes at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if fewer than `width` bytes remain at `offset`.
    fn get_uint(&self, offset: usize, width: Width, order: ByteOrder) -> Result<u64> {
        let n = width.bytes();
        self.check_access(offset, n)?;
        Ok(order
            .permutation(width)
            .gather(&self.bytes()[offset..offset + n]))
    }

    /// Reads a signed integer of `width` bytes at `offset`, sign-extended.
    fn get_int(&self, offset: usize, width: Width, order: ByteOrder) -> Result<i64> {
        self.get_uint(offset, width, order)
            .map(|raw| sign_extend(raw, width))
    }

    /// Reads one byte.
    fn get_u8(&self, offset: usize) -> Result<u8> {
        self.get_uint(offset, Width::One, ByteOrder::LITTLE)
            .map(|v| v as u8)
    }

    /// Reads a 16-bit unsigned integer.
    fn get_u16(&self, offset: usize, order: ByteOrder) -> Result<u16> {
        self.get_uint(offset, Width::Two, order).map(|v| v as u16)
    }

    /// Reads a 32-bit unsigned integer.
    fn get_u32(&self, offset: usize, order: ByteOrder) -> Result<u32> {
        self.get_uint(offset, Width::Four, order).map(|v| v as u32)
    }

    /// Reads a 64-bit unsigned integer.
    fn get_u64(&self, offset: usize, order: ByteOrder) -> Result<u64> {
        self.get_uint(offset, Width::Eight, order)
    }

    /// Reads a signed byte.
    fn get_i8(&self, offset: usize) -> Result<i8> {
        self.get_u8(offset).map(|v| v as i8)
    }

    /// Reads a 16-bit signed integer.
    fn get_i16(&self, offset: usize, order: ByteOrder) -> Result<i16> {
        self.get_u16(offset, order).map(|v| v as i16)
    }

    /// Reads a 32-bit signed integer.
    fn get_i32(&self, offset: usize, order: ByteOrder) -> Result<i32> {
        self.get_u32(offset, order).map(|v| v as i32)
    }

    /// Reads a 64-bit signed integer.
    fn get_i64(&self, offset: usize, order: ByteOrder) -> Result<i64> {
        self.get_u64(offset, order).map(|v| v as i64)
    }

    /// Reads an IEEE-754 single.
    fn get_f32(&self, offset: usize, order: ByteOrder) -> Result<f32> {
        self.get_u32(offset, order).map(f32::from_bits)
    }

    /// Reads an IEEE-754 double.
    fn get_f64(&self, offset: usize, order: ByteOrder) -> Result<f64> {
        self.get_u64(offset, order).map(f64::from_bits)
    }
}

impl ScalarRead for Slice<'_> {
    fn bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ScalarRead for SliceMut<'_> {
    fn bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl SliceMut<'_> {
    /// Writes the low `width` bytes of `value` at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if fewer than `width` bytes remain at
    /// `offset`; nothing is written in that case.
    pub fn set_uint(
        &mut self,
        offset: usize,
        width: Width,
        order: ByteOrder,
        value: u64,
    ) -> Result<()> {
        let n = width.bytes();
        self.check_access(offset, n)?;
        order
            .permutation(width)
            .scatter(value, &mut self.as_bytes_mut()[offset..offset + n]);
        Ok(())
    }

    /// Writes one byte.
    pub fn set_u8(&mut self, offset: usize, value: u8) -> Result<()> {
        self.set_uint(offset, Width::One, ByteOrder::LITTLE, u64::from(value))
    }

    /// Writes a 16-bit unsigned integer.
    pub fn set_u16(&mut self, offset: usize, order: ByteOrder, value: u16) -> Result<()> {
        self.set_uint(offset, Width::Two, order, u64::from(value))
    }

    /// Writes a 32-bit unsigned integer.
    pub fn set_u32(&mut self, offset: usize, order: ByteOrder, value: u32) -> Result<()> {
        self.set_uint(offset, Width::Four, order, u64::from(value))
    }

    /// Writes a 64-bit unsigned integer.
    pub fn set_u64(&mut self, offset: usize, order: ByteOrder, value: u64) -> Result<()> {
        self.set_uint(offset, Width::Eight, order, value)
    }

    /// Writes a signed byte.
    pub fn set_i8(&mut self, offset: usize, value: i8) -> Result<()> {
        self.set_u8(offset, value as u8)
    }

    /// Writes a 16-bit signed integer.
    pub fn set_i16(&mut self, offset: usize, order: ByteOrder, value: i16) -> Result<()> {
        self.set_u16(offset, order, value as u16)
    }

    /// Writes a 32-bit signed integer.
    pub fn set_i32(&mut self, offset: usize, order: ByteOrder, value: i32) -> Result<()> {
        self.set_u32(offset, order, value as u32)
    }

    /// Writes a 64-bit signed integer.
    pub fn set_i64(&mut self, offset: usize, order: ByteOrder, value: i64) -> Result<()> {
        self.set_u64(offset, order, value as u64)
    }

    /// Writes an IEEE-754 single.
    pub fn set_f32(&mut self, offset: usize, order: ByteOrder, value: f32) -> Result<()> {
        self.set_u32(offset, order, value.to_bits())
    }

    /// Writes an IEEE-754 double.
    pub fn set_f64(&mut self, offset: usize, order: ByteOrder, value: f64) -> Result<()> {
        self.set_u64(offset, order, value.to_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Status;

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0xFF, Width::One), -1);
        assert_eq!(sign_extend(0x7F, Width::One), 127);
        assert_eq!(sign_extend(0x8000, Width::Two), -32768);
        assert_eq!(sign_extend(0xFFFF_FFFE, Width::Four), -2);
        assert_eq!(sign_extend(u64::MAX, Width::Eight), -1);
    }

    #[test]
    fn test_get_little_and_big() {
        let buf = hex::decode("0102030405060708").unwrap();
        let s = Slice::new(&buf);
        assert_eq!(s.get_u8(7).unwrap(), 0x08);
        assert_eq!(s.get_u16(0, ByteOrder::LITTLE).unwrap(), 0x0201);
        assert_eq!(s.get_u16(0, ByteOrder::BIG).unwrap(), 0x0102);
        assert_eq!(s.get_u32(0, ByteOrder::LITTLE).unwrap(), 0x0403_0201);
        assert_eq!(s.get_u32(4, ByteOrder::BIG).unwrap(), 0x0506_0708);
        assert_eq!(s.get_u64(0, ByteOrder::LITTLE).unwrap(), 0x0807_0605_0403_0201);
    }

    #[test]
    fn test_full_four_byte_little_endian_assembly() {
        let buf = [0xFF, 0xFF, 0xFF, 0xFF];
        let s = Slice::new(&buf);
        assert_eq!(s.get_u32(0, ByteOrder::LITTLE).unwrap(), 0xFFFF_FFFF);
    }

    #[test]
    fn test_word_swapped_dint() {
        // PCCC long integer: low word last, each word little-endian.
        let buf = hex::decode("34127856").unwrap();
        let s = Slice::new(&buf);
        assert_eq!(
            s.get_u32(0, ByteOrder::LITTLE_WORD_SWAPPED).unwrap(),
            0x1234_5678
        );
    }

    #[test]
    fn test_signed_reads_sign_extend() {
        let buf = [0xFE, 0xFF, 0x80];
        let s = Slice::new(&buf);
        assert_eq!(s.get_i16(0, ByteOrder::LITTLE).unwrap(), -2);
        assert_eq!(s.get_i8(2).unwrap(), -128);
        assert_eq!(s.get_int(0, Width::Two, ByteOrder::LITTLE).unwrap(), -2);
    }

    #[test]
    fn test_bounds() {
        let buf = [0u8; 4];
        let s = Slice::new(&buf);
        assert!(s.get_u32(0, ByteOrder::LITTLE).is_ok());
        assert!(s.get_u16(2, ByteOrder::LITTLE).is_ok());

        let err = s.get_u32(1, ByteOrder::LITTLE).unwrap_err();
        assert_eq!(err.status(), Status::OutOfBounds);
        assert!(s.get_u8(4).is_err());
        assert!(s.get_u64(0, ByteOrder::LITTLE).is_err());
    }

    #[test]
    fn test_failed_write_leaves_buffer_untouched() {
        let mut buf = [0u8; 3];
        let mut s = SliceMut::new(&mut buf);
        assert!(s.set_u32(0, ByteOrder::LITTLE, 0xFFFF_FFFF).is_err());
        assert!(s.set_u16(2, ByteOrder::LITTLE, 0xFFFF).is_err());
        assert_eq!(buf, [0, 0, 0]);
    }

    #[test]
    fn test_set_then_get() {
        let mut buf = [0u8; 16];
        let mut s = SliceMut::new(&mut buf);
        s.set_i32(0, ByteOrder::BIG, -123_456).unwrap();
        s.set_f64(4, ByteOrder::LITTLE_WORD_SWAPPED, std::f64::consts::PI)
            .unwrap();
        s.set_i16(12, ByteOrder::LITTLE, i16::MIN).unwrap();
        assert_eq!(s.get_i32(0, ByteOrder::BIG).unwrap(), -123_456);
        assert_eq!(
            s.get_f64(4, ByteOrder::LITTLE_WORD_SWAPPED).unwrap(),
            std::f64::consts::PI
        );
        assert_eq!(s.get_i16(12, ByteOrder::LITTLE).unwrap(), i16::MIN);
    }

    #[test]
    fn test_float_bits_pass_through() {
        let mut buf = [0u8; 12];
        let mut s = SliceMut::new(&mut buf);
        let nan = f32::from_bits(0x7FC0_1234);
        let denormal = f64::from_bits(1);
        s.set_f32(0, ByteOrder::LITTLE, nan).unwrap();
        s.set_f64(4, ByteOrder::BIG, denormal).unwrap();
        assert_eq!(s.get_f32(0, ByteOrder::LITTLE).unwrap().to_bits(), 0x7FC0_1234);
        assert_eq!(s.get_f64(4, ByteOrder::BIG).unwrap().to_bits(), 1);
    }

    #[test]
    fn test_offsets_are_relative_to_view() {
        let buf = hex::decode("00001234").unwrap();
        let mut s = Slice::new(&buf);
        s.advance(2).unwrap();
        assert_eq!(s.get_u16(0, ByteOrder::BIG).unwrap(), 0x1234);
        let pos = 2;
        assert_eq!(s.get_u8(s.offset_of(pos).unwrap()).unwrap(), 0x12);
    }
}
