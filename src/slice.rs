//! Bounds-checked views over caller-owned byte buffers.
//!
//! A slice never owns or grows its storage. It is a borrowed window `[start, end)`
//! into a backing buffer, where `start` and `end` are absolute positions within that
//! buffer. Every view derived from a slice (by splitting, truncating or carving a
//! sub-slice) is a subset of its parent, so positions stay comparable across all
//! views of the same buffer.
//!
//! Two flavours exist:
//!
//! - [`Slice`] - shared, `Copy`, used for decoding.
//! - [`SliceMut`] - exclusive, used for encoding. Splitting a `SliceMut` yields
//!   disjoint mutable views.
//!
//! Bounds are only ever established at construction and re-checked by the
//! primitives below; no primitive reads or writes the underlying bytes.
//!
//! # Example
//!
//! ```
//! use ab_server::{Bounded, Slice};
//!
//! let buf = [0u8; 24 + 6];
//! let packet = Slice::new(&buf);
//!
//! // Carve a 24-byte header and the body behind it.
//! let (header, body) = packet.split_at_offset(24).unwrap();
//! assert_eq!(header.len(), 24);
//! assert_eq!(body.start(), 24);
//! assert_eq!(body.end(), packet.end());
//! ```

use std::fmt;

use crate::error::{AbError, Result};

/// Bounds shared by [`Slice`] and [`SliceMut`].
///
/// Positions are absolute within the backing buffer; offsets are relative to
/// [`start`](Bounded::start).
pub trait Bounded {
    /// Absolute position of the first byte.
    fn start(&self) -> usize;

    /// Number of bytes in the view.
    fn len(&self) -> usize;

    /// Absolute position one past the last byte.
    fn end(&self) -> usize {
        self.start() + self.len()
    }

    /// Returns `true` if the view contains no addressable bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `pos` lies within `[start, end)`.
    fn contains(&self, pos: usize) -> bool {
        pos >= self.start() && pos < self.end()
    }

    /// Returns `true` if `offset` addresses a byte of this view.
    fn contains_offset(&self, offset: usize) -> bool {
        offset < self.len()
    }

    /// Number of bytes from `pos` to the end of the view, or `None` if `pos` is
    /// not contained.
    fn len_from(&self, pos: usize) -> Option<usize> {
        self.contains(pos).then(|| self.end() - pos)
    }

    /// Checks that `needed` bytes are available at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` unless `offset + needed <= len` and
    /// `offset` addresses a byte of the view.
    fn check_access(&self, offset: usize, needed: usize) -> Result<()> {
        if self.contains_offset(offset) && self.len() - offset >= needed {
            Ok(())
        } else {
            Err(AbError::out_of_bounds(offset, needed, self.len()))
        }
    }

    /// Converts a contained absolute position into an offset.
    fn offset_of(&self, pos: usize) -> Result<usize> {
        if self.contains(pos) {
            Ok(pos - self.start())
        } else {
            Err(AbError::out_of_bounds(pos, 0, self.len()))
        }
    }
}

/// Relative `(start, end)` offsets for an absolute range inside `parent`.
fn range_offsets(parent: &impl Bounded, start: usize, end: usize) -> Result<(usize, usize)> {
    if start < parent.start() || start > end || end > parent.end() {
        return Err(AbError::out_of_bounds(start, end.saturating_sub(start), parent.len()));
    }
    Ok((start - parent.start(), end - parent.start()))
}

fn check_middle(parent: &impl Bounded, start_offset: usize, end_offset: usize) -> Result<()> {
    if !parent.contains_offset(start_offset) || !parent.contains_offset(end_offset) {
        return Err(AbError::out_of_bounds(
            start_offset.max(end_offset),
            0,
            parent.len(),
        ));
    }
    if start_offset > end_offset {
        return Err(AbError::out_of_bounds(start_offset, 0, end_offset));
    }
    Ok(())
}

fn check_advance(view: &impl Bounded, n: usize) -> Result<()> {
    if n > view.len() {
        return Err(AbError::out_of_bounds(0, n, view.len()));
    }
    Ok(())
}

/// A shared, bounds-checked view over a byte buffer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Slice<'a> {
    data: &'a [u8],
    start: usize,
}

impl<'a> Slice<'a> {
    /// Creates a view covering the whole buffer, starting at position 0.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            data: buf,
            start: 0,
        }
    }

    /// Creates an empty view positioned at `pos`.
    pub(crate) fn empty_at(pos: usize) -> Self {
        Self {
            data: &[],
            start: pos,
        }
    }

    /// Returns the bytes covered by the view.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Splits at the absolute position `pos`.
    ///
    /// The first part covers `[start, pos)`, the second `[pos, end)`.
    /// Ignore either half with `_` when only one side is needed.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if `pos` is not contained in the view.
    pub fn split_at(&self, pos: usize) -> Result<(Slice<'a>, Slice<'a>)> {
        let offset = self.offset_of(pos)?;
        let (first, second) = self.data.split_at(offset);
        Ok((
            Slice {
                data: first,
                start: self.start,
            },
            Slice {
                data: second,
                start: pos,
            },
        ))
    }

    /// Splits at an offset relative to the start of the view.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if `offset` is not contained in the view.
    pub fn split_at_offset(&self, offset: usize) -> Result<(Slice<'a>, Slice<'a>)> {
        if !self.contains_offset(offset) {
            return Err(AbError::out_of_bounds(offset, 0, self.len()));
        }
        self.split_at(self.start + offset)
    }

    /// Shrinks the end of the view to `pos`.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if `pos` is not contained; the view is left unchanged.
    pub fn truncate_to(&mut self, pos: usize) -> Result<()> {
        let offset = self.offset_of(pos)?;
        self.data = &self.data[..offset];
        Ok(())
    }

    /// Keeps only the first `len` bytes of the view.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if `len` exceeds the view length.
    pub fn truncate_to_len(&mut self, len: usize) -> Result<()> {
        check_advance(self, len)?;
        self.data = &self.data[..len];
        Ok(())
    }

    /// Shrinks the end of the view to the end of `other`.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` unless `other.end()` lies within this view.
    pub fn truncate_to_end_of(&mut self, other: &impl Bounded) -> Result<()> {
        self.truncate_to(other.end())
    }

    /// Creates a view over the absolute range `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` unless
    /// `self.start() <= start <= end <= self.end()`.
    pub fn sub_slice(&self, start: usize, end: usize) -> Result<Slice<'a>> {
        let (from, to) = range_offsets(self, start, end)?;
        Ok(Slice {
            data: &self.data[from..to],
            start,
        })
    }

    /// Splits the view into `[..start_offset)`, `[start_offset..end_offset)` and
    /// `[end_offset..]`, e.g. a fixed header, a variable body and a fixed trailer.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` unless both offsets are contained and
    /// `start_offset <= end_offset`.
    pub fn split_middle(
        &self,
        start_offset: usize,
        end_offset: usize,
    ) -> Result<(Slice<'a>, Slice<'a>, Slice<'a>)> {
        check_middle(self, start_offset, end_offset)?;
        let (before, rest) = self.data.split_at(start_offset);
        let (middle, after) = rest.split_at(end_offset - start_offset);
        Ok((
            Slice {
                data: before,
                start: self.start,
            },
            Slice {
                data: middle,
                start: self.start + start_offset,
            },
            Slice {
                data: after,
                start: self.start + end_offset,
            },
        ))
    }

    /// Drops the first `n` bytes from the view. `n` may equal the length.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if `n` exceeds the view length.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        check_advance(self, n)?;
        self.data = &self.data[n..];
        self.start += n;
        Ok(())
    }
}

impl Bounded for Slice<'_> {
    fn start(&self) -> usize {
        self.start
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Debug for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slice")
            .field("start", &self.start)
            .field("end", &self.end())
            .finish()
    }
}

impl<'a> From<&'a [u8]> for Slice<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Slice::new(buf)
    }
}

/// An exclusive, bounds-checked view over a byte buffer.
pub struct SliceMut<'a> {
    data: &'a mut [u8],
    start: usize,
}

impl<'a> SliceMut<'a> {
    /// Creates a view covering the whole buffer, starting at position 0.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            data: buf,
            start: 0,
        }
    }

    /// Returns the bytes covered by the view.
    pub fn as_bytes(&self) -> &[u8] {
        &*self.data
    }

    /// Returns the bytes covered by the view, mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }

    /// Consumes the view and returns its bytes with the full borrow lifetime.
    pub fn into_bytes(self) -> &'a mut [u8] {
        self.data
    }

    /// Returns a shared view over the same range.
    pub fn as_slice(&self) -> Slice<'_> {
        Slice {
            data: &*self.data,
            start: self.start,
        }
    }

    /// Reborrows the view for a shorter lifetime.
    pub fn reborrow(&mut self) -> SliceMut<'_> {
        SliceMut {
            data: &mut *self.data,
            start: self.start,
        }
    }

    /// Splits at the absolute position `pos` into two disjoint views.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if `pos` is not contained in the view.
    pub fn split_at(&mut self, pos: usize) -> Result<(SliceMut<'_>, SliceMut<'_>)> {
        let offset = self.offset_of(pos)?;
        let start = self.start;
        let (first, second) = self.data.split_at_mut(offset);
        Ok((
            SliceMut { data: first, start },
            SliceMut {
                data: second,
                start: pos,
            },
        ))
    }

    /// Splits at an offset relative to the start of the view.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if `offset` is not contained in the view.
    pub fn split_at_offset(&mut self, offset: usize) -> Result<(SliceMut<'_>, SliceMut<'_>)> {
        if !self.contains_offset(offset) {
            return Err(AbError::out_of_bounds(offset, 0, self.len()));
        }
        let pos = self.start + offset;
        self.split_at(pos)
    }

    /// Shrinks the end of the view to `pos`.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if `pos` is not contained; the view is left unchanged.
    pub fn truncate_to(&mut self, pos: usize) -> Result<()> {
        let offset = self.offset_of(pos)?;
        let data = std::mem::take(&mut self.data);
        self.data = &mut data[..offset];
        Ok(())
    }

    /// Keeps only the first `len` bytes of the view.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if `len` exceeds the view length.
    pub fn truncate_to_len(&mut self, len: usize) -> Result<()> {
        check_advance(self, len)?;
        let data = std::mem::take(&mut self.data);
        self.data = &mut data[..len];
        Ok(())
    }

    /// Shrinks the end of the view to the end of `other`.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` unless `other.end()` lies within this view.
    pub fn truncate_to_end_of(&mut self, other: &impl Bounded) -> Result<()> {
        self.truncate_to(other.end())
    }

    /// Creates a view over the absolute range `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` unless
    /// `self.start() <= start <= end <= self.end()`.
    pub fn sub_slice(&mut self, start: usize, end: usize) -> Result<SliceMut<'_>> {
        let (from, to) = range_offsets(self, start, end)?;
        Ok(SliceMut {
            data: &mut self.data[from..to],
            start,
        })
    }

    /// Three-way split into disjoint views; see [`Slice::split_middle`].
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` unless both offsets are contained and
    /// `start_offset <= end_offset`.
    pub fn split_middle(
        &mut self,
        start_offset: usize,
        end_offset: usize,
    ) -> Result<(SliceMut<'_>, SliceMut<'_>, SliceMut<'_>)> {
        check_middle(self, start_offset, end_offset)?;
        let start = self.start;
        let (before, rest) = self.data.split_at_mut(start_offset);
        let (middle, after) = rest.split_at_mut(end_offset - start_offset);
        Ok((
            SliceMut {
                data: before,
                start,
            },
            SliceMut {
                data: middle,
                start: start + start_offset,
            },
            SliceMut {
                data: after,
                start: start + end_offset,
            },
        ))
    }

    /// Drops the first `n` bytes from the view. `n` may equal the length.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if `n` exceeds the view length.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        check_advance(self, n)?;
        let data = std::mem::take(&mut self.data);
        self.data = &mut data[n..];
        self.start += n;
        Ok(())
    }
}

impl Bounded for SliceMut<'_> {
    fn start(&self) -> usize {
        self.start
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Debug for SliceMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceMut")
            .field("start", &self.start)
            .field("end", &self.end())
            .finish()
    }
}

impl<'a> From<&'a mut [u8]> for SliceMut<'a> {
    fn from(buf: &'a mut [u8]) -> Self {
        SliceMut::new(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Status;

    #[test]
    fn test_contains_is_half_open() {
        let buf = [0u8; 4];
        let s = Slice::new(&buf);
        assert!(s.contains(0));
        assert!(s.contains(3));
        assert!(!s.contains(4));
        assert!(s.contains_offset(3));
        assert!(!s.contains_offset(4));
        assert_eq!(s.len_from(1), Some(3));
        assert_eq!(s.len_from(4), None);
    }

    #[test]
    fn test_empty_slice() {
        let s = Slice::new(&[]);
        assert!(s.is_empty());
        assert!(!s.contains(0));
        assert_eq!(s.check_access(0, 1).unwrap_err().status(), Status::OutOfBounds);
    }

    #[test]
    fn test_split_at() {
        let buf = [1u8, 2, 3, 4, 5];
        let s = Slice::new(&buf);
        let (a, b) = s.split_at(2).unwrap();
        assert_eq!(a.start(), s.start());
        assert_eq!(a.end(), 2);
        assert_eq!(b.start(), 2);
        assert_eq!(b.end(), s.end());
        assert_eq!(a.as_bytes(), &[1, 2]);
        assert_eq!(b.as_bytes(), &[3, 4, 5]);
        assert_eq!(a.len() + b.len(), s.len());
    }

    #[test]
    fn test_split_at_uses_absolute_positions() {
        let buf = [0u8; 10];
        let (_, tail) = Slice::new(&buf).split_at(4).unwrap();
        let (a, b) = tail.split_at(7).unwrap();
        assert_eq!((a.start(), a.end()), (4, 7));
        assert_eq!((b.start(), b.end()), (7, 10));
        assert!(tail.split_at(2).is_err());
    }

    #[test]
    fn test_split_at_end_is_out_of_bounds() {
        let buf = [0u8; 3];
        let s = Slice::new(&buf);
        let err = s.split_at(3).unwrap_err();
        assert_eq!(err.status(), Status::OutOfBounds);
        assert!(s.split_at_offset(3).is_err());
    }

    #[test]
    fn test_truncate_to() {
        let buf = [0u8; 8];
        let mut s = Slice::new(&buf);
        s.truncate_to(5).unwrap();
        assert_eq!(s.len(), 5);

        let err = s.truncate_to(6).unwrap_err();
        assert_eq!(err.status(), Status::OutOfBounds);
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn test_truncate_to_len_allows_full_length() {
        let buf = [0u8; 8];
        let mut s = Slice::new(&buf);
        s.truncate_to_len(8).unwrap();
        assert_eq!(s.len(), 8);
        assert!(s.truncate_to_len(9).is_err());
        s.truncate_to_len(0).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn test_truncate_to_end_of() {
        let buf = [0u8; 16];
        let mut outer = Slice::new(&buf);
        let inner = outer.sub_slice(2, 10).unwrap();
        outer.truncate_to_end_of(&inner).unwrap();
        assert_eq!(outer.end(), 10);

        let mut small = outer.sub_slice(0, 4).unwrap();
        assert!(small.truncate_to_end_of(&inner).is_err());
        assert_eq!(small.end(), 4);
    }

    #[test]
    fn test_sub_slice_bounds() {
        let buf = [0u8; 10];
        let s = Slice::new(&buf);
        let sub = s.sub_slice(3, 3).unwrap();
        assert!(sub.is_empty());
        assert_eq!(sub.start(), 3);
        assert!(s.sub_slice(0, 10).is_ok());
        assert!(s.sub_slice(0, 11).is_err());
        assert!(s.sub_slice(5, 4).is_err());

        let inner = s.sub_slice(2, 8).unwrap();
        assert!(inner.sub_slice(1, 4).is_err());
        assert!(inner.sub_slice(2, 9).is_err());
    }

    #[test]
    fn test_split_middle() {
        let buf: Vec<u8> = (0..10).collect();
        let s = Slice::new(&buf);
        let (header, body, trailer) = s.split_middle(2, 7).unwrap();
        assert_eq!(header.as_bytes(), &[0, 1]);
        assert_eq!(body.as_bytes(), &[2, 3, 4, 5, 6]);
        assert_eq!(trailer.as_bytes(), &[7, 8, 9]);
        assert_eq!(body.start(), 2);
        assert_eq!(trailer.start(), 7);

        assert!(s.split_middle(7, 2).is_err());
        assert!(s.split_middle(2, 10).is_err());
    }

    #[test]
    fn test_advance() {
        let buf = [1u8, 2, 3];
        let mut s = Slice::new(&buf);
        s.advance(1).unwrap();
        assert_eq!(s.start(), 1);
        assert_eq!(s.as_bytes(), &[2, 3]);
        s.advance(2).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.start(), 3);
        assert!(s.advance(1).is_err());
    }

    #[test]
    fn test_slice_mut_split_is_disjoint() {
        let mut buf = [0u8; 6];
        {
            let mut s = SliceMut::new(&mut buf);
            let (mut a, mut b) = s.split_at(2).unwrap();
            a.as_bytes_mut().fill(0xAA);
            b.as_bytes_mut().fill(0xBB);
        }
        assert_eq!(buf, [0xAA, 0xAA, 0xBB, 0xBB, 0xBB, 0xBB]);
    }

    #[test]
    fn test_slice_mut_truncate_and_advance() {
        let mut buf = [0u8; 8];
        let mut s = SliceMut::new(&mut buf);
        s.advance(2).unwrap();
        s.truncate_to(6).unwrap();
        assert_eq!((s.start(), s.end()), (2, 6));
        s.as_bytes_mut().fill(1);
        assert!(s.truncate_to(6).is_err());
        drop(s);
        assert_eq!(buf, [0, 0, 1, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_slice_mut_split_middle_and_sub_slice() {
        let mut buf = [0u8; 6];
        let mut s = SliceMut::new(&mut buf);
        {
            let (mut a, mut b, mut c) = s.split_middle(1, 4).unwrap();
            a.as_bytes_mut().fill(1);
            b.as_bytes_mut().fill(2);
            c.as_bytes_mut().fill(3);
        }
        let sub = s.sub_slice(4, 6).unwrap();
        assert_eq!(sub.as_bytes(), &[3, 3]);
        assert_eq!(s.as_slice().as_bytes(), &[1, 2, 2, 2, 3, 3]);
    }

    #[test]
    fn test_debug_shows_bounds_only() {
        let buf = [0u8; 4];
        let s = Slice::new(&buf);
        assert_eq!(format!("{:?}", s), "Slice { start: 0, end: 4 }");
    }
}
