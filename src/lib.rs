//! # Allen-Bradley PLC Emulator Core
//!
//! Serialization core and tag model of an emulated Allen-Bradley PLC that speaks
//! EtherNet/IP with CIP (ControlLogix, Micro800, Omron) or PCCC (PLC/5, SLC 500,
//! MicroLogix) payloads.
//!
//! Every read and write goes through a bounds-checked view of a caller-owned
//! buffer. Nothing is allocated while encoding or decoding, and no access can
//! leave the buffer it was given.
//!
//! ## Features
//!
//! - **Bounds-checked views**: [`Slice`] and [`SliceMut`] carry absolute positions
//!   so a sub-view of a packet still knows where it sits in the packet
//! - **Byte orders**: little and big endian, with optional 16-bit word swap for
//!   legacy PLC data files
//! - **Strings**: counted (CIP `STRING`, PCCC `ST`) and terminated
//! - **Format engine**: decode or encode a whole message layout in one call
//! - **No panics**: all errors returned as `Result<T, AbError>`
//!
//! ## Quick Start
//!
//! ```
//! use ab_server::{decode, encode, ByteOrder, ByteString, CountedFormat, Decode, Encode,
//!                 ScalarFormat, Slice, SliceMut, Width};
//!
//! let u16_le = ScalarFormat::le(Width::Two);
//! let mut buf = [0u8; 16];
//!
//! let written = encode(
//!     &mut SliceMut::new(&mut buf),
//!     &[
//!         Encode::Unsigned(u16_le, 0x4C),
//!         Encode::F32(ByteOrder::LITTLE_WORD_SWAPPED, 1.5),
//!         Encode::Counted(CountedFormat::PCCC_STRING, b"HI"),
//!     ],
//! )?;
//! assert_eq!(written, 10);
//!
//! let mut service = 0;
//! let mut value = 0.0;
//! let mut text = ByteString::default();
//! decode(
//!     Slice::new(&buf[..written]),
//!     &mut [
//!         Decode::Unsigned(u16_le, &mut service),
//!         Decode::F32(ByteOrder::LITTLE_WORD_SWAPPED, &mut value),
//!         Decode::Counted(CountedFormat::PCCC_STRING, &mut text),
//!     ],
//! )?;
//! assert_eq!(service, 0x4C);
//! assert_eq!(value, 1.5);
//! assert_eq!(text.to_vec(), b"HI");
//! # Ok::<(), ab_server::AbError>(())
//! ```
//!
//! ## Byte Orders
//!
//! | Order | 4-byte layout of `0x11223344` |
//! |-------|-------------------------------|
//! | [`ByteOrder::LITTLE`] | `44 33 22 11` |
//! | [`ByteOrder::BIG`] | `11 22 33 44` |
//! | [`ByteOrder::LITTLE_WORD_SWAPPED`] | `22 11 44 33` |
//! | [`ByteOrder::BIG_WORD_SWAPPED`] | `33 44 11 22` |
//!
//! ## Tags
//!
//! ```
//! use ab_server::{ServerConfig, TagRegistry};
//!
//! let config = ServerConfig::from_args(["--plc=SLC500", "--tag=N7[10]", "--tag=ST18[2]"])?;
//! let registry = TagRegistry::from_config(&config)?;
//!
//! let n7 = registry.get_by_file(7)?;
//! n7.write(3, &[0x2A, 0x00])?;
//!
//! let mut out = [0u8; 2];
//! registry.get("n7")?.read(3, 1, &mut out)?;
//! assert_eq!(out, [0x2A, 0x00]);
//! # Ok::<(), ab_server::AbError>(())
//! ```
//!
//! ## Error Handling
//!
//! Every error maps to a numeric [`Status`] code through [`AbError::status`]:
//!
//! ```
//! use ab_server::{AbError, Slice, ScalarRead, ByteOrder, Status};
//!
//! let data = [0x01, 0x02];
//! match Slice::new(&data).get_u32(0, ByteOrder::LITTLE) {
//!     Err(AbError::OutOfBounds { offset, needed, len }) => {
//!         assert_eq!((offset, needed, len), (0, 4, 2));
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//! assert!(Status::OutOfBounds.is_error());
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod byte_order;
mod config;
mod eip;
mod error;
mod format;
mod registry;
mod scalar;
mod slice;
mod string;
mod tag;

// Public re-exports
pub use byte_order::{swap_word_bytes, ByteOrder, Endian, Permutation, Width};
pub use config::{PlcType, ServerConfig, DEFAULT_EIP_PORT};
pub use eip::{EncapCommand, EncapHeader, ENCAP_HEADER_SIZE};
pub use error::{status_is_error, status_is_warning, AbError, Result, Status};
pub use format::{decode, encode, Decode, Directive, Encode, ScalarFormat};
pub use registry::TagRegistry;
pub use scalar::{sign_extend, ScalarRead};
pub use slice::{Bounded, Slice, SliceMut};
pub use string::{
    decode_counted, decode_terminated, encode_counted, encode_terminated, slice_to_string,
    string_to_slice, ByteString, CountedFormat, TerminatedFormat,
};
pub use tag::{CipType, PcccType, Tag, TagDef, TagType, MAX_DIMENSIONS, MAX_TAG_BYTES};
