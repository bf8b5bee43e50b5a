//! EtherNet/IP encapsulation header.
//!
//! Every EtherNet/IP request and reply starts with a 24-byte little-endian header:
//!
//! | Offset | Size | Field | Description |
//! |--------|------|-------|-------------|
//! | 0 | 2 | command | Encapsulation command |
//! | 2 | 2 | length | Payload length after the header |
//! | 4 | 4 | session handle | Assigned by `RegisterSession` |
//! | 8 | 4 | status | 0 on success |
//! | 12 | 8 | sender context | Echoed back unchanged |
//! | 20 | 4 | options | Always 0 |
//!
//! # Example
//!
//! ```
//! use ab_server::{EncapCommand, EncapHeader, Slice};
//!
//! let mut request = vec![0x65, 0x00, 0x04, 0x00];
//! request.extend_from_slice(&[0u8; 20]);
//! request.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]);
//!
//! let (header, payload) = EncapHeader::decode(Slice::new(&request))?;
//! assert_eq!(header.command(), Some(EncapCommand::RegisterSession));
//! assert_eq!(payload.as_bytes(), &[0x01, 0x00, 0x00, 0x00]);
//! # Ok::<(), ab_server::AbError>(())
//! ```

use std::fmt;

use crate::byte_order::{ByteOrder, Width};
use crate::error::{AbError, Result};
use crate::format::{decode, encode, Decode, Encode, ScalarFormat};
use crate::slice::{Slice, SliceMut};

/// Encapsulation header size in bytes.
pub const ENCAP_HEADER_SIZE: usize = 24;

const U16: ScalarFormat = ScalarFormat::new(Width::Two, ByteOrder::LITTLE);
const U32: ScalarFormat = ScalarFormat::new(Width::Four, ByteOrder::LITTLE);
const U64: ScalarFormat = ScalarFormat::new(Width::Eight, ByteOrder::LITTLE);

/// Encapsulation commands understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EncapCommand {
    /// No operation; no reply is sent.
    Nop = 0x0000,
    /// List supported encapsulation services.
    ListServices = 0x0004,
    /// Device identity query.
    ListIdentity = 0x0063,
    /// Non-CIP interface query.
    ListInterfaces = 0x0064,
    /// Opens a session.
    RegisterSession = 0x0065,
    /// Closes a session.
    UnregisterSession = 0x0066,
    /// Unconnected request/reply.
    SendRrData = 0x006F,
    /// Connected data.
    SendUnitData = 0x0070,
}

impl EncapCommand {
    const ALL: [EncapCommand; 8] = [
        EncapCommand::Nop,
        EncapCommand::ListServices,
        EncapCommand::ListIdentity,
        EncapCommand::ListInterfaces,
        EncapCommand::RegisterSession,
        EncapCommand::UnregisterSession,
        EncapCommand::SendRrData,
        EncapCommand::SendUnitData,
    ];

    /// Returns the wire code.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Looks up a command by its wire code.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }
}

impl fmt::Display for EncapCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} (0x{:04X})", self, self.code())
    }
}

/// Encapsulation header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncapHeader {
    /// Raw command code.
    pub command: u16,
    /// Payload length.
    pub length: u16,
    /// Session handle.
    pub session_handle: u32,
    /// Encapsulation status.
    pub status: u32,
    /// Opaque sender context.
    pub sender_context: u64,
    /// Options, always 0.
    pub options: u32,
}

impl EncapHeader {
    /// Creates a header for `command` with the given payload length.
    pub fn new(command: EncapCommand, session_handle: u32, length: u16) -> Self {
        Self {
            command: command.code(),
            length,
            session_handle,
            ..Self::default()
        }
    }

    /// Builds the reply header for this request, keeping command, session and
    /// sender context.
    pub fn reply(&self, status: u32, length: u16) -> Self {
        Self {
            length,
            status,
            options: 0,
            ..*self
        }
    }

    /// Known command, if any.
    pub fn command(&self) -> Option<EncapCommand> {
        EncapCommand::from_code(self.command)
    }

    /// Known command, or an error naming the unhandled code.
    ///
    /// # Errors
    ///
    /// Returns `AbError::NotSupported` for a command this server does not handle.
    pub fn require_command(&self) -> Result<EncapCommand> {
        self.command().ok_or_else(|| {
            AbError::not_supported(format!("encapsulation command 0x{:04X}", self.command))
        })
    }

    /// Parses a header and returns it with its payload.
    ///
    /// The payload view is bounded by `length`; trailing bytes are left out.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if the header or payload is truncated.
    pub fn decode(data: Slice<'_>) -> Result<(Self, Slice<'_>)> {
        let mut command = 0;
        let mut length = 0;
        let mut session_handle = 0;
        let mut status = 0;
        let mut sender_context = 0;
        let mut options = 0;

        let mut payload = decode(
            data,
            &mut [
                Decode::Unsigned(U16, &mut command),
                Decode::Unsigned(U16, &mut length),
                Decode::Unsigned(U32, &mut session_handle),
                Decode::Unsigned(U32, &mut status),
                Decode::Unsigned(U64, &mut sender_context),
                Decode::Unsigned(U32, &mut options),
            ],
        )?;
        payload.truncate_to_len(length as usize)?;

        Ok((
            Self {
                command: command as u16,
                length: length as u16,
                session_handle: session_handle as u32,
                status: status as u32,
                sender_context,
                options: options as u32,
            },
            payload,
        ))
    }

    /// Writes the header at the start of `dest` and returns the bytes written.
    ///
    /// # Errors
    ///
    /// Returns `AbError::OutOfBounds` if `dest` is shorter than the header.
    pub fn encode(&self, dest: &mut SliceMut<'_>) -> Result<usize> {
        encode(
            dest,
            &[
                Encode::Unsigned(U16, u64::from(self.command)),
                Encode::Unsigned(U16, u64::from(self.length)),
                Encode::Unsigned(U32, u64::from(self.session_handle)),
                Encode::Unsigned(U32, u64::from(self.status)),
                Encode::Unsigned(U64, self.sender_context),
                Encode::Unsigned(U32, u64::from(self.options)),
            ],
        )
    }

    /// Serializes the header to bytes.
    pub fn to_bytes(&self) -> Result<[u8; ENCAP_HEADER_SIZE]> {
        let mut buf = [0u8; ENCAP_HEADER_SIZE];
        self.encode(&mut SliceMut::new(&mut buf))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Status;
    use crate::slice::Bounded;

    const REGISTER: &str = "650004000000000000000000\
                            0102030405060708\
                            00000000\
                            01000000";

    #[test]
    fn test_command_codes() {
        assert_eq!(EncapCommand::ListIdentity.code(), 0x63);
        assert_eq!(EncapCommand::from_code(0x6F), Some(EncapCommand::SendRrData));
        assert_eq!(EncapCommand::from_code(0x1234), None);
        assert_eq!(EncapCommand::SendUnitData.to_string(), "SendUnitData (0x0070)");
    }

    #[test]
    fn test_decode() {
        let bytes = hex::decode(REGISTER).unwrap();
        let (header, payload) = EncapHeader::decode(Slice::new(&bytes)).unwrap();

        assert_eq!(header.command(), Some(EncapCommand::RegisterSession));
        assert_eq!(header.require_command().unwrap(), EncapCommand::RegisterSession);
        assert_eq!(header.length, 4);
        assert_eq!(header.session_handle, 0);
        assert_eq!(header.sender_context, 0x0807_0605_0403_0201);
        assert_eq!(payload.start(), ENCAP_HEADER_SIZE);
        assert_eq!(payload.as_bytes(), &[1, 0, 0, 0]);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut bytes = hex::decode(REGISTER).unwrap();
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        let (_, payload) = EncapHeader::decode(Slice::new(&bytes)).unwrap();
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn test_unknown_command() {
        let mut bytes = hex::decode(REGISTER).unwrap();
        bytes[0] = 0x01;
        let (header, _) = EncapHeader::decode(Slice::new(&bytes)).unwrap();
        assert_eq!(header.command(), None);
        let err = header.require_command().unwrap_err();
        assert_eq!(err.status(), Status::NotSupported);
        assert_eq!(err.to_string(), "not supported: encapsulation command 0x0001");
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = hex::decode(REGISTER).unwrap();
        let err = EncapHeader::decode(Slice::new(&bytes[..10])).unwrap_err();
        assert_eq!(err.status(), Status::OutOfBounds);

        let err = EncapHeader::decode(Slice::new(&bytes[..26])).unwrap_err();
        assert_eq!(err.status(), Status::OutOfBounds);
    }

    #[test]
    fn test_encode() {
        let header = EncapHeader {
            sender_context: 0x0807_0605_0403_0201,
            ..EncapHeader::new(EncapCommand::RegisterSession, 0, 4)
        };
        let bytes = header.to_bytes().unwrap();
        assert_eq!(hex::encode(bytes), &REGISTER[..48]);

        let mut small = [0u8; 10];
        let err = header.encode(&mut SliceMut::new(&mut small)).unwrap_err();
        assert_eq!(err.status(), Status::OutOfBounds);
    }

    #[test]
    fn test_reply() {
        let request = EncapHeader {
            status: 7,
            options: 3,
            sender_context: 42,
            ..EncapHeader::new(EncapCommand::SendRrData, 0x1234, 30)
        };
        let reply = request.reply(0, 12);
        assert_eq!(reply.command, EncapCommand::SendRrData.code());
        assert_eq!(reply.session_handle, 0x1234);
        assert_eq!(reply.sender_context, 42);
        assert_eq!(reply.status, 0);
        assert_eq!(reply.options, 0);
        assert_eq!(reply.length, 12);
    }
}
