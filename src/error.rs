//! Status codes and error types shared by the codec and the layers built on it.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. Each [`AbError`]
//! maps to exactly one [`Status`] code, so protocol layers can report the shared
//! status taxonomy on the wire or in logs without inspecting error variants.
//!
//! # Status ranges
//!
//! | Range | Meaning | Codes |
//! |-------|---------|-------|
//! | `< 1000` | informational | `Ok`, `Pending`, `Terminate` |
//! | `[1000, 2000)` | warning | `WouldBlock`, `Busy`, `Partial` |
//! | `>= 2000` | error | everything else |
//!
//! Protocol-specific codes are layered on top starting at [`Status::LAST`]. Use the
//! classification predicates rather than comparing raw values.
//!
//! # Example
//!
//! ```
//! use ab_server::{AbError, Status};
//!
//! let err = AbError::out_of_bounds(6, 4, 8);
//! assert_eq!(err.status(), Status::OutOfBounds);
//! assert!(err.status().is_error());
//! assert!(!Status::Ok.is_error());
//! ```

use std::fmt;

use thiserror::Error;

/// Result type alias for codec and emulator operations.
pub type Result<T> = std::result::Result<T, AbError>;

/// The shared status taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Status {
    /// Success.
    Ok = 0,
    /// Work was queued and is not finished yet.
    Pending = 1,
    /// The peer or the process is shutting down.
    Terminate = 2,
    /// The operation would block.
    WouldBlock = 1000,
    /// The resource is in use.
    Busy = 1001,
    /// Only part of the data was processed.
    Partial = 1002,
    /// A named entity does not exist.
    NotFound = 2000,
    /// The input was not recognized.
    NotRecognized = 2001,
    /// The request is recognized but unsupported.
    NotSupported = 2002,
    /// A parameter is malformed.
    BadInput = 2003,
    /// The operation was aborted.
    Aborted = 2004,
    /// A read or write would leave the buffer bounds.
    OutOfBounds = 2005,
    /// The operation timed out.
    Timeout = 2006,
    /// A required reference was missing.
    NullPtr = 2007,
    /// The destination does not have enough room.
    NoResource = 2008,
    /// Setup or configuration failed.
    SetupFailure = 2009,
    /// An internal invariant was broken.
    InternalFailure = 2010,
    /// An external component failed.
    ExternalFailure = 2011,
    /// The operation is not permitted.
    NotAllowed = 2012,
}

impl Status {
    /// First code available to protocol layers stacked on this taxonomy.
    pub const LAST: u32 = 2013;

    const ALL: [Status; 19] = [
        Status::Ok,
        Status::Pending,
        Status::Terminate,
        Status::WouldBlock,
        Status::Busy,
        Status::Partial,
        Status::NotFound,
        Status::NotRecognized,
        Status::NotSupported,
        Status::BadInput,
        Status::Aborted,
        Status::OutOfBounds,
        Status::Timeout,
        Status::NullPtr,
        Status::NoResource,
        Status::SetupFailure,
        Status::InternalFailure,
        Status::ExternalFailure,
        Status::NotAllowed,
    ];

    /// Returns the numeric code.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Looks up a status by its numeric code.
    ///
    /// Returns `None` for codes that are not part of the shared taxonomy,
    /// including protocol-layer codes at or above [`Status::LAST`].
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.code() == code)
    }

    /// Returns `true` for codes in the warning range.
    pub fn is_warning(self) -> bool {
        status_is_warning(self.code())
    }

    /// Returns `true` for codes in the error range.
    pub fn is_error(self) -> bool {
        status_is_error(self.code())
    }

    /// Returns the canonical name of the status, e.g. `STATUS_OUT_OF_BOUNDS`.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "STATUS_OK",
            Status::Pending => "STATUS_PENDING",
            Status::Terminate => "STATUS_TERMINATE",
            Status::WouldBlock => "STATUS_WOULD_BLOCK",
            Status::Busy => "STATUS_BUSY",
            Status::Partial => "STATUS_PARTIAL",
            Status::NotFound => "STATUS_NOT_FOUND",
            Status::NotRecognized => "STATUS_NOT_RECOGNIZED",
            Status::NotSupported => "STATUS_NOT_SUPPORTED",
            Status::BadInput => "STATUS_BAD_INPUT",
            Status::Aborted => "STATUS_ABORTED",
            Status::OutOfBounds => "STATUS_OUT_OF_BOUNDS",
            Status::Timeout => "STATUS_TIMEOUT",
            Status::NullPtr => "STATUS_NULL_PTR",
            Status::NoResource => "STATUS_NO_RESOURCE",
            Status::SetupFailure => "STATUS_SETUP_FAILURE",
            Status::InternalFailure => "STATUS_INTERNAL_FAILURE",
            Status::ExternalFailure => "STATUS_EXTERNAL_FAILURE",
            Status::NotAllowed => "STATUS_NOT_ALLOWED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `true` if a raw status code falls in the warning range.
///
/// Works for protocol-layer codes as well as the shared taxonomy.
#[inline]
pub fn status_is_warning(code: u32) -> bool {
    (1000..2000).contains(&code)
}

/// Returns `true` if a raw status code falls in the error range.
#[inline]
pub fn status_is_error(code: u32) -> bool {
    code >= 2000
}

/// Errors produced by the codec, the tag registry and configuration parsing.
#[derive(Debug, Error)]
pub enum AbError {
    /// A read or write would cross the bounds of a slice.
    #[error("out of bounds: {needed} byte(s) at offset {offset} in a slice of {len} byte(s)")]
    OutOfBounds {
        /// Offset (or absolute position) of the access.
        offset: usize,
        /// Bytes the access required.
        needed: usize,
        /// Length of the slice.
        len: usize,
    },

    /// The destination buffer cannot hold the result.
    #[error("insufficient space: need {needed} byte(s), have {available}")]
    NoResource {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// A parameter or payload is malformed.
    #[error("bad input: {reason}")]
    BadInput {
        /// Description of the problem.
        reason: String,
    },

    /// A required reference was not supplied.
    #[error("missing {what}")]
    NullPtr {
        /// Name of the missing item.
        what: &'static str,
    },

    /// A named entity does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// What was looked up.
        what: String,
    },

    /// The request is valid but not supported by this device.
    #[error("not supported: {reason}")]
    NotSupported {
        /// Description of the unsupported feature.
        reason: String,
    },

    /// Any other status from the shared taxonomy.
    #[error("{0}")]
    Status(Status),
}

impl AbError {
    /// Creates a new `OutOfBounds` error.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_server::AbError;
    ///
    /// let err = AbError::out_of_bounds(6, 4, 8);
    /// assert_eq!(err.to_string(), "out of bounds: 4 byte(s) at offset 6 in a slice of 8 byte(s)");
    /// ```
    pub fn out_of_bounds(offset: usize, needed: usize, len: usize) -> Self {
        Self::OutOfBounds {
            offset,
            needed,
            len,
        }
    }

    /// Creates a new `NoResource` error.
    pub fn no_resource(needed: usize, available: usize) -> Self {
        Self::NoResource { needed, available }
    }

    /// Creates a new `BadInput` error.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_server::AbError;
    ///
    /// let err = AbError::bad_input("odd length word-swapped payload");
    /// assert_eq!(err.to_string(), "bad input: odd length word-swapped payload");
    /// ```
    pub fn bad_input(reason: impl Into<String>) -> Self {
        Self::BadInput {
            reason: reason.into(),
        }
    }

    /// Creates a new `NullPtr` error for a required item that was not supplied.
    pub fn null_ptr(what: &'static str) -> Self {
        Self::NullPtr { what }
    }

    /// Creates a new `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Creates a new `NotSupported` error.
    pub fn not_supported(reason: impl Into<String>) -> Self {
        Self::NotSupported {
            reason: reason.into(),
        }
    }

    /// Returns the status code this error maps to.
    pub fn status(&self) -> Status {
        match self {
            AbError::OutOfBounds { .. } => Status::OutOfBounds,
            AbError::NoResource { .. } => Status::NoResource,
            AbError::BadInput { .. } => Status::BadInput,
            AbError::NullPtr { .. } => Status::NullPtr,
            AbError::NotFound { .. } => Status::NotFound,
            AbError::NotSupported { .. } => Status::NotSupported,
            AbError::Status(status) => *status,
        }
    }
}

impl From<Status> for AbError {
    fn from(status: Status) -> Self {
        AbError::Status(status)
    }
}
