//! Server configuration.
//!
//! # Command line
//!
//! ```text
//! --plc=<plc type> [--path=<path>] [--port=<port>] --tag=<tag> [--tag=<tag> ...]
//! ```
//!
//! | Option | Meaning |
//! |--------|---------|
//! | `--plc` | `ControlLogix`, `Micro800`, `Omron` (CIP) or `PLC/5`, `SLC500`, `Micrologix` (PCCC) |
//! | `--path` | CPU path inside the chassis, e.g. `1,0`; required for ControlLogix |
//! | `--port` | TCP port, defaults to 44818 |
//! | `--tag` | Tag definition, see [`TagDef`](crate::TagDef); repeatable |
//!
//! # Example
//!
//! ```
//! use ab_server::{PlcType, ServerConfig};
//!
//! let config = ServerConfig::from_args([
//!     "--plc=ControlLogix",
//!     "--path=1,0",
//!     "--tag=MyTag:DINT[10,10]",
//! ])?;
//! assert_eq!(config.plc_type, PlcType::ControlLogix);
//! assert_eq!(config.path, vec![1, 0]);
//! assert_eq!(config.port, 44818);
//! # Ok::<(), ab_server::AbError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{AbError, Result};
use crate::tag::TagDef;

/// Default EtherNet/IP TCP port.
pub const DEFAULT_EIP_PORT: u16 = 44818;

/// Kind of PLC to emulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlcType {
    /// ControlLogix / CompactLogix.
    ControlLogix,
    /// Micro800 series.
    Micro800,
    /// Omron NJ/NX over CIP.
    Omron,
    /// PLC-5.
    Plc5,
    /// SLC 500.
    Slc500,
    /// MicroLogix.
    MicroLogix,
}

impl PlcType {
    const ALL: [PlcType; 6] = [
        PlcType::ControlLogix,
        PlcType::Micro800,
        PlcType::Omron,
        PlcType::Plc5,
        PlcType::Slc500,
        PlcType::MicroLogix,
    ];

    /// Name accepted by `--plc`.
    pub fn name(self) -> &'static str {
        match self {
            PlcType::ControlLogix => "ControlLogix",
            PlcType::Micro800 => "Micro800",
            PlcType::Omron => "Omron",
            PlcType::Plc5 => "PLC/5",
            PlcType::Slc500 => "SLC500",
            PlcType::MicroLogix => "Micrologix",
        }
    }

    /// Returns `true` for PLCs that speak PCCC rather than CIP.
    pub fn is_pccc(self) -> bool {
        matches!(self, PlcType::Plc5 | PlcType::Slc500 | PlcType::MicroLogix)
    }

    /// Returns `true` if the PLC needs a CPU path.
    pub fn requires_path(self) -> bool {
        self == PlcType::ControlLogix
    }

    /// Parses a tag definition in this PLC's syntax.
    ///
    /// # Errors
    ///
    /// Returns `AbError::BadInput` if the definition is malformed.
    pub fn parse_tag(self, text: &str) -> Result<TagDef> {
        if self.is_pccc() {
            TagDef::parse_pccc(text)
        } else {
            TagDef::parse_cip(text)
        }
    }
}

impl FromStr for PlcType {
    type Err = AbError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AbError::bad_input(format!("unsupported PLC type '{}'", s)))
    }
}

impl fmt::Display for PlcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration of the emulated PLC.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerConfig {
    /// PLC kind.
    pub plc_type: PlcType,
    /// CPU path inside the chassis (port/link pairs).
    #[cfg_attr(feature = "serde", serde(default))]
    pub path: Vec<u8>,
    /// TCP port to listen on.
    #[cfg_attr(feature = "serde", serde(default = "default_port"))]
    pub port: u16,
    /// Tags to serve.
    pub tags: Vec<TagDef>,
}

#[cfg(feature = "serde")]
fn default_port() -> u16 {
    DEFAULT_EIP_PORT
}

fn parse_path(path: &str) -> Result<Vec<u8>> {
    path.split(',')
        .map(|part| {
            part.trim()
                .parse::<u8>()
                .map_err(|_| AbError::bad_input(format!("invalid path element '{}'", part)))
        })
        .collect()
}

impl ServerConfig {
    /// Creates a configuration with no path, no tags and the default port.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_server::{PlcType, ServerConfig, TagDef};
    ///
    /// let config = ServerConfig::new(PlcType::Slc500)
    ///     .with_port(2222)
    ///     .with_tag(TagDef::parse_pccc("N7[10]").unwrap());
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(plc_type: PlcType) -> Self {
        Self {
            plc_type,
            path: Vec::new(),
            port: DEFAULT_EIP_PORT,
            tags: Vec::new(),
        }
    }

    /// Sets the TCP port (default 44818).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the CPU path.
    pub fn with_path(mut self, path: impl Into<Vec<u8>>) -> Self {
        self.path = path.into();
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: TagDef) -> Self {
        self.tags.push(tag);
        self
    }

    /// Checks that the configuration can be served.
    ///
    /// # Errors
    ///
    /// Returns `AbError::BadInput` if a ControlLogix has no path, no tags are
    /// defined, or a tag fails [`TagDef::validate`].
    pub fn validate(&self) -> Result<()> {
        if self.plc_type.requires_path() && self.path.is_empty() {
            return Err(AbError::bad_input(format!(
                "{} requires a CPU path",
                self.plc_type
            )));
        }
        if self.tags.is_empty() {
            return Err(AbError::bad_input("at least one tag must be defined"));
        }
        self.tags.iter().try_for_each(TagDef::validate)
    }

    /// Builds a configuration from command line arguments, excluding the program name.
    ///
    /// # Errors
    ///
    /// - `AbError::NullPtr` if `--plc` is missing.
    /// - `AbError::BadInput` for unknown or malformed options, bad tag definitions,
    ///   or a configuration that fails [`validate`](Self::validate).
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut plc_type = None;
        let mut path = Vec::new();
        let mut port = DEFAULT_EIP_PORT;
        let mut raw_tags = Vec::new();

        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| AbError::bad_input(format!("expected --option=value, got '{}'", arg)))?;
            match key {
                "--plc" => plc_type = Some(value.parse::<PlcType>()?),
                "--path" => path = parse_path(value)?,
                "--port" => {
                    port = value
                        .parse()
                        .map_err(|_| AbError::bad_input(format!("invalid port '{}'", value)))?
                }
                "--tag" => raw_tags.push(value.to_string()),
                _ => return Err(AbError::bad_input(format!("unknown option '{}'", key))),
            }
        }

        let plc_type = plc_type.ok_or_else(|| AbError::null_ptr("--plc"))?;
        let tags = raw_tags
            .iter()
            .map(|t| plc_type.parse_tag(t))
            .collect::<Result<Vec<_>>>()?;

        let config = Self {
            plc_type,
            path,
            port,
            tags,
        };
        config.validate()?;
        debug!(plc = %config.plc_type, port = config.port, tags = config.tags.len(), "parsed arguments");
        Ok(config)
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `AbError::BadInput` if the JSON does not describe a valid configuration.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AbError::bad_input(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
