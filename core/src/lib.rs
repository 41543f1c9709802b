//! libimm-core
//!
//! Bridge between a host window and the operating system's Input Method
//! Editor subsystem: message-driven composition lifecycle tracking combined
//! with byte-exact decoders for the subsystem's packed buffer formats.
//!
//! The native subsystem is injected as the [`ImmGateway`] capability, so
//! every decoder and the router can be exercised against canned byte
//! buffers. On top of it, [`ImeBridge`] offers the host-facing surface:
//! composition/result/clause/cursor queries, candidate lists, conversion
//! mode, open status, layout description, context association, and
//! notification hooks.
//!
//! Public API:
//! - `ImeBridge` - Host-facing facade combining queries, mutators, hooks
//! - `ImmGateway` - Injected OS capability interface
//! - `Composition` - Fresh snapshot of composition text, clauses, cursor
//! - `CandidateList` - Decoded, paged conversion-candidate snapshot
//! - `ConversionMode` - Conversion-mode flag set
//! - `MessageRouter` - Lifecycle state machine and notification dispatch
//! - `Config` - Encoding and candidate-list configuration

use serde::{Deserialize, Serialize};

// Core modules
pub mod error;
pub use error::{DecodeError, ImmError};

pub mod gateway;
pub use gateway::{
    AssociationFlags, CompositionQuery, ContextHandle, ImmGateway, LayoutHandle, WindowHandle,
};

pub mod encoding;
pub use encoding::LegacyEncoding;

pub mod composition;
pub use composition::{Composition, StringKind};

pub mod candidate;
pub use candidate::{CandidateList, CANDIDATE_HEADER_LEN};

pub mod conversion;
pub use conversion::ConversionMode;

pub mod message;
pub use message::{MessageEvent, NotifyCommand, WindowMessage};

pub mod router;
pub use router::{CharEvent, CompositionPhase, MessageRouter, SetContextRequest};

pub mod bridge;
pub use bridge::ImeBridge;

/// Configuration for the IME bridge.
///
/// The legacy code page is the process-wide multi-byte encoding the
/// subsystem uses for composition, clause, and candidate text. Description
/// strings are always UTF-16 and are not configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Label of the legacy multi-byte code page (e.g. "shift_jis",
    /// "euc-kr", "gbk"), resolved through the encoding registry.
    pub legacy_encoding: String,

    /// Which of the subsystem's candidate lists to query. Almost always 0.
    pub candidate_list_index: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            legacy_encoding: "shift_jis".to_string(),
            candidate_list_index: 0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Resolve the configured legacy encoding label. `None` when no code
    /// page is registered under the label.
    pub fn resolve_encoding(&self) -> Option<LegacyEncoding> {
        LegacyEncoding::for_label(&self.legacy_encoding)
    }
}
