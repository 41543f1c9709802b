//! Typed window-message surface consumed by the router.
//!
//! The host's message pump forwards raw IME-related window messages as
//! [`WindowMessage`] values. Only the six categories the bridge reacts to
//! are modeled; everything else should not be forwarded.

use crate::gateway::{ContextHandle, WindowHandle};

/// A window message forwarded from the host's message pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMessage {
    /// The window the message is addressed to.
    pub window: WindowHandle,
    pub event: MessageEvent,
}

impl WindowMessage {
    pub fn new(window: WindowHandle, event: MessageEvent) -> Self {
        Self { window, event }
    }
}

/// The message categories the bridge reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageEvent {
    /// The subsystem is (re)binding an input context to the window.
    SetContext {
        /// The context being bound.
        context: ContextHandle,
    },
    /// A state-change notification, with a command selector.
    Notify(NotifyCommand),
    /// Composition started.
    StartComposition,
    /// Composition ended.
    EndComposition,
    /// The in-progress composition changed.
    CompositionUpdate,
    /// A committed character reached the window.
    Char(char),
}

/// Sub-commands of the notify message. Values follow the subsystem's
/// notification table; the router only acts on `SetOpenStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyCommand {
    CloseStatusWindow,
    OpenStatusWindow,
    ChangeCandidate,
    CloseCandidate,
    SetConversionMode,
    SetSentenceMode,
    SetOpenStatus,
    SetCandidatePos,
    SetCompositionFont,
    SetCompositionWindow,
    SetStatusWindowPos,
    Guideline,
    Private,
    /// A command value outside the documented table.
    Other(u32),
}

impl NotifyCommand {
    /// Map the subsystem's raw command value.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0x0001 => Self::CloseStatusWindow,
            0x0002 => Self::OpenStatusWindow,
            0x0003 => Self::ChangeCandidate,
            0x0004 => Self::CloseCandidate,
            0x0005 => Self::SetConversionMode,
            0x0006 => Self::SetSentenceMode,
            0x0008 => Self::SetOpenStatus,
            0x0009 => Self::SetCandidatePos,
            0x000a => Self::SetCompositionFont,
            0x000b => Self::SetCompositionWindow,
            0x000c => Self::SetStatusWindowPos,
            0x000d => Self::Guideline,
            0x000e => Self::Private,
            other => Self::Other(other),
        }
    }

    /// The subsystem's raw command value.
    pub fn raw(self) -> u32 {
        match self {
            Self::CloseStatusWindow => 0x0001,
            Self::OpenStatusWindow => 0x0002,
            Self::ChangeCandidate => 0x0003,
            Self::CloseCandidate => 0x0004,
            Self::SetConversionMode => 0x0005,
            Self::SetSentenceMode => 0x0006,
            Self::SetOpenStatus => 0x0008,
            Self::SetCandidatePos => 0x0009,
            Self::SetCompositionFont => 0x000a,
            Self::SetCompositionWindow => 0x000b,
            Self::SetStatusWindowPos => 0x000c,
            Self::Guideline => 0x000d,
            Self::Private => 0x000e,
            Self::Other(other) => other,
        }
    }
}
