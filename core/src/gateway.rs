//! The injected OS IME gateway capability.
//!
//! Every native call the bridge depends on is routed through the
//! [`ImmGateway`] trait so decoders and routing logic can be exercised
//! against a fake gateway returning canned byte buffers. A production
//! implementation forwards to the platform's input-method subsystem; this
//! crate deliberately does not ship one.
//!
//! Buffer queries follow the subsystem's two-phase protocol: called without
//! a buffer they report the required byte size (or a raw value for
//! value-typed queries such as the cursor position), called with a buffer
//! they fill it.

bitflags::bitflags! {
    /// Scope flags for context association.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AssociationFlags: u32 {
        /// Apply to all child windows of the target window.
        const CHILDREN = 0x0001;
        /// Associate the default input context.
        const DEFAULT = 0x0010;
        /// Skip windows that currently have no context.
        const IGNORE_NO_CONTEXT = 0x0020;
    }
}

/// Handle of the host window owning the IME conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Opaque per-acquisition input-context handle.
///
/// A context is exclusively owned for the duration of a single query and
/// released immediately afterwards; it is never cached across calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub isize);

impl ContextHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Handle of a keyboard layout, used for description queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LayoutHandle(pub isize);

impl LayoutHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Selector for composition-data queries. Values match the subsystem's
/// wire constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositionQuery {
    /// Legacy-encoded bytes of the in-progress composition string.
    CompositionString,
    /// Legacy-encoded bytes of the composition's reading (phonetic) form.
    CompositionReading,
    /// Clause-boundary offset table for the composition string.
    CompositionClauses,
    /// Legacy-encoded bytes of the most recently committed string.
    ResultString,
    /// Legacy-encoded bytes of the committed string's reading form.
    ResultReading,
    /// Cursor position inside the composition, as a value (not a buffer).
    CursorPos,
}

impl CompositionQuery {
    /// The subsystem's numeric selector for this query.
    pub fn raw(self) -> u32 {
        match self {
            Self::CompositionReading => 0x0001,
            Self::CompositionString => 0x0008,
            Self::CompositionClauses => 0x0020,
            Self::CursorPos => 0x0080,
            Self::ResultReading => 0x0200,
            Self::ResultString => 0x0800,
        }
    }
}

/// Capability interface over the native IME subsystem.
///
/// Failures are reported the way the subsystem reports them: null handles,
/// non-positive sizes, `None` flag words. Implementations must not panic on
/// unknown handles.
pub trait ImmGateway {
    /// Acquire the input context bound to `window`. A null handle means the
    /// subsystem has no context for this window.
    fn acquire_context(&self, window: WindowHandle) -> ContextHandle;

    /// Release a context previously acquired for `window`.
    fn release_context(&self, window: WindowHandle, context: ContextHandle);

    /// Query composition data for `context`.
    ///
    /// Without `buf` this returns the required byte size, or the raw value
    /// for [`CompositionQuery::CursorPos`]. With `buf` it fills the buffer
    /// and returns the number of bytes written. Non-positive return values
    /// mean "nothing available".
    fn composition_data(
        &self,
        context: ContextHandle,
        query: CompositionQuery,
        buf: Option<&mut [u8]>,
    ) -> i32;

    /// Query the candidate-list buffer `list_index` for `context`, with the
    /// same size-then-fill protocol as [`composition_data`].
    ///
    /// [`composition_data`]: Self::composition_data
    fn candidate_data(
        &self,
        context: ContextHandle,
        list_index: u32,
        buf: Option<&mut [u8]>,
    ) -> i32;

    /// Current conversion and sentence flag words, or `None` when the query
    /// fails.
    fn conversion_status(&self, context: ContextHandle) -> Option<(u32, u32)>;

    /// Nonzero when the IME is open (active) for `context`.
    fn open_status(&self, context: ContextHandle) -> i32;

    /// The keyboard layout active on the calling thread.
    fn keyboard_layout(&self) -> LayoutHandle;

    /// Query the UTF-16 description of the layout's IME, with the same
    /// size-then-fill protocol as the other buffer queries. Returns the
    /// byte size of the description; 0 when there is none.
    fn description_data(&self, layout: LayoutHandle, buf: Option<&mut [u8]>) -> u32;

    /// Associate `context` with `window` under the given scope flags.
    /// Returns whether the subsystem accepted the association.
    fn associate_context(
        &self,
        window: WindowHandle,
        context: ContextHandle,
        flags: AssociationFlags,
    ) -> bool;
}
