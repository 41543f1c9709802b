//! The host-facing bridge facade.
//!
//! [`ImeBridge`] ties a gateway, a window handle, the configured legacy
//! encoding, and the message router together. Queries follow a strict
//! acquire/use/release discipline around the gateway's input context and
//! build every snapshot fresh; nothing is cached between calls.
//!
//! Gateway-level failures (no context, no data) degrade to neutral results
//! so the host simply sees "no IME state". Buffers whose contents are
//! inconsistent with their declared layout surface as [`DecodeError`].

use tracing::{trace, warn};

use crate::candidate::CandidateList;
use crate::composition::{self, Composition, StringKind};
use crate::conversion::ConversionMode;
use crate::encoding::{self, LegacyEncoding};
use crate::error::{DecodeError, ImmError};
use crate::gateway::{
    AssociationFlags, CompositionQuery, ContextHandle, ImmGateway, WindowHandle,
};
use crate::message::WindowMessage;
use crate::router::{CharEvent, MessageRouter, SetContextRequest};
use crate::Config;

/// Bridge between a host window and the OS IME subsystem.
pub struct ImeBridge<G: ImmGateway> {
    gateway: G,
    window: WindowHandle,
    legacy: LegacyEncoding,
    candidate_list_index: u32,
    router: MessageRouter<G>,
}

/// Releases the input context when the scope ends, including on unwind.
struct ReleaseGuard<'a, G: ImmGateway> {
    gateway: &'a G,
    window: WindowHandle,
    context: ContextHandle,
}

impl<G: ImmGateway> Drop for ReleaseGuard<'_, G> {
    fn drop(&mut self) {
        self.gateway.release_context(self.window, self.context);
    }
}

impl<G: ImmGateway> ImeBridge<G> {
    /// Create a bridge for `window` with the default configuration
    /// (Shift_JIS legacy encoding, first candidate list).
    pub fn new(gateway: G, window: WindowHandle) -> Self {
        Self {
            gateway,
            window,
            legacy: LegacyEncoding::default(),
            candidate_list_index: 0,
            router: MessageRouter::new(window),
        }
    }

    /// Create a bridge with an explicit configuration. Fails when the
    /// configured legacy encoding label resolves to no known code page.
    pub fn with_config(gateway: G, window: WindowHandle, config: &Config) -> Result<Self, ImmError> {
        let legacy = config
            .resolve_encoding()
            .ok_or_else(|| ImmError::UnknownEncoding(config.legacy_encoding.clone()))?;
        Ok(Self {
            gateway,
            window,
            legacy,
            candidate_list_index: config.candidate_list_index,
            router: MessageRouter::new(window),
        })
    }

    /// The window this bridge serves.
    pub fn window(&self) -> WindowHandle {
        self.window
    }

    /// The injected gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The legacy code page used for composition and candidate text.
    pub fn legacy_encoding(&self) -> LegacyEncoding {
        self.legacy
    }

    /// Run `action` against a freshly acquired input context.
    ///
    /// The context is acquired from the gateway, handed to `action`, and
    /// released exactly once on every exit path, unwinding included. A null
    /// handle from the gateway is an explicit failure: `action` is not
    /// invoked and nothing is released.
    pub fn with_context<T>(
        &self,
        action: impl FnOnce(&G, ContextHandle) -> T,
    ) -> Result<T, ImmError> {
        let context = self.gateway.acquire_context(self.window);
        if context.is_null() {
            return Err(ImmError::NoContext);
        }
        trace!(context = context.0, "acquired input context");
        let _guard = ReleaseGuard {
            gateway: &self.gateway,
            window: self.window,
            context,
        };
        Ok(action(&self.gateway, context))
    }

    /// Fetch one of the composition strings. Empty when the subsystem has
    /// no context or no data.
    pub fn string(&self, kind: StringKind) -> String {
        let query = match kind {
            StringKind::Composition => CompositionQuery::CompositionString,
            StringKind::Result => CompositionQuery::ResultString,
            StringKind::CompositionReading => CompositionQuery::CompositionReading,
            StringKind::ResultReading => CompositionQuery::ResultReading,
        };
        self.with_context(|gateway, context| {
            let bytes = fetch_bytes(gateway, context, query);
            self.legacy.decode(&bytes)
        })
        .unwrap_or_default()
    }

    /// The text currently being composed.
    pub fn composition(&self) -> String {
        self.string(StringKind::Composition)
    }

    /// The most recently committed text.
    pub fn result(&self) -> String {
        self.string(StringKind::Result)
    }

    /// Clause segmentation of the current composition.
    ///
    /// Empty when the subsystem has no context or no clause data; a clause
    /// buffer inconsistent with the composition bytes is a [`DecodeError`].
    pub fn clauses(&self) -> Result<Vec<String>, DecodeError> {
        match self.with_context(|gateway, context| {
            let composition = fetch_bytes(gateway, context, CompositionQuery::CompositionString);
            let clause_buf = fetch_bytes(gateway, context, CompositionQuery::CompositionClauses);
            composition::decode_clauses(&composition, &clause_buf, self.legacy)
        }) {
            Ok(Ok(clauses)) => Ok(clauses),
            Ok(Err(error)) => {
                warn!(%error, "rejected malformed clause buffer");
                Err(error)
            }
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Cursor position inside the composition as a character index, or
    /// `None` when the subsystem reports no cursor.
    pub fn cursor(&self) -> Option<usize> {
        self.with_context(|gateway, context| {
            let raw = gateway.composition_data(context, CompositionQuery::CursorPos, None);
            let composition = fetch_bytes(gateway, context, CompositionQuery::CompositionString);
            composition::cursor_index(&composition, raw, self.legacy)
        })
        .unwrap_or(None)
    }

    /// Snapshot of the full composition state, assembled under a single
    /// context acquisition.
    pub fn composition_snapshot(&self) -> Result<Composition, DecodeError> {
        match self.with_context(|gateway, context| {
            let composition = fetch_bytes(gateway, context, CompositionQuery::CompositionString);
            let result = fetch_bytes(gateway, context, CompositionQuery::ResultString);
            let clause_buf = fetch_bytes(gateway, context, CompositionQuery::CompositionClauses);
            let raw_cursor = gateway.composition_data(context, CompositionQuery::CursorPos, None);

            let clauses = composition::decode_clauses(&composition, &clause_buf, self.legacy)?;
            Ok(Composition {
                text: self.legacy.decode(&composition),
                result: self.legacy.decode(&result),
                clauses,
                cursor: composition::cursor_index(&composition, raw_cursor, self.legacy),
            })
        }) {
            Ok(Ok(snapshot)) => Ok(snapshot),
            Ok(Err(error)) => {
                warn!(%error, "rejected malformed clause buffer");
                Err(error)
            }
            Err(_) => Ok(Composition::default()),
        }
    }

    /// The candidate list currently offered by the conversion engine.
    ///
    /// Empty when the subsystem has no context or no candidate data; a
    /// buffer inconsistent with its header is a [`DecodeError`].
    pub fn candidates(&self) -> Result<CandidateList, DecodeError> {
        match self.with_context(|gateway, context| {
            let size = gateway.candidate_data(context, self.candidate_list_index, None);
            if size <= 0 {
                return Ok(CandidateList::empty());
            }
            let mut buf = vec![0u8; size as usize];
            gateway.candidate_data(context, self.candidate_list_index, Some(&mut buf));
            CandidateList::decode(&buf, self.legacy)
        }) {
            Ok(Ok(list)) => Ok(list),
            Ok(Err(error)) => {
                warn!(%error, "rejected malformed candidate buffer");
                Err(error)
            }
            Err(_) => Ok(CandidateList::empty()),
        }
    }

    /// Whether the IME is currently open for the window.
    pub fn open_status(&self) -> bool {
        self.with_context(|gateway, context| gateway.open_status(context) != 0)
            .unwrap_or(false)
    }

    /// The IME's current conversion mode. All-clear when the subsystem has
    /// no context or the query fails.
    pub fn conversion_mode(&self) -> ConversionMode {
        self.with_context(|gateway, context| {
            gateway
                .conversion_status(context)
                .map(|(conversion, _sentence)| ConversionMode::from_word(conversion))
                .unwrap_or_else(ConversionMode::empty)
        })
        .unwrap_or_else(|_| ConversionMode::empty())
    }

    /// Human-readable description of the active keyboard layout's IME.
    /// Queried from the layout handle, decoded as UTF-16; no input context
    /// is involved.
    pub fn description(&self) -> String {
        let layout = self.gateway.keyboard_layout();
        let size = self.gateway.description_data(layout, None);
        if size == 0 {
            return String::new();
        }
        let mut buf = vec![0u8; size as usize];
        self.gateway.description_data(layout, Some(&mut buf));
        encoding::decode_utf16le(&buf)
    }

    /// Associate `context` with the window.
    pub fn associate_context(&self, context: ContextHandle) -> bool {
        self.gateway
            .associate_context(self.window, context, AssociationFlags::empty())
    }

    /// Associate the default input context with the window.
    pub fn associate_default_context(&self) -> bool {
        self.gateway
            .associate_context(self.window, ContextHandle::NULL, AssociationFlags::DEFAULT)
    }

    /// Route one window message through the bridge.
    ///
    /// Returns `true` when the host should suppress its default processing
    /// for the message.
    pub fn handle_message(&mut self, message: &WindowMessage) -> bool {
        self.router.dispatch(&self.gateway, message)
    }

    /// The message router, for lifecycle inspection.
    pub fn router(&self) -> &MessageRouter<G> {
        &self.router
    }

    /// True while a composition is in progress.
    pub fn is_composing(&self) -> bool {
        self.router.is_composing()
    }

    /// Observe set-context notifications (cancellable).
    pub fn on_set_context(
        &mut self,
        observer: impl FnMut(&mut SetContextRequest<'_, G>) + 'static,
    ) {
        self.router.on_set_context(observer);
    }

    /// Observe composition start.
    pub fn on_start_composition(&mut self, observer: impl FnMut() + 'static) {
        self.router.on_start_composition(observer);
    }

    /// Observe composition end.
    pub fn on_end_composition(&mut self, observer: impl FnMut() + 'static) {
        self.router.on_end_composition(observer);
    }

    /// Observe composition updates.
    pub fn on_composition_changed(&mut self, observer: impl FnMut() + 'static) {
        self.router.on_composition_changed(observer);
    }

    /// Observe committed characters (cancellable).
    pub fn on_char_receive(&mut self, observer: impl FnMut(&mut CharEvent) + 'static) {
        self.router.on_char_receive(observer);
    }

    /// Observe IME open/close toggles.
    pub fn on_open_status_changed(&mut self, observer: impl FnMut() + 'static) {
        self.router.on_open_status_changed(observer);
    }
}

/// Size-query-then-fill fetch of one composition buffer.
fn fetch_bytes<G: ImmGateway>(
    gateway: &G,
    context: ContextHandle,
    query: CompositionQuery,
) -> Vec<u8> {
    let size = gateway.composition_data(context, query, None);
    if size <= 0 {
        return Vec::new();
    }
    let mut buf = vec![0u8; size as usize];
    gateway.composition_data(context, query, Some(&mut buf));
    buf
}
