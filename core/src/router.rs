//! Message routing and composition lifecycle.
//!
//! The router filters incoming window messages by the owned window handle,
//! tracks the `Idle -> Composing -> Idle` lifecycle, and dispatches typed
//! notifications to registered observers. Everything is synchronous:
//! observers run to completion before the router returns its "handled"
//! verdict, on the thread that delivered the message.
//!
//! Observers are kept in explicit ordered lists and invoked in registration
//! order. For the two cancellable notifications (set-context and char), any
//! observer marking the message handled is decisive; a later observer
//! cannot un-handle it.

use tracing::{debug, trace};

use crate::gateway::{AssociationFlags, ContextHandle, ImmGateway, WindowHandle};
use crate::message::{MessageEvent, NotifyCommand, WindowMessage};

/// Where the composition lifecycle currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompositionPhase {
    /// No composition in progress.
    #[default]
    Idle,
    /// Between start-composition and end-composition.
    Composing,
}

/// A cancellable set-context notification.
///
/// Carries the association operations so an observer can bind a different
/// context (or the default one) before marking the message handled, which
/// suppresses the subsystem's default association.
pub struct SetContextRequest<'a, G: ImmGateway> {
    gateway: &'a G,
    window: WindowHandle,
    context: ContextHandle,
    handled: bool,
}

impl<G: ImmGateway> SetContextRequest<'_, G> {
    /// The window the context is being bound to.
    pub fn window(&self) -> WindowHandle {
        self.window
    }

    /// The context the subsystem is binding.
    pub fn context(&self) -> ContextHandle {
        self.context
    }

    /// Associate a specific context with the window.
    pub fn associate(&self, context: ContextHandle) -> bool {
        self.gateway
            .associate_context(self.window, context, AssociationFlags::empty())
    }

    /// Associate the default context with the window.
    pub fn associate_default(&self) -> bool {
        self.gateway
            .associate_context(self.window, ContextHandle::NULL, AssociationFlags::DEFAULT)
    }

    /// Mark whether this observer handled the message. Once any observer
    /// marks it handled, the verdict stays handled.
    pub fn set_handled(&mut self, handled: bool) {
        self.handled = handled;
    }

    pub fn handled(&self) -> bool {
        self.handled
    }
}

/// A cancellable character notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharEvent {
    /// The committed character.
    pub ch: char,
    /// Set to `true` to suppress the host's default character insertion.
    pub handled: bool,
}

type SetContextObserver<G> = Box<dyn FnMut(&mut SetContextRequest<'_, G>)>;
type CharObserver = Box<dyn FnMut(&mut CharEvent)>;
type Observer = Box<dyn FnMut()>;

/// Filters window messages and dispatches typed notifications.
pub struct MessageRouter<G: ImmGateway> {
    window: WindowHandle,
    phase: CompositionPhase,
    set_context: Vec<SetContextObserver<G>>,
    start_composition: Vec<Observer>,
    end_composition: Vec<Observer>,
    composition_changed: Vec<Observer>,
    char_receive: Vec<CharObserver>,
    open_status_changed: Vec<Observer>,
}

impl<G: ImmGateway> MessageRouter<G> {
    /// Create a router owning `window`. Messages addressed to any other
    /// window are ignored.
    pub fn new(window: WindowHandle) -> Self {
        Self {
            window,
            phase: CompositionPhase::Idle,
            set_context: Vec::new(),
            start_composition: Vec::new(),
            end_composition: Vec::new(),
            composition_changed: Vec::new(),
            char_receive: Vec::new(),
            open_status_changed: Vec::new(),
        }
    }

    /// The window this router accepts messages for.
    pub fn window(&self) -> WindowHandle {
        self.window
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> CompositionPhase {
        self.phase
    }

    /// True while a composition is in progress.
    pub fn is_composing(&self) -> bool {
        self.phase == CompositionPhase::Composing
    }

    /// Observe set-context notifications. Cancellable: marking the request
    /// handled suppresses the subsystem's default association.
    pub fn on_set_context(
        &mut self,
        observer: impl FnMut(&mut SetContextRequest<'_, G>) + 'static,
    ) {
        self.set_context.push(Box::new(observer));
    }

    /// Observe composition start.
    pub fn on_start_composition(&mut self, observer: impl FnMut() + 'static) {
        self.start_composition.push(Box::new(observer));
    }

    /// Observe composition end.
    pub fn on_end_composition(&mut self, observer: impl FnMut() + 'static) {
        self.end_composition.push(Box::new(observer));
    }

    /// Observe composition updates.
    pub fn on_composition_changed(&mut self, observer: impl FnMut() + 'static) {
        self.composition_changed.push(Box::new(observer));
    }

    /// Observe committed characters. Cancellable: marking the event handled
    /// tells the host to skip its default character insertion.
    pub fn on_char_receive(&mut self, observer: impl FnMut(&mut CharEvent) + 'static) {
        self.char_receive.push(Box::new(observer));
    }

    /// Observe IME open/close toggles.
    pub fn on_open_status_changed(&mut self, observer: impl FnMut() + 'static) {
        self.open_status_changed.push(Box::new(observer));
    }

    /// Route one window message.
    ///
    /// Returns `true` when the message was handled and the host should
    /// suppress its default processing; informational notifications always
    /// return `false`. Messages addressed to a different window return
    /// `false` without any effect.
    pub fn dispatch(&mut self, gateway: &G, message: &WindowMessage) -> bool {
        if message.window != self.window {
            trace!(?message.window, "ignoring message for foreign window");
            return false;
        }

        match message.event {
            MessageEvent::SetContext { context } => {
                let mut handled = false;
                let mut request = SetContextRequest {
                    gateway,
                    window: self.window,
                    context,
                    handled: false,
                };
                for observer in &mut self.set_context {
                    observer(&mut request);
                    handled |= request.handled;
                }
                trace!(handled, "set-context dispatched");
                handled
            }
            MessageEvent::Notify(NotifyCommand::SetOpenStatus) => {
                for observer in &mut self.open_status_changed {
                    observer();
                }
                false
            }
            MessageEvent::Notify(command) => {
                trace!(?command, "notify command without routing behavior");
                false
            }
            MessageEvent::StartComposition => {
                debug!("composition started");
                self.phase = CompositionPhase::Composing;
                for observer in &mut self.start_composition {
                    observer();
                }
                false
            }
            MessageEvent::EndComposition => {
                debug!("composition ended");
                self.phase = CompositionPhase::Idle;
                for observer in &mut self.end_composition {
                    observer();
                }
                false
            }
            MessageEvent::CompositionUpdate => {
                for observer in &mut self.composition_changed {
                    observer();
                }
                false
            }
            MessageEvent::Char(ch) => {
                let mut handled = false;
                let mut event = CharEvent { ch, handled: false };
                for observer in &mut self.char_receive {
                    observer(&mut event);
                    handled |= event.handled;
                }
                trace!(%ch, handled, "char dispatched");
                handled
            }
        }
    }
}
