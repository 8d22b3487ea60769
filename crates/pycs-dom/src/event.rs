#![forbid(unsafe_code)]

//! Event types, listeners and dispatch results.
//!
//! # Design Notes
//!
//! - Listeners have identity: two clones of one [`EventListener`] are the same
//!   listener, so registering it twice is a no-op and removing it through any
//!   clone works (mirrors `addEventListener` with a function reference).
//! - Behaviors that need to re-register themselves hold a
//!   [`WeakEventListener`] to avoid reference cycles.
//! - Dispatch is synchronous and single-threaded; callbacks receive the
//!   document mutably.

use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::DomError;
use crate::document::{Document, NodeId};

/// Kinds of events the page script dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Pointer activation.
    Click,
    /// Key pressed.
    KeyDown,
    /// Key released.
    KeyUp,
}

impl EventType {
    /// DOM event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
        }
    }
}

/// Where a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The document itself (last hop of every bubbling path).
    Document,
    /// An element.
    Node(NodeId),
}

/// Parameters for a dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInit {
    /// Event kind.
    pub event_type: EventType,
    /// `KeyboardEvent.key` for key events.
    pub key: Option<String>,
}

impl EventInit {
    /// A click.
    #[must_use]
    pub const fn click() -> Self {
        Self {
            event_type: EventType::Click,
            key: None,
        }
    }

    /// A key release.
    #[must_use]
    pub fn key_up(key: &str) -> Self {
        Self {
            event_type: EventType::KeyUp,
            key: Some(key.to_owned()),
        }
    }

    /// A key press.
    #[must_use]
    pub fn key_down(key: &str) -> Self {
        Self {
            event_type: EventType::KeyDown,
            key: Some(key.to_owned()),
        }
    }
}

/// An event in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    event_type: EventType,
    key: Option<String>,
    target: NodeId,
    current_target: EventTarget,
    propagation_stopped: bool,
}

impl Event {
    pub(crate) fn new(init: EventInit, target: NodeId) -> Self {
        Self {
            event_type: init.event_type,
            key: init.key,
            target,
            current_target: EventTarget::Node(target),
            propagation_stopped: false,
        }
    }

    /// Event kind.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// `KeyboardEvent.key`, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Element the event was dispatched at.
    #[must_use]
    pub const fn target(&self) -> NodeId {
        self.target
    }

    /// Hop whose listeners are currently running.
    #[must_use]
    pub const fn current_target(&self) -> EventTarget {
        self.current_target
    }

    pub(crate) fn set_current_target(&mut self, hop: EventTarget) {
        self.current_target = hop;
    }

    /// Stop delivery to later hops. Remaining listeners on the current hop still run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether [`Event::stop_propagation`] was called.
    #[must_use]
    pub const fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Result type of listener callbacks.
pub type ListenerResult = Result<(), DomError>;

type Callback = dyn Fn(&mut Document, &mut Event) -> ListenerResult;

/// Stable listener identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A reference-counted event callback with identity.
#[derive(Clone)]
pub struct EventListener {
    id: ListenerId,
    callback: Rc<Callback>,
}

impl EventListener {
    /// Wrap `callback` as a new listener with a fresh identity.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut Document, &mut Event) -> ListenerResult + 'static,
    {
        Self {
            id: ListenerId::next(),
            callback: Rc::new(callback),
        }
    }

    /// Identity of this listener.
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Non-owning handle to this listener.
    #[must_use]
    pub fn downgrade(&self) -> WeakEventListener {
        WeakEventListener {
            id: self.id,
            callback: Rc::downgrade(&self.callback),
        }
    }

    pub(crate) fn call(&self, doc: &mut Document, event: &mut Event) -> ListenerResult {
        (self.callback)(doc, event)
    }
}

impl PartialEq for EventListener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventListener {}

impl core::fmt::Debug for EventListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventListener").field("id", &self.id).finish()
    }
}

/// Weak counterpart of [`EventListener`].
#[derive(Clone)]
pub struct WeakEventListener {
    id: ListenerId,
    callback: Weak<Callback>,
}

impl WeakEventListener {
    /// Identity of the referenced listener.
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Recover the listener if any strong handle is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<EventListener> {
        self.callback.upgrade().map(|callback| EventListener {
            id: self.id,
            callback,
        })
    }
}

impl core::fmt::Debug for WeakEventListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WeakEventListener")
            .field("id", &self.id)
            .finish()
    }
}

/// Summary of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Listener callbacks that ran.
    pub listeners_invoked: usize,
    /// Whether a listener stopped propagation.
    pub propagation_stopped: bool,
    /// Errors returned by listeners, in invocation order.
    pub errors: Vec<DomError>,
}

impl DispatchOutcome {
    /// Whether every listener succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
