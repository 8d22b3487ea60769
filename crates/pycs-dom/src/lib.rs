#![forbid(unsafe_code)]

//! Host-independent document model for the PyCS page script.
//!
//! # Role in PyCS
//! `pycs-dom` is the environment the page behaviors run against when no
//! browser is present. It models just enough of a rendered document for the
//! navigation menu and the student filter: an element tree, class lists,
//! attributes, form values, a CSS selector subset, and event dispatch with
//! bubbling and `stopPropagation`.
//!
//! # Primary responsibilities
//! - **Document**: element arena rooted at `body`, id lookup, selector queries.
//! - **ClassList**: `DOMTokenList` add/remove/toggle semantics.
//! - **Selector**: parsed selectors (`#id`, `.class`, `[attr="v"]`, combinators).
//! - **Events**: listener registration with identity, dispatch along the
//!   target's ancestor path up to the document.
//!
//! # How it fits in the system
//! `pycs-widgets` attaches the menu and filter behaviors to a [`Document`]
//! and is tested entirely against it. The browser binding in `pycs-web`
//! reuses the same behavior cores over `web-sys` instead.

pub mod class_list;
pub mod document;
pub mod event;
pub mod selector;

pub use class_list::ClassList;
pub use document::{Document, ElementSpec, NodeId};
pub use event::{
    DispatchOutcome, Event, EventInit, EventListener, EventTarget, EventType, ListenerId,
    ListenerResult, WeakEventListener,
};
pub use selector::Selector;

/// Errors raised by document operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The node handle does not belong to this document.
    UnknownNode(NodeId),
    /// The selector is malformed or outside the supported subset.
    InvalidSelector(String),
    /// A class token was empty or contained whitespace.
    InvalidToken(String),
    /// `value` was read or written on an element that is not a form control.
    NotFormControl(NodeId),
}

impl core::fmt::Display for DomError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownNode(node) => write!(f, "unknown node: {node}"),
            Self::InvalidSelector(selector) => write!(f, "invalid selector: {selector:?}"),
            Self::InvalidToken(token) => write!(f, "invalid class token: {token:?}"),
            Self::NotFormControl(node) => write!(f, "{node} is not a form control"),
        }
    }
}

impl std::error::Error for DomError {}
