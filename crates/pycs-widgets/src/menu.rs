#![forbid(unsafe_code)]

//! Navigation menu toggle.
//!
//! A click on the toggle control flips the menu's visibility class. While the
//! menu is visible the same handler also listens on the whole document, so a
//! click anywhere outside the menu closes it again. Clicks that originate
//! inside the menu never change it.
//!
//! # Invariant
//!
//! The document-wide listener is registered exactly while the visibility
//! class is present. [`handle_click`] maintains this by attaching or
//! detaching right after every toggle.
//!
//! The decision logic runs against a [`MenuSurface`], which the in-memory
//! [`MenuToggle`] binding and the browser binding both implement.

use std::cell::OnceCell;
use std::rc::Rc;

use pycs_dom::class_list::validate_token;
use pycs_dom::{
    Document, DomError, Event, EventListener, EventTarget, EventType, ListenerResult, NodeId,
    WeakEventListener,
};

use crate::config::MenuConfig;

/// What a click did to the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuTransition {
    /// Visibility class added, outside listener attached.
    Opened,
    /// Visibility class removed, outside listener detached.
    Closed,
    /// Click originated inside the menu; nothing changed.
    Ignored,
}

impl MenuTransition {
    /// Stable name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Ignored => "ignored",
        }
    }
}

/// Host operations the menu logic needs.
///
/// Implementations own the host event; stopping propagation happens before
/// [`handle_click`] is called.
pub trait MenuSurface {
    /// Host node type of the click origin.
    type Node: ?Sized;
    /// Host error type.
    type Error;

    /// Whether `node` is the menu container or inside it.
    fn menu_contains(&self, node: &Self::Node) -> Result<bool, Self::Error>;

    /// Flip the visibility class and return whether it is now present.
    fn toggle_visible(&mut self) -> Result<bool, Self::Error>;

    /// Register the handler as a document-wide click listener.
    fn attach_outside_listener(&mut self) -> Result<(), Self::Error>;

    /// Remove the document-wide click listener.
    fn detach_outside_listener(&mut self) -> Result<(), Self::Error>;
}

/// Handle one click that reached the toggle handler.
///
/// `origin` is the element the click was dispatched at; `None` (a non-element
/// origin) counts as outside the menu.
pub fn handle_click<S: MenuSurface>(
    surface: &mut S,
    origin: Option<&S::Node>,
) -> Result<MenuTransition, S::Error> {
    if let Some(origin) = origin {
        if surface.menu_contains(origin)? {
            return Ok(MenuTransition::Ignored);
        }
    }
    if surface.toggle_visible()? {
        surface.attach_outside_listener()?;
        Ok(MenuTransition::Opened)
    } else {
        surface.detach_outside_listener()?;
        Ok(MenuTransition::Closed)
    }
}

struct DocumentMenu<'a> {
    doc: &'a mut Document,
    menu: NodeId,
    visible_class: &'a str,
    listener: Option<EventListener>,
}

impl MenuSurface for DocumentMenu<'_> {
    type Node = NodeId;
    type Error = DomError;

    fn menu_contains(&self, node: &NodeId) -> Result<bool, DomError> {
        self.doc.contains(self.menu, *node)
    }

    fn toggle_visible(&mut self) -> Result<bool, DomError> {
        self.doc.class_toggle(self.menu, self.visible_class)
    }

    fn attach_outside_listener(&mut self) -> Result<(), DomError> {
        if let Some(listener) = &self.listener {
            self.doc
                .add_event_listener(EventTarget::Document, EventType::Click, listener)?;
        }
        Ok(())
    }

    fn detach_outside_listener(&mut self) -> Result<(), DomError> {
        if let Some(listener) = &self.listener {
            self.doc
                .remove_event_listener(EventTarget::Document, EventType::Click, listener);
        }
        Ok(())
    }
}

#[derive(Debug)]
struct MenuShared {
    menu: NodeId,
    visible_class: String,
    // Weak to avoid a cycle through the listener's own callback.
    listener: OnceCell<WeakEventListener>,
}

impl MenuShared {
    fn on_click(&self, doc: &mut Document, event: &mut Event) -> ListenerResult {
        event.stop_propagation();
        let origin = event.target();
        let mut surface = DocumentMenu {
            doc,
            menu: self.menu,
            visible_class: &self.visible_class,
            listener: self.listener.get().and_then(WeakEventListener::upgrade),
        };
        let transition = handle_click(&mut surface, Some(&origin))?;

        #[cfg(feature = "tracing")]
        self.trace_click(transition, origin);
        #[cfg(not(feature = "tracing"))]
        let _ = transition;

        Ok(())
    }

    #[cfg(feature = "tracing")]
    fn trace_click(&self, transition: MenuTransition, origin: NodeId) {
        let _span = tracing::debug_span!(
            "menu.click",
            transition = transition.as_str(),
            origin = origin.index(),
            menu = self.menu.index()
        )
        .entered();
    }
}

/// Menu toggle attached to an in-memory [`Document`].
///
/// ```
/// use pycs_dom::{Document, ElementSpec};
/// use pycs_widgets::config::MenuConfig;
/// use pycs_widgets::menu::MenuToggle;
///
/// let mut doc = Document::new();
/// let body = doc.body();
/// let button = doc.append(body, ElementSpec::new("button").id("navMenuButton")).unwrap();
/// let menu = doc.append(body, ElementSpec::new("nav").id("navMenu")).unwrap();
/// let toggle = MenuToggle::attach(&mut doc, button, menu, &MenuConfig::default()).unwrap();
///
/// doc.click(button).unwrap();
/// assert!(toggle.is_open(&doc).unwrap());
/// doc.click(body).unwrap();
/// assert!(!toggle.is_open(&doc).unwrap());
/// ```
#[derive(Debug)]
pub struct MenuToggle {
    toggle: NodeId,
    shared: Rc<MenuShared>,
    listener: EventListener,
}

impl MenuToggle {
    /// Register the click handler on `toggle`.
    pub fn attach(
        doc: &mut Document,
        toggle: NodeId,
        menu: NodeId,
        config: &MenuConfig,
    ) -> Result<Self, DomError> {
        validate_token(&config.visible_class)?;
        doc.tag_name(menu)?;
        doc.tag_name(toggle)?;

        let shared = Rc::new(MenuShared {
            menu,
            visible_class: config.visible_class.clone(),
            listener: OnceCell::new(),
        });
        let handler = Rc::clone(&shared);
        let listener = EventListener::new(move |doc, event| handler.on_click(doc, event));
        let _ = shared.listener.set(listener.downgrade());
        doc.add_event_listener(EventTarget::Node(toggle), EventType::Click, &listener)?;

        Ok(Self {
            toggle,
            shared,
            listener,
        })
    }

    /// The toggle control.
    #[must_use]
    pub fn toggle_node(&self) -> NodeId {
        self.toggle
    }

    /// The menu container.
    #[must_use]
    pub fn menu_node(&self) -> NodeId {
        self.shared.menu
    }

    /// The click handler, registered on the toggle and, while open, on the document.
    #[must_use]
    pub fn listener(&self) -> &EventListener {
        &self.listener
    }

    /// Whether the visibility class is present.
    pub fn is_open(&self, doc: &Document) -> Result<bool, DomError> {
        doc.has_class(self.shared.menu, &self.shared.visible_class)
    }

    /// Whether the document-wide click listener is registered.
    #[must_use]
    pub fn outside_listener_attached(&self, doc: &Document) -> bool {
        doc.has_event_listener(EventTarget::Document, EventType::Click, &self.listener)
    }

    /// Remove every listener this toggle registered. The visibility class is left as is.
    pub fn detach(self, doc: &mut Document) {
        doc.remove_event_listener(EventTarget::Node(self.toggle), EventType::Click, &self.listener);
        doc.remove_event_listener(EventTarget::Document, EventType::Click, &self.listener);
    }
}
