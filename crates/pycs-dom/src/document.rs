#![forbid(unsafe_code)]

//! Element arena, queries and event dispatch.

use std::collections::HashMap;

use crate::DomError;
use crate::class_list::{ClassList, validate_token};
use crate::event::{
    DispatchOutcome, Event, EventInit, EventListener, EventTarget, EventType,
};
use crate::selector::Selector;

/// Handle to an element owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag: String,
    pub(crate) id: Option<String>,
    pub(crate) classes: ClassList,
    attrs: Vec<(String, String)>,
    value: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    pub(crate) fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" => (!self.classes.is_empty()).then(|| self.classes.to_string()),
            _ => self
                .attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
        }
    }

    fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea")
    }
}

/// Description of an element to append to a [`Document`].
///
/// ```
/// use pycs_dom::{Document, ElementSpec};
///
/// let mut doc = Document::new();
/// let body = doc.body();
/// let menu = doc
///     .append(body, ElementSpec::new("nav").id("navMenu").class("nav__menu"))
///     .unwrap();
/// assert_eq!(doc.get_element_by_id("navMenu"), Some(menu));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSpec {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    value: Option<String>,
}

impl ElementSpec {
    /// Start a spec for an element with tag name `tag`.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Set the element id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class token.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set an attribute. `id` and `class` are routed to their dedicated slots.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match name.as_str() {
            "id" => self.id = Some(value),
            "class" => self
                .classes
                .extend(value.split_ascii_whitespace().map(ToOwned::to_owned)),
            _ => self.attrs.push((name, value)),
        }
        self
    }

    /// Initial form value (for `input` / `textarea`).
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// In-memory document.
///
/// The document always contains a `body` element; every other element is
/// appended beneath it. Listeners are keyed by target and event type.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Element>,
    body: NodeId,
    listeners: HashMap<(EventTarget, EventType), Vec<EventListener>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only `body`.
    #[must_use]
    pub fn new() -> Self {
        let body = Element {
            tag: "body".to_owned(),
            id: None,
            classes: ClassList::new(),
            attrs: Vec::new(),
            value: String::new(),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            listeners: HashMap::new(),
        }
    }

    /// The `body` element.
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    pub(crate) fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    pub(crate) fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).and_then(|element| element.parent)
    }

    fn get(&self, node: NodeId) -> Result<&Element, DomError> {
        self.nodes.get(node.0).ok_or(DomError::UnknownNode(node))
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut Element, DomError> {
        self.nodes.get_mut(node.0).ok_or(DomError::UnknownNode(node))
    }

    /// Append a new element as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> Result<NodeId, DomError> {
        self.get(parent)?;
        let mut classes = ClassList::new();
        for class in &spec.classes {
            classes.add(class)?;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element {
            tag: spec.tag,
            id: spec.id,
            classes,
            attrs: spec.attrs,
            value: spec.value.unwrap_or_default(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Lowercase tag name.
    pub fn tag_name(&self, node: NodeId) -> Result<&str, DomError> {
        Ok(self.get(node)?.tag.as_str())
    }

    /// Parent element, `None` for `body`.
    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.get(node)?.parent)
    }

    /// Inclusive containment: `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> Result<bool, DomError> {
        self.get(ancestor)?;
        let mut cursor = Some(self.get(node).map(|_| node)?);
        while let Some(current) = cursor {
            if current == ancestor {
                return Ok(true);
            }
            cursor = self.parent_of(current);
        }
        Ok(false)
    }

    /// All elements in tree order, starting at `body`.
    #[must_use]
    pub fn tree_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.body];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    /// First element in tree order whose id is `id`.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.tree_order()
            .into_iter()
            .find(|node| self.nodes[node.0].id.as_deref() == Some(id))
    }

    /// First element in tree order matching `selector`.
    #[must_use]
    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        if let Some(id) = selector.id_only() {
            return self.get_element_by_id(id);
        }
        self.tree_order()
            .into_iter()
            .find(|&node| selector.matches(self, node))
    }

    /// Every element matching `selector`, in tree order.
    #[must_use]
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.tree_order()
            .into_iter()
            .filter(|&node| selector.matches(self, node))
            .collect()
    }

    /// Attribute value; `id` and `class` reflect their dedicated slots.
    pub fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.get(node)?.attribute(name))
    }

    /// Whether `node` carries `class`.
    pub fn has_class(&self, node: NodeId, class: &str) -> Result<bool, DomError> {
        Ok(self.get(node)?.classes.contains(class))
    }

    /// `classList.add`.
    pub fn class_add(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.get_mut(node)?.classes.add(class)
    }

    /// `classList.remove`.
    pub fn class_remove(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.get_mut(node)?.classes.remove(class)
    }

    /// `classList.toggle`; returns presence after the flip.
    pub fn class_toggle(&mut self, node: NodeId, class: &str) -> Result<bool, DomError> {
        validate_token(class)?;
        self.get_mut(node)?.classes.toggle(class)
    }

    /// Current value of an `input` / `textarea`.
    pub fn value(&self, node: NodeId) -> Result<&str, DomError> {
        let element = self.get(node)?;
        if !element.is_form_control() {
            return Err(DomError::NotFormControl(node));
        }
        Ok(element.value.as_str())
    }

    /// Replace the value of an `input` / `textarea` without dispatching events.
    pub fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError> {
        let element = self.get_mut(node)?;
        if !element.is_form_control() {
            return Err(DomError::NotFormControl(node));
        }
        element.value = value.to_owned();
        Ok(())
    }

    fn check_target(&self, target: EventTarget) -> Result<(), DomError> {
        match target {
            EventTarget::Document => Ok(()),
            EventTarget::Node(node) => self.get(node).map(|_| ()),
        }
    }

    /// Register `listener`. Returns `false` if it was already registered for
    /// this target and type (registration is then a no-op).
    pub fn add_event_listener(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        listener: &EventListener,
    ) -> Result<bool, DomError> {
        self.check_target(target)?;
        let slot = self.listeners.entry((target, event_type)).or_default();
        if slot.iter().any(|existing| existing == listener) {
            return Ok(false);
        }
        slot.push(listener.clone());
        Ok(true)
    }

    /// Unregister `listener`. Returns `false` if it was not registered.
    pub fn remove_event_listener(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        listener: &EventListener,
    ) -> bool {
        let Some(slot) = self.listeners.get_mut(&(target, event_type)) else {
            return false;
        };
        let before = slot.len();
        slot.retain(|existing| existing != listener);
        let removed = slot.len() != before;
        if slot.is_empty() {
            self.listeners.remove(&(target, event_type));
        }
        removed
    }

    /// Whether `listener` is registered for this target and type.
    #[must_use]
    pub fn has_event_listener(
        &self,
        target: EventTarget,
        event_type: EventType,
        listener: &EventListener,
    ) -> bool {
        self.listeners
            .get(&(target, event_type))
            .is_some_and(|slot| slot.iter().any(|existing| existing == listener))
    }

    /// Number of listeners registered for this target and type.
    #[must_use]
    pub fn listener_count(&self, target: EventTarget, event_type: EventType) -> usize {
        self.listeners
            .get(&(target, event_type))
            .map_or(0, Vec::len)
    }

    /// Total listeners registered anywhere in the document.
    #[must_use]
    pub fn total_listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Dispatch an event at `target` and bubble it to the document.
    ///
    /// The listener list of each hop is read when the hop is reached, so a
    /// listener registered on a later hop during dispatch still sees this
    /// event. A listener removed before its turn is skipped. Listener errors
    /// are collected in the outcome and do not stop dispatch.
    pub fn dispatch(&mut self, target: NodeId, init: EventInit) -> Result<DispatchOutcome, DomError> {
        self.get(target)?;

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "dom.dispatch",
            event_type = init.event_type.as_str(),
            target = target.index()
        )
        .entered();

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(EventTarget::Node(node));
            cursor = self.parent_of(node);
        }
        path.push(EventTarget::Document);

        let event_type = init.event_type;
        let mut event = Event::new(init, target);
        let mut outcome = DispatchOutcome::default();
        for hop in path {
            let snapshot = self
                .listeners
                .get(&(hop, event_type))
                .cloned()
                .unwrap_or_default();
            event.set_current_target(hop);
            for listener in snapshot {
                if !self.has_event_listener(hop, event_type, &listener) {
                    continue;
                }
                outcome.listeners_invoked += 1;
                if let Err(err) = listener.call(self, &mut event) {
                    outcome.errors.push(err);
                }
            }
            if event.propagation_stopped() {
                outcome.propagation_stopped = true;
                break;
            }
        }
        Ok(outcome)
    }

    /// Dispatch a click at `target`.
    pub fn click(&mut self, target: NodeId) -> Result<DispatchOutcome, DomError> {
        self.dispatch(target, EventInit::click())
    }

    /// Dispatch a key release of `key` at `target`.
    pub fn key_up(&mut self, target: NodeId, key: &str) -> Result<DispatchOutcome, DomError> {
        self.dispatch(target, EventInit::key_up(key))
    }

    /// Simulate typing: append each character of `text` to the input value,
    /// dispatching `keydown` before and `keyup` after each change.
    pub fn type_text(&mut self, input: NodeId, text: &str) -> Result<Vec<DispatchOutcome>, DomError> {
        let mut outcomes = Vec::with_capacity(text.chars().count());
        for ch in text.chars() {
            let key = ch.to_string();
            self.dispatch(input, EventInit::key_down(&key))?;
            let mut value = self.value(input)?.to_owned();
            value.push(ch);
            self.set_value(input, &value)?;
            outcomes.push(self.key_up(input, &key)?);
        }
        Ok(outcomes)
    }

    /// Simulate pressing Backspace on an input: drop the last character and
    /// dispatch `keyup` with key `Backspace`.
    pub fn backspace(&mut self, input: NodeId) -> Result<DispatchOutcome, DomError> {
        self.dispatch(input, EventInit::key_down("Backspace"))?;
        let mut value = self.value(input)?.to_owned();
        value.pop();
        self.set_value(input, &value)?;
        self.key_up(input, "Backspace")
    }
}
