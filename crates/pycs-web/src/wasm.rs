#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the page script.
//!
//! Implements the menu and filter surfaces over `web-sys` and keeps the
//! listener closures alive for as long as the exported [`PageScript`] lives.
//! Only compiled on `wasm32` targets.

use std::cell::OnceCell;
use std::rc::Rc;

use js_sys::{Function, Reflect};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlInputElement, HtmlTextAreaElement};

use pycs_widgets::{
    FilterConfig, FilterOutcome, FilterSurface, MenuConfig, MenuSurface, apply_filter,
    handle_click,
};

use super::bridge::{InstallSummary, error_message, resolve_config};

const CLICK: &str = "click";
const KEY_UP: &str = "keyup";

type Listener = Closure<dyn FnMut(Event)>;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn js_error(context: &str, err: &dyn core::fmt::Display) -> JsValue {
    JsValue::from_str(&error_message(context, err))
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

fn listener_fn(listener: &Listener) -> &Function {
    listener.as_ref().unchecked_ref()
}

// ── Menu ────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct BrowserMenu {
    document: Document,
    menu: Element,
    visible_class: String,
    // Filled right after the click closure is created.
    handler: Rc<OnceCell<Function>>,
}

impl MenuSurface for BrowserMenu {
    type Node = Element;
    type Error = JsValue;

    fn menu_contains(&self, node: &Element) -> Result<bool, JsValue> {
        Ok(self.menu.contains(Some(node.as_ref())))
    }

    fn toggle_visible(&mut self) -> Result<bool, JsValue> {
        self.menu.class_list().toggle(&self.visible_class)
    }

    fn attach_outside_listener(&mut self) -> Result<(), JsValue> {
        match self.handler.get() {
            Some(handler) => self.document.add_event_listener_with_callback(CLICK, handler),
            None => Ok(()),
        }
    }

    fn detach_outside_listener(&mut self) -> Result<(), JsValue> {
        match self.handler.get() {
            Some(handler) => self
                .document
                .remove_event_listener_with_callback(CLICK, handler),
            None => Ok(()),
        }
    }
}

struct MenuBinding {
    toggle: Element,
    surface: BrowserMenu,
    on_click: Listener,
}

impl MenuBinding {
    fn attach(document: &Document, toggle: Element, menu: Element, config: &MenuConfig) -> Result<Self, JsValue> {
        let surface = BrowserMenu {
            document: document.clone(),
            menu,
            visible_class: config.visible_class.clone(),
            handler: Rc::new(OnceCell::new()),
        };
        let mut handler_surface = surface.clone();
        let on_click = Listener::new(move |event: Event| {
            event.stop_propagation();
            let origin = event.target().and_then(|target| target.dyn_into::<Element>().ok());
            match handle_click(&mut handler_surface, origin.as_ref()) {
                Ok(transition) => debug!(transition = transition.as_str(), "menu.click"),
                Err(err) => console_error(&format!("pycs: menu: {}", describe(&err))),
            }
        });
        let _ = surface.handler.set(listener_fn(&on_click).clone());
        toggle.add_event_listener_with_callback(CLICK, listener_fn(&on_click))?;
        Ok(Self {
            toggle,
            surface,
            on_click,
        })
    }

    fn detach(mut self) {
        let removed = self
            .toggle
            .remove_event_listener_with_callback(CLICK, listener_fn(&self.on_click))
            .and_then(|()| self.surface.detach_outside_listener());
        if let Err(err) = removed {
            warn!(error = %describe(&err), "menu detach failed");
        }
    }
}

// ── Filter ──────────────────────────────────────────────────────────────

#[derive(Clone)]
enum FilterInput {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl FilterInput {
    fn from_element(element: Element) -> Result<Self, JsValue> {
        let element = match element.dyn_into::<HtmlInputElement>() {
            Ok(input) => return Ok(Self::Input(input)),
            Err(element) => element,
        };
        element
            .dyn_into::<HtmlTextAreaElement>()
            .map(Self::TextArea)
            .map_err(|_| JsValue::from_str("pycs: filter input is not an input or textarea"))
    }

    fn value(&self) -> String {
        match self {
            Self::Input(input) => input.value(),
            Self::TextArea(area) => area.value(),
        }
    }

    fn element(&self) -> &Element {
        match self {
            Self::Input(input) => input.as_ref(),
            Self::TextArea(area) => area.as_ref(),
        }
    }
}

#[derive(Clone)]
struct BrowserFilter {
    document: Document,
    input: FilterInput,
    item_selector: String,
    label_attribute: String,
    hidden_class: String,
}

impl FilterSurface for BrowserFilter {
    type Item = Element;
    type Error = JsValue;

    fn query(&self) -> Result<String, JsValue> {
        Ok(self.input.value())
    }

    fn items(&self) -> Result<Vec<Element>, JsValue> {
        let list = self.document.query_selector_all(&self.item_selector)?;
        Ok((0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn label(&self, item: &Element) -> Result<Option<String>, JsValue> {
        Ok(item.get_attribute(&self.label_attribute))
    }

    fn set_hidden(&mut self, item: &Element, hidden: bool) -> Result<(), JsValue> {
        if hidden {
            item.class_list().add_1(&self.hidden_class)
        } else {
            item.class_list().remove_1(&self.hidden_class)
        }
    }
}

impl BrowserFilter {
    fn apply(&mut self) -> Result<FilterOutcome, JsValue> {
        let outcome = apply_filter(self)?;
        debug!(
            query = outcome.query.as_str(),
            shown = outcome.shown,
            hidden = outcome.hidden,
            "filter.apply"
        );
        Ok(outcome)
    }
}

struct FilterBinding {
    surface: BrowserFilter,
    on_key_up: Listener,
}

impl FilterBinding {
    fn attach(document: &Document, input: Element, config: &FilterConfig) -> Result<Self, JsValue> {
        let surface = BrowserFilter {
            document: document.clone(),
            input: FilterInput::from_element(input)?,
            item_selector: config.item_selector.clone(),
            label_attribute: config.label_attribute.clone(),
            hidden_class: config.hidden_class.clone(),
        };
        let mut handler_surface = surface.clone();
        let on_key_up = Listener::new(move |_event: Event| {
            if let Err(err) = handler_surface.apply() {
                console_error(&format!("pycs: filter: {}", describe(&err)));
            }
        });
        surface
            .input
            .element()
            .add_event_listener_with_callback(KEY_UP, listener_fn(&on_key_up))?;
        Ok(Self { surface, on_key_up })
    }

    fn detach(self) {
        if let Err(err) = self
            .surface
            .input
            .element()
            .remove_event_listener_with_callback(KEY_UP, listener_fn(&self.on_key_up))
        {
            warn!(error = %describe(&err), "filter detach failed");
        }
    }
}

fn usable<T>(behavior: &'static str, attached: Result<T, JsValue>) -> Option<T> {
    match attached {
        Ok(binding) => Some(binding),
        Err(err) => {
            warn!(behavior, error = %describe(&err), "hook element unusable; behavior disabled");
            None
        }
    }
}

// ── Export ──────────────────────────────────────────────────────────────

/// The menu toggle and student filter attached to `window.document`.
///
/// Dropping the handle (or calling `free()` from JS) removes every listener.
#[wasm_bindgen]
pub struct PageScript {
    menu: Option<MenuBinding>,
    filter: Option<FilterBinding>,
    summary: InstallSummary,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

#[wasm_bindgen]
impl PageScript {
    /// Attach the behaviors whose elements exist. `config` is an optional
    /// JSON object overriding the default hooks.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<PageScript, JsValue> {
        install_panic_hook();
        let config = resolve_config(config.as_deref()).map_err(|err| js_error("config", &err))?;
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("pycs: no document available"))?;

        let toggle = document.get_element_by_id(&config.menu.toggle_id);
        let menu = document.get_element_by_id(&config.menu.menu_id);
        let input = document.query_selector(&config.filter.input_selector)?;
        // Selector syntax errors are config errors; report them before attaching.
        document.query_selector_all(&config.filter.item_selector)?;

        if InstallSummary::menu_orphaned(toggle.is_some(), menu.is_some()) {
            warn!(
                menu_id = config.menu.menu_id.as_str(),
                "menu toggle present without menu container; menu disabled"
            );
        }

        let menu = match (toggle, menu) {
            (Some(toggle), Some(menu)) => {
                usable("menu", MenuBinding::attach(&document, toggle, menu, &config.menu))
            }
            _ => None,
        };
        let filter = input
            .and_then(|input| usable("filter", FilterBinding::attach(&document, input, &config.filter)));
        let summary = InstallSummary {
            menu_attached: menu.is_some(),
            filter_attached: filter.is_some(),
        };

        debug!(
            menu = summary.menu_attached,
            filter = summary.filter_attached,
            "page.install"
        );
        Ok(Self {
            menu,
            filter,
            summary,
        })
    }

    /// Whether the menu toggle is attached.
    #[wasm_bindgen(js_name = menuAttached)]
    pub fn menu_attached(&self) -> bool {
        self.menu.is_some()
    }

    /// Whether the student filter is attached.
    #[wasm_bindgen(js_name = filterAttached)]
    pub fn filter_attached(&self) -> bool {
        self.filter.is_some()
    }

    /// Install summary as JSON: `{"menu_attached":..,"filter_attached":..}`.
    #[wasm_bindgen(js_name = summaryJson)]
    pub fn summary_json(&self) -> String {
        self.summary.to_json()
    }

    /// Filter with the current input value now. Returns the number of items
    /// left visible, `0` when no filter is attached.
    #[wasm_bindgen(js_name = applyFilter)]
    pub fn apply_filter(&mut self) -> Result<u32, JsValue> {
        let Some(filter) = self.filter.as_mut() else {
            return Ok(0);
        };
        let outcome = filter.surface.apply()?;
        Ok(u32::try_from(outcome.shown).unwrap_or(u32::MAX))
    }

    /// Remove every listener. Classes already set are left as they are.
    pub fn detach(&mut self) {
        if let Some(menu) = self.menu.take() {
            menu.detach();
        }
        if let Some(filter) = self.filter.take() {
            filter.detach();
        }
    }
}

impl Drop for PageScript {
    fn drop(&mut self) {
        self.detach();
    }
}
