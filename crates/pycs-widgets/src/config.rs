#![forbid(unsafe_code)]

//! Page hooks: which ids, selectors, attributes and classes the behaviors use.
//!
//! Every field defaults to the hooks rendered by the PyCS templates, so an
//! empty JSON object (or no config at all) reproduces the stock page.
//!
//! ```
//! use pycs_widgets::config::PageConfig;
//!
//! let config = PageConfig::from_json(r#"{"filter":{"hidden_class":"is-hidden"}}"#).unwrap();
//! assert_eq!(config.filter.hidden_class, "is-hidden");
//! assert_eq!(config.menu.menu_id, "navMenu");
//! ```

use pycs_dom::class_list::validate_token;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default id of the menu toggle control.
pub const DEFAULT_TOGGLE_ID: &str = "navMenuButton";
/// Default id of the menu container.
pub const DEFAULT_MENU_ID: &str = "navMenu";
/// Default class marking the menu as visible.
pub const DEFAULT_VISIBLE_CLASS: &str = "nav__menu--visible";
/// Default selector of the filter input.
pub const DEFAULT_INPUT_SELECTOR: &str = "[data-script=\"filterStudents\"]";
/// Default selector of filterable items.
pub const DEFAULT_ITEM_SELECTOR: &str = ".ass-list__ass";
/// Default attribute carrying each item's label.
pub const DEFAULT_LABEL_ATTRIBUTE: &str = "data-student-name";
/// Default class marking an item as hidden.
pub const DEFAULT_HIDDEN_CLASS: &str = "hidden";

/// Errors from loading or validating a [`PageConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Malformed JSON or unknown field.
    Json(String),
    /// A required string was empty.
    Empty {
        /// Dotted field path.
        field: &'static str,
    },
    /// A class name was empty or contained whitespace.
    InvalidClass {
        /// Dotted field path.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "config JSON error: {msg}"),
            Self::Empty { field } => write!(f, "config field {field} must not be empty"),
            Self::InvalidClass { field, value } => {
                write!(f, "config field {field} is not a valid class name: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Hooks for the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MenuConfig {
    /// Id of the toggle control.
    pub toggle_id: String,
    /// Id of the menu container.
    pub menu_id: String,
    /// Class present while the menu is shown.
    pub visible_class: String,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            toggle_id: DEFAULT_TOGGLE_ID.to_owned(),
            menu_id: DEFAULT_MENU_ID.to_owned(),
            visible_class: DEFAULT_VISIBLE_CLASS.to_owned(),
        }
    }
}

/// Hooks for the list filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Selector of the text input.
    pub input_selector: String,
    /// Selector of the filterable items, re-evaluated on every key release.
    pub item_selector: String,
    /// Attribute holding each item's label.
    pub label_attribute: String,
    /// Class present while an item is filtered out.
    pub hidden_class: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            input_selector: DEFAULT_INPUT_SELECTOR.to_owned(),
            item_selector: DEFAULT_ITEM_SELECTOR.to_owned(),
            label_attribute: DEFAULT_LABEL_ATTRIBUTE.to_owned(),
            hidden_class: DEFAULT_HIDDEN_CLASS.to_owned(),
        }
    }
}

/// Complete page configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Menu hooks.
    pub menu: MenuConfig,
    /// Filter hooks.
    pub filter: FilterConfig,
}

impl PageConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// The config and each hook section must be JSON objects; serde would
    /// otherwise accept positional arrays for these structs.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        let Value::Object(sections) = &value else {
            return Err(not_an_object("config", &value));
        };
        for (name, section) in sections {
            if !section.is_object() {
                return Err(not_an_object(name, section));
            }
        }
        let config: Self =
            serde_json::from_value(value).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Check that every hook is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty("menu.toggle_id", &self.menu.toggle_id)?;
        non_empty("menu.menu_id", &self.menu.menu_id)?;
        class_name("menu.visible_class", &self.menu.visible_class)?;
        non_empty("filter.input_selector", &self.filter.input_selector)?;
        non_empty("filter.item_selector", &self.filter.item_selector)?;
        non_empty("filter.label_attribute", &self.filter.label_attribute)?;
        class_name("filter.hidden_class", &self.filter.hidden_class)?;
        Ok(())
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Empty { field });
    }
    Ok(())
}

fn not_an_object(name: &str, value: &Value) -> ConfigError {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    ConfigError::Json(format!("{name} must be a JSON object, found {kind}"))
}

/// Same token rules the class list enforces when the class is applied.
fn class_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    validate_token(value).map_err(|_| ConfigError::InvalidClass {
        field,
        value: value.to_owned(),
    })
}
