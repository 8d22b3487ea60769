#![forbid(unsafe_code)]

//! Platform-independent pieces of the browser binding.
//!
//! Config resolution and the install summary reported to JavaScript. No
//! JS/WASM types here.

use serde::Serialize;

use pycs_widgets::{ConfigError, PageConfig};

/// Resolve the constructor argument into a validated config.
///
/// `None`, an empty string and whitespace all mean "stock hooks".
pub(crate) fn resolve_config(json: Option<&str>) -> Result<PageConfig, ConfigError> {
    match json.map(str::trim) {
        None | Some("") => Ok(PageConfig::default()),
        Some(json) => PageConfig::from_json(json),
    }
}

/// Which behaviors ended up attached. Each is reported on its own; an
/// unusable hook clears only its own flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub(crate) struct InstallSummary {
    pub menu_attached: bool,
    pub filter_attached: bool,
}

impl InstallSummary {
    /// Whether the page had a toggle but no menu container.
    pub(crate) const fn menu_orphaned(toggle: bool, menu: bool) -> bool {
        toggle && !menu
    }

    pub(crate) fn to_json(self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Message text handed to JavaScript for a failed operation.
pub(crate) fn error_message(context: &str, err: &dyn core::fmt::Display) -> String {
    format!("pycs: {context}: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_or_blank_config_uses_stock_hooks() {
        assert_eq!(resolve_config(None), Ok(PageConfig::default()));
        assert_eq!(resolve_config(Some("")), Ok(PageConfig::default()));
        assert_eq!(resolve_config(Some("  \n")), Ok(PageConfig::default()));
    }

    #[test]
    fn json_config_overrides_fields() {
        let config = resolve_config(Some(r#"{"menu":{"visible_class":"open"}}"#)).unwrap();
        assert_eq!(config.menu.visible_class, "open");
        assert_eq!(config.filter, PageConfig::default().filter);
    }

    #[test]
    fn invalid_config_is_reported() {
        assert!(matches!(
            resolve_config(Some("[]")),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            resolve_config(Some(r#"[{"menu_id":"x"}]"#)),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            resolve_config(Some(r#"{"filter":{"hidden_class":"a b"}}"#)),
            Err(ConfigError::InvalidClass { .. })
        ));
    }

    #[test]
    fn orphaned_toggle_needs_a_container() {
        assert!(InstallSummary::menu_orphaned(true, false));
        assert!(!InstallSummary::menu_orphaned(true, true));
        assert!(!InstallSummary::menu_orphaned(false, false));
    }

    #[test]
    fn summary_json_reports_each_behavior() {
        let menu_only = InstallSummary {
            menu_attached: true,
            filter_attached: false,
        };
        assert_eq!(
            menu_only.to_json(),
            r#"{"menu_attached":true,"filter_attached":false}"#
        );
        assert_eq!(
            InstallSummary::default().to_json(),
            r#"{"menu_attached":false,"filter_attached":false}"#
        );
    }

    #[test]
    fn error_message_names_context() {
        let err = ConfigError::Empty {
            field: "menu.menu_id",
        };
        assert_eq!(
            error_message("config", &err),
            "pycs: config: config field menu.menu_id must not be empty"
        );
    }
}
