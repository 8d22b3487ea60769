#![forbid(unsafe_code)]

//! Page initialization.
//!
//! Resolves the elements each behavior needs and attaches the behaviors whose
//! elements exist. A page without a menu or without a filter input is not an
//! error; the corresponding behavior is simply not installed. The two
//! behaviors are independent: a hook that cannot be used disables only its
//! own behavior.

use pycs_dom::{Document, DomError, NodeId, Selector};

use crate::config::{ConfigError, PageConfig};
use crate::filter::ListFilter;
use crate::menu::MenuToggle;

/// Errors from installing the page script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The configuration is unusable.
    Config(ConfigError),
    /// A document operation failed.
    Dom(DomError),
}

impl core::fmt::Display for PageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid page config: {err}"),
            Self::Dom(err) => write!(f, "document error: {err}"),
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Dom(err) => Some(err),
        }
    }
}

impl From<ConfigError> for PageError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<DomError> for PageError {
    fn from(err: DomError) -> Self {
        Self::Dom(err)
    }
}

/// The elements the behaviors attach to, each optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageElements {
    /// Menu toggle control.
    pub toggle: Option<NodeId>,
    /// Menu container.
    pub menu: Option<NodeId>,
    /// Filter text input.
    pub filter_input: Option<NodeId>,
}

impl PageElements {
    /// Look the elements up: toggle and menu by id, filter input by selector.
    pub fn discover(doc: &Document, config: &PageConfig) -> Result<Self, PageError> {
        let input_selector = Selector::parse(&config.filter.input_selector)?;
        Ok(Self {
            toggle: doc.get_element_by_id(&config.menu.toggle_id),
            menu: doc.get_element_by_id(&config.menu.menu_id),
            filter_input: doc.query_selector(&input_selector),
        })
    }
}

/// The installed behaviors of one page.
#[derive(Debug, Default)]
pub struct PageScript {
    menu: Option<MenuToggle>,
    filter: Option<ListFilter>,
}

impl PageScript {
    /// Attach every behavior whose elements are present.
    ///
    /// The menu needs both the toggle and the container; the filter needs the
    /// input. Config errors are reported before the document is touched. A
    /// behavior whose element cannot be used (a filter hook on a `div`, a
    /// stale node) is skipped and the other one is still installed.
    pub fn install(
        doc: &mut Document,
        elements: PageElements,
        config: &PageConfig,
    ) -> Result<Self, PageError> {
        config.validate()?;
        Selector::parse(&config.filter.item_selector)?;

        let menu = match (elements.toggle, elements.menu) {
            (Some(toggle), Some(menu)) => {
                usable("menu", MenuToggle::attach(doc, toggle, menu, &config.menu))
            }
            (Some(_toggle), None) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    menu_id = %config.menu.menu_id,
                    "menu toggle present without menu container; menu disabled"
                );
                None
            }
            _ => None,
        };

        let filter = elements
            .filter_input
            .and_then(|input| usable("filter", ListFilter::attach(doc, input, &config.filter)));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            menu = menu.is_some(),
            filter = filter.is_some(),
            "page.install"
        );

        Ok(Self { menu, filter })
    }

    /// [`PageElements::discover`] followed by [`PageScript::install`].
    pub fn install_discovered(doc: &mut Document, config: &PageConfig) -> Result<Self, PageError> {
        config.validate()?;
        let elements = PageElements::discover(doc, config)?;
        Self::install(doc, elements, config)
    }

    /// The menu behavior, if installed.
    #[must_use]
    pub fn menu(&self) -> Option<&MenuToggle> {
        self.menu.as_ref()
    }

    /// The filter behavior, if installed.
    #[must_use]
    pub fn filter(&self) -> Option<&ListFilter> {
        self.filter.as_ref()
    }

    /// Remove every listener the installed behaviors registered.
    pub fn detach(self, doc: &mut Document) {
        if let Some(menu) = self.menu {
            menu.detach(doc);
        }
        if let Some(filter) = self.filter {
            filter.detach(doc);
        }
    }
}

fn usable<T>(behavior: &'static str, attached: Result<T, DomError>) -> Option<T> {
    match attached {
        Ok(handle) => Some(handle),
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(behavior, error = %err, "hook element unusable; behavior disabled");
            #[cfg(not(feature = "tracing"))]
            let _ = (behavior, err);
            None
        }
    }
}
