#![forbid(unsafe_code)]

//! Page behaviors for PyCS: the navigation menu toggle and the student list
//! filter.
//!
//! Each behavior is split into a host-agnostic core ([`menu::handle_click`],
//! [`filter::apply_filter`]) running against a surface trait, and a handle
//! that binds the core to a [`pycs_dom::Document`]. [`page::PageScript`]
//! attaches whichever behaviors the page has elements for.
//!
//! # Feature flags
//! - `tracing`: emit `menu.click` and `filter.apply` debug spans.

pub mod config;
pub mod filter;
pub mod menu;
pub mod page;

pub use config::{ConfigError, FilterConfig, MenuConfig, PageConfig};
pub use filter::{FilterOutcome, FilterQuery, FilterSurface, ListFilter, apply_filter};
pub use menu::{MenuSurface, MenuToggle, MenuTransition, handle_click};
pub use page::{PageElements, PageError, PageScript};
