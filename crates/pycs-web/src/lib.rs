#![forbid(unsafe_code)]

//! Browser binding for the PyCS page script.
//!
//! This crate exports [`PageScript`] to JavaScript. Constructing it looks up
//! the menu toggle, menu container and filter input in `window.document` and
//! attaches the navigation menu and student filter behaviors from
//! `pycs-widgets` through `web-sys` listeners:
//!
//! ```js
//! import init, { PageScript } from "./pycs_web.js";
//! await init();
//! const script = new PageScript();          // stock PyCS hooks
//! // or: new PageScript('{"filter":{"hidden_class":"is-hidden"}}')
//! ```
//!
//! Only the `wasm32` build exports anything; the config and summary logic in
//! `bridge` is compiled natively for tests as well.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::PageScript;

// Bridge core is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod bridge;
