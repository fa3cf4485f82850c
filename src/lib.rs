//! Catalog list (catalog-list)
//!
//! A searchable, paginated list of catalog entries: a search view state
//! machine and a page controller with stale-result suppression, driven by a
//! shell that renders through a [`screen::Renderer`].
//!
//! Follows a Pure Core / Impure Shell layout: `model` and `state` are pure,
//! `gateway`, `screen` and `console` do the I/O.

pub mod command;
pub mod config;
pub mod console;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod registry;
pub mod screen;
pub mod state;
