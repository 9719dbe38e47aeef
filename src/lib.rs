//! An embeddable emoji picker for terminal UIs.
//!
//! A category tree is built once from configuration ([`config`], [`tree`]).
//! Every query change prunes it ([`filter`]) and flattens the survivors into
//! navigable cells ([`projector`]). A [`picker::Picker`] routes key and mouse
//! events through the focus state machine ([`nav`]) and hands committed items
//! to a [`commit::SelectionHandler`] supplied by the host.

pub mod commit;
pub mod config;
pub mod error;
pub mod filter;
pub mod host;
pub mod nav;
pub mod picker;
pub mod projector;
pub mod tree;
pub mod ui;
pub mod widgets;

pub use commit::SelectionHandler;
pub use error::ConfigError;
pub use picker::{Action, Picker};
