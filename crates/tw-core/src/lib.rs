//! Core types for Taleweaver: the state bag and template substitution.
//!
//! This crate is independent of the state machine. Every game variable a
//! script reads or writes lives in a [`StateBag`], and every string shown to
//! the player runs through [`statify`] before display.

/// The shared key-value store that holds all game variables.
pub mod bag;
/// `{key}` placeholder scanning and substitution.
pub mod template;
/// The text/integer value type stored in the state bag.
pub mod value;

/// Re-export the state bag.
pub use bag::StateBag;
/// Re-export template functions.
pub use template::{TemplateMatch, scan_for_template, statify};
/// Re-export the value type.
pub use value::Value;
