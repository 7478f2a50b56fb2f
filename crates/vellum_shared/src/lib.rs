//! # VELLUM Shared
//!
//! Foundation types used by every VELLUM crate.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - widget types
//! - render commands
//! - anything with interior mutability
//!
//! If you need GUI types, put them in `vellum_ui`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod color;
pub mod error;
pub mod math;

pub use color::Color;
pub use error::{GuiError, GuiResult};
pub use math::{Rect, Vec2};
