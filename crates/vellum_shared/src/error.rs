//! # GUI Error Types
//!
//! All errors that can be reported to callers of the widget library.
//!
//! Out-of-range value requests are NOT errors: setters clamp silently.
//! Structural lookup misses on item paths are reported as `bool` returns
//! by the widgets themselves. What remains here is programmer misuse and
//! load/config failures.

use thiserror::Error;

/// Errors that can occur in the widget library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuiError {
    /// A signal was requested by a name the widget does not provide.
    #[error("unknown signal '{name}' on widget type {widget_type}")]
    UnknownSignal {
        /// The requested signal name.
        name: String,
        /// Type tag of the widget that rejected it.
        widget_type: String,
    },

    /// A saved widget tree referenced a type tag with no registered constructor.
    #[error("unknown widget type: {0}")]
    UnknownWidgetType(String),

    /// A style property held a value of a different type than expected.
    #[error("property '{property}' is not a {expected}")]
    PropertyTypeMismatch {
        /// Name of the property.
        property: String,
        /// The type the widget asked for.
        expected: &'static str,
    },

    /// A saved widget tree was missing a required property.
    #[error("missing property '{property}' while loading {widget_type}")]
    MissingProperty {
        /// Name of the missing property.
        property: String,
        /// Type tag of the widget being loaded.
        widget_type: String,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for widget-library operations.
pub type GuiResult<T> = Result<T, GuiError>;
