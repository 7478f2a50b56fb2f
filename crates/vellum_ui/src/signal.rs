//! Typed widget signals.
//!
//! Widgets announce state changes by emitting a [`Signal`] through their
//! [`SignalTable`]. The table is built at construction with the kinds the
//! widget supports; connecting to anything else is programmer misuse and
//! fails with [`GuiError::UnknownSignal`]. Listeners are called
//! synchronously, in registration order, within the emitting call.

use std::collections::HashMap;
use vellum_shared::{GuiError, GuiResult, Vec2};

/// Discriminator for the signals a widget can support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// The widget was clicked.
    Clicked,
    /// A scrollbar's value changed.
    ValueChanged,
    /// A tree item was selected.
    ItemSelected,
    /// A tree leaf (or a label) was double-clicked.
    DoubleClicked,
    /// A tree branch was expanded.
    Expanded,
    /// A tree branch was collapsed.
    Collapsed,
}

impl SignalKind {
    /// The wire name of this signal, matching the save-file vocabulary.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clicked => "Clicked",
            Self::ValueChanged => "ValueChanged",
            Self::ItemSelected => "ItemSelected",
            Self::DoubleClicked => "DoubleClicked",
            Self::Expanded => "Expanded",
            Self::Collapsed => "Collapsed",
        }
    }

    /// Looks a kind up by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Clicked" => Some(Self::Clicked),
            "ValueChanged" => Some(Self::ValueChanged),
            "ItemSelected" => Some(Self::ItemSelected),
            "DoubleClicked" => Some(Self::DoubleClicked),
            "Expanded" => Some(Self::Expanded),
            "Collapsed" => Some(Self::Collapsed),
            _ => None,
        }
    }
}

/// A signal emission with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// The widget was clicked at the given local position.
    Clicked {
        /// Click position in widget-local coordinates.
        pos: Vec2,
    },
    /// A scrollbar value changed.
    ValueChanged {
        /// The new value.
        value: u32,
    },
    /// A tree item was selected.
    ItemSelected {
        /// Path of the selected node, root first.
        path: Vec<String>,
    },
    /// A double click. Tree views carry the node path; labels carry their
    /// text as a single-element path.
    DoubleClicked {
        /// Path of the double-clicked item.
        path: Vec<String>,
    },
    /// A tree branch was expanded.
    Expanded {
        /// Path of the expanded node.
        path: Vec<String>,
    },
    /// A tree branch was collapsed.
    Collapsed {
        /// Path of the collapsed node.
        path: Vec<String>,
    },
}

impl Signal {
    /// The kind of this emission.
    #[must_use]
    pub const fn kind(&self) -> SignalKind {
        match self {
            Self::Clicked { .. } => SignalKind::Clicked,
            Self::ValueChanged { .. } => SignalKind::ValueChanged,
            Self::ItemSelected { .. } => SignalKind::ItemSelected,
            Self::DoubleClicked { .. } => SignalKind::DoubleClicked,
            Self::Expanded { .. } => SignalKind::Expanded,
            Self::Collapsed { .. } => SignalKind::Collapsed,
        }
    }
}

/// A registered listener.
pub type SignalHandler = Box<dyn FnMut(&Signal)>;

/// Per-widget registration table: supported kinds fixed at construction,
/// handlers added by the application.
pub struct SignalTable {
    widget_type: &'static str,
    supported: &'static [SignalKind],
    handlers: HashMap<SignalKind, Vec<SignalHandler>>,
}

impl SignalTable {
    /// Creates a table for a widget type with a fixed set of supported kinds.
    #[must_use]
    pub fn new(widget_type: &'static str, supported: &'static [SignalKind]) -> Self {
        Self {
            widget_type,
            supported,
            handlers: HashMap::new(),
        }
    }

    /// Returns the kinds this widget can emit.
    #[must_use]
    pub fn supported(&self) -> &'static [SignalKind] {
        self.supported
    }

    /// Registers a listener for a supported kind.
    ///
    /// # Errors
    ///
    /// [`GuiError::UnknownSignal`] when the widget does not emit this kind.
    pub fn connect(
        &mut self,
        kind: SignalKind,
        handler: impl FnMut(&Signal) + 'static,
    ) -> GuiResult<()> {
        if !self.supported.contains(&kind) {
            return Err(GuiError::UnknownSignal {
                name: kind.name().to_owned(),
                widget_type: self.widget_type.to_owned(),
            });
        }
        self.handlers.entry(kind).or_default().push(Box::new(handler));
        Ok(())
    }

    /// Registers a listener by signal name.
    ///
    /// # Errors
    ///
    /// [`GuiError::UnknownSignal`] when the name does not exist at all or
    /// the widget does not emit it.
    pub fn connect_by_name(
        &mut self,
        name: &str,
        handler: impl FnMut(&Signal) + 'static,
    ) -> GuiResult<()> {
        let Some(kind) = SignalKind::from_name(name) else {
            tracing::debug!(name, widget_type = self.widget_type, "unknown signal name");
            return Err(GuiError::UnknownSignal {
                name: name.to_owned(),
                widget_type: self.widget_type.to_owned(),
            });
        };
        self.connect(kind, handler)
    }

    /// Invokes every listener registered for the signal's kind.
    pub fn emit(&mut self, signal: &Signal) {
        if let Some(handlers) = self.handlers.get_mut(&signal.kind()) {
            for handler in handlers {
                handler(signal);
            }
        }
    }

    /// Returns a fresh table with the same supported kinds and no
    /// listeners. Used by widget cloning: a deep copy starts with an empty
    /// listener list and the application re-registers its own.
    #[must_use]
    pub fn respec(&self) -> Self {
        Self::new(self.widget_type, self.supported)
    }
}

impl std::fmt::Debug for SignalTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalTable")
            .field("widget_type", &self.widget_type)
            .field("supported", &self.supported)
            .field("connected", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
