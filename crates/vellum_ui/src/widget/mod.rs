//! Widget implementations and the widget contract.

pub mod container;
pub mod core;
pub mod gui;
pub mod label;
pub mod scrollbar;
pub mod sprite_sheet;
pub mod tree_view;

pub use container::Container;
pub use core::{Drawable, FocusParticipant, HitTestable, Widget, WidgetCommon, WidgetFlags};
pub use gui::Gui;
pub use label::{HorizontalAlignment, Label, VerticalAlignment};
pub use scrollbar::{Part, Scrollbar};
pub use sprite_sheet::SpriteSheet;
pub use tree_view::{ConstNode, NodeId, TreeView};
