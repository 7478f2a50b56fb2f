//! The rendering boundary.
//!
//! Widgets draw by submitting [`RenderCommand`]s to an opaque
//! [`RenderTarget`]; pixel submission belongs to the backend and never
//! enters this crate. [`RenderStates`] carries the composed transform and
//! opacity down the container tree.

use serde::{Deserialize, Serialize};
use vellum_shared::{Color, Rect, Vec2};

/// Opaque handle to a loaded texture. Loading is external; the library
/// only needs the identity and pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureHandle {
    /// Backend texture identity.
    pub id: u64,
    /// Pixel size of the full texture.
    pub size: Vec2,
}

/// A render command for the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Filled rectangle.
    Rect {
        /// Bounds in view coordinates.
        bounds: Rect,
        /// Fill color.
        color: Color,
    },
    /// Rectangle outline.
    RectOutline {
        /// Bounds in view coordinates.
        bounds: Rect,
        /// Stroke color.
        color: Color,
        /// Line width.
        width: f32,
    },
    /// Text run.
    Text {
        /// Text content.
        text: String,
        /// Top-left position in view coordinates.
        pos: Vec2,
        /// Text color.
        color: Color,
        /// Font size in pixels.
        font_size: f32,
    },
    /// Textured quad.
    Texture {
        /// Bounds in view coordinates.
        bounds: Rect,
        /// Backend texture identity.
        texture_id: u64,
        /// UV coordinates (u0, v0, u1, v1).
        uv: [f32; 4],
        /// Tint color.
        color: Color,
    },
    /// Scissor rect (clip subsequent commands).
    PushClip {
        /// Clip bounds in view coordinates.
        bounds: Rect,
    },
    /// Pop scissor rect.
    PopClip,
}

/// Composable draw state handed down the container tree: the accumulated
/// translation into view space and the accumulated opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStates {
    /// Translation from local space to view space.
    pub offset: Vec2,
    /// Accumulated opacity (0-1).
    pub opacity: f32,
}

impl RenderStates {
    /// Identity state at the view origin.
    pub const DEFAULT: Self = Self {
        offset: Vec2::ZERO,
        opacity: 1.0,
    };

    /// Returns the state translated further by a child's local position.
    #[must_use]
    pub fn translated(self, by: Vec2) -> Self {
        Self {
            offset: self.offset + by,
            opacity: self.opacity,
        }
    }

    /// Returns the state with an additional opacity factor multiplied in.
    #[must_use]
    pub fn faded(self, opacity: f32) -> Self {
        Self {
            offset: self.offset,
            opacity: self.opacity * opacity,
        }
    }

    /// Maps a local rect into view coordinates.
    #[must_use]
    pub fn map(self, local: Rect) -> Rect {
        local.translate(self.offset)
    }

    /// Applies the accumulated opacity to a color.
    #[must_use]
    pub fn tint(self, color: Color) -> Color {
        color.faded(self.opacity)
    }
}

impl Default for RenderStates {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The opaque draw sink a widget renders into.
pub trait RenderTarget {
    /// Submits one command. Order is paint order (back to front).
    fn submit(&mut self, command: RenderCommand);
}

/// A [`RenderTarget`] that records commands. Backends replay the list;
/// tests inspect it.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<RenderCommand>,
}

impl CommandRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(256),
        }
    }

    /// Commands recorded since the last clear, in paint order.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Discards all recorded commands.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl RenderTarget for CommandRecorder {
    fn submit(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }
}
