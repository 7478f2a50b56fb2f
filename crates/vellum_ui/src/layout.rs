//! Deferred-evaluation layout values.
//!
//! A widget's position and size are stored as [`Layout2d`] expressions and
//! resolved lazily against the parent's size. Reassignment replaces the
//! whole expression; nothing is ever mutated in place.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vellum_shared::{Rect, Vec2};

/// The parent dimension a relative length refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Parent width.
    Horizontal,
    /// Parent height.
    Vertical,
}

/// The component of a bound widget's geometry a binding reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindTarget {
    /// Left edge of the bound widget.
    Left,
    /// Top edge of the bound widget.
    Top,
    /// Width of the bound widget.
    Width,
    /// Height of the bound widget.
    Height,
}

/// Shared view of a widget's last resolved geometry.
///
/// Every widget owns one of these; cloning it hands out a live view that
/// layout bindings read from. Writes happen only in the owning widget's
/// layout step.
#[derive(Debug, Clone, Default)]
pub struct GeometryHandle(Arc<RwLock<Rect>>);

impl GeometryHandle {
    /// Creates a handle seeded with the given rect.
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self(Arc::new(RwLock::new(rect)))
    }

    /// Returns the last stored geometry.
    #[must_use]
    pub fn get(&self) -> Rect {
        *self.0.read()
    }

    /// Stores a newly resolved geometry.
    pub fn set(&self, rect: Rect) {
        *self.0.write() = rect;
    }
}

/// A live reference to one component of another widget's geometry.
///
/// Bindings read the *last resolved* value through a [`GeometryHandle`],
/// never triggering a recursive re-resolve. A binding to a widget that has
/// not been resolved yet this frame returns the previous frame's value.
/// This staleness tolerance is deliberate; there is no cycle detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "BindingRepr", into = "BindingRepr")]
pub struct Binding {
    handle: GeometryHandle,
    target: BindTarget,
}

impl Binding {
    /// Creates a binding reading one geometry component through a handle.
    #[must_use]
    pub fn new(handle: GeometryHandle, target: BindTarget) -> Self {
        Self { handle, target }
    }

    /// Reads the bound component from the last stored geometry.
    #[must_use]
    pub fn value(&self) -> f32 {
        let rect = self.handle.get();
        match self.target {
            BindTarget::Left => rect.x,
            BindTarget::Top => rect.y,
            BindTarget::Width => rect.width,
            BindTarget::Height => rect.height,
        }
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && self.value() == other.value()
    }
}

/// Serialized form of a binding: the live handle cannot survive a save
/// file, so the last resolved value is stored instead.
#[derive(Serialize, Deserialize, Clone)]
struct BindingRepr {
    target: BindTarget,
    value: f32,
}

impl From<BindingRepr> for Binding {
    fn from(repr: BindingRepr) -> Self {
        let rect = match repr.target {
            BindTarget::Left => Rect::new(repr.value, 0.0, 0.0, 0.0),
            BindTarget::Top => Rect::new(0.0, repr.value, 0.0, 0.0),
            BindTarget::Width => Rect::new(0.0, 0.0, repr.value, 0.0),
            BindTarget::Height => Rect::new(0.0, 0.0, 0.0, repr.value),
        };
        Self::new(GeometryHandle::new(rect), repr.target)
    }
}

impl From<Binding> for BindingRepr {
    fn from(binding: Binding) -> Self {
        Self {
            value: binding.value(),
            target: binding.target,
        }
    }
}

/// A one-dimensional layout expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Length {
    /// A fixed number of pixels.
    Constant(f32),
    /// A fraction of one parent dimension.
    Relative {
        /// Fraction of the parent dimension (0.5 = 50%).
        fraction: f32,
        /// Which parent dimension.
        axis: Axis,
    },
    /// Another widget's last resolved geometry component.
    Bound(Binding),
    /// Sum of two subexpressions.
    Add(Box<Length>, Box<Length>),
    /// Difference of two subexpressions.
    Sub(Box<Length>, Box<Length>),
    /// Product of two subexpressions.
    Mul(Box<Length>, Box<Length>),
    /// Quotient of two subexpressions. Division by a zero-resolving
    /// subexpression yields zero rather than propagating a fault.
    Div(Box<Length>, Box<Length>),
}

impl Length {
    /// Resolves the expression against the given parent size.
    ///
    /// Pure and deterministic for a fixed expression, parent size and set
    /// of bound geometries.
    #[must_use]
    pub fn resolve(&self, parent_size: Vec2) -> f32 {
        match self {
            Self::Constant(value) => *value,
            Self::Relative { fraction, axis } => match axis {
                Axis::Horizontal => parent_size.x * fraction,
                Axis::Vertical => parent_size.y * fraction,
            },
            Self::Bound(binding) => binding.value(),
            Self::Add(a, b) => a.resolve(parent_size) + b.resolve(parent_size),
            Self::Sub(a, b) => a.resolve(parent_size) - b.resolve(parent_size),
            Self::Mul(a, b) => a.resolve(parent_size) * b.resolve(parent_size),
            Self::Div(a, b) => {
                let divisor = b.resolve(parent_size);
                if divisor == 0.0 {
                    0.0
                } else {
                    a.resolve(parent_size) / divisor
                }
            }
        }
    }
}

impl From<f32> for Length {
    fn from(value: f32) -> Self {
        Self::Constant(value)
    }
}

impl std::ops::Add for Length {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Sub for Length {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::Sub(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for Length {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Div for Length {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::Div(Box::new(self), Box::new(rhs))
    }
}

/// A two-dimensional layout expression: one [`Length`] per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout2d {
    /// Horizontal component.
    pub x: Length,
    /// Vertical component.
    pub y: Length,
}

impl Layout2d {
    /// A fixed point or size in pixels.
    #[must_use]
    pub fn constant(x: f32, y: f32) -> Self {
        Self {
            x: Length::Constant(x),
            y: Length::Constant(y),
        }
    }

    /// A fraction of the parent size on both axes ((0.5, 1.0) = 50% width,
    /// full height).
    #[must_use]
    pub fn relative(fraction_x: f32, fraction_y: f32) -> Self {
        Self {
            x: Length::Relative {
                fraction: fraction_x,
                axis: Axis::Horizontal,
            },
            y: Length::Relative {
                fraction: fraction_y,
                axis: Axis::Vertical,
            },
        }
    }

    /// Resolves both components against the given parent size.
    #[must_use]
    pub fn resolve(&self, parent_size: Vec2) -> Vec2 {
        Vec2::new(self.x.resolve(parent_size), self.y.resolve(parent_size))
    }

    /// Returns the expression with axes swapped.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

impl Default for Layout2d {
    fn default() -> Self {
        Self::constant(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARENT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_constant_and_relative() {
        assert_eq!(Length::Constant(42.0).resolve(PARENT), 42.0);

        let half_width = Length::Relative {
            fraction: 0.5,
            axis: Axis::Horizontal,
        };
        assert_eq!(half_width.resolve(PARENT), 400.0);

        let full_height = Length::Relative {
            fraction: 1.0,
            axis: Axis::Vertical,
        };
        assert_eq!(full_height.resolve(PARENT), 600.0);
    }

    #[test]
    fn test_arithmetic() {
        let expr = Length::Relative {
            fraction: 0.5,
            axis: Axis::Horizontal,
        } - Length::Constant(10.0);
        assert_eq!(expr.resolve(PARENT), 390.0);

        let product = Length::Constant(3.0) * Length::Constant(4.0);
        assert_eq!(product.resolve(PARENT), 12.0);
    }

    #[test]
    fn test_division_by_zero_yields_zero() {
        let expr = Length::Constant(100.0) / Length::Constant(0.0);
        assert_eq!(expr.resolve(PARENT), 0.0);

        let nested = Length::Constant(1.0) / (Length::Constant(5.0) - Length::Constant(5.0));
        assert_eq!(nested.resolve(PARENT), 0.0);
    }

    #[test]
    fn test_binding_reads_last_geometry() {
        let handle = GeometryHandle::new(Rect::new(10.0, 20.0, 100.0, 50.0));
        let expr = Length::Bound(Binding::new(handle.clone(), BindTarget::Width))
            + Length::Constant(5.0);
        assert_eq!(expr.resolve(PARENT), 105.0);

        // The binding tracks later writes without re-resolving anything.
        handle.set(Rect::new(10.0, 20.0, 200.0, 50.0));
        assert_eq!(expr.resolve(PARENT), 205.0);
    }

    #[test]
    fn test_binding_serializes_as_last_value() {
        let handle = GeometryHandle::new(Rect::new(0.0, 0.0, 120.0, 40.0));
        let layout = Layout2d {
            x: Length::Bound(Binding::new(handle, BindTarget::Width)),
            y: Length::Constant(40.0),
        };

        let text = toml::to_string(&layout).unwrap();
        let restored: Layout2d = toml::from_str(&text).unwrap();
        assert_eq!(restored.resolve(PARENT), Vec2::new(120.0, 40.0));
    }

    #[test]
    fn test_layout2d_swapped() {
        let layout = Layout2d::constant(10.0, 20.0).swapped();
        assert_eq!(layout.resolve(PARENT), Vec2::new(20.0, 10.0));
    }
}
