//! Axis-aligned bounding box collision
//!
//! Every entity in the playfield is an upright rectangle, so a strict
//! overlap test on both axes is all the collision detection there is.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An upright rectangle with its origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at `pos` with the given size
    pub fn at(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Strict overlap test. Rectangles that only share an edge do not collide.
#[inline]
pub fn is_colliding(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlapping_rects_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(is_colliding(&a, &b));
        assert!(is_colliding(&b, &a));
    }

    #[test]
    fn test_contained_rect_collides() {
        let outer = Rect::new(0.0, 0.0, 64.0, 64.0);
        let inner = Rect::new(30.0, 20.0, 5.0, 20.0);
        assert!(is_colliding(&outer, &inner));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!is_colliding(&a, &right));
        assert!(!is_colliding(&a, &below));
    }

    #[test]
    fn test_single_axis_overlap_is_a_miss() {
        // Bullet column lines up with the enemy but sits above it
        let enemy = Rect::new(100.0, 100.0, 64.0, 64.0);
        let bullet = Rect::new(120.0, 40.0, 5.0, 20.0);
        assert!(!is_colliding(&bullet, &enemy));

        // Same row, off to the side
        let bullet = Rect::new(200.0, 120.0, 5.0, 20.0);
        assert!(!is_colliding(&bullet, &enemy));
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (-500.0f32..500.0, -500.0f32..500.0, 0.5f32..200.0, 0.5f32..200.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_collision_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
            prop_assert_eq!(is_colliding(&a, &b), is_colliding(&b, &a));
        }

        #[test]
        fn prop_separated_on_x_never_collides(a in rect_strategy(), b in rect_strategy(), gap in 0.0f32..100.0) {
            let b = Rect { x: a.right() + gap, ..b };
            prop_assert!(!is_colliding(&a, &b));
        }

        #[test]
        fn prop_separated_on_y_never_collides(a in rect_strategy(), b in rect_strategy(), gap in 0.0f32..100.0) {
            let b = Rect { y: a.bottom() + gap, ..b };
            prop_assert!(!is_colliding(&a, &b));
        }
    }
}
