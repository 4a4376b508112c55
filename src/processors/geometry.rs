//! Axis-aligned cell geometry.

use imageproc::point::Point;
use serde::{Deserialize, Serialize};

/// An axis-aligned pixel rectangle `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CellBox {
    #[inline]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds the rectangle spanned by two boundary pairs.
    pub fn between(x1: u32, x2: u32, y1: u32, y2: u32) -> Self {
        Self::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1))
    }

    /// Smallest rectangle containing every point (inclusive pixel extent).
    pub fn bounding(points: &[Point<u32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Shrinks the rectangle by `margin` on every side and clips it to an
    /// image of `image_width × image_height`. Returns `None` when nothing is
    /// left.
    pub fn inset(&self, margin: u32, image_width: u32, image_height: u32) -> Option<Self> {
        let x0 = self.x.saturating_add(margin).min(image_width);
        let y0 = self.y.saturating_add(margin).min(image_height);
        let x1 = self.right().saturating_sub(margin).min(image_width);
        let y1 = self.bottom().saturating_sub(margin).min(image_height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }
}
