//! Directional binary morphology.
//!
//! Ruled table lines are long thin strokes, so the structuring elements used
//! here are single-pixel-thick lines. Any nonzero sample counts as foreground;
//! outputs are 0/255 masks.

use image::{GrayImage, Luma};

/// Orientation of a line structuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// A `length × 1` element.
    Horizontal,
    /// A `1 × length` element.
    Vertical,
}

/// Morphological opening with a line element: `iterations` erosions followed
/// by `iterations` dilations. Only foreground runs at least `length` long
/// along `axis` survive.
pub fn open_line(mask: &GrayImage, axis: Axis, length: u32, iterations: u32) -> GrayImage {
    let mut current = mask.clone();
    for _ in 0..iterations {
        current = erode_line(&current, axis, length);
    }
    for _ in 0..iterations {
        current = dilate_line(&current, axis, length);
    }
    current
}

/// Erosion with a line element anchored at its center. Out-of-bounds samples
/// never erode.
pub fn erode_line(mask: &GrayImage, axis: Axis, length: u32) -> GrayImage {
    apply_line(mask, axis, length, LineOp::Erode)
}

/// Dilation that is the exact counterpart of [`erode_line`]: every eroded
/// sample grows back to the full window it was eroded from.
pub fn dilate_line(mask: &GrayImage, axis: Axis, length: u32) -> GrayImage {
    apply_line(mask, axis, length, LineOp::Dilate)
}

/// Saturating per-pixel `a - b`.
pub fn subtract(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let rhs = if x < b.width() && y < b.height() {
            b.get_pixel(x, y)[0]
        } else {
            0
        };
        Luma([a.get_pixel(x, y)[0].saturating_sub(rhs)])
    })
}

#[derive(Clone, Copy)]
enum LineOp {
    Erode,
    Dilate,
}

/// Applies `op` to one scan line using prefix sums.
///
/// With anchor `a = length / 2`, erosion at `i` inspects `[i - a, i - a + length)`
/// and dilation inspects `[i + a - length + 1, i + a]`, so an opening
/// reproduces surviving runs without shifting them.
fn line_op(on: &[bool], length: u32, op: LineOp) -> Vec<bool> {
    let n = on.len() as isize;
    let len = length.max(1) as isize;
    let anchor = len / 2;

    let mut prefix = Vec::with_capacity(on.len() + 1);
    prefix.push(0usize);
    for &v in on {
        prefix.push(prefix[prefix.len() - 1] + v as usize);
    }

    (0..n)
        .map(|i| {
            let start = match op {
                LineOp::Erode => i - anchor,
                LineOp::Dilate => i + anchor - len + 1,
            };
            let lo = start.clamp(0, n) as usize;
            let hi = (start + len).clamp(0, n) as usize;
            let count = prefix[hi] - prefix[lo];
            match op {
                LineOp::Erode => hi > lo && count == hi - lo,
                LineOp::Dilate => count > 0,
            }
        })
        .collect()
}

/// Runs `op` over every row (horizontal) or column (vertical) of `mask`.
fn apply_line(mask: &GrayImage, axis: Axis, length: u32, op: LineOp) -> GrayImage {
    let (w, h) = mask.dimensions();
    let mut out = GrayImage::new(w, h);
    match axis {
        Axis::Horizontal => {
            for y in 0..h {
                let line: Vec<bool> = (0..w).map(|x| mask.get_pixel(x, y)[0] > 0).collect();
                for (x, on) in line_op(&line, length, op).into_iter().enumerate() {
                    if on {
                        out.put_pixel(x as u32, y, Luma([255]));
                    }
                }
            }
        }
        Axis::Vertical => {
            for x in 0..w {
                let line: Vec<bool> = (0..h).map(|y| mask.get_pixel(x, y)[0] > 0).collect();
                for (y, on) in line_op(&line, length, op).into_iter().enumerate() {
                    if on {
                        out.put_pixel(x, y as u32, Luma([255]));
                    }
                }
            }
        }
    }
    out
}
