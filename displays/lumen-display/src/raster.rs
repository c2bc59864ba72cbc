//! Raster primitives
//!
//! The algorithms decide which points to visit. Points on the panel are
//! handed to a `plot` callback, so the same code drives the bus-backed
//! driver and plain buffers in tests. Points off the panel are only counted.
//!
//! Coordinates are widened to `i64` and every walk is cut down to the part
//! that crosses the panel before it starts, so any `i32` input terminates
//! quickly.

use crate::framebuffer::{HEIGHT, WIDTH};

const MAX_X: i64 = WIDTH as i64 - 1;
const MAX_Y: i64 = HEIGHT as i64 - 1;

/// Outcome of plotting one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Plot {
    /// Pixel was on the panel and has been written
    Drawn,
    /// Pixel was off the panel and skipped
    Clipped,
}

/// Pixel counts for a multi-pixel primitive
///
/// Both counts saturate at `u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RasterStats {
    pub drawn: u32,
    pub clipped: u32,
}

impl RasterStats {
    pub fn record(&mut self, plot: Plot) {
        match plot {
            Plot::Drawn => self.drawn = self.drawn.saturating_add(1),
            Plot::Clipped => self.clip(1),
        }
    }

    /// Count `n` points as clipped without visiting them
    pub fn clip(&mut self, n: u64) {
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        self.clipped = self.clipped.saturating_add(n);
    }

    pub fn merge(&mut self, other: RasterStats) {
        self.drawn = self.drawn.saturating_add(other.drawn);
        self.clipped = self.clipped.saturating_add(other.clipped);
    }

    /// Every visited pixel was clipped
    pub fn fully_clipped(&self) -> bool {
        self.drawn == 0 && self.clipped > 0
    }
}

/// `(x, y)` narrowed to `i32` if it lies on the panel
fn on_panel(x: i64, y: i64) -> Option<(i32, i32)> {
    if (0..=MAX_X).contains(&x) && (0..=MAX_Y).contains(&y) {
        // Both fit: bounded by the panel size
        Some((x as i32, y as i32))
    } else {
        None
    }
}

/// Plot `(x, y)` if it is on the panel, count it as clipped otherwise
fn visit<E, F>(x: i64, y: i64, stats: &mut RasterStats, plot: &mut F) -> Result<(), E>
where
    F: FnMut(i32, i32) -> Result<Plot, E>,
{
    match on_panel(x, y) {
        Some((x, y)) => stats.record(plot(x, y)?),
        None => stats.clip(1),
    }
    Ok(())
}

/// Minor-axis offset after `i` major steps of a Bresenham walk
///
/// Equal to the error-term walk: the minor axis has stepped once for every
/// time `2 * minor * i` passed an odd multiple of `major`.
fn minor_offset(i: i64, major: i64, minor: i64) -> i64 {
    if major == 0 {
        return 0;
    }
    let (i, major, minor) = (i128::from(i), i128::from(major), i128::from(minor));
    // At most `minor`, so the narrowing is lossless
    ((2 * minor * i + major) / (2 * major)) as i64
}

/// Step indices `0..=len` of a walk from `origin` in direction `step` that
/// stay within `[0, limit]`, as an inclusive range
fn steps_on_panel(origin: i64, step: i64, len: i64, limit: i64) -> Option<(i64, i64)> {
    let (lo, hi) = if step > 0 {
        (-origin, limit - origin)
    } else {
        (origin - limit, origin)
    };
    let (lo, hi) = (lo.max(0), hi.min(len));
    (lo <= hi).then_some((lo, hi))
}

/// Bresenham line from `start` to `end`, both endpoints included
///
/// Walks the axis with the larger delta one pixel at a time; on a tie the
/// x axis leads. Only the steps whose major coordinate is on the panel are
/// walked, the rest are counted as clipped.
pub fn line<E, F>(start: (i32, i32), end: (i32, i32), mut plot: F) -> Result<RasterStats, E>
where
    F: FnMut(i32, i32) -> Result<Plot, E>,
{
    let (x0, y0) = (i64::from(start.0), i64::from(start.1));
    let (x1, y1) = (i64::from(end.0), i64::from(end.1));

    let sx = if x1 > x0 { 1 } else { -1 };
    let sy = if y1 > y0 { 1 } else { -1 };
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();

    let x_major = dx >= dy;
    let (major, minor) = if x_major { (dx, dy) } else { (dy, dx) };
    let walk = if x_major {
        steps_on_panel(x0, sx, major, MAX_X)
    } else {
        steps_on_panel(y0, sy, major, MAX_Y)
    };

    let mut stats = RasterStats::default();
    let mut visited = 0u64;
    if let Some((lo, hi)) = walk {
        for i in lo..=hi {
            let offset = minor_offset(i, major, minor);
            let (x, y) = if x_major {
                (x0 + sx * i, y0 + sy * offset)
            } else {
                (x0 + sx * offset, y0 + sy * i)
            };
            visit(x, y, &mut stats, &mut plot)?;
            visited += 1;
        }
    }
    // major < 2^32, no overflow
    stats.clip(major as u64 + 1 - visited);

    Ok(stats)
}

/// Points `from..=to` along one axis, in that order, limited to `[0, limit]`
fn axis_run<E, F>(from: i64, to: i64, limit: i64, mut plot: F) -> Result<RasterStats, E>
where
    F: FnMut(i64) -> Result<Plot, E>,
{
    let step = if to >= from { 1 } else { -1 };
    let len = (to - from).abs();
    let mut stats = RasterStats::default();
    let mut visited = 0u64;
    if let Some((lo, hi)) = steps_on_panel(from, step, len, limit) {
        for i in lo..=hi {
            stats.record(plot(from + step * i)?);
            visited += 1;
        }
    }
    stats.clip(len as u64 + 1 - visited);
    Ok(stats)
}

fn vertical_run<E, F>(x: i64, y0: i64, y1: i64, plot: &mut F) -> Result<RasterStats, E>
where
    F: FnMut(i32, i32) -> Result<Plot, E>,
{
    if !(0..=MAX_X).contains(&x) {
        let mut stats = RasterStats::default();
        stats.clip((y1 - y0).unsigned_abs() + 1);
        return Ok(stats);
    }
    axis_run(y0, y1, MAX_Y, |y| plot(x as i32, y as i32))
}

fn horizontal_run<E, F>(y: i64, x0: i64, x1: i64, plot: &mut F) -> Result<RasterStats, E>
where
    F: FnMut(i32, i32) -> Result<Plot, E>,
{
    if !(0..=MAX_Y).contains(&y) {
        let mut stats = RasterStats::default();
        stats.clip((x1 - x0).unsigned_abs() + 1);
        return Ok(stats);
    }
    axis_run(x0, x1, MAX_X, |x| plot(x as i32, y as i32))
}

/// Column of pixels at `x` from `y0` to `y1` inclusive, in either direction
pub fn vertical_line<E, F>(x: i32, y0: i32, y1: i32, mut plot: F) -> Result<RasterStats, E>
where
    F: FnMut(i32, i32) -> Result<Plot, E>,
{
    vertical_run(x.into(), y0.into(), y1.into(), &mut plot)
}

/// Row of pixels at `y` from `x0` to `x1` inclusive, in either direction
pub fn horizontal_line<E, F>(y: i32, x0: i32, x1: i32, mut plot: F) -> Result<RasterStats, E>
where
    F: FnMut(i32, i32) -> Result<Plot, E>,
{
    horizontal_run(y.into(), x0.into(), x1.into(), &mut plot)
}

/// Midpoint circle around `(cx, cy)`
///
/// Each step visits the eight symmetric points; the four axis extrema are
/// visited once after the loop.
pub fn circle<E, F>(cx: i32, cy: i32, radius: u8, mut plot: F) -> Result<RasterStats, E>
where
    F: FnMut(i32, i32) -> Result<Plot, E>,
{
    let (cx, cy) = (i64::from(cx), i64::from(cy));
    let r = i64::from(radius);
    let mut x = 0;
    let mut y = r;
    let mut d = 1 - r;
    let mut stats = RasterStats::default();

    while x < y {
        x += 1;
        if d < 0 {
            d += 2 * x + 1;
        } else {
            y -= 1;
            d += 2 * (x - y) + 1;
        }

        for (px, py) in [
            (cx + y, cy - x),
            (cx + x, cy - y),
            (cx - x, cy - y),
            (cx - y, cy - x),
            (cx - y, cy + x),
            (cx - x, cy + y),
            (cx + x, cy + y),
            (cx + y, cy + x),
        ] {
            visit(px, py, &mut stats, &mut plot)?;
        }
    }

    for (px, py) in [(cx + r, cy), (cx - r, cy), (cx, cy + r), (cx, cy - r)] {
        visit(px, py, &mut stats, &mut plot)?;
    }

    Ok(stats)
}

/// Rectangle outline with its top-left corner at `(x, y)`
///
/// Every edge pixel is plotted once. A zero width or height plots nothing.
pub fn rect<E, F>(x: i32, y: i32, width: u32, height: u32, mut plot: F) -> Result<RasterStats, E>
where
    F: FnMut(i32, i32) -> Result<Plot, E>,
{
    let mut stats = RasterStats::default();
    if width == 0 || height == 0 {
        return Ok(stats);
    }
    let (x, y) = (i64::from(x), i64::from(y));
    let right = x + i64::from(width) - 1;
    let bottom = y + i64::from(height) - 1;

    stats.merge(horizontal_run(y, x, right, &mut plot)?);
    if bottom > y {
        stats.merge(horizontal_run(bottom, x, right, &mut plot)?);
    }
    if bottom - y >= 2 {
        stats.merge(vertical_run(x, y + 1, bottom - 1, &mut plot)?);
        if right > x {
            stats.merge(vertical_run(right, y + 1, bottom - 1, &mut plot)?);
        }
    }
    Ok(stats)
}
