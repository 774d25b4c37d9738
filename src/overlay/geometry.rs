//! Viewport-space primitives shared by the selection reader and the placement resolver.
//!
//! All values are CSS pixels relative to the top-left corner of the viewport.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, negative or not a finite number.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Replaces a degenerate measurement with `fallback`, side by side.
    pub fn or_min(self, fallback: Size) -> Size {
        let pick = |v: f64, f: f64| if v.is_finite() && v > 0.0 { v } else { f };
        Size::new(pick(self.width, fallback.width), pick(self.height, fallback.height))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// A rect with no extent at all (a caret rect of zero width still counts
    /// as usable as long as it has height).
    pub fn is_degenerate(&self) -> bool {
        let finite = self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        !finite || (self.width <= 0.0 && self.height <= 0.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    /// Area shared by both rects, zero when they only touch or do not meet.
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.left.max(other.left);
        let h = self.bottom().min(other.bottom()) - self.top.max(other.top);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    /// Whether the rect lies inside `[margin, extent - margin]` on both axes.
    pub fn fits_within(&self, viewport: Viewport, margin: f64) -> bool {
        self.left >= margin
            && self.top >= margin
            && self.right() <= viewport.width - margin
            && self.bottom() <= viewport.height - margin
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
