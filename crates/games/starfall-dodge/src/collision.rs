use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Circle by centre and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

/// Rectangle/circle overlap. The circle centre is clamped into the rectangle
/// to find the nearest point; touching (distance == radius) counts as a hit.
pub fn rect_circle_overlap(rect: &Rect, circle: &Circle) -> bool {
    let nearest_x = circle.x.clamp(rect.x, rect.x + rect.w);
    let nearest_y = circle.y.clamp(rect.y, rect.y + rect.h);
    let dx = circle.x - nearest_x;
    let dy = circle.y - nearest_y;
    dx * dx + dy * dy <= circle.r * circle.r
}
