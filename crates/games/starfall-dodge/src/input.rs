use serde::{Deserialize, Serialize};

/// Per-tick horizontal steering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    #[default]
    None,
    Right,
}

impl Direction {
    /// Map a raw host value. Anything other than -1, 0 or +1 is ignored.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => Direction::Left,
            1 => Direction::Right,
            _ => Direction::None,
        }
    }

    /// Combine held keys; holding both cancels out.
    pub fn from_keys(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, false) => Direction::Left,
            (false, true) => Direction::Right,
            _ => Direction::None,
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::None => 0.0,
            Direction::Right => 1.0,
        }
    }
}
