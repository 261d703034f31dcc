use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in PDF user space (origin at the lower left).
///
/// `min_x <= max_x` and `min_y <= max_y` are guaranteed by whoever built the
/// rectangle; nothing here re-checks them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rectangle {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Where an element sits: a 1-based page number and a rectangle on it.
///
/// Either part may be missing in sparse extraction output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, alias = "rectangle")]
    pub rect: Option<Rectangle>,
}

impl Position {
    pub fn new(page: u32, rect: Rectangle) -> Self {
        Self {
            page: Some(page),
            rect: Some(rect),
        }
    }

    /// Page number and rectangle, if both are present.
    pub fn resolved(&self) -> Option<(u32, Rectangle)> {
        Some((self.page?, self.rect?))
    }
}
