use crate::pdf::color::Color;

/// 矩形・円の描画スタイル。
///
/// 枠と塗りは独立しており、色が `None` の側は描画しない。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub border_width: f32,
    pub border_color: Option<Color>,
    pub border_opacity: f32,
    pub filling_color: Option<Color>,
    pub filling_opacity: f32,
}

pub type RectStyle = ShapeStyle;
pub type CircleStyle = ShapeStyle;

impl Default for ShapeStyle {
    /// 幅1の黒枠、塗りなし。
    fn default() -> Self {
        ShapeStyle {
            border_width: 1.0,
            border_color: Some(Color::BLACK),
            border_opacity: 1.0,
            filling_color: None,
            filling_opacity: 1.0,
        }
    }
}

impl ShapeStyle {
    /// 枠のみのスタイル。
    pub fn border(color: Color, width: f32, opacity: f32) -> Self {
        ShapeStyle {
            border_width: width,
            border_color: Some(color),
            border_opacity: opacity,
            ..Self::empty()
        }
    }

    /// 塗りのみのスタイル。
    pub fn filled(color: Color, opacity: f32) -> Self {
        ShapeStyle {
            filling_color: Some(color),
            filling_opacity: opacity,
            ..Self::empty()
        }
    }

    /// 枠も塗りもないスタイル（何も描画されない）。
    pub fn empty() -> Self {
        ShapeStyle {
            border_width: 0.0,
            border_color: None,
            border_opacity: 1.0,
            filling_color: None,
            filling_opacity: 1.0,
        }
    }

    pub fn with_border(mut self, color: Color, width: f32, opacity: f32) -> Self {
        self.border_color = Some(color);
        self.border_width = width;
        self.border_opacity = opacity;
        self
    }

    pub fn with_filling(mut self, color: Color, opacity: f32) -> Self {
        self.filling_color = Some(color);
        self.filling_opacity = opacity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width: f32,
    pub color: Color,
    pub opacity: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle {
            width: 1.0,
            color: Color::BLACK,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Font registry name, e.g. `"helvetica-bold"`.
    pub font_name: String,
    pub font_size: f32,
    pub color: Color,
    pub opacity: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font_name: "helvetica".to_string(),
            font_size: 12.0,
            color: Color::BLACK,
            opacity: 1.0,
        }
    }
}
