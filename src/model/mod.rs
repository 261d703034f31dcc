// Extraction results consumed read-only by the visualizer.

pub mod geometry;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use geometry::{Position, Rectangle};

/// A document as produced by the extraction step.
///
/// `path` points at the source PDF the elements were extracted from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub figures: Vec<Figure>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Figure {
    #[serde(default)]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Shape {
    #[serde(default)]
    pub position: Option<Position>,
}

/// Kinds of page elements that can be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementClass {
    Characters,
    Figures,
    Shapes,
}

impl ElementClass {
    pub const ALL: [ElementClass; 3] = [
        ElementClass::Characters,
        ElementClass::Figures,
        ElementClass::Shapes,
    ];

    /// Parse a class name case-insensitively. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "characters" | "chars" => Some(ElementClass::Characters),
            "figures" => Some(ElementClass::Figures),
            "shapes" => Some(ElementClass::Shapes),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementClass::Characters => "characters",
            ElementClass::Figures => "figures",
            ElementClass::Shapes => "shapes",
        }
    }
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, pages: Vec<Page>) -> Self {
        Self {
            path: path.into(),
            pages,
        }
    }

    /// Parse extraction results from a JSON string.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read extraction results from a JSON file.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::PdfVisError::model(format!(
                "failed to read elements file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    /// Positions of every element of `class`, in page order.
    pub fn positions(&self, class: ElementClass) -> impl Iterator<Item = Option<&Position>> + '_ {
        self.pages.iter().flat_map(move |page| page.positions(class))
    }
}

impl Page {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Positions of this page's elements of `class`.
    pub fn positions(&self, class: ElementClass) -> Box<dyn Iterator<Item = Option<&Position>> + '_> {
        match class {
            ElementClass::Characters => {
                Box::new(self.characters.iter().map(|c| c.position.as_ref()))
            }
            ElementClass::Figures => Box::new(self.figures.iter().map(|f| f.position.as_ref())),
            ElementClass::Shapes => Box::new(self.shapes.iter().map(|s| s.position.as_ref())),
        }
    }
}
