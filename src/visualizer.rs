// Element visitor: highlights extracted elements on top of the source PDF.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::error::PdfVisError;
use crate::model::{Document, ElementClass, Position};
use crate::pdf::canvas::PdfCanvas;
use crate::pdf::color::Color;
use crate::pdf::style::RectStyle;

/// Border color used to highlight elements of `class`.
pub fn class_color(class: ElementClass) -> Color {
    match class {
        ElementClass::Characters => Color::BLACK,
        ElementClass::Figures => Color::CYAN,
        ElementClass::Shapes => Color::ORANGE,
    }
}

/// Rectangle style for elements of `class`: 1pt opaque border, no filling.
pub fn class_style(class: ElementClass) -> RectStyle {
    RectStyle::border(class_color(class), 1.0, 1.0)
}

/// Draws the bounding boxes of a document's elements onto its source PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentVisualizer {
    compress: bool,
}

impl DocumentVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flate-compress the appended content streams.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Visualize the elements of `doc` belonging to `classes`.
    ///
    /// `classes` is treated as a set: order and duplicates do not matter.
    /// Any failure is returned as [`PdfVisError::Visualization`] wrapping the cause.
    pub fn visualize(
        &self,
        doc: &Document,
        classes: impl IntoIterator<Item = ElementClass>,
    ) -> crate::error::Result<Vec<u8>> {
        self.run(doc, classes)
            .map_err(|e| PdfVisError::visualization("Error on visualization", e))
    }

    fn run(
        &self,
        doc: &Document,
        classes: impl IntoIterator<Item = ElementClass>,
    ) -> crate::error::Result<Vec<u8>> {
        let classes: BTreeSet<ElementClass> = classes.into_iter().collect();
        let mut canvas = PdfCanvas::open(&doc.path)?.with_compression(self.compress);

        for &class in &classes {
            let drawn = visualize_class(&mut canvas, doc, class)?;
            info!(class = class.name(), drawn, "visualized elements");
        }

        canvas.complete()
    }
}

/// Draw every element of `class` onto `canvas`. Returns the number drawn.
///
/// Elements without a page reference or rectangle are skipped.
pub fn visualize_class(
    canvas: &mut PdfCanvas,
    doc: &Document,
    class: ElementClass,
) -> crate::error::Result<usize> {
    let style = class_style(class);
    let mut drawn = 0;
    let mut skipped = 0;

    for position in doc.positions(class) {
        match position.and_then(Position::resolved) {
            Some((page_num, rect)) => {
                canvas.draw_rectangle(page_num, &rect, &style)?;
                drawn += 1;
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(class = class.name(), skipped, "skipped elements without position");
    }
    Ok(drawn)
}
