// 既存PDFへの注記描画エンジン: ページごとの描画面、4種の描画プリミティブ、完了処理

use std::collections::HashMap;
use std::path::Path;

use lopdf::content::Operation;
use lopdf::{Document, Object, ObjectId, StringFormat};
use tracing::{debug, warn};

use crate::error::PdfVisError;
use crate::model::Rectangle;
use crate::pdf::font::{FontRegistry, StandardFont};
use crate::pdf::graphics_state::{Alpha, PaintState};
use crate::pdf::optimizer;
use crate::pdf::reader::{self, PdfReader};
use crate::pdf::style::{CircleStyle, LineStyle, RectStyle, TextStyle};
use crate::pdf::surface::PageSurface;

/// 4本の3次ベジェ曲線で円を近似するときの制御点係数。
pub const CIRCLE_KAPPA: f32 = 0.552284749831;

/// 3次ベジェ曲線の1区間（始点は前の区間の終点）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub control1: (f32, f32),
    pub control2: (f32, f32),
    pub end: (f32, f32),
}

/// 中心 (cx, cy)、半径 r の円を近似する始点と4区間を返す。
///
/// 始点は (cx − r, cy)。上 → 右 → 下 → 左の順に四分円ごとに進む。
pub fn circle_segments(cx: f32, cy: f32, r: f32) -> ((f32, f32), [CubicSegment; 4]) {
    let k = CIRCLE_KAPPA * r;
    let start = (cx - r, cy);
    let segments = [
        CubicSegment {
            control1: (cx - r, cy + k),
            control2: (cx - k, cy + r),
            end: (cx, cy + r),
        },
        CubicSegment {
            control1: (cx + k, cy + r),
            control2: (cx + r, cy + k),
            end: (cx + r, cy),
        },
        CubicSegment {
            control1: (cx + r, cy - k),
            control2: (cx + k, cy - r),
            end: (cx, cy - r),
        },
        CubicSegment {
            control1: (cx - k, cy - r),
            control2: (cx - r, cy - k),
            end: (cx - r, cy),
        },
    ];
    (start, segments)
}

/// 描画エンジンの状態。
///
/// 完了状態は `PdfCanvas::complete` がエンジンを消費することで表現される。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    /// 開いた直後で、まだ描画していない。
    Open,
    /// 1回以上描画プリミティブが成功した。
    Drawing,
}

/// 既存PDFの各ページに図形とテキストを追記する描画エンジン。
///
/// 構築時に全ページの描画面を開き、`complete` で全描画面を閉じて
/// ドキュメント全体をバイト列に書き出す。`complete` は `self` を消費するため、
/// 完了後の描画や2回目の完了はコンパイル時に拒否される。
///
/// ```compile_fail
/// # fn demo(canvas: pdf_visualizer::pdf::canvas::PdfCanvas) {
/// let first = canvas.complete();
/// let second = canvas.complete();
/// # }
/// ```
///
/// 1つのインスタンスは単一スレッドから使用すること。
pub struct PdfCanvas {
    doc: Document,
    surfaces: Vec<PageSurface>,
    fonts: FontRegistry,
    alpha_ids: HashMap<Alpha, ObjectId>,
    font_ids: HashMap<StandardFont, ObjectId>,
    compress: bool,
    state: CanvasState,
}

impl std::fmt::Debug for PdfCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfCanvas")
            .field("pages", &self.surfaces.len())
            .field("compress", &self.compress)
            .field("state", &self.state)
            .finish()
    }
}

impl PdfCanvas {
    /// PDFファイルを開き、全ページの描画面を開く。
    pub fn open(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let reader = PdfReader::open(path)?;
        debug!(path = %path.display(), pages = reader.page_count(), "opened PDF for drawing");
        Self::from_reader(reader)
    }

    /// 読込済みのlopdf Documentから描画エンジンを作成する。
    pub fn from_document(doc: Document) -> crate::error::Result<Self> {
        Self::from_reader(PdfReader::from_document(doc)?)
    }

    fn from_reader(reader: PdfReader) -> crate::error::Result<Self> {
        let (doc, page_ids) = reader.into_parts();

        // 1ページでも描画面を開けなければ全体を失敗とする
        let surfaces = page_ids
            .iter()
            .enumerate()
            .map(|(i, &page_id)| PageSurface::open(&doc, i as u32 + 1, page_id))
            .collect::<crate::error::Result<Vec<_>>>()?;

        Ok(Self {
            doc,
            surfaces,
            fonts: FontRegistry::standard(),
            alpha_ids: HashMap::new(),
            font_ids: HashMap::new(),
            compress: false,
            state: CanvasState::Open,
        })
    }

    /// 完了時に追記ストリームをFlateDecode圧縮するかを設定する。
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn page_count(&self) -> u32 {
        self.surfaces.len() as u32
    }

    pub fn state(&self) -> CanvasState {
        self.state
    }

    /// 指定ページ(1-indexed)の描画面。
    pub fn surface(&self, page_num: u32) -> crate::error::Result<&PageSurface> {
        let index = self.page_index(page_num)?;
        Ok(&self.surfaces[index])
    }

    /// 指定ページ(1-indexed)のMediaBox寸法 (width, height)。
    pub fn page_dimensions(&self, page_num: u32) -> crate::error::Result<(f32, f32)> {
        let index = self.page_index(page_num)?;
        reader::page_dimensions(&self.doc, self.surfaces[index].page_id())
    }

    /// 矩形を描画する。
    ///
    /// 幅・高さは `max(border_width, 辺の長さ)` に切り上げるため、
    /// 大きさ0の矩形でも枠線が見える。塗りと枠はそれぞれの色が指定された
    /// 場合のみ描画し、両方 `None` なら何もしない。
    pub fn draw_rectangle(
        &mut self,
        page_num: u32,
        rect: &Rectangle,
        style: &RectStyle,
    ) -> crate::error::Result<()> {
        let index = self.page_index(page_num)?;
        check_non_negative("Border width", style.border_width)?;
        check_opacity("Border opacity", style.border_opacity)?;
        check_opacity("Filling opacity", style.filling_opacity)?;
        check_finite(
            "Rectangle bounds",
            &[rect.min_x, rect.min_y, rect.max_x, rect.max_y],
        )?;

        let width = style.border_width.max(rect.width());
        let height = style.border_width.max(rect.height());
        let path = || {
            Operation::new(
                "re",
                vec![
                    rect.min_x.into(),
                    rect.min_y.into(),
                    width.into(),
                    height.into(),
                ],
            )
        };

        if let Some(color) = style.filling_color {
            let state = PaintState::fill(color, style.filling_opacity);
            self.paint(index, &state, vec![path(), Operation::new("f", vec![])])
                .map_err(|e| state_error("filling of the rectangle", e))?;
        }

        if let Some(color) = style.border_color {
            let state = PaintState::stroke(color, style.border_width, style.border_opacity);
            self.paint(index, &state, vec![path(), Operation::new("S", vec![])])
                .map_err(|e| state_error("border of the rectangle", e))?;
        }

        debug!(page = page_num, ?rect, "drew rectangle");
        self.state = CanvasState::Drawing;
        Ok(())
    }

    /// (x0, y0) から (x1, y1) への直線を描画する。
    pub fn draw_line(
        &mut self,
        page_num: u32,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        style: &LineStyle,
    ) -> crate::error::Result<()> {
        let index = self.page_index(page_num)?;
        check_non_negative("The line width", style.width)?;
        check_opacity("The line opacity", style.opacity)?;
        check_finite("Line coordinates", &[x0, y0, x1, y1])?;

        let state = PaintState::stroke(style.color, style.width, style.opacity);
        self.paint(
            index,
            &state,
            vec![
                Operation::new("m", vec![x0.into(), y0.into()]),
                Operation::new("l", vec![x1.into(), y1.into()]),
                Operation::new("S", vec![]),
            ],
        )
        .map_err(|e| state_error("line", e))?;

        debug!(page = page_num, x0, y0, x1, y1, "drew line");
        self.state = CanvasState::Drawing;
        Ok(())
    }

    /// 中心 (cx, cy)、半径 `radius` の円を4本のベジェ曲線で描画する。
    pub fn draw_circle(
        &mut self,
        page_num: u32,
        cx: f32,
        cy: f32,
        radius: f32,
        style: &CircleStyle,
    ) -> crate::error::Result<()> {
        let index = self.page_index(page_num)?;
        check_non_negative("The radius", radius)?;
        check_non_negative("Border width", style.border_width)?;
        check_opacity("Border opacity", style.border_opacity)?;
        check_opacity("Filling opacity", style.filling_opacity)?;
        check_finite("Circle center", &[cx, cy])?;

        let path = || {
            let (start, segments) = circle_segments(cx, cy, radius);
            let mut ops = Vec::with_capacity(segments.len() + 2);
            ops.push(Operation::new("m", vec![start.0.into(), start.1.into()]));
            for seg in segments {
                ops.push(Operation::new(
                    "c",
                    vec![
                        seg.control1.0.into(),
                        seg.control1.1.into(),
                        seg.control2.0.into(),
                        seg.control2.1.into(),
                        seg.end.0.into(),
                        seg.end.1.into(),
                    ],
                ));
            }
            ops.push(Operation::new("h", vec![]));
            ops
        };

        if let Some(color) = style.filling_color {
            let state = PaintState::fill(color, style.filling_opacity);
            let mut body = path();
            body.push(Operation::new("f", vec![]));
            self.paint(index, &state, body)
                .map_err(|e| state_error("filling of the circle", e))?;
        }

        if let Some(color) = style.border_color {
            let state = PaintState::stroke(color, style.border_width, style.border_opacity);
            let mut body = path();
            body.push(Operation::new("S", vec![]));
            self.paint(index, &state, body)
                .map_err(|e| state_error("border of the circle", e))?;
        }

        debug!(page = page_num, cx, cy, radius, "drew circle");
        self.state = CanvasState::Drawing;
        Ok(())
    }

    /// ベースライン左端を (x, y) としてテキストを描画する。
    ///
    /// 未登録のフォント名は既定フォントで描画する。
    /// 不透明度は他のプリミティブと同様に塗りの `/ca` として適用する。
    pub fn draw_text(
        &mut self,
        page_num: u32,
        x: f32,
        y: f32,
        text: &str,
        style: &TextStyle,
    ) -> crate::error::Result<()> {
        let index = self.page_index(page_num)?;
        if !(style.font_size > 0.0) || !style.font_size.is_finite() {
            return Err(PdfVisError::invalid_argument("The font size must be > 0"));
        }
        check_opacity("The text opacity", style.opacity)?;
        check_finite("Text origin", &[x, y])?;

        if !self.fonts.contains(&style.font_name) {
            debug!(font = %style.font_name, "unknown font name, using default font");
        }
        let font = self.fonts.resolve(&style.font_name);
        let encoded = font.encode(text)?;

        let font_name = font.resource_name();
        let state = PaintState::fill(style.color, style.opacity);
        self.paint(
            index,
            &state,
            vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![
                        Object::Name(font_name.clone().into_bytes()),
                        style.font_size.into(),
                    ],
                ),
                Operation::new("Td", vec![x.into(), y.into()]),
                Operation::new("Tj", vec![Object::String(encoded, StringFormat::Literal)]),
                Operation::new("ET", vec![]),
            ],
        )
        .map_err(|e| state_error("text", e))?;

        let font_id = *self
            .font_ids
            .entry(font)
            .or_insert_with(|| self.doc.add_object(font.to_dictionary()));
        self.surfaces[index].use_font(font_name, font_id);

        debug!(page = page_num, x, y, text, "drew text");
        self.state = CanvasState::Drawing;
        Ok(())
    }

    /// 全描画面を閉じ、ドキュメント全体をバイト列に書き出す。
    ///
    /// 描画面のクローズ失敗はログに残して次のページへ進む。
    /// ドキュメントは書き出しの成否に関わらずこの呼び出しで解放される。
    pub fn complete(mut self) -> crate::error::Result<Vec<u8>> {
        let mut appended = Vec::with_capacity(self.surfaces.len());
        for surface in &mut self.surfaces {
            match surface.close(&mut self.doc) {
                Ok(Some(id)) => appended.push(id),
                Ok(None) => {}
                Err(e) => {
                    warn!(page = surface.page_num(), error = %e, "failed to close drawing surface, skipping");
                }
            }
        }

        if self.compress {
            let compressed = optimizer::compress_streams(&mut self.doc, &appended);
            debug!(compressed, "compressed appended content streams");
        }

        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| PdfVisError::pdf_write(format!("Error on saving the PDF: {e}")))?;
        debug!(bytes = buf.len(), pages = appended.len(), "serialized annotated PDF");
        Ok(buf)
    }

    /// ページ番号(1-indexed)を描画面インデックスに変換する。
    fn page_index(&self, page_num: u32) -> crate::error::Result<usize> {
        if page_num < 1 {
            return Err(PdfVisError::invalid_argument("Page number must be > 0"));
        }
        if page_num as usize > self.surfaces.len() {
            return Err(PdfVisError::invalid_argument(format!(
                "Page number must be < {}",
                self.surfaces.len() + 1
            )));
        }
        Ok(page_num as usize - 1)
    }

    /// `state` を `q … Q` の範囲に限定して `body` を描画面に追記する。
    ///
    /// ExtGStateは追記が成功してから作成・登録する。
    fn paint(
        &mut self,
        index: usize,
        state: &PaintState,
        body: Vec<Operation>,
    ) -> crate::error::Result<()> {
        self.surfaces[index].append(state.scoped(body))?;

        let alpha = state.alpha;
        let alpha_id = *self
            .alpha_ids
            .entry(alpha)
            .or_insert_with(|| self.doc.add_object(alpha.to_dictionary()));
        self.surfaces[index].use_ext_gstate(alpha.resource_name(), alpha_id);
        Ok(())
    }
}

fn check_non_negative(what: &str, value: f32) -> crate::error::Result<()> {
    // NaNと無限大もここで弾く
    if !(value >= 0.0) || !value.is_finite() {
        return Err(PdfVisError::invalid_argument(format!(
            "{what} must be a finite number >= 0"
        )));
    }
    Ok(())
}

fn check_opacity(what: &str, value: f32) -> crate::error::Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PdfVisError::invalid_argument(format!(
            "{what} must be a value between 0 and 1"
        )));
    }
    Ok(())
}

fn check_finite(what: &str, values: &[f32]) -> crate::error::Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(PdfVisError::invalid_argument(format!(
            "{what} must be finite numbers"
        )));
    }
    Ok(())
}

fn state_error(what: &str, e: PdfVisError) -> PdfVisError {
    PdfVisError::surface(format!("Error on drawing the {what}: {e}"))
}
