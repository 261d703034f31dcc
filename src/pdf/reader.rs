use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::PdfVisError;

/// ページ辞書の継承をたどる最大深さ。循環したページツリー対策。
const MAX_INHERITANCE_DEPTH: usize = 64;

/// 描画対象として開いたPDF。
///
/// カタログとページツリーを持ち、1ページ以上あることを保証する。
pub struct PdfReader {
    doc: Document,
    page_ids: Vec<ObjectId>,
}

impl PdfReader {
    /// PDFファイルを開いてPdfReaderを作成する。
    ///
    /// パスが空、または読み込めない場合は設定エラー。
    /// 解析できない、カタログ/ページツリーが無い、0ページの場合はPDF読込エラー。
    pub fn open(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(PdfVisError::config("No input PDF file given"));
        }

        // 読込可能かを先に確認し、設定エラーと構造エラーを区別する
        if let Err(e) = std::fs::File::open(path) {
            return Err(PdfVisError::config(format!(
                "The PDF file '{}' doesn't exist or isn't readable: {e}",
                path.display()
            )));
        }

        let doc = Document::load(path).map_err(|e| {
            PdfVisError::pdf_read(format!(
                "Error on loading the PDF file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_document(doc)
    }

    /// 読込済みのlopdf Documentを検証してPdfReaderを作成する。
    pub fn from_document(doc: Document) -> crate::error::Result<Self> {
        let catalog = doc
            .catalog()
            .map_err(|_| PdfVisError::pdf_read("The PDF doesn't provide a document catalog"))?;
        if catalog.get(b"Pages").is_err() {
            return Err(PdfVisError::pdf_read(
                "The PDF doesn't provide a page tree",
            ));
        }

        // get_pagesはページ番号(1-indexed)順のBTreeMap
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(PdfVisError::pdf_read("The PDF doesn't contain any pages"));
        }

        Ok(Self { doc, page_ids })
    }

    /// 内部のlopdf Documentへの参照を返す。
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// ページ数を返す。
    pub fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    /// ページ順のページObjectId一覧。
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    /// DocumentとページObjectId一覧に分解する。
    pub fn into_parts(self) -> (Document, Vec<ObjectId>) {
        (self.doc, self.page_ids)
    }
}

/// ページ辞書の属性を、Parent経由の継承も考慮して取得する。
///
/// 参照は解決済みのオブジェクトを返す。
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = dict;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(obj) = current.get(key) {
            return doc.dereference(obj).ok().map(|(_, obj)| obj);
        }
        let Ok(Object::Reference(parent_id)) = current.get(b"Parent") else {
            return None;
        };
        current = doc.get_dictionary(*parent_id).ok()?;
    }
    None
}

/// ページのMediaBoxからページ寸法(width_pts, height_pts)を返す。
pub fn page_dimensions(doc: &Document, page_id: ObjectId) -> crate::error::Result<(f32, f32)> {
    let page_dict = doc.get_dictionary(page_id)?;

    let media_box = inherited_attribute(doc, page_dict, b"MediaBox")
        .ok_or_else(|| PdfVisError::pdf_read("MediaBox not found"))?;

    let media_box_array = media_box.as_array()?;
    if media_box_array.len() < 4 {
        return Err(PdfVisError::pdf_read("Invalid MediaBox"));
    }

    // MediaBoxの値は整数または実数の可能性がある
    let to_f32 = |obj: &Object| -> crate::error::Result<f32> {
        match obj {
            Object::Integer(i) => Ok(*i as f32),
            Object::Real(f) => Ok(*f as f32),
            _ => Err(PdfVisError::pdf_read("Invalid MediaBox value")),
        }
    };

    let x0 = to_f32(&media_box_array[0])?;
    let y0 = to_f32(&media_box_array[1])?;
    let x1 = to_f32(&media_box_array[2])?;
    let y1 = to_f32(&media_box_array[3])?;

    Ok(((x1 - x0).abs(), (y1 - y0).abs()))
}
