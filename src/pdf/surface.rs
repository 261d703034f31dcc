// ページ単位の追記専用描画面: オペレータの蓄積、リソース登録、Contentsへの追記

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use crate::error::PdfVisError;
use crate::pdf::reader::inherited_attribute;

/// 1ページ分の描画面。
///
/// 描画オペレータは追記のみで、`close` で一度だけページの `/Contents` 末尾に
/// 新しいストリームとして書き出される。元のコンテンツストリームは変更しない。
#[derive(Debug)]
pub struct PageSurface {
    page_num: u32,
    page_id: ObjectId,
    operations: Vec<Operation>,
    ext_gstates: BTreeMap<String, ObjectId>,
    fonts: BTreeMap<String, ObjectId>,
    closed: bool,
}

impl PageSurface {
    /// 指定ページ(1-indexed)の描画面を開く。
    ///
    /// ページ辞書を解決できない場合は描画面エラー。
    pub fn open(doc: &Document, page_num: u32, page_id: ObjectId) -> crate::error::Result<Self> {
        doc.get_dictionary(page_id).map_err(|e| {
            PdfVisError::surface(format!("Couldn't load page #{page_num}: {e}"))
        })?;

        Ok(Self {
            page_num,
            page_id,
            operations: Vec::new(),
            ext_gstates: BTreeMap::new(),
            fonts: BTreeMap::new(),
            closed: false,
        })
    }

    pub fn page_num(&self) -> u32 {
        self.page_num
    }

    pub fn page_id(&self) -> ObjectId {
        self.page_id
    }

    /// これまでに追記されたオペレータ列。
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// オペレータ列を追記する。閉じた描画面への追記は状態エラー。
    pub fn append(&mut self, ops: Vec<Operation>) -> crate::error::Result<()> {
        if self.closed {
            return Err(PdfVisError::surface(format!(
                "drawing surface of page #{} is already closed",
                self.page_num
            )));
        }
        self.operations.extend(ops);
        Ok(())
    }

    /// `/ExtGState` リソースの使用を記録する。
    pub fn use_ext_gstate(&mut self, name: String, id: ObjectId) {
        self.ext_gstates.insert(name, id);
    }

    /// `/Font` リソースの使用を記録する。
    pub fn use_font(&mut self, name: String, id: ObjectId) {
        self.fonts.insert(name, id);
    }

    /// 描画面を閉じ、蓄積したオペレータをページに書き出す。
    ///
    /// 既存コンテンツは `q … Q` で囲み、追記分が初期グラフィックス状態から
    /// 始まるようにする。オペレータが無ければページは変更しない。
    /// 追記したストリームのObjectIdを返す。
    pub fn close(&mut self, doc: &mut Document) -> crate::error::Result<Option<ObjectId>> {
        if self.closed {
            return Err(PdfVisError::surface(format!(
                "drawing surface of page #{} is already closed",
                self.page_num
            )));
        }
        self.closed = true;

        if self.operations.is_empty() {
            return Ok(None);
        }

        let existing = self.existing_contents(doc)?;
        let resources = self.merged_resources(doc)?;

        let mut operations = Vec::with_capacity(self.operations.len() + 1);
        if !existing.is_empty() {
            operations.push(Operation::new("Q", vec![]));
        }
        operations.append(&mut self.operations);
        let content_bytes = Content { operations }.encode().map_err(|e| {
            PdfVisError::surface(format!(
                "Error on encoding the drawing operations of page #{}: {e}",
                self.page_num
            ))
        })?;

        let mut contents: Vec<Object> = Vec::with_capacity(existing.len() + 2);
        if !existing.is_empty() {
            let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
            contents.push(Object::Reference(save_id));
            contents.extend(existing);
        }
        let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));
        contents.push(Object::Reference(content_id));

        let page_dict = doc.get_dictionary_mut(self.page_id).map_err(|e| {
            PdfVisError::surface(format!("Couldn't load page #{}: {e}", self.page_num))
        })?;
        page_dict.set("Contents", Object::Array(contents));
        page_dict.set("Resources", Object::Dictionary(resources));

        debug!(
            page = self.page_num,
            content_id = ?content_id,
            "closed drawing surface"
        );
        Ok(Some(content_id))
    }

    /// 現在の `/Contents` を参照の配列として返す。
    ///
    /// 単一参照・配列・配列への参照のいずれにも対応する。
    /// 直接埋め込まれたストリームは間接オブジェクトに置き換える。
    fn existing_contents(&self, doc: &mut Document) -> crate::error::Result<Vec<Object>> {
        let contents = doc
            .get_dictionary(self.page_id)?
            .get(b"Contents")
            .ok()
            .cloned();
        let contents = match contents {
            Some(Object::Reference(id)) => match doc.get_object(id) {
                Ok(Object::Array(arr)) => arr.clone(),
                _ => vec![Object::Reference(id)],
            },
            Some(Object::Array(arr)) => arr,
            Some(Object::Stream(stream)) => vec![Object::Reference(doc.add_object(stream))],
            _ => Vec::new(),
        };
        Ok(contents)
    }

    /// ページの実効リソース辞書に、この描画面が使うExtGState/Fontを加えたものを返す。
    ///
    /// 継承・参照されているリソース辞書は複製してから拡張し、共有辞書は変更しない。
    fn merged_resources(&self, doc: &Document) -> crate::error::Result<Dictionary> {
        let page_dict = doc.get_dictionary(self.page_id)?;
        let mut resources = match inherited_attribute(doc, page_dict, b"Resources") {
            Some(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };

        merge_subdictionary(doc, &mut resources, b"ExtGState", &self.ext_gstates);
        merge_subdictionary(doc, &mut resources, b"Font", &self.fonts);
        Ok(resources)
    }
}

/// `resources[key]` の辞書（参照なら解決して複製）に名前→参照を追加する。
fn merge_subdictionary(
    doc: &Document,
    resources: &mut Dictionary,
    key: &[u8],
    entries: &BTreeMap<String, ObjectId>,
) {
    if entries.is_empty() {
        return;
    }

    let mut sub = match resources.get(key).map(|obj| doc.dereference(obj)) {
        Ok(Ok((_, Object::Dictionary(dict)))) => dict.clone(),
        _ => Dictionary::new(),
    };
    for (name, id) in entries {
        sub.set(name.as_bytes().to_vec(), Object::Reference(*id));
    }
    resources.set(key.to_vec(), Object::Dictionary(sub));
}
