use serde::Deserialize;
use tracing::warn;

use crate::model::ElementClass;

#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    /// 注記を重ねる元PDF。
    pub input: String,
    /// 抽出結果のJSONファイル。
    pub elements: String,
    pub output: String,
    pub classes: Option<Vec<String>>,
    pub compress_streams: Option<bool>,
}

/// 要素クラス名の列を `ElementClass` の集合に変換する。
///
/// 名前は大文字小文字を区別しない。未知の名前は警告を出して無視する。
pub fn parse_classes<S: AsRef<str>>(names: &[S]) -> Vec<ElementClass> {
    let mut classes: Vec<ElementClass> = names
        .iter()
        .filter_map(|name| {
            let name = name.as_ref();
            let class = ElementClass::from_name(name);
            if class.is_none() {
                warn!(class = name, "ignoring unknown element class");
            }
            class
        })
        .collect();
    classes.sort();
    classes.dedup();
    classes
}
