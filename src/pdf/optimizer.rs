// 追記したコンテンツストリームのFlateDecode圧縮

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Document, Object, ObjectId, Stream};

/// ストリームにFlateDecode圧縮を適用する。
///
/// 既にフィルターが設定されているストリームはスキップする（二重圧縮防止）。
/// 圧縮した場合は `true` を返す。
pub fn compress_stream(stream: &mut Stream) -> bool {
    if stream.dict.get(b"Filter").is_ok() {
        return false;
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    if encoder.write_all(&stream.content).is_err() {
        return false;
    }
    let Ok(compressed) = encoder.finish() else {
        return false;
    };

    stream.dict.set("Filter", "FlateDecode");
    stream.set_content(compressed);
    true
}

/// 指定したストリームオブジェクトを圧縮し、圧縮できた数を返す。
///
/// ストリーム以外のオブジェクトや存在しないIDは無視する。
pub fn compress_streams(doc: &mut Document, ids: &[ObjectId]) -> usize {
    let mut compressed = 0;
    for id in ids {
        if let Some(Object::Stream(stream)) = doc.objects.get_mut(id)
            && compress_stream(stream)
        {
            compressed += 1;
        }
    }
    compressed
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_compress_stream_sets_filter() {
        let mut stream = Stream::new(dictionary! {}, b"q 1 0 0 RG Q".repeat(20));
        assert!(compress_stream(&mut stream));
        assert_eq!(
            stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"FlateDecode"
        );
        let restored = stream.decompressed_content().expect("decompress");
        assert_eq!(restored, b"q 1 0 0 RG Q".repeat(20));
    }

    #[test]
    fn test_compress_stream_skips_filtered() {
        let mut stream = Stream::new(
            dictionary! { "Filter" => "DCTDecode" },
            vec![0xFF, 0xD8],
        );
        assert!(!compress_stream(&mut stream));
        assert_eq!(stream.content, vec![0xFF, 0xD8]);
    }

    #[test]
    fn test_compress_streams_only_counts_streams() {
        let mut doc = Document::with_version("1.5");
        let stream_id = doc.add_object(Stream::new(dictionary! {}, b"0 0 m 1 1 l S".to_vec()));
        let dict_id = doc.add_object(dictionary! { "Type" => "Font" });
        let missing_id = (999, 0);

        assert_eq!(
            compress_streams(&mut doc, &[stream_id, dict_id, missing_id]),
            1
        );
        // 2回目は既にFilterがあるので何もしない
        assert_eq!(compress_streams(&mut doc, &[stream_id]), 0);
    }
}
