// 要素ビジターのテスト: 抽出結果 -> 注記付きPDF

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use pdf_visualizer::error::PdfVisError;
use pdf_visualizer::model::{
    Character, Document as ExtractedDocument, ElementClass, Figure, Page, Position, Rectangle,
    Shape,
};
use pdf_visualizer::visualizer::{DocumentVisualizer, class_color};

// ============================================================
// Helpers
// ============================================================

/// 空のコンテンツを持つnum_pagesページのPDFを保存する。
fn create_test_pdf(num_pages: usize) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("source.pdf");

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"0 g".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => num_pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(&path).expect("save PDF");

    (dir, path)
}

fn character_at(page: u32, rect: Rectangle) -> Character {
    Character {
        text: "a".to_string(),
        position: Some(Position::new(page, rect)),
    }
}

fn content_ids(doc: &Document, page_num: u32) -> Vec<ObjectId> {
    let page_id = doc.get_pages()[&page_num];
    let page = doc.get_dictionary(page_id).expect("page dict");
    match page.get(b"Contents").expect("Contents") {
        Object::Reference(id) => vec![*id],
        Object::Array(arr) => arr
            .iter()
            .map(|o| o.as_reference().expect("reference"))
            .collect(),
        other => panic!("unexpected Contents: {other:?}"),
    }
}

/// ページの全コンテンツストリームを順に連結したオペレータ列。
fn page_operations(doc: &Document, page_num: u32) -> Vec<Operation> {
    content_ids(doc, page_num)
        .into_iter()
        .flat_map(|id| {
            let stream = doc
                .get_object(id)
                .and_then(Object::as_stream)
                .expect("content stream");
            let bytes = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            Content::decode(&bytes).expect("decode content").operations
        })
        .collect()
}

fn nums(op: &Operation) -> Vec<f32> {
    op.operands
        .iter()
        .map(|o| match o {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r as f32,
            other => panic!("expected number, got {other:?}"),
        })
        .collect()
}

fn count(ops: &[Operation], operator: &str) -> usize {
    ops.iter().filter(|op| op.operator == operator).count()
}

fn stroke_colors(ops: &[Operation]) -> Vec<Vec<f32>> {
    ops.iter()
        .filter(|op| op.operator == "RG")
        .map(nums)
        .collect()
}

fn expected_rgb(class: ElementClass) -> Vec<f32> {
    class_color(class).components().to_vec()
}

fn same_color(actual: &[f32], expected: &[f32]) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(a, e)| (a - e).abs() < 1e-3)
}

fn assert_single_stroke_color(ops: &[Operation], class: ElementClass) {
    let colors = stroke_colors(ops);
    assert_eq!(colors.len(), 1, "{colors:?}");
    assert!(same_color(&colors[0], &expected_rgb(class)), "{colors:?}");
}

// ============================================================
// 1. 基本シナリオ
// ============================================================

#[test]
fn test_two_page_document_with_one_character() {
    let (_dir, path) = create_test_pdf(2);
    let mut page1 = Page::new(1);
    page1
        .characters
        .push(character_at(1, Rectangle::new(10.0, 10.0, 20.0, 20.0)));
    let doc = ExtractedDocument::new(&path, vec![page1, Page::new(2)]);

    let bytes = DocumentVisualizer::new()
        .visualize(&doc, [ElementClass::Characters])
        .expect("visualize");
    let out = Document::load_mem(&bytes).expect("load output");
    assert_eq!(out.get_pages().len(), 2);

    let page1_ops = page_operations(&out, 1);
    assert_eq!(count(&page1_ops, "S"), 1);
    assert_eq!(count(&page1_ops, "f"), 0);
    assert_single_stroke_color(&page1_ops, ElementClass::Characters);
    let re = page1_ops
        .iter()
        .find(|op| op.operator == "re")
        .expect("rectangle drawn");
    assert_eq!(nums(re), vec![10.0, 10.0, 10.0, 10.0]);
    let w = page1_ops
        .iter()
        .find(|op| op.operator == "w")
        .expect("line width set");
    assert_eq!(nums(w), vec![1.0]);

    // 2ページ目は描画なし
    assert_eq!(content_ids(&out, 2).len(), 1);
    assert_eq!(count(&page_operations(&out, 2), "S"), 0);
}

#[test]
fn test_each_class_uses_its_own_color() {
    let (_dir, path) = create_test_pdf(1);
    let rect = Rectangle::new(5.0, 5.0, 15.0, 25.0);
    let mut page = Page::new(1);
    page.characters.push(character_at(1, rect));
    page.figures.push(Figure {
        position: Some(Position::new(1, rect)),
    });
    page.shapes.push(Shape {
        position: Some(Position::new(1, rect)),
    });
    let doc = ExtractedDocument::new(&path, vec![page]);

    let bytes = DocumentVisualizer::new()
        .visualize(&doc, ElementClass::ALL)
        .expect("visualize");
    let out = Document::load_mem(&bytes).expect("load output");
    let ops = page_operations(&out, 1);

    assert_eq!(count(&ops, "S"), 3);
    let colors = stroke_colors(&ops);
    for class in ElementClass::ALL {
        assert!(
            colors.iter().any(|c| same_color(c, &expected_rgb(class))),
            "{class:?} color missing in {colors:?}"
        );
    }
}

#[test]
fn test_only_requested_classes_are_drawn() {
    let (_dir, path) = create_test_pdf(1);
    let rect = Rectangle::new(0.0, 0.0, 1.0, 1.0);
    let mut page = Page::new(1);
    page.characters.push(character_at(1, rect));
    page.figures.push(Figure {
        position: Some(Position::new(1, rect)),
    });
    let doc = ExtractedDocument::new(&path, vec![page]);

    let bytes = DocumentVisualizer::new()
        .visualize(&doc, [ElementClass::Figures])
        .expect("visualize");
    let out = Document::load_mem(&bytes).expect("load output");
    let ops = page_operations(&out, 1);

    assert_eq!(count(&ops, "S"), 1);
    assert_single_stroke_color(&ops, ElementClass::Figures);
}

#[test]
fn test_duplicate_classes_draw_once() {
    let (_dir, path) = create_test_pdf(1);
    let mut page = Page::new(1);
    page.shapes.push(Shape {
        position: Some(Position::new(1, Rectangle::new(1.0, 1.0, 2.0, 2.0))),
    });
    let doc = ExtractedDocument::new(&path, vec![page]);

    let bytes = DocumentVisualizer::new()
        .visualize(
            &doc,
            [ElementClass::Shapes, ElementClass::Shapes, ElementClass::Shapes],
        )
        .expect("visualize");
    let out = Document::load_mem(&bytes).expect("load output");
    assert_eq!(count(&page_operations(&out, 1), "S"), 1);
}

#[test]
fn test_no_classes_leaves_pages_unchanged() {
    let (_dir, path) = create_test_pdf(2);
    let mut page = Page::new(1);
    page.characters
        .push(character_at(1, Rectangle::new(1.0, 1.0, 2.0, 2.0)));
    let doc = ExtractedDocument::new(&path, vec![page]);

    let bytes = DocumentVisualizer::new()
        .visualize(&doc, [])
        .expect("visualize");
    let out = Document::load_mem(&bytes).expect("load output");
    for page_num in 1..=2 {
        assert_eq!(content_ids(&out, page_num).len(), 1);
    }
}

// ============================================================
// 2. 位置情報の欠落
// ============================================================

#[test]
fn test_elements_without_position_are_skipped() {
    let (_dir, path) = create_test_pdf(1);
    let mut page = Page::new(1);
    page.characters.push(Character {
        text: "x".to_string(),
        position: None,
    });
    page.characters.push(Character {
        text: "y".to_string(),
        position: Some(Position {
            page: None,
            rect: Some(Rectangle::new(0.0, 0.0, 1.0, 1.0)),
        }),
    });
    page.characters.push(Character {
        text: "z".to_string(),
        position: Some(Position {
            page: Some(1),
            rect: None,
        }),
    });
    page.characters
        .push(character_at(1, Rectangle::new(3.0, 3.0, 4.0, 4.0)));
    let doc = ExtractedDocument::new(&path, vec![page]);

    let bytes = DocumentVisualizer::new()
        .visualize(&doc, [ElementClass::Characters])
        .expect("visualize");
    let out = Document::load_mem(&bytes).expect("load output");
    assert_eq!(count(&page_operations(&out, 1), "S"), 1);
}

// ============================================================
// 3. エラーの包み込み
// ============================================================

#[test]
fn test_missing_pdf_is_visualization_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let doc = ExtractedDocument::new(dir.path().join("missing.pdf"), vec![]);

    let err = DocumentVisualizer::new()
        .visualize(&doc, ElementClass::ALL)
        .expect_err("must fail");
    match &err {
        PdfVisError::Visualization { source, .. } => {
            assert!(matches!(**source, PdfVisError::ConfigError(_)), "got: {source}");
        }
        other => panic!("expected visualization error, got {other:?}"),
    }
    assert!(!err.is_argument_error());
}

#[test]
fn test_position_on_missing_page_is_wrapped_argument_error() {
    let (_dir, path) = create_test_pdf(2);
    let mut page = Page::new(1);
    page.figures.push(Figure {
        position: Some(Position::new(5, Rectangle::new(0.0, 0.0, 1.0, 1.0))),
    });
    let doc = ExtractedDocument::new(&path, vec![page]);

    let err = DocumentVisualizer::new()
        .visualize(&doc, [ElementClass::Figures])
        .expect_err("must fail");
    assert!(matches!(err, PdfVisError::Visualization { .. }), "got: {err}");
    assert!(err.is_argument_error());
}

// ============================================================
// 4. 抽出結果JSON
// ============================================================

#[test]
fn test_visualize_document_loaded_from_json() {
    let (_dir, path) = create_test_pdf(1);
    let json = format!(
        r#"{{
  "path": {path:?},
  "pages": [
    {{
      "number": 1,
      "shapes": [
        {{ "position": {{ "page": 1, "rectangle": {{ "min_x": 2, "min_y": 3, "max_x": 12, "max_y": 8 }} }} }}
      ]
    }}
  ]
}}"#,
        path = path.display().to_string()
    );
    let doc = ExtractedDocument::from_json(&json).expect("parse JSON");

    let bytes = DocumentVisualizer::new()
        .with_compression(true)
        .visualize(&doc, [ElementClass::Shapes])
        .expect("visualize");
    let out = Document::load_mem(&bytes).expect("load output");
    let ops = page_operations(&out, 1);
    let re = ops
        .iter()
        .find(|op| op.operator == "re")
        .expect("rectangle drawn");
    assert_eq!(nums(re), vec![2.0, 3.0, 10.0, 5.0]);
    assert_single_stroke_color(&ops, ElementClass::Shapes);
}
