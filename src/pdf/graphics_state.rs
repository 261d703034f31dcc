// 描画1回分に限定したグラフィックス状態（不透明度・色・線幅）

use lopdf::content::Operation;
use lopdf::{Dictionary, Object, dictionary};

use crate::pdf::color::Color;

/// 不透明度を量子化する分解能。ExtGStateの名前と値はこの単位で一意になる。
const ALPHA_STEPS: f32 = 1000.0;

/// 不透明度の適用先。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaTarget {
    /// 塗り (`/ca`)
    Fill,
    /// 線 (`/CA`)
    Stroke,
}

/// `/ExtGState` リソースとして登録する不透明度定数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Alpha {
    target: AlphaTarget,
    steps: u16,
}

impl Alpha {
    /// `opacity` は [0, 1] に検証済みであること。
    pub fn new(target: AlphaTarget, opacity: f32) -> Self {
        let steps = (opacity.clamp(0.0, 1.0) * ALPHA_STEPS).round() as u16;
        Alpha { target, steps }
    }

    pub fn target(&self) -> AlphaTarget {
        self.target
    }

    /// 量子化後の不透明度。
    pub fn value(&self) -> f32 {
        self.steps as f32 / ALPHA_STEPS
    }

    /// ページの `/Resources /ExtGState` に登録する名前。
    pub fn resource_name(&self) -> String {
        match self.target {
            AlphaTarget::Fill => format!("VisGS-ca{}", self.steps),
            AlphaTarget::Stroke => format!("VisGS-CA{}", self.steps),
        }
    }

    pub fn to_dictionary(&self) -> Dictionary {
        let key = match self.target {
            AlphaTarget::Fill => "ca",
            AlphaTarget::Stroke => "CA",
        };
        let mut dict = dictionary! {
            "Type" => "ExtGState",
        };
        dict.set(key, Object::from(self.value()));
        dict
    }
}

/// 1回の塗り/線描画に適用するグラフィックス状態の差分。
///
/// `scoped` が `q … Q` で囲んで出力するため、後続の描画には持ち越されない。
#[derive(Debug, Clone, PartialEq)]
pub struct PaintState {
    pub alpha: Alpha,
    pub color: Color,
    pub line_width: Option<f32>,
}

impl PaintState {
    /// 塗り用の状態（非ストローク色と `/ca`）。
    pub fn fill(color: Color, opacity: f32) -> Self {
        PaintState {
            alpha: Alpha::new(AlphaTarget::Fill, opacity),
            color,
            line_width: None,
        }
    }

    /// 線用の状態（ストローク色と線幅と `/CA`）。
    pub fn stroke(color: Color, line_width: f32, opacity: f32) -> Self {
        PaintState {
            alpha: Alpha::new(AlphaTarget::Stroke, opacity),
            color,
            line_width: Some(line_width),
        }
    }

    /// 状態設定と `body` を `q … Q` で囲んだオペレータ列を返す。
    pub fn scoped(&self, body: Vec<Operation>) -> Vec<Operation> {
        let [r, g, b] = self.color.components();
        let color_op = match self.alpha.target() {
            AlphaTarget::Fill => "rg",
            AlphaTarget::Stroke => "RG",
        };

        let mut ops = Vec::with_capacity(body.len() + 5);
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "gs",
            vec![Object::Name(self.alpha.resource_name().into_bytes())],
        ));
        ops.push(Operation::new(color_op, vec![r.into(), g.into(), b.into()]));
        if let Some(width) = self.line_width {
            ops.push(Operation::new("w", vec![width.into()]));
        }
        ops.extend(body);
        ops.push(Operation::new("Q", vec![]));
        ops
    }
}
