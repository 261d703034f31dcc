use std::collections::HashMap;
use std::sync::LazyLock;

use lopdf::{Dictionary, dictionary};

use crate::error::PdfVisError;

/// PDF標準14フォントのうち、テキスト描画に使用できるType1フォント。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardFont {
    base_font: &'static str,
    symbolic: bool,
}

impl StandardFont {
    pub const HELVETICA: StandardFont = StandardFont::text("Helvetica");

    const fn text(base_font: &'static str) -> Self {
        StandardFont {
            base_font,
            symbolic: false,
        }
    }

    const fn symbolic(base_font: &'static str) -> Self {
        StandardFont {
            base_font,
            symbolic: true,
        }
    }

    /// PDFの `/BaseFont` 名。
    pub fn base_font(&self) -> &'static str {
        self.base_font
    }

    /// Symbol/ZapfDingbatsのように組込みエンコーディングを持つフォントか。
    pub fn is_symbolic(&self) -> bool {
        self.symbolic
    }

    /// ページの `/Resources /Font` に登録する名前。
    pub fn resource_name(&self) -> String {
        format!("VisF-{}", self.base_font)
    }

    /// フォント辞書を生成する。
    ///
    /// 非シンボルフォントはWinAnsiEncodingを指定し、`encode` の結果と一致させる。
    pub fn to_dictionary(&self) -> Dictionary {
        let mut dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.base_font,
        };
        if !self.symbolic {
            dict.set("Encoding", "WinAnsiEncoding");
        }
        dict
    }

    /// テキストをこのフォントの文字コード列に変換する。
    ///
    /// 表現できない文字が含まれる場合は引数エラーを返す。
    pub fn encode(&self, text: &str) -> crate::error::Result<Vec<u8>> {
        text.chars()
            .map(|c| {
                let code = if self.symbolic {
                    u8::try_from(u32::from(c)).ok().filter(|b| *b >= 0x20)
                } else {
                    win_ansi_code(c)
                };
                code.ok_or_else(|| {
                    PdfVisError::invalid_argument(format!(
                        "character {c:?} (U+{:04X}) cannot be encoded in font {}",
                        u32::from(c),
                        self.base_font
                    ))
                })
            })
            .collect()
    }
}

/// Unicode文字をWinAnsiEncodingの文字コードに変換する。
///
/// 0x20–0x7E と 0xA0–0xFF はLatin-1と同一。0x80–0x9Fは個別の対応表。
fn win_ansi_code(c: char) -> Option<u8> {
    let code = u32::from(c);
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => {
            let mapped = match c {
                '€' => 0x80,
                '‚' => 0x82,
                'ƒ' => 0x83,
                '„' => 0x84,
                '…' => 0x85,
                '†' => 0x86,
                '‡' => 0x87,
                'ˆ' => 0x88,
                '‰' => 0x89,
                'Š' => 0x8A,
                '‹' => 0x8B,
                'Œ' => 0x8C,
                'Ž' => 0x8E,
                '\u{2018}' => 0x91,
                '\u{2019}' => 0x92,
                '\u{201C}' => 0x93,
                '\u{201D}' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '˜' => 0x98,
                '™' => 0x99,
                'š' => 0x9A,
                '›' => 0x9B,
                'œ' => 0x9C,
                'ž' => 0x9E,
                'Ÿ' => 0x9F,
                _ => return None,
            };
            Some(mapped)
        }
    }
}

static STANDARD_FONTS: LazyLock<HashMap<&'static str, StandardFont>> = LazyLock::new(|| {
    HashMap::from([
        ("times-roman", StandardFont::text("Times-Roman")),
        ("times-bold", StandardFont::text("Times-Bold")),
        ("times-italic", StandardFont::text("Times-Italic")),
        ("times-bolditalic", StandardFont::text("Times-BoldItalic")),
        ("helvetica", StandardFont::HELVETICA),
        ("helvetica-bold", StandardFont::text("Helvetica-Bold")),
        ("helvetica-oblique", StandardFont::text("Helvetica-Oblique")),
        (
            "helvetica-boldoblique",
            StandardFont::text("Helvetica-BoldOblique"),
        ),
        ("courier", StandardFont::text("Courier")),
        ("courier-bold", StandardFont::text("Courier-Bold")),
        ("courier-oblique", StandardFont::text("Courier-Oblique")),
        (
            "courier-boldoblique",
            StandardFont::text("Courier-BoldOblique"),
        ),
        ("symbol", StandardFont::symbolic("Symbol")),
        ("zapfdingbats", StandardFont::symbolic("ZapfDingbats")),
    ])
});

/// フォント名からフォントを引く不変のレジストリ。
///
/// 名前は大文字小文字を区別する。未登録の名前はエラーにせず既定フォントを返す。
#[derive(Debug, Clone, Copy)]
pub struct FontRegistry {
    fonts: &'static HashMap<&'static str, StandardFont>,
    default_font: StandardFont,
}

impl FontRegistry {
    /// 標準14フォントのレジストリ（既定フォントはHelvetica）。
    pub fn standard() -> Self {
        FontRegistry {
            fonts: &STANDARD_FONTS,
            default_font: StandardFont::HELVETICA,
        }
    }

    pub fn default_font(&self) -> StandardFont {
        self.default_font
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> StandardFont {
        self.fonts.get(name).copied().unwrap_or(self.default_font)
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_ansi_ascii_and_latin1() {
        assert_eq!(win_ansi_code('A'), Some(0x41));
        assert_eq!(win_ansi_code('é'), Some(0xE9));
        assert_eq!(win_ansi_code('€'), Some(0x80));
        assert_eq!(win_ansi_code('\n'), None);
        assert_eq!(win_ansi_code('あ'), None);
    }

    #[test]
    fn test_registry_is_case_sensitive_with_helvetica_fallback() {
        let registry = FontRegistry::default();
        assert_eq!(registry.default_font(), StandardFont::HELVETICA);
        assert!(registry.contains("courier-bold"));
        assert!(!registry.contains("Courier-Bold"));
        assert_eq!(registry.resolve("courier-bold").base_font(), "Courier-Bold");
        assert_eq!(registry.resolve("Courier-Bold"), StandardFont::HELVETICA);
        assert_eq!(registry.resolve("no-such-font"), StandardFont::HELVETICA);
    }

    #[test]
    fn test_symbolic_font_passes_bytes_through() {
        let symbol = FontRegistry::standard().resolve("symbol");
        assert!(symbol.is_symbolic());
        assert_eq!(symbol.encode("ab").unwrap(), b"ab".to_vec());
        assert!(symbol.encode("€").is_err());
    }

    #[test]
    fn test_symbolic_font_has_no_encoding_entry() {
        let dict = StandardFont::symbolic("ZapfDingbats").to_dictionary();
        assert!(dict.get(b"Encoding").is_err());
        let dict = StandardFont::HELVETICA.to_dictionary();
        assert_eq!(
            dict.get(b"Encoding").unwrap().as_name().unwrap(),
            b"WinAnsiEncoding"
        );
    }
}
