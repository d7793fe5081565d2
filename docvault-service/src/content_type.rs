//! Supported content types and magic-byte sniffing.
//!
//! A document is accepted only if its declared type is one of the supported
//! types and the content itself sniffs as that type.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentType {
    Json,
    Pdf,
    Xml,
    Png,
    Jpeg,
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

impl ContentType {
    /// Parses a declared MIME type, ignoring case and parameters such as
    /// `; charset=utf-8`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/json" => Some(Self::Json),
            "application/pdf" => Some(Self::Pdf),
            "application/xml" | "text/xml" => Some(Self::Xml),
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Pdf => "application/pdf",
            Self::Xml => "application/xml",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Detects the type of `content` from its leading bytes.
    pub fn sniff(content: &[u8]) -> Option<Self> {
        if content.starts_with(PDF_MAGIC) {
            return Some(Self::Pdf);
        }
        if content.starts_with(PNG_MAGIC) {
            return Some(Self::Png);
        }
        if content.starts_with(JPEG_MAGIC) {
            return Some(Self::Jpeg);
        }

        let text = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let start = text.iter().position(|b| !b.is_ascii_whitespace())?;
        match text[start] {
            b'<' => Some(Self::Xml),
            b'{' | b'[' if serde_json::from_slice::<serde_json::Value>(text).is_ok() => {
                Some(Self::Json)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// True if `declared` is supported and matches what `content` sniffs as.
pub fn is_supported(declared: &str, content: &[u8]) -> bool {
    match ContentType::from_mime(declared) {
        Some(expected) => ContentType::sniff(content) == Some(expected),
        None => false,
    }
}
