//! # Document Library
//!
//! Stored text documents (generated proposals, technical descriptions) and
//! the instruction library (technical cards, repair guides, safety notes)
//! with optional attached files.
//!
//! ## Attached Files
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Instruction file_data (data URL)                        │
//! │                                                                         │
//! │   data:application/pdf;base64,JVBERi0xLjQKJcfs...                       │
//! │   └──────────┬──────────┘      └──────┬───────┘                         │
//! │          MIME type              base64 payload                          │
//! │                                                                         │
//! │   A bare base64 string (no "data:" header) is accepted too and is       │
//! │   typed as application/octet-stream.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::{validate_required, ValidationResult};
use crate::PRODUCT_LINE;

/// Largest file that may be attached to an instruction.
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// Characters of instruction text included in a share message.
pub const SHARE_EXCERPT_CHARS: usize = 500;

// =============================================================================
// Documents
// =============================================================================

/// Kind of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    CommercialProposal,
    TechnicalDescription,
    /// Any kind this version does not know about.
    #[serde(other)]
    Other,
}

/// A stored text document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub doc_type: DocType,
    #[serde(default)]
    pub calculation_id: Option<String>,
    pub content: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// File name the document downloads as.
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.title)
    }
}

/// Create body for a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDocument {
    pub title: String,
    pub doc_type: DocType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_id: Option<String>,
    pub content: String,
}

// =============================================================================
// Instruction Categories
// =============================================================================

/// Section of the instruction library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InstructionCategory {
    TechPaint,
    TechEnamel,
    TechFloki,
    Mistakes,
    Repair,
    Safety,
}

impl InstructionCategory {
    /// Categories in the order the library lists them.
    pub const ALL: [InstructionCategory; 6] = [
        InstructionCategory::TechPaint,
        InstructionCategory::TechEnamel,
        InstructionCategory::TechFloki,
        InstructionCategory::Mistakes,
        InstructionCategory::Repair,
        InstructionCategory::Safety,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionCategory::TechPaint => "tech_paint",
            InstructionCategory::TechEnamel => "tech_enamel",
            InstructionCategory::TechFloki => "tech_floki",
            InstructionCategory::Mistakes => "mistakes",
            InstructionCategory::Repair => "repair",
            InstructionCategory::Safety => "safety",
        }
    }

    /// Ukrainian section title.
    pub fn title(&self) -> &'static str {
        match self {
            InstructionCategory::TechPaint => "Тех карта фарба",
            InstructionCategory::TechEnamel => "Тех карта емаль",
            InstructionCategory::TechFloki => "Тех карта флоки",
            InstructionCategory::Mistakes => "Типові помилки",
            InstructionCategory::Repair => "Ремонт покриттів",
            InstructionCategory::Safety => "Безпека",
        }
    }
}

impl fmt::Display for InstructionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstructionCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstructionCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "category".to_string(),
                allowed: InstructionCategory::ALL
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
            })
    }
}

/// What an instruction carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Plain text in `content`, no file.
    #[default]
    Text,
    Pdf,
    Image,
}

impl FileKind {
    /// Kind of a file with the given MIME type.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            FileKind::Image
        } else if mime == "application/pdf" {
            FileKind::Pdf
        } else {
            FileKind::Text
        }
    }

    /// MIME type assumed when the file carries none.
    pub fn fallback_mime(&self) -> &'static str {
        match self {
            FileKind::Pdf => "application/pdf",
            FileKind::Image => "image/png",
            FileKind::Text => "text/plain",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            _ => "png",
        }
    }
}

// =============================================================================
// Instructions
// =============================================================================

/// An entry of the instruction library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Instruction {
    pub id: String,
    pub title: String,
    pub category: InstructionCategory,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub file_name: Option<String>,
    /// Attached file as a data URL.
    #[serde(default)]
    pub file_data: Option<String>,
    #[serde(default)]
    pub file_type: FileKind,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Instruction {
    /// MIME type of the attached file: from the data URL header when present,
    /// otherwise derived from the file kind.
    pub fn mime_type(&self) -> String {
        self.file_data
            .as_deref()
            .and_then(data_url_mime)
            .map(str::to_string)
            .unwrap_or_else(|| self.file_type.fallback_mime().to_string())
    }

    /// Name the attached file is saved under.
    pub fn attachment_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| format!("{}.{}", self.title, self.file_type.extension()))
    }

    /// Decodes the attached file, if any.
    pub fn attachment(&self) -> CoreResult<Option<Attachment>> {
        self.file_data.as_deref().map(decode_data_url).transpose()
    }

    /// Message used when the instruction is shared.
    ///
    /// ```text
    /// 📋 <title>
    /// 📁 <category title>
    ///
    /// <first 500 characters of the text>...
    ///
    /// — PoliBest 911
    /// ```
    pub fn share_text(&self) -> String {
        let mut text = format!("📋 {}\n📁 {}\n\n", self.title, self.category.title());
        if !self.content.is_empty() {
            text.extend(self.content.chars().take(SHARE_EXCERPT_CHARS));
            if self.content.chars().count() > SHARE_EXCERPT_CHARS {
                text.push_str("...");
            }
        }
        text.push_str(&format!("\n\n— {PRODUCT_LINE}"));
        text
    }
}

/// Instructions of one category, in their original order.
pub fn by_category(
    instructions: &[Instruction],
    category: InstructionCategory,
) -> Vec<&Instruction> {
    instructions
        .iter()
        .filter(|i| i.category == category)
        .collect()
}

/// Create/update body for an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InstructionInput {
    pub title: String,
    pub category: InstructionCategory,
    pub content: String,
    pub file_name: Option<String>,
    pub file_data: Option<String>,
    pub file_type: FileKind,
}

impl InstructionInput {
    /// A text-only instruction.
    pub fn text(
        title: impl Into<String>,
        category: InstructionCategory,
        content: impl Into<String>,
    ) -> Self {
        InstructionInput {
            title: title.into(),
            category,
            content: content.into(),
            file_name: None,
            file_data: None,
            file_type: FileKind::Text,
        }
    }

    /// An instruction carrying a file.
    ///
    /// The text content is cleared. A blank title is replaced by the file
    /// name without its extension.
    pub fn with_file(
        title: &str,
        category: InstructionCategory,
        file_name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> CoreResult<Self> {
        if bytes.len() > MAX_ATTACHMENT_BYTES {
            return Err(CoreError::InvalidAttachment {
                reason: format!(
                    "file is {} bytes, at most {} allowed",
                    bytes.len(),
                    MAX_ATTACHMENT_BYTES
                ),
            });
        }
        let title = if title.trim().is_empty() {
            match file_name.rsplit_once('.') {
                Some((stem, _)) if !stem.is_empty() => stem.to_string(),
                _ => file_name.to_string(),
            }
        } else {
            title.to_string()
        };
        Ok(InstructionInput {
            title,
            category,
            content: String::new(),
            file_name: Some(file_name.to_string()),
            file_data: Some(encode_data_url(mime, bytes)),
            file_type: FileKind::from_mime(mime),
        })
    }

    /// A title is required; a file instruction also needs its data.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("title", &self.title)?;
        if self.file_type != FileKind::Text && self.file_data.is_none() {
            return Err(ValidationError::Required {
                field: "file_data".to_string(),
            });
        }
        Ok(())
    }
}

impl From<&Instruction> for InstructionInput {
    fn from(instruction: &Instruction) -> Self {
        InstructionInput {
            title: instruction.title.clone(),
            category: instruction.category,
            content: instruction.content.clone(),
            file_name: instruction.file_name.clone(),
            file_data: instruction.file_data.clone(),
            file_type: instruction.file_type,
        }
    }
}

// =============================================================================
// Data URLs
// =============================================================================

/// A decoded attached file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime: String,
    pub bytes: Vec<u8>,
}

fn data_url_mime(data: &str) -> Option<&str> {
    let rest = data.strip_prefix("data:")?;
    let end = rest.find(';')?;
    let mime = &rest[..end];
    (!mime.is_empty()).then_some(mime)
}

/// Encodes bytes as a base64 data URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Decodes a data URL (or bare base64) into its MIME type and bytes.
pub fn decode_data_url(data: &str) -> CoreResult<Attachment> {
    let (mime, payload) = match data.split_once(',') {
        Some((header, payload)) => {
            let mime = header
                .split_once(':')
                .map(|(_, rest)| rest.split(';').next().unwrap_or(rest))
                .filter(|m| !m.is_empty())
                .unwrap_or("application/octet-stream");
            (mime, payload)
        }
        None => ("application/octet-stream", data),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| CoreError::InvalidAttachment {
            reason: e.to_string(),
        })?;

    Ok(Attachment {
        mime: mime.to_string(),
        bytes,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn instruction(content: &str, file_data: Option<&str>, kind: FileKind) -> Instruction {
        Instruction {
            id: "i1".to_string(),
            title: "Нанесення емалі".to_string(),
            category: InstructionCategory::TechEnamel,
            content: content.to_string(),
            file_name: None,
            file_data: file_data.map(str::to_string),
            file_type: kind,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_decode_data_url() {
        let attachment = decode_data_url("data:application/pdf;base64,JVBERg==").unwrap();
        assert_eq!(attachment.mime, "application/pdf");
        assert_eq!(attachment.bytes, b"%PDF");
    }

    #[test]
    fn test_decode_bare_base64() {
        let attachment = decode_data_url("aGVsbG8=").unwrap();
        assert_eq!(attachment.mime, "application/octet-stream");
        assert_eq!(attachment.bytes, b"hello");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(CoreError::InvalidAttachment { .. })
        ));
    }

    #[test]
    fn test_mime_type_fallbacks() {
        let with_header = instruction("", Some("data:image/jpeg;base64,AAAA"), FileKind::Image);
        assert_eq!(with_header.mime_type(), "image/jpeg");

        let pdf = instruction("", Some("AAAA"), FileKind::Pdf);
        assert_eq!(pdf.mime_type(), "application/pdf");
        assert_eq!(pdf.attachment_name(), "Нанесення емалі.pdf");

        let text = instruction("текст", None, FileKind::Text);
        assert_eq!(text.mime_type(), "text/plain");
        assert!(text.attachment().unwrap().is_none());
    }

    #[test]
    fn test_share_text_truncates() {
        let long = "а".repeat(600);
        let text = instruction(&long, None, FileKind::Text).share_text();
        assert!(text.starts_with("📋 Нанесення емалі\n📁 Тех карта емаль\n\n"));
        assert!(text.contains(&format!("{}...", "а".repeat(500))));
        assert!(!text.contains(&"а".repeat(501)));
        assert!(text.ends_with("\n\n— PoliBest 911"));

        let short = instruction("Коротко", None, FileKind::Text).share_text();
        assert!(short.contains("Коротко\n\n— PoliBest 911"));
        assert!(!short.contains("..."));
    }

    #[test]
    fn test_with_file_builds_data_url() {
        let input = InstructionInput::with_file(
            "",
            InstructionCategory::Safety,
            "памятка.pdf",
            "application/pdf",
            b"%PDF",
        )
        .unwrap();
        assert_eq!(input.title, "памятка");
        assert_eq!(input.file_type, FileKind::Pdf);
        assert_eq!(input.file_data.as_deref(), Some("data:application/pdf;base64,JVBERg=="));
    }

    #[test]
    fn test_input_validation() {
        let text = InstructionInput::text("Техніка безпеки", InstructionCategory::Safety, "");
        assert!(text.validate().is_ok());

        let untitled = InstructionInput::text("  ", InstructionCategory::Safety, "...");
        assert!(untitled.validate().is_err());

        let missing_file = InstructionInput {
            file_type: FileKind::Pdf,
            ..text
        };
        assert!(missing_file.validate().is_err());
    }

    #[test]
    fn test_with_file_rejects_large_files() {
        let big = vec![0u8; MAX_ATTACHMENT_BYTES + 1];
        assert!(InstructionInput::with_file(
            "x",
            InstructionCategory::Repair,
            "x.png",
            "image/png",
            &big
        )
        .is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!("tech_floki".parse::<InstructionCategory>().unwrap(), InstructionCategory::TechFloki);
        assert!("videos".parse::<InstructionCategory>().is_err());
        assert_eq!(InstructionCategory::Mistakes.title(), "Типові помилки");

        let list = vec![
            instruction("", None, FileKind::Text),
            Instruction {
                category: InstructionCategory::Safety,
                ..instruction("", None, FileKind::Text)
            },
        ];
        assert_eq!(by_category(&list, InstructionCategory::Safety).len(), 1);
    }

    #[test]
    fn test_unknown_doc_type() {
        let doc: Document = serde_json::from_str(
            r#"{"id":"d","title":"КП","doc_type":"invoice","content":"x",
                "created_at":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(doc.doc_type, DocType::Other);
        assert_eq!(doc.file_name(), "КП.txt");
    }
}
