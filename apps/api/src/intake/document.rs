#![allow(dead_code)]

//! Uploaded resume documents — media-type acceptance and the single-file rule.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Accepted resume document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    /// Legacy Word. Accepted at intake; extraction only understands the
    /// OOXML container, so a genuine binary .doc fails at the parse stage.
    Doc,
    Docx,
}

impl DocumentKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Doc => "application/msword",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
        }
    }

    /// Resolves the document kind from the declared media type, falling back
    /// to the filename extension when the declared type is missing or
    /// generic (browsers often send `application/octet-stream`).
    pub fn from_upload(filename: &str, content_type: Option<&str>) -> Option<Self> {
        if let Some(ct) = content_type {
            let ct = ct.trim().to_ascii_lowercase();
            for kind in [Self::Pdf, Self::Doc, Self::Docx] {
                if ct == kind.mime_type() {
                    return Some(kind);
                }
            }
        }
        let ext = filename.rsplit('.').next()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "doc" => Some(Self::Doc),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

/// The user's source resume file. Lives only for the duration of a run;
/// nothing is persisted beyond it.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub kind: DocumentKind,
    pub content: Bytes,
}

impl UploadedDocument {
    pub fn new(
        filename: &str,
        content_type: Option<&str>,
        content: Bytes,
    ) -> Result<Self, AppError> {
        if filename.trim().is_empty() {
            return Err(AppError::Validation("No file provided".to_string()));
        }
        let kind = DocumentKind::from_upload(filename, content_type).ok_or_else(|| {
            AppError::Validation(
                "Unsupported file type. Please upload PDF or DOCX files only.".to_string(),
            )
        })?;
        if content.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        Ok(Self {
            name: filename.to_string(),
            kind,
            content,
        })
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// The single-file rule: one file per selection. The first accepted upload
/// fills the slot; later file parts in the same submission are ignored.
/// Returns whether the candidate was kept.
pub fn accept_first(slot: &mut Option<UploadedDocument>, candidate: UploadedDocument) -> bool {
    if slot.is_none() {
        *slot = Some(candidate);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> UploadedDocument {
        UploadedDocument::new(name, None, Bytes::from_static(b"content")).unwrap()
    }

    #[test]
    fn test_kind_from_declared_media_type() {
        assert_eq!(
            DocumentKind::from_upload("resume.bin", Some("application/pdf")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_upload("resume.bin", Some("application/msword")),
            Some(DocumentKind::Doc)
        );
        assert_eq!(
            DocumentKind::from_upload(
                "resume.bin",
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            ),
            Some(DocumentKind::Docx)
        );
    }

    #[test]
    fn test_kind_falls_back_to_extension_for_generic_type() {
        assert_eq!(
            DocumentKind::from_upload("resume.docx", Some("application/octet-stream")),
            Some(DocumentKind::Docx)
        );
        assert_eq!(
            DocumentKind::from_upload("Resume.PDF", None),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn test_unsupported_type_rejected() {
        assert_eq!(DocumentKind::from_upload("photo.png", Some("image/png")), None);
        let err = UploadedDocument::new("photo.png", None, Bytes::from_static(b"x"));
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_empty_file_rejected() {
        let err = UploadedDocument::new("resume.pdf", None, Bytes::new());
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_missing_filename_rejected() {
        let err = UploadedDocument::new("", None, Bytes::from_static(b"x"));
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_first_file_wins() {
        let mut slot = None;
        assert!(accept_first(&mut slot, doc("first.pdf")));
        assert!(!accept_first(&mut slot, doc("second.pdf")));
        assert_eq!(slot.unwrap().name, "first.pdf");
    }

    #[test]
    fn test_mime_and_extension_round_trip() {
        for kind in [DocumentKind::Pdf, DocumentKind::Doc, DocumentKind::Docx] {
            let name = format!("cv.{}", kind.extension());
            assert_eq!(
                DocumentKind::from_upload(&name, Some(kind.mime_type())),
                Some(kind)
            );
        }
    }
}
