//! Document text extraction — PDF via pdf-extract, DOCX by walking the
//! OOXML body.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::AppError;
use crate::intake::document::{DocumentKind, UploadedDocument};

/// Extracts plain text from an uploaded document. CPU-bound; callers on the
/// async path should wrap this in `spawn_blocking`.
pub fn extract_text(document: &UploadedDocument) -> Result<String, AppError> {
    match document.kind {
        DocumentKind::Pdf => extract_pdf(&document.content),
        DocumentKind::Docx => extract_docx(&document.content),
        DocumentKind::Doc => extract_docx(&document.content).map_err(|_| {
            AppError::UnprocessableEntity(
                "Legacy .doc files cannot be read. Save the document as .docx and retry."
                    .to_string(),
            )
        }),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::UnprocessableEntity(format!("PDF parsing failed: {e}")))
}

/// A .docx is a zip container; the visible text lives in `word/document.xml`
/// as `w:t` runs grouped into `w:p` paragraphs.
fn extract_docx(bytes: &[u8]) -> Result<String, AppError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::UnprocessableEntity(format!("DOCX parsing failed: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::UnprocessableEntity(format!("DOCX parsing failed: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| AppError::UnprocessableEntity(format!("DOCX parsing failed: {e}")))?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                text.push_str(&t.unescape().map(|c| c.into_owned()).unwrap_or_default());
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => text.push('\n'),
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:br" => text.push('\n'),
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:tab" => text.push(' '),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(AppError::UnprocessableEntity(format!(
                    "DOCX parsing failed: {e}"
                )))
            }
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_fixture(document_xml: &str) -> Bytes {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("word/document.xml", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        Bytes::from(cursor.into_inner())
    }

    fn docx_upload(xml: &str) -> UploadedDocument {
        UploadedDocument::new("resume.docx", None, docx_fixture(xml)).unwrap()
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let doc = docx_upload(
            r#"<w:document><w:body><w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p><w:p><w:r><w:t>Engineer</w:t></w:r></w:p></w:body></w:document>"#,
        );
        let text = extract_text(&doc).unwrap();
        assert_eq!(text.trim(), "Jane Doe\nEngineer");
    }

    #[test]
    fn test_docx_entities_unescaped() {
        let doc = docx_upload(
            r#"<w:document><w:body><w:p><w:r><w:t>R&amp;D engineer</w:t></w:r></w:p></w:body></w:document>"#,
        );
        assert!(extract_text(&doc).unwrap().contains("R&D engineer"));
    }

    #[test]
    fn test_docx_runs_in_one_paragraph_stay_on_one_line() {
        let doc = docx_upload(
            r#"<w:document><w:body><w:p><w:r><w:t>Jane </w:t></w:r><w:r><w:t>Doe</w:t></w:r></w:p></w:body></w:document>"#,
        );
        assert_eq!(extract_text(&doc).unwrap().trim(), "Jane Doe");
    }

    #[test]
    fn test_not_a_zip_is_unprocessable() {
        let doc =
            UploadedDocument::new("resume.docx", None, Bytes::from_static(b"not a zip")).unwrap();
        assert!(matches!(
            extract_text(&doc),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[test]
    fn test_legacy_doc_gets_tailored_message() {
        let doc =
            UploadedDocument::new("resume.doc", None, Bytes::from_static(b"\xd0\xcf\x11\xe0old"))
                .unwrap();
        match extract_text(&doc) {
            Err(AppError::UnprocessableEntity(msg)) => {
                assert!(msg.contains("Legacy .doc"), "unexpected message: {msg}")
            }
            other => panic!("expected unprocessable entity, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_pdf_is_unprocessable() {
        let doc =
            UploadedDocument::new("resume.pdf", None, Bytes::from_static(b"not a pdf")).unwrap();
        assert!(matches!(
            extract_text(&doc),
            Err(AppError::UnprocessableEntity(_))
        ));
    }
}
