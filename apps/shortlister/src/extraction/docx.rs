//! `.docx` text: paragraphs of `word/document.xml`, one per line.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract_docx(path: &Path) -> Result<String, ExtractionError> {
    let file = std::fs::File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| ExtractionError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Docx(e.to_string()))?
        .read_to_string(&mut xml)?;
    Ok(document_paragraphs(&xml)?.join("\n"))
}

/// Text runs (`w:t`) grouped by paragraph (`w:p`); tabs and breaks kept.
fn document_paragraphs(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractionError::Docx(e.to_string()))?;
        match event {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractionError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(paragraphs)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Writes a minimal Word package with one paragraph per entry.
    pub(crate) fn write_docx(path: &Path, paragraphs: &[&str]) {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
            .collect();
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        );

        let mut zip = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
        let options = zip::write::FileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<?xml version=\"1.0\"?><Types/>").unwrap();
        zip.start_file(DOCUMENT_PART, options).unwrap();
        zip.write_all(document.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_paragraphs_runs_and_entities() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Jane</w:t></w:r><w:r><w:t xml:space="preserve"> Doe</w:t></w:r></w:p>
            <w:p/>
            <w:p><w:r><w:t>R&amp;D</w:t><w:tab/><w:t>2015-2023</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let paragraphs = document_paragraphs(xml).unwrap();
        assert_eq!(paragraphs, vec!["Jane Doe", "", "R&D\t2015-2023"]);
    }

    #[test]
    fn test_extract_docx_package() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cv.docx");
        write_docx(&path, &["Jane Doe", "python, pytorch", "Acme 2015-2023"]);
        assert_eq!(
            extract_docx(&path).unwrap(),
            "Jane Doe\npython, pytorch\nAcme 2015-2023"
        );
    }

    #[test]
    fn test_not_a_zip_is_docx_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cv.docx");
        std::fs::write(&path, b"PK..").unwrap();
        assert!(matches!(extract_docx(&path), Err(ExtractionError::Docx(_))));
    }
}
