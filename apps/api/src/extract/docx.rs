use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractError;

const DOCUMENT_XML: &str = "word/document.xml";
/// Upper bound on the decompressed main document part (zip-bomb guard).
const MAX_DOCUMENT_XML_BYTES: u64 = 32 * 1024 * 1024;

/// Reads `word/document.xml` and returns non-empty paragraphs joined by `\n`.
pub(super) fn extract_paragraphs(bytes: &[u8]) -> Result<String, ExtractError> {
    let xml = read_document_xml(bytes)?;
    let paragraphs = paragraphs_from_xml(&xml)?;
    Ok(paragraphs.join("\n").trim().to_string())
}

fn read_document_xml(bytes: &[u8]) -> Result<Vec<u8>, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let entry = archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| ExtractError::Docx(format!("{DOCUMENT_XML}: {e}")))?;

    let mut out = Vec::new();
    entry
        .take(MAX_DOCUMENT_XML_BYTES)
        .read_to_end(&mut out)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    if out.len() as u64 >= MAX_DOCUMENT_XML_BYTES {
        return Err(ExtractError::Docx(format!(
            "{DOCUMENT_XML} exceeds size limit ({MAX_DOCUMENT_XML_BYTES} bytes)"
        )));
    }
    Ok(out)
}

/// Text-box bodies and the `mc:Fallback` copy of alternate content.
/// Their paragraphs sit inside a run of the enclosing paragraph.
const SKIPPED_SUBTREES: &[&[u8]] = &[b"txbxContent", b"Fallback"];

fn is_skipped(local_name: &[u8]) -> bool {
    SKIPPED_SUBTREES.contains(&local_name)
}

/// Walks WordprocessingML and collects the text of each `w:p`, trimmed.
/// Text boxes and fallback content are left out, so every paragraph is
/// read once and nested ones never clobber the outer text.
fn paragraphs_from_xml(xml: &[u8]) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_reader(xml);
    // Run boundaries can fall inside words; keep whitespace as written.
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut skip_depth = 0usize;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf);
        if skip_depth > 0 {
            match event {
                Ok(Event::Start(e)) if is_skipped(e.local_name().as_ref()) => skip_depth += 1,
                Ok(Event::End(e)) if is_skipped(e.local_name().as_ref()) => skip_depth -= 1,
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExtractError::Docx(e.to_string())),
                _ => {}
            }
            buf.clear();
            continue;
        }

        match event {
            Ok(Event::Start(e)) if is_skipped(e.local_name().as_ref()) => skip_depth = 1,
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let text = current.trim();
                    if !text.is_empty() {
                        paragraphs.push(text.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Jane </w:t></w:r><w:r><w:t>Doe</w:t></w:r></w:p><w:p></w:p><w:p><w:r><w:t xml:space="preserve">  </w:t></w:r></w:p><w:p><w:r><w:t>Analyst</w:t><w:tab/><w:t>R&amp;D</w:t></w:r></w:p></w:body></w:document>"#;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("word/document.xml", options).unwrap();
            zip.write_all(document_xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_paragraphs_joined_and_blank_ones_skipped() {
        let text = extract_paragraphs(&build_docx(BODY)).unwrap();
        assert_eq!(text, "Jane Doe\nAnalyst\tR&D");
    }

    #[test]
    fn test_text_box_and_fallback_content_are_left_out() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape" xmlns:v="urn:schemas-microsoft-com:vml"><w:body><w:p><w:r><w:t>Jane Doe</w:t></w:r><w:r><mc:AlternateContent><mc:Choice Requires="wps"><w:drawing><wps:txbx><w:txbxContent><w:p><w:r><w:t>Sidebar</w:t></w:r></w:p></w:txbxContent></wps:txbx></w:drawing></mc:Choice><mc:Fallback><w:pict><v:textbox><w:txbxContent><w:p><w:r><w:t>Sidebar</w:t></w:r></w:p></w:txbxContent></v:textbox></w:pict></mc:Fallback></mc:AlternateContent></w:r><w:r><w:t xml:space="preserve"> CFA</w:t></w:r></w:p><w:p><w:r><w:t>Portfolio Manager</w:t></w:r></w:p></w:body></w:document>"#;
        let text = extract_paragraphs(&build_docx(xml)).unwrap();
        assert_eq!(text, "Jane Doe CFA\nPortfolio Manager");
        assert!(!text.contains("Sidebar"));
    }

    #[test]
    fn test_missing_document_part_is_error() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("other.xml", options).unwrap();
            zip.write_all(b"<x/>").unwrap();
            zip.finish().unwrap();
        }
        let err = extract_paragraphs(&cursor.into_inner()).unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
    }

    #[test]
    fn test_not_a_zip_is_error() {
        assert!(matches!(
            extract_paragraphs(b"plain bytes"),
            Err(ExtractError::Docx(_))
        ));
    }
}
