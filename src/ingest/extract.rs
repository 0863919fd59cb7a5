//! Per-extension text extraction for uploaded files.
//!
//! Dispatch is a closed table over the accepted extensions; anything
//! else is rejected before the store is touched. Extractors return the
//! document's plain text, which the chunker then segments.

use std::io::{Cursor, Read};
use std::path::Path;

use serde_json::Value;
use zip::ZipArchive;

use crate::core::errors::ApiError;

pub const SUPPORTED_EXTENSIONS: [&str; 11] = [
    "pdf", "txt", "docx", "doc", "csv", "json", "html", "htm", "xlsx", "xls", "xml",
];

/// Extract plain text from `bytes` based on the filename's extension.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, ApiError> {
    let ext = extension_of(filename).ok_or_else(|| unsupported(filename, "<none>"))?;

    match ext.as_str() {
        "txt" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "pdf" => extract_pdf(filename, bytes),
        "docx" => extract_docx(filename, bytes),
        "doc" => Ok(salvage_printable(bytes)),
        "csv" => extract_csv(filename, bytes),
        "json" => extract_json(filename, bytes),
        "html" | "htm" => Ok(strip_html(&String::from_utf8_lossy(bytes))),
        "xlsx" | "xls" => extract_spreadsheet(&ext, bytes),
        "xml" => Ok(strip_markup(&String::from_utf8_lossy(bytes))),
        other => Err(unsupported(filename, other)),
    }
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn unsupported(filename: &str, ext: &str) -> ApiError {
    ApiError::UnsupportedFormat(format!(
        "Unsupported file format '{}' for {}. Supported formats: {}",
        ext,
        filename,
        SUPPORTED_EXTENSIONS.join(", ")
    ))
}

fn extract_pdf(filename: &str, bytes: &[u8]) -> Result<String, ApiError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ApiError::Extraction(format!("could not read PDF {}: {}", filename, e)))
}

fn extract_docx(filename: &str, bytes: &[u8]) -> Result<String, ApiError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ApiError::Extraction(format!("could not open {}: {}", filename, e)))?;
    let mut entry = archive.by_name("word/document.xml").map_err(|e| {
        ApiError::Extraction(format!("{} has no word/document.xml: {}", filename, e))
    })?;

    let mut raw = String::new();
    entry
        .read_to_string(&mut raw)
        .map_err(|e| ApiError::Extraction(format!("could not read {}: {}", filename, e)))?;

    // Paragraph ends become newlines so runs don't merge into one line.
    Ok(strip_markup(&raw.replace("</w:p>", "\n")))
}

fn extract_csv(filename: &str, bytes: &[u8]) -> Result<String, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut lines = Vec::new();
    for row in reader.records() {
        let row = row
            .map_err(|e| ApiError::Extraction(format!("could not parse {}: {}", filename, e)))?;
        lines.push(row.iter().collect::<Vec<_>>().join(", "));
    }
    Ok(lines.join("\n"))
}

fn extract_json(filename: &str, bytes: &[u8]) -> Result<String, ApiError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::Extraction(format!("could not parse {}: {}", filename, e)))?;
    serde_json::to_string_pretty(&value).map_err(ApiError::internal)
}

fn extract_spreadsheet(ext: &str, bytes: &[u8]) -> Result<String, ApiError> {
    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        // Legacy .xls is not a zip container; fall back to text salvage.
        Err(_) if ext == "xls" => return Ok(salvage_printable(bytes)),
        Err(e) => return Err(ApiError::Extraction(format!("could not open workbook: {}", e))),
    };

    let names: Vec<String> = archive
        .file_names()
        .filter(|name| {
            *name == "xl/sharedStrings.xml"
                || (name.starts_with("xl/worksheets/") && name.ends_with(".xml"))
        })
        .map(str::to_string)
        .collect();

    let mut sections = Vec::new();
    for name in names {
        let mut entry = archive
            .by_name(&name)
            .map_err(|e| ApiError::Extraction(format!("could not read {}: {}", name, e)))?;
        let mut raw = String::new();
        entry
            .read_to_string(&mut raw)
            .map_err(|e| ApiError::Extraction(format!("could not read {}: {}", name, e)))?;
        let text = strip_markup(&raw.replace("</row>", "\n").replace("</si>", "\n"));
        if !text.is_empty() {
            sections.push(text);
        }
    }

    Ok(sections.join("\n"))
}

/// Drop markup tags, keeping text content. Script and style bodies are
/// removed entirely.
fn strip_html(html: &str) -> String {
    let chars: Vec<char> = html.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '<' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let name = tag_name(&chars[i + 1..]);
        if name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style") {
            let close = format!("</{}", name.to_ascii_lowercase());
            i = match find_ci(&chars, i + 1, &close) {
                Some(pos) => skip_past_tag_close(&chars, pos),
                None => chars.len(),
            };
            continue;
        }

        i = skip_past_tag_close(&chars, i);
        out.push(' ');
    }

    clean_lines(&out)
}

/// Tag stripper for XML-ish content without script/style semantics.
fn strip_markup(text: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    clean_lines(&out)
}

fn tag_name(chars: &[char]) -> String {
    chars
        .iter()
        .skip_while(|c| **c == '/')
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn find_ci(chars: &[char], from: usize, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() || chars.len() < needle.len() {
        return None;
    }
    (from..=chars.len() - needle.len()).find(|&i| {
        needle
            .iter()
            .zip(&chars[i..])
            .all(|(n, c)| n.eq_ignore_ascii_case(c))
    })
}

fn skip_past_tag_close(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i] != '>' {
        i += 1;
    }
    i + 1
}

fn clean_lines(text: &str) -> String {
    text.lines()
        .map(|line| {
            line.split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Best-effort recovery of readable text from opaque binary formats.
fn salvage_printable(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut run = String::new();

    for &byte in bytes {
        if byte.is_ascii_graphic() || byte == b' ' {
            run.push(byte as char);
        } else {
            flush_run(&mut out, &mut run);
        }
    }
    flush_run(&mut out, &mut run);
    out
}

fn flush_run(out: &mut String, run: &mut String) {
    let trimmed = run.trim();
    // Runs shorter than four characters are overwhelmingly format noise.
    if trimmed.len() >= 4 {
        out.push_str(trimmed);
        out.push('\n');
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            for (name, content) in entries {
                writer
                    .start_file(name.to_string(), SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn txt_passes_through() {
        let text = extract_text("notes.txt", b"plain regulatory text").unwrap();
        assert_eq!(text, "plain regulatory text");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = extract_text("malware.exe", b"MZ").unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_extension_is_rejected() {
        let err = extract_text("README", b"text").unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedFormat(_)));
    }

    #[test]
    fn json_is_pretty_printed() {
        let text = extract_text("data.json", br#"{"rule":"CDD","tier":2}"#).unwrap();
        assert!(text.contains("\"rule\": \"CDD\""));
    }

    #[test]
    fn malformed_json_is_an_extraction_error() {
        let err = extract_text("data.json", b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::Extraction(_)));
    }

    #[test]
    fn csv_rows_become_lines() {
        let text = extract_text("list.csv", b"name,country\nAcme,IR\n").unwrap();
        assert_eq!(text, "name, country\nAcme, IR");
    }

    #[test]
    fn html_drops_tags_and_script_bodies() {
        let html = b"<html><head><script>var x = 1;</script></head>\
            <body><h1>Hello</h1><p>World</p></body></html>";
        let text = extract_text("page.html", html).unwrap();
        assert!(text.contains("Hello"));
        assert!(text.contains("World"));
        assert!(!text.contains('<'));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn xml_keeps_element_text() {
        let text = extract_text("reg.xml", b"<doc><title>AML Rule</title></doc>").unwrap();
        assert!(text.contains("AML Rule"));
    }

    #[test]
    fn docx_extracts_paragraph_text() {
        let body = "<w:document><w:body>\
            <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>\
            <w:p><w:r><w:t>Second paragraph.</w:t></w:r></w:p>\
            </w:body></w:document>";
        let bytes = zip_with(&[("word/document.xml", body)]);
        let text = extract_text("policy.docx", &bytes).unwrap();
        assert!(text.contains("First paragraph."));
        assert!(text.contains("Second paragraph."));
    }

    #[test]
    fn corrupt_docx_is_an_extraction_error() {
        let err = extract_text("policy.docx", b"not a zip").unwrap_err();
        assert!(matches!(err, ApiError::Extraction(_)));
    }

    #[test]
    fn xlsx_extracts_shared_strings() {
        let shared = "<sst><si><t>Customer</t></si><si><t>Risk rating</t></si></sst>";
        let bytes = zip_with(&[("xl/sharedStrings.xml", shared)]);
        let text = extract_text("accounts.xlsx", &bytes).unwrap();
        assert!(text.contains("Customer"));
        assert!(text.contains("Risk rating"));
    }

    #[test]
    fn corrupt_pdf_is_an_extraction_error() {
        let err = extract_text("report.pdf", b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ApiError::Extraction(_)));
    }

    #[test]
    fn legacy_doc_salvages_printable_runs() {
        let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0x00, 0x01];
        bytes.extend_from_slice(b"Enhanced due diligence applies.");
        bytes.extend_from_slice(&[0x00, 0x03]);
        let text = extract_text("old.doc", &bytes).unwrap();
        assert!(text.contains("Enhanced due diligence applies."));
    }
}
