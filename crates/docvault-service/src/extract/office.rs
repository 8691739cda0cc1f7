//! Text of ZIP-packaged XML documents (OpenDocument text, Office Open XML).

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use super::error::ExtractError;

/// Upper bound on the decompressed document body.
const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Where the text lives inside one office format.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OfficeLayout {
    /// Archive entry holding the document body.
    entry: &'static str,
    /// Element enclosing the body text.
    body: &'static [u8],
    /// Element whose character data is text; `None` takes all text in `body`.
    run: Option<&'static [u8]>,
    /// Elements that end a line.
    paragraphs: &'static [&'static [u8]],
    tab: &'static [u8],
    line_break: &'static [u8],
    /// Run-of-spaces element and its count attribute.
    spaces: Option<(&'static [u8], &'static str)>,
}

impl OfficeLayout {
    fn ends_line(&self, name: &[u8]) -> bool {
        self.paragraphs.iter().any(|p| *p == name)
    }
}

/// OpenDocument text (`.odt`).
pub(crate) const ODT: OfficeLayout = OfficeLayout {
    entry: "content.xml",
    body: b"office:text",
    run: None,
    paragraphs: &[b"text:p", b"text:h"],
    tab: b"text:tab",
    line_break: b"text:line-break",
    spaces: Some((b"text:s", "text:c")),
};

/// Office Open XML word processing (`.docx`).
pub(crate) const DOCX: OfficeLayout = OfficeLayout {
    entry: "word/document.xml",
    body: b"w:body",
    run: Some(b"w:t"),
    paragraphs: &[b"w:p"],
    tab: b"w:tab",
    line_break: b"w:br",
    spaces: None,
};

/// Read the body entry of an office archive and flatten it to text.
pub(crate) fn extract(data: &[u8], layout: &OfficeLayout) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let entry = archive.by_name(layout.entry)?;

    let mut xml = Vec::new();
    entry.take(MAX_BODY_BYTES + 1).read_to_end(&mut xml)?;
    if xml.len() as u64 > MAX_BODY_BYTES {
        return Err(ExtractError::TooLarge {
            limit: MAX_BODY_BYTES,
        });
    }

    flatten(&xml, layout)
}

/// Walk the XML, keeping character data inside the body and turning
/// paragraph, tab and break markup into whitespace.
fn flatten(xml: &[u8], layout: &OfficeLayout) -> Result<String, ExtractError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut body_depth = 0usize;
    let mut run_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name();
                if name.as_ref() == layout.body {
                    body_depth += 1;
                } else if layout.run.is_some_and(|r| r == name.as_ref()) {
                    run_depth += 1;
                }
            }
            Event::End(e) => {
                let name = e.name();
                if name.as_ref() == layout.body {
                    body_depth = body_depth.saturating_sub(1);
                } else if layout.run.is_some_and(|r| r == name.as_ref()) {
                    run_depth = run_depth.saturating_sub(1);
                } else if body_depth > 0 && layout.ends_line(name.as_ref()) {
                    text.push('\n');
                }
            }
            Event::Empty(e) if body_depth > 0 => push_marker(&mut text, &e, layout),
            Event::Text(e) if body_depth > 0 && (layout.run.is_none() || run_depth > 0) => {
                text.push_str(&e.unescape()?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text.trim_end().to_string())
}

fn push_marker(text: &mut String, element: &BytesStart<'_>, layout: &OfficeLayout) {
    let name = element.name();
    let name = name.as_ref();
    if name == layout.tab {
        text.push('\t');
    } else if name == layout.line_break {
        text.push('\n');
    } else if layout.ends_line(name) {
        text.push('\n');
    } else if let Some((spaces, count_attr)) = layout.spaces {
        if name == spaces {
            let count = element
                .try_get_attribute(count_attr)
                .ok()
                .flatten()
                .and_then(|a| std::str::from_utf8(&a.value).ok()?.parse::<usize>().ok())
                .unwrap_or(1);
            text.push_str(&" ".repeat(count));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odt_markup_becomes_whitespace() {
        let xml = br#"<office:document-content><office:meta>skip</office:meta><office:body><office:text><text:p>a<text:s text:c="3"/>b<text:tab/>c</text:p><text:p/><text:h>d<text:line-break/>e</text:h></office:text></office:body></office:document-content>"#;
        assert_eq!(flatten(xml, &ODT).expect("flatten"), "a   b\tc\n\nd\ne");
    }

    #[test]
    fn test_docx_keeps_only_text_runs() {
        let xml = br#"<w:document><w:body><w:p><w:r><w:instrText>PAGE</w:instrText><w:t>x &lt; y</w:t></w:r></w:p></w:body></w:document>"#;
        assert_eq!(flatten(xml, &DOCX).expect("flatten"), "x < y");
    }

    #[test]
    fn test_non_archive_is_rejected() {
        let err = extract(b"not a zip", &DOCX).expect_err("not an archive");
        assert!(matches!(err, ExtractError::Archive(_)));
    }
}
