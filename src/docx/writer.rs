//! DOCX writer implementation.

use super::reader::main_part_path;
use crate::container::OoxmlContainer;
use crate::error::Result;
use crate::model::{
    Block, Document, PageMargins, Paragraph, ParagraphProperties, Run, RunStyle, Section,
};

use quick_xml::escape::escape;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Namespace block for documents built from scratch. Documents parsed
/// from a file keep their captured root attributes instead.
const DEFAULT_ROOT_ATTRS: &str = " xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\" \
     xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\"";

const CONTENT_TYPES_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
</Types>";

const PACKAGE_RELS_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>\
</Relationships>";

/// Writer for DOCX (Word) documents.
///
/// Serializes a [`Document`] back into a complete OOXML container.
/// [`to_bytes_with_source`](DocxWriter::to_bytes_with_source) copies every
/// part of the source container except the main document part through
/// byte-for-byte, so styles, media, headers and relationships survive a
/// rewrite untouched.
pub struct DocxWriter<'a> {
    document: &'a Document,
}

impl<'a> DocxWriter<'a> {
    /// Create a writer for a document.
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Serialize into a minimal standalone container.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(PACKAGE_RELS_XML.as_bytes())?;
        zip.start_file("word/document.xml", options)?;
        zip.write_all(self.document_xml().as_bytes())?;

        zip.finish()?;
        Ok(buffer)
    }

    /// Serialize into a copy of the source container, replacing only the
    /// main document part.
    pub fn to_bytes_with_source(&self, source: &OoxmlContainer) -> Result<Vec<u8>> {
        let main_part = main_part_path(source);

        let mut buffer = Vec::new();
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for name in source.list_files() {
            if name == main_part || name.ends_with('/') {
                continue;
            }
            let data = source.read_binary(&name)?;
            zip.start_file(name.as_str(), options)?;
            zip.write_all(&data)?;
        }

        zip.start_file(main_part.as_str(), options)?;
        zip.write_all(self.document_xml().as_bytes())?;

        zip.finish()?;
        Ok(buffer)
    }

    /// Serialize the main document part.
    fn document_xml(&self) -> String {
        let mut xml = String::with_capacity(4096);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n");
        xml.push_str("<w:document");
        if self.document.root_attrs.is_empty() {
            xml.push_str(DEFAULT_ROOT_ATTRS);
        } else {
            xml.push_str(&self.document.root_attrs);
        }
        xml.push_str("><w:body>");
        for block in &self.document.body {
            match block {
                Block::Paragraph(para) => write_paragraph(&mut xml, para),
                Block::Raw { xml: raw } => xml.push_str(raw),
            }
        }
        if let Some(section) = &self.document.section {
            write_section(&mut xml, section);
        }
        xml.push_str("</w:body></w:document>");
        xml
    }
}

/// Write a `w:p` element.
///
/// Consecutive runs sharing a hyperlink relationship id are regrouped
/// under a single `w:hyperlink`. Runs with a target but no relationship
/// id write as plain runs, since the package has no relationship to
/// point at.
fn write_paragraph(xml: &mut String, para: &Paragraph) {
    xml.push_str("<w:p>");
    write_paragraph_properties(xml, &para.properties);

    let mut open_link: Option<&str> = None;
    for run in &para.runs {
        let link = run.hyperlink_id.as_deref();
        if link != open_link {
            if open_link.is_some() {
                xml.push_str("</w:hyperlink>");
            }
            if let Some(id) = link {
                xml.push_str("<w:hyperlink r:id=\"");
                xml.push_str(&escape(id));
                xml.push_str("\" w:history=\"1\">");
            }
            open_link = link;
        }
        write_run(xml, run);
    }
    if open_link.is_some() {
        xml.push_str("</w:hyperlink>");
    }
    xml.push_str("</w:p>");
}

/// Write a `w:pPr` element, or nothing when every property is at its
/// default. Preserved raw children come first, then the modeled
/// properties in CT_PPr schema order with `w:sectPr` last.
fn write_paragraph_properties(xml: &mut String, props: &ParagraphProperties) {
    let has_spacing = props.spacing_before.is_some()
        || props.spacing_after.is_some()
        || props.line_spacing.is_some();
    if props.extra_xml.is_empty()
        && !props.page_break_before
        && !has_spacing
        && props.alignment.is_none()
        && props.section.is_none()
    {
        return;
    }

    xml.push_str("<w:pPr>");
    xml.push_str(&props.extra_xml);
    if props.page_break_before {
        xml.push_str("<w:pageBreakBefore/>");
    }
    if has_spacing {
        xml.push_str("<w:spacing");
        if let Some(before) = props.spacing_before {
            xml.push_str(&format!(" w:before=\"{}\"", before));
        }
        if let Some(after) = props.spacing_after {
            xml.push_str(&format!(" w:after=\"{}\"", after));
        }
        if let Some(line) = props.line_spacing {
            xml.push_str(&format!(" w:line=\"{}\" w:lineRule=\"auto\"", line));
        }
        xml.push_str("/>");
    }
    if let Some(alignment) = props.alignment {
        xml.push_str(&format!("<w:jc w:val=\"{}\"/>", alignment.as_wml()));
    }
    if let Some(section) = &props.section {
        write_section(xml, section);
    }
    xml.push_str("</w:pPr>");
}

/// Write a `w:r` element. Newlines become `w:br`, tabs become `w:tab`,
/// and unmodeled children captured at parse time are re-emitted after
/// the text.
fn write_run(xml: &mut String, run: &Run) {
    xml.push_str("<w:r>");
    write_run_properties(xml, &run.style);
    let mut first_line = true;
    for line in run.text.split('\n') {
        if !first_line {
            xml.push_str("<w:br/>");
        }
        write_text(xml, line);
        first_line = false;
    }
    xml.push_str(&run.extra_xml);
    xml.push_str("</w:r>");
}

fn write_text(xml: &mut String, text: &str) {
    let mut first_part = true;
    for part in text.split('\t') {
        if !first_part {
            xml.push_str("<w:tab/>");
        }
        if !part.is_empty() {
            if part.trim() != part {
                xml.push_str("<w:t xml:space=\"preserve\">");
            } else {
                xml.push_str("<w:t>");
            }
            xml.push_str(&escape(part));
            xml.push_str("</w:t>");
        }
        first_part = false;
    }
}

/// Write a `w:rPr` element, or nothing for an unformatted run.
fn write_run_properties(xml: &mut String, style: &RunStyle) {
    if !style.has_formatting() {
        return;
    }

    xml.push_str("<w:rPr>");
    if let Some(font) = &style.font {
        let name = escape(font.as_str());
        match &style.east_asia_font {
            Some(east) => xml.push_str(&format!(
                "<w:rFonts w:ascii=\"{}\" w:hAnsi=\"{}\" w:eastAsia=\"{}\"/>",
                name,
                name,
                escape(east.as_str())
            )),
            None => xml.push_str(&format!(
                "<w:rFonts w:ascii=\"{}\" w:hAnsi=\"{}\"/>",
                name, name
            )),
        }
    } else if let Some(east) = &style.east_asia_font {
        xml.push_str(&format!(
            "<w:rFonts w:eastAsia=\"{}\"/>",
            escape(east.as_str())
        ));
    }
    if style.bold {
        xml.push_str("<w:b/>");
    }
    if style.italic {
        xml.push_str("<w:i/>");
    }
    if let Some(size) = style.size {
        xml.push_str(&format!(
            "<w:sz w:val=\"{}\"/><w:szCs w:val=\"{}\"/>",
            size, size
        ));
    }
    if style.underline {
        xml.push_str("<w:u w:val=\"single\"/>");
    }
    xml.push_str("</w:rPr>");
}

/// Write a `w:sectPr` element. Preserved children keep their captured
/// positions around `w:pgMar`, holding the CT_SectPr sequence.
fn write_section(xml: &mut String, section: &Section) {
    xml.push_str("<w:sectPr");
    xml.push_str(&section.attrs);
    xml.push('>');
    xml.push_str(&section.prefix_xml);
    if let Some(margins) = section.margins {
        write_page_margins(xml, margins);
    }
    xml.push_str(&section.suffix_xml);
    xml.push_str("</w:sectPr>");
}

fn write_page_margins(xml: &mut String, margins: PageMargins) {
    xml.push_str(&format!(
        "<w:pgMar w:top=\"{}\" w:right=\"{}\" w:bottom=\"{}\" w:left=\"{}\" \
         w:header=\"{}\" w:footer=\"{}\" w:gutter=\"{}\"/>",
        margins.top,
        margins.right,
        margins.bottom,
        margins.left,
        margins.header,
        margins.footer,
        margins.gutter
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::DocxReader;
    use crate::model::Alignment;

    fn body_of(document: &Document) -> String {
        let xml = DocxWriter::new(document).document_xml();
        let start = xml.find("<w:body>").unwrap() + "<w:body>".len();
        let end = xml.find("</w:body>").unwrap();
        xml[start..end].to_string()
    }

    #[test]
    fn test_plain_paragraph() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("Hello, world."));
        assert_eq!(
            body_of(&doc),
            "<w:p><w:r><w:t>Hello, world.</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_paragraph_properties_in_schema_order() {
        let mut para = Paragraph::new();
        para.properties.extra_xml = "<w:pStyle w:val=\"Heading1\"/>".to_string();
        para.properties.page_break_before = true;
        para.properties.spacing_before = Some(240);
        para.properties.spacing_after = Some(120);
        para.properties.line_spacing = Some(240);
        para.properties.alignment = Some(Alignment::Center);
        para.add_run(Run::plain("Chapter"));

        let mut doc = Document::new();
        doc.add_paragraph(para);
        assert_eq!(
            body_of(&doc),
            "<w:p><w:pPr><w:pStyle w:val=\"Heading1\"/><w:pageBreakBefore/>\
             <w:spacing w:before=\"240\" w:after=\"120\" w:line=\"240\" w:lineRule=\"auto\"/>\
             <w:jc w:val=\"center\"/></w:pPr><w:r><w:t>Chapter</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_run_properties_shape() {
        let style = RunStyle {
            bold: true,
            italic: true,
            underline: true,
            font: Some("Times New Roman".to_string()),
            east_asia_font: None,
            size: Some(24),
        };
        let mut para = Paragraph::new();
        para.runs.push(Run {
            text: "styled".to_string(),
            style,
            ..Default::default()
        });
        let mut doc = Document::new();
        doc.add_paragraph(para);
        assert_eq!(
            body_of(&doc),
            "<w:p><w:r><w:rPr>\
             <w:rFonts w:ascii=\"Times New Roman\" w:hAnsi=\"Times New Roman\"/>\
             <w:b/><w:i/><w:sz w:val=\"24\"/><w:szCs w:val=\"24\"/>\
             <w:u w:val=\"single\"/></w:rPr><w:t>styled</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_breaks_and_tabs() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("a\tb\nc"));
        assert_eq!(
            body_of(&doc),
            "<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_whitespace_needs_preserve() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("trailing "));
        assert_eq!(
            body_of(&doc),
            "<w:p><w:r><w:t xml:space=\"preserve\">trailing </w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_hyperlink_runs_regrouped() {
        let mut para = Paragraph::new();
        para.add_run(Run::plain("See "));
        para.add_run(Run {
            text: "the".to_string(),
            hyperlink: Some("https://example.com/".to_string()),
            hyperlink_id: Some("rId9".to_string()),
            ..Default::default()
        });
        para.add_run(Run {
            text: " site".to_string(),
            hyperlink: Some("https://example.com/".to_string()),
            hyperlink_id: Some("rId9".to_string()),
            ..Default::default()
        });
        para.add_run(Run::plain("."));

        let mut doc = Document::new();
        doc.add_paragraph(para);
        assert_eq!(
            body_of(&doc),
            "<w:p><w:r><w:t xml:space=\"preserve\">See </w:t></w:r>\
             <w:hyperlink r:id=\"rId9\" w:history=\"1\">\
             <w:r><w:t>the</w:t></w:r>\
             <w:r><w:t xml:space=\"preserve\"> site</w:t></w:r>\
             </w:hyperlink><w:r><w:t>.</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_section_children_kept_around_margins() {
        let mut doc = Document::new();
        doc.section = Some(Section {
            attrs: String::new(),
            prefix_xml: "<w:pgSz w:w=\"11906\" w:h=\"16838\"/>".to_string(),
            margins: Some(PageMargins {
                top: 1440,
                bottom: 1440,
                left: 1800,
                right: 1800,
                header: 720,
                footer: 720,
                gutter: 0,
            }),
            suffix_xml: "<w:cols w:space=\"425\"/>".to_string(),
        });
        assert_eq!(
            body_of(&doc),
            "<w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>\
             <w:pgMar w:top=\"1440\" w:right=\"1800\" w:bottom=\"1440\" w:left=\"1800\" \
             w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/>\
             <w:cols w:space=\"425\"/></w:sectPr>"
        );
    }

    #[test]
    fn test_default_namespaces_for_fresh_document() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("fresh"));
        let xml = DocxWriter::new(&doc).document_xml();
        assert!(xml.starts_with("<?xml version=\"1.0\""));
        assert!(xml.contains("xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\""));
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let mut para = Paragraph::new();
        para.add_run(Run::plain("a < b & c"));
        let mut doc = Document::new();
        doc.add_paragraph(para);
        assert!(body_of(&doc).contains("<w:t>a &lt; b &amp; c</w:t>"));
    }

    #[test]
    fn test_round_trip_through_reader() {
        let mut doc = Document::new();
        let mut para = Paragraph::new();
        para.properties.alignment = Some(Alignment::Justify);
        para.properties.spacing_after = Some(360);
        para.add_run(Run {
            text: "Body text".to_string(),
            style: RunStyle {
                size: Some(24),
                font: Some("Times New Roman".to_string()),
                ..RunStyle::new()
            },
            ..Default::default()
        });
        doc.add_paragraph(para);
        let mut sect = Section::new();
        sect.margins = Some(PageMargins::default());
        doc.section = Some(sect);

        let bytes = DocxWriter::new(&doc).to_bytes().unwrap();
        let reparsed = DocxReader::from_bytes(bytes).unwrap().parse().unwrap();

        assert_eq!(reparsed.paragraph_count(), 1);
        let para = reparsed.paragraphs().next().unwrap();
        assert_eq!(para.plain_text(), "Body text");
        assert_eq!(para.properties.alignment, Some(Alignment::Justify));
        assert_eq!(para.properties.spacing_after, Some(360));
        assert_eq!(para.runs[0].style.size, Some(24));
        assert_eq!(para.runs[0].style.font.as_deref(), Some("Times New Roman"));
        assert_eq!(
            reparsed.section.as_ref().unwrap().margins,
            Some(PageMargins::default())
        );
    }

    #[test]
    fn test_source_parts_copied_through() {
        use std::io::Write as _;
        use zip::write::SimpleFileOptions;

        let document_xml = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
            <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
            <w:body><w:p><w:r><w:t>original</w:t></w:r></w:p></w:body></w:document>";
        let styles_xml = "<w:styles/>";
        let media = [0x89u8, 0x50, 0x4e, 0x47];

        let mut buffer = Vec::new();
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES_XML.as_bytes()).unwrap();
        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(PACKAGE_RELS_XML.as_bytes()).unwrap();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.start_file("word/styles.xml", options).unwrap();
        zip.write_all(styles_xml.as_bytes()).unwrap();
        zip.start_file("word/media/image1.png", options).unwrap();
        zip.write_all(&media).unwrap();
        zip.finish().unwrap();

        let source = OoxmlContainer::from_bytes(buffer).unwrap();
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("rewritten"));

        let bytes = DocxWriter::new(&doc).to_bytes_with_source(&source).unwrap();
        let out = OoxmlContainer::from_bytes(bytes).unwrap();

        assert_eq!(out.read_binary("word/media/image1.png").unwrap(), media);
        assert_eq!(out.read_xml("word/styles.xml").unwrap(), styles_xml);
        let main = out.read_xml("word/document.xml").unwrap();
        assert!(main.contains("rewritten"));
        assert!(!main.contains("original"));
    }

    #[test]
    fn test_empty_document_is_readable() {
        let doc = Document::new();
        let bytes = DocxWriter::new(&doc).to_bytes().unwrap();
        let reparsed = DocxReader::from_bytes(bytes).unwrap().parse().unwrap();
        assert_eq!(reparsed.paragraph_count(), 0);
        assert!(reparsed.is_empty());
    }
}
