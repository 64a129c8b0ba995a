//! DOCX reader implementation.

use crate::container::{OoxmlContainer, Relationships};
use crate::error::{Error, Result};
use crate::model::{
    precedes_pgmar, Alignment, Block, Document, PageMargins, Paragraph, Run, RunStyle, Section,
};

use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, Event};

/// Relationship type of the package's main document part.
const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Resolve the main document part through the package relationships,
/// falling back to the conventional path.
pub(crate) fn main_part_path(container: &OoxmlContainer) -> String {
    container
        .read_package_relationships()
        .ok()
        .and_then(|rels| {
            rels.get_by_type(OFFICE_DOCUMENT_REL)
                .first()
                .map(|rel| OoxmlContainer::resolve_path("", &rel.target))
        })
        .unwrap_or_else(|| "word/document.xml".to_string())
}

/// Reader for DOCX (Word) documents.
///
/// Parses the main document part into a [`Document`] model. Content the
/// model does not cover (tables, bookmarks, drawings) is captured as
/// verbatim XML so it survives a later write unchanged.
pub struct DocxReader {
    container: OoxmlContainer,
    main_part: String,
    relationships: Relationships,
}

impl DocxReader {
    /// Open a DOCX file for reading.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Self::from_container(container)
    }

    /// Create a reader from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    /// Create a reader from a container.
    fn from_container(container: OoxmlContainer) -> Result<Self> {
        let main_part = main_part_path(&container);
        let relationships = container.read_relationships(&main_part).unwrap_or_default();

        Ok(Self {
            container,
            main_part,
            relationships,
        })
    }

    /// Parse the document and return a Document model.
    pub fn parse(&self) -> Result<Document> {
        let mut doc = Document::new();
        doc.metadata = self.container.parse_core_metadata()?;
        self.parse_document_xml(&mut doc)?;
        Ok(doc)
    }

    /// Get a reference to the container.
    pub fn container(&self) -> &OoxmlContainer {
        &self.container
    }

    /// Parse the main document part.
    fn parse_document_xml(&self, doc: &mut Document) -> Result<()> {
        let xml = self.container.read_xml(&self.main_part)?;

        let mut reader = quick_xml::Reader::from_str(&xml);
        // Don't trim text - preserve whitespace from xml:space="preserve" elements
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut in_body = false;
        let mut in_paragraph = false;
        let mut paragraph_xml = String::new();
        let mut paragraph_depth = 0u32;
        let mut raw_xml = String::new();
        let mut raw_depth = 0u32;
        let mut sect_xml = String::new();
        let mut sect_depth = 0u32;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if in_paragraph {
                        append_start(&mut paragraph_xml, e);
                        // Text boxes nest whole paragraphs inside a run
                        if e.name().as_ref() == b"w:p" {
                            paragraph_depth += 1;
                        }
                    } else if raw_depth > 0 {
                        append_start(&mut raw_xml, e);
                        raw_depth += 1;
                    } else if sect_depth > 0 {
                        append_start(&mut sect_xml, e);
                        sect_depth += 1;
                    } else {
                        match e.name().as_ref() {
                            b"w:document" => doc.root_attrs = attrs_string(e),
                            b"w:body" => in_body = true,
                            b"w:p" if in_body => {
                                in_paragraph = true;
                                paragraph_depth = 1;
                                paragraph_xml.clear();
                                append_start(&mut paragraph_xml, e);
                            }
                            b"w:sectPr" if in_body => {
                                sect_depth = 1;
                                sect_xml.clear();
                                append_start(&mut sect_xml, e);
                            }
                            _ if in_body => {
                                raw_depth = 1;
                                raw_xml.clear();
                                append_start(&mut raw_xml, e);
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if in_paragraph {
                        append_empty(&mut paragraph_xml, e);
                    } else if raw_depth > 0 {
                        append_empty(&mut raw_xml, e);
                    } else if sect_depth > 0 {
                        append_empty(&mut sect_xml, e);
                    } else if in_body {
                        match e.name().as_ref() {
                            b"w:p" => doc.body.push(Block::Paragraph(Paragraph::new())),
                            b"w:sectPr" => doc.section = Some(Section::new()),
                            _ => {
                                let mut xml = String::new();
                                append_empty(&mut xml, e);
                                doc.body.push(Block::Raw { xml });
                            }
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if in_paragraph || raw_depth > 0 || sect_depth > 0 {
                        let text = e.unescape().unwrap_or_default();
                        let out = if in_paragraph {
                            &mut paragraph_xml
                        } else if raw_depth > 0 {
                            &mut raw_xml
                        } else {
                            &mut sect_xml
                        };
                        out.push_str(&escape(text.as_ref()));
                    }
                }
                Ok(Event::End(ref e)) => {
                    if in_paragraph {
                        append_end(&mut paragraph_xml, e);
                        if e.name().as_ref() == b"w:p" {
                            paragraph_depth -= 1;
                            if paragraph_depth == 0 {
                                let para = self.parse_paragraph(&paragraph_xml)?;
                                doc.body.push(Block::Paragraph(para));
                                in_paragraph = false;
                            }
                        }
                    } else if raw_depth > 0 {
                        append_end(&mut raw_xml, e);
                        raw_depth -= 1;
                        if raw_depth == 0 {
                            doc.body.push(Block::Raw {
                                xml: std::mem::take(&mut raw_xml),
                            });
                        }
                    } else if sect_depth > 0 {
                        append_end(&mut sect_xml, e);
                        sect_depth -= 1;
                        if sect_depth == 0 {
                            doc.section = Some(parse_section_xml(&sect_xml)?);
                        }
                    } else if e.name().as_ref() == b"w:body" {
                        in_body = false;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Parse a single `w:p` element.
    fn parse_paragraph(&self, xml: &str) -> Result<Paragraph> {
        let mut para = Paragraph::new();

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut in_ppr = false;
        let mut in_rpr = false;
        let mut in_run = false;
        let mut in_text = false;
        let mut in_instr_text = false;
        let mut ppr_raw_depth = 0u32;
        let mut run_raw_depth = 0u32;
        let mut sect_xml = String::new();
        let mut sect_depth = 0u32;
        let mut run_text = String::new();
        let mut run_extra = String::new();
        let mut current_style = RunStyle::new();
        let mut link_id: Option<String> = None;
        let mut link_target: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if sect_depth > 0 {
                        append_start(&mut sect_xml, e);
                        sect_depth += 1;
                    } else if ppr_raw_depth > 0 {
                        append_start(&mut para.properties.extra_xml, e);
                        ppr_raw_depth += 1;
                    } else if run_raw_depth > 0 {
                        append_start(&mut run_extra, e);
                        run_raw_depth += 1;
                    } else {
                        match e.name().as_ref() {
                            b"w:pPr" => in_ppr = true,
                            b"w:sectPr" if in_ppr => {
                                sect_depth = 1;
                                sect_xml.clear();
                                append_start(&mut sect_xml, e);
                            }
                            b"w:r" => {
                                in_run = true;
                                run_text.clear();
                                run_extra.clear();
                                current_style = RunStyle::new();
                            }
                            b"w:rPr" if in_run => in_rpr = true,
                            b"w:t" if in_run => in_text = true,
                            b"w:instrText" => in_instr_text = true,
                            b"w:hyperlink" => {
                                for attr in e.attributes().flatten() {
                                    if attr.key.as_ref() == b"r:id" {
                                        let id = String::from_utf8_lossy(&attr.value).to_string();
                                        link_target = self
                                            .relationships
                                            .get(&id)
                                            .map(|rel| rel.target.clone());
                                        link_id = Some(id);
                                    }
                                }
                            }
                            // Field plumbing and tracked deletions are
                            // dropped; the displayed result text survives
                            // through ordinary w:t elements
                            b"w:fldChar" | b"w:delText" | b"w:delInstrText" => {
                                reader.read_to_end_into(e.name(), &mut Vec::new())?;
                            }
                            _ => {
                                if in_ppr {
                                    ppr_raw_depth = 1;
                                    append_start(&mut para.properties.extra_xml, e);
                                } else if in_run && !in_rpr {
                                    run_raw_depth = 1;
                                    append_start(&mut run_extra, e);
                                }
                            }
                        }
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if sect_depth > 0 {
                        append_empty(&mut sect_xml, e);
                    } else if ppr_raw_depth > 0 {
                        append_empty(&mut para.properties.extra_xml, e);
                    } else if run_raw_depth > 0 {
                        append_empty(&mut run_extra, e);
                    } else {
                        match e.name().as_ref() {
                            b"w:jc" if in_ppr => {
                                if let Some(val) = get_attr(e, b"w:val") {
                                    para.properties.alignment = Alignment::from_wml(&val);
                                }
                            }
                            b"w:spacing" if in_ppr => {
                                for attr in e.attributes().flatten() {
                                    let val = String::from_utf8_lossy(&attr.value);
                                    match attr.key.as_ref() {
                                        b"w:before" => {
                                            para.properties.spacing_before = val.parse().ok()
                                        }
                                        b"w:after" => {
                                            para.properties.spacing_after = val.parse().ok()
                                        }
                                        b"w:line" => {
                                            para.properties.line_spacing = val.parse().ok()
                                        }
                                        _ => {}
                                    }
                                }
                            }
                            b"w:pageBreakBefore" if in_ppr => {
                                para.properties.page_break_before =
                                    get_bool_attr(e, b"w:val").unwrap_or(true);
                            }
                            b"w:sectPr" if in_ppr => {
                                para.properties.section = Some(Section::new());
                            }
                            b"w:b" if in_rpr => {
                                current_style.bold = get_bool_attr(e, b"w:val").unwrap_or(true);
                            }
                            b"w:i" if in_rpr => {
                                current_style.italic = get_bool_attr(e, b"w:val").unwrap_or(true);
                            }
                            b"w:u" if in_rpr => {
                                current_style.underline = get_attr(e, b"w:val")
                                    .map(|val| val != "none")
                                    .unwrap_or(true);
                            }
                            b"w:sz" if in_rpr => {
                                if let Some(val) = get_attr(e, b"w:val") {
                                    current_style.size = val.parse().ok();
                                }
                            }
                            b"w:rFonts" if in_rpr => {
                                for attr in e.attributes().flatten() {
                                    let val = String::from_utf8_lossy(&attr.value).to_string();
                                    match attr.key.as_ref() {
                                        b"w:ascii" => current_style.font = Some(val),
                                        b"w:eastAsia" => current_style.east_asia_font = Some(val),
                                        _ => {}
                                    }
                                }
                            }
                            b"w:tab" if in_run => run_text.push('\t'),
                            b"w:br" | b"w:cr" if in_run => run_text.push('\n'),
                            b"w:t" | b"w:instrText" | b"w:fldChar" => {}
                            _ => {
                                if in_ppr {
                                    append_empty(&mut para.properties.extra_xml, e);
                                } else if in_run && !in_rpr {
                                    append_empty(&mut run_extra, e);
                                }
                            }
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if sect_depth > 0 || ppr_raw_depth > 0 || run_raw_depth > 0 {
                        let text = e.unescape().unwrap_or_default();
                        let out = if sect_depth > 0 {
                            &mut sect_xml
                        } else if ppr_raw_depth > 0 {
                            &mut para.properties.extra_xml
                        } else {
                            &mut run_extra
                        };
                        out.push_str(&escape(text.as_ref()));
                    } else if in_run && in_text && !in_instr_text {
                        run_text.push_str(&e.unescape().unwrap_or_default());
                    }
                }
                Ok(Event::End(ref e)) => {
                    if sect_depth > 0 {
                        append_end(&mut sect_xml, e);
                        sect_depth -= 1;
                        if sect_depth == 0 {
                            para.properties.section = Some(parse_section_xml(&sect_xml)?);
                        }
                    } else if ppr_raw_depth > 0 {
                        append_end(&mut para.properties.extra_xml, e);
                        ppr_raw_depth -= 1;
                    } else if run_raw_depth > 0 {
                        append_end(&mut run_extra, e);
                        run_raw_depth -= 1;
                    } else {
                        match e.name().as_ref() {
                            b"w:pPr" => in_ppr = false,
                            b"w:rPr" => in_rpr = false,
                            b"w:t" => in_text = false,
                            b"w:instrText" => in_instr_text = false,
                            b"w:hyperlink" => {
                                link_id = None;
                                link_target = None;
                            }
                            b"w:r" => {
                                in_run = false;
                                if !run_text.is_empty() || !run_extra.is_empty() {
                                    para.runs.push(Run {
                                        text: std::mem::take(&mut run_text),
                                        style: current_style.clone(),
                                        hyperlink: link_target.clone(),
                                        hyperlink_id: link_id.clone(),
                                        extra_xml: std::mem::take(&mut run_extra),
                                    });
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(para)
    }
}

/// Parse a `w:sectPr` element.
///
/// Children are split around `w:pgMar` following the CT_SectPr sequence,
/// so margins forced into a section that had none still land in schema
/// position on write.
fn parse_section_xml(xml: &str) -> Result<Section> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut attrs = String::new();
    let mut prefix = String::new();
    let mut suffix = String::new();
    let mut margins: Option<PageMargins> = None;
    let mut depth = 0u32;
    let mut into_prefix = false;
    let mut in_pgmar = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if depth == 0 {
                    attrs = attrs_string(e);
                } else if in_pgmar {
                    // w:pgMar has no content model
                } else if depth == 1 {
                    let local = local_name(e);
                    if local == "pgMar" {
                        margins = Some(parse_page_margins(e));
                        in_pgmar = true;
                    } else {
                        into_prefix = precedes_pgmar(&local);
                        let out = if into_prefix { &mut prefix } else { &mut suffix };
                        append_start(out, e);
                    }
                } else {
                    let out = if into_prefix { &mut prefix } else { &mut suffix };
                    append_start(out, e);
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 0 {
                    attrs = attrs_string(e);
                } else if in_pgmar {
                    // skip
                } else if depth == 1 {
                    let local = local_name(e);
                    if local == "pgMar" {
                        margins = Some(parse_page_margins(e));
                    } else {
                        let out = if precedes_pgmar(&local) {
                            &mut prefix
                        } else {
                            &mut suffix
                        };
                        append_empty(out, e);
                    }
                } else {
                    let out = if into_prefix { &mut prefix } else { &mut suffix };
                    append_empty(out, e);
                }
            }
            Ok(Event::Text(ref e)) => {
                if depth >= 2 && !in_pgmar {
                    let text = e.unescape().unwrap_or_default();
                    let out = if into_prefix { &mut prefix } else { &mut suffix };
                    out.push_str(&escape(text.as_ref()));
                }
            }
            Ok(Event::End(ref e)) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    // closed w:sectPr itself
                } else if in_pgmar {
                    if depth == 1 {
                        in_pgmar = false;
                    }
                } else {
                    let out = if into_prefix { &mut prefix } else { &mut suffix };
                    append_end(out, e);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(Section {
        attrs,
        prefix_xml: prefix,
        margins,
        suffix_xml: suffix,
    })
}

/// Parse a `w:pgMar` element into page margins.
///
/// Missing or non-numeric attributes fall back to Word's defaults.
fn parse_page_margins(e: &BytesStart) -> PageMargins {
    let mut margins = PageMargins::default();
    for attr in e.attributes().flatten() {
        let val = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"w:top" => {
                if let Ok(v) = val.parse() {
                    margins.top = v;
                }
            }
            b"w:bottom" => {
                if let Ok(v) = val.parse() {
                    margins.bottom = v;
                }
            }
            b"w:left" => {
                if let Ok(v) = val.parse() {
                    margins.left = v;
                }
            }
            b"w:right" => {
                if let Ok(v) = val.parse() {
                    margins.right = v;
                }
            }
            b"w:header" => {
                if let Ok(v) = val.parse() {
                    margins.header = v;
                }
            }
            b"w:footer" => {
                if let Ok(v) = val.parse() {
                    margins.footer = v;
                }
            }
            b"w:gutter" => {
                if let Ok(v) = val.parse() {
                    margins.gutter = v;
                }
            }
            _ => {}
        }
    }
    margins
}

/// Helper to get a boolean attribute value.
fn get_bool_attr(e: &BytesStart, key: &[u8]) -> Option<bool> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            let val = String::from_utf8_lossy(&attr.value);
            return Some(val != "0" && val != "false");
        }
    }
    None
}

/// Helper to get an attribute value.
fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}

/// The element's local name (prefix stripped) as a string.
fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().local_name().as_ref()).to_string()
}

/// The element's attributes re-serialized verbatim, each with a leading
/// space.
fn attrs_string(e: &BytesStart) -> String {
    let mut out = String::new();
    for attr in e.attributes().flatten() {
        out.push(' ');
        out.push_str(&String::from_utf8_lossy(attr.key.as_ref()));
        out.push_str("=\"");
        out.push_str(&String::from_utf8_lossy(&attr.value));
        out.push('"');
    }
    out
}

fn append_start(out: &mut String, e: &BytesStart) {
    out.push('<');
    out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
    out.push_str(&attrs_string(e));
    out.push('>');
}

fn append_empty(out: &mut String, e: &BytesStart) {
    out.push('<');
    out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
    out.push_str(&attrs_string(e));
    out.push_str("/>");
}

fn append_end(out: &mut String, e: &BytesEnd) {
    out.push_str("</");
    out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
    out.push('>');
}
