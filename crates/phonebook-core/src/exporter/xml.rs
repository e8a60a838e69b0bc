//! Small wrapper around `quick_xml::Writer` shared by the vendor exporters

use crate::error::{Error, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

const INDENT_SIZE: usize = 4;

fn xml_err(e: impl std::fmt::Display) -> Error {
    Error::export(format!("XML write failed: {}", e))
}

/// Indented XML document being written into memory
pub(crate) struct XmlDocument {
    writer: Writer<Vec<u8>>,
}

impl XmlDocument {
    /// Start a document with an XML declaration
    pub fn new() -> Result<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_err)?;
        Ok(Self { writer })
    }

    pub fn open(&mut self, tag: &str) -> Result<()> {
        self.writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .map_err(xml_err)
    }

    pub fn close(&mut self, tag: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(xml_err)
    }

    /// `<tag>text</tag>` with `text` escaped
    pub fn text_element(&mut self, tag: &str, text: &str) -> Result<()> {
        self.open(tag)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_err)?;
        self.close(tag)
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}
