use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::{VerifactuError, format_amount};

pub type XmlResult = Result<String, VerifactuError>;

fn xml_io(e: std::io::Error) -> VerifactuError {
    VerifactuError::Xml(format!("write error: {e}"))
}

pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    /// Writer starting with an XML declaration.
    pub fn new() -> Result<Self, VerifactuError> {
        let mut w = Self::fragment();
        w.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(w)
    }

    /// Writer without declaration, for documents embedded in an envelope.
    pub fn fragment() -> Self {
        Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        }
    }

    pub fn into_string(self) -> XmlResult {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| VerifactuError::Xml(format!("UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, VerifactuError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, VerifactuError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, VerifactuError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, VerifactuError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Write `text` when present, nothing otherwise.
    pub fn opt_text_element(
        &mut self,
        name: &str,
        text: Option<&str>,
    ) -> Result<&mut Self, VerifactuError> {
        match text {
            Some(text) => self.text_element(name, text),
            None => Ok(self),
        }
    }

    /// Write a two-decimal amount.
    pub fn amount_element(&mut self, name: &str, amount: Decimal) -> Result<&mut Self, VerifactuError> {
        self.text_element(name, &format_amount(amount))
    }

    /// Write an `S`/`N` flag.
    pub fn flag_element(&mut self, name: &str, value: bool) -> Result<&mut Self, VerifactuError> {
        self.text_element(name, flag(value))
    }

    /// Insert already serialized markup as-is.
    pub fn raw(&mut self, markup: &str) -> Result<&mut Self, VerifactuError> {
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(markup)))
            .map_err(xml_io)?;
        Ok(self)
    }
}

/// AEAT boolean encoding.
pub fn flag(value: bool) -> &'static str {
    if value { "S" } else { "N" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn writes_elements() {
        let mut w = XmlWriter::fragment();
        w.start_element("a").unwrap();
        w.amount_element("b", dec!(21)).unwrap();
        w.flag_element("c", false).unwrap();
        w.opt_text_element("d", None).unwrap();
        w.text_element("e", "x & y").unwrap();
        w.end_element("a").unwrap();
        let xml = w.into_string().unwrap();
        assert!(xml.contains("<b>21.00</b>"));
        assert!(xml.contains("<c>N</c>"));
        assert!(!xml.contains("<d>"));
        assert!(xml.contains("<e>x &amp; y</e>"));
    }

    #[test]
    fn declaration() {
        let xml = XmlWriter::new().unwrap().into_string().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    }
}
