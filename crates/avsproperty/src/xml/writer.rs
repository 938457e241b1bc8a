//! XML document writer.
//!
//! Output is driven byte by byte: the pretty layout (four-space indents,
//! newline placement, close-tag indentation) is part of the format, so the
//! writer cannot delegate layout to a generic serializer. Escaping is
//! quick-xml's; user-visible strings are additionally transcoded through the
//! active encoding.

use std::io::Write;

use quick_xml::escape::escape;

use crate::encoding::Encoding;
use crate::node::Node;
use crate::property::{Format, Property};
use crate::types::TypeKind;
use crate::value::Value;
use crate::{Error, Result};

pub(crate) fn write<W: Write>(prop: &Property, root: &Node, wr: &mut W) -> Result<()> {
    let mut state = XmlWriter {
        wr,
        encoding: prop.settings.encoding,
        pretty: prop.settings.format == Format::PrettyXml,
        depth: 0,
    };
    state.write_declaration()?;
    state.write_node(root)
}

struct XmlWriter<'a, W: Write> {
    wr: &'a mut W,
    encoding: &'static Encoding,
    pretty: bool,
    depth: usize,
}

impl<W: Write> XmlWriter<'_, W> {
    fn write_declaration(&mut self) -> Result<()> {
        self.wr.write_all(b"<?xml version=\"1.0\"")?;
        if self.encoding.codepage() != 0 {
            write!(self.wr, " encoding=\"{}\"", self.encoding.name())?;
        }
        self.wr.write_all(b"?>")?;
        if self.pretty {
            self.wr.write_all(b"\n")?;
        }
        Ok(())
    }

    fn write_node(&mut self, node: &Node) -> Result<()> {
        if self.pretty {
            self.write_indent()?;
        }
        self.depth += 1;

        write!(self.wr, "<{}", node.name())?;
        self.write_reserved_attributes(node)?;
        for attr in node.attributes() {
            self.write_attribute(&attr.key().to_string(), &attr.value, true)?;
        }
        self.wr.write_all(b">")?;

        if node.node_type().kind() != TypeKind::Void {
            self.write_value(node)?;
        } else if self.pretty && !node.children().is_empty() {
            self.wr.write_all(b"\n")?;
        }

        for child in node.children() {
            self.write_node(child)?;
        }

        self.depth -= 1;
        if self.pretty && !node.children().is_empty() {
            self.write_indent()?;
        }
        write!(self.wr, "</{}>", node.name())?;
        if self.pretty {
            self.wr.write_all(b"\n")?;
        }
        Ok(())
    }

    fn write_reserved_attributes(&mut self, node: &Node) -> Result<()> {
        if node.node_type().kind() == TypeKind::Void {
            return Ok(());
        }

        self.write_attribute("__type", node.node_type().name(), false)?;
        if node.is_array() {
            self.write_attribute("__count", &node.array_length().to_string(), false)?;
        } else if node.node_type().kind() == TypeKind::Bin {
            self.write_attribute("__size", &node.binary_value().len().to_string(), false)?;
        }
        Ok(())
    }

    /// Write one attribute. Reserved values are ASCII by construction and
    /// are only escaped; user values are escaped and transcoded.
    fn write_attribute(&mut self, key: &str, value: &str, encode: bool) -> Result<()> {
        write!(self.wr, " {key}=\"")?;
        if encode {
            self.write_string(value)?;
        } else {
            self.wr.write_all(escape(value).as_bytes())?;
        }
        self.wr.write_all(b"\"")?;
        Ok(())
    }

    fn write_value(&mut self, node: &Node) -> Result<()> {
        let Some(value) = node.value() else {
            return Err(Error::NilValue);
        };
        match value {
            Value::Str(s) => self.write_string(s)?,
            Value::Bin(b) => {
                for byte in b {
                    write!(self.wr, "{byte:02x}")?;
                }
            }
            v => v.write_xml(self.wr)?,
        }
        Ok(())
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        // escaping first is equivalent: the escapes are ASCII, which every
        // supported charset maps transparently
        let escaped = escape(s);
        let bytes = self.encoding.encode(&escaped)?;
        self.wr.write_all(&bytes)?;
        Ok(())
    }

    fn write_indent(&mut self) -> Result<()> {
        for _ in 0..self.depth {
            self.wr.write_all(b"    ")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding;
    use crate::value::BinValue;

    fn write_prop(prop: &Property) -> String {
        let mut out = Vec::new();
        write(prop, prop.root.as_ref().unwrap(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_pretty_layout() {
        let mut prop = Property::new("root").unwrap();
        prop.settings.format = Format::PrettyXml;
        prop.settings.encoding = &encoding::UTF_8;
        let root = prop.root.as_mut().unwrap();
        root.new_node_with_value("a", 1u32).unwrap();
        root.new_node_with_value("b", "hi").unwrap();

        assert_eq!(
            write_prop(&prop),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <root>\n\
             \x20   <a __type=\"u32\">1</a>\n\
             \x20   <b __type=\"str\">hi</b>\n\
             </root>\n"
        );
    }

    #[test]
    fn test_compact_layout() {
        let mut prop = Property::new("root").unwrap();
        prop.settings.format = Format::Xml;
        let root = prop.root.as_mut().unwrap();
        root.new_node_with_value("a", 1u32).unwrap();

        assert_eq!(
            write_prop(&prop),
            "<?xml version=\"1.0\"?><root><a __type=\"u32\">1</a></root>"
        );
    }

    #[test]
    fn test_array_and_bin_markers() {
        let mut prop = Property::new("r").unwrap();
        prop.settings.format = Format::Xml;
        let root = prop.root.as_mut().unwrap();
        root.new_node_with_value("arr", vec![[1u8, 2, 3], [4, 5, 6]]).unwrap();
        root.new_node_with_value("bin", BinValue(vec![0xDE, 0xAD, 0xBE])).unwrap();

        assert_eq!(
            write_prop(&prop),
            "<?xml version=\"1.0\"?><r>\
             <arr __type=\"3u8\" __count=\"2\">1 2 3 4 5 6</arr>\
             <bin __type=\"bin\" __size=\"3\">deadbe</bin>\
             </r>"
        );
    }

    #[test]
    fn test_escaping_and_transcoding() {
        let mut prop = Property::new("r").unwrap();
        prop.settings.format = Format::Xml;
        let root = prop.root.as_mut().unwrap();
        root.set_attribute("k", "a<b&c\"d").unwrap();
        root.new_node_with_value("s", "x<y").unwrap();

        assert_eq!(
            write_prop(&prop),
            "<?xml version=\"1.0\"?>\
             <r k=\"a&lt;b&amp;c&quot;d\"><s __type=\"str\">x&lt;y</s></r>"
        );
    }

    #[test]
    fn test_latin1_output_bytes() {
        let mut prop = Property::new("r").unwrap();
        prop.settings.format = Format::Xml;
        prop.settings.encoding = &encoding::ISO_8859_1;
        let root = prop.root.as_mut().unwrap();
        root.new_node_with_value("s", "café").unwrap();

        let mut out = Vec::new();
        write(&prop, prop.root.as_ref().unwrap(), &mut out).unwrap();
        let tail = b"caf\xE9</s></r>";
        assert!(out.ends_with(tail));
    }

    #[test]
    fn test_void_leaf_and_nested_closing() {
        let mut prop = Property::new("r").unwrap();
        prop.settings.format = Format::PrettyXml;
        let root = prop.root.as_mut().unwrap();
        let mid = root.new_node("mid").unwrap();
        mid.new_node("leaf").unwrap();

        assert_eq!(
            write_prop(&prop),
            "<?xml version=\"1.0\"?>\n\
             <r>\n\
             \x20   <mid>\n\
             \x20       <leaf></leaf>\n\
             \x20   </mid>\n\
             </r>\n"
        );
    }

    #[test]
    fn test_nil_value_rejected() {
        let mut prop = Property::new("r").unwrap();
        prop.settings.format = Format::Xml;
        let root = prop.root.as_mut().unwrap();
        root.new_node_with_value("a", 1u8).unwrap();
        root.search_child_mut("a").unwrap().value = None;

        let mut out = Vec::new();
        assert!(matches!(
            write(&prop, prop.root.as_ref().unwrap(), &mut out),
            Err(Error::NilValue)
        ));
    }
}
