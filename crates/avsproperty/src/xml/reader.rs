//! XML document reader.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::encoding::{self, Encoding};
use crate::node::Node;
use crate::property::{Format, Property};
use crate::types::{self, TypeKind};
use crate::value::Value;
use crate::{Error, Result};

pub(crate) fn read(prop: &mut Property, data: &[u8]) -> Result<()> {
    prop.settings.format = Format::Xml;
    prop.settings.encoding = &encoding::UTF_8;

    if let Some(label) = declared_encoding(data)? {
        prop.settings.encoding = Encoding::by_name(&label).ok_or(Error::EncodingNotFound)?;
    }

    let text = prop.settings.encoding.decode(data);
    prop.root = parse(&text)?;
    Ok(())
}

/// Pull the encoding label out of the XML declaration, if any. All supported
/// charsets are ASCII-compatible, so reading the declaration before
/// transcoding is safe.
fn declared_encoding(data: &[u8]) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => match decl.encoding() {
            Some(Ok(label)) => Ok(Some(String::from_utf8_lossy(&label).into_owned())),
            Some(Err(e)) => Err(Error::Xml(e.to_string())),
            None => Ok(None),
        },
        _ => Ok(None),
    }
}

struct XmlReader {
    /// Nodes whose end tag has not arrived yet; the last entry is current.
    stack: Vec<Node>,
    root: Option<Node>,
    /// Element count declared by the current `__count` attribute.
    count: usize,
}

fn parse(text: &str) -> Result<Option<Node>> {
    let mut reader = Reader::from_str(text);
    let mut state = XmlReader { stack: Vec::new(), root: None, count: 1 };

    loop {
        match reader.read_event() {
            Err(e) => return Err(Error::Xml(e.to_string())),
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => state.start_element(&e)?,
            Ok(Event::Empty(e)) => {
                state.start_element(&e)?;
                state.end_element();
            }
            Ok(Event::End(_)) => state.end_element(),
            Ok(Event::Text(e)) => {
                if !state.stack.is_empty() {
                    let text = e.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                    state.char_data(&text)?;
                }
            }
            Ok(Event::CData(e)) => {
                if !state.stack.is_empty() {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    state.char_data(&text)?;
                }
            }
            // the declaration was handled up front; other instructions,
            // comments, and doctypes are not part of the data model
            Ok(_) => {}
        }
    }

    Ok(state.root)
}

impl XmlReader {
    fn start_element(&mut self, elem: &BytesStart<'_>) -> Result<()> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(Error::Xml("root already set".into()));
        }

        let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
        let mut node = Node::new(&name)?;

        for attr in elem.attributes() {
            let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| Error::Xml(e.to_string()))?;
            self.attribute(&mut node, &key, &value)?;
        }

        self.stack.push(node);
        Ok(())
    }

    fn end_element(&mut self) {
        let Some(node) = self.stack.pop() else { return };
        match self.stack.last_mut() {
            Some(parent) => {
                parent.append_child(node);
            }
            None => self.root = Some(node),
        }
    }

    fn attribute(&mut self, node: &mut Node, key: &str, value: &str) -> Result<()> {
        match key {
            "__type" => {
                let node_type = types::by_name(value)
                    .ok_or_else(|| node.err(format!("invalid node type: {value}")))?;
                node.node_type = node_type;

                // these types support empty values
                match node_type.kind() {
                    TypeKind::Str => node.value = Some(Value::Str(String::new())),
                    TypeKind::Bin => node.value = Some(Value::Bin(Vec::new())),
                    _ => {}
                }
            }
            "__count" => {
                match node.node_type.kind() {
                    TypeKind::Void | TypeKind::Str | TypeKind::Bin => {
                        return Err(node.err("__count attribute out of place"));
                    }
                    TypeKind::Scalar(_) => {}
                }
                self.count = value.parse()?;
                node.is_array = true;
            }
            "__size" => {
                // informational only, but it must sit on a binary node
                if node.node_type.kind() != TypeKind::Bin {
                    return Err(node.err("__size attribute out of place"));
                }
            }
            _ => node.set_attribute(key, value)?,
        }
        Ok(())
    }

    fn char_data(&mut self, text: &str) -> Result<()> {
        let node = match self.stack.last_mut() {
            Some(node) => node,
            None => return Ok(()),
        };

        match node.node_type.kind() {
            TypeKind::Void => {
                if text.trim().is_empty() {
                    return Ok(());
                }
                // untyped elements with real text promote to strings
                node.node_type = &types::STR;
                node.value = Some(Value::Str(text.to_owned()));
            }
            TypeKind::Str => node.value = Some(Value::Str(text.to_owned())),
            TypeKind::Bin => node.value = Some(Value::Bin(decode_hex(text.trim())?)),
            TypeKind::Scalar(kind) => {
                let text = text.trim();
                let arity = node.node_type.count();
                if node.is_array {
                    let tokens: Vec<&str> = text.split(' ').collect();
                    if tokens.len() != arity * self.count {
                        return Err(node.err("invalid number of elements in value"));
                    }
                    node.value = Some(Value::parse_scalars(kind, &tokens)?);
                } else if arity > 1 {
                    let tokens: Vec<&str> = text.split(' ').collect();
                    if tokens.len() != arity {
                        return Err(Error::VectorElementCount);
                    }
                    node.value = Some(Value::parse_scalars(kind, &tokens)?);
                } else {
                    node.value = Some(Value::parse_scalars(kind, &[text])?);
                }
            }
        }
        Ok(())
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    fn digit(b: u8) -> Result<u8> {
        match b {
            b'0'..=b'9' => Ok(b - b'0'),
            b'a'..=b'f' => Ok(b - b'a' + 10),
            b'A'..=b'F' => Ok(b - b'A' + 10),
            _ => Err(Error::InvalidHex),
        }
    }

    let bytes = text.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(Error::InvalidHex);
    }
    bytes.chunks_exact(2).map(|pair| Ok(digit(pair[0])? << 4 | digit(pair[1])?)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn read_xml(text: &str) -> Result<Property> {
        let mut prop = Property::default();
        read(&mut prop, text.as_bytes())?;
        Ok(prop)
    }

    fn root(prop: &Property) -> &Node {
        prop.root.as_ref().unwrap()
    }

    #[test]
    fn test_typed_values() {
        let prop = read_xml(
            r#"<?xml version="1.0" encoding="UTF-8"?><root><a __type="u32">1</a><b __type="str">hi</b></root>"#,
        )
        .unwrap();

        assert_eq!(prop.settings.encoding, &encoding::UTF_8);
        let root = root(&prop);
        assert_eq!(root.search_child("a").unwrap().uint_value(), 1);
        assert_eq!(root.search_child("b").unwrap().string_value(), "hi");
    }

    #[test]
    fn test_vector_and_array_counts() {
        let prop = read_xml(r#"<r __type="3u8" __count="2">1 2 3 4 5 6</r>"#).unwrap();
        let root = root(&prop);
        assert!(root.is_array());
        assert_eq!(root.array_length(), 2);
        assert_eq!(root.value(), Some(&Value::U8(vec![1, 2, 3, 4, 5, 6])));

        let err = read_xml(r#"<r __type="3u8" __count="2">1 2 3 4 5</r>"#).unwrap_err();
        assert!(err.to_string().contains("invalid number of elements"));

        let err = read_xml(r#"<r __type="3u8">1 2</r>"#).unwrap_err();
        assert!(matches!(err, Error::VectorElementCount));
    }

    #[test]
    fn test_untyped_text_promotes_to_str() {
        let prop = read_xml("<r>  hello world  </r>").unwrap();
        let root_node = root(&prop);
        assert_eq!(root_node.node_type(), &types::STR);
        // promotion keeps the text exactly as written
        assert_eq!(root_node.string_value(), "  hello world  ");

        let prop = read_xml("<r>   \n  </r>").unwrap();
        assert_eq!(root(&prop).node_type(), &types::VOID);
    }

    #[test]
    fn test_empty_str_and_bin() {
        let prop = read_xml(r#"<r><s __type="str"></s><b __type="bin" __size="0"></b></r>"#).unwrap();
        let root = root(&prop);
        assert_eq!(root.search_child("s").unwrap().value(), Some(&Value::Str(String::new())));
        assert_eq!(root.search_child("b").unwrap().value(), Some(&Value::Bin(Vec::new())));
    }

    #[test]
    fn test_bin_hex() {
        let prop = read_xml(r#"<r __type="bin" __size="3">deadbe</r>"#).unwrap();
        assert_eq!(root(&prop).binary_value(), &[0xDE, 0xAD, 0xBE]);

        assert!(matches!(
            read_xml(r#"<r __type="bin">xyz1</r>"#),
            Err(Error::InvalidHex)
        ));
    }

    #[test]
    fn test_reserved_attribute_placement() {
        let err = read_xml(r#"<r __type="str" __count="2">x</r>"#).unwrap_err();
        assert!(err.to_string().contains("__count attribute out of place"));

        // __count before __type finds the node still void
        let err = read_xml(r#"<r __count="2" __type="u8">1 2</r>"#).unwrap_err();
        assert!(err.to_string().contains("__count attribute out of place"));

        let err = read_xml(r#"<r __type="u8" __size="1">1</r>"#).unwrap_err();
        assert!(err.to_string().contains("__size attribute out of place"));

        let err = read_xml(r#"<r __type="nope">1</r>"#).unwrap_err();
        assert!(err.to_string().contains("invalid node type: nope"));
    }

    #[test]
    fn test_user_attributes() {
        let prop = read_xml(r#"<r key="va&lt;l" other="2"><c/></r>"#).unwrap();
        let root = root(&prop);
        assert_eq!(root.attribute_value("key"), "va<l");
        assert_eq!(root.attribute_value("other"), "2");
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn test_scalar_types() {
        let prop = read_xml(
            r#"<r><i __type="s16">-300</i><f __type="float">1.5</f><ip __type="ip4">10.0.0.1</ip><t __type="time">77</t><y __type="bool">1</y></r>"#,
        )
        .unwrap();
        let root = root(&prop);
        assert_eq!(root.search_child("i").unwrap().int_value(), -300);
        assert_eq!(root.search_child("f").unwrap().value(), Some(&Value::Float(vec![1.5])));
        assert_eq!(
            root.search_child("ip").unwrap().value(),
            Some(&Value::Ip4(vec![Ipv4Addr::new(10, 0, 0, 1)]))
        );
        assert_eq!(root.search_child("t").unwrap().value(), Some(&Value::Time(vec![77])));
        assert_eq!(root.search_child("y").unwrap().value(), Some(&Value::Bool(vec![true])));
    }

    #[test]
    fn test_declared_encoding() {
        let sjis = SHIFT_JIS_DOC;
        let mut prop = Property::default();
        read(&mut prop, sjis).unwrap();
        assert_eq!(prop.settings.encoding, &encoding::SHIFT_JIS);
        assert_eq!(prop.root.as_ref().unwrap().string_value(), "あ");

        assert!(matches!(
            read_xml(r#"<?xml version="1.0" encoding="KOI8-R"?><r/>"#),
            Err(Error::EncodingNotFound)
        ));
    }

    // <?xml version="1.0" encoding="SHIFT_JIS"?><r __type="str">あ</r>
    const SHIFT_JIS_DOC: &[u8] = &[
        0x3C, 0x3F, 0x78, 0x6D, 0x6C, 0x20, 0x76, 0x65, 0x72, 0x73, 0x69, 0x6F, 0x6E, 0x3D,
        0x22, 0x31, 0x2E, 0x30, 0x22, 0x20, 0x65, 0x6E, 0x63, 0x6F, 0x64, 0x69, 0x6E, 0x67,
        0x3D, 0x22, 0x53, 0x48, 0x49, 0x46, 0x54, 0x5F, 0x4A, 0x49, 0x53, 0x22, 0x3F, 0x3E,
        0x3C, 0x72, 0x20, 0x5F, 0x5F, 0x74, 0x79, 0x70, 0x65, 0x3D, 0x22, 0x73, 0x74, 0x72,
        0x22, 0x3E, 0x82, 0xA0, 0x3C, 0x2F, 0x72, 0x3E,
    ];

    #[test]
    fn test_second_root_rejected() {
        let err = read_xml("<a/><b/>").unwrap_err();
        assert!(err.to_string().contains("root already set"));
    }

    #[test]
    fn test_invalid_tag_name() {
        assert!(matches!(read_xml("<bad-name/>"), Err(Error::InvalidNameCharacter)));
    }
}
