//! Binary document reader.

use super::{ARRAY_MASK, ATTRIBUTE_ID, END_ID, MAGIC, MAGIC_LONG, MAX_DEPTH, MAX_VALUE_SIZE,
            TRAVERSE_UP_ID};
use crate::bytes::ByteReader;
use crate::encoding::Encoding;
use crate::name::NodeName;
use crate::node::{Attribute, Node};
use crate::property::{Format, Property};
use crate::types::{self, TypeKind};
use crate::value::Value;
use crate::{Error, Result};

pub(crate) fn read(prop: &mut Property, data: &[u8]) -> Result<()> {
    prop.settings.format = Format::Binary;
    let mut rd = ByteReader::new(data);

    // header
    prop.settings.use_long_node_names = match rd.read_u16()? {
        MAGIC => false,
        MAGIC_LONG => true,
        _ => return Err(Error::InvalidMagic),
    };
    let codepage = rd.read_u8()?;
    if rd.read_u8()? != !codepage {
        return Err(Error::EncodingChecksum);
    }
    let encoding = Encoding::by_codepage(codepage >> 5).ok_or(Error::InvalidCodepage)?;
    prop.settings.encoding = encoding;

    let Some(mut root) = read_metadata(&mut rd)? else {
        return Ok(());
    };

    read_section_size(&mut rd)?;
    let mut body = DatabodyReader { rd, encoding, b8: &[], b16: &[] };
    body.read_node(&mut root)?;

    prop.root = Some(root);
    Ok(())
}

fn read_section_size(rd: &mut ByteReader<'_>) -> Result<usize> {
    let size = rd.read_u32()? as usize;
    if size % 4 != 0 {
        return Err(Error::SectionAlignment);
    }
    Ok(size)
}

/// Walk the metadata opcode stream and build the (value-less) tree.
///
/// The tree under construction lives on an explicit stack; a node joins its
/// parent when its `TraverseUp` arrives, so a failed read drops everything
/// built so far.
fn read_metadata(rd: &mut ByteReader<'_>) -> Result<Option<Node>> {
    let size = read_section_size(rd)?;
    let start = rd.position();

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let id = rd.read_u8()?;
        match id {
            END_ID => {
                if !stack.is_empty() {
                    return Err(Error::MalformedMetadata);
                }
                break;
            }
            TRAVERSE_UP_ID => {
                let Some(node) = stack.pop() else {
                    return Err(Error::MalformedMetadata);
                };
                match stack.last_mut() {
                    Some(parent) => {
                        parent.append_child(node);
                    }
                    None => root = Some(node),
                }
            }
            _ => {
                let name = NodeName::read_binary(rd)?;
                if id == ATTRIBUTE_ID {
                    let Some(node) = stack.last_mut() else {
                        return Err(Error::MalformedMetadata);
                    };
                    if node.attributes.iter().any(|a| a.key == name) {
                        return Err(Error::MalformedMetadata);
                    }
                    node.attributes.push(Attribute { key: name, value: String::new() });
                } else {
                    if stack.is_empty() && root.is_some() {
                        return Err(Error::MalformedMetadata);
                    }
                    if stack.len() >= MAX_DEPTH {
                        return Err(Error::MaxDepthExceeded);
                    }
                    let node_type =
                        types::by_id(id & !ARRAY_MASK).ok_or(Error::MalformedMetadata)?;
                    stack.push(Node::from_parts(name, node_type, id & ARRAY_MASK != 0));
                }
            }
        }
    }

    // the declared size covers the stream plus up to four bytes of padding
    let consumed = rd.position() - start;
    if consumed > size || size - consumed > 4 {
        return Err(Error::MalformedMetadata);
    }
    rd.read_bytes(size - consumed)?;

    Ok(root)
}

struct DatabodyReader<'a> {
    rd: ByteReader<'a>,
    encoding: &'static Encoding,
    /// Partially consumed 4-byte slot for 1-byte scalars.
    b8: &'a [u8],
    /// Partially consumed 4-byte slot for 2-byte scalars.
    b16: &'a [u8],
}

impl<'a> DatabodyReader<'a> {
    /// Fill in values and attribute strings, preorder.
    fn read_node(&mut self, node: &mut Node) -> Result<()> {
        if node.node_type.kind() != TypeKind::Void {
            self.read_value(node)?;
        }
        for attr in &mut node.attributes {
            attr.value = self.read_string()?;
        }
        for child in &mut node.children {
            self.read_node(child)?;
        }
        Ok(())
    }

    fn read_value(&mut self, node: &mut Node) -> Result<()> {
        let value = match node.node_type.kind() {
            TypeKind::Void => return Ok(()),
            TypeKind::Str => Value::Str(self.read_string()?),
            TypeKind::Bin => Value::Bin(self.read_array()?.to_vec()),
            TypeKind::Scalar(kind) => {
                let data = if node.is_array {
                    let data = self.read_array()?;
                    if data.len() % node.node_type.size() != 0 {
                        return Err(Error::MalformedDatabody);
                    }
                    data
                } else {
                    self.read_aligned(node.node_type.size())?
                };
                Value::decode_scalars(kind, data)?
            }
        };
        node.value = Some(value);
        Ok(())
    }

    /// Read `size` bytes and consume the padding up to the 4-byte boundary.
    fn read32(&mut self, size: usize) -> Result<&'a [u8]> {
        let aligned = size + (4 - size % 4) % 4;
        Ok(&self.rd.read_bytes(aligned)?[..size])
    }

    /// Read a length-prefixed, padded run of bytes.
    fn read_array(&mut self) -> Result<&'a [u8]> {
        let size = self.rd.read_u32()? as usize;
        if size > MAX_VALUE_SIZE {
            return Err(Error::MalformedDatabody);
        }
        self.read32(size)
    }

    /// Read a length-prefixed, NUL-terminated, encoded string.
    fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_array()?;
        if bytes.is_empty() {
            return Err(Error::MalformedDatabody);
        }
        Ok(self.encoding.decode(&bytes[..bytes.len() - 1]))
    }

    fn refill(rd: &mut ByteReader<'a>, slot: &mut &'a [u8]) -> Result<()> {
        if slot.is_empty() {
            *slot = rd.read_bytes(4)?;
        }
        Ok(())
    }

    /// Read a scalar from the aligned value stream. Sizes 1 and 2 come out
    /// of the recycled slots; anything larger is read in place.
    fn read_aligned(&mut self, size: usize) -> Result<&'a [u8]> {
        match size {
            1 => {
                Self::refill(&mut self.rd, &mut self.b8)?;
                let (value, rest) = self.b8.split_at(1);
                self.b8 = rest;
                Ok(value)
            }
            2 => {
                Self::refill(&mut self.rd, &mut self.b16)?;
                let (value, rest) = self.b16.split_at(2);
                self.b16 = rest;
                Ok(value)
            }
            _ => self.read32(size),
        }
    }
}
