//! Binary document writer.

use std::io::Write;

use super::{ARRAY_MASK, ATTRIBUTE_ID, END_ID, MAGIC, MAGIC_LONG, MAX_VALUE_SIZE, TRAVERSE_UP_ID};
use crate::encoding::Encoding;
use crate::node::Node;
use crate::property::Property;
use crate::types::TypeKind;
use crate::value::Value;
use crate::{Error, Result};

pub(crate) fn write<W: Write>(prop: &Property, root: &Node, wr: &mut W) -> Result<()> {
    write_header(prop, wr)?;
    write_metadata(root, wr)?;

    let mut body = Databody {
        buf: Vec::new(),
        slot8: 0,
        slot16: 0,
        encoding: prop.settings.encoding,
    };
    body.write_node(root)?;

    wr.write_all(&(body.buf.len() as u32).to_be_bytes())?;
    wr.write_all(&body.buf)?;
    Ok(())
}

fn write_header<W: Write>(prop: &Property, wr: &mut W) -> Result<()> {
    let magic = if prop.settings.use_long_node_names { MAGIC_LONG } else { MAGIC };
    let codepage = prop.settings.encoding.codepage() << 5;
    wr.write_all(&magic.to_be_bytes())?;
    wr.write_all(&[codepage, !codepage])?;
    Ok(())
}

/// First pass: the metadata byte count, padded to four.
fn metadata_size(root: &Node) -> (usize, usize) {
    fn visit(node: &Node, n: &mut usize) {
        // id, traverse-up, length byte, packed name
        *n += 3 + node.name().packed_size();
        for attr in node.attributes() {
            *n += 2 + attr.key().packed_size();
        }
        for child in node.children() {
            visit(child, n);
        }
    }

    let mut n = 0;
    visit(root, &mut n);
    n += 1; // end marker
    let padding = (4 - n % 4) % 4;
    (n + padding, padding)
}

fn write_metadata<W: Write>(root: &Node, wr: &mut W) -> Result<()> {
    let (size, padding) = metadata_size(root);
    wr.write_all(&(size as u32).to_be_bytes())?;

    write_metadata_node(root, wr)?;
    wr.write_all(&[END_ID])?;
    wr.write_all(&[0u8; 3][..padding])?;
    Ok(())
}

fn write_metadata_node<W: Write>(node: &Node, wr: &mut W) -> Result<()> {
    let mut id = node.node_type().id();
    if node.is_array() {
        id |= ARRAY_MASK;
    }
    wr.write_all(&[id])?;
    node.name().write_binary(wr)?;

    for attr in node.attributes() {
        wr.write_all(&[ATTRIBUTE_ID])?;
        attr.key().write_binary(wr)?;
    }

    for child in node.children() {
        write_metadata_node(child, wr)?;
    }
    wr.write_all(&[TRAVERSE_UP_ID])?;
    Ok(())
}

/// The databody accumulator with the aligned slot allocator.
///
/// 1- and 2-byte scalars consume a shared 4-byte slot each until it runs
/// out; larger values are appended and padded to the next boundary. The
/// layout must match the reader's refill buffers byte for byte.
struct Databody {
    buf: Vec<u8>,
    slot8: usize,
    slot16: usize,
    encoding: &'static Encoding,
}

impl Databody {
    fn pad(&mut self) {
        let r = self.buf.len() % 4;
        if r != 0 {
            self.buf.resize(self.buf.len() + 4 - r, 0);
        }
    }

    fn append32(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.pad();
    }

    /// Reserve `size` zeroed bytes plus boundary padding; returns the offset
    /// of the reservation.
    fn allocate32(&mut self, size: usize) -> usize {
        let offset = self.buf.len();
        self.buf.resize(offset + size, 0);
        self.pad();
        offset
    }

    /// Reserve room for one scalar, recycling slots for sizes 1 and 2.
    fn allocate(&mut self, size: usize) -> usize {
        match size {
            1 => {
                if self.slot8 % 4 == 0 {
                    self.slot8 = self.buf.len();
                    self.allocate32(4);
                }
                let offset = self.slot8;
                self.slot8 += 1;
                offset
            }
            2 => {
                if self.slot16 % 4 == 0 {
                    self.slot16 = self.buf.len();
                    self.allocate32(4);
                }
                let offset = self.slot16;
                self.slot16 += 2;
                offset
            }
            _ => self.allocate32(size),
        }
    }

    fn append_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        let mut bytes = self.encoding.encode(s)?.into_owned();
        bytes.push(0);
        self.append_u32(bytes.len() as u32);
        self.append32(&bytes);
        Ok(())
    }

    fn write_value(&mut self, node: &Node, value: &Value) -> Result<()> {
        let size = node.array_length() * node.node_type().size();
        if size > MAX_VALUE_SIZE {
            return Err(node.err(format!("value too large: {size}")));
        }

        match value {
            Value::Str(s) => self.write_string(s)?,
            Value::Bin(b) => {
                self.append_u32(b.len() as u32);
                self.append32(b);
            }
            v if node.is_array() => {
                self.append_u32(size as u32);
                let offset = self.allocate32(size);
                v.encode_scalars(&mut self.buf[offset..offset + size]);
            }
            v => {
                let size = node.node_type().size();
                let offset = self.allocate(size);
                v.encode_scalars(&mut self.buf[offset..offset + size]);
            }
        }
        Ok(())
    }

    fn write_node(&mut self, node: &Node) -> Result<()> {
        if node.node_type().kind() != TypeKind::Void {
            let Some(value) = node.value() else {
                return Err(node.err("node contains a nil value"));
            };
            self.write_value(node, value)?;
        }

        for attr in node.attributes() {
            self.write_string(&attr.value)?;
        }

        for child in node.children() {
            self.write_node(child)?;
        }
        Ok(())
    }
}
