//! The top-level property document.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::encoding::{self, Encoding};
use crate::node::Node;
use crate::{binary, xml, Error, Result};

/// Serialization format of a property document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// The compact binary format.
    #[default]
    Binary,
    /// XML without any insignificant whitespace.
    Xml,
    /// XML indented four spaces per level.
    PrettyXml,
}

/// How a property should be serialized.
///
/// After a read, every field reflects what was detected in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub format: Format,
    pub encoding: &'static Encoding,
    /// Selects the long-name header magic. The wire form of names is
    /// unchanged; readers pick the flag up from the magic.
    pub use_long_node_names: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings { format: Format::Binary, encoding: &encoding::NONE, use_long_node_names: false }
    }
}

/// A property document: serialization settings plus an optional tree.
#[derive(Debug, Clone, Default)]
pub struct Property {
    pub settings: Settings,
    pub root: Option<Node>,
}

impl Property {
    /// Create a property with default settings and a void root node.
    pub fn new(root: &str) -> Result<Property> {
        Ok(Property { settings: Settings::default(), root: Some(Node::new(root)?) })
    }

    /// Read a document, autodetecting the format from the first byte:
    /// `0xA0` is binary, `<` is XML. The settings are replaced by the
    /// detected ones, and the previous root is discarded up front; a failed
    /// read never leaves a partial tree behind.
    pub fn read<R: Read>(&mut self, mut rd: R) -> Result<()> {
        self.root = None;

        let mut data = Vec::new();
        rd.read_to_end(&mut data)?;

        match data.first() {
            Some(&b) if b == (binary::MAGIC >> 8) as u8 => binary::read(self, &data),
            Some(&b'<') => xml::read(self, &data),
            _ => Err(Error::UnknownFormat),
        }
    }

    /// Serialize the document in the format selected by the settings.
    pub fn write<W: Write>(&self, wr: W) -> Result<()> {
        let root = self.root.as_ref().ok_or(Error::EmptyProperty)?;

        let mut wr = BufWriter::new(wr);
        match self.settings.format {
            Format::Binary => binary::write(self, root, &mut wr)?,
            Format::Xml | Format::PrettyXml => xml::write(self, root, &mut wr)?,
        }
        wr.flush()?;
        Ok(())
    }

    /// Read a document from a file.
    pub fn read_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.read(File::open(path)?)
    }

    /// Write the document to a file.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write(File::create(path)?)
    }

    /// The active encoding.
    pub fn encoding(&self) -> &'static Encoding {
        self.settings.encoding
    }
}
