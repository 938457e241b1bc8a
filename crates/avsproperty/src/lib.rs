//! Typed hierarchical property trees with binary and XML codecs.
//!
//! A [`Property`] is a tree of typed [`Node`]s that can be serialized two
//! interchangeable ways: a compact binary format with bit-packed names and
//! a 32-bit aligned value stream, and an XML form that keeps the type
//! information in reserved attributes. Reads autodetect the format from the
//! first byte.
//!
//! # Example
//!
//! ```
//! use avsproperty::{Format, Property};
//!
//! let mut prop = Property::new("config")?;
//! let root = prop.root.as_mut().unwrap();
//! root.new_node_with_value("port", 5730u16)?;
//! root.new_node_with_value("host", "127.0.0.1")?;
//!
//! let mut binary = Vec::new();
//! prop.write(&mut binary)?;
//!
//! let mut decoded = Property::default();
//! decoded.read(&binary[..])?;
//! let root = decoded.root.as_ref().unwrap();
//! assert_eq!(root.search_child("port").unwrap().uint_value(), 5730);
//!
//! decoded.settings.format = Format::PrettyXml;
//! let mut xml = Vec::new();
//! decoded.write(&mut xml)?;
//! # Ok::<(), avsproperty::Error>(())
//! ```

mod binary;
mod bytes;
mod error;
mod name;
mod node;
mod property;
mod value;
mod xml;

pub mod encoding;
pub mod types;

pub use encoding::Encoding;
pub use error::{Error, Result};
pub use name::NodeName;
pub use node::{Attribute, Node};
pub use property::{Format, Property, Settings};
pub use types::{NodeType, ScalarKind};
pub use value::{BinValue, IntoValue, TimeValue, Value};
