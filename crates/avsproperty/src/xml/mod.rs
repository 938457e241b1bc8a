//! The XML document format.
//!
//! XML documents carry the same type information as the binary format
//! through three reserved attributes: `__type` names the node type,
//! `__count` marks arrays with their element count, and `__size` annotates
//! binary values. Everything else is ordinary elements, text, and
//! attributes.

mod reader;
mod writer;

pub(crate) use reader::read;
pub(crate) use writer::write;
