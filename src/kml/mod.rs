//! KML document model: load into a tree, find the placemarks, write back.
//!
//! The tree keeps element order, attributes, text and CDATA as separate
//! node kinds so that re-serialising leaves untouched content unchanged.

pub mod parse;
pub mod tree;
pub mod write;

pub use parse::load_kml_file;
pub use tree::{KmlDocument, Node};
pub use write::write_kml_file;
