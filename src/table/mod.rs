//! Metadata table: one row per land-use area, keyed by placemark id.

pub mod load;
pub mod row;

pub use load::load_table_file;
pub use row::{RESIDENTIAL_GROUP, Row, RowTable};
