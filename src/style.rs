//! Placemark style reference derived from the residential group column.

use crate::error::{Error, Result};
use crate::table::{RESIDENTIAL_GROUP, Row};

pub const STYLE_PREFIX: &str = "#PolyStyle";

/// `" RS-1 "` -> `"#PolyStyleRS-1"`. A row without the column is an error.
pub fn resolve_style(row: &Row) -> Result<String> {
    let group = row
        .get(RESIDENTIAL_GROUP)
        .ok_or_else(|| Error::FieldMissing {
            placemark_id: row.placemark_id().unwrap_or_default().to_string(),
            field: RESIDENTIAL_GROUP,
        })?;
    Ok(format!("{}{}", STYLE_PREFIX, group.trim()))
}
