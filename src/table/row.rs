use serde::Serialize;
use std::collections::BTreeMap;

/// Column carrying the identifier matched against `<Placemark id="...">`.
pub const PLACEMARK_ID: &str = "Placemark ID";

/// Column the placemark style reference is derived from.
pub const RESIDENTIAL_GROUP: &str = "Proposed Residential Group";

/// A single data line of the table, column name -> cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, String>);

impl Row {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn placemark_id(&self) -> Option<&str> {
        self.get(PLACEMARK_ID)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Rows in source order. Ids are not required to be unique.
#[derive(Debug, Clone, Default)]
pub struct RowTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// First row whose placemark id equals `id` exactly.
    pub fn find_by_placemark_id(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.placemark_id() == Some(id))
    }
}
