use crate::error::{Error, Result};
use crate::table::row::{Row, RowTable};
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;

/// Read a comma-separated table with a header line into rows.
///
/// Rows shorter than the header are padded with empty cells; cells past the
/// header width are dropped. Every row ends up with the header's columns.
pub fn load_table_file(path: impl AsRef<Path>) -> Result<RowTable> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    parse_table(path, &bytes)
}

/// Cells must be UTF-8; anything else is a malformed table.
pub(crate) fn parse_table(path: &Path, bytes: &[u8]) -> Result<RowTable> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    let csv_err = |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;

        if record.len() > headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            tracing::warn!(
                path = %path.display(),
                line,
                cells = record.len(),
                columns = headers.len(),
                "dropping cells past the header width"
            );
        }

        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, column)| (column.as_str(), record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    Ok(RowTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::row::{PLACEMARK_ID, RESIDENTIAL_GROUP};
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> RowTable {
        parse_table(Path::new("test.csv"), text.as_bytes()).unwrap()
    }

    #[test]
    fn one_row_per_data_line_with_header_columns() {
        let table = parse(
            "Placemark ID,Proposed Residential Group,Notes\n\
             1,RS-1,plain\n\
             2, RM-2 ,\"quoted, with comma\"\n\
             3,RS-3,\"two\nlines\"\n",
        );

        assert_eq!(
            table.headers,
            vec![PLACEMARK_ID, RESIDENTIAL_GROUP, "Notes"]
        );
        assert_eq!(
            table.rows,
            vec![
                Row::from_iter([(PLACEMARK_ID, "1"), (RESIDENTIAL_GROUP, "RS-1"), ("Notes", "plain")]),
                Row::from_iter([
                    (PLACEMARK_ID, "2"),
                    (RESIDENTIAL_GROUP, " RM-2 "),
                    ("Notes", "quoted, with comma"),
                ]),
                Row::from_iter([(PLACEMARK_ID, "3"), (RESIDENTIAL_GROUP, "RS-3"), ("Notes", "two\nlines")]),
            ]
        );
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let table = parse("a,b,c\n1\n1,2,3,4,5\n");

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], Row::from_iter([("a", "1"), ("b", ""), ("c", "")]));
        assert_eq!(table.rows[1], Row::from_iter([("a", "1"), ("b", "2"), ("c", "3")]));
    }

    #[test]
    fn bom_and_blank_lines_are_ignored() {
        let table = parse("\u{feff}Placemark ID,x\n\n42,y\n\n");

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].placemark_id(), Some("42"));
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let table = parse("Placemark ID,Proposed Residential Group\n");
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table_file(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "{err:?}");
    }

    #[test]
    fn invalid_utf8_is_a_malformed_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, b"a,b\n\xff,1\n").unwrap();
        let err = load_table_file(&path).unwrap_err();
        assert!(matches!(err, Error::Csv { .. }), "{err:?}");
    }

    #[test]
    fn invalid_utf8_header_is_a_malformed_table() {
        let err = parse_table(Path::new("test.csv"), b"a,\xfe\n1,2\n").unwrap_err();
        assert!(matches!(err, Error::Csv { .. }), "{err:?}");
    }
}
