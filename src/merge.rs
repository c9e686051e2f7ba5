//! Match placemarks to table rows and write the rendered descriptions in.

use crate::error::Result;
use crate::kml::{KmlDocument, Node};
use crate::style::resolve_style;
use crate::table::RowTable;
use crate::template::Template;
use serde::Serialize;

/// Description given to placemarks without a table row.
pub const NO_DATA_DESCRIPTION: &str = "No Data";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub rows: usize,
    pub placemarks: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Ids of placemarks that got the fallback description, in document
    /// order. A placemark without an id shows up as "".
    pub unmatched_ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub summary: MergeSummary,
    /// HTML rendered for the last matched placemark, if any.
    pub last_rendered: Option<String>,
}

/// For each placemark, find the first row with the same id:
/// - match: `description` <- CDATA of the rendered template,
///   `styleUrl` <- style reference of the row
/// - miss: `description` <- CDATA of [`NO_DATA_DESCRIPTION`]
///
/// A miss is not an error. A matched row lacking the style column is.
pub fn merge_placemarks(
    doc: &mut KmlDocument,
    table: &RowTable,
    template: &Template,
) -> Result<MergeOutcome> {
    let placemarks = doc.placemarks_mut()?;

    let mut outcome = MergeOutcome {
        summary: MergeSummary {
            rows: table.len(),
            placemarks: placemarks.len(),
            ..MergeSummary::default()
        },
        last_rendered: None,
    };

    for placemark in placemarks {
        let id = placemark.attr("id").map(str::to_string);
        let row = id.as_deref().and_then(|id| table.find_by_placemark_id(id));

        match row {
            Some(row) => {
                let html = template.render(row);
                let style = resolve_style(row)?;
                tracing::debug!(?row, %style, "matched placemark");

                placemark.set_child_content("description", Node::CData(html.clone()));
                placemark.set_child_content("styleUrl", Node::Text(style));

                outcome.last_rendered = Some(html);
                outcome.summary.matched += 1;
            }
            None => {
                if id.is_none() {
                    let name = placemark.child("name").map(|n| n.text()).unwrap_or_default();
                    tracing::warn!(%name, "placemark has no id attribute");
                }
                placemark.set_child_content(
                    "description",
                    Node::CData(NO_DATA_DESCRIPTION.to_string()),
                );
                outcome.summary.unmatched += 1;
                outcome.summary.unmatched_ids.push(id.unwrap_or_default());
            }
        }
    }

    Ok(outcome)
}
