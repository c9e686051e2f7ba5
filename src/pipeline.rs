//! The whole run: table, document, template, merge, then the writes.

use crate::kml;
use crate::merge::{self, MergeSummary};
use crate::output;
use crate::table;
use crate::template;
use anyhow::Context;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub csv: PathBuf,
    pub kml: PathBuf,
    pub template: PathBuf,
    pub out: PathBuf,
    /// Where the last rendered description is copied; `None` skips it.
    pub template_out: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

/// Each step completes before the next one starts. Nothing is written until
/// the merge has succeeded.
pub fn run(config: &Config) -> anyhow::Result<MergeSummary> {
    // 1) Table.
    let rows = table::load_table_file(&config.csv)
        .with_context(|| format!("load table {}", config.csv.display()))?;
    tracing::info!(
        rows = rows.len(),
        columns = rows.headers.len(),
        path = %config.csv.display(),
        "table loaded"
    );

    // 2) Document.
    let mut doc = kml::load_kml_file(&config.kml)
        .with_context(|| format!("load document {}", config.kml.display()))?;
    tracing::info!(path = %config.kml.display(), "document loaded");

    // 3) Template, compiled once for every row.
    let template = template::load_template_file(&config.template)
        .with_context(|| format!("load template {}", config.template.display()))?;

    // 4) Merge.
    let outcome = merge::merge_placemarks(&mut doc, &rows, &template)
        .with_context(|| format!("merge placemarks of {}", config.kml.display()))?;
    let summary = outcome.summary;
    tracing::info!(
        placemarks = summary.placemarks,
        matched = summary.matched,
        unmatched = summary.unmatched,
        "placemarks merged"
    );

    // 5) Debug copy of the last rendered description. Failure is not fatal.
    if let (Some(path), Some(html)) = (&config.template_out, &outcome.last_rendered) {
        match output::write_plain(path, html.as_bytes()) {
            Ok(()) => tracing::info!(path = %path.display(), "example markup written"),
            Err(err) => tracing::warn!(%err, "could not write example markup"),
        }
    }

    // 6) Output document.
    kml::write_kml_file(&config.out, &doc)
        .with_context(|| format!("write document {}", config.out.display()))?;
    tracing::info!(path = %config.out.display(), "document written");

    if let Some(path) = &config.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        output::write_atomically(path, json.as_bytes())
            .with_context(|| format!("write summary {}", path.display()))?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::NO_DATA_DESCRIPTION;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;

    const KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Land use</name>
    <Style id="PolyStyleRS-1"><PolyStyle><color>ff0000ff</color></PolyStyle></Style>
    <Folder>
      <name>Areas</name>
      <Placemark id="42">
        <name>Area 42</name>
        <styleUrl>#PolyStyle00</styleUrl>
        <Polygon><outerBoundaryIs><LinearRing><coordinates>1,2,0 3,4,0 1,2,0</coordinates></LinearRing></outerBoundaryIs></Polygon>
      </Placemark>
      <Placemark id="99">
        <name>Area 99</name>
      </Placemark>
    </Folder>
  </Document>
</kml>
"#;

    fn setup(dir: &Path, csv: &str, kml: &str, template: &str) -> Config {
        fs::write(dir.join("metadata.csv"), csv).unwrap();
        fs::write(dir.join("landuse.kml"), kml).unwrap();
        fs::write(dir.join("template.html"), template).unwrap();
        Config {
            csv: dir.join("metadata.csv"),
            kml: dir.join("landuse.kml"),
            template: dir.join("template.html"),
            out: dir.join("dist").join("landuse.kml"),
            template_out: Some(dir.join("dist").join("template.html")),
            summary: None,
        }
    }

    fn placemark(doc: &mut kml::KmlDocument, n: usize) -> kml::tree::Element {
        doc.placemarks_mut().unwrap()[n].clone()
    }

    #[test]
    fn matched_and_unmatched_placemarks_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(
            dir.path(),
            "Placemark ID,Proposed Residential Group\n42, RS-1 \n",
            KML,
            "{{Placemark ID}}",
        );

        let summary = run(&config).unwrap();
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.unmatched_ids, vec!["99".to_string()]);

        let mut doc = kml::load_kml_file(&config.out).unwrap();

        let matched = placemark(&mut doc, 0);
        assert_eq!(
            matched.child("description").unwrap().children,
            vec![kml::Node::CData("42".to_string())]
        );
        assert_eq!(matched.child("styleUrl").unwrap().text(), "#PolyStyleRS-1");
        assert!(matched.child("Polygon").is_some());

        let unmatched = placemark(&mut doc, 1);
        assert_eq!(
            unmatched.child("description").unwrap().children,
            vec![kml::Node::CData(NO_DATA_DESCRIPTION.to_string())]
        );
        assert!(unmatched.child("styleUrl").is_none());

        let example = fs::read_to_string(config.template_out.as_ref().unwrap()).unwrap();
        assert_eq!(example, "42");
    }

    #[test]
    fn output_is_identical_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(
            dir.path(),
            "Placemark ID,Proposed Residential Group,Notes\n42,RS-1,\"a\nb\"\n",
            KML,
            "<p>{{nl2br Notes}}</p>",
        );

        run(&config).unwrap();
        let first = fs::read(&config.out).unwrap();
        run(&config).unwrap();
        let second = fs::read(&config.out).unwrap();

        assert_eq!(first, second);
        let text = String::from_utf8(first).unwrap();
        assert!(text.contains("<description><![CDATA[<p>a<br>b</p>]]></description>"));
    }

    #[test]
    fn failure_leaves_no_output_document() {
        let dir = tempfile::tempdir().unwrap();
        // The matched row has no residential group column.
        let config = setup(dir.path(), "Placemark ID\n42\n", KML, "{{Placemark ID}}");

        let err = run(&config).unwrap_err();
        assert!(format!("{err:#}").contains("Proposed Residential Group"), "{err:#}");
        assert!(!config.out.exists());
    }

    #[test]
    fn structural_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(
            dir.path(),
            "Placemark ID,Proposed Residential Group\n",
            "<kml><Document/></kml>",
            "",
        );

        let err = run(&config).unwrap_err();
        assert!(format!("{err:#}").contains("Folder"), "{err:#}");
        assert!(!config.out.exists());
    }

    #[test]
    fn example_markup_and_summary_are_optional_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = setup(
            dir.path(),
            "Placemark ID,Proposed Residential Group\n42,RS-1\n",
            KML,
            "{{Placemark ID}}",
        );
        config.template_out = None;
        config.summary = Some(dir.path().join("summary.json"));

        run(&config).unwrap();

        assert!(!dir.path().join("dist").join("template.html").exists());
        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["matched"], 1);
        assert_eq!(summary["unmatched_ids"], serde_json::json!(["99"]));
    }
}
