//! Mustache-style HTML templates rendered against a table row.
//!
//! Supported tags:
//! - `{{Column Name}}` / `{{[Column Name]}}`: escaped cell value
//! - `{{{Column Name}}}`: raw cell value
//! - `{{nl2br Column Name}}`: escaped value with line breaks as `<br>`
//! - `{{! ... }}` / `{{!-- ... --}}`: comment
//!
//! Unknown columns render as the empty string.

pub mod helpers;

use crate::error::{Error, Result};
use crate::table::Row;
use helpers::{Helper, escape_expression};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

// Alternation order matters: comments, then triple, then double braces.
// Only comments may span lines.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{!--(?s:.*?)--\}\}|\{\{!(?s:.*?)\}\}|\{\{\{(.*?)\}\}\}|\{\{(.*?)\}\}")
        .expect("tag pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Value { column: String, escape: bool },
    Helper { helper: Helper, column: String },
}

/// A compiled template. Rendering is pure; it never touches the filesystem.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn compile(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in TAG.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            push_literal(&mut segments, &source[last..whole.start()], last)?;
            last = whole.end();

            if let Some(raw) = caps.get(1) {
                segments.push(Segment::Value {
                    column: column_name(raw.as_str())?,
                    escape: false,
                });
            } else if let Some(body) = caps.get(2) {
                segments.push(parse_tag(body.as_str())?);
            }
        }
        push_literal(&mut segments, &source[last..], last)?;

        Ok(Self { segments })
    }

    pub fn render(&self, row: &Row) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Value { column, escape } => {
                    let value = row.get(column).unwrap_or_default();
                    if *escape {
                        out.push_str(&escape_expression(value));
                    } else {
                        out.push_str(value);
                    }
                }
                Segment::Helper { helper, column } => {
                    out.push_str(&helper.apply(row.get(column).unwrap_or_default()));
                }
            }
        }
        out
    }
}

/// Read and compile a template file.
pub fn load_template_file(path: impl AsRef<Path>) -> Result<Template> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Template::compile(&source)
}

fn push_literal(segments: &mut Vec<Segment>, text: &str, offset: usize) -> Result<()> {
    if let Some(pos) = text.find("{{") {
        return Err(Error::Template(format!(
            "unclosed tag at byte {}",
            offset + pos
        )));
    }
    if !text.is_empty() {
        segments.push(Segment::Literal(text.to_string()));
    }
    Ok(())
}

fn parse_tag(body: &str) -> Result<Segment> {
    let body = body.trim();
    if body.is_empty() {
        return Err(Error::Template("empty tag {{}}".to_string()));
    }
    if body.starts_with(['#', '/', '^', '>']) || body == "else" {
        return Err(Error::Template(format!(
            "unsupported block or partial tag {{{{{}}}}}",
            body
        )));
    }

    let (head, rest) = body
        .split_once(char::is_whitespace)
        .unwrap_or((body, ""));
    if let Some(helper) = Helper::by_name(head) {
        if rest.trim().is_empty() {
            return Err(Error::Template(format!("helper {} needs an argument", head)));
        }
        return Ok(Segment::Helper {
            helper,
            column: column_name(rest)?,
        });
    }

    Ok(Segment::Value {
        column: column_name(body)?,
        escape: true,
    })
}

/// `Placemark ID` and `[Placemark ID]` name the same column.
fn column_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    let name = name
        .strip_prefix('[')
        .and_then(|n| n.strip_suffix(']'))
        .unwrap_or(name);
    if name.is_empty() {
        return Err(Error::Template("empty column reference".to_string()));
    }
    Ok(name.to_string())
}
