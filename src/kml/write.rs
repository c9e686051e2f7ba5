use crate::error::Result;
use crate::kml::tree::{Element, KmlDocument, Node};
use crate::output;
use quick_xml::escape::{escape, partial_escape};
use std::path::Path;

const INDENT: &str = "    ";

/// Serialise the tree with four-space indentation.
///
/// Elements with any text or CDATA child are written inline, children and
/// all, so character content is written back byte for byte.
pub fn to_markup(doc: &KmlDocument) -> String {
    let mut out = String::new();
    for node in &doc.nodes {
        write_node(&mut out, node, 0);
        out.push('\n');
    }
    out
}

/// Serialise `doc` and replace `path` with it atomically.
pub fn write_kml_file(path: impl AsRef<Path>, doc: &KmlDocument) -> Result<()> {
    output::write_atomically(path.as_ref(), to_markup(doc).as_bytes())
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    write_inline(out, node, depth);
}

fn write_inline(out: &mut String, node: &Node, depth: usize) {
    match node {
        Node::Element(e) => write_element(out, e, depth),
        Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
        Node::CData(text) => write_cdata(out, text),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::Decl(decl) => {
            out.push_str("<?xml ");
            out.push_str(decl);
            out.push_str("?>");
        }
        Node::DocType(text) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(text);
            out.push('>');
        }
        Node::PI(text) => {
            out.push_str("<?");
            out.push_str(text);
            out.push_str("?>");
        }
    }
}

fn write_element(out: &mut String, e: &Element, depth: usize) {
    out.push('<');
    out.push_str(&e.name);
    for (key, value) in &e.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }

    if e.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let has_text = e
        .children
        .iter()
        .any(|c| matches!(c, Node::Text(_) | Node::CData(_)));
    if has_text {
        for child in &e.children {
            write_inline(out, child, depth);
        }
    } else {
        for child in &e.children {
            out.push('\n');
            write_node(out, child, depth + 1);
        }
        out.push('\n');
        for _ in 0..depth {
            out.push_str(INDENT);
        }
    }

    out.push_str("</");
    out.push_str(&e.name);
    out.push('>');
}

/// A `]]>` inside the payload is split across two sections.
fn write_cdata(out: &mut String, text: &str) {
    out.push_str("<![CDATA[");
    out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}
