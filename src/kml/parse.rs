use crate::error::{Error, Result};
use crate::kml::tree::{Element, KmlDocument, Node};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;
use std::fmt::Display;
use std::fs;
use std::path::Path;

/// Read and parse a KML file into a document tree.
pub fn load_kml_file(path: impl AsRef<Path>) -> Result<KmlDocument> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    let text = std::str::from_utf8(&bytes)
        .map_err(|e| xml_error(path, e.valid_up_to() as u64, e))?;
    parse_kml(path, text)
}

/// Parse markup into a tree. Whitespace-only text between elements is not
/// kept; all other text is kept verbatim (after entity decoding).
pub(crate) fn parse_kml(path: &Path, text: &str) -> Result<KmlDocument> {
    let mut reader = Reader::from_str(text);

    let mut open: Vec<Element> = Vec::new();
    let mut top: Vec<Node> = Vec::new();

    let at = |reader: &Reader<&[u8]>| reader.buffer_position() as u64;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(xml_error(path, reader.error_position() as u64, e)),
        };

        let node = match event {
            Event::Start(e) => {
                open.push(element_from(path, at(&reader), &e)?);
                continue;
            }
            Event::End(_) => match open.pop() {
                Some(element) => Node::Element(element),
                None => return Err(xml_error(path, at(&reader), "unexpected closing tag")),
            },
            Event::Empty(e) => Node::Element(element_from(path, at(&reader), &e)?),
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| xml_error(path, at(&reader), e))?;
                if text.trim().is_empty() {
                    continue;
                }
                Node::Text(text.into_owned())
            }
            Event::CData(e) => Node::CData(lossy(&e)),
            Event::Comment(e) => Node::Comment(lossy(&e)),
            Event::DocType(e) => Node::DocType(lossy(&e)),
            Event::PI(e) => Node::PI(lossy(&e)),
            Event::Decl(e) => {
                let position = at(&reader);
                let version = e.version().map_err(|e| xml_error(path, position, e))?;
                let mut decl = format!("version=\"{}\"", lossy(&version));
                if let Some(encoding) = e.encoding() {
                    let encoding = encoding.map_err(|e| xml_error(path, position, e))?;
                    decl.push_str(&format!(" encoding=\"{}\"", lossy(&encoding)));
                }
                if let Some(standalone) = e.standalone() {
                    let standalone = standalone.map_err(|e| xml_error(path, position, e))?;
                    decl.push_str(&format!(" standalone=\"{}\"", lossy(&standalone)));
                }
                Node::Decl(decl)
            }
            Event::Eof => break,
        };

        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => top.push(node),
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(xml_error(
            path,
            at(&reader),
            format!("unclosed element <{}>", unclosed.name),
        ));
    }
    let doc = KmlDocument { nodes: top };
    if doc.root().is_none() {
        return Err(xml_error(path, at(&reader), "no root element"));
    }
    Ok(doc)
}

fn element_from(path: &Path, position: u64, start: &BytesStart) -> Result<Element> {
    let mut element = Element::new(lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(path, position, e))?;
        let value = attr
            .unescape_value()
            .map_err(|e| xml_error(path, position, e))?;
        element
            .attributes
            .push((lossy(attr.key.as_ref()), value.into_owned()));
    }
    Ok(element)
}

fn lossy(bytes: &[u8]) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

fn xml_error(path: &Path, position: u64, message: impl Display) -> Error {
    Error::Xml {
        path: path.to_path_buf(),
        position,
        message: message.to_string(),
    }
}
