use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    /// Attribute part of `<?xml ...?>`.
    Decl(String),
    DocType(String),
    PI(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Name without namespace prefix (`kml:Folder` -> `Folder`).
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(e) if e.local_name() == local => Some(e),
            _ => None,
        })
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(e) if e.local_name() == local => Some(e),
            _ => None,
        })
    }

    pub fn children_mut<'a>(&'a mut self, local: &'a str) -> impl Iterator<Item = &'a mut Element> {
        self.children.iter_mut().filter_map(move |node| match node {
            Node::Element(e) if e.local_name() == local => Some(e),
            _ => None,
        })
    }

    /// Replace the content of the first `local` child with `content`, or
    /// append a new `local` child holding it.
    pub fn set_child_content(&mut self, local: &str, content: Node) {
        match self.child_mut(local) {
            Some(child) => child.children = vec![content],
            None => {
                let mut child = Element::new(local);
                child.children.push(content);
                self.children.push(Node::Element(child));
            }
        }
    }

    /// Concatenated text and CDATA of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// A parsed document: prolog nodes, the root element, trailing misc nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KmlDocument {
    pub nodes: Vec<Node>,
}

impl KmlDocument {
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// The placemarks under `kml/Document/Folder`, in document order.
    ///
    /// A folder holding a single placemark yields a one-element list.
    pub fn placemarks_mut(&mut self) -> Result<Vec<&mut Element>> {
        let root = self
            .root_mut()
            .ok_or_else(|| Error::Structure("document has no root element".to_string()))?;
        if root.local_name() != "kml" {
            return Err(Error::Structure(format!(
                "root element is <{}>, expected <kml>",
                root.name
            )));
        }

        let folder = root
            .child_mut("Document")
            .ok_or_else(|| Error::Structure("missing kml/Document".to_string()))?
            .child_mut("Folder")
            .ok_or_else(|| Error::Structure("missing kml/Document/Folder".to_string()))?;

        let placemarks: Vec<&mut Element> = folder.children_mut("Placemark").collect();
        if placemarks.is_empty() {
            return Err(Error::Structure(
                "kml/Document/Folder contains no Placemark".to_string(),
            ));
        }
        Ok(placemarks)
    }
}
