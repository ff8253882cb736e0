//! Owning XML tree.
//!
//! CDXML and SVG inputs are loaded once into an [`ego_tree::Tree`] of
//! element/text nodes; the typed document models are views over this tree
//! and refer back into it with [`NodeId`]s. The tree supports the small
//! amount of mutation the pipeline needs: attribute rewriting (builder
//! coordinate rescaling), group flattening and node removal (SVG region
//! cropping).

use ego_tree::{NodeId, Tree};
use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::CdxmlError;

/// One node of the tree: an element with ordered attributes, or raw text.
#[derive(Debug, Clone)]
pub enum XmlData {
    Element { name: String, attrs: IndexMap<String, String> },
    Text(String),
}

/// A parsed XML document whose root node is the document element.
#[derive(Debug, Clone)]
pub struct XmlTree {
    tree: Tree<XmlData>,
}

impl XmlTree {
    /// Parse a document (or a fragment with any root element).
    pub fn parse(xml: &str) -> Result<Self, CdxmlError> {
        let mut reader = Reader::from_str(xml);
        let mut tree: Option<Tree<XmlData>> = None;
        let mut stack: Vec<NodeId> = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| CdxmlError::Syntax(e.to_string()))?;
            match event {
                Event::Start(start) => {
                    let data = element_data(&start)?;
                    match (&mut tree, stack.last().copied()) {
                        (None, _) => {
                            let t = Tree::new(data);
                            stack.push(t.root().id());
                            tree = Some(t);
                        }
                        (Some(t), Some(parent)) => {
                            let id = append(t, parent, data);
                            stack.push(id);
                        }
                        (Some(_), None) => {
                            return Err(CdxmlError::Syntax(
                                "content after document element".to_string(),
                            ));
                        }
                    }
                }
                Event::Empty(start) => {
                    let data = element_data(&start)?;
                    match (&mut tree, stack.last().copied()) {
                        (None, _) => {
                            tree = Some(Tree::new(data));
                        }
                        (Some(t), Some(parent)) => {
                            append(t, parent, data);
                        }
                        (Some(_), None) => {
                            return Err(CdxmlError::Syntax(
                                "content after document element".to_string(),
                            ));
                        }
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|e| CdxmlError::Syntax(e.to_string()))?
                        .into_owned();
                    if let (Some(t), Some(parent)) = (&mut tree, stack.last().copied()) {
                        append(t, parent, XmlData::Text(value));
                    }
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let (Some(t), Some(parent)) = (&mut tree, stack.last().copied()) {
                        append(t, parent, XmlData::Text(value));
                    }
                }
                Event::Eof => break,
                // declarations, doctype, comments, processing instructions
                _ => {}
            }
        }

        match tree {
            Some(tree) => Ok(XmlTree { tree }),
            None => Err(CdxmlError::Syntax("no document element".to_string())),
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root().id()
    }

    fn data(&self, id: NodeId) -> &XmlData {
        self.tree
            .get(id)
            .expect("node id belongs to this tree")
            .value()
    }

    /// Element name; `None` for text nodes.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            XmlData::Element { name, .. } => Some(name.as_str()),
            XmlData::Text(_) => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.data(id) {
            XmlData::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            XmlData::Text(_) => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: String) {
        if let Some(mut node) = self.tree.get_mut(id) {
            if let XmlData::Element { attrs, .. } = node.value() {
                attrs.insert(name.to_string(), value);
            }
        }
    }

    /// Direct element children, in document order.
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        match self.tree.get(id) {
            Some(node) => node
                .children()
                .filter(|c| matches!(c.value(), XmlData::Element { .. }))
                .map(|c| c.id())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Direct text children concatenated, untouched.
    pub fn own_text(&self, id: NodeId) -> String {
        match self.tree.get(id) {
            Some(node) => node
                .children()
                .filter_map(|c| match c.value() {
                    XmlData::Text(t) => Some(t.as_str()),
                    XmlData::Element { .. } => None,
                })
                .collect(),
            None => String::new(),
        }
    }

    /// Every element in the subtree under `id`, including `id` itself.
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        match self.tree.get(id) {
            Some(node) => node
                .descendants()
                .filter(|d| matches!(d.value(), XmlData::Element { .. }))
                .map(|d| d.id())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Move all of `child`'s children to the end of `parent`'s child list
    /// and drop `child` itself. Used to strip grouping wrappers.
    pub fn flatten_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(mut parent_mut) = self.tree.get_mut(parent) {
            parent_mut.reparent_from_id_append(child);
        }
        self.detach(child);
    }

    pub fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Serialize the subtree rooted at `id`.
    pub fn serialize(&self, id: NodeId) -> Result<String, CdxmlError> {
        let mut writer = Writer::new(Vec::new());
        self.write_node(&mut writer, id)?;
        String::from_utf8(writer.into_inner()).map_err(|e| CdxmlError::Syntax(e.to_string()))
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<(), CdxmlError> {
        match self.data(id) {
            XmlData::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| CdxmlError::Syntax(e.to_string())),
            XmlData::Element { name, attrs } => {
                let mut start = BytesStart::new(name.as_str());
                for (k, v) in attrs {
                    start.push_attribute((k.as_str(), v.as_str()));
                }
                let children: Vec<NodeId> = self
                    .tree
                    .get(id)
                    .map(|n| n.children().map(|c| c.id()).collect())
                    .unwrap_or_default();
                if children.is_empty() {
                    writer
                        .write_event(Event::Empty(start))
                        .map_err(|e| CdxmlError::Syntax(e.to_string()))
                } else {
                    writer
                        .write_event(Event::Start(start))
                        .map_err(|e| CdxmlError::Syntax(e.to_string()))?;
                    for child in children {
                        self.write_node(writer, child)?;
                    }
                    writer
                        .write_event(Event::End(BytesEnd::new(name.as_str())))
                        .map_err(|e| CdxmlError::Syntax(e.to_string()))
                }
            }
        }
    }
}

fn append(tree: &mut Tree<XmlData>, parent: NodeId, data: XmlData) -> NodeId {
    tree.get_mut(parent)
        .expect("parent id belongs to this tree")
        .append(data)
        .id()
}

fn element_data(start: &BytesStart<'_>) -> Result<XmlData, CdxmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = IndexMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CdxmlError::Syntax(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| CdxmlError::Syntax(e.to_string()))?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(XmlData::Element { name, attrs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let tree = XmlTree::parse(r#"<a x="1"><b y="2"/><b y="3">hi</b></a>"#).unwrap();
        let root = tree.root();
        assert_eq!(tree.name(root), Some("a"));
        assert_eq!(tree.attr(root, "x"), Some("1"));
        let children = tree.child_elements(root);
        assert_eq!(children.len(), 2);
        assert_eq!(tree.attr(children[1], "y"), Some("3"));
        assert_eq!(tree.own_text(children[1]), "hi");
    }

    #[test]
    fn serializes_back_with_attribute_order() {
        let src = r#"<f id="7" BoundingBox="0 0 10 10"><n p="1 2"/><b B="1" E="2"/></f>"#;
        let tree = XmlTree::parse(src).unwrap();
        assert_eq!(tree.serialize(tree.root()).unwrap(), src);
    }

    #[test]
    fn set_attr_round_trips() {
        let mut tree = XmlTree::parse(r#"<n p="1 2"/>"#).unwrap();
        let root = tree.root();
        tree.set_attr(root, "p", "3 4".to_string());
        assert_eq!(tree.attr(root, "p"), Some("3 4"));
        assert_eq!(tree.serialize(root).unwrap(), r#"<n p="3 4"/>"#);
    }

    #[test]
    fn flatten_child_promotes_grandchildren() {
        let mut tree = XmlTree::parse(r#"<page><group><f id="1"/><f id="2"/></group></page>"#)
            .unwrap();
        let root = tree.root();
        let group = tree.child_elements(root)[0];
        tree.flatten_child(root, group);
        let children = tree.child_elements(root);
        assert_eq!(children.len(), 2);
        assert_eq!(tree.name(children[0]), Some("f"));
        assert_eq!(tree.attr(children[1], "id"), Some("2"));
    }

    #[test]
    fn missing_root_is_a_syntax_error() {
        assert!(matches!(XmlTree::parse("   "), Err(CdxmlError::Syntax(_))));
    }
}
