//! Plumbing shared by the typed CDXML element views: attribute parsing and
//! the used/ignored child-tag bookkeeping that turns stray children into
//! structural errors.

use ego_tree::NodeId;

use crate::error::CdxmlError;
use crate::geometry::BoundingBox;
use crate::xml::XmlTree;

/// Tags every element tolerates without consuming.
const UNIVERSAL_IGNORES: [&str; 2] = ["annotation", "objecttag"];

/// Tracks which child tags a parent consumed; [`ChildScan::finish`] rejects
/// everything else.
pub(crate) struct ChildScan<'a> {
    tree: &'a XmlTree,
    parent: NodeId,
    used: Vec<&'static str>,
    ignored: Vec<&'static str>,
}

impl<'a> ChildScan<'a> {
    pub fn new(tree: &'a XmlTree, parent: NodeId) -> Self {
        ChildScan {
            tree,
            parent,
            used: Vec::new(),
            ignored: UNIVERSAL_IGNORES.to_vec(),
        }
    }

    /// A scan with no universal ignore set (the SVG side is stricter).
    pub fn strict(tree: &'a XmlTree, parent: NodeId) -> Self {
        ChildScan {
            tree,
            parent,
            used: Vec::new(),
            ignored: Vec::new(),
        }
    }

    pub fn ignore(&mut self, tags: &[&'static str]) {
        self.ignored.extend_from_slice(tags);
    }

    pub fn mark_used(&mut self, tag: &'static str) {
        self.used.push(tag);
    }

    /// All direct children with the given tag, in document order.
    pub fn children(&mut self, tag: &'static str) -> Vec<NodeId> {
        self.used.push(tag);
        self.tree
            .child_elements(self.parent)
            .into_iter()
            .filter(|&id| self.tree.name(id) == Some(tag))
            .collect()
    }

    /// At most one child with the given tag.
    pub fn single(&mut self, tag: &'static str) -> Result<Option<NodeId>, CdxmlError> {
        let found = self.children(tag);
        if found.len() > 1 {
            return Err(CdxmlError::Cardinality {
                tag: tag.to_string(),
                count: found.len(),
            });
        }
        Ok(found.into_iter().next())
    }

    /// Fail on any child tag that was neither consumed nor ignored.
    pub fn finish(self) -> Result<(), CdxmlError> {
        for id in self.tree.child_elements(self.parent) {
            let Some(name) = self.tree.name(id) else { continue };
            if !self.used.iter().any(|t| *t == name) && !self.ignored.iter().any(|t| *t == name) {
                return Err(CdxmlError::UnknownTag {
                    parent: self
                        .tree
                        .name(self.parent)
                        .unwrap_or_default()
                        .to_string(),
                    child: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn parse_floats(name: &str, value: &str) -> Result<Vec<f64>, CdxmlError> {
    value
        .split_whitespace()
        .map(|chunk| {
            chunk
                .parse::<f64>()
                .map_err(|_| CdxmlError::malformed(name, value))
        })
        .collect()
}

/// The `BoundingBox="l t r b"` attribute, when present.
pub(crate) fn attr_box(tree: &XmlTree, id: NodeId) -> Result<Option<BoundingBox>, CdxmlError> {
    match tree.attr(id, "BoundingBox") {
        None => Ok(None),
        Some(raw) => {
            let coords = parse_floats("BoundingBox", raw.trim())?;
            if coords.len() != 4 {
                return Err(CdxmlError::malformed("BoundingBox", raw));
            }
            Ok(Some(BoundingBox::new(
                coords[0], coords[1], coords[2], coords[3],
            )))
        }
    }
}

/// A two-float point attribute such as `p="x y"`.
pub(crate) fn attr_point(
    tree: &XmlTree,
    id: NodeId,
    name: &str,
) -> Result<Option<(f64, f64)>, CdxmlError> {
    match tree.attr(id, name) {
        None => Ok(None),
        Some(raw) => {
            let coords = parse_floats(name, raw.trim())?;
            if coords.len() != 2 {
                return Err(CdxmlError::malformed(name, raw));
            }
            Ok(Some((coords[0], coords[1])))
        }
    }
}

/// A three-float point attribute (`Head3D`/`Tail3D`); z is dropped.
pub(crate) fn attr_point3(
    tree: &XmlTree,
    id: NodeId,
    name: &str,
) -> Result<(f64, f64), CdxmlError> {
    let raw = tree
        .attr(id, name)
        .ok_or_else(|| CdxmlError::malformed(name, ""))?;
    let coords = parse_floats(name, raw.trim())?;
    if coords.len() < 2 {
        return Err(CdxmlError::malformed(name, raw));
    }
    Ok((coords[0], coords[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scan_flags_unknown_tags() {
        let tree = XmlTree::parse(r#"<page><t/><mystery/></page>"#).unwrap();
        let mut scan = ChildScan::new(&tree, tree.root());
        scan.children("t");
        let err = scan.finish().unwrap_err();
        assert_eq!(
            err,
            CdxmlError::UnknownTag {
                parent: "page".to_string(),
                child: "mystery".to_string()
            }
        );
    }

    #[test]
    fn child_scan_tolerates_annotations() {
        let tree = XmlTree::parse(r#"<fragment><annotation/><objecttag/></fragment>"#).unwrap();
        assert!(ChildScan::new(&tree, tree.root()).finish().is_ok());
    }

    #[test]
    fn single_rejects_duplicates() {
        let tree = XmlTree::parse(r#"<CDXML><colortable/><colortable/></CDXML>"#).unwrap();
        let mut scan = ChildScan::new(&tree, tree.root());
        assert_eq!(
            scan.single("colortable").unwrap_err(),
            CdxmlError::Cardinality {
                tag: "colortable".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn box_attr_parses_and_rejects() {
        let tree = XmlTree::parse(r#"<g BoundingBox="1 2 3 4"/>"#).unwrap();
        let b = attr_box(&tree, tree.root()).unwrap().unwrap();
        assert_eq!(b.ltrb(), (1.0, 2.0, 3.0, 4.0));

        let bad = XmlTree::parse(r#"<g BoundingBox="1 2 three 4"/>"#).unwrap();
        assert!(matches!(
            attr_box(&bad, bad.root()),
            Err(CdxmlError::MalformedAttribute { .. })
        ));
    }
}
