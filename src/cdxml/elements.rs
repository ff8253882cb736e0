//! Typed views over a CDXML document tree.
//!
//! Each view extracts the children it understands and rejects the rest, so
//! a drawing using CDXML features the pipeline cannot interpret fails
//! loudly instead of being silently half-read.

use ego_tree::NodeId;

use crate::cdxml::node::{attr_box, attr_point, attr_point3, ChildScan};
use crate::error::CdxmlError;
use crate::geometry::BoundingBox;
use crate::xml::XmlTree;
use indexmap::IndexMap;

/// A parsed CDXML document: the owned XML tree plus typed views of the
/// first page's content.
#[derive(Debug, Clone)]
pub struct CdxmlDocument {
    pub xml: XmlTree,
    pub root: NodeId,
    pub bounds: Option<BoundingBox>,
    pub pages: Vec<Page>,
    pub colors: Vec<NodeId>,
    pub fonts: Vec<NodeId>,
    /// Every element carrying an `id` attribute, in document order.
    pub id_map: IndexMap<String, NodeId>,
}

impl CdxmlDocument {
    pub fn parse(cdxml: &str) -> Result<Self, CdxmlError> {
        // Coordinates and style runs never span lines; the upstream drawing
        // tools emit each element on one line.
        let cleaned = cdxml.replace('\n', "").replace('\r', "");
        let mut xml = XmlTree::parse(&cleaned)?;
        let root = xml.root();
        match xml.name(root) {
            Some("CDXML") => {}
            other => {
                return Err(CdxmlError::Syntax(format!(
                    "expected <CDXML> document element, found <{}>",
                    other.unwrap_or_default()
                )))
            }
        }
        let bounds = attr_box(&xml, root)?;

        // Grouping wrappers inside pages are flattened before extraction.
        let page_ids: Vec<NodeId> = xml
            .child_elements(root)
            .into_iter()
            .filter(|&id| xml.name(id) == Some("page"))
            .collect();
        for &page_id in &page_ids {
            let groups: Vec<NodeId> = xml
                .child_elements(page_id)
                .into_iter()
                .filter(|&id| xml.name(id) == Some("group"))
                .collect();
            for group in groups {
                xml.flatten_child(page_id, group);
            }
        }

        let mut scan = ChildScan::new(&xml, root);
        let colors = match scan.single("colortable")? {
            Some(table) => ColorTable::parse(&xml, table)?,
            None => Vec::new(),
        };
        let fonts = match scan.single("fonttable")? {
            Some(table) => FontTable::parse(&xml, table)?,
            None => Vec::new(),
        };
        scan.mark_used("page");
        scan.finish()?;

        let mut pages = Vec::new();
        for page_id in page_ids {
            pages.push(Page::parse(&xml, page_id)?);
        }
        if pages.is_empty() {
            return Err(CdxmlError::NoPage);
        }

        let mut id_map = IndexMap::new();
        for id in xml.descendant_elements(root) {
            if let Some(value) = xml.attr(id, "id") {
                id_map.insert(value.to_string(), id);
            }
        }

        Ok(CdxmlDocument {
            xml,
            root,
            bounds,
            pages,
            colors,
            fonts,
            id_map,
        })
    }

    /// The offset/scale mapping document coordinates onto a raster of the
    /// given pixel size.
    pub fn raster_offset_scale(&self, img_size: (f64, f64)) -> Option<((f64, f64), (f64, f64))> {
        let bounds = self.bounds?;
        let offset = (-bounds.left, -bounds.top);
        let scale = (img_size.0 / bounds.width(), img_size.1 / bounds.height());
        Some((offset, scale))
    }
}

struct ColorTable;

impl ColorTable {
    fn parse(xml: &XmlTree, id: NodeId) -> Result<Vec<NodeId>, CdxmlError> {
        let mut scan = ChildScan::new(xml, id);
        let colors = scan.children("color");
        scan.finish()?;
        Ok(colors)
    }
}

struct FontTable;

impl FontTable {
    fn parse(xml: &XmlTree, id: NodeId) -> Result<Vec<NodeId>, CdxmlError> {
        let mut scan = ChildScan::new(xml, id);
        let fonts = scan.children("font");
        scan.finish()?;
        Ok(fonts)
    }
}

/// One drawing page. Only the first page of a document is consumed by the
/// pipeline, but every page must be structurally valid.
#[derive(Debug, Clone)]
pub struct Page {
    pub node: NodeId,
    pub bounds: Option<BoundingBox>,
    pub fragments: Vec<Fragment>,
    pub texts: Vec<TextElement>,
    pub graphics: Vec<Graphic>,
    pub arrows: Vec<Arrow>,
    pub bracketed_groups: Vec<BracketedGroup>,
    pub chemical_props: Vec<NodeId>,
}

impl Page {
    fn parse(xml: &XmlTree, id: NodeId) -> Result<Self, CdxmlError> {
        let mut scan = ChildScan::new(xml, id);
        scan.ignore(&["border", "scheme"]);
        // Groups were flattened away already; any survivor (a group nested
        // inside another group) is carried, not consumed.
        scan.mark_used("group");

        let fragments = scan
            .children("fragment")
            .into_iter()
            .map(|f| Fragment::parse(xml, f))
            .collect::<Result<Vec<_>, _>>()?;
        let texts = scan
            .children("t")
            .into_iter()
            .map(|t| TextElement::parse(xml, t))
            .collect::<Result<Vec<_>, _>>()?;
        let graphics = scan
            .children("graphic")
            .into_iter()
            .map(|g| Graphic::parse(xml, g))
            .collect::<Result<Vec<_>, _>>()?;
        let bracketed_groups = scan
            .children("bracketedgroup")
            .into_iter()
            .map(|b| BracketedGroup::parse(xml, b))
            .collect::<Result<Vec<_>, _>>()?;
        let arrows = scan
            .children("arrow")
            .into_iter()
            .map(|a| Arrow::parse(xml, a))
            .collect::<Result<Vec<_>, _>>()?;
        let chemical_props = scan.children("chemicalproperty");
        for &prop in &chemical_props {
            ChildScan::new(xml, prop).finish()?;
        }
        scan.finish()?;

        Ok(Page {
            node: id,
            bounds: attr_box(xml, id)?,
            fragments,
            texts,
            graphics,
            arrows,
            bracketed_groups,
            chemical_props,
        })
    }
}

/// A molecule drawing: atoms (`n`), bonds (`b`) and decoration graphics.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub node: NodeId,
    pub bounds: Option<BoundingBox>,
    pub sub_nodes: Vec<SubNode>,
    pub bonds: Vec<NodeId>,
    pub graphics: Vec<Graphic>,
}

impl Fragment {
    pub(crate) fn parse(xml: &XmlTree, id: NodeId) -> Result<Self, CdxmlError> {
        let mut scan = ChildScan::new(xml, id);
        let sub_nodes = scan
            .children("n")
            .into_iter()
            .map(|n| SubNode::parse(xml, n))
            .collect::<Result<Vec<_>, _>>()?;
        let bonds = scan.children("b");
        for &bond in &bonds {
            ChildScan::new(xml, bond).finish()?;
        }
        let graphics = scan
            .children("graphic")
            .into_iter()
            .map(|g| Graphic::parse(xml, g))
            .collect::<Result<Vec<_>, _>>()?;
        scan.finish()?;

        Ok(Fragment {
            node: id,
            bounds: attr_box(xml, id)?,
            sub_nodes,
            bonds,
            graphics,
        })
    }

    /// A fragment that draws nothing but a single label. Such fragments are
    /// textual compounds ("NaOH"), not structures.
    pub fn text_only(&self) -> Option<&str> {
        if self.bonds.is_empty() && self.graphics.is_empty() && self.sub_nodes.len() == 1 {
            let sub = &self.sub_nodes[0];
            if sub.texts.len() == 1 {
                return Some(&sub.texts[0].value);
            }
        }
        None
    }
}

/// An atom position (`n`), possibly expanding to a nested fragment or
/// carrying its label text.
#[derive(Debug, Clone)]
pub struct SubNode {
    pub node: NodeId,
    pub position: Option<(f64, f64)>,
    pub fragments: Vec<Fragment>,
    pub texts: Vec<TextElement>,
}

impl SubNode {
    fn parse(xml: &XmlTree, id: NodeId) -> Result<Self, CdxmlError> {
        let mut scan = ChildScan::new(xml, id);
        let fragments = scan
            .children("fragment")
            .into_iter()
            .map(|f| Fragment::parse(xml, f))
            .collect::<Result<Vec<_>, _>>()?;
        let texts = scan
            .children("t")
            .into_iter()
            .map(|t| TextElement::parse(xml, t))
            .collect::<Result<Vec<_>, _>>()?;
        scan.finish()?;

        Ok(SubNode {
            node: id,
            position: attr_point(xml, id, "p")?,
            fragments,
            texts,
        })
    }
}

/// A text block. Its value is the concatenation of the style runs, each
/// stripped of outer whitespace.
#[derive(Debug, Clone)]
pub struct TextElement {
    pub node: NodeId,
    pub bounds: Option<BoundingBox>,
    pub position: Option<(f64, f64)>,
    pub value: String,
}

impl TextElement {
    fn parse(xml: &XmlTree, id: NodeId) -> Result<Self, CdxmlError> {
        let mut scan = ChildScan::new(xml, id);
        let styles = scan.children("s");
        scan.finish()?;

        let mut value = String::new();
        for style in styles {
            value.push_str(xml.own_text(style).trim());
        }

        Ok(TextElement {
            node: id,
            bounds: attr_box(xml, id)?,
            position: attr_point(xml, id, "p")?,
            value,
        })
    }
}

/// A reaction arrow. Geometry is mandatory: every downstream decision reads
/// the head/tail coordinates and the four extension boxes.
#[derive(Debug, Clone)]
pub struct Arrow {
    pub node: NodeId,
    pub bounds: BoundingBox,
    pub head: (f64, f64),
    pub tail: (f64, f64),
}

impl Arrow {
    fn parse(xml: &XmlTree, id: NodeId) -> Result<Self, CdxmlError> {
        ChildScan::new(xml, id).finish()?;
        let bounds = attr_box(xml, id)?.ok_or_else(|| CdxmlError::malformed("BoundingBox", ""))?;
        Ok(Arrow {
            node: id,
            bounds,
            head: attr_point3(xml, id, "Head3D")?,
            tail: attr_point3(xml, id, "Tail3D")?,
        })
    }

    pub fn extents(&self) -> ArrowExtents {
        arrow_extents(&self.bounds, self.head.0, self.tail.0)
    }

    /// The region the arrow points into: products live here.
    pub fn head_ext_box(&self) -> BoundingBox {
        self.extents().head
    }

    /// The region behind the tail: reactants live here.
    pub fn tail_ext_box(&self) -> BoundingBox {
        self.extents().tail
    }

    /// A thin strip above the shaft: reagents are written there.
    pub fn top_ext_box(&self) -> BoundingBox {
        self.extents().top
    }

    /// A thin strip below the shaft: solvents and conditions.
    pub fn bottom_ext_box(&self) -> BoundingBox {
        self.extents().bottom
    }
}

/// The four spatial predicate regions derived from an arrow's box and its
/// x-orientation.
#[derive(Debug, Clone, Copy)]
pub struct ArrowExtents {
    pub tail: BoundingBox,
    pub head: BoundingBox,
    pub top: BoundingBox,
    pub bottom: BoundingBox,
}

pub fn arrow_extents(bounds: &BoundingBox, head_x: f64, tail_x: f64) -> ArrowExtents {
    let points_right = head_x > tail_x;
    let forward = bounds.extend(-bounds.width(), 60.0, 200.0, 60.0);
    let backward = bounds.extend(200.0, 60.0, -bounds.width(), 60.0);
    let (head, tail) = if points_right {
        (forward, backward)
    } else {
        (backward, forward)
    };
    ArrowExtents {
        tail,
        head,
        top: bounds.extend(0.0, 80.0, 0.0, -bounds.height()),
        bottom: bounds.extend(0.0, -bounds.height(), 0.0, 80.0),
    }
}

/// A drawing primitive; the pipeline only cares about plus symbols.
#[derive(Debug, Clone)]
pub struct Graphic {
    pub node: NodeId,
    pub bounds: Option<BoundingBox>,
    pub graphic_type: Option<String>,
    pub symbol_type: Option<String>,
    pub represents: Vec<NodeId>,
}

impl Graphic {
    fn parse(xml: &XmlTree, id: NodeId) -> Result<Self, CdxmlError> {
        let mut scan = ChildScan::new(xml, id);
        let represents = scan.children("represent");
        scan.finish()?;

        Ok(Graphic {
            node: id,
            bounds: attr_box(xml, id)?,
            graphic_type: xml.attr(id, "GraphicType").map(str::to_string),
            symbol_type: xml.attr(id, "SymbolType").map(str::to_string),
            represents,
        })
    }

    pub fn is_plus(&self) -> bool {
        self.graphic_type.as_deref() == Some("Symbol")
            && self.symbol_type.as_deref() == Some("Plus")
    }
}

/// A bracketed repeat group; always exactly two attachments.
#[derive(Debug, Clone)]
pub struct BracketedGroup {
    pub node: NodeId,
    pub bounds: Option<BoundingBox>,
    pub attachments: Vec<NodeId>,
}

impl BracketedGroup {
    fn parse(xml: &XmlTree, id: NodeId) -> Result<Self, CdxmlError> {
        let mut scan = ChildScan::new(xml, id);
        let attachments = scan.children("bracketattachment");
        scan.finish()?;
        if attachments.len() != 2 {
            return Err(CdxmlError::Cardinality {
                tag: "bracketattachment".to_string(),
                count: attachments.len(),
            });
        }
        Ok(BracketedGroup {
            node: id,
            bounds: attr_box(xml, id)?,
            attachments,
        })
    }
}

/// Rewrite the positioned coordinates under a fragment: every atom's `p`
/// becomes `(x*sx+ox, y*sy+oy)`, along with the atom's label texts, and the
/// same recursively for fragments expanded inside atoms.
pub fn apply_offset_scale(
    xml: &mut XmlTree,
    fragment: NodeId,
    offset: (f64, f64),
    scale: (f64, f64),
) -> Result<(), CdxmlError> {
    let sub_nodes: Vec<NodeId> = xml
        .child_elements(fragment)
        .into_iter()
        .filter(|&id| xml.name(id) == Some("n"))
        .collect();
    for sub in sub_nodes {
        rewrite_point(xml, sub, offset, scale)?;
        for child in xml.child_elements(sub) {
            match xml.name(child) {
                Some("t") => rewrite_point(xml, child, offset, scale)?,
                Some("fragment") => apply_offset_scale(xml, child, offset, scale)?,
                _ => {}
            }
        }
    }
    Ok(())
}

fn rewrite_point(
    xml: &mut XmlTree,
    id: NodeId,
    offset: (f64, f64),
    scale: (f64, f64),
) -> Result<(), CdxmlError> {
    if let Some((x, y)) = attr_point(xml, id, "p")? {
        let (ox, oy) = offset;
        let (sx, sy) = scale;
        xml.set_attr(id, "p", format!("{:.6} {:.6}", x * sx + ox, y * sy + oy));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_without_page_fails() {
        let err = CdxmlDocument::parse("<CDXML/>").unwrap_err();
        assert_eq!(err, CdxmlError::NoPage);
    }

    #[test]
    fn unknown_child_fails_before_extraction() {
        let err = CdxmlDocument::parse("<CDXML><page><widget/></page></CDXML>").unwrap_err();
        assert_eq!(
            err,
            CdxmlError::UnknownTag {
                parent: "page".to_string(),
                child: "widget".to_string()
            }
        );
    }

    #[test]
    fn groups_flatten_into_the_page() {
        let doc = CdxmlDocument::parse(
            r#"<CDXML><page><group><fragment id="2" BoundingBox="0 0 10 10"><n id="3" p="5 5"/></fragment></group></page></CDXML>"#,
        )
        .unwrap();
        assert_eq!(doc.pages[0].fragments.len(), 1);
    }

    #[test]
    fn text_only_fragment_exposes_its_label() {
        let doc = CdxmlDocument::parse(
            r#"<CDXML><page><fragment id="2" BoundingBox="0 0 30 10"><n id="3" p="5 5"><t id="4" p="5 8"><s font="3" size="10"> NaOH </s></t></n></fragment></page></CDXML>"#,
        )
        .unwrap();
        assert_eq!(doc.pages[0].fragments[0].text_only(), Some("NaOH"));
    }

    #[test]
    fn drawn_fragment_is_not_text_only() {
        let doc = CdxmlDocument::parse(
            r#"<CDXML><page><fragment id="2" BoundingBox="0 0 20 20"><n id="3" p="0 0"/><n id="4" p="20 20"/><b id="5" B="3" E="4"/></fragment></page></CDXML>"#,
        )
        .unwrap();
        assert_eq!(doc.pages[0].fragments[0].text_only(), None);
    }

    #[test]
    fn arrow_extension_boxes_follow_orientation() {
        let doc = CdxmlDocument::parse(
            r#"<CDXML><page><arrow id="9" BoundingBox="200 95 300 105" Head3D="300 100 0" Tail3D="200 100 0"/></page></CDXML>"#,
        )
        .unwrap();
        let arrow = &doc.pages[0].arrows[0];
        assert_eq!(arrow.tail_ext_box().ltrb(), (0.0, 35.0, 200.0, 165.0));
        assert_eq!(arrow.head_ext_box().ltrb(), (300.0, 35.0, 500.0, 165.0));
        assert_eq!(arrow.top_ext_box().ltrb(), (200.0, 15.0, 300.0, 95.0));
        assert_eq!(arrow.bottom_ext_box().ltrb(), (200.0, 105.0, 300.0, 185.0));
    }

    #[test]
    fn leftward_arrow_swaps_head_and_tail_regions() {
        let doc = CdxmlDocument::parse(
            r#"<CDXML><page><arrow id="9" BoundingBox="200 95 300 105" Head3D="200 100 0" Tail3D="300 100 0"/></page></CDXML>"#,
        )
        .unwrap();
        let arrow = &doc.pages[0].arrows[0];
        assert_eq!(arrow.head_ext_box().ltrb(), (0.0, 35.0, 200.0, 165.0));
        assert_eq!(arrow.tail_ext_box().ltrb(), (300.0, 35.0, 500.0, 165.0));
    }

    #[test]
    fn bracketed_group_needs_two_attachments() {
        let err = CdxmlDocument::parse(
            r#"<CDXML><page><bracketedgroup id="7"><bracketattachment id="8"/></bracketedgroup></page></CDXML>"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CdxmlError::Cardinality {
                tag: "bracketattachment".to_string(),
                count: 1
            }
        );
    }

    #[test]
    fn plus_graphic_is_recognized() {
        let doc = CdxmlDocument::parse(
            r#"<CDXML><page><graphic id="5" BoundingBox="10 10 20 20" GraphicType="Symbol" SymbolType="Plus"/></page></CDXML>"#,
        )
        .unwrap();
        assert!(doc.pages[0].graphics[0].is_plus());
    }
}
