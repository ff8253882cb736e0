//! Typed view over the vector rendering of a drawing.
//!
//! The renderer emits a flat list of `path` and `text` elements whose
//! coordinates live behind per-node `matrix(...)` transforms. The view
//! computes canvas-space boxes for all of them so a rectangular region can
//! be cut out as a standalone SVG for one compound.

use ego_tree::NodeId;

use crate::cdxml::node::ChildScan;
use crate::error::CdxmlError;
use crate::geometry::BoundingBox;
use crate::svg::node::SvgTransformer;
use crate::xml::XmlTree;

/// One step of a path's `d` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathStep {
    Move(f64, f64),
    Line(f64, f64),
    Close,
}

#[derive(Debug, Clone)]
pub struct SvgPath {
    pub node: NodeId,
    pub steps: Vec<PathStep>,
    pub transformer: SvgTransformer,
    /// Canvas-space extent of the transformed points.
    pub bounds: BoundingBox,
}

impl SvgPath {
    fn parse(xml: &XmlTree, id: NodeId) -> Result<Self, CdxmlError> {
        ChildScan::strict(xml, id).finish()?;
        let d = xml
            .attr(id, "d")
            .ok_or_else(|| CdxmlError::malformed("d", ""))?;
        let steps = parse_steps(d)?;
        let raw = xml
            .attr(id, "transform")
            .ok_or_else(|| CdxmlError::malformed("transform", ""))?;
        let transformer = SvgTransformer::parse(raw)?;

        let mut xs: Vec<f64> = Vec::new();
        let mut ys: Vec<f64> = Vec::new();
        for step in &steps {
            if let PathStep::Move(x, y) | PathStep::Line(x, y) = *step {
                let (tx, ty) = transformer.transform(x, y);
                xs.push(tx);
                ys.push(ty);
            }
        }
        if xs.is_empty() {
            return Err(CdxmlError::malformed("d", d));
        }
        let bounds = BoundingBox::new(
            xs.iter().fold(f64::INFINITY, |m, v| m.min(*v)),
            ys.iter().fold(f64::INFINITY, |m, v| m.min(*v)),
            xs.iter().fold(f64::NEG_INFINITY, |m, v| m.max(*v)),
            ys.iter().fold(f64::NEG_INFINITY, |m, v| m.max(*v)),
        );

        Ok(SvgPath {
            node: id,
            steps,
            transformer,
            bounds,
        })
    }

    /// Shift the path by a canvas-space offset, rewriting `d` in local
    /// coordinates through the inverse transform.
    fn offset_d(&self, offset: (f64, f64)) -> Result<String, CdxmlError> {
        let mut out = String::new();
        for step in &self.steps {
            match *step {
                PathStep::Close => out.push('Z'),
                PathStep::Move(x, y) | PathStep::Line(x, y) => {
                    let (tx, ty) = self.transformer.transform(x, y);
                    let (nx, ny) = self
                        .transformer
                        .reverse_transform(tx + offset.0, ty + offset.1)?;
                    let cmd = if matches!(*step, PathStep::Move(..)) { "M" } else { "L" };
                    out.push_str(&format!("{} {:.6},{:.6} ", cmd, nx, ny));
                }
            }
        }
        Ok(out)
    }
}

fn parse_steps(d: &str) -> Result<Vec<PathStep>, CdxmlError> {
    let tokens: Vec<&str> = d.split_whitespace().collect();
    let mut steps = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "M" | "L" => {
                let coords = tokens
                    .get(i + 1)
                    .ok_or_else(|| CdxmlError::malformed("d", d))?;
                let (x, y) = coords
                    .split_once(',')
                    .ok_or_else(|| CdxmlError::malformed("d", d))?;
                let x = x.parse().map_err(|_| CdxmlError::malformed("d", d))?;
                let y = y.parse().map_err(|_| CdxmlError::malformed("d", d))?;
                steps.push(if tokens[i] == "M" {
                    PathStep::Move(x, y)
                } else {
                    PathStep::Line(x, y)
                });
                i += 2;
            }
            "Z" => {
                steps.push(PathStep::Close);
                i += 1;
            }
            _ => i += 1,
        }
    }
    Ok(steps)
}

#[derive(Debug, Clone)]
pub struct SvgText {
    pub node: NodeId,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub transformer: SvgTransformer,
    /// Degenerate box at the transformed anchor point.
    pub bounds: BoundingBox,
}

impl SvgText {
    fn parse(xml: &XmlTree, id: NodeId) -> Result<Self, CdxmlError> {
        ChildScan::strict(xml, id).finish()?;
        let x = float_attr(xml, id, "x")?;
        let y = float_attr(xml, id, "y")?;
        let font_size = xml
            .attr(id, "font-size")
            .ok_or_else(|| CdxmlError::malformed("font-size", ""))?
            .replace("px", "")
            .parse()
            .map_err(|_| CdxmlError::malformed("font-size", ""))?;
        let raw = xml
            .attr(id, "transform")
            .ok_or_else(|| CdxmlError::malformed("transform", ""))?;
        let transformer = SvgTransformer::parse(raw)?;
        let (tx, ty) = transformer.transform(x, y);

        Ok(SvgText {
            node: id,
            x,
            y,
            font_size,
            transformer,
            bounds: BoundingBox::new(tx, ty, tx, ty),
        })
    }
}

fn float_attr(xml: &XmlTree, id: NodeId, name: &str) -> Result<f64, CdxmlError> {
    let raw = xml
        .attr(id, name)
        .ok_or_else(|| CdxmlError::malformed(name, ""))?;
    raw.parse().map_err(|_| CdxmlError::malformed(name, raw))
}

/// A parsed SVG rendering.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    pub xml: XmlTree,
    pub root: NodeId,
    pub width: f64,
    pub height: f64,
    pub paths: Vec<SvgPath>,
    pub texts: Vec<SvgText>,
}

impl SvgDocument {
    pub fn parse(svg: &str) -> Result<Self, CdxmlError> {
        let cleaned = svg.replace('\n', "").replace('\r', "");
        let xml = XmlTree::parse(&cleaned)?;
        let root = xml.root();

        let width = dimension_attr(&xml, root, "width")?;
        let height = dimension_attr(&xml, root, "height")?;

        let mut scan = ChildScan::strict(&xml, root);
        let paths = scan
            .children("path")
            .into_iter()
            .map(|p| SvgPath::parse(&xml, p))
            .collect::<Result<Vec<_>, _>>()?;
        let texts = scan
            .children("text")
            .into_iter()
            .map(|t| SvgText::parse(&xml, t))
            .collect::<Result<Vec<_>, _>>()?;
        scan.finish()?;

        Ok(SvgDocument {
            xml,
            root,
            width,
            height,
            paths,
            texts,
        })
    }

    pub fn serialize(&self) -> Result<String, CdxmlError> {
        self.xml.serialize(self.root)
    }

    /// Cut everything outside `region` and return the remainder as a fresh
    /// SVG string with a shrunk canvas. The original document is untouched.
    pub fn crop_region(&self, region: &BoundingBox) -> Result<String, CdxmlError> {
        let mut doc = self.clone();
        let removed_paths: Vec<usize> = doc
            .paths
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.bounds.is_wrapped_by(region))
            .map(|(i, _)| i)
            .collect();
        for i in removed_paths.into_iter().rev() {
            let path = doc.paths.remove(i);
            doc.xml.detach(path.node);
        }
        let removed_texts: Vec<usize> = doc
            .texts
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.bounds.is_wrapped_by(region))
            .map(|(i, _)| i)
            .collect();
        for i in removed_texts.into_iter().rev() {
            let text = doc.texts.remove(i);
            doc.xml.detach(text.node);
        }
        doc.reset_canvas()?;
        doc.serialize()
    }

    /// Shift the remaining content to a (20, 20) origin and shrink the
    /// canvas to the content extent plus a margin.
    pub fn reset_canvas(&mut self) -> Result<(), CdxmlError> {
        let boxes: Vec<BoundingBox> = self
            .paths
            .iter()
            .map(|p| p.bounds)
            .chain(self.texts.iter().map(|t| t.bounds))
            .collect();
        let Some(first) = boxes.first() else {
            return Ok(());
        };
        let mut left = first.left;
        let mut top = first.top;
        let mut right = first.right;
        let mut bottom = first.bottom;
        for b in &boxes[1..] {
            left = left.min(b.left);
            top = top.min(b.top);
            right = right.max(b.right);
            bottom = bottom.max(b.bottom);
        }
        let offset = (20.0 - left, 20.0 - top);
        self.set_canvas_box(right - left + 50.0, bottom - top + 50.0);

        for i in 0..self.paths.len() {
            let d = self.paths[i].offset_d(offset)?;
            let node = self.paths[i].node;
            self.xml.set_attr(node, "d", d);
        }
        for i in 0..self.texts.len() {
            let t = &self.texts[i];
            let (x, y) = (t.bounds.left + offset.0, t.bounds.top + offset.1);
            let (nx, ny) = t.transformer.reverse_transform(x, y)?;
            let node = t.node;
            self.xml.set_attr(node, "x", format!("{}", nx));
            self.xml.set_attr(node, "y", format!("{}", ny));
        }
        Ok(())
    }

    fn set_canvas_box(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.xml.set_attr(self.root, "width", format!("{}px", width));
        self.xml.set_attr(self.root, "height", format!("{}px", height));
        self.xml
            .set_attr(self.root, "viewBox", format!("0 0 {:.6} {:.6}", width, height));
    }
}

fn dimension_attr(xml: &XmlTree, id: NodeId, name: &str) -> Result<f64, CdxmlError> {
    let raw = xml
        .attr(id, name)
        .ok_or_else(|| CdxmlError::malformed(name, ""))?;
    raw.replace("px", "")
        .parse()
        .map_err(|_| CdxmlError::malformed(name, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SvgDocument {
        SvgDocument::parse(
            r#"<svg width="400px" height="300px"><path d="M 0,0 L 10,10 Z" transform="matrix(1 0 0 1 50 60)"/><path d="M 0,0 L 5,5 Z" transform="matrix(1 0 0 1 300 200)"/><text x="52" y="70" font-size="12px" transform="matrix(1 0 0 1 0 0)">OH</text></svg>"#,
        )
        .unwrap()
    }

    #[test]
    fn paths_get_canvas_space_boxes() {
        let doc = sample();
        assert_eq!(doc.paths[0].bounds.ltrb(), (50.0, 60.0, 60.0, 70.0));
        assert_eq!(doc.paths[1].bounds.ltrb(), (300.0, 200.0, 305.0, 205.0));
        assert_eq!(doc.texts[0].bounds.ltrb(), (52.0, 70.0, 52.0, 70.0));
    }

    #[test]
    fn step_parsing_reads_commands_and_skips_noise() {
        let steps = parse_steps("M 1,2 L 3,4 Z").unwrap();
        assert_eq!(
            steps,
            vec![
                PathStep::Move(1.0, 2.0),
                PathStep::Line(3.0, 4.0),
                PathStep::Close
            ]
        );
    }

    #[test]
    fn crop_keeps_only_wrapped_nodes() {
        let doc = sample();
        let cropped = doc
            .crop_region(&BoundingBox::new(40.0, 50.0, 100.0, 100.0))
            .unwrap();
        assert!(cropped.contains("OH"));
        assert!(!cropped.contains("matrix(1 0 0 1 300 200)"));
        // content shifted to a 20,20 origin with a 50-unit margin
        assert!(cropped.contains(r#"width="60px""#));
        assert!(cropped.contains(r#"height="60px""#));
    }

    #[test]
    fn unknown_svg_children_are_rejected() {
        let err = SvgDocument::parse(r#"<svg width="10px" height="10px"><defs/></svg>"#)
            .unwrap_err();
        assert!(matches!(err, CdxmlError::UnknownTag { .. }));
    }
}
