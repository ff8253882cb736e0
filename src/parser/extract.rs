//! Stage 1: turn first-page elements into tagged targets.

use crate::error::CdxmlError;
use crate::geometry::{round2, BoundingBox};
use crate::parser::SchemeParser;
use crate::render::{raster_region, PageRaster};
use crate::target::{ArrowData, CompoundData, Semantics, TargetKind, TargetNode, TextData};

impl SchemeParser {
    /// Page texts become text targets. A text containing commas is split
    /// into one target per chunk, with boxes sliced proportionally under a
    /// monospace assumption; the comma itself costs one cursor unit.
    pub(crate) fn extract_texts(&mut self) {
        let page_texts = self.doc.pages[0].texts.clone();
        for text_el in &page_texts {
            if text_el.value.contains(',') {
                if let Some(src_box) = text_el.bounds {
                    let per_char = src_box.width() / text_el.value.chars().count() as f64;
                    let mut cursor = 0usize;
                    for chunk in text_el.value.split(',') {
                        // chunk plus its trailing comma
                        let mut advance = chunk.chars().count() + 1;
                        let mut sub = chunk;
                        while let Some(stripped) = sub.strip_prefix(' ') {
                            sub = stripped;
                            cursor += 1;
                            advance -= 1;
                        }
                        while let Some(stripped) = sub.strip_suffix(' ') {
                            sub = stripped;
                        }

                        let tag = self.tags.next(Semantics::Text);
                        let mut sliced = src_box;
                        sliced.left = src_box.left + round2(cursor as f64 * per_char);
                        sliced.right = sliced.left + sub.chars().count() as f64 * per_char;

                        let mut node = TargetNode::new(
                            tag.clone(),
                            Semantics::Text,
                            TargetKind::Text(TextData {
                                text: sub.to_string(),
                                is_collection: false,
                            }),
                        )
                        .with_source(text_el.node, text_el.bounds);
                        node.bounds = Some(sliced);
                        let id = self.arena.push(node);
                        self.texts.insert(tag, id);

                        cursor += advance;
                    }
                    continue;
                }
            }

            let tag = self.tags.next(Semantics::Text);
            let node = TargetNode::new(
                tag.clone(),
                Semantics::Text,
                TargetKind::Text(TextData {
                    text: text_el.value.clone(),
                    is_collection: false,
                }),
            )
            .with_source(text_el.node, text_el.bounds);
            let id = self.arena.push(node);
            self.texts.insert(tag, id);
        }
    }

    /// Plus symbols come from two sources: text targets whose content is
    /// exactly `+` (retagged in place and mirrored as plus targets) and
    /// plus-symbol graphics.
    pub(crate) fn extract_plus_symbols(&mut self) {
        let plus_tags: Vec<String> = self
            .texts
            .iter()
            .filter(|(_, &id)| {
                self.arena
                    .get(id)
                    .kind
                    .as_text()
                    .map_or(false, |d| d.text == "+")
            })
            .map(|(tag, _)| tag.clone())
            .collect();
        for old_tag in plus_tags {
            let Some(id) = self.texts.shift_remove(&old_tag) else {
                continue;
            };
            let new_tag = self.tags.next(Semantics::Plus);
            {
                let node = self.arena.get_mut(id);
                node.tag = new_tag.clone();
                node.semantics = Semantics::Plus;
            }
            self.texts.insert(new_tag.clone(), id);

            let (source, source_bounds) = {
                let node = self.arena.get(id);
                (node.source, node.source_bounds)
            };
            let mut plus = TargetNode::new(new_tag.clone(), Semantics::Plus, TargetKind::Plus);
            plus.source = source;
            plus.source_bounds = source_bounds;
            plus.bounds = source_bounds;
            let plus_id = self.arena.push(plus);
            self.plus_symbols.insert(new_tag, plus_id);
        }

        let graphics = self.doc.pages[0].graphics.clone();
        for graphic in &graphics {
            if graphic.is_plus() {
                let tag = self.tags.next(Semantics::Plus);
                let node = TargetNode::new(tag.clone(), Semantics::Plus, TargetKind::Plus)
                    .with_source(graphic.node, graphic.bounds);
                let id = self.arena.push(node);
                self.plus_symbols.insert(tag, id);
            }
        }
    }

    pub(crate) fn extract_arrows(&mut self) {
        let arrows = self.doc.pages[0].arrows.clone();
        for arrow in &arrows {
            let tag = self.tags.next(Semantics::Arrow);
            let node = TargetNode::new(
                tag.clone(),
                Semantics::Arrow,
                TargetKind::Arrow(ArrowData {
                    head: arrow.head,
                    tail: arrow.tail,
                }),
            )
            .with_source(arrow.node, Some(arrow.bounds));
            let id = self.arena.push(node);
            self.arrows.insert(tag, id);
        }
    }

    /// Every fragment becomes a compound. Drawn fragments keep their
    /// serialized cdxml and, when collaborators are present, a raster crop
    /// and an SVG crop; text-only fragments carry just their label.
    pub(crate) fn extract_compounds(
        &mut self,
        raster: Option<&dyn PageRaster>,
    ) -> Result<(), CdxmlError> {
        let fragments = self.doc.pages[0].fragments.clone();
        for fragment in &fragments {
            let tag = self.tags.next(Semantics::Compound);
            let mut data = CompoundData::default();
            match fragment.text_only() {
                Some(label) => {
                    data.text = Some(label.to_string());
                }
                None => {
                    data.cdxml = self.doc.xml.serialize(fragment.node)?;
                    if let (Some(raster), Some(bounds)) = (raster, fragment.bounds) {
                        let img_size = raster.size();
                        if let Some((offset, scale)) = self.doc.raster_offset_scale(img_size) {
                            let region = raster_region(offset, scale, &bounds, img_size, 8.0);
                            data.img = raster.crop_base64(region);
                        }
                    }
                    if let (Some(svg), Some(bounds)) = (self.svg_doc.as_ref(), fragment.bounds) {
                        let img_size = (svg.width, svg.height);
                        if let Some((offset, scale)) = self.doc.raster_offset_scale(img_size) {
                            let region = raster_region(offset, scale, &bounds, img_size, 10.0);
                            let clip = BoundingBox::new(
                                region.left,
                                region.top,
                                region.right,
                                region.bottom,
                            );
                            data.svg = Some(svg.crop_region(&clip)?);
                        }
                    }
                }
            }

            let node = TargetNode::new(
                tag.clone(),
                Semantics::Compound,
                TargetKind::Compound(data),
            )
            .with_source(fragment.node, fragment.bounds);
            let id = self.arena.push(node);
            self.compounds.insert(tag, id);
        }
        Ok(())
    }
}
