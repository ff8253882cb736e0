//! The reaction-semantic inference pipeline.
//!
//! A parse runs a fixed sequence of stages over one document:
//!
//! 1. element extraction — texts (with comma splitting), plus symbols,
//!    arrows, compounds ([`extract`])
//! 2. reaction construction — per-arrow role assignment, condition
//!    grouping, text promotion and plus diffusion ([`reactions`])
//! 3. spatial tag renumbering ([`renumber`])
//! 4. text-to-compound parent linking ([`linking`])
//!
//! Every tag→entity map is insertion-ordered; a rename pops the old tag
//! and reinserts at the tail. That ordering is part of the algorithm, not
//! an implementation detail: diffusion, renumbering tie-breaks and dump
//! order all follow it.

mod extract;
mod linking;
mod reactions;
mod renumber;

use indexmap::IndexMap;
use log::debug;

use crate::cdxml::CdxmlDocument;
use crate::error::CdxmlError;
use crate::output::{
    point_position, CanvasSize, ChildMap, CompoundEntry, ConditionEntry, GraphicParams,
    LabelEntry, Position, ReactionEntry, SchemeData,
};
use crate::render::{raster_region, Guideline, PageRaster};
use crate::svg::SvgDocument;
use crate::target::{Reaction, Semantics, TargetArena, TargetId, TargetKind};

/// Which optional payloads [`SchemeParser::dump`] includes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpOptions {
    pub with_position: bool,
    pub with_cdxml: bool,
    pub with_img: bool,
}

/// Allocates tags: `R3`, `r1`, `C2` for canonical roles, `text_4` style
/// for everything else. Counters only ever move forward, even when a
/// number is imposed during renumbering.
#[derive(Debug, Default)]
pub(crate) struct TagAllocator {
    counters: IndexMap<Semantics, u32>,
}

impl TagAllocator {
    pub fn next(&mut self, semantics: Semantics) -> String {
        let counter = self.counters.entry(semantics).or_insert(0);
        *counter += 1;
        let number = *counter;
        format_tag(semantics, number)
    }

    pub fn numbered(&mut self, semantics: Semantics, number: u32) -> String {
        let counter = self.counters.entry(semantics).or_insert(0);
        *counter += 1;
        format_tag(semantics, number)
    }
}

fn format_tag(semantics: Semantics, number: u32) -> String {
    match semantics.role_id() {
        Some(prefix) => format!("{}{}", prefix, number),
        None => format!("{}_{}", semantics.as_str(), number),
    }
}

/// One parse of one document. Holds its own tag counters and entity maps;
/// nothing is shared between parses.
pub struct SchemeParser {
    pub(crate) doc: CdxmlDocument,
    pub(crate) svg_doc: Option<SvgDocument>,
    pub(crate) arena: TargetArena,
    pub(crate) tags: TagAllocator,
    pub(crate) compounds: IndexMap<String, TargetId>,
    pub(crate) texts: IndexMap<String, TargetId>,
    pub(crate) plus_symbols: IndexMap<String, TargetId>,
    pub(crate) arrows: IndexMap<String, TargetId>,
    pub(crate) conditions: IndexMap<String, TargetId>,
    pub(crate) reactions: IndexMap<String, Reaction>,
}

impl SchemeParser {
    pub fn new(cdxml: &str, svg: Option<&str>) -> Result<Self, CdxmlError> {
        let doc = CdxmlDocument::parse(cdxml)?;
        let svg_doc = match svg {
            Some(svg) => Some(SvgDocument::parse(svg)?),
            None => None,
        };
        Ok(SchemeParser {
            doc,
            svg_doc,
            arena: TargetArena::new(),
            tags: TagAllocator::default(),
            compounds: IndexMap::new(),
            texts: IndexMap::new(),
            plus_symbols: IndexMap::new(),
            arrows: IndexMap::new(),
            conditions: IndexMap::new(),
            reactions: IndexMap::new(),
        })
    }

    /// Run the whole pipeline. `raster` feeds per-compound image crops and
    /// is optional; everything else is pure geometry.
    pub fn parse(&mut self, raster: Option<&dyn PageRaster>) -> Result<(), CdxmlError> {
        self.extract_texts();
        self.extract_plus_symbols();
        self.extract_arrows();
        self.extract_compounds(raster)?;
        debug!(
            "extracted {} texts, {} plus, {} arrows, {} compounds",
            self.texts.len(),
            self.plus_symbols.len(),
            self.arrows.len(),
            self.compounds.len()
        );
        self.build_reactions();
        self.renumber_tags();
        self.link_texts_to_compounds();
        debug!(
            "built {} reactions, {} conditions",
            self.reactions.len(),
            self.conditions.len()
        );
        Ok(())
    }

    /// Serialize everything into the stable output shape.
    pub fn dump(&self, opts: &DumpOptions) -> SchemeData {
        let mut label = Vec::new();
        for (tag, &id) in &self.arrows {
            let node = self.arena.get(id);
            let mut entry = LabelEntry {
                tag: tag.clone(),
                semantics: node.semantics.as_str().to_string(),
                text: None,
                is_collection: None,
                father: None,
                position: None,
                head_position: None,
                tail_position: None,
            };
            if opts.with_position {
                entry.position = node.bounds.as_ref().map(Position::from_box);
                if let TargetKind::Arrow(data) = &node.kind {
                    entry.head_position = Some(point_position(data.head));
                    entry.tail_position = Some(point_position(data.tail));
                }
            }
            label.push(entry);
        }
        for (tag, &id) in &self.texts {
            let node = self.arena.get(id);
            let Some(data) = node.kind.as_text() else { continue };
            label.push(LabelEntry {
                tag: tag.clone(),
                semantics: node.semantics.as_str().to_string(),
                text: Some(data.text.clone()),
                is_collection: Some(data.is_collection),
                father: node.father.clone(),
                position: if opts.with_position {
                    node.bounds.as_ref().map(Position::from_box)
                } else {
                    None
                },
                head_position: None,
                tail_position: None,
            });
        }

        let mut compound = Vec::new();
        for (tag, &id) in &self.compounds {
            let node = self.arena.get(id);
            let Some(data) = node.kind.as_compound() else { continue };
            let mut child = ChildMap::default();
            if !node.children.l.is_empty() {
                child.l = Some(node.children.l.clone());
            }
            if !node.children.t.is_empty() {
                child.t = Some(node.children.t.clone());
            }
            if !node.children.r.is_empty() {
                child.r = Some(node.children.r.clone());
            }
            if !node.children.b.is_empty() {
                child.b = Some(node.children.b.clone());
            }
            compound.push(CompoundEntry {
                tag: tag.clone(),
                semantics: node.semantics.as_str().to_string(),
                is_collection: data.is_collection,
                img: if opts.with_img { data.img.clone() } else { None },
                svg: data.svg.clone(),
                text: data.text.clone(),
                cdxml: if opts.with_cdxml {
                    data.cdxml.clone()
                } else {
                    String::new()
                },
                child,
                position: if opts.with_position {
                    node.bounds.as_ref().map(Position::from_box)
                } else {
                    None
                },
            });
        }

        let reaction = self
            .reactions
            .values()
            .map(|r| ReactionEntry {
                tag: r.tag.clone(),
                semantics: "reaction".to_string(),
                reactant: self.sorted_tags(&r.reactant),
                reagent: self.sorted_tags(&r.reagent),
                product: self.sorted_tags(&r.product),
                catalyst: self.sorted_tags(&r.catalyst),
                solvent: self.sorted_tags(&r.solvent),
                condition: self.sorted_tags(&r.condition),
            })
            .collect();

        let condition = self
            .conditions
            .iter()
            .filter_map(|(tag, &id)| {
                let node = self.arena.get(id);
                let TargetKind::Condition(data) = &node.kind else {
                    return None;
                };
                Some(ConditionEntry {
                    tag: tag.clone(),
                    semantics: node.semantics.as_str().to_string(),
                    text_list: data.text_list.clone(),
                    is_collection: data.is_collection,
                    temperature: data.temperature.clone(),
                    reaction_time: data.reaction_time.clone(),
                    stir_speed: data.stir_speed.clone(),
                    pressure: data.pressure.clone(),
                    gas: data.gas.clone(),
                })
            })
            .collect();

        SchemeData {
            graphic: GraphicParams {
                size: self.canvas_size(),
                scale: None,
            },
            label,
            compound,
            reaction,
            condition,
        }
    }

    fn canvas_size(&self) -> CanvasSize {
        let bounds = self
            .doc
            .bounds
            .or_else(|| self.doc.pages.first().and_then(|p| p.bounds));
        match bounds {
            Some(b) => CanvasSize {
                w: b.width(),
                h: b.height(),
            },
            None => CanvasSize { w: 0.0, h: 0.0 },
        }
    }

    fn sorted_tags(&self, ids: &[TargetId]) -> Vec<String> {
        let mut tags: Vec<String> = ids
            .iter()
            .map(|&id| self.arena.get(id).tag.clone())
            .collect();
        tags.sort();
        tags
    }

    /// Draw the classification overlay through the raster collaborator.
    /// Degrades to `None` with a warning instead of failing the parse.
    pub fn debug_image(&self, raster: &dyn PageRaster) -> Option<Vec<u8>> {
        let img_size = raster.size();
        let Some((offset, scale)) = self.doc.raster_offset_scale(img_size) else {
            log::warn!("document has no bounds, debug image skipped");
            return None;
        };

        let mut guides = Vec::new();
        for &id in self.compounds.values() {
            let node = self.arena.get(id);
            let (Some(bounds), Some(data)) = (node.bounds, node.kind.as_compound()) else {
                continue;
            };
            let color = match node.semantics {
                Semantics::Reagent => "blue",
                Semantics::Reactant => "purple",
                Semantics::Catalyst => "orange",
                Semantics::Solvent => "pink",
                Semantics::Product => "darkblue",
                _ => "darkgray",
            };
            let ext = if data.cdxml.is_empty() { 2.0 } else { 5.0 };
            guides.push(Guideline {
                region: raster_region(offset, scale, &bounds, img_size, ext),
                color,
                label: format!(
                    "{}{}({})",
                    node.tag,
                    if data.is_collection { "*" } else { "" },
                    node.semantics.as_str()
                ),
            });
        }
        for &id in self.conditions.values() {
            let node = self.arena.get(id);
            let Some(bounds) = node.bounds else { continue };
            let star = match &node.kind {
                TargetKind::Condition(data) if data.is_collection => "*",
                _ => "",
            };
            guides.push(Guideline {
                region: raster_region(offset, scale, &bounds, img_size, 2.0),
                color: "yellowgreen",
                label: format!("{}{}({})", node.tag, star, node.semantics.as_str()),
            });
        }
        for &id in self.texts.values() {
            let node = self.arena.get(id);
            let (Some(bounds), Some(father)) = (node.bounds, node.father.as_ref()) else {
                continue;
            };
            guides.push(Guideline {
                region: raster_region(offset, scale, &bounds, img_size, 2.0),
                color: "grey",
                label: format!("{}.text", father),
            });
        }

        let image = raster.overlay(&guides);
        if image.is_none() {
            log::warn!("raster collaborator failed, debug image skipped");
        }
        image
    }
}
