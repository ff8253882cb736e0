//! Stage 2: reaction construction.
//!
//! Each arrow yields one reaction. Membership is decided on the source
//! element's geometry, so every chunk of a comma-split text votes with the
//! whole original box. Once the lists exist, condition texts collapse into
//! grouped conditions, compounds are renamed into their role, role changes
//! diffuse across plus-symbol neighborhoods, and remaining texts in role
//! lists are promoted to collection compounds.

use std::collections::HashSet;

use ego_tree::NodeId;
use indexmap::IndexMap;

use crate::cdxml::arrow_extents;
use crate::parser::SchemeParser;
use crate::target::condition::is_condition_text;
use crate::target::{
    CompoundData, ConditionData, Reaction, Semantics, TargetId, TargetKind, TargetNode,
    REACTION_ROLES,
};

impl SchemeParser {
    pub(crate) fn build_reactions(&mut self) {
        let arrow_tags: Vec<String> = self.arrows.keys().cloned().collect();
        for arrow_tag in arrow_tags {
            let arrow_id = self.arrows[&arrow_tag];
            let (bounds, head, tail) = {
                let node = self.arena.get(arrow_id);
                let TargetKind::Arrow(data) = &node.kind else {
                    continue;
                };
                let Some(bounds) = node.source_bounds else {
                    continue;
                };
                (bounds, data.head, data.tail)
            };
            let ext = arrow_extents(&bounds, head.0, tail.0);

            let reaction_tag = arrow_tag.replace("arrow", "reaction");
            let mut reaction = Reaction::new(reaction_tag.clone());

            // compounds first, then texts
            for &id in self.compounds.values() {
                let Some(source_box) = self.arena.get(id).source_bounds else {
                    continue;
                };
                if source_box.is_contained_by(&ext.tail) {
                    reaction.reactant.push(id);
                }
                if source_box.is_contained_by(&ext.head) {
                    reaction.product.push(id);
                }
                if source_box.is_contained_by(&ext.top) {
                    reaction.reagent.push(id);
                }
                if source_box.is_contained_by(&ext.bottom) {
                    reaction.solvent.push(id);
                }
            }

            let mut condition_texts: Vec<TargetId> = Vec::new();
            for &id in self.texts.values() {
                let node = self.arena.get(id);
                let Some(source_box) = node.source_bounds else {
                    continue;
                };
                if source_box.is_contained_by(&ext.top) {
                    reaction.reagent.push(id);
                }
                if source_box.is_contained_by(&ext.bottom) {
                    let is_condition = node
                        .kind
                        .as_text()
                        .map_or(false, |d| is_condition_text(&d.text));
                    if is_condition {
                        condition_texts.push(id);
                    } else {
                        reaction.solvent.push(id);
                    }
                }
            }

            reaction.condition = self.group_conditions(condition_texts);

            for role in REACTION_ROLES {
                let mut list = std::mem::take(reaction.role_list_mut(role));
                let mut i = 0;
                while i < list.len() {
                    let id = list[i];
                    let tag = self.arena.get(id).tag.clone();
                    if tag.starts_with("compound") {
                        self.change_compound_semantics(id, role);
                        let mut visited = HashSet::new();
                        if let Some(source) = self.arena.get(id).source {
                            visited.insert(source);
                        }
                        for diffused in self.diffuse_by_plus(id, &mut visited) {
                            if !list.contains(&diffused) {
                                list.push(diffused);
                            }
                        }
                    } else if tag.starts_with("text") {
                        list[i] = self.promote_text_to_compound(id, role);
                    }
                    i += 1;
                }
                *reaction.role_list_mut(role) = list;
            }

            self.reactions.insert(reaction_tag, reaction);
        }
    }

    /// Collapse the condition texts of one reaction into condition targets,
    /// one per source element: chunks split off the same text box reunite
    /// into a single condition whose box spans them all.
    fn group_conditions(&mut self, ids: Vec<TargetId>) -> Vec<TargetId> {
        let mut groups: IndexMap<Option<NodeId>, Vec<TargetId>> = IndexMap::new();
        for id in ids {
            let tag = self.arena.get(id).tag.clone();
            self.texts.shift_remove(&tag);
            groups.entry(self.arena.get(id).source).or_default().push(id);
        }

        let mut out = Vec::new();
        for (_, members) in groups {
            let condition_tag = self.tags.next(Semantics::Condition);
            for (k, &id) in members.iter().enumerate() {
                let member_tag = format!("{}_{}", condition_tag, k + 1);
                {
                    let node = self.arena.get_mut(id);
                    node.semantics = Semantics::Condition;
                    node.tag = member_tag.clone();
                }
                self.texts.insert(member_tag, id);
            }

            let texts: Vec<String> = members
                .iter()
                .map(|&id| {
                    self.arena
                        .get(id)
                        .kind
                        .as_text()
                        .map(|d| d.text.clone())
                        .unwrap_or_default()
                })
                .collect();

            let (source, source_bounds) = {
                let first = self.arena.get(members[0]);
                (first.source, first.source_bounds)
            };
            // top/bottom from the source line, left/right spanning the chunks
            let mut bounds = source_bounds;
            if let Some(b) = &mut bounds {
                let mut left = f64::INFINITY;
                let mut right = f64::NEG_INFINITY;
                for &id in &members {
                    if let Some(tb) = self.arena.get(id).bounds {
                        left = left.min(tb.left);
                        right = right.max(tb.left + tb.width());
                    }
                }
                if left.is_finite() {
                    b.left = left;
                    b.right = right;
                }
            }

            let mut node = TargetNode::new(
                condition_tag.clone(),
                Semantics::Condition,
                TargetKind::Condition(ConditionData::from_texts(texts)),
            );
            node.source = source;
            node.source_bounds = source_bounds;
            node.bounds = bounds;
            let condition_id = self.arena.push(node);
            self.conditions.insert(condition_tag, condition_id);
            out.push(condition_id);
        }
        out
    }

    /// Rename a compound into a role. The old tag leaves the index, the
    /// fresh role tag reenters at the tail.
    pub(crate) fn change_compound_semantics(&mut self, id: TargetId, role: Semantics) {
        let new_tag = self.tags.next(role);
        let old_tag = self.arena.get(id).tag.clone();
        self.compounds.shift_remove(&old_tag);
        {
            let node = self.arena.get_mut(id);
            node.semantics = role;
            node.tag = new_tag.clone();
        }
        self.compounds.insert(new_tag, id);
    }

    /// Propagate a role across plus-symbol neighborhoods: a plus within the
    /// horizontally extended compound box links to every compound within
    /// its own extended box, and role mismatches convert recursively.
    fn diffuse_by_plus(
        &mut self,
        seed: TargetId,
        visited: &mut HashSet<NodeId>,
    ) -> Vec<TargetId> {
        let seed_semantics = self.arena.get(seed).semantics;
        let mut converted = Vec::new();
        for plus_id in self.find_plus_near_compound(seed) {
            let Some(plus_source) = self.arena.get(plus_id).source else {
                continue;
            };
            if !visited.insert(plus_source) {
                continue;
            }
            for compound_id in self.find_compounds_near_plus(plus_id) {
                let Some(compound_source) = self.arena.get(compound_id).source else {
                    continue;
                };
                if !visited.insert(compound_source) {
                    continue;
                }
                if self.arena.get(compound_id).semantics != seed_semantics {
                    self.change_compound_semantics(compound_id, seed_semantics);
                    converted.push(compound_id);
                    converted.extend(self.diffuse_by_plus(compound_id, visited));
                }
            }
        }
        converted
    }

    fn find_plus_near_compound(&self, compound_id: TargetId) -> Vec<TargetId> {
        let Some(compound_box) = self.arena.get(compound_id).source_bounds else {
            return Vec::new();
        };
        let ext = compound_box.extend(80.0, 0.0, 80.0, 0.0);
        self.plus_symbols
            .values()
            .copied()
            .filter(|&id| {
                self.arena
                    .get(id)
                    .source_bounds
                    .map_or(false, |b| b.is_contained_by(&ext))
            })
            .collect()
    }

    fn find_compounds_near_plus(&self, plus_id: TargetId) -> Vec<TargetId> {
        let Some(plus_box) = self.arena.get(plus_id).source_bounds else {
            return Vec::new();
        };
        let ext = plus_box.extend(100.0, 50.0, 100.0, 50.0);
        self.compounds
            .values()
            .copied()
            .filter(|&id| {
                self.arena
                    .get(id)
                    .source_bounds
                    .map_or(false, |b| b.is_contained_by(&ext))
            })
            .collect()
    }

    /// A text sitting in a role list becomes a collection compound: the
    /// text keeps living in the label index under the role tag, and a new
    /// compound with the same geometry takes its place in the list.
    fn promote_text_to_compound(&mut self, id: TargetId, role: Semantics) -> TargetId {
        let new_tag = self.tags.next(role);
        let old_tag = self.arena.get(id).tag.clone();
        self.texts.shift_remove(&old_tag);
        {
            let node = self.arena.get_mut(id);
            node.tag = new_tag.clone();
            node.semantics = role;
        }
        self.texts.insert(new_tag.clone(), id);

        let (text, bounds, source_bounds, source) = {
            let node = self.arena.get(id);
            (
                node.kind.as_text().map(|d| d.text.clone()).unwrap_or_default(),
                node.bounds,
                node.source_bounds,
                node.source,
            )
        };
        let mut compound = TargetNode::new(
            new_tag.clone(),
            role,
            TargetKind::Compound(CompoundData {
                is_collection: true,
                text: Some(text),
                cdxml: String::new(),
                img: None,
                svg: None,
            }),
        );
        compound.bounds = bounds;
        compound.source_bounds = source_bounds;
        compound.source = source;
        let compound_id = self.arena.push(compound);
        self.compounds.insert(new_tag, compound_id);
        compound_id
    }
}
