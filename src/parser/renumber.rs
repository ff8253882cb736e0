//! Stage 3: deterministic tag numbering by spatial position.
//!
//! Reactants and products read left to right; reagents, catalysts,
//! solvents and conditions read top to bottom. The sort is stable and the
//! comparator explicit, so full ties keep their discovery order.

use std::cmp::Ordering;

use crate::parser::SchemeParser;
use crate::target::{Semantics, TargetId, TargetNode};

const RENUMBER_ORDER: [Semantics; 6] = [
    Semantics::Reactant,
    Semantics::Reagent,
    Semantics::Product,
    Semantics::Catalyst,
    Semantics::Solvent,
    Semantics::Condition,
];

impl SchemeParser {
    pub(crate) fn renumber_tags(&mut self) {
        for map_is_conditions in [false, true] {
            for semantics in RENUMBER_ORDER {
                let map = if map_is_conditions {
                    &self.conditions
                } else {
                    &self.compounds
                };
                let mut ids: Vec<TargetId> = map
                    .values()
                    .copied()
                    .filter(|&id| self.arena.get(id).semantics == semantics)
                    .collect();
                // a lone member keeps the tag it earned
                if ids.len() <= 1 {
                    continue;
                }
                ids.sort_by(|&a, &b| {
                    spatial_order(semantics, self.arena.get(a), self.arena.get(b))
                });

                for (i, &id) in ids.iter().enumerate() {
                    let old_tag = self.arena.get(id).tag.clone();
                    let new_tag = self.tags.numbered(semantics, (i + 1) as u32);
                    let map = if map_is_conditions {
                        &mut self.conditions
                    } else {
                        &mut self.compounds
                    };
                    map.shift_remove(&old_tag);
                    self.arena.get_mut(id).tag = new_tag;
                }
                // reinstall in sorted order at the tail of the map
                for &id in &ids {
                    let tag = self.arena.get(id).tag.clone();
                    let map = if map_is_conditions {
                        &mut self.conditions
                    } else {
                        &mut self.compounds
                    };
                    map.insert(tag, id);
                }
            }
        }
    }
}

fn spatial_order(semantics: Semantics, a: &TargetNode, b: &TargetNode) -> Ordering {
    let (Some(box_a), Some(box_b)) = (a.bounds, b.bounds) else {
        return Ordering::Equal;
    };
    let (ax, ay) = box_a.center();
    let (bx, by) = box_b.center();
    let x = ax.partial_cmp(&bx).unwrap_or(Ordering::Equal);
    let y = ay.partial_cmp(&by).unwrap_or(Ordering::Equal);
    match semantics {
        Semantics::Reactant | Semantics::Product => x.then(y),
        _ => y.then(x),
    }
}
