//! Stage 4: attach leftover texts (yields, labels, names) to the nearest
//! compound above or below them.

use std::cmp::Ordering;

use crate::geometry::DistanceMode;
use crate::parser::SchemeParser;
use crate::target::{Semantics, TargetId};

impl SchemeParser {
    pub(crate) fn link_texts_to_compounds(&mut self) {
        let text_ids: Vec<TargetId> = self.texts.values().copied().collect();
        for text_id in text_ids {
            if self.arena.get(text_id).semantics != Semantics::Text {
                continue;
            }
            let Some(text_box) = self.arena.get(text_id).bounds else {
                continue;
            };

            let fathers: Vec<TargetId> = self
                .compounds
                .values()
                .copied()
                .filter(|&id| {
                    self.arena.get(id).bounds.map_or(false, |b| {
                        text_box.is_contained_by(&b.extend(0.0, 80.0, 0.0, 80.0))
                    })
                })
                .collect();
            if fathers.is_empty() {
                continue;
            }

            // nearest father by corner distance; the first minimum wins
            let mut father_id = fathers[0];
            let mut distance = self.corner_distance(father_id, text_id);
            for &candidate in &fathers[1..] {
                let d = self.corner_distance(candidate, text_id);
                if d < distance {
                    father_id = candidate;
                    distance = d;
                }
            }

            let Some(father_box) = self.arena.get(father_id).bounds else {
                continue;
            };
            let direction = father_box.direction_of(&text_box);
            let text_tag = self.arena.get(text_id).tag.clone();
            let father_tag = self.arena.get(father_id).tag.clone();

            self.arena.get_mut(text_id).father = Some(father_tag);

            let father = self.arena.get_mut(father_id);
            father.children.distances.insert(text_tag.clone(), distance);
            let distances = father.children.distances.clone();
            let side = father.children.side_mut(direction);
            side.push(text_tag);
            side.sort_by(|a, b| {
                let da = distances.get(a).copied().unwrap_or(f64::INFINITY);
                let db = distances.get(b).copied().unwrap_or(f64::INFINITY);
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            });
        }
    }

    fn corner_distance(&self, compound_id: TargetId, text_id: TargetId) -> f64 {
        match (
            self.arena.get(compound_id).bounds,
            self.arena.get(text_id).bounds,
        ) {
            (Some(compound_box), Some(text_box)) => {
                compound_box.distance_to(&text_box, DistanceMode::CornersToCenter)
            }
            _ => f64::INFINITY,
        }
    }
}
