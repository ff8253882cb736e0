//! Axis-aligned bounding boxes and the spatial predicates the reaction
//! inference is built on.
//!
//! Every geometric decision in the pipeline — role assignment, plus
//! diffusion, condition grouping, child linking, renumbering — reduces to
//! one of the operations on [`BoundingBox`].

/// Side of a box, as seen from the box itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    L,
    T,
    R,
    B,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::L => "l",
            Direction::T => "t",
            Direction::R => "r",
            Direction::B => "b",
        }
    }
}

/// How [`BoundingBox::distance_to`] measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMode {
    /// Euclidean distance between the two centers.
    CenterToCenter,
    /// Minimum distance from self's four corners to the other's center.
    CornersToCenter,
}

/// An axis-aligned box with `left <= right` and `top <= bottom`.
///
/// The constructor normalizes swapped coordinates, so boxes loaded from
/// arbitrary corner pairs (arrow head/tail spans for instance) are always
/// well-formed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        BoundingBox {
            left: x1.min(x2),
            top: y1.min(y2),
            right: x1.max(x2),
            bottom: y1.max(y2),
        }
    }

    pub fn from_ltwh(l: f64, t: f64, w: f64, h: f64) -> Self {
        BoundingBox::new(l, t, l + w, t + h)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn ratio(&self) -> f64 {
        self.width() / self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.left + self.width() / 2.0,
            self.top + self.height() / 2.0,
        )
    }

    /// Whether self lies entirely inside `outer` (inclusive).
    pub fn is_wrapped_by(&self, outer: &BoundingBox) -> bool {
        outer.left <= self.left
            && outer.top <= self.top
            && outer.right >= self.right
            && outer.bottom >= self.bottom
    }

    /// Whether self's center lies inside `outer` (inclusive).
    pub fn is_contained_by(&self, outer: &BoundingBox) -> bool {
        let (x, y) = self.center();
        x >= outer.left && x <= outer.right && y >= outer.top && y <= outer.bottom
    }

    /// Whether `other`'s center lies inside self (inclusive).
    pub fn contains_center_of(&self, other: &BoundingBox) -> bool {
        other.is_contained_by(self)
    }

    /// `((l+ox)*sx, (t+oy)*sy, (r+ox)*sx, (b+oy)*sy)`.
    pub fn offset_then_scale(&self, offset: (f64, f64), scale: (f64, f64)) -> Self {
        let (ox, oy) = offset;
        let (sx, sy) = scale;
        BoundingBox::new(
            (self.left + ox) * sx,
            (self.top + oy) * sy,
            (self.right + ox) * sx,
            (self.bottom + oy) * sy,
        )
    }

    /// Grow each side outward by the given amount; negative values shrink.
    pub fn extend(&self, left: f64, top: f64, right: f64, bottom: f64) -> Self {
        BoundingBox::new(
            self.left - left,
            self.top - top,
            self.right + right,
            self.bottom + bottom,
        )
    }

    /// The side of self that faces `other`: the dimension with the larger
    /// center-to-center delta wins, ties fall to the horizontal branch.
    pub fn direction_of(&self, other: &BoundingBox) -> Direction {
        let (sx, sy) = self.center();
        let (ox, oy) = other.center();
        let h_diff = sy - oy;
        let v_diff = sx - ox;
        if h_diff.abs() > v_diff.abs() {
            if h_diff > 0.0 {
                Direction::T
            } else {
                Direction::B
            }
        } else if v_diff > 0.0 {
            Direction::L
        } else {
            Direction::R
        }
    }

    pub fn distance_to(&self, other: &BoundingBox, mode: DistanceMode) -> f64 {
        let (x2, y2) = other.center();
        match mode {
            DistanceMode::CenterToCenter => {
                let (x1, y1) = self.center();
                ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
            }
            DistanceMode::CornersToCenter => {
                let corners = [
                    (self.left, self.top),
                    (self.left, self.bottom),
                    (self.right, self.top),
                    (self.right, self.bottom),
                ];
                corners
                    .iter()
                    .map(|(cx, cy)| ((cx - x2).powi(2) + (cy - y2).powi(2)).sqrt())
                    .fold(f64::INFINITY, f64::min)
            }
        }
    }

    pub fn ltrb(&self) -> (f64, f64, f64, f64) {
        (self.left, self.top, self.right, self.bottom)
    }

    /// `(left, top, width, height)` rounded to two decimals, the serialized
    /// position form.
    pub fn ltwh(&self) -> (f64, f64, f64, f64) {
        (
            round2(self.left),
            round2(self.top),
            round2(self.width()),
            round2(self.height()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn constructor_normalizes_corners() {
        let b = BoundingBox::new(10.0, 20.0, 0.0, 5.0);
        assert_eq!(b.ltrb(), (0.0, 5.0, 10.0, 20.0));
        assert_eq!(b.width(), 10.0);
        assert_eq!(b.height(), 15.0);
    }

    #[test]
    fn extend_grows_and_shrinks() {
        let b = BoundingBox::new(100.0, 100.0, 200.0, 120.0);
        let ext = b.extend(200.0, 60.0, -b.width(), 60.0);
        assert_eq!(ext.ltrb(), (-100.0, 40.0, 100.0, 180.0));
    }

    #[rstest]
    #[case((150.0, 100.0), Direction::L)]
    #[case((260.0, 100.0), Direction::R)]
    #[case((200.0, 40.0), Direction::T)]
    #[case((200.0, 170.0), Direction::B)]
    fn direction_picks_dominant_axis(#[case] other_center: (f64, f64), #[case] expected: Direction) {
        let b = BoundingBox::new(190.0, 90.0, 210.0, 110.0);
        let other = BoundingBox::new(
            other_center.0 - 1.0,
            other_center.1 - 1.0,
            other_center.0 + 1.0,
            other_center.1 + 1.0,
        );
        assert_eq!(b.direction_of(&other), expected);
    }

    #[test]
    fn containment_is_inclusive_on_edges() {
        let outer = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let on_edge = BoundingBox::new(90.0, 40.0, 110.0, 60.0); // center (100, 50)
        assert!(on_edge.is_contained_by(&outer));
        assert!(outer.contains_center_of(&on_edge));
        let outside = BoundingBox::new(92.0, 40.0, 112.0, 60.0);
        assert!(!outside.is_contained_by(&outer));
    }

    #[test]
    fn corners_distance_takes_nearest_corner() {
        let b = BoundingBox::new(140.0, 90.0, 160.0, 110.0);
        let text = BoundingBox::new(140.0, 130.0, 160.0, 150.0); // center (150, 140)
        let d = b.distance_to(&text, DistanceMode::CornersToCenter);
        assert!((d - 1000.0_f64.sqrt()).abs() < 1e-9);
        let c = b.distance_to(&text, DistanceMode::CenterToCenter);
        assert!((c - 40.0).abs() < 1e-9);
    }

    #[test]
    fn offset_then_scale_round_trips() {
        let b = BoundingBox::new(12.5, 7.25, 80.0, 41.5);
        let offset = (-3.0, 11.0);
        let scale = (2.5, 0.5);
        let forward = b.offset_then_scale(offset, scale);
        let back = forward.offset_then_scale(
            (-offset.0 * scale.0, -offset.1 * scale.1),
            (1.0 / scale.0, 1.0 / scale.1),
        );
        for (a, b) in [
            (back.left, b.left),
            (back.top, b.top),
            (back.right, b.right),
            (back.bottom, b.bottom),
        ] {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn ltwh_rounds_to_two_decimals() {
        let b = BoundingBox::new(1.2345, 2.5678, 4.9999, 7.0001);
        assert_eq!(b.ltwh(), (1.23, 2.57, 3.77, 4.43));
    }
}
