use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box, used as a cheap geometric predicate
/// by the collision-coupling protocols. A degenerate outline (`min ==
/// max` on any axis) signals "no interaction" and is skipped silently
/// wherever it appears in a sync.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Outline {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Outline {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Outline { min, max }
    }

    /// A zero-volume outline used as the canonical "nothing here"
    /// value before a mesh has contributed any geometry.
    pub fn degenerate() -> Self {
        Outline::default()
    }

    pub fn is_degenerate(&self) -> bool {
        (0..3).any(|axis| self.min[axis] == self.max[axis])
    }

    pub fn contains_point(&self, p: [f32; 3]) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }

    /// Grows this outline to also cover `p`.
    pub fn expand(&mut self, p: [f32; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Outline::degenerate();
        };
        let mut outline = Outline::new(*first, *first);
        for p in points {
            outline.expand(*p);
        }
        outline
    }
}
