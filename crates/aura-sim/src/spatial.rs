//! Radius tests and cell enumeration. Integer arithmetic only.

use aura_core::{Entity, Map, Position};

/// Largest radius a family or cache may use.
pub const MAX_RADIUS: u32 = 256;

/// Square a radius once, at configuration time.
pub fn radius_squared(radius: u32) -> i64 {
    let r = i64::from(radius);
    r * r
}

/// Returns `true` if `a` and `b` are at most `sqrt(radius_sq)` cells apart.
pub fn within_radius(a: Position, b: Position, radius_sq: i64) -> bool {
    a.distance_sq(b) <= radius_sq
}

/// Candidates within range of `center`, in the order given.
///
/// The first item is the first in-range candidate, not the nearest one.
pub fn candidates_within<'a>(
    center: Position,
    radius_sq: i64,
    candidates: impl IntoIterator<Item = &'a Entity>,
) -> impl Iterator<Item = &'a Entity> {
    candidates
        .into_iter()
        .filter(move |e| within_radius(center, e.position(), radius_sq))
}

/// Every cell offset within a radius, nearest first.
///
/// Offsets are sorted by squared distance, then by `dy`, then by `dx`, so the
/// enumeration order is fixed for a given radius.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadialPattern {
    radius: u32,
    offsets: Vec<(i32, i32)>,
}

impl RadialPattern {
    /// Precompute the pattern for `radius` (clamped to [`MAX_RADIUS`]).
    pub fn new(radius: u32) -> Self {
        let radius = radius.min(MAX_RADIUS);
        let r = radius as i32;
        let r_sq = radius_squared(radius);

        let mut offsets = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if Position::new(0, 0).distance_sq(Position::new(dx, dy)) <= r_sq {
                    offsets.push((dx, dy));
                }
            }
        }
        offsets.sort_by_key(|&(dx, dy)| (i64::from(dx * dx + dy * dy), dy, dx));

        Self { radius, offsets }
    }

    /// The radius this pattern covers.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Number of offsets in the pattern.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns `true` if the pattern is empty. It never is; radius 0 still
    /// covers the center cell.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// The offsets in enumeration order.
    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    /// Cells around `center` that lie on `map`, in enumeration order.
    pub fn cells_around<'a>(
        &'a self,
        center: Position,
        map: &'a Map,
    ) -> impl Iterator<Item = Position> + 'a {
        self.offsets
            .iter()
            .map(move |&(dx, dy)| center.offset(dx, dy))
            .filter(move |pos| map.in_bounds(*pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{Category, MapId};

    #[test]
    fn radius_boundary_is_inclusive() {
        let r_sq = radius_squared(20);
        assert_eq!(r_sq, 400);
        // 14^2 + 14^2 = 392
        assert!(within_radius(Position::new(0, 0), Position::new(14, 14), r_sq));
        // 15^2 + 15^2 = 450
        assert!(!within_radius(Position::new(0, 0), Position::new(15, 15), r_sq));
        assert!(within_radius(Position::new(0, 0), Position::new(20, 0), r_sq));
        assert!(!within_radius(Position::new(0, 0), Position::new(20, 1), r_sq));
    }

    #[test]
    fn candidates_keep_given_order() {
        let mut map = Map::new(MapId(1), 50, 50);
        for (name, x) in [("far", 40), ("mid", 10), ("near", 1)] {
            map.spawn(Entity::new(name, Category::Other).at(Position::new(x, 0)))
                .unwrap();
        }
        let names: Vec<_> = candidates_within(Position::new(0, 0), radius_squared(12), map.population())
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["mid", "near"]);
    }

    #[test]
    fn pattern_starts_at_center_and_is_sorted() {
        let pattern = RadialPattern::new(2);
        assert_eq!(pattern.offsets()[0], (0, 0));
        assert_eq!(&pattern.offsets()[1..5], &[(0, -1), (-1, 0), (1, 0), (0, 1)]);
        // 13 cells within radius 2
        assert_eq!(pattern.len(), 13);

        let dists: Vec<i32> = pattern
            .offsets()
            .iter()
            .map(|&(dx, dy)| dx * dx + dy * dy)
            .collect();
        assert!(dists.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn pattern_radius_zero_is_center_only() {
        let pattern = RadialPattern::new(0);
        assert_eq!(pattern.offsets(), &[(0, 0)]);
        assert!(!pattern.is_empty());
    }

    #[test]
    fn cells_are_clipped_to_bounds() {
        let map = Map::new(MapId(1), 10, 10);
        let pattern = RadialPattern::new(1);
        let corner: Vec<_> = pattern.cells_around(Position::new(0, 0), &map).collect();
        assert_eq!(
            corner,
            vec![Position::new(0, 0), Position::new(1, 0), Position::new(0, 1)]
        );
        assert_eq!(pattern.cells_around(Position::new(5, 5), &map).count(), 5);
    }

    #[test]
    fn pattern_radius_is_clamped() {
        assert_eq!(RadialPattern::new(u32::MAX).radius(), MAX_RADIUS);
    }
}
