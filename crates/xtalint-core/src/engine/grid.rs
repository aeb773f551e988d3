use crate::core::utils::geometry::BoundingBox;
use nalgebra::Point3;
use std::collections::HashMap;

/// Coordinates are bucketed in units of 1/100 Å so that cell boundaries fall
/// on exact integers.
const SCALE: f64 = 100.0;

type CellIndex = (i64, i64, i64);

/// A pair of points closer than the grid cutoff.
///
/// `i` indexes the first collection and `j` the second (or the same one, for
/// a self query).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointPair {
    pub i: usize,
    pub j: usize,
    pub distance: f64,
}

/// Buckets points into cubic cells whose side is the distance cutoff.
///
/// Any two points within the cutoff fall into the same cell or into one of
/// its 26 neighbors, so a pair query only compares points in adjacent cells.
/// The grid holds borrowed coordinates and never mutates after construction.
#[derive(Debug)]
pub struct SpatialGrid<'a> {
    cutoff: f64,
    cell_size: i64,
    i_points: &'a [Point3<f64>],
    j_points: &'a [Point3<f64>],
    self_query: bool,
    buckets: HashMap<CellIndex, Vec<usize>>,
}

impl<'a> SpatialGrid<'a> {
    /// A grid answering "which pairs within one collection are close".
    pub fn single(points: &'a [Point3<f64>], cutoff: f64) -> Self {
        Self::build(points, points, true, cutoff)
    }

    /// A grid answering "which pairs across two collections are close".
    ///
    /// When the bounding boxes of the collections are farther apart than the
    /// cutoff, nothing is bucketed and every query returns an empty result.
    pub fn pair(i_points: &'a [Point3<f64>], j_points: &'a [Point3<f64>], cutoff: f64) -> Self {
        Self::build(i_points, j_points, false, cutoff)
    }

    fn build(
        i_points: &'a [Point3<f64>],
        j_points: &'a [Point3<f64>],
        self_query: bool,
        cutoff: f64,
    ) -> Self {
        let cell_size = ((cutoff * SCALE).ceil() as i64).max(1);
        let mut grid = Self {
            cutoff,
            cell_size,
            i_points,
            j_points,
            self_query,
            buckets: HashMap::new(),
        };

        if !self_query && !boxes_overlap(i_points, j_points, cutoff) {
            return grid;
        }

        for (index, point) in j_points.iter().enumerate() {
            let cell = grid.cell_of(point);
            grid.buckets.entry(cell).or_default().push(index);
        }
        grid
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Whether any comparisons will be made at all.
    pub fn has_overlap(&self) -> bool {
        !self.buckets.is_empty() && !self.i_points.is_empty()
    }

    fn cell_of(&self, point: &Point3<f64>) -> CellIndex {
        let bucket = |x: f64| ((x * SCALE).floor() as i64).div_euclid(self.cell_size);
        (bucket(point.x), bucket(point.y), bucket(point.z))
    }

    /// All pairs whose distance is at most the cutoff.
    ///
    /// Pairs are ordered by `i`. For a self query each unordered pair is
    /// reported once, with `i < j`.
    pub fn pairs_within(&self) -> Vec<PointPair> {
        let mut pairs = Vec::new();
        if !self.has_overlap() {
            return pairs;
        }

        let cutoff_sq = self.cutoff * self.cutoff;
        for (i, point) in self.i_points.iter().enumerate() {
            let (cx, cy, cz) = self.cell_of(point);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(bucket) = self.buckets.get(&(cx + dx, cy + dy, cz + dz)) else {
                            continue;
                        };
                        for &j in bucket {
                            if self.self_query && j <= i {
                                continue;
                            }
                            let dist_sq = nalgebra::distance_squared(point, &self.j_points[j]);
                            if dist_sq <= cutoff_sq {
                                pairs.push(PointPair {
                                    i,
                                    j,
                                    distance: dist_sq.sqrt(),
                                });
                            }
                        }
                    }
                }
            }
        }
        pairs
    }

    /// For every point of a self query, the indices of all other points
    /// within the cutoff, in ascending order.
    pub fn neighbor_lists(&self) -> Vec<Vec<usize>> {
        let mut lists = vec![Vec::new(); self.i_points.len()];
        for pair in self.pairs_within() {
            lists[pair.i].push(pair.j);
            if self.self_query {
                lists[pair.j].push(pair.i);
            }
        }
        for list in &mut lists {
            list.sort_unstable();
        }
        lists
    }
}

fn boxes_overlap(a: &[Point3<f64>], b: &[Point3<f64>], margin: f64) -> bool {
    match (BoundingBox::from_points(a), BoundingBox::from_points(b)) {
        (Some(box_a), Some(box_b)) => box_a.overlaps(&box_b, margin),
        _ => false,
    }
}
