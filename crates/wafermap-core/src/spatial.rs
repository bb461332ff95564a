use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::chip::{ChipGrid, ChipId};
use crate::geometry::{BBox, Point};

/// An entry in the R-tree spatial index, referencing a chip by id.
#[derive(Debug, Clone)]
pub struct ChipEntry {
    pub chip_id: ChipId,
    pub bbox: BBox,
}

impl RTreeObject for ChipEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

impl PointDistance for ChipEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = (self.bbox.min.x - point[0])
            .max(point[0] - self.bbox.max.x)
            .max(0.0);
        let dy = (self.bbox.min.y - point[1])
            .max(point[1] - self.bbox.max.y)
            .max(0.0);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.bbox.contains_point(&Point::new(point[0], point[1]))
    }
}

/// Spatial index for pointer hit-testing and viewport culling.
///
/// Only inside chips are indexed; outside chips are not interactive targets.
pub struct SpatialIndex {
    tree: RTree<ChipEntry>,
}

impl SpatialIndex {
    /// Bulk-load the index from a generated grid.
    pub fn build(grid: &ChipGrid) -> Self {
        let entries: Vec<ChipEntry> = grid
            .inside_chips()
            .map(|c| ChipEntry {
                chip_id: c.id,
                bbox: c.bbox(),
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// All chips whose rectangle contains the given point.
    pub fn query_point(&self, point: &Point) -> Vec<&ChipEntry> {
        self.tree.locate_all_at_point(&[point.x, point.y]).collect()
    }

    /// The chip under a pointer position, if any.
    pub fn chip_at(&self, point: &Point) -> Option<ChipId> {
        self.tree
            .locate_all_at_point(&[point.x, point.y])
            .next()
            .map(|e| e.chip_id)
    }

    /// All chips intersecting the given viewport box.
    pub fn query_viewport(&self, viewport: &BBox) -> Vec<&ChipEntry> {
        let envelope = AABB::from_corners(
            [viewport.min.x, viewport.min.y],
            [viewport.max.x, viewport.max.y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid;
    use crate::wafer::{ChipSpec, WaferSpec};

    fn test_grid() -> ChipGrid {
        grid::generate(&WaferSpec::new(10.0, 0.0, 0.0), &ChipSpec::new(2.0, 2.0)).unwrap()
    }

    #[test]
    fn test_index_holds_inside_chips_only() {
        let grid = test_grid();
        let index = SpatialIndex::build(&grid);
        assert_eq!(index.len(), grid.inside_count());
    }

    #[test]
    fn test_point_query_hits_containing_chip() {
        let grid = test_grid();
        let index = SpatialIndex::build(&grid);

        let id = index.chip_at(&Point::new(0.0, 0.0)).unwrap();
        let chip = grid.chip(id).unwrap();
        assert!(chip.bbox().contains_point(&Point::new(0.0, 0.0)));

        // Far off the wafer: nothing.
        assert!(index.chip_at(&Point::new(100.0, 0.0)).is_none());
    }

    #[test]
    fn test_viewport_query() {
        let grid = test_grid();
        let index = SpatialIndex::build(&grid);

        // A box over the top-left quadrant picks up a strict subset.
        let viewport = BBox::new(Point::new(-4.0, -4.0), Point::new(0.0, 0.0));
        let hits = index.query_viewport(&viewport);
        assert!(!hits.is_empty());
        assert!(hits.len() < index.len());
    }
}
