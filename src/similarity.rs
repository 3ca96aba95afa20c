use crate::utils::bbox::{Box3D, Detection};
use crate::utils::clipping::sutherland_hodgman_clip;
use crate::utils::hull::{hull_area, hull_vertices};
use crate::utils::mbr::min_area_rect;
use crate::{Errors, EPS};
use anyhow::Result;
use geo::CoordsIter;
use nalgebra::DMatrix;
use rayon::prelude::*;

/// Box parameterizations the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxEncoding {
    /// (height, width, length, center x/y/z, yaw) — the KITTI layout.
    CenterHwlYaw,
    /// Raw 8-corner layout.
    CornersXyz,
}

/// Which overlap ratio feeds the GIoU formula: intersection over union, or
/// intersection over the first box's own volume (set-containment style).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapMode {
    IoU,
    IoA,
}

/// Scores oriented 3D box pairs with a generalized IoU: the overlap ratio
/// penalized by the gap between the boxes' union and their minimal enclosing
/// volume, normalized into [0, 1].
pub struct SimilarityEngine {
    mode: OverlapMode,
}

/// One frame's similarity pair, both shaped [gt, tracker] and kept in
/// lock-step by the preprocessor.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSimilarity {
    pub giou3d: DMatrix<f64>,
    pub iou2d: DMatrix<f64>,
}

impl SimilarityEngine {
    /// Only the center/extents/yaw parameterization is implemented. Anything
    /// else is a configuration error surfaced here, never per pair.
    pub fn new(encoding: BoxEncoding, mode: OverlapMode) -> Result<Self> {
        if encoding != BoxEncoding::CenterHwlYaw {
            return Err(Errors::UnsupportedBoxEncoding(format!("{:?}", encoding)).into());
        }
        Ok(Self { mode })
    }

    /// Normalized GIoU score for one box pair. Degenerate geometry (empty
    /// clips, zero-area hulls, zero vertical overlap) yields 0, not an error.
    pub fn score(&self, a: &Box3D, b: &Box3D) -> f64 {
        let ca = a.corners();
        let cb = b.corners();

        let fa = Box3D::footprint(&ca);
        let fb = Box3D::footprint(&cb);

        // footprint intersection, measured through the clip result's hull to
        // stay robust against numerical jitter in the clipped ring
        let inter_area = match sutherland_hodgman_clip(&fa, &fb) {
            Some(clip) => hull_area(&clip.coords_iter().collect::<Vec<_>>()),
            None => 0.0,
        };

        let top = ca[0].y.min(cb[0].y);
        let bottom = ca[4].y.max(cb[4].y);
        let intersection = inter_area * (top - bottom).max(0.0);

        let vol_a = Box3D::volume(&ca);
        let vol_b = Box3D::volume(&cb);
        let union = vol_a + vol_b - intersection;

        // enclosing volume: minimum-area rectangle over both footprints,
        // times the vertical span covering both boxes
        let combined = fa
            .coords_iter()
            .take(4)
            .chain(fb.coords_iter().take(4))
            .collect::<Vec<_>>();
        let rect = min_area_rect(&hull_vertices(&combined));
        let span = ca[0].y.max(cb[0].y) - ca[4].y.min(cb[4].y);
        let enclosing = rect.area * span;

        if union < EPS || enclosing < EPS {
            return 0.0;
        }

        let overlap = match self.mode {
            OverlapMode::IoU => intersection / union,
            OverlapMode::IoA => {
                if vol_a < EPS {
                    0.0
                } else {
                    intersection / vol_a
                }
            }
        };

        let giou = overlap - (enclosing - union) / enclosing;
        ((giou + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    /// Per-frame similarity pair for all (gt, tracker) combinations. Rows are
    /// independent, so they are distributed over the rayon pool.
    pub fn frame_matrices(&self, gt: &[Detection], tracker: &[Detection]) -> FrameSimilarity {
        let rows: Vec<(Vec<f64>, Vec<f64>)> = gt
            .par_iter()
            .map(|g| {
                tracker
                    .iter()
                    .map(|t| (self.score(&g.box3d, &t.box3d), g.bbox.iou(&t.bbox)))
                    .unzip()
            })
            .collect();

        FrameSimilarity {
            giou3d: DMatrix::from_fn(gt.len(), tracker.len(), |i, j| rows[i].0[j]),
            iou2d: DMatrix::from_fn(gt.len(), tracker.len(), |i, j| rows[i].1[j]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoxEncoding, OverlapMode, SimilarityEngine};
    use crate::utils::bbox::{BoundingBox, Box3D, Detection};

    fn engine(mode: OverlapMode) -> SimilarityEngine {
        SimilarityEngine::new(BoxEncoding::CenterHwlYaw, mode).unwrap()
    }

    #[test]
    fn unsupported_encoding_fails_fast() {
        assert!(SimilarityEngine::new(BoxEncoding::CornersXyz, OverlapMode::IoU).is_err());
    }

    #[test]
    fn identical_boxes_score_one() {
        let e = engine(OverlapMode::IoU);
        let b = Box3D::new(1.5, 1.6, 4.0, 3.0, 1.0, 15.0, 0.7);
        assert!(e.score(&b, &b) > 0.999);

        let axis_aligned = Box3D::new(2.0, 1.0, 3.0, -5.0, 0.0, 8.0, 0.0);
        assert!(e.score(&axis_aligned, &axis_aligned) > 0.999);
    }

    #[test]
    fn disjoint_boxes_score_below_half() {
        let e = engine(OverlapMode::IoU);
        let a = Box3D::new(1.5, 1.6, 4.0, 0.0, 1.0, 10.0, 0.0);
        let b = Box3D::new(1.5, 1.6, 4.0, 50.0, 1.0, 10.0, 0.0);
        let s = e.score(&a, &b);
        assert!(s < 0.5);
        assert!(s >= 0.0);
    }

    #[test]
    fn vertically_separated_boxes_do_not_intersect() {
        let e = engine(OverlapMode::IoU);
        // same footprint, stacked with a gap along the vertical axis
        let a = Box3D::new(1.5, 1.6, 4.0, 0.0, 0.0, 10.0, 0.0);
        let b = Box3D::new(1.5, 1.6, 4.0, 0.0, 10.0, 10.0, 0.0);
        assert!(e.score(&a, &b) < 0.5);
    }

    #[test]
    fn overlapping_boxes_score_above_half() {
        let e = engine(OverlapMode::IoU);
        let a = Box3D::new(1.5, 1.6, 4.0, 0.0, 1.0, 10.0, 0.2);
        let b = Box3D::new(1.5, 1.6, 4.0, 0.3, 1.0, 10.0, 0.2);
        assert!(e.score(&a, &b) > 0.5);
    }

    #[test]
    fn ioa_mode_rewards_containment() {
        // a small box fully inside a large one: intersection equals the small
        // box's own volume, so the IoA overlap saturates at 1
        let small = Box3D::new(1.0, 1.0, 1.0, 0.0, 0.5, 10.0, 0.0);
        let large = Box3D::new(3.0, 3.0, 3.0, 0.0, 1.5, 10.0, 0.0);
        let ioa = engine(OverlapMode::IoA).score(&small, &large);
        let iou = engine(OverlapMode::IoU).score(&small, &large);
        assert!(ioa > iou);
    }

    #[test]
    fn degenerate_boxes_score_zero() {
        let e = engine(OverlapMode::IoU);
        let flat = Box3D::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(e.score(&flat, &flat), 0.0);
    }

    #[test]
    fn matrices_shape_and_values() {
        let e = engine(OverlapMode::IoU);
        let b1 = Box3D::new(1.5, 1.6, 4.0, 0.0, 1.0, 10.0, 0.0);
        let b2 = Box3D::new(1.5, 1.6, 4.0, 50.0, 1.0, 10.0, 0.0);
        let gt = vec![
            Detection::new(BoundingBox::new(0.0, 0.0, 10.0, 100.0), b1),
            Detection::new(BoundingBox::new(500.0, 0.0, 510.0, 100.0), b2),
        ];
        let tracker = vec![Detection::new(BoundingBox::new(0.0, 0.0, 10.0, 100.0), b1)];

        let sim = e.frame_matrices(&gt, &tracker);
        assert_eq!(sim.giou3d.shape(), (2, 1));
        assert_eq!(sim.iou2d.shape(), (2, 1));
        assert!(sim.giou3d[(0, 0)] > 0.999);
        assert!(sim.giou3d[(1, 0)] < 0.5);
        assert!(sim.iou2d[(0, 0)] > 0.999);
        assert!(sim.iou2d[(1, 0)] < 1e-9);

        let empty = e.frame_matrices(&gt, &[]);
        assert_eq!(empty.giou3d.shape(), (2, 0));
    }
}
