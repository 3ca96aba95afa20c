use crate::classes::EvalClass;
use crate::matching::max_weight_matching;
use crate::similarity::{FrameSimilarity, SimilarityEngine};
use crate::utils::bbox::{BoundingBox, Detection};
use crate::Errors;
use anyhow::Result;
use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Filtering policy. The defaults carry the KITTI constants; keeping them
/// explicit makes the policy testable and swappable per dataset variant.
///
#[derive(Debug, Clone, Copy)]
pub struct FilterPolicy {
    /// Ground-truth boxes occluded beyond this level count as distractors.
    pub max_occlusion: i32,
    /// Ground-truth boxes truncated beyond this level count as distractors.
    pub max_truncation: i32,
    /// Unmatched tracker boxes at or below this pixel height are dropped.
    pub min_height: f64,
    /// 2D IoU entries below this value do not participate in matching.
    pub matching_threshold: f64,
    /// Unmatched tracker boxes covered by a crowd ignore region beyond this
    /// own-area fraction are dropped.
    pub crowd_overlap_threshold: f64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            max_occlusion: 2,
            max_truncation: 0,
            min_height: 25.0,
            matching_threshold: 0.25,
            crowd_overlap_threshold: 0.5,
        }
    }
}

/// One ground-truth annotation at one timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct GtRecord {
    pub id: i64,
    pub class_id: i64,
    pub truncation: i32,
    pub occlusion: i32,
    pub det: Detection,
}

/// One tracker detection at one timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerRecord {
    pub id: i64,
    pub class_id: i64,
    pub confidence: f64,
    pub det: Detection,
}

/// One timestep as handed over by the loader. Never mutated here: every class
/// evaluation derives its own filtered view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    pub gt: Vec<GtRecord>,
    pub tracker: Vec<TrackerRecord>,
    pub ignore_regions: Vec<BoundingBox>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawSequence {
    pub seq: String,
    pub frames: Vec<RawFrame>,
}

/// One preprocessed timestep: dense relabeled ids, surviving detections, and
/// the similarity matrix restricted to the survivors.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedFrame {
    pub gt_ids: Vec<usize>,
    pub gt_dets: Vec<Detection>,
    pub tracker_ids: Vec<usize>,
    pub tracker_dets: Vec<Detection>,
    pub tracker_confidences: Vec<f64>,
    pub similarity: DMatrix<f64>,
}

/// Per-class, per-sequence output consumed by the downstream metric. Ids are
/// dense and 0-based per evaluation call; their numeric values are not stable
/// across different class evaluations of the same sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedSequence {
    pub seq: String,
    pub frames: Vec<PreprocessedFrame>,
    pub num_gt_ids: usize,
    pub num_tracker_ids: usize,
    pub num_gt_dets: usize,
    pub num_tracker_dets: usize,
}

impl PreprocessedSequence {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }
}

// Per-frame filtering output, still carrying original ids until the
// relabeling barrier.
struct FilteredFrame {
    gt_ids: Vec<i64>,
    gt_dets: Vec<Detection>,
    tracker_ids: Vec<i64>,
    tracker_dets: Vec<Detection>,
    tracker_confidences: Vec<f64>,
    similarity: DMatrix<f64>,
}

/// Filters, matches and relabels raw sequences, one evaluation class at a
/// time, into the structure the downstream metric consumes.
pub struct Preprocessor {
    engine: SimilarityEngine,
    policy: FilterPolicy,
}

impl Preprocessor {
    pub fn new(engine: SimilarityEngine, policy: FilterPolicy) -> Self {
        Self { engine, policy }
    }

    /// Preprocesses one sequence for one evaluation class. Frames are
    /// filtered in parallel; relabeling runs afterwards as the sequential
    /// barrier that needs every frame's surviving identity set.
    pub fn preprocess(&self, raw: &RawSequence, class: EvalClass) -> Result<PreprocessedSequence> {
        let filtered: Vec<FilteredFrame> = raw
            .frames
            .par_iter()
            .enumerate()
            .map(|(t, frame)| self.filter_frame(t, frame, class))
            .collect();

        self.relabel(raw, class, filtered)
    }

    fn filter_frame(&self, t: usize, frame: &RawFrame, class: EvalClass) -> FilteredFrame {
        let cls = class.class_id();
        let distractor = class.distractor_id();

        // target class plus distractor for ground truth; tracker distractors
        // are never labeled, so tracker selection uses the target class only
        let gt: Vec<&GtRecord> = frame
            .gt
            .iter()
            .filter(|g| g.class_id == cls || g.class_id == distractor)
            .collect();
        let tracker: Vec<&TrackerRecord> =
            frame.tracker.iter().filter(|tr| tr.class_id == cls).collect();

        let gt_dets: Vec<Detection> = gt.iter().map(|g| g.det).collect();
        let tracker_dets: Vec<Detection> = tracker.iter().map(|tr| tr.det).collect();

        let FrameSimilarity { giou3d, iou2d } = self.engine.frame_matrices(&gt_dets, &tracker_dets);

        // threshold the 2D IoU and match; assignments whose thresholded
        // weight is exactly zero are discarded as unmatched
        let mut matching_scores = iou2d;
        matching_scores.iter_mut().for_each(|v| {
            if *v < self.policy.matching_threshold {
                *v = 0.0;
            }
        });

        let mut remove_tracker = vec![false; tracker.len()];
        let mut matched = vec![false; tracker.len()];
        if !gt.is_empty() && !tracker.is_empty() {
            for (row, col) in max_weight_matching(&matching_scores) {
                if matching_scores[(row, col)] <= 0.0 {
                    continue;
                }
                matched[col] = true;
                // a matched tracker box inherits its ground truth's
                // distractor, occlusion and truncation verdicts
                let g = gt[row];
                if g.class_id == distractor
                    || g.occlusion > self.policy.max_occlusion
                    || g.truncation > self.policy.max_truncation
                {
                    remove_tracker[col] = true;
                }
            }
        }

        // unmatched tracker boxes: too small, or excused into a crowd region
        for (col, tr) in tracker.iter().enumerate() {
            if matched[col] {
                continue;
            }
            let too_small = tr.det.bbox.height() <= self.policy.min_height;
            let in_crowd = frame
                .ignore_regions
                .iter()
                .any(|region| tr.det.bbox.ioa(region) > self.policy.crowd_overlap_threshold);
            if too_small || in_crowd {
                remove_tracker[col] = true;
            }
        }

        // drop marked tracker boxes and the ground-truth boxes that existed
        // only to drive the matching, keeping the matrix in lock-step
        let keep_cols: Vec<usize> = (0..tracker.len()).filter(|&j| !remove_tracker[j]).collect();
        let keep_rows: Vec<usize> = gt
            .iter()
            .enumerate()
            .filter(|(_, g)| {
                g.class_id == cls
                    && g.occlusion <= self.policy.max_occlusion
                    && g.truncation <= self.policy.max_truncation
            })
            .map(|(i, _)| i)
            .collect();

        debug!(
            "frame {}: gt {} -> {}, tracker {} -> {}",
            t,
            gt.len(),
            keep_rows.len(),
            tracker.len(),
            keep_cols.len()
        );

        let similarity = giou3d
            .select_rows(keep_rows.iter())
            .select_columns(keep_cols.iter());

        FilteredFrame {
            gt_ids: keep_rows.iter().map(|&i| gt[i].id).collect(),
            gt_dets: keep_rows.iter().map(|&i| gt[i].det).collect(),
            tracker_ids: keep_cols.iter().map(|&j| tracker[j].id).collect(),
            tracker_dets: keep_cols.iter().map(|&j| tracker[j].det).collect(),
            tracker_confidences: keep_cols.iter().map(|&j| tracker[j].confidence).collect(),
            similarity,
        }
    }

    fn relabel(
        &self,
        raw: &RawSequence,
        class: EvalClass,
        filtered: Vec<FilteredFrame>,
    ) -> Result<PreprocessedSequence> {
        let mut gt_seen = BTreeSet::new();
        let mut tracker_seen = BTreeSet::new();
        let mut num_gt_dets = 0;
        let mut num_tracker_dets = 0;
        for f in &filtered {
            gt_seen.extend(f.gt_ids.iter().copied());
            tracker_seen.extend(f.tracker_ids.iter().copied());
            num_gt_dets += f.gt_ids.len();
            num_tracker_dets += f.tracker_ids.len();
        }

        // every surviving original id maps to a dense index, in sorted order
        // of the original value
        let gt_map: BTreeMap<i64, usize> =
            gt_seen.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let tracker_map: BTreeMap<i64, usize> = tracker_seen
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();

        let mut frames = Vec::with_capacity(filtered.len());
        for (t, f) in filtered.into_iter().enumerate() {
            let gt_ids: Vec<usize> = f.gt_ids.iter().map(|id| gt_map[id]).collect();
            let tracker_ids: Vec<usize> = f.tracker_ids.iter().map(|id| tracker_map[id]).collect();

            check_unique("ground truth", &gt_ids, t, &raw.seq)?;
            check_unique("tracker", &tracker_ids, t, &raw.seq)?;

            frames.push(PreprocessedFrame {
                gt_ids,
                gt_dets: f.gt_dets,
                tracker_ids,
                tracker_dets: f.tracker_dets,
                tracker_confidences: f.tracker_confidences,
                similarity: f.similarity,
            });
        }

        debug!(
            "sequence '{}' class {}: {} gt ids / {} dets, {} tracker ids / {} dets",
            raw.seq,
            class.name(),
            gt_map.len(),
            num_gt_dets,
            tracker_map.len(),
            num_tracker_dets
        );

        Ok(PreprocessedSequence {
            seq: raw.seq.clone(),
            frames,
            num_gt_ids: gt_map.len(),
            num_tracker_ids: tracker_map.len(),
            num_gt_dets,
            num_tracker_dets,
        })
    }
}

fn check_unique(kind: &'static str, ids: &[usize], frame: usize, seq: &str) -> Result<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for &id in ids {
        if !seen.insert(id) {
            return Err(Errors::DuplicateId {
                kind,
                id,
                frame,
                seq: seq.to_string(),
            }
            .into());
        }
    }
    Ok(())
}
