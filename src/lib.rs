/// KITTI class table and evaluatable classes
///
pub mod classes;

/// Maximum-weight bipartite matching over dense score matrices
///
pub mod matching;

/// Per-sequence, per-class detection preprocessing
///
pub mod preprocess;

pub mod prelude;

/// Oriented 3D box GIoU / 2D IoU similarity engine
///
pub mod similarity;

/// Geometry primitives: boxes, clipping, hulls, enclosing rectangles
///
pub mod utils;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum Errors {
    #[error("Class '{0}' is not evaluatable. Only [car, pedestrian] are valid.")]
    UnsupportedClass(String),
    #[error("Box encoding '{0}' is not implemented.")]
    UnsupportedBoxEncoding(String),
    #[error("A detection row must carry 11 fields, got {0}.")]
    MalformedDetection(usize),
    #[error("Duplicate {kind} id {id} in frame {frame} of sequence '{seq}'.")]
    DuplicateId {
        kind: &'static str,
        id: usize,
        frame: usize,
        seq: String,
    },
}

pub(crate) const EPS: f64 = 1e-9;
