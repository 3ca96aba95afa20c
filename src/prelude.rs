pub use crate::classes::EvalClass;
pub use crate::preprocess::{
    FilterPolicy, GtRecord, PreprocessedFrame, PreprocessedSequence, Preprocessor, RawFrame,
    RawSequence, TrackerRecord,
};
pub use crate::similarity::{BoxEncoding, FrameSimilarity, OverlapMode, SimilarityEngine};
pub use crate::utils::bbox::{BoundingBox, Box3D, Detection};
