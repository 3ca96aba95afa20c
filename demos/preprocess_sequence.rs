use anyhow::Result;
use trackscore::classes::{CLASS_CAR, CLASS_VAN};
use trackscore::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let engine = SimilarityEngine::new(BoxEncoding::CenterHwlYaw, OverlapMode::IoU)?;
    let preprocessor = Preprocessor::new(engine, FilterPolicy::default());

    // one car tracked cleanly, one van distractor picked up by the tracker,
    // and one stray short detection
    let car = Detection::new(
        BoundingBox::new(100.0, 100.0, 220.0, 190.0),
        Box3D::new(1.5, 1.6, 4.0, 2.0, 1.2, 18.0, 0.1),
    );
    let van = Detection::new(
        BoundingBox::new(400.0, 110.0, 540.0, 210.0),
        Box3D::new(2.1, 1.9, 5.2, -4.0, 1.3, 22.0, -0.3),
    );
    let stray = Detection::new(
        BoundingBox::new(700.0, 150.0, 712.0, 170.0),
        Box3D::new(1.4, 1.5, 3.8, 9.0, 1.2, 40.0, 0.0),
    );

    let frame = RawFrame {
        gt: vec![
            GtRecord {
                id: 3,
                class_id: CLASS_CAR,
                truncation: 0,
                occlusion: 0,
                det: car,
            },
            GtRecord {
                id: 7,
                class_id: CLASS_VAN,
                truncation: 0,
                occlusion: 1,
                det: van,
            },
        ],
        tracker: vec![
            TrackerRecord {
                id: 21,
                class_id: CLASS_CAR,
                confidence: 0.94,
                det: car,
            },
            TrackerRecord {
                id: 22,
                class_id: CLASS_CAR,
                confidence: 0.71,
                det: van,
            },
            TrackerRecord {
                id: 23,
                class_id: CLASS_CAR,
                confidence: 0.15,
                det: stray,
            },
        ],
        ignore_regions: vec![],
    };

    let raw = RawSequence {
        seq: "0001".to_string(),
        frames: vec![frame],
    };

    let data = preprocessor.preprocess(&raw, EvalClass::Car)?;

    // the van match and the short stray are gone, the clean car pair remains
    assert_eq!(data.num_gt_ids, 1);
    assert_eq!(data.num_tracker_ids, 1);

    for (t, frame) in data.frames.iter().enumerate() {
        eprintln!(
            "frame {}: gt ids {:?}, tracker ids {:?} (confidences {:?})",
            t, frame.gt_ids, frame.tracker_ids, frame.tracker_confidences
        );
        eprintln!("similarity: {}", frame.similarity);
    }
    eprintln!(
        "sequence '{}': {} gt dets, {} tracker dets over {} frames",
        data.seq,
        data.num_gt_dets,
        data.num_tracker_dets,
        data.num_frames()
    );

    Ok(())
}
