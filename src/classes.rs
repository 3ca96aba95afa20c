use crate::Errors;
use anyhow::Result;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const CLASS_CAR: i64 = 1;
pub const CLASS_VAN: i64 = 2;
pub const CLASS_TRUCK: i64 = 3;
pub const CLASS_PEDESTRIAN: i64 = 4;
pub const CLASS_PERSON: i64 = 5;
pub const CLASS_CYCLIST: i64 = 6;
pub const CLASS_TRAM: i64 = 7;
pub const CLASS_MISC: i64 = 8;
pub const CLASS_DONT_CARE: i64 = 9;

/// Lookup used when ingesting KITTI label strings. `person` is the sitting
/// person label, `dontcare` marks crowd ignore regions.
pub static CLASS_NAME_TO_ID: Lazy<HashMap<&'static str, i64>> = Lazy::new(|| {
    HashMap::from([
        ("car", CLASS_CAR),
        ("van", CLASS_VAN),
        ("truck", CLASS_TRUCK),
        ("pedestrian", CLASS_PEDESTRIAN),
        ("person", CLASS_PERSON),
        ("cyclist", CLASS_CYCLIST),
        ("tram", CLASS_TRAM),
        ("misc", CLASS_MISC),
        ("dontcare", CLASS_DONT_CARE),
        ("car_2", CLASS_CAR),
    ])
});

/// Classes that can be evaluated. Each carries a designated distractor class:
/// ground-truth boxes of the distractor suppress the tracker boxes matched to
/// them without being scored themselves.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalClass {
    Car,
    Pedestrian,
}

impl EvalClass {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "car" => Ok(EvalClass::Car),
            "pedestrian" => Ok(EvalClass::Pedestrian),
            other => Err(Errors::UnsupportedClass(other.to_string()).into()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EvalClass::Car => "car",
            EvalClass::Pedestrian => "pedestrian",
        }
    }

    pub fn class_id(&self) -> i64 {
        match self {
            EvalClass::Car => CLASS_CAR,
            EvalClass::Pedestrian => CLASS_PEDESTRIAN,
        }
    }

    /// Vans distract cars, sitting persons distract pedestrians.
    pub fn distractor_id(&self) -> i64 {
        match self {
            EvalClass::Car => CLASS_VAN,
            EvalClass::Pedestrian => CLASS_PERSON,
        }
    }
}
