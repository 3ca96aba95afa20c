use crate::{Errors, EPS};
use anyhow::Result;
use geo::{Coord, LineString, Polygon};
use nalgebra::{distance, Point3, Rotation3, Vector3};

/// Axis-aligned bounding box in the image plane, stored as the
/// (x0, y0, x1, y1) corner pair.
///
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Pixel height. The preprocessor drops unmatched tracker boxes whose
    /// height falls below its minimum.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn intersection(l: &BoundingBox, r: &BoundingBox) -> f64 {
        let (x1, y1) = (l.x0.max(r.x0), l.y0.max(r.y0));
        let (x2, y2) = (l.x1.min(r.x1), l.y1.min(r.y1));

        let int_width = x2 - x1;
        let int_height = y2 - y1;

        if int_width > 0.0 && int_height > 0.0 {
            int_width * int_height
        } else {
            0.0
        }
    }

    /// Intersection over union.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let intersection = BoundingBox::intersection(self, other);
        let union = self.area() + other.area() - intersection;
        if union < EPS {
            0.0
        } else {
            intersection / union
        }
    }

    /// Intersection over the own area. Crowd ignore-region checks use this
    /// form: only the covered fraction of the detection matters.
    pub fn ioa(&self, other: &BoundingBox) -> f64 {
        let area = self.area();
        if area < EPS {
            0.0
        } else {
            BoundingBox::intersection(self, other) / area
        }
    }
}

/// Oriented 3D box in camera coordinates. The vertical axis is y, the stored
/// position (x, y, z) is the ground-contact point of the box, and yaw rotates
/// about the vertical axis.
///
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct Box3D {
    pub height: f64,
    pub width: f64,
    pub length: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
}

impl Box3D {
    #[allow(clippy::too_many_arguments)]
    pub fn new(height: f64, width: f64, length: f64, x: f64, y: f64, z: f64, yaw: f64) -> Self {
        Self {
            height,
            width,
            length,
            x,
            y,
            z,
            yaw,
        }
    }

    /// The 8 corner points: front-right-top, front-left-top, rear-left-top,
    /// rear-right-top, then the same order on the bottom face. The top face
    /// sits at the stored y, the bottom face at y - height. Footprint
    /// extraction relies on this exact ordering.
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let rot = Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw);
        let position = Vector3::new(self.x, self.y, self.z);

        let l2 = self.length / 2.0;
        let w2 = self.width / 2.0;
        let xs = [l2, l2, -l2, -l2];
        let zs = [w2, -w2, -w2, w2];

        let mut corners = [Point3::origin(); 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let dy = if i < 4 { 0.0 } else { -self.height };
            *corner = rot * Point3::new(xs[i % 4], dy, zs[i % 4]) + position;
        }
        corners
    }

    /// Top-face footprint over the horizontal (x, z) plane as a
    /// counter-clockwise 4-point polygon.
    pub fn footprint(corners: &[Point3<f64>; 8]) -> Polygon<f64> {
        let ring = [3usize, 2, 1, 0]
            .iter()
            .map(|&i| Coord {
                x: corners[i].x,
                y: corners[i].z,
            })
            .collect();
        Polygon::new(LineString::new(ring), vec![])
    }

    /// Volume as the product of three edge lengths taken from corner
    /// distances. Degenerate boxes come out as 0.
    pub fn volume(corners: &[Point3<f64>; 8]) -> f64 {
        let a = distance(&corners[0], &corners[1]);
        let b = distance(&corners[1], &corners[2]);
        let c = distance(&corners[0], &corners[4]);
        a * b * c
    }
}

/// One detection at one timestep: the image-plane box plus the oriented 3D
/// box.
///
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub box3d: Box3D,
}

impl Detection {
    pub fn new(bbox: BoundingBox, box3d: Box3D) -> Self {
        Self { bbox, box3d }
    }

    /// Builds a detection from the raw 11-column record
    /// [x0, y0, x1, y1, h, w, l, cx, cy, cz, yaw]. The image-plane box is
    /// always the first four columns.
    pub fn from_row(row: &[f64]) -> Result<Self> {
        if row.len() != 11 {
            return Err(Errors::MalformedDetection(row.len()).into());
        }
        Ok(Self {
            bbox: BoundingBox::new(row[0], row[1], row[2], row[3]),
            box3d: Box3D::new(
                row[4], row[5], row[6], row[7], row[8], row[9], row[10],
            ),
        })
    }
}
