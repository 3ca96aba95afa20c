/// Axis-aligned 2D boxes, oriented 3D boxes, detections
pub mod bbox;

/// Sutherland-Hodgman clipping of convex footprints
pub mod clipping;

/// Convex hull vertices and areas
pub mod hull;

/// Rotating-calipers minimum-area enclosing rectangle
pub mod mbr;
