//! Geometry and label primitives shared by the scene compositor.
//!
//! Nothing in here touches pixels: boxes are plain coordinates and labels are
//! plain text, so both can be reused by tools that never decode an image.

pub mod labels;

pub use labels::{LabelFile, LabeledBox, MalformedLine, NormalizedBox, PixelBox};
