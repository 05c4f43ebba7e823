//! Bounding boxes and the normalized `class xc yc w h` label format

pub mod boxes;
pub mod codec;
pub mod file;

pub use boxes::{LabeledBox, NormalizedBox, PixelBox};
pub use codec::{decode_line, encode_line, MalformedLine};
pub use file::LabelFile;
