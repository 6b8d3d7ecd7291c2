#![warn(clippy::all)]

//! Readers and writers for the inputs and outputs of ground truth labeling: scene and segment clouds in ASCII
//! format, OBJ model meshes, per-frame pose files and class lists.

mod ascii_cloud;
pub use self::ascii_cloud::*;

mod obj_models;
pub use self::obj_models::*;

mod poses;
pub use self::poses::*;

mod lists;
pub use self::lists::*;

mod text_lines;
