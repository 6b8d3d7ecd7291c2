use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use gtseg_core::LabelMap;

use crate::text_lines::data_lines;

/// Reads a list of names, one per line. Blank lines and `#` comments are skipped, surrounding whitespace is
/// removed
pub fn read_name_list<R: BufRead>(read: R) -> Result<Vec<String>> {
    data_lines(read).map(|line| line.map(|line| line.text)).collect()
}

/// Reads a class list and assigns class ids in file order, starting at 1. A name listed twice is an error
///
/// ```
/// # use std::io::Cursor;
/// # use gtseg_io::read_class_list;
/// let label_map = read_class_list(Cursor::new("# classes\ndrill\nmallet\n")).unwrap();
/// assert_eq!(label_map.class_id("mallet"), Some(2));
/// ```
pub fn read_class_list<R: BufRead>(read: R) -> Result<LabelMap> {
    LabelMap::from_names(read_name_list(read)?)
}

pub fn read_class_list_from_path<P: AsRef<Path>>(path: P) -> Result<LabelMap> {
    let path = path.as_ref();
    let file = BufReader::new(
        File::open(path).with_context(|| format!("Could not open class list {}", path.display()))?,
    );
    read_class_list(file).with_context(|| format!("Invalid class list {}", path.display()))
}

/// Reads the names of the scenes to process from the scene list file at `path`
pub fn read_scene_list_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = BufReader::new(
        File::open(path).with_context(|| format!("Could not open scene list {}", path.display()))?,
    );
    read_name_list(file).with_context(|| format!("Could not read scene list {}", path.display()))
}
