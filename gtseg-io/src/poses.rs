use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use gtseg_core::{
    math::rotation_from_quaternion,
    nalgebra::{Matrix3, Vector3},
    PoseInstance,
};
use itertools::Itertools;
use log::debug;

use crate::text_lines::{data_lines, DataLine};

fn pose_from_line(model_name: &str, line: &DataLine) -> Result<PoseInstance> {
    let values = line.parse_all::<f64>()?;
    let rotation = match values.len() {
        12 => Matrix3::from_row_slice(&values[3..12]),
        7 => rotation_from_quaternion(values[3], values[4], values[5], values[6])
            .with_context(|| format!("Invalid quaternion in line {}", line.number))?,
        n => bail!(
            "Pose in line {} has {} values, expected 12 (translation and rotation matrix) or 7 (translation and quaternion)",
            line.number,
            n
        ),
    };
    let translation = Vector3::new(values[0], values[1], values[2]);
    PoseInstance::new(model_name, rotation, translation)
        .with_context(|| format!("Invalid pose in line {}", line.number))
}

/// Reads all poses of `model_name` from `read`. Every data line is one instance, holding either 12 values
/// (`tx ty tz` followed by the rotation matrix in row-major order) or 7 values (`tx ty tz` followed by the
/// quaternion `qw qx qy qz`).
///
/// ```
/// # use std::io::Cursor;
/// # use gtseg_io::read_poses;
/// let poses = read_poses("drill", Cursor::new("0.1,0,0, 1,0,0, 0,1,0, 0,0,1\n0 0 0.5 1 0 0 0\n")).unwrap();
/// assert_eq!(poses.len(), 2);
/// assert_eq!(poses[1].translation.z, 0.5);
/// ```
pub fn read_poses<R: BufRead>(model_name: &str, read: R) -> Result<Vec<PoseInstance>> {
    data_lines(read)
        .map(|line| pose_from_line(model_name, &line?))
        .collect()
}

/// Splits a pose file name of the form `<model_name>_<frame_id>.csv` into model name and frame id. Model names
/// may contain underscores themselves, the frame id is the part after the last one. The frame id has to be
/// written exactly as the decimal number (`drill_3.csv`), padded ids like `drill_03.csv` don't match
pub fn parse_pose_file_name(path: &Path) -> Option<(String, usize)> {
    let extension = path.extension()?.to_str()?;
    if !extension.eq_ignore_ascii_case("csv") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (model_name, frame) = stem.rsplit_once('_')?;
    if model_name.is_empty() {
        return None;
    }
    let frame_id = frame.parse::<usize>().ok()?;
    if frame_id.to_string() != frame {
        return None;
    }
    Some((model_name.to_owned(), frame_id))
}

/// Loads all pose instances of frame `frame` from `dir`. Every file `<model_name>_<frame>.csv` contributes
/// instances of `<model_name>`. Files are read in file name order, instances within a file in line order.
/// A frame without any pose file yields an empty list.
pub fn load_frame_poses<P: AsRef<Path>>(dir: P, frame: usize) -> Result<Vec<PoseInstance>> {
    let dir = dir.as_ref();
    let paths = fs::read_dir(dir)
        .with_context(|| format!("Could not read pose directory {}", dir.display()))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<PathBuf>>>()
        .with_context(|| format!("Could not list pose directory {}", dir.display()))?;

    let mut poses = vec![];
    for (path, model_name) in paths
        .into_iter()
        .filter_map(|path| match parse_pose_file_name(&path) {
            Some((model_name, file_frame)) if file_frame == frame && path.is_file() => {
                Some((path, model_name))
            }
            _ => None,
        })
        .sorted()
    {
        let file = BufReader::new(
            File::open(&path).with_context(|| format!("Could not open pose file {}", path.display()))?,
        );
        let instances = read_poses(&model_name, file)
            .with_context(|| format!("Could not read pose file {}", path.display()))?;
        debug!("{} instance(s) of {} in frame {}", instances.len(), model_name, frame);
        poses.extend(instances);
    }
    Ok(poses)
}
