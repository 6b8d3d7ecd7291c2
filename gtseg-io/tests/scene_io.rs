use std::fs;

use anyhow::Result;
use gtseg_core::{nalgebra::Vector3, LabeledCloud};
use gtseg_io::{
    load_frame_poses, load_model_library, read_ascii_cloud_from_path, read_class_list_from_path,
    read_labeled_cloud, read_scene_list_from_path, read_segment_cloud_from_path,
    write_labeled_cloud_to_path,
};

mod common;
use self::common::{scratch_dir, write_file};

const CUBE_OBJ: &str = "o cube\nv 0 0 0\nv 0.1 0 0\nv 0 0.1 0\nv 0 0 0.1\nf 1 2 3\n";

#[test]
fn test_load_model_library_from_directory() -> Result<()> {
    let dir = scratch_dir("models")?;
    write_file(&dir, "mallet.obj", "v 1 1 1\n")?;
    write_file(&dir, "drill.OBJ", CUBE_OBJ)?;
    write_file(&dir, "notes.txt", "v 5 5 5\n")?;
    fs::create_dir(dir.join("nested.obj"))?;

    let library = load_model_library(&dir)?;
    assert_eq!(library.names().collect::<Vec<_>>(), vec!["drill", "mallet"]);
    assert_eq!(library.get("drill").unwrap().surface_points.len(), 4);
    assert_eq!(
        library.get("mallet").unwrap().surface_points,
        vec![Vector3::new(1.0, 1.0, 1.0)]
    );

    fs::remove_dir_all(dir)?;
    Ok(())
}

#[test]
fn test_missing_model_directory_is_an_error() {
    let dir = std::env::temp_dir().join("gtseg-io-this-directory-does-not-exist");
    assert!(load_model_library(dir).is_err());
}

#[test]
fn test_load_frame_poses() -> Result<()> {
    let dir = scratch_dir("poses")?;
    write_file(&dir, "mallet_3.csv", "0.5 0 0 1 0 0 0\n")?;
    write_file(
        &dir,
        "drill_3.csv",
        "0,0,0,1,0,0,0,1,0,0,0,1\n1,0,0,1,0,0,0,1,0,0,0,1\n",
    )?;
    write_file(&dir, "drill_4.csv", "9 9 9 1 0 0 0\n")?;
    write_file(&dir, "mallet_03.csv", "7 7 7 1 0 0 0\n")?;
    write_file(&dir, "power_drill_3.csv", "2 0 0 1 0 0 0\n")?;

    let poses = load_frame_poses(&dir, 3)?;
    let names = poses
        .iter()
        .map(|pose| pose.model_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["drill", "drill", "mallet", "power_drill"]);
    assert_eq!(poses[1].translation, Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(poses[3].translation, Vector3::new(2.0, 0.0, 0.0));

    assert!(load_frame_poses(&dir, 5)?.is_empty());

    write_file(&dir, "sander_5.csv", "0 0 0 1 0 0\n")?;
    let err = load_frame_poses(&dir, 5).unwrap_err();
    assert!(format!("{:#}", err).contains("sander_5.csv"));

    fs::remove_dir_all(dir)?;
    Ok(())
}

#[test]
fn test_clouds_and_lists_from_files() -> Result<()> {
    let dir = scratch_dir("clouds")?;
    let scene = write_file(&dir, "scene_0.xyz", "0 0 0\n1 1 1\nnan nan nan\n")?;
    let segments = write_file(&dir, "segments.xyz", "0 0 0 1\n1 1 1 0\n")?;
    let classes = write_file(&dir, "classes.txt", "drill\n# unused\nmallet\n")?;
    let scenes = write_file(&dir, "test_scene.txt", "scene\n\nscene_b\n")?;

    assert_eq!(read_ascii_cloud_from_path(&scene)?.len(), 3);
    assert_eq!(read_segment_cloud_from_path(&segments)?.len(), 2);
    assert_eq!(read_class_list_from_path(&classes)?.class_id("mallet"), Some(2));
    assert_eq!(read_scene_list_from_path(&scenes)?, vec!["scene", "scene_b"]);

    let labeled = LabeledCloud::new(
        vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0)],
        vec![2, 0],
    )?;
    let out = dir.join("labeled.xyz");
    write_labeled_cloud_to_path(&out, &labeled)?;
    let restored = read_labeled_cloud(std::io::BufReader::new(fs::File::open(&out)?))?;
    assert_eq!(restored, labeled);

    let err = read_ascii_cloud_from_path(dir.join("missing.xyz")).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.xyz"));

    fs::remove_dir_all(dir)?;
    Ok(())
}
