#![warn(clippy::all)]

use std::{fs::File, io::BufWriter, path::PathBuf, time::Instant};

use anyhow::{anyhow, Context, Result};
use clap::{value_t, App, Arg};
use gtseg_algorithms::{
    label_propagation::propagate_labels_par,
    segment_evaluation::{evaluate_segment_purity_par, label_segments_par},
};
use gtseg_core::params::{EvaluationParams, PropagationParams, DEFAULT_MATCH_RADIUS};
use gtseg_io::{
    load_frame_poses, load_model_library, read_ascii_cloud_from_path,
    read_segment_cloud_from_path, write_labeled_cloud_to_path, write_segment_labels,
};
use gtseg_tools::{load_label_map, prepare_scene};
use log::{info, warn};

struct Args {
    pub input_file: PathBuf,
    pub mesh_dir: PathBuf,
    pub pose_dir: PathBuf,
    pub frame: usize,
    pub class_list: Option<PathBuf>,
    pub leaf_size: f64,
    pub propagation: PropagationParams,
    pub output_file: PathBuf,
    pub segment_file: Option<PathBuf>,
    pub segment_labels_file: Option<PathBuf>,
}

fn required_path(matches: &clap::ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .value_of(name)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("Missing argument {}", name))
}

fn get_args() -> Result<Args> {
    let default_radius = DEFAULT_MATCH_RADIUS.to_string();
    let matches = App::new("gtseg label")
        .version("0.1")
        .author("Pascal Bormann <pascal.bormann@igd.fraunhofer.de>")
        .about("Labels every point of a scene cloud with the class of the nearest posed object model")
        .arg(Arg::with_name("INPUT").long("input").short("i").takes_value(true).value_name("INPUT").help("Scene point cloud (ASCII, x y z per line)").required(true))
        .arg(Arg::with_name("MESHES").long("meshes").takes_value(true).value_name("DIR").help("Directory with one OBJ file per object model").required(true))
        .arg(Arg::with_name("POSES").long("poses").takes_value(true).value_name("DIR").help("Directory with the ground truth pose files <model>_<frame>.csv").required(true))
        .arg(Arg::with_name("FRAME").long("frame").takes_value(true).value_name("FRAME").help("Frame id of the scene").required(true))
        .arg(Arg::with_name("CLASSES").long("classes").takes_value(true).value_name("FILE").help("Class list, one model name per line. Defaults to the models in file name order"))
        .arg(Arg::with_name("SS").long("ss").takes_value(true).value_name("LEAF").help("Voxel leaf size for downsampling the scene, 0 disables downsampling").default_value("0.005"))
        .arg(Arg::with_name("RADIUS").long("radius").takes_value(true).value_name("RADIUS").help("Maximum distance between a scene point and a model point").default_value(&default_radius))
        .arg(Arg::with_name("OUTPUT").long("output").short("o").takes_value(true).value_name("OUTPUT").help("Output file for the labeled cloud (x y z label)").required(true))
        .arg(Arg::with_name("SEGMENTS").long("segments").takes_value(true).value_name("FILE").help("Segmented cloud (x y z segment_id) to evaluate against the labels"))
        .arg(Arg::with_name("SEGMENT_LABELS").long("segment-labels").takes_value(true).value_name("FILE").help("Output file for the dominant label of each segment").requires("SEGMENTS"))
        .get_matches();

    Ok(Args {
        input_file: required_path(&matches, "INPUT")?,
        mesh_dir: required_path(&matches, "MESHES")?,
        pose_dir: required_path(&matches, "POSES")?,
        frame: value_t!(matches, "FRAME", usize)?,
        class_list: matches.value_of("CLASSES").map(PathBuf::from),
        leaf_size: value_t!(matches, "SS", f64)?,
        propagation: PropagationParams {
            match_radius: value_t!(matches, "RADIUS", f64)?,
        },
        output_file: required_path(&matches, "OUTPUT")?,
        segment_file: matches.value_of("SEGMENTS").map(PathBuf::from),
        segment_labels_file: matches.value_of("SEGMENT_LABELS").map(PathBuf::from),
    })
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = get_args()?;
    let t_start = Instant::now();

    let models = load_model_library(&args.mesh_dir)?;
    info!("Loaded {} models from {}", models.len(), args.mesh_dir.display());
    let label_map = load_label_map(args.class_list.as_deref(), &models)?;

    let poses = load_frame_poses(&args.pose_dir, args.frame)?;
    if poses.is_empty() {
        warn!("No poses for frame {}, all points will be background", args.frame);
    }

    let raw_scene = read_ascii_cloud_from_path(&args.input_file)?;
    let scene = prepare_scene(&raw_scene, args.leaf_size);
    info!("Labeling {} points with {} pose instances", scene.len(), poses.len());

    let labeled = propagate_labels_par(&scene, &models, &poses, &label_map, &args.propagation)?;
    info!(
        "{} of {} points belong to an object",
        labeled.labeled_count(),
        labeled.len()
    );
    for (class_id, points) in labeled.class_segments() {
        info!(
            "  {} (class {}): {} points",
            label_map.name_of(class_id).unwrap_or("?"),
            class_id,
            points.len()
        );
    }
    write_labeled_cloud_to_path(&args.output_file, &labeled)?;
    info!("Wrote {}", args.output_file.display());

    if let Some(segment_file) = &args.segment_file {
        let segments = read_segment_cloud_from_path(segment_file)?;
        let eval_params = EvaluationParams::default();
        let purity = evaluate_segment_purity_par(&labeled, &segments, &eval_params);
        println!(
            "Segment purity: {} ({} of {} segments)",
            purity.score(),
            purity.pure_segments,
            purity.scored_segments
        );

        if let Some(labels_file) = &args.segment_labels_file {
            let labels = label_segments_par(&labeled, &segments, &eval_params);
            let file = File::create(labels_file)
                .with_context(|| format!("Could not create file {}", labels_file.display()))?;
            write_segment_labels(BufWriter::new(file), &labels)?;
            info!("Wrote {} segment labels to {}", labels.len(), labels_file.display());
        }
    }

    info!("Done in {:.2}s", t_start.elapsed().as_secs_f64());
    Ok(())
}
