#![warn(clippy::all)]

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{value_t, App, Arg};
use gtseg_algorithms::{
    label_propagation::propagate_labels_with_params, segment_evaluation::evaluate_segment_purity,
};
use gtseg_core::{
    params::{
        EvaluationParams, PropagationParams, DEFAULT_MATCH_DISTANCE, DEFAULT_MATCH_RADIUS,
        DEFAULT_PURITY_THRESHOLD,
    },
    LabelMap, ModelLibrary,
};
use gtseg_io::{
    load_frame_poses, load_model_library, read_ascii_cloud_from_path,
    read_scene_list_from_path, read_segment_cloud_from_path,
};
use gtseg_tools::{load_label_map, prepare_scene};
use log::{debug, info, warn};
use rayon::prelude::*;

struct Args {
    pub root_dir: PathBuf,
    pub mesh_dir: PathBuf,
    pub output_file: PathBuf,
    pub first_frame: usize,
    pub last_frame: usize,
    pub leaf_size: f64,
    pub propagation: PropagationParams,
    pub evaluation: EvaluationParams,
    pub class_list: Option<PathBuf>,
}

fn required_path(matches: &clap::ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .value_of(name)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("Missing argument {}", name))
}

fn get_args() -> Result<Args> {
    let default_radius = DEFAULT_MATCH_RADIUS.to_string();
    let default_match_distance = DEFAULT_MATCH_DISTANCE.to_string();
    let default_purity = DEFAULT_PURITY_THRESHOLD.to_string();
    let matches = App::new("gtseg evaluate")
        .version("0.1")
        .author("Pascal Bormann <pascal.bormann@igd.fraunhofer.de>")
        .about("Evaluates the segment purity of all frames of all test scenes against their ground truth poses")
        .arg(Arg::with_name("ROOT").long("p").takes_value(true).value_name("DIR").help("Root directory containing test_scene.txt and one directory per scene").required(true))
        .arg(Arg::with_name("MESHES").long("meshes").takes_value(true).value_name("DIR").help("Directory with one OBJ file per object model").required(true))
        .arg(Arg::with_name("OUTPUT").long("o").takes_value(true).value_name("FILE").help("Output file for the averaged results").required(true))
        .arg(Arg::with_name("C1").long("c1").takes_value(true).value_name("FRAME").help("First frame to evaluate").default_value("0"))
        .arg(Arg::with_name("C2").long("c2").takes_value(true).value_name("FRAME").help("Last frame to evaluate (inclusive)").default_value("99"))
        .arg(Arg::with_name("SS").long("ss").takes_value(true).value_name("LEAF").help("Voxel leaf size for downsampling the scenes, 0 disables downsampling").default_value("0.005"))
        .arg(Arg::with_name("RADIUS").long("radius").takes_value(true).value_name("RADIUS").help("Maximum distance between a scene point and a model point").default_value(&default_radius))
        .arg(Arg::with_name("MATCH_DISTANCE").long("match-distance").takes_value(true).value_name("DISTANCE").help("Maximum distance between a segment point and a ground truth point").default_value(&default_match_distance))
        .arg(Arg::with_name("PURITY").long("purity").takes_value(true).value_name("RATIO").help("Fraction of points a segment's majority label has to exceed to count as pure").default_value(&default_purity))
        .arg(Arg::with_name("CLASSES").long("classes").takes_value(true).value_name("FILE").help("Class list, one model name per line. Defaults to the models in file name order"))
        .get_matches();

    let first_frame = value_t!(matches, "C1", usize)?;
    let last_frame = value_t!(matches, "C2", usize)?;
    if first_frame > last_frame {
        bail!("Frame range {}..={} is empty", first_frame, last_frame);
    }

    Ok(Args {
        root_dir: required_path(&matches, "ROOT")?,
        mesh_dir: required_path(&matches, "MESHES")?,
        output_file: required_path(&matches, "OUTPUT")?,
        first_frame,
        last_frame,
        leaf_size: value_t!(matches, "SS", f64)?,
        propagation: PropagationParams {
            match_radius: value_t!(matches, "RADIUS", f64)?,
        },
        evaluation: EvaluationParams {
            match_distance: value_t!(matches, "MATCH_DISTANCE", f64)?,
            purity_threshold: value_t!(matches, "PURITY", f64)?,
        },
        class_list: matches.value_of("CLASSES").map(PathBuf::from),
    })
}

/// One frame of one scene
struct FrameJob<'a> {
    scene: &'a str,
    frame: usize,
}

impl FrameJob<'_> {
    fn cloud_path(&self, root: &Path) -> PathBuf {
        root.join(self.scene)
            .join(format!("{}_{}.xyz", self.scene, self.frame))
    }

    fn pose_dir(&self, root: &Path) -> PathBuf {
        root.join(self.scene).join("poses")
    }

    fn segments_path(&self, root: &Path) -> PathBuf {
        root.join(self.scene)
            .join("segments")
            .join(format!("{}_{}.xyz", self.scene, self.frame))
    }
}

struct FrameResult {
    segment_count: usize,
    purity: f64,
}

struct RunContext<'a> {
    args: &'a Args,
    models: &'a ModelLibrary,
    label_map: &'a LabelMap,
}

/// Labels and evaluates a single frame. Returns `None` if the frame is skipped because inputs are missing
fn evaluate_frame(job: &FrameJob, context: &RunContext) -> Result<Option<FrameResult>> {
    let root = &context.args.root_dir;
    let cloud_path = job.cloud_path(root);
    if !cloud_path.is_file() {
        warn!("Missing scene cloud {}, skipping", cloud_path.display());
        return Ok(None);
    }
    let segments_path = job.segments_path(root);
    if !segments_path.is_file() {
        warn!("Missing segments {}, skipping", segments_path.display());
        return Ok(None);
    }
    let pose_dir = job.pose_dir(root);
    if !pose_dir.is_dir() {
        warn!("Missing pose directory {}, skipping", pose_dir.display());
        return Ok(None);
    }

    let poses = load_frame_poses(&pose_dir, job.frame)?;
    if poses.is_empty() {
        debug!("No poses for {} frame {}, skipping", job.scene, job.frame);
        return Ok(None);
    }

    let raw_scene = read_ascii_cloud_from_path(&cloud_path)?;
    let scene = prepare_scene(&raw_scene, context.args.leaf_size);
    let ground_truth = propagate_labels_with_params(
        &scene,
        context.models,
        &poses,
        context.label_map,
        &context.args.propagation,
    )
    .with_context(|| format!("Labeling {} failed", cloud_path.display()))?;

    let segments = read_segment_cloud_from_path(&segments_path)?;
    let purity = evaluate_segment_purity(&ground_truth, &segments, &context.args.evaluation);
    info!(
        "{} frame {}: {} segments, purity {:.4}",
        job.scene,
        job.frame,
        segments.len(),
        purity.score()
    );
    Ok(Some(FrameResult {
        segment_count: segments.len(),
        purity: purity.score(),
    }))
}

fn write_summary(
    path: &Path,
    args: &Args,
    mean_segment_count: f64,
    mean_purity: f64,
) -> Result<()> {
    let mut writer = BufWriter::new(
        File::create(path).with_context(|| format!("Could not create file {}", path.display()))?,
    );
    writeln!(
        writer,
        "{} {} {} {}",
        args.leaf_size,
        args.propagation.match_radius,
        args.evaluation.match_distance,
        args.evaluation.purity_threshold
    )?;
    writeln!(writer, "{}", mean_segment_count)?;
    writeln!(writer, "{}", mean_purity)?;
    writer.flush().context("Flush failed")
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = get_args()?;
    let t_start = Instant::now();

    let scenes = read_scene_list_from_path(args.root_dir.join("test_scene.txt"))?;
    let models = load_model_library(&args.mesh_dir)?;
    let label_map = load_label_map(args.class_list.as_deref(), &models)?;
    info!(
        "Evaluating {} scenes, frames {}..={}, with {} models",
        scenes.len(),
        args.first_frame,
        args.last_frame,
        models.len()
    );

    let jobs = scenes
        .iter()
        .flat_map(|scene| {
            (args.first_frame..=args.last_frame).map(move |frame| FrameJob {
                scene: scene.as_str(),
                frame,
            })
        })
        .collect::<Vec<_>>();

    let context = RunContext {
        args: &args,
        models: &models,
        label_map: &label_map,
    };
    let results = jobs
        .par_iter()
        .map(|job| evaluate_frame(job, &context))
        .collect::<Result<Vec<_>>>()?;

    let evaluated = results.into_iter().flatten().collect::<Vec<_>>();
    let (mean_segment_count, mean_purity) = if evaluated.is_empty() {
        warn!("No frame could be evaluated");
        (0.0, 0.0)
    } else {
        let count = evaluated.len() as f64;
        (
            evaluated.iter().map(|r| r.segment_count as f64).sum::<f64>() / count,
            evaluated.iter().map(|r| r.purity).sum::<f64>() / count,
        )
    };

    write_summary(&args.output_file, &args, mean_segment_count, mean_purity)?;
    info!(
        "Evaluated {} frames in {:.2}s",
        evaluated.len(),
        t_start.elapsed().as_secs_f64()
    );
    info!("Mean segment purity: {}", mean_purity);

    Ok(())
}
