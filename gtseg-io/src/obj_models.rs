use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use gtseg_core::{nalgebra::Vector3, ModelEntry, ModelLibrary};
use itertools::Itertools;
use log::{debug, warn};

use crate::text_lines::data_lines;

/// Reads the vertex positions (`v` records) of a Wavefront OBJ file. All other records are ignored
pub fn read_obj_vertices<R: BufRead>(read: R) -> Result<Vec<Vector3<f64>>> {
    let mut vertices = vec![];
    for line in data_lines(read) {
        let line = line?;
        let mut fields = line.fields();
        if fields.next() != Some("v") {
            continue;
        }
        let xyz = fields
            .take(3)
            .map(|field| {
                field
                    .parse::<f64>()
                    .with_context(|| format!("Could not parse vertex coordinate '{}' in line {}", field, line.number))
            })
            .collect::<Result<Vec<_>>>()?;
        if xyz.len() != 3 {
            return Err(anyhow!("Vertex in line {} has less than 3 coordinates", line.number));
        }
        vertices.push(Vector3::new(xyz[0], xyz[1], xyz[2]));
    }
    Ok(vertices)
}

fn is_obj_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("obj"))
            .unwrap_or(false)
}

/// Loads every `*.obj` file in `dir` into a `ModelLibrary`. Files are visited in file name order, the model
/// name is the file stem (`drill.obj` becomes `drill`) and the surface points are the vertices of the mesh.
pub fn load_model_library<P: AsRef<Path>>(dir: P) -> Result<ModelLibrary> {
    let dir = dir.as_ref();
    let paths = fs::read_dir(dir)
        .with_context(|| format!("Could not read model directory {}", dir.display()))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<PathBuf>>>()
        .with_context(|| format!("Could not list model directory {}", dir.display()))?;

    let mut models = vec![];
    for path in paths.into_iter().filter(|path| is_obj_file(path)).sorted() {
        let name = match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(name) => name.to_owned(),
            None => {
                warn!("Skipping model file with invalid name {}", path.display());
                continue;
            }
        };
        let file = BufReader::new(
            File::open(&path).with_context(|| format!("Could not open mesh {}", path.display()))?,
        );
        let vertices =
            read_obj_vertices(file).with_context(|| format!("Could not read mesh {}", path.display()))?;
        if vertices.is_empty() {
            warn!("Mesh {} has no vertices", path.display());
        }
        debug!("Loaded model {} with {} points", name, vertices.len());
        models.push(ModelEntry::new(name, vertices));
    }
    Ok(ModelLibrary::new(models))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_only_vertices() -> Result<()> {
        let obj = "# exported mesh\nmtllib drill.mtl\nv 0.0 0.1 0.2\nvn 0 0 1\nvt 0.5 0.5\nv -1 -2 -3 1.0\nf 1 2 1\n";
        let vertices = read_obj_vertices(Cursor::new(obj))?;
        assert_eq!(
            vertices,
            vec![Vector3::new(0.0, 0.1, 0.2), Vector3::new(-1.0, -2.0, -3.0)]
        );
        Ok(())
    }

    #[test]
    fn test_incomplete_vertex() {
        assert!(read_obj_vertices(Cursor::new("v 1 2\n")).is_err());
        assert!(read_obj_vertices(Cursor::new("v 1 2 z\n")).is_err());
    }
}
