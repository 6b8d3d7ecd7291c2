use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use gtseg_core::{nalgebra::Vector3, ClassId, LabeledCloud, Segment};

use crate::text_lines::{data_lines, DataLine};

fn position_from_line(line: &DataLine) -> Result<Vector3<f64>> {
    let xyz = line.parse_leading::<f64>(3)?;
    Ok(Vector3::new(xyz[0], xyz[1], xyz[2]))
}

/// Parses the fourth column of `line` as an integer id
fn id_from_line(line: &DataLine) -> Result<u64> {
    let field = line
        .fields()
        .nth(3)
        .ok_or_else(|| anyhow!("Line {} has no id column", line.number))?;
    // ids are sometimes written as floats ("3.000000")
    match field.parse::<u64>() {
        Ok(id) => Ok(id),
        Err(_) => {
            let value = field
                .parse::<f64>()
                .with_context(|| format!("Could not parse id '{}' in line {}", field, line.number))?;
            if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
                return Err(anyhow!(
                    "Id '{}' in line {} is not a non-negative integer",
                    field,
                    line.number
                ));
            }
            Ok(value as u64)
        }
    }
}

/// Reads an ASCII point cloud from `read`. Every data line starts with `x y z`, further columns are ignored.
/// Values may be separated by whitespace or commas. Non-finite coordinates are kept as they are.
///
/// ```
/// # use std::io::Cursor;
/// # use gtseg_io::read_ascii_cloud;
/// let cloud = read_ascii_cloud(Cursor::new("# scene\n0 0 0\n1.5 2 -3 255 0 0\n")).unwrap();
/// assert_eq!(cloud.len(), 2);
/// assert_eq!(cloud[1].z, -3.0);
/// ```
pub fn read_ascii_cloud<R: BufRead>(read: R) -> Result<Vec<Vector3<f64>>> {
    data_lines(read)
        .map(|line| position_from_line(&line?))
        .collect()
}

/// Like [read_ascii_cloud](read_ascii_cloud), but reads from the file at `path`
pub fn read_ascii_cloud_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Vector3<f64>>> {
    let path = path.as_ref();
    let file = BufReader::new(
        File::open(path).with_context(|| format!("Could not open point cloud {}", path.display()))?,
    );
    read_ascii_cloud(file).with_context(|| format!("Could not read point cloud {}", path.display()))
}

/// Reads a segmented point cloud where every data line is `x y z segment_id`. Points are grouped by their
/// segment id, the resulting segments are ordered by ascending id. Point order within a segment follows the
/// order of the input.
pub fn read_segment_cloud<R: BufRead>(read: R) -> Result<Vec<Segment>> {
    let mut segments: BTreeMap<u64, Segment> = BTreeMap::new();
    for line in data_lines(read) {
        let line = line?;
        let position = position_from_line(&line)?;
        let id = id_from_line(&line)?;
        segments.entry(id).or_default().push(position);
    }
    Ok(segments.into_iter().map(|(_, segment)| segment).collect())
}

/// Like [read_segment_cloud](read_segment_cloud), but reads from the file at `path`
pub fn read_segment_cloud_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Segment>> {
    let path = path.as_ref();
    let file = BufReader::new(
        File::open(path).with_context(|| format!("Could not open segment cloud {}", path.display()))?,
    );
    read_segment_cloud(file).with_context(|| format!("Could not read segment cloud {}", path.display()))
}

/// Writes a `LabeledCloud` as `x y z label` lines
pub fn write_labeled_cloud<W: Write>(mut write: W, cloud: &LabeledCloud) -> Result<()> {
    for (position, label) in cloud.iter() {
        writeln!(write, "{} {} {} {}", position.x, position.y, position.z, label)?;
    }
    write.flush().context("Flush failed")
}

/// Like [write_labeled_cloud](write_labeled_cloud), but writes to a new file at `path`
pub fn write_labeled_cloud_to_path<P: AsRef<Path>>(path: P, cloud: &LabeledCloud) -> Result<()> {
    let path = path.as_ref();
    let file = BufWriter::new(
        File::create(path).with_context(|| format!("Could not create file {}", path.display()))?,
    );
    write_labeled_cloud(file, cloud)
}

/// Reads a `LabeledCloud` written by [write_labeled_cloud](write_labeled_cloud)
pub fn read_labeled_cloud<R: BufRead>(read: R) -> Result<LabeledCloud> {
    let (positions, labels): (Vec<_>, Vec<_>) = data_lines(read)
        .map(|line| -> Result<(Vector3<f64>, ClassId)> {
            let line = line?;
            let position = position_from_line(&line)?;
            let label = id_from_line(&line)?;
            let label = ClassId::try_from(label)
                .with_context(|| format!("Label {} in line {} is out of range", label, line.number))?;
            Ok((position, label))
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .unzip();
    LabeledCloud::new(positions, labels)
}

/// Writes one label per line, in segment order
pub fn write_segment_labels<W: Write>(mut write: W, labels: &[ClassId]) -> Result<()> {
    for label in labels {
        writeln!(write, "{}", label)?;
    }
    write.flush().context("Flush failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::io::Cursor;

    #[test]
    fn test_read_ascii_cloud() -> Result<()> {
        let text = "0.1 0.2 0.3\n\n# comment\n1,2,3,99\nnan 0 0\n";
        let cloud = read_ascii_cloud(Cursor::new(text))?;
        assert_eq!(cloud.len(), 3);
        assert_approx_eq!(cloud[0].y, 0.2);
        assert_eq!(cloud[1], Vector3::new(1.0, 2.0, 3.0));
        assert!(cloud[2].x.is_nan());
        Ok(())
    }

    #[test]
    fn test_read_ascii_cloud_reports_line() {
        let err = read_ascii_cloud(Cursor::new("0 0 0\n0 0\n")).unwrap_err();
        assert!(format!("{:#}", err).contains("Line 2"));
        let err = read_ascii_cloud(Cursor::new("0 0 0\n\n0 a 0\n")).unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));
    }

    #[test]
    fn test_read_segment_cloud_groups_by_id() -> Result<()> {
        let text = "0 0 0 7\n1 0 0 2\n2 0 0 7\n3 0 0 2.000\n4 0 0 0\n";
        let segments = read_segment_cloud(Cursor::new(text))?;
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].points(), &[Vector3::new(4.0, 0.0, 0.0)]);
        assert_eq!(
            segments[1].points(),
            &[Vector3::new(1.0, 0.0, 0.0), Vector3::new(3.0, 0.0, 0.0)]
        );
        assert_eq!(
            segments[2].points(),
            &[Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0)]
        );
        Ok(())
    }

    #[test]
    fn test_segment_cloud_rejects_bad_ids() {
        assert!(read_segment_cloud(Cursor::new("0 0 0\n")).is_err());
        assert!(read_segment_cloud(Cursor::new("0 0 0 -1\n")).is_err());
        assert!(read_segment_cloud(Cursor::new("0 0 0 1.5\n")).is_err());
    }

    #[test]
    fn test_labeled_cloud_through_text() -> Result<()> {
        let cloud = LabeledCloud::new(
            vec![Vector3::new(0.5, -1.0, 2.25), Vector3::new(3.0, 4.0, 5.0)],
            vec![0, 12],
        )?;
        let mut buffer = vec![];
        write_labeled_cloud(&mut buffer, &cloud)?;
        let text = String::from_utf8(buffer)?;
        assert_eq!(text, "0.5 -1 2.25 0\n3 4 5 12\n");

        let restored = read_labeled_cloud(Cursor::new(text))?;
        assert_eq!(restored, cloud);
        Ok(())
    }

    #[test]
    fn test_write_segment_labels() -> Result<()> {
        let mut buffer = vec![];
        write_segment_labels(&mut buffer, &[3, 0, 5])?;
        assert_eq!(String::from_utf8(buffer)?, "3\n0\n5\n");
        Ok(())
    }
}
