use std::io::BufRead;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// A non-empty, non-comment line of a text file together with its 1-based line number
pub(crate) struct DataLine {
    pub number: usize,
    pub text: String,
}

impl DataLine {
    /// Splits the line into fields. Whitespace and commas both act as delimiters
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|field| !field.is_empty())
    }

    /// Parses all fields of the line as `T`
    pub fn parse_all<T: FromStr>(&self) -> Result<Vec<T>>
    where
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.fields()
            .enumerate()
            .map(|(column, field)| {
                field.parse::<T>().with_context(|| {
                    format!(
                        "Could not parse column {} ('{}') of line {}",
                        column + 1,
                        field,
                        self.number
                    )
                })
            })
            .collect()
    }

    /// Parses the first `count` fields as `T`. Returns an error if the line has fewer fields
    pub fn parse_leading<T: FromStr>(&self, count: usize) -> Result<Vec<T>>
    where
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let values = self
            .fields()
            .take(count)
            .map(|field| {
                field
                    .parse::<T>()
                    .with_context(|| format!("Could not parse '{}' in line {}", field, self.number))
            })
            .collect::<Result<Vec<_>>>()?;
        if values.len() < count {
            return Err(anyhow!(
                "Line {} has {} values, expected at least {}",
                self.number,
                values.len(),
                count
            ));
        }
        Ok(values)
    }
}

/// Iterates over the lines of `read` that carry data, skipping blank lines and lines starting with `#`
pub(crate) fn data_lines<R: BufRead>(read: R) -> impl Iterator<Item = Result<DataLine>> {
    read.lines().enumerate().filter_map(|(index, line)| {
        let number = index + 1;
        match line {
            Err(why) => Some(
                Err(anyhow::Error::new(why)).with_context(|| format!("Could not read line {}", number)),
            ),
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    None
                } else {
                    Some(Ok(DataLine {
                        number,
                        text: trimmed.to_owned(),
                    }))
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_skips_comments_and_blank_lines() -> Result<()> {
        let text = "# header\n\n1 2 3\n   \n4,5,6\n";
        let lines = data_lines(Cursor::new(text)).collect::<Result<Vec<_>>>()?;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 3);
        assert_eq!(lines[1].number, 5);
        assert_eq!(lines[1].parse_all::<f64>()?, vec![4.0, 5.0, 6.0]);
        Ok(())
    }

    #[test]
    fn test_mixed_delimiters() -> Result<()> {
        let lines = data_lines(Cursor::new("1.5, 2\t3 ,4")).collect::<Result<Vec<_>>>()?;
        assert_eq!(lines[0].parse_all::<f64>()?, vec![1.5, 2.0, 3.0, 4.0]);
        Ok(())
    }

    #[test]
    fn test_parse_errors_name_the_line() {
        let lines = data_lines(Cursor::new("1 2 3\n1 x 3"))
            .collect::<Result<Vec<_>>>()
            .unwrap();
        let err = lines[1].parse_all::<f64>().unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));

        let err = lines[0].parse_leading::<f64>(4).unwrap_err();
        assert!(format!("{:#}", err).contains("Line 1"));
    }
}
