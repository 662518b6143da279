use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};

/// Writes `value` as pretty JSON to `output`, or to stdout when no path is given.
pub fn save_json<T>(value: &T, output: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write result to {}", path.display()))?;
            eprintln!("Saved result to {}", path.display());
        }
        None => write_json(io::stdout().lock(), value).context("Failed to write result to stdout")?,
    }
    Ok(())
}

fn write_json<W, T>(mut writer: W, value: &T) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Reads an options file, or falls back to the defaults when no path is given.
pub fn read_config_or_default<T>(file_kind: &str, path: Option<&Path>) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    match path {
        Some(path) => {
            eprintln!("Loading {file_kind} from {}", path.display());
            read_json_file(file_kind, path)
        }
        None => Ok(T::default()),
    }
}
