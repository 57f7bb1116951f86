use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, TentError};
use crate::model::preference::PreferenceEntry;
use crate::model::slot::TentCapacity;

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| TentError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

fn records<R: Read>(input: R, source: &str) -> Result<Vec<(u64, Vec<String>)>> {
    let mut reader = csv_reader(input);
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| TentError::Csv {
            path: source.to_string(),
            source: e,
        })?;
        let line = record.position().map_or(0, |position| position.line());
        rows.push((line, record.iter().map(str::to_string).collect()));
    }
    Ok(rows)
}

/// Reads headerless `from,to,score` rows.
pub fn read_preferences<R: Read>(input: R, source: &str) -> Result<Vec<PreferenceEntry>> {
    let entries = records(input, source)?
        .into_iter()
        .map(|(line, fields)| {
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            PreferenceEntry::parse(&fields, line)
        })
        .collect::<Result<Vec<_>>>()?;
    debug!("Read {} preferences from {}", entries.len(), source);
    Ok(entries)
}

/// Reads headerless `label,capacity` rows.
pub fn read_capacities<R: Read>(input: R, source: &str) -> Result<Vec<TentCapacity>> {
    let tents = records(input, source)?
        .into_iter()
        .map(|(_, fields)| {
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            TentCapacity::parse(&fields)
        })
        .collect::<Result<Vec<_>>>()?;
    debug!("Read {} tents from {}", tents.len(), source);
    Ok(tents)
}

pub fn load_preferences(path: &Path) -> Result<Vec<PreferenceEntry>> {
    read_preferences(open(path)?, &path.to_string_lossy())
}

pub fn load_capacities(path: &Path) -> Result<Vec<TentCapacity>> {
    read_capacities(open(path)?, &path.to_string_lossy())
}
