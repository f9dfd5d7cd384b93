//! Reading desired listings from CSV, YAML or JSON files.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use playedit_store::Listing;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Unable to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Insufficient columns on line {line}: expected language, title, short description and full description"
    )]
    InsufficientColumns { line: u64 },

    #[error("Unknown listings format '{0}' (expected .csv, .yaml, .yml or .json)")]
    UnknownFormat(String),
}

/// Loads listings from `path`, choosing the format by extension.
///
/// CSV files have no header row; the columns are language, title, short
/// description, full description and an optional video URL.
pub fn load_listings(path: &Path) -> Result<Vec<Listing>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let parse: fn(BufReader<File>) -> Result<Vec<Listing>, LoadError> = match ext.as_str() {
        "csv" => read_csv,
        "yaml" | "yml" => read_yaml,
        "json" => read_json,
        _ => return Err(LoadError::UnknownFormat(ext)),
    };

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(BufReader::new(file))
}

fn read_yaml(reader: BufReader<File>) -> Result<Vec<Listing>, LoadError> {
    Ok(serde_yaml::from_reader(reader)?)
}

fn read_json(reader: BufReader<File>) -> Result<Vec<Listing>, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

fn read_csv(reader: BufReader<File>) -> Result<Vec<Listing>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut listings = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.len() < 4 {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(LoadError::InsufficientColumns { line });
        }
        let mut listing = Listing::new(&record[0])
            .with_title(&record[1])
            .with_short_description(&record[2])
            .with_full_description(&record[3]);
        if let Some(video) = record.get(4).filter(|v| !v.is_empty()) {
            listing = listing.with_video(video);
        }
        listings.push(listing);
    }
    Ok(listings)
}
