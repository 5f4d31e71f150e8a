// Where a count export comes from and how it is turned into a Dataset

use std::fmt;
use std::path::{Path, PathBuf};

use countboard_recon::model::Dataset;

use crate::error::LoadError;
use crate::fetch::{Fetcher, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// `http://` and `https://` strings are links, anything else is a path.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(trimmed.to_string())
        } else {
            Source::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => write!(f, "{}", p.display()),
            Source::Url(u) => write!(f, "{u}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Worksheet to read; first sheet when `None`. Ignored for CSV.
    pub sheet: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Spreadsheet,
    Delimited,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Format::Spreadsheet),
            "csv" | "tsv" | "txt" => Some(Format::Delimited),
            _ => None,
        }
    }

    /// Zip containers (xlsx, ods) and OLE compound files (xls) are
    /// spreadsheets; everything else is read as delimited text.
    pub fn sniff(bytes: &[u8]) -> Format {
        const ZIP: &[u8] = b"PK\x03\x04";
        const OLE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
        if bytes.starts_with(ZIP) || bytes.starts_with(OLE) {
            Format::Spreadsheet
        } else {
            Format::Delimited
        }
    }
}

/// Acquire and parse a count export.
pub fn load(source: &Source, opts: &LoadOptions) -> Result<Dataset, LoadError> {
    let dataset = match source {
        Source::Path(path) => load_path(path, opts)?,
        Source::Url(link) => {
            let bytes = Fetcher::new(opts.timeout_secs)?.download(link)?;
            load_bytes(bytes, opts)?
        }
    };
    log::info!(
        "loaded {} rows x {} columns from {source}",
        dataset.row_count(),
        dataset.columns().len()
    );
    Ok(dataset)
}

fn load_path(path: &Path, opts: &LoadOptions) -> Result<Dataset, LoadError> {
    std::fs::metadata(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match Format::from_path(path) {
        Some(Format::Spreadsheet) => crate::xlsx::read_path(path, opts.sheet.as_deref()),
        Some(Format::Delimited) => crate::csv::read_path(path),
        None => {
            // Unknown extension: decide from content
            let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            load_bytes(bytes, opts)
        }
    }
}

pub fn load_bytes(bytes: Vec<u8>, opts: &LoadOptions) -> Result<Dataset, LoadError> {
    match Format::sniff(&bytes) {
        Format::Spreadsheet => crate::xlsx::read_bytes(bytes, opts.sheet.as_deref()),
        Format::Delimited => crate::csv::read_bytes(&bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use countboard_recon::model::Cell;
    use httpmock::prelude::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("https://example.com/x"),
            Source::Url("https://example.com/x".into())
        );
        assert_eq!(
            Source::parse(" HTTP://example.com/x "),
            Source::Url("HTTP://example.com/x".into())
        );
        assert_eq!(
            Source::parse("data/conteo.xlsx"),
            Source::Path(PathBuf::from("data/conteo.xlsx"))
        );
        assert_eq!(
            Source::parse("  data/conteo.xlsx\n"),
            Source::Path(PathBuf::from("data/conteo.xlsx"))
        );
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.XLSX")), Some(Format::Spreadsheet));
        assert_eq!(Format::from_path(Path::new("a.ods")), Some(Format::Spreadsheet));
        assert_eq!(Format::from_path(Path::new("a.tsv")), Some(Format::Delimited));
        assert_eq!(Format::from_path(Path::new("a.dat")), None);
        assert_eq!(Format::from_path(Path::new("conteo")), None);
    }

    #[test]
    fn test_format_sniff() {
        assert_eq!(Format::sniff(b"PK\x03\x04rest"), Format::Spreadsheet);
        assert_eq!(Format::sniff(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1]), Format::Spreadsheet);
        assert_eq!(Format::sniff(b"Cantidad;Cantidad a contar\n"), Format::Delimited);
        assert_eq!(Format::sniff(b""), Format::Delimited);
    }

    #[test]
    fn test_load_csv_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conteo.csv");
        fs::write(&path, "Cantidad;Cantidad a contar\n10;8\n").unwrap();

        let ds = load(&Source::Path(path), &LoadOptions::default()).unwrap();
        assert_eq!(ds.row_count(), 1);
        assert_eq!(ds.cell(0, 1), Some(&Cell::Text("8".into())));
    }

    #[test]
    fn test_load_unknown_extension_sniffs_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conteo.export");
        fs::write(&path, "Cantidad,Cantidad a contar\n1,1\n2,\n").unwrap();

        let ds = load(&Source::Path(path), &LoadOptions::default()).unwrap();
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn test_load_xlsx_link() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conteo.xlsx");
        let mut wb = rust_xlsxwriter::Workbook::new();
        let ws = wb.add_worksheet();
        ws.write_string(0, 0, "Cantidad").unwrap();
        ws.write_string(0, 1, "Cantidad a contar").unwrap();
        ws.write_number(1, 0, 4.0).unwrap();
        ws.write_number(1, 1, 4.0).unwrap();
        wb.save(&path).unwrap();
        let bytes = fs::read(&path).unwrap();

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/s/conteo").query_param("download", "1");
            then.status(200)
                .header("content-type", "application/octet-stream")
                .body(bytes.clone());
        });

        let source = Source::parse(&server.url("/s/conteo"));
        let ds = load(&source, &LoadOptions::default()).unwrap();
        assert_eq!(ds.column_names(), vec!["Cantidad", "Cantidad a contar"]);
        assert_eq!(ds.cell(0, 0), Some(&Cell::Number(4.0)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(
            &Source::Path(PathBuf::from("/nonexistent/conteo.xlsx")),
            &LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
