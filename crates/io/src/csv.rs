// CSV/TSV import of count exports

use std::io::Read;
use std::path::Path;

use countboard_recon::model::{Cell, Dataset};

use crate::error::LoadError;
use crate::headers::clean_headers;

pub fn read_path(path: &Path) -> Result<Dataset, LoadError> {
    let mut file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_bytes(&bytes)
}

pub fn read_bytes(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let content = decode(bytes);
    let delimiter = sniff_delimiter(&content);
    log::debug!("csv delimiter {:?}", delimiter as char);
    read_str(&content, delimiter)
}

/// Decode as UTF-8 (BOM stripped), falling back to Windows-1252, which is
/// what Excel writes when saving CSV on Windows.
pub fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                ::csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header's field count, weighted by that count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Parse delimited text: first record is the header, every other field is
/// kept as text (empty fields become `Cell::Empty`).
pub fn read_str(content: &str, delimiter: u8) -> Result<Dataset, LoadError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|e| LoadError::Csv(e.to_string()))?,
        None => return Err(LoadError::Empty),
    };
    let headers = clean_headers(header.iter().map(str::to_string).collect());

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|e| LoadError::Csv(e.to_string()))?;
        // Fully blank lines carry no line item
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(Cell::from).collect());
    }

    Ok(Dataset::from_rows(headers, rows))
}
