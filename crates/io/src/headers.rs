// Header row cleanup shared by the CSV and spreadsheet readers

use std::collections::HashSet;

/// Trim header names, name blank headers `Unnamed: {idx}` and make
/// duplicates unique with `.1`, `.2`, ... suffixes.
pub fn clean_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let trimmed = name.trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            trimmed.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        if candidate != base {
            log::debug!("duplicate header \"{base}\" renamed to \"{candidate}\"");
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}
