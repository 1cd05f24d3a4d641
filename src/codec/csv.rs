use std::collections::BTreeMap;

use thiserror::Error;

/// Header synonyms for the latitude column, matched case-insensitively.
const LAT_PATTERNS: [&str; 3] = ["lat", "latitude", "緯度"];
/// Header synonyms for the longitude column.
const LNG_PATTERNS: [&str; 4] = ["lng", "lon", "longitude", "経度"];

/// One imported coordinate with its remaining columns as string properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub lat: f64,
    pub lng: f64,
    pub properties: BTreeMap<String, String>,
}

/// Errors for a CSV import that cannot proceed at all. Individual bad rows
/// are skipped, not reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    #[error("CSV needs a header row and at least one data row")]
    NotEnoughRows,
    #[error("no latitude column found (lat, latitude, 緯度)")]
    MissingLatitudeColumn,
    #[error("no longitude column found (lng, lon, longitude, 経度)")]
    MissingLongitudeColumn,
}

fn find_column(headers: &[&str], patterns: &[&str]) -> Option<usize> {
    let lowered: Vec<String> = headers
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    patterns
        .iter()
        .find_map(|pattern| lowered.iter().position(|h| h == pattern))
}

/// Parse comma-separated point rows. The header row is mandatory; lat/lng
/// columns are located via the synonym sets above; every other column
/// becomes a string property keyed by its trimmed header. Blank lines and
/// rows whose coordinates do not parse as finite numbers are skipped.
/// Splitting is plain comma splitting — no quoting.
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>, CsvError> {
    // lines() handles both LF and CRLF
    let lines: Vec<&str> = text.trim().lines().collect();
    if lines.len() < 2 {
        return Err(CsvError::NotEnoughRows);
    }

    let headers: Vec<&str> = lines[0].split(',').collect();
    let lat_idx = find_column(&headers, &LAT_PATTERNS).ok_or(CsvError::MissingLatitudeColumn)?;
    let lng_idx = find_column(&headers, &LNG_PATTERNS).ok_or(CsvError::MissingLongitudeColumn)?;

    let property_headers: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != lat_idx && *i != lng_idx)
        .map(|(i, h)| (i, h.trim()))
        .collect();

    let mut rows = Vec::new();
    for line in &lines[1..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split(',').collect();
        let lat = cols.get(lat_idx).and_then(|c| c.trim().parse::<f64>().ok());
        let lng = cols.get(lng_idx).and_then(|c| c.trim().parse::<f64>().ok());
        let (Some(lat), Some(lng)) = (lat, lng) else {
            continue;
        };
        if !lat.is_finite() || !lng.is_finite() {
            continue;
        }

        let mut properties = BTreeMap::new();
        for (index, name) in &property_headers {
            if let Some(cell) = cols.get(*index) {
                properties.insert((*name).to_owned(), cell.trim().to_owned());
            }
        }
        rows.push(CsvRow {
            lat,
            lng,
            properties,
        });
    }

    Ok(rows)
}
