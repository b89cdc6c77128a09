//! Time-series normalizer.
//!
//! Converts the two raw upload shapes into an ordered `Vec<Bar>`:
//! - tab-separated tabular text with a fixed 7-column header (Euronext-style
//!   exports, `DD/MM/YYYY HH:MM` timestamps, decimal commas);
//! - a keyed map of ISO-8601-like timestamp strings to raw quotes.
//!
//! Parsing is best effort over all rows: malformed rows are skipped, the
//! whole call fails only when the header is unusable or nothing survives.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::bar::Bar;
use crate::constant::EngineError;

/// One raw quote from a keyed upload.
#[derive(Debug, Clone, Copy)]
pub struct RawQuote {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

// Per-field header aliases, matched case-insensitively as substrings. The
// French tokens cover the original export headers ("ouverture", "clôture"
// stripped to ASCII, "devise").
const HEADER_FIELDS: [(&str, &[&str]); 7] = [
    ("date", &["date"]),
    ("open", &["open", "ouv"]),
    ("high", &["high", "haut"]),
    ("low", &["low", "bas"]),
    ("close", &["close", "clot"]),
    ("volume", &["volume", "vol"]),
    ("currency", &["currency", "devise"]),
];

const MIN_ROW_FIELDS: usize = 6;

/// Parses tab-separated tabular text into ordered bars.
pub fn from_tabular(text: &str) -> Result<Vec<Bar>, EngineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = resolve_columns(&headers)?;

    let mut bars = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        match parse_row(&record, &columns) {
            Some(bar) => bars.push(bar),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, kept = bars.len(), "skipped malformed rows");
    }
    finalize(bars)
}

/// Converts a keyed timestamp→quote map into ordered bars. Keys that do not
/// parse as timestamps are skipped.
pub fn from_keyed(quotes: &BTreeMap<String, RawQuote>) -> Result<Vec<Bar>, EngineError> {
    let mut bars = Vec::new();
    for (key, quote) in quotes {
        let Ok(timestamp) = parse_datetime(key) else {
            warn!(key = %key, "skipped quote with unparsable timestamp key");
            continue;
        };
        let bar = Bar {
            timestamp,
            open_price: quote.open,
            high_price: quote.high,
            low_price: quote.low,
            close_price: quote.close,
            volume: quote.volume,
        };
        if all_finite(&bar) && bar.is_price_sane() {
            bars.push(bar);
        }
    }
    finalize(bars)
}

/// Derives `(symbol, date)` from an upload filename of the form
/// `SYMBOL_YYYY-MM-DD.ext`.
pub fn parse_series_identity(filename: &str) -> Result<(String, NaiveDate), EngineError> {
    let stem = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .split('.')
        .next()
        .unwrap_or(filename);

    let Some((symbol, date_part)) = stem.split_once('_') else {
        return Err(EngineError::InvalidFilename(filename.to_string()));
    };
    if symbol.is_empty() {
        return Err(EngineError::InvalidFilename(filename.to_string()));
    }
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidFilename(filename.to_string()))?;
    Ok((symbol.to_uppercase(), date))
}

struct ColumnMap {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnMap, EngineError> {
    let cells: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let mut indices = [0usize; 7];
    for (slot, (field, aliases)) in HEADER_FIELDS.iter().enumerate() {
        let found = cells
            .iter()
            .position(|cell| aliases.iter().any(|alias| cell.contains(alias)));
        match found {
            Some(idx) => indices[slot] = idx,
            None => return Err(EngineError::InvalidHeader((*field).to_string())),
        }
    }

    Ok(ColumnMap {
        date: indices[0],
        open: indices[1],
        high: indices[2],
        low: indices[3],
        close: indices[4],
        volume: indices[5],
    })
}

fn parse_row(record: &csv::StringRecord, columns: &ColumnMap) -> Option<Bar> {
    if record.len() < MIN_ROW_FIELDS {
        return None;
    }

    let timestamp = parse_datetime(record.get(columns.date)?).ok()?;
    let open_price = parse_price(record.get(columns.open)?)?;
    let high_price = parse_price(record.get(columns.high)?)?;
    let low_price = parse_price(record.get(columns.low)?)?;
    let close_price = parse_price(record.get(columns.close)?)?;
    let volume = record
        .get(columns.volume)
        .map(parse_volume)
        .unwrap_or_default();

    let bar = Bar {
        timestamp,
        open_price,
        high_price,
        low_price,
        close_price,
        volume,
    };
    bar.is_price_sane().then_some(bar)
}

// Price fields are required and must be finite; decimal commas are
// normalized before parsing.
fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(' ', "").replace(',', ".");
    let value = cleaned.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

// Volume defaults to 0 when unparsable.
fn parse_volume(raw: &str) -> u64 {
    raw.trim()
        .replace([' ', ','], "")
        .parse::<u64>()
        .unwrap_or(0)
}

fn all_finite(bar: &Bar) -> bool {
    bar.open_price.is_finite()
        && bar.high_price.is_finite()
        && bar.low_price.is_finite()
        && bar.close_price.is_finite()
}

fn finalize(mut bars: Vec<Bar>) -> Result<Vec<Bar>, EngineError> {
    if bars.is_empty() {
        return Err(EngineError::NoValidRows);
    }
    bars.sort_by_key(|bar| bar.timestamp);
    // Strictly increasing timestamps: on duplicates the first occurrence wins.
    bars.dedup_by_key(|bar| bar.timestamp);
    debug!(points = bars.len(), "normalized bar sequence");
    Ok(bars)
}

pub(crate) fn parse_datetime(value: &str) -> Result<DateTime<Utc>, EngineError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let patterns = [
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for pattern in patterns {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }

    Err(EngineError::InvalidDatetime(value.to_string()))
}
