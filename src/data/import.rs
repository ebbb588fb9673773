use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::fill::{Fill, Side};

/// Detected import file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// Detect by extension; anything other than `.csv`/`.json` (including no
    /// extension at all) falls back to a content sniff, so a JSON array in a
    /// `.txt` export is still recognized.
    pub fn detect(path: &Path, content: &str) -> ImportFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ImportFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ImportFormat::Csv,
            _ => {
                if content.trim_start().starts_with('[') {
                    ImportFormat::Json
                } else {
                    ImportFormat::Csv
                }
            }
        }
    }
}

/// A row quarantined during import, with the reason it was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based data-row ordinal (header excluded for CSV).
    pub row: usize,
    pub reason: String,
}

/// Outcome of parsing one export file: the valid fills plus every
/// quarantined row. A structurally broken file fails as a whole instead.
#[derive(Debug, Clone)]
pub struct ParsedImport {
    pub fills: Vec<Fill>,
    pub skipped: Vec<SkippedRow>,
}

const COL_NAME: &str = "Name";
const COL_DATE: &str = "Date";
const COL_TIME: &str = "Time";
const COL_SIDE: &str = "Buy/Sell";
const COL_PRICE: &str = "Trade Price";
const COL_QUANTITY: &str = "Quantity/Lot";

const REQUIRED_COLUMNS: [&str; 6] = [
    COL_NAME,
    COL_DATE,
    COL_TIME,
    COL_SIDE,
    COL_PRICE,
    COL_QUANTITY,
];

/// One record as it appears in the file, before validation. JSON exports
/// carry numeric fields as either numbers or numeric strings.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Date")]
    date: RawField,
    #[serde(rename = "Time")]
    time: RawField,
    #[serde(rename = "Buy/Sell")]
    side: RawField,
    #[serde(rename = "Trade Price")]
    price: RawField,
    #[serde(rename = "Quantity/Lot")]
    quantity: RawField,
}

/// A field that may arrive as a string or a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawField {
    Text(String),
    Number(f64),
}

impl RawField {
    fn as_text(&self) -> String {
        match self {
            RawField::Text(s) => s.trim().to_string(),
            RawField::Number(n) => n.to_string(),
        }
    }
}

/// Read and parse a broker export file.
pub fn parse_file(path: &Path) -> Result<ParsedImport, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::FileRead(format!("{}: {}", path.display(), e)))?;

    let parsed = match ImportFormat::detect(path, &content) {
        ImportFormat::Csv => parse_csv(&content)?,
        ImportFormat::Json => parse_json(&content)?,
    };

    info!(
        "Parsed {}: {} fills, {} rows skipped",
        path.display(),
        parsed.fills.len(),
        parsed.skipped.len()
    );
    Ok(parsed)
}

/// Parse the CSV export shape. The header row must contain every required
/// column; extra columns are ignored. Header names and fields are trimmed.
pub fn parse_csv(content: &str) -> Result<ParsedImport, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let mut columns = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AppError::InvalidCsvFormat(format!("Missing column: {}", name)))?;
    }
    let [name_col, date_col, time_col, side_col, price_col, qty_col] = columns;

    let mut fills = Vec::new();
    let mut skipped = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                skipped.push(SkippedRow {
                    row,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let field = |col: usize| record.get(col).unwrap_or("").to_string();
        let result = validate_row(
            row,
            &field(name_col),
            &field(date_col),
            &field(time_col),
            &field(side_col),
            &field(price_col),
            &field(qty_col),
        );
        match result {
            Ok(fill) => fills.push(fill),
            Err(reason) => skipped.push(SkippedRow { row, reason }),
        }
    }

    Ok(ParsedImport { fills, skipped })
}

/// Parse the JSON export shape: an array of objects with the same field
/// names as the CSV header.
pub fn parse_json(content: &str) -> Result<ParsedImport, AppError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| AppError::InvalidJsonFormat(e.to_string()))?;

    let rows = match value {
        serde_json::Value::Array(rows) => rows,
        other => {
            return Err(AppError::InvalidJsonFormat(format!(
                "Expected a JSON array of fills, got {}",
                json_type_name(&other)
            )))
        }
    };

    let mut fills = Vec::new();
    let mut skipped = Vec::new();

    for (i, row_value) in rows.into_iter().enumerate() {
        let row = i + 1;
        let raw: RawRecord = match serde_json::from_value(row_value) {
            Ok(r) => r,
            Err(e) => {
                skipped.push(SkippedRow {
                    row,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let result = validate_row(
            row,
            raw.name.trim(),
            &raw.date.as_text(),
            &raw.time.as_text(),
            &raw.side.as_text(),
            &raw.price.as_text(),
            &raw.quantity.as_text(),
        );
        match result {
            Ok(fill) => fills.push(fill),
            Err(reason) => skipped.push(SkippedRow { row, reason }),
        }
    }

    Ok(ParsedImport { fills, skipped })
}

/// Validate one raw row into a Fill. Any defect quarantines the row;
/// garbage must never reach the pairing engine.
fn validate_row(
    row: usize,
    name: &str,
    date: &str,
    time: &str,
    side: &str,
    price: &str,
    quantity: &str,
) -> Result<Fill, String> {
    if name.is_empty() {
        return Err("Missing instrument name".to_string());
    }

    let side: Side = side.parse()?;
    let price = parse_positive(price, "price")?;
    let quantity = parse_positive(quantity, "quantity")?;
    let date = parse_date(date)?;
    let time = parse_time(time)?;

    Ok(Fill {
        instrument: name.to_string(),
        side,
        price,
        quantity,
        date,
        time,
        row_index: row,
    })
}

fn parse_positive(s: &str, label: &str) -> Result<f64, String> {
    let v: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid {}: {}", label, s))?;
    if !v.is_finite() || v <= 0.0 {
        return Err(format!("Non-positive {}: {}", label, s));
    }
    Ok(v)
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("Invalid date: {}", s))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("Invalid time: {}", s))
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Name, Date, Time, Buy/Sell, Trade Price, Quantity/Lot, Order No.
NIFTY24JUNCE, 2024-06-20, 09:15:00, buy, 100.5, 75, 1001
NIFTY24JUNCE, 2024-06-20, 09:20:00, sell, 120.25, 75, 1002
";

    #[test]
    fn test_parse_csv_happy_path() {
        let parsed = parse_csv(CSV).unwrap();
        assert_eq!(parsed.fills.len(), 2);
        assert!(parsed.skipped.is_empty());

        let first = &parsed.fills[0];
        assert_eq!(first.instrument, "NIFTY24JUNCE");
        assert_eq!(first.side, Side::Buy);
        assert_eq!(first.price, 100.5);
        assert_eq!(first.quantity, 75.0);
        assert_eq!(first.row_index, 1);
    }

    #[test]
    fn test_csv_missing_column_fails_whole_import() {
        let content = "Name, Date, Time, Buy/Sell, Trade Price\nNIFTY, 2024-06-20, 09:15, buy, 100\n";
        let err = parse_csv(content).unwrap_err();
        assert!(matches!(err, AppError::InvalidCsvFormat(_)));
        assert!(err.to_string().contains("Quantity/Lot"));
    }

    #[test]
    fn test_csv_malformed_rows_are_quarantined() {
        let content = "\
Name,Date,Time,Buy/Sell,Trade Price,Quantity/Lot
NIFTY,2024-06-20,09:15,buy,100,75
NIFTY,2024-06-20,09:20,hold,110,75
NIFTY,2024-06-20,09:25,sell,oops,75
NIFTY,not-a-date,09:30,sell,110,75
NIFTY,2024-06-20,09:35,sell,110,-75
NIFTY,2024-06-20,09:40,sell,110,75
";
        let parsed = parse_csv(content).unwrap();
        assert_eq!(parsed.fills.len(), 2);
        assert_eq!(parsed.skipped.len(), 4);
        assert_eq!(parsed.skipped[0].row, 2);
        assert!(parsed.skipped[0].reason.contains("side"));
        assert!(parsed.skipped[1].reason.contains("price"));
        assert!(parsed.skipped[2].reason.contains("date"));
        assert!(parsed.skipped[3].reason.contains("quantity"));
    }

    #[test]
    fn test_parse_json_accepts_numbers_and_numeric_strings() {
        let content = r#"[
            {"Name": "BANKNIFTY24JUNPE", "Date": "2024-06-20", "Time": "10:00",
             "Buy/Sell": "SELL", "Trade Price": 210.75, "Quantity/Lot": 75},
            {"Name": "BANKNIFTY24JUNPE", "Date": "20-06-2024", "Time": "10:30:05",
             "Buy/Sell": "buy", "Trade Price": "180.5", "Quantity/Lot": "150"}
        ]"#;
        let parsed = parse_json(content).unwrap();
        assert_eq!(parsed.fills.len(), 2);
        assert_eq!(parsed.fills[0].price, 210.75);
        assert_eq!(parsed.fills[1].quantity, 150.0);
        assert_eq!(parsed.fills[0].date, parsed.fills[1].date);
    }

    #[test]
    fn test_json_row_missing_field_is_quarantined() {
        let content = r#"[
            {"Name": "NIFTY", "Date": "2024-06-20", "Time": "09:15",
             "Buy/Sell": "buy", "Trade Price": 100, "Quantity/Lot": 75},
            {"Name": "NIFTY", "Date": "2024-06-20", "Time": "09:20"}
        ]"#;
        let parsed = parse_json(content).unwrap();
        assert_eq!(parsed.fills.len(), 1);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].row, 2);
    }

    #[test]
    fn test_json_non_array_is_a_single_error() {
        let err = parse_json(r#"{"Name": "NIFTY"}"#).unwrap_err();
        assert!(matches!(err, AppError::InvalidJsonFormat(_)));
    }

    #[test]
    fn test_format_detection() {
        use std::path::PathBuf;
        let csv_path = PathBuf::from("export.csv");
        let json_path = PathBuf::from("export.json");
        let bare = PathBuf::from("export");
        assert_eq!(ImportFormat::detect(&csv_path, ""), ImportFormat::Csv);
        assert_eq!(ImportFormat::detect(&json_path, ""), ImportFormat::Json);
        assert_eq!(ImportFormat::detect(&bare, "  [ {} ]"), ImportFormat::Json);
        assert_eq!(ImportFormat::detect(&bare, "Name,Date"), ImportFormat::Csv);
    }

    #[test]
    fn test_unknown_extension_sniffs_content() {
        use std::path::PathBuf;
        let txt = PathBuf::from("export.txt");
        assert_eq!(
            ImportFormat::detect(&txt, r#"[{"Name": "NIFTY"}]"#),
            ImportFormat::Json
        );
        assert_eq!(
            ImportFormat::detect(&txt, "Name,Date,Time"),
            ImportFormat::Csv
        );
    }

    #[test]
    fn test_date_and_time_format_variants() {
        assert!(parse_date("2024-06-20").is_ok());
        assert!(parse_date("20-06-2024").is_ok());
        assert!(parse_date("20/06/2024").is_ok());
        assert!(parse_date("June 20").is_err());
        assert!(parse_time("09:15:30").is_ok());
        assert!(parse_time("09:15").is_ok());
        assert!(parse_time("9am").is_err());
    }
}
