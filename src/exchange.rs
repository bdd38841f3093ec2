//! Tabular exchange of stores with translators as CSV.

use std::collections::HashMap;
use std::io::{
    Read,
    Write,
};

use csv::{
    QuoteStyle,
    ReaderBuilder,
    Terminator,
    WriterBuilder,
};
use thiserror::Error;

use crate::config::CsvConfig;
use crate::store::{
    MessageEntry,
    MessageStore,
};

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// First byte of a single-character option.
fn option_byte(value: &str, fallback: u8) -> u8 {
    value.bytes().next().unwrap_or(fallback)
}

/// Record terminator: CRLF or a single byte.
fn terminator(line_end: &str) -> Terminator {
    match line_end.as_bytes() {
        [byte] => Terminator::Any(*byte),
        _ => Terminator::CRLF,
    }
}

/// Value of an extra export column for one entry.
fn extra_field(entry: &MessageEntry, field: &str) -> String {
    match field {
        "files" => entry.files.iter().map(String::as_str).collect::<Vec<_>>().join(","),
        "value" => entry.value.clone(),
        _ => String::new(),
    }
}

/// Writes `store` as one CSV table: a header (key label, locale, extra
/// fields) and one row per key in key order. Every field is encapsulated.
///
/// # Errors
/// Returns `ExchangeError` if writing fails.
pub fn write_csv<W: Write>(
    writer: W,
    store: &MessageStore,
    locale: &str,
    config: &CsvConfig,
) -> Result<(), ExchangeError> {
    let mut wtr = WriterBuilder::new()
        .delimiter(option_byte(&config.delimiter, b','))
        .quote(option_byte(&config.encapsulator, b'"'))
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .terminator(terminator(&config.line_end))
        .from_writer(writer);

    let mut header = vec![config.key_label.as_str(), locale];
    header.extend(config.extra_fields.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for (key, entry) in store.iter() {
        let mut record = vec![key.clone(), entry.value.clone()];
        record.extend(config.extra_fields.iter().map(|field| extra_field(entry, field)));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// [`write_csv`] into a string.
///
/// # Errors
/// Returns `ExchangeError` if writing fails.
pub fn export_csv(
    store: &MessageStore,
    locale: &str,
    config: &CsvConfig,
) -> Result<String, ExchangeError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, store, locale, config)?;
    Ok(String::from_utf8(buffer)?)
}

/// One data row, cells keyed by their column header.
pub type CsvRow = HashMap<String, String>;

/// Reads a CSV table with a header row. Rows may be shorter or longer than
/// the header; missing cells are absent from the row.
///
/// # Errors
/// Returns `ExchangeError` on malformed input.
pub fn read_csv<R: Read>(reader: R, config: &CsvConfig) -> Result<Vec<CsvRow>, ExchangeError> {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .delimiter(option_byte(&config.delimiter, b','))
        .quote(option_byte(&config.encapsulator, b'"'))
        .double_quote(true);
    if let Terminator::Any(byte) = terminator(&config.line_end) {
        builder.terminator(Terminator::Any(byte));
    }
    let mut rdr = builder.from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row: CsvRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), cell.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    use super::*;
    use crate::store::MergeMode;

    #[fixture]
    fn store() -> MessageStore {
        let mut store = MessageStore::new();
        store.merge(
            "Hello {name}!",
            MessageEntry::new("Hallo {name}!").with_files(["b.js", "a.html"]),
            MergeMode::Extend,
        );
        store.merge("Say \"hi\"", MessageEntry::new("Sag \"hi\""), MergeMode::Extend);
        store
    }

    #[rstest]
    fn export_encapsulates_every_field(store: MessageStore) {
        let csv = export_csv(&store, "de_DE", &CsvConfig::default()).unwrap();

        let expected = "\"ID\",\"de_DE\",\"files\"\r\n\
                        \"Hello {name}!\",\"Hallo {name}!\",\"a.html,b.js\"\r\n\
                        \"Say \"\"hi\"\"\",\"Sag \"\"hi\"\"\",\"\"\r\n";
        assert_eq!(csv, expected);
    }

    #[rstest]
    fn export_with_custom_options(store: MessageStore) {
        let config = CsvConfig {
            delimiter: ";".to_string(),
            encapsulator: "'".to_string(),
            line_end: "\n".to_string(),
            key_label: "Key".to_string(),
            extra_fields: vec!["value".to_string(), "unknown".to_string()],
        };

        let csv = export_csv(&store, "de", &config).unwrap();

        let first_lines: Vec<&str> = csv.lines().take(2).collect();
        assert_eq!(
            first_lines,
            ["'Key';'de';'value';'unknown'", "'Hello {name}!';'Hallo {name}!';'Hallo {name}!';''"]
        );
    }

    #[googletest::test]
    fn read_rows_by_header() {
        let text = "ID,de_DE,fr_FR\r\n\"Hello\",\"Hallo\",\"\"\r\nBye,Tschüss\r\n";

        let rows = read_csv(text.as_bytes(), &CsvConfig::default()).unwrap();

        assert_that!(rows.len(), eq(2));
        expect_that!(rows[0].get("ID"), some(eq(&"Hello".to_string())));
        expect_that!(rows[0].get("de_DE"), some(eq(&"Hallo".to_string())));
        expect_that!(rows[0].get("fr_FR"), some(eq(&String::new())));
        expect_that!(rows[1].get("de_DE"), some(eq(&"Tschüss".to_string())));
        expect_that!(rows[1].get("fr_FR"), none());
    }

    #[rstest]
    fn export_then_read_restores_values(store: MessageStore) {
        let csv = export_csv(&store, "de_DE", &CsvConfig::default()).unwrap();

        let rows = read_csv(csv.as_bytes(), &CsvConfig::default()).unwrap();

        let values: Vec<(&str, &str)> =
            rows.iter().map(|row| (row["ID"].as_str(), row["de_DE"].as_str())).collect();
        assert_eq!(values, [("Hello {name}!", "Hallo {name}!"), ("Say \"hi\"", "Sag \"hi\"")]);
    }
}
