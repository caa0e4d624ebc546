use std::io::{self, Write};

use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::metadata::Envelope;

/// Row view of a command result, used by the `table` and `csv` formats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|column| (*column).to_owned()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

pub fn render(
    envelope: &Envelope<Value>,
    table: Option<&Table>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_to(&mut out, envelope, table, format, pretty)?;
    out.flush()?;
    Ok(())
}

pub fn render_to<W: Write>(
    out: &mut W,
    envelope: &Envelope<Value>,
    table: Option<&Table>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Ndjson => render_ndjson(out, envelope, table)?,
        OutputFormat::Table => render_table(out, envelope, table)?,
        OutputFormat::Csv => match table {
            Some(table) => render_csv(out, table)?,
            None => writeln!(out, "{}", serde_json::to_string(envelope)?)?,
        },
    }

    Ok(())
}

/// One JSON object per row, or the whole envelope when there are no rows.
fn render_ndjson<W: Write>(
    out: &mut W,
    envelope: &Envelope<Value>,
    table: Option<&Table>,
) -> Result<(), CliError> {
    let Some(table) = table else {
        writeln!(out, "{}", serde_json::to_string(envelope)?)?;
        return Ok(());
    };

    for row in &table.rows {
        let object: serde_json::Map<String, Value> = table
            .columns
            .iter()
            .cloned()
            .zip(row.iter().cloned().map(Value::String))
            .collect();
        writeln!(out, "{}", serde_json::to_string(&object)?)?;
    }
    Ok(())
}

fn render_table<W: Write>(
    out: &mut W,
    envelope: &Envelope<Value>,
    table: Option<&Table>,
) -> Result<(), CliError> {
    writeln!(out, "request_id  : {}", envelope.meta.request_id)?;
    writeln!(out, "generated_at: {}", envelope.meta.generated_at)?;
    writeln!(
        out,
        "sources     : {}",
        envelope
            .meta
            .source_chain
            .iter()
            .map(|source| source.as_str())
            .collect::<Vec<_>>()
            .join(",")
    )?;
    writeln!(out, "latency_ms  : {}", envelope.meta.latency_ms)?;

    if !envelope.meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    match table {
        Some(table) => write_aligned(out, table)?,
        None => {
            writeln!(out, "data:")?;
            for line in serde_json::to_string_pretty(&envelope.data)?.lines() {
                writeln!(out, "  {line}")?;
            }
        }
    }

    if !envelope.errors.is_empty() {
        writeln!(out, "errors:")?;
        for error in &envelope.errors {
            writeln!(out, "  - {}: {}", error.code, error.message)?;
        }
    }

    Ok(())
}

fn write_aligned<W: Write>(out: &mut W, table: &Table) -> io::Result<()> {
    let mut widths: Vec<usize> = table.columns.iter().map(|column| column.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<w$}", w = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    writeln!(out, "{}", line(&table.columns))?;
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    writeln!(out, "{}", rule.join("  "))?;
    for row in &table.rows {
        writeln!(out, "{}", line(row))?;
    }
    if table.rows.is_empty() {
        writeln!(out, "(no rows)")?;
    }
    Ok(())
}

fn render_csv<W: Write>(out: &mut W, table: &Table) -> io::Result<()> {
    writeln!(out, "{}", csv_line(&table.columns))?;
    for row in &table.rows {
        writeln!(out, "{}", csv_line(row))?;
    }
    Ok(())
}

fn csv_line(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| csv_field(cell))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quotes a field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::EnvelopeMeta;
    use fatfinger_core::ProviderId;

    fn sample_table() -> Table {
        let mut table = Table::new(&["target_ticker", "candidate_name"]);
        table.push_row(vec!["TSLA".to_owned(), "Taland Corp".to_owned()]);
        table.push_row(vec!["AAPL".to_owned(), "Apple, \"New\" Inc".to_owned()]);
        table
    }

    fn envelope() -> Envelope<Value> {
        Envelope {
            meta: EnvelopeMeta::new(vec![ProviderId::Static], 0),
            data: Value::Null,
            errors: Vec::new(),
        }
    }

    fn rendered(format: OutputFormat, table: Option<&Table>) -> String {
        let mut buffer = Vec::new();
        render_to(&mut buffer, &envelope(), table, format, false).expect("render");
        String::from_utf8(buffer).expect("utf8")
    }

    #[test]
    fn csv_quotes_fields_with_commas_and_quotes() {
        let output = rendered(OutputFormat::Csv, Some(&sample_table()));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "target_ticker,candidate_name");
        assert_eq!(lines[1], "TSLA,Taland Corp");
        assert_eq!(lines[2], "AAPL,\"Apple, \"\"New\"\" Inc\"");
    }

    #[test]
    fn ndjson_emits_one_object_per_row() {
        let output = rendered(OutputFormat::Ndjson, Some(&sample_table()));
        let first: Value = serde_json::from_str(output.lines().next().expect("line")).expect("json");
        assert_eq!(first["candidate_name"], "Taland Corp");
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn table_aligns_columns() {
        let output = rendered(OutputFormat::Table, Some(&sample_table()));
        assert!(output.contains("target_ticker  candidate_name"));
        assert!(output.contains("TSLA           Taland Corp"));
    }

    #[test]
    fn json_without_rows_is_the_envelope() {
        let output = rendered(OutputFormat::Json, None);
        let value: Value = serde_json::from_str(output.trim()).expect("json");
        assert!(value["meta"]["request_id"].is_string());
    }
}
