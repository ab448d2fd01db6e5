use crate::error::ReconError;
use crate::model::{FieldValue, OrderRecord};

const UTF8_BOM: char = '\u{FEFF}';

/// Load order rows from header-first CSV.
///
/// Headers may use ASCII keys or source labels. Every cell is kept as text;
/// blank rows are skipped. Header discovery and type coercion belong to the
/// ingestion layer, not here.
pub fn load_order_csv(csv_data: &str) -> Result<Vec<OrderRecord>, ReconError> {
    let csv_data = csv_data.strip_prefix(UTF8_BOM).unwrap_or(csv_data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let row: OrderRecord = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(i, h)| {
                let cell = record.get(i).unwrap_or("");
                (h.as_str(), FieldValue::from(cell))
            })
            .collect();
        rows.push(row);
    }

    tracing::debug!(rows = rows.len(), columns = headers.len(), "loaded order CSV");
    Ok(rows)
}
