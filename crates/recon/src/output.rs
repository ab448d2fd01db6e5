use crate::error::ReconError;
use crate::fields::{LabelStyle, OrderField};
use crate::model::{DiffRow, ReconResult};

/// Pretty JSON: `{"meta": ..., "summary": ..., "diff_rows": [...]}`.
pub fn write_json(result: &ReconResult) -> Result<Vec<u8>, ReconError> {
    let mut out = serde_json::to_vec_pretty(result)?;
    out.push(b'\n');
    Ok(out)
}

/// Column names in output order: `order_*`, `invoice_*`, `status`.
pub fn csv_header(style: LabelStyle) -> Vec<String> {
    let mut header: Vec<String> = OrderField::ALL
        .iter()
        .map(|f| format!("order_{}", f.name(style)))
        .collect();
    header.extend(
        OrderField::ALL
            .iter()
            .map(|f| format!("invoice_{}", f.name(style))),
    );
    header.push("status".to_string());
    header
}

/// One CSV line per diff row.
pub fn write_csv(rows: &[DiffRow], style: LabelStyle) -> Result<Vec<u8>, ReconError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(csv_header(style))?;

    for row in rows {
        let mut record: Vec<String> = Vec::with_capacity(OrderField::ALL.len() * 2 + 1);
        for field in OrderField::ALL {
            record.push(row.order_value(field).comparable_text());
        }
        for field in OrderField::ALL {
            record.push(row.invoice_value(field).comparable_text());
        }
        record.push(row.status.as_str().to_string());
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ReconError::Io(e.to_string()))
}
