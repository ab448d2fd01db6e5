//! Request envelope: `{"orders": [...], "invoices": [...]}`.
//!
//! `invoices` may be flat, or one list per source document; document lists
//! are flattened in order and provenance is dropped.

use serde_json::{Map, Value};

use crate::error::{ReconError, Side};
use crate::model::{FieldValue, InvoiceRecord, OrderRecord};

/// Pre-loaded records for one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub orders: Vec<OrderRecord>,
    pub invoices: Vec<InvoiceRecord>,
}

impl ReconInput {
    pub fn from_json_str(input: &str) -> Result<Self, ReconError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_json_value(&value)
    }

    /// Validate shape and build records. Missing keys mean empty lists.
    pub fn from_json_value(value: &Value) -> Result<Self, ReconError> {
        let obj = value
            .as_object()
            .ok_or(ReconError::Envelope { found: kind(value) })?;

        let orders = match obj.get("orders") {
            None | Some(Value::Null) => Vec::new(),
            Some(v) => orders_from_json(v)?,
        };
        let invoices = match obj.get("invoices") {
            None | Some(Value::Null) => Vec::new(),
            Some(v) => invoices_from_json(v)?,
        };

        Ok(Self { orders, invoices })
    }
}

/// Parse a JSON array of order objects.
pub fn orders_from_json(value: &Value) -> Result<Vec<OrderRecord>, ReconError> {
    let items = expect_array(value, Side::Orders)?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(record_from_map(map)),
            other => Err(not_a_record(Side::Orders, i, None, other)),
        })
        .collect()
}

/// Parse a JSON array of invoice objects, or of arrays of invoice objects.
pub fn invoices_from_json(value: &Value) -> Result<Vec<InvoiceRecord>, ReconError> {
    let items = expect_array(value, Side::Invoices)?;
    let mut documents: Vec<Vec<InvoiceRecord>> = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        match item {
            Value::Object(map) => documents.push(vec![record_from_map(map)]),
            Value::Array(lines) => {
                let mut doc = Vec::with_capacity(lines.len());
                for (j, line) in lines.iter().enumerate() {
                    match line {
                        Value::Object(map) => doc.push(record_from_map(map)),
                        other => return Err(not_a_record(Side::Invoices, i, Some(j), other)),
                    }
                }
                documents.push(doc);
            }
            other => return Err(not_a_record(Side::Invoices, i, None, other)),
        }
    }

    Ok(flatten_documents(documents))
}

/// Concatenate per-document invoice lists, preserving order.
pub fn flatten_documents(documents: Vec<Vec<InvoiceRecord>>) -> Vec<InvoiceRecord> {
    documents.into_iter().flatten().collect()
}

fn record_from_map<R>(map: &Map<String, Value>) -> R
where
    R: FromIterator<(String, FieldValue)>,
{
    map.iter()
        .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
        .collect()
}

fn expect_array(value: &Value, side: Side) -> Result<&Vec<Value>, ReconError> {
    value.as_array().ok_or_else(|| ReconError::InputType {
        side,
        index: None,
        line: None,
        reason: format!("expected array, found {}", kind(value)),
    })
}

fn not_a_record(side: Side, index: usize, line: Option<usize>, value: &Value) -> ReconError {
    ReconError::InputType {
        side,
        index: Some(index),
        line,
        reason: format!("expected object, found {}", kind(value)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
