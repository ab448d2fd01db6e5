use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::fields::{canonical_key, InvoiceField, LabelStyle, OrderField};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single cell from either source.
///
/// Upstream ingestion sometimes hands over amounts as JSON numbers and
/// sometimes as text, so both are carried and coerced only for comparison.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Number(serde_json::Number),
}

static EMPTY: FieldValue = FieldValue::Empty;

impl FieldValue {
    /// Build from arbitrary JSON. Structured values (arrays, objects) are
    /// not field data and degrade to `Empty`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Empty,
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            serde_json::Value::Number(n) => FieldValue::Number(n.clone()),
            serde_json::Value::Bool(b) => FieldValue::Text(b.to_string()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => FieldValue::Empty,
        }
    }

    /// Text used for comparison.
    ///
    /// Integers print plainly and integral floats drop their `.0`, so
    /// `50000`, `50000.0` and `"50000"` all compare equal. No grouping
    /// separators are ever inserted.
    pub fn comparable_text(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(n),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Number(_) => false,
        }
    }

    /// Output placeholder for fields with no source value.
    pub fn blank() -> Self {
        FieldValue::Text(String::new())
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // 2^53: beyond this, f64 -> i64 no longer round-trips exactly
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            (f as i64).to_string()
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Number(i.into())
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        serde_json::Number::from_f64(f)
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Empty)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Empty => serializer.serialize_str(""),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => n.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(FieldValue::from_json(&value))
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Column name -> value, with known column names stored under their ASCII key.
#[derive(Debug, Clone, Default, PartialEq)]
struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    /// Both spellings of a field (`業者名` and `vendor_name`) land on one
    /// key. On collision the later pair in iteration order wins.
    fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = BTreeMap::new();
        for (k, v) in pairs {
            let key = canonical_key(k.as_ref());
            if map.contains_key(&key) {
                tracing::warn!(column = k.as_ref(), key = %key, "duplicate field, later value wins");
            }
            map.insert(key, v.into());
        }
        FieldMap(map)
    }

    fn get(&self, key: &str) -> &FieldValue {
        self.0.get(key).unwrap_or(&EMPTY)
    }
}

/// One purchase order row, as handed over by spreadsheet ingestion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderRecord {
    fields: FieldMap,
}

impl OrderRecord {
    pub fn get(&self, field: OrderField) -> &FieldValue {
        self.fields.get(field.key())
    }

    /// Raw lookup by column name (either spelling).
    pub fn get_raw(&self, name: &str) -> &FieldValue {
        self.fields.get(&canonical_key(name))
    }

    pub fn len(&self) -> usize {
        self.fields.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<FieldValue>> FromIterator<(K, V)> for OrderRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        OrderRecord {
            fields: FieldMap::from_pairs(iter),
        }
    }
}

/// One extracted invoice line item.
///
/// Uses the invoice vocabulary, but the extractor may also have filled in
/// order-vocabulary columns (`vendor_id`, `completion_date`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceRecord {
    fields: FieldMap,
}

impl InvoiceRecord {
    pub fn get(&self, field: InvoiceField) -> &FieldValue {
        self.fields.get(field.key())
    }

    pub fn get_order_field(&self, field: OrderField) -> &FieldValue {
        self.fields.get(field.key())
    }

    pub fn get_raw(&self, name: &str) -> &FieldValue {
        self.fields.get(&canonical_key(name))
    }

    pub fn len(&self) -> usize {
        self.fields.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<FieldValue>> FromIterator<(K, V)> for InvoiceRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        InvoiceRecord {
            fields: FieldMap::from_pairs(iter),
        }
    }
}

impl<'de> Deserialize<'de> for OrderRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, FieldValue>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for InvoiceRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, FieldValue>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Matched,
    Unmatched,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Matched => "MATCHED",
            MatchStatus::Unmatched => "UNMATCHED",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-order reconciliation outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    /// Every order field, copied unnormalized.
    pub order: BTreeMap<OrderField, FieldValue>,
    /// Matched invoice mapped into the order vocabulary, or all blank.
    pub invoice: BTreeMap<OrderField, FieldValue>,
    pub status: MatchStatus,
    /// Position of the matched invoice in the flattened invoice list.
    pub invoice_index: Option<usize>,
}

impl DiffRow {
    pub fn order_value(&self, field: OrderField) -> &FieldValue {
        self.order.get(&field).unwrap_or(&EMPTY)
    }

    pub fn invoice_value(&self, field: OrderField) -> &FieldValue {
        self.invoice.get(&field).unwrap_or(&EMPTY)
    }

    pub fn is_matched(&self) -> bool {
        self.status == MatchStatus::Matched
    }

    /// Serialize with the given column vocabulary.
    pub fn labeled(&self, style: LabelStyle) -> LabeledRow<'_> {
        LabeledRow { row: self, style }
    }
}

/// Flat `order_*`, `invoice_*`, `status` view of a [`DiffRow`].
pub struct LabeledRow<'a> {
    row: &'a DiffRow,
    style: LabelStyle,
}

impl Serialize for LabeledRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(OrderField::ALL.len() * 2 + 2))?;
        for field in OrderField::ALL {
            map.serialize_entry(
                &format!("order_{}", field.name(self.style)),
                self.row.order_value(field),
            )?;
        }
        for field in OrderField::ALL {
            map.serialize_entry(
                &format!("invoice_{}", field.name(self.style)),
                self.row.invoice_value(field),
            )?;
        }
        map.serialize_entry("status", &self.row.status)?;
        map.serialize_entry("invoice_index", &self.row.invoice_index)?;
        map.end()
    }
}

impl Serialize for DiffRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.labeled(LabelStyle::Ascii).serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Summary + Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total_orders: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub invoices: usize,
    pub invoices_used: usize,
    pub invoices_unused: usize,
    /// Invoices claimed by more than one order.
    pub invoices_reused: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub max_distance: usize,
    pub workers: usize,
    pub labels: LabelStyle,
}

#[derive(Debug, Clone)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub diff_rows: Vec<DiffRow>,
}

struct LabeledRows<'a> {
    rows: &'a [DiffRow],
    style: LabelStyle,
}

impl Serialize for LabeledRows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in self.rows {
            seq.serialize_element(&row.labeled(self.style))?;
        }
        seq.end()
    }
}

impl Serialize for ReconResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ReconResult", 3)?;
        s.serialize_field("meta", &self.meta)?;
        s.serialize_field("summary", &self.summary)?;
        s.serialize_field(
            "diff_rows",
            &LabeledRows {
                rows: &self.diff_rows,
                style: self.meta.labels,
            },
        )?;
        s.end()
    }
}
