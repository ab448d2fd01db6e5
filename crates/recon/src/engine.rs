use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::config::ReconConfig;
use crate::distance::DEFAULT_MAX_DISTANCE;
use crate::evidence::compute_summary;
use crate::fields::{InvoiceField, OrderField};
use crate::input::ReconInput;
use crate::matcher::{first_match, ComparisonKey, MismatchHook, NoopHook, TracingHook};
use crate::model::{DiffRow, FieldValue, InvoiceRecord, MatchStatus, OrderRecord, ReconMeta, ReconResult};

/// Extractor output for a vendor id it could not read.
const UNKNOWN_VENDOR_ID: &str = "不明";

/// Knobs for a single reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub max_distance: usize,
    pub workers: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            workers: 1,
        }
    }
}

impl From<&ReconConfig> for MatchOptions {
    fn from(config: &ReconConfig) -> Self {
        Self {
            max_distance: config.tolerance.max_distance,
            workers: config.engine.workers.max(1),
        }
    }
}

/// Reconcile with default options: distance 2, sequential, no hook.
pub fn reconcile(orders: &[OrderRecord], invoices: &[InvoiceRecord]) -> Vec<DiffRow> {
    reconcile_with(orders, invoices, &MatchOptions::default(), &NoopHook)
}

/// One [`DiffRow`] per order, in order. Never fails: an order with no
/// invoice within tolerance yields an `UNMATCHED` row.
pub fn reconcile_with(
    orders: &[OrderRecord],
    invoices: &[InvoiceRecord],
    options: &MatchOptions,
    hook: &dyn MismatchHook,
) -> Vec<DiffRow> {
    // Invoice keys are normalized once, not per pair.
    let invoice_keys: Vec<ComparisonKey> = invoices.iter().map(ComparisonKey::from_invoice).collect();

    let workers = options.workers.max(1).min(orders.len().max(1));
    if workers == 1 {
        return reconcile_range(orders, invoices, &invoice_keys, options.max_distance, hook);
    }

    let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(workers, error = %e, "thread pool unavailable, matching sequentially");
            return reconcile_range(orders, invoices, &invoice_keys, options.max_distance, hook);
        }
    };
    tracing::debug!(workers, "matching orders in parallel");

    // Indexed collect keeps rows in order position.
    pool.install(|| {
        orders
            .par_iter()
            .enumerate()
            .map(|(order_index, order)| {
                match_order(order_index, order, invoices, &invoice_keys, options.max_distance, hook)
            })
            .collect()
    })
}

fn reconcile_range(
    orders: &[OrderRecord],
    invoices: &[InvoiceRecord],
    invoice_keys: &[ComparisonKey],
    max_distance: usize,
    hook: &dyn MismatchHook,
) -> Vec<DiffRow> {
    orders
        .iter()
        .enumerate()
        .map(|(i, order)| match_order(i, order, invoices, invoice_keys, max_distance, hook))
        .collect()
}

fn match_order(
    order_index: usize,
    order: &OrderRecord,
    invoices: &[InvoiceRecord],
    invoice_keys: &[ComparisonKey],
    max_distance: usize,
    hook: &dyn MismatchHook,
) -> DiffRow {
    let order_key = ComparisonKey::from_order(order);
    let hit = first_match(order_index, &order_key, invoice_keys, max_distance, hook);
    if hit.is_none() {
        tracing::debug!(order_index, key = ?order_key, "no invoice within tolerance");
    }
    build_row(order, hit.map(|idx| (idx, &invoices[idx])))
}

/// Assemble the output row for one order and its match, if any.
pub fn build_row(order: &OrderRecord, matched: Option<(usize, &InvoiceRecord)>) -> DiffRow {
    let order_fields: BTreeMap<OrderField, FieldValue> = OrderField::ALL
        .iter()
        .map(|&f| (f, output_value(order.get(f))))
        .collect();

    match matched {
        Some((index, invoice)) => DiffRow {
            order: order_fields,
            invoice: map_invoice(invoice),
            status: MatchStatus::Matched,
            invoice_index: Some(index),
        },
        None => DiffRow {
            order: order_fields,
            invoice: OrderField::ALL
                .iter()
                .map(|&f| (f, FieldValue::blank()))
                .collect(),
            status: MatchStatus::Unmatched,
            invoice_index: None,
        },
    }
}

/// Translate an invoice into the order vocabulary.
pub fn map_invoice(invoice: &InvoiceRecord) -> BTreeMap<OrderField, FieldValue> {
    OrderField::ALL
        .iter()
        .map(|&field| {
            let value = match field {
                OrderField::VendorId => invoice_vendor_id(invoice),
                OrderField::VendorName => output_value(invoice.get(InvoiceField::ContractorName)),
                OrderField::BuildingName => output_value(invoice.get(InvoiceField::PropertyName)),
                OrderField::UnitNumber => output_value(invoice.get(InvoiceField::RoomNumber)),
                OrderField::PaymentAmount => {
                    FieldValue::Text(invoice.get(InvoiceField::Amount).comparable_text())
                }
                other => output_value(invoice.get_order_field(other)),
            };
            (field, value)
        })
        .collect()
}

/// The invoice's own vendor id, unless missing or the extractor's
/// placeholder; then the order number stands in.
fn invoice_vendor_id(invoice: &InvoiceRecord) -> FieldValue {
    let own = invoice.get_order_field(OrderField::VendorId);
    let usable = match own {
        FieldValue::Empty => false,
        FieldValue::Text(s) => !s.is_empty() && s != UNKNOWN_VENDOR_ID,
        FieldValue::Number(_) => true,
    };
    if usable {
        own.clone()
    } else {
        output_value(invoice.get(InvoiceField::OrderNumber))
    }
}

fn output_value(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Empty => FieldValue::blank(),
        other => other.clone(),
    }
}

/// Run a full reconciliation per config. Returns rows plus meta and summary.
pub fn run(config: &ReconConfig, input: &ReconInput) -> ReconResult {
    let options = MatchOptions::from(config);

    tracing::info!(
        config = %config.name,
        orders = input.orders.len(),
        invoices = input.invoices.len(),
        max_distance = options.max_distance,
        workers = options.workers,
        "reconciliation started"
    );

    let diff_rows = reconcile_with(&input.orders, &input.invoices, &options, &TracingHook);
    let summary = compute_summary(&diff_rows, input.invoices.len());

    tracing::info!(
        matched = summary.matched,
        unmatched = summary.unmatched,
        invoices_unused = summary.invoices_unused,
        "reconciliation finished"
    );

    ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            max_distance: options.max_distance,
            workers: options.workers,
            labels: config.output.labels,
        },
        summary,
        diff_rows,
    }
}
