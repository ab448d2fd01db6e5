use crate::distance::levenshtein_distance;
use crate::fields::{InvoiceField, OrderField};
use crate::model::{InvoiceRecord, OrderRecord};
use crate::normalize::normalize_value;

/// The four normalized values an order and an invoice are compared on.
///
/// Each value feeds [`levenshtein_distance`], whose grid grows with the
/// product of both lengths; the only bound on field length is the CLI's
/// input file cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonKey {
    pub vendor: String,
    pub building: String,
    pub unit: String,
    pub amount: String,
}

/// Per-field edit distances between two keys, in key field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDistances {
    pub vendor: usize,
    pub building: usize,
    pub unit: usize,
    pub amount: usize,
}

impl FieldDistances {
    pub fn all_within(&self, max_dist: usize) -> bool {
        self.vendor <= max_dist
            && self.building <= max_dist
            && self.unit <= max_dist
            && self.amount <= max_dist
    }

    pub fn total(&self) -> usize {
        self.vendor + self.building + self.unit + self.amount
    }
}

impl ComparisonKey {
    pub fn from_order(order: &OrderRecord) -> Self {
        Self {
            vendor: normalize_value(order.get(OrderField::VendorName)),
            building: normalize_value(order.get(OrderField::BuildingName)),
            unit: normalize_value(order.get(OrderField::UnitNumber)),
            amount: normalize_value(order.get(OrderField::PaymentAmount)),
        }
    }

    pub fn from_invoice(invoice: &InvoiceRecord) -> Self {
        Self {
            vendor: normalize_value(invoice.get(InvoiceField::ContractorName)),
            building: normalize_value(invoice.get(InvoiceField::PropertyName)),
            unit: normalize_value(invoice.get(InvoiceField::RoomNumber)),
            amount: normalize_value(invoice.get(InvoiceField::Amount)),
        }
    }

    pub fn distances(&self, other: &ComparisonKey) -> FieldDistances {
        FieldDistances {
            vendor: levenshtein_distance(&self.vendor, &other.vendor),
            building: levenshtein_distance(&self.building, &other.building),
            unit: levenshtein_distance(&self.unit, &other.unit),
            amount: levenshtein_distance(&self.amount, &other.amount),
        }
    }

    /// True iff every field pair is within `max_dist`.
    ///
    /// Short-circuits on the first field out of range; use [`distances`]
    /// when all four numbers are needed.
    ///
    /// [`distances`]: ComparisonKey::distances
    pub fn within(&self, other: &ComparisonKey, max_dist: usize) -> bool {
        levenshtein_distance(&self.vendor, &other.vendor) <= max_dist
            && levenshtein_distance(&self.building, &other.building) <= max_dist
            && levenshtein_distance(&self.unit, &other.unit) <= max_dist
            && levenshtein_distance(&self.amount, &other.amount) <= max_dist
    }
}

// ---------------------------------------------------------------------------
// Observability hook
// ---------------------------------------------------------------------------

/// Observer for candidate pairs the matcher rejects.
///
/// Called once per (order, invoice) pair that fails the predicate, in scan
/// order, before the scan moves on. Implementations must be `Sync` because
/// the engine may scan orders on several threads.
pub trait MismatchHook: Sync {
    fn rejected(
        &self,
        order_index: usize,
        invoice_index: usize,
        order_key: &ComparisonKey,
        invoice_key: &ComparisonKey,
        distances: &FieldDistances,
    );

    /// Whether the matcher should compute full distances for rejected
    /// pairs. `false` keeps the short-circuiting fast path.
    fn enabled(&self) -> bool {
        true
    }
}

/// Hook that observes nothing.
pub struct NoopHook;

impl MismatchHook for NoopHook {
    fn rejected(
        &self,
        _order_index: usize,
        _invoice_index: usize,
        _order_key: &ComparisonKey,
        _invoice_key: &ComparisonKey,
        _distances: &FieldDistances,
    ) {
    }

    fn enabled(&self) -> bool {
        false
    }
}

/// Emits every rejected pair at `TRACE` level.
pub struct TracingHook;

impl MismatchHook for TracingHook {
    fn rejected(
        &self,
        order_index: usize,
        invoice_index: usize,
        order_key: &ComparisonKey,
        invoice_key: &ComparisonKey,
        distances: &FieldDistances,
    ) {
        tracing::trace!(
            order_index,
            invoice_index,
            order = ?order_key,
            invoice = ?invoice_key,
            vendor = distances.vendor,
            building = distances.building,
            unit = distances.unit,
            amount = distances.amount,
            "candidate rejected"
        );
    }

    fn enabled(&self) -> bool {
        tracing::enabled!(tracing::Level::TRACE)
    }
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// Index of the first invoice key within `max_dist` of `order_key` on all
/// four fields. Scans in list order and stops at the first hit; later
/// candidates are never considered, even if closer.
pub fn first_match(
    order_index: usize,
    order_key: &ComparisonKey,
    invoice_keys: &[ComparisonKey],
    max_dist: usize,
    hook: &dyn MismatchHook,
) -> Option<usize> {
    let observe = hook.enabled();

    for (invoice_index, invoice_key) in invoice_keys.iter().enumerate() {
        if observe {
            let distances = order_key.distances(invoice_key);
            if distances.all_within(max_dist) {
                return Some(invoice_index);
            }
            hook.rejected(order_index, invoice_index, order_key, invoice_key, &distances);
        } else if order_key.within(invoice_key, max_dist) {
            return Some(invoice_index);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn key(vendor: &str, building: &str, unit: &str, amount: &str) -> ComparisonKey {
        ComparisonKey {
            vendor: vendor.into(),
            building: building.into(),
            unit: unit.into(),
            amount: amount.into(),
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(usize, usize, usize)>>,
    }

    impl MismatchHook for Recorder {
        fn rejected(
            &self,
            order_index: usize,
            invoice_index: usize,
            _order_key: &ComparisonKey,
            _invoice_key: &ComparisonKey,
            distances: &FieldDistances,
        ) {
            self.seen
                .lock()
                .unwrap()
                .push((order_index, invoice_index, distances.total()));
        }
    }

    #[test]
    fn keys_from_records_are_normalized() {
        let order: OrderRecord = [
            ("業者名", "山田 工務店"),
            ("建物名", "サンビル"),
            ("番号", "101"),
            ("支払金額", "50000"),
        ]
        .into_iter()
        .collect();
        let k = ComparisonKey::from_order(&order);
        assert_eq!(k, key("山田工務店", "サンビル", "１０１", "５００００"));
    }

    #[test]
    fn within_requires_all_four() {
        let a = key("ａａａ", "ｂｂｂ", "ｃｃｃ", "ｄｄｄ");
        assert!(a.within(&key("ａａａ", "ｂｂｂ", "ｃｃｃ", "ｄｄｄ"), 2));
        assert!(a.within(&key("ａａ", "ｂ", "ｃｃｃｃ", "ｘｄｄ"), 2));
        assert!(!a.within(&key("ａａａ", "ｂｂｂ", "ｃｃｃ", "ｘｘｘ"), 2));
        assert!(!a.within(&key("", "ｂｂｂ", "ｃｃｃ", "ｄｄｄ"), 2));
    }

    #[test]
    fn first_match_takes_earliest() {
        let order = key("ａ", "ｂ", "ｃ", "１");
        let invoices = vec![
            key("ｚｚｚｚ", "ｂ", "ｃ", "１"),
            key("ａｘ", "ｂ", "ｃ", "１"),
            key("ａ", "ｂ", "ｃ", "１"),
        ];
        // index 2 is exact, but index 1 is within tolerance and earlier
        assert_eq!(first_match(0, &order, &invoices, 2, &NoopHook), Some(1));
    }

    #[test]
    fn first_match_none() {
        let order = key("ａ", "ｂ", "ｃ", "１");
        assert_eq!(first_match(0, &order, &[], 2, &NoopHook), None);
        let far = vec![key("ａ", "ｂ", "ｃ", "９９９９")];
        assert_eq!(first_match(0, &order, &far, 2, &NoopHook), None);
    }

    #[test]
    fn hook_sees_rejected_pairs_only() {
        let order = key("ａ", "ｂ", "ｃ", "１");
        let invoices = vec![
            key("ａ", "ｂ", "ｃ", "９９９９"),
            key("ａ", "ｂ", "ｃ", "１"),
            key("ａ", "ｂ", "ｃ", "９９９９"),
        ];
        let hook = Recorder::default();
        assert_eq!(first_match(7, &order, &invoices, 2, &hook), Some(1));
        let seen = hook.seen.lock().unwrap();
        assert_eq!(*seen, vec![(7, 0, 4)]);
    }
}
