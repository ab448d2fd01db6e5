use std::collections::HashMap;

use crate::model::{DiffRow, MatchStatus, ReconSummary};

/// Compute summary statistics from diff rows.
///
/// `invoice_count` is the size of the flattened invoice list the rows were
/// matched against; it is needed to count invoices nobody claimed.
pub fn compute_summary(rows: &[DiffRow], invoice_count: usize) -> ReconSummary {
    let mut matched = 0;
    let mut unmatched = 0;
    let mut claims: HashMap<usize, usize> = HashMap::new();

    for row in rows {
        match row.status {
            MatchStatus::Matched => matched += 1,
            MatchStatus::Unmatched => unmatched += 1,
        }
        if let Some(idx) = row.invoice_index {
            *claims.entry(idx).or_insert(0) += 1;
        }
    }

    let invoices_used = claims.len();
    ReconSummary {
        total_orders: rows.len(),
        matched,
        unmatched,
        invoices: invoice_count,
        invoices_used,
        invoices_unused: invoice_count.saturating_sub(invoices_used),
        invoices_reused: claims.values().filter(|&&n| n > 1).count(),
    }
}
