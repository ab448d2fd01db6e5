//! Field vocabularies for both record sources.
//!
//! Orders arrive with spreadsheet column labels; invoices arrive with the
//! labels the extractor produced. Each field carries an ASCII key (used in
//! JSON output by default) and its source label (the Japanese column name).
//! Either spelling is accepted on input.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Order vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderField {
    VendorId,
    VendorName,
    Code,
    BuildingName,
    UnitNumber,
    WorkDescription,
    PaymentAmount,
    Creator,
    CompletionDate,
    RepairVendorId,
    PaymentTerms,
    PaymentDate,
    AdvanceAmount,
    BillingDate,
}

impl OrderField {
    /// Every order field, in output column order.
    pub const ALL: [OrderField; 14] = [
        OrderField::VendorId,
        OrderField::VendorName,
        OrderField::Code,
        OrderField::BuildingName,
        OrderField::UnitNumber,
        OrderField::WorkDescription,
        OrderField::PaymentAmount,
        OrderField::Creator,
        OrderField::CompletionDate,
        OrderField::RepairVendorId,
        OrderField::PaymentTerms,
        OrderField::PaymentDate,
        OrderField::AdvanceAmount,
        OrderField::BillingDate,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            OrderField::VendorId => "vendor_id",
            OrderField::VendorName => "vendor_name",
            OrderField::Code => "code",
            OrderField::BuildingName => "building_name",
            OrderField::UnitNumber => "unit_number",
            OrderField::WorkDescription => "work_description",
            OrderField::PaymentAmount => "payment_amount",
            OrderField::Creator => "creator",
            OrderField::CompletionDate => "completion_date",
            OrderField::RepairVendorId => "repair_vendor_id",
            OrderField::PaymentTerms => "payment_terms",
            OrderField::PaymentDate => "payment_date",
            OrderField::AdvanceAmount => "advance_amount",
            OrderField::BillingDate => "billing_date",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderField::VendorId => "業者ID",
            OrderField::VendorName => "業者名",
            OrderField::Code => "コード",
            OrderField::BuildingName => "建物名",
            OrderField::UnitNumber => "番号",
            OrderField::WorkDescription => "受付内容",
            OrderField::PaymentAmount => "支払金額",
            OrderField::Creator => "修繕作成者",
            OrderField::CompletionDate => "完工日",
            OrderField::RepairVendorId => "修繕業者ID",
            OrderField::PaymentTerms => "支払サイト",
            OrderField::PaymentDate => "支払日",
            OrderField::AdvanceAmount => "立替金",
            OrderField::BillingDate => "請求日",
        }
    }

    /// Look up a field by ASCII key or source label.
    pub fn resolve(name: &str) -> Option<OrderField> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key() == name || f.label() == name)
    }

    pub fn name(&self, style: LabelStyle) -> &'static str {
        match style {
            LabelStyle::Ascii => self.key(),
            LabelStyle::Source => self.label(),
        }
    }
}

// ---------------------------------------------------------------------------
// Invoice vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InvoiceField {
    OrderNumber,
    Amount,
    PropertyName,
    RoomNumber,
    ContractorName,
}

impl InvoiceField {
    pub const ALL: [InvoiceField; 5] = [
        InvoiceField::OrderNumber,
        InvoiceField::Amount,
        InvoiceField::PropertyName,
        InvoiceField::RoomNumber,
        InvoiceField::ContractorName,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            InvoiceField::OrderNumber => "order_number",
            InvoiceField::Amount => "amount",
            InvoiceField::PropertyName => "property_name",
            InvoiceField::RoomNumber => "room_number",
            InvoiceField::ContractorName => "contractor_name",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvoiceField::OrderNumber => "発注番号",
            InvoiceField::Amount => "金額",
            InvoiceField::PropertyName => "物件名",
            InvoiceField::RoomNumber => "部屋番号",
            InvoiceField::ContractorName => "工事業者名",
        }
    }

    pub fn resolve(name: &str) -> Option<InvoiceField> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key() == name || f.label() == name)
    }
}

/// Canonical storage key for an incoming column name.
///
/// Known names (either vocabulary, either spelling) collapse to the ASCII
/// key; anything else is kept verbatim.
pub fn canonical_key(name: &str) -> String {
    if let Some(f) = OrderField::resolve(name) {
        return f.key().to_string();
    }
    if let Some(f) = InvoiceField::resolve(name) {
        return f.key().to_string();
    }
    name.to_string()
}

// ---------------------------------------------------------------------------
// Output naming
// ---------------------------------------------------------------------------

/// Which vocabulary to use for output column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// `order_vendor_name`, `invoice_vendor_name`, ...
    #[default]
    Ascii,
    /// `order_業者名`, `invoice_業者名`, ...
    Source,
}
