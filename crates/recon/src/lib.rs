//! `tsukiai-recon`: order/invoice reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded order and invoice records,
//! returns one diff row per order. No CLI dependencies.

pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod fields;
pub mod input;
pub mod load;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod output;

pub use config::ReconConfig;
pub use distance::{levenshtein_distance, within_distance};
pub use engine::{reconcile, reconcile_with, run, MatchOptions};
pub use error::ReconError;
pub use fields::{InvoiceField, LabelStyle, OrderField};
pub use input::ReconInput;
pub use model::{DiffRow, FieldValue, InvoiceRecord, MatchStatus, OrderRecord, ReconResult};
pub use normalize::normalize;
