//! Data module - line-list loading and normalization

pub mod loader;
pub mod normalizer;
pub mod record;

pub use loader::{DataLoader, LoadError};
pub use normalizer::Normalizer;
pub use record::{CaseRecord, CaseTable, FieldWarning, WarningField, AGE_SENTINEL, NA};
