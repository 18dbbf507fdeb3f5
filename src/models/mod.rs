pub mod bill;
pub mod pricing;
pub mod result;

pub use bill::BillingRecord;
pub use pricing::{EmployeeDirectoryEntry, PricingRow, PricingTable, ReferenceData, Tier};
pub use result::{
    CustomerType, MatchResult, PricedTier, ReconciliationOutput, ReconciliationRecord,
    UnmatchedEntry,
};
