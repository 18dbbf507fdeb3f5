pub mod customer;
pub mod employee;
pub mod engine;
pub mod pricing;
pub mod similarity;
pub mod summary;
pub mod title;

pub use customer::{CustomerMatch, CustomerMatcher};
pub use employee::{EmployeeMatch, EmployeeMatcher};
pub use engine::{Discrepancy, ReconciliationEngine};
pub use pricing::{flat_price, resolve_price, ResolvedPrice, FALLBACK_CHAIN};
pub use similarity::{Ratio, Similarity, TokenSortRatio};
pub use summary::ReconSummary;
pub use title::TitleNormalizer;
