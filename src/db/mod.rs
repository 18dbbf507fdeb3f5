pub mod export;
pub mod pool;
pub mod queries;
pub mod sources;

pub use export::write_report;
pub use pool::create_pool;
pub use queries::{list_billing_records, parse_month};
pub use sources::{
    load_billing_records, load_employee_directory, load_fcc_pricing, load_reference_data,
    load_regular_pricing,
};
