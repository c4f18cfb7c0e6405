pub mod alert_log;
pub mod fcsapi;
pub mod source;
pub mod types;

pub use alert_log::{AlertEvent, AlertKey, AlertLog, PERCENT_UNIT};
pub use source::{QuoteBatch, QuoteSource};
pub use types::{SecurityId, SecuritySnapshot};
