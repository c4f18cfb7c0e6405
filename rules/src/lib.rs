pub mod duration;
pub mod error;
pub mod loader;
pub mod model;
pub mod percentage;

pub use error::RuleError;
pub use model::{ChannelConfig, GlobalRuleConfig, PriceAlertRule, SecurityRuleConfig};
