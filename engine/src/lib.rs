pub mod cycle;
pub mod error;
pub mod percentage;
pub mod runner;
pub mod silence;
pub mod threshold;
pub mod types;

pub use cycle::run_cycle;
pub use error::EngineError;
pub use percentage::{Deviation, PercentageCheck, check_percentage};
pub use runner::CycleRunner;
pub use silence::should_suppress;
pub use threshold::{ThresholdCheck, check_threshold};
pub use types::CycleReport;
