use notify::NotifyError;
use rules::RuleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("rule configuration unavailable: {0}")]
    Config(#[from] RuleError),

    #[error("notification setup failed: {0}")]
    Notify(#[from] NotifyError),

    #[error("quote fetch failed: {0:#}")]
    Quotes(anyhow::Error),

    /// The batch was not persisted; the next cycle starts from the last
    /// committed state.
    #[error("snapshot commit failed: {0:#}")]
    Commit(anyhow::Error),
}
