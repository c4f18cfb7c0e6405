use std::fmt;

/// Counters collected over one evaluation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Securities compared against a persisted baseline.
    pub evaluated: usize,
    /// Securities seen for the first time.
    pub baselined: usize,
    pub missing_quotes: usize,
    pub alerts_sent: usize,
    pub suppressed: usize,
    pub incomplete: usize,
    pub failures: usize,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "evaluated={} baselined={} missing={} sent={} suppressed={} incomplete={} failures={}",
            self.evaluated,
            self.baselined,
            self.missing_quotes,
            self.alerts_sent,
            self.suppressed,
            self.incomplete,
            self.failures
        )
    }
}
