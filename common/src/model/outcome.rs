use serde::Serialize;

/// Ledger of one generation run.
///
/// Filled row by row by the orchestrator and handed to the caller only once
/// every row has been attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    /// Output filenames produced, in row order.
    successful: Vec<String>,
    /// `(filename, error message)` for every row that could not be produced.
    failed: Vec<(String, String)>,
}

impl GenerationOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, filename: impl Into<String>) {
        self.successful.push(filename.into());
    }

    pub fn record_failure(&mut self, filename: impl Into<String>, error: impl Into<String>) {
        self.failed.push((filename.into(), error.into()));
    }

    pub fn successful(&self) -> &[String] {
        &self.successful
    }

    pub fn failed(&self) -> &[(String, String)] {
        &self.failed
    }

    /// Number of rows attempted.
    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_successes_and_failures() {
        let mut outcome = GenerationOutcome::new();
        assert!(outcome.all_succeeded());

        outcome.record_success("TXN-001.pdf");
        outcome.record_failure("TXN-002.pdf", "Permission denied");
        outcome.record_success("TXN-003.pdf");

        assert_eq!(outcome.total(), 3);
        assert!(!outcome.all_succeeded());
        assert_eq!(outcome.successful(), ["TXN-001.pdf", "TXN-003.pdf"]);
        assert_eq!(outcome.failed()[0].0, "TXN-002.pdf");
    }
}
