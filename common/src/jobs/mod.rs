use crate::model::outcome::GenerationOutcome;
use serde::Serialize;

/// Status of a background generation job, as polled by the GUI.
#[derive(Clone, Debug, Serialize)]
pub enum JobStatus {
    Pending,
    /// `completed` of `total` rows attempted; `current` is the file just processed.
    InProgress {
        completed: usize,
        total: usize,
        current: String,
    },
    Completed(GenerationOutcome),
    /// The run stopped before any row was processed (bad input, missing file...).
    Failed(String),
}
