// Types module - detection result structures

use serde::{Deserialize, Serialize};

/// One candidate fundamental and how strongly it shows up in the spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HumCandidate {
    /// Candidate fundamental in Hz
    pub frequency: f64,

    /// Sum over the fundamental and its first harmonics of
    /// peak magnitude / local noise floor
    ///
    /// Pure noise lands around 1-3 per harmonic; a clear hum line is
    /// orders of magnitude higher.
    pub score: f64,

    /// Whether `score` reached the detector's confidence threshold
    ///
    /// A non-confident candidate is still the best guess, not a failure.
    pub confident: bool,
}

/// Full detector output: the winner plus every scored candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumDetection {
    pub best: HumCandidate,
    pub candidates: Vec<HumCandidate>,
}

impl HumDetection {
    /// Score of a specific candidate frequency, if it was evaluated
    pub fn score_of(&self, frequency: f64) -> Option<f64> {
        self.candidates
            .iter()
            .find(|candidate| candidate.frequency == frequency)
            .map(|candidate| candidate.score)
    }
}
