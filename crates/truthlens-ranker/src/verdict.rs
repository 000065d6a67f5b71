//! Verdict thresholds.

use truthlens_common::Verdict;

/// Lower score bound for each verdict tier, checked top-down.
const THRESHOLDS: [(f64, Verdict); 3] = [
    (88.0, Verdict::Trustworthy),
    (65.0, Verdict::Caution),
    (40.0, Verdict::Misleading),
];

/// Map a final score to its verdict. First matching tier wins.
pub fn classify_verdict(score: f64) -> Verdict {
    THRESHOLDS
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, verdict)| *verdict)
        .unwrap_or(Verdict::Propaganda)
}
