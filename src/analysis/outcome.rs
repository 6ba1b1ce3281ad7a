use super::error::AnalysisError;
use super::types::RelevanceReport;

/// User-facing status for an analysis that could not run.
pub const DEGRADED_STATUS: &str = "semantic analysis unavailable";

/// Result of [`RelevanceAnalyzer::analyze`](super::RelevanceAnalyzer::analyze).
///
/// A degraded outcome still carries a well-formed (zero) report, so callers that only need
/// the report can use [`into_report`](Self::into_report) unconditionally.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Complete(RelevanceReport),
    Degraded {
        report: RelevanceReport,
        reason: AnalysisError,
    },
}

impl AnalysisOutcome {
    pub(crate) fn degraded(reason: AnalysisError) -> Self {
        AnalysisOutcome::Degraded {
            report: RelevanceReport::failed(&reason.to_string()),
            reason,
        }
    }

    pub fn report(&self) -> &RelevanceReport {
        match self {
            AnalysisOutcome::Complete(report) | AnalysisOutcome::Degraded { report, .. } => report,
        }
    }

    pub fn into_report(self) -> RelevanceReport {
        match self {
            AnalysisOutcome::Complete(report) | AnalysisOutcome::Degraded { report, .. } => report,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, AnalysisOutcome::Degraded { .. })
    }

    /// Why the analysis degraded, if it did.
    pub fn reason(&self) -> Option<&AnalysisError> {
        match self {
            AnalysisOutcome::Complete(_) => None,
            AnalysisOutcome::Degraded { reason, .. } => Some(reason),
        }
    }

    /// `None` for complete analyses, [`DEGRADED_STATUS`] otherwise.
    pub fn status_message(&self) -> Option<&'static str> {
        self.is_degraded().then_some(DEGRADED_STATUS)
    }
}
