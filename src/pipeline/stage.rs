use serde::Serialize;
use std::fmt;

/// Where a municipality is in its run.
///
/// Runs move forward through
/// `Pending -> FetchingSources -> Aggregating -> Combining -> Fitting -> Done`.
/// [`PipelineStage::Skipped`] is terminal and is only entered from
/// `FetchingSources`, `Combining` or `Fitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Pending,
    FetchingSources,
    Aggregating,
    Combining,
    Fitting,
    Done,
    Skipped,
}

impl PipelineStage {
    /// The stage that follows on success, or `None` for terminal stages.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::FetchingSources),
            Self::FetchingSources => Some(Self::Aggregating),
            Self::Aggregating => Some(Self::Combining),
            Self::Combining => Some(Self::Fitting),
            Self::Fitting => Some(Self::Done),
            Self::Done | Self::Skipped => None,
        }
    }

    /// Whether a municipality in this stage may end up skipped.
    pub fn can_skip(self) -> bool {
        matches!(
            self,
            Self::FetchingSources | Self::Combining | Self::Fitting
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Skipped)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::FetchingSources => "fetching sources",
            Self::Aggregating => "aggregating",
            Self::Combining => "combining",
            Self::Fitting => "fitting",
            Self::Done => "done",
            Self::Skipped => "skipped",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_advance_to_done() {
        let mut stage = PipelineStage::Pending;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            stage = next;
            visited.push(stage);
        }
        assert_eq!(visited.len(), 6);
        assert_eq!(stage, PipelineStage::Done);
        assert!(stage.is_terminal());
    }

    #[test]
    fn test_skippable_stages() {
        assert!(PipelineStage::FetchingSources.can_skip());
        assert!(PipelineStage::Combining.can_skip());
        assert!(PipelineStage::Fitting.can_skip());
        assert!(!PipelineStage::Aggregating.can_skip());
        assert!(!PipelineStage::Pending.can_skip());
        assert_eq!(PipelineStage::Skipped.next(), None);
    }
}
