//! Per-email invite outcomes and the aggregated run report.

/// The result of one invite attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteOutcome {
    pub ok: bool,
    pub message: String,
}

impl InviteOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Aggregated counters for a completed sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Invites that succeeded or were tolerated as already satisfied.
    pub invited: usize,
    /// Invites that hard-failed.
    pub failed: usize,
    /// Unique emails attempted.
    pub total: usize,
}

impl SyncReport {
    pub fn record(&mut self, outcome: &InviteOutcome) {
        self.total += 1;
        if outcome.ok {
            self.invited += 1;
        } else {
            self.failed += 1;
        }
    }
}
