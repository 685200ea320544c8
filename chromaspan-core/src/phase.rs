use crate::trial::Outcome;

/// Where a session currently is in the timed-trial cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Waiting for an explicit start.
    #[default]
    Idle,
    /// Showing item `item` of the trial; `visible` is false during the blank
    /// gap that follows each item.
    Presenting { item: usize, visible: bool },
    /// Blank retention interval before the response window.
    Retention,
    AwaitingResponse,
    Feedback { outcome: Outcome },
    /// Blank pause between trials.
    InterTrial,
    Done,
}

impl SessionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionPhase::Idle)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, SessionPhase::Done)
    }

    /// Between start and done.
    pub fn is_running(&self) -> bool {
        !self.is_idle() && !self.is_done()
    }

    pub fn allows_input(&self) -> bool {
        matches!(self, SessionPhase::AwaitingResponse)
    }

    pub fn can_start(&self) -> bool {
        self.is_idle() || self.is_done()
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Presenting { .. } => "presenting",
            SessionPhase::Retention => "retention",
            SessionPhase::AwaitingResponse => "awaiting_response",
            SessionPhase::Feedback { .. } => "feedback",
            SessionPhase::InterTrial => "inter_trial",
            SessionPhase::Done => "done",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
