//! The timed-trial sequencer shared by every game.
//!
//! A [`Sequencer`] walks each trial through presentation, retention, the
//! response window and feedback. All delayed transitions go through one
//! [`TimerSlot`], so arming the next phase always disarms the previous one.
//! Transitions are chained from the deadline that fired, not from the time
//! the driver happened to call [`Sequencer::tick`], which keeps presentation
//! timing free of drift.

use crate::config::GameConfig;
use crate::games::{Game, GameKind, make_game};
use crate::trial::{Response, ResponseMode, Trial, TrialTimestamps};
use chromaspan_core::{
    OptionView, Outcome, Score, SessionPhase, SessionView, Setting, Summary, TrialRecord,
};
use chromaspan_timing::{Clock, TimerSlot};
use rand::RngCore;
use tracing::{debug, info};

/// Idle-time adjustment direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SessionStarted { budget: usize },
    TrialStarted { index: usize, span: usize },
    ItemShown { item: usize },
    ResponseOpened,
    TrialJudged {
        index: usize,
        outcome: Outcome,
        reaction_ms: Option<u64>,
    },
    SessionComplete(Summary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// End of an item's display or of the gap after it.
    Advance,
    OpenResponse,
    ResponseTimeout,
    EndFeedback,
    NextTrial,
}

pub struct Sequencer<C: Clock, R: RngCore> {
    game: Box<dyn Game>,
    config: GameConfig,
    clock: C,
    rng: R,
    timer: TimerSlot<Transition>,
    phase: SessionPhase,
    budget: usize,
    current: Option<Trial>,
    stamps: TrialTimestamps,
    selections: Vec<usize>,
    last_response: Option<Response>,
    /// Verdict of a match-key press whose window has not closed yet.
    held: Option<Outcome>,
    score: Score,
    records: Vec<TrialRecord>,
    summary: Option<Summary>,
}

impl<C: Clock, R: RngCore> Sequencer<C, R> {
    pub fn new(game: Box<dyn Game>, config: GameConfig, clock: C, rng: R) -> Self {
        Self {
            game,
            config: config.clamped(),
            clock,
            rng,
            timer: TimerSlot::new(),
            phase: SessionPhase::Idle,
            budget: 0,
            current: None,
            stamps: TrialTimestamps::default(),
            selections: Vec::new(),
            last_response: None,
            held: None,
            score: Score::default(),
            records: Vec::new(),
            summary: None,
        }
    }

    pub fn for_kind(kind: GameKind, config: GameConfig, clock: C, rng: R) -> Self {
        Self::new(make_game(kind), config, clock, rng)
    }

    pub fn kind(&self) -> GameKind {
        self.game.kind()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn current_trial(&self) -> Option<&Trial> {
        self.current.as_ref()
    }

    /// Clock time of the next scheduled transition.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timer.deadline()
    }

    /// Begins a fresh session. Only valid when idle or done.
    pub fn start(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.phase.can_start() {
            debug!(phase = %self.phase, "start ignored");
            return events;
        }
        self.reset();
        self.budget = self.game.begin(&self.config, &mut self.rng);
        info!(game = %self.kind(), budget = self.budget, "session started");
        events.push(SessionEvent::SessionStarted {
            budget: self.budget,
        });
        let now = self.clock.now_ms();
        if self.budget == 0 {
            self.finish(&mut events);
        } else {
            self.begin_trial(0, now, &mut events);
        }
        events
    }

    /// Abandons whatever is running and returns to a fresh idle state.
    pub fn restart(&mut self) {
        if self.phase.is_running() {
            info!(game = %self.kind(), phase = %self.phase, "session abandoned");
        }
        self.reset();
        self.phase = SessionPhase::Idle;
    }

    /// Applies every transition that has come due.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let now = self.clock.now_ms();
        while let Some(due) = self.timer.deadline() {
            match self.timer.poll(now) {
                Some(transition) => self.apply(transition, due, &mut events),
                None => break,
            }
        }
        events
    }

    /// Clicks option `option` while a selection response is open.
    pub fn select(&mut self, option: usize) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.phase.allows_input() {
            return events;
        }
        let Some(trial) = &self.current else {
            return events;
        };
        let ResponseMode::Select { count, distinct } = trial.mode else {
            return events;
        };
        if option >= trial.options.len() || (distinct && self.selections.contains(&option)) {
            return events;
        }
        self.selections.push(option);
        if self.selections.len() >= count {
            let selected = std::mem::take(&mut self.selections);
            let now = self.clock.now_ms();
            self.conclude(Response::Selections(selected), now, &mut events);
        }
        events
    }

    /// The match key, for games that answer with a single press.
    pub fn press_match(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let accepts = self.phase.allows_input()
            && self.held.is_none()
            && self
                .current
                .as_ref()
                .is_some_and(|t| t.mode == ResponseMode::MatchKey);
        if accepts {
            let now = self.clock.now_ms();
            self.conclude(Response::Match, now, &mut events);
        }
        events
    }

    /// Changes the game's adjustable setting. Ignored outside idle.
    pub fn adjust(&mut self, step: Step) -> Option<Setting> {
        if !self.phase.is_idle() {
            return None;
        }
        let setting = self.game.adjust(&mut self.config, step);
        if let Some(setting) = setting {
            debug!(label = setting.label, value = setting.value, "setting adjusted");
        }
        setting
    }

    pub fn setting(&self) -> Option<Setting> {
        self.game.setting(&self.config)
    }

    fn reset(&mut self) {
        self.timer.cancel();
        self.budget = 0;
        self.current = None;
        self.stamps = TrialTimestamps::default();
        self.selections.clear();
        self.last_response = None;
        self.held = None;
        self.score = Score::default();
        self.records.clear();
        self.summary = None;
    }

    fn trial_index(&self) -> usize {
        self.current.as_ref().map_or(0, |t| t.index)
    }

    fn apply(&mut self, transition: Transition, at: u64, events: &mut Vec<SessionEvent>) {
        debug!(?transition, phase = %self.phase, at, "transition");
        match (transition, self.phase) {
            (Transition::Advance, SessionPhase::Presenting { item, visible: true })
                if self.config.gap_ms > 0 =>
            {
                self.phase = SessionPhase::Presenting {
                    item,
                    visible: false,
                };
                self.timer.schedule(at, self.config.gap_ms, Transition::Advance);
            }
            (Transition::Advance, SessionPhase::Presenting { item, .. }) => {
                self.show_item(item + 1, at, events);
            }
            (Transition::OpenResponse, SessionPhase::Retention) => self.open_response(at, events),
            (Transition::ResponseTimeout, SessionPhase::AwaitingResponse) => {
                match self.held.take() {
                    Some(outcome) => self.enter_feedback(outcome, at),
                    None => {
                        self.selections.clear();
                        self.conclude(Response::NoAnswer, at, events);
                    }
                }
            }
            (Transition::EndFeedback, SessionPhase::Feedback { .. }) => {
                let next = self.trial_index() + 1;
                if next >= self.budget {
                    self.finish(events);
                } else if self.config.inter_trial_ms > 0 {
                    self.phase = SessionPhase::InterTrial;
                    self.timer
                        .schedule(at, self.config.inter_trial_ms, Transition::NextTrial);
                } else {
                    self.begin_trial(next, at, events);
                }
            }
            (Transition::NextTrial, SessionPhase::InterTrial) => {
                let next = self.trial_index() + 1;
                self.begin_trial(next, at, events);
            }
            (transition, phase) => {
                debug!(?transition, %phase, "transition does not apply, dropped");
            }
        }
    }

    fn begin_trial(&mut self, index: usize, at: u64, events: &mut Vec<SessionEvent>) {
        let trial = self.game.build_trial(index, &self.config, &mut self.rng);
        debug!(index, span = trial.span, items = trial.items.len(), "trial started");
        events.push(SessionEvent::TrialStarted {
            index,
            span: trial.span,
        });
        self.current = Some(trial);
        self.stamps = TrialTimestamps::default();
        self.selections.clear();
        self.last_response = None;
        self.held = None;
        self.show_item(0, at, events);
    }

    /// Shows item `item`, or moves past presentation if there is none.
    fn show_item(&mut self, item: usize, at: u64, events: &mut Vec<SessionEvent>) {
        let count = self.current.as_ref().map_or(0, |t| t.items.len());
        if item < count {
            self.phase = SessionPhase::Presenting {
                item,
                visible: true,
            };
            events.push(SessionEvent::ItemShown { item });
            self.timer
                .schedule(at, self.config.display_ms, Transition::Advance);
            return;
        }

        let passive = self
            .current
            .as_ref()
            .is_some_and(|t| t.mode == ResponseMode::Passive);
        if passive {
            self.record(Outcome::Unscored, None, at, events);
        } else if self.config.retention_ms > 0 && count > 0 {
            self.phase = SessionPhase::Retention;
            self.timer
                .schedule(at, self.config.retention_ms, Transition::OpenResponse);
        } else {
            self.open_response(at, events);
        }
    }

    fn open_response(&mut self, at: u64, events: &mut Vec<SessionEvent>) {
        self.phase = SessionPhase::AwaitingResponse;
        self.stamps.response_opened_ms = Some(at);
        events.push(SessionEvent::ResponseOpened);
        match self.config.response_timeout_ms {
            Some(timeout) => {
                self.timer.schedule(at, timeout, Transition::ResponseTimeout);
            }
            None => {
                self.timer.cancel();
            }
        }
    }

    fn conclude(&mut self, response: Response, at: u64, events: &mut Vec<SessionEvent>) {
        let Some(trial) = &self.current else {
            self.timer.cancel();
            return;
        };
        let outcome = self.game.judge(trial, &response);
        // A match-key window keeps its deadline, so the stimulus stream runs
        // at the same pace whether or not the key is pressed.
        let hold = trial.mode == ResponseMode::MatchKey
            && response != Response::NoAnswer
            && self.timer.is_pending();
        let reaction_ms = match response {
            Response::NoAnswer => None,
            _ => {
                self.stamps.answered_ms = Some(at);
                self.stamps.reaction_ms()
            }
        };
        self.last_response = Some(response);
        self.book(outcome, reaction_ms, events);
        if hold {
            self.held = Some(outcome);
        } else {
            self.timer.cancel();
            self.enter_feedback(outcome, at);
        }
    }

    /// Books a finished trial and enters feedback.
    fn record(
        &mut self,
        outcome: Outcome,
        reaction_ms: Option<u64>,
        at: u64,
        events: &mut Vec<SessionEvent>,
    ) {
        self.book(outcome, reaction_ms, events);
        self.enter_feedback(outcome, at);
    }

    fn book(&mut self, outcome: Outcome, reaction_ms: Option<u64>, events: &mut Vec<SessionEvent>) {
        let (index, span) = self.current.as_ref().map_or((0, 0), |t| (t.index, t.span));
        self.score.record(outcome);
        self.records.push(TrialRecord {
            index,
            span,
            outcome,
            reaction_ms,
        });
        debug!(
            index,
            ?outcome,
            ?reaction_ms,
            correct = self.score.correct,
            total = self.score.total,
            "trial judged"
        );
        events.push(SessionEvent::TrialJudged {
            index,
            outcome,
            reaction_ms,
        });
    }

    fn enter_feedback(&mut self, outcome: Outcome, at: u64) {
        self.phase = SessionPhase::Feedback { outcome };
        self.timer
            .schedule(at, self.config.feedback_ms, Transition::EndFeedback);
    }

    fn finish(&mut self, events: &mut Vec<SessionEvent>) {
        self.timer.cancel();
        self.game.finish(&self.score);
        let summary = self.game.summary(&self.score, &self.records);
        info!(
            game = %self.kind(),
            correct = self.score.correct,
            total = self.score.total,
            trials = self.records.len(),
            "session complete"
        );
        self.current = None;
        self.phase = SessionPhase::Done;
        self.summary = Some(summary.clone());
        events.push(SessionEvent::SessionComplete(summary));
    }

    /// Snapshot of everything the renderer needs for this frame.
    pub fn view(&self) -> SessionView {
        let trial = self.current.as_ref();
        let feedback = match self.phase {
            SessionPhase::Feedback { outcome } => Some(outcome),
            SessionPhase::AwaitingResponse => self.held,
            _ => None,
        };

        let stimulus = trial.and_then(|t| match self.phase {
            SessionPhase::Presenting {
                item,
                visible: true,
            } => t.items.get(item).cloned(),
            SessionPhase::AwaitingResponse => t.cue.clone(),
            SessionPhase::Feedback { .. } => t.reveal.clone().or_else(|| t.cue.clone()),
            _ => None,
        });

        let chosen: &[usize] = match (&self.phase, &self.last_response) {
            (SessionPhase::Feedback { .. }, Some(Response::Selections(s))) => s.as_slice(),
            _ => self.selections.as_slice(),
        };

        let options = match (self.phase, trial) {
            (SessionPhase::AwaitingResponse, Some(t)) => option_views(t, chosen, false),
            (SessionPhase::Feedback { .. }, Some(t)) if t.reveal.is_none() => {
                option_views(t, chosen, true)
            }
            _ => Vec::new(),
        };

        let prompt = match self.phase {
            SessionPhase::Idle => Some("Press SPACE to start".to_string()),
            SessionPhase::Done => Some("Press SPACE to play again".to_string()),
            SessionPhase::AwaitingResponse | SessionPhase::Feedback { .. } => {
                trial.and_then(|t| t.prompt.clone())
            }
            _ => None,
        };

        SessionView {
            title: self.kind().name(),
            phase: self.phase,
            background: self.game.background(),
            stimulus,
            prompt,
            options,
            status: self.status(trial),
            feedback: feedback.filter(|o| o.is_scored()),
            progress: self
                .phase
                .is_running()
                .then(|| (self.trial_index() + 1, self.budget)),
            summary: self.summary.clone(),
            setting: self.phase.is_idle().then(|| self.setting()).flatten(),
        }
    }

    fn status(&self, trial: Option<&Trial>) -> Option<String> {
        match self.phase {
            SessionPhase::AwaitingResponse => {
                if let Some(outcome) = self.held {
                    return self.verdict(outcome);
                }
                let trial = trial?;
                if self.selections.is_empty() {
                    return None;
                }
                let labels: Option<String> = self
                    .selections
                    .iter()
                    .map(|&i| trial.options.get(i).and_then(|c| c.label()))
                    .collect();
                Some(match labels {
                    Some(text) => format!("Your response: {text}"),
                    None => format!(
                        "{} of {} selected",
                        self.selections.len(),
                        trial.required_selections()
                    ),
                })
            }
            SessionPhase::Feedback { outcome } => self.verdict(outcome),
            _ => None,
        }
    }

    fn verdict(&self, outcome: Outcome) -> Option<String> {
        match outcome {
            Outcome::Correct => match (self.timed(), self.records.last()) {
                (true, Some(TrialRecord {
                    reaction_ms: Some(ms),
                    ..
                })) => Some(format!("Correct: {ms} ms")),
                _ => Some("Correct!".to_string()),
            },
            Outcome::Incorrect => Some("Incorrect".to_string()),
            Outcome::TimedOut => Some("Too slow".to_string()),
            Outcome::Unscored => None,
        }
    }

    fn timed(&self) -> bool {
        matches!(
            self.kind(),
            GameKind::LettersToColours | GameKind::ColoursToLetters
        )
    }
}

fn option_views(trial: &Trial, chosen: &[usize], judged: bool) -> Vec<OptionView> {
    trial
        .options
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let is_chosen = chosen.contains(&i);
            let verdict = judged
                .then(|| {
                    if trial.expected.iter().any(|s| choice.matches(s)) {
                        Some(true)
                    } else if is_chosen {
                        Some(false)
                    } else {
                        None
                    }
                })
                .flatten();
            OptionView {
                choice: *choice,
                chosen: is_chosen,
                verdict,
            }
        })
        .collect()
}

impl<C: Clock, R: RngCore> Drop for Sequencer<C, R> {
    fn drop(&mut self) {
        if self.timer.cancel().is_some() {
            debug!(game = %self.kind(), "pending transition cancelled on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromaspan_core::{PALETTE_SIZE, Stimulus};
    use chromaspan_timing::ManualClock;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sequencer(kind: GameKind, config: GameConfig) -> (Sequencer<ManualClock, StdRng>, ManualClock) {
        let clock = ManualClock::new();
        let seq = Sequencer::for_kind(kind, config, clock.clone(), StdRng::seed_from_u64(42));
        (seq, clock)
    }

    fn default_sequencer(kind: GameKind) -> (Sequencer<ManualClock, StdRng>, ManualClock) {
        sequencer(kind, kind.default_config())
    }

    fn advance(seq: &mut Sequencer<ManualClock, StdRng>, clock: &ManualClock, ms: u64) -> Vec<SessionEvent> {
        clock.advance(ms);
        seq.tick()
    }

    /// Option indices that answer the current trial correctly.
    fn correct_answer(seq: &Sequencer<ManualClock, StdRng>) -> Vec<usize> {
        let trial = seq.current_trial().expect("trial running");
        trial
            .expected
            .iter()
            .map(|s| {
                trial
                    .options
                    .iter()
                    .position(|c| c.matches(s))
                    .expect("answer offered")
            })
            .collect()
    }

    fn answer(seq: &mut Sequencer<ManualClock, StdRng>, options: &[usize]) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for &i in options {
            events.extend(seq.select(i));
        }
        events
    }

    fn answer_correctly(seq: &mut Sequencer<ManualClock, StdRng>) -> Vec<SessionEvent> {
        let key = correct_answer(seq);
        answer(seq, &key)
    }

    #[test]
    fn early_span_walks_through_every_phase() {
        let (mut seq, clock) = default_sequencer(GameKind::EarlySpan);
        assert_eq!(seq.phase(), SessionPhase::Idle);

        let events = seq.start();
        assert_eq!(
            events,
            vec![
                SessionEvent::SessionStarted { budget: 20 },
                SessionEvent::TrialStarted { index: 0, span: 1 },
                SessionEvent::ItemShown { item: 0 },
            ]
        );
        assert!(matches!(
            seq.view().stimulus,
            Some(Stimulus::Glyph { .. })
        ));

        assert!(advance(&mut seq, &clock, 499).is_empty());
        advance(&mut seq, &clock, 1);
        assert_eq!(
            seq.phase(),
            SessionPhase::Presenting {
                item: 0,
                visible: false
            }
        );
        assert_eq!(seq.view().stimulus, None);

        advance(&mut seq, &clock, 250);
        assert_eq!(seq.phase(), SessionPhase::Retention);
        let events = advance(&mut seq, &clock, 500);
        assert_eq!(events, vec![SessionEvent::ResponseOpened]);
        assert_eq!(seq.view().options.len(), PALETTE_SIZE);
        assert_eq!(seq.next_deadline(), None);

        let events = answer_correctly(&mut seq);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::TrialJudged {
                index: 0,
                outcome: Outcome::Correct,
                ..
            }]
        ));
        assert_eq!(seq.score(), Score { correct: 1, total: 1 });
        assert_eq!(seq.view().status.as_deref(), Some("Correct!"));

        let events = advance(&mut seq, &clock, 1500);
        assert_eq!(
            events,
            vec![
                SessionEvent::TrialStarted { index: 1, span: 2 },
                SessionEvent::ItemShown { item: 0 },
            ]
        );
    }

    #[test]
    fn wrong_answer_lowers_span_and_shows_verdicts() {
        let config = GameConfig {
            initial_span: 3,
            ..GameKind::LateSpan.default_config()
        };
        let (mut seq, clock) = sequencer(GameKind::LateSpan, config);
        seq.start();
        advance(&mut seq, &clock, 3 * 750 + 500);
        assert_eq!(seq.phase(), SessionPhase::AwaitingResponse);

        let mut wrong = correct_answer(&seq);
        wrong.reverse();
        let events = answer(&mut seq, &wrong);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::TrialJudged {
                outcome: Outcome::Incorrect,
                ..
            }]
        ));
        let view = seq.view();
        assert_eq!(view.options.iter().filter(|o| o.verdict == Some(true)).count(), 3);
        assert!(view.status.as_deref() == Some("Incorrect"));

        let events = advance(&mut seq, &clock, 1500);
        assert!(events.contains(&SessionEvent::TrialStarted { index: 1, span: 2 }));
    }

    #[test]
    fn chained_deadlines_catch_up_without_drift() {
        let (mut seq, clock) = default_sequencer(GameKind::EarlySpan);
        seq.start();
        // One late wakeup covers display, gap and retention in one go.
        let events = advance(&mut seq, &clock, 5_000);
        assert_eq!(events, vec![SessionEvent::ResponseOpened]);
        assert_eq!(seq.phase(), SessionPhase::AwaitingResponse);
    }

    #[test]
    fn timeout_concludes_as_no_answer() {
        let (mut seq, clock) = default_sequencer(GameKind::EarlyMatch);
        seq.start();
        advance(&mut seq, &clock, 1500);
        assert_eq!(seq.phase(), SessionPhase::Retention);
        advance(&mut seq, &clock, 3000);
        assert_eq!(seq.phase(), SessionPhase::AwaitingResponse);
        assert_eq!(seq.next_deadline(), Some(8500));

        let events = advance(&mut seq, &clock, 4000);
        assert_eq!(
            events,
            vec![SessionEvent::TrialJudged {
                index: 0,
                outcome: Outcome::TimedOut,
                reaction_ms: None,
            }]
        );
        assert_eq!(seq.score(), Score { correct: 0, total: 1 });
        assert_eq!(seq.view().status.as_deref(), Some("Too slow"));
    }

    #[test]
    fn answered_trial_timeout_never_fires() {
        let (mut seq, clock) = default_sequencer(GameKind::EarlyMatch);
        seq.start();
        advance(&mut seq, &clock, 4500);
        clock.advance(100);
        answer_correctly(&mut seq);
        assert_eq!(seq.records()[0].reaction_ms, Some(100));

        // Past where the old timeout was due: feedback ended, trial 1 is in
        // its retention interval, and nothing else was judged.
        let events = advance(&mut seq, &clock, 4000);
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, SessionEvent::TrialJudged { .. }))
        );
        assert_eq!(seq.records().len(), 1);
        assert_eq!(seq.phase(), SessionPhase::Retention);
    }

    #[test]
    fn restart_cancels_pending_timeout() {
        let (mut seq, clock) = default_sequencer(GameKind::EarlyMatch);
        seq.start();
        advance(&mut seq, &clock, 4500);
        assert!(seq.next_deadline().is_some());
        seq.restart();
        assert_eq!(seq.next_deadline(), None);
        assert!(advance(&mut seq, &clock, 60_000).is_empty());
        assert_eq!(seq.phase(), SessionPhase::Idle);
    }

    #[test]
    fn restart_from_done_then_start_gives_trial_zero() {
        let config = GameConfig {
            trial_count: 2,
            ..GameKind::LettersToColours.default_config()
        };
        let (mut seq, clock) = sequencer(GameKind::LettersToColours, config);
        seq.start();
        for _ in 0..2 {
            answer_correctly(&mut seq);
            advance(&mut seq, &clock, 750);
        }
        assert_eq!(seq.phase(), SessionPhase::Done);
        assert!(seq.summary().is_some());
        assert_eq!(seq.view().progress, None);

        seq.restart();
        assert_eq!(seq.phase(), SessionPhase::Idle);
        assert_eq!(seq.score(), Score::default());
        assert!(seq.records().is_empty());

        let events = seq.start();
        assert!(events.contains(&SessionEvent::TrialStarted { index: 0, span: 1 }));
        assert_eq!(seq.view().progress, Some((1, 2)));
    }

    #[test]
    fn start_is_ignored_while_running() {
        let (mut seq, _clock) = default_sequencer(GameKind::EarlySpan);
        seq.start();
        assert!(seq.start().is_empty());
    }

    #[test]
    fn speed_test_reports_reaction_and_mean() {
        let config = GameConfig {
            trial_count: 2,
            ..GameKind::ColoursToLetters.default_config()
        };
        let (mut seq, clock) = sequencer(GameKind::ColoursToLetters, config);
        let events = seq.start();
        assert!(events.contains(&SessionEvent::ResponseOpened));
        assert!(matches!(seq.view().stimulus, Some(Stimulus::Swatch { .. })));

        clock.advance(420);
        let events = answer_correctly(&mut seq);
        assert_eq!(
            events,
            vec![SessionEvent::TrialJudged {
                index: 0,
                outcome: Outcome::Correct,
                reaction_ms: Some(420),
            }]
        );
        assert_eq!(seq.view().status.as_deref(), Some("Correct: 420 ms"));

        advance(&mut seq, &clock, 500);
        assert_eq!(seq.phase(), SessionPhase::InterTrial);
        advance(&mut seq, &clock, 250);
        assert_eq!(seq.phase(), SessionPhase::AwaitingResponse);
        clock.advance(601);
        answer_correctly(&mut seq);
        let events = advance(&mut seq, &clock, 500);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::SessionComplete(Summary::ReactionTime {
                average_ms: 511,
                ..
            })]
        ));
    }

    #[test]
    fn backward_span_ignores_repeats_and_out_of_range() {
        let config = GameConfig {
            initial_span: 2,
            ..GameKind::BackwardSpan.default_config()
        };
        let (mut seq, clock) = sequencer(GameKind::BackwardSpan, config);
        seq.start();
        advance(&mut seq, &clock, 2 * 500 + 500);
        assert_eq!(seq.phase(), SessionPhase::AwaitingResponse);

        let answer_key = correct_answer(&seq);
        assert!(seq.select(answer_key[0]).is_empty());
        assert!(seq.select(answer_key[0]).is_empty());
        assert!(seq.select(99).is_empty());
        assert_eq!(seq.phase(), SessionPhase::AwaitingResponse);
        let label = seq.view().status.expect("running answer");
        assert!(label.starts_with("Your response: "));

        let events = seq.select(answer_key[1]);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::TrialJudged {
                outcome: Outcome::Correct,
                ..
            }]
        ));
    }

    #[test]
    fn input_outside_response_window_is_ignored() {
        let (mut seq, _clock) = default_sequencer(GameKind::EarlySpan);
        assert!(seq.select(0).is_empty());
        seq.start();
        assert!(seq.select(0).is_empty());
        assert!(seq.press_match().is_empty());
        assert_eq!(seq.score(), Score::default());
    }

    #[test]
    fn adjust_only_while_idle() {
        let (mut seq, _clock) = default_sequencer(GameKind::BackwardSpan);
        assert_eq!(seq.adjust(Step::Up).map(|s| s.value), Some(600));
        assert_eq!(seq.view().setting.map(|s| s.value), Some(600));
        seq.start();
        assert_eq!(seq.adjust(Step::Up), None);
        assert_eq!(seq.config().display_ms, 600);
        assert_eq!(seq.view().setting, None);
    }

    #[test]
    fn passive_drill_runs_without_input() {
        let config = GameConfig {
            trial_count: 3,
            ..GameKind::PassiveDrill.default_config()
        };
        let (mut seq, clock) = sequencer(GameKind::PassiveDrill, config);
        seq.start();
        advance(&mut seq, &clock, 1000);
        let view = seq.view();
        assert_eq!(view.feedback, None);
        assert!(view.options.is_empty());
        assert!(matches!(view.stimulus, Some(Stimulus::Flood { .. })));
        let flood = view.stimulus.as_ref().and_then(Stimulus::flood);
        assert_eq!(Some(view.effective_background()), flood);

        let events = advance(&mut seq, &clock, 500 + 1500 + 1500);
        assert!(matches!(
            events.last(),
            Some(SessionEvent::SessionComplete(Summary::Block {
                steps: 3,
                score: None
            }))
        ));
        assert_eq!(seq.score(), Score::default());
        assert!(seq.records().iter().all(|r| r.outcome == Outcome::Unscored));
    }

    #[test]
    fn nback_scores_only_presses() {
        let config = GameConfig {
            trial_count: 6,
            ..GameKind::NBack.default_config()
        };
        let (mut seq, clock) = sequencer(GameKind::NBack, config);
        seq.start();
        assert_eq!(seq.phase(), SessionPhase::AwaitingResponse);

        // Pressing on the first step has nothing to compare with.
        let events = seq.press_match();
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::TrialJudged {
                outcome: Outcome::Unscored,
                ..
            }]
        ));
        assert!(seq.press_match().is_empty());
        assert!(seq.select(0).is_empty());
        assert_eq!(seq.score().total, 0);

        let events = advance(&mut seq, &clock, 2500 + 500 + 3000);
        assert!(events.contains(&SessionEvent::TrialJudged {
            index: 1,
            outcome: Outcome::Unscored,
            reaction_ms: None,
        }));
        assert!(events.contains(&SessionEvent::TrialStarted { index: 2, span: 1 }));

        let events = seq.press_match();
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::TrialJudged {
                outcome: Outcome::Correct | Outcome::Incorrect,
                ..
            }]
        ));
        assert_eq!(seq.score().total, 1);
    }

    #[test]
    fn nback_press_keeps_the_stream_cadence() {
        let config = GameConfig {
            trial_count: 6,
            ..GameKind::NBack.default_config()
        };
        let period = 2500 + 500;
        let (mut seq, clock) = sequencer(GameKind::NBack, config);
        seq.start();

        // Trial 0: pressed at once, the cue stays up until the window closes.
        let cue = seq.view().stimulus;
        assert!(cue.is_some());
        seq.press_match();
        assert_eq!(seq.phase(), SessionPhase::AwaitingResponse);
        assert_eq!(seq.view().stimulus, cue);
        assert!(seq.press_match().is_empty());
        assert!(advance(&mut seq, &clock, 2499).is_empty());
        assert!(advance(&mut seq, &clock, 1).is_empty());
        assert_eq!(
            seq.phase(),
            SessionPhase::Feedback {
                outcome: Outcome::Unscored
            }
        );
        let events = advance(&mut seq, &clock, 500);
        assert!(events.contains(&SessionEvent::TrialStarted { index: 1, span: 1 }));
        assert_eq!(clock.now_ms(), period);

        // Trial 1: silent, same period.
        let events = advance(&mut seq, &clock, period - 1);
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::TrialStarted { .. })));
        let events = advance(&mut seq, &clock, 1);
        assert!(events.contains(&SessionEvent::TrialStarted { index: 2, span: 1 }));

        // Trial 2: a late press is judged on the spot and the window still
        // runs to its deadline.
        clock.advance(10);
        let events = seq.press_match();
        let outcome = match events.as_slice() {
            [SessionEvent::TrialJudged {
                index: 2,
                outcome,
                reaction_ms: Some(10),
            }] => *outcome,
            other => panic!("unexpected {other:?}"),
        };
        assert!(outcome.is_scored());
        assert_eq!(seq.view().feedback, Some(outcome));
        assert!(seq.view().status.is_some());
        assert!(advance(&mut seq, &clock, 2489).is_empty());
        let events = advance(&mut seq, &clock, 1 + 500);
        assert!(events.contains(&SessionEvent::TrialStarted { index: 3, span: 1 }));
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::TrialJudged { .. })));
        assert_eq!(clock.now_ms(), 3 * period);
        assert_eq!(seq.score().total, 1);
        assert_eq!(seq.records().len(), 3);
    }

    #[test]
    fn spelling_level_survives_restart() {
        let config = GameConfig {
            trial_count: 2,
            ..GameKind::Spelling.default_config()
        };
        let (mut seq, clock) = sequencer(GameKind::Spelling, config);
        seq.start();
        for _ in 0..2 {
            advance(&mut seq, &clock, 500);
            answer_correctly(&mut seq);
            advance(&mut seq, &clock, 1000);
        }
        assert_eq!(
            seq.summary(),
            Some(&Summary::Spelling {
                score: Score { correct: 2, total: 2 },
                level: 2
            })
        );
        seq.restart();
        seq.start();
        assert_eq!(seq.current_trial().map(|t| t.span), Some(4));
    }

    #[derive(Debug, Clone)]
    enum Action {
        Wait(u64),
        Select(usize),
        AnswerCorrectly,
        Press,
        Start,
        Restart,
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            4 => (0u64..3_000).prop_map(Action::Wait),
            2 => (0usize..16).prop_map(Action::Select),
            2 => Just(Action::AnswerCorrectly),
            1 => Just(Action::Press),
            1 => Just(Action::Start),
            1 => Just(Action::Restart),
        ]
    }

    fn kind() -> impl Strategy<Value = GameKind> {
        prop::sample::select(GameKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn score_and_span_stay_in_bounds(
            kind in kind(),
            seed in any::<u64>(),
            trial_count in 1usize..8,
            actions in prop::collection::vec(action(), 0..120),
        ) {
            let clock = ManualClock::new();
            let config = GameConfig { trial_count, ..kind.default_config() };
            let mut seq = Sequencer::for_kind(kind, config, clock.clone(), StdRng::seed_from_u64(seed));
            for action in actions {
                match action {
                    Action::Wait(ms) => { clock.advance(ms); seq.tick(); }
                    Action::Select(i) => { seq.select(i); }
                    Action::AnswerCorrectly => {
                        if seq.phase().allows_input() && seq.current_trial().is_some_and(|t| !t.options.is_empty()) {
                            answer_correctly(&mut seq);
                        }
                    }
                    Action::Press => { seq.press_match(); }
                    Action::Start => { seq.start(); }
                    Action::Restart => seq.restart(),
                }
                let score = seq.score();
                prop_assert!(score.correct <= score.total);
                prop_assert!(score.total as usize <= seq.records().len());
                prop_assert!(seq.records().len() <= seq.budget());
                if let Some(trial) = seq.current_trial() {
                    prop_assert!(trial.index < seq.budget());
                }
                if matches!(kind, GameKind::EarlySpan | GameKind::LateSpan | GameKind::BackwardSpan) {
                    for pair in seq.records().windows(2) {
                        let expected = if pair[0].outcome.is_correct() {
                            (pair[0].span + 1).min(PALETTE_SIZE)
                        } else {
                            pair[0].span.saturating_sub(1).max(1)
                        };
                        prop_assert_eq!(pair[1].span, expected);
                    }
                    prop_assert!(seq.records().iter().all(|r| (1..=PALETTE_SIZE).contains(&r.span)));
                }
            }
        }
    }
}
