use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::{mpsc, watch};

use crate::error::Error;
use crate::model::{
    AnswerState, CategoryState, Pane, Phase, RankingResult, RenderModel, ScreenConfig,
};
use crate::render::RenderSink;
use crate::types::{Scoreboard, ServerEvent, SlotKey, TeamScore};

/// How long the reveal pulse holds the correct answer highlighted.
pub const HOLD_MS: u64 = 500;
/// Full period of the reveal pulse: highlight, restore, wait, repeat.
pub const PERIOD_MS: u64 = 1100;

/// Which of the two cooperating screens this engine drives.
///
/// Both roles run the same state machine; the control panel ignores the
/// scoreboard fields and has no ranking-distinct rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenRole {
    Control,
    Display,
}

/// Inputs the session feeds to a screen task, in strict FIFO order.
#[derive(Debug, Clone)]
pub(crate) enum ScreenInput {
    /// A raw inbound websocket frame.
    Frame(String),
    /// Reveal pulse: highlight the armed slot.
    RevealTick(u64),
    /// Reveal pulse: restore the armed slot to its prior state.
    RevealRestore(u64),
    /// The connection is gone; stop the task.
    Shutdown,
}

/// What the driver must do with the reveal pulse after applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealControl {
    /// Leave any running pulse alone.
    Keep,
    /// Stop the running pulse.
    Cancel,
    /// Stop any running pulse, then start a new one for this generation.
    Arm { seq: u64 },
}

/// The in-flight reveal animation. At most one per screen.
#[derive(Debug, Clone, Copy)]
struct RevealSequence {
    slot: usize,
    prior: AnswerState,
    seq: u64,
}

/// The render state machine for one screen.
///
/// Holds the phase, the derived render model and the active reveal
/// sequence; every handler computes the next state from the previous one
/// plus the event payload and pushes the changes to the sink. Applying the
/// same event sequence to a fresh screen always yields the same model.
pub struct Screen {
    role: ScreenRole,
    phase: Phase,
    model: RenderModel,
    reveal: Option<RevealSequence>,
    next_seq: u64,
    sink: Box<dyn RenderSink>,
}

impl Screen {
    pub fn new(role: ScreenRole, config: ScreenConfig, mut sink: Box<dyn RenderSink>) -> Self {
        // The pages start with every pane hidden.
        for pane in Pane::ALL {
            sink.hide_pane(pane);
        }
        Self {
            role,
            phase: Phase::Idle,
            model: RenderModel::new(config),
            reveal: None,
            next_seq: 1,
            sink,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn model(&self) -> &RenderModel {
        &self.model
    }

    /// Routes one decoded event to its handler. Never fails; bad slot
    /// references degrade to warnings and partial no-ops.
    pub fn apply(&mut self, event: ServerEvent) -> RevealControl {
        match event {
            ServerEvent::CategoriesOffered { categories, team, scores } => {
                self.on_categories(&categories, team, scores)
            }
            ServerEvent::CategorySelected { category } => self.on_category_selected(&category),
            ServerEvent::QuestionOffered { question_text, answers } => {
                self.on_question(question_text, &answers)
            }
            ServerEvent::AnswerSelected { answer } => self.on_answer_selected(&answer),
            ServerEvent::AnswerRevealed { answer } => self.on_answer_revealed(&answer),
            ServerEvent::RankingAnnounced { team_a, team_b } => self.on_ranking(team_a, team_b),
        }
    }

    /// Timer input: put the armed slot into `Correct`. Stale generations
    /// (queued behind a cancellation) are dropped.
    pub fn reveal_tick(&mut self, seq: u64) {
        let Some(active) = self.reveal else {
            return;
        };
        if active.seq != seq {
            tracing::debug!(seq, "stale reveal tick dropped");
            return;
        }
        self.model.answers[active.slot].state = AnswerState::Correct;
        self.sink
            .set_answer_slot(active.slot, &self.model.answers[active.slot].label, AnswerState::Correct);
    }

    /// Timer input: restore the armed slot to the state captured when the
    /// sequence was armed. Stale generations are dropped.
    pub fn reveal_restore(&mut self, seq: u64) {
        let Some(active) = self.reveal else {
            return;
        };
        if active.seq != seq {
            tracing::debug!(seq, "stale reveal restore dropped");
            return;
        }
        self.model.answers[active.slot].state = active.prior;
        self.sink
            .set_answer_slot(active.slot, &self.model.answers[active.slot].label, active.prior);
    }

    // ─── Handlers ─────────────────────────────────────────────────

    fn on_categories(
        &mut self,
        categories: &Map<String, Value>,
        team: Option<String>,
        scores: Option<Scoreboard>,
    ) -> RevealControl {
        let control = self.cancel_reveal();
        self.set_phase(Phase::Categories);

        let dropped = self.model.rebuild_categories(categories);
        if dropped > 0 {
            tracing::warn!(dropped, "more categories than slots, surplus ignored");
        }
        for i in 0..self.model.categories.len() {
            let slot = &self.model.categories[i];
            self.sink.set_category_slot(i, &slot.label, slot.state);
        }

        if self.role == ScreenRole::Display {
            if let Some(team) = team {
                self.model.active_team = Some(team);
            }
            if let Some(scores) = scores {
                self.sink.set_scoreboard(&scores);
                self.model.scoreboard = Some(scores);
            }
        }
        control
    }

    fn on_category_selected(&mut self, name: &str) -> RevealControl {
        match self.model.category_slot(name) {
            Some(i) => {
                if self.model.categories[i].state == CategoryState::Normal {
                    self.model.categories[i].state = CategoryState::Selected;
                    self.sink.set_category_slot(
                        i,
                        &self.model.categories[i].label,
                        CategoryState::Selected,
                    );
                }
            }
            None => tracing::warn!(
                "{}",
                Error::SlotReference { kind: "category", key: name.to_string() }
            ),
        }
        RevealControl::Keep
    }

    fn on_question(&mut self, text: String, answers: &Map<String, Value>) -> RevealControl {
        let control = self.cancel_reveal();
        self.set_phase(Phase::Question);

        let dropped = self.model.rebuild_answers(answers);
        if dropped > 0 {
            tracing::warn!(dropped, "more answers than slots, surplus ignored");
        }
        self.sink.set_question_text(&text);
        self.model.question_text = Some(text);
        for i in 0..self.model.answers.len() {
            let slot = &self.model.answers[i];
            self.sink.set_answer_slot(i, &slot.label, slot.state);
        }
        control
    }

    fn on_answer_selected(&mut self, key: &SlotKey) -> RevealControl {
        let key = key.as_key();
        match self.model.answer_slot(&key) {
            Some(i) => {
                // Additive on purpose: the server never clears earlier
                // selections, so neither do we.
                self.model.answers[i].state = AnswerState::Selected;
                self.sink
                    .set_answer_slot(i, &self.model.answers[i].label, AnswerState::Selected);
            }
            None => tracing::warn!("{}", Error::SlotReference { kind: "answer", key }),
        }
        RevealControl::Keep
    }

    fn on_answer_revealed(&mut self, key: &SlotKey) -> RevealControl {
        let key = key.as_key();
        let Some(slot) = self.model.answer_slot(&key) else {
            tracing::warn!("{}", Error::SlotReference { kind: "answer", key });
            return RevealControl::Keep;
        };

        // Cancel-then-arm, even for the same slot. The prior state is
        // captured before the pulse mutates anything; only this newest
        // capture can ever be restored.
        self.reveal = None;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.reveal = Some(RevealSequence {
            slot,
            prior: self.model.answers[slot].state,
            seq,
        });
        RevealControl::Arm { seq }
    }

    fn on_ranking(&mut self, team_a: TeamScore, team_b: TeamScore) -> RevealControl {
        let control = self.cancel_reveal();
        if self.role == ScreenRole::Control {
            // The control panel has no ranking view; it stays on whatever
            // it was showing and keeps reacting.
            return control;
        }

        self.set_phase(Phase::Ranking);
        // The game only defines a strict comparison; an exact tie goes to
        // team A.
        let (winner, loser) = if team_b.score > team_a.score {
            (team_b, team_a)
        } else {
            (team_a, team_b)
        };
        let result = RankingResult {
            winner_name: winner.name,
            winner_score: winner.score,
            loser_name: loser.name,
            loser_score: loser.score,
        };
        self.sink.set_ranking_result(&result);
        self.model.ranking = Some(result);
        control
    }

    // ─── Internals ────────────────────────────────────────────────

    fn cancel_reveal(&mut self) -> RevealControl {
        if self.reveal.take().is_some() {
            RevealControl::Cancel
        } else {
            RevealControl::Keep
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        let target = phase.pane();
        for pane in Pane::ALL {
            if Some(pane) != target {
                self.sink.hide_pane(pane);
            }
        }
        if let Some(pane) = target {
            self.sink.show_pane(pane);
        }
        self.model.visible_pane = target;
    }
}

// ─── Screen task ──────────────────────────────────────────────────

/// Runs one screen to completion: decodes frames, applies them, and keeps
/// the reveal pulse in step with the state machine. Single consumer of the
/// input channel, so handlers never overlap for a session.
pub(crate) async fn run_screen(
    mut screen: Screen,
    mut inputs: mpsc::UnboundedReceiver<ScreenInput>,
    input_tx: mpsc::UnboundedSender<ScreenInput>,
) {
    let mut pulse_cancel: Option<watch::Sender<bool>> = None;

    while let Some(input) = inputs.recv().await {
        match input {
            ScreenInput::Frame(text) => match ServerEvent::decode(&text) {
                Ok(Some(event)) => match screen.apply(event) {
                    RevealControl::Keep => {}
                    RevealControl::Cancel => cancel_pulse(&mut pulse_cancel),
                    RevealControl::Arm { seq } => {
                        cancel_pulse(&mut pulse_cancel);
                        let (cancel_tx, cancel_rx) = watch::channel(false);
                        pulse_cancel = Some(cancel_tx);
                        tokio::spawn(run_pulse(seq, input_tx.clone(), cancel_rx));
                    }
                },
                Ok(None) => tracing::debug!("ignoring unknown event type"),
                Err(e) => tracing::warn!("dropping inbound event: {e}"),
            },
            ScreenInput::RevealTick(seq) => screen.reveal_tick(seq),
            ScreenInput::RevealRestore(seq) => screen.reveal_restore(seq),
            ScreenInput::Shutdown => break,
        }
    }

    cancel_pulse(&mut pulse_cancel);
    tracing::info!("screen task ended");
}

fn cancel_pulse(cancel: &mut Option<watch::Sender<bool>>) {
    if let Some(tx) = cancel.take() {
        let _ = tx.send(true);
    }
}

/// The two-stage reveal pulse: highlight immediately and then every
/// [`PERIOD_MS`], restoring [`HOLD_MS`] after each highlight, until
/// cancelled. The pulse never touches the model itself; it only feeds
/// timer inputs back into the screen task.
async fn run_pulse(
    seq: u64,
    inputs: mpsc::UnboundedSender<ScreenInput>,
    mut cancel: watch::Receiver<bool>,
) {
    loop {
        if inputs.send(ScreenInput::RevealTick(seq)).is_err() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(HOLD_MS)) => {}
            _ = cancel.changed() => return,
        }
        if inputs.send(ScreenInput::RevealRestore(seq)).is_err() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(PERIOD_MS - HOLD_MS)) => {}
            _ = cancel.changed() => return,
        }
    }
}
