use crate::model::{AnswerState, CategoryState, Pane, RankingResult};
use crate::types::Scoreboard;

/// Output surface of a screen.
///
/// Implemented by the embedding page layer; the core only calls into it and
/// never reads anything back. Slot indices are stable positions, the sink
/// decides what a pane or slot looks like.
pub trait RenderSink: Send {
    fn show_pane(&mut self, pane: Pane);
    fn hide_pane(&mut self, pane: Pane);
    fn set_category_slot(&mut self, index: usize, label: &str, state: CategoryState);
    fn set_answer_slot(&mut self, index: usize, label: &str, state: AnswerState);
    fn set_question_text(&mut self, text: &str);
    fn set_scoreboard(&mut self, scoreboard: &Scoreboard);
    fn set_ranking_result(&mut self, result: &RankingResult);
}

/// A sink that renders nothing. Useful for headless sessions and tests that
/// assert on the model instead of the output calls.
pub struct NullSink;

impl RenderSink for NullSink {
    fn show_pane(&mut self, _pane: Pane) {}
    fn hide_pane(&mut self, _pane: Pane) {}
    fn set_category_slot(&mut self, _index: usize, _label: &str, _state: CategoryState) {}
    fn set_answer_slot(&mut self, _index: usize, _label: &str, _state: AnswerState) {}
    fn set_question_text(&mut self, _text: &str) {}
    fn set_scoreboard(&mut self, _scoreboard: &Scoreboard) {}
    fn set_ranking_result(&mut self, _result: &RankingResult) {}
}
