use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::types::Scoreboard;

/// The three render panes. At most one is visible at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    Categories,
    Question,
    Info,
}

impl Pane {
    pub const ALL: [Pane; 3] = [Pane::Categories, Pane::Question, Pane::Info];
}

/// Coarse display mode of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Categories,
    Question,
    Ranking,
}

impl Phase {
    /// The pane this phase keeps visible, if any.
    pub fn pane(self) -> Option<Pane> {
        match self {
            Self::Idle => None,
            Self::Categories => Some(Pane::Categories),
            Self::Question => Some(Pane::Question),
            Self::Ranking => Some(Pane::Info),
        }
    }
}

/// Rendering state of a category slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryState {
    Normal,
    Disabled,
    Selected,
}

/// Rendering state of an answer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerState {
    Normal,
    Selected,
    Correct,
}

/// A fixed-position category target. Only label and state ever change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySlot {
    pub label: String,
    pub state: CategoryState,
}

/// A fixed-position answer target. Only label and state ever change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSlot {
    pub label: String,
    pub state: AnswerState,
}

/// Slot counts of the hosting page. Events never resize the slot vectors;
/// surplus wire entries are dropped with a warning.
#[derive(Debug, Clone, Copy)]
pub struct ScreenConfig {
    pub category_slots: usize,
    pub answer_slots: usize,
}

impl Default for ScreenConfig {
    /// Matches the original pages: a six-tile category grid and the four
    /// `a`..`d` answer tiles.
    fn default() -> Self {
        Self {
            category_slots: 6,
            answer_slots: 4,
        }
    }
}

/// Outcome of a ranking announcement, already resolved to winner and loser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingResult {
    pub winner_name: String,
    pub winner_score: i64,
    pub loser_name: String,
    pub loser_score: i64,
}

/// The minimal derived state a screen renders from.
///
/// Everything here is a pure function of the event sequence applied so far;
/// the [`crate::game::Screen`] mutates it, the render sink only receives
/// copies of what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub visible_pane: Option<Pane>,
    pub categories: Vec<CategorySlot>,
    pub answers: Vec<AnswerSlot>,
    pub question_text: Option<String>,
    pub scoreboard: Option<Scoreboard>,
    pub active_team: Option<String>,
    pub ranking: Option<RankingResult>,
    /// Category name to slot index, first occurrence wins on duplicates.
    category_index: HashMap<String, usize>,
    /// Answer wire key to slot index.
    answer_index: HashMap<String, usize>,
}

impl RenderModel {
    pub fn new(config: ScreenConfig) -> Self {
        Self {
            visible_pane: None,
            categories: vec![
                CategorySlot {
                    label: String::new(),
                    state: CategoryState::Disabled,
                };
                config.category_slots
            ],
            answers: vec![
                AnswerSlot {
                    label: String::new(),
                    state: AnswerState::Normal,
                };
                config.answer_slots
            ],
            question_text: None,
            scoreboard: None,
            active_team: None,
            ranking: None,
            category_index: HashMap::new(),
            answer_index: HashMap::new(),
        }
    }

    /// Rebuilds the category slots from the ordered wire map. Slot `i` is
    /// bound to the `i`-th entry regardless of key content. Returns how many
    /// entries did not fit.
    pub fn rebuild_categories(&mut self, entries: &Map<String, Value>) -> usize {
        self.category_index.clear();
        for slot in &mut self.categories {
            slot.label.clear();
            slot.state = CategoryState::Disabled;
        }

        let mut dropped = 0;
        for (i, (name, enabled)) in entries.iter().enumerate() {
            if i >= self.categories.len() {
                dropped += 1;
                continue;
            }
            self.categories[i].label = name.clone();
            self.categories[i].state = if enabled == &Value::Bool(true) {
                CategoryState::Normal
            } else {
                CategoryState::Disabled
            };
            self.category_index.entry(name.clone()).or_insert(i);
        }
        dropped
    }

    /// Rebuilds the answer slots to `Normal` with the given texts, same
    /// positional binding rule as categories. Returns how many entries did
    /// not fit.
    pub fn rebuild_answers(&mut self, entries: &Map<String, Value>) -> usize {
        self.answer_index.clear();
        for slot in &mut self.answers {
            slot.label.clear();
            slot.state = AnswerState::Normal;
        }

        let mut dropped = 0;
        for (i, (key, text)) in entries.iter().enumerate() {
            if i >= self.answers.len() {
                dropped += 1;
                continue;
            }
            self.answers[i].label = label_text(text);
            self.answers[i].state = AnswerState::Normal;
            self.answer_index.entry(key.clone()).or_insert(i);
        }
        dropped
    }

    pub fn category_slot(&self, name: &str) -> Option<usize> {
        self.category_index.get(name).copied()
    }

    pub fn answer_slot(&self, key: &str) -> Option<usize> {
        self.answer_index.get(key).copied()
    }
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
