use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// One team's entry on the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub name: String,
    pub score: i64,
}

/// Scores of the two duelling teams, as nested on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    #[serde(rename = "teamA")]
    pub team_a: TeamScore,
    #[serde(rename = "teamB")]
    pub team_b: TeamScore,
}

/// A slot address as it appears on the wire.
///
/// The server sends answer keys either as JSON strings or as bare numbers;
/// both address the same slot, so numbers are coerced to their decimal
/// string form before lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotKey {
    Text(String),
    Number(i64),
}

impl SlotKey {
    /// The canonical string form used for slot lookup.
    pub fn as_key(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Events pushed by the game server over the session websocket.
///
/// Tag strings and field names match the server bit-for-bit. The ordered
/// JSON objects (`categories`, `answers`) are kept as `serde_json::Map`
/// because entry order is what binds them to slot positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A fresh category board, with per-category availability.
    #[serde(rename = "send.categories")]
    CategoriesOffered {
        /// Ordered map of category name to enabled flag.
        categories: Map<String, Value>,
        /// Team currently picking, if the server announces one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        team: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scores: Option<Scoreboard>,
    },
    /// A team picked a category by name.
    #[serde(rename = "category.receive")]
    CategorySelected { category: String },
    /// A new question with its answer options.
    #[serde(rename = "send.question")]
    QuestionOffered {
        question_text: String,
        /// Ordered map of slot key to answer text.
        answers: Map<String, Value>,
    },
    /// A team picked an answer slot.
    #[serde(rename = "answer.receive")]
    AnswerSelected { answer: SlotKey },
    /// The correct answer is disclosed; starts the reveal pulse.
    #[serde(rename = "answer.reveal")]
    AnswerRevealed { answer: SlotKey },
    /// Final standing of the duel.
    #[serde(rename = "send.ranking")]
    RankingAnnounced {
        #[serde(rename = "teamA")]
        team_a: TeamScore,
        #[serde(rename = "teamB")]
        team_b: TeamScore,
    },
}

/// Tags this client reacts to. Anything else is ignored so newer servers
/// can ship event types we do not know about yet.
const KNOWN_TYPES: &[&str] = &[
    "send.categories",
    "category.receive",
    "send.question",
    "answer.receive",
    "answer.reveal",
    "send.ranking",
];

impl ServerEvent {
    /// Decodes one inbound payload.
    ///
    /// Returns `Ok(None)` for an unknown-but-well-formed tag (ignored for
    /// forward compatibility). Fails with [`Error::MalformedEvent`] when the
    /// payload is not JSON, has no `type` string, or names a known type
    /// whose required fields are missing or invalid.
    pub fn decode(text: &str) -> Result<Option<Self>, Error> {
        let value: Value = serde_json::from_str(text).map_err(|e| Error::MalformedEvent {
            detail: e.to_string(),
        })?;

        let Some(tag) = value.get("type").and_then(Value::as_str) else {
            return Err(Error::MalformedEvent {
                detail: "missing type field".to_string(),
            });
        };

        if !KNOWN_TYPES.contains(&tag) {
            return Ok(None);
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| Error::MalformedEvent {
                detail: e.to_string(),
            })
    }
}

/// Commands sent to the server on explicit user action.
///
/// The `game` id is passed through opaquely, exactly as the control panel
/// buttons sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    #[serde(rename = "duel_game_continue")]
    ContinueGame { game: String },
    #[serde(rename = "reveal_answer")]
    RevealAnswer { game: String },
}

impl ClientCommand {
    /// Converts the command to a JSON string for transmission.
    ///
    /// # Panics
    ///
    /// Panics if serialization fails, which cannot happen for these
    /// plain-data variants.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}
