use thiserror::Error;

/// Everything that can go wrong inside the display core.
///
/// All variants are local-recoverable: the worst outcome is a stale or
/// partially updated render, never a dead session.
#[derive(Debug, Error)]
pub enum Error {
    /// The websocket channel could not be opened or broke mid-handshake.
    /// Surfaced to the embedding UI; the core never retries on its own.
    #[error("connection failed: {0}")]
    Connection(#[from] tokio_tungstenite::tungstenite::Error),

    /// A command was sent before connecting or after the channel closed.
    /// The command is dropped.
    #[error("no live connection for this session")]
    NotConnected,

    /// An inbound payload had no `type` field, or a known `type` with
    /// missing or invalid fields. The event is dropped, state untouched.
    #[error("malformed event: {detail}")]
    MalformedEvent { detail: String },

    /// An event addressed a slot that does not exist on this screen.
    /// That slot mutation degrades to a no-op.
    #[error("no {kind} slot for {key:?}")]
    SlotReference { kind: &'static str, key: String },
}
