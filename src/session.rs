use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use crate::error::Error;
use crate::game::{run_screen, Screen, ScreenInput, ScreenRole};
use crate::model::ScreenConfig;
use crate::render::RenderSink;
use crate::types::ClientCommand;

/// Append-only, human-readable mirror of everything that crosses the wire.
///
/// The embedding page drains the receiver into its datalog widget. Purely a
/// side channel: a dropped receiver never affects the session.
#[derive(Clone)]
pub(crate) struct ActivityLog {
    lines: mpsc::UnboundedSender<String>,
}

impl ActivityLog {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (lines, rx) = mpsc::unbounded_channel();
        (Self { lines }, rx)
    }

    pub(crate) fn inbound(&self, payload: &str) {
        self.push(format!("recv {payload}"));
    }

    pub(crate) fn outbound(&self, payload: &str) {
        self.push(format!("sent {payload}"));
    }

    pub(crate) fn note(&self, line: &str) {
        self.push(line.to_string());
    }

    fn push(&self, line: String) {
        tracing::debug!(target: "duelscreen::traffic", "{line}");
        let _ = self.lines.send(line);
    }
}

/// One live game screen bound to one duplex connection.
///
/// Owns the connection exclusively; dropping the session closes it. There
/// is no automatic reconnection, that is a page-level concern.
pub struct Session {
    game: String,
    session_id: Uuid,
    out_tx: mpsc::UnboundedSender<String>,
    log: ActivityLog,
}

impl Session {
    /// Opens the duplex channel and starts the screen behind it.
    ///
    /// Spawns three tasks: a reader that forwards inbound frames in FIFO
    /// order, a writer that owns the outbound half, and the screen task
    /// that consumes frames and timer inputs one at a time.
    ///
    /// The returned receiver is the activity log; `game` is the opaque id
    /// stamped on every outbound command.
    ///
    /// # Errors
    ///
    /// [`Error::Connection`] if the channel cannot be opened. Not retried.
    pub async fn connect(
        url: &str,
        game: impl Into<String>,
        role: ScreenRole,
        config: ScreenConfig,
        sink: Box<dyn RenderSink>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<String>), Error> {
        let (stream, _) = connect_async(url).await?;
        let session_id = Uuid::new_v4();
        tracing::info!("connected to {url} as {role:?}, session {session_id}");

        let (mut ws_tx, mut ws_rx) = stream.split();
        let (log, log_rx) = ActivityLog::channel();
        log.note(&format!("Connected to {url}"));

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            while let Some(text) = out_rx.recv().await {
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            let _ = ws_tx.close().await;
        });

        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let reader_tx = input_tx.clone();
        let reader_log = log.clone();
        tokio::spawn(async move {
            while let Some(frame) = ws_rx.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        reader_log.inbound(&text);
                        if reader_tx.send(ScreenInput::Frame(text.to_string())).is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("websocket read failed: {e}");
                        break;
                    }
                }
            }
            reader_log.note("Disconnected");
            tracing::info!("session {session_id} disconnected");
            let _ = reader_tx.send(ScreenInput::Shutdown);
        });

        let screen = Screen::new(role, config, sink);
        tokio::spawn(run_screen(screen, input_rx, input_tx));

        Ok((
            Self {
                game: game.into(),
                session_id,
                out_tx,
                log,
            },
            log_rx,
        ))
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Serializes and transmits one command.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`] once the channel has closed; the command is
    /// dropped.
    pub fn send(&self, command: &ClientCommand) -> Result<(), Error> {
        let text = command.to_message();
        self.out_tx
            .send(text.clone())
            .map_err(|_| Error::NotConnected)?;
        self.log.outbound(&text);
        Ok(())
    }

    /// The "continue" button: advance the duel.
    pub fn continue_game(&self) -> Result<(), Error> {
        self.send(&ClientCommand::ContinueGame {
            game: self.game.clone(),
        })
    }

    /// The "reveal" button: ask the server to disclose the correct answer.
    pub fn reveal_answer(&self) -> Result<(), Error> {
        self.send(&ClientCommand::RevealAnswer {
            game: self.game.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_writer() -> (Session, mpsc::UnboundedReceiver<String>, mpsc::UnboundedReceiver<String>) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (log, log_rx) = ActivityLog::channel();
        let session = Session {
            game: "7".to_string(),
            session_id: Uuid::new_v4(),
            out_tx,
            log,
        };
        (session, out_rx, log_rx)
    }

    #[test]
    fn commands_reach_the_writer_and_the_log() {
        let (session, mut out_rx, mut log_rx) = session_with_writer();
        session.continue_game().unwrap();

        let sent = out_rx.try_recv().unwrap();
        assert_eq!(sent, r#"{"type":"duel_game_continue","game":"7"}"#);
        assert_eq!(log_rx.try_recv().unwrap(), format!("sent {sent}"));
    }

    #[test]
    fn each_session_gets_its_own_diagnostic_id() {
        let (a, _out_a, _log_a) = session_with_writer();
        let (b, _out_b, _log_b) = session_with_writer();

        assert!(!a.session_id().is_nil());
        assert_ne!(a.session_id(), b.session_id());
        assert_eq!(a.game(), "7");
    }

    #[test]
    fn send_after_close_is_not_connected() {
        let (session, out_rx, _log_rx) = session_with_writer();
        drop(out_rx);

        let err = session.reveal_answer().unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }

    #[test]
    fn dropped_log_receiver_does_not_break_sending() {
        let (session, mut out_rx, log_rx) = session_with_writer();
        drop(log_rx);

        session.continue_game().unwrap();
        assert!(out_rx.try_recv().is_ok());
    }
}
