//! Audio playback: decoded MP3 clips → rodio sinks.
//!
//! rodio's `OutputStream` is `!Send`, so a dedicated OS thread owns it and
//! receives clips over a channel. Each clip gets its own [`Sink`]: a second
//! `play` while one is still sounding starts a second, overlapping playback.
//! MP3 decoding happens on that thread; the result is sent back so a bad
//! clip fails the `play` call that submitted it.

use std::future::Future;
use std::io::Cursor;
use std::sync::mpsc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tokio::sync::oneshot;
use tracing::{debug, error};

use tarjeta_core::audio::DecodedAudio;

use crate::error::PlaybackError;

/// Capability to start playing a decoded clip.
pub trait Playback {
    /// Resolves once playback has started, not when it finishes.
    fn play(&self, audio: DecodedAudio) -> impl Future<Output = Result<(), PlaybackError>> + Send;
}

enum PlayCmd {
    Play {
        bytes: Vec<u8>,
        reply: oneshot::Sender<Result<(), PlaybackError>>,
    },
    Stop,
    /// Block until every active clip has finished, then reply.
    Drain(oneshot::Sender<()>),
}

/// Cloneable handle to the playback thread.
#[derive(Clone)]
pub struct Player {
    cmd_tx: mpsc::Sender<PlayCmd>,
}

impl Player {
    /// Spawn the playback thread. The output device is opened on that thread;
    /// if it can't be, every `play` reports [`PlaybackError::Output`].
    pub fn spawn() -> Result<Self, PlaybackError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayCmd>();
        std::thread::Builder::new()
            .name("tarjeta-playback".into())
            .spawn(move || playback_thread(cmd_rx))
            .map_err(|e| PlaybackError::Output(format!("failed to spawn playback thread: {e}")))?;
        Ok(Self { cmd_tx })
    }

    /// Silence every clip that is still playing.
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(PlayCmd::Stop);
    }

    /// Wait until every clip started so far has finished playing.
    pub async fn wait_until_done(&self) {
        let (reply, reply_rx) = oneshot::channel();
        if self.cmd_tx.send(PlayCmd::Drain(reply)).is_ok() {
            let _ = reply_rx.await;
        }
    }
}

impl Playback for Player {
    async fn play(&self, audio: DecodedAudio) -> Result<(), PlaybackError> {
        let (reply, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(PlayCmd::Play {
                bytes: audio.into_bytes(),
                reply,
            })
            .map_err(|_| thread_gone())?;
        reply_rx.await.map_err(|_| thread_gone())?
    }
}

fn thread_gone() -> PlaybackError {
    PlaybackError::Output("playback thread has stopped".into())
}

// ─── Playback OS thread ───────────────────────────────────────────────────

fn playback_thread(cmd_rx: mpsc::Receiver<PlayCmd>) {
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            error!("playback: failed to open audio output: {e}");
            let reason = e.to_string();
            for cmd in cmd_rx {
                match cmd {
                    PlayCmd::Play { reply, .. } => {
                        let _ = reply.send(Err(PlaybackError::Output(reason.clone())));
                    }
                    PlayCmd::Drain(reply) => {
                        let _ = reply.send(());
                    }
                    PlayCmd::Stop => {}
                }
            }
            return;
        }
    };

    let mut sinks: Vec<Sink> = Vec::new();

    while let Ok(cmd) = cmd_rx.recv() {
        sinks.retain(|sink| !sink.empty());

        match cmd {
            PlayCmd::Play { bytes, reply } => {
                let result = start_clip(&stream_handle, bytes).map(|sink| {
                    sinks.push(sink);
                    debug!("playback: clip started ({} active)", sinks.len());
                });
                if let Err(ref e) = result {
                    error!("playback: {e}");
                }
                let _ = reply.send(result);
            }
            PlayCmd::Stop => {
                for sink in sinks.drain(..) {
                    sink.stop();
                }
            }
            PlayCmd::Drain(reply) => {
                for sink in sinks.drain(..) {
                    sink.sleep_until_end();
                }
                let _ = reply.send(());
            }
        }
    }

    for sink in sinks {
        sink.stop();
    }
}

fn start_clip(handle: &OutputStreamHandle, bytes: Vec<u8>) -> Result<Sink, PlaybackError> {
    let source = Decoder::new(Cursor::new(bytes)).map_err(|e| PlaybackError::Decode(e.to_string()))?;
    let sink = Sink::try_new(handle).map_err(|e| PlaybackError::Output(e.to_string()))?;
    sink.append(source);
    Ok(sink)
}

/// Test double that records the source URI of every clip it is asked to play.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct RecordingPlayer {
    played: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

#[cfg(test)]
impl RecordingPlayer {
    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Playback for RecordingPlayer {
    async fn play(&self, audio: DecodedAudio) -> Result<(), PlaybackError> {
        self.played.lock().unwrap().push(audio.source_uri().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarjeta_core::audio::decode_base64_mp3;

    // Whether or not an output device exists, a clip that isn't MP3 must
    // fail the `play` call that submitted it.
    #[tokio::test]
    async fn garbage_clip_fails_play() {
        let player = Player::spawn().unwrap();
        let audio = decode_base64_mp3("aG9sYQ==").unwrap();
        let err = player.play(audio).await.unwrap_err();
        assert!(matches!(err, PlaybackError::Decode(_) | PlaybackError::Output(_)));
        player.wait_until_done().await;
    }
}
