//! Interactive study view.
//!
//! ```text
//! key thread (crossterm) ─[key_rx]─┐
//!                                  ├─ main loop: KeyListeners → StudySession → render
//! speak tasks ─────────[notice_rx]─┘
//! ```
//!
//! Arrow keys go through the session's [`KeyListeners`]; keys the listeners
//! leave unhandled fall through to the local flip/speak/quit commands.
//! Speaking runs on its own task, so navigation never waits for audio.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use tokio::sync::mpsc;
use tracing::{debug, error};

use tarjeta_lib::listener::{KeyEvent, KeyListeners, NavigationKeys};
use tarjeta_lib::player::Player;
use tarjeta_lib::session::{CardView, StudySession};
use tarjeta_lib::source::{AudioSource, speak};
use tarjeta_lib::tarjeta_core::deck::Deck;
use tarjeta_lib::tarjeta_core::keys::KeyBindings;
use tarjeta_lib::tarjeta_core::navigator::DeckNavigator;
use tarjeta_lib::tarjeta_core::types::LanguageCode;

use crate::CliResult;

const HELP: &str = "←/→ previous/next   f flip   s speak   q quit";

pub async fn run<S>(deck: Deck, navigator: DeckNavigator, source: S, player: Player) -> CliResult
where
    S: AudioSource + Clone + Send + Sync + 'static,
{
    let mut session = StudySession::new(navigator);
    session.start(deck)?;

    let (key_tx, key_rx) = mpsc::unbounded_channel::<String>();
    let _terminal = TerminalGuard::enter()?;
    spawn_key_reader(key_tx)?;

    let result = event_loop(&mut session, source, player.clone(), key_rx, &mut io::stdout()).await;
    player.stop();
    result?;
    Ok(())
}

/// Drive the session from `key_rx` until quit or until key input closes.
async fn event_loop<S, W>(
    session: &mut StudySession,
    source: S,
    player: Player,
    mut key_rx: mpsc::UnboundedReceiver<String>,
    out: &mut W,
) -> io::Result<()>
where
    S: AudioSource + Clone + Send + Sync + 'static,
    W: Write,
{
    let listeners = KeyListeners::new();
    let (nav_tx, mut nav_rx) = mpsc::unbounded_channel();
    let _nav_keys = NavigationKeys::register(&listeners, &KeyBindings::default(), move |action| {
        let _ = nav_tx.send(action);
    });

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel::<String>();
    let mut notice: Option<String> = None;
    render(out, session.view().as_ref(), notice.as_deref())?;

    loop {
        tokio::select! {
            key = key_rx.recv() => {
                // Key thread gone: no more input can arrive.
                let Some(key) = key else { break };
                notice = None;
                let mut event = KeyEvent::new(key);
                if !listeners.dispatch(&mut event) {
                    match event.key() {
                        "q" | "Escape" => break,
                        "f" | " " | "ArrowUp" | "ArrowDown" => {
                            session.flip();
                        }
                        "s" | "Enter" => {
                            if let Some(request) = session.audio_request() {
                                let (source, player, notice_tx) =
                                    (source.clone(), player.clone(), notice_tx.clone());
                                tokio::spawn(async move {
                                    if let Err(e) = speak(&source, &player, request).await {
                                        error!("speak failed: {e}");
                                        let _ = notice_tx.send(format!("playback failed: {e}"));
                                    }
                                });
                            }
                        }
                        other => {
                            debug!("study: ignoring key {other:?}");
                            continue;
                        }
                    }
                }
                while let Ok(action) = nav_rx.try_recv() {
                    session.apply(action);
                }
                render(out, session.view().as_ref(), notice.as_deref())?;
            }
            Some(message) = notice_rx.recv() => {
                notice = Some(message);
                render(out, session.view().as_ref(), notice.as_deref())?;
            }
            else => break,
        }
    }
    Ok(())
}

fn render<W: Write>(out: &mut W, view: Option<&CardView>, notice: Option<&str>) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    match view {
        None => write!(out, "loading…\r\n\r\n")?,
        Some(view) => {
            write!(
                out,
                "#{}   {}/{}   {}\r\n\r\n",
                view.id,
                view.position,
                view.history_len,
                flag(view.language)
            )?;
            write!(out, "    {}\r\n\r\n", view.text)?;
            write!(out, "    {}\r\n\r\n", view.definition)?;
        }
    }
    write!(out, "{HELP}\r\n")?;
    if let Some(notice) = notice {
        write!(out, "\r\n{notice}\r\n")?;
    }
    out.flush()
}

fn flag(language: LanguageCode) -> &'static str {
    match language {
        LanguageCode::En => "🇺🇸 EN",
        LanguageCode::Es => "🇲🇽 ES",
    }
}

/// Raw mode + alternate screen for the lifetime of the guard.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), terminal::EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Blocking crossterm reads on an OS thread, forwarded as DOM-style key names.
fn spawn_key_reader(tx: mpsc::UnboundedSender<String>) -> io::Result<()> {
    std::thread::Builder::new()
        .name("tarjeta-keys".into())
        .spawn(move || {
            loop {
                match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        let Some(name) = key_name(key.code, key.modifiers) else {
                            continue;
                        };
                        if tx.send(name).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("keys: terminal read failed: {e}");
                        break;
                    }
                }
            }
        })?;
    Ok(())
}

fn key_name(code: KeyCode, modifiers: KeyModifiers) -> Option<String> {
    // Raw mode swallows SIGINT; treat Ctrl-C as quit.
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Some("Escape".into());
    }
    let name = match code {
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Char(c) => c.to_string(),
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tarjeta_lib::source::EmbeddedSource;

    #[test]
    fn arrows_use_dom_names() {
        assert_eq!(key_name(KeyCode::Left, KeyModifiers::NONE).as_deref(), Some("ArrowLeft"));
        assert_eq!(key_name(KeyCode::Right, KeyModifiers::NONE).as_deref(), Some("ArrowRight"));
        assert_eq!(key_name(KeyCode::Char('f'), KeyModifiers::NONE).as_deref(), Some("f"));
        assert_eq!(key_name(KeyCode::Tab, KeyModifiers::NONE), None);
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(
            key_name(KeyCode::Char('c'), KeyModifiers::CONTROL).as_deref(),
            Some("Escape")
        );
    }

    #[test]
    fn renders_current_side() {
        let view = CardView {
            id: 12,
            text: "perro".into(),
            definition: "a domesticated canine".into(),
            language: LanguageCode::Es,
            position: 2,
            history_len: 3,
            can_retreat: true,
        };
        let mut out = Vec::new();
        render(&mut out, Some(&view), Some("playback failed: no embedded audio for this card")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("#12   2/3   🇲🇽 ES"));
        assert!(text.contains("perro"));
        assert!(text.contains("playback failed"));
    }

    #[tokio::test]
    async fn loop_ends_when_key_input_closes() {
        let deck = Deck::from_json(
            r#"[
                {"id":1,"english":"dog","spanish":"perro","definition":"animal"},
                {"id":2,"english":"cat","spanish":"gato","definition":"animal"}
            ]"#,
        )
        .unwrap();
        let mut session = StudySession::new(DeckNavigator::seeded(1));
        session.start(deck).unwrap();

        let (key_tx, key_rx) = mpsc::unbounded_channel();
        key_tx.send("ArrowRight".to_string()).unwrap();
        key_tx.send("f".to_string()).unwrap();
        drop(key_tx);

        let player = Player::spawn().unwrap();
        let mut out = Vec::new();
        tokio::time::timeout(
            Duration::from_secs(5),
            event_loop(&mut session, EmbeddedSource, player, key_rx, &mut out),
        )
        .await
        .expect("loop should stop once key input closes")
        .unwrap();

        assert_eq!(session.navigator().history_len(), 2);
        assert_eq!(session.language(), LanguageCode::Es);
    }

    #[test]
    fn renders_pending_state() {
        let mut out = Vec::new();
        render(&mut out, None, None).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("loading"));
    }
}
