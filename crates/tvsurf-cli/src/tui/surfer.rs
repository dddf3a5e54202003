//! Channel surfer TUI main loop.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tvsurf_epg::EpgApi;

use super::state::{EpgLoad, EpgRequest, NavigationController, RemoteKey};
use super::ui::{self, ChannelListLayout};
use crate::player::PlaybackSink;

/// What the loop should do after an input event.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    /// Keep going.
    Continue,
    /// Start an EPG load.
    Load(EpgRequest),
    /// Leave the surfer.
    Quit,
}

/// Runs the channel surfer until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
pub async fn run_surfer<A, P>(controller: &mut NavigationController<P>, api: A) -> Result<()>
where
    A: EpgApi + Sync + 'static,
    P: PlaybackSink,
{
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_event_loop(&mut terminal, controller, &Arc::new(api)).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
///
/// Input, finished EPG loads and the auto-hide deadline are awaited together;
/// every state change happens here, on one task.
async fn run_event_loop<A, P>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut NavigationController<P>,
    api: &Arc<A>,
) -> Result<()>
where
    A: EpgApi + Sync + 'static,
    P: PlaybackSink,
{
    let (load_tx, mut load_rx) = unbounded_channel();
    let mut events = EventStream::new();
    let mut list_layout: Option<ChannelListLayout> = None;

    spawn_load(api, controller.refresh_program_summaries(), &load_tx);

    loop {
        terminal
            .draw(|frame| {
                list_layout = ui::draw(frame, controller);
            })
            .context("failed to draw TUI")?;

        let deadline = controller.auto_hide_deadline();

        tokio::select! {
            maybe_event = events.next() => {
                let Some(event) = maybe_event else {
                    return Ok(());
                };
                let event = event.context("failed to read event")?;
                match handle_event(controller, &event, list_layout.as_ref(), Instant::now()) {
                    Flow::Continue => {}
                    Flow::Load(request) => spawn_load(api, request, &load_tx),
                    Flow::Quit => return Ok(()),
                }
            }
            Some(load) = load_rx.recv() => controller.apply_load(load),
            () = sleep_until(deadline) => {
                controller.tick(Instant::now());
            }
        }
    }
}

/// Fetches the guide in the background and posts the result back to the loop.
fn spawn_load<A>(api: &Arc<A>, request: EpgRequest, load_tx: &UnboundedSender<EpgLoad>)
where
    A: EpgApi + Sync + 'static,
{
    let api = Arc::clone(api);
    let load_tx = load_tx.clone();
    tokio::spawn(async move {
        let result = api.fetch_guide().await;
        if load_tx.send(EpgLoad { request, result }).is_err() {
            tracing::debug!("Surfer closed before EPG load finished");
        }
    });
}

/// Waits for the auto-hide deadline, forever if none is pending.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Routes one terminal event to the controller.
fn handle_event<P: PlaybackSink>(
    controller: &mut NavigationController<P>,
    event: &Event,
    list_layout: Option<&ChannelListLayout>,
    now: Instant,
) -> Flow {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(controller, key, now),
        Event::Mouse(mouse) => {
            handle_mouse(controller, mouse, list_layout, now);
            Flow::Continue
        }
        _ => Flow::Continue,
    }
}

/// Handles key input.
fn handle_key<P: PlaybackSink>(
    controller: &mut NavigationController<P>,
    key: &KeyEvent,
    now: Instant,
) -> Flow {
    let remote_key = match key.code {
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Flow::Quit,
        KeyCode::Enter => RemoteKey::Enter,
        KeyCode::Up => RemoteKey::Up,
        KeyCode::Down => RemoteKey::Down,
        KeyCode::Left => RemoteKey::Left,
        KeyCode::Right => RemoteKey::Right,
        _ => return Flow::Continue,
    };

    controller
        .handle_key(remote_key, now)
        .map_or(Flow::Continue, Flow::Load)
}

/// Handles pointer input over the channel list.
fn handle_mouse<P: PlaybackSink>(
    controller: &mut NavigationController<P>,
    mouse: &MouseEvent,
    list_layout: Option<&ChannelListLayout>,
    now: Instant,
) {
    let Some(layout) = list_layout else {
        return;
    };
    if !layout.contains(mouse.column, mouse.row) {
        return;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(index) = layout.row_at(mouse.column, mouse.row) {
                controller.click_row(index);
            }
        }
        MouseEventKind::Moved | MouseEventKind::Drag(_) => controller.pointer_moved(now),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::arithmetic_side_effects)]

    use std::time::Duration;

    use anyhow::bail;
    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;

    use super::*;
    use crate::tui::state::Channel;

    #[derive(Debug, Default)]
    struct NullSink;

    impl PlaybackSink for NullSink {
        fn set_source(&mut self, _uri: &str) {}

        fn reload(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn make_controller() -> NavigationController<NullSink> {
        let channels = (1..=4)
            .map(|n| Channel {
                id: format!("ch{n}"),
                name: format!("Channel {n}"),
                src: format!("http://example.com/ch{n}.m3u8"),
                program_info: String::new(),
            })
            .collect();
        NavigationController::new(channels, NullSink, Duration::from_millis(4000)).unwrap()
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn list_layout() -> ChannelListLayout {
        ChannelListLayout {
            area: Rect::new(0, 0, 36, 20),
            offset: 0,
        }
    }

    #[test]
    fn test_quit_keys() {
        // Arrange
        let mut controller = make_controller();
        let now = Instant::now();
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        // Act & Assert
        assert_eq!(
            handle_event(&mut controller, &key(KeyCode::Char('q')), None, now),
            Flow::Quit
        );
        assert_eq!(handle_event(&mut controller, &ctrl_c, None, now), Flow::Quit);
        assert_eq!(
            handle_event(&mut controller, &key(KeyCode::Char('c')), None, now),
            Flow::Continue
        );
    }

    #[test]
    fn test_arrow_keys_drive_controller() {
        // Arrange
        let mut controller = make_controller();
        let now = Instant::now();

        // Act
        handle_event(&mut controller, &key(KeyCode::Enter), None, now);
        handle_event(&mut controller, &key(KeyCode::Down), None, now);
        let flow = handle_event(&mut controller, &key(KeyCode::Right), None, now);

        // Assert
        assert_eq!(controller.current_index(), 1);
        assert_eq!(
            flow,
            Flow::Load(EpgRequest::Listing {
                token: 1,
                channel_id: String::from("ch2"),
            })
        );
    }

    #[test]
    fn test_key_release_is_ignored() {
        // Arrange
        let mut controller = make_controller();
        let release = Event::Key(KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });

        // Act
        handle_event(&mut controller, &release, None, Instant::now());

        // Assert
        assert!(!controller.channel_list_visible());
    }

    #[test]
    fn test_click_selects_row() {
        // Arrange
        let mut controller = make_controller();
        let now = Instant::now();
        handle_event(&mut controller, &key(KeyCode::Enter), None, now);
        let layout = list_layout();

        // Act - third channel occupies inner lines 4..=5 (rows 5 and 6)
        handle_event(
            &mut controller,
            &mouse(MouseEventKind::Down(MouseButton::Left), 4, 5),
            Some(&layout),
            now,
        );

        // Assert
        assert_eq!(controller.current_index(), 2);
        assert!(controller.channel_list_visible());
        assert!(controller.playing().is_none());
    }

    #[test]
    fn test_click_below_last_row_is_ignored() {
        // Arrange
        let mut controller = make_controller();
        let now = Instant::now();
        handle_event(&mut controller, &key(KeyCode::Enter), None, now);
        let layout = list_layout();

        // Act
        handle_event(
            &mut controller,
            &mouse(MouseEventKind::Down(MouseButton::Left), 4, 15),
            Some(&layout),
            now,
        );

        // Assert
        assert_eq!(controller.current_index(), 0);
    }

    #[test]
    fn test_pointer_movement_over_list_rearms() {
        // Arrange
        let mut controller = make_controller();
        let start = Instant::now();
        handle_event(&mut controller, &key(KeyCode::Enter), None, start);
        let layout = list_layout();
        let later = start + Duration::from_millis(1500);

        // Act
        handle_event(
            &mut controller,
            &mouse(MouseEventKind::Moved, 10, 10),
            Some(&layout),
            later,
        );

        // Assert
        assert_eq!(
            controller.auto_hide_deadline(),
            Some(later + Duration::from_millis(4000))
        );
    }

    #[test]
    fn test_pointer_movement_outside_list_is_ignored() {
        // Arrange
        let mut controller = make_controller();
        let start = Instant::now();
        handle_event(&mut controller, &key(KeyCode::Enter), None, start);
        let layout = list_layout();

        // Act
        handle_event(
            &mut controller,
            &mouse(MouseEventKind::Moved, 50, 10),
            Some(&layout),
            start + Duration::from_millis(1500),
        );

        // Assert
        assert_eq!(
            controller.auto_hide_deadline(),
            Some(start + Duration::from_millis(4000))
        );
    }

    /// Guide source that always fails.
    struct FailingApi;

    impl EpgApi for FailingApi {
        async fn fetch_guide(&self) -> Result<tvsurf_epg::EpgGuide> {
            bail!("EPG request failed (HTTP 500)")
        }
    }

    #[tokio::test]
    async fn test_spawn_load_posts_result() {
        // Arrange
        let api = Arc::new(FailingApi);
        let (load_tx, mut load_rx) = unbounded_channel();

        // Act
        spawn_load(&api, EpgRequest::Summaries, &load_tx);
        let load = load_rx.recv().await.unwrap();

        // Assert
        assert_eq!(load.request, EpgRequest::Summaries);
        assert!(load.result.is_err());
    }

    #[tokio::test]
    async fn test_sleep_until_past_deadline_returns() {
        // Arrange
        let deadline = Instant::now();

        // Act & Assert
        tokio::time::timeout(Duration::from_secs(1), sleep_until(Some(deadline)))
            .await
            .unwrap();
    }
}
