use std::io;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::mpsc::{Receiver, SyncSender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent};
use log::{debug, error, info, warn};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

use aquaconn_output::terminal::{handle_key_events, ContentResult, TerminalUI};
use aquaconn_output::ui::{Message, ProgressContent, Renderer, RunMetadata};

/// Runs `work` on the calling thread while a progress screen is drawn on another one.
/// `work` receives a progress callback to call after every finished site; it returns
/// `ControlFlow::Break` once the user has pressed `q` or `Esc`. If the screen cannot be
/// shown, the work carries on and progress goes to the log instead.
pub fn run_with_progress<T, W, R>(total_sites: usize, metadata: RunMetadata, renderer: R, work: W) -> T
where
    W: FnOnce(&mut dyn FnMut(usize, usize) -> ControlFlow<()>) -> T,
    R: Renderer,
{
    let (sender_ui, receiver_ui) = mpsc::sync_channel(0);
    let event_sender = sender_ui.clone();
    let finished = AtomicBool::new(false);
    let screen_failed = AtomicBool::new(false);

    thread::scope(|s| {
        let failed_flag = &screen_failed;
        s.spawn(move || {
            if let Err(e) = add_event_listener(&receiver_ui, total_sites as u64, metadata, renderer)
            {
                error!("Progress screen failed: {}", e);
                failed_flag.store(true, Ordering::SeqCst);
            }
            // The flag must be visible before senders see the channel close.
            drop(receiver_ui);
        });
        let finished_flag = &finished;
        s.spawn(move || add_event_poller(&event_sender, finished_flag));

        let mut progress = forward_progress(&sender_ui, &screen_failed);
        let result = work(&mut progress);
        finished.store(true, Ordering::Relaxed);
        if sender_ui.send(Message::Quit).is_err() {
            debug!("Progress screen already closed");
        }
        result
    })
}

/// Progress callback that forwards the number of finished sites to the screen. A closed
/// screen means the user asked to stop, unless `screen_failed` is set.
pub fn forward_progress<'a>(
    sender: &'a SyncSender<Message>,
    screen_failed: &'a AtomicBool,
) -> impl FnMut(usize, usize) -> ControlFlow<()> + 'a {
    let mut warned = false;
    move |done, total| {
        if sender.send(Message::SitesDone(done as u64)).is_ok() {
            return ControlFlow::Continue(());
        }
        if screen_failed.load(Ordering::SeqCst) {
            if !warned {
                warn!("Progress screen is not available, continuing without it");
                warned = true;
            }
            return log_progress(done, total);
        }
        info!("User requested to stop, terminating after {} of {} sites", done, total);
        ControlFlow::Break(())
    }
}

/// Progress callback for runs without a screen: logs roughly every tenth of the sites.
pub fn log_progress(done: usize, total: usize) -> ControlFlow<()> {
    let step = (total / 10).max(1);
    if done % step == 0 || done == total {
        info!("Processed {} of {} sites", done, total);
    }
    ControlFlow::Continue(())
}

pub fn add_event_listener<R: Renderer>(
    receiver_ui: &Receiver<Message>,
    total_sites: u64,
    metadata: RunMetadata,
    renderer: R,
) -> ContentResult<()> {
    let mut content = ProgressContent::new(total_sites, metadata);
    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;
    let mut tui = TerminalUI::new(terminal, renderer);
    tui.init()?;

    let drawn = draw_until_done(&mut tui, &mut content, receiver_ui);
    if let Err(e) = tui.exit() {
        error!("Unable to restore the terminal: {}", e);
    }
    drawn
}

fn draw_until_done<B: Backend, R: Renderer>(
    tui: &mut TerminalUI<B, R>,
    content: &mut ProgressContent,
    receiver_ui: &Receiver<Message>,
) -> ContentResult<()> {
    while content.running && !content.stop_requested {
        tui.draw_ui(content)?;
        match receiver_ui.recv() {
            Ok(message) => match message {
                Message::SitesDone(done) => content.update_done(done),
                Message::Quit => content.quit(),
                Message::Key(key_event) => handle_key_events(key_event, content),
                Message::Mouse(_) => {}
                Message::Resize(_, _) => {}
            },
            Err(_) => content.quit(),
        }
    }
    Ok(())
}

/// Forwards terminal events until the work is finished or nobody listens anymore.
pub fn add_event_poller(sender: &SyncSender<Message>, finished: &AtomicBool) {
    let tick_rate = Duration::from_millis(250);
    while !finished.load(Ordering::Relaxed) {
        let message = match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(CrosstermEvent::Key(e)) => Some(Message::Key(e)),
                Ok(CrosstermEvent::Mouse(e)) => Some(Message::Mouse(e)),
                Ok(CrosstermEvent::Resize(w, h)) => Some(Message::Resize(w, h)),
                Ok(_) => None,
                Err(e) => {
                    error!("Unable to read terminal event: {}", e);
                    return;
                }
            },
            Ok(false) => None,
            Err(e) => {
                error!("Unable to poll terminal events: {}", e);
                return;
            }
        };
        if let Some(message) = message {
            if sender.send(message).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Frame;

    use super::*;

    struct BlankRenderer;

    impl Renderer for BlankRenderer {
        fn render_progress(&self, _content: &mut ProgressContent, _frame: &mut Frame) {}
    }

    #[test]
    fn test_progress_stops_when_screen_is_gone() {
        let (sender, receiver) = mpsc::sync_channel(1);
        let screen_failed = AtomicBool::new(false);
        let mut progress = forward_progress(&sender, &screen_failed);
        assert_eq!(progress(1, 3), ControlFlow::Continue(()));
        assert!(matches!(receiver.recv(), Ok(Message::SitesDone(1))));
        drop(receiver);
        assert_eq!(progress(2, 3), ControlFlow::Break(()));
    }

    #[test]
    fn test_progress_continues_when_screen_failed() {
        let (sender, receiver) = mpsc::sync_channel(1);
        let screen_failed = AtomicBool::new(true);
        drop(receiver);
        let mut progress = forward_progress(&sender, &screen_failed);
        assert_eq!(progress(1, 2), ControlFlow::Continue(()));
        assert_eq!(progress(2, 2), ControlFlow::Continue(()));
    }

    #[test]
    fn test_screen_closes_as_soon_as_stop_is_requested() {
        let terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let mut tui = TerminalUI::new(terminal, BlankRenderer);
        let mut content = ProgressContent::new(3, RunMetadata::default());
        let (sender, receiver) = mpsc::sync_channel(2);
        let quit_key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        sender.send(Message::Key(quit_key)).unwrap();
        sender.send(Message::SitesDone(1)).unwrap();

        draw_until_done(&mut tui, &mut content, &receiver).unwrap();
        assert!(content.stop_requested);
        assert!(content.running);
        assert!(matches!(receiver.try_recv(), Ok(Message::SitesDone(1))));
    }

    #[test]
    fn test_work_finishes_without_terminal() {
        let finished = run_with_progress(5, RunMetadata::default(), BlankRenderer, |progress| {
            (1..=5)
                .map(|done| progress(done, 5))
                .take_while(|flow| flow.is_continue())
                .count()
        });
        assert_eq!(finished, 5);
    }
}
