use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::warn;
use xtalint::engine::progress::{Progress, ProgressCallback};

const TICK_STRINGS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Owns the terminal while a command runs and turns library progress events
/// into spinners and bars.
pub struct UiManager {
    mp: Arc<MultiProgress>,
    phase: Option<Phase>,
    event_receiver: mpsc::Receiver<UiEvent>,
    shutdown_receiver: watch::Receiver<bool>,
    _sentinel_bar: ProgressBar,
}

/// The workflow phase currently on screen.
struct Phase {
    name: &'static str,
    bar: ProgressBar,
    started: Instant,
}

impl Phase {
    fn summary(&self) -> String {
        format!("✓ {} ({:.1}s)", self.name, self.started.elapsed().as_secs_f64())
    }
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, event_receiver) = mpsc::channel(1024);
        let (shutdown_sender, shutdown_receiver) = watch::channel(false);
        let mp = Arc::new(MultiProgress::new());
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let _sentinel_bar = mp.add(ProgressBar::hidden());
        let manager = Self {
            mp,
            phase: None,
            event_receiver,
            shutdown_receiver,
            _sentinel_bar,
        };

        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.event_receiver.recv() => {
                    self.handle_event(event);
                }
                result = self.shutdown_receiver.changed() => {
                    if result.is_err() || *self.shutdown_receiver.borrow() {
                        break;
                    }
                }
            }
        }
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
        }
        if let Some(phase) = self.phase.take() {
            phase.bar.finish_and_clear();
        }
        self._sentinel_bar.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => {
                self.mp.println(line).ok();
            }
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn bar(&self) -> Option<&ProgressBar> {
        self.phase.as_ref().map(|p| &p.bar)
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                if let Some(previous) = self.phase.take() {
                    previous.bar.finish_and_clear();
                }
                let bar = self.mp.add(ProgressBar::new_spinner());
                bar.set_style(spinner_style());
                bar.enable_steady_tick(Duration::from_millis(80));
                bar.set_message(name);
                self.phase = Some(Phase {
                    name,
                    bar,
                    started: Instant::now(),
                });
            }
            Progress::PhaseFinish => {
                if let Some(phase) = self.phase.take() {
                    phase.bar.finish_and_clear();
                    self.mp.println(phase.summary()).ok();
                }
            }
            Progress::TaskStart { total } => {
                if let Some(bar) = self.bar() {
                    bar.disable_steady_tick();
                    bar.set_style(bar_style());
                    bar.set_length(total);
                    bar.set_position(0);
                }
            }
            Progress::TaskIncrement { amount } => {
                if let Some(bar) = self.bar() {
                    bar.inc(amount);
                }
            }
            Progress::TaskFinish => {
                if let Some(bar) = self.bar() {
                    bar.finish();
                }
            }
            Progress::StatusUpdate { text } => {
                if let Some(phase) = self.phase.as_ref() {
                    phase.bar.set_message(format!("{} ({})", phase.name, text));
                }
            }
            Progress::Message(msg) => {
                self.mp.println(format!("  {}", msg)).ok();
            }
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICK_STRINGS)
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<30} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
        })
        .progress_chars("━╸ ")
}

/// Bridges the library's progress callback to the UI task.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    /// Prints a line above the progress bars without tearing them.
    pub fn log(&self, message: impl Into<String>) {
        if let Err(e) = self.sender.try_send(UiEvent::Log(message.into())) {
            warn!("Failed to send log line to UI channel: {}", e);
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                tracing::trace!("Dropped progress update: {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_manager() -> UiManager {
        let (manager, _sender, _shutdown) = UiManager::new();
        manager.mp.set_draw_target(ProgressDrawTarget::hidden());
        manager
    }

    fn send(manager: &mut UiManager, progress: Progress) {
        manager.handle_event(UiEvent::Progress(progress));
    }

    #[test]
    fn phase_start_shows_a_spinner_named_after_the_phase() {
        let mut manager = setup_manager();
        assert!(manager.phase.is_none());

        send(&mut manager, Progress::PhaseStart { name: "Symmetry Search" });

        let phase = manager.phase.as_ref().unwrap();
        assert_eq!(phase.name, "Symmetry Search");
        assert_eq!(phase.bar.message(), "Symmetry Search");
    }

    #[test]
    fn new_phase_replaces_the_previous_one() {
        let mut manager = setup_manager();
        send(&mut manager, Progress::PhaseStart { name: "Preparation" });
        send(&mut manager, Progress::PhaseStart { name: "Buried Surface Areas" });

        let phase = manager.phase.as_ref().unwrap();
        assert_eq!(phase.name, "Buried Surface Areas");
        assert_eq!(phase.bar.message(), "Buried Surface Areas");
    }

    #[test]
    fn phase_finish_clears_the_phase() {
        let mut manager = setup_manager();
        send(&mut manager, Progress::PhaseStart { name: "Preparation" });
        send(&mut manager, Progress::PhaseFinish);
        assert!(manager.phase.is_none());

        // A stray finish without a phase is ignored.
        send(&mut manager, Progress::PhaseFinish);
        assert!(manager.phase.is_none());
    }

    #[test]
    fn task_events_drive_the_bar() {
        let mut manager = setup_manager();
        send(&mut manager, Progress::PhaseStart { name: "Buried Surface Areas" });
        send(&mut manager, Progress::TaskStart { total: 40 });
        assert_eq!(manager.bar().unwrap().length(), Some(40));
        assert_eq!(manager.bar().unwrap().position(), 0);

        send(&mut manager, Progress::TaskIncrement { amount: 10 });
        send(&mut manager, Progress::TaskIncrement { amount: 5 });
        assert_eq!(manager.bar().unwrap().position(), 15);

        send(&mut manager, Progress::TaskFinish);
        assert!(manager.bar().unwrap().is_finished());
    }

    #[test]
    fn task_events_without_a_phase_are_ignored() {
        let mut manager = setup_manager();
        send(&mut manager, Progress::TaskStart { total: 10 });
        send(&mut manager, Progress::TaskIncrement { amount: 1 });
        send(&mut manager, Progress::TaskFinish);
        assert!(manager.phase.is_none());
    }

    #[test]
    fn status_update_is_appended_to_the_phase_name() {
        let mut manager = setup_manager();
        send(&mut manager, Progress::PhaseStart { name: "Symmetry Search" });
        send(
            &mut manager,
            Progress::StatusUpdate {
                text: "cell 3/26".into(),
            },
        );
        assert_eq!(manager.bar().unwrap().message(), "Symmetry Search (cell 3/26)");
    }

    #[test]
    fn messages_and_log_lines_are_printed() {
        let mut manager = setup_manager();
        manager.handle_event(UiEvent::Log("Structure loaded".to_string()));
        send(&mut manager, Progress::Message("12 interfaces".to_string()));
    }

    #[tokio::test]
    async fn progress_handler_forwards_events() {
        let (sender, mut receiver) = mpsc::channel(4);
        let handler = CliProgressHandler::new(sender);

        handler.get_callback()(Progress::PhaseStart { name: "Preparation" });
        handler.log("12 interfaces found");

        match receiver.recv().await.unwrap() {
            UiEvent::Progress(Progress::PhaseStart { name }) => assert_eq!(name, "Preparation"),
            other => panic!("Incorrect event received: {:?}", other),
        }
        match receiver.recv().await.unwrap() {
            UiEvent::Log(line) => assert_eq!(line, "12 interfaces found"),
            other => panic!("Incorrect event received: {:?}", other),
        }
    }

    #[tokio::test]
    async fn run_returns_after_shutdown() {
        let (manager, sender, shutdown) = UiManager::new();
        manager.mp.set_draw_target(ProgressDrawTarget::hidden());
        let handle = tokio::spawn(manager.run());

        sender
            .send(UiEvent::Progress(Progress::PhaseStart { name: "Preparation" }))
            .await
            .unwrap();
        shutdown.send(true).unwrap();

        handle.await.unwrap();
    }
}
