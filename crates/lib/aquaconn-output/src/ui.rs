use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;

#[derive(Clone, Copy, Debug)]
pub enum Message {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Number of target sites finished so far.
    SitesDone(u64),
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct RunMetadata {
    pub start_time: String,
    pub trajectory_file: String,
    pub output_file: String,
    pub log_path: String,
    pub trajectories: usize,
}

/// State shown by the progress screen.
#[derive(Debug, Default)]
pub struct ProgressContent {
    pub running: bool,
    pub stop_requested: bool,
    pub total_sites: u64,
    pub sites_done: u64,
    pub metadata: RunMetadata,
}

impl ProgressContent {
    pub fn new(total_sites: u64, metadata: RunMetadata) -> Self {
        Self {
            total_sites,
            running: true,
            metadata,
            ..Self::default()
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// The user asked to stop. The screen closes right away and the worker stops at its
/// next progress report.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn update_done(&mut self, sites_done: u64) {
        self.sites_done = sites_done;
    }

    pub fn completion(&self) -> f64 {
        if self.total_sites == 0 {
            return 1.0;
        }
        (self.sites_done as f64 / self.total_sites as f64).clamp(0.0, 1.0)
    }
}

pub trait Renderer: Send {
    fn render_progress(&self, content: &mut ProgressContent, frame: &mut Frame);
}
