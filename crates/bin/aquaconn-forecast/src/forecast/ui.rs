use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use aquaconn_output::ui::{ProgressContent, Renderer};

pub struct ProgressRenderer {}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self {}
    }
}

impl Renderer for ProgressRenderer {
    fn render_progress(&self, content: &mut ProgressContent, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Percentage(20), Constraint::Percentage(80)])
            .split(frame.area());

        let progress_text = format!(
            "Sites: {} / {}. {:.2}%. ",
            content.sites_done,
            content.total_sites,
            content.completion() * 100.0
        );
        frame.render_widget(
            Gauge::default()
                .gauge_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .bg(Color::Black)
                        .add_modifier(Modifier::ITALIC),
                )
                .label(progress_text)
                .ratio(content.completion())
                .use_unicode(true)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Connectivity Progress (q to stop)")
                        .title_alignment(Alignment::Center),
                ),
            layout[0],
        );

        let run_details = format!(
            "Start Time: {}\n\
            Trajectory File: {} ({} trajectories)\n\
            Output File: {}\n\
            Log File: {}\n\
            ",
            content.metadata.start_time,
            content.metadata.trajectory_file,
            content.metadata.trajectories,
            content.metadata.output_file,
            content.metadata.log_path,
        );
        frame.render_widget(
            Paragraph::new(run_details)
                .block(Block::default().borders(Borders::ALL).title("More details"))
                .style(Style::default().fg(Color::White).bg(Color::Black))
                .alignment(Alignment::Left),
            layout[1],
        );
    }
}
