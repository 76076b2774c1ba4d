//! Ratatui-based terminal dashboard.
//!
//! Two panels (NZ and AU) show demand, carbon intensity, renewable share and
//! a generation mix chart. Fetch cycles run on a background thread and
//! publish into a `SnapshotSlot`; the event loop only ever draws the newest
//! published snapshot.

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tracing::{info, warn};

use crate::app::pipeline::fetch_all_detailed;
use crate::app::snapshot::{Snapshot, SnapshotSlot};
use crate::data::{HttpUpstream, Upstream};
use crate::domain::{Country, CountryOutcome, DataOrigin, FetchConfig};
use crate::error::AppError;
use crate::report::{ERROR_BANNER, chart_entries, fmt_intensity, fuel_rgb, origin_tag, renewable_split};

mod plotters_chart;

use plotters_chart::MixPlottersChart;

/// Start the TUI.
pub fn run(config: FetchConfig) -> Result<(), AppError> {
    let upstream: Arc<dyn Upstream> = Arc::new(HttpUpstream::new(config.timeout)?);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, upstream);
    app.refresh();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: Arc<FetchConfig>,
    upstream: Arc<dyn Upstream>,
    slot: Arc<SnapshotSlot>,
    /// Sequence number of the snapshot last drawn.
    shown_seq: u64,
    status: String,
}

impl App {
    fn new(config: FetchConfig, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            config: Arc::new(config),
            upstream,
            slot: Arc::new(SnapshotSlot::new()),
            shown_seq: 0,
            status: "Fetching NZ and AU data...".to_string(),
        }
    }

    /// Start a fetch cycle on a background thread. Overlapping cycles are
    /// allowed; whichever started last wins.
    fn refresh(&mut self) {
        let ticket = self.slot.begin();
        let slot = Arc::clone(&self.slot);
        let upstream = Arc::clone(&self.upstream);
        let config = Arc::clone(&self.config);

        thread::spawn(move || {
            let report = fetch_all_detailed(upstream.as_ref(), &config);
            if !slot.publish(ticket, report) {
                info!(ticket, "refresh superseded by a newer one");
            }
        });
        self.status = "Refreshing...".to_string();
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.poll_snapshot() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// True when a newer snapshot has been published since the last draw.
    fn poll_snapshot(&mut self) -> bool {
        let Some(snapshot) = self.slot.current() else {
            return false;
        };
        if snapshot.seq == self.shown_seq {
            return false;
        }
        self.shown_seq = snapshot.seq;
        self.status = status_for(&snapshot);
        true
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    fn export(&mut self) {
        let Some(snapshot) = self.slot.current() else {
            self.status = "Nothing to export yet.".to_string();
            return;
        };
        let path = crate::io::default_export_path();
        match crate::io::write_report_json(&path, &snapshot.report) {
            Ok(()) => {
                info!(path = %path.display(), "snapshot exported");
                self.status = format!("Wrote {}", path.display());
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.status = format!("Export failed: {err}");
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        let snapshot = self.slot.current();
        self.draw_header(frame, chunks[0], snapshot.as_deref());
        self.draw_body(frame, chunks[1], snapshot.as_deref());
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect, snapshot: Option<&Snapshot>) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("gridmix", Style::default().fg(Color::Cyan)),
            Span::raw(" · NZ & AU electricity generation and carbon intensity"),
        ]));

        let fetched = snapshot
            .map(|s| s.report.fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        let loading = if self.slot.in_flight() { " | loading…" } else { "" };
        lines.push(Line::from(Span::styled(
            format!(
                "fetched: {fetched} | on failure: {:?} | NZ intensity: {:?}{loading}",
                self.config.on_failure, self.config.nz_intensity,
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect, snapshot: Option<&Snapshot>) {
        let Some(snapshot) = snapshot else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        if snapshot.report.is_unusable() {
            draw_error_banner(frame, area, &snapshot.report.nz, &snapshot.report.au);
            return;
        }

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        for (country, rect) in Country::ALL.into_iter().zip(panels.iter()) {
            draw_country_panel(frame, *rect, snapshot.report.outcome(country));
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "r refresh  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn status_for(snapshot: &Snapshot) -> String {
    let report = &snapshot.report;
    let fell_back: Vec<&str> = [&report.nz, &report.au]
        .into_iter()
        .filter(|o| o.origin != DataOrigin::Live)
        .map(|o| o.country.code())
        .collect();
    if fell_back.is_empty() {
        format!("Updated {}", report.fetched_at.format("%H:%M:%S"))
    } else {
        format!(
            "Updated {} (fallback: {})",
            report.fetched_at.format("%H:%M:%S"),
            fell_back.join(", ")
        )
    }
}

fn origin_color(origin: DataOrigin) -> Color {
    match origin {
        DataOrigin::Live => Color::Green,
        DataOrigin::Mock => Color::Yellow,
        DataOrigin::Unavailable => Color::Red,
    }
}

fn fuel_color(fuel: crate::domain::FuelCategory) -> Color {
    let (r, g, b) = fuel_rgb(fuel);
    Color::Rgb(r, g, b)
}

fn draw_country_panel(frame: &mut ratatui::Frame<'_>, area: Rect, outcome: &CountryOutcome) {
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", outcome.country.display_name()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("[{}] ", origin_tag(outcome.origin)),
            Style::default().fg(origin_color(outcome.origin)),
        ),
    ]);
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let Some(rec) = &outcome.emissions else {
        let reason = outcome.fallback_reason.as_deref().unwrap_or("no data");
        let msg = Paragraph::new(format!("No data.\n{reason}"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(msg, inner);
        return;
    };

    let entries = chart_entries(rec);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(entries.len().min(10) as u16),
        ])
        .split(inner);

    let split = renewable_split(rec);
    let mut lines = vec![
        Line::from(format!("Demand: {:.0} MW", rec.total_demand_mw)),
        Line::from(format!(
            "Carbon intensity: {} gCO2/kWh",
            fmt_intensity(rec.carbon_intensity)
        )),
        Line::from(vec![
            Span::styled(format!("Renewable {}%", split.renewable), Style::default().fg(Color::Green)),
            Span::raw(" | "),
            Span::styled(
                format!("Non-renewable {}%", split.non_renewable),
                Style::default().fg(Color::Red),
            ),
        ]),
        Line::from(Span::styled(
            format!("As-of {}", rec.timestamp.format("%Y-%m-%d %H:%M UTC")),
            Style::default().fg(Color::Gray),
        )),
    ];
    if outcome.origin == DataOrigin::Mock {
        lines.push(Line::from(Span::styled(
            "Mock data: upstream unavailable",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }
    frame.render_widget(Paragraph::new(Text::from(lines)), chunks[0]);

    frame.render_widget(MixPlottersChart { entries: &entries }, chunks[1]);

    let legend: Vec<Line> = entries
        .iter()
        .take(10)
        .map(|e| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(fuel_color(e.fuel))),
                Span::raw(format!("{:<13} {:>3}% {:>7} MW", e.label, e.percent, e.mw)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(legend)), chunks[2]);
}

fn draw_error_banner(frame: &mut ratatui::Frame<'_>, area: Rect, nz: &CountryOutcome, au: &CountryOutcome) {
    let mut lines = vec![Line::from(Span::styled(
        ERROR_BANNER,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ))];
    for outcome in [nz, au] {
        if let Some(reason) = &outcome.fallback_reason {
            lines.push(Line::from(format!("{}: {reason}", outcome.country)));
        }
    }
    lines.push(Line::from(Span::styled("Press r to retry.", Style::default().fg(Color::Gray))));

    let p = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Error").borders(Borders::ALL));
    frame.render_widget(p, area);
}
