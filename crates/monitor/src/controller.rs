use crate::console::HELP;
use crate::cycle::{Cycle, CycleState, Tick};
use hygro_config::MonitorConfig;
use hygro_core::{Command, Mode, Notice};
use hygro_export::{default_base, ExportError, Exporter};
use hygro_renderer::status_line;
use hygro_series::Session;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Applies user commands to the shared session and the render cycle.
pub struct Controller {
    session:  Arc<Session>,
    cycle:    Cycle,
    exporter: Exporter,
}

impl Controller {
    pub fn new(config: &MonitorConfig, session: Arc<Session>) -> Self {
        Self {
            session,
            cycle: Cycle::new(config.cycle.curve_points),
            exporter: Exporter::new(config),
        }
    }

    pub fn tick(&mut self) -> Tick {
        self.cycle.tick(&self.session)
    }

    pub fn cycle(&self) -> &Cycle {
        &self.cycle
    }

    pub fn is_terminated(&self) -> bool {
        self.cycle.state() == CycleState::Terminated
    }

    pub fn handle(&mut self, command: Command) -> Vec<Notice> {
        if self.is_terminated() {
            return Vec::new();
        }

        let notice = match command {
            Command::Select(mode) => self.select(mode),
            Command::Back => self.back(),
            Command::Stop => self.stop(),
            Command::Play => self.play(),
            Command::Details => self.details(),
            Command::Status => self.status(),
            Command::Feed => self.feed(),
            Command::Ports => ports(),
            Command::Help => Notice::info("Commands", HELP),
            Command::Save(base) => self.save(base),
            Command::Quit => self.quit(),
        };
        vec![notice]
    }

    // ── Session ─────────────────────────────────────────────────────────────

    fn select(&mut self, mode: Mode) -> Notice {
        self.session.start(mode, Instant::now());
        self.cycle.restart();
        Notice::info(
            format!("REAL-TIME · {}", mode.as_str().to_uppercase()),
            "Acquisition active.",
        )
    }

    fn back(&mut self) -> Notice {
        self.session.end();
        self.cycle.restart();
        Notice::info("Menu", "Select a mode: humidity | temperature | both")
    }

    fn stop(&mut self) -> Notice {
        if self.session.mode().is_none() {
            return no_session();
        }
        if !self.session.pause() {
            return Notice::warning("Already stopped", "Type `play` to resume.");
        }
        self.cycle.pause();
        info!("Acquisition stopped at {} points", self.session.len());
        Notice::info("Acquisition stopped", "")
    }

    fn play(&mut self) -> Notice {
        if self.session.mode().is_none() {
            return no_session();
        }
        if !self.session.resume() {
            return Notice::warning("Not stopped", "Acquisition is already active.");
        }
        self.cycle.resume(self.session.len());
        info!("Acquisition resumed");
        Notice::info("Acquisition active", "")
    }

    // ── Display ─────────────────────────────────────────────────────────────

    fn details(&mut self) -> Notice {
        if self.session.mode().is_none() {
            return no_session();
        }
        if self.cycle.toggle_metrics() {
            let panel = self.cycle.display().metrics_panel().unwrap_or_default();
            Notice::info("Regression statistics", panel)
        } else {
            Notice::info("Regression statistics hidden", "")
        }
    }

    fn status(&self) -> Notice {
        let Some(mode) = self.session.mode() else {
            return Notice::info("Menu", "No mode selected.");
        };
        let display = self.cycle.display();
        let mut body = if self.cycle.state() == CycleState::Active {
            display.status().to_string()
        } else {
            status_line(self.session.len(), mode)
        };
        body.push_str(&format!(" | Cycle: {}", self.cycle.state()));
        if let Some(panel) = display.metrics_panel() {
            body.push_str("\n\n");
            body.push_str(panel);
        }
        Notice::info("Status", body)
    }

    fn feed(&self) -> Notice {
        let entries = self.session.feed();
        if entries.is_empty() {
            return Notice::info("Live feed", "(no samples yet)");
        }
        Notice::info("Live feed", entries.join("\n"))
    }

    // ── Export ──────────────────────────────────────────────────────────────

    fn save(&mut self, base: Option<PathBuf>) -> Notice {
        let Some(mode) = self.session.mode() else {
            return no_session();
        };
        let paused = self.cycle.state() == CycleState::Paused;
        let snapshot = self.session.snapshot();
        let base = base.unwrap_or_else(default_base);

        match self.exporter.export(paused, &snapshot, mode, &base) {
            Ok(artifacts) => Notice::info(
                "Export complete",
                format!(
                    "{}\n{}",
                    artifacts.image.display(),
                    artifacts.table.display()
                ),
            ),
            Err(e) => {
                warn!("Export failed: {e}");
                let title = match &e {
                    ExportError::NotPaused => "Pause required",
                    ExportError::NoData => "No data",
                    ExportError::Image { .. } | ExportError::Render(_) => "Image error",
                    ExportError::Table { .. } => "Data error",
                };
                if e.is_precondition() {
                    Notice::warning(title, e.to_string())
                } else {
                    Notice::error(title, e.to_string())
                }
            }
        }
    }

    fn quit(&mut self) -> Notice {
        self.session.request_shutdown();
        self.cycle.terminate();
        Notice::info("Shutting down", "")
    }
}

fn no_session() -> Notice {
    Notice::warning("No session", "Select a mode first: humidity | temperature | both")
}

fn ports() -> Notice {
    let ports = hygro_link::list_ports();
    if ports.is_empty() {
        Notice::info("Serial ports", "(none found)")
    } else {
        Notice::info("Serial ports", ports.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hygro_core::{NoticeLevel, Reading};
    use std::time::Duration;

    fn controller() -> (Controller, Arc<Session>) {
        let config = MonitorConfig::default();
        let session = Arc::new(Session::new(&config.buffer));
        (Controller::new(&config, Arc::clone(&session)), session)
    }

    fn push(session: &Session, n: usize) {
        let base = Instant::now();
        for i in 0..n {
            session.ingest(
                Reading {
                    temperature: 21.0 + i as f64 * 0.1,
                    humidity:    50 + i as i32,
                },
                base + Duration::from_millis(250 * i as u64),
            );
        }
    }

    fn single(notices: Vec<Notice>) -> Notice {
        assert_eq!(notices.len(), 1);
        notices.into_iter().next().unwrap()
    }

    #[test]
    fn save_while_running_warns() {
        let (mut controller, session) = controller();
        controller.handle(Command::Select(Mode::Both));
        push(&session, 3);

        let dir = tempfile::tempdir().unwrap();
        let notice = single(controller.handle(Command::Save(Some(dir.path().join("run")))));
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.title, "Pause required");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn save_without_data_warns() {
        let (mut controller, _session) = controller();
        controller.handle(Command::Select(Mode::Humidity));
        controller.handle(Command::Stop);

        let dir = tempfile::tempdir().unwrap();
        let notice = single(controller.handle(Command::Save(Some(dir.path().join("run")))));
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.title, "No data");
    }

    #[test]
    fn save_while_stopped_writes_both_files() {
        let (mut controller, session) = controller();
        controller.handle(Command::Select(Mode::Both));
        push(&session, 6);
        controller.handle(Command::Stop);

        let dir = tempfile::tempdir().unwrap();
        let notice = single(controller.handle(Command::Save(Some(dir.path().join("run")))));
        assert_eq!(notice.level, NoticeLevel::Info, "{notice}");
        assert!(dir.path().join("run.png").is_file());
        assert!(dir.path().join("run.xlsx").is_file());
    }

    #[test]
    fn stop_and_play_drive_session_and_cycle() {
        let (mut controller, session) = controller();
        assert_eq!(single(controller.handle(Command::Stop)).title, "No session");

        controller.handle(Command::Select(Mode::Temperature));
        push(&session, 3);
        assert_eq!(controller.tick(), Tick::Rendered);

        controller.handle(Command::Stop);
        assert!(!session.state().running());
        assert_eq!(controller.cycle().state(), CycleState::Paused);
        assert_eq!(
            single(controller.handle(Command::Stop)).level,
            NoticeLevel::Warning
        );

        controller.handle(Command::Play);
        assert!(session.state().running());
        assert!(session.state().resync_pending);
        assert_eq!(controller.cycle().state(), CycleState::Active);
    }

    #[test]
    fn new_mode_and_back_clear_the_buffer() {
        let (mut controller, session) = controller();
        controller.handle(Command::Select(Mode::Humidity));
        push(&session, 4);
        controller.tick();

        controller.handle(Command::Select(Mode::Both));
        assert!(session.is_empty());
        assert_eq!(controller.cycle().state(), CycleState::Idle);

        push(&session, 2);
        controller.handle(Command::Back);
        assert!(session.is_empty());
        assert_eq!(session.mode(), None);
    }

    #[test]
    fn details_toggles_the_panel() {
        let (mut controller, session) = controller();
        controller.handle(Command::Select(Mode::Humidity));
        push(&session, 4);
        controller.tick();

        let shown = single(controller.handle(Command::Details));
        assert!(shown.body.starts_with("=== LINEAR ==="));
        let status = single(controller.handle(Command::Status));
        assert!(status.body.starts_with("Points: 4 | Mode: humidity | Cycle: active"));
        assert!(status.body.contains("=== QUADRATIC ==="));

        let hidden = single(controller.handle(Command::Details));
        assert!(hidden.body.is_empty());
    }

    #[test]
    fn quit_terminates_and_ignores_later_commands() {
        let (mut controller, session) = controller();
        controller.handle(Command::Quit);
        assert!(session.is_shutdown());
        assert!(controller.is_terminated());
        assert!(controller.handle(Command::Help).is_empty());
    }
}
