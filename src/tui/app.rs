use crate::fetch::Snapshot;
use crate::scoring::ScoringDiagnostics;
use crate::session::Session;
use crate::table::ScoreTable;
use crate::tui::theme::ThemeColors;
use chrono::{DateTime, Utc};
use ratatui::widgets::{ListState, TableState};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::warn;

/// Small and large weight steps for the adjust keys.
pub const FINE_STEP: f64 = 1.0;
pub const COARSE_STEP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Weights,
    Table,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Help,
    ModelPicker,
}

/// Row order of the score table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSort {
    Total,
    IndustryRating,
}

impl TableSort {
    pub fn label(self) -> &'static str {
        match self {
            TableSort::Total => "by total",
            TableSort::IndustryRating => "by industry, rating",
        }
    }
}

pub struct App {
    pub session: Session,
    pub table: ScoreTable,
    pub diagnostics: ScoringDiagnostics,
    /// Set when the last recompute failed; the previous table stays on screen.
    pub score_error: Option<String>,
    pub weights_state: ListState,
    pub table_state: TableState,
    pub focus: Focus,
    pub table_sort: TableSort,
    pub input_mode: InputMode,
    /// Models offered by the data service, refreshed with every snapshot.
    pub models: Vec<String>,
    pub model_state: ListState,
    /// Model chosen in the picker, waiting for the event loop to fetch it.
    pub pending_model: Option<String>,
    pub flash_message: Option<(String, Instant)>,
    pub fetched_at: DateTime<Utc>,
    pub needs_refresh: bool,
    pub should_quit: bool,
    pub is_loading: bool,
    pub is_saving: bool,
    pub spinner_frame: usize,
    pub theme: ThemeColors,
}

impl App {
    pub fn new(session: Session, fetched_at: DateTime<Utc>, models: Vec<String>) -> Self {
        let mut weights_state = ListState::default();
        if !session.rubric().sections().is_empty() {
            weights_state.select(Some(0));
        }

        let mut app = Self {
            session,
            table: ScoreTable::from_run(&Default::default()),
            diagnostics: ScoringDiagnostics::default(),
            score_error: None,
            weights_state,
            table_state: TableState::default(),
            focus: Focus::Weights,
            table_sort: TableSort::Total,
            input_mode: InputMode::Normal,
            models,
            model_state: ListState::default(),
            pending_model: None,
            flash_message: None,
            fetched_at,
            needs_refresh: false,
            should_quit: false,
            is_loading: false,
            is_saving: false,
            spinner_frame: 0,
            theme: ThemeColors::default(),
        };
        app.recompute();
        app
    }

    /// Full recomputation from the session; runs after every weight change.
    pub fn recompute(&mut self) {
        match self.session.recompute() {
            Ok(run) => {
                self.diagnostics = run.diagnostics.clone();
                self.table = ScoreTable::from_run(&run);
                self.sort_table();
                self.score_error = None;
                self.clamp_table_selection();
            }
            Err(e) => {
                warn!(error = %e, "recompute failed");
                self.score_error = Some(e.to_string());
            }
        }
    }

    fn sort_table(&mut self) {
        match self.table_sort {
            TableSort::Total => self.table.sort_by_total_desc(),
            TableSort::IndustryRating => self.table.sort_by_industry_rating(),
        }
    }

    pub fn toggle_sort(&mut self) {
        self.table_sort = match self.table_sort {
            TableSort::Total => TableSort::IndustryRating,
            TableSort::IndustryRating => TableSort::Total,
        };
        self.sort_table();
        self.show_flash(format!("Sorted {}", self.table_sort.label()));
    }

    fn clamp_table_selection(&mut self) {
        let len = self.table.len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(selected) if selected >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn section_count(&self) -> usize {
        self.session.rubric().sections().len()
    }

    pub fn selected_section(&self) -> Option<&str> {
        self.weights_state
            .selected()
            .and_then(|i| self.session.rubric().sections().get(i))
            .map(|s| s.name.as_str())
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Weights => Focus::Table,
            Focus::Table => Focus::Weights,
        };
    }

    pub fn next_row(&mut self) {
        match self.focus {
            Focus::Weights => {
                let next = step(self.weights_state.selected(), self.section_count(), true);
                self.weights_state.select(next);
            }
            Focus::Table => {
                let next = step(self.table_state.selected(), self.table.len(), true);
                self.table_state.select(next);
            }
        }
    }

    pub fn previous_row(&mut self) {
        match self.focus {
            Focus::Weights => {
                let prev = step(self.weights_state.selected(), self.section_count(), false);
                self.weights_state.select(prev);
            }
            Focus::Table => {
                let prev = step(self.table_state.selected(), self.table.len(), false);
                self.table_state.select(prev);
            }
        }
    }

    /// Nudge the selected section's weight and recompute.
    pub fn adjust_selected(&mut self, delta: f64) {
        let Some(section) = self.selected_section().map(str::to_string) else {
            return;
        };
        match self.session.adjust_weight(&section, delta) {
            Ok(_) => self.recompute(),
            Err(e) => self.show_flash(format!("Error: {}", e)),
        }
    }

    pub fn reset_weights(&mut self) {
        self.session.reset_weights();
        self.recompute();
        self.show_flash("Weights reset to model defaults".to_string());
    }

    /// Payload for a save, or `None` with a flash explaining why not.
    pub fn request_save(&mut self) -> Option<BTreeMap<String, f64>> {
        if self.is_saving {
            return None;
        }
        match self.session.save_payload() {
            Ok(payload) => {
                self.is_saving = true;
                self.show_flash(format!("Saving weights to {}...", self.session.model_name()));
                Some(payload)
            }
            Err(e) => {
                self.show_flash(format!("Error: {}", e));
                None
            }
        }
    }

    pub fn finish_save(&mut self, result: anyhow::Result<()>) {
        self.is_saving = false;
        match result {
            Ok(()) => self.show_flash(format!("Saved weights to {}", self.session.model_name())),
            Err(e) => self.show_flash(format!("Failed to save: {:#}", e)),
        }
    }

    /// Swap in fresh data. A snapshot of the current model keeps weight
    /// overrides where sections survive; another model starts from its own
    /// weights and read-only flag.
    pub fn update_snapshot(&mut self, snapshot: Snapshot, read_only: bool) {
        self.fetched_at = snapshot.fetched_at;
        self.models = snapshot.model_names();
        let companies = snapshot.answers.len();
        let message = if snapshot.model_name == self.session.model_name() {
            self.session.replace_data(snapshot);
            format!("Refreshed ({} companies)", companies)
        } else {
            let model = snapshot.model_name.clone();
            self.session.switch_model(snapshot, read_only);
            self.weights_state.select(None);
            format!("Switched to {} ({} companies)", model, companies)
        };

        let sections = self.section_count();
        match self.weights_state.selected() {
            _ if sections == 0 => self.weights_state.select(None),
            Some(i) if i >= sections => self.weights_state.select(Some(sections - 1)),
            None => self.weights_state.select(Some(0)),
            _ => {}
        }

        self.recompute();
        self.show_flash(message);
    }

    pub fn open_model_picker(&mut self) {
        if self.models.is_empty() {
            self.show_flash("Error: the data service listed no models".to_string());
            return;
        }
        let current = self
            .models
            .iter()
            .position(|m| m == self.session.model_name())
            .unwrap_or(0);
        self.model_state.select(Some(current));
        self.input_mode = InputMode::ModelPicker;
    }

    pub fn next_model(&mut self) {
        let next = step(self.model_state.selected(), self.models.len(), true);
        self.model_state.select(next);
    }

    pub fn previous_model(&mut self) {
        let prev = step(self.model_state.selected(), self.models.len(), false);
        self.model_state.select(prev);
    }

    /// Queue the highlighted model for loading. Choosing the current model
    /// just closes the picker.
    pub fn confirm_model(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some(model) = self.model_state.selected().and_then(|i| self.models.get(i)) else {
            return;
        };
        if model != self.session.model_name() {
            let model = model.clone();
            self.show_flash(format!("Loading {}...", model));
            self.pending_model = Some(model);
        }
    }

    pub fn cancel_model_picker(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}

/// Wrapping selection step over `len` items.
fn step(selected: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match (selected, forward) {
        (None, _) => 0,
        (Some(i), true) if i + 1 >= len => 0,
        (Some(i), true) => i + 1,
        (Some(0), false) => len - 1,
        (Some(i), false) => i - 1,
    })
}
