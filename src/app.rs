use std::collections::HashMap;
use chrono::Local;
use tracing::{debug, info, warn};
use crate::git::GatewayFailure;
use crate::input::Action;
use crate::models::{FileChange, FocusArea, Modal, Mode, StashEntry};
use crate::tasks::{Completion, ListPurpose, Task};
use crate::utils::{PanelSizes, calculate_max_scroll, strip_ansi};

/// All UI state. Every key press and every backend completion goes through
/// [`App::apply`] or [`App::on_completion`]; follow-up backend work is queued
/// and picked up with [`App::take_tasks`].
#[derive(Debug, Default)]
pub struct App {
    pub mode: Mode,
    pub modal: Modal,
    pub focus: FocusArea,
    /// Set while an operation the user is waiting on is in flight.
    pub loading: bool,
    pub last_error: Option<GatewayFailure>,
    /// The first stash listing failed. Nothing else works until restart.
    pub bootstrap_error: Option<GatewayFailure>,
    pub should_quit: bool,

    pub stashes: Vec<StashEntry>,
    pub selected_stash: Option<usize>,
    /// Explore panel contents and the reference they belong to.
    pub stash_diff: String,
    pub stash_diff_title: String,
    diff_target: Option<String>,
    /// Stash a pending delete or apply confirmation refers to.
    pending_target: Option<String>,

    pub files: Vec<FileChange>,
    pub selected_file: Option<usize>,
    pub selected: HashMap<String, FileChange>,
    pub expanded: HashMap<String, bool>,
    pub diffs: HashMap<String, String>,
    /// Outcome text shown above the combined diff in Build mode.
    pub build_notice: String,

    pub message_input: String,
    pub diff_scroll: u16,
    pub panels: PanelSizes,
    pub status: String,

    outbox: Vec<Task>,
    clipboard: Option<String>,
}

impl App {
    /// A fresh session with the initial stash listing already queued.
    pub fn new() -> Self {
        let mut app = Self { loading: true, ..Self::default() };
        app.outbox.push(Task::ListStashes(ListPurpose::Bootstrap));
        app
    }

    pub fn take_tasks(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.outbox)
    }

    /// Panel text waiting to be put on the system clipboard.
    pub fn take_clipboard(&mut self) -> Option<String> {
        self.clipboard.take()
    }

    fn request_copy(&mut self) {
        let text = strip_ansi(&self.panel_text());
        if text.trim().is_empty() {
            self.notice("Nothing to copy");
            return;
        }
        self.clipboard = Some(text);
    }

    fn queue(&mut self, task: Task) {
        debug!(task = task.name(), "queued");
        self.outbox.push(task);
    }

    pub fn notice(&mut self, text: impl AsRef<str>) {
        let now = Local::now().format("%H:%M:%S");
        self.status = format!("[{now}] {}", text.as_ref());
    }

    pub fn highlighted_stash(&self) -> Option<&StashEntry> {
        self.selected_stash.and_then(|i| self.stashes.get(i))
    }

    pub fn highlighted_file(&self) -> Option<&FileChange> {
        self.selected_file.and_then(|i| self.files.get(i))
    }

    pub fn pending_target(&self) -> Option<&str> {
        self.pending_target.as_deref()
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selected.contains_key(path)
    }

    /// Recomputes panel dimensions; valid in every mode and modal.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.panels = PanelSizes::for_terminal(width, height);
        self.clamp_diff_scroll();
    }

    pub fn apply(&mut self, action: Action) {
        if self.bootstrap_error.is_some() {
            if matches!(action, Action::Quit | Action::DismissModal) {
                self.should_quit = true;
            }
            return;
        }

        if !self.modal.is_open() {
            self.apply_browse(action);
        } else if self.modal == Modal::StashMessage {
            self.apply_message(action);
        } else {
            self.apply_confirm(action);
        }
    }

    fn apply_browse(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleMode => self.toggle_mode(),
            Action::SwitchFocus => self.focus = self.focus.other(),
            Action::Copy => self.request_copy(),
            Action::Up => self.navigate(-1),
            Action::Down => self.navigate(1),
            Action::PageUp => self.scroll_diff(-(self.panels.diff_height.max(1) as i32)),
            Action::PageDown => self.scroll_diff(self.panels.diff_height.max(1) as i32),
            _ => match self.mode {
                Mode::Explore => self.apply_explore(action),
                Mode::Build => self.apply_build(action),
            },
        }
    }

    fn apply_explore(&mut self, action: Action) {
        match action {
            Action::Confirm => {
                if let Some(i) = self.selected_stash {
                    self.request_stash_diff(i);
                }
            }
            Action::Delete => self.open_stash_confirm(Modal::DeleteConfirm),
            Action::Apply => self.open_stash_confirm(Modal::ApplyConfirm),
            _ => {}
        }
    }

    fn apply_build(&mut self, action: Action) {
        match action {
            Action::Confirm => {
                let Some(file) = self.highlighted_file().cloned() else { return };
                if self.is_selected(&file.path) {
                    self.deselect(&file.path);
                } else {
                    self.select(file);
                }
            }
            Action::ToggleExpand => {
                let Some(file) = self.highlighted_file().cloned() else { return };
                if !self.is_selected(&file.path) {
                    self.select(file);
                    return;
                }
                if let Some(open) = self.expanded.get_mut(&file.path) {
                    *open = !*open;
                }
                self.clamp_diff_scroll();
            }
            Action::Save if !self.selected.is_empty() => {
                self.message_input.clear();
                self.modal = Modal::StashMessage;
            }
            Action::Restore => self.modal = Modal::RestoreConfirm,
            _ => {}
        }
    }

    fn apply_confirm(&mut self, action: Action) {
        match action {
            Action::Affirm => self.affirm(),
            Action::Deny | Action::DismissModal | Action::Quit => self.close_modal(),
            _ => {}
        }
    }

    fn apply_message(&mut self, action: Action) {
        match action {
            Action::Insert(c) => self.message_input.push(c),
            Action::Backspace => {
                self.message_input.pop();
            }
            Action::Confirm => self.submit_stash_message(),
            Action::DismissModal | Action::Quit => self.close_modal(),
            _ => {}
        }
    }

    fn close_modal(&mut self) {
        self.modal = Modal::None;
        self.message_input.clear();
        self.pending_target = None;
    }

    fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.focus = FocusArea::List;
        self.diff_scroll = 0;
        info!(mode = %self.mode, "mode switched");
        match self.mode {
            Mode::Build => {
                self.build_notice.clear();
                self.loading = true;
                self.queue(Task::ScanWorkingTree);
            }
            // Build-mode picks do not survive a trip back to Explore.
            Mode::Explore => self.clear_build_state(),
        }
    }

    fn clear_build_state(&mut self) {
        self.selected.clear();
        self.expanded.clear();
        self.diffs.clear();
    }

    fn navigate(&mut self, delta: i32) {
        if self.focus == FocusArea::Diff {
            self.scroll_diff(delta);
            return;
        }
        match self.mode {
            Mode::Explore => self.selected_stash = step(self.selected_stash, delta, self.stashes.len()),
            Mode::Build => self.selected_file = step(self.selected_file, delta, self.files.len()),
        }
    }

    fn scroll_diff(&mut self, delta: i32) {
        let next = (self.diff_scroll as i32 + delta).max(0);
        self.diff_scroll = next.min(u16::MAX as i32) as u16;
        self.clamp_diff_scroll();
    }

    fn clamp_diff_scroll(&mut self) {
        let max = calculate_max_scroll(&self.panel_text(), self.panels.diff_height);
        self.diff_scroll = self.diff_scroll.min(max);
    }

    /// Text of the right-hand panel for the current mode, color codes included.
    pub fn panel_text(&self) -> String {
        match self.mode {
            Mode::Explore => self.stash_diff.clone(),
            Mode::Build => {
                let combined = self.combined_diff();
                match (self.build_notice.is_empty(), combined.is_empty()) {
                    (true, _) => combined,
                    (false, true) => self.build_notice.clone(),
                    (false, false) => format!("{}\n\n{}", self.build_notice, combined),
                }
            }
        }
    }

    /// Selected files in list order, each with its diff when expanded.
    pub fn combined_diff(&self) -> String {
        let mut paths: Vec<&String> = Vec::new();
        for file in &self.files {
            if self.selected.contains_key(&file.path) && !paths.contains(&&file.path) {
                paths.push(&file.path);
            }
        }
        let mut rest: Vec<&String> = self.selected.keys().filter(|p| !paths.contains(p)).collect();
        rest.sort();
        paths.extend(rest);

        let mut out = String::new();
        for path in paths {
            let open = self.expanded.get(path).copied().unwrap_or(false);
            let side = self.selected.get(path).map(|f| if f.staged { "staged" } else { "unstaged" }).unwrap_or("");
            out.push_str(&format!("{} {} ({})\n", if open { "▾" } else { "▸" }, path, side));
            if open {
                match self.diffs.get(path) {
                    Some(diff) if diff.trim().is_empty() => out.push_str("  (no textual changes)\n"),
                    Some(diff) => {
                        out.push_str(diff);
                        if !diff.ends_with('\n') {
                            out.push('\n');
                        }
                    }
                    None => out.push_str("  loading diff…\n"),
                }
            }
        }
        out
    }

    fn request_stash_diff(&mut self, index: usize) {
        let Some(reference) = self.stashes.get(index).map(|s| s.reference.clone()) else { return };
        self.diff_target = Some(reference.clone());
        self.loading = true;
        self.queue(Task::ShowStash { reference });
    }

    fn open_stash_confirm(&mut self, modal: Modal) {
        let Some(reference) = self.highlighted_stash().map(|s| s.reference.clone()) else { return };
        self.pending_target = Some(reference);
        self.modal = modal;
    }

    fn affirm(&mut self) {
        let modal = self.modal;
        let target = self.pending_target.take();
        self.close_modal();
        match (modal, target) {
            (Modal::DeleteConfirm, Some(reference)) => {
                self.notice(format!("Dropping {reference}…"));
                self.queue(Task::DropStash { reference });
            }
            (Modal::ApplyConfirm, Some(reference)) => {
                self.loading = true;
                self.notice(format!("Applying {reference}…"));
                self.queue(Task::ApplyStash { reference });
            }
            (Modal::RestoreConfirm, _) => {
                self.loading = true;
                self.notice("Restoring working tree…");
                self.queue(Task::RestoreWorkingTree);
            }
            _ => {}
        }
    }

    fn select(&mut self, file: FileChange) {
        let path = file.path.clone();
        let staged = file.staged;
        self.selected.insert(path.clone(), file);
        self.expanded.insert(path.clone(), false);
        self.queue(Task::DiffFile { path, staged });
    }

    fn deselect(&mut self, path: &str) {
        self.selected.remove(path);
        self.expanded.remove(path);
        self.diffs.remove(path);
        self.clamp_diff_scroll();
    }

    fn submit_stash_message(&mut self) {
        let message = self.message_input.trim().to_string();
        if message.is_empty() {
            return;
        }
        let mut paths: Vec<String> = self.selected.keys().cloned().collect();
        paths.sort();
        self.close_modal();
        self.loading = true;
        self.notice(format!("Stashing {} file(s)…", paths.len()));
        self.queue(Task::CreateStash { paths, message });
    }

    pub fn on_completion(&mut self, completion: Completion) {
        match completion {
            Completion::StashesListed { purpose, result } => self.on_stashes_listed(purpose, result),
            Completion::StashShown { reference, result } => {
                if self.diff_target.as_deref() != Some(reference.as_str()) {
                    debug!(%reference, "dropping stale stash diff");
                    return;
                }
                self.loading = false;
                self.stash_diff_title = reference;
                self.stash_diff = result.unwrap_or_else(|f| failure_text(&f));
                self.diff_scroll = 0;
            }
            Completion::StashDropped { reference, result } => match result {
                Ok(_) => {
                    info!(%reference, "stash dropped");
                    self.last_error = None;
                    self.notice(format!("Dropped {reference}"));
                    let previous_index = self.selected_stash.unwrap_or(0);
                    self.queue(Task::ListStashes(ListPurpose::AfterDrop { previous_index }));
                }
                Err(f) => {
                    warn!(%reference, error = %f, "drop failed");
                    self.notice(format!("Could not drop {reference}"));
                    self.stash_diff_title = reference;
                    self.stash_diff = failure_text(&f);
                    self.diff_target = None;
                    self.loading = false;
                    self.last_error = Some(f);
                }
            },
            Completion::StashApplied { reference, result } => {
                self.loading = false;
                self.diff_target = None;
                self.diff_scroll = 0;
                self.stash_diff = match result {
                    Ok(out) => {
                        self.notice(format!("Applied {reference}"));
                        format!("Applied {reference}\n\n{out}")
                    }
                    Err(f) => {
                        self.notice(format!("Apply failed for {reference}"));
                        format!("Apply failed for {reference}\n\n{}", failure_text(&f))
                    }
                };
                self.stash_diff_title = reference;
            }
            Completion::WorkingTreeScanned { result } => {
                self.loading = false;
                match result {
                    Ok(files) => {
                        self.files = files;
                        self.selected_file = clamp(self.selected_file.or(Some(0)), self.files.len());
                    }
                    Err(f) => self.build_notice = format!("Could not read working tree\n\n{}", failure_text(&f)),
                }
            }
            Completion::FileDiffed { path, staged, result } => {
                let still_wanted = self.selected.get(&path).is_some_and(|f| f.staged == staged);
                if !still_wanted {
                    debug!(%path, "dropping stale file diff");
                    return;
                }
                self.diffs.insert(path, result.unwrap_or_else(|f| failure_text(&f)));
            }
            Completion::StashCreated { result } => {
                self.loading = false;
                match result {
                    Ok(_) => {
                        self.last_error = None;
                        self.notice("Stash created");
                        self.clear_build_state();
                        self.build_notice.clear();
                        self.mode = Mode::Explore;
                        self.focus = FocusArea::List;
                        self.diff_scroll = 0;
                        self.loading = true;
                        self.queue(Task::ListStashes(ListPurpose::AfterCreate));
                    }
                    Err(f) => {
                        self.notice("Stash failed");
                        self.build_notice = format!("Stash failed\n\n{}", failure_text(&f));
                    }
                }
            }
            Completion::WorkingTreeRestored { result } => {
                self.loading = false;
                self.diff_scroll = 0;
                match result {
                    Ok(out) => {
                        self.notice("Working tree restored");
                        self.build_notice = format!("Working tree restored\n\n{}", out.trim_end());
                        self.clear_build_state();
                        self.loading = true;
                        self.queue(Task::ScanWorkingTree);
                    }
                    Err(f) => {
                        self.notice(format!("Restore failed during {}", f.operation));
                        self.build_notice = format!("Restore failed\n\n{}", failure_text(&f));
                    }
                }
            }
        }
    }

    fn on_stashes_listed(&mut self, purpose: ListPurpose, result: Result<Vec<StashEntry>, GatewayFailure>) {
        let stashes = match result {
            Ok(stashes) => stashes,
            Err(f) => {
                self.loading = false;
                if purpose == ListPurpose::Bootstrap {
                    warn!(error = %f, "initial stash listing failed");
                    self.bootstrap_error = Some(f);
                } else {
                    self.stash_diff_title.clear();
                    self.stash_diff = failure_text(&f);
                    self.notice("Could not list stashes");
                }
                return;
            }
        };
        self.stashes = stashes;

        match purpose {
            ListPurpose::Bootstrap => {
                self.loading = false;
                self.selected_stash = clamp(self.selected_stash.or(Some(0)), self.stashes.len());
            }
            ListPurpose::AfterDrop { previous_index } => {
                self.selected_stash = clamp(Some(previous_index), self.stashes.len());
                self.show_selected_or_clear();
            }
            ListPurpose::AfterCreate => {
                self.selected_stash = clamp(Some(0), self.stashes.len());
                self.show_selected_or_clear();
            }
        }
    }

    fn show_selected_or_clear(&mut self) {
        match self.selected_stash {
            Some(i) => self.request_stash_diff(i),
            None => {
                self.loading = false;
                self.diff_target = None;
                self.stash_diff.clear();
                self.stash_diff_title.clear();
                self.diff_scroll = 0;
            }
        }
    }
}

fn failure_text(failure: &GatewayFailure) -> String {
    if failure.output.trim().is_empty() {
        failure.to_string()
    } else {
        failure.output.clone()
    }
}

/// Keeps an index inside a list of `len` items, the way a list widget does.
pub fn clamp(index: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    index.map(|i| i.min(len - 1))
}

fn step(index: Option<usize>, delta: i32, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = index.unwrap_or(0) as i64;
    let next = (current + delta as i64).clamp(0, len as i64 - 1);
    Some(next as usize)
}
