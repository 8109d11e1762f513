#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use stashpeek::app::App;
use stashpeek::git::{GatewayFailure, GatewayResult, StashBackend};
use stashpeek::input::map_key;
use stashpeek::models::{FileChange, StashEntry};

/// In-memory stand-in for git. Records every call and can be told to fail
/// specific operations.
#[derive(Default)]
pub struct ScriptedBackend {
    pub calls: Mutex<Vec<String>>,
    pub stashes: Mutex<Vec<StashEntry>>,
    pub files: Mutex<Vec<FileChange>>,
    pub failing: Mutex<HashSet<&'static str>>,
}

impl ScriptedBackend {
    pub fn with_stashes(messages: &[&str]) -> Self {
        let backend = Self::default();
        *backend.stashes.lock().unwrap() = messages.iter().enumerate().map(|(i, m)| stash(i, m)).collect();
        backend
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, detail: &str) -> GatewayResult<()> {
        let entry = if detail.is_empty() { operation.to_string() } else { format!("{operation} {detail}") };
        self.calls.lock().unwrap().push(entry);
        if self.failing.lock().unwrap().contains(operation) {
            return Err(GatewayFailure::new(operation, Some(1), format!("error: {operation} exploded")));
        }
        Ok(())
    }
}

impl StashBackend for ScriptedBackend {
    fn list_stashes(&self) -> GatewayResult<Vec<StashEntry>> {
        self.record("list", "")?;
        Ok(self.stashes.lock().unwrap().clone())
    }

    fn show_stash_diff(&self, reference: &str) -> GatewayResult<String> {
        self.record("show", reference)?;
        Ok(format!("diff --git a/{reference} b/{reference}\n+line"))
    }

    fn drop_stash(&self, reference: &str) -> GatewayResult<String> {
        self.record("drop", reference)?;
        let mut stashes = self.stashes.lock().unwrap();
        stashes.retain(|s| s.reference != reference);
        let renumbered: Vec<StashEntry> = stashes.iter().enumerate().map(|(i, s)| stash(i, &s.message)).collect();
        *stashes = renumbered;
        Ok(format!("Dropped {reference}"))
    }

    fn apply_stash(&self, reference: &str) -> GatewayResult<String> {
        self.record("apply", reference)?;
        Ok("On branch main\nChanges not staged for commit".to_string())
    }

    fn scan_working_tree(&self) -> GatewayResult<Vec<FileChange>> {
        self.record("scan", "")?;
        Ok(self.files.lock().unwrap().clone())
    }

    fn diff_file(&self, path: &str, staged: bool) -> GatewayResult<String> {
        self.record("diff", path)?;
        Ok(format!("diff --git a/{path} b/{path} staged={staged}"))
    }

    fn create_stash(&self, paths: &[String], message: &str) -> GatewayResult<String> {
        self.record("create", &format!("{} {}", message, paths.join(",")))?;
        let mut stashes = self.stashes.lock().unwrap();
        stashes.insert(0, stash(0, message));
        let renumbered: Vec<StashEntry> = stashes.iter().enumerate().map(|(i, s)| stash(i, &s.message)).collect();
        *stashes = renumbered;
        Ok("Saved working directory".to_string())
    }

    fn discard_tracked(&self) -> GatewayResult<String> {
        self.record("discard", "")?;
        Ok("HEAD is now at abc123 init".to_string())
    }

    fn remove_untracked(&self) -> GatewayResult<String> {
        self.record("clean", "")?;
        Ok("Removing scratch.txt".to_string())
    }
}

pub fn stash(index: usize, message: &str) -> StashEntry {
    StashEntry {
        reference: format!("stash@{{{index}}}"),
        message: message.to_string(),
        relative_age: "2 hours ago".to_string(),
    }
}

pub fn change(path: &str, status: char, staged: bool) -> FileChange {
    FileChange { path: path.to_string(), status, staged }
}

pub fn press(app: &mut App, code: KeyCode) {
    let key = KeyEvent::new(code, KeyModifiers::NONE);
    if let Some(action) = map_key(app.modal, key) {
        app.apply(action);
    }
}

pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

/// Runs queued tasks against `backend` until nothing is left, feeding every
/// completion back into the app in dispatch order.
pub fn settle(app: &mut App, backend: &dyn StashBackend) {
    loop {
        let tasks = app.take_tasks();
        if tasks.is_empty() {
            return;
        }
        for task in tasks {
            let completion = task.run(backend);
            app.on_completion(completion);
        }
    }
}

/// An app whose bootstrap listing has already been answered by `backend`.
pub fn started(backend: &dyn StashBackend) -> App {
    let mut app = App::new();
    settle(&mut app, backend);
    app
}

pub fn maps_agree(app: &App) -> bool {
    let selected: HashSet<&String> = app.selected.keys().collect();
    let expanded: HashSet<&String> = app.expanded.keys().collect();
    let cached: HashSet<&String> = app.diffs.keys().collect();
    expanded == selected && cached == selected
}

pub fn key_set<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}
