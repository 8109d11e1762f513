use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};
use crate::git::{GatewayFailure, GatewayResult, StashBackend};
use crate::models::{FileChange, StashEntry};

/// Why the stash list is being fetched; decides what happens with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPurpose {
    /// First load at startup. A failure here is fatal to the session.
    Bootstrap,
    /// Re-read after a drop; the selection is clamped from `previous_index`.
    AfterDrop { previous_index: usize },
    /// Re-read after a stash was created; the newest entry is shown.
    AfterCreate,
}

/// A unit of backend work requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    ListStashes(ListPurpose),
    ShowStash { reference: String },
    DropStash { reference: String },
    ApplyStash { reference: String },
    ScanWorkingTree,
    DiffFile { path: String, staged: bool },
    CreateStash { paths: Vec<String>, message: String },
    RestoreWorkingTree,
}

/// The single result of a [`Task`]. Every variant names what it belongs to so
/// it can be routed no matter in which order tasks finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    StashesListed { purpose: ListPurpose, result: GatewayResult<Vec<StashEntry>> },
    StashShown { reference: String, result: GatewayResult<String> },
    StashDropped { reference: String, result: GatewayResult<String> },
    StashApplied { reference: String, result: GatewayResult<String> },
    WorkingTreeScanned { result: GatewayResult<Vec<FileChange>> },
    FileDiffed { path: String, staged: bool, result: GatewayResult<String> },
    StashCreated { result: GatewayResult<String> },
    WorkingTreeRestored { result: GatewayResult<String> },
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::ListStashes(_) => "stash list",
            Task::ShowStash { .. } => "stash show",
            Task::DropStash { .. } => "stash drop",
            Task::ApplyStash { .. } => "stash apply",
            Task::ScanWorkingTree => "status",
            Task::DiffFile { .. } => "diff",
            Task::CreateStash { .. } => "stash push",
            Task::RestoreWorkingTree => "restore",
        }
    }

    /// Runs the task against `backend`, blocking until it is done.
    pub fn run(self, backend: &dyn StashBackend) -> Completion {
        match self {
            Task::ListStashes(purpose) => Completion::StashesListed { purpose, result: backend.list_stashes() },
            Task::ShowStash { reference } => {
                let result = backend.show_stash_diff(&reference);
                Completion::StashShown { reference, result }
            }
            Task::DropStash { reference } => {
                let result = backend.drop_stash(&reference);
                Completion::StashDropped { reference, result }
            }
            Task::ApplyStash { reference } => {
                let result = backend.apply_stash(&reference);
                Completion::StashApplied { reference, result }
            }
            Task::ScanWorkingTree => Completion::WorkingTreeScanned { result: backend.scan_working_tree() },
            Task::DiffFile { path, staged } => {
                let result = backend.diff_file(&path, staged);
                Completion::FileDiffed { path, staged, result }
            }
            Task::CreateStash { paths, message } => Completion::StashCreated { result: backend.create_stash(&paths, &message) },
            Task::RestoreWorkingTree => Completion::WorkingTreeRestored { result: backend.restore_working_tree() },
        }
    }

    /// The completion reported when the task could not run to the end.
    pub fn failed(self, failure: GatewayFailure) -> Completion {
        match self {
            Task::ListStashes(purpose) => Completion::StashesListed { purpose, result: Err(failure) },
            Task::ShowStash { reference } => Completion::StashShown { reference, result: Err(failure) },
            Task::DropStash { reference } => Completion::StashDropped { reference, result: Err(failure) },
            Task::ApplyStash { reference } => Completion::StashApplied { reference, result: Err(failure) },
            Task::ScanWorkingTree => Completion::WorkingTreeScanned { result: Err(failure) },
            Task::DiffFile { path, staged } => Completion::FileDiffed { path, staged, result: Err(failure) },
            Task::CreateStash { .. } => Completion::StashCreated { result: Err(failure) },
            Task::RestoreWorkingTree => Completion::WorkingTreeRestored { result: Err(failure) },
        }
    }
}

/// Hands tasks to blocking workers and feeds their completions back into the
/// event loop's channel.
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn StashBackend>,
    tx: UnboundedSender<Completion>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn StashBackend>, tx: UnboundedSender<Completion>) -> Self {
        Self { backend, tx }
    }

    /// Must be called from inside a tokio runtime.
    pub fn dispatch(&self, task: Task) {
        debug!(task = task.name(), "dispatching");
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let fallback = task.clone();
        tokio::spawn(async move {
            let completion = match tokio::task::spawn_blocking(move || task.run(backend.as_ref())).await {
                Ok(completion) => completion,
                Err(e) => {
                    error!(task = fallback.name(), error = %e, "backend worker died");
                    let name = fallback.name();
                    fallback.failed(GatewayFailure::new(name, None, e.to_string()))
                }
            };
            // The receiver is gone only while shutting down.
            let _ = tx.send(completion);
        });
    }

    pub fn dispatch_all(&self, tasks: impl IntoIterator<Item = Task>) {
        for task in tasks {
            self.dispatch(task);
        }
    }
}
