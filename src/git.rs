use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Command,
};
use thiserror::Error;
use tracing::{debug, warn};
use crate::models::{FileChange, StashEntry};

/// Shortest porcelain status line that still carries a path: `XY p`.
const MIN_STATUS_LINE: usize = 4;

/// Left-hand side when diffing a file git has never seen.
const NULL_DEVICE: &str = "/dev/null";

/// A git invocation that did not succeed. The captured output is kept so the
/// UI can show what git said.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed ({exit}): {output}", exit = exit_label(.exit_code))]
pub struct GatewayFailure {
    pub operation: String,
    /// `None` when the process could not be started or was killed by a signal.
    pub exit_code: Option<i32>,
    pub output: String,
}

impl GatewayFailure {
    pub fn new(operation: impl Into<String>, exit_code: Option<i32>, output: impl Into<String>) -> Self {
        Self { operation: operation.into(), exit_code, output: output.into() }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit {}", code),
        None => "not run".to_string(),
    }
}

pub type GatewayResult<T> = Result<T, GatewayFailure>;

/// Everything the explorer needs from a stash-capable backend. Calls block;
/// the dispatcher runs them off the UI thread.
pub trait StashBackend: Send + Sync {
    fn list_stashes(&self) -> GatewayResult<Vec<StashEntry>>;
    fn show_stash_diff(&self, reference: &str) -> GatewayResult<String>;
    fn drop_stash(&self, reference: &str) -> GatewayResult<String>;
    fn apply_stash(&self, reference: &str) -> GatewayResult<String>;
    fn scan_working_tree(&self) -> GatewayResult<Vec<FileChange>>;
    fn diff_file(&self, path: &str, staged: bool) -> GatewayResult<String>;
    fn create_stash(&self, paths: &[String], message: &str) -> GatewayResult<String>;
    /// Throws away modifications to tracked files.
    fn discard_tracked(&self) -> GatewayResult<String>;
    /// Deletes untracked files and directories.
    fn remove_untracked(&self) -> GatewayResult<String>;

    /// Two dependent calls: the clean phase only runs once the discard phase
    /// has succeeded, and its result is what gets reported.
    fn restore_working_tree(&self) -> GatewayResult<String> {
        let discarded = self.discard_tracked()?;
        let cleaned = self.remove_untracked()?;
        Ok(join_output(&discarded, &cleaned))
    }
}

fn join_output(first: &str, second: &str) -> String {
    match (first.trim_end(), second.trim_end()) {
        ("", b) => b.to_string(),
        (a, "") => a.to_string(),
        (a, b) => format!("{}\n{}", a, b),
    }
}

/// Backend that shells out to the `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    git_binary: String,
    repo: PathBuf,
}

impl GitCli {
    pub fn new(git_binary: impl Into<String>, repo: impl Into<PathBuf>) -> Self {
        Self { git_binary: git_binary.into(), repo: repo.into() }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Runs git and returns stdout followed by stderr. A non-zero exit becomes
    /// a failure that still carries the text.
    fn run<I, S>(&self, operation: &str, args: I) -> GatewayResult<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.run_accepting(operation, args, &[0])
    }

    /// Like [`GitCli::run`], treating every exit code in `accepted` as success.
    fn run_accepting<I, S>(&self, operation: &str, args: I, accepted: &[i32]) -> GatewayResult<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.git_binary);
        cmd.arg("-C").arg(&self.repo)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0");
        debug!(operation, command = ?cmd, "running git");

        let output = cmd.output()
            .map_err(|e| GatewayFailure::new(operation, None, e.to_string()))?;

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&stderr);
        }

        if output.status.code().is_some_and(|code| accepted.contains(&code)) {
            Ok(text)
        } else {
            warn!(operation, code = ?output.status.code(), "git exited unsuccessfully");
            Err(GatewayFailure::new(operation, output.status.code(), text))
        }
    }
}

impl StashBackend for GitCli {
    fn list_stashes(&self) -> GatewayResult<Vec<StashEntry>> {
        let out = self.run("stash list", ["stash", "list", "--pretty=format:%gd|%gs|%cr"])?;
        Ok(parse_stash_list(&out))
    }

    fn show_stash_diff(&self, reference: &str) -> GatewayResult<String> {
        self.run("stash show", ["stash", "show", "-p", "--color=always", reference])
    }

    fn drop_stash(&self, reference: &str) -> GatewayResult<String> {
        self.run("stash drop", ["stash", "drop", reference])
    }

    fn apply_stash(&self, reference: &str) -> GatewayResult<String> {
        self.run("stash apply", ["stash", "apply", reference])
    }

    fn scan_working_tree(&self) -> GatewayResult<Vec<FileChange>> {
        let out = self.run(
            "status",
            ["-c", "core.quotePath=false", "status", "--porcelain", "--untracked-files=all"],
        )?;
        Ok(parse_status(&out))
    }

    fn diff_file(&self, path: &str, staged: bool) -> GatewayResult<String> {
        if !staged && !self.untracked_among(&[path])?.is_empty() {
            // Exit status 1 only means the two sides differ.
            return self.run_accepting(
                "diff",
                ["diff", "--color=always", "--no-index", "--", NULL_DEVICE, path],
                &[0, 1],
            );
        }
        let mut args = vec!["diff", "--color=always"];
        if staged {
            args.push("--cached");
        }
        args.extend(["--", path]);
        self.run("diff", args)
    }

    fn create_stash(&self, paths: &[String], message: &str) -> GatewayResult<String> {
        let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
        let mut args: Vec<&str> = vec!["stash", "push"];
        if !self.untracked_among(&paths)?.is_empty() {
            args.push("--include-untracked");
        }
        args.extend(["-m", message, "--"]);
        args.extend(&paths);
        self.run("stash push", args)
    }

    fn discard_tracked(&self) -> GatewayResult<String> {
        self.run("reset", ["reset", "--hard"])
    }

    fn remove_untracked(&self) -> GatewayResult<String> {
        self.run("clean", ["clean", "-fd"])
    }
}

impl GitCli {
    /// The subset of `paths` git does not track yet (ignored files excluded).
    fn untracked_among(&self, paths: &[&str]) -> GatewayResult<Vec<String>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        let mut args = vec!["ls-files", "-z", "--others", "--exclude-standard", "--"];
        args.extend(paths);
        let out = self.run("ls-files", args)?;
        Ok(out.split('\0').filter(|p| !p.is_empty()).map(str::to_string).collect())
    }
}

/// Parses `ref|message|age` records. Records without all three fields are
/// skipped.
pub fn parse_stash_list(output: &str) -> Vec<StashEntry> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '|');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(reference), Some(message), Some(age)) => Some(StashEntry {
                    reference: reference.to_string(),
                    message: message.to_string(),
                    relative_age: age.to_string(),
                }),
                _ => {
                    debug!(line, "skipping malformed stash record");
                    None
                }
            }
        })
        .collect()
}

/// Parses `git status --porcelain` output. A path changed in both the index
/// and the worktree yields one record per side.
pub fn parse_status(output: &str) -> Vec<FileChange> {
    let mut changes = Vec::new();
    for line in output.lines() {
        if line.len() < MIN_STATUS_LINE {
            continue;
        }
        let mut chars = line.chars();
        let (Some(index), Some(worktree), Some(_)) = (chars.next(), chars.next(), chars.next()) else {
            continue;
        };
        let path = status_path(chars.as_str(), index);

        if index == '?' {
            changes.push(FileChange { path, status: '?', staged: false });
            continue;
        }
        if index != ' ' {
            changes.push(FileChange { path: path.clone(), status: index, staged: true });
        }
        if worktree != ' ' {
            changes.push(FileChange { path, status: worktree, staged: false });
        }
    }
    changes
}

fn status_path(raw: &str, index: char) -> String {
    let raw = match index {
        'R' | 'C' => raw.rsplit_once(" -> ").map(|(_, to)| to).unwrap_or(raw),
        _ => raw,
    };
    unquote(raw)
}

/// Undoes git's C-style path quoting, including `\NNN` octal byte escapes.
fn unquote(path: &str) -> String {
    let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
        return path.to_string();
    };
    let mut bytes = Vec::with_capacity(inner.len());
    let mut rest = inner.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        rest = tail;
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        let octal = rest.iter().take(3).take_while(|d| matches!(**d, b'0'..=b'7')).count();
        if octal == 3 {
            let value = rest[..3].iter().fold(0u8, |acc, d| acc.wrapping_mul(8).wrapping_add(d - b'0'));
            bytes.push(value);
            rest = &rest[3..];
            continue;
        }
        let Some((&escaped, tail)) = rest.split_first() else {
            bytes.push(b'\\');
            break;
        };
        rest = tail;
        bytes.push(match escaped {
            b't' => b'\t',
            b'n' => b'\n',
            other => other,
        });
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
