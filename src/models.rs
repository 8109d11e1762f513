use std::fmt;

/// Something that can be shown as a two-line entry in a list panel.
pub trait ListEntry {
    fn title(&self) -> String;
    fn subtitle(&self) -> String;
    /// Text a list filter matches against.
    fn filter_key(&self) -> String;
}

/// A saved stash as reported by `git stash list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashEntry {
    pub reference: String,
    pub message: String,
    pub relative_age: String,
}

impl ListEntry for StashEntry {
    fn title(&self) -> String {
        self.message.clone()
    }

    fn subtitle(&self) -> String {
        format!("{} · {}", self.reference, self.relative_age)
    }

    fn filter_key(&self) -> String {
        format!("{} {}", self.reference, self.message)
    }
}

/// One side (index or worktree) of a pending change to a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileChange {
    pub path: String,
    pub status: char,
    pub staged: bool,
}

impl ListEntry for FileChange {
    fn title(&self) -> String {
        self.path.clone()
    }

    fn subtitle(&self) -> String {
        let side = if self.staged { "staged" } else { "unstaged" };
        format!("{} {}", self.status, side)
    }

    fn filter_key(&self) -> String {
        self.path.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Explore,
    Build,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Explore => Mode::Build,
            Mode::Build => Mode::Explore,
        }
    }

    pub fn as_index(self) -> usize {
        match self {
            Mode::Explore => 0,
            Mode::Build => 1,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Explore => f.write_str("Explore"),
            Mode::Build => f.write_str("Build"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    None,
    DeleteConfirm,
    ApplyConfirm,
    StashMessage,
    RestoreConfirm,
}

impl Modal {
    pub fn is_open(self) -> bool {
        self != Modal::None
    }
}

/// Which panel receives up/down navigation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FocusArea {
    #[default]
    List,
    Diff,
}

impl FocusArea {
    pub fn other(self) -> Self {
        match self {
            FocusArea::List => FocusArea::Diff,
            FocusArea::Diff => FocusArea::List,
        }
    }
}
