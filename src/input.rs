use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::models::Modal;

/// What a key press means, independent of which list is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    DismissModal,
    ToggleMode,
    /// Enter: show a stash diff, (de)select a file, or submit the message.
    Confirm,
    /// Space: select a file or flip its diff between collapsed and expanded.
    ToggleExpand,
    Delete,
    Apply,
    Save,
    Restore,
    Copy,
    Affirm,
    Deny,
    Up,
    Down,
    PageUp,
    PageDown,
    SwitchFocus,
    Insert(char),
    Backspace,
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Maps a key to an action for the given modal. An open modal owns the
/// keyboard: navigation keys are dropped while one is shown.
pub fn map_key(modal: Modal, key: KeyEvent) -> Option<Action> {
    match modal {
        Modal::None => map_browse_key(key),
        Modal::StashMessage => map_message_key(key),
        Modal::DeleteConfirm | Modal::ApplyConfirm | Modal::RestoreConfirm => map_confirm_key(key),
    }
}

fn map_browse_key(key: KeyEvent) -> Option<Action> {
    if is_interrupt(&key) {
        return Some(Action::Quit);
    }
    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Tab => Action::ToggleMode,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Char(' ') => Action::ToggleExpand,
        KeyCode::Char('d') => Action::Delete,
        KeyCode::Char('a') => Action::Apply,
        KeyCode::Char('s') | KeyCode::Char('S') => Action::Save,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restore,
        KeyCode::Char('c') => Action::Copy,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => Action::SwitchFocus,
        _ => return None,
    };
    Some(action)
}

fn map_confirm_key(key: KeyEvent) -> Option<Action> {
    if is_interrupt(&key) {
        return Some(Action::DismissModal);
    }
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Affirm),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::Deny),
        KeyCode::Char('q') => Some(Action::DismissModal),
        _ => None,
    }
}

// The text field takes every printable key, `q` included.
fn map_message_key(key: KeyEvent) -> Option<Action> {
    if is_interrupt(&key) {
        return Some(Action::DismissModal);
    }
    match key.code {
        KeyCode::Esc => Some(Action::DismissModal),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Insert(c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl_c() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
    }

    #[test]
    fn quit_without_modal_dismiss_with_modal() {
        assert_eq!(map_key(Modal::None, key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(map_key(Modal::None, ctrl_c()), Some(Action::Quit));
        assert_eq!(map_key(Modal::DeleteConfirm, key(KeyCode::Char('q'))), Some(Action::DismissModal));
        assert_eq!(map_key(Modal::RestoreConfirm, ctrl_c()), Some(Action::DismissModal));
        assert_eq!(map_key(Modal::StashMessage, ctrl_c()), Some(Action::DismissModal));
    }

    #[test]
    fn plain_c_copies_but_ctrl_c_quits() {
        assert_eq!(map_key(Modal::None, key(KeyCode::Char('c'))), Some(Action::Copy));
        assert_eq!(map_key(Modal::None, ctrl_c()), Some(Action::Quit));
    }

    #[test]
    fn confirm_modals_take_yes_and_no_only() {
        for modal in [Modal::DeleteConfirm, Modal::ApplyConfirm, Modal::RestoreConfirm] {
            assert_eq!(map_key(modal, key(KeyCode::Char('y'))), Some(Action::Affirm));
            assert_eq!(map_key(modal, key(KeyCode::Char('Y'))), Some(Action::Affirm));
            assert_eq!(map_key(modal, key(KeyCode::Char('n'))), Some(Action::Deny));
            assert_eq!(map_key(modal, key(KeyCode::Char('N'))), Some(Action::Deny));
            assert_eq!(map_key(modal, key(KeyCode::Esc)), Some(Action::Deny));
            assert_eq!(map_key(modal, key(KeyCode::Down)), None);
            assert_eq!(map_key(modal, key(KeyCode::Tab)), None);
        }
    }

    #[test]
    fn message_modal_forwards_text_keys() {
        assert_eq!(map_key(Modal::StashMessage, key(KeyCode::Char('q'))), Some(Action::Insert('q')));
        assert_eq!(map_key(Modal::StashMessage, key(KeyCode::Char('y'))), Some(Action::Insert('y')));
        assert_eq!(map_key(Modal::StashMessage, key(KeyCode::Backspace)), Some(Action::Backspace));
        assert_eq!(map_key(Modal::StashMessage, key(KeyCode::Enter)), Some(Action::Confirm));
        assert_eq!(map_key(Modal::StashMessage, key(KeyCode::Esc)), Some(Action::DismissModal));
        assert_eq!(map_key(Modal::StashMessage, key(KeyCode::Up)), None);
    }

    #[test]
    fn browse_keys() {
        assert_eq!(map_key(Modal::None, key(KeyCode::Tab)), Some(Action::ToggleMode));
        assert_eq!(map_key(Modal::None, key(KeyCode::Enter)), Some(Action::Confirm));
        assert_eq!(map_key(Modal::None, key(KeyCode::Char(' '))), Some(Action::ToggleExpand));
        assert_eq!(map_key(Modal::None, key(KeyCode::Char('S'))), Some(Action::Save));
        assert_eq!(map_key(Modal::None, key(KeyCode::Char('R'))), Some(Action::Restore));
        assert_eq!(map_key(Modal::None, key(KeyCode::Char('j'))), Some(Action::Down));
        assert_eq!(map_key(Modal::None, key(KeyCode::Right)), Some(Action::SwitchFocus));
        assert_eq!(map_key(Modal::None, key(KeyCode::Char('y'))), None);
    }
}
