use std::fmt::{Display, Formatter};

/// Lifecycle state of one assignment editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorState {
    Idle,
    Loading,
    Editing,
    Saving,
    Success,
    Conflict,
    Error,
    Closed,
}

impl Display for EditorState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Editing => "editing",
            Self::Saving => "saving",
            Self::Success => "success",
            Self::Conflict => "conflict",
            Self::Error => "error",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// States reachable in one step from `from`.
pub fn allowed_transitions(from: EditorState) -> &'static [EditorState] {
    use EditorState::*;
    match from {
        Idle => &[Loading, Closed],
        Loading => &[Editing, Closed],
        Editing => &[Saving, Closed],
        Saving => &[Success, Conflict, Error, Closed],
        Conflict => &[Editing, Closed],
        Error => &[Editing, Closed],
        Success => &[Closed],
        Closed => &[],
    }
}

pub(super) fn is_allowed(from: EditorState, to: EditorState) -> bool {
    allowed_transitions(from).contains(&to)
}

#[cfg(test)]
mod tests {
    use super::{allowed_transitions, is_allowed, EditorState};

    #[test]
    fn conflict_and_error_only_return_to_editing_or_close() {
        for state in [EditorState::Conflict, EditorState::Error] {
            assert_eq!(
                allowed_transitions(state),
                &[EditorState::Editing, EditorState::Closed]
            );
        }
    }

    #[test]
    fn save_requires_editing() {
        assert!(is_allowed(EditorState::Editing, EditorState::Saving));
        assert!(!is_allowed(EditorState::Loading, EditorState::Saving));
        assert!(!is_allowed(EditorState::Conflict, EditorState::Saving));
    }

    #[test]
    fn closed_is_final() {
        assert!(allowed_transitions(EditorState::Closed).is_empty());
    }
}
