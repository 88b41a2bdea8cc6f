//! Voice command dispatch.

use crate::events::UserAction;

/// Phrases checked in priority order; the first contained phrase wins.
const PHRASES: &[(&str, VoiceCommandKind)] = &[
    ("go to", VoiceCommandKind::GoTo),
    ("refresh", VoiceCommandKind::Refresh),
    ("back", VoiceCommandKind::Back),
    ("forward", VoiceCommandKind::Forward),
    ("zoom in", VoiceCommandKind::ZoomIn),
    ("zoom out", VoiceCommandKind::ZoomOut),
    ("read aloud", VoiceCommandKind::ReadAloud),
    ("summarize", VoiceCommandKind::Summarize),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VoiceCommandKind {
    GoTo,
    Refresh,
    Back,
    Forward,
    ZoomIn,
    ZoomOut,
    ReadAloud,
    Summarize,
}

/// Controller action selected by a recognized phrase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoiceCommand {
    /// Navigate to the literal text following "go to".
    GoTo(String),
    Refresh,
    Back,
    Forward,
    ZoomIn,
    ZoomOut,
    ReadAloud,
    Summarize,
    Unrecognized,
}

impl VoiceCommand {
    /// Map a recognized phrase to a command.
    ///
    /// Matching is substring containment on the lower-cased phrase. For "go
    /// to", everything after the first occurrence is the target, verbatim
    /// apart from surrounding whitespace.
    pub fn parse(phrase: &str) -> Self {
        let phrase = phrase.to_lowercase();

        let Some((needle, kind)) = PHRASES.iter().find(|(needle, _)| phrase.contains(needle))
        else {
            return VoiceCommand::Unrecognized;
        };

        match kind {
            VoiceCommandKind::GoTo => {
                let start = phrase.find(needle).map(|i| i + needle.len()).unwrap_or(0);
                VoiceCommand::GoTo(phrase[start..].trim().to_string())
            }
            VoiceCommandKind::Refresh => VoiceCommand::Refresh,
            VoiceCommandKind::Back => VoiceCommand::Back,
            VoiceCommandKind::Forward => VoiceCommand::Forward,
            VoiceCommandKind::ZoomIn => VoiceCommand::ZoomIn,
            VoiceCommandKind::ZoomOut => VoiceCommand::ZoomOut,
            VoiceCommandKind::ReadAloud => VoiceCommand::ReadAloud,
            VoiceCommandKind::Summarize => VoiceCommand::Summarize,
        }
    }

    /// The action to dispatch. `None` for an unrecognized phrase.
    pub fn action(self) -> Option<UserAction> {
        let action = match self {
            VoiceCommand::GoTo(target) => UserAction::Navigate(target),
            VoiceCommand::Refresh => UserAction::Refresh,
            VoiceCommand::Back => UserAction::Back,
            VoiceCommand::Forward => UserAction::Forward,
            VoiceCommand::ZoomIn => UserAction::ZoomIn,
            VoiceCommand::ZoomOut => UserAction::ZoomOut,
            VoiceCommand::ReadAloud => UserAction::ReadAloud,
            VoiceCommand::Summarize => UserAction::Summarize,
            VoiceCommand::Unrecognized => return None,
        };
        Some(action)
    }
}
