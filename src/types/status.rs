//! Session lifecycle states

use serde::{Deserialize, Serialize};

/// The four states of a debate session, in lifecycle order
///
/// `AwaitingOpponent → Active → AwaitingJudgment → Judged`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, join token outstanding
    AwaitingOpponent,
    /// Both parties present, arguments being submitted
    Active,
    /// Both sides have a locked argument
    AwaitingJudgment,
    /// Verdict recorded (terminal)
    Judged,
}

impl SessionStatus {
    /// The only state this one may advance to, if any
    pub fn successor(&self) -> Option<SessionStatus> {
        match self {
            SessionStatus::AwaitingOpponent => Some(SessionStatus::Active),
            SessionStatus::Active => Some(SessionStatus::AwaitingJudgment),
            SessionStatus::AwaitingJudgment => Some(SessionStatus::Judged),
            SessionStatus::Judged => None,
        }
    }

    /// Whether `self → next` is an edge of the lifecycle
    pub fn can_advance_to(&self, next: SessionStatus) -> bool {
        self.successor() == Some(next)
    }

    pub fn is_terminal(&self) -> bool {
        self.successor().is_none()
    }

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::AwaitingOpponent => "awaiting_opponent",
            SessionStatus::Active => "active",
            SessionStatus::AwaitingJudgment => "awaiting_judgment",
            SessionStatus::Judged => "judged",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SessionStatus; 4] = [
        SessionStatus::AwaitingOpponent,
        SessionStatus::Active,
        SessionStatus::AwaitingJudgment,
        SessionStatus::Judged,
    ];

    #[test]
    fn test_only_forward_single_steps_allowed() {
        for (i, from) in ALL.iter().enumerate() {
            for (j, to) in ALL.iter().enumerate() {
                assert_eq!(from.can_advance_to(*to), j == i + 1, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_judged_is_terminal() {
        assert!(SessionStatus::Judged.is_terminal());
        assert!(!SessionStatus::AwaitingJudgment.is_terminal());
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&SessionStatus::AwaitingJudgment).unwrap();
        assert_eq!(json, "\"awaiting_judgment\"");
        for status in ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
