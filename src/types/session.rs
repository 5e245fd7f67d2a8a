//! Session record and its state-machine primitives
//!
//! Key invariants, enforced here and nowhere else:
//! - creator is fixed at construction
//! - opponent is set at most once and never cleared
//! - join token is present iff opponent is unset
//! - status only advances one lifecycle edge at a time
//! - at most one judgment per session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    Argument, ArgumentId, CaseArgument, CaseFile, EngineError, Judgment, SessionId,
    SessionStatus, User, UserId,
};

/// A debate instance between a creator and (eventually) an opponent
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    title: String,
    status: SessionStatus,
    creator: User,
    opponent: Option<User>,
    join_token: Option<String>,
    created_at: DateTime<Utc>,
    arguments: Vec<Argument>,
    judgment: Option<Judgment>,
    /// A judge call is in flight for this session
    judging: bool,
}

impl Session {
    /// New session awaiting an opponent
    pub fn new(id: SessionId, title: impl Into<String>, creator: User, join_token: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            status: SessionStatus::AwaitingOpponent,
            creator,
            opponent: None,
            join_token: Some(join_token.into()),
            created_at: Utc::now(),
            arguments: Vec::new(),
            judgment: None,
            judging: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn creator(&self) -> &User {
        &self.creator
    }

    pub fn opponent(&self) -> Option<&User> {
        self.opponent.as_ref()
    }

    pub fn join_token(&self) -> Option<&str> {
        self.join_token.as_deref()
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn judgment(&self) -> Option<&Judgment> {
        self.judgment.as_ref()
    }

    pub fn is_judging(&self) -> bool {
        self.judging
    }

    pub fn is_creator(&self, user: UserId) -> bool {
        self.creator.id == user
    }

    pub fn is_opponent(&self, user: UserId) -> bool {
        self.opponent.as_ref().is_some_and(|o| o.id == user)
    }

    pub fn is_participant(&self, user: UserId) -> bool {
        self.is_creator(user) || self.is_opponent(user)
    }

    /// Fails with `Forbidden` unless `user` is creator or opponent
    pub fn ensure_participant(&self, user: UserId) -> Result<(), EngineError> {
        if self.is_participant(user) {
            Ok(())
        } else {
            Err(EngineError::forbidden(format!(
                "user {} is not a participant in session {}",
                user, self.id
            )))
        }
    }

    /// Move along exactly one lifecycle edge
    fn advance(&mut self, next: SessionStatus) -> Result<(), EngineError> {
        if !self.status.can_advance_to(next) {
            return Err(EngineError::conflict(format!(
                "session {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    /// Join transition: set the opponent, burn the token, become active
    ///
    /// `token` must match the outstanding join token.
    pub(crate) fn admit_opponent(&mut self, token: &str, user: User) -> Result<(), EngineError> {
        if self.opponent.is_some() || self.status != SessionStatus::AwaitingOpponent {
            return Err(EngineError::conflict(format!(
                "session {} already has an opponent",
                self.id
            )));
        }
        if self.join_token.as_deref() != Some(token) {
            return Err(EngineError::not_found("join token", token));
        }
        if user.id == self.creator.id {
            return Err(EngineError::invalid_input("cannot join your own session"));
        }
        self.advance(SessionStatus::Active)?;
        self.opponent = Some(user);
        self.join_token = None;
        Ok(())
    }

    /// Whether `user` has at least one locked argument here
    pub fn has_locked(&self, user: UserId) -> bool {
        self.arguments
            .iter()
            .any(|a| a.author().id == user && a.is_locked())
    }

    /// Both creator and opponent have at least one locked argument
    pub fn both_sides_locked(&self) -> bool {
        match &self.opponent {
            Some(opponent) => self.has_locked(self.creator.id) && self.has_locked(opponent.id),
            None => false,
        }
    }

    pub(crate) fn append_argument(&mut self, argument: Argument) -> &Argument {
        debug_assert_eq!(argument.session_id(), self.id);
        self.arguments.push(argument);
        &self.arguments[self.arguments.len() - 1]
    }

    pub(crate) fn argument_mut(&mut self, id: ArgumentId) -> Option<&mut Argument> {
        self.arguments.iter_mut().find(|a| a.id() == id)
    }

    /// Enter `awaiting_judgment` if both sides are locked. Returns true on transition.
    pub(crate) fn settle_if_ready(&mut self) -> Result<bool, EngineError> {
        if self.status == SessionStatus::Active && self.both_sides_locked() {
            self.advance(SessionStatus::AwaitingJudgment)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Claim the right to call the judge. Only one claim may be outstanding.
    pub(crate) fn begin_judging(&mut self) -> Result<(), EngineError> {
        if self.judgment.is_some() {
            return Err(EngineError::conflict(format!(
                "session {} has already been judged",
                self.id
            )));
        }
        if self.status != SessionStatus::AwaitingJudgment {
            return Err(EngineError::conflict(format!(
                "session {} is {}, not awaiting_judgment",
                self.id, self.status
            )));
        }
        if self.judging {
            return Err(EngineError::conflict(format!(
                "judgment for session {} is already in progress",
                self.id
            )));
        }
        self.judging = true;
        Ok(())
    }

    /// Release a claim without recording anything
    pub(crate) fn abandon_judging(&mut self) {
        self.judging = false;
    }

    /// Record the verdict and enter the terminal state
    pub(crate) fn record_judgment(&mut self, verdict: String) -> Result<&Judgment, EngineError> {
        if self.judgment.is_some() {
            return Err(EngineError::conflict(format!(
                "session {} has already been judged",
                self.id
            )));
        }
        self.advance(SessionStatus::Judged)?;
        self.judging = false;
        let judgment = self.judgment.insert(Judgment::new(self.id, verdict));
        Ok(&*judgment)
    }

    /// Snapshot of the case for the judge: locked arguments only
    pub fn case_file(&self) -> CaseFile {
        CaseFile {
            session_id: self.id,
            title: self.title.clone(),
            creator: self.creator.name.clone(),
            opponent: self
                .opponent
                .as_ref()
                .map(|o| o.name.clone())
                .unwrap_or_default(),
            arguments: self
                .arguments
                .iter()
                .filter(|a| a.is_locked())
                .map(|a| CaseArgument {
                    author: a.author().name.clone(),
                    content: a.content().to_string(),
                    submitted_at: a.submitted_at(),
                })
                .collect(),
        }
    }

    /// Detail view for `requester`; the join link is only shown to the creator
    pub fn view_for(&self, requester: UserId) -> SessionView {
        let join_link = if self.status == SessionStatus::AwaitingOpponent && self.is_creator(requester) {
            self.join_token.clone()
        } else {
            None
        };
        SessionView {
            id: self.id,
            title: self.title.clone(),
            status: self.status,
            creator: self.creator.name.clone(),
            opponent: self.opponent.as_ref().map(|o| o.name.clone()),
            created_at: self.created_at,
            join_link,
            judgment: self.judgment.as_ref().map(|j| j.verdict.clone()),
        }
    }
}

/// Session as returned over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: SessionId,
    pub title: String,
    pub status: SessionStatus,
    pub creator: String,
    pub opponent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub join_link: Option<String>,
    pub judgment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User::new(1, "alice")
    }

    fn bob() -> User {
        User::new(2, "bob")
    }

    fn joined() -> Session {
        let mut session = Session::new(SessionId(1), "Tabs vs spaces", alice(), "tok");
        session.admit_opponent("tok", bob()).unwrap();
        session
    }

    fn locked_argument(session: &mut Session, id: u64, author: User) {
        let sid = session.id();
        session.append_argument(Argument::new(ArgumentId(id), sid, author, "text"));
        assert!(session.argument_mut(ArgumentId(id)).unwrap().lock());
    }

    #[test]
    fn test_new_session_holds_token() {
        let session = Session::new(SessionId(1), "t", alice(), "tok");
        assert_eq!(session.status(), SessionStatus::AwaitingOpponent);
        assert_eq!(session.join_token(), Some("tok"));
        assert!(session.opponent().is_none());
    }

    #[test]
    fn test_admit_clears_token_and_activates() {
        let session = joined();
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.join_token(), None);
        assert_eq!(session.opponent().map(|o| o.id), Some(UserId(2)));
    }

    #[test]
    fn test_second_admit_conflicts_and_keeps_opponent() {
        let mut session = joined();
        let err = session.admit_opponent("tok", User::new(3, "carol")).unwrap_err();
        assert_eq!(err.kind(), "conflict");
        assert_eq!(session.opponent().map(|o| o.id), Some(UserId(2)));
    }

    #[test]
    fn test_creator_cannot_admit_self() {
        let mut session = Session::new(SessionId(1), "t", alice(), "tok");
        let err = session.admit_opponent("tok", alice()).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
        assert_eq!(session.join_token(), Some("tok"));
    }

    #[test]
    fn test_settles_only_when_both_locked() {
        let mut session = joined();
        locked_argument(&mut session, 1, alice());
        assert!(!session.settle_if_ready().unwrap());
        assert_eq!(session.status(), SessionStatus::Active);

        locked_argument(&mut session, 2, bob());
        assert!(session.settle_if_ready().unwrap());
        assert_eq!(session.status(), SessionStatus::AwaitingJudgment);
        assert!(!session.settle_if_ready().unwrap());
    }

    #[test]
    fn test_judging_claim_is_exclusive() {
        let mut session = joined();
        locked_argument(&mut session, 1, alice());
        locked_argument(&mut session, 2, bob());
        session.settle_if_ready().unwrap();

        session.begin_judging().unwrap();
        assert_eq!(session.begin_judging().unwrap_err().kind(), "conflict");

        session.abandon_judging();
        session.begin_judging().unwrap();
        session.record_judgment("alice wins".into()).unwrap();
        assert_eq!(session.status(), SessionStatus::Judged);
        assert_eq!(session.begin_judging().unwrap_err().kind(), "conflict");
    }

    #[test]
    fn test_case_file_excludes_unlocked() {
        let mut session = joined();
        locked_argument(&mut session, 1, alice());
        session.append_argument(Argument::new(ArgumentId(2), SessionId(1), bob(), "draft"));
        locked_argument(&mut session, 3, bob());

        let case = session.case_file();
        assert_eq!(case.arguments.len(), 2);
        assert_eq!(case.arguments[0].author, "alice");
        assert_eq!(case.arguments[1].author, "bob");
        assert_eq!(case.opponent, "bob");
    }

    #[test]
    fn test_join_link_only_for_creator_while_open() {
        let session = Session::new(SessionId(1), "t", alice(), "tok");
        assert_eq!(session.view_for(UserId(1)).join_link.as_deref(), Some("tok"));
        assert_eq!(session.view_for(UserId(9)).join_link, None);
        assert_eq!(joined().view_for(UserId(1)).join_link, None);
    }
}
