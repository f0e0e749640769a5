//! Run-scoped state threaded between dependent checks

use rand::Rng;
use std::fmt;

/// A vocabulary card captured from the due-cards listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DueCard {
    pub id: String,
    pub term: String,
}

/// Identifiers a dependent check may require
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prerequisite {
    UserId,
    SessionId,
    DueCard,
}

impl Prerequisite {
    /// Failure message recorded when the identifier was never captured
    pub fn missing_message(&self) -> &'static str {
        match self {
            Prerequisite::UserId => "no test user id available",
            Prerequisite::SessionId => "no chat session id available",
            Prerequisite::DueCard => "no due vocabulary card available",
        }
    }
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Prerequisite::UserId => "user id",
            Prerequisite::SessionId => "chat session id",
            Prerequisite::DueCard => "due card",
        };
        write!(f, "{label}")
    }
}

/// Mutable context for one verifier run.
///
/// Gating identifiers are write-once: the first successful capture wins and later
/// writes are ignored.
#[derive(Clone, Debug)]
pub struct RunState {
    test_user_email: String,
    user_id: Option<String>,
    session_id: Option<String>,
    due_card: Option<DueCard>,
}

impl RunState {
    /// New state with a freshly generated test-user email
    pub fn new() -> Self {
        let suffix: u32 = rand::rng().random();
        Self::with_email(format!("testuser_{suffix:08x}@example.com"))
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            test_user_email: email.into(),
            user_id: None,
            session_id: None,
            due_card: None,
        }
    }

    pub fn test_user_email(&self) -> &str {
        &self.test_user_email
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn due_card(&self) -> Option<&DueCard> {
        self.due_card.as_ref()
    }

    pub fn capture_user_id(&mut self, id: impl Into<String>) {
        if self.user_id.is_none() {
            self.user_id = Some(id.into());
        }
    }

    pub fn capture_session_id(&mut self, id: impl Into<String>) {
        if self.session_id.is_none() {
            self.session_id = Some(id.into());
        }
    }

    pub fn capture_due_card(&mut self, card: DueCard) {
        if self.due_card.is_none() {
            self.due_card = Some(card);
        }
    }

    /// First missing prerequisite among `required`, in the order given
    pub fn first_missing(&self, required: &[Prerequisite]) -> Option<Prerequisite> {
        required.iter().copied().find(|p| match p {
            Prerequisite::UserId => self.user_id.is_none(),
            Prerequisite::SessionId => self.session_id.is_none(),
            Prerequisite::DueCard => self.due_card.is_none(),
        })
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
