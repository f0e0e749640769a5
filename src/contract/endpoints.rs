//! Declarative endpoint contract table
//!
//! One entry per checked route: method, path, expected status and the shape rules
//! applied to a response body.

use serde::Serialize;
use std::fmt;

/// Status a check expects from the server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ExpectedStatus {
    /// Any 2xx status
    Success,
    /// Exactly this status code
    Exactly(u16),
}

impl ExpectedStatus {
    pub fn matches(&self, status_code: u16) -> bool {
        match self {
            ExpectedStatus::Success => (200..300).contains(&status_code),
            ExpectedStatus::Exactly(code) => *code == status_code,
        }
    }
}

impl fmt::Display for ExpectedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedStatus::Success => write!(f, "2xx"),
            ExpectedStatus::Exactly(code) => write!(f, "{code}"),
        }
    }
}

/// Top-level kind of a response body
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BodyKind {
    Object,
    List,
    /// Body is not inspected
    Any,
}

/// Structural rule applied to a field of an object body
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NestedRule {
    /// Field must be a JSON array
    Array { field: &'static str },
    /// Field must be an array whose every element carries `required`
    EachItem {
        field: &'static str,
        required: &'static [&'static str],
    },
    /// Field may be absent or null; otherwise it must be an object carrying `required`
    OptionalObject {
        field: &'static str,
        required: &'static [&'static str],
    },
    /// Field must be an object carrying `required` and none of `forbidden`
    Object {
        field: &'static str,
        required: &'static [&'static str],
        forbidden: &'static [&'static str],
    },
}

/// Contract for one endpoint
#[derive(Clone, Copy, Debug, Serialize)]
pub struct EndpointContract {
    pub method: &'static str,
    pub path: &'static str,
    pub expected: ExpectedStatus,
    pub body: BodyKind,
    /// Required top-level fields (object bodies)
    pub required: &'static [&'static str],
    /// Required fields of every element (list bodies)
    pub item_fields: &'static [&'static str],
    pub nested: &'static [NestedRule],
}

/// Credential field that must never be echoed back
pub const CREDENTIAL_FIELD: &str = "password";

const CORRECTION_FIELDS: &[&str] = &["original", "corrected", "explanation", "rule"];
const EXERCISE_FIELDS: &[&str] = &["type", "question", "options", "correct", "explanation"];
const REGISTERED_USER_FIELDS: &[&str] = &[
    "_id",
    "email",
    "name",
    "cefrLevel",
    "dailyGoalMinutes",
    "createdAt",
];

static TUTOR: EndpointContract = EndpointContract {
    method: "POST",
    path: "/tutor",
    expected: ExpectedStatus::Success,
    body: BodyKind::Object,
    required: &["reply", "corrections"],
    item_fields: &[],
    nested: &[
        NestedRule::EachItem {
            field: "corrections",
            required: CORRECTION_FIELDS,
        },
        NestedRule::OptionalObject {
            field: "miniExercise",
            required: EXERCISE_FIELDS,
        },
    ],
};

static REGISTER: EndpointContract = EndpointContract {
    method: "POST",
    path: "/auth/register",
    expected: ExpectedStatus::Success,
    body: BodyKind::Object,
    required: &["user", "token"],
    item_fields: &[],
    nested: &[NestedRule::Object {
        field: "user",
        required: REGISTERED_USER_FIELDS,
        forbidden: &[CREDENTIAL_FIELD],
    }],
};

static LOGIN: EndpointContract = EndpointContract {
    method: "POST",
    path: "/auth/login",
    expected: ExpectedStatus::Success,
    body: BodyKind::Object,
    required: &["user", "token"],
    item_fields: &[],
    nested: &[NestedRule::Object {
        field: "user",
        required: &["email"],
        forbidden: &[CREDENTIAL_FIELD],
    }],
};

static LOGIN_REJECTED: EndpointContract = EndpointContract {
    method: "POST",
    path: "/auth/login",
    expected: ExpectedStatus::Exactly(401),
    body: BodyKind::Any,
    required: &[],
    item_fields: &[],
    nested: &[],
};

static PROFILE: EndpointContract = EndpointContract {
    method: "GET",
    path: "/user/profile",
    expected: ExpectedStatus::Success,
    body: BodyKind::Object,
    required: &["_id", "name", "email"],
    item_fields: &[],
    nested: &[],
};

static CREATE_SESSION: EndpointContract = EndpointContract {
    method: "POST",
    path: "/chat/sessions",
    expected: ExpectedStatus::Success,
    body: BodyKind::Object,
    required: &["_id", "userId", "level", "topic", "createdAt"],
    item_fields: &[],
    nested: &[],
};

static CHAT_HISTORY: EndpointContract = EndpointContract {
    method: "GET",
    path: "/chat/history",
    expected: ExpectedStatus::Success,
    body: BodyKind::List,
    required: &[],
    item_fields: &[],
    nested: &[],
};

static DUE_CARDS: EndpointContract = EndpointContract {
    method: "GET",
    path: "/vocabulary/due",
    expected: ExpectedStatus::Success,
    body: BodyKind::List,
    required: &[],
    item_fields: &["_id", "term"],
    nested: &[],
};

static REVIEW_CARD: EndpointContract = EndpointContract {
    method: "POST",
    path: "/vocabulary/review",
    expected: ExpectedStatus::Success,
    body: BodyKind::Object,
    required: &["success", "nextDue"],
    item_fields: &[],
    nested: &[],
};

static LESSONS: EndpointContract = EndpointContract {
    method: "GET",
    path: "/lessons",
    expected: ExpectedStatus::Success,
    body: BodyKind::List,
    required: &[],
    item_fields: &["title"],
    nested: &[],
};

static PRONUNCIATION: EndpointContract = EndpointContract {
    method: "POST",
    path: "/pronunciation/analyze",
    expected: ExpectedStatus::Success,
    body: BodyKind::Object,
    required: &["_id", "userId", "phrase", "transcript", "score", "tips"],
    item_fields: &[],
    nested: &[NestedRule::Array { field: "tips" }],
};

/// Every endpoint the verifier checks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Tutor,
    Register,
    Login,
    LoginRejected,
    Profile,
    CreateSession,
    ChatHistory,
    DueCards,
    ReviewCard,
    Lessons,
    Pronunciation,
}

impl Endpoint {
    pub fn contract(&self) -> &'static EndpointContract {
        match self {
            Endpoint::Tutor => &TUTOR,
            Endpoint::Register => &REGISTER,
            Endpoint::Login => &LOGIN,
            Endpoint::LoginRejected => &LOGIN_REJECTED,
            Endpoint::Profile => &PROFILE,
            Endpoint::CreateSession => &CREATE_SESSION,
            Endpoint::ChatHistory => &CHAT_HISTORY,
            Endpoint::DueCards => &DUE_CARDS,
            Endpoint::ReviewCard => &REVIEW_CARD,
            Endpoint::Lessons => &LESSONS,
            Endpoint::Pronunciation => &PRONUNCIATION,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Tutor => "Tutor reply",
            Endpoint::Register => "Register",
            Endpoint::Login => "Login",
            Endpoint::LoginRejected => "Invalid login",
            Endpoint::Profile => "User profile",
            Endpoint::CreateSession => "Create chat session",
            Endpoint::ChatHistory => "Chat history",
            Endpoint::DueCards => "Due vocabulary cards",
            Endpoint::ReviewCard => "Review vocabulary card",
            Endpoint::Lessons => "Lessons",
            Endpoint::Pronunciation => "Pronunciation analysis",
        }
    }

    /// All endpoints in check order
    #[cfg(test)]
    pub fn all() -> Vec<Endpoint> {
        vec![
            Endpoint::Tutor,
            Endpoint::Register,
            Endpoint::Login,
            Endpoint::LoginRejected,
            Endpoint::Profile,
            Endpoint::CreateSession,
            Endpoint::ChatHistory,
            Endpoint::DueCards,
            Endpoint::ReviewCard,
            Endpoint::Lessons,
            Endpoint::Pronunciation,
        ]
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contract = self.contract();
        write!(f, "{} {}", contract.method, contract.path)
    }
}
