//! In-process stub of the tutoring API for verifier tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

type Reply = (StatusCode, Json<Value>);

/// Fault toggles for the stub
#[derive(Clone, Copy, Debug, Default)]
pub struct StubBehavior {
    pub fail_register: bool,
    pub leak_password: bool,
    pub accept_any_password: bool,
    pub lessons_as_object: bool,
    pub no_due_cards: bool,
    pub login_wrong_email: bool,
    pub login_leaks_password: bool,
    pub profile_wrong_id: bool,
    pub review_unsuccessful: bool,
}

#[derive(Clone, Debug)]
struct StubUser {
    id: String,
    email: String,
    name: String,
    password: String,
    level: String,
}

#[derive(Default)]
struct StubState {
    behavior: StubBehavior,
    users: Vec<StubUser>,
    next_id: u64,
}

impl StubState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

#[derive(Clone)]
struct Shared {
    state: Arc<Mutex<StubState>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Shared {
    fn record(&self, path: &str) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(path.to_string());
        }
    }
}

/// Handle to a running stub server
pub struct StubApi {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubApi {
    /// Bind to an ephemeral port and serve on the current runtime
    pub async fn spawn(behavior: StubBehavior) -> Self {
        let shared = Shared {
            state: Arc::new(Mutex::new(StubState {
                behavior,
                ..StubState::default()
            })),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = Arc::clone(&shared.requests);

        let app = Router::new()
            .route("/api/tutor", post(tutor))
            .route("/api/auth/register", post(register))
            .route("/api/auth/login", post(login))
            .route("/api/user/profile", get(profile))
            .route("/api/chat/sessions", post(create_session))
            .route("/api/chat/history", get(history))
            .route("/api/vocabulary/due", get(due_cards))
            .route("/api/vocabulary/review", post(review))
            .route("/api/lessons", get(lessons))
            .route("/api/pronunciation/analyze", post(pronunciation))
            .with_state(shared);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("stub bind");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    /// Paths requested so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map_or_else(|_| Vec::new(), |entries| entries.clone())
    }
}

fn user_json(user: &StubUser, leak_password: bool) -> Value {
    let mut value = json!({
        "_id": user.id,
        "email": user.email,
        "name": user.name,
        "cefrLevel": user.level,
        "dailyGoalMinutes": 15,
        "createdAt": "2026-10-18T09:00:00Z",
    });
    if leak_password {
        value["password"] = json!(user.password);
    }
    value
}

async fn tutor(State(shared): State<Shared>, Json(body): Json<Value>) -> Reply {
    shared.record("/api/tutor");
    let level = body["userLevel"].as_str().unwrap_or("B1").to_string();
    let exercise = if level == "C1" {
        Value::Null
    } else {
        json!({
            "type": "multiple_choice",
            "question": "Yesterday I ___ to school.",
            "options": ["go", "went", "gone"],
            "correct": 1,
            "explanation": "Past simple of 'go' is 'went'.",
        })
    };
    (
        StatusCode::OK,
        Json(json!({
            "reply": format!("Nice work! Here is some feedback for a {level} learner."),
            "corrections": [{
                "original": "I go to school yesterday",
                "corrected": "I went to school yesterday",
                "explanation": "Use the past simple for finished actions.",
                "rule": "past_simple",
            }],
            "miniExercise": exercise,
        })),
    )
}

async fn register(State(shared): State<Shared>, Json(body): Json<Value>) -> Reply {
    shared.record("/api/auth/register");
    let mut state = shared.state.lock().expect("stub state");
    if state.behavior.fail_register {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error" })),
        );
    }

    let id = state.next_id("u");
    let user = StubUser {
        id,
        email: body["email"].as_str().unwrap_or_default().to_string(),
        name: body["name"].as_str().unwrap_or_default().to_string(),
        password: body["password"].as_str().unwrap_or_default().to_string(),
        level: body["cefrLevel"].as_str().unwrap_or("A1").to_string(),
    };
    let response = json!({
        "user": user_json(&user, state.behavior.leak_password),
        "token": format!("token-{}", user.id),
    });
    state.users.push(user);
    (StatusCode::OK, Json(response))
}

async fn login(State(shared): State<Shared>, Json(body): Json<Value>) -> Reply {
    shared.record("/api/auth/login");
    let state = shared.state.lock().expect("stub state");
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let found = state.users.iter().find(|u| {
        u.email == email && (u.password == password || state.behavior.accept_any_password)
    });
    match found {
        Some(user) => {
            let behavior = state.behavior;
            let mut user_value =
                user_json(user, behavior.leak_password || behavior.login_leaks_password);
            if behavior.login_wrong_email {
                user_value["email"] = json!("someone.else@example.com");
            }
            (
                StatusCode::OK,
                Json(json!({
                    "user": user_value,
                    "token": format!("token-{}", user.id),
                })),
            )
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        ),
    }
}

async fn profile(
    State(shared): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    shared.record("/api/user/profile");
    let state = shared.state.lock().expect("stub state");
    let user_id = params.get("userId").cloned().unwrap_or_default();
    match state.users.iter().find(|u| u.id == user_id) {
        Some(user) => {
            let mut profile = user_json(user, false);
            if state.behavior.profile_wrong_id {
                profile["_id"] = json!("u999");
            }
            (StatusCode::OK, Json(profile))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        ),
    }
}

async fn create_session(State(shared): State<Shared>, Json(body): Json<Value>) -> Reply {
    shared.record("/api/chat/sessions");
    let id = shared.state.lock().expect("stub state").next_id("s");
    (
        StatusCode::OK,
        Json(json!({
            "_id": id,
            "userId": body["userId"],
            "level": body["level"],
            "topic": body["topic"],
            "createdAt": "2026-10-18T09:05:00Z",
        })),
    )
}

async fn history(
    State(shared): State<Shared>,
    Query(_params): Query<HashMap<String, String>>,
) -> Reply {
    shared.record("/api/chat/history");
    (StatusCode::OK, Json(json!([])))
}

async fn due_cards(
    State(shared): State<Shared>,
    Query(_params): Query<HashMap<String, String>>,
) -> Reply {
    shared.record("/api/vocabulary/due");
    let state = shared.state.lock().expect("stub state");
    if state.behavior.no_due_cards {
        return (StatusCode::OK, Json(json!([])));
    }
    (
        StatusCode::OK,
        Json(json!([
            { "_id": "c1", "term": "apple", "translation": "maçã" },
            { "_id": "c2", "term": "river", "translation": "rio" },
        ])),
    )
}

async fn review(State(shared): State<Shared>, Json(_body): Json<Value>) -> Reply {
    shared.record("/api/vocabulary/review");
    let unsuccessful = shared.state.lock().expect("stub state").behavior.review_unsuccessful;
    if unsuccessful {
        return (
            StatusCode::OK,
            Json(json!({ "success": false, "nextDue": null })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "nextDue": "2026-10-21T09:00:00Z" })),
    )
}

async fn lessons(
    State(shared): State<Shared>,
    Query(_params): Query<HashMap<String, String>>,
) -> Reply {
    shared.record("/api/lessons");
    let lessons = json!([
        { "title": "Past Simple", "level": "B1" },
        { "title": "Travel Vocabulary", "level": "B1" },
    ]);
    let lessons_as_object = shared.state.lock().expect("stub state").behavior.lessons_as_object;
    if lessons_as_object {
        return (StatusCode::OK, Json(json!({ "lessons": lessons })));
    }
    (StatusCode::OK, Json(lessons))
}

async fn pronunciation(State(shared): State<Shared>, Json(body): Json<Value>) -> Reply {
    shared.record("/api/pronunciation/analyze");
    let id = shared.state.lock().expect("stub state").next_id("p");
    (
        StatusCode::OK,
        Json(json!({
            "_id": id,
            "userId": body["userId"],
            "phrase": body["phrase"],
            "transcript": "hello how are you today",
            "score": 87,
            "tips": ["Stress the second syllable of 'today'."],
        })),
    )
}
