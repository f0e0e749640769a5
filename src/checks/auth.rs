//! Authentication checks
//!
//! Group 2: register, login, and rejected login. Registration captures the user id
//! every later group depends on.

use serde_json::{json, Value};
use tracing::{debug, info};

use super::{id_string, value_text};
use crate::contract::Endpoint;
use crate::executor::{ContractVerifier, EndpointCheck, Passed};
use crate::models::{CheckGroup, CheckResult, RunState};

pub(super) const REGISTER: &str = "Register";
pub(super) const LOGIN: &str = "Login";
pub(super) const INVALID_LOGIN: &str = "Invalid Login";

/// Register/login check for one test user
#[derive(Clone, Debug)]
pub struct AuthCheck {
    pub name: String,
    pub password: String,
    pub level: String,
    pub wrong_password: String,
}

impl Default for AuthCheck {
    fn default() -> Self {
        Self::new("Maria Silva", "securepass123", "B1")
    }
}

impl AuthCheck {
    pub fn new(
        name: impl Into<String>,
        password: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            level: level.into(),
            wrong_password: "wrongpassword".to_string(),
        }
    }

    pub async fn run(&self, verifier: &ContractVerifier, state: &mut RunState) -> Vec<CheckResult> {
        info!("Running Authentication checks for {}", state.test_user_email());

        vec![
            self.register(verifier, state).await,
            self.login(verifier, state).await,
            self.invalid_login(verifier, state).await,
        ]
    }

    async fn register(&self, verifier: &ContractVerifier, state: &mut RunState) -> CheckResult {
        let check = EndpointCheck::new(
            CheckGroup::Authentication.check_name(REGISTER),
            Endpoint::Register,
        )
        .json(json!({
            "email": state.test_user_email(),
            "name": self.name,
            "password": self.password,
            "cefrLevel": self.level,
        }));

        let outcome = verifier
            .check_endpoint(check, |body| {
                let user = &body["user"];
                let id = id_string(&user["_id"]).ok_or("Registered user has no usable _id")?;
                Ok(
                    Passed::new(format!("User registered successfully with ID: {id}")).details(
                        format!(
                            "User: {} ({}) - Level: {}",
                            value_text(&user["name"]),
                            value_text(&user["email"]),
                            value_text(&user["cefrLevel"])
                        ),
                    ),
                )
            })
            .await;

        if let Some(id) = outcome.passed_body().and_then(|body| id_string(&body["user"]["_id"])) {
            debug!("Captured test user id {}", id);
            state.capture_user_id(id);
        }

        outcome.result
    }

    async fn login(&self, verifier: &ContractVerifier, state: &RunState) -> CheckResult {
        let expected_email = state.test_user_email();
        let check = EndpointCheck::new(CheckGroup::Authentication.check_name(LOGIN), Endpoint::Login)
            .json(json!({
                "email": expected_email,
                "password": self.password,
            }));

        verifier
            .check_endpoint(check, |body| {
                let user = &body["user"];
                if user["email"].as_str() != Some(expected_email) {
                    return Err(format!(
                        "Login response email {} does not match {}",
                        value_text(&user["email"]),
                        expected_email
                    ));
                }
                Ok(Passed::new("User login successful").details(format!(
                    "Logged in as: {} ({})",
                    value_text(&user["name"]),
                    expected_email
                )))
            })
            .await
            .result
    }

    async fn invalid_login(&self, verifier: &ContractVerifier, state: &RunState) -> CheckResult {
        let check = EndpointCheck::new(
            CheckGroup::Authentication.check_name(INVALID_LOGIN),
            Endpoint::LoginRejected,
        )
        .json(json!({
            "email": state.test_user_email(),
            "password": self.wrong_password,
        }));

        verifier
            .check_endpoint(check, |body| {
                let text = match body {
                    Value::String(raw) => raw.clone(),
                    other => other.to_string(),
                };
                Ok(Passed::new("Invalid login correctly rejected with 401").details(text))
            })
            .await
            .result
    }
}
