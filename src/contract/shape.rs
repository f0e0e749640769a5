//! Shape validation of JSON response bodies against an endpoint contract

use serde_json::{Map, Value};
use thiserror::Error;

use super::endpoints::{BodyKind, EndpointContract, NestedRule};

/// Why a response body does not satisfy its contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeViolation {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Response is not a list (got {0})")]
    NotASequence(&'static str),

    #[error("Response is not an object (got {0})")]
    NotAnObject(&'static str),

    #[error("Field '{0}' is not a list")]
    FieldNotArray(String),

    #[error("Field '{0}' is not an object")]
    FieldNotObject(String),

    #[error("Item {field}[{index}] missing fields: {}", .missing.join(", "))]
    ItemMissingFields {
        field: String,
        index: usize,
        missing: Vec<String>,
    },

    #[error("Field '{field}' missing fields: {}", .missing.join(", "))]
    NestedMissingFields { field: String, missing: Vec<String> },

    #[error("Field '{field}' exposes credential field '{credential}'")]
    CredentialExposed { field: String, credential: String },
}

/// JSON kind name used in messages
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Names from `required` that are not keys of `object`, in declaration order.
///
/// A key present with a null value counts as present.
pub fn missing_fields(object: &Map<String, Value>, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|field| !object.contains_key(**field))
        .map(|field| field.to_string())
        .collect()
}

/// Missing fields of a value expected to be an object; a non-object misses all of them
fn missing_in(value: &Value, required: &[&str]) -> Vec<String> {
    match value.as_object() {
        Some(object) => missing_fields(object, required),
        None => required.iter().map(|f| f.to_string()).collect(),
    }
}

/// Validate `body` against `contract`.
///
/// Rules are applied in order: body kind, required top-level fields, then each nested
/// rule. The first violation wins.
pub fn validate(contract: &EndpointContract, body: &Value) -> Result<(), ShapeViolation> {
    match contract.body {
        BodyKind::Any => Ok(()),
        BodyKind::List => validate_list(contract, body),
        BodyKind::Object => {
            let object = body
                .as_object()
                .ok_or(ShapeViolation::NotAnObject(kind_of(body)))?;

            let missing = missing_fields(object, contract.required);
            if !missing.is_empty() {
                return Err(ShapeViolation::MissingFields(missing));
            }

            for rule in contract.nested {
                validate_nested(object, rule)?;
            }
            Ok(())
        }
    }
}

fn validate_list(contract: &EndpointContract, body: &Value) -> Result<(), ShapeViolation> {
    let items = body
        .as_array()
        .ok_or(ShapeViolation::NotASequence(kind_of(body)))?;

    if contract.item_fields.is_empty() {
        return Ok(());
    }

    for (index, item) in items.iter().enumerate() {
        let missing = missing_in(item, contract.item_fields);
        if !missing.is_empty() {
            return Err(ShapeViolation::ItemMissingFields {
                field: "body".to_string(),
                index,
                missing,
            });
        }
    }
    Ok(())
}

fn validate_nested(object: &Map<String, Value>, rule: &NestedRule) -> Result<(), ShapeViolation> {
    match *rule {
        NestedRule::Array { field } => match object.get(field) {
            Some(Value::Array(_)) => Ok(()),
            _ => Err(ShapeViolation::FieldNotArray(field.to_string())),
        },

        NestedRule::EachItem { field, required } => {
            let items = match object.get(field) {
                Some(Value::Array(items)) => items,
                _ => return Err(ShapeViolation::FieldNotArray(field.to_string())),
            };
            for (index, item) in items.iter().enumerate() {
                let missing = missing_in(item, required);
                if !missing.is_empty() {
                    return Err(ShapeViolation::ItemMissingFields {
                        field: field.to_string(),
                        index,
                        missing,
                    });
                }
            }
            Ok(())
        }

        NestedRule::OptionalObject { field, required } => match object.get(field) {
            None | Some(Value::Null) => Ok(()),
            Some(Value::Object(inner)) => {
                let missing = missing_fields(inner, required);
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(ShapeViolation::NestedMissingFields {
                        field: field.to_string(),
                        missing,
                    })
                }
            }
            Some(_) => Err(ShapeViolation::FieldNotObject(field.to_string())),
        },

        NestedRule::Object {
            field,
            required,
            forbidden,
        } => {
            let inner = match object.get(field) {
                Some(Value::Object(inner)) => inner,
                _ => return Err(ShapeViolation::FieldNotObject(field.to_string())),
            };
            let missing = missing_fields(inner, required);
            if !missing.is_empty() {
                return Err(ShapeViolation::NestedMissingFields {
                    field: field.to_string(),
                    missing,
                });
            }
            if let Some(credential) = forbidden.iter().find(|f| inner.contains_key(**f)) {
                return Err(ShapeViolation::CredentialExposed {
                    field: field.to_string(),
                    credential: credential.to_string(),
                });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Endpoint;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn missing_set(violation: ShapeViolation) -> BTreeSet<String> {
        match violation {
            ShapeViolation::MissingFields(fields)
            | ShapeViolation::NestedMissingFields {
                missing: fields, ..
            }
            | ShapeViolation::ItemMissingFields {
                missing: fields, ..
            } => fields.into_iter().collect(),
            other => panic!("unexpected violation: {other}"),
        }
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn tutor_reply() -> Value {
        json!({
            "reply": "Good effort!",
            "corrections": [{
                "original": "I go to school yesterday",
                "corrected": "I went to school yesterday",
                "explanation": "Use past tense",
                "rule": "Past Simple Tense"
            }],
            "miniExercise": {
                "type": "multiple_choice",
                "question": "Choose the correct past tense:",
                "options": ["I go", "I went"],
                "correct": 1,
                "explanation": "Past tense of 'go' is 'went'"
            }
        })
    }

    #[test]
    fn test_tutor_reply_valid() {
        assert_eq!(validate(Endpoint::Tutor.contract(), &tutor_reply()), Ok(()));
    }

    #[test]
    fn test_missing_fields_are_exact() {
        let body = json!({ "_id": "s1", "level": "B1" });
        let err = validate(Endpoint::CreateSession.contract(), &body).unwrap_err();
        assert_eq!(missing_set(err), set(&["userId", "topic", "createdAt"]));
    }

    #[test]
    fn test_missing_fields_message_lists_names() {
        let err = validate(Endpoint::ReviewCard.contract(), &json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: success, nextDue");
    }

    #[test]
    fn test_null_counts_as_present() {
        let body = json!({ "success": true, "nextDue": null });
        assert!(validate(Endpoint::ReviewCard.contract(), &body).is_ok());
    }

    #[test]
    fn test_mini_exercise_absent_or_null_is_accepted() {
        let mut body = tutor_reply();
        body["miniExercise"] = Value::Null;
        assert!(validate(Endpoint::Tutor.contract(), &body).is_ok());

        body.as_object_mut().unwrap().remove("miniExercise");
        assert!(validate(Endpoint::Tutor.contract(), &body).is_ok());
    }

    #[test]
    fn test_mini_exercise_malformed_fails() {
        let mut body = tutor_reply();
        body["miniExercise"] = json!({ "type": "multiple_choice", "question": "?" });
        let err = validate(Endpoint::Tutor.contract(), &body).unwrap_err();
        assert_eq!(
            missing_set(err),
            set(&["options", "correct", "explanation"])
        );
    }

    #[test]
    fn test_one_bad_correction_fails_whole_reply() {
        let mut body = tutor_reply();
        body["corrections"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "original": "x", "corrected": "y" }));
        let err = validate(Endpoint::Tutor.contract(), &body).unwrap_err();
        assert!(matches!(
            err,
            ShapeViolation::ItemMissingFields { index: 1, .. }
        ));
    }

    #[test]
    fn test_corrections_must_be_list() {
        let mut body = tutor_reply();
        body["corrections"] = json!("none");
        assert_eq!(
            validate(Endpoint::Tutor.contract(), &body),
            Err(ShapeViolation::FieldNotArray("corrections".to_string()))
        );
    }

    #[test]
    fn test_list_endpoints_reject_objects() {
        let body = json!({ "title": "Basic Greetings" });
        for endpoint in [Endpoint::Lessons, Endpoint::ChatHistory, Endpoint::DueCards] {
            assert_eq!(
                validate(endpoint.contract(), &body),
                Err(ShapeViolation::NotASequence("object")),
                "{endpoint}"
            );
        }
    }

    #[test]
    fn test_empty_list_is_valid() {
        assert!(validate(Endpoint::ChatHistory.contract(), &json!([])).is_ok());
        assert!(validate(Endpoint::DueCards.contract(), &json!([])).is_ok());
    }

    #[test]
    fn test_due_card_items_need_id_and_term() {
        let body = json!([{ "_id": "card1", "term": "apple" }, { "_id": "card2" }]);
        let err = validate(Endpoint::DueCards.contract(), &body).unwrap_err();
        assert_eq!(
            err,
            ShapeViolation::ItemMissingFields {
                field: "body".to_string(),
                index: 1,
                missing: vec!["term".to_string()],
            }
        );
    }

    #[test]
    fn test_registered_user_with_password_fails() {
        let body = json!({
            "user": {
                "_id": "u1",
                "email": "maria@example.com",
                "name": "Maria Silva",
                "cefrLevel": "B1",
                "dailyGoalMinutes": 15,
                "createdAt": "2024-01-01T00:00:00Z",
                "password": "securepass123"
            },
            "token": "mock-token"
        });
        assert_eq!(
            validate(Endpoint::Register.contract(), &body),
            Err(ShapeViolation::CredentialExposed {
                field: "user".to_string(),
                credential: "password".to_string(),
            })
        );
    }

    #[test]
    fn test_login_user_with_only_email_is_valid() {
        let body = json!({ "user": { "email": "a@example.com" }, "token": "t" });
        assert_eq!(validate(Endpoint::Login.contract(), &body), Ok(()));
    }

    #[test]
    fn test_login_user_without_email_fails() {
        let body = json!({ "user": { "_id": "u1", "name": "Maria Silva" }, "token": "t" });
        let err = validate(Endpoint::Login.contract(), &body).unwrap_err();
        assert_eq!(missing_set(err), set(&["email"]));
    }

    #[test]
    fn test_login_user_with_password_fails() {
        let body = json!({
            "user": { "email": "a@example.com", "password": "securepass123" },
            "token": "t"
        });
        assert_eq!(
            validate(Endpoint::Login.contract(), &body),
            Err(ShapeViolation::CredentialExposed {
                field: "user".to_string(),
                credential: "password".to_string(),
            })
        );
    }

    #[test]
    fn test_rejected_login_body_is_not_inspected() {
        assert!(validate(Endpoint::LoginRejected.contract(), &json!("Invalid password")).is_ok());
    }

    #[test]
    fn test_pronunciation_tips_must_be_list() {
        let body = json!({
            "_id": "p1",
            "userId": "u1",
            "phrase": "Hello",
            "transcript": "Hello",
            "score": 87,
            "tips": "speak slowly"
        });
        assert_eq!(
            validate(Endpoint::Pronunciation.contract(), &body),
            Err(ShapeViolation::FieldNotArray("tips".to_string()))
        );
    }

    #[test]
    fn test_object_endpoint_rejects_list() {
        assert_eq!(
            validate(Endpoint::Profile.contract(), &json!([])),
            Err(ShapeViolation::NotAnObject("list"))
        );
    }
}
