//! Todo resource types and payload validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A todo as stored by the upstream service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: i64,
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

/// A todo body as received from a client.
///
/// Fields stay raw JSON so validation can distinguish absent, falsy and
/// wrongly typed values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPayload {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub completed: Option<Value>,
}

/// Body sent upstream to create a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

/// A validated update. `id` addresses the item and is not part of the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdate {
    #[serde(skip)]
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

/// Client input that cannot be forwarded. The display text is the message
/// returned to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Missing Required data")]
    MissingRequiredData,

    #[error("Todo id required")]
    MissingId,
}

/// JavaScript-style truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A truthy integer identifier, accepted as a JSON number or a numeric string.
fn identifier(value: Option<&Value>) -> Option<i64> {
    let id = match value? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (id != 0).then_some(id)
}

fn path_identifier(path_id: &str) -> Option<i64> {
    identifier(Some(&Value::String(path_id.to_string())))
}

fn title(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

impl TodoPayload {
    /// Validate a create request: `userId` and `title` are required.
    pub fn into_new_todo(self) -> Result<NewTodo, PayloadError> {
        let user_id = identifier(self.user_id.as_ref());
        let title = title(self.title.as_ref());
        match (user_id, title) {
            (Some(user_id), Some(title)) => Ok(NewTodo {
                user_id,
                title,
                completed: false,
            }),
            _ => Err(PayloadError::MissingRequiredData),
        }
    }

    /// Validate an update request.
    ///
    /// `userId`, `title` and `id` are required and `completed` must be a
    /// JSON boolean. A path id takes the place of the body id; when both are
    /// given they must agree.
    pub fn into_update(self, path_id: Option<&str>) -> Result<TodoUpdate, PayloadError> {
        let body_id = identifier(self.id.as_ref());
        let id = match path_id {
            Some(path_id) => {
                let id = path_identifier(path_id).ok_or(PayloadError::MissingRequiredData)?;
                if self.id.is_some() && body_id != Some(id) {
                    return Err(PayloadError::MissingRequiredData);
                }
                id
            }
            None => body_id.ok_or(PayloadError::MissingRequiredData)?,
        };

        let user_id = identifier(self.user_id.as_ref()).ok_or(PayloadError::MissingRequiredData)?;
        let title = title(self.title.as_ref()).ok_or(PayloadError::MissingRequiredData)?;
        let completed = match self.completed {
            Some(Value::Bool(completed)) => completed,
            _ => return Err(PayloadError::MissingRequiredData),
        };

        Ok(TodoUpdate {
            id,
            user_id,
            title,
            completed,
        })
    }
}

/// Pick the id of the todo to delete from the path or, failing that, the body.
pub fn delete_target(
    path_id: Option<&str>,
    payload: Option<&TodoPayload>,
) -> Result<i64, PayloadError> {
    match path_id {
        Some(path_id) => path_identifier(path_id),
        None => payload.and_then(|p| identifier(p.id.as_ref())),
    }
    .ok_or(PayloadError::MissingId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> TodoPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_create_sets_completed_false() {
        let todo = payload(json!({"userId": 1, "title": "x"})).into_new_todo().unwrap();
        assert_eq!(
            todo,
            NewTodo {
                user_id: 1,
                title: "x".into(),
                completed: false
            }
        );
        assert_eq!(
            serde_json::to_value(&todo).unwrap(),
            json!({"userId": 1, "title": "x", "completed": false})
        );
    }

    #[test]
    fn test_create_requires_user_and_title() {
        for body in [
            json!({"userId": 1}),
            json!({"title": "x"}),
            json!({"userId": 0, "title": "x"}),
            json!({"userId": 1, "title": ""}),
            json!({"userId": null, "title": "x"}),
            json!({}),
        ] {
            assert_eq!(
                payload(body.clone()).into_new_todo(),
                Err(PayloadError::MissingRequiredData),
                "{body}"
            );
        }
    }

    #[test]
    fn test_create_ignores_client_completed() {
        let todo = payload(json!({"userId": "7", "title": "x", "completed": true}))
            .into_new_todo()
            .unwrap();
        assert_eq!(todo.user_id, 7);
        assert!(!todo.completed);
    }

    #[test]
    fn test_update_requires_boolean_completed() {
        let body = json!({"userId": 1, "id": 2, "title": "x", "completed": "true"});
        assert_eq!(
            payload(body).into_update(None),
            Err(PayloadError::MissingRequiredData)
        );

        let body = json!({"userId": 1, "id": 2, "title": "x"});
        assert_eq!(
            payload(body).into_update(None),
            Err(PayloadError::MissingRequiredData)
        );
    }

    #[test]
    fn test_update_accepts_false_completed() {
        let update = payload(json!({"userId": 1, "id": 2, "title": "x", "completed": false}))
            .into_update(None)
            .unwrap();
        assert_eq!(update.id, 2);
        assert!(!update.completed);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"userId": 1, "title": "x", "completed": false})
        );
    }

    #[test]
    fn test_update_path_id() {
        let body = json!({"userId": 1, "title": "x", "completed": true});
        assert_eq!(payload(body.clone()).into_update(Some("5")).unwrap().id, 5);
        assert_eq!(
            payload(body).into_update(Some("abc")),
            Err(PayloadError::MissingRequiredData)
        );

        let agreeing = json!({"userId": 1, "id": 5, "title": "x", "completed": true});
        assert_eq!(payload(agreeing).into_update(Some("5")).unwrap().id, 5);

        let disagreeing = json!({"userId": 1, "id": 6, "title": "x", "completed": true});
        assert_eq!(
            payload(disagreeing).into_update(Some("5")),
            Err(PayloadError::MissingRequiredData)
        );
    }

    #[test]
    fn test_delete_target() {
        assert_eq!(delete_target(Some("3"), None), Ok(3));
        assert_eq!(delete_target(None, Some(&payload(json!({"id": 4})))), Ok(4));
        assert_eq!(delete_target(None, Some(&payload(json!({})))), Err(PayloadError::MissingId));
        assert_eq!(delete_target(None, None), Err(PayloadError::MissingId));
        assert_eq!(delete_target(Some("0"), None), Err(PayloadError::MissingId));
    }

    #[test]
    fn test_todo_wire_format() {
        let todo: Todo = serde_json::from_value(json!({
            "userId": 1, "id": 1, "title": "delectus aut autem", "completed": false
        }))
        .unwrap();
        assert_eq!(todo.user_id, 1);
        assert_eq!(todo.title, "delectus aut autem");
    }
}
