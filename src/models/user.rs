use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::payload::blank_as_none;
use super::{absent, Resource};
use crate::database::SqlParam;

/// Role assigned when a create body does not name one
pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub user_id: i32,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewUser {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserChanges {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<String>,
}

impl Resource for User {
    type Create = NewUser;
    type Update = UserChanges;

    const PATH: &'static str = "users";
    const TABLE: &'static str = "users";
    const ID_COLUMN: &'static str = "user_id";
    const COLUMNS: &'static [&'static str] = &["email", "display_name", "role"];
    const REQUIRED: &'static [&'static str] = &["email", "display_name"];

    const LABEL: &'static str = "User";
    const ID_LABEL: &'static str = "user";
    const SINGULAR: &'static str = "user";
    const PLURAL: &'static str = "users";
    const DELETED_KEY: &'static str = "user";

    fn missing_fields(payload: &NewUser) -> Vec<&'static str> {
        absent(&[
            ("email", payload.email.is_some()),
            ("display_name", payload.display_name.is_some()),
        ])
    }

    fn create_params(payload: NewUser) -> Vec<SqlParam> {
        let role = payload.role.unwrap_or_else(|| DEFAULT_ROLE.to_string());
        vec![
            SqlParam::Text(payload.email),
            SqlParam::Text(payload.display_name),
            SqlParam::Text(Some(role)),
        ]
    }

    fn update_params(payload: UserChanges) -> Vec<SqlParam> {
        vec![
            SqlParam::Text(payload.email),
            SqlParam::Text(payload.display_name),
            SqlParam::Text(payload.role),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payload::parse_body;

    #[test]
    fn role_defaults_to_user() {
        let payload: NewUser = parse_body(br#"{"email":"a@b.no","display_name":"A","role":""}"#).unwrap();
        let params = User::create_params(payload);
        assert_eq!(params[2], SqlParam::Text(Some("user".to_string())));
    }

    #[test]
    fn empty_update_keeps_everything() {
        let payload: UserChanges = parse_body(b"{}").unwrap();
        let params = User::update_params(payload);
        assert!(params.iter().all(|p| *p == SqlParam::Text(None)));
    }
}
