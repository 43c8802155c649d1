use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::payload::blank_as_none;
use super::{absent, Resource};
use crate::database::SqlParam;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Client {
    pub client_id: i32,
    pub client_name: String,
    pub email: String,
    pub mobile_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewClient {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub client_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub mobile_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientChanges {
    pub client_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
}

impl Resource for Client {
    type Create = NewClient;
    type Update = ClientChanges;

    const PATH: &'static str = "clients";
    const TABLE: &'static str = "clients";
    const ID_COLUMN: &'static str = "client_id";
    const COLUMNS: &'static [&'static str] = &["client_name", "email", "mobile_number"];
    const REQUIRED: &'static [&'static str] = &["client_name", "email"];

    const LABEL: &'static str = "Client";
    const ID_LABEL: &'static str = "client";
    const SINGULAR: &'static str = "client";
    const PLURAL: &'static str = "clients";
    const DELETED_KEY: &'static str = "client";

    fn missing_fields(payload: &NewClient) -> Vec<&'static str> {
        absent(&[
            ("client_name", payload.client_name.is_some()),
            ("email", payload.email.is_some()),
        ])
    }

    fn create_params(payload: NewClient) -> Vec<SqlParam> {
        vec![
            SqlParam::Text(payload.client_name),
            SqlParam::Text(payload.email),
            SqlParam::Text(payload.mobile_number),
        ]
    }

    fn update_params(payload: ClientChanges) -> Vec<SqlParam> {
        vec![
            SqlParam::Text(payload.client_name),
            SqlParam::Text(payload.email),
            SqlParam::Text(payload.mobile_number),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payload::parse_body;

    #[test]
    fn missing_and_blank_required_fields_are_reported() {
        let payload: NewClient = parse_body(br#"{"client_name":"","mobile_number":"555"}"#).unwrap();
        assert_eq!(Client::missing_fields(&payload), vec!["client_name", "email"]);

        let payload: NewClient = parse_body(br#"{"client_name":"Ola","email":"ola@x.no"}"#).unwrap();
        assert!(Client::missing_fields(&payload).is_empty());
    }

    #[test]
    fn absent_optional_field_binds_null() {
        let payload: NewClient = parse_body(br#"{"client_name":"Ola","email":"ola@x.no"}"#).unwrap();
        let params = Client::create_params(payload);
        assert_eq!(params.len(), Client::COLUMNS.len());
        assert_eq!(params[2], SqlParam::Text(None));
    }

    #[test]
    fn serializes_null_mobile_number() {
        let client = Client {
            client_id: 7,
            client_name: "Ola".into(),
            email: "ola@x.no".into(),
            mobile_number: None,
        };
        let value = serde_json::to_value(&client).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "client_id": 7,
                "client_name": "Ola",
                "email": "ola@x.no",
                "mobile_number": null
            })
        );
    }
}
