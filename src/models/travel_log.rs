use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::payload::blank_as_none;
use super::{absent, Resource};
use crate::database::SqlParam;

/// One trip. `billing_period_id` points at a table owned by another system.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct TravelLog {
    pub travel_id: i32,
    pub client_id: Option<i32>,
    pub travel_date: NaiveDate,
    pub start_address: String,
    pub end_address: String,
    pub distance_km: Decimal,
    pub travel_reason: Option<String>,
    pub notes: Option<String>,
    pub billing_period_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewTravelLog {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub client_id: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub travel_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub start_address: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end_address: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub distance_km: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub travel_reason: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub billing_period_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TravelLogChanges {
    pub client_id: Option<i32>,
    pub travel_date: Option<NaiveDate>,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
    pub distance_km: Option<Decimal>,
    pub travel_reason: Option<String>,
    pub notes: Option<String>,
    pub billing_period_id: Option<i32>,
}

impl Resource for TravelLog {
    type Create = NewTravelLog;
    type Update = TravelLogChanges;

    const PATH: &'static str = "travel_logs";
    const TABLE: &'static str = "travel_logs";
    const ID_COLUMN: &'static str = "travel_id";
    const COLUMNS: &'static [&'static str] = &[
        "client_id",
        "travel_date",
        "start_address",
        "end_address",
        "distance_km",
        "travel_reason",
        "notes",
        "billing_period_id",
    ];
    const REQUIRED: &'static [&'static str] =
        &["travel_date", "start_address", "end_address", "distance_km"];

    const LABEL: &'static str = "Travel log";
    const ID_LABEL: &'static str = "travel";
    const SINGULAR: &'static str = "travel log";
    const PLURAL: &'static str = "travel logs";
    const DELETED_KEY: &'static str = "travel_log";

    fn missing_fields(payload: &NewTravelLog) -> Vec<&'static str> {
        absent(&[
            ("travel_date", payload.travel_date.is_some()),
            ("start_address", payload.start_address.is_some()),
            ("end_address", payload.end_address.is_some()),
            ("distance_km", payload.distance_km.is_some()),
        ])
    }

    fn create_params(payload: NewTravelLog) -> Vec<SqlParam> {
        vec![
            SqlParam::Int(payload.client_id),
            SqlParam::Date(payload.travel_date),
            SqlParam::Text(payload.start_address),
            SqlParam::Text(payload.end_address),
            SqlParam::Decimal(payload.distance_km),
            SqlParam::Text(payload.travel_reason),
            SqlParam::Text(payload.notes),
            SqlParam::Int(payload.billing_period_id),
        ]
    }

    fn update_params(payload: TravelLogChanges) -> Vec<SqlParam> {
        vec![
            SqlParam::Int(payload.client_id),
            SqlParam::Date(payload.travel_date),
            SqlParam::Text(payload.start_address),
            SqlParam::Text(payload.end_address),
            SqlParam::Decimal(payload.distance_km),
            SqlParam::Text(payload.travel_reason),
            SqlParam::Text(payload.notes),
            SqlParam::Int(payload.billing_period_id),
        ]
    }
}
