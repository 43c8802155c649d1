pub mod client;
pub mod payload;
pub mod travel_log;
pub mod user;

pub use client::{Client, ClientChanges, NewClient};
pub use travel_log::{NewTravelLog, TravelLog, TravelLogChanges};
pub use user::{NewUser, User, UserChanges};

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow};

use crate::database::SqlParam;

/// A table exposed through the five CRUD routes.
///
/// Implemented by the row type. The repository derives every statement from the
/// table, identity and column constants, and the handlers derive every message
/// from the labels, so the three resources share one code path.
pub trait Resource: for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static {
    /// Body accepted by POST
    type Create: DeserializeOwned + Default + Send + 'static;
    /// Body accepted by PUT
    type Update: DeserializeOwned + Default + Send + 'static;

    /// Route segment under /api
    const PATH: &'static str;
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    /// Writable columns, in parameter order
    const COLUMNS: &'static [&'static str];
    const REQUIRED: &'static [&'static str];

    /// "Client" in "Client not found"
    const LABEL: &'static str;
    /// "client" in "Invalid client ID"
    const ID_LABEL: &'static str;
    /// "client" in "Failed to create client"
    const SINGULAR: &'static str;
    /// "clients" in "Failed to fetch clients"
    const PLURAL: &'static str;
    /// Key holding the removed row in the delete response
    const DELETED_KEY: &'static str;

    /// Required columns that are absent (or blank) in a create body
    fn missing_fields(payload: &Self::Create) -> Vec<&'static str>;

    /// INSERT parameters, one per entry of COLUMNS
    fn create_params(payload: Self::Create) -> Vec<SqlParam>;

    /// UPDATE parameters, one per entry of COLUMNS; None keeps the stored value
    fn update_params(payload: Self::Update) -> Vec<SqlParam>;
}

/// Names of the fields whose presence flag is false
pub(crate) fn absent(fields: &[(&'static str, bool)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect()
}
