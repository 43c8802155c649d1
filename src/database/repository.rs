use std::marker::PhantomData;

use crate::database::manager::{DatabaseError, DatabaseManager, SqlParam};
use crate::models::Resource;

/// Runs the five CRUD statements for one resource
pub struct Repository<R> {
    db: DatabaseManager,
    _phantom: PhantomData<R>,
}

impl<R: Resource> Repository<R> {
    pub fn new(db: DatabaseManager) -> Self {
        Self {
            db,
            _phantom: PhantomData,
        }
    }

    pub async fn select_all(&self) -> Result<Vec<R>, DatabaseError> {
        Ok(self.db.query::<R>(&select_all_sql::<R>(), vec![]).await?.rows)
    }

    pub async fn select_one(&self, id: i32) -> Result<Option<R>, DatabaseError> {
        let result = self.db.query::<R>(&select_one_sql::<R>(), vec![SqlParam::Int(Some(id))]).await?;
        Ok(result.into_first())
    }

    pub async fn insert(&self, params: Vec<SqlParam>) -> Result<R, DatabaseError> {
        self.db
            .query::<R>(&insert_sql::<R>(), params)
            .await?
            .into_first()
            .ok_or_else(|| DatabaseError::QueryError(format!("INSERT into {} returned no row", R::TABLE)))
    }

    /// Returns None when no row has the identity
    pub async fn update(&self, id: i32, mut params: Vec<SqlParam>) -> Result<Option<R>, DatabaseError> {
        params.push(SqlParam::Int(Some(id)));
        Ok(self.db.query::<R>(&update_sql::<R>(), params).await?.into_first())
    }

    /// Returns the removed row, or None when no row had the identity
    pub async fn delete(&self, id: i32) -> Result<Option<R>, DatabaseError> {
        let result = self.db.query::<R>(&delete_sql::<R>(), vec![SqlParam::Int(Some(id))]).await?;
        Ok(result.into_first())
    }
}

/// Quote SQL identifier
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn select_all_sql<R: Resource>() -> String {
    format!(
        "SELECT * FROM {} ORDER BY {}",
        quote_identifier(R::TABLE),
        quote_identifier(R::ID_COLUMN)
    )
}

fn select_one_sql<R: Resource>() -> String {
    format!(
        "SELECT * FROM {} WHERE {} = $1",
        quote_identifier(R::TABLE),
        quote_identifier(R::ID_COLUMN)
    )
}

fn insert_sql<R: Resource>() -> String {
    let columns: Vec<String> = R::COLUMNS.iter().map(|c| quote_identifier(c)).collect();
    let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        quote_identifier(R::TABLE),
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Every column is coalesced with its stored value, so a NULL parameter leaves it untouched
fn update_sql<R: Resource>() -> String {
    let assignments: Vec<String> = R::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let column = quote_identifier(c);
            format!("{} = COALESCE(${}, {})", column, i + 1, column)
        })
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING *",
        quote_identifier(R::TABLE),
        assignments.join(", "),
        quote_identifier(R::ID_COLUMN),
        R::COLUMNS.len() + 1
    )
}

fn delete_sql<R: Resource>() -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1 RETURNING *",
        quote_identifier(R::TABLE),
        quote_identifier(R::ID_COLUMN)
    )
}
