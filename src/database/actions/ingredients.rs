use sqlx::{Pool, Postgres};

use crate::{error::StoreError, schema::Ingredient};

pub async fn list_ingredients(pool: &Pool<Postgres>) -> Result<Vec<Ingredient>, StoreError> {
    let rows: Vec<Ingredient> = sqlx::query_as("SELECT id, name FROM ingredients ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(StoreError::from_read)?;

    Ok(rows)
}

/// Inserts a catalog entry and returns the stored row. The name is expected to be case-folded.
pub async fn create_ingredient(name: &str, pool: &Pool<Postgres>) -> Result<Ingredient, StoreError> {
    let row: Ingredient =
        sqlx::query_as("INSERT INTO ingredients (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(pool)
            .await
            .map_err(StoreError::from_write)?;

    Ok(row)
}
