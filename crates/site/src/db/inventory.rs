//! `PostgreSQL` classification and inventory store.

use async_trait::async_trait;
use sqlx::PgPool;

use cse_motors_core::{ClassificationId, InventoryId};

use super::{InventoryStore, RepositoryError, map_write_error};
use crate::models::{Classification, Vehicle, VehicleDraft};

/// Columns selected for every [`Vehicle`] read, joined to its classification.
const VEHICLE_COLUMNS: &str = r"
    i.inv_id, i.inv_make, i.inv_model, i.inv_year, i.inv_description,
    i.inv_image, i.inv_thumbnail, i.inv_price, i.inv_miles, i.inv_color,
    i.classification_id, c.classification_name
";

/// Inventory store backed by the `classification` and `inventory` tables.
#[derive(Debug, Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn get_classifications(&self) -> Result<Vec<Classification>, RepositoryError> {
        let rows = sqlx::query_as::<_, Classification>(
            "SELECT classification_id, classification_name FROM classification ORDER BY classification_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_classification_by_id(
        &self,
        id: ClassificationId,
    ) -> Result<Option<Classification>, RepositoryError> {
        let row = sqlx::query_as::<_, Classification>(
            "SELECT classification_id, classification_name FROM classification WHERE classification_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_inventory_by_classification_id(
        &self,
        id: ClassificationId,
    ) -> Result<Vec<Vehicle>, RepositoryError> {
        let sql = format!(
            "SELECT {VEHICLE_COLUMNS}
             FROM inventory AS i
             JOIN classification AS c ON i.classification_id = c.classification_id
             WHERE i.classification_id = $1
             ORDER BY i.inv_make, i.inv_model"
        );
        let rows = sqlx::query_as::<_, Vehicle>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn get_inventory_by_id(
        &self,
        id: InventoryId,
    ) -> Result<Option<Vehicle>, RepositoryError> {
        let sql = format!(
            "SELECT {VEHICLE_COLUMNS}
             FROM inventory AS i
             JOIN classification AS c ON i.classification_id = c.classification_id
             WHERE i.inv_id = $1"
        );
        let row = sqlx::query_as::<_, Vehicle>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn register_classification(
        &self,
        name: &str,
    ) -> Result<Classification, RepositoryError> {
        sqlx::query_as::<_, Classification>(
            r"
            INSERT INTO classification (classification_name)
            VALUES ($1)
            RETURNING classification_id, classification_name
            ",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "classification already exists"))
    }

    async fn register_inventory(&self, draft: VehicleDraft) -> Result<Vehicle, RepositoryError> {
        let sql = format!(
            "WITH inserted AS (
                INSERT INTO inventory (
                    inv_make, inv_model, inv_year, inv_description, inv_image,
                    inv_thumbnail, inv_price, inv_miles, inv_color, classification_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
             )
             SELECT {VEHICLE_COLUMNS}
             FROM inserted AS i
             JOIN classification AS c ON i.classification_id = c.classification_id"
        );
        sqlx::query_as::<_, Vehicle>(&sql)
            .bind(&draft.inv_make)
            .bind(&draft.inv_model)
            .bind(draft.inv_year)
            .bind(&draft.inv_description)
            .bind(&draft.inv_image)
            .bind(&draft.inv_thumbnail)
            .bind(draft.inv_price)
            .bind(draft.inv_miles)
            .bind(&draft.inv_color)
            .bind(draft.classification_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "unknown classification"))
    }

    async fn update_inventory(
        &self,
        id: InventoryId,
        draft: VehicleDraft,
    ) -> Result<Vehicle, RepositoryError> {
        let sql = format!(
            "WITH updated AS (
                UPDATE inventory
                SET inv_make = $1, inv_model = $2, inv_year = $3, inv_description = $4,
                    inv_image = $5, inv_thumbnail = $6, inv_price = $7, inv_miles = $8,
                    inv_color = $9, classification_id = $10
                WHERE inv_id = $11
                RETURNING *
             )
             SELECT {VEHICLE_COLUMNS}
             FROM updated AS i
             JOIN classification AS c ON i.classification_id = c.classification_id"
        );
        sqlx::query_as::<_, Vehicle>(&sql)
            .bind(&draft.inv_make)
            .bind(&draft.inv_model)
            .bind(draft.inv_year)
            .bind(&draft.inv_description)
            .bind(&draft.inv_image)
            .bind(&draft.inv_thumbnail)
            .bind(draft.inv_price)
            .bind(draft.inv_miles)
            .bind(&draft.inv_color)
            .bind(draft.classification_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "unknown classification"))?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_inventory_item(&self, id: InventoryId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM inventory WHERE inv_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn check_existing_classification(&self, name: &str) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM classification WHERE lower(classification_name) = lower($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
