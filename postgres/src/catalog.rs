//! Catalog backed by the `service_types` and `vehicle_preferences` tables.

use booking_core::catalog::{Catalog, CatalogAdmin, CatalogError, CatalogFuture, CatalogOrder};
use booking_core::types::{CatalogId, ServiceType, VehicleDraft, VehiclePreference};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// `PostgreSQL` catalog.
#[derive(Clone, Debug)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Catalog over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ServiceTypeRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<ServiceTypeRow> for ServiceType {
    fn from(row: ServiceTypeRow) -> Self {
        Self {
            id: CatalogId::from_uuid(row.id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    name: String,
    category: String,
    image: String,
    passengers: i32,
    luggage: i32,
    description: String,
    created_at: DateTime<Utc>,
}

impl From<VehicleRow> for VehiclePreference {
    fn from(row: VehicleRow) -> Self {
        Self {
            id: CatalogId::from_uuid(row.id),
            name: row.name,
            category: row.category,
            image: row.image,
            // The table rejects negative counts.
            passengers: u32::try_from(row.passengers).unwrap_or_default(),
            luggage: u32::try_from(row.luggage).unwrap_or_default(),
            description: row.description,
            created_at: row.created_at,
        }
    }
}

const SERVICE_COLUMNS: &str = "id, name, created_at";
const VEHICLE_COLUMNS: &str =
    "id, name, category, image, passengers, luggage, description, created_at";

const fn order_clause(order: CatalogOrder) -> &'static str {
    match order {
        CatalogOrder::ByName => "ORDER BY name ASC",
        CatalogOrder::NewestFirst => "ORDER BY created_at DESC, id DESC",
    }
}

fn count(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn catalog_error(op: &'static str, name: Option<&str>, err: sqlx::Error) -> CatalogError {
    match (&err, name) {
        (sqlx::Error::Database(db_err), Some(name)) if db_err.is_unique_violation() => {
            return CatalogError::DuplicateName(name.to_string());
        }
        _ => {}
    }
    tracing::error!(op, error = %err, "catalog query failed");
    metrics::counter!("booking.catalog.errors", "op" => op).increment(1);
    CatalogError::Storage(format!("Failed to {op}: {err}"))
}

impl Catalog for PgCatalog {
    fn service_type(&self, id: CatalogId) -> CatalogFuture<'_, Option<ServiceType>> {
        Box::pin(async move {
            let sql = format!("SELECT {SERVICE_COLUMNS} FROM service_types WHERE id = $1");
            let row: Option<ServiceTypeRow> = sqlx::query_as(&sql)
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| catalog_error("get service type", None, e))?;
            Ok(row.map(ServiceType::from))
        })
    }

    fn vehicle_preference(&self, id: CatalogId) -> CatalogFuture<'_, Option<VehiclePreference>> {
        Box::pin(async move {
            let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicle_preferences WHERE id = $1");
            let row: Option<VehicleRow> = sqlx::query_as(&sql)
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| catalog_error("get vehicle preference", None, e))?;
            Ok(row.map(VehiclePreference::from))
        })
    }

    fn service_type_named<'a>(&'a self, name: &'a str) -> CatalogFuture<'a, Option<ServiceType>> {
        Box::pin(async move {
            let sql = format!("SELECT {SERVICE_COLUMNS} FROM service_types WHERE name = $1");
            let row: Option<ServiceTypeRow> = sqlx::query_as(&sql)
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| catalog_error("find service type", None, e))?;
            Ok(row.map(ServiceType::from))
        })
    }

    fn vehicle_preference_named<'a>(
        &'a self,
        name: &'a str,
    ) -> CatalogFuture<'a, Option<VehiclePreference>> {
        Box::pin(async move {
            let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicle_preferences WHERE name = $1");
            let row: Option<VehicleRow> = sqlx::query_as(&sql)
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| catalog_error("find vehicle preference", None, e))?;
            Ok(row.map(VehiclePreference::from))
        })
    }

    fn service_types(&self, order: CatalogOrder) -> CatalogFuture<'_, Vec<ServiceType>> {
        Box::pin(async move {
            let sql = format!("SELECT {SERVICE_COLUMNS} FROM service_types {}", order_clause(order));
            let rows: Vec<ServiceTypeRow> = sqlx::query_as(&sql)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| catalog_error("list service types", None, e))?;
            Ok(rows.into_iter().map(ServiceType::from).collect())
        })
    }

    fn vehicle_preferences(&self, order: CatalogOrder) -> CatalogFuture<'_, Vec<VehiclePreference>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {VEHICLE_COLUMNS} FROM vehicle_preferences {}",
                order_clause(order)
            );
            let rows: Vec<VehicleRow> = sqlx::query_as(&sql)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| catalog_error("list vehicle preferences", None, e))?;
            Ok(rows.into_iter().map(VehiclePreference::from).collect())
        })
    }
}

impl CatalogAdmin for PgCatalog {
    fn create_service_type(&self, name: String) -> CatalogFuture<'_, ServiceType> {
        Box::pin(async move {
            let sql = format!(
                "INSERT INTO service_types (id, name) VALUES ($1, $2) RETURNING {SERVICE_COLUMNS}"
            );
            let row: ServiceTypeRow = sqlx::query_as(&sql)
                .bind(Uuid::new_v4())
                .bind(&name)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| catalog_error("create service type", Some(&name), e))?;
            tracing::info!(%name, "service type created");
            Ok(row.into())
        })
    }

    fn rename_service_type(
        &self,
        id: CatalogId,
        name: String,
    ) -> CatalogFuture<'_, Option<ServiceType>> {
        Box::pin(async move {
            let sql = format!(
                "UPDATE service_types SET name = $2, updated_at = now() WHERE id = $1 \
                 RETURNING {SERVICE_COLUMNS}"
            );
            let row: Option<ServiceTypeRow> = sqlx::query_as(&sql)
                .bind(id.as_uuid())
                .bind(&name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| catalog_error("rename service type", Some(&name), e))?;
            Ok(row.map(ServiceType::from))
        })
    }

    fn delete_service_type(&self, id: CatalogId) -> CatalogFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM service_types WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| catalog_error("delete service type", None, e))?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn create_vehicle_preference(
        &self,
        draft: VehicleDraft,
    ) -> CatalogFuture<'_, VehiclePreference> {
        Box::pin(async move {
            let sql = format!(
                "INSERT INTO vehicle_preferences \
                 (id, name, category, image, passengers, luggage, description) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {VEHICLE_COLUMNS}"
            );
            let row: VehicleRow = sqlx::query_as(&sql)
                .bind(Uuid::new_v4())
                .bind(&draft.name)
                .bind(&draft.category)
                .bind(&draft.image)
                .bind(count(draft.passengers))
                .bind(count(draft.luggage))
                .bind(&draft.description)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| catalog_error("create vehicle preference", Some(&draft.name), e))?;
            tracing::info!(name = %draft.name, "vehicle preference created");
            Ok(row.into())
        })
    }

    fn update_vehicle_preference(
        &self,
        id: CatalogId,
        draft: VehicleDraft,
    ) -> CatalogFuture<'_, Option<VehiclePreference>> {
        Box::pin(async move {
            let sql = format!(
                "UPDATE vehicle_preferences SET name = $2, category = $3, image = $4, \
                 passengers = $5, luggage = $6, description = $7, updated_at = now() \
                 WHERE id = $1 RETURNING {VEHICLE_COLUMNS}"
            );
            let row: Option<VehicleRow> = sqlx::query_as(&sql)
                .bind(id.as_uuid())
                .bind(&draft.name)
                .bind(&draft.category)
                .bind(&draft.image)
                .bind(count(draft.passengers))
                .bind(count(draft.luggage))
                .bind(&draft.description)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| catalog_error("update vehicle preference", Some(&draft.name), e))?;
            Ok(row.map(VehiclePreference::from))
        })
    }

    fn delete_vehicle_preference(&self, id: CatalogId) -> CatalogFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM vehicle_preferences WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| catalog_error("delete vehicle preference", None, e))?;
            Ok(result.rows_affected() > 0)
        })
    }
}
