//! Reservation store backed by the `reservations` table.

use booking_core::store::{ReservationStore, StoreError, StoreFuture, clamp_limit};
use booking_core::types::{
    CatalogId, Reservation, ReservationId, ReservationStatus, ResolvedReservation,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// `PostgreSQL` reservation store.
#[derive(Clone, Debug)]
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    /// Store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    name: String,
    email: String,
    phone: String,
    service_type_id: Uuid,
    vehicle_preference_id: Uuid,
    passengers: i16,
    bags: i16,
    pickup_at: DateTime<Utc>,
    pickup_address: String,
    destination_address: String,
    airline: Option<String>,
    flight_number: Option<String>,
    message: Option<String>,
}

impl ReservationRow {
    fn into_reservation(self) -> Result<Reservation, StoreError> {
        let corrupt = |what: &str| StoreError::Corrupt(format!("reservation {}: {what}", self.id));
        let status = self
            .status
            .parse::<ReservationStatus>()
            .map_err(|e| corrupt(&e.to_string()))?;
        let passengers = u8::try_from(self.passengers).map_err(|_| corrupt("passengers out of range"))?;
        let bags = u8::try_from(self.bags).map_err(|_| corrupt("bags out of range"))?;

        Ok(Reservation {
            id: ReservationId::from_uuid(self.id),
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            name: self.name,
            email: self.email,
            phone: self.phone,
            service_type_id: CatalogId::from_uuid(self.service_type_id),
            vehicle_preference_id: CatalogId::from_uuid(self.vehicle_preference_id),
            passengers,
            bags,
            pickup_at: self.pickup_at,
            pickup_address: self.pickup_address,
            destination_address: self.destination_address,
            airline: self.airline,
            flight_number: self.flight_number,
            message: self.message,
        })
    }
}

fn db_error(op: &'static str, err: &sqlx::Error) -> StoreError {
    tracing::error!(op, error = %err, "reservation query failed");
    metrics::counter!("booking.store.errors", "op" => op).increment(1);
    StoreError::Database(format!("Failed to {op} reservation: {err}"))
}

impl ReservationStore for PgReservationStore {
    fn create(&self, reservation: ResolvedReservation) -> StoreFuture<'_, Reservation> {
        Box::pin(async move {
            let request = reservation.request;
            let row: ReservationRow = sqlx::query_as(
                r"
                INSERT INTO reservations (
                    id, name, email, phone, service_type_id, vehicle_preference_id,
                    passengers, bags, pickup_at, pickup_address, destination_address,
                    airline, flight_number, message
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                RETURNING id, status, created_at, updated_at, name, email, phone,
                          service_type_id, vehicle_preference_id, passengers, bags,
                          pickup_at, pickup_address, destination_address,
                          airline, flight_number, message
                ",
            )
            .bind(Uuid::new_v4())
            .bind(&request.customer.name)
            .bind(&request.customer.email)
            .bind(&request.customer.phone)
            .bind(reservation.service_type_id.as_uuid())
            .bind(reservation.vehicle_preference_id.as_uuid())
            .bind(i16::from(request.passengers))
            .bind(i16::from(request.bags))
            .bind(request.pickup_at)
            .bind(&request.pickup_address)
            .bind(&request.destination_address)
            .bind(&request.airline)
            .bind(&request.flight_number)
            .bind(&request.message)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("create", &e))?;

            row.into_reservation()
        })
    }

    fn get(&self, id: ReservationId) -> StoreFuture<'_, Option<Reservation>> {
        Box::pin(async move {
            let row: Option<ReservationRow> = sqlx::query_as(
                r"
                SELECT id, status, created_at, updated_at, name, email, phone,
                       service_type_id, vehicle_preference_id, passengers, bags,
                       pickup_at, pickup_address, destination_address,
                       airline, flight_number, message
                FROM reservations
                WHERE id = $1
                ",
            )
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("get", &e))?;

            row.map(ReservationRow::into_reservation).transpose()
        })
    }

    fn list_recent(&self, limit: usize) -> StoreFuture<'_, Vec<Reservation>> {
        Box::pin(async move {
            let limit = i64::try_from(clamp_limit(limit)).unwrap_or(i64::MAX);
            let rows: Vec<ReservationRow> = sqlx::query_as(
                r"
                SELECT id, status, created_at, updated_at, name, email, phone,
                       service_type_id, vehicle_preference_id, passengers, bags,
                       pickup_at, pickup_address, destination_address,
                       airline, flight_number, message
                FROM reservations
                ORDER BY created_at DESC, id DESC
                LIMIT $1
                ",
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list", &e))?;

            rows.into_iter().map(ReservationRow::into_reservation).collect()
        })
    }

    fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                UPDATE reservations
                SET status = $2, updated_at = now()
                WHERE id = $1
                ",
            )
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("update", &e))?;

            Ok(result.rows_affected() > 0)
        })
    }
}
