//! Room and booking storage.

use crate::db::{booking_store_error, decode_error};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use concierge_booking::model::{
    Booking, BookingRecord, BookingStatus, Room, RoomCategory, RoomType, RoomWithType, User,
};
use concierge_booking::store::{BookingStore, ReserveOutcome};
use concierge_booking::StoreError;
use concierge_core::id::{BookingId, RoomId, RoomTypeId, UserId};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

#[derive(sqlx::FromRow)]
struct RoomTypeRow {
    id: String,
    category: String,
    description: String,
    capacity: i32,
    cost_per_night: f64,
}

impl RoomTypeRow {
    fn try_into_room_type(self) -> Result<RoomType, sqlx::Error> {
        let id = RoomTypeId::from_str(&self.id)
            .map_err(|e| decode_error("room type id", &self.id, e))?;
        let category = RoomCategory::from_str(&self.category)
            .map_err(|e| decode_error("room category", &self.category, e))?;

        Ok(RoomType {
            id,
            category,
            description: self.description,
            capacity: self.capacity,
            cost_per_night: self.cost_per_night,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RoomWithTypeRow {
    room_id: String,
    room_no: i32,
    room_type_id: String,
    category: String,
    description: String,
    capacity: i32,
    cost_per_night: f64,
}

impl RoomWithTypeRow {
    fn try_into_room_with_type(self) -> Result<RoomWithType, sqlx::Error> {
        let room_id = RoomId::from_str(&self.room_id)
            .map_err(|e| decode_error("room id", &self.room_id, e))?;
        let room_type_id = RoomTypeId::from_str(&self.room_type_id)
            .map_err(|e| decode_error("room type id", &self.room_type_id, e))?;
        let category = RoomCategory::from_str(&self.category)
            .map_err(|e| decode_error("room category", &self.category, e))?;

        Ok(RoomWithType {
            room: Room {
                id: room_id,
                room_no: self.room_no,
                room_type_id,
            },
            room_type: RoomType {
                id: room_type_id,
                category,
                description: self.description,
                capacity: self.capacity,
                cost_per_night: self.cost_per_night,
            },
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: String,
    user_id: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
}

impl BookingRow {
    fn try_into_booking(self, rooms: Vec<RoomId>) -> Result<Booking, sqlx::Error> {
        let id =
            BookingId::from_str(&self.id).map_err(|e| decode_error("booking id", &self.id, e))?;
        let user_id = UserId::from_str(&self.user_id)
            .map_err(|e| decode_error("user id", &self.user_id, e))?;
        let status = BookingStatus::from_str(&self.status)
            .map_err(|e| decode_error("booking status", &self.status, e))?;

        Ok(Booking {
            id,
            user_id,
            rooms,
            check_in: self.check_in,
            check_out: self.check_out,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingRoomRow {
    booking_id: String,
    #[sqlx(flatten)]
    room: RoomWithTypeRow,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, sqlx::Error> {
        let id = UserId::from_str(&self.id).map_err(|e| decode_error("user id", &self.id, e))?;

        Ok(User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}

/// Queries against the room and booking tables.
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attaches the room detail rows to each booking.
    async fn load_records(&self, rows: Vec<BookingRow>) -> Result<Vec<BookingRecord>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let room_rows: Vec<BookingRoomRow> = sqlx::query_as(
            r#"
            SELECT br.booking_id, r.id AS room_id, r.room_no, r.room_type_id,
                   t.category, t.description, t.capacity, t.cost_per_night
            FROM booking_rooms br
            JOIN rooms r ON r.id = br.room_id
            JOIN room_types t ON t.id = r.room_type_id
            WHERE br.booking_id = ANY($1)
            ORDER BY r.room_no
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(booking_store_error)?;

        let mut rooms_by_booking: HashMap<String, Vec<RoomWithType>> = HashMap::new();
        for row in room_rows {
            let room = row.room.try_into_room_with_type().map_err(booking_store_error)?;
            rooms_by_booking.entry(row.booking_id).or_default().push(room);
        }

        rows.into_iter()
            .map(|row| {
                let rooms = rooms_by_booking.remove(&row.id).unwrap_or_default();
                let room_ids = rooms.iter().map(|r| r.room.id).collect();
                let booking = row.try_into_booking(room_ids).map_err(booking_store_error)?;
                Ok(BookingRecord { booking, rooms })
            })
            .collect()
    }

    async fn load_record(&self, row: BookingRow) -> Result<BookingRecord, StoreError> {
        let mut records = self.load_records(vec![row]).await?;
        records.pop().ok_or_else(|| StoreError::Query {
            reason: "booking row disappeared while loading rooms".to_string(),
        })
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn room_types(&self) -> Result<Vec<RoomType>, StoreError> {
        let rows: Vec<RoomTypeRow> = sqlx::query_as(
            r#"
            SELECT id, category, description, capacity, cost_per_night
            FROM room_types
            ORDER BY cost_per_night
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(booking_store_error)?;

        rows.into_iter()
            .map(|r| r.try_into_room_type().map_err(booking_store_error))
            .collect()
    }

    async fn rooms_by_category(
        &self,
        category: Option<RoomCategory>,
    ) -> Result<Vec<RoomWithType>, StoreError> {
        let rows: Vec<RoomWithTypeRow> = sqlx::query_as(
            r#"
            SELECT r.id AS room_id, r.room_no, r.room_type_id,
                   t.category, t.description, t.capacity, t.cost_per_night
            FROM rooms r
            JOIN room_types t ON t.id = r.room_type_id
            WHERE $1::TEXT IS NULL OR t.category = $1
            ORDER BY r.room_no
            "#,
        )
        .bind(category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(booking_store_error)?;

        rows.into_iter()
            .map(|r| r.try_into_room_with_type().map_err(booking_store_error))
            .collect()
    }

    async fn blocked_room_ids(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<HashSet<RoomId>, StoreError> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT br.room_id
            FROM booking_rooms br
            JOIN bookings b ON b.id = br.booking_id
            WHERE b.status <> 'Cancelled'
              AND b.check_in < $2
              AND b.check_out > $1
            "#,
        )
        .bind(check_in)
        .bind(check_out)
        .fetch_all(&self.pool)
        .await
        .map_err(booking_store_error)?;

        ids.iter()
            .map(|id| {
                RoomId::from_str(id)
                    .map_err(|e| booking_store_error(decode_error("room id", id, e)))
            })
            .collect()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(booking_store_error)?;

        row.map(|r| r.try_into_user().map_err(booking_store_error))
            .transpose()
    }

    async fn reserve_room(
        &self,
        user_id: UserId,
        room_id: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<ReserveOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(booking_store_error)?;

        // Lock the room row so concurrent reservations for it serialize.
        let locked: Option<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM rooms WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(room_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(booking_store_error)?;

        if locked.is_none() {
            return Err(StoreError::Query {
                reason: format!("room '{room_id}' does not exist"),
            });
        }

        let overlapping: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings b
            JOIN booking_rooms br ON br.booking_id = b.id
            WHERE br.room_id = $1
              AND b.status <> 'Cancelled'
              AND b.check_in < $3
              AND b.check_out > $2
            "#,
        )
        .bind(room_id.to_string())
        .bind(check_in)
        .bind(check_out)
        .fetch_one(&mut *tx)
        .await
        .map_err(booking_store_error)?;

        if overlapping > 0 {
            tx.rollback().await.map_err(booking_store_error)?;
            return Ok(ReserveOutcome::Unavailable);
        }

        let booking = Booking {
            id: BookingId::new(),
            user_id,
            rooms: vec![room_id],
            check_in,
            check_out,
            status: BookingStatus::Booked,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, check_in, check_out, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(booking.id.to_string())
        .bind(booking.user_id.to_string())
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await
        .map_err(booking_store_error)?;

        sqlx::query(
            r#"
            INSERT INTO booking_rooms (booking_id, room_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(booking.id.to_string())
        .bind(room_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(booking_store_error)?;

        tx.commit().await.map_err(booking_store_error)?;

        Ok(ReserveOutcome::Reserved(booking))
    }

    async fn bookings_for_user(&self, user_id: UserId) -> Result<Vec<BookingRecord>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, check_in, check_out, status, created_at
            FROM bookings
            WHERE user_id = $1
            ORDER BY check_in
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(booking_store_error)?;

        self.load_records(rows).await
    }

    async fn booking_for_user(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<Option<BookingRecord>, StoreError> {
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, check_in, check_out, status, created_at
            FROM bookings
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(booking_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(booking_store_error)?;

        match row {
            Some(row) => self.load_record(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn holds_booking_for_dates(
        &self,
        user_id: UserId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE user_id = $1
                  AND check_in = $2
                  AND check_out = $3
                  AND status <> 'Cancelled'
            )
            "#,
        )
        .bind(user_id.to_string())
        .bind(check_in)
        .bind(check_out)
        .fetch_one(&self.pool)
        .await
        .map_err(booking_store_error)?;

        Ok(exists)
    }

    async fn update_booking_dates(
        &self,
        booking_id: BookingId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<BookingRecord, StoreError> {
        let row: BookingRow = sqlx::query_as(
            r#"
            UPDATE bookings
            SET check_in = $2, check_out = $3
            WHERE id = $1
            RETURNING id, user_id, check_in, check_out, status, created_at
            "#,
        )
        .bind(booking_id.to_string())
        .bind(check_in)
        .bind(check_out)
        .fetch_one(&self.pool)
        .await
        .map_err(booking_store_error)?;

        self.load_record(row).await
    }

    async fn cancel_booking(&self, booking_id: BookingId) -> Result<BookingRecord, StoreError> {
        let row: BookingRow = sqlx::query_as(
            r#"
            UPDATE bookings
            SET status = $2
            WHERE id = $1
            RETURNING id, user_id, check_in, check_out, status, created_at
            "#,
        )
        .bind(booking_id.to_string())
        .bind(BookingStatus::Cancelled.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(booking_store_error)?;

        self.load_record(row).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_type_row_maps() {
        let row = RoomTypeRow {
            id: "rt_01ARZ3NDEKTSV4RRFFQ69G5T01".to_string(),
            category: "Standard".to_string(),
            description: "Cozy room.".to_string(),
            capacity: 2,
            cost_per_night: 100.0,
        };

        let room_type = row.try_into_room_type().unwrap();
        assert_eq!(room_type.category, RoomCategory::Standard);
        assert_eq!(room_type.capacity, 2);
    }

    #[test]
    fn unknown_category_fails_decode() {
        let row = RoomTypeRow {
            id: "rt_01ARZ3NDEKTSV4RRFFQ69G5T01".to_string(),
            category: "Penthouse".to_string(),
            description: "Nope.".to_string(),
            capacity: 2,
            cost_per_night: 100.0,
        };

        let err = row.try_into_room_type().unwrap_err();
        assert!(err.to_string().contains("Penthouse"));
    }

    #[test]
    fn booking_row_maps_with_rooms() {
        let row = BookingRow {
            id: "bkg_01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            user_id: "usr_01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            check_in: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2030, 1, 12).unwrap(),
            status: "Booked".to_string(),
            created_at: Utc::now(),
        };

        let room_id = RoomId::new();
        let booking = row.try_into_booking(vec![room_id]).unwrap();
        assert_eq!(booking.status, BookingStatus::Booked);
        assert_eq!(booking.rooms, vec![room_id]);
    }

    #[test]
    fn unknown_status_fails_decode() {
        let row = BookingRow {
            id: "bkg_01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            user_id: "usr_01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            check_in: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2030, 1, 12).unwrap(),
            status: "Pending".to_string(),
            created_at: Utc::now(),
        };

        let err = row.try_into_booking(Vec::new()).unwrap_err();
        assert!(matches!(err, sqlx::Error::Decode(_)));
    }
}
