use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::models::{Booking, ClassType, FitnessClass, NewBooking, NewFitnessClass};

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("{0}")]
    Validation(String),
    #[error("Fitness class {0} does not exist")]
    ClassNotFound(i64),
    #[error("No slots available for this class")]
    NoSlots,
    #[error("You already have a booking for this class")]
    DuplicateBooking,
    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Storage seam for the catalog, booking and lookup operations.
///
/// Callers pass `now` explicitly so time-dependent behaviour stays testable.
#[async_trait]
pub trait StudioRepository: Send + Sync {
    /// Classes starting strictly after `now`, earliest first.
    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<FitnessClass>, StudioError>;

    async fn find_class(&self, id: i64) -> Result<Option<FitnessClass>, StudioError>;

    async fn create_class(
        &self,
        class: NewFitnessClass,
        now: DateTime<Utc>,
    ) -> Result<FitnessClass, StudioError>;

    /// Reserves one slot and records the booking in a single transaction.
    async fn create_booking(
        &self,
        booking: NewBooking,
        now: DateTime<Utc>,
    ) -> Result<Booking, StudioError>;

    /// Active bookings for `email`, most recent first.
    async fn list_bookings_by_email(&self, email: &str) -> Result<Vec<Booking>, StudioError>;

    async fn count_classes(&self) -> Result<i64, StudioError>;

    async fn count_bookings(&self) -> Result<i64, StudioError>;

    /// Deletes every class; bookings go with them through the cascade.
    async fn clear(&self) -> Result<(), StudioError>;

    async fn ping(&self) -> Result<(), StudioError>;
}

#[derive(sqlx::FromRow)]
struct FitnessClassRow {
    id: i64,
    name: String,
    class_type: String,
    description: String,
    instructor: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    total_slots: i64,
    available_slots: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FitnessClassRow> for FitnessClass {
    type Error = StudioError;

    fn try_from(row: FitnessClassRow) -> Result<Self, Self::Error> {
        Ok(FitnessClass {
            id: row.id,
            name: row.name,
            class_type: parse_class_type(&row.class_type)?,
            description: row.description,
            instructor: row.instructor,
            start_time: row.start_time,
            end_time: row.end_time,
            total_slots: row.total_slots,
            available_slots: row.available_slots,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    fitness_class_id: i64,
    class_type: String,
    client_name: String,
    client_email: String,
    booking_date: DateTime<Utc>,
    is_cancelled: bool,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StudioError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            fitness_class: row.fitness_class_id,
            class_type: parse_class_type(&row.class_type)?,
            client_name: row.client_name,
            client_email: row.client_email,
            booking_date: row.booking_date,
            is_cancelled: row.is_cancelled,
        })
    }
}

fn parse_class_type(code: &str) -> Result<ClassType, StudioError> {
    code.parse::<ClassType>()
        .map_err(|err| StudioError::Storage(sqlx::Error::Decode(Box::new(err))))
}

const CLASS_COLUMNS: &str = "id, name, class_type, description, instructor, start_time, end_time, \
     total_slots, available_slots, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteStudioRepository {
    pool: SqlitePool,
}

impl SqliteStudioRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

pub fn validate_new_class(class: &NewFitnessClass) -> Result<(), StudioError> {
    if class.name.trim().is_empty() || class.name.chars().count() > 100 {
        return Err(StudioError::Validation(
            "name must be between 1 and 100 characters".into(),
        ));
    }
    if class.instructor.trim().is_empty() || class.instructor.chars().count() > 100 {
        return Err(StudioError::Validation(
            "instructor must be between 1 and 100 characters".into(),
        ));
    }
    if class.end_time <= class.start_time {
        return Err(StudioError::Validation(
            "end_time must be after start_time".into(),
        ));
    }
    if class.total_slots < 1 {
        return Err(StudioError::Validation(
            "total_slots must be at least 1".into(),
        ));
    }
    if !(0..=class.total_slots).contains(&class.available_slots) {
        return Err(StudioError::Validation(
            "available_slots must be between 0 and total_slots".into(),
        ));
    }
    Ok(())
}

#[async_trait]
impl StudioRepository for SqliteStudioRepository {
    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<FitnessClass>, StudioError> {
        let rows: Vec<FitnessClassRow> = sqlx::query_as(&format!(
            "SELECT {CLASS_COLUMNS} FROM fitness_classes
             WHERE start_time > ?
             ORDER BY start_time ASC, id ASC"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(FitnessClass::try_from).collect()
    }

    async fn find_class(&self, id: i64) -> Result<Option<FitnessClass>, StudioError> {
        let row: Option<FitnessClassRow> = sqlx::query_as(&format!(
            "SELECT {CLASS_COLUMNS} FROM fitness_classes WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(FitnessClass::try_from).transpose()
    }

    async fn create_class(
        &self,
        class: NewFitnessClass,
        now: DateTime<Utc>,
    ) -> Result<FitnessClass, StudioError> {
        validate_new_class(&class)?;

        let id = sqlx::query(
            "INSERT INTO fitness_classes
             (name, class_type, description, instructor, start_time, end_time,
              total_slots, available_slots, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&class.name)
        .bind(class.class_type.code())
        .bind(&class.description)
        .bind(&class.instructor)
        .bind(class.start_time.with_timezone(&Utc))
        .bind(class.end_time.with_timezone(&Utc))
        .bind(class.total_slots)
        .bind(class.available_slots)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.find_class(id)
            .await?
            .ok_or(StudioError::ClassNotFound(id))
    }

    async fn create_booking(
        &self,
        booking: NewBooking,
        now: DateTime<Utc>,
    ) -> Result<Booking, StudioError> {
        let mut tx = self.pool.begin().await?;

        // The conditional decrement goes first: it takes the write lock, so
        // the checks below cannot interleave with another booking.
        let reserved = sqlx::query(
            "UPDATE fitness_classes
             SET available_slots = available_slots - 1, updated_at = ?
             WHERE id = ? AND available_slots > 0",
        )
        .bind(now)
        .bind(booking.fitness_class)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        let class_type: Option<(String,)> =
            sqlx::query_as("SELECT class_type FROM fitness_classes WHERE id = ?")
                .bind(booking.fitness_class)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((class_type,)) = class_type else {
            return Err(StudioError::ClassNotFound(booking.fitness_class));
        };

        let (active,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings
             WHERE fitness_class_id = ? AND client_email = ? AND is_cancelled = 0",
        )
        .bind(booking.fitness_class)
        .bind(&booking.client_email)
        .fetch_one(&mut *tx)
        .await?;
        if active > 0 {
            return Err(StudioError::DuplicateBooking);
        }

        if !reserved {
            return Err(StudioError::NoSlots);
        }

        let id = sqlx::query(
            "INSERT INTO bookings
             (fitness_class_id, client_name, client_email, booking_date, is_cancelled)
             VALUES (?, ?, ?, ?, 0)",
        )
        .bind(booking.fitness_class)
        .bind(&booking.client_name)
        .bind(&booking.client_email)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StudioError::DuplicateBooking,
            other => StudioError::Storage(other),
        })?
        .last_insert_rowid();

        tx.commit().await?;

        Ok(Booking {
            id,
            fitness_class: booking.fitness_class,
            class_type: parse_class_type(&class_type)?,
            client_name: booking.client_name,
            client_email: booking.client_email,
            booking_date: now,
            is_cancelled: false,
        })
    }

    async fn list_bookings_by_email(&self, email: &str) -> Result<Vec<Booking>, StudioError> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            "SELECT b.id, b.fitness_class_id, c.class_type, b.client_name, b.client_email,
                    b.booking_date, b.is_cancelled
             FROM bookings b
             JOIN fitness_classes c ON c.id = b.fitness_class_id
             WHERE b.client_email = ? AND b.is_cancelled = 0
             ORDER BY b.booking_date DESC, b.id DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn count_classes(&self) -> Result<i64, StudioError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM fitness_classes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_bookings(&self) -> Result<i64, StudioError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn clear(&self) -> Result<(), StudioError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM bookings").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM fitness_classes")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StudioError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
