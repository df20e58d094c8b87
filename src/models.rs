use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::timezone::{format_display, to_studio_time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClassType {
    Yoga,
    Zumba,
    Hiit,
}

impl ClassType {
    pub const ALL: [ClassType; 3] = [ClassType::Yoga, ClassType::Zumba, ClassType::Hiit];

    /// Stored and serialized code.
    pub fn code(&self) -> &'static str {
        match self {
            ClassType::Yoga => "YOGA",
            ClassType::Zumba => "ZUMBA",
            ClassType::Hiit => "HIIT",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ClassType::Yoga => "Yoga",
            ClassType::Zumba => "Zumba",
            ClassType::Hiit => "HIIT",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown class type: {0}")]
pub struct UnknownClassType(pub String);

impl FromStr for ClassType {
    type Err = UnknownClassType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassType::ALL
            .into_iter()
            .find(|t| t.code() == s)
            .ok_or_else(|| UnknownClassType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitnessClass {
    pub id: i64,
    pub name: String,
    pub class_type: ClassType,
    pub description: String,
    pub instructor: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_slots: i64,
    pub available_slots: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a class. Times are already normalized to IST.
#[derive(Debug, Clone)]
pub struct NewFitnessClass {
    pub name: String,
    pub class_type: ClassType,
    pub description: String,
    pub instructor: String,
    pub start_time: DateTime<chrono_tz::Tz>,
    pub end_time: DateTime<chrono_tz::Tz>,
    pub total_slots: i64,
    pub available_slots: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub fitness_class: i64,
    pub class_type: ClassType,
    pub client_name: String,
    pub client_email: String,
    pub booking_date: DateTime<Utc>,
    pub is_cancelled: bool,
}

/// A validated booking request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub fitness_class: i64,
    pub client_name: String,
    pub client_email: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookingCreate {
    #[schema(example = 1)]
    pub fitness_class: Option<i64>,
    #[schema(example = "Sarah Smith")]
    pub client_name: Option<String>,
    #[schema(example = "sarah@example.com")]
    pub client_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct ClassView {
    pub id: i64,
    pub name: String,
    pub class_type: ClassType,
    #[schema(example = "Yoga")]
    pub class_type_display: String,
    pub description: String,
    pub instructor: String,
    #[schema(value_type = String, format = "date-time", example = "2025-03-05T08:00:00+05:30")]
    pub start_time: DateTime<FixedOffset>,
    #[schema(value_type = String, format = "date-time", example = "2025-03-05T09:00:00+05:30")]
    pub end_time: DateTime<FixedOffset>,
    #[schema(example = "05 Mar 2025 08:00 AM")]
    pub formatted_start_time: String,
    #[schema(example = "05 Mar 2025 09:00 AM")]
    pub formatted_end_time: String,
    pub total_slots: i64,
    pub available_slots: i64,
}

impl From<&FitnessClass> for ClassView {
    fn from(class: &FitnessClass) -> Self {
        ClassView {
            id: class.id,
            name: class.name.clone(),
            class_type: class.class_type,
            class_type_display: class.class_type.label().to_string(),
            description: class.description.clone(),
            instructor: class.instructor.clone(),
            start_time: to_studio_time(class.start_time).fixed_offset(),
            end_time: to_studio_time(class.end_time).fixed_offset(),
            formatted_start_time: format_display(class.start_time),
            formatted_end_time: format_display(class.end_time),
            total_slots: class.total_slots,
            available_slots: class.available_slots,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct BookingView {
    pub id: i64,
    pub fitness_class: i64,
    #[schema(example = "Yoga")]
    pub class_name: String,
    pub client_name: String,
    pub client_email: String,
    #[schema(value_type = String, format = "date-time", example = "2025-03-04T10:15:00+05:30")]
    pub booking_date: DateTime<FixedOffset>,
    #[schema(example = "04 Mar 2025 10:15 AM")]
    pub formatted_booking_date: String,
    pub is_cancelled: bool,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        BookingView {
            id: booking.id,
            fitness_class: booking.fitness_class,
            class_name: booking.class_type.label().to_string(),
            client_name: booking.client_name.clone(),
            client_email: booking.client_email.clone(),
            booking_date: to_studio_time(booking.booking_date).fixed_offset(),
            formatted_booking_date: format_display(booking.booking_date),
            is_cancelled: booking.is_cancelled,
        }
    }
}
