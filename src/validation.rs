use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{BookingCreate, NewBooking};
use crate::repository::StudioError;

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("regex compiles")
});

pub fn is_valid_email(value: &str) -> bool {
    value.len() <= MAX_EMAIL_LEN
        && EMAIL_REGEX.is_match(value)
        && value.split('@').next().is_some_and(|local| {
            !local.starts_with('.') && !local.ends_with('.') && !local.contains("..")
        })
}

pub fn validate_booking(request: BookingCreate) -> Result<NewBooking, StudioError> {
    let fitness_class = match request.fitness_class {
        Some(id) if id > 0 => id,
        Some(_) => {
            return Err(StudioError::Validation(
                "fitness_class must be a positive integer".into(),
            ));
        }
        None => return Err(StudioError::Validation("fitness_class is required".into())),
    };

    let client_name = request.client_name.unwrap_or_default().trim().to_string();
    if client_name.is_empty() {
        return Err(StudioError::Validation("client_name is required".into()));
    }
    if client_name.chars().count() > MAX_NAME_LEN {
        return Err(StudioError::Validation(format!(
            "client_name must be at most {MAX_NAME_LEN} characters"
        )));
    }

    let client_email = validate_email(request.client_email.as_deref(), "client_email")?;

    Ok(NewBooking {
        fitness_class,
        client_name,
        client_email,
    })
}

/// Lookup only requires presence; an unknown or odd address just matches nothing.
pub fn validate_email_query(email: Option<&str>) -> Result<String, StudioError> {
    match email.map(str::trim) {
        Some(email) if !email.is_empty() => Ok(email.to_string()),
        _ => Err(StudioError::Validation("Email parameter is required".into())),
    }
}

fn validate_email(value: Option<&str>, field: &str) -> Result<String, StudioError> {
    let email = value.map(str::trim).unwrap_or_default();
    if email.is_empty() {
        return Err(StudioError::Validation(format!("{field} is required")));
    }
    if !is_valid_email(email) {
        return Err(StudioError::Validation(format!(
            "{field} must be a valid email address"
        )));
    }
    Ok(email.to_string())
}
