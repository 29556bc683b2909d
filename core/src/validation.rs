//! Field-level validation of public reservation submissions.
//!
//! The booking form posts a flat JSON object. [`validate_submission`] turns
//! it into a typed [`NewReservation`] or collects every problem it finds
//! into a [`ValidationErrors`] so the form can highlight each field.
//!
//! | Field | Rule |
//! |-------|------|
//! | `name` | 1–200 chars |
//! | `email` | well-formed, ≤300 chars |
//! | `phone` | 6–50 chars |
//! | `serviceTypeId`, `vehiclePreferenceId` | non-empty |
//! | `passengers` | integer 1–50 (numeric strings accepted) |
//! | `bags` | integer 0–50 (numeric strings accepted) |
//! | `pickupDate` | `YYYY-MM-DD` |
//! | `pickupTime` | `H:mm` / `HH:mm`, hour 0–23, minute 0–59 |
//! | `pickupAddress`, `destinationAddress` | 1–400 chars |
//! | `airline` / `flightNumber` / `message` | optional, ≤200 / ≤100 / ≤1000 chars |
//!
//! Strings are trimmed before they are measured. Keys the form does not know
//! about (a `status`, for instance) are ignored.

use crate::pickup::{self, PickupTimeError};
use crate::types::{Customer, NewReservation};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)] // literal pattern
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .unwrap()
});

const NAME_MAX: usize = 200;
const EMAIL_MAX: usize = 300;
const PHONE_MIN: usize = 6;
const PHONE_MAX: usize = 50;
const ADDRESS_MAX: usize = 400;
const AIRLINE_MAX: usize = 200;
const FLIGHT_NUMBER_MAX: usize = 100;
const MESSAGE_MAX: usize = 1000;
const PASSENGERS_RANGE: (i64, i64) = (1, 50);
const BAGS_RANGE: (i64, i64) = (0, 50);

/// Message used when the pickup time has the wrong shape.
pub const TIME_FORMAT_MESSAGE: &str =
    "Time must be in HH:mm format (24-hour, e.g., 09:00, 14:30)";

/// Message used when the pickup time has the right shape but bad values.
pub const TIME_RANGE_MESSAGE: &str = "Time out of range. Hour: 0-23, Minute: 0-59";

/// Every problem found in one submission.
///
/// Serializes as `{"formErrors": [...], "fieldErrors": {"field": [...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    form_errors: Vec<String>,
    field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// No errors recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Record a problem with one field.
    pub fn add_field(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record a problem with the submission as a whole.
    pub fn add_form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    /// Problems not tied to a field.
    #[must_use]
    pub fn form_errors(&self) -> &[String] {
        &self.form_errors
    }

    /// Messages for one field, if any.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.field_errors.get(field).map(Vec::as_slice)
    }

    /// Names of every field with at least one problem.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.field_errors.keys().map(String::as_str)
    }

    /// Flat `"field: message"` list for display.
    #[must_use]
    pub fn details(&self) -> Vec<String> {
        self.form_errors
            .iter()
            .cloned()
            .chain(self.field_errors.iter().flat_map(|(field, messages)| {
                messages.iter().map(move |message| format!("{field}: {message}"))
            }))
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid submission: {}", self.details().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Parse and validate a raw request body.
///
/// # Errors
///
/// Returns [`ValidationErrors`] with a form-level error if the body is not
/// JSON, otherwise whatever [`validate_submission`] finds.
pub fn parse_submission(body: &[u8]) -> Result<NewReservation, ValidationErrors> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => validate_submission(&value),
        Err(_) => {
            let mut errors = ValidationErrors::default();
            errors.add_form("Request body must be a JSON object");
            Err(errors)
        }
    }
}

/// Validate a decoded submission.
///
/// # Errors
///
/// Returns every field problem found; validation does not stop at the first.
pub fn validate_submission(raw: &Value) -> Result<NewReservation, ValidationErrors> {
    let Some(object) = raw.as_object() else {
        let mut errors = ValidationErrors::default();
        errors.add_form(format!("Expected object, received {}", type_name(raw)));
        return Err(errors);
    };

    let mut fields = Fields::new(object);

    let name = fields.required_string("name", 1, NAME_MAX);
    let email = fields.email("email");
    let phone = fields.required_string("phone", PHONE_MIN, PHONE_MAX);
    let service_type_id = fields.required_string("serviceTypeId", 1, usize::MAX);
    let vehicle_preference_id = fields.required_string("vehiclePreferenceId", 1, usize::MAX);
    let passengers = fields.integer("passengers", PASSENGERS_RANGE);
    let bags = fields.integer("bags", BAGS_RANGE);
    let pickup_date = fields.pickup_date("pickupDate");
    let pickup_time = fields.pickup_time("pickupTime");
    let pickup_address = fields.required_string("pickupAddress", 1, ADDRESS_MAX);
    let destination_address = fields.required_string("destinationAddress", 1, ADDRESS_MAX);
    let airline = fields.optional_string("airline", AIRLINE_MAX);
    let flight_number = fields.optional_string("flightNumber", FLIGHT_NUMBER_MAX);
    let message = fields.optional_string("message", MESSAGE_MAX);

    // Both halves passed their own checks; combining them re-checks the
    // format and can still fail on a daylight-saving gap.
    let pickup_at = match (&pickup_date, &pickup_time) {
        (Some(date), Some(time)) => match pickup::to_pickup_at(date, time) {
            Ok(at) => Some(at),
            Err(err) => {
                let field = match err {
                    PickupTimeError::MalformedDate(_) | PickupTimeError::InvalidCalendarDate(_) => {
                        "pickupDate"
                    }
                    _ => "pickupTime",
                };
                fields.errors.add_field(field, err.to_string());
                None
            }
        },
        _ => None,
    };

    let errors = fields.errors;
    match (
        name,
        email,
        phone,
        service_type_id,
        vehicle_preference_id,
        passengers,
        bags,
        pickup_at,
        pickup_address,
        destination_address,
    ) {
        (
            Some(name),
            Some(email),
            Some(phone),
            Some(service_type_id),
            Some(vehicle_preference_id),
            Some(passengers),
            Some(bags),
            Some(pickup_at),
            Some(pickup_address),
            Some(destination_address),
        ) if errors.is_empty() => Ok(NewReservation {
            customer: Customer { name, email, phone },
            service_type_id,
            vehicle_preference_id,
            passengers,
            bags,
            pickup_at,
            pickup_address,
            destination_address,
            airline,
            flight_number,
            message,
        }),
        _ => Err(errors),
    }
}

/// Cursor over the submitted object that records problems as it goes.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> Fields<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            errors: ValidationErrors::default(),
        }
    }

    /// Present, non-null value for `key`, or `None` after recording "Required".
    fn present(&mut self, key: &str) -> Option<&'a Value> {
        match self.object.get(key) {
            None | Some(Value::Null) => {
                self.errors.add_field(key, "Required");
                None
            }
            Some(value) => Some(value),
        }
    }

    fn string(&mut self, key: &str) -> Option<String> {
        match self.present(key)? {
            Value::String(s) => Some(s.trim().to_string()),
            other => {
                self.errors.add_field(
                    key,
                    format!("Expected string, received {}", type_name(other)),
                );
                None
            }
        }
    }

    fn required_string(&mut self, key: &str, min: usize, max: usize) -> Option<String> {
        let value = self.string(key)?;
        let len = value.chars().count();
        if len < min {
            let message = if min == 1 {
                "Must not be empty".to_string()
            } else {
                format!("Must contain at least {min} characters")
            };
            self.errors.add_field(key, message);
            return None;
        }
        if len > max {
            self.errors
                .add_field(key, format!("Must contain at most {max} characters"));
            return None;
        }
        Some(value)
    }

    /// Optional text: absent, `null` and `""` all mean "not provided".
    fn optional_string(&mut self, key: &str, max: usize) -> Option<String> {
        match self.object.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => {
                let value = s.trim();
                if value.chars().count() > max {
                    self.errors
                        .add_field(key, format!("Must contain at most {max} characters"));
                    None
                } else if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            Some(other) => {
                self.errors.add_field(
                    key,
                    format!("Expected string, received {}", type_name(other)),
                );
                None
            }
        }
    }

    fn email(&mut self, key: &str) -> Option<String> {
        let value = self.required_string(key, 1, EMAIL_MAX)?;
        if is_valid_email(&value) {
            Some(value)
        } else {
            self.errors.add_field(key, "Invalid email");
            None
        }
    }

    /// Integer with numeric-string coercion (`"2"` is accepted as `2`).
    /// Floats with no fractional part (`2.0`, `"2.0"`) count as integers.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp
    )]
    fn integer(&mut self, key: &str, (min, max): (i64, i64)) -> Option<u8> {
        let number = match self.present(key)? {
            Value::Number(n) => n.as_i64().map(Ok).or_else(|| n.as_f64().map(Err)),
            Value::String(s) if !s.trim().is_empty() => match s.trim().parse::<i64>() {
                Ok(n) => Some(Ok(n)),
                Err(_) => s.trim().parse::<f64>().ok().map(Err),
            },
            Value::String(_) => {
                self.errors.add_field(key, "Required");
                return None;
            }
            other => {
                self.errors.add_field(
                    key,
                    format!("Expected number, received {}", type_name(other)),
                );
                return None;
            }
        };

        let value = match number {
            Some(Ok(n)) => n,
            Some(Err(f)) if f.is_finite() && f.fract() == 0.0 => {
                if f < min as f64 || f > max as f64 {
                    self.errors
                        .add_field(key, format!("Must be between {min} and {max}"));
                    return None;
                }
                f as i64
            }
            Some(Err(f)) if f.is_finite() => {
                self.errors.add_field(key, "Expected integer, received float");
                return None;
            }
            _ => {
                self.errors.add_field(key, "Expected number, received nan");
                return None;
            }
        };

        if value < min || value > max {
            self.errors
                .add_field(key, format!("Must be between {min} and {max}"));
            return None;
        }
        u8::try_from(value).ok()
    }

    fn pickup_date(&mut self, key: &str) -> Option<String> {
        let value = self.required_string(key, 1, usize::MAX)?;
        match pickup::parse_date(&value) {
            Ok(_) => Some(value),
            Err(PickupTimeError::InvalidCalendarDate(_)) => {
                self.errors.add_field(key, "Date is not a valid calendar date");
                None
            }
            Err(_) => {
                self.errors
                    .add_field(key, "Date must be in YYYY-MM-DD format");
                None
            }
        }
    }

    fn pickup_time(&mut self, key: &str) -> Option<String> {
        let value = self.string(key)?;
        if value.is_empty() {
            self.errors.add_field(key, "Pickup time is required");
            return None;
        }
        match pickup::parse_time(&value) {
            Ok(_) => Some(value),
            Err(PickupTimeError::HourOutOfRange(_) | PickupTimeError::MinuteOutOfRange(_)) => {
                tracing::debug!(field = key, value = %value, "pickup time out of range");
                self.errors.add_field(key, TIME_RANGE_MESSAGE);
                None
            }
            Err(_) => {
                tracing::debug!(field = key, value = %value, "pickup time malformed");
                self.errors.add_field(key, TIME_FORMAT_MESSAGE);
                None
            }
        }
    }
}

/// Email shape check: a local part that does not start with a dot or
/// contain `..`, then a dotted domain ending in a 2+ letter TLD.
#[must_use]
pub fn is_valid_email(candidate: &str) -> bool {
    !candidate.starts_with('.')
        && !candidate.contains("..")
        && EMAIL_PATTERN.is_match(candidate)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
