//! Student-related DTOs for API requests and responses.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::models::{Gender, NewStudent, StudentChanges};
use crate::services::StudentListParams;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

// ============================================================================
// Field rules
// ============================================================================

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its date part is kept).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

fn validate_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("date"))
}

/// Optional dates may be sent as an empty string.
fn validate_optional_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_date(value)
}

fn validate_gender(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Gender>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("enum"))
}

/// Names are required and must fit the `users.name` column.
fn validate_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("length").with_message("Name is required".into()));
    }
    if value.chars().count() > 100 {
        return Err(ValidationError::new("length")
            .with_message("Name must be at most 100 characters".into()));
    }
    Ok(())
}

fn parse_id(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok().filter(|id| *id > 0)
}

fn validate_id(value: &str) -> Result<(), ValidationError> {
    parse_id(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("id"))
}

/// Blank optional text is treated as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn gender_of(value: &str) -> AppResult<Gender> {
    value.parse().map_err(|reason| AppError::Validation {
        field: "body.gender".to_string(),
        reason,
    })
}

fn date_of(field: &str, value: &str) -> AppResult<NaiveDate> {
    parse_date(value).ok_or_else(|| AppError::Validation {
        field: format!("body.{}", field),
        reason: "Invalid date format".to_string(),
    })
}

fn optional_date_of(field: &str, value: Option<String>) -> AppResult<Option<NaiveDate>> {
    present(value).map(|v| date_of(field, &v)).transpose()
}

fn roll_of(value: Option<i64>) -> AppResult<Option<i32>> {
    value
        .map(|roll| {
            i32::try_from(roll).map_err(|_| AppError::Validation {
                field: "body.roll".to_string(),
                reason: "Roll is out of range".to_string(),
            })
        })
        .transpose()
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Query parameters for listing students.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct StudentListQuery {
    /// Page number (1-based), defaults to 1
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    #[param(minimum = 1, example = 1)]
    pub page: Option<i64>,

    /// Page size, defaults to 10
    #[validate(range(min = 1, message = "Limit must be a positive integer"))]
    #[param(minimum = 1, example = 10)]
    pub limit: Option<i64>,

    /// Case-insensitive substring of the student name
    pub search: Option<String>,

    /// Exact class name
    #[serde(rename = "class")]
    pub class_name: Option<String>,

    /// Exact section name
    #[serde(rename = "section")]
    pub section_name: Option<String>,
}

impl StudentListQuery {
    pub fn into_params(self) -> StudentListParams {
        StudentListParams {
            search: present(self.search),
            class_name: present(self.class_name),
            section_name: present(self.section_name),
            page: self.page.unwrap_or(DEFAULT_PAGE),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT),
        }
    }
}

/// `:id` path parameter.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Path)]
pub struct StudentIdParams {
    /// Student id, a positive integer
    #[validate(custom(function = "validate_id", message = "Invalid ID"))]
    #[param(value_type = i32, example = 1)]
    id: String,
}

impl StudentIdParams {
    /// Only meaningful after validation, which guarantees a positive id.
    pub fn id(&self) -> i32 {
        parse_id(&self.id).unwrap_or_default()
    }
}

/// Request body for creating a student.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_name"))]
    #[schema(example = "Asha Rao")]
    pub name: String,

    #[serde(default)]
    #[validate(
        email(message = "Invalid email address"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    #[schema(format = "email", example = "asha@school.test")]
    pub email: String,

    #[serde(default)]
    #[validate(custom(
        function = "validate_gender",
        message = "Invalid enum value. Expected 'Male' | 'Female' | 'Other'"
    ))]
    #[schema(example = "Female")]
    pub gender: String,

    #[serde(default)]
    #[validate(custom(function = "validate_date", message = "Invalid date format"))]
    #[schema(format = "date", example = "2012-06-01")]
    pub dob: String,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,

    #[validate(custom(function = "validate_optional_date", message = "Invalid date format"))]
    #[schema(format = "date")]
    pub admission_date: Option<String>,

    #[serde(rename = "class")]
    #[validate(length(max = 50, message = "Class must be at most 50 characters"))]
    #[schema(example = "Class 5")]
    pub class_name: Option<String>,

    #[serde(rename = "section")]
    #[validate(length(max = 50, message = "Section must be at most 50 characters"))]
    #[schema(example = "A")]
    pub section_name: Option<String>,

    #[validate(range(min = 1, message = "Roll must be a positive integer"))]
    #[schema(minimum = 1)]
    pub roll: Option<i64>,

    #[validate(length(max = 100, message = "Father name must be at most 100 characters"))]
    pub father_name: Option<String>,
    #[validate(length(max = 100, message = "Mother name must be at most 100 characters"))]
    pub mother_name: Option<String>,
    #[validate(length(max = 20, message = "Father phone must be at most 20 characters"))]
    pub father_phone: Option<String>,
    #[validate(length(max = 20, message = "Mother phone must be at most 20 characters"))]
    pub mother_phone: Option<String>,
    #[validate(length(max = 100, message = "Guardian name must be at most 100 characters"))]
    pub guardian_name: Option<String>,
    #[validate(length(max = 20, message = "Guardian phone must be at most 20 characters"))]
    pub guardian_phone: Option<String>,
    #[validate(length(max = 30, message = "Relation must be at most 30 characters"))]
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,

    /// Login access for the new account, off unless set
    pub system_access: Option<bool>,
}

impl CreateStudentRequest {
    /// Converts the validated request into the insert model.
    pub fn into_new_student(self) -> AppResult<NewStudent> {
        Ok(NewStudent {
            gender: gender_of(&self.gender)?,
            dob: date_of("dob", &self.dob)?,
            admission_date: optional_date_of("admissionDate", self.admission_date)?,
            roll: roll_of(self.roll)?,
            name: self.name,
            email: self.email,
            phone: present(self.phone),
            class_name: present(self.class_name),
            section_name: present(self.section_name),
            father_name: present(self.father_name),
            father_phone: present(self.father_phone),
            mother_name: present(self.mother_name),
            mother_phone: present(self.mother_phone),
            guardian_name: present(self.guardian_name),
            guardian_phone: present(self.guardian_phone),
            relation_of_guardian: present(self.relation_of_guardian),
            current_address: present(self.current_address),
            permanent_address: present(self.permanent_address),
            system_access: self.system_access.unwrap_or(false),
        })
    }
}

/// Request body for a partial student update; absent fields are untouched.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,

    #[validate(
        email(message = "Invalid email address"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    #[schema(format = "email")]
    pub email: Option<String>,

    #[validate(custom(
        function = "validate_gender",
        message = "Invalid enum value. Expected 'Male' | 'Female' | 'Other'"
    ))]
    pub gender: Option<String>,

    #[validate(custom(function = "validate_optional_date", message = "Invalid date format"))]
    #[schema(format = "date")]
    pub dob: Option<String>,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,

    #[validate(custom(function = "validate_optional_date", message = "Invalid date format"))]
    #[schema(format = "date")]
    pub admission_date: Option<String>,

    #[serde(rename = "class")]
    #[validate(length(max = 50, message = "Class must be at most 50 characters"))]
    pub class_name: Option<String>,

    #[serde(rename = "section")]
    #[validate(length(max = 50, message = "Section must be at most 50 characters"))]
    pub section_name: Option<String>,

    #[validate(range(min = 1, message = "Roll must be a positive integer"))]
    #[schema(minimum = 1)]
    pub roll: Option<i64>,

    #[validate(length(max = 100, message = "Father name must be at most 100 characters"))]
    pub father_name: Option<String>,
    #[validate(length(max = 100, message = "Mother name must be at most 100 characters"))]
    pub mother_name: Option<String>,
    #[validate(length(max = 20, message = "Father phone must be at most 20 characters"))]
    pub father_phone: Option<String>,
    #[validate(length(max = 20, message = "Mother phone must be at most 20 characters"))]
    pub mother_phone: Option<String>,
    #[validate(length(max = 100, message = "Guardian name must be at most 100 characters"))]
    pub guardian_name: Option<String>,
    #[validate(length(max = 20, message = "Guardian phone must be at most 20 characters"))]
    pub guardian_phone: Option<String>,
    #[validate(length(max = 30, message = "Relation must be at most 30 characters"))]
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub system_access: Option<bool>,
}

impl UpdateStudentRequest {
    /// Converts the validated request into a changeset.
    pub fn into_changes(self) -> AppResult<StudentChanges> {
        Ok(StudentChanges {
            gender: self.gender.as_deref().map(gender_of).transpose()?,
            dob: optional_date_of("dob", self.dob)?,
            admission_date: optional_date_of("admissionDate", self.admission_date)?,
            roll: roll_of(self.roll)?,
            name: self.name,
            email: self.email,
            phone: present(self.phone),
            class_name: present(self.class_name),
            section_name: present(self.section_name),
            father_name: present(self.father_name),
            father_phone: present(self.father_phone),
            mother_name: present(self.mother_name),
            mother_phone: present(self.mother_phone),
            guardian_name: present(self.guardian_name),
            guardian_phone: present(self.guardian_phone),
            relation_of_guardian: present(self.relation_of_guardian),
            current_address: present(self.current_address),
            permanent_address: present(self.permanent_address),
            system_access: self.system_access,
        })
    }
}

/// Request body for `POST /students/{id}/status`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StatusRequest {
    pub status: bool,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Plain acknowledgement returned by mutations.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Student deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
