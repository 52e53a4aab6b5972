//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `student` - Student request/response DTOs
//! - `class` - Class and section lookups
//! - `health` - Health check responses
//! - `error` - Common error response DTOs

mod class;
mod error;
mod health;
mod student;

pub use class::{ClassesResponse, SectionsResponse};
pub use error::{ErrorItem, ErrorResponse};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use student::{
    CreateStudentRequest, MessageResponse, StatusRequest, StudentIdParams, StudentListQuery,
    UpdateStudentRequest, parse_date,
};
