//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod class_service;
pub mod mail;
mod student_service;

pub use class_service::ClassService;
pub use mail::VerificationMailer;
pub use student_service::{StudentListParams, StudentService};

use std::sync::Arc;

use crate::repositories::{AccountStore, Repositories};

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since stores and transports sit behind `Arc`.
#[derive(Clone)]
pub struct Services {
    pub students: StudentService,
    pub classes: ClassService,
    accounts: Arc<dyn AccountStore>,
}

impl Services {
    /// Creates a new Services instance from Repositories.
    pub fn new(repos: Repositories, mailer: VerificationMailer) -> Self {
        Self {
            students: StudentService::new(repos.students, repos.accounts.clone(), mailer),
            classes: ClassService::new(repos.classes),
            accounts: repos.accounts,
        }
    }

    /// Checks that the backing store answers.
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.accounts.ping().await
    }
}
