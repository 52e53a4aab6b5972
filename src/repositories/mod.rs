//! Repository layer for data access operations.
//!
//! Each store is an async trait so services can run against PostgreSQL in
//! production and against an in-memory store in tests.

mod account_repo;
mod class_repo;
#[cfg(test)]
pub(crate) mod memory;
mod student_repo;

pub use account_repo::AccountRepository;
pub use class_repo::ClassRepository;
pub use student_repo::StudentRepository;

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::models::{Account, Class, NewStudent, Section, Student, StudentChanges};

/// Filters and window for a student listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    /// Case-insensitive substring of the student name
    pub search: Option<String>,
    pub class_name: Option<String>,
    pub section_name: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// A listed student plus the total number of matches ignoring the window.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentListRow {
    pub student: Student,
    pub total_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub user_id: i32,
    pub reviewer_id: Option<i32>,
    pub status: bool,
}

/// Outcome of an insert or update.
///
/// Expected failures (duplicate email, unknown student) come back as
/// `status == false` with a message instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub status: bool,
    pub message: String,
    pub user_id: Option<i32>,
}

impl WriteOutcome {
    pub const EMAIL_EXISTS: &'static str = "Email already exists";
    pub const STUDENT_ADDED: &'static str = "Student added successfully";
    pub const STUDENT_UPDATED: &'static str = "Student updated successfully";
    pub const STUDENT_NOT_FOUND: &'static str = "Student not found";

    pub fn success(message: &str, user_id: i32) -> Self {
        Self {
            status: true,
            message: message.to_string(),
            user_id: Some(user_id),
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            status: false,
            message: message.to_string(),
            user_id: None,
        }
    }
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Matching students ordered by id, each carrying the windowed total.
    async fn find_all(&self, filter: &StudentFilter) -> AppResult<Vec<StudentListRow>>;

    async fn find_detail(&self, id: i32) -> AppResult<Option<Student>>;

    /// Returns the number of matched rows.
    async fn set_status(&self, change: StatusChange) -> AppResult<usize>;

    async fn insert(&self, new_student: NewStudent) -> AppResult<WriteOutcome>;

    async fn update(&self, id: i32, changes: StudentChanges) -> AppResult<WriteOutcome>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Looks an account up by id regardless of role.
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>>;

    /// Round trip to the store, used by the readiness check.
    async fn ping(&self) -> AppResult<()>;
}

#[async_trait]
pub trait ClassStore: Send + Sync {
    async fn list_classes(&self) -> AppResult<Vec<Class>>;

    async fn list_sections(&self) -> AppResult<Vec<Section>>;
}

/// Aggregates all stores for convenient access.
#[derive(Clone)]
pub struct Repositories {
    pub students: Arc<dyn StudentStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub classes: Arc<dyn ClassStore>,
}

impl Repositories {
    /// Creates the PostgreSQL-backed stores sharing one pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            students: Arc::new(StudentRepository::new(pool.clone())),
            accounts: Arc::new(AccountRepository::new(pool.clone())),
            classes: Arc::new(ClassRepository::new(pool)),
        }
    }

    #[cfg(test)]
    pub(crate) fn in_memory(store: Arc<memory::InMemoryStore>) -> Self {
        Self {
            students: store.clone(),
            accounts: store.clone(),
            classes: store,
        }
    }
}
