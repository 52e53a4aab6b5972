//! Student service for business logic operations.
//!
//! Owns the rules around the student stores: pagination math, the existence
//! gate before id-addressed operations, soft deletion, and the verification
//! email sent after a student is created.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{NewStudent, PageMeta, Paginated, Student, StudentChanges};
use crate::repositories::{AccountStore, StatusChange, StudentFilter, StudentStore};
use crate::services::mail::VerificationMailer;

pub const ADDED_AND_EMAILED: &str = "Student added and verification email sent successfully.";
pub const ADDED_WITHOUT_EMAIL: &str = "Student added, but failed to send verification email.";
pub const UNABLE_TO_ADD: &str = "Unable to add student";
pub const UNABLE_TO_DISABLE: &str = "Unable to disable student";
pub const UNABLE_TO_DELETE: &str = "Unable to delete student";
pub const STATUS_CHANGED: &str = "Student status changed successfully";
pub const DELETED: &str = "Student deleted successfully";

/// Listing request after validation and defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentListParams {
    pub search: Option<String>,
    pub class_name: Option<String>,
    pub section_name: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl Default for StudentListParams {
    fn default() -> Self {
        Self {
            search: None,
            class_name: None,
            section_name: None,
            page: 1,
            limit: 10,
        }
    }
}

#[derive(Clone)]
pub struct StudentService {
    students: Arc<dyn StudentStore>,
    accounts: Arc<dyn AccountStore>,
    mailer: VerificationMailer,
}

impl StudentService {
    pub fn new(
        students: Arc<dyn StudentStore>,
        accounts: Arc<dyn AccountStore>,
        mailer: VerificationMailer,
    ) -> Self {
        Self {
            students,
            accounts,
            mailer,
        }
    }

    /// Any account with this id counts, whatever its role.
    async fn ensure_exists(&self, id: i32) -> AppResult<()> {
        self.accounts
            .find_by_id(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Student", id))
    }

    /// Lists students matching the filters, one page at a time.
    ///
    /// The total comes from the windowed count on the returned rows, so a
    /// page past the end reports a total of 0.
    pub async fn get_all_students(
        &self,
        params: StudentListParams,
    ) -> AppResult<Paginated<Student>> {
        let filter = StudentFilter {
            search: params.search,
            class_name: params.class_name,
            section_name: params.section_name,
            limit: params.limit,
            offset: PageMeta::offset(params.page, params.limit),
        };

        let rows = self.students.find_all(&filter).await?;
        let total = rows.first().map(|row| row.total_count).unwrap_or(0);
        let data = rows.into_iter().map(|row| row.student).collect();

        Ok(Paginated {
            data,
            meta: PageMeta::new(total, params.page, params.limit),
        })
    }

    pub async fn get_student_detail(&self, id: i32) -> AppResult<Student> {
        self.ensure_exists(id).await?;

        self.students
            .find_detail(id)
            .await?
            .ok_or_else(|| AppError::not_found("Student", id))
    }

    /// Creates the student, then sends the verification email.
    ///
    /// A failed email only changes the returned message. Every other failure
    /// is reported as "Unable to add student" with the cause logged.
    pub async fn add_new_student(&self, new_student: NewStudent) -> AppResult<String> {
        let email = new_student.email.clone();

        match self.insert_and_notify(new_student).await {
            Ok(message) => Ok(message),
            Err(e) => {
                tracing::error!(email = %email, error = ?e, "Failed to add student");
                Err(AppError::internal_with(UNABLE_TO_ADD, e))
            }
        }
    }

    async fn insert_and_notify(&self, new_student: NewStudent) -> AppResult<String> {
        let email = new_student.email.clone();
        let outcome = self.students.insert(new_student).await?;
        if !outcome.status {
            return Err(AppError::internal(outcome.message));
        }
        let user_id = outcome
            .user_id
            .ok_or_else(|| AppError::internal("Insert returned no student id"))?;

        tracing::info!(user_id, "Student added");

        match self.mailer.send_account_verification(user_id, &email).await {
            Ok(()) => Ok(ADDED_AND_EMAILED.to_string()),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to send verification email");
                Ok(ADDED_WITHOUT_EMAIL.to_string())
            }
        }
    }

    /// Applies a partial update. Unknown ids surface from the store.
    pub async fn update_student(&self, id: i32, changes: StudentChanges) -> AppResult<String> {
        let outcome = self.students.update(id, changes).await?;
        if !outcome.status {
            return Err(AppError::internal(outcome.message));
        }

        tracing::info!(user_id = id, "Student updated");
        Ok(outcome.message)
    }

    pub async fn set_student_status(&self, change: StatusChange) -> AppResult<String> {
        self.ensure_exists(change.user_id).await?;

        let affected = self.students.set_status(change).await?;
        if affected == 0 {
            return Err(AppError::internal(UNABLE_TO_DISABLE));
        }

        tracing::info!(
            user_id = change.user_id,
            reviewer_id = ?change.reviewer_id,
            status = change.status,
            "Student status changed"
        );
        Ok(STATUS_CHANGED.to_string())
    }

    /// Soft delete: the row stays, login access is revoked.
    pub async fn delete_student(&self, id: i32) -> AppResult<String> {
        self.ensure_exists(id).await?;

        let affected = self
            .students
            .set_status(StatusChange {
                user_id: id,
                reviewer_id: None,
                status: false,
            })
            .await?;
        if affected == 0 {
            return Err(AppError::internal(UNABLE_TO_DELETE));
        }

        tracing::info!(user_id = id, "Student deleted");
        Ok(DELETED.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, MailConfig};
    use crate::models::{Gender, Role};
    use crate::repositories::memory::InMemoryStore;
    use crate::services::mail::testing::RecordingTransport;
    use chrono::NaiveDate;
    use std::sync::atomic::Ordering;

    struct Fixture {
        store: Arc<InMemoryStore>,
        transport: Arc<RecordingTransport>,
        service: StudentService,
    }

    fn fixture_with(transport: RecordingTransport) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let transport = Arc::new(transport);
        let jwt = JwtConfig {
            secret: "student_service_test_secret_012345".to_string(),
            ..Default::default()
        };
        let mailer = VerificationMailer::new(transport.clone(), &MailConfig::default(), &jwt);
        let service = StudentService::new(store.clone(), store.clone(), mailer);
        Fixture {
            store,
            transport,
            service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingTransport::default())
    }

    fn new_student(name: &str, email: &str) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            email: email.to_string(),
            gender: Gender::Female,
            dob: NaiveDate::from_ymd_opt(2012, 6, 1).unwrap(),
            phone: None,
            admission_date: None,
            class_name: Some("Class 1".to_string()),
            section_name: Some("A".to_string()),
            roll: Some(1),
            father_name: None,
            father_phone: None,
            mother_name: None,
            mother_phone: None,
            guardian_name: None,
            guardian_phone: None,
            relation_of_guardian: None,
            current_address: None,
            permanent_address: None,
            system_access: true,
        }
    }

    async fn seed(f: &Fixture, count: usize) {
        for i in 0..count {
            f.service
                .add_new_student(new_student(
                    &format!("Student {}", i),
                    &format!("s{}@school.test", i),
                ))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_list_pagination_meta() {
        let f = fixture();
        seed(&f, 25).await;

        let page = f
            .service
            .get_all_students(StudentListParams {
                page: 3,
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.data.len(), 5);
        assert_eq!(page.meta, PageMeta::new(25, 3, 10));
        assert_eq!(page.meta.total_pages, 3);
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let f = fixture();
        let page = f
            .service
            .get_all_students(StudentListParams::default())
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 0);
        assert_eq!(page.meta.total_pages, 0);
    }

    #[tokio::test]
    async fn test_list_filters_by_class_and_section() {
        let f = fixture();
        let placements = [
            ("Class 1", "A"),
            ("Class 1", "B"),
            ("Class 2", "A"),
            ("Class 1", "A"),
        ];
        for (i, (class, section)) in placements.iter().enumerate() {
            let mut student = new_student(&format!("Student {}", i), &format!("f{}@school.test", i));
            student.class_name = Some(class.to_string());
            student.section_name = Some(section.to_string());
            f.service.add_new_student(student).await.unwrap();
        }

        let by_class = f
            .service
            .get_all_students(StudentListParams {
                class_name: Some("Class 1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_class.meta.total, 3);
        assert_eq!(by_class.data.len(), 3);
        assert!(
            by_class
                .data
                .iter()
                .all(|s| s.profile.class_name.as_deref() == Some("Class 1"))
        );

        let by_both = f
            .service
            .get_all_students(StudentListParams {
                class_name: Some("Class 1".to_string()),
                section_name: Some("A".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_both.meta.total, 2);
        assert_eq!(by_both.meta.total_pages, 1);
        assert!(
            by_both
                .data
                .iter()
                .all(|s| s.profile.section_name.as_deref() == Some("A"))
        );

        let none = f
            .service
            .get_all_students(StudentListParams {
                class_name: Some("Class 2".to_string()),
                section_name: Some("B".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.data.is_empty());
        assert_eq!(none.meta.total, 0);
    }

    #[tokio::test]
    async fn test_list_page_past_end_reports_zero_total() {
        let f = fixture();
        seed(&f, 3).await;
        let page = f
            .service
            .get_all_students(StudentListParams {
                page: 5,
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 0);
        assert_eq!(page.meta.page, 5);
    }

    #[tokio::test]
    async fn test_list_search_is_case_insensitive_substring() {
        let f = fixture();
        f.service
            .add_new_student(new_student("Asha Rao", "asha@school.test"))
            .await
            .unwrap();
        f.service
            .add_new_student(new_student("Ravi Kumar", "ravi@school.test"))
            .await
            .unwrap();

        let page = f
            .service
            .get_all_students(StudentListParams {
                search: Some("RAO".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].account.name, "Asha Rao");
        assert_eq!(page.meta.total, 1);
    }

    #[tokio::test]
    async fn test_list_excludes_non_students() {
        let f = fixture();
        f.store.add_account("Teacher", "t@school.test", Role::Teacher);
        seed(&f, 2).await;

        let page = f
            .service
            .get_all_students(StudentListParams::default())
            .await
            .unwrap();
        assert_eq!(page.meta.total, 2);
    }

    #[tokio::test]
    async fn test_add_sends_verification_email() {
        let f = fixture();
        let message = f
            .service
            .add_new_student(new_student("Asha", "asha@school.test"))
            .await
            .unwrap();

        assert_eq!(message, ADDED_AND_EMAILED);
        let sent = f.transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "asha@school.test");
    }

    #[tokio::test]
    async fn test_add_survives_email_failure() {
        let f = fixture_with(RecordingTransport::failing());
        let message = f
            .service
            .add_new_student(new_student("Asha", "asha@school.test"))
            .await
            .unwrap();

        assert_eq!(message, ADDED_WITHOUT_EMAIL);
        let page = f
            .service
            .get_all_students(StudentListParams::default())
            .await
            .unwrap();
        assert_eq!(page.meta.total, 1);
    }

    #[tokio::test]
    async fn test_add_duplicate_email_is_generic_internal() {
        let f = fixture();
        f.service
            .add_new_student(new_student("Asha", "asha@school.test"))
            .await
            .unwrap();

        let err = f
            .service
            .add_new_student(new_student("Other", "asha@school.test"))
            .await
            .unwrap_err();
        match err {
            AppError::Internal { message, .. } => assert_eq!(message, UNABLE_TO_ADD),
            other => panic!("Expected Internal error, got {:?}", other),
        }
        assert_eq!(f.transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_add_store_failure_is_generic_internal() {
        let f = fixture();
        f.store.fail_inserts.store(true, Ordering::SeqCst);

        let err = f
            .service
            .add_new_student(new_student("Asha", "asha@school.test"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), UNABLE_TO_ADD);
        assert!(f.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_detail_unknown_id_is_not_found() {
        let f = fixture();
        let err = f.service.get_student_detail(999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_detail_of_non_student_account_is_not_found() {
        let f = fixture();
        let id = f.store.add_account("Admin", "admin@school.test", Role::Admin);
        let err = f.service.get_student_detail(id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_record() {
        let f = fixture();
        seed(&f, 1).await;

        let message = f.service.delete_student(1).await.unwrap();
        assert_eq!(message, DELETED);

        let student = f.service.get_student_detail(1).await.unwrap();
        assert!(!student.account.is_active);
        assert_eq!(student.account.reviewer_id, None);
    }

    #[tokio::test]
    async fn test_gated_operations_do_not_reach_store_for_unknown_id() {
        let f = fixture();

        let delete = f.service.delete_student(404).await.unwrap_err();
        let status = f
            .service
            .set_student_status(StatusChange {
                user_id: 404,
                reviewer_id: Some(1),
                status: true,
            })
            .await
            .unwrap_err();

        assert!(matches!(delete, AppError::NotFound { .. }));
        assert!(matches!(status, AppError::NotFound { .. }));
        assert_eq!(f.store.set_status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_set_status_is_idempotent_and_records_reviewer() {
        let f = fixture();
        let reviewer = f.store.add_account("Admin", "admin@school.test", Role::Admin);
        seed(&f, 1).await;
        let student_id = reviewer + 1;

        let change = StatusChange {
            user_id: student_id,
            reviewer_id: Some(reviewer),
            status: false,
        };
        assert_eq!(
            f.service.set_student_status(change).await.unwrap(),
            STATUS_CHANGED
        );
        assert_eq!(
            f.service.set_student_status(change).await.unwrap(),
            STATUS_CHANGED
        );

        let student = f.service.get_student_detail(student_id).await.unwrap();
        assert!(!student.account.is_active);
        assert_eq!(student.account.reviewer_id, Some(reviewer));
    }

    #[tokio::test]
    async fn test_update_applies_partial_changes() {
        let f = fixture();
        seed(&f, 1).await;

        let message = f
            .service
            .update_student(
                1,
                StudentChanges {
                    roll: Some(17),
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(message, "Student updated successfully");

        let student = f.service.get_student_detail(1).await.unwrap();
        assert_eq!(student.account.name, "Renamed");
        assert_eq!(student.profile.roll, Some(17));
        assert_eq!(student.profile.class_name.as_deref(), Some("Class 1"));
    }

    #[tokio::test]
    async fn test_update_unknown_student_is_internal_with_store_message() {
        let f = fixture();
        let err = f
            .service
            .update_student(77, StudentChanges::default())
            .await
            .unwrap_err();
        match err {
            AppError::Internal { message, .. } => assert_eq!(message, "Student not found"),
            other => panic!("Expected Internal error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_duplicate_email_is_internal() {
        let f = fixture();
        seed(&f, 2).await;
        let err = f
            .service
            .update_student(
                2,
                StudentChanges {
                    email: Some("s0@school.test".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email already exists");
    }
}
