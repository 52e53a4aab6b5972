//! In-memory stores for service and router tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use super::{
    AccountStore, ClassStore, StatusChange, StudentFilter, StudentListRow, StudentStore,
    WriteOutcome,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    Account, Class, NewStudent, Role, Section, Student, StudentAccount, StudentChanges,
    StudentProfile,
};

#[derive(Default)]
struct State {
    next_id: i32,
    accounts: BTreeMap<i32, Account>,
    profiles: BTreeMap<i32, StudentProfile>,
}

/// Mirrors the PostgreSQL stores closely enough to exercise the services:
/// ids are never reused, emails are unique, and status changes count
/// matched rows.
pub(crate) struct InMemoryStore {
    state: Mutex<State>,
    classes: Vec<Class>,
    sections: Vec<Section>,
    pub(crate) fail_inserts: AtomicBool,
    pub(crate) insert_calls: AtomicUsize,
    pub(crate) set_status_calls: AtomicUsize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..Default::default()
            }),
            classes: vec![
                Class {
                    id: 1,
                    name: "Class 1".to_string(),
                },
                Class {
                    id: 2,
                    name: "Class 2".to_string(),
                },
            ],
            sections: vec![
                Section {
                    id: 1,
                    name: "A".to_string(),
                },
                Section {
                    id: 2,
                    name: "B".to_string(),
                },
            ],
            fail_inserts: AtomicBool::new(false),
            insert_calls: AtomicUsize::new(0),
            set_status_calls: AtomicUsize::new(0),
        }
    }
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a non-student account, returning its id.
    pub(crate) fn add_account(&self, name: &str, email: &str, role: Role) -> i32 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        let now = Utc::now().naive_utc();
        state.accounts.insert(
            id,
            Account {
                id,
                name: name.to_string(),
                email: email.to_string(),
                role_id: role.id(),
                is_active: true,
                is_email_verified: true,
                reviewer_id: None,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    fn student(state: &State, id: i32) -> Option<Student> {
        let account = state.accounts.get(&id)?;
        if account.role_id != Role::Student.id() {
            return None;
        }
        let profile = state.profiles.get(&id)?;
        Some(Student {
            account: StudentAccount {
                id: account.id,
                name: account.name.clone(),
                email: account.email.clone(),
                is_active: account.is_active,
                reviewer_id: account.reviewer_id,
            },
            profile: profile.clone(),
        })
    }

    fn email_taken(state: &State, email: &str, except: Option<i32>) -> bool {
        state
            .accounts
            .values()
            .any(|a| a.email == email && Some(a.id) != except)
    }
}

#[async_trait]
impl StudentStore for InMemoryStore {
    async fn find_all(&self, filter: &StudentFilter) -> AppResult<Vec<StudentListRow>> {
        let state = self.state.lock().unwrap();
        let search = filter.search.as_deref().map(str::to_lowercase);

        let matches: Vec<Student> = state
            .accounts
            .keys()
            .filter_map(|id| Self::student(&state, *id))
            .filter(|s| {
                search
                    .as_deref()
                    .is_none_or(|term| s.account.name.to_lowercase().contains(term))
            })
            .filter(|s| {
                filter
                    .class_name
                    .as_deref()
                    .is_none_or(|c| s.profile.class_name.as_deref() == Some(c))
            })
            .filter(|s| {
                filter
                    .section_name
                    .as_deref()
                    .is_none_or(|c| s.profile.section_name.as_deref() == Some(c))
            })
            .collect();

        let total_count = matches.len() as i64;
        Ok(matches
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .map(|student| StudentListRow {
                student,
                total_count,
            })
            .collect())
    }

    async fn find_detail(&self, id: i32) -> AppResult<Option<Student>> {
        let state = self.state.lock().unwrap();
        Ok(Self::student(&state, id))
    }

    async fn set_status(&self, change: StatusChange) -> AppResult<usize> {
        self.set_status_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        match state.accounts.get_mut(&change.user_id) {
            Some(account) => {
                account.is_active = change.status;
                account.reviewer_id = change.reviewer_id;
                account.updated_at = Utc::now().naive_utc();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert(&self, new_student: NewStudent) -> AppResult<WriteOutcome> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database {
                operation: "insert student".to_string(),
                source: anyhow::anyhow!("connection reset"),
            });
        }

        let mut state = self.state.lock().unwrap();
        if Self::email_taken(&state, &new_student.email, None) {
            return Ok(WriteOutcome::failure(WriteOutcome::EMAIL_EXISTS));
        }

        let id = state.next_id;
        state.next_id += 1;
        let now = Utc::now().naive_utc();
        let account = new_student.account();
        state.accounts.insert(
            id,
            Account {
                id,
                name: account.name,
                email: account.email,
                role_id: account.role_id,
                is_active: account.is_active,
                is_email_verified: false,
                reviewer_id: None,
                created_at: now,
                updated_at: now,
            },
        );

        let profile = new_student.profile(id);
        state.profiles.insert(
            id,
            StudentProfile {
                gender: profile.gender,
                dob: profile.dob,
                phone: profile.phone,
                admission_date: profile.admission_date,
                class_name: profile.class_name,
                section_name: profile.section_name,
                roll: profile.roll,
                father_name: profile.father_name,
                father_phone: profile.father_phone,
                mother_name: profile.mother_name,
                mother_phone: profile.mother_phone,
                guardian_name: profile.guardian_name,
                guardian_phone: profile.guardian_phone,
                relation_of_guardian: profile.relation_of_guardian,
                current_address: profile.current_address,
                permanent_address: profile.permanent_address,
            },
        );

        Ok(WriteOutcome::success(WriteOutcome::STUDENT_ADDED, id))
    }

    async fn update(&self, id: i32, changes: StudentChanges) -> AppResult<WriteOutcome> {
        let mut state = self.state.lock().unwrap();
        if Self::student(&state, id).is_none() {
            return Ok(WriteOutcome::failure(WriteOutcome::STUDENT_NOT_FOUND));
        }
        if let Some(email) = changes.email.as_deref()
            && Self::email_taken(&state, email, Some(id))
        {
            return Ok(WriteOutcome::failure(WriteOutcome::EMAIL_EXISTS));
        }

        let account_changes = changes.account_changes(Utc::now().naive_utc());
        if let Some(account) = state.accounts.get_mut(&id) {
            if let Some(name) = account_changes.name {
                account.name = name;
            }
            if let Some(email) = account_changes.email {
                account.email = email;
            }
            if let Some(is_active) = account_changes.is_active {
                account.is_active = is_active;
            }
            account.updated_at = account_changes.updated_at;
        }
        if let Some(profile) = state.profiles.get_mut(&id) {
            changes.profile_changes().apply_to(profile);
        }

        Ok(WriteOutcome::success(WriteOutcome::STUDENT_UPDATED, id))
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>> {
        Ok(self.state.lock().unwrap().accounts.get(&id).cloned())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ClassStore for InMemoryStore {
    async fn list_classes(&self) -> AppResult<Vec<Class>> {
        Ok(self.classes.clone())
    }

    async fn list_sections(&self) -> AppResult<Vec<Section>> {
        Ok(self.sections.clone())
    }
}
