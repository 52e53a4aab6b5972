//! Student repository for async database operations.
//!
//! A student spans `users` and `user_profiles`; writes touch both tables in
//! one transaction.

use async_trait::async_trait;
use chrono::Utc;
use diesel::PgTextExpressionMethods;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::{StatusChange, StudentFilter, StudentListRow, StudentStore, WriteOutcome};
use crate::db::AsyncDbPool;
use crate::error::{AppResult, DatabaseErrorConverter};
use crate::models::{NewStudent, Role, Student, StudentChanges};
use crate::schema::{user_profiles, users};

#[derive(Clone)]
pub struct StudentRepository {
    pool: AsyncDbPool,
}

impl StudentRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards so the search term matches literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl StudentStore for StudentRepository {
    async fn find_all(&self, filter: &StudentFilter) -> AppResult<Vec<StudentListRow>> {
        let mut conn = self.pool.get().await?;

        let mut query = users::table
            .inner_join(user_profiles::table)
            .filter(users::role_id.eq(Role::Student.id()))
            .select((Student::as_select(), sql::<BigInt>("COUNT(*) OVER()")))
            .order(users::id.asc())
            .limit(filter.limit)
            .offset(filter.offset)
            .into_boxed();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(users::name.ilike(like_pattern(search)));
        }
        if let Some(class_name) = filter.class_name.as_deref() {
            query = query.filter(user_profiles::class_name.eq(class_name));
        }
        if let Some(section_name) = filter.section_name.as_deref() {
            query = query.filter(user_profiles::section_name.eq(section_name));
        }

        let rows: Vec<(Student, i64)> = query
            .load(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "list students"))?;

        Ok(rows
            .into_iter()
            .map(|(student, total_count)| StudentListRow {
                student,
                total_count,
            })
            .collect())
    }

    async fn find_detail(&self, id: i32) -> AppResult<Option<Student>> {
        let mut conn = self.pool.get().await?;

        users::table
            .inner_join(user_profiles::table)
            .filter(users::id.eq(id))
            .filter(users::role_id.eq(Role::Student.id()))
            .select(Student::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "find student detail"))
    }

    async fn set_status(&self, change: StatusChange) -> AppResult<usize> {
        let mut conn = self.pool.get().await?;

        diesel::update(users::table.filter(users::id.eq(change.user_id)))
            .set((
                users::is_active.eq(change.status),
                users::reviewer_id.eq(change.reviewer_id),
                users::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "set student status"))
    }

    async fn insert(&self, new_student: NewStudent) -> AppResult<WriteOutcome> {
        let mut conn = self.pool.get().await?;
        let account = new_student.account();
        let student = &new_student;

        let result = conn
            .transaction::<i32, diesel::result::Error, _>(|conn| {
                async move {
                    let user_id: i32 = diesel::insert_into(users::table)
                        .values(&account)
                        .returning(users::id)
                        .get_result(conn)
                        .await?;

                    diesel::insert_into(user_profiles::table)
                        .values(&student.profile(user_id))
                        .execute(conn)
                        .await?;

                    Ok(user_id)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(user_id) => Ok(WriteOutcome::success(WriteOutcome::STUDENT_ADDED, user_id)),
            Err(e) if DatabaseErrorConverter::is_unique_violation(&e) => {
                Ok(WriteOutcome::failure(WriteOutcome::EMAIL_EXISTS))
            }
            Err(e) => Err(DatabaseErrorConverter::convert_diesel_error(e, "insert student")),
        }
    }

    async fn update(&self, id: i32, changes: StudentChanges) -> AppResult<WriteOutcome> {
        let mut conn = self.pool.get().await?;
        let account_changes = changes.account_changes(Utc::now().naive_utc());
        let profile_changes = changes.profile_changes();

        let result = conn
            .transaction::<bool, diesel::result::Error, _>(|conn| {
                async move {
                    let matched = diesel::update(
                        users::table
                            .filter(users::id.eq(id))
                            .filter(users::role_id.eq(Role::Student.id())),
                    )
                    .set(&account_changes)
                    .execute(conn)
                    .await?;

                    if matched == 0 {
                        return Ok(false);
                    }

                    if !profile_changes.is_empty() {
                        diesel::update(user_profiles::table.find(id))
                            .set(&profile_changes)
                            .execute(conn)
                            .await?;
                    }

                    Ok(true)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(true) => Ok(WriteOutcome::success(WriteOutcome::STUDENT_UPDATED, id)),
            Ok(false) => Ok(WriteOutcome::failure(WriteOutcome::STUDENT_NOT_FOUND)),
            Err(e) if DatabaseErrorConverter::is_unique_violation(&e) => {
                Ok(WriteOutcome::failure(WriteOutcome::EMAIL_EXISTS))
            }
            Err(e) => Err(DatabaseErrorConverter::convert_diesel_error(e, "update student")),
        }
    }
}
