use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Role ids seeded by the initial migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub const fn id(self) -> i32 {
        match self {
            Role::Admin => 1,
            Role::Teacher => 2,
            Role::Student => 3,
        }
    }
}

/// Generic account row, shared by every role.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Account {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role_id: i32,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub reviewer_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
