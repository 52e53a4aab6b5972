//! Student models.
//!
//! A student is a `users` row with the student role joined with its
//! `user_profiles` row. Reads embed both halves into [`Student`]; writes are
//! split back into one insert or changeset per table.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::AsExpression;
use diesel::FromSqlRow;
use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;
use utoipa::ToSchema;

// ============================================================================
// Gender
// ============================================================================

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    AsExpression,
    FromSqlRow,
)]
#[diesel(sql_type = Text)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const VALUES: [&'static str; 3] = ["Male", "Female", "Other"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            _ => Err(format!("Unrecognized gender: {}", s)),
        }
    }
}

impl diesel::query_builder::QueryId for Gender {
    type QueryId = Gender;
    const HAS_STATIC_QUERY_ID: bool = false;
}

impl ToSql<Text, Pg> for Gender {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for Gender {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        Ok(s.parse::<Gender>()?)
    }
}

// ============================================================================
// Read models
// ============================================================================

/// The `users` half of a student.
#[derive(Debug, Queryable, Selectable, Serialize, ToSchema, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct StudentAccount {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Login eligibility; `false` once the student is deleted
    #[serde(rename = "systemAccess")]
    pub is_active: bool,
    pub reviewer_id: Option<i32>,
}

/// The `user_profiles` half of a student.
#[derive(Debug, Queryable, Selectable, Serialize, ToSchema, Clone, PartialEq)]
#[diesel(table_name = crate::schema::user_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub gender: Gender,
    pub dob: NaiveDate,
    pub phone: Option<String>,
    pub admission_date: Option<NaiveDate>,
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    #[serde(rename = "section")]
    pub section_name: Option<String>,
    pub roll: Option<i32>,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub mother_name: Option<String>,
    pub mother_phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
}

/// Full student record as returned by list and detail reads.
#[derive(Debug, Queryable, Selectable, Serialize, ToSchema, Clone, PartialEq)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Student {
    #[diesel(embed)]
    #[serde(flatten)]
    pub account: StudentAccount,
    #[diesel(embed)]
    #[serde(flatten)]
    pub profile: StudentProfile,
}

// ============================================================================
// Write models
// ============================================================================

/// Everything needed to create a student, already parsed and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub gender: Gender,
    pub dob: NaiveDate,
    pub phone: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub class_name: Option<String>,
    pub section_name: Option<String>,
    pub roll: Option<i32>,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub mother_name: Option<String>,
    pub mother_phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub system_access: bool,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub role_id: i32,
    pub is_active: bool,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::user_profiles)]
pub struct NewStudentProfile {
    pub user_id: i32,
    pub gender: Gender,
    pub dob: NaiveDate,
    pub phone: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub class_name: Option<String>,
    pub section_name: Option<String>,
    pub roll: Option<i32>,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub mother_name: Option<String>,
    pub mother_phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
}

impl NewStudent {
    pub fn account(&self) -> NewAccount {
        NewAccount {
            name: self.name.clone(),
            email: self.email.clone(),
            role_id: super::Role::Student.id(),
            is_active: self.system_access,
        }
    }

    pub fn profile(&self, user_id: i32) -> NewStudentProfile {
        NewStudentProfile {
            user_id,
            gender: self.gender,
            dob: self.dob,
            phone: self.phone.clone(),
            admission_date: self.admission_date,
            class_name: self.class_name.clone(),
            section_name: self.section_name.clone(),
            roll: self.roll,
            father_name: self.father_name.clone(),
            father_phone: self.father_phone.clone(),
            mother_name: self.mother_name.clone(),
            mother_phone: self.mother_phone.clone(),
            guardian_name: self.guardian_name.clone(),
            guardian_phone: self.guardian_phone.clone(),
            relation_of_guardian: self.relation_of_guardian.clone(),
            current_address: self.current_address.clone(),
            permanent_address: self.permanent_address.clone(),
        }
    }
}

/// Partial update of a student. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub dob: Option<NaiveDate>,
    pub phone: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub class_name: Option<String>,
    pub section_name: Option<String>,
    pub roll: Option<i32>,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub mother_name: Option<String>,
    pub mother_phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub system_access: Option<bool>,
}

/// `updated_at` is always set, so the changeset is never empty.
#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, AsChangeset, Clone, Default, PartialEq)]
#[diesel(table_name = crate::schema::user_profiles)]
pub struct ProfileChanges {
    pub gender: Option<Gender>,
    pub dob: Option<NaiveDate>,
    pub phone: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub class_name: Option<String>,
    pub section_name: Option<String>,
    pub roll: Option<i32>,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub mother_name: Option<String>,
    pub mother_phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
}

impl ProfileChanges {
    /// Diesel refuses to run an UPDATE without any SET clause.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the present fields onto an already loaded profile.
    pub fn apply_to(&self, profile: &mut StudentProfile) {
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = &self.$field {
                    profile.$field = value.clone().into();
                })*
            };
        }
        if let Some(gender) = self.gender {
            profile.gender = gender;
        }
        if let Some(dob) = self.dob {
            profile.dob = dob;
        }
        set!(
            phone,
            admission_date,
            class_name,
            section_name,
            roll,
            father_name,
            father_phone,
            mother_name,
            mother_phone,
            guardian_name,
            guardian_phone,
            relation_of_guardian,
            current_address,
            permanent_address,
        );
    }
}

impl StudentChanges {
    pub fn account_changes(&self, now: NaiveDateTime) -> AccountChanges {
        AccountChanges {
            name: self.name.clone(),
            email: self.email.clone(),
            is_active: self.system_access,
            updated_at: now,
        }
    }

    pub fn profile_changes(&self) -> ProfileChanges {
        ProfileChanges {
            gender: self.gender,
            dob: self.dob,
            phone: self.phone.clone(),
            admission_date: self.admission_date,
            class_name: self.class_name.clone(),
            section_name: self.section_name.clone(),
            roll: self.roll,
            father_name: self.father_name.clone(),
            father_phone: self.father_phone.clone(),
            mother_name: self.mother_name.clone(),
            mother_phone: self.mother_phone.clone(),
            guardian_name: self.guardian_name.clone(),
            guardian_phone: self.guardian_phone.clone(),
            relation_of_guardian: self.relation_of_guardian.clone(),
            current_address: self.current_address.clone(),
            permanent_address: self.permanent_address.clone(),
        }
    }
}
