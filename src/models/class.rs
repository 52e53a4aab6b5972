use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Queryable, Selectable, Serialize, ToSchema, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::classes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Class {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Queryable, Selectable, Serialize, ToSchema, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::sections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Section {
    pub id: i32,
    pub name: String,
}
