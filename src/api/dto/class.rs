//! Class and section lookup DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Class, Section};

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassesResponse {
    pub classes: Vec<Class>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SectionsResponse {
    pub sections: Vec<Section>,
}
