use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{Class, Section};
use crate::repositories::ClassStore;

/// Read-only class and section lookups for the student form.
#[derive(Clone)]
pub struct ClassService {
    repo: Arc<dyn ClassStore>,
}

impl ClassService {
    pub fn new(repo: Arc<dyn ClassStore>) -> Self {
        Self { repo }
    }

    pub async fn list_classes(&self) -> AppResult<Vec<Class>> {
        self.repo.list_classes().await
    }

    pub async fn list_sections(&self) -> AppResult<Vec<Section>> {
        self.repo.list_sections().await
    }
}
