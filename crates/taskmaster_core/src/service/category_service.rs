//! Category Service contract and lookup directory.

use super::task_service::ServiceResult;
use crate::model::category::{Category, CategoryId};
use crate::model::task::Task;
use log::info;

/// External Category Service. Read-only from core's point of view.
pub trait CategoryService {
    fn list(&self) -> ServiceResult<Vec<Category>>;
}

impl<S: CategoryService + ?Sized> CategoryService for &S {
    fn list(&self) -> ServiceResult<Vec<Category>> {
        (**self).list()
    }
}

/// Loaded category list used to resolve task category references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDirectory {
    categories: Vec<Category>,
}

impl CategoryDirectory {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn load<S: CategoryService>(service: &S) -> ServiceResult<Self> {
        let categories = service.list()?;
        info!(
            "event=category_load module=service status=ok count={}",
            categories.len()
        );
        Ok(Self::new(categories))
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Directory entry for the task's category.
    ///
    /// Falls back to the copy embedded in the task when the directory does
    /// not know the id.
    pub fn resolve<'a>(&'a self, task: &'a Task) -> Option<&'a Category> {
        let embedded = task.category()?;
        self.get(embedded.id).or(Some(embedded))
    }

    /// Categories offered for new tasks.
    pub fn active(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|category| !category.archived)
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }
}
