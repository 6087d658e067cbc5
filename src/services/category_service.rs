use uuid::Uuid;

use crate::{
    db::dao::{CategoryDao, DaoBase},
    db::entities::category,
    error::AppError,
    services::crud_service::{CrudErrors, CrudOp, CrudService},
};

#[derive(Clone)]
pub struct CategoryService {
    categories: CategoryDao,
}

impl CrudService for CategoryService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            create_failed: "Category create failed",
            find_failed: "Category lookup failed",
            not_found: "Category not found",
            update_failed: "Category update failed",
            delete_failed: "Category delete failed",
        }
    }
}

fn required_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Category name required"));
    }
    Ok(name)
}

impl CategoryService {
    pub fn new(categories: CategoryDao) -> Self {
        Self { categories }
    }

    pub async fn list(&self) -> Result<Vec<category::Model>, AppError> {
        self.categories
            .list_categories()
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    pub async fn get(&self, id: Uuid) -> Result<category::Model, AppError> {
        self.categories
            .find_by_id(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> Result<(), AppError> {
        let existing = self
            .categories
            .find_by_name(name)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        match existing {
            Some(existing) if Some(existing.id) != except => Err(AppError::conflict(format!(
                "Category '{name}' already exists"
            ))),
            _ => Ok(()),
        }
    }

    pub async fn create(
        &self,
        name: &str,
        icon_url: Option<String>,
    ) -> Result<category::Model, AppError> {
        let name = required_name(name)?;
        self.ensure_name_free(name, None).await?;
        self.categories
            .create_category(name, icon_url)
            .await
            .map_err(|err| self.map_error(CrudOp::Create, err))
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        icon_url: Option<String>,
    ) -> Result<category::Model, AppError> {
        if let Some(name) = name.as_deref() {
            let name = required_name(name)?;
            self.ensure_name_free(name, Some(id)).await?;
        }
        self.categories
            .update_category(id, name, icon_url)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))
    }

    /// Refused while food items still belong to the category.
    pub async fn delete(&self, id: Uuid) -> Result<Uuid, AppError> {
        let in_use = self
            .categories
            .count_food_items(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        if in_use > 0 {
            return Err(AppError::bad_request(format!(
                "Category still has {in_use} food item(s)"
            )));
        }
        self.categories
            .delete(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Delete, err))
    }
}
