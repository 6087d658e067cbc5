use sea_orm::DatabaseConnection;

use super::{
    AddressDao, CartDao, CategoryDao, DaoBase, FoodItemDao, OrderDao, RefreshTokenDao, ReportDao,
    ReviewDao, UserDao, WishlistDao,
};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn refresh_token(&self) -> RefreshTokenDao {
        DaoBase::new(&self.db)
    }

    pub fn category(&self) -> CategoryDao {
        DaoBase::new(&self.db)
    }

    pub fn food_item(&self) -> FoodItemDao {
        DaoBase::new(&self.db)
    }

    pub fn cart(&self) -> CartDao {
        DaoBase::new(&self.db)
    }

    pub fn order(&self) -> OrderDao {
        DaoBase::new(&self.db)
    }

    pub fn address(&self) -> AddressDao {
        DaoBase::new(&self.db)
    }

    pub fn review(&self) -> ReviewDao {
        DaoBase::new(&self.db)
    }

    pub fn wishlist(&self) -> WishlistDao {
        DaoBase::new(&self.db)
    }

    pub fn report(&self) -> ReportDao {
        DaoBase::new(&self.db)
    }
}
