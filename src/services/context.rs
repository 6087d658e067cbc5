use sea_orm::DatabaseConnection;

use crate::{
    auth::{TokenService, jwt::JwtKeys},
    config::AuthConfig,
    db::dao::DaoContext,
    services::{
        address_service::AddressService, auth_service::AuthService,
        cart_service::CartService, category_service::CategoryService,
        food_item_service::FoodItemService, order_service::OrderService,
        report_service::ReportService, review_service::ReviewService,
        user_service::UserService, wishlist_service::WishlistService,
    },
    state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn tokens(&self, jwt: &JwtKeys, cfg: &AuthConfig) -> TokenService {
        TokenService::new(
            self.daos.user(),
            self.daos.refresh_token(),
            jwt.clone(),
            cfg,
        )
    }

    pub fn auth(&self, jwt: &JwtKeys, cfg: &AuthConfig) -> AuthService {
        AuthService::new(self.daos.user(), self.tokens(jwt, cfg))
    }

    pub fn user(&self) -> UserService {
        UserService::new(self.daos.user(), self.daos.refresh_token())
    }

    pub fn category(&self) -> CategoryService {
        CategoryService::new(self.daos.category())
    }

    pub fn food_item(&self) -> FoodItemService {
        FoodItemService::new(
            self.daos.food_item(),
            self.daos.category(),
            self.daos.review(),
        )
    }

    pub fn cart(&self) -> CartService {
        CartService::new(self.daos.cart(), self.daos.food_item())
    }

    pub fn order(&self) -> OrderService {
        OrderService::new(self.daos.order(), self.daos.cart(), self.daos.address())
    }

    pub fn address(&self) -> AddressService {
        AddressService::new(self.daos.address())
    }

    pub fn review(&self) -> ReviewService {
        ReviewService::new(self.daos.review(), self.daos.food_item())
    }

    pub fn wishlist(&self) -> WishlistService {
        WishlistService::new(
            self.daos.wishlist(),
            self.daos.cart(),
            self.daos.food_item(),
        )
    }

    pub fn report(&self) -> ReportService {
        ReportService::new(
            self.daos.report(),
            self.daos.user(),
            self.daos.food_item(),
            self.daos.order(),
        )
    }
}
