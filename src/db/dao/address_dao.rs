use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, Order, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use super::base::stamp_new;
use super::{DaoBase, DaoResult};
use crate::db::entities::{address, prelude::Address};

#[derive(Clone)]
pub struct AddressDao {
    db: DatabaseConnection,
}

impl DaoBase for AddressDao {
    type Entity = Address;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Debug, Clone)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Default, Clone)]
pub struct AddressChanges {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

/// Points the user's default flag at `address_id`, clearing it everywhere else.
async fn move_default<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    address_id: Uuid,
) -> DaoResult<()> {
    let now = Utc::now().fixed_offset();
    Address::update_many()
        .col_expr(address::Column::IsDefault, Expr::value(false))
        .col_expr(address::Column::UpdatedAt, Expr::value(now))
        .filter(address::Column::UserId.eq(user_id))
        .filter(address::Column::IsDefault.eq(true))
        .filter(address::Column::Id.ne(address_id))
        .exec(conn)
        .await?;
    Address::update_many()
        .col_expr(address::Column::IsDefault, Expr::value(true))
        .col_expr(address::Column::UpdatedAt, Expr::value(now))
        .filter(address::Column::Id.eq(address_id))
        .filter(address::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(())
}

impl AddressDao {
    /// All addresses of a user, oldest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> DaoResult<Vec<address::Model>> {
        self.find_all(Some((address::Column::CreatedAt, Order::Asc)), move |query| {
            query.filter(address::Column::UserId.eq(user_id))
        })
        .await
    }

    pub async fn find_default(&self, user_id: Uuid) -> DaoResult<Option<address::Model>> {
        self.find_one(move |query| {
            query
                .filter(address::Column::UserId.eq(user_id))
                .filter(address::Column::IsDefault.eq(true))
        })
        .await
    }

    pub async fn create_address(
        &self,
        user_id: Uuid,
        data: NewAddress,
        make_default: bool,
    ) -> DaoResult<address::Model> {
        let txn = self.db.begin().await?;
        if make_default {
            Address::update_many()
                .col_expr(address::Column::IsDefault, Expr::value(false))
                .filter(address::Column::UserId.eq(user_id))
                .filter(address::Column::IsDefault.eq(true))
                .exec(&txn)
                .await?;
        }
        let mut active = address::ActiveModel {
            user_id: Set(user_id),
            street: Set(data.street),
            city: Set(data.city),
            state: Set(data.state),
            zip_code: Set(data.zip_code),
            is_default: Set(make_default),
            ..Default::default()
        };
        stamp_new(&mut active);
        let created = active.insert(&txn).await?;
        txn.commit().await?;
        Ok(created)
    }

    /// Applies field changes and, when `new_default` is set, moves the default flag
    /// to that address in the same transaction.
    pub async fn update_address(
        &self,
        existing: address::Model,
        changes: AddressChanges,
        new_default: Option<Uuid>,
    ) -> DaoResult<address::Model> {
        let txn = self.db.begin().await?;
        let user_id = existing.user_id;
        let id = existing.id;
        if let Some(default_id) = new_default {
            move_default(&txn, user_id, default_id).await?;
        }

        let mut active = existing.into_active_model();
        if let Some(street) = changes.street {
            active.street = Set(street);
        }
        if let Some(city) = changes.city {
            active.city = Set(city);
        }
        if let Some(state) = changes.state {
            active.state = Set(state);
        }
        if let Some(zip_code) = changes.zip_code {
            active.zip_code = Set(zip_code);
        }
        if let Some(default_id) = new_default {
            active.is_default = Set(default_id == id);
        }
        active.updated_at = Set(Utc::now().fixed_offset());
        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes an address and, if given, promotes another one to default.
    pub async fn delete_address(&self, existing: &address::Model, promote: Option<Uuid>) -> DaoResult<()> {
        let txn = self.db.begin().await?;
        Address::delete_by_id(existing.id).exec(&txn).await?;
        if let Some(promoted) = promote {
            move_default(&txn, existing.user_id, promoted).await?;
        }
        txn.commit().await?;
        Ok(())
    }
}
