use uuid::Uuid;

use crate::{
    db::dao::{AddressChanges, AddressDao, DaoBase, NewAddress},
    db::entities::address,
    error::AppError,
    services::crud_service::{CrudErrors, CrudOp, CrudService},
};

// Planning helpers take the user's addresses oldest first, as `list_for_user` returns them.

/// Whether a new address becomes the default.
pub fn plan_create(existing: &[address::Model], requested: Option<bool>) -> bool {
    requested == Some(true) || !existing.iter().any(|address| address.is_default)
}

/// Which address should hold the default flag after an update, if it changes at all.
pub fn plan_update(
    existing: &[address::Model],
    target: &address::Model,
    requested: Option<bool>,
) -> Result<Option<Uuid>, AppError> {
    match requested {
        Some(true) if !target.is_default => Ok(Some(target.id)),
        Some(false) if target.is_default => successor(existing, target)
            .map(Some)
            .ok_or_else(|| AppError::bad_request("The only address must remain the default")),
        _ => Ok(None),
    }
}

/// The address promoted when `target` is deleted. The sole address cannot be deleted.
pub fn plan_delete(
    existing: &[address::Model],
    target: &address::Model,
) -> Result<Option<Uuid>, AppError> {
    let successor = successor(existing, target);
    if successor.is_none() {
        return Err(AppError::bad_request("Cannot delete the only address"));
    }
    Ok(successor.filter(|_| target.is_default))
}

fn successor(existing: &[address::Model], target: &address::Model) -> Option<Uuid> {
    existing
        .iter()
        .find(|address| address.id != target.id)
        .map(|address| address.id)
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(format!("{field} required")));
    }
    Ok(())
}

fn validate_new(data: &NewAddress) -> Result<(), AppError> {
    require("Street", &data.street)?;
    require("City", &data.city)?;
    require("State", &data.state)?;
    require("Zip code", &data.zip_code)
}

fn validate_changes(changes: &AddressChanges) -> Result<(), AppError> {
    let fields = [
        ("Street", &changes.street),
        ("City", &changes.city),
        ("State", &changes.state),
        ("Zip code", &changes.zip_code),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            require(field, value)?;
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct AddressService {
    addresses: AddressDao,
}

impl CrudService for AddressService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            create_failed: "Address create failed",
            find_failed: "Address lookup failed",
            not_found: "Address not found",
            update_failed: "Address update failed",
            delete_failed: "Address delete failed",
        }
    }
}

impl AddressService {
    pub fn new(addresses: AddressDao) -> Self {
        Self { addresses }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<address::Model>, AppError> {
        self.addresses
            .list_for_user(user_id)
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    async fn list_with_target(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<(Vec<address::Model>, address::Model), AppError> {
        let existing = self.list(user_id).await?;
        let target = existing
            .iter()
            .find(|address| address.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found(self.errors().not_found))?;
        Ok((existing, target))
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<address::Model, AppError> {
        self.addresses
            .find_owned(id, user_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        data: NewAddress,
        is_default: Option<bool>,
    ) -> Result<address::Model, AppError> {
        validate_new(&data)?;
        let existing = self.list(user_id).await?;
        let make_default = plan_create(&existing, is_default);
        self.addresses
            .create_address(user_id, data, make_default)
            .await
            .map_err(|err| self.map_error(CrudOp::Create, err))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: AddressChanges,
        is_default: Option<bool>,
    ) -> Result<address::Model, AppError> {
        validate_changes(&changes)?;
        let (existing, target) = self.list_with_target(user_id, id).await?;
        let new_default = plan_update(&existing, &target, is_default)?;
        self.addresses
            .update_address(target, changes, new_default)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))
    }

    pub async fn set_default(&self, user_id: Uuid, id: Uuid) -> Result<address::Model, AppError> {
        self.update(user_id, id, AddressChanges::default(), Some(true))
            .await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<Uuid, AppError> {
        let (existing, target) = self.list_with_target(user_id, id).await?;
        let promote = plan_delete(&existing, &target)?;
        self.addresses
            .delete_address(&target, promote)
            .await
            .map_err(|err| self.map_error(CrudOp::Delete, err))?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::{AddressService, plan_create, plan_delete, plan_update};
    use crate::{
        db::dao::{AddressChanges, NewAddress},
        db::entities::address,
        error::AppError,
        services::ServiceContext,
        test_helpers::address_model,
    };

    fn service(mock: MockDatabase) -> AddressService {
        ServiceContext::new(&mock.into_connection()).address()
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn addresses(user_id: Uuid, defaults: &[bool]) -> Vec<address::Model> {
        defaults
            .iter()
            .map(|is_default| address_model(Uuid::new_v4(), user_id, *is_default))
            .collect()
    }

    #[test]
    fn first_address_becomes_default() {
        assert!(plan_create(&[], None));
        assert!(plan_create(&[], Some(false)));
        let existing = addresses(Uuid::new_v4(), &[true]);
        assert!(!plan_create(&existing, None));
        assert!(plan_create(&existing, Some(true)));
    }

    #[test]
    fn marking_b_default_moves_the_flag_from_a() {
        let existing = addresses(Uuid::new_v4(), &[true, false]);
        let plan = plan_update(&existing, &existing[1], Some(true)).expect("plan");
        assert_eq!(plan, Some(existing[1].id));
        assert_eq!(plan_update(&existing, &existing[0], Some(true)).expect("plan"), None);
    }

    #[test]
    fn unmarking_the_default_promotes_another_address() {
        let existing = addresses(Uuid::new_v4(), &[false, true]);
        let plan = plan_update(&existing, &existing[1], Some(false)).expect("plan");
        assert_eq!(plan, Some(existing[0].id));
    }

    #[test]
    fn unmarking_the_sole_address_is_rejected() {
        let existing = addresses(Uuid::new_v4(), &[true]);
        assert!(matches!(
            plan_update(&existing, &existing[0], Some(false)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn deleting_the_sole_address_is_rejected() {
        let existing = addresses(Uuid::new_v4(), &[true]);
        assert!(matches!(
            plan_delete(&existing, &existing[0]),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn deleting_the_default_promotes_exactly_the_oldest_remaining() {
        let existing = addresses(Uuid::new_v4(), &[false, true, false]);
        assert_eq!(
            plan_delete(&existing, &existing[1]).expect("plan"),
            Some(existing[0].id)
        );
        assert_eq!(plan_delete(&existing, &existing[2]).expect("plan"), None);
    }

    #[tokio::test]
    async fn create_rejects_blank_fields() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let err = service
            .create(
                Uuid::new_v4(),
                NewAddress {
                    street: " ".to_string(),
                    city: "Springfield".to_string(),
                    state: "IL".to_string(),
                    zip_code: "62701".to_string(),
                },
                None,
            )
            .await
            .expect_err("should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn set_default_swaps_in_one_transaction() {
        let user_id = Uuid::new_v4();
        let existing = addresses(user_id, &[true, false]);
        let mut promoted = existing[1].clone();
        promoted.is_default = true;
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([existing.clone()])
                .append_exec_results([exec(1), exec(1)])
                .append_query_results([[promoted.clone()]]),
        );

        let updated = service
            .set_default(user_id, existing[1].id)
            .await
            .expect("set default should succeed");
        assert!(updated.is_default);
    }

    #[tokio::test]
    async fn delete_of_another_users_address_is_not_found() {
        let user_id = Uuid::new_v4();
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([addresses(user_id, &[true, false])]),
        );

        let err = service
            .delete(user_id, Uuid::new_v4())
            .await
            .expect_err("should fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_without_default_change_keeps_flags() {
        let user_id = Uuid::new_v4();
        let existing = addresses(user_id, &[true]);
        let mut renamed = existing[0].clone();
        renamed.street = "2 Oak Ave".to_string();
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([existing.clone()])
                .append_query_results([[renamed.clone()]]),
        );

        let updated = service
            .update(
                user_id,
                existing[0].id,
                AddressChanges {
                    street: Some("2 Oak Ave".to_string()),
                    ..AddressChanges::default()
                },
                None,
            )
            .await
            .expect("update should succeed");
        assert_eq!(updated.street, "2 Oak Ave");
        assert!(updated.is_default);
    }
}
