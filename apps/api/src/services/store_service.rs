//! Store registration, lookup, editing and removal.

use tracing::info;

use tableside_core::{Store, StoreDraft, StoreUpdate, StoreView};

use crate::error::{ApiError, ApiResult};
use crate::password::hash_password;
use crate::AppState;

pub struct StoreService {
    state: AppState,
}

impl StoreService {
    pub fn new(state: AppState) -> Self {
        StoreService { state }
    }

    /// Registers a store: required fields first, then the password policy.
    pub async fn register(&self, draft: StoreDraft) -> ApiResult<StoreView> {
        draft.validate_required_fields()?;

        let hash = hash_password(&draft.password)?;
        let store = Store::from_draft(draft, hash);

        self.state.stores.create(&store).await?;
        info!(store_id = %store.id, name = %store.name, "store registered");

        Ok(StoreView::from(&store))
    }

    pub async fn list(&self) -> ApiResult<Vec<StoreView>> {
        let stores = self.state.stores.read_all().await?;
        Ok(stores.iter().map(StoreView::from).collect())
    }

    pub async fn get(&self, store_id: &str) -> ApiResult<StoreView> {
        self.load(store_id).await.map(|store| StoreView::from(&store))
    }

    /// Applies a partial edit. A supplied password goes through the same
    /// policy and hashing as registration.
    pub async fn update(&self, store_id: &str, update: StoreUpdate) -> ApiResult<StoreView> {
        update.validate_supplied_fields()?;

        let current = self.load(store_id).await?;
        let password_hash = update.password.as_deref().map(hash_password).transpose()?;

        let mut store = current.clone();
        update.apply_to(&mut store, password_hash);
        self.state
            .stores
            .replace_if_unchanged(store_id, &current, &store)
            .await?;

        info!(store_id = %store_id, "store updated");
        Ok(StoreView::from(&store))
    }

    /// Seats and orders of the store are left in place.
    pub async fn delete(&self, store_id: &str) -> ApiResult<()> {
        self.state.stores.delete_by_id(store_id).await?;
        info!(store_id = %store_id, "store deleted");
        Ok(())
    }

    /// The full store record, or `NotFound`.
    pub(crate) async fn load(&self, store_id: &str) -> ApiResult<Store> {
        self.state
            .stores
            .find_by_id(store_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("store {store_id}")))
    }
}
