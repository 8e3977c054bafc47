//! The list controller: one instance per paginated REST collection
//!
//! [`ListController`] mediates between a presentation layer and a paginated
//! collection for exactly one entity type. It owns the filter state, the
//! paging metadata, the request status, and the current page of entities;
//! everything is mutated through its operations only.
//!
//! # Concurrency
//!
//! All operations are async and non-blocking. Shared state sits behind a
//! mutex whose guard is never held across an await; overlapping fetches are
//! serialized by outcome instead: every fetch takes a monotonically
//! increasing request token, and a response whose token is no longer the
//! latest issued is discarded on arrival. In-flight requests are not
//! aborted.
//!
//! # Example
//!
//! ```rust,ignore
//! use listsync::prelude::*;
//!
//! let client = Arc::new(RestResource::new(&config.client)?);
//! let vouchers: ListController<Voucher, _> =
//!     ListController::new("vouchers", client, ControllerOptions::default());
//! vouchers.init().await?;
//!
//! vouchers
//!     .update_filters(FilterPatch::new().set("isActive", true))
//!     .await?;
//! let snapshot = vouchers.snapshot();
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use http::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::debounce::Debouncer;
use crate::error::ApiError;
use crate::page::PageInfo;
use crate::query::{FilterPatch, FilterState};
use crate::transport::{decode_envelope, decode_item, decode_list, HttpResource};

/// An entity that can live in a [`ListController`]
///
/// The identity is what in-place patching and local removal match on.
pub trait ListEntity: Clone + DeserializeOwned + Send + Sync + 'static {
    /// Identifier type, rendered into request paths
    type Id: PartialEq + Clone + fmt::Display + Send + Sync + 'static;

    /// The entity's identity
    fn id(&self) -> Self::Id;
}

/// Controller-wide request status; exactly one value at a time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestStatus {
    /// Nothing fetched yet, or a dismissed error
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch succeeded
    Success,
    /// The last fetch failed; the list was cleared
    Error(String),
}

/// How mutations bring local list state back in sync with server truth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcilePolicy {
    /// Patch the affected entity in place; cheap, but pagination and sort
    /// position are not re-validated
    #[default]
    Patch,
    /// Refetch the current page after every mutation
    Refetch,
}

/// Construction parameters for a controller
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Filters merged over the built-in defaults at mount
    pub initial_filters: FilterPatch,
    /// Page size for list fetches
    pub page_size: u64,
    /// Quiet period for search debouncing
    pub debounce: Duration,
    /// Post-mutation reconciliation policy
    pub reconcile: ReconcilePolicy,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            initial_filters: FilterPatch::new(),
            page_size: 20,
            debounce: Duration::from_millis(300),
            reconcile: ReconcilePolicy::Patch,
        }
    }
}

impl From<&ControllerConfig> for ControllerOptions {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            initial_filters: FilterPatch::new(),
            page_size: config.page_size,
            debounce: Duration::from_millis(config.debounce_ms),
            reconcile: config.reconcile,
        }
    }
}

/// A cloned view of controller state for the presentation layer
#[derive(Debug, Clone)]
pub struct ListSnapshot<E> {
    /// Current page of entities, in server response order
    pub items: Vec<E>,
    /// Paging metadata
    pub page: PageInfo,
    /// Controller-wide status
    pub status: RequestStatus,
    /// Active filters
    pub filters: FilterState,
}

struct ListState<E> {
    items: Vec<E>,
    page: PageInfo,
    filters: FilterState,
    status: RequestStatus,
    latest_token: u64,
}

/// Client-side controller for one paginated REST collection
///
/// Cheap to clone; clones share the same state, so a clone handed to a
/// background task (the debounced search) operates on the same list.
pub struct ListController<E: ListEntity, R: HttpResource> {
    resource: String,
    client: Arc<R>,
    state: Arc<Mutex<ListState<E>>>,
    defaults: FilterState,
    debouncer: Debouncer,
    debounce_window: Duration,
    reconcile: ReconcilePolicy,
}

impl<E: ListEntity, R: HttpResource> Clone for ListController<E, R> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
            client: Arc::clone(&self.client),
            state: Arc::clone(&self.state),
            defaults: self.defaults.clone(),
            debouncer: self.debouncer.clone(),
            debounce_window: self.debounce_window,
            reconcile: self.reconcile,
        }
    }
}

impl<E: ListEntity, R: HttpResource + 'static> ListController<E, R> {
    /// Create a controller for the collection at `resource` (a path segment
    /// such as `"vouchers"`)
    ///
    /// `options.initial_filters` are merged over the built-in defaults
    /// (`sortBy = createdAt`, `sortOrder = desc`) and become what
    /// [`Self::reset_filters`] restores. No request is issued until
    /// [`Self::init`] or another operation runs.
    pub fn new(resource: impl Into<String>, client: Arc<R>, options: ControllerOptions) -> Self {
        let mut defaults = FilterState::default();
        defaults.apply(&options.initial_filters);

        let state = ListState {
            items: Vec::new(),
            page: PageInfo::new(options.page_size),
            filters: defaults.clone(),
            status: RequestStatus::Idle,
            latest_token: 0,
        };

        Self {
            resource: resource.into(),
            client,
            state: Arc::new(Mutex::new(state)),
            defaults,
            debouncer: Debouncer::new(),
            debounce_window: options.debounce,
            reconcile: options.reconcile,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ListState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn entity_path(&self, id: &E::Id) -> String {
        format!("{}/{id}", self.resource)
    }

    /// The mount fetch: page 1 with the merged initial filters
    pub async fn init(&self) -> Result<(), ApiError> {
        self.fetch_list(Some(1)).await
    }

    /// Fetch a page of the collection with the current filters
    ///
    /// `None` refetches the current page. On success the item list and the
    /// paging metadata are replaced wholesale from the server response; on
    /// failure the list is cleared so an error banner is never shown next
    /// to out-of-sync data. A response that has been superseded by a newer
    /// fetch is discarded without touching state.
    pub async fn fetch_list(&self, page: Option<u64>) -> Result<(), ApiError> {
        let (token, pairs) = {
            let mut state = self.lock_state();
            let page = page.unwrap_or(state.page.current_page);
            state.status = RequestStatus::Loading;
            state.latest_token += 1;
            (
                state.latest_token,
                state.filters.query_pairs(page, state.page.limit),
            )
        };

        tracing::debug!(resource = %self.resource, token, "fetching list");
        let result = self
            .client
            .request(Method::GET, &self.resource, &pairs, None)
            .await;

        let decoded = match result {
            Ok(raw) => decode_envelope(raw).and_then(decode_list::<E>),
            Err(err) => Err(ApiError::from(err)),
        };

        let mut state = self.lock_state();
        if state.latest_token != token {
            tracing::warn!(resource = %self.resource, token, "discarding stale list response");
            return Ok(());
        }

        match decoded {
            Ok(list) => {
                state.items = list.items;
                state.page = list.pagination.normalized();
                state.status = RequestStatus::Success;
                Ok(())
            }
            Err(err) => {
                tracing::error!(resource = %self.resource, error = %err, "list fetch failed");
                state.items.clear();
                state.status = RequestStatus::Error(err.to_string());
                Err(err)
            }
        }
    }

    /// Shallow-merge a filter patch and refetch from page 1
    ///
    /// Any filter change resets to page 1: a filtered result set at a stale
    /// page number may be out of range.
    pub async fn update_filters(&self, patch: FilterPatch) -> Result<(), ApiError> {
        {
            let mut state = self.lock_state();
            state.filters.apply(&patch);
        }
        self.fetch_list(Some(1)).await
    }

    /// Debounced search-as-you-type
    ///
    /// The text is merged into the search constraint only after the quiet
    /// window elapses without another call; then page 1 is refetched. Only
    /// the last call within the window has any effect.
    pub fn update_search(&self, text: impl Into<String>) {
        let text = text.into();
        let this = self.clone();
        self.debouncer.schedule(self.debounce_window, move || async move {
            {
                let mut state = this.lock_state();
                state.filters.set_search(&text);
            }
            if let Err(err) = this.fetch_list(Some(1)).await {
                tracing::debug!(error = %err, "debounced search fetch failed");
            }
        });
    }

    /// Restore the merged initial defaults and refetch from page 1
    pub async fn reset_filters(&self) -> Result<(), ApiError> {
        {
            let mut state = self.lock_state();
            state.filters = self.defaults.clone();
        }
        self.fetch_list(Some(1)).await
    }

    /// Navigate to a page, clamped into `[1, max(total_pages, 1)]`
    pub async fn change_page(&self, page: u64) -> Result<(), ApiError> {
        let target = self.lock_state().page.clamp_page(page);
        self.fetch_list(Some(target)).await
    }

    /// Change the page size and refetch from page 1
    ///
    /// The refetch is eager: the new limit takes effect immediately rather
    /// than on whatever operation happens to fetch next.
    pub async fn change_limit(&self, limit: u64) -> Result<(), ApiError> {
        {
            let mut state = self.lock_state();
            state.page.limit = limit.max(1);
        }
        self.fetch_list(Some(1)).await
    }

    /// Create an entity
    ///
    /// On success page 1 is refetched so server-computed fields and the
    /// correct sort position are reflected, and the created entity is
    /// returned. On failure the list is left untouched; validation and
    /// conflict failures come back as their distinguished [`ApiError`]
    /// variants for inline display.
    pub async fn create<P: Serialize + Sync>(&self, payload: &P) -> Result<E, ApiError> {
        let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
        let raw = self
            .client
            .request(Method::POST, &self.resource, &[], Some(body))
            .await
            .map_err(ApiError::from)?;
        let entity: E = decode_item(decode_envelope(raw)?)?;

        if let Err(err) = self.fetch_list(Some(1)).await {
            tracing::warn!(resource = %self.resource, error = %err, "refetch after create failed");
        }
        Ok(entity)
    }

    /// Update an entity, reconciling per the controller's policy
    ///
    /// Under [`ReconcilePolicy::Patch`] the returned entity replaces the
    /// matching one in place by identity; pagination and sort position are
    /// not re-validated. Under [`ReconcilePolicy::Refetch`] the current
    /// page is refetched instead.
    pub async fn update<P: Serialize + Sync>(
        &self,
        id: &E::Id,
        payload: &P,
    ) -> Result<E, ApiError> {
        let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
        let path = self.entity_path(id);
        let raw = self
            .client
            .request(Method::PUT, &path, &[], Some(body))
            .await
            .map_err(ApiError::from)?;
        let entity: E = decode_item(decode_envelope(raw)?)?;

        self.reconcile_entity(id, &entity).await;
        Ok(entity)
    }

    /// Flip a boolean field through the entity's action endpoint
    /// (`/{resource}/{id}/{action}`), with the same reconciliation contract
    /// as [`Self::update`]
    pub async fn toggle(&self, id: &E::Id, action: &str) -> Result<E, ApiError> {
        let path = format!("{}/{action}", self.entity_path(id));
        let raw = self
            .client
            .request(Method::POST, &path, &[], None)
            .await
            .map_err(ApiError::from)?;
        let entity: E = decode_item(decode_envelope(raw)?)?;

        self.reconcile_entity(id, &entity).await;
        Ok(entity)
    }

    /// Delete an entity
    ///
    /// Under [`ReconcilePolicy::Patch`] the entity is removed locally, the
    /// total count is decremented and the page count recomputed; when the
    /// clamped current page moves (the page just viewed no longer exists),
    /// the new page is refetched. Under [`ReconcilePolicy::Refetch`] the
    /// (clamped) current page is always refetched.
    pub async fn delete(&self, id: &E::Id) -> Result<(), ApiError> {
        let path = self.entity_path(id);
        let raw = self
            .client
            .request(Method::DELETE, &path, &[], None)
            .await
            .map_err(ApiError::from)?;
        decode_envelope(raw)?;

        let moved = {
            let mut state = self.lock_state();
            state.items.retain(|e| e.id() != *id);
            state.page.recompute_after_removal()
        };

        if moved || self.reconcile == ReconcilePolicy::Refetch {
            self.fetch_list(None).await?;
        }
        Ok(())
    }

    /// Fetch a single entity by id; does not touch list state
    pub async fn get(&self, id: &E::Id) -> Result<E, ApiError> {
        let path = self.entity_path(id);
        let raw = self
            .client
            .request(Method::GET, &path, &[], None)
            .await
            .map_err(ApiError::from)?;
        decode_item(decode_envelope(raw)?)
    }

    /// Clear a fetch error back to idle
    pub fn dismiss_error(&self) {
        let mut state = self.lock_state();
        if matches!(state.status, RequestStatus::Error(_)) {
            state.status = RequestStatus::Idle;
        }
    }

    /// A cloned view of the current state for rendering
    pub fn snapshot(&self) -> ListSnapshot<E> {
        let state = self.lock_state();
        ListSnapshot {
            items: state.items.clone(),
            page: state.page,
            status: state.status.clone(),
            filters: state.filters.clone(),
        }
    }

    /// Cancel any pending debounced search
    ///
    /// Called on teardown so a scheduled callback never runs against a
    /// controller the presentation layer has already let go of. Requests
    /// already in flight are not aborted; their stale responses are
    /// discarded by the token check.
    pub fn shutdown(&self) {
        self.debouncer.cancel();
    }

    async fn reconcile_entity(&self, id: &E::Id, entity: &E) {
        match self.reconcile {
            ReconcilePolicy::Patch => {
                let mut state = self.lock_state();
                if let Some(slot) = state.items.iter_mut().find(|e| e.id() == *id) {
                    *slot = entity.clone();
                }
            }
            ReconcilePolicy::Refetch => {
                if let Err(err) = self.fetch_list(None).await {
                    tracing::warn!(resource = %self.resource, error = %err, "refetch after mutation failed");
                }
            }
        }
    }
}
