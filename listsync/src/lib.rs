//! # listsync
//!
//! Client-side controller for paginated REST collections.
//!
//! Admin-style frontends repeat one pattern for every entity they manage:
//! fetch a filtered, sorted, paginated page of a collection; debounce
//! search-as-you-type; create, update, toggle, and delete entities; and keep
//! the local list consistent afterwards. This crate implements that pattern
//! once, generically, against any REST backend with a `{ success, message,
//! data }` response envelope.
//!
//! ## Features
//!
//! - **One controller per collection**: [`controller::ListController`] owns
//!   filter, paging, status, and list state; all mutation goes through its
//!   operations
//! - **Typed filters**: unset is the absence of a key, never an empty string
//!   on the wire
//! - **Debounced search**: one request per pause in typing, not per keystroke
//! - **Race-free fetches**: overlapping list requests are serialized by a
//!   request token; stale responses are discarded on arrival
//! - **Explicit reconciliation**: in-place patch or refetch after mutations
//!   is a per-controller policy, not an accident
//! - **Errors as values**: validation, conflict, and not-found failures come
//!   back as distinguished [`error::ApiError`] variants
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use listsync::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Voucher {
//!     id: u64,
//!     code: String,
//!     active: bool,
//! }
//!
//! impl ListEntity for Voucher {
//!     type Id = u64;
//!     fn id(&self) -> u64 {
//!         self.id
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let client = Arc::new(RestResource::new(&config.client)?);
//!     let vouchers: ListController<Voucher, _> = ListController::new(
//!         "vouchers",
//!         client,
//!         ControllerOptions::from(&config.controller),
//!     );
//!
//!     vouchers.init().await.ok();
//!     vouchers.update_search("summer");
//!     let snapshot = vouchers.snapshot();
//!     println!("{} vouchers", snapshot.page.total_count);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod page;
pub mod query;
pub mod transport;

pub mod observability;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ClientConfig, Config, ControllerConfig};
    pub use crate::controller::{
        ControllerOptions, ListController, ListEntity, ListSnapshot, ReconcilePolicy,
        RequestStatus,
    };
    pub use crate::debounce::Debouncer;
    pub use crate::error::{ApiError, Error, Result, TransportError};
    pub use crate::observability::init_tracing;
    pub use crate::page::PageInfo;
    pub use crate::query::{FilterPatch, FilterState, FilterValue, SortOrder};
    pub use crate::transport::{
        HttpResource, ListPayload, RawResponse, RestResource, StaticToken, TokenProvider,
    };
}

pub use error::{Error, Result};
