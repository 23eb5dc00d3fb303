//! Server-rendered task list: routing, controller, persistence adapters and views.

pub mod config;
pub mod controller;
pub mod error;
pub mod flash;
pub mod params;
pub mod routes;
pub mod store;
pub mod views;

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::store::TaskStore;
use crate::views::Views;

/// Shared handler state. Cloned per request; all fields are handles.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub clock: Arc<dyn Clock + Send + Sync>,
    pub views: Arc<Views>,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>) -> Result<Self, minijinja::Error> {
        Self::with_clock(store, Arc::new(DefaultClock))
    }

    pub fn with_clock(
        store: Arc<dyn TaskStore>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self, minijinja::Error> {
        Ok(Self {
            store,
            clock,
            views: Arc::new(Views::new()?),
        })
    }
}
