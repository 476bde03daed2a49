//! Shared state handed to every axum handler.

use std::sync::Arc;

use searoute_lib::{GridLoadError, MaskSource, RouterConfig, SeaRouter, WaterGrid, WaterGridStore};

/// Cheaply cloneable handle to the grid store and routing defaults.
///
/// The grid is loaded lazily: [`AppState::grid`] joins or starts the load and
/// handlers degrade to straight-line answers while it is unavailable.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: WaterGridStore<MaskSource>,
    router: RouterConfig,
}

impl AppState {
    /// State around a store that has not been loaded yet.
    pub fn new(store: WaterGridStore<MaskSource>, router: RouterConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, router }),
        }
    }

    /// State for the mask at `location` (path or URL).
    pub fn open(location: &str, router: RouterConfig) -> Self {
        Self::new(WaterGridStore::new(MaskSource::open(location)), router)
    }

    /// State around an already decoded grid.
    pub fn with_grid(grid: Arc<WaterGrid>, router: RouterConfig) -> Self {
        let source = MaskSource::open("<preloaded>");
        Self::new(WaterGridStore::with_grid(source, grid), router)
    }

    pub fn store(&self) -> &WaterGridStore<MaskSource> {
        &self.inner.store
    }

    pub fn router_config(&self) -> &RouterConfig {
        &self.inner.router
    }

    /// The loaded grid, loading it first if needed.
    pub async fn grid(&self) -> Result<Arc<WaterGrid>, GridLoadError> {
        self.inner.store.load().await
    }

    /// Router over the loaded grid with `config`.
    pub async fn router(&self, config: RouterConfig) -> Result<SeaRouter, GridLoadError> {
        Ok(SeaRouter::new(self.grid().await?, config))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let grid = self.inner.store.get();
        f.debug_struct("AppState")
            .field("loaded", &grid.is_some())
            .field("rows", &grid.as_ref().map(|g| g.rows()))
            .field("cols", &grid.as_ref().map(|g| g.cols()))
            .field("router", &self.inner.router)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> Arc<WaterGrid> {
        Arc::new(WaterGrid::from_ascii(2.0, 0.0, 1.0, "~~\n~#").unwrap())
    }

    #[tokio::test]
    async fn preloaded_state_is_ready() {
        let state = AppState::with_grid(small_grid(), RouterConfig::default());
        assert!(state.store().is_loaded());
        assert_eq!(state.grid().await.unwrap().water_count(), 3);
    }

    #[tokio::test]
    async fn missing_mask_is_a_load_error() {
        let state = AppState::open("/nonexistent/water_mask.bin", RouterConfig::default());
        let err = state.grid().await.unwrap_err();
        assert!(matches!(
            err.cause(),
            searoute_lib::Error::MaskNotFound { .. }
        ));
        assert!(!state.store().is_loaded());
    }

    #[test]
    fn clones_share_the_store() {
        let a = AppState::with_grid(small_grid(), RouterConfig::default());
        let b = a.clone();
        assert!(std::ptr::eq(a.store(), b.store()));
    }

    #[test]
    fn debug_reports_grid_shape() {
        let state = AppState::with_grid(small_grid(), RouterConfig::default());
        let debug = format!("{state:?}");
        assert!(debug.contains("loaded: true"));
        assert!(debug.contains("rows: Some(2)"));
    }
}
