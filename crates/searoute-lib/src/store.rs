//! Process-wide holder for the loaded water grid.
//!
//! [`WaterGridStore::load`] is single-flight: the first caller becomes the
//! leader and performs the fetch + decode, every caller arriving while that is
//! in flight subscribes to the same outcome, and once a grid is loaded later
//! calls return it immediately. A failed load leaves the store empty so the
//! next call retries.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::geo::GeoCoordinate;
use crate::grid::{GridCell, WaterGrid};
use crate::mask::decode_mask;
use crate::source::{GridSource, MaskSource};

/// Grid-load failure shared by every caller of the failed load.
#[derive(Debug, Clone, Error)]
#[error("water grid load failed: {source}")]
pub struct GridLoadError {
    #[source]
    source: Arc<Error>,
}

impl GridLoadError {
    /// Underlying cause.
    pub fn cause(&self) -> &Error {
        &self.source
    }
}

impl From<Error> for GridLoadError {
    fn from(err: Error) -> Self {
        Self {
            source: Arc::new(err),
        }
    }
}

type LoadOutcome = Result<Arc<WaterGrid>, GridLoadError>;

enum LoadState {
    Idle,
    Loading(broadcast::Sender<LoadOutcome>),
    Ready(Arc<WaterGrid>),
}

/// Lazily loaded, immutable water grid.
pub struct WaterGridStore<S = MaskSource> {
    source: S,
    state: Mutex<LoadState>,
}

impl<S: GridSource> WaterGridStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(LoadState::Idle),
        }
    }

    /// Store that starts out already holding `grid`.
    pub fn with_grid(source: S, grid: Arc<WaterGrid>) -> Self {
        Self {
            source,
            state: Mutex::new(LoadState::Ready(grid)),
        }
    }

    /// Load the grid once and share it.
    pub async fn load(&self) -> LoadOutcome {
        loop {
            let waiter = {
                let mut state = self.lock();
                match &*state {
                    LoadState::Ready(grid) => return Ok(Arc::clone(grid)),
                    LoadState::Loading(tx) => Some(tx.subscribe()),
                    LoadState::Idle => {
                        let (tx, _) = broadcast::channel(1);
                        *state = LoadState::Loading(tx);
                        None
                    }
                }
            };

            match waiter {
                Some(mut rx) => {
                    debug!(source = %self.source.describe(), "joining in-flight water grid load");
                    match rx.recv().await {
                        Ok(outcome) => return outcome,
                        // Leader was cancelled before finishing; race to take over.
                        Err(_) => continue,
                    }
                }
                None => return self.lead_load().await,
            }
        }
    }

    async fn lead_load(&self) -> LoadOutcome {
        let mut guard = ResetOnDrop {
            state: &self.state,
            armed: true,
        };

        let started = Instant::now();
        info!(source = %self.source.describe(), "loading water grid");
        let outcome: LoadOutcome = match self.source.fetch().await {
            Ok(bytes) => decode_mask(&bytes)
                .map(Arc::new)
                .map_err(GridLoadError::from),
            Err(e) => Err(GridLoadError::from(e)),
        };
        guard.armed = false;

        match &outcome {
            Ok(grid) => info!(
                rows = grid.rows(),
                cols = grid.cols(),
                water_cells = grid.water_count(),
                load_ms = started.elapsed().as_millis() as u64,
                "water grid loaded"
            ),
            Err(e) => warn!(
                source = %self.source.describe(),
                error = %e,
                "water grid load failed; sea routing disabled until a reload succeeds"
            ),
        }

        let previous = {
            let mut state = self.lock();
            let next = match &outcome {
                Ok(grid) => LoadState::Ready(Arc::clone(grid)),
                Err(_) => LoadState::Idle,
            };
            std::mem::replace(&mut *state, next)
        };
        if let LoadState::Loading(tx) = previous {
            // No receivers is fine: nobody else was waiting.
            let _ = tx.send(outcome.clone());
        }
        outcome
    }

    /// The loaded grid, if any.
    pub fn get(&self) -> Option<Arc<WaterGrid>> {
        match &*self.lock() {
            LoadState::Ready(grid) => Some(Arc::clone(grid)),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.get().is_some()
    }

    /// `false` until loaded and for any coordinate outside the grid.
    pub fn is_water(&self, coord: GeoCoordinate) -> bool {
        self.get().map(|grid| grid.is_water(coord)).unwrap_or(false)
    }

    pub fn project(&self, coord: GeoCoordinate) -> Option<GridCell> {
        self.get().and_then(|grid| grid.project(coord))
    }

    pub fn unproject(&self, cell: GridCell) -> Option<GeoCoordinate> {
        self.get()
            .filter(|grid| grid.contains(cell))
            .map(|grid| grid.unproject(cell))
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: GridSource> std::fmt::Debug for WaterGridStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaterGridStore")
            .field("source", &self.source.describe())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Returns the store to `Idle` if the leading load future is dropped midway,
/// which also closes the channel so waiters retry.
struct ResetOnDrop<'a> {
    state: &'a Mutex<LoadState>,
    armed: bool,
}

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            *state = LoadState::Idle;
        }
    }
}
