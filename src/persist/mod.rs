//! Persistence gateway: the whole application state lives in one JSON slot,
//! with a bare version string in a second slot gating schema migrations.
//! Storage failures never escape this module; they degrade to logged warnings
//! on save and to a "setup required" state on load.

pub mod migrations;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use log::{error, warn};
use serde_json::Value;

use crate::models::ApplicationState;

pub use migrations::SCHEMA_VERSION;

const STATE_FILE: &str = "state.json";
const VERSION_FILE: &str = "schema_version";

pub struct PersistenceGateway {
    state_path: PathBuf,
    version_path: PathBuf,
}

impl PersistenceGateway {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            state_path: data_dir.join(STATE_FILE),
            version_path: data_dir.join(VERSION_FILE),
        }
    }

    /// Serializes the full state to the storage slot. Failures are logged and
    /// swallowed; a full disk must not crash a running screening.
    pub fn save(&self, state: &ApplicationState) {
        if let Err(err) = self.try_save(state) {
            error!("failed to persist state: {err:#}");
        }
    }

    /// Loads and migrates the stored state. Missing storage, parse failures,
    /// and unknown schema versions all resolve to a fresh "setup required"
    /// state; the version marker is always moved forward to the current
    /// schema (one-way, no downgrade path).
    pub fn load(&self) -> ApplicationState {
        let state = match self.try_load() {
            Ok(state) => state,
            Err(err) => {
                error!("failed to load persisted state: {err:#}");
                ApplicationState::setup_required()
            }
        };
        if let Err(err) = self.write_version_marker() {
            warn!("failed to update schema version marker: {err:#}");
        }
        state
    }

    fn try_save(&self, state: &ApplicationState) -> Result<()> {
        if let Some(dir) = self.state_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create data dir {}", dir.display()))?;
        }
        let serialized =
            serde_json::to_string_pretty(state).context("failed to serialize state")?;
        fs::write(&self.state_path, serialized)
            .with_context(|| format!("failed to write {}", self.state_path.display()))?;
        self.write_version_marker()
    }

    fn try_load(&self) -> Result<ApplicationState> {
        if !self.state_path.exists() {
            return Ok(ApplicationState::setup_required());
        }

        let stored_version = fs::read_to_string(&self.version_path)
            .ok()
            .map(|v| v.trim().to_string());
        let Some(version) = stored_version
            .as_deref()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| (1..=SCHEMA_VERSION).contains(v))
        else {
            // Unknown, newer, or missing version: session data is discarded
            // rather than guessed at.
            warn!(
                "stored schema version {:?} is outside the supported range; forcing setup",
                stored_version
            );
            return Ok(ApplicationState::setup_required());
        };

        let contents = fs::read_to_string(&self.state_path)
            .with_context(|| format!("failed to read {}", self.state_path.display()))?;
        let mut value: Value =
            serde_json::from_str(&contents).context("failed to parse stored state")?;
        if !value.is_object() {
            bail!("stored state is not a JSON object");
        }
        if version < SCHEMA_VERSION {
            value = migrations::migrate(value, version)?;
        }
        value = migrations::coerce_numeric_fields(value);

        let mut state: ApplicationState =
            serde_json::from_value(value).context("stored state does not match schema")?;
        state.reconcile();
        Ok(state)
    }

    fn write_version_marker(&self) -> Result<()> {
        if let Some(dir) = self.version_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create data dir {}", dir.display()))?;
        }
        fs::write(&self.version_path, SCHEMA_VERSION.to_string())
            .with_context(|| format!("failed to write {}", self.version_path.display()))
    }
}
