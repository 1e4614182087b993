//! Resolves body queries against a catalog and runs the window solver on them.

use std::path::Path;

use ksp_catalog::{Catalog, CatalogError, LoadPolicy, load_catalog};
use ksp_config::AppConfig;
use ksp_transfer::{TransferError, TransferReport, WindowSettings, plan_transfer, settings};

/// Top-level planning error.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("transfer planning failed: {0}")]
    Transfer(#[from] TransferError),
    #[error("{moon} orbits {planet}; transfers from a parking orbit to a moon are not supported")]
    MoonTransfer { planet: String, moon: String },
}

/// A loaded catalog paired with the solver settings used for every query.
#[derive(Debug, Clone)]
pub struct Planner {
    catalog: Catalog,
    settings: WindowSettings,
}

impl Planner {
    pub fn new(catalog: Catalog, settings: WindowSettings) -> Self {
        Self { catalog, settings }
    }

    /// Load the catalog named by the configuration, or by `catalog_override` when given.
    pub fn from_config(
        config: &AppConfig,
        catalog_override: Option<&Path>,
        policy: LoadPolicy,
    ) -> Result<Self, PlannerError> {
        let path = catalog_override.unwrap_or(&config.catalog.path);
        let report = load_catalog(path, policy)?;
        Ok(Self::new(report.catalog, settings::from_config(&config.solver)))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &WindowSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut WindowSettings {
        &mut self.settings
    }

    /// Plan `window_count` departures from `from` to `to`, each a name or catalog code.
    pub fn plan(
        &self,
        from: &str,
        to: &str,
        reference_time_s: f64,
        window_count: usize,
    ) -> Result<TransferReport, PlannerError> {
        let origin = self.catalog.find(from)?;
        let destination = self.catalog.find(to)?;
        if destination.parent_code() == origin.code() {
            return Err(PlannerError::MoonTransfer {
                planet: origin.name().to_string(),
                moon: destination.name().to_string(),
            });
        }
        Ok(plan_transfer(
            origin,
            destination,
            reference_time_s,
            window_count,
            &self.settings,
        )?)
    }
}
