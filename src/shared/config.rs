use crate::shared::errors::{StoreError, StoreResult};

/// Inclusive range a score or average must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBounds {
    pub min: i16,
    pub max: i16,
}

impl ScoreBounds {
    pub fn new(min: i16, max: i16) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i16) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for ScoreBounds {
    fn default() -> Self {
        Self { min: 0, max: 100 }
    }
}

/// What happens when a record that list entries still reference is
/// deleted. The policy is fixed when the store is built; delete never
/// chooses per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CascadePolicy {
    /// Refuse the delete with a referential conflict.
    #[default]
    Restrict,
    /// Delete the record and purge every entry referencing it.
    Cascade,
}

/// Configuration for the store engines
///
/// Externalizes the score range, the delete policy, and the paging cap
/// so they can be tuned per deployment and per test.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Inclusive range accepted for anime averages and entry scores.
    pub score_bounds: ScoreBounds,

    /// Delete behavior for records that entries still reference.
    pub cascade: CascadePolicy,

    /// Hard cap on a single page of results.
    pub max_page_size: usize,
}

impl StoreConfig {
    /// Creates a configuration with the production defaults.
    pub fn new() -> Self {
        Self {
            score_bounds: ScoreBounds::default(),
            cascade: CascadePolicy::Restrict,
            max_page_size: 100,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.score_bounds.min > self.score_bounds.max {
            return Err(StoreError::config(format!(
                "Score bounds min ({}) cannot exceed max ({})",
                self.score_bounds.min, self.score_bounds.max
            )));
        }

        if self.max_page_size == 0 {
            return Err(StoreError::config("max_page_size must be > 0"));
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for StoreConfig to make test setup easier
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::new(),
        }
    }

    pub fn score_bounds(mut self, min: i16, max: i16) -> Self {
        self.config.score_bounds = ScoreBounds::new(min, max);
        self
    }

    pub fn cascade(mut self, policy: CascadePolicy) -> Self {
        self.config.cascade = policy;
        self
    }

    pub fn max_page_size(mut self, max: usize) -> Self {
        self.config.max_page_size = max;
        self
    }

    pub fn build(self) -> StoreResult<StoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
