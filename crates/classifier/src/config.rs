//! Naming and query configuration shared by the classifier builders.

use infer_core::QueryType;

/// Default prefix for every variable a builder declares.
pub const DEFAULT_PREFIX: &str = "activity";

/// Run-time tunables for score and argmax builders.
///
/// ```rust
/// use infer_classifier::ScoreConfig;
/// use infer_core::QueryType;
///
/// let config = ScoreConfig::default().with_prefix("sensor").with_query(QueryType::Samples);
/// assert_eq!(config.name("NoisyScore"), "sensorNoisyScore");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreConfig {
    /// Prepended to every declared variable and range name.
    pub prefix: String,
    /// Query attached to the noisy score array.
    pub query: QueryType,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            query: QueryType::Marginal,
        }
    }
}

impl ScoreConfig {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_query(mut self, query: QueryType) -> Self {
        self.query = query;
        self
    }

    /// `prefix + suffix`.
    pub fn name(&self, suffix: &str) -> String {
        format!("{}{}", self.prefix, suffix)
    }
}
