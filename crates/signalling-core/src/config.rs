//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `signalling-config.yaml` at the
//! project root. Every section and every field has a default, so an empty
//! file (or no file at all) describes the reference experiment: 1000
//! signallers, 100 responders, 12 rounds, Bayesian agents on both sides,
//! random pairing.

use std::path::Path;

use serde::{Deserialize, Serialize};
use signalling_agents::{DecisionRule, PayoffParams, ProspectTheory, ReferenceMode, TieBreak};
use signalling_types::{PerSignal, PerType, Signal};

use crate::game::{Priors, SignallerPriors, uniform_responder_priors};
use crate::matching::MatchingPolicy;
use crate::population::{Cohort, PopulationError, validate_weights};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Invalid {
            field,
            reason: reason.to_string(),
        }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `signalling-config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Run name and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Stage-game payoff parameters.
    #[serde(default)]
    pub payoffs: PayoffParams,

    /// Population sizes, type mixes and round count.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Signaller prior over responder types.
    #[serde(default)]
    pub signaller_priors: SignallerPriors,

    /// Responder prior weight of each type, per signal.
    #[serde(default = "uniform_responder_priors")]
    pub responder_priors: PerSignal<PerType<f64>>,

    /// Decision rule of every signaller.
    #[serde(default)]
    pub signaller_rule: RuleConfig,

    /// Decision rule of every responder.
    #[serde(default)]
    pub responder_rule: RuleConfig,

    /// Pairing policy.
    #[serde(default)]
    pub matching: MatchingPolicy,

    /// Rule pairs to compare side by side on the same seed.
    #[serde(default)]
    pub comparison: Vec<ComparisonEntry>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            payoffs: PayoffParams::default(),
            population: PopulationConfig::default(),
            signaller_priors: SignallerPriors::default(),
            responder_priors: uniform_responder_priors(),
            signaller_rule: RuleConfig::default(),
            responder_rule: RuleConfig::default(),
            matching: MatchingPolicy::default(),
            comparison: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check that the configuration describes a runnable experiment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.payoffs
            .validate()
            .map_err(|e| ConfigError::invalid("payoffs", e))?;

        let population = &self.population;
        if population.signallers == 0 {
            return Err(ConfigError::invalid("population.signallers", "must be at least 1"));
        }
        if population.responders == 0 {
            return Err(ConfigError::invalid("population.responders", "must be at least 1"));
        }
        if population.rounds == 0 {
            return Err(ConfigError::invalid("population.rounds", "must be at least 1"));
        }
        if population.rounds_per_pairing == 0 {
            return Err(ConfigError::invalid(
                "population.rounds_per_pairing",
                "must be at least 1",
            ));
        }
        check_weights("population.signaller_weights", &population.signaller_weights())?;
        check_weights("population.responder_weights", &population.responder_weights())?;

        if let SignallerPriors::Fixed { weights } = &self.signaller_priors {
            check_weights("signaller_priors.weights", weights)?;
        }
        for signal in Signal::ALL {
            check_weights("responder_priors", self.responder_priors.get(signal))?;
        }

        self.signaller_rule.validate("signaller_rule")?;
        self.responder_rule.validate("responder_rule")?;
        for entry in &self.comparison {
            entry.signaller_rule.validate("comparison.signaller_rule")?;
            entry.responder_rule.validate("comparison.responder_rule")?;
        }

        if self.matching == MatchingPolicy::EqualRounds
            && population.responders < population.signallers
        {
            return Err(ConfigError::invalid(
                "matching",
                format!(
                    "equal_rounds needs at least {} responders, found {}",
                    population.signallers, population.responders
                ),
            ));
        }
        Ok(())
    }

    /// Priors handed to agents on their first game.
    pub const fn priors(&self) -> Priors {
        Priors {
            signaller: self.signaller_priors,
            responder: self.responder_priors,
        }
    }

    /// The signaller cohort under `rule`.
    pub fn signaller_cohort(&self, rule: &RuleConfig) -> Cohort {
        Cohort {
            size: self.population.signallers,
            weights: self.population.signaller_weights(),
            rule: rule.decision,
            tie_break: rule.tie_break,
        }
    }

    /// The responder cohort under `rule`.
    pub fn responder_cohort(&self, rule: &RuleConfig) -> Cohort {
        Cohort {
            size: self.population.responders,
            weights: self.population.responder_weights(),
            rule: rule.decision,
            tie_break: rule.tie_break,
        }
    }

    /// The configured comparison, or Bayesian against prospect theory when
    /// none is configured.
    pub fn comparison_or_default(&self) -> Vec<ComparisonEntry> {
        if self.comparison.is_empty() {
            default_comparison()
        } else {
            self.comparison.clone()
        }
    }
}

fn check_weights(field: &'static str, weights: &PerType<f64>) -> Result<(), ConfigError> {
    validate_weights(weights)
        .map(|_| ())
        .map_err(|e: PopulationError| ConfigError::invalid(field, e))
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Human-readable run name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of signallers.
    #[serde(default = "default_signallers")]
    pub signallers: usize,

    /// Number of responders.
    #[serde(default = "default_responders")]
    pub responders: usize,

    /// Rounds every signaller plays before finishing.
    #[serde(default = "default_rounds")]
    pub rounds: u32,

    /// Rounds played each time a signaller is paired.
    #[serde(default = "default_rounds_per_pairing")]
    pub rounds_per_pairing: u32,

    /// Relative frequency of low, middle and high signallers.
    #[serde(default = "default_signaller_weights")]
    pub signaller_weights: [f64; 3],

    /// Relative frequency of low, middle and high responders.
    #[serde(default = "default_responder_weights")]
    pub responder_weights: [f64; 3],
}

impl PopulationConfig {
    /// Signaller type weights as a table.
    pub const fn signaller_weights(&self) -> PerType<f64> {
        weights_table(self.signaller_weights)
    }

    /// Responder type weights as a table.
    pub const fn responder_weights(&self) -> PerType<f64> {
        weights_table(self.responder_weights)
    }
}

const fn weights_table([low, middle, high]: [f64; 3]) -> PerType<f64> {
    PerType { low, middle, high }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            signallers: default_signallers(),
            responders: default_responders(),
            rounds: default_rounds(),
            rounds_per_pairing: default_rounds_per_pairing(),
            signaller_weights: default_signaller_weights(),
            responder_weights: default_responder_weights(),
        }
    }
}

/// A decision rule plus its tie-break policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// The rule, tagged by `rule`.
    #[serde(default)]
    pub decision: DecisionRule,

    /// How ties between actions are broken.
    #[serde(default)]
    pub tie_break: TieBreak,
}

impl RuleConfig {
    /// A rule with the default tie-break.
    pub fn new(decision: DecisionRule) -> Self {
        Self {
            decision,
            tie_break: TieBreak::default(),
        }
    }

    pub(crate) fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        self.decision
            .validate()
            .map_err(|e| ConfigError::invalid(field, e))
    }
}

/// One named (signaller rule, responder rule) pair to compare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    /// Label used in the report.
    pub name: String,

    /// Signaller rule for this arm.
    #[serde(default)]
    pub signaller_rule: RuleConfig,

    /// Responder rule for this arm.
    #[serde(default)]
    pub responder_rule: RuleConfig,
}

/// The reference comparison: Bayesian agents against prospect-theory
/// agents. Prospect-theory signallers take the previous payoff as their
/// reference point and responders their cumulative payoff.
pub fn default_comparison() -> Vec<ComparisonEntry> {
    vec![
        ComparisonEntry {
            name: "bayes".to_owned(),
            signaller_rule: RuleConfig::new(DecisionRule::Bayesian),
            responder_rule: RuleConfig::new(DecisionRule::Bayesian),
        },
        ComparisonEntry {
            name: "prospect".to_owned(),
            signaller_rule: RuleConfig::new(DecisionRule::ProspectTheory(ProspectTheory {
                reference: ReferenceMode::PreviousPayoff,
                ..ProspectTheory::default()
            })),
            responder_rule: RuleConfig::new(DecisionRule::ProspectTheory(ProspectTheory {
                reference: ReferenceMode::Cumulative,
                ..ProspectTheory::default()
            })),
        },
    ]
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "signalling".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_signallers() -> usize {
    1000
}

const fn default_responders() -> usize {
    100
}

const fn default_rounds() -> u32 {
    12
}

const fn default_rounds_per_pairing() -> u32 {
    1
}

const fn default_signaller_weights() -> [f64; 3] {
    [0.7, 0.2, 0.1]
}

const fn default_responder_weights() -> [f64; 3] {
    [0.5, 0.4, 0.1]
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use signalling_agents::CptParams;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.population.signallers, 1000);
        assert_eq!(config.population.responders, 100);
        assert_eq!(config.population.rounds, 12);
        assert_eq!(config.payoffs.referral_cost, 50.0);
        assert_eq!(config.matching, MatchingPolicy::Random);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  name: caseload-cpt
  seed: 7

payoffs:
  referral_cost: 40
  harsh_judge_multiplier: 4

population:
  signallers: 60
  responders: 6
  rounds: 8
  signaller_weights: [0.6, 0.3, 0.1]

signaller_priors:
  kind: fixed
  weights: {low: 0.5, middle: 0.3, high: 0.2}

signaller_rule:
  decision:
    rule: cumulative_prospect_theory
    alpha: 0.859
    beta: 0.826
    lambda: 2.25
    gamma: 0.618
    delta: 0.592
  tie_break: random

responder_rule:
  decision:
    rule: prospect_theory
    weighting: {kind: prelec, alpha: 0.65, beta: 1.0}
    reference: worst_case

matching: caseload

comparison:
  - name: minimax
    signaller_rule: {decision: {rule: minimax}}
    responder_rule: {decision: {rule: minimax}}

logging:
  level: debug
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "caseload-cpt");
        assert_eq!(config.payoffs.referral_cost, 40.0);
        assert_eq!(config.payoffs.no_baby_payoff, 100.0);
        assert_eq!(config.population.rounds, 8);
        assert_eq!(config.population.responder_weights, [0.5, 0.4, 0.1]);
        assert_eq!(config.signaller_rule.tie_break, TieBreak::Random);
        assert_eq!(
            config.signaller_rule.decision,
            DecisionRule::CumulativeProspectTheory(CptParams::signaller_default())
        );
        assert_eq!(config.matching, MatchingPolicy::Caseload);
        assert_eq!(config.comparison.len(), 1);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 9\n").unwrap();
        assert_eq!(config.world.seed, 9);
        assert_eq!(config.population.signallers, 1000);
        assert_eq!(config.responder_rule.decision, DecisionRule::Bayesian);
        assert_eq!(config.responder_priors.light.low, 1.0 / 3.0);
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(SimulationConfig::parse("").unwrap(), SimulationConfig::default());
    }

    #[test]
    fn default_and_parsed_configs_share_responder_priors() {
        let default = SimulationConfig::default();
        let empty = SimulationConfig::parse("").unwrap();
        let minimal = SimulationConfig::parse("world:\n  seed: 42\n").unwrap();
        assert_eq!(default.responder_priors, uniform_responder_priors());
        assert_eq!(empty.responder_priors, default.responder_priors);
        assert_eq!(minimal.responder_priors, default.responder_priors);
        assert_eq!(minimal, default);
        assert!(default.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unusable_values() {
        let mut config = SimulationConfig::default();
        config.population.rounds = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "population.rounds",
                ..
            })
        ));

        let mut config = SimulationConfig::default();
        config.population.signaller_weights = [0.0, 0.0, 0.0];
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.matching = MatchingPolicy::EqualRounds;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "matching", .. })
        ));

        let mut config = SimulationConfig::default();
        config.responder_rule = RuleConfig::new(DecisionRule::CumulativeProspectTheory(CptParams {
            delta: 0.0,
            ..CptParams::default()
        }));
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_comparison_is_bayes_against_prospect() {
        let config = SimulationConfig::default();
        let pairs = config.comparison_or_default();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].name, "bayes");
        assert_eq!(pairs[1].responder_rule.decision.name(), "prospect_theory");
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("signalling-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            assert!(config.unwrap().validate().is_ok());
        }
    }
}
