//! End-to-end experiment runs.
//!
//! An experiment seeds one RNG, builds both populations, plays every
//! signaller out under the configured matching policy and summarises the
//! result. A comparison repeats that on the same seed once per rule pair, so
//! arms differ only in how agents decide.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use signalling_types::AgentSummary;
use tracing::info;

use crate::config::{ComparisonEntry, ConfigError, RuleConfig, SimulationConfig};
use crate::game::{Game, GameError};
use crate::matching::{MatchingError, MatchingPolicy};
use crate::measures::Measures;
use crate::population::{PopulationError, make_responders, make_signallers};

/// Errors raised by an experiment run.
#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    /// The configuration was rejected.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A population could not be built.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: PopulationError,
    },

    /// The game could not be set up.
    #[error("game error: {source}")]
    Game {
        /// The underlying game error.
        #[from]
        source: GameError,
    },

    /// Pairing or play failed.
    #[error("matching error: {source}")]
    Matching {
        /// The underlying matching error.
        #[from]
        source: MatchingError,
    },
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// Run or comparison-arm name.
    pub name: String,
    /// Seed the run's RNG started from.
    pub seed: u64,
    /// Pairing policy used.
    pub matching: MatchingPolicy,
    /// Rule every signaller used.
    pub signaller_rule: RuleConfig,
    /// Rule every responder used.
    pub responder_rule: RuleConfig,
    /// Rounds each signaller played.
    pub rounds: u32,
    /// Total rounds played across all pairings.
    pub rounds_played: usize,
    /// End-of-run snapshot of every signaller.
    pub signallers: Vec<AgentSummary>,
    /// End-of-run snapshot of every responder.
    pub responders: Vec<AgentSummary>,
    /// Per-round population measures.
    pub measures: Measures,
}

/// Run the experiment `config` describes with its own rules.
///
/// # Errors
///
/// Returns [`ExperimentError::Config`] for an invalid configuration and
/// propagates any failure while building or playing.
pub fn run_experiment(config: &SimulationConfig) -> Result<ExperimentReport, ExperimentError> {
    config.validate()?;
    run_arm(
        config,
        &config.world.name,
        &config.signaller_rule,
        &config.responder_rule,
    )
}

/// Run `config` once per rule pair in `pairs`, each from the same seed.
///
/// # Errors
///
/// Fails on the first arm that fails.
pub fn compare_decision_rules(
    config: &SimulationConfig,
    pairs: &[ComparisonEntry],
) -> Result<Vec<ExperimentReport>, ExperimentError> {
    config.validate()?;
    pairs
        .iter()
        .map(|entry| {
            entry.signaller_rule.validate("comparison.signaller_rule")?;
            entry.responder_rule.validate("comparison.responder_rule")?;
            run_arm(config, &entry.name, &entry.signaller_rule, &entry.responder_rule)
        })
        .collect()
}

fn run_arm(
    config: &SimulationConfig,
    name: &str,
    signaller_rule: &RuleConfig,
    responder_rule: &RuleConfig,
) -> Result<ExperimentReport, ExperimentError> {
    let seed = config.world.seed;
    let rounds = config.population.rounds;
    info!(
        name,
        seed,
        signaller_rule = signaller_rule.decision.name(),
        responder_rule = responder_rule.decision.name(),
        matching = config.matching.name(),
        "Experiment started"
    );

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut game = Game::new(
        config.payoffs,
        config.population.rounds_per_pairing,
        config.priors(),
    )?;
    let signallers = make_signallers(&config.signaller_cohort(signaller_rule), rounds, &mut rng)?;
    let mut responders = make_responders(&config.responder_cohort(responder_rule), &mut rng)?;

    let signallers = config
        .matching
        .run(&mut game, signallers, &mut responders, rounds, &mut rng)?;
    let measures = Measures::compute(&signallers, &responders, game.records());

    info!(
        name,
        rounds_played = game.rounds_played(),
        honesty = measures.honesty_rate.last().copied().unwrap_or(0.0),
        "Experiment complete"
    );

    Ok(ExperimentReport {
        name: name.to_owned(),
        seed,
        matching: config.matching,
        signaller_rule: *signaller_rule,
        responder_rule: *responder_rule,
        rounds,
        rounds_played: game.rounds_played(),
        signallers: signallers.iter().map(signalling_agents::Agent::summary).collect(),
        responders: responders.iter().map(signalling_agents::Agent::summary).collect(),
        measures,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use signalling_agents::DecisionRule;

    use super::*;
    use crate::config::default_comparison;

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.population.signallers = 30;
        config.population.responders = 5;
        config.population.rounds = 4;
        config
    }

    #[test]
    fn experiment_plays_every_signaller_out() {
        let config = small_config();
        let report = run_experiment(&config).unwrap();
        assert_eq!(report.signallers.len(), 30);
        assert_eq!(report.responders.len(), 5);
        assert_eq!(report.rounds_played, 120);
        assert!(report.signallers.iter().all(|s| s.finished && s.rounds == 4));
        assert_eq!(report.measures.honesty_rate.len(), 4);
    }

    #[test]
    fn invalid_config_is_rejected_before_play() {
        let mut config = small_config();
        config.population.responders = 0;
        assert!(matches!(
            run_experiment(&config),
            Err(ExperimentError::Config { .. })
        ));
    }

    #[test]
    fn comparison_returns_one_report_per_arm() {
        let config = small_config();
        let reports = compare_decision_rules(&config, &default_comparison()).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].name, "bayes");
        assert_eq!(reports[1].name, "prospect");
        assert_eq!(reports[1].responder_rule.decision.name(), "prospect_theory");
        // Same seed, same populations.
        let types = |r: &ExperimentReport| r.signallers.iter().map(|s| s.player_type).collect::<Vec<_>>();
        let mut a = types(&reports[0]);
        let mut b = types(&reports[1]);
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn comparison_rejects_invalid_arm() {
        let config = small_config();
        let pairs = [ComparisonEntry {
            name: "broken".to_owned(),
            signaller_rule: RuleConfig::new(DecisionRule::Bayesian),
            responder_rule: RuleConfig::new(DecisionRule::CumulativeProspectTheory(
                signalling_agents::CptParams {
                    gamma: -1.0,
                    ..signalling_agents::CptParams::default()
                },
            )),
        }];
        assert!(compare_decision_rules(&config, &pairs).is_err());
    }
}
