//! Experiment runs through the public entry points.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use std::collections::BTreeMap;

use signalling_agents::{CptParams, DecisionRule};
use signalling_core::config::{ComparisonEntry, RuleConfig};
use signalling_core::{MatchingPolicy, SimulationConfig, compare_decision_rules, run_experiment};
use signalling_types::AgentId;

fn config(matching: MatchingPolicy, signallers: usize, responders: usize) -> SimulationConfig {
    let yaml = format!(
        "
world:
  name: integration
  seed: 1234
population:
  signallers: {signallers}
  responders: {responders}
  rounds: 6
matching: {}
",
        matching.name()
    );
    SimulationConfig::parse(&yaml).unwrap()
}

#[test]
fn identical_seeds_give_identical_reports() {
    let config = config(MatchingPolicy::Random, 40, 4);
    let first = run_experiment(&config).unwrap();
    let second = run_experiment(&config).unwrap();
    assert_eq!(first, second);

    let mut reseeded = config;
    reseeded.world.seed = 4321;
    let third = run_experiment(&reseeded).unwrap();
    assert_ne!(first.signallers, third.signallers);
}

#[test]
fn random_pairing_finishes_every_signaller() {
    let report = run_experiment(&config(MatchingPolicy::Random, 40, 4)).unwrap();
    assert_eq!(report.matching, MatchingPolicy::Random);
    assert_eq!(report.rounds_played, 240);
    assert!(report.signallers.iter().all(|s| s.finished && s.rounds == 6));
    let responder_rounds: u32 = report.responders.iter().map(|r| r.rounds).sum();
    assert_eq!(responder_rounds, 240);
}

#[test]
fn caseload_spreads_work_evenly() {
    let report = run_experiment(&config(MatchingPolicy::Caseload, 22, 4)).unwrap();
    assert_eq!(report.rounds_played, 132);
    // 22 cases over 4 responders: at least 5 signallers each, and the two
    // left over land wherever the draw puts them.
    let rounds: Vec<u32> = report.responders.iter().map(|r| r.rounds).collect();
    assert!(rounds.iter().all(|&r| r >= 30 && r % 6 == 0));
    assert_eq!(rounds.iter().sum::<u32>(), 132);
}

#[test]
fn equal_rounds_uses_every_signaller_each_round() {
    let report = run_experiment(&config(MatchingPolicy::EqualRounds, 5, 8)).unwrap();
    assert_eq!(report.rounds_played, 30);
    assert!(report.signallers.iter().all(|s| s.finished));
    assert_eq!(report.measures.honesty_rate.len(), 6);
}

#[test]
fn equal_rounds_with_too_few_responders_is_rejected() {
    let config = config(MatchingPolicy::EqualRounds, 8, 5);
    assert!(run_experiment(&config).is_err());
}

#[test]
fn agent_ids_are_unique_within_a_run() {
    let report = run_experiment(&config(MatchingPolicy::Random, 40, 4)).unwrap();
    let mut seen: BTreeMap<AgentId, usize> = BTreeMap::new();
    for summary in report.signallers.iter().chain(&report.responders) {
        *seen.entry(summary.id).or_default() += 1;
    }
    assert_eq!(seen.len(), 44);
}

#[test]
fn comparison_arms_share_a_seed() {
    let config = config(MatchingPolicy::Caseload, 20, 4);
    let pairs = vec![
        ComparisonEntry {
            name: "bayes".to_owned(),
            signaller_rule: RuleConfig::new(DecisionRule::Bayesian),
            responder_rule: RuleConfig::new(DecisionRule::Bayesian),
        },
        ComparisonEntry {
            name: "cpt".to_owned(),
            signaller_rule: RuleConfig::new(DecisionRule::CumulativeProspectTheory(
                CptParams::signaller_default(),
            )),
            responder_rule: RuleConfig::new(DecisionRule::CumulativeProspectTheory(
                CptParams::responder_default(),
            )),
        },
        ComparisonEntry {
            name: "minimax".to_owned(),
            signaller_rule: RuleConfig::new(DecisionRule::Bayesian),
            responder_rule: RuleConfig::new(DecisionRule::Minimax),
        },
    ];
    let reports = compare_decision_rules(&config, &pairs).unwrap();
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.seed == 1234 && r.rounds_played == 120));

    let ids = |i: usize| {
        let mut ids: Vec<AgentId> = reports[i].responders.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids
    };
    assert_eq!(ids(0), ids(1));
    assert_eq!(ids(1), ids(2));

    // Minimax responders refer every case.
    let minimax = &reports[2].measures.referral_rate.overall;
    assert!(minimax.iter().all(|&rate| (rate - 1.0).abs() < 1e-12));
}
