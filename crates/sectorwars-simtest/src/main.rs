//! SectorWars Headless Galaxy Harness
//!
//! Sweeps the pure galaxy logic end to end without a game server:
//! configuration, estimation, demo universes, the regeneration flow
//! against an in-process server, and refresh ordering.
//!
//! Usage:
//!   cargo run -p sectorwars-simtest
//!   cargo run -p sectorwars-simtest -- --verbose
//!   RUST_LOG=debug cargo run -p sectorwars-simtest

use sectorwars_logic::constants::sectors;
use sectorwars_logic::demo::demo_universe;
use sectorwars_logic::estimate::{compare_with_statistics, estimate_summary};
use sectorwars_logic::params::{randomize_config, FlatGalaxyConfig, GalaxyConfig};
use sectorwars_logic::protocol::{
    classify_failure, GalaxySummary, GenerateGalaxyRequest, Operation,
};
use sectorwars_logic::refresh::RefreshSequencer;
use sectorwars_logic::regeneration::{Command, RegenEvent, RegenFlow, RegenState};
use sectorwars_logic::universe::validate_universe;
use sectorwars_logic::validation::{validate_config, ValidatedConfig};

const CONFIG_SWEEP: u64 = 500;
const UNIVERSE_SWEEP: u64 = 40;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== SectorWars Galaxy Harness ===\n");

    let mut results = Vec::new();

    // 1. Randomized configuration sweep
    results.extend(validate_config_sweep(verbose));

    // 2. Estimation properties
    results.extend(validate_estimates(verbose));

    // 3. Demo universe coherence
    results.extend(validate_demo_universes(verbose));

    // 4. Regeneration against a simulated server
    results.extend(validate_regeneration(verbose));

    // 5. Refresh ordering
    results.extend(validate_refresh_ordering(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn flat(total: u32) -> GalaxyConfig {
    GalaxyConfig::Flat(FlatGalaxyConfig {
        total_sectors: total,
        ..FlatGalaxyConfig::default()
    })
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config_sweep(verbose: bool) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    let invalid: Vec<(u64, usize)> = (0..CONFIG_SWEEP)
        .filter_map(|seed| {
            let errors = validate_config(&randomize_config(seed));
            (!errors.is_empty()).then(|| (seed, errors.len()))
        })
        .collect();
    results.push(TestResult {
        name: "randomized_configs_valid".into(),
        passed: invalid.is_empty(),
        detail: if invalid.is_empty() {
            format!("{} seeds validated", CONFIG_SWEEP)
        } else {
            format!("{} invalid, first seed {}", invalid.len(), invalid[0].0)
        },
    });

    let bad_sums = (0..CONFIG_SWEEP)
        .filter(|seed| randomize_config(*seed).zone_distribution().sum() != 100)
        .count();
    results.push(TestResult {
        name: "zone_shares_sum_to_100".into(),
        passed: bad_sums == 0,
        detail: format!("{} configs off 100", bad_sums),
    });

    let mut lossy = 0;
    for seed in 0..CONFIG_SWEEP {
        let config = randomize_config(seed);
        let Ok(validated) = ValidatedConfig::new(config.clone()) else {
            continue;
        };
        let request = GenerateGalaxyRequest::from_config(&validated);
        let back = serde_json::to_string(&request)
            .ok()
            .and_then(|json| serde_json::from_str::<GenerateGalaxyRequest>(&json).ok())
            .map(GenerateGalaxyRequest::into_config);
        if back.as_ref() != Some(&config) {
            log::debug!("seed {} did not survive the request round trip", seed);
            lossy += 1;
        }
    }
    results.push(TestResult {
        name: "request_round_trip".into(),
        passed: lossy == 0,
        detail: format!("{} configs lost data", lossy),
    });

    if verbose {
        println!("  {} configs swept", CONFIG_SWEEP);
    }
    results
}

// ── 2. Estimation ───────────────────────────────────────────────────────

fn validate_estimates(verbose: bool) -> Vec<TestResult> {
    println!("--- Estimation ---");
    let mut results = Vec::new();

    let summary = estimate_summary(&flat(500));
    results.push(TestResult {
        name: "ports_500_at_10pct".into(),
        passed: summary.expected_ports == 50,
        detail: format!("{} expected ports", summary.expected_ports),
    });

    let idempotent = (0..50).all(|seed| {
        let config = randomize_config(seed);
        estimate_summary(&config) == estimate_summary(&config)
    });
    results.push(TestResult {
        name: "estimate_idempotent".into(),
        passed: idempotent,
        detail: "same config, same summary".into(),
    });

    let mut regressions = Vec::new();
    let mut previous = estimate_summary(&flat(sectors::FLAT_MIN));
    for total in (sectors::FLAT_MIN + 1)..=sectors::FLAT_MAX {
        let current = estimate_summary(&flat(total));
        if current.expected_ports < previous.expected_ports
            || current.expected_planets < previous.expected_planets
        {
            regressions.push(total);
        }
        previous = current;
    }
    results.push(TestResult {
        name: "estimate_monotonic".into(),
        passed: regressions.is_empty(),
        detail: format!(
            "{} regressions across {}..={}",
            regressions.len(),
            sectors::FLAT_MIN,
            sectors::FLAT_MAX
        ),
    });

    let bad_zone_totals = (0..CONFIG_SWEEP)
        .map(randomize_config)
        .filter(|config| {
            estimate_summary(config).zone_counts.total() != config.total_sectors()
        })
        .count();
    results.push(TestResult {
        name: "zone_counts_cover_galaxy".into(),
        passed: bad_zone_totals == 0,
        detail: format!("{} configs with uncovered sectors", bad_zone_totals),
    });

    if verbose {
        println!(
            "  500 sectors: {} ports, {} planets, tunnels {:?}",
            summary.expected_ports, summary.expected_planets, summary.tunnel_range
        );
    }
    results
}

// ── 3. Demo Universes ───────────────────────────────────────────────────

fn validate_demo_universes(verbose: bool) -> Vec<TestResult> {
    println!("--- Demo Universes ---");
    let mut results = Vec::new();
    let mut broken = 0;
    let mut deviating = 0;
    let mut largest = 0;

    for seed in 0..UNIVERSE_SWEEP {
        let config = randomize_config(seed);
        let universe = demo_universe(&config);
        largest = largest.max(universe.sectors.len());

        let errors = validate_universe(&universe);
        if !errors.is_empty() {
            log::debug!("seed {}: {} entity errors, first {}", seed, errors.len(), errors[0]);
            broken += 1;
        }
        let deviations =
            compare_with_statistics(&estimate_summary(&config), &universe.galaxy.statistics, 0.0);
        if !deviations.is_empty() {
            log::debug!("seed {}: {}", seed, deviations[0]);
            deviating += 1;
        }
    }

    results.push(TestResult {
        name: "demo_universes_validate".into(),
        passed: broken == 0,
        detail: format!("{}/{} universes with entity errors", broken, UNIVERSE_SWEEP),
    });
    results.push(TestResult {
        name: "demo_matches_estimate".into(),
        passed: deviating == 0,
        detail: format!("{}/{} universes off estimate", deviating, UNIVERSE_SWEEP),
    });

    let config = flat(300);
    let deterministic = demo_universe(&config) == demo_universe(&config);
    results.push(TestResult {
        name: "demo_deterministic".into(),
        passed: deterministic,
        detail: "same config, same universe".into(),
    });

    if verbose {
        println!("  largest universe: {} sectors", largest);
    }
    results
}

// ── 4. Regeneration ─────────────────────────────────────────────────────

/// In-process stand-in for the game server's generate/clear endpoints.
#[derive(Default)]
struct SimServer {
    galaxy: Option<GalaxySummary>,
    generations: u32,
    clears: u32,
}

impl SimServer {
    fn execute(&mut self, command: Command) -> RegenEvent {
        match command {
            Command::SubmitGeneration(request) => {
                if self.galaxy.is_some() {
                    return RegenEvent::GenerationFailed(classify_failure(
                        Operation::GenerateGalaxy,
                        400,
                        r#"{"detail":"A galaxy already exists. Delete the existing galaxy first."}"#,
                    ));
                }
                self.generations += 1;
                let universe = demo_universe(&request.into_config());
                let summary = GalaxySummary::from(&universe.galaxy);
                self.galaxy = Some(summary.clone());
                RegenEvent::GenerationSucceeded(summary)
            }
            Command::SubmitClear => {
                self.clears += 1;
                self.galaxy = None;
                RegenEvent::ClearSucceeded
            }
        }
    }
}

/// Feed commands back into the flow until it settles.
fn drive(flow: RegenFlow, command: Option<Command>, server: &mut SimServer) -> RegenFlow {
    let mut flow = flow;
    let mut next = command;
    while let Some(command) = next.take() {
        let event = server.execute(command);
        match flow.transition(event) {
            Ok((updated, command)) => {
                flow = updated;
                next = command;
            }
            Err(e) => {
                log::warn!("flow rejected server event: {}", e);
                break;
            }
        }
    }
    flow
}

fn validate_regeneration(verbose: bool) -> Vec<TestResult> {
    println!("--- Regeneration ---");
    let mut results = Vec::new();
    let mut server = SimServer::default();
    // The server starts with a galaxy the client has not loaded.
    server.galaxy = Some(GalaxySummary::from(&demo_universe(&flat(200)).galaxy));
    let mut flow = RegenFlow::new();
    let mut mismatched = 0;
    let rounds = 10;

    for seed in 0..rounds {
        let config = randomize_config(seed);
        let Ok(validated) = ValidatedConfig::new(config.clone()) else {
            mismatched += 1;
            continue;
        };
        let Ok((requested, command)) = flow.transition(RegenEvent::GenerateRequested(validated))
        else {
            mismatched += 1;
            continue;
        };
        flow = drive(requested, command, &mut server);
        if flow.state() == RegenState::ConfirmClear {
            match flow.transition(RegenEvent::ClearConfirmed) {
                Ok((clearing, command)) => flow = drive(clearing, command, &mut server),
                Err(e) => log::warn!("confirm rejected: {}", e),
            }
        }
        let name_matches = flow.galaxy().map(|g| g.name.as_str()) == Some(config.name());
        if flow.state() != RegenState::Ready || !name_matches {
            mismatched += 1;
        }
    }

    results.push(TestResult {
        name: "regenerate_replaces_galaxy".into(),
        passed: mismatched == 0,
        detail: format!("{}/{} rounds ended elsewhere", mismatched, rounds),
    });
    results.push(TestResult {
        name: "one_clear_per_round".into(),
        passed: server.clears == rounds as u32 && server.generations == rounds as u32,
        detail: format!(
            "{} generations, {} clears",
            server.generations, server.clears
        ),
    });

    let busy = ValidatedConfig::new(flat(300)).ok().map(|validated| {
        RegenFlow::new()
            .transition(RegenEvent::GenerateRequested(validated))
            .and_then(|(generating, _)| generating.transition(RegenEvent::ClearRequested))
    });
    results.push(TestResult {
        name: "busy_rejects_second_request".into(),
        passed: matches!(busy, Some(Err(_))),
        detail: match busy {
            Some(Err(e)) => e.to_string(),
            Some(Ok((flow, _))) => format!("accepted in {:?}", flow.state()),
            None => "300-sector config rejected".into(),
        },
    });

    if verbose {
        println!("  {} regeneration rounds", rounds);
    }
    results
}

// ── 5. Refresh Ordering ─────────────────────────────────────────────────

fn validate_refresh_ordering(_verbose: bool) -> Vec<TestResult> {
    println!("--- Refresh Ordering ---");
    let mut results = Vec::new();

    // Responses arrive newest first; only the first arrival applies.
    let mut sequencer = RefreshSequencer::new();
    let tickets: Vec<_> = (0..8).map(|_| sequencer.issue()).collect();
    let applied = tickets
        .iter()
        .rev()
        .filter(|ticket| sequencer.accept(**ticket))
        .count();
    results.push(TestResult {
        name: "reverse_arrival_applies_newest_only".into(),
        passed: applied == 1 && sequencer.last_applied() == tickets.last().copied(),
        detail: format!("{} of {} applied", applied, tickets.len()),
    });

    // Interleaved: 2, 1, 4, 3 → 2 and 4 apply.
    let mut sequencer = RefreshSequencer::new();
    let tickets: Vec<_> = (0..4).map(|_| sequencer.issue()).collect();
    let applied: Vec<u64> = [1, 0, 3, 2]
        .iter()
        .map(|i| tickets[*i])
        .filter(|ticket| sequencer.accept(*ticket))
        .map(|ticket| ticket.seq())
        .collect();
    results.push(TestResult {
        name: "interleaved_arrival".into(),
        passed: applied == vec![2, 4],
        detail: format!("applied {:?}", applied),
    });

    results
}
