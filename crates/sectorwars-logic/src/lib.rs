//! Pure galaxy administration logic for SectorWars.
//!
//! This crate contains everything the admin tooling needs to reason about a
//! galaxy without talking to the game server: the generation parameter model,
//! its validation rules, expected-count estimates, the universe entity model,
//! and the request/response protocol types. Functions take plain data and
//! return results, so the HTTP client, the headless harness and any future
//! front-end share one set of rules.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Bounds for sectors, densities, bands, ports, planets, tunnels |
//! | [`demo`] | Deterministic fallback universe built from a configuration |
//! | [`estimate`] | Expected port/planet/zone counts and response sanity checks |
//! | [`params`] | Galaxy generation configuration (flat and hub+territories modes) |
//! | [`protocol`] | Wire shapes for the game-server API and failure classification |
//! | [`refresh`] | Last-request-wins ordering for statistics refreshes |
//! | [`regeneration`] | Generate / confirm-clear / regenerate state machine |
//! | [`universe`] | Galaxy, zone, sector, port, planet and warp tunnel entities |
//! | [`validation`] | Configuration and incremental mutation validation |

pub mod constants;
pub mod demo;
pub mod estimate;
pub mod params;
pub mod protocol;
pub mod refresh;
pub mod regeneration;
pub mod universe;
pub mod validation;
