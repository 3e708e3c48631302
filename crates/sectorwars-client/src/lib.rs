//! SectorWars Admin Client: async access to the game server's galaxy API.
//!
//! All decisions (validation, estimation, regeneration transitions, refresh
//! ordering) live in `sectorwars-logic`; this crate performs the I/O.
//!
//! # Modules
//!
//! | Module      | Purpose                                                |
//! |-------------|--------------------------------------------------------|
//! | `config`    | Server URL, token, timeouts, retry backoff             |
//! | `error`     | `ClientError` and its mapping to classified failures   |
//! | `api`       | `GalaxyApi` trait and the reqwest implementation       |
//! | `session`   | `AdminSession`: regeneration flow, caching, fallbacks  |
//! | `refresher` | Interval statistics refresh with stale-response drop   |

pub mod api;
pub mod config;
pub mod error;
pub mod refresher;
pub mod session;

pub use api::{GalaxyApi, HttpGalaxyApi};
pub use config::ClientConfig;
pub use error::ClientError;
pub use refresher::{StatsRefresher, StatsUpdate};
pub use session::{AdminSession, DataSource, Fetched, GalaxyView};
