//! Integration tests for the admin session against a scripted API.
//!
//! Exercises: AdminSession → RegenFlow → GalaxyApi → fallback / fail-closed
//!
//! No network: `FakeApi` replays queued responses and reports the server as
//! unreachable once a queue runs dry.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use sectorwars_client::{AdminSession, ClientConfig, ClientError, DataSource, GalaxyApi};
use sectorwars_logic::demo::{demo_universe, DEMO_GALAXY_ID};
use sectorwars_logic::params::{FlatGalaxyConfig, GalaxyConfig, HubTerritoryConfig};
use sectorwars_logic::protocol::{
    classify_failure, Ack, AddSectorsRequest, CreateWarpTunnelRequest, CreateWarpTunnelResponse,
    Failure, FailureKind, GalaxySummary, GenerateGalaxyRequest, Operation, Page, SectorListing,
    SectorQuery,
};
use sectorwars_logic::regeneration::RegenState;
use sectorwars_logic::universe::galaxy::Galaxy;
use sectorwars_logic::universe::zone::Zone;
use sectorwars_logic::validation::ConfigError;

// ── Helpers ────────────────────────────────────────────────────────────

type Queue<T> = Mutex<VecDeque<Result<T, ClientError>>>;

#[derive(Default)]
struct FakeApi {
    generate: Queue<GalaxySummary>,
    clear: Queue<Ack>,
    galaxy: Queue<Option<Galaxy>>,
    sectors: Queue<Page<SectorListing>>,
    calls: Mutex<Vec<Operation>>,
}

impl FakeApi {
    fn next<T>(&self, op: Operation, queue: &Queue<T>) -> Result<T, ClientError> {
        self.calls.lock().unwrap().push(op);
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unreachable_server()))
    }

    fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GalaxyApi for FakeApi {
    async fn generate_galaxy(
        &self,
        _request: &GenerateGalaxyRequest,
    ) -> Result<GalaxySummary, ClientError> {
        self.next(Operation::GenerateGalaxy, &self.generate)
    }

    async fn clear_galaxy(&self) -> Result<Ack, ClientError> {
        self.next(Operation::ClearGalaxy, &self.clear)
    }

    async fn get_galaxy(&self) -> Result<Option<Galaxy>, ClientError> {
        self.next(Operation::GetGalaxy, &self.galaxy)
    }

    async fn list_regions(&self) -> Result<Vec<Zone>, ClientError> {
        self.calls.lock().unwrap().push(Operation::ListRegions);
        Err(unreachable_server())
    }

    async fn list_sectors(&self, _query: &SectorQuery) -> Result<Page<SectorListing>, ClientError> {
        self.next(Operation::ListSectors, &self.sectors)
    }

    async fn create_warp_tunnel(
        &self,
        _request: &CreateWarpTunnelRequest,
    ) -> Result<CreateWarpTunnelResponse, ClientError> {
        self.calls.lock().unwrap().push(Operation::CreateWarpTunnel);
        Err(unreachable_server())
    }

    async fn add_sectors(&self, _request: &AddSectorsRequest) -> Result<Ack, ClientError> {
        self.calls.lock().unwrap().push(Operation::AddSectors);
        Err(unreachable_server())
    }
}

fn unreachable_server() -> ClientError {
    Failure::transport("connection refused").into()
}

fn flat(total: u32) -> GalaxyConfig {
    GalaxyConfig::Flat(FlatGalaxyConfig {
        total_sectors: total,
        seed: Some(7),
        ..FlatGalaxyConfig::default()
    })
}

fn server_galaxy() -> Galaxy {
    let mut galaxy = demo_universe(&flat(300)).galaxy;
    galaxy.id = "g-42".into();
    galaxy.name = "Andromeda".into();
    galaxy
}

fn session(api: FakeApi) -> AdminSession<FakeApi> {
    AdminSession::new(api, ClientConfig::default())
}

// ── Regeneration ───────────────────────────────────────────────────────

#[tokio::test]
async fn existing_galaxy_requires_confirmation_then_regenerates() {
    let api = FakeApi::default();
    api.generate.lock().unwrap().extend([
        Err(classify_failure(
            Operation::GenerateGalaxy,
            400,
            r#"{"detail":"A galaxy already exists. Delete the existing galaxy first."}"#,
        )
        .into()),
        Ok(GalaxySummary::from(&server_galaxy())),
    ]);
    api.clear.lock().unwrap().push_back(Ok(Ack::default()));
    let mut session = session(api);

    let state = session.request_generation(flat(500)).await.unwrap();
    assert_eq!(state, RegenState::ConfirmClear);
    assert_eq!(
        session.flow().last_error().map(|f| f.kind),
        Some(FailureKind::ConflictExists)
    );

    let state = session.confirm_clear().await.unwrap();
    assert_eq!(state, RegenState::Ready);
    assert_eq!(session.flow().galaxy().map(|g| g.id.as_str()), Some("g-42"));
    assert_eq!(
        session.api().calls(),
        vec![
            Operation::GenerateGalaxy,
            Operation::ClearGalaxy,
            Operation::GenerateGalaxy
        ]
    );
    assert_eq!(session.subscribe().borrow().state, RegenState::Ready);
}

#[tokio::test]
async fn invalid_config_never_reaches_server() {
    let mut session = session(FakeApi::default());
    let mut config = FlatGalaxyConfig {
        total_sectors: 300,
        ..FlatGalaxyConfig::default()
    };
    config.zone_distribution.frontier = 41;

    let err = session
        .request_generation(GalaxyConfig::Flat(config))
        .await
        .unwrap_err();
    match err {
        ClientError::ConfigurationInvalid(errors) => {
            assert_eq!(errors, vec![ConfigError::ZoneSumInvalid(101)])
        }
        other => panic!("expected ConfigurationInvalid, got {:?}", other),
    }
    assert!(session.api().calls().is_empty());
    assert_eq!(session.state(), RegenState::NoGalaxy);
}

#[tokio::test]
async fn failed_clear_keeps_galaxy() {
    let api = FakeApi::default();
    api.galaxy
        .lock()
        .unwrap()
        .push_back(Ok(Some(server_galaxy())));
    let mut session = session(api);
    session.load_galaxy().await.unwrap();
    assert_eq!(session.state(), RegenState::Ready);

    assert_eq!(session.request_clear().unwrap(), RegenState::ConfirmClear);
    assert_eq!(session.confirm_clear().await.unwrap(), RegenState::Ready);
    let error = session.flow().last_error().cloned().unwrap();
    assert_eq!(error.kind, FailureKind::ServiceUnavailable);
    assert!(session.flow().galaxy().is_some());
}

#[tokio::test]
async fn cancel_returns_to_ready() {
    let api = FakeApi::default();
    api.galaxy
        .lock()
        .unwrap()
        .push_back(Ok(Some(server_galaxy())));
    let mut session = session(api);
    session.load_galaxy().await.unwrap();

    assert_eq!(
        session.request_generation(flat(400)).await.unwrap(),
        RegenState::ConfirmClear
    );
    assert_eq!(session.cancel_clear().unwrap(), RegenState::Ready);
    assert!(session.flow().pending().is_none());
    assert_eq!(session.api().calls(), vec![Operation::GetGalaxy]);
}

#[tokio::test]
async fn rejected_draft_is_not_kept() {
    let mut session = session(FakeApi::default());
    let mut config = FlatGalaxyConfig {
        total_sectors: u32::MAX,
        ..FlatGalaxyConfig::default()
    };
    config.zone_distribution.frontier = 41;

    let err = session
        .request_generation(GalaxyConfig::Flat(config))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ConfigurationInvalid(_)));
    assert_eq!(session.draft(), &GalaxyConfig::default());

    // The demo fallback is built from the last accepted draft.
    let regions = session.list_regions().await.unwrap();
    assert_eq!(regions.source, DataSource::Demo);
    assert_eq!(regions.value.len(), 3);
    assert_eq!(regions.value[2].end_sector, 500);
}

// ── Read fallbacks ─────────────────────────────────────────────────────

#[tokio::test]
async fn galaxy_read_falls_back_to_demo() {
    let mut session = session(FakeApi::default());
    let view = session.subscribe();

    let fetched = session.load_galaxy().await.unwrap();
    assert_eq!(fetched.source, DataSource::Demo);
    assert!(fetched.is_fallback());
    let galaxy = fetched.value.unwrap();
    assert_eq!(galaxy.id, DEMO_GALAXY_ID);
    assert_eq!(view.borrow().source, DataSource::Demo);
    // Fallback data never moves the flow.
    assert_eq!(session.state(), RegenState::NoGalaxy);
}

#[tokio::test]
async fn cached_galaxy_preferred_over_demo() {
    let api = FakeApi::default();
    api.galaxy
        .lock()
        .unwrap()
        .push_back(Ok(Some(server_galaxy())));
    let mut session = session(api);

    let live = session.load_galaxy().await.unwrap();
    assert_eq!(live.source, DataSource::Live);

    let cached = session.load_galaxy().await.unwrap();
    assert_eq!(cached.source, DataSource::Cached);
    assert_eq!(cached.value, Some(server_galaxy()));
}

#[tokio::test]
async fn sector_listing_falls_back_to_demo_universe() {
    let mut session = session(FakeApi::default());
    session.set_draft(flat(500));
    let query = SectorQuery {
        has_port: Some(true),
        limit: 20,
        ..SectorQuery::default()
    };

    let fetched = session.list_sectors(&query).await.unwrap();
    assert_eq!(fetched.source, DataSource::Demo);
    assert_eq!(fetched.value.total, Some(50));
    assert_eq!(fetched.value.items.len(), 20);
    assert!(fetched.value.items.iter().all(|row| row.has_port));

    let regions = session.list_regions().await.unwrap();
    assert_eq!(regions.source, DataSource::Demo);
    assert_eq!(regions.value.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn transient_read_failures_retried() {
    let api = FakeApi::default();
    let flaky = || -> Result<Option<Galaxy>, ClientError> {
        Err(classify_failure(Operation::GetGalaxy, 500, "try again").into())
    };
    api.galaxy
        .lock()
        .unwrap()
        .extend([flaky(), flaky(), Ok(Some(server_galaxy()))]);
    let mut session = session(api);

    let fetched = session.load_galaxy().await.unwrap();
    assert_eq!(fetched.source, DataSource::Live);
    assert_eq!(session.api().calls().len(), 3);
}

#[tokio::test]
async fn rejected_read_is_not_masked() {
    let api = FakeApi::default();
    api.sectors.lock().unwrap().push_back(Err(classify_failure(
        Operation::ListSectors,
        422,
        r#"{"detail":[{"msg":"limit must be positive"}]}"#,
    )
    .into()));
    let mut session = session(api);

    let err = session
        .list_sectors(&SectorQuery::default())
        .await
        .unwrap_err();
    match err {
        ClientError::ValidationRejected { status, detail } => {
            assert_eq!(status, 422);
            assert_eq!(detail, "limit must be positive");
        }
        other => panic!("expected ValidationRejected, got {:?}", other),
    }
}

// ── Mutations fail closed ──────────────────────────────────────────────

#[tokio::test]
async fn mutations_never_fall_back() {
    let mut session = session(FakeApi::default());

    let err = session
        .create_warp_tunnel(&CreateWarpTunnelRequest::new(1, 2, 85.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ServiceUnavailable { .. }));

    let err = session
        .add_sectors(&AddSectorsRequest { num_sectors: 10 })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ServiceUnavailable { .. }));

    assert_eq!(
        session.api().calls(),
        vec![Operation::CreateWarpTunnel, Operation::AddSectors]
    );
}

#[tokio::test]
async fn invalid_mutations_rejected_locally() {
    let mut session = session(FakeApi::default());

    let err = session
        .create_warp_tunnel(&CreateWarpTunnelRequest::new(4, 4, 105.0))
        .await
        .unwrap_err();
    match err {
        ClientError::ConfigurationInvalid(errors) => {
            assert!(errors.contains(&ConfigError::StabilityOutOfRange(105.0)));
            assert!(errors.contains(&ConfigError::SelfLoopTunnel(4)));
        }
        other => panic!("expected ConfigurationInvalid, got {:?}", other),
    }

    let err = session
        .add_sectors(&AddSectorsRequest { num_sectors: 0 })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ConfigurationInvalid(_)));
    assert!(session.api().calls().is_empty());
}

#[tokio::test]
async fn hub_galaxy_accepts_sector_batches() {
    let hub = GalaxyConfig::HubAndTerritories(HubTerritoryConfig {
        seed: Some(3),
        ..HubTerritoryConfig::default()
    });
    let api = FakeApi::default();
    api.generate
        .lock()
        .unwrap()
        .push_back(Ok(GalaxySummary::from(&demo_universe(&hub).galaxy)));
    let mut session = session(api);
    assert_eq!(
        session.request_generation(hub).await.unwrap(),
        RegenState::Ready
    );

    // Passes local checks and reaches the (unreachable) server.
    let err = session
        .add_sectors(&AddSectorsRequest { num_sectors: 200 })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ServiceUnavailable { .. }));

    let err = session
        .add_sectors(&AddSectorsRequest { num_sectors: 6000 })
        .await
        .unwrap_err();
    match err {
        ClientError::ConfigurationInvalid(errors) => assert_eq!(
            errors,
            vec![ConfigError::SectorBatchTooLarge {
                current: 5300,
                adding: 6000,
                max: 10_600
            }]
        ),
        other => panic!("expected ConfigurationInvalid, got {:?}", other),
    }
    assert_eq!(
        session.api().calls(),
        vec![Operation::GenerateGalaxy, Operation::AddSectors]
    );
}

#[tokio::test]
async fn loaded_hub_galaxy_accepts_sector_batches() {
    let hub = GalaxyConfig::HubAndTerritories(HubTerritoryConfig::default());
    let api = FakeApi::default();
    api.galaxy
        .lock()
        .unwrap()
        .push_back(Ok(Some(demo_universe(&hub).galaxy)));
    let mut session = session(api);
    session.load_galaxy().await.unwrap();

    let err = session
        .add_sectors(&AddSectorsRequest { num_sectors: 100 })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ServiceUnavailable { .. }));
    assert_eq!(
        session.api().calls(),
        vec![Operation::GetGalaxy, Operation::AddSectors]
    );
}
