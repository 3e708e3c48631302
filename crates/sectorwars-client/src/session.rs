//! Admin session driving the regeneration flow against a [`GalaxyApi`].
//!
//! Reads retry transient failures with doubling backoff, then fall back to
//! the last good response or, with nothing cached, to a demo universe built
//! from the draft configuration. Every fallback is flagged through
//! [`DataSource`]. Mutations never fall back and are never retried.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::watch;

use sectorwars_logic::constants::sectors;
use sectorwars_logic::demo::demo_universe;
use sectorwars_logic::params::{GalaxyConfig, GenerationMode};
use sectorwars_logic::protocol::{
    Ack, AddSectorsRequest, CreateWarpTunnelRequest, CreateWarpTunnelResponse, GalaxySummary,
    Operation, Page, SectorListing, SectorQuery,
};
use sectorwars_logic::regeneration::{Command, RegenEvent, RegenFlow, RegenState};
use sectorwars_logic::universe::galaxy::Galaxy;
use sectorwars_logic::universe::zone::Zone;
use sectorwars_logic::universe::Universe;
use sectorwars_logic::validation::{validate_new_tunnel, validate_sector_batch, ValidatedConfig};

use crate::api::GalaxyApi;
use crate::config::ClientConfig;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    /// Last good server response.
    Cached,
    /// Generated locally; nothing from the server.
    Demo,
}

/// A read result and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub source: DataSource,
}

impl<T> Fetched<T> {
    fn new(value: T, source: DataSource) -> Self {
        Self { value, source }
    }

    pub fn is_fallback(&self) -> bool {
        self.source != DataSource::Live
    }
}

/// What the session currently believes about the server's galaxy.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyView {
    pub galaxy: Option<Galaxy>,
    pub source: DataSource,
    pub state: RegenState,
}

#[derive(Default)]
struct ReadCache {
    /// Outer None: never loaded.
    galaxy: Option<Option<Galaxy>>,
    regions: Option<Vec<Zone>>,
    sectors: HashMap<SectorQuery, Page<SectorListing>>,
}

pub struct AdminSession<A> {
    api: A,
    config: ClientConfig,
    flow: RegenFlow,
    draft: GalaxyConfig,
    /// Mode of the galaxy this session generated, until it is cleared.
    galaxy_mode: Option<GenerationMode>,
    cache: ReadCache,
    demo: Option<Universe>,
    view: watch::Sender<GalaxyView>,
}

impl<A: GalaxyApi> AdminSession<A> {
    pub fn new(api: A, config: ClientConfig) -> Self {
        let flow = RegenFlow::new();
        let (view, _) = watch::channel(GalaxyView {
            galaxy: None,
            source: DataSource::Live,
            state: flow.state(),
        });
        Self {
            api,
            config,
            flow,
            draft: GalaxyConfig::default(),
            galaxy_mode: None,
            cache: ReadCache::default(),
            demo: None,
            view,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn flow(&self) -> &RegenFlow {
        &self.flow
    }

    pub fn state(&self) -> RegenState {
        self.flow.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<GalaxyView> {
        self.view.subscribe()
    }

    pub fn draft(&self) -> &GalaxyConfig {
        &self.draft
    }

    /// Replace the configuration being edited. Demo fallbacks follow it.
    pub fn set_draft(&mut self, config: GalaxyConfig) {
        if config != self.draft {
            self.demo = None;
        }
        self.draft = config;
    }

    fn demo(&mut self) -> &Universe {
        let draft = &self.draft;
        self.demo.get_or_insert_with(|| demo_universe(draft))
    }

    fn publish(&self, galaxy: Option<Galaxy>, source: DataSource) {
        self.view.send_replace(GalaxyView {
            galaxy,
            source,
            state: self.flow.state(),
        });
    }

    fn publish_state(&self) {
        self.view.send_modify(|view| view.state = self.flow.state());
    }

    fn apply(&mut self, event: RegenEvent) -> Result<Option<Command>, ClientError> {
        let (flow, command) = self.flow.transition(event)?;
        self.flow = flow;
        self.publish_state();
        Ok(command)
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub async fn load_galaxy(&mut self) -> Result<Fetched<Option<Galaxy>>, ClientError> {
        let api = &self.api;
        let result =
            with_retry(&mut self.config, Operation::GetGalaxy, || api.get_galaxy()).await;

        match result {
            Ok(galaxy) => {
                self.cache.galaxy = Some(galaxy.clone());
                self.apply(RegenEvent::GalaxyLoaded(
                    galaxy.as_ref().map(GalaxySummary::from),
                ))?;
                self.publish(galaxy.clone(), DataSource::Live);
                Ok(Fetched::new(galaxy, DataSource::Live))
            }
            Err(err) if err.allows_fallback() => {
                let fetched = match self.cache.galaxy.clone() {
                    Some(galaxy) => Fetched::new(galaxy, DataSource::Cached),
                    None => Fetched::new(Some(self.demo().galaxy.clone()), DataSource::Demo),
                };
                log::warn!(
                    "{} unavailable ({}); showing {:?} galaxy",
                    Operation::GetGalaxy,
                    err,
                    fetched.source
                );
                self.publish(fetched.value.clone(), fetched.source);
                Ok(fetched)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn list_regions(&mut self) -> Result<Fetched<Vec<Zone>>, ClientError> {
        let api = &self.api;
        let result =
            with_retry(&mut self.config, Operation::ListRegions, || api.list_regions()).await;

        match result {
            Ok(regions) => {
                self.cache.regions = Some(regions.clone());
                Ok(Fetched::new(regions, DataSource::Live))
            }
            Err(err) if err.allows_fallback() => {
                let fetched = match self.cache.regions.clone() {
                    Some(regions) => Fetched::new(regions, DataSource::Cached),
                    None => Fetched::new(self.demo().zones.clone(), DataSource::Demo),
                };
                log::warn!(
                    "{} unavailable ({}); showing {:?} regions",
                    Operation::ListRegions,
                    err,
                    fetched.source
                );
                Ok(fetched)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn list_sectors(
        &mut self,
        query: &SectorQuery,
    ) -> Result<Fetched<Page<SectorListing>>, ClientError> {
        let api = &self.api;
        let result = with_retry(&mut self.config, Operation::ListSectors, || {
            api.list_sectors(query)
        })
        .await;

        match result {
            Ok(page) => {
                self.cache.sectors.insert(query.clone(), page.clone());
                Ok(Fetched::new(page, DataSource::Live))
            }
            Err(err) if err.allows_fallback() => {
                let fetched = match self.cache.sectors.get(query) {
                    Some(page) => Fetched::new(page.clone(), DataSource::Cached),
                    None => {
                        let demo = self.demo();
                        let page = query.apply(&demo.sectors, &demo.network());
                        Fetched::new(page, DataSource::Demo)
                    }
                };
                log::warn!(
                    "{} unavailable ({}); showing {:?} sectors",
                    Operation::ListSectors,
                    err,
                    fetched.source
                );
                Ok(fetched)
            }
            Err(err) => Err(err),
        }
    }

    // ========================================================================
    // REGENERATION
    // ========================================================================

    /// Validate `config` and start generating. Returns the resulting state;
    /// `ConfirmClear` means the operator must confirm deleting the old galaxy.
    pub async fn request_generation(
        &mut self,
        config: GalaxyConfig,
    ) -> Result<RegenState, ClientError> {
        let validated = ValidatedConfig::new(config)?;
        self.set_draft(validated.config().clone());
        let command = self.apply(RegenEvent::GenerateRequested(validated))?;
        self.run(command).await
    }

    /// Ask to delete the current galaxy without regenerating.
    pub fn request_clear(&mut self) -> Result<RegenState, ClientError> {
        self.apply(RegenEvent::ClearRequested)?;
        Ok(self.flow.state())
    }

    pub async fn confirm_clear(&mut self) -> Result<RegenState, ClientError> {
        let command = self.apply(RegenEvent::ClearConfirmed)?;
        self.run(command).await
    }

    pub fn cancel_clear(&mut self) -> Result<RegenState, ClientError> {
        self.apply(RegenEvent::ClearCancelled)?;
        Ok(self.flow.state())
    }

    /// Execute commands until the flow settles. Failures are recorded in the
    /// flow's last error rather than returned.
    async fn run(&mut self, mut command: Option<Command>) -> Result<RegenState, ClientError> {
        while let Some(next) = command.take() {
            let event = match next {
                Command::SubmitGeneration(request) => {
                    log::info!("Submitting generation of '{}'", request.name());
                    match self.api.generate_galaxy(&request).await {
                        Ok(summary) => {
                            log::info!(
                                "Galaxy '{}' generated ({} sectors)",
                                summary.name,
                                summary.statistics.total_sectors
                            );
                            self.invalidate();
                            self.galaxy_mode = Some(request.mode());
                            RegenEvent::GenerationSucceeded(summary)
                        }
                        Err(err) => {
                            log::warn!("Generation failed: {}", err);
                            RegenEvent::GenerationFailed(err.to_failure())
                        }
                    }
                }
                Command::SubmitClear => {
                    log::info!("Clearing galaxy");
                    match self.api.clear_galaxy().await {
                        Ok(_) => {
                            log::info!("Galaxy cleared");
                            self.invalidate();
                            self.galaxy_mode = None;
                            self.cache.galaxy = Some(None);
                            self.publish(None, DataSource::Live);
                            RegenEvent::ClearSucceeded
                        }
                        Err(err) => {
                            log::warn!("Clear failed: {}", err);
                            RegenEvent::ClearFailed(err.to_failure())
                        }
                    }
                }
            };
            command = self.apply(event)?;
        }
        Ok(self.flow.state())
    }

    fn invalidate(&mut self) {
        self.cache = ReadCache::default();
    }

    // ========================================================================
    // INCREMENTAL MUTATIONS
    // ========================================================================

    pub async fn create_warp_tunnel(
        &mut self,
        request: &CreateWarpTunnelRequest,
    ) -> Result<CreateWarpTunnelResponse, ClientError> {
        let errors = validate_new_tunnel(request);
        if !errors.is_empty() {
            return Err(ClientError::ConfigurationInvalid(errors));
        }
        let response = self.api.create_warp_tunnel(request).await?;
        log::info!(
            "Warp tunnel {} -> {} created",
            response.source_sector_id,
            response.target_sector_id
        );
        self.cache.sectors.clear();
        Ok(response)
    }

    /// Add sectors to the loaded galaxy. The batch is checked against the
    /// last known sector total and the galaxy's mode: the generated mode when
    /// known, hub when the total is past the flat maximum, else the draft's.
    pub async fn add_sectors(&mut self, request: &AddSectorsRequest) -> Result<Ack, ClientError> {
        let current = self
            .cache
            .galaxy
            .as_ref()
            .and_then(|g| g.as_ref())
            .map(|g| g.statistics.total_sectors)
            .or_else(|| self.flow.galaxy().map(|g| g.statistics.total_sectors))
            .unwrap_or(0);
        let mode = match self.galaxy_mode {
            Some(mode) => mode,
            None if current > sectors::FLAT_MAX => GenerationMode::HubAndTerritories,
            None => self.draft.mode(),
        };
        let errors = validate_sector_batch(request, current, mode);
        if !errors.is_empty() {
            return Err(ClientError::ConfigurationInvalid(errors));
        }
        let ack = self.api.add_sectors(request).await?;
        log::info!("Added {} sectors", request.num_sectors);
        self.invalidate();
        Ok(ack)
    }
}

/// Run `call`, retrying transient failures with the config's backoff.
async fn with_retry<T, F, Fut>(
    config: &mut ClientConfig,
    operation: Operation,
    mut call: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    config.reset_backoff();
    loop {
        match call().await {
            Err(err) if err.is_retryable() && !config.retries_exhausted() => {
                let delay = config.retry_delay();
                log::warn!(
                    "{} failed ({}); retry {} in {:.1}s",
                    operation,
                    err,
                    config.retry_attempts + 1,
                    delay.as_secs_f32()
                );
                config.advance_backoff();
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
            Ok(value) => {
                config.reset_backoff();
                return Ok(value);
            }
        }
    }
}
