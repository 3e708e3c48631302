//! The galaxy admin API as an async trait, plus its reqwest implementation.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use sectorwars_logic::protocol::{
    classify_failure, parse_galaxy_info, Ack, AddSectorsRequest, CreateWarpTunnelRequest,
    CreateWarpTunnelResponse, Failure, GalaxySummary, GenerateGalaxyRequest, Operation, Page,
    RegionList, SectorListing, SectorPage, SectorQuery,
};
use sectorwars_logic::universe::galaxy::Galaxy;
use sectorwars_logic::universe::zone::Zone;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// One method per admin endpoint.
#[async_trait]
pub trait GalaxyApi: Send + Sync {
    async fn generate_galaxy(
        &self,
        request: &GenerateGalaxyRequest,
    ) -> Result<GalaxySummary, ClientError>;

    async fn clear_galaxy(&self) -> Result<Ack, ClientError>;

    /// `None` when no galaxy has been generated.
    async fn get_galaxy(&self) -> Result<Option<Galaxy>, ClientError>;

    async fn list_regions(&self) -> Result<Vec<Zone>, ClientError>;

    async fn list_sectors(&self, query: &SectorQuery) -> Result<Page<SectorListing>, ClientError>;

    async fn create_warp_tunnel(
        &self,
        request: &CreateWarpTunnelRequest,
    ) -> Result<CreateWarpTunnelResponse, ClientError>;

    async fn add_sectors(&self, request: &AddSectorsRequest) -> Result<Ack, ClientError>;
}

pub struct HttpGalaxyApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGalaxyApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::from(Failure::transport(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, operation: Operation) -> String {
        format!("{}{}", self.base_url, operation.path())
    }

    fn get(&self, operation: Operation) -> RequestBuilder {
        self.client.get(self.url(operation))
    }

    fn post(&self, operation: Operation) -> RequestBuilder {
        self.client.post(self.url(operation))
    }

    /// Send and return the body of a successful response.
    async fn send(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<String, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        log::debug!("{} {}", operation, self.url(operation));

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from(Failure::transport(e.to_string())))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let failure = classify_failure(operation, status.as_u16(), &body);
            log::debug!("{} failed: {}", operation, failure);
            return Err(failure.into());
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let body = self.send(operation, request).await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::Decode(format!("{}: {}", operation, e)))
    }
}

#[async_trait]
impl GalaxyApi for HttpGalaxyApi {
    async fn generate_galaxy(
        &self,
        request: &GenerateGalaxyRequest,
    ) -> Result<GalaxySummary, ClientError> {
        let op = Operation::GenerateGalaxy;
        self.send_json(op, self.post(op).json(request)).await
    }

    async fn clear_galaxy(&self) -> Result<Ack, ClientError> {
        let op = Operation::ClearGalaxy;
        self.send_json(op, self.post(op)).await
    }

    async fn get_galaxy(&self) -> Result<Option<Galaxy>, ClientError> {
        let op = Operation::GetGalaxy;
        let body = self.send(op, self.get(op)).await?;
        parse_galaxy_info(&body).map_err(|e| ClientError::Decode(format!("{}: {}", op, e)))
    }

    async fn list_regions(&self) -> Result<Vec<Zone>, ClientError> {
        let op = Operation::ListRegions;
        let list: RegionList = self.send_json(op, self.get(op)).await?;
        Ok(list.into_zones())
    }

    async fn list_sectors(&self, query: &SectorQuery) -> Result<Page<SectorListing>, ClientError> {
        let op = Operation::ListSectors;
        let request = self.get(op).query(&query.to_query_pairs());
        let page: SectorPage = self.send_json(op, request).await?;
        Ok(page.into_page(query))
    }

    async fn create_warp_tunnel(
        &self,
        request: &CreateWarpTunnelRequest,
    ) -> Result<CreateWarpTunnelResponse, ClientError> {
        let op = Operation::CreateWarpTunnel;
        self.send_json(op, self.post(op).json(request)).await
    }

    async fn add_sectors(&self, request: &AddSectorsRequest) -> Result<Ack, ClientError> {
        let op = Operation::AddSectors;
        self.send_json(op, self.post(op).json(request)).await
    }
}
