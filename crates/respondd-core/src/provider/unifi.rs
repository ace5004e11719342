// ── UniFi provider ──
//
// One poll: log in with a fresh cookie session, fetch the node list once,
// list sites, poll sites with bounded concurrency, resolve locations within
// the poll's geocoding budget, log out. A failing site is logged and left
// out; only login or site listing failures fail the poll.

use futures_util::{StreamExt, stream};
use respondd_api::legacy::models::LegacySite;
use respondd_api::{
    LegacyClient, Nodelist, NodelistClient, NominatimClient, TlsMode, TransportConfig,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::UnifiProviderConfig;
use crate::error::ProviderError;
use crate::model::DeviceSnapshot;
use crate::provider::Provider;
use crate::provider::convert::{self, SiteContext};
use crate::provider::location::Locator;

/// Site used for controller-level calls before a site is selected.
const DEFAULT_SITE: &str = "default";

/// Provider for UniFi Network controllers (standalone or UniFi OS).
pub struct UnifiProvider {
    config: UnifiProviderConfig,
    nodelist: Option<NodelistClient>,
    locator: Locator,
}

impl UnifiProvider {
    pub fn new(config: UnifiProviderConfig) -> Result<Self, ProviderError> {
        // Node list and geocoder are public services: always verify TLS.
        let http = TransportConfig::new(TlsMode::System, config.request_timeout).build_client()?;

        let nodelist = config
            .nodelist_url
            .clone()
            .map(|url| NodelistClient::new(http.clone(), url));
        let geocoder = config
            .geocoder_url
            .clone()
            .map(|url| NominatimClient::new(http, url));

        Ok(Self {
            config,
            nodelist,
            locator: Locator::new(geocoder),
        })
    }

    /// Replace the location resolver (e.g. to shorten retry backoff).
    #[must_use]
    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }

    /// Log in with a fresh cookie jar.
    async fn session(&self) -> Result<LegacyClient, ProviderError> {
        let transport =
            TransportConfig::new(self.config.tls, self.config.request_timeout).with_cookie_jar();

        let client = LegacyClient::new(
            self.config.controller_url.clone(),
            DEFAULT_SITE.into(),
            self.config.platform,
            &transport,
        )?;
        client
            .login(&self.config.username, &self.config.password)
            .await?;
        Ok(client)
    }

    /// Node list for this poll. Failure degrades gateway data only.
    async fn fetch_nodelist(&self) -> Option<Nodelist> {
        let client = self.nodelist.as_ref()?;
        match client.fetch().await {
            Ok(nodelist) => Some(nodelist),
            Err(e) => {
                warn!(url = %client.url(), error = %e, "node list unavailable, using fallback domain");
                None
            }
        }
    }

    async fn collect(&self, client: &LegacyClient) -> Result<Vec<DeviceSnapshot>, ProviderError> {
        let nodelist = self.fetch_nodelist().await;
        let sites = client.list_sites().await?;
        debug!(sites = sites.len(), "polling sites");

        let nodelist = nodelist.as_ref();
        let geocode_deadline = self.locator.deadline();
        let polls: Vec<_> = sites
            .iter()
            .map(|site| self.poll_site(client, site, nodelist, geocode_deadline))
            .collect();
        let results: Vec<_> = stream::iter(polls)
            .buffered(self.config.site_concurrency.max(1))
            .collect()
            .await;

        let mut snapshots = Vec::new();
        for (site, result) in sites.iter().zip(results) {
            match result {
                Ok(found) => {
                    debug!(site = site.description(), devices = found.len(), "site polled");
                    snapshots.extend(found);
                }
                Err(e) => warn!(site = site.description(), error = %e, "site poll failed, skipping"),
            }
        }
        Ok(snapshots)
    }

    async fn poll_site(
        &self,
        client: &LegacyClient,
        site: &LegacySite,
        nodelist: Option<&Nodelist>,
        geocode_deadline: Instant,
    ) -> Result<Vec<DeviceSnapshot>, ProviderError> {
        let client = client.for_site(&site.name);
        let (devices, stations) = tokio::join!(client.list_devices(), client.list_clients());
        let (devices, stations) = (devices?, stations?);

        let offloader = self.config.offloader_macs.get(site.description());
        let gateway = offloader.and_then(|mac| nodelist?.find_by_mac(mac.as_str()));
        if offloader.is_some() && gateway.is_none() {
            debug!(site = site.description(), "offloader not in node list");
        }

        let context = SiteContext {
            ssid: &self.config.ssid_regex,
            offloader,
            gateway,
            fallback_domain: &self.config.fallback_domain,
        };

        let mut snapshots: Vec<DeviceSnapshot> = devices
            .iter()
            .filter_map(|device| convert::snapshot(device, &stations, &context))
            .collect();

        for snapshot in &mut snapshots {
            if let Some(location) = &snapshot.location {
                snapshot.coordinates = Some(
                    self.locator
                        .resolve_until(location, geocode_deadline)
                        .await,
                );
            }
        }
        Ok(snapshots)
    }
}

impl Provider for UnifiProvider {
    fn name(&self) -> &'static str {
        "unifi"
    }

    async fn poll(&self) -> Result<Vec<DeviceSnapshot>, ProviderError> {
        let client = self.session().await?;
        let result = self.collect(&client).await;

        if let Err(e) = client.logout().await {
            warn!(error = %e, "logout failed (non-fatal)");
        }

        if let Ok(snapshots) = &result {
            info!(devices = snapshots.len(), "unifi poll complete");
        }
        result
    }
}
