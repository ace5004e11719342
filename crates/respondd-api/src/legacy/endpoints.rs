// Read endpoints the responder polls: the site list (controller-scoped) and
// per-site device and station statistics.

use crate::error::Error;
use crate::legacy::client::{LegacyClient, Scope};
use crate::legacy::models::{LegacyClientEntry, LegacyDevice, LegacySite};

impl LegacyClient {
    /// `GET /api/self/sites`
    pub async fn list_sites(&self) -> Result<Vec<LegacySite>, Error> {
        self.fetch(Scope::Controller, "self/sites").await
    }

    /// Adopted devices with statistics. `GET /api/s/{site}/stat/device`
    pub async fn list_devices(&self) -> Result<Vec<LegacyDevice>, Error> {
        self.fetch(Scope::Site, "stat/device").await
    }

    /// Connected stations. `GET /api/s/{site}/stat/sta`
    pub async fn list_clients(&self) -> Result<Vec<LegacyClientEntry>, Error> {
        self.fetch(Scope::Site, "stat/sta").await
    }
}
