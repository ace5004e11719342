// Cookie session login/logout. The session cookie lands in the client's jar
// and is shared by every client derived with `for_site`.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;

impl LegacyClient {
    /// Log in with username and password (`/api/login`, or `/api/auth/login`
    /// on UniFi OS).
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.base_url.join(self.platform.login_path())?;
        debug!(%url, username, "logging in");

        let resp = self
            .http
            .post(url)
            .json(&json!({
                "username": username,
                "password": password.expose_secret(),
            }))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Authentication {
            message: format!("login rejected (HTTP {status}): {}", body.trim()),
        })
    }

    /// End the session. The response body is ignored.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.base_url.join(self.platform.logout_path())?;
        debug!(%url, "logging out");
        self.http.post(url).send().await?;
        Ok(())
    }
}
