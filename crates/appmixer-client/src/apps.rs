//! App catalog endpoints.

use std::collections::BTreeMap;

use crate::client::AppmixerClient;
use crate::error::ClientResult;
use crate::models::{AppSummary, ComponentManifest};

impl AppmixerClient {
    /// Installed apps (`GET /apps`), sorted by name.
    ///
    /// The API answers with a map keyed by app name; each entry's `name` is
    /// taken from its key.
    pub async fn list_apps(&self) -> ClientResult<Vec<AppSummary>> {
        let catalog: BTreeMap<String, AppSummary> = self.get("/apps").await?;
        Ok(catalog
            .into_iter()
            .map(|(name, app)| AppSummary { name, ..app })
            .collect())
    }

    /// Component manifests of one app (`GET /apps/components?app=`).
    pub async fn list_app_components(&self, app_id: &str) -> ClientResult<Vec<ComponentManifest>> {
        self.get(&format!(
            "/apps/components?app={}",
            urlencoding::encode(app_id)
        ))
        .await
    }
}
