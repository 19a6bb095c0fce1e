//! `pagerduty_addon`: a full-page add-on embedded in the web UI

use pd_client::{Addon, ResourceApi};
use pd_engine::{CompositeId, Error, ManagedResource, Result};
use serde::{Deserialize, Serialize};

pub const ADDON_TYPE: &str = "full_page_addon";

pub type AddonApi = dyn ResourceApi<Key = String, Resource = Addon, Payload = Addon, Filter = ()>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonResource {
    pub name: String,
    /// URL of the page rendered inside the add-on frame
    pub src: String,
}

impl AddonResource {
    pub fn new(name: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            src: src.into(),
        }
    }
}

impl ManagedResource for AddonResource {
    type Api = AddonApi;
    const TYPE_NAME: &'static str = "pagerduty_addon";

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::validation(Self::TYPE_NAME, "name must be set"));
        }
        if self.src.is_empty() {
            return Err(Error::validation(Self::TYPE_NAME, "src must be set"));
        }
        Ok(())
    }

    fn build(&self) -> Addon {
        Addon {
            kind: ADDON_TYPE.to_string(),
            name: self.name.clone(),
            src: self.src.clone(),
            ..Default::default()
        }
    }

    fn key(&self, id: &str) -> String {
        id.to_string()
    }

    fn remote_id(remote: &Addon) -> &str {
        &remote.id
    }

    fn apply(&mut self, remote: &Addon) {
        if !remote.name.is_empty() {
            self.name = remote.name.clone();
        }
        if !remote.src.is_empty() {
            self.src = remote.src.clone();
        }
    }

    fn seed_import(&mut self, id: &CompositeId) -> String {
        id.resource_id().to_string()
    }
}
