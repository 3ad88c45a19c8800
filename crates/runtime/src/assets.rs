//! Map asset loading.
//!
//! Given a resolved map id, the loader fetches `<map>/data.json` from the
//! asset host. The background and radar images are fetched by the render
//! layer directly; only their URLs are built here. Fetch failures are
//! non-fatal and never retried.

use crate::error::{Error, Result};
use radar_core::MapData;
use std::future::Future;
use std::pin::Pin;

/// Collaborator that retrieves map metadata for a resolved map id.
///
/// Boxed-future style so the session can hold `Arc<dyn AssetLoader>`
/// without generics.
pub trait AssetLoader: Send + Sync {
    fn fetch_map_data(
        &self,
        map: &str,
    ) -> Pin<Box<dyn Future<Output = Result<MapData>> + Send + '_>>;
}

/// HTTP-backed asset loader.
#[derive(Debug, Clone)]
pub struct HttpAssetLoader {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAssetLoader {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// URL of the projection metadata for `map`.
    pub fn data_url(&self, map: &str) -> String {
        format!("{}/{}/data.json", self.base_url, map)
    }

    /// URL of the page background image for `map`.
    pub fn background_url(&self, map: &str) -> String {
        format!("{}/{}/background.png", self.base_url, map)
    }

    /// URL of the top-down radar image for `map`.
    pub fn radar_url(&self, map: &str) -> String {
        format!("{}/{}/radar.png", self.base_url, map)
    }
}

impl AssetLoader for HttpAssetLoader {
    fn fetch_map_data(
        &self,
        map: &str,
    ) -> Pin<Box<dyn Future<Output = Result<MapData>> + Send + '_>> {
        let url = self.data_url(map);
        let map = map.to_string();

        Box::pin(async move {
            let fetch_err = |reason: String| Error::AssetFetch {
                map: map.clone(),
                reason,
            };

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| fetch_err(e.to_string()))?
                .error_for_status()
                .map_err(|e| fetch_err(e.to_string()))?;

            let mut data: MapData = response
                .json()
                .await
                .map_err(|e| fetch_err(e.to_string()))?;

            data.name = map;
            Ok(data)
        })
    }
}
