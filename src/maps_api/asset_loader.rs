use std::path::PathBuf;

use super::{download, DecodedImage, FetchError};

/// Where an image referenced by the registry actually lives.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetSource {
    Remote(String),
    Local(PathBuf),
}

/// Loads popup images and the marker icon, either from the asset directory or
/// over HTTP when the reference is a full URL.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    client: reqwest::Client,
    asset_dir: PathBuf,
}

impl AssetLoader {
    pub fn new(client: reqwest::Client, asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            asset_dir: asset_dir.into(),
        }
    }

    pub fn resolve(&self, reference: &str) -> AssetSource {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            AssetSource::Remote(reference.to_string())
        } else {
            AssetSource::Local(self.asset_dir.join(reference.trim_start_matches('/')))
        }
    }

    pub async fn load(&self, reference: &str) -> Result<DecodedImage, FetchError> {
        let bytes = match self.resolve(reference) {
            AssetSource::Remote(url) => download(&self.client, &url).await?,
            AssetSource::Local(path) => tokio::fs::read(&path).await.map_err(|source| FetchError::Io {
                path: path.display().to_string(),
                source,
            })?,
        };

        DecodedImage::from_bytes(&bytes)
    }
}
