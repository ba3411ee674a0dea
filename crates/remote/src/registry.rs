// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image existence probe against the registry HTTP API.

use async_trait::async_trait;
use automl_core::config::{ImageProbe, ImageRef};
use automl_core::{defaults, Error};

/// Probes image tags with a HEAD request, following redirects.
#[derive(Clone, Default)]
pub struct RegistryProbe {
    client: reqwest::Client,
}

impl RegistryProbe {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageProbe for RegistryProbe {
    async fn check(&self, image: &ImageRef) -> Result<(), Error> {
        let url = defaults::registry_tag_url(&image.user, &image.repo, &image.tag);
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("cannot connect to image registry {url}: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "cannot find image {image} in the registry: {url} (code {})",
                response.status().as_u16()
            )));
        }
        Ok(())
    }
}
