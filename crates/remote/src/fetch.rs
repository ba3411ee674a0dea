// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Download of the raw configuration file from the resolved repo URL.

use automl_core::Error;

/// Fetch the configuration document from its raw URL.
pub async fn download_config(url: &str) -> Result<Vec<u8>, Error> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| Error::Http(format!("cannot fetch configuration file from {url}: {e}")))?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Http(format!(
            "cannot fetch configuration file from {url}; \
             make sure you provide a PAT token in case your repo is private"
        )));
    }
    if !status.is_success() {
        return Err(Error::Http(format!(
            "cannot fetch configuration file from {url}; status code: {}",
            status.as_u16()
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| Error::Http(format!("cannot read configuration file from {url}: {e}")))?;
    Ok(body.to_vec())
}
