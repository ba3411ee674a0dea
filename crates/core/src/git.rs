// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git remote URL parsing and raw-configuration URL derivation.
//!
//! Only `https://` remotes on github.com, gitlab.com and bitbucket.org are
//! supported. For private repositories the PAT token is embedded into the
//! derived URLs; gitlab additionally needs the numeric project id because
//! its raw-file API is addressed by id, not by path.

use crate::error::Error;
use regex::Regex;
use std::sync::LazyLock;

const ALLOWED_HOSTS: [&str; 3] = ["github.com", "gitlab.com", "bitbucket.org"];
const RAW_GITHUB_HOST: &str = "raw.githubusercontent.com";

static URL_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?:@|//)([\w.-]+)/([\w._-]+)/([\w._-]+).*$").expect("static url pattern compiles")
});

/// A parsed git remote together with the access parameters needed to derive
/// the clone URL and the raw configuration-file URL.
#[derive(Debug, Clone)]
pub struct GitUrl {
    host: String,
    username: String,
    project: String,
    token: Option<String>,
    project_id: Option<String>,
    branch: String,
    file: String,
}

impl GitUrl {
    /// Parse a remote URL.
    ///
    /// `project_id` is the numeric gitlab project id, required only when a
    /// token is used against gitlab.
    pub fn parse(
        url: &str,
        token: Option<&str>,
        project_id: Option<&str>,
        branch: &str,
        file: &str,
    ) -> Result<Self, Error> {
        if !url.starts_with("https://") {
            return Err(Error::Git(format!(
                "only the https protocol is supported, got {url}; \
                 for a private repo use https and provide a PAT token"
            )));
        }

        let caps = URL_PARTS
            .captures(url)
            .ok_or_else(|| Error::Git(format!("invalid git url: {url}")))?;
        let host = caps[1].to_string();
        let username = caps[2].to_string();
        let project = caps[3].trim_end_matches(".git").to_string();

        if !ALLOWED_HOSTS.contains(&host.as_str()) {
            return Err(Error::Git(
                "only github, gitlab and bitbucket repositories are supported".to_string(),
            ));
        }

        // Tokens travel inside URLs; escape the one character that breaks them.
        let token = token.map(|t| t.replace('/', "%2F"));

        Ok(Self {
            host,
            username,
            project,
            token,
            project_id: project_id.map(str::to_string),
            branch: branch.to_string(),
            file: file.to_string(),
        })
    }

    /// Repository project name (trailing `.git` removed).
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Clone URL, with the token embedded for private repositories.
    pub fn repo_url(&self) -> String {
        match &self.token {
            Some(token) => format!(
                "https://{}:{token}@{}/{}/{}",
                self.username, self.host, self.username, self.project
            ),
            None => format!("https://{}/{}/{}", self.host, self.username, self.project),
        }
    }

    /// URL that serves the raw configuration file for this remote.
    pub fn raw_config_url(&self) -> Result<String, Error> {
        let github = self.host.contains("github");
        if let Some(token) = &self.token {
            if github {
                return Ok(format!(
                    "https://{}:{token}@{RAW_GITHUB_HOST}/{}/{}/{}/{}",
                    self.username, self.username, self.project, self.branch, self.file
                ));
            }
            if self.host.contains("gitlab") {
                let id = self.project_id.as_ref().ok_or_else(|| {
                    Error::Git("please provide the id of the gitlab project".to_string())
                })?;
                return Ok(format!(
                    "https://gitlab.com/api/v4/projects/{id}/repository/files/{}/raw?ref={}&private_token={token}",
                    self.file, self.branch
                ));
            }
            return Ok(format!(
                "https://api.bitbucket.org/2.0/repositories/{}/{}/src/{}/{}?access_token={token}",
                self.username, self.project, self.branch, self.file
            ));
        }

        let (host, suffix) = if github {
            (RAW_GITHUB_HOST, "")
        } else {
            (self.host.as_str(), "raw/")
        };
        Ok(format!(
            "https://{host}/{}/{}/{suffix}{}/{}",
            self.username, self.project, self.branch, self.file
        ))
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
