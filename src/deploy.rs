//! Output directory preparation and publishing.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::DeployConfig;
use crate::error::{FeedError, Result};

/// Hosting headers file written next to the feeds.
pub const HEADERS_FILE: &str = "netlify.toml";

/// Serve every feed as UTF-8 XML.
pub const HEADERS_CONFIG: &str = r#"[[headers]]
  for = "/*.xml"
  [headers.values]
  Content-Type = "application/xml; charset=UTF-8"
"#;

/// Create the output directory and write the headers file.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(HEADERS_FILE), HEADERS_CONFIG)?;
    info!("Created {} in {}", HEADERS_FILE, dir.display());
    Ok(())
}

/// Result of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    /// Public site URL reported by the collaborator.
    pub site_url: String,
    /// Collaborator stdout.
    pub output: String,
}

/// Publishes a directory of files.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Publish everything in `dir`.
    async fn deploy(&self, dir: &Path) -> Result<DeployReport>;
}

/// Deploys through the Netlify CLI.
pub struct NetlifyDeployer {
    command: String,
    auth_token: String,
    site_id: String,
}

impl NetlifyDeployer {
    /// Create a deployer from configuration.
    pub fn new(config: &DeployConfig) -> Self {
        Self {
            command: config.command.clone(),
            auth_token: config.auth_token.clone(),
            site_id: config.site_id.clone(),
        }
    }

    /// Arguments passed to the CLI.
    pub fn args(&self, dir: &Path) -> Vec<String> {
        vec![
            "deploy".to_string(),
            "--prod".to_string(),
            "--dir".to_string(),
            dir.display().to_string(),
            "--site".to_string(),
            self.site_id.clone(),
        ]
    }

    /// Fetch the CLI's recent logs for a deploy that reported no URL.
    async fn collect_logs(&self) -> String {
        let output = Command::new(&self.command)
            .arg("logs")
            .env("NETLIFY_AUTH_TOKEN", &self.auth_token)
            .output()
            .await;

        match output {
            Ok(output) => {
                let mut logs = String::from_utf8_lossy(&output.stdout).trim().to_string();
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stderr.trim().is_empty() {
                    if !logs.is_empty() {
                        logs.push('\n');
                    }
                    logs.push_str(stderr.trim());
                }
                logs
            }
            Err(e) => format!("failed to run {} logs: {}", self.command, e),
        }
    }
}

#[async_trait]
impl Deployer for NetlifyDeployer {
    async fn deploy(&self, dir: &Path) -> Result<DeployReport> {
        info!("Deploying {} to site {}", dir.display(), self.site_id);

        let output = Command::new(&self.command)
            .args(self.args(dir))
            .env("NETLIFY_AUTH_TOKEN", &self.auth_token)
            .output()
            .await
            .map_err(|e| FeedError::Deploy(format!("failed to run {}: {}", self.command, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FeedError::Deploy(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let Some(site_url) = parse_site_url(&stdout) else {
            warn!("Deployment reported no website URL, fetching logs");
            let logs = self.collect_logs().await;
            return Err(FeedError::Deploy(format!(
                "no website URL in {} output; logs:\n{}",
                self.command, logs
            )));
        };
        info!("Deployment complete: {}", site_url);

        Ok(DeployReport {
            site_url,
            output: stdout,
        })
    }
}

/// Find the `Website URL:` line in the CLI output.
pub fn parse_site_url(output: &str) -> Option<String> {
    output
        .lines()
        .filter_map(|line| line.split_once("Website URL:"))
        .map(|(_, rest)| rest.trim())
        .find_map(|candidate| url::Url::parse(candidate).ok())
        .map(|url| url.to_string())
}
