//! Remote buildpack download.

use bpctl_core::{Result, StagingError};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const FALLBACK_FILE_NAME: &str = "buildpack.zip";

/// Downloads remote buildpacks into a local directory.
#[derive(Clone)]
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| StagingError::Download {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    /// Download `url` into `dir`, named after the last path segment.
    pub async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf> {
        let download_error = |message: String| StagingError::Download {
            url: url.to_string(),
            message,
        };

        let parsed = Url::parse(url).map_err(|e| download_error(e.to_string()))?;
        let target = dir.join(file_name_for(&parsed));

        info!(%url, target = %target.display(), "Downloading buildpack");
        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(format!("server responded with {}", status)).into());
        }

        let mut file = tokio::fs::File::create(&target)
            .await
            .map_err(|e| download_error(e.to_string()))?;
        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| download_error(e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| download_error(e.to_string()))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| download_error(e.to_string()))?;

        debug!(%url, bytes = written, "Downloaded buildpack");
        Ok(target)
    }
}

/// Whether `source` should be fetched over the network.
pub fn is_http_url(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Local file name for `url`: its decoded last path segment, as long as that
/// is a single plain file name.
fn file_name_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| urlencoding::decode(segment).ok())
        .map(|name| name.into_owned())
        .filter(|name| is_plain_file_name(name))
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
