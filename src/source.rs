//! Reading iCal text from a file or a feed URL.

use anyhow::{Context, Result, bail};
use url::Url;

/// Read the raw contents of an .ics file path or an http(s)/webcal URL.
pub async fn read(source: &str) -> Result<String> {
    match feed_url(source)? {
        Some(url) => fetch(url).await,
        None => tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read {source}")),
    }
}

async fn fetch(url: Url) -> Result<String> {
    tracing::info!(%url, "Fetching calendar feed");

    let response = reqwest::get(url.clone())
        .await
        .with_context(|| format!("Failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("Feed {url} returned an error"))?;

    response
        .text()
        .await
        .with_context(|| format!("Failed to read response from {url}"))
}

/// Returns the URL to fetch, or None if `source` is a local path.
///
/// `webcal://` is the subscription scheme calendar apps hand out; it is
/// served over HTTPS.
fn feed_url(source: &str) -> Result<Option<Url>> {
    let Some((scheme, rest)) = source.split_once("://") else {
        return Ok(None);
    };

    let normalized = match scheme.to_ascii_lowercase().as_str() {
        "http" | "https" => source.to_string(),
        "webcal" | "webcals" => format!("https://{rest}"),
        other => bail!("Unsupported URL scheme '{other}' (expected http, https or webcal)"),
    };

    let url = Url::parse(&normalized).with_context(|| format!("Invalid URL '{source}'"))?;
    Ok(Some(url))
}
