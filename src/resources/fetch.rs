use anyhow::anyhow;

/// Resolves `location` against the page origin.
#[cfg(target_arch = "wasm32")]
fn format_url(location: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no browser window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow!("page origin unavailable: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{origin}/"))?;
    Ok(base.join(location)?)
}

/// Absolute http(s) URL of `location`, if it is one or (in the browser) can
/// be made one.
pub fn resolve_url(location: &str) -> anyhow::Result<reqwest::Url> {
    match reqwest::Url::parse(location) {
        Ok(url) => Ok(url),
        #[cfg(target_arch = "wasm32")]
        Err(_) => format_url(location),
        #[cfg(not(target_arch = "wasm32"))]
        Err(e) => Err(anyhow!("{location} is not an absolute URL: {e}")),
    }
}

fn is_http(location: &str) -> bool {
    reqwest::Url::parse(location)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Upper bound for preallocating from `Content-Length`. Larger bodies still
/// load, they just grow the buffer as chunks arrive.
const MAX_PREALLOCATION: u64 = 64 << 20;

fn capacity_hint(content_length: Option<u64>) -> usize {
    content_length.unwrap_or(0).min(MAX_PREALLOCATION) as usize
}

async fn fetch(
    url: reqwest::Url,
    on_progress: &mut (dyn FnMut(u64, Option<u64>) + Send),
) -> anyhow::Result<Vec<u8>> {
    #[allow(unused_mut)]
    let mut response = reqwest::get(url.clone()).await?;
    if !response.status().is_success() {
        anyhow::bail!("GET {url} answered {}", response.status());
    }
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let total = response.content_length();
        let mut data = Vec::with_capacity(capacity_hint(total));
        while let Some(chunk) = response.chunk().await? {
            data.extend_from_slice(&chunk);
            on_progress(data.len() as u64, total);
        }
        data
    };
    #[cfg(target_arch = "wasm32")]
    let data = {
        let data = response.bytes().await?.to_vec();
        on_progress(data.len() as u64, Some(data.len() as u64));
        data
    };
    Ok(data)
}

/// Loads raw bytes from an http(s) URL or, natively, from a file path.
/// In the browser relative locations are fetched from the page origin.
pub async fn load_binary(
    location: &str,
    on_progress: &mut (dyn FnMut(u64, Option<u64>) + Send),
) -> anyhow::Result<Vec<u8>> {
    if is_http(location) {
        return fetch(resolve_url(location)?, on_progress).await;
    }
    #[cfg(target_arch = "wasm32")]
    let data = fetch(format_url(location)?, on_progress).await?;
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = match reqwest::Url::parse(location) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|_| anyhow!("{location} is not a local file"))?,
            _ => std::path::PathBuf::from(location),
        };
        let data = tokio::fs::read(&path).await?;
        on_progress(data.len() as u64, Some(data.len() as u64));
        data
    };
    Ok(data)
}

pub async fn load_string(location: &str) -> anyhow::Result<String> {
    let data = load_binary(location, &mut |_, _| {}).await?;
    Ok(String::from_utf8(data)?)
}
