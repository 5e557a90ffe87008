use anyhow::Result;
use reqwest::Client;
use serde_json::Value;

pub const REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Registry path for a package version. Scoped names are percent-encoded:
/// `@scope/pkg` → `%40scope%2Fpkg`.
pub fn version_url(base: &str, name: &str, version: &str) -> String {
    let encoded_name = name.replace('@', "%40").replace('/', "%2F");
    format!("{}/{}/{}", base.trim_end_matches('/'), encoded_name, version)
}

/// Fetch the declared license of one package version from the npm registry.
///
/// `Ok(None)` when the registry has no such version or no license field.
pub async fn fetch_license(client: &Client, base: &str, name: &str, version: &str) -> Result<Option<String>> {
    let response = client
        .get(version_url(base, name, version))
        .header("User-Agent", concat!("embedded-deps/", env!("CARGO_PKG_VERSION")))
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let data: Value = response.json().await?;
    let license = data
        .get("license")
        .and_then(|l| l.as_str().or_else(|| l.get("type").and_then(Value::as_str)))
        .map(str::to_string);

    Ok(license)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_url_encodes_scope() {
        assert_eq!(
            version_url(REGISTRY_URL, "@scope/pkg", "1.2.3"),
            "https://registry.npmjs.org/%40scope%2Fpkg/1.2.3"
        );
        assert_eq!(
            version_url("http://localhost:4873/", "left-pad", "1.3.0"),
            "http://localhost:4873/left-pad/1.3.0"
        );
    }
}
