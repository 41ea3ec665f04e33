//! Endpoint identity: the upstream base address that scopes one credential.

use std::fmt;

use url::Url;

/// Base address of one upstream provider API (host plus optional version
/// segment). Used as the credential cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointId(Url);

impl EndpointId {
    /// Build an endpoint from a host URL and an optional version segment.
    ///
    /// With a version the base becomes `host` joined with `"{version}/"`
    /// using standard URL resolution, so `https://h/api` + `v2` resolves to
    /// `https://h/v2/` while `https://h/api/` + `v2` resolves to
    /// `https://h/api/v2/`.
    pub fn new(host: Url, version: Option<&str>) -> Result<Self, url::ParseError> {
        match version.map(|v| v.trim_matches('/')).filter(|v| !v.is_empty()) {
            Some(version) => host.join(&format!("{version}/")).map(Self),
            None => Ok(Self(host)),
        }
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Append path segments to the base address. Segments are
    /// percent-encoded, so caller-supplied identifiers cannot alter the path
    /// structure.
    pub fn join_segments(&self, segments: &[&str]) -> Result<Url, String> {
        let mut url = self.0.clone();
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot be used as a base URL", self.0))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn host_without_version_is_used_verbatim() {
        let endpoint = EndpointId::new(url("https://provider.example.com/"), None).unwrap();
        assert_eq!(endpoint.as_str(), "https://provider.example.com/");
    }

    #[test]
    fn version_segment_is_joined_with_trailing_slash() {
        let endpoint = EndpointId::new(url("https://provider.example.com/"), Some("v2")).unwrap();
        assert_eq!(endpoint.as_str(), "https://provider.example.com/v2/");
    }

    #[test]
    fn version_slashes_are_normalised() {
        let endpoint =
            EndpointId::new(url("https://provider.example.com/api/"), Some("/v1/")).unwrap();
        assert_eq!(endpoint.as_str(), "https://provider.example.com/api/v1/");
    }

    #[test]
    fn empty_version_is_ignored() {
        let endpoint = EndpointId::new(url("https://provider.example.com/"), Some("")).unwrap();
        assert_eq!(endpoint.as_str(), "https://provider.example.com/");
    }

    #[test]
    fn distinct_versions_are_distinct_endpoints() {
        let host = url("https://provider.example.com/");
        let v1 = EndpointId::new(host.clone(), Some("v1")).unwrap();
        let v2 = EndpointId::new(host, Some("v2")).unwrap();
        assert_ne!(v1, v2);
    }

    #[test]
    fn join_segments_appends_below_version() {
        let endpoint = EndpointId::new(url("https://provider.example.com/"), Some("v1")).unwrap();
        let joined = endpoint.join_segments(&["cards", "abc", "balance"]).unwrap();
        assert_eq!(joined.as_str(), "https://provider.example.com/v1/cards/abc/balance");
    }

    #[test]
    fn join_segments_encodes_identifiers() {
        let endpoint = EndpointId::new(url("http://127.0.0.1:9000"), None).unwrap();
        let joined = endpoint.join_segments(&["cards", "a/b c"]).unwrap();
        assert_eq!(joined.as_str(), "http://127.0.0.1:9000/cards/a%2Fb%20c");
    }
}
