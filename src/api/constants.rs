//! API constants and endpoint builders for the RGBridge onboarding API

/// Default base address of the bridge API
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Wizard service endpoints
pub const ANALYZE_ENDPOINT: &str = "wizard/analyze";
pub const SUGGEST_ENDPOINT: &str = "wizard/suggest-mapping";
pub const GENERATE_ENDPOINT: &str = "wizard/generate";

/// Registry and store collections
pub const PMS_COLLECTION: &str = "pms";
pub const MAPPINGS_COLLECTION: &str = "mappings";
pub const TRANSLATORS_COLLECTION: &str = "translators";

/// Multipart part name expected by the upload endpoints
pub const UPLOAD_PART_NAME: &str = "file";

/// Standard headers for bridge requests
pub mod headers {
    /// Content type for JSON requests
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    /// Content type of the mapping document upload
    pub const CONTENT_TYPE_YAML: &str = "application/x-yaml";

    /// Content type of the translator artifact upload
    pub const CONTENT_TYPE_PYTHON: &str = "text/x-python";

    /// Correlation header attached to every request
    pub const X_CORRELATION_ID: &str = "X-Correlation-ID";
}

/// User agent sent with every request
pub const USER_AGENT: &str = "pms-wizard/0.1";

/// Join the base URL and a relative path without doubling slashes
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Build a keyed resource URL, e.g. `{base}/mappings/{code}`.
/// The key is percent-encoded as a single path segment.
pub fn keyed_endpoint(base_url: &str, collection: &str, key: &str) -> String {
    endpoint(base_url, &format!("{}/{}", collection, urlencoding::encode(key)))
}

/// Filename of the mapping document for a PMS code
pub fn mapping_filename(code: &str) -> String {
    format!("{}.yaml", code)
}

/// Filename of the translator artifact for a PMS code
pub fn translator_filename(code: &str) -> String {
    format!("{}_translator.py", code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("http://localhost:8000/api/v1/", "/wizard/analyze"),
            "http://localhost:8000/api/v1/wizard/analyze"
        );
        assert_eq!(
            keyed_endpoint(DEFAULT_BASE_URL, MAPPINGS_COLLECTION, "cloudbeds"),
            "http://localhost:8000/api/v1/mappings/cloudbeds"
        );
    }

    #[test]
    fn test_keyed_endpoint_encodes_key_as_one_segment() {
        assert_eq!(
            keyed_endpoint("http://h/api/v1", MAPPINGS_COLLECTION, "acme/v2?x=1"),
            "http://h/api/v1/mappings/acme%2Fv2%3Fx%3D1"
        );
        assert_eq!(
            keyed_endpoint("http://h/api/v1", TRANSLATORS_COLLECTION, "inn #3"),
            "http://h/api/v1/translators/inn%20%233"
        );
    }

    #[test]
    fn test_artifact_filenames() {
        assert_eq!(mapping_filename("cloudbeds"), "cloudbeds.yaml");
        assert_eq!(translator_filename("cloudbeds"), "cloudbeds_translator.py");
    }
}
