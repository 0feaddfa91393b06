use reqwest::Url;

use crate::Error;

/// The environment variable holding the access URL when none is passed explicitly
pub static ENV_VAR: &'static str = "CLOUD_DATA_URL";

/// A pre-signed URL granting time-limited read access to a single blob
/// (e.g. an Azure SAS URL or an S3 presigned URL).
///
/// The query string carries the signature and is never logged nor displayed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessUrl {
    url: Url,
}

impl AccessUrl {
    /// Validates `raw` without touching the network.
    /// # Error
    /// Errors with [`Error::Configuration`] if `raw` is empty, not a URL, or not http(s)
    pub fn new(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::Configuration(
                "Data URL must be provided.".to_string(),
            ));
        }
        let url = Url::parse(raw)
            .map_err(|e| Error::Configuration(format!("Data URL is not a valid URL: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            scheme => Err(Error::Configuration(format!(
                "Data URL must use http or https, got \"{scheme}\""
            ))),
        }
    }

    /// Same as [`AccessUrl::new`], but a missing value is also a configuration error
    pub fn from_option(raw: Option<&str>) -> Result<Self, Error> {
        Self::new(raw.unwrap_or_default())
    }

    /// Reads the URL from [`ENV_VAR`].
    pub fn from_env() -> Result<Self, Error> {
        match std::env::var(ENV_VAR) {
            Ok(raw) => Self::new(&raw),
            Err(_) => Err(Error::Configuration(format!(
                "Environment variable {ENV_VAR} is not set."
            ))),
        }
    }

    /// The full URL, signature included. Only to be handed to a storage client.
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// The identity of the blob (`scheme://host/path`), safe to log
    pub fn redacted(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.set_fragment(None);
        // dropping credentials can only fail on URLs that cannot have them
        let _ = url.set_username("");
        let _ = url.set_password(None);
        url.to_string()
    }
}

impl std::fmt::Display for AccessUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl std::fmt::Debug for AccessUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessUrl").field(&self.redacted()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_is_configuration_error() {
        assert!(matches!(AccessUrl::new(""), Err(Error::Configuration(_))));
        assert!(matches!(AccessUrl::new("   "), Err(Error::Configuration(_))));
        assert!(matches!(
            AccessUrl::from_option(None),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            AccessUrl::new("not a url"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            AccessUrl::new("ftp://example.com/data.csv"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn redacts_signature() {
        let url = AccessUrl::new(
            "https://account.blob.core.windows.net/data/file.csv?sv=2022-11-02&sig=secret",
        )
        .unwrap();
        assert_eq!(
            url.redacted(),
            "https://account.blob.core.windows.net/data/file.csv"
        );
        assert!(!format!("{url:?}").contains("secret"));
        assert!(url.as_url().as_str().contains("sig=secret"));
    }
}
