/// The ways fetching and loading a CSV blob can fail.
///
/// Every fetch-related variant carries the redacted URL (scheme, host and path,
/// never the signature) so that errors can be logged as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The access URL is missing, empty or not a valid http(s) URL
    Configuration(String),
    /// The connection to the storage service failed or was interrupted
    Transport { url: String, detail: String },
    /// The object does not exist at the given address
    NotFound { url: String, detail: String },
    /// The signature is invalid, expired or does not grant read access
    Access { url: String, detail: String },
    /// The download succeeded but the object has zero bytes
    EmptyFetch { url: String },
    /// The content parsed but contains no header and no rows
    EmptyData(String),
    /// The content is not delimited text of the expected shape
    Parse(String),
    /// Anything that none of the variants above describes
    Unexpected(String),
}

impl Error {
    /// Whether this error should be propagated rather than turned into a "no data" outcome
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::Unexpected(_))
    }

    /// A short, stable name of the error kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Transport { .. } => "transport",
            Self::NotFound { .. } => "not found",
            Self::Access { .. } => "access",
            Self::EmptyFetch { .. } => "empty fetch",
            Self::EmptyData(_) => "empty data",
            Self::Parse(_) => "parse",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "Configuration error: {e}"),
            Self::Transport { url, detail } => write!(f, "Network error fetching {url}: {detail}"),
            Self::NotFound { url, detail } => write!(f, "Blob not found at {url}: {detail}"),
            Self::Access { url, detail } => write!(f, "Access denied to {url}: {detail}"),
            Self::EmptyFetch { url } => write!(
                f,
                "No data was fetched from {url}, the blob may be empty"
            ),
            Self::EmptyData(e) => write!(f, "No data to parse: {e}"),
            Self::Parse(e) => write!(f, "Error parsing data: {e}"),
            Self::Unexpected(e) => write!(f, "Unexpected error: {e}"),
        }
    }
}
