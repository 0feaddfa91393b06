use async_trait::async_trait;

use crate::{AccessUrl, Error, Logger};

/// The full contents of a downloaded blob, positioned at its start
pub type ByteBuffer = std::io::Cursor<Vec<u8>>;

/// An object that can read a whole blob addressed by an [`AccessUrl`].
#[async_trait]
pub trait BlobFetcher: Sync {
    /// Returns every byte of the blob at `url`.
    /// Implementations map their failures into [`Error`]; an empty blob is not an error here.
    async fn get(&self, url: &AccessUrl) -> Result<Vec<u8>, Error>;
}

/// Downloads the blob at `url` into a fresh [`ByteBuffer`] positioned at offset 0.
/// # Error
/// Errors with whatever `fetcher` errors with, or [`Error::EmptyFetch`] when the blob has zero bytes
pub async fn fetch(
    url: &AccessUrl,
    fetcher: &dyn BlobFetcher,
    logger: &Logger<'_>,
) -> Result<ByteBuffer, Error> {
    logger.info(format_args!("Starting blob download from {url}"));
    let data = match fetcher.get(url).await {
        Ok(data) => data,
        Err(e) => {
            logger.error(format_args!(
                "Failed to fetch data from blob storage due to: {e}"
            ));
            return Err(e);
        }
    };

    if data.is_empty() {
        logger.warn(format_args!("No data fetched from URL: {url}"));
        return Err(Error::EmptyFetch {
            url: url.redacted(),
        });
    }

    logger.info(format_args!("Fetched {} bytes from {url}", data.len()));
    let mut buffer = ByteBuffer::new(data);
    buffer.set_position(0);
    Ok(buffer)
}
