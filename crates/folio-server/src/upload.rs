use folio_core::{FolioError, ImageRef, Result};

/// Stores an image somewhere addressable and returns its reference.
#[async_trait::async_trait]
pub trait ImageUploader: Send + Sync + 'static {
    async fn upload(&self, source: &str, folder: &str) -> Result<ImageRef>;
}

/// Keeps already-hosted images where they are. Only http(s) sources are
/// accepted; the public id is derived from the folder and the source.
#[derive(Debug, Clone, Default)]
pub struct LinkUploader;

#[async_trait::async_trait]
impl ImageUploader for LinkUploader {
    async fn upload(&self, source: &str, folder: &str) -> Result<ImageRef> {
        let source = source.trim();
        if !(source.starts_with("https://") || source.starts_with("http://")) {
            return Err(FolioError::Invalid(
                "image sources must be http(s) URLs".into(),
            ));
        }
        let digest = blake3::hash(source.as_bytes()).to_hex();
        Ok(ImageRef {
            public_id: format!("{}/{}", folder, &digest.as_str()[..20]),
            url: source.to_string(),
        })
    }
}
