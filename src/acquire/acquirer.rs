use super::{ImageBytes, ImageSource};
use crate::{
    Error, Result,
    catalog::{ProductLookup, ProductSummary},
    config::FetchConfig,
};
use reqwest::header::CONTENT_TYPE;
use std::{path::Path, sync::Arc, time::Duration};
use tracing::debug;

/// Resolves an [`ImageSource`] into bytes. Single attempt per source, no retries.
#[derive(Clone)]
pub struct ImageAcquirer {
    http: reqwest::Client,
    catalog: Arc<dyn ProductLookup>,
}

impl ImageAcquirer {
    pub fn new(config: &FetchConfig, catalog: Arc<dyn ProductLookup>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { http, catalog })
    }

    pub async fn acquire(&self, source: &ImageSource) -> Result<ImageBytes> {
        match source {
            ImageSource::Upload { path, content_type } => {
                read_upload(path, content_type.as_deref()).await
            }
            ImageSource::RemoteUrl { url } => self.fetch(url).await,
            ImageSource::CatalogRef { product_id, index } => {
                let url = self.resolve_catalog_ref(product_id, *index).await?;
                self.fetch(&url).await
            }
        }
    }

    pub async fn lookup_product(&self, product_id: &str) -> Result<ProductSummary> {
        self.catalog
            .by_id(product_id)
            .await?
            .ok_or_else(|| Error::ProductNotFound {
                product_id: product_id.to_string(),
            })
    }

    /// Looks up `product_id` and returns the image URL at `index`.
    pub async fn resolve_catalog_ref(&self, product_id: &str, index: usize) -> Result<String> {
        self.lookup_product(product_id)
            .await?
            .image(index)
            .map(str::to_string)
            .ok_or_else(|| Error::NoGarmentImage {
                product_id: product_id.to_string(),
                index,
            })
    }

    async fn fetch(&self, url: &str) -> Result<ImageBytes> {
        debug!("Fetching remote image: {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamFetchFailed {
                status_code: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(ImageBytes::new(bytes.to_vec(), declared.as_deref()))
    }
}

/// Reads an uploaded file and deletes it, so each upload is readable at most once.
async fn read_upload(path: &Path, content_type: Option<&str>) -> Result<ImageBytes> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::not_found(format!("upload {}", path.display())));
        }
        Err(e) => return Err(e.into()),
    };

    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    debug!("Consumed {} byte upload {}", bytes.len(), path.display());
    Ok(ImageBytes::new(bytes, content_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    mock! {
        Lookup {}

        #[async_trait]
        impl ProductLookup for Lookup {
            async fn by_id(&self, product_id: &str) -> Result<Option<ProductSummary>>;
        }
    }

    fn acquirer_with(lookup: MockLookup) -> ImageAcquirer {
        ImageAcquirer::new(&FetchConfig::default(), Arc::new(lookup)).unwrap()
    }

    fn summary(images: Vec<&str>) -> ProductSummary {
        ProductSummary {
            id: "p-1".to_string(),
            name: "Denim Jacket".to_string(),
            price: 80.0,
            images: images.into_iter().map(str::to_string).collect(),
        }
    }

    #[tokio::test]
    async fn test_upload_is_consumed_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("person.png");
        tokio::fs::write(&path, b"person-bytes").await.unwrap();

        let acquirer = acquirer_with(MockLookup::new());
        let source = ImageSource::upload(&path);

        let first = acquirer.acquire(&source).await.unwrap();
        assert_eq!(first.bytes, b"person-bytes");
        assert!(!path.exists());

        let second = acquirer.acquire(&source).await.unwrap_err();
        assert!(matches!(second, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_upload_is_not_found() {
        let acquirer = acquirer_with(MockLookup::new());
        let err = acquirer
            .acquire(&ImageSource::upload("/nonexistent/upload-123"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_catalog_ref_resolves_requested_index() {
        let mut lookup = MockLookup::new();
        lookup
            .expect_by_id()
            .times(1)
            .returning(|_| Ok(Some(summary(vec!["https://cdn/a.png", "https://cdn/b.png"]))));

        let acquirer = acquirer_with(lookup);
        let url = acquirer.resolve_catalog_ref("p-1", 1).await.unwrap();
        assert_eq!(url, "https://cdn/b.png");
    }

    #[tokio::test]
    async fn test_catalog_ref_unknown_product() {
        let mut lookup = MockLookup::new();
        lookup.expect_by_id().returning(|_| Ok(None));

        let err = acquirer_with(lookup)
            .acquire(&ImageSource::catalog("ghost", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProductNotFound { product_id } if product_id == "ghost"));
    }

    #[tokio::test]
    async fn test_catalog_ref_without_images() {
        let mut lookup = MockLookup::new();
        lookup.expect_by_id().returning(|_| Ok(Some(summary(vec![]))));

        let err = acquirer_with(lookup)
            .acquire(&ImageSource::catalog("p-1", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoGarmentImage { index: 0, .. }));
    }
}
