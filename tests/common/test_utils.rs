use super::StubInferenceClient;
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tryon_gateway::{
    acquire::{ImageAcquirer, UploadStore},
    catalog::{CatalogStorage, NewProduct, Product, ProductLookup},
    config::FetchConfig,
    server::{self, handlers::AppState},
    tryon::TryOnOrchestrator,
};

/// Smallest byte strings that sniff as PNG / JPEG.
pub const PERSON_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, b'p', b'e', b'r'];
pub const GARMENT_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, b'g', b'a', b'r'];

pub fn new_product(images: &[&str]) -> NewProduct {
    NewProduct {
        name: "Striped Tee".to_string(),
        description: "Cotton t-shirt".to_string(),
        price: 25.0,
        image: images.iter().map(|s| s.to_string()).collect(),
        category: "Women".to_string(),
        sub_category: "Topwear".to_string(),
        bestseller: false,
        sizes: vec!["S".to_string(), "M".to_string()],
    }
}

pub async fn create_catalog() -> Arc<CatalogStorage> {
    Arc::new(CatalogStorage::new(":memory:").await.unwrap())
}

pub async fn add_product(catalog: &CatalogStorage, images: &[&str]) -> Product {
    catalog.create(new_product(images)).await.unwrap()
}

pub fn create_orchestrator(
    stub: &StubInferenceClient,
    catalog: Arc<CatalogStorage>,
) -> TryOnOrchestrator {
    let lookup: Arc<dyn ProductLookup> = catalog;
    let acquirer = ImageAcquirer::new(&FetchConfig::default(), lookup).unwrap();
    TryOnOrchestrator::new(acquirer, Arc::new(stub.clone()))
}

pub struct TestApp {
    pub router: Router,
    pub catalog: Arc<CatalogStorage>,
    pub upload_dir: TempDir,
}

pub async fn create_test_app(stub: &StubInferenceClient) -> TestApp {
    let upload_dir = TempDir::new().unwrap();
    let catalog = create_catalog().await;
    let uploads = UploadStore::new(upload_dir.path()).await.unwrap();

    let state = AppState {
        orchestrator: Arc::new(create_orchestrator(stub, catalog.clone())),
        catalog: catalog.clone(),
        uploads,
    };

    TestApp {
        router: server::router(state, 10 * 1024 * 1024),
        catalog,
        upload_dir,
    }
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "tryon-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    /// Returns the `Content-Type` header value and the encoded body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}
