use super::types::{ApiError, ApiResult, MessageResponse};
use crate::{
    Error, Result,
    acquire::{ImageSource, TempUpload, UploadStore},
    catalog::{CatalogStorage, NewProduct, Product, ProductPatch},
    tryon::{TryOnOrchestrator, TryOnRequest, TryOnResult},
};
use axum::{
    extract::{
        Path, State,
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const PERSON_FIELD: &str = "personImage";
pub const GARMENT_FILE_FIELD: &str = "garmentImage";
pub const GARMENT_URL_FIELD: &str = "garmentImageUrl";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<TryOnOrchestrator>,
    pub catalog: Arc<CatalogStorage>,
    pub uploads: UploadStore,
}

/// Fields collected from a try-on multipart form.
#[derive(Default)]
struct TryOnForm {
    person: Option<TempUpload>,
    garment_file: Option<TempUpload>,
    garment_url: Option<String>,
}

pub async fn tryon(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<TryOnResult>> {
    info!("Received try-on request");

    let form = read_form(&state.uploads, multipart?).await?;
    let person = form
        .person
        .ok_or_else(|| Error::not_found(format!("{PERSON_FIELD} upload")))?;

    let request = match (form.garment_url, form.garment_file) {
        (Some(_), Some(_)) => {
            return Err(Error::bad_request(format!(
                "Provide either {GARMENT_URL_FIELD} or {GARMENT_FILE_FIELD}, not both"
            ))
            .into());
        }
        (Some(url), None) => {
            TryOnRequest::new(person.source(), ImageSource::remote(url)).with_upload(person)
        }
        (None, Some(garment)) => TryOnRequest::new(person.source(), garment.source())
            .with_upload(person)
            .with_upload(garment),
        (None, None) => return Err(Error::not_found("garment image").into()),
    };

    run(&state, request).await
}

pub async fn tryon_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<TryOnResult>> {
    info!("Received try-on request for product {}", product_id);

    let form = read_form(&state.uploads, multipart?).await?;
    let person = form
        .person
        .ok_or_else(|| Error::not_found(format!("{PERSON_FIELD} upload")))?;
    if form.garment_url.is_some() || form.garment_file.is_some() {
        warn!("Ignoring garment fields on product try-on for {}", product_id);
    }

    let request = TryOnRequest::new(person.source(), ImageSource::catalog(product_id, 0))
        .with_upload(person);

    run(&state, request).await
}

async fn run(state: &AppState, request: TryOnRequest) -> ApiResult<Json<TryOnResult>> {
    match state.orchestrator.run(request).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            error!("Error processing virtual try-on: {}", e);
            Err(e.into())
        }
    }
}

async fn read_form(uploads: &UploadStore, mut multipart: Multipart) -> Result<TryOnForm> {
    let mut form = TryOnForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            PERSON_FIELD | GARMENT_FILE_FIELD => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::bad_request(format!("Failed to read {name}: {e}")))?;
                let upload = uploads.persist(&bytes, content_type).await?;
                if name == PERSON_FIELD {
                    form.person = Some(upload);
                } else {
                    form.garment_file = Some(upload);
                }
            }
            GARMENT_URL_FIELD => {
                let url = field
                    .text()
                    .await
                    .map_err(|e| Error::bad_request(format!("Failed to read {name}: {e}")))?;
                let url = url.trim();
                if !url.is_empty() {
                    form.garment_url = Some(url.to_string());
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    match state.catalog.list().await {
        Ok(products) => Ok(Json(products)),
        Err(e) => Err(storage_error(e, "Failed to fetch products")),
    }
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    match state.catalog.get(&id).await {
        Ok(Some(product)) => Ok(Json(product)),
        Ok(None) => Err(product_not_found()),
        Err(e) => Err(storage_error(e, "Failed to fetch product")),
    }
}

pub async fn create_product(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let Json(new_product) = body.map_err(rejected)?;

    match state.catalog.create(new_product).await {
        Ok(product) => Ok((StatusCode::CREATED, Json(product))),
        Err(e) => Err(storage_error(e, "Failed to create product")),
    }
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Json(patch) = body.map_err(rejected)?;

    match state.catalog.update(&id, patch).await {
        Ok(Some(product)) => Ok(Json(product)),
        Ok(None) => Err(product_not_found()),
        Err(e) => Err(storage_error(e, "Failed to update product")),
    }
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    match state.catalog.delete(&id).await {
        Ok(Some(_)) => Ok(Json(MessageResponse {
            message: "Product removed".to_string(),
        })),
        Ok(None) => Err(product_not_found()),
        Err(e) => Err(storage_error(e, "Failed to delete product")),
    }
}

fn product_not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Product not found")
}

fn storage_error(e: Error, message: &str) -> ApiError {
    if let Error::BadRequest(_) = e {
        return e.into();
    }
    error!("{}: {}", message, e);
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
}

fn rejected(rejection: JsonRejection) -> ApiError {
    ApiError::new(rejection.status(), rejection.body_text())
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}
