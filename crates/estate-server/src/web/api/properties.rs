use crate::error::ApiError;
use crate::media::ImageUpload;
use crate::state::AppState;
use crate::web::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::web::api::middleware::AuthUser;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use estate_common::models::property::{
    CreatePropertyRequest, ListingQuery, MessageResponse, Property, PropertyDetail,
    UpdatePropertyRequest, UploadResponse,
};
use estate_common::validation::{parse_listing_filter, validate_new_property, validate_update};
use estate_db::PropertyRepo;
use std::sync::Arc;
use uuid::Uuid;

/// Request body limit for image uploads
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

const NOT_FOUND: ApiError = ApiError::NotFound("Property not found");

fn parse_property_id(id: &str) -> Result<Uuid, ApiError> {
    id.parse::<Uuid>()
        .map_err(|_| ApiError::BadRequest("Invalid property ID"))
}

/// POST /api/properties/upload - relay one image to the hosting service
#[tracing::instrument(skip(state, auth, multipart), fields(user_id = %auth.user_id()))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed multipart body"))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::BadRequest("Malformed multipart body"))?;
        image = Some(ImageUpload {
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let image = image.ok_or(ApiError::BadRequest("No image uploaded"))?;

    let host = state
        .images
        .as_ref()
        .ok_or_else(|| ApiError::UploadFailed("image hosting is not configured".to_string()))?;

    match host.upload(image).await {
        Ok(image_url) => Ok(Json(UploadResponse { image_url })),
        Err(e) => {
            tracing::error!("Image upload failed: {:#}", e);
            Err(ApiError::UploadFailed(format!("{:#}", e)))
        }
    }
}

/// POST /api/properties - create a listing owned by the caller
#[tracing::instrument(skip(state, auth, req), fields(user_id = %auth.user_id()))]
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreatePropertyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new = validate_new_property(req)?;

    let row = PropertyRepo::create(&state.pool, &new, auth.user_id())
        .await
        .map_err(|e| ApiError::upstream("Failed to create property", e))?;

    tracing::info!("Created property {}", row.property_id);
    Ok((StatusCode::CREATED, Json(Property::from(row))))
}

/// GET /api/properties?location=&maxPrice= - public search, newest first
#[tracing::instrument(skip(state))]
pub async fn list_properties(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let filter = parse_listing_filter(&query)?;

    let rows = PropertyRepo::list(&state.pool, &filter)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch properties", e))?;

    Ok(Json(rows.into_iter().map(Property::from).collect()))
}

/// GET /api/properties/my - the caller's own listings
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user_id()))]
pub async fn list_my_properties(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<Property>>, ApiError> {
    let rows = PropertyRepo::list_by_poster(&state.pool, auth.user_id())
        .await
        .map_err(|e| ApiError::upstream("Failed to load user properties", e))?;

    Ok(Json(rows.into_iter().map(Property::from).collect()))
}

/// GET /api/properties/:id - public detail with the poster's email
#[tracing::instrument(skip(state))]
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<PropertyDetail>, ApiError> {
    let property_id = parse_property_id(&id)?;

    let row = PropertyRepo::get_with_poster(&state.pool, property_id)
        .await
        .map_err(|e| ApiError::upstream("Error fetching property", e))?
        .ok_or(NOT_FOUND)?;

    Ok(Json(PropertyDetail::from(row)))
}

/// PUT /api/properties/:id - partial update.
///
/// Ownership is only enforced when `listings.enforce_update_ownership` is set;
/// otherwise any authenticated user may update any listing and a non-owner
/// update is logged.
#[tracing::instrument(skip(state, auth, req), fields(user_id = %auth.user_id()))]
pub async fn update_property(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<UpdatePropertyRequest>,
) -> Result<Json<Property>, ApiError> {
    let property_id = parse_property_id(&id)?;
    let update = validate_update(req)?;

    let existing = PropertyRepo::get(&state.pool, property_id)
        .await
        .map_err(|e| ApiError::upstream("Update failed", e))?
        .ok_or(NOT_FOUND)?;

    if existing.posted_by != auth.user_id() {
        if state.config.listings.enforce_update_ownership {
            return Err(ApiError::Forbidden);
        }
        tracing::warn!(
            "User {} updated property {} owned by {}",
            auth.user_id(),
            property_id,
            existing.posted_by
        );
    }

    if update.is_empty() {
        return Ok(Json(Property::from(existing)));
    }

    let row = PropertyRepo::update(&state.pool, property_id, &update)
        .await
        .map_err(|e| ApiError::upstream("Update failed", e))?
        .ok_or(NOT_FOUND)?;

    Ok(Json(Property::from(row)))
}

/// DELETE /api/properties/:id - only the original poster may delete
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user_id()))]
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let property_id = parse_property_id(&id)?;

    let existing = PropertyRepo::get(&state.pool, property_id)
        .await
        .map_err(|e| ApiError::upstream("Delete failed", e))?
        .ok_or(NOT_FOUND)?;

    if existing.posted_by != auth.user_id() {
        return Err(ApiError::Forbidden);
    }

    let deleted = PropertyRepo::delete(&state.pool, property_id)
        .await
        .map_err(|e| ApiError::upstream("Delete failed", e))?;
    if !deleted {
        return Err(NOT_FOUND);
    }

    tracing::info!("Deleted property {}", property_id);
    Ok(Json(MessageResponse {
        message: "Deleted successfully".to_string(),
    }))
}
