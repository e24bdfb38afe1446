//! # Characters API Handlers
//!
//! REST endpoints over the character service: listing with optional paging,
//! lookup, single and bulk creation, upserts and deletes.

use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::error::{ApiError, not_found, validation_error};
use crate::models::character::{CharacterDto, Model as Character};
use crate::repositories::Identity;
use crate::server::AppState;

/// Query parameters for listing characters
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCharactersQuery {
    /// Page size; absent or 0 returns every character
    #[param(example = 5)]
    pub ps: Option<i64>,
    /// 1-based page number, required when `ps` is greater than 0
    #[param(example = 1)]
    pub p: Option<i64>,
}

/// Which read a listing request resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    All,
    Page { page: i64, page_size: i64 },
}

impl ListCharactersQuery {
    fn listing(&self) -> Result<Listing, ApiError> {
        let page_size = self.ps.unwrap_or(0);
        let page = self.p.unwrap_or(0);

        if page_size < 0 {
            return Err(validation_error(
                "Page size must be greater or equal to 1",
                serde_json::json!({ "field": "ps", "value": page_size }),
            ));
        }
        if page < 0 {
            return Err(validation_error(
                "Page number must be greater or equal to 1",
                serde_json::json!({ "field": "p", "value": page }),
            ));
        }
        if page_size > 0 && page == 0 {
            return Err(validation_error(
                "Page number must be greater or equal to 1 when page size is greater than 0",
                serde_json::json!({ "field": "p", "value": page }),
            ));
        }

        Ok(if page_size == 0 {
            Listing::All
        } else {
            Listing::Page { page, page_size }
        })
    }
}

fn require_fields(field: Option<&'static str>) -> Result<(), ApiError> {
    match field {
        None => Ok(()),
        Some(field) => Err(validation_error(
            &format!("Character {} is required and cannot be blank", field),
            serde_json::json!({
                "field": field,
                "message": format!("{} must be provided and cannot be blank", field)
            }),
        )),
    }
}

fn path_id(id: Result<Path<Identity>, PathRejection>) -> Result<Identity, ApiError> {
    id.map(|Path(id)| id).map_err(|rejection| {
        validation_error(
            &rejection.body_text(),
            serde_json::json!({ "field": "id" }),
        )
    })
}

/// List characters, optionally one page at a time
#[utoipa::path(
    get,
    path = "/characters",
    params(ListCharactersQuery),
    responses(
        (status = 200, description = "Characters in identity order", body = [Character]),
        (status = 400, description = "Invalid paging parameters", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "characters"
)]
pub async fn list_characters(
    State(state): State<AppState>,
    Query(query): Query<ListCharactersQuery>,
) -> Result<Json<Vec<Character>>, ApiError> {
    let characters = match query.listing()? {
        Listing::All => state.characters.get_all().await?,
        Listing::Page { page, page_size } => state.characters.get_paged(page, page_size).await?,
    };

    Ok(Json(characters))
}

/// Get a character by ID
#[utoipa::path(
    get,
    path = "/characters/{id}",
    params(
        ("id" = i64, Path, description = "Character identity")
    ),
    responses(
        (status = 200, description = "Character found", body = Character),
        (status = 404, description = "Character not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "characters"
)]
pub async fn get_character(
    State(state): State<AppState>,
    id: Result<Path<Identity>, PathRejection>,
) -> Result<Json<Character>, ApiError> {
    let id = path_id(id)?;

    state
        .characters
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Character"))
}

/// Create a character
#[utoipa::path(
    post,
    path = "/characters",
    request_body = CharacterDto,
    responses(
        (status = 201, description = "Character created", body = Character, headers(
            ("Location", description = "URL of the created character")
        )),
        (status = 400, description = "Validation failed or identity already taken", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "characters"
)]
pub async fn create_character(
    State(state): State<AppState>,
    payload: Result<Json<CharacterDto>, JsonRejection>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Character>), ApiError> {
    let Json(request) = payload?;
    require_fields(request.first_blank_field())?;

    let created = state
        .characters
        .add(request.into())
        .await?
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "ALREADY_EXISTS",
                "A character with this identity already exists",
            )
        })?;

    let location = format!("/characters/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

/// Create several characters at once
///
/// Returns `null` when no character was inserted.
#[utoipa::path(
    post,
    path = "/characters/bulk",
    request_body = [CharacterDto],
    responses(
        (status = 201, description = "Characters created, or null when every identity was taken", body = [Character], headers(
            ("Location", description = "URL of the character collection")
        )),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "characters"
)]
pub async fn create_characters(
    State(state): State<AppState>,
    payload: Result<Json<Vec<CharacterDto>>, JsonRejection>,
) -> Result<
    (
        StatusCode,
        [(header::HeaderName, String); 1],
        Json<Option<Vec<Character>>>,
    ),
    ApiError,
> {
    let Json(requests) = payload?;
    for request in &requests {
        require_fields(request.first_blank_field())?;
    }

    let created = state
        .characters
        .create_range(requests.into_iter().map(Character::from).collect())
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, "/characters".to_string())],
        Json(created),
    ))
}

/// Update a character, inserting it when its identity is unknown
#[utoipa::path(
    put,
    path = "/characters",
    request_body = Character,
    responses(
        (status = 200, description = "Character as submitted", body = Character),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "characters"
)]
pub async fn upsert_character(
    State(state): State<AppState>,
    payload: Result<Json<Character>, JsonRejection>,
) -> Result<Json<Character>, ApiError> {
    let Json(character) = payload?;
    require_fields(character.first_blank_field())?;

    Ok(Json(state.characters.upsert(character).await?))
}

/// Update several characters, inserting the unknown ones
#[utoipa::path(
    put,
    path = "/characters/bulk/update",
    request_body = [Character],
    responses(
        (status = 200, description = "Characters as submitted", body = [Character]),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "characters"
)]
pub async fn upsert_characters(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Character>>, JsonRejection>,
) -> Result<Json<Vec<Character>>, ApiError> {
    let Json(characters) = payload?;
    for character in &characters {
        require_fields(character.first_blank_field())?;
    }

    Ok(Json(state.characters.upsert_range(characters).await?))
}

/// Delete a character by ID
#[utoipa::path(
    delete,
    path = "/characters/{id}",
    params(
        ("id" = i64, Path, description = "Character identity")
    ),
    responses(
        (status = 200, description = "Deleted character", body = Character),
        (status = 404, description = "Character not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "characters"
)]
pub async fn delete_character_by_id(
    State(state): State<AppState>,
    id: Result<Path<Identity>, PathRejection>,
) -> Result<Json<Character>, ApiError> {
    let id = path_id(id)?;

    state
        .characters
        .delete_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Character"))
}

/// Delete the stored character matching the submitted one
#[utoipa::path(
    delete,
    path = "/characters",
    request_body = Character,
    responses(
        (status = 200, description = "Character as submitted", body = Character),
        (status = 404, description = "Character not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "characters"
)]
pub async fn delete_character(
    State(state): State<AppState>,
    payload: Result<Json<Character>, JsonRejection>,
) -> Result<Json<Character>, ApiError> {
    let Json(character) = payload?;

    state
        .characters
        .delete(character)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Character"))
}

/// Delete every stored character matching the submitted ones
#[utoipa::path(
    delete,
    path = "/characters/bulk/delete",
    request_body = [Character],
    responses(
        (status = 200, description = "Stored characters that were removed", body = [Character]),
        (status = 400, description = "Invalid request body", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "characters"
)]
pub async fn delete_characters(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Character>>, JsonRejection>,
) -> Result<Json<Vec<Character>>, ApiError> {
    let Json(characters) = payload?;

    Ok(Json(state.characters.delete_range(characters).await?))
}
