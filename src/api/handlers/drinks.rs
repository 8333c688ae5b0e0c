/*
 * Responsibility
 * - /drinks CRUD handlers
 * - Gated routes receive the AuthCtx the permission gate stored (subject only used for logs)
 * - Body rejections / repo errors are converted into AppError here
 */
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde_json::Value;

use crate::{
    api::{
        dto::drinks::{
            BodyError, CreateDrinkRequest, DeletedResponse, DrinkLong, DrinkShort,
            DrinksResponse, Ingredient, UpdateDrinkRequest,
        },
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::drink_repo::{self, DrinkRow},
    state::AppState,
};

fn row_to_long(row: DrinkRow) -> Result<DrinkLong, AppError> {
    let id = row.id;
    DrinkLong::try_from(row).map_err(|e| {
        tracing::error!(drink_id = id, error = %e, "stored recipe is not valid json");
        AppError::Internal
    })
}

fn encode_recipe(recipe: &[Ingredient]) -> Result<String, AppError> {
    serde_json::to_string(recipe).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize recipe");
        AppError::Internal
    })
}

fn list_long(rows: Vec<DrinkRow>) -> Result<Vec<DrinkLong>, AppError> {
    rows.into_iter().map(row_to_long).collect()
}

pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkShort>>, AppError> {
    let rows = drink_repo::list(&state.db).await?;
    let drinks = list_long(rows)?.into_iter().map(DrinkShort::from).collect();

    Ok(Json(DrinksResponse::new(drinks)))
}

pub async fn list_drinks_detail(
    State(state): State<AppState>,
    AuthCtxExtractor(_auth): AuthCtxExtractor,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let rows = drink_repo::list(&state.db).await?;

    Ok(Json(DrinksResponse::new(list_long(rows)?)))
}

pub async fn create_drink(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let Json(body) = payload?;
    let req = CreateDrinkRequest::from_body(body).map_err(|e| match e {
        BodyError::MissingField(field) => AppError::bad_request(format!("{field} is required")),
        BodyError::Invalid(reason) => AppError::bad_request(reason),
    })?;

    let recipe = encode_recipe(&req.recipe)?;
    let row = drink_repo::create(&state.db, &req.title, &recipe).await?;

    tracing::info!(drink_id = row.id, subject = ?auth.subject, "drink created");

    Ok(Json(DrinksResponse::new(vec![row_to_long(row)?])))
}

pub async fn update_drink(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let Path(id) = id?;
    let Json(body) = payload?;

    // A body without `title` answers 404, as clients of this API already expect.
    let req = UpdateDrinkRequest::from_body(body).map_err(|e| match e {
        BodyError::MissingField(field) => AppError::not_found(format!("{field} is missing")),
        BodyError::Invalid(reason) => AppError::bad_request(reason),
    })?;

    let recipe = req.recipe.as_deref().map(encode_recipe).transpose()?;

    let row = drink_repo::update(&state.db, id, &req.title, recipe.as_deref())
        .await?
        .ok_or_else(|| AppError::not_found(format!("drink {id}")))?;

    tracing::info!(drink_id = id, subject = ?auth.subject, "drink updated");

    Ok(Json(DrinksResponse::new(vec![row_to_long(row)?])))
}

pub async fn delete_drink(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedResponse>, AppError> {
    let Path(id) = id?;

    if !drink_repo::delete(&state.db, id).await? {
        return Err(AppError::not_found(format!("drink {id}")));
    }

    tracing::info!(drink_id = id, subject = ?auth.subject, "drink deleted");

    Ok(Json(DeletedResponse { success: true, id }))
}
