use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::AuthUser;
use crate::entities::learning_resource::{self, ResourceCategory};
use crate::entities::LearningResource;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResourcesQuery {
    /// Restrict the listing to one category.
    #[serde(default)]
    #[param(required = false)]
    category: Option<ResourceCategory>,
}

/// List published learning resources
#[utoipa::path(
    get,
    path = "/learning/resources",
    params(ResourcesQuery),
    responses(
        (status = 200, description = "Published resources, newest first", body = Vec<learning_resource::Model>),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[tracing::instrument(skip(state, _user, query))]
pub async fn list_resources(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ResourcesQuery>,
) -> Result<Json<Vec<learning_resource::Model>>, AppError> {
    let mut select =
        LearningResource::find().filter(learning_resource::Column::IsPublished.eq(true));
    if let Some(category) = query.category {
        select = select.filter(learning_resource::Column::Category.eq(category));
    }
    let resources = select
        .order_by_desc(learning_resource::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(resources))
}

/// Fetch a single learning resource
#[utoipa::path(
    get,
    path = "/learning/resources/{id}",
    params(("id" = i64, Path, description = "Resource id")),
    responses(
        (status = 200, description = "The resource", body = learning_resource::Model),
        (status = 404, description = "Unknown or unpublished resource")
    )
)]
#[tracing::instrument(skip(state, _user))]
pub async fn get_resource(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<learning_resource::Model>, AppError> {
    LearningResource::find_by_id(id)
        .filter(learning_resource::Column::IsPublished.eq(true))
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Learning resource".to_string()))
}
