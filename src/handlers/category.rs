//! Category handlers: create, read, update, delete, list.

use crate::error::{AppError, OrFail};
use crate::extractors::Validated;
use crate::orm::Collection;
use crate::requests::StoreCategoryRequest;
use crate::response::{success, success_with};
use crate::service::CategoryResource;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

type Reply = Result<(StatusCode, Json<Value>), AppError>;

/// Ids arrive as raw path text so a malformed id answers with the endpoint's own failure message.
fn parse_id(raw: &str, failure: &str) -> Result<i64, AppError> {
    raw.trim().parse().map_err(|_| {
        tracing::debug!(id = %raw, "invalid category id");
        AppError::Failed(failure.to_string())
    })
}

#[derive(Serialize)]
struct Pagination {
    total: u64,
    per_page: u64,
    current_page: u64,
    last_page: u64,
}

#[derive(Serialize)]
struct PagedList<'a> {
    message: &'static str,
    categories_data: &'a Collection,
    pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub per_page: Option<String>,
    pub page: Option<String>,
}

impl ListParams {
    /// `(per_page, page)` when pagination was asked for; unparsable values count as absent.
    fn window(&self) -> Option<(u64, u64)> {
        let per_page = self.per_page.as_deref()?.trim().parse().ok()?;
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1);
        Some((per_page, page))
    }
}

pub async fn store_category(
    State(state): State<AppState>,
    request: Validated<StoreCategoryRequest>,
) -> Reply {
    const FAILED: &str = "Failed to create category";
    let record = CategoryResource::store(&state.conn, &state.categories, &request.row())
        .await
        .or_fail(FAILED)?;
    success_with("Category created successfully", "category_data", &record)
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Validated<StoreCategoryRequest>,
) -> Reply {
    const FAILED: &str = "Failed to update category";
    let id = parse_id(&id, FAILED)?;
    let record = CategoryResource::update(&state.conn, &state.categories, id, &request.row())
        .await
        .or_fail(FAILED)?
        .ok_or_else(|| AppError::Failed(FAILED.to_string()))?;
    success_with("Category updated successfully", "category_data", &record)
}

pub async fn delete_category(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    const FAILED: &str = "Failed to delete category";
    let id = parse_id(&id, FAILED)?;
    let affected = CategoryResource::delete(&state.conn, &state.categories, id)
        .await
        .or_fail(FAILED)?;
    if affected == 0 {
        return Err(AppError::Failed(FAILED.to_string()));
    }
    Ok(success("Category deleted successfully"))
}

pub async fn get_category(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    const FAILED: &str = "Failed to get category";
    let id = parse_id(&id, FAILED)?;
    let record = CategoryResource::get(&state.conn, &state.categories, id)
        .await
        .or_fail(FAILED)?
        .ok_or_else(|| AppError::Failed(FAILED.to_string()))?;
    success_with("Category retrieved successfully", "category_data", &record)
}

/// GET list; `?per_page=` switches to a paginated window and adds a `pagination` object.
pub async fn get_all_categories(State(state): State<AppState>, Query(params): Query<ListParams>) -> Reply {
    const FAILED: &str = "Failed to get categories";
    const OK: &str = "Categories retrieved successfully";
    match params.window() {
        None => {
            let categories = CategoryResource::get_all(&state.conn, &state.categories)
                .await
                .or_fail(FAILED)?;
            success_with(OK, "categories_data", &categories)
        }
        Some((per_page, page)) => {
            let page = CategoryResource::paginate(&state.conn, &state.categories, per_page, page)
                .await
                .or_fail(FAILED)?;
            let body = serde_json::to_value(PagedList {
                message: OK,
                categories_data: &page.data,
                pagination: Pagination {
                    total: page.total,
                    per_page: page.per_page,
                    current_page: page.current_page,
                    last_page: page.last_page,
                },
            })?;
            Ok((StatusCode::OK, Json(body)))
        }
    }
}
