//! Category REST routes, mounted under the API namespace.

use crate::handlers::{
    delete_category, get_all_categories, get_category, store_category, update_category,
};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub fn category_routes(state: AppState) -> Router {
    Router::new()
        .route("/postCategory", post(store_category))
        .route("/get-categories", get(get_all_categories))
        .route("/get-category/:id", get(get_category))
        .route("/update-category/:id", put(update_category))
        .route("/delete-category/:id", delete(delete_category))
        .with_state(state)
}
