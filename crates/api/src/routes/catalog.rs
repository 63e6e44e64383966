//! Route definitions for the catalog seed.

use axum::routing::post;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Routes mounted at `/catalog`.
///
/// ```text
/// POST   /seed    -> seed_catalog
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/seed", post(catalog::seed_catalog))
}
