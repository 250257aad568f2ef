//! Food data from outside the catalog: public database search results and
//! partial reads of nutrition labels, turned into catalog foods.

use crate::state::AppState;
use axum::Router;

pub mod draft;
pub mod dto;
pub mod handlers;
pub mod services;
pub mod usda;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::import_routes())
}
