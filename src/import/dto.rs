use serde::{Deserialize, Serialize};

use super::draft::FoodDraft;

#[derive(Debug, Deserialize)]
pub struct PublicFoodsQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct PublicFoodsResponse {
    pub foods: Vec<FoodDraft>,
}

/// One or more partial reads of the same food, most trusted first.
#[derive(Debug, Deserialize)]
pub struct ImportFoodRequest {
    pub drafts: Vec<FoodDraft>,
}
