use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::rule::{RuleCategory, RuleRecord};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RuleQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RuleListResponse {
    pub count: usize,
    pub rules: Vec<RuleRecord>,
}

/// GET /api/v1/rules[?category=CON]
pub async fn handle_list_rules(
    State(state): State<AppState>,
    Query(query): Query<RuleQuery>,
) -> Result<Json<RuleListResponse>, AppError> {
    let source = state.orchestrator.rules();

    let rules: Vec<RuleRecord> = match query.category.as_deref() {
        None => source.load_all().to_vec(),
        Some(prefix) => {
            let category = RuleCategory::from_prefix(prefix).ok_or_else(|| {
                AppError::Validation(format!("unknown rule category '{prefix}'"))
            })?;
            source.by_category(category).cloned().collect()
        }
    };

    Ok(Json(RuleListResponse {
        count: rules.len(),
        rules,
    }))
}
