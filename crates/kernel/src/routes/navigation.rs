//! Navigation endpoints.
//!
//! - `GET /api/navigation`: filtered menu for the bearer token's user
//! - `POST /api/navigation/refresh`: drop cached data, then the same menu

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::helpers::bearer_token;
use crate::error::{AppError, AppResult};
use crate::menu::ConditionalNavigationItem;
use crate::models::{Role, UserContext};
use crate::permissions::PermissionService;
use crate::state::{AppState, SessionNavigation};

/// Navigation response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationResponse {
    pub user: NavigationUser,
    /// `None` when the fallback menu was served.
    pub configuration: Option<String>,
    pub items: Vec<ConditionalNavigationItem>,
}

/// The part of the user context clients may see.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationUser {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
    pub primary_role: Option<Role>,
}

impl NavigationResponse {
    fn build(provider: &SessionNavigation, context: &UserContext) -> Self {
        let menu = provider.resolve_menu(context);

        Self {
            user: NavigationUser {
                id: context.id,
                email: context.email.clone(),
                roles: context.roles.clone(),
                primary_role: PermissionService::get_highest_priority_role(context),
            },
            configuration: menu.configuration_id,
            items: menu.items,
        }
    }
}

async fn get_navigation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<NavigationResponse>> {
    let token = bearer_token(&headers)?;
    let provider = state.navigation_for(token).await;

    let Some(context) = provider.get_user_context().await else {
        debug!("navigation requested without a resolvable user");
        return Err(AppError::Unauthorized);
    };

    Ok(Json(NavigationResponse::build(&provider, &context)))
}

async fn refresh_navigation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<NavigationResponse>> {
    let token = bearer_token(&headers)?;
    let provider = state.navigation_for(token).await;

    let Some(context) = provider.refresh_cache().await else {
        return Err(AppError::Unauthorized);
    };

    Ok(Json(NavigationResponse::build(&provider, &context)))
}

/// Create the navigation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/navigation", get(get_navigation))
        .route("/api/navigation/refresh", post(refresh_navigation))
}
