//! services/api/src/web/dashboard.rs
//!
//! Axum handlers for the dashboard singleton and its nested cards. The
//! whole card list lives inside the one dashboard document; card handlers
//! load it, mutate the addressed card, and save the document back.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;
use farmacia_core::domain::{Card, Dashboard, Posicion, Tamano};
use farmacia_core::ports::PortError;

const ICONO_POR_DEFECTO: &str = "fas fa-square";
const COLOR_POR_DEFECTO: &str = "#0d6efd";

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CardInput {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub path: Option<String>,
    pub component: Option<String>,
    pub position: Option<Posicion>,
    pub size: Option<Tamano>,
    pub permissions: Option<Vec<Uuid>>,
    pub is_active: Option<bool>,
}

impl CardInput {
    /// Builds a fresh card with a new stable id, filling defaults.
    fn into_card(self) -> Card {
        Card {
            id: Uuid::new_v4(),
            title: self.title.unwrap_or_default(),
            icon: self.icon.unwrap_or_else(|| ICONO_POR_DEFECTO.to_string()),
            color: self.color.unwrap_or_else(|| COLOR_POR_DEFECTO.to_string()),
            description: self.description.unwrap_or_default(),
            path: self.path.unwrap_or_default(),
            component: self.component.unwrap_or_default(),
            position: self.position.unwrap_or_default(),
            size: self.size.unwrap_or_default(),
            permissions: self.permissions.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
        }
    }

    /// Merges the present fields onto an existing card, keeping its id.
    fn apply(self, card: &mut Card) {
        if let Some(title) = self.title {
            card.title = title;
        }
        if let Some(icon) = self.icon {
            card.icon = icon;
        }
        if let Some(color) = self.color {
            card.color = color;
        }
        if let Some(description) = self.description {
            card.description = description;
        }
        if let Some(path) = self.path {
            card.path = path;
        }
        if let Some(component) = self.component {
            card.component = component;
        }
        if let Some(position) = self.position {
            card.position = position;
        }
        if let Some(size) = self.size {
            card.size = size;
        }
        if let Some(permissions) = self.permissions {
            card.permissions = permissions;
        }
        if let Some(is_active) = self.is_active {
            card.is_active = is_active;
        }
    }
}

#[derive(Deserialize, Default)]
pub struct DashboardInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cards: Option<Vec<CardInput>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolesRequest {
    pub role_ids: Option<Vec<Uuid>>,
}

fn card_no_encontrada() -> PortError {
    PortError::NotFound("Card no encontrada".to_string())
}

//=========================================================================================
// Dashboard Handlers
//=========================================================================================

/// GET /api/dashboard - Fetch the singleton.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "The dashboard"),
        (status = 404, description = "No dashboard exists yet")
    )
)]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let dashboard = state.dashboard.get().await?;
    Ok(Json(json!({
        "message": "Dashboard obtenido correctamente",
        "dashboard": dashboard,
    })))
}

/// POST /api/dashboard - Create the singleton, or update it if it already
/// exists. A provided card list replaces the existing one wholesale.
pub async fn create_or_update_dashboard(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DashboardInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match state.dashboard.get().await {
        Ok(mut dashboard) => {
            if let Some(name) = req.name {
                dashboard.name = name;
            }
            if let Some(description) = req.description {
                dashboard.description = description;
            }
            if let Some(cards) = req.cards {
                dashboard.cards = cards.into_iter().map(CardInput::into_card).collect();
            }
            let dashboard = state.dashboard.upsert(dashboard).await?;
            Ok((
                StatusCode::OK,
                Json(json!({
                    "message": "Dashboard actualizado correctamente",
                    "dashboard": dashboard,
                })),
            ))
        }
        Err(PortError::NotFound(_)) => {
            let name = req
                .name
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| {
                    PortError::Validation("El nombre del dashboard es obligatorio".to_string())
                })?;
            let ahora = Utc::now();
            let dashboard = state
                .dashboard
                .upsert(Dashboard {
                    id: Uuid::new_v4(),
                    name,
                    description: req.description.unwrap_or_default(),
                    cards: req
                        .cards
                        .unwrap_or_default()
                        .into_iter()
                        .map(CardInput::into_card)
                        .collect(),
                    created_at: ahora,
                    updated_at: ahora,
                })
                .await?;
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "message": "Dashboard creado correctamente",
                    "dashboard": dashboard,
                })),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/dashboard - Drop the singleton entirely.
pub async fn delete_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    state.dashboard.delete().await?;
    Ok(Json(json!({ "message": "Dashboard eliminado correctamente" })))
}

//=========================================================================================
// Card Handlers
//=========================================================================================

/// POST /api/dashboard/card - Append a card to the singleton.
pub async fn add_card(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CardInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut dashboard = state.dashboard.get().await.map_err(|e| match e {
        PortError::NotFound(_) => {
            PortError::NotFound("No existe un dashboard para añadir la card".to_string())
        }
        otro => otro,
    })?;

    if req.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
        return Err(
            PortError::Validation("El título de la card es obligatorio".to_string()).into(),
        );
    }

    dashboard.cards.push(req.into_card());
    let dashboard = state.dashboard.upsert(dashboard).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Card añadida correctamente", "dashboard": dashboard })),
    ))
}

/// PUT /api/dashboard/card/{card_id} - Merge fields onto one card.
pub async fn update_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<Uuid>,
    Json(req): Json<CardInput>,
) -> Result<Json<Value>, ApiError> {
    let mut dashboard = state.dashboard.get().await?;

    let card = dashboard
        .cards
        .iter_mut()
        .find(|c| c.id == card_id)
        .ok_or_else(card_no_encontrada)?;
    req.apply(card);

    let dashboard = state.dashboard.upsert(dashboard).await?;
    Ok(Json(json!({ "message": "Card actualizada correctamente", "dashboard": dashboard })))
}

/// DELETE /api/dashboard/card/{card_id}
pub async fn delete_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut dashboard = state.dashboard.get().await?;

    let antes = dashboard.cards.len();
    dashboard.cards.retain(|c| c.id != card_id);
    if dashboard.cards.len() == antes {
        return Err(card_no_encontrada().into());
    }

    let dashboard = state.dashboard.upsert(dashboard).await?;
    Ok(Json(json!({ "message": "Card eliminada correctamente", "dashboard": dashboard })))
}

/// PUT /api/dashboard/card/{card_id}/roles - Replace a card's permission
/// list. Role ids are not checked for existence; a dangling id just never
/// matches a user's role.
pub async fn assign_roles_to_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<Uuid>,
    Json(req): Json<AssignRolesRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut dashboard = state.dashboard.get().await?;

    let card = dashboard
        .cards
        .iter_mut()
        .find(|c| c.id == card_id)
        .ok_or_else(card_no_encontrada)?;
    card.permissions = req.role_ids.unwrap_or_default();

    let dashboard = state.dashboard.upsert(dashboard).await?;
    Ok(Json(json!({ "message": "Permisos asignados correctamente", "dashboard": dashboard })))
}
