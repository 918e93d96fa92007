//! HTTP handler functions for the lead-forge API.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use lead_forge_database::{DbError, leads};
use lead_forge_database_models::PageRequest;
use lead_forge_filter::{LeadQuery, build_filter_query};
use lead_forge_server_models::{
    ApiHealth, ApiLead, ApiLeadStats, CreateLeadRequest, DeletedLead, ErrorBody, FieldError,
    FilterParamError, LeadListResponse, ListLeadsParams, MessageResponse, Pagination, SortInfo,
    UpdateLeadRequest,
};
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, error::ApiError};

const LEAD_NOT_FOUND: &str = "Lead not found";

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
    })
}

/// Fallback for every unmatched route.
pub async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody {
        message: "Route not found".to_string(),
        errors: None,
    })
}

/// Normalizes a lead id from the path. Anything that is not a UUID is
/// rejected before touching storage.
fn lead_id(raw: &str) -> Result<String, ApiError> {
    Uuid::try_parse(raw)
        .map(|id| id.to_string())
        .map_err(|_| ApiError::BadRequest("Invalid lead ID format".to_string()))
}

/// Maps a unique-email violation to a 409 with `message`.
fn email_conflict(message: &'static str) -> impl FnOnce(DbError) -> ApiError {
    move |e| match e {
        DbError::Conflict { .. } => ApiError::Conflict(message.to_string()),
        other => other.into(),
    }
}

/// `GET /api/leads`
///
/// Lists the caller's leads matching the `filters` parameter, one page at
/// a time.
pub async fn list_leads(
    state: web::Data<AppState>,
    user: AuthUser,
    params: web::Query<ListLeadsParams>,
) -> Result<HttpResponse, ApiError> {
    let options = params.validate().map_err(ApiError::validation)?;

    let (filters, echo) = params.parse_filters().map_err(|e| match e {
        FilterParamError::Syntax(_) => {
            ApiError::BadRequest("Invalid filters format. Must be valid JSON.".to_string())
        }
        FilterParamError::Shape(detail) => ApiError::Invalid {
            message: "Invalid filters format".to_string(),
            errors: vec![FieldError::new("filters", detail)],
        },
    })?;

    let query = build_filter_query(&filters, user.id());
    let page = PageRequest {
        sort_field: options.sort_field,
        sort_order: options.sort_order,
        offset: options.offset(),
        limit: options.limit,
    };

    let total = leads::count_leads(state.db.as_ref(), &query).await?;
    let rows = leads::find_leads(state.db.as_ref(), &query, &page).await?;

    log::debug!(
        "Listed {} of {total} leads for {} (page {})",
        rows.len(),
        user.id(),
        options.page
    );

    Ok(HttpResponse::Ok().json(LeadListResponse {
        data: rows.into_iter().map(ApiLead::from).collect(),
        pagination: Pagination::new(options.page, options.limit, total),
        filters: echo,
        sort: SortInfo {
            sort_by: options.sort_field,
            sort_order: options.sort_order,
        },
    }))
}

/// `GET /api/leads/stats/summary`
pub async fn lead_stats(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    let stats = leads::summary_stats(state.db.as_ref(), &LeadQuery::for_owner(user.id())).await?;
    Ok(HttpResponse::Ok().json(ApiLeadStats::from(stats)))
}

/// `GET /api/leads/{id}`
pub async fn get_lead(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = lead_id(&path)?;

    let lead = leads::get_lead(state.db.as_ref(), user.id(), &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(LEAD_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiLead::from(lead)))
}

/// `POST /api/leads`
pub async fn create_lead(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<CreateLeadRequest>,
) -> Result<HttpResponse, ApiError> {
    const DUPLICATE: &str = "A lead with this email already exists";

    let new_lead = body.validate().map_err(ApiError::validation)?;

    if leads::email_taken(state.db.as_ref(), user.id(), &new_lead.email, None).await? {
        return Err(ApiError::Conflict(DUPLICATE.to_string()));
    }

    let lead = leads::insert_lead(state.db.as_ref(), user.id(), &new_lead, Utc::now())
        .await
        .map_err(email_conflict(DUPLICATE))?;

    log::info!("Created lead {} for {}", lead.id, user.id());

    Ok(HttpResponse::Created().json(MessageResponse {
        message: "Lead created successfully".to_string(),
        data: ApiLead::from(lead),
    }))
}

/// `PUT /api/leads/{id}`
pub async fn update_lead(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<UpdateLeadRequest>,
) -> Result<HttpResponse, ApiError> {
    const DUPLICATE: &str = "Another lead with this email already exists";

    let id = lead_id(&path)?;
    let changes = body.validate().map_err(ApiError::validation)?;

    let existing = leads::get_lead(state.db.as_ref(), user.id(), &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(LEAD_NOT_FOUND.to_string()))?;

    if let Some(email) = changes.email.as_deref()
        && email != existing.email
        && leads::email_taken(state.db.as_ref(), user.id(), email, Some(&id)).await?
    {
        return Err(ApiError::Conflict(DUPLICATE.to_string()));
    }

    let lead = leads::update_lead(state.db.as_ref(), user.id(), &id, &changes, Utc::now())
        .await
        .map_err(email_conflict(DUPLICATE))?
        .ok_or_else(|| ApiError::NotFound(LEAD_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Lead updated successfully".to_string(),
        data: ApiLead::from(lead),
    }))
}

/// `DELETE /api/leads/{id}`
pub async fn delete_lead(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = lead_id(&path)?;

    if !leads::delete_lead(state.db.as_ref(), user.id(), &id).await? {
        return Err(ApiError::NotFound(LEAD_NOT_FOUND.to_string()));
    }

    log::info!("Deleted lead {id} for {}", user.id());

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Lead deleted successfully".to_string(),
        data: DeletedLead { id },
    }))
}
