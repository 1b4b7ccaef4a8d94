//! HTTP surface over the in-memory store. Routes mirror the admin tool:
//! report submission and approval, policy and rule administration, expense
//! types, dropdown taxonomies, and the user-property resource.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

use super::domain::{
    DropdownTypeId, ExpenseTypeId, PolicyCondition, PolicyId, PropertyId, ReportId, UserId,
};
use super::evaluation::{EvaluationInput, RuleEvaluator};
use super::store::{
    CategoryAmount, ExpenseStore, NewDropdownType, NewExpenseType, NewPolicy, NewUserProperty,
    PolicyUpdate, RuleSpec, StoreError, UserPropertyPatch,
};
use super::summary::ReportFilter;

/// Shared handler state: the store behind a lock plus the stateless evaluator.
#[derive(Clone)]
pub struct ExpenseApi {
    store: Arc<RwLock<ExpenseStore>>,
    evaluator: Arc<RuleEvaluator>,
}

impl ExpenseApi {
    pub fn new(store: ExpenseStore, evaluator: RuleEvaluator) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            evaluator: Arc::new(evaluator),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ExpenseStore> {
        self.store.read().unwrap_or_else(|err| err.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ExpenseStore> {
        self.store.write().unwrap_or_else(|err| err.into_inner())
    }
}

/// Router builder exposing the expense-management endpoints.
pub fn expense_router(api: ExpenseApi) -> Router {
    Router::new()
        .route("/api/v1/login", post(login))
        .route("/api/v1/expenses", get(list_reports).post(submit_report))
        .route("/api/v1/expenses/summary", get(report_summary))
        .route("/api/v1/expenses/export", get(export_reports))
        .route("/api/v1/expenses/:report_id/approve", post(approve_report))
        .route("/api/v1/expenses/:report_id/reject", post(reject_report))
        .route(
            "/api/v1/expenses/:report_id/reimburse",
            post(reimburse_report),
        )
        .route("/api/v1/policies", get(list_policies).post(create_policy))
        .route("/api/v1/policies/:policy_id", axum::routing::put(update_policy))
        .route("/api/v1/policies/:policy_id/rules", post(add_rule))
        .route(
            "/api/v1/policies/:policy_id/rules/batch",
            post(add_rule_batch),
        )
        .route(
            "/api/v1/expense-types",
            get(list_expense_types).post(create_expense_type),
        )
        .route(
            "/api/v1/expense-types/:type_id",
            axum::routing::put(update_expense_type),
        )
        .route(
            "/api/v1/expense-types/:type_id/toggle",
            post(toggle_expense_type),
        )
        .route(
            "/api/v1/dropdown-types",
            get(list_dropdown_types).post(create_dropdown_type),
        )
        .route(
            "/api/v1/dropdown-types/:type_id",
            axum::routing::put(update_dropdown_type),
        )
        .route(
            "/api/v1/dropdown-types/:type_id/toggle",
            post(toggle_dropdown_type),
        )
        .route(
            "/api/v1/dropdown-types/:type_id/options",
            post(add_dropdown_option),
        )
        .route(
            "/api/user-properties",
            get(list_user_properties).post(create_user_property),
        )
        .route(
            "/api/user-properties/:property_id",
            axum::routing::patch(patch_user_property).delete(delete_user_property),
        )
        .with_state(api)
}

// ---- sessions --------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
}

async fn login(State(api): State<ExpenseApi>, Json(request): Json<LoginRequest>) -> Response {
    let store = api.read();
    match store.login(&request.email) {
        Some(user) => (StatusCode::OK, Json(user.clone())).into_response(),
        None => {
            let payload = json!({ "error": "no user with that email" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

// ---- expense reports -------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewLineItem {
    expense_type_id: ExpenseTypeId,
    #[serde(default)]
    description: String,
    #[serde(flatten)]
    input: EvaluationInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReportRequest {
    employee_id: UserId,
    date: NaiveDate,
    policy_id: PolicyId,
    items: Vec<NewLineItem>,
}

async fn submit_report(
    State(api): State<ExpenseApi>,
    Json(request): Json<SubmitReportRequest>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let policy = store
        .policy(&request.policy_id)
        .cloned()
        .ok_or(StoreError::PolicyNotFound(request.policy_id.clone()))?;
    let types = store.expense_types().to_vec();

    let mut draft = super::assembler::ReportDraft::new(
        request.employee_id,
        request.date,
        request.policy_id,
    );
    for item in request.items {
        draft
            .add_line_item(
                &policy,
                &types,
                &api.evaluator,
                item.expense_type_id,
                item.input,
                item.description,
            )
            .map_err(StoreError::from)?;
    }

    let id = store.submit_report(draft, Utc::now())?;
    let report = store
        .report(&id)
        .cloned()
        .ok_or(StoreError::ReportNotFound(id))?;
    Ok((StatusCode::CREATED, Json(report)).into_response())
}

async fn list_reports(
    State(api): State<ExpenseApi>,
    Query(filter): Query<ReportFilter>,
) -> Response {
    let store = api.read();
    let reports: Vec<_> = store
        .filtered_reports(&filter)
        .into_iter()
        .cloned()
        .collect();
    (StatusCode::OK, Json(reports)).into_response()
}

async fn report_summary(
    State(api): State<ExpenseApi>,
    Query(filter): Query<ReportFilter>,
) -> Response {
    let store = api.read();
    (StatusCode::OK, Json(store.summarize(&filter))).into_response()
}

async fn export_reports(
    State(api): State<ExpenseApi>,
    Query(filter): Query<ReportFilter>,
) -> Result<Response, AppError> {
    let store = api.read();
    let csv = store
        .export_csv(&filter)
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"expense-reports.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApproveRequest {
    approver_id: UserId,
}

async fn approve_report(
    State(api): State<ExpenseApi>,
    Path(report_id): Path<String>,
    Json(request): Json<ApproveRequest>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let report = store.approve_report(&ReportId(report_id), &request.approver_id, Utc::now())?;
    Ok((StatusCode::OK, Json(report)).into_response())
}

#[derive(Debug, Deserialize)]
struct RejectRequest {
    reason: String,
}

async fn reject_report(
    State(api): State<ExpenseApi>,
    Path(report_id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let report = store.reject_report(&ReportId(report_id), &request.reason)?;
    Ok((StatusCode::OK, Json(report)).into_response())
}

async fn reimburse_report(
    State(api): State<ExpenseApi>,
    Path(report_id): Path<String>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let report = store.reimburse_report(&ReportId(report_id), Utc::now())?;
    Ok((StatusCode::OK, Json(report)).into_response())
}

// ---- policies and rules ----------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyQuery {
    #[serde(default)]
    eligible_for: Option<UserId>,
}

async fn list_policies(
    State(api): State<ExpenseApi>,
    Query(query): Query<PolicyQuery>,
) -> Response {
    let store = api.read();
    let policies: Vec<_> = match query.eligible_for {
        Some(user_id) => match store.user(&user_id) {
            Some(user) => store.eligible_policies(user).into_iter().cloned().collect(),
            None => {
                let payload = json!({ "error": format!("user not found: {user_id}") });
                return (StatusCode::NOT_FOUND, Json(payload)).into_response();
            }
        },
        None => store.policies().to_vec(),
    };
    (StatusCode::OK, Json(policies)).into_response()
}

async fn create_policy(
    State(api): State<ExpenseApi>,
    Json(fields): Json<NewPolicy>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let id = store.add_policy(fields)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}

async fn update_policy(
    State(api): State<ExpenseApi>,
    Path(policy_id): Path<String>,
    Json(fields): Json<PolicyUpdate>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let id = PolicyId(policy_id);
    store.update_policy(&id, fields)?;
    let policy = store
        .policy(&id)
        .cloned()
        .ok_or(StoreError::PolicyNotFound(id))?;
    Ok((StatusCode::OK, Json(policy)).into_response())
}

async fn add_rule(
    State(api): State<ExpenseApi>,
    Path(policy_id): Path<String>,
    Json(spec): Json<RuleSpec>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let id = store.add_rule(&PolicyId(policy_id), spec)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleBatchRequest {
    amounts: Vec<CategoryAmount>,
    #[serde(default)]
    user_conditions: Vec<PolicyCondition>,
}

async fn add_rule_batch(
    State(api): State<ExpenseApi>,
    Path(policy_id): Path<String>,
    Json(request): Json<RuleBatchRequest>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let (group_id, rule_ids) =
        store.add_rule_batch(&PolicyId(policy_id), request.amounts, request.user_conditions)?;
    let payload = json!({ "groupId": group_id, "ruleIds": rule_ids });
    Ok((StatusCode::CREATED, Json(payload)).into_response())
}

// ---- expense types ---------------------------------------------------------

async fn list_expense_types(State(api): State<ExpenseApi>) -> Response {
    let store = api.read();
    (StatusCode::OK, Json(store.expense_types().to_vec())).into_response()
}

async fn create_expense_type(
    State(api): State<ExpenseApi>,
    Json(fields): Json<NewExpenseType>,
) -> Response {
    let mut store = api.write();
    let id = store.add_expense_type(fields);
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

async fn update_expense_type(
    State(api): State<ExpenseApi>,
    Path(type_id): Path<String>,
    Json(fields): Json<NewExpenseType>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let id = ExpenseTypeId(type_id);
    store.update_expense_type(&id, fields)?;
    let ty = store
        .expense_type(&id)
        .cloned()
        .ok_or(StoreError::ExpenseTypeNotFound(id))?;
    Ok((StatusCode::OK, Json(ty)).into_response())
}

async fn toggle_expense_type(
    State(api): State<ExpenseApi>,
    Path(type_id): Path<String>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let is_active = store.toggle_expense_type(&ExpenseTypeId(type_id))?;
    Ok((StatusCode::OK, Json(json!({ "isActive": is_active }))).into_response())
}

// ---- dropdown taxonomies ---------------------------------------------------

async fn list_dropdown_types(State(api): State<ExpenseApi>) -> Response {
    let store = api.read();
    (StatusCode::OK, Json(store.dropdown_types().to_vec())).into_response()
}

async fn create_dropdown_type(
    State(api): State<ExpenseApi>,
    Json(fields): Json<NewDropdownType>,
) -> Response {
    let mut store = api.write();
    let id = store.add_dropdown_type(fields);
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DropdownTypeUpdate {
    name: String,
    description: String,
}

async fn update_dropdown_type(
    State(api): State<ExpenseApi>,
    Path(type_id): Path<String>,
    Json(fields): Json<DropdownTypeUpdate>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    store.update_dropdown_type(&DropdownTypeId(type_id), fields.name, fields.description)?;
    Ok(StatusCode::OK.into_response())
}

async fn toggle_dropdown_type(
    State(api): State<ExpenseApi>,
    Path(type_id): Path<String>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let is_active = store.toggle_dropdown_type(&DropdownTypeId(type_id))?;
    Ok((StatusCode::OK, Json(json!({ "isActive": is_active }))).into_response())
}

#[derive(Debug, Deserialize)]
struct NewOptionRequest {
    value: String,
}

async fn add_dropdown_option(
    State(api): State<ExpenseApi>,
    Path(type_id): Path<String>,
    Json(request): Json<NewOptionRequest>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let id = store.add_dropdown_option(&DropdownTypeId(type_id), &request.value)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}

// ---- user properties -------------------------------------------------------

async fn list_user_properties(State(api): State<ExpenseApi>) -> Response {
    let store = api.read();
    (StatusCode::OK, Json(store.user_properties().to_vec())).into_response()
}

async fn create_user_property(
    State(api): State<ExpenseApi>,
    Json(fields): Json<NewUserProperty>,
) -> Response {
    let mut store = api.write();
    let property = store.add_user_property(fields, Utc::now());
    (StatusCode::CREATED, Json(property)).into_response()
}

async fn patch_user_property(
    State(api): State<ExpenseApi>,
    Path(property_id): Path<String>,
    Json(patch): Json<UserPropertyPatch>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    let property = store.update_user_property(&PropertyId(property_id), patch, Utc::now())?;
    Ok((StatusCode::OK, Json(property)).into_response())
}

async fn delete_user_property(
    State(api): State<ExpenseApi>,
    Path(property_id): Path<String>,
) -> Result<Response, AppError> {
    let mut store = api.write();
    store.remove_user_property(&PropertyId(property_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
