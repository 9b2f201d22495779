use crate::{
    auth::{
        auth::AuthUser,
        permission::{Action, Module},
    },
    error::ApiError,
    model::employee::{EMPLOYEE_SELECT, Employee},
    utils::db_utils::{build_update_sql, execute_update},
    utils::pagination::Page,
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

const PROFILE_COLUMNS: &[&str] = &[
    "department",
    "designation",
    "date_of_birth",
    "work_outside_office_allowed",
    "attendance_required",
];

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuery {
    /// Page number
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
    /// Filter by department
    pub department: Option<String>,
    /// Search by name or username
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

// -------------------- Handlers --------------------

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Employee, Action::Read)?;

    let Page {
        page,
        per_page,
        offset,
    } = Page::resolve(query.page, query.per_page, 20);

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = vec!["u.is_active = TRUE"];
    let mut bindings: Vec<String> = Vec::new();

    if let Some(department) = &query.department {
        conditions.push("p.department = ?");
        bindings.push(department.clone());
    }

    if let Some(search) = &query.search {
        conditions.push("(u.first_name LIKE ? OR u.last_name LIKE ? OR u.username LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(like.clone());
        bindings.push(like.clone());
        bindings.push(like);
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    // ---------- total count ----------
    let count_sql = format!(
        "SELECT COUNT(*) FROM users u LEFT JOIN employee_profiles p ON p.user_id = u.id {}",
        where_clause
    );
    debug!(sql = %count_sql, bindings = ?bindings, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count employees");
        ApiError::from(e)
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "{EMPLOYEE_SELECT} {} ORDER BY u.id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page).bind(offset);

    let employees = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch employees");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

async fn find_employee(pool: &MySqlPool, employee_id: u64) -> Result<Option<Employee>, sqlx::Error> {
    let sql = format!("{EMPLOYEE_SELECT} WHERE u.id = ?");
    sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(pool)
        .await
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee (user) ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "status": 404,
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();
    if employee_id != auth.user_id {
        auth.require(Module::Employee, Action::Read)?;
    }

    match find_employee(pool.get_ref(), employee_id).await? {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Err(ApiError::not_found("Employee not found")),
    }
}

/// Update the attendance-related profile of an employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}/profile",
    params(
        ("employee_id" = u64, Path, description = "Employee (user) ID")
    ),
    request_body(
        content = Object,
        description = "Any of: department, designation, date_of_birth, work_outside_office_allowed, attendance_required"
    ),
    responses(
        (status = 200, description = "Profile updated", body = Object, example = json!({
            "message": "Profile updated successfully"
        })),
        (status = 400, description = "Unknown or invalid field"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Employee, Action::Update)?;

    let employee_id = path.into_inner();
    let update = build_update_sql(
        "employee_profiles",
        &body,
        PROFILE_COLUMNS,
        "user_id",
        employee_id,
    )?;

    if find_employee(pool.get_ref(), employee_id).await?.is_none() {
        return Err(ApiError::not_found("Employee not found"));
    }

    // profiles are created lazily with column defaults
    sqlx::query("INSERT IGNORE INTO employee_profiles (user_id) VALUES (?)")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await?;

    execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, employee_id, "Failed to update employee profile");
        ApiError::from(e)
    })?;

    info!(employee_id, updated_by = auth.user_id, "Employee profile updated");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile updated successfully"
    })))
}
