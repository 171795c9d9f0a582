mod common;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use common::{Recorded, api_path, client_state, memory_storage, recording, spawn_backend, valid_token};
use hrm_console::{
    ApiError, MutationOutcome,
    auth::Role,
    models::{
        CreateEmployeeRequest, EMPLOYEE_STATUSES, LEAVE_APPROVED, LeaveDecision, RoleUpdate,
        SalaryUpdate,
    },
    resources::{
        Departments, Employees, LeaveRequests, Payroll, ResourceGateway, SalaryId, Shareholders,
        Users,
    },
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::{collections::HashMap, sync::Arc};

// --- Fake Employee Service ---

type Rows = Arc<Mutex<Vec<Value>>>;

async fn list_employees(
    State(rows): State<Rows>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let department = q.get("department_id").and_then(|d| d.parse::<i64>().ok());
    let rows = rows
        .lock()
        .iter()
        .filter(|row| department.is_none_or(|d| row["DepartmentID"] == d))
        .cloned()
        .collect();
    Json(rows)
}

async fn create_employee(
    State(rows): State<Rows>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut rows = rows.lock();
    body["EmployeeID"] = json!(rows.len() as i64 + 1);
    if let Some(fields) = body.as_object_mut() {
        fields.remove("password");
    }
    rows.push(body.clone());
    (StatusCode::CREATED, Json(body))
}

fn employee_service() -> Router {
    let rows: Rows = Arc::new(Mutex::new(vec![json!({
        "EmployeeID": 1,
        "FullName": "Trần Thị Lan",
        "Email": "lan@corp.vn",
        "DepartmentID": 2,
        "PositionID": 5,
        "Status": "Đang làm việc"
    })]));

    Router::new()
        .route(
            &api_path("/employees/"),
            get(list_employees).post(create_employee),
        )
        .route(
            &api_path("/departments/"),
            get(|| async { Json(json!([{"DepartmentID": 2, "DepartmentName": "Kế toán"}])) }),
        )
        .route(
            &api_path("/positions/"),
            get(|| async { Json(json!([{"PositionID": 5, "PositionName": "Kế toán viên"}])) }),
        )
        .with_state(rows)
}

fn employee_list_queries(seen: &[Recorded]) -> Vec<Option<String>> {
    seen.iter()
        .filter(|r| r.method == "GET" && r.path == api_path("/employees/"))
        .map(|r| r.query.clone())
        .collect()
}

// --- List Queries Over HTTP ---

#[tokio::test]
async fn mount_fetches_reference_lists_and_rows() {
    let (router, recorder) = recording(employee_service());
    let base = spawn_backend(router).await;
    let token = valid_token(Role::HrManager, None);
    let (state, notices) = client_state(&base, memory_storage(Some(&token)));
    let controller = state.controller::<Employees>();

    controller.mount().await;

    let page = controller.state();
    assert!(page.loaded);
    assert_eq!(page.items[0].full_name, "Trần Thị Lan");
    assert_eq!(page.reference.departments[0].name, "Kế toán");
    assert_eq!(page.reference.positions[0].name, "Kế toán viên");
    assert_eq!(page.reference.statuses.len(), EMPLOYEE_STATUSES.len());
    assert!(notices.errors().is_empty());

    let mut paths: Vec<String> = recorder.lock().iter().map(|r| r.path.clone()).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            api_path("/departments/"),
            api_path("/employees/"),
            api_path("/positions/"),
        ]
    );
}

#[tokio::test]
async fn filters_are_sent_whole_and_clearing_sends_none() {
    let (router, recorder) = recording(employee_service());
    let base = spawn_backend(router).await;
    let token = valid_token(Role::HrManager, None);
    let (state, _) = client_state(&base, memory_storage(Some(&token)));
    let controller = state.controller::<Employees>();

    controller.set_search("lan");
    controller.set_filter("department_id", "2").await;
    controller.set_filter("position_id", "5").await;
    controller.clear_filters().await;

    assert_eq!(
        employee_list_queries(&recorder.lock()),
        vec![
            Some("search=lan&department_id=2".to_string()),
            Some("search=lan&department_id=2&position_id=5".to_string()),
            None,
        ]
    );
}

#[tokio::test]
async fn created_employee_appears_in_the_refetched_list() {
    let (router, recorder) = recording(employee_service());
    let base = spawn_backend(router).await;
    let token = valid_token(Role::HrManager, None);
    let (state, _) = client_state(&base, memory_storage(Some(&token)));
    let controller = state.controller::<Employees>();
    controller.set_filter("department_id", "2").await;

    let outcome = controller
        .create(&CreateEmployeeRequest {
            full_name: "Nguyễn Văn Bình".into(),
            email: "binh@corp.vn".into(),
            department_id: 2,
            position_id: 5,
            status: "Thử việc".into(),
            password: "initial".into(),
            ..CreateEmployeeRequest::default()
        })
        .await;

    assert_eq!(outcome, MutationOutcome::Applied);
    let names: Vec<String> = controller
        .state()
        .items
        .into_iter()
        .map(|e| e.full_name)
        .collect();
    assert_eq!(names, vec!["Trần Thị Lan", "Nguyễn Văn Bình"]);

    let seen = recorder.lock().clone();
    assert!(
        seen.iter()
            .any(|r| r.method == "POST" && r.path == api_path("/employees/"))
    );
    assert_eq!(
        employee_list_queries(&seen).last().cloned().flatten().as_deref(),
        Some("department_id=2")
    );
}

// --- Edit Endpoints ---

fn edit_service() -> Router {
    Router::new()
        .route(&api_path("/users/"), get(|| async { Json(json!([])) }))
        .route(
            &api_path("/users/{id}/role"),
            put(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                Json(json!({"id": id, "email": "acc@corp.vn", "role": body["role"]}))
            }),
        )
        .route(&api_path("/leave-requests/"), get(|| async { Json(json!([])) }))
        .route(
            &api_path("/leave-requests/{id}/status"),
            put(|Json(body): Json<Value>| async move { Json(body) }),
        )
        .route(&api_path("/employees/"), get(|| async { Json(json!([])) }))
        .route(
            &api_path("/payroll/salaries/{id}"),
            put(|Json(body): Json<Value>| async move { Json(body) }),
        )
}

fn puts(seen: &[Recorded]) -> Vec<String> {
    seen.iter()
        .filter(|r| r.method == "PUT")
        .map(|r| r.path.clone())
        .collect()
}

#[tokio::test]
async fn role_change_goes_to_the_role_endpoint() {
    let (router, recorder) = recording(edit_service());
    let base = spawn_backend(router).await;
    let token = valid_token(Role::Admin, None);
    let (state, _) = client_state(&base, memory_storage(Some(&token)));

    let outcome = state
        .controller::<Users>()
        .update(&5, &RoleUpdate { role: Role::HrManager })
        .await;

    assert_eq!(outcome, MutationOutcome::Applied);
    assert_eq!(puts(&recorder.lock()), vec![api_path("/users/5/role")]);
}

#[tokio::test]
async fn leave_decision_goes_to_the_status_endpoint() {
    let (router, recorder) = recording(edit_service());
    let base = spawn_backend(router).await;
    let token = valid_token(Role::HrManager, None);
    let (state, _) = client_state(&base, memory_storage(Some(&token)));

    let outcome = state
        .controller::<LeaveRequests>()
        .update(
            &2,
            &LeaveDecision {
                status: LEAVE_APPROVED.into(),
                rejection_reason: None,
            },
        )
        .await;

    assert_eq!(outcome, MutationOutcome::Applied);
    assert_eq!(puts(&recorder.lock()), vec![api_path("/leave-requests/2/status")]);
}

#[tokio::test]
async fn payroll_edit_targets_the_salary_record() {
    let (router, recorder) = recording(edit_service());
    let base = spawn_backend(router).await;
    let token = valid_token(Role::PayrollManager, None);
    let (state, _) = client_state(&base, memory_storage(Some(&token)));

    let outcome = state
        .controller::<Payroll>()
        .update(
            &SalaryId(80),
            &SalaryUpdate {
                bonus: Some(250_000.0),
                ..SalaryUpdate::default()
            },
        )
        .await;

    assert_eq!(outcome, MutationOutcome::Applied);
    assert_eq!(puts(&recorder.lock()), vec![api_path("/payroll/salaries/80")]);
}

// --- Operations The Backend Does Not Serve ---

fn list_only_service() -> Router {
    Router::new()
        .route(
            &api_path("/departments/"),
            get(|| async { Json(json!([{"DepartmentID": 3, "DepartmentName": "Kho"}])) }),
        )
        .route(&api_path("/shareholders/"), get(|| async { Json(json!([])) }))
}

#[tokio::test]
async fn department_detail_is_refused_without_a_request() {
    let (router, recorder) = recording(list_only_service());
    let base = spawn_backend(router).await;
    let token = valid_token(Role::HrManager, None);
    let (state, notices) = client_state(&base, memory_storage(Some(&token)));
    let controller = state.controller::<Departments>();

    controller.select(3).await;

    let page = controller.state();
    assert_eq!(page.selected, None);
    assert!(!page.detail_loading);
    assert_eq!(
        notices.errors(),
        vec!["the detail view is not available for departments".to_string()]
    );
    assert!(recorder.lock().is_empty());
}

#[tokio::test]
async fn shareholder_delete_is_refused_before_confirmation() {
    let (router, recorder) = recording(list_only_service());
    let base = spawn_backend(router).await;
    let token = valid_token(Role::PayrollManager, None);
    let (state, _) = client_state(&base, memory_storage(Some(&token)));
    let asked = Mutex::new(false);

    let outcome = state
        .controller::<Shareholders>()
        .delete(&5, "Lan", &|_: &str| {
            *asked.lock() = true;
            true
        })
        .await;

    assert_eq!(
        outcome,
        MutationOutcome::Failed("deleting is not available for shareholders".into())
    );
    assert!(!*asked.lock());
    assert!(recorder.lock().is_empty());
}

#[tokio::test]
async fn payroll_gateway_cannot_create_employees() {
    let (router, recorder) = recording(list_only_service());
    let base = spawn_backend(router).await;
    let (state, _) = client_state(&base, memory_storage(None));

    let err = state
        .gateway::<Payroll>()
        .create(&CreateEmployeeRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(recorder.lock().is_empty());
}
