use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

// --- Authentication ---

/// TokenResponse
///
/// Body of a successful `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// --- Organisation (Departments & Positions) ---

/// Department
///
/// Reference data for employee filters and the organisation page. Field names follow the HR
/// database columns the API exposes verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Department {
    #[serde(rename = "DepartmentID")]
    pub id: i64,
    #[serde(rename = "DepartmentName")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DepartmentInput {
    #[serde(rename = "DepartmentName")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    #[serde(rename = "PositionID")]
    pub id: i64,
    #[serde(rename = "PositionName")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PositionInput {
    #[serde(rename = "PositionName")]
    pub name: String,
}

// --- Employees ---

/// The employment statuses offered by the employee status filter.
pub const EMPLOYEE_STATUSES: [&str; 4] = ["Đang làm việc", "Nghỉ phép", "Thử việc", "Thực tập"];

/// Employee
///
/// Summary row of the employee list. `department`/`position` are nested server-side; `role`
/// and `auth_user_id` describe the linked login account, when there is one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Employee {
    #[serde(rename = "EmployeeID")]
    pub id: i64,
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "DateOfBirth")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "HireDate")]
    pub hire_date: Option<NaiveDate>,
    #[serde(rename = "DepartmentID")]
    pub department_id: i64,
    #[serde(rename = "PositionID")]
    pub position_id: i64,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Gender", default)]
    pub gender: Option<String>,
    #[serde(rename = "PhoneNumber", default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub auth_user_id: Option<i64>,
}

/// EmployeeProfile
///
/// Detail view of one employee, with salary and attendance history assembled by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EmployeeProfile {
    #[serde(flatten)]
    pub employee: Employee,
    #[serde(default)]
    pub salaries: Vec<Salary>,
    #[serde(default)]
    pub attendances: Vec<Attendance>,
}

/// CreateEmployeeRequest
///
/// Input payload for `POST /employees/`. The password seeds the linked login account.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateEmployeeRequest {
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "DateOfBirth")]
    pub date_of_birth: NaiveDate,
    #[serde(rename = "HireDate")]
    pub hire_date: NaiveDate,
    #[serde(rename = "DepartmentID")]
    pub department_id: i64,
    #[serde(rename = "PositionID")]
    pub position_id: i64,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Gender", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(rename = "PhoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub password: String,
}

/// UpdateEmployeeRequest
///
/// Partial update for `PUT /employees/{id}`; absent fields are left untouched by the server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateEmployeeRequest {
    #[serde(rename = "FullName", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(rename = "DepartmentID", skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(rename = "PositionID", skip_serializing_if = "Option::is_none")]
    pub position_id: Option<i64>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "PhoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

// --- Payroll ---

/// Salary
///
/// One monthly payslip. Money columns arrive as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Salary {
    #[serde(rename = "SalaryID")]
    pub id: i64,
    #[serde(rename = "SalaryMonth")]
    pub month: NaiveDate,
    #[serde(rename = "BaseSalary", with = "amount")]
    pub base_salary: f64,
    #[serde(rename = "Bonus", with = "amount")]
    pub bonus: f64,
    #[serde(rename = "Deductions", with = "amount")]
    pub deductions: f64,
    #[serde(rename = "NetSalary", with = "amount")]
    pub net_salary: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SalaryUpdate {
    #[serde(rename = "BaseSalary", skip_serializing_if = "Option::is_none")]
    pub base_salary: Option<f64>,
    #[serde(rename = "Bonus", skip_serializing_if = "Option::is_none")]
    pub bonus: Option<f64>,
    #[serde(rename = "Deductions", skip_serializing_if = "Option::is_none")]
    pub deductions: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Attendance {
    #[serde(rename = "AttendanceID")]
    pub id: i64,
    #[serde(rename = "AttendanceMonth")]
    pub month: NaiveDate,
    #[serde(rename = "WorkDays")]
    pub work_days: i32,
    #[serde(rename = "AbsentDays")]
    pub absent_days: i32,
    #[serde(rename = "LeaveDays")]
    pub leave_days: i32,
}

// --- Accounts ---

/// UserAccount
///
/// A login account as listed on the account management page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub employee_id_link: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id_link: Option<i64>,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordReset {
    pub new_password: String,
}

// --- Shareholders & Dividends ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Shareholder {
    #[serde(rename = "ShareholderID")]
    pub id: i64,
    #[serde(rename = "EmployeeID")]
    pub employee_id: i64,
    #[serde(rename = "Shares")]
    pub shares: i64,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "FullName", default)]
    pub full_name: Option<String>,
    #[serde(rename = "DepartmentName", default)]
    pub department_name: Option<String>,
    #[serde(rename = "SharePercentage", default)]
    pub share_percentage: f64,
    #[serde(rename = "UnpaidDividend", default, with = "amount_opt")]
    pub unpaid_dividend: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareholderInput {
    #[serde(rename = "EmployeeID")]
    pub employee_id: i64,
    #[serde(rename = "Shares")]
    pub shares: i64,
    #[serde(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendPreviewRequest {
    pub total_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendItem {
    pub employee_id: i64,
    pub full_name: String,
    pub department_name: String,
    pub shares: i64,
    pub percentage: f64,
    #[serde(with = "amount")]
    pub dividend_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendPayoutPreview {
    pub total_shares: i64,
    #[serde(with = "amount")]
    pub dividend_per_share: f64,
    pub payout_list: Vec<DividendItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendPayoutConfirm {
    pub title: String,
    pub payment_date: NaiveDate,
    pub payout_list: Vec<DividendItem>,
}

/// Acknowledgement returned by action endpoints (payout, finalisation, payslip email).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ActionMessage {
    #[serde(default)]
    pub message: String,
}

// --- Leave Requests ---

pub const LEAVE_APPROVED: &str = "Approved";
pub const LEAVE_REJECTED: &str = "Rejected";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    #[serde(rename = "RequestID")]
    pub id: i64,
    #[serde(rename = "EmployeeID")]
    pub employee_id: i64,
    #[serde(rename = "EmployeeName", default)]
    pub employee_name: Option<String>,
    #[serde(rename = "DepartmentName", default)]
    pub department_name: Option<String>,
    #[serde(rename = "LeaveType")]
    pub leave_type: String,
    #[serde(rename = "StartDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "EndDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequestInput {
    #[serde(rename = "LeaveType")]
    pub leave_type: String,
    #[serde(rename = "StartDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "EndDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "Reason")]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveDecision {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "RejectionReason", skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

// --- System Administration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: i64,
    pub user_email: String,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfigUpdate {
    pub value: String,
}

// --- Notifications ---

/// Notification
///
/// `type` is a reserved keyword in Rust, so the field is renamed on the Rust side only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub role_target: Option<String>,
    #[serde(default)]
    pub related_employee_id: Option<i64>,
}

/// amount
///
/// Money columns are `Decimal` on the server, which serialises them as JSON strings
/// (`"1500000.00"`); older endpoints send plain numbers. Both are accepted.
mod amount {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Raw {
        Number(f64),
        Text(String),
    }

    impl Raw {
        pub(super) fn into_f64<E: Error>(self) -> Result<f64, E> {
            match self {
                Raw::Number(n) => Ok(n),
                Raw::Text(s) => s
                    .trim()
                    .parse()
                    .map_err(|_| E::custom(format!("invalid amount {s:?}"))),
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Raw::deserialize(deserializer)?.into_f64()
    }
}

mod amount_opt {
    use super::amount::Raw;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            Some(raw) => raw.into_f64().map(Some),
            None => Ok(None),
        }
    }
}
