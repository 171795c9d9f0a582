use serde_json::Value;
use std::sync::Arc;

use crate::{
    api::ApiClient,
    error::ApiError,
    models::{
        ActionMessage, Attendance, AuditLog, DividendPayoutConfirm, DividendPayoutPreview,
        DividendPreviewRequest, LeaveDecision, LeaveRequest, LeaveRequestInput, PasswordReset,
        Salary, SalaryUpdate, SystemConfig, SystemConfigUpdate,
    },
};

/// Endpoints
///
/// Typed calls for the pages that are not plain list/detail screens: the dashboard, the
/// payroll actions, dividend payouts, leave decisions and system administration.
///
/// Every call is a thin wrapper over `ApiClient`; authorisation and the 401 handling come from
/// the client, and errors are returned to the caller unchanged.
#[derive(Clone)]
pub struct Endpoints {
    api: Arc<ApiClient>,
}

impl Endpoints {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    // --- Reports ---

    /// dashboard_summary
    ///
    /// Aggregates for the dashboard charts (headcount and status distribution, payroll budget
    /// and trend, dividends). The shape is owned by the server, so it stays untyped JSON.
    pub async fn dashboard_summary(&self) -> Result<Value, ApiError> {
        self.api.get_json("/reports/dashboard-summary", &[]).await
    }

    /// Total dividends paid, shareholder count and the top recipients.
    pub async fn dividend_summary(&self) -> Result<Value, ApiError> {
        self.api.get_json("/reports/dividend_summary", &[]).await
    }

    // --- Payroll ---

    /// Salary history of one employee. Also what an employee sees on "my payslips".
    pub async fn salaries(&self, employee_id: i64) -> Result<Vec<Salary>, ApiError> {
        self.api
            .get_json(&format!("/payroll/{employee_id}/salaries"), &[])
            .await
    }

    pub async fn attendance(&self, employee_id: i64) -> Result<Vec<Attendance>, ApiError> {
        self.api
            .get_json(&format!("/payroll/{employee_id}/attendance"), &[])
            .await
    }

    pub async fn update_salary(
        &self,
        salary_id: i64,
        update: &SalaryUpdate,
    ) -> Result<Salary, ApiError> {
        self.api
            .put_json(&format!("/payroll/salaries/{salary_id}"), update)
            .await
    }

    /// finalize_payroll
    ///
    /// Locks the salary data of one period. `month` is 1-based.
    pub async fn finalize_payroll(&self, month: u32, year: i32) -> Result<ActionMessage, ApiError> {
        if !(1..=12).contains(&month) {
            return Err(ApiError::InvalidInput(format!("month out of range: {month}")));
        }
        let query = [
            ("month".to_string(), month.to_string()),
            ("year".to_string(), year.to_string()),
        ];
        self.api.post_query("/payroll/finalize", &query).await
    }

    pub async fn send_payslip_email(&self, salary_id: i64) -> Result<ActionMessage, ApiError> {
        self.api
            .post_query(&format!("/payroll/{salary_id}/send-email"), &[])
            .await
    }

    // --- Dividends ---

    /// Splits `total_profit` over the active shareholders. Nothing is recorded yet.
    pub async fn preview_dividend_payout(
        &self,
        total_profit: f64,
    ) -> Result<DividendPayoutPreview, ApiError> {
        self.api
            .post_json(
                "/shareholders/preview-payout",
                &DividendPreviewRequest { total_profit },
            )
            .await
    }

    /// Records a previewed payout.
    pub async fn confirm_dividend_payout(
        &self,
        payout: &DividendPayoutConfirm,
    ) -> Result<ActionMessage, ApiError> {
        self.api.post_json("/shareholders/confirm-payout", payout).await
    }

    // --- Leave ---

    /// Files a leave request for the signed-in employee. The server rejects accounts without a
    /// linked employee record.
    pub async fn submit_leave_request(
        &self,
        request: &LeaveRequestInput,
    ) -> Result<LeaveRequest, ApiError> {
        self.api.post_json("/leave-requests/", request).await
    }

    pub async fn decide_leave_request(
        &self,
        request_id: i64,
        decision: &LeaveDecision,
    ) -> Result<LeaveRequest, ApiError> {
        self.api
            .put_json(&format!("/leave-requests/{request_id}/status"), decision)
            .await
    }

    // --- Accounts ---

    pub async fn reset_password(&self, user_id: i64, new_password: &str) -> Result<(), ApiError> {
        self.api
            .put_no_content(
                &format!("/users/{user_id}/password"),
                &PasswordReset {
                    new_password: new_password.to_string(),
                },
            )
            .await
    }

    // --- System ---

    pub async fn audit_logs(&self, skip: u32, limit: u32) -> Result<Vec<AuditLog>, ApiError> {
        let query = [
            ("skip".to_string(), skip.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        self.api.get_json("/system/logs", &query).await
    }

    pub async fn system_configs(&self) -> Result<Vec<SystemConfig>, ApiError> {
        self.api.get_json("/system/config", &[]).await
    }

    pub async fn update_system_config(
        &self,
        key: &str,
        value: &str,
    ) -> Result<SystemConfig, ApiError> {
        self.api
            .put_json(
                &format!("/system/config/{key}"),
                &SystemConfigUpdate {
                    value: value.to_string(),
                },
            )
            .await
    }
}
