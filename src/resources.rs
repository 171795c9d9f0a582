use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::{self, Display};
use std::sync::Arc;

use crate::{
    api::ApiClient,
    auth::Role,
    controller::ListQuery,
    error::ApiError,
    models::{
        CreateEmployeeRequest, CreateUserRequest, Department, DepartmentInput, Employee,
        EmployeeProfile, EMPLOYEE_STATUSES, LeaveDecision, LeaveRequest, LeaveRequestInput,
        Position, PositionInput, RoleUpdate, SalaryUpdate, Shareholder, ShareholderInput,
        UpdateEmployeeRequest, UserAccount,
    },
};

/// Reference lists a list page loads once on mount to populate its filter dropdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceSource {
    Departments,
    Positions,
    Roles,
    EmployeeStatuses,
}

/// ReferenceData
///
/// Filter options for one page. Sources the page did not ask for stay empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub departments: Vec<Department>,
    pub positions: Vec<Position>,
    pub roles: Vec<Role>,
    pub statuses: Vec<String>,
}

/// Operations a page may offer on top of listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Detail,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Detail => "the detail view",
            Operation::Create => "creating",
            Operation::Update => "editing",
            Operation::Delete => "deleting",
        })
    }
}

/// Capabilities
///
/// Which operations the backend actually serves for a resource. Listing is always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub detail: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl Capabilities {
    pub const FULL: Self = Self {
        detail: true,
        create: true,
        update: true,
        delete: true,
    };

    /// Create and edit, no per-item endpoints otherwise.
    pub const WRITABLE: Self = Self {
        detail: false,
        create: true,
        update: true,
        delete: false,
    };

    pub const fn supports(self, operation: Operation) -> bool {
        match operation {
            Operation::Detail => self.detail,
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

/// Resource
///
/// Describes one management page's entity to the generic list/detail controller: its wire
/// types, where it lives in the API, which filters it accepts and which operations exist.
///
/// `Id` addresses a row (detail, delete). `UpdateKey` addresses what an edit writes to,
/// which for most resources is the row itself.
pub trait Resource: Send + Sync + 'static {
    type Id: Display + Clone + PartialEq + Send + Sync + 'static;
    type UpdateKey: Display + Clone + Send + Sync + 'static;
    type Summary: DeserializeOwned + Clone + Send + Sync + 'static;
    type Detail: DeserializeOwned + Clone + Send + Sync + 'static;
    type Create: Serialize + Send + Sync + 'static;
    type Update: Serialize + Send + Sync + 'static;

    /// Plural, human-readable name used in notices ("employees").
    const NAME: &'static str;
    /// Collection endpoint, with the trailing slash the API routes are declared with.
    const COLLECTION: &'static str;
    const CAPABILITIES: Capabilities;
    /// Filter keys the list endpoint accepts besides `search`.
    const FILTER_KEYS: &'static [&'static str] = &[];

    fn reference_sources() -> &'static [ReferenceSource] {
        &[]
    }

    fn item_path(id: &Self::Id) -> String {
        format!("{}{}", Self::COLLECTION, id)
    }

    fn update_path(key: &Self::UpdateKey) -> String {
        format!("{}{}", Self::COLLECTION, key)
    }
}

/// ensure_supported
///
/// Refuses locally, as `ApiError::InvalidInput`, an operation the backend has no endpoint for.
pub fn ensure_supported<R: Resource>(operation: Operation) -> Result<(), ApiError> {
    if R::CAPABILITIES.supports(operation) {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!(
            "{operation} is not available for {}",
            R::NAME
        )))
    }
}

// --- Concrete Resources ---

/// Employee records (HR).
pub struct Employees;

impl Resource for Employees {
    type Id = i64;
    type UpdateKey = i64;
    type Summary = Employee;
    type Detail = EmployeeProfile;
    type Create = CreateEmployeeRequest;
    type Update = UpdateEmployeeRequest;

    const NAME: &'static str = "employees";
    const COLLECTION: &'static str = "/employees/";
    const CAPABILITIES: Capabilities = Capabilities::FULL;
    const FILTER_KEYS: &'static [&'static str] = &["department_id", "position_id", "status"];

    fn reference_sources() -> &'static [ReferenceSource] {
        &[
            ReferenceSource::Departments,
            ReferenceSource::Positions,
            ReferenceSource::EmployeeStatuses,
        ]
    }
}

/// Login accounts (administration). Updates change the account's role.
pub struct Users;

impl Resource for Users {
    type Id = i64;
    type UpdateKey = i64;
    type Summary = UserAccount;
    type Detail = UserAccount;
    type Create = CreateUserRequest;
    type Update = RoleUpdate;

    const NAME: &'static str = "accounts";
    const COLLECTION: &'static str = "/users/";
    const CAPABILITIES: Capabilities = Capabilities::WRITABLE;
    const FILTER_KEYS: &'static [&'static str] = &["role"];

    fn reference_sources() -> &'static [ReferenceSource] {
        &[ReferenceSource::Roles]
    }

    fn update_path(id: &i64) -> String {
        format!("/users/{id}/role")
    }
}

pub struct Departments;

impl Resource for Departments {
    type Id = i64;
    type UpdateKey = i64;
    type Summary = Department;
    type Detail = Department;
    type Create = DepartmentInput;
    type Update = DepartmentInput;

    const NAME: &'static str = "departments";
    const COLLECTION: &'static str = "/departments/";
    const CAPABILITIES: Capabilities = Capabilities {
        detail: false,
        ..Capabilities::FULL
    };
}

pub struct Positions;

impl Resource for Positions {
    type Id = i64;
    type UpdateKey = i64;
    type Summary = Position;
    type Detail = Position;
    type Create = PositionInput;
    type Update = PositionInput;

    const NAME: &'static str = "positions";
    const COLLECTION: &'static str = "/positions/";
    const CAPABILITIES: Capabilities = Capabilities {
        detail: false,
        ..Capabilities::FULL
    };
}

/// Shareholder register. Holdings are only ever added; there is no per-holder endpoint.
pub struct Shareholders;

impl Resource for Shareholders {
    type Id = i64;
    type UpdateKey = i64;
    type Summary = Shareholder;
    type Detail = Shareholder;
    type Create = ShareholderInput;
    type Update = ShareholderInput;

    const NAME: &'static str = "shareholders";
    const COLLECTION: &'static str = "/shareholders/";
    const CAPABILITIES: Capabilities = Capabilities {
        create: true,
        detail: false,
        update: false,
        delete: false,
    };
}

/// SalaryId
///
/// Key of one monthly salary record. Distinct from the employee ids the payroll list is
/// made of, so an edit cannot be aimed at an employee by mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SalaryId(pub i64);

impl fmt::Display for SalaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payroll
///
/// The payroll page lists employees (filtered by department) and opens an employee's profile
/// to review the salary history. Its edits target individual salary records by `SalaryId`.
/// Employees are created and removed on the employee page, never here.
pub struct Payroll;

impl Resource for Payroll {
    type Id = i64;
    type UpdateKey = SalaryId;
    type Summary = Employee;
    type Detail = EmployeeProfile;
    type Create = CreateEmployeeRequest;
    type Update = SalaryUpdate;

    const NAME: &'static str = "payroll records";
    const COLLECTION: &'static str = "/employees/";
    const CAPABILITIES: Capabilities = Capabilities {
        detail: true,
        create: false,
        update: true,
        delete: false,
    };
    const FILTER_KEYS: &'static [&'static str] = &["department_id"];

    fn reference_sources() -> &'static [ReferenceSource] {
        &[ReferenceSource::Departments]
    }

    fn update_path(salary_id: &SalaryId) -> String {
        format!("/payroll/salaries/{salary_id}")
    }
}

/// Leave requests awaiting approval. Updates are approve/reject decisions.
pub struct LeaveRequests;

impl Resource for LeaveRequests {
    type Id = i64;
    type UpdateKey = i64;
    type Summary = LeaveRequest;
    type Detail = LeaveRequest;
    type Create = LeaveRequestInput;
    type Update = LeaveDecision;

    const NAME: &'static str = "leave requests";
    const COLLECTION: &'static str = "/leave-requests/";
    const CAPABILITIES: Capabilities = Capabilities::WRITABLE;

    fn update_path(id: &i64) -> String {
        format!("/leave-requests/{id}/status")
    }
}

// --- Gateway ---

/// ResourceGateway
///
/// The controller's only view of the server. Mutations report success or the server's
/// reason; their response bodies are not used because the controller re-fetches the list.
#[async_trait]
pub trait ResourceGateway<R: Resource>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Vec<R::Summary>, ApiError>;
    async fn detail(&self, id: &R::Id) -> Result<R::Detail, ApiError>;
    async fn create(&self, input: &R::Create) -> Result<(), ApiError>;
    async fn update(&self, key: &R::UpdateKey, input: &R::Update) -> Result<(), ApiError>;
    async fn delete(&self, id: &R::Id) -> Result<(), ApiError>;
    async fn reference_data(&self) -> Result<ReferenceData, ApiError>;
}

pub type GatewayState<R> = Arc<dyn ResourceGateway<R>>;

/// HttpGateway
///
/// `ResourceGateway` over the API client, for every `Resource`. Operations missing from
/// `Resource::CAPABILITIES` fail with `InvalidInput` without a request.
#[derive(Clone)]
pub struct HttpGateway {
    api: Arc<ApiClient>,
}

impl HttpGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl<R: Resource> ResourceGateway<R> for HttpGateway {
    async fn list(&self, query: &ListQuery) -> Result<Vec<R::Summary>, ApiError> {
        self.api.get_json(R::COLLECTION, &query.to_params()).await
    }

    async fn detail(&self, id: &R::Id) -> Result<R::Detail, ApiError> {
        ensure_supported::<R>(Operation::Detail)?;
        self.api.get_json(&R::item_path(id), &[]).await
    }

    async fn create(&self, input: &R::Create) -> Result<(), ApiError> {
        ensure_supported::<R>(Operation::Create)?;
        self.api
            .post_json::<_, serde_json::Value>(R::COLLECTION, input)
            .await
            .map(|_| ())
    }

    async fn update(&self, key: &R::UpdateKey, input: &R::Update) -> Result<(), ApiError> {
        ensure_supported::<R>(Operation::Update)?;
        self.api
            .put_json::<_, serde_json::Value>(&R::update_path(key), input)
            .await
            .map(|_| ())
    }

    async fn delete(&self, id: &R::Id) -> Result<(), ApiError> {
        ensure_supported::<R>(Operation::Delete)?;
        self.api.delete(&R::item_path(id)).await
    }

    async fn reference_data(&self) -> Result<ReferenceData, ApiError> {
        fetch_reference_data(&self.api, R::reference_sources()).await
    }
}

/// fetch_reference_data
///
/// Loads the requested reference lists concurrently. Roles and statuses are fixed sets and
/// need no request.
pub async fn fetch_reference_data(
    api: &ApiClient,
    sources: &[ReferenceSource],
) -> Result<ReferenceData, ApiError> {
    let wants = |source: ReferenceSource| sources.contains(&source);

    let departments = async {
        if wants(ReferenceSource::Departments) {
            api.get_json::<Vec<Department>>(Departments::COLLECTION, &[]).await
        } else {
            Ok(Vec::new())
        }
    };
    let positions = async {
        if wants(ReferenceSource::Positions) {
            api.get_json::<Vec<Position>>(Positions::COLLECTION, &[]).await
        } else {
            Ok(Vec::new())
        }
    };

    let (departments, positions) = tokio::try_join!(departments, positions)?;

    Ok(ReferenceData {
        departments,
        positions,
        roles: if wants(ReferenceSource::Roles) {
            Role::ALL.to_vec()
        } else {
            Vec::new()
        },
        statuses: if wants(ReferenceSource::EmployeeStatuses) {
            EMPLOYEE_STATUSES.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        },
    })
}
