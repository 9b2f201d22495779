use crate::api::activity_log::ActivityLogPage;
use crate::api::employee::EmployeeListResponse;
use crate::api::holiday::CreateHoliday;
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse};
use crate::api::settings::UpdateSetting;
use crate::model::activity_log::ActivityLog;
use crate::model::attendance::{AttendanceRecord, RecordStatus, WorkLocation};
use crate::model::award::Award;
use crate::model::employee::{Employee, EmployeeProfile};
use crate::model::holiday::Holiday;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::setting::Setting;
use crate::service::daily_report::DailyReportRow;
use crate::service::dashboard::{
    ActiveEmployee, AttendanceSummary, DashboardStats, EventKind, LocationBreakdown, TaskStats,
    UpcomingEvent,
};
use crate::service::day_status::AttendanceStatus;
use crate::service::monthly_report::{MonthlyReportEntry, MonthlyReportQuery};
use crate::service::punch::PunchRequest;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OpsDesk API",
        version = "1.0.0",
        description = r#"
## Company Operations: Attendance & Reporting

### 🔹 Key Features
- **Attendance**
  - Punch in / punch out with office IP and work-from-home checks
  - Daily report for all employees, per-employee report over a date range
- **Dashboard**
  - Presence counts, work-location breakdown, who is checked in right now, upcoming holidays and birthdays
- **Leave, Holidays, Employees, Settings**
  - Everything the attendance status is derived from

### 🔐 Security
Every endpoint expects a **JWT Bearer** access token and checks a `module:action` permission.

### 📦 Response Format
- JSON, camelCase fields
- Errors: `{"status": <code>, "message": "..."}`
"#,
    ),
    paths(
        crate::api::attendance::punch_in,
        crate::api::attendance::punch_out,
        crate::api::attendance::active_session,
        crate::api::attendance::daily_report,
        crate::api::attendance::employee_monthly_report,

        crate::api::dashboard::stats,

        crate::api::settings::list_settings,
        crate::api::settings::get_setting,
        crate::api::settings::update_setting,

        crate::api::holiday::list_holidays,
        crate::api::holiday::create_holiday,
        crate::api::holiday::update_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_profile,

        crate::api::activity_log::list_activity_logs
    ),
    components(
        schemas(
            AttendanceRecord,
            WorkLocation,
            RecordStatus,
            PunchRequest,
            AttendanceStatus,
            DailyReportRow,
            MonthlyReportQuery,
            MonthlyReportEntry,
            DashboardStats,
            AttendanceSummary,
            TaskStats,
            LocationBreakdown,
            ActiveEmployee,
            UpcomingEvent,
            EventKind,
            ActivityLog,
            Award,
            Setting,
            UpdateSetting,
            Holiday,
            CreateHoliday,
            LeaveRequest,
            LeaveStatus,
            CreateLeave,
            LeaveFilter,
            LeaveListResponse,
            Employee,
            EmployeeProfile,
            EmployeeListResponse,
            ActivityLogPage
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Punching and attendance reports"),
        (name = "Dashboard", description = "Aggregated company statistics"),
        (name = "Settings", description = "Company settings"),
        (name = "Holiday", description = "Company holidays"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Employee", description = "Employee directory and profiles"),
        (name = "ActivityLog", description = "Audit trail of state-changing requests"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
