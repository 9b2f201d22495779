pub mod activity_log;
pub mod attendance;
pub mod award;
pub mod employee;
pub mod holiday;
pub mod leave_request;
pub mod role;
pub mod setting;
