pub mod daily_report;
pub mod dashboard;
pub mod day_status;
pub mod monthly_report;
pub mod punch;
pub mod settings_store;
