pub mod activity_logger;
pub mod client_ip;
pub mod dates;
pub mod db_utils;
pub mod pagination;
