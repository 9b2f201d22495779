use std::time::Duration;

use moka::future::Cache;
use sqlx::MySqlPool;
use tracing::{debug, info};

use crate::model::setting::{OFFICE_IP_KEY, Setting};

/// Rules the punch validator needs from company settings, resolved once per
/// request and passed in explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendancePolicy {
    /// Empty means any address may punch from the office.
    pub office_ips: Vec<String>,
}

impl AttendancePolicy {
    pub fn from_office_ip_setting(value: Option<&str>) -> Self {
        let office_ips = value
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string)
            .collect();

        AttendancePolicy { office_ips }
    }

    pub fn allows_office_ip(&self, ip: &str) -> bool {
        self.office_ips.is_empty() || self.office_ips.iter().any(|allowed| allowed == ip.trim())
    }
}

/// Key/value company settings backed by the `settings` table with a
/// TTL-bounded read cache. Writes go through the store so the cached entry
/// is dropped immediately.
#[derive(Clone)]
pub struct SettingsStore {
    pool: MySqlPool,
    cache: Cache<String, Option<String>>,
}

impl SettingsStore {
    pub fn new(pool: MySqlPool, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(ttl)
            .build();

        SettingsStore { pool, cache }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, std::sync::Arc<sqlx::Error>> {
        let pool = self.pool.clone();
        let owned_key = key.to_string();

        self.cache
            .try_get_with(key.to_string(), async move {
                debug!(key = %owned_key, "Loading setting from database");
                sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE `key` = ?")
                    .bind(&owned_key)
                    .fetch_optional(&pool)
                    .await
            })
            .await
    }

    pub async fn list(&self) -> Result<Vec<Setting>, sqlx::Error> {
        sqlx::query_as::<_, Setting>("SELECT `key`, value FROM settings ORDER BY `key`")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO settings (`key`, value) VALUES (?, ?)
            ON DUPLICATE KEY UPDATE value = VALUES(value)
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        self.cache.invalidate(key).await;
        info!(key, "Setting updated");
        Ok(())
    }

    pub async fn attendance_policy(
        &self,
    ) -> Result<AttendancePolicy, std::sync::Arc<sqlx::Error>> {
        let office_ip = self.get(OFFICE_IP_KEY).await?;
        Ok(AttendancePolicy::from_office_ip_setting(office_ip.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_setting_allows_any_ip() {
        for raw in [None, Some(""), Some(" , ")] {
            let policy = AttendancePolicy::from_office_ip_setting(raw);
            assert!(policy.office_ips.is_empty());
            assert!(policy.allows_office_ip("203.0.113.9"));
        }
    }

    #[test]
    fn allow_list_is_trimmed_and_exact() {
        let policy = AttendancePolicy::from_office_ip_setting(Some("10.0.0.5, 10.0.0.6"));
        assert_eq!(policy.office_ips, vec!["10.0.0.5", "10.0.0.6"]);
        assert!(policy.allows_office_ip("10.0.0.6"));
        assert!(policy.allows_office_ip("10.0.0.5"));
        assert!(!policy.allows_office_ip("10.0.0.7"));
        assert!(!policy.allows_office_ip("10.0.0.55"));
    }
}
