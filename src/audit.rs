//! Audit metadata (`MD`) attached to every mutating stored-procedure call

use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    #[serde(rename = "MD_APP_ID")]
    pub app_id: String,
    #[serde(rename = "MD_USER_ID")]
    pub user: String,
    #[serde(rename = "MD_FINGERPRINT")]
    pub fingerprint: String,
    #[serde(rename = "MD_IP")]
    pub ip: String,
}

impl Default for AuditInfo {
    fn default() -> Self {
        Self {
            app_id: UNKNOWN.to_string(),
            user: UNKNOWN.to_string(),
            fingerprint: UNKNOWN.to_string(),
            ip: UNKNOWN.to_string(),
        }
    }
}

impl AuditInfo {
    pub fn for_app(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }
}

/// Supplies the audit record for the current caller (request, job, ...)
pub trait AuditContext: Send + Sync {
    fn audit_info(&self) -> AuditInfo;
}

/// Audit context with a fixed record
#[derive(Debug, Clone, Default)]
pub struct StaticAuditContext {
    info: AuditInfo,
}

impl StaticAuditContext {
    pub fn new(info: AuditInfo) -> Self {
        Self { info }
    }
}

impl AuditContext for StaticAuditContext {
    fn audit_info(&self) -> AuditInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_to_unknown() {
        let value = serde_json::to_value(AuditInfo::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "MD_APP_ID": "UNKNOWN",
                "MD_USER_ID": "UNKNOWN",
                "MD_FINGERPRINT": "UNKNOWN",
                "MD_IP": "UNKNOWN"
            })
        );
    }

    #[test]
    fn test_builder_overrides() {
        let info = AuditInfo::for_app("billing").with_user("u-42").with_ip("10.0.0.1");
        assert_eq!(info.app_id, "billing");
        assert_eq!(info.user, "u-42");
        assert_eq!(info.fingerprint, UNKNOWN);
        assert_eq!(info.ip, "10.0.0.1");
        assert_eq!(StaticAuditContext::new(info.clone()).audit_info(), info);
    }
}
