use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Tenant code must be 3-12 uppercase alphanumeric characters, got `{code}`")]
pub struct TenantCodeError {
    pub code: String,
}

/// Short uppercase code scoping every tenant-owned record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantCode(String);

impl TenantCode {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 12;

    pub fn parse(code: &str) -> Result<Self, TenantCodeError> {
        if is_valid_tenant_code(code) {
            Ok(Self(code.to_string()))
        } else {
            Err(TenantCodeError {
                code: code.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TenantCode {
    fn default() -> Self {
        Self("WTN".to_string())
    }
}

impl fmt::Display for TenantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_valid_tenant_code(code: &str) -> bool {
    (TenantCode::MIN_LEN..=TenantCode::MAX_LEN).contains(&code.len())
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uppercase_alphanumerics() {
        for code in ["WTN", "ACME2024", "A1B2C3D4E5F6", "007"] {
            assert_eq!(TenantCode::parse(code).unwrap().as_str(), code);
        }
    }

    #[test]
    fn rejects_malformed_codes() {
        for code in ["", "AB", "ABCDEFGHIJKLM", "acme", "AC-ME", "ACME ", "ÄCME"] {
            let err = TenantCode::parse(code).unwrap_err();
            assert_eq!(err.code, code);
        }
    }

    #[test]
    fn default_code_is_valid() {
        let code = TenantCode::default();
        assert!(is_valid_tenant_code(code.as_str()));
    }

    #[test]
    fn error_message_names_the_code() {
        let err = TenantCode::parse("x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tenant code must be 3-12 uppercase alphanumeric characters, got `x`"
        );
    }
}
