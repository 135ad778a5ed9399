use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{AccessClaims, EmployeeRole};

pub fn validate_access_token(
    token: &str,
    secret: &str,
    expected_issuer: Option<&str>,
) -> Result<AccessClaims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    if let Some(issuer) = expected_issuer {
        validation.set_issuer(&[issuer]);
    }

    let token_data = decode::<AccessClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| format!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

/// Mint an access token. Issuance normally belongs to the identity service;
/// this exists for trusted issuers and test harnesses sharing the secret.
pub fn sign_access_token(
    employee_id: i32,
    role: EmployeeRole,
    secret: &str,
    issuer: Option<&str>,
    ttl: chrono::Duration,
) -> Result<String, String> {
    let now = chrono::Utc::now().timestamp();
    let claims = AccessClaims {
        sub: employee_id.to_string(),
        exp: now + ttl.num_seconds(),
        iat: now,
        iss: issuer.map(str::to_string),
        role,
    };

    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| format!("Failed to sign access token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    #[test]
    fn test_sign_and_validate_token() {
        let token = sign_access_token(123, EmployeeRole::Manager, SECRET, None, Duration::minutes(5)).unwrap();
        let claims = validate_access_token(&token, SECRET, None).unwrap();

        assert_eq!(claims.sub, "123");
        assert_eq!(claims.role, EmployeeRole::Manager);
    }

    #[test]
    fn test_token_with_wrong_secret() {
        let token = sign_access_token(123, EmployeeRole::Employee, SECRET, None, Duration::minutes(5)).unwrap();
        let result = validate_access_token(&token, "wrong_secret_key_entirely", None);

        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token() {
        let token = sign_access_token(123, EmployeeRole::Employee, SECRET, None, Duration::minutes(-10)).unwrap();

        assert!(validate_access_token(&token, SECRET, None).is_err());
    }

    #[test]
    fn test_issuer_is_checked_when_configured() {
        let token = sign_access_token(7, EmployeeRole::Employee, SECRET, Some("https://id.other"), Duration::minutes(5)).unwrap();

        assert!(validate_access_token(&token, SECRET, Some("https://id.rota")).is_err());
        assert!(validate_access_token(&token, SECRET, Some("https://id.other")).is_ok());
    }

    #[test]
    fn test_role_defaults_to_employee() {
        let claims: AccessClaims = serde_json::from_str(r#"{"sub":"1","exp":0,"iat":0}"#).unwrap();
        assert_eq!(claims.role, EmployeeRole::Employee);
    }
}
