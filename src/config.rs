use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub bind_addr: String,
    pub cors_origin: String,
    /// Move accepted swaps straight to COMPLETED.
    pub auto_complete_swaps: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let store = match env::var("STORE").unwrap_or_else(|_| "postgres".to_string()).as_str() {
            "postgres" => {
                let database_url = env::var("DATABASE_URL")
                    .map_err(|_| "DATABASE_URL must be set".to_string())?;
                StoreBackend::Postgres { database_url }
            }
            "memory" => StoreBackend::Memory,
            other => return Err(format!("Unknown STORE backend: {}", other)),
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;

        if jwt_secret.len() < 16 {
            return Err("JWT_SECRET must be at least 16 characters".to_string());
        }

        let jwt_issuer = env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let auto_complete_swaps = parse_bool("SWAP_AUTO_COMPLETE", env::var("SWAP_AUTO_COMPLETE").ok())?;

        Ok(Self {
            store,
            jwt_secret,
            jwt_issuer,
            bind_addr,
            cors_origin,
            auto_complete_swaps,
        })
    }

    /// In-memory configuration for tests and local experiments.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            store: StoreBackend::Memory,
            jwt_secret: jwt_secret.into(),
            jwt_issuer: None,
            bind_addr: "127.0.0.1:0".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            auto_complete_swaps: false,
        }
    }
}

fn parse_bool(name: &str, value: Option<String>) -> Result<bool, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some("1") | Some("true") | Some("TRUE") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("FALSE") | Some("no") => Ok(false),
        Some(other) => Err(format!("{} must be a boolean, got {:?}", name, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("X", None), Ok(false));
        assert_eq!(parse_bool("X", Some("true".into())), Ok(true));
        assert_eq!(parse_bool("X", Some(" 1 ".into())), Ok(true));
        assert_eq!(parse_bool("X", Some("no".into())), Ok(false));
    }

    #[test]
    fn test_parse_bool_rejects_garbage() {
        assert!(parse_bool("SWAP_AUTO_COMPLETE", Some("maybe".into())).is_err());
    }
}
