//! Base-URL resolution per build environment.
//!
//! Development builds talk to the backend's dev server on a fixed local
//! origin. Production builds are served by the backend itself and use the
//! page's own origin.

use crate::error::ApiError;

/// Origin of the backend's development server.
pub const DEV_ORIGIN: &str = "http://localhost:8000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ApiError::InvalidConfig(format!(
                "unknown environment '{other}'; expected 'development' or 'production'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub environment: Environment,
    /// The page's own origin, used in production. `None` means same-origin
    /// relative URLs.
    pub origin: Option<String>,
}

impl ClientConfig {
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            origin: None,
        }
    }

    pub fn production(origin: Option<String>) -> Self {
        Self {
            environment: Environment::Production,
            origin,
        }
    }

    /// Read `AUCTION_ENV` and `AUCTION_ORIGIN`.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidConfig`] if `AUCTION_ENV` names an unknown
    /// environment.
    pub fn from_env() -> Result<Self, ApiError> {
        let environment = match std::env::var("AUCTION_ENV") {
            Ok(v) => v.parse()?,
            Err(_) => Environment::default(),
        };
        let origin = std::env::var("AUCTION_ORIGIN").ok().filter(|o| !o.is_empty());
        Ok(Self { environment, origin })
    }

    /// Host prefix every API path is appended to.
    pub fn base_url(&self) -> String {
        match self.environment {
            Environment::Development => DEV_ORIGIN.to_string(),
            Environment::Production => self
                .origin
                .as_deref()
                .map(|o| o.trim_end_matches('/').to_string())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_targets_local_backend() {
        assert_eq!(ClientConfig::development().base_url(), "http://localhost:8000");
    }

    #[test]
    fn production_uses_page_origin() {
        let cfg = ClientConfig::production(Some("https://auction.example.com/".to_string()));
        assert_eq!(cfg.base_url(), "https://auction.example.com");
    }

    #[test]
    fn production_without_origin_is_relative() {
        assert_eq!(ClientConfig::production(None).base_url(), "");
    }

    #[test]
    fn environment_parses_short_and_long_names() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Development".parse::<Environment>().unwrap(), Environment::Development);
        assert!(matches!(
            "staging".parse::<Environment>(),
            Err(ApiError::InvalidConfig(_))
        ));
    }

    // Single test so no other thread sees the variables change.
    #[test]
    fn from_env_reads_environment_and_origin() {
        std::env::remove_var("AUCTION_ENV");
        std::env::remove_var("AUCTION_ORIGIN");
        assert_eq!(ClientConfig::from_env().unwrap(), ClientConfig::development());

        std::env::set_var("AUCTION_ENV", "prod");
        std::env::set_var("AUCTION_ORIGIN", "");
        assert_eq!(ClientConfig::from_env().unwrap(), ClientConfig::production(None));

        std::env::set_var("AUCTION_ORIGIN", "https://auction.example.com");
        let cfg = ClientConfig::from_env().unwrap();
        assert_eq!(cfg.base_url(), "https://auction.example.com");

        std::env::set_var("AUCTION_ENV", "staging");
        assert!(matches!(ClientConfig::from_env(), Err(ApiError::InvalidConfig(_))));

        std::env::remove_var("AUCTION_ENV");
        std::env::remove_var("AUCTION_ORIGIN");
    }
}
