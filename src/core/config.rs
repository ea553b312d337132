use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub storage: StorageConfig,
    pub triage: TriageConfig,
    pub whatsapp: Option<WhatsAppConfig>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Identity platform settings used to verify bearer tokens.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// S3-compatible object storage for complaint images
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3 endpoint URL
    pub endpoint: String,
    /// Endpoint used when building public image URLs (defaults to endpoint)
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
}

/// Complaint triage settings
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Upper bound for a single categorization call made after submission
    pub timeout: Duration,
    /// Attempts for persisting a prediction before giving up
    pub persist_max_attempts: u32,
    /// Initial backoff between persistence attempts, doubled per attempt
    pub persist_backoff: Duration,
    /// When set, submissions are categorized by POSTing to this URL instead of in-process
    pub function_url: Option<String>,
}

/// WhatsApp Cloud API channel; absent when `WHATSAPP_VERIFY_TOKEN` is unset
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Token Meta echoes back during webhook verification
    pub verify_token: String,
    /// Bearer token for Graph API calls
    pub access_token: String,
    /// Sender phone number id used for outgoing replies
    pub phone_number_id: String,
    pub graph_api_url: String,
    /// When set, webhook posts must carry a valid `X-Hub-Signature-256`
    pub app_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            triage: TriageConfig::from_env()?,
            whatsapp: WhatsAppConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = parse_origins(
            &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a comma-separated origin list, dropping blanks
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let issuer = env::var("AUTH_ISSUER")
            .map_err(|_| "AUTH_ISSUER environment variable is required".to_string())?;

        let audience = env::var("AUTH_AUDIENCE")
            .map_err(|_| "AUTH_AUDIENCE environment variable is required".to_string())?;

        let jwks_cache_ttl_secs = env::var("JWKS_CACHE_TTL")
            .unwrap_or_else(|_| Self::DEFAULT_JWKS_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWKS_CACHE_TTL must be a valid number".to_string())?;

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        Ok(Self {
            issuer,
            audience,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Complaint Desk API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for the citizen complaint desk".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("STORAGE_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let public_endpoint =
            env::var("STORAGE_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        let access_key =
            env::var("STORAGE_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key =
            env::var("STORAGE_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("STORAGE_BUCKET").unwrap_or_else(|_| "complaint-images".to_string());

        let region = env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key,
            secret_key,
            bucket,
            region,
        })
    }
}

impl TriageConfig {
    const DEFAULT_TIMEOUT_MS: u64 = 5000;
    const DEFAULT_PERSIST_MAX_ATTEMPTS: u32 = 3;
    const DEFAULT_PERSIST_BACKOFF_MS: u64 = 100;

    pub fn from_env() -> Result<Self, String> {
        let timeout_ms = env::var("TRIAGE_TIMEOUT_MS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "TRIAGE_TIMEOUT_MS must be a valid number".to_string())?;

        let persist_max_attempts = env::var("TRIAGE_PERSIST_MAX_ATTEMPTS")
            .unwrap_or_else(|_| Self::DEFAULT_PERSIST_MAX_ATTEMPTS.to_string())
            .parse::<u32>()
            .map_err(|_| "TRIAGE_PERSIST_MAX_ATTEMPTS must be a valid number".to_string())?;

        if persist_max_attempts == 0 {
            return Err("TRIAGE_PERSIST_MAX_ATTEMPTS must be at least 1".to_string());
        }

        let persist_backoff_ms = env::var("TRIAGE_PERSIST_BACKOFF_MS")
            .unwrap_or_else(|_| Self::DEFAULT_PERSIST_BACKOFF_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "TRIAGE_PERSIST_BACKOFF_MS must be a valid number".to_string())?;

        let function_url = env::var("TRIAGE_FUNCTION_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            timeout: Duration::from_millis(timeout_ms),
            persist_max_attempts,
            persist_backoff: Duration::from_millis(persist_backoff_ms),
            function_url,
        })
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(Self::DEFAULT_TIMEOUT_MS),
            persist_max_attempts: Self::DEFAULT_PERSIST_MAX_ATTEMPTS,
            persist_backoff: Duration::from_millis(Self::DEFAULT_PERSIST_BACKOFF_MS),
            function_url: None,
        }
    }
}

impl WhatsAppConfig {
    const DEFAULT_GRAPH_API_URL: &'static str = "https://graph.facebook.com/v18.0";

    pub fn from_env() -> Result<Option<Self>, String> {
        let Some(verify_token) = env::var("WHATSAPP_VERIFY_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
        else {
            return Ok(None);
        };

        let access_token = env::var("WHATSAPP_ACCESS_TOKEN").map_err(|_| {
            "WHATSAPP_ACCESS_TOKEN is required when WHATSAPP_VERIFY_TOKEN is set".to_string()
        })?;

        let phone_number_id = env::var("WHATSAPP_PHONE_NUMBER_ID").map_err(|_| {
            "WHATSAPP_PHONE_NUMBER_ID is required when WHATSAPP_VERIFY_TOKEN is set".to_string()
        })?;

        let graph_api_url = env::var("WHATSAPP_GRAPH_API_URL")
            .unwrap_or_else(|_| Self::DEFAULT_GRAPH_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let app_secret = env::var("WHATSAPP_APP_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Some(Self {
            verify_token,
            access_token,
            phone_number_id,
            graph_api_url,
            app_secret,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_drops_blanks() {
        let origins = parse_origins(" https://a.example , ,https://b.example,");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_triage_defaults() {
        let config = TriageConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.persist_max_attempts, 3);
        assert!(config.function_url.is_none());
    }
}
