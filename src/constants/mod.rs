use crate::modules::friend::lifecycle::ResendPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown friend store backend `{other}`")),
        }
    }
}

pub struct Env {
    pub jwt_secret: String,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub user_cache_ttl: u64,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub friend_store_backend: StoreBackend,
    pub friend_resend_policy: ResendPolicy,
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let redis_url = std::env::var("REDIS_URL").ok().filter(|url| !url.is_empty());
        let user_cache_ttl = std::env::var("USER_CACHE_TTL")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .expect("USER_CACHE_TTL must be a valid u64 integer");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");

        let friend_store_backend = std::env::var("FRIEND_STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse::<StoreBackend>()
            .expect("FRIEND_STORE_BACKEND must be `postgres` or `memory`");
        let friend_resend_policy = std::env::var("FRIEND_RESEND_POLICY")
            .unwrap_or_else(|_| "never".to_string())
            .parse::<ResendPolicy>()
            .expect("FRIEND_RESEND_POLICY must be `never` or `after_closed`");

        Env {
            jwt_secret,
            database_url,
            redis_url,
            user_cache_ttl,
            frontend_url,
            ip,
            port,
            friend_store_backend,
            friend_resend_policy,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store_backend_names() {
        assert_eq!("postgres".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert_eq!(" Memory ".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("mongo".parse::<StoreBackend>().is_err());
    }
}
