#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    pub frontend_url: String,
    pub gemini_url: String,
    pub gemini_model: String,
    pub gemini_api_key: String,
    pub reconcile_cron: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");

        let database_max_connections = env_or("DATABASE_MAX_CONNECTIONS", "10");
        let port = env_or("PORT", "8000");
        let frontend_url = env_or("FRONTEND_URL", "http://localhost:5173");
        let gemini_url = env_or("GEMINI_URL", "https://generativelanguage.googleapis.com");
        let gemini_model = env_or("GEMINI_MODEL", "gemini-2.0-flash");
        let gemini_api_key = env_or("GEMINI_API_KEY", "");
        let reconcile_cron = env_or("RECONCILE_CRON", "0 0 * * * *");

        Config {
            database_url,
            database_max_connections: database_max_connections
                .parse::<u32>()
                .expect("DATABASE_MAX_CONNECTIONS must be a number"),
            jwt_secret,
            jwt_maxage: jwt_maxage
                .parse::<i64>()
                .expect("JWT_MAXAGE must be a number of seconds"),
            port: port.parse::<u16>().expect("PORT must be a valid port"),
            frontend_url,
            gemini_url,
            gemini_model,
            gemini_api_key,
            reconcile_cron,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
