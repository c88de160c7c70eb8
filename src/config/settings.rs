use std::env;

/// Environment-driven configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mongo_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub face_api_url: String,
    pub bind_addr: String,
    pub cors_origin: String,
    pub upload_dir: String,
    /// Gate for the background election status sweep.
    pub auto_status_updates: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Settings {
            mongo_uri: env::var("MONGO_URI")?,
            database_name: env::var("DATABASE_NAME")?,
            jwt_secret: env::var("JWT_SECRET")?,
            face_api_url: env::var("FACE_API_URL")
                .unwrap_or_else(|_| "http://localhost:5001".into()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9000".into()),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
            auto_status_updates: env::var("AUTO_STATUS_UPDATES")
                .map(|v| v == "true")
                .unwrap_or(false),
        })
    }
}
