use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub public_dir: PathBuf,
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind = env::var("WANDER_BIND").unwrap_or_else(|_| {
            let port = env::var("PORT")
                .ok()
                .and_then(|value| value.trim().parse::<u16>().ok())
                .unwrap_or(5001);
            format!("0.0.0.0:{port}")
        });
        let public_dir = env::var("WANDER_PUBLIC_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("public"));

        Self {
            bind,
            public_dir,
            allowed_origins: parse_allowed_origins(
                env::var("WANDER_ALLOWED_ORIGINS").unwrap_or_default().as_str(),
            ),
        }
    }
}

fn parse_allowed_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
