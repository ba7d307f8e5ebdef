use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub uploads_dir: PathBuf,
    pub public_rps: u32,
    pub max_upload_bytes: usize,
    pub translate_api_url: String,
    pub translate_api_key: Option<String>,
    pub mymemory_api_url: String,
    pub translation_cache_capacity: usize,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: "0.0.0.0:5000".to_string(),
            database_url: None,
            uploads_dir: PathBuf::from("./uploads"),
            public_rps: 100,
            max_upload_bytes: 20 * 1024 * 1024,
            translate_api_url: "https://libretranslate.com/translate".to_string(),
            translate_api_key: None,
            mymemory_api_url: "https://api.mymemory.translated.net/get".to_string(),
            translation_cache_capacity: 1024,
            openai_api_key: None,
            openai_model: "gpt-3.5-turbo".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            server_address: env::var("SERVER_ADDRESS").unwrap_or(defaults.server_address),
            database_url: get_env_opt("DATABASE_URL"),
            uploads_dir: get_env_opt("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.uploads_dir),
            public_rps: get_env_parse_or("PUBLIC_RPS", defaults.public_rps)?,
            max_upload_bytes: get_env_parse_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            translate_api_url: get_env_opt("TRANSLATE_API_URL")
                .unwrap_or(defaults.translate_api_url),
            translate_api_key: get_env_opt("TRANSLATE_API_KEY"),
            mymemory_api_url: get_env_opt("MYMEMORY_API_URL")
                .unwrap_or(defaults.mymemory_api_url),
            translation_cache_capacity: get_env_parse_or(
                "TRANSLATION_CACHE_CAPACITY",
                defaults.translation_cache_capacity,
            )?,
            openai_api_key: get_env_opt("OPENAI_API_KEY"),
            openai_model: get_env_opt("OPENAI_MODEL").unwrap_or(defaults.openai_model),
        })
    }
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
