use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use lru::LruCache;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::dto::translate_dto::Translation;
use crate::error::{Error, Result};

/// Text that needs no translation.
const SOURCE_LANGUAGE: &str = "en";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// An empty string counts as a miss.
    async fn translate(&self, text: &str, target: &str) -> anyhow::Result<String>;
}

/// LibreTranslate-compatible `POST` endpoint.
pub struct LibreTranslateProvider {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl LibreTranslateProvider {
    pub fn new(client: Client, url: String, api_key: Option<String>) -> Self {
        Self { client, url, api_key }
    }
}

#[async_trait]
impl TranslationProvider for LibreTranslateProvider {
    async fn translate(&self, text: &str, target: &str) -> anyhow::Result<String> {
        let mut request = self.client.post(&self.url).json(&json!({
            "q": text,
            "source": "auto",
            "target": target,
            "format": "text",
        }));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let res = request.send().await?;
        if !res.status().is_success() {
            anyhow::bail!("LibreTranslate returned {}", res.status());
        }
        let body: JsonValue = res.json().await?;
        let translated = ["translatedText", "translation", "translated"]
            .iter()
            .find_map(|field| body.get(*field).and_then(|v| v.as_str()))
            .unwrap_or_default();
        Ok(translated.to_string())
    }
}

/// MyMemory `GET` endpoint; the source language is always English.
pub struct MyMemoryProvider {
    client: Client,
    url: String,
}

impl MyMemoryProvider {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryProvider {
    async fn translate(&self, text: &str, target: &str) -> anyhow::Result<String> {
        let langpair = format!("{}|{}", SOURCE_LANGUAGE, target);
        let res = self
            .client
            .get(&self.url)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await?;
        if !res.status().is_success() {
            anyhow::bail!("MyMemory returned {}", res.status());
        }

        let body: JsonValue = res.json().await?;
        if body.get("responseStatus").and_then(|s| s.as_i64()) != Some(200) {
            anyhow::bail!("MyMemory responseStatus {}", body["responseStatus"]);
        }
        let candidate = body
            .pointer("/responseData/translatedText")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        if candidate.to_uppercase().contains("INVALID SOURCE LANGUAGE") {
            anyhow::bail!("MyMemory rejected the source language");
        }
        Ok(candidate.to_string())
    }
}

#[derive(Clone)]
pub struct TranslationService {
    primary: Arc<dyn TranslationProvider>,
    fallback: Arc<dyn TranslationProvider>,
    cache: Arc<Mutex<LruCache<String, String>>>,
}

fn cache_key(text: &str, target: &str) -> String {
    format!("{}:{}", target, hex::encode(Sha256::digest(text.as_bytes())))
}

impl TranslationService {
    pub fn new(
        primary: Arc<dyn TranslationProvider>,
        fallback: Arc<dyn TranslationProvider>,
        capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            primary,
            fallback,
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(
            Arc::new(LibreTranslateProvider::new(
                client.clone(),
                config.translate_api_url.clone(),
                config.translate_api_key.clone(),
            )),
            Arc::new(MyMemoryProvider::new(client, config.mymemory_api_url.clone())),
            config.translation_cache_capacity,
        )
    }

    fn cache(&self) -> MutexGuard<'_, LruCache<String, String>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn translate(&self, text: &str, target: &str) -> Result<Translation> {
        let target = target.trim();
        if text.trim().is_empty() || target.is_empty() {
            return Err(Error::BadRequest("text and target are required".to_string()));
        }
        if target == SOURCE_LANGUAGE {
            return Ok(Translation::fresh(text.to_string()));
        }

        let key = cache_key(text, target);
        if let Some(hit) = self.cache().get(&key).cloned() {
            tracing::debug!(target_lang = %target, "translation cache hit");
            return Ok(Translation::cached(hit));
        }

        let translated = match self.primary.translate(text, target).await {
            Ok(t) if !t.is_empty() => Some(t),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "primary translation provider failed");
                None
            }
        };
        let translated = match translated {
            Some(t) => t,
            None => match self.fallback.translate(text, target).await {
                Ok(t) if !t.is_empty() => t,
                Ok(_) => return Err(unavailable()),
                Err(e) => {
                    tracing::error!(error = %e, "fallback translation provider failed");
                    return Err(unavailable());
                }
            },
        };

        self.cache().put(key, translated.clone());
        Ok(Translation::fresh(translated))
    }
}

fn unavailable() -> Error {
    Error::UpstreamUnavailable("Translation unavailable".to_string())
}
