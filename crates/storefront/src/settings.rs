use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use storage::ToastDurations;

use crate::page::PageOptions;

const ENV_PREFIX: &str = "STOREFRONT_";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub reviews: ReviewSettings,
    pub comments: CommentSettings,
    pub ui: UiSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Bearer token of the signed-in user, if any.
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct ReviewSettings {
    pub page_size: u32,
}

#[derive(Deserialize, Clone)]
pub struct CommentSettings {
    pub page_size: u32,
}

#[derive(Deserialize, Clone)]
pub struct UiSettings {
    pub compact: bool,
    pub toast_success_ms: u64,
    pub toast_error_ms: u64,
    pub toast_info_ms: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::load(&run_mode, collect_env_vars(std::env::vars()))
    }

    pub fn load(run_mode: &str, env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let env_json = serde_json::to_string(&env_map)
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        let s = config::Config::builder()
            .set_default("api.base_url", "http://127.0.0.1:8080")?
            .set_default("api.timeout_secs", 10)?
            .set_default("reviews.page_size", 5)?
            .set_default("comments.page_size", 5)?
            .set_default("ui.compact", false)?
            .set_default("ui.toast_success_ms", 5000)?
            .set_default("ui.toast_error_ms", 7000)?
            .set_default("ui.toast_info_ms", 5000)?
            .add_source(config::File::with_name("storefront").required(false))
            .add_source(
                config::File::with_name(&format!("storefront.{}", run_mode)).required(false),
            )
            .add_source(config::File::from_str(&env_json, config::FileFormat::Json))
            .build()?;

        s.try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            page_size: self.reviews.page_size,
            comment_limit: self.comments.page_size,
            compact: self.ui.compact,
        }
    }

    pub fn toast_durations(&self) -> ToastDurations {
        ToastDurations {
            success: Duration::from_millis(self.ui.toast_success_ms),
            error: Duration::from_millis(self.ui.toast_error_ms),
            info: Duration::from_millis(self.ui.toast_info_ms),
        }
    }
}

fn collect_env_vars(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
