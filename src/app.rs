use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api;
use crate::config;
use crate::data::{ApiPostService, PostService};
use crate::ui;

pub fn run() -> Result<()> {
    let cfg = config::load(config::LoadOptions::default()).context("load config")?;
    let config_path = config::default_path();
    let display_path = friendly_path(config_path.as_ref());

    let mut service: Option<Arc<dyn PostService>> = None;
    let status: String;

    match api::Client::new(api::ClientConfig {
        user_agent: cfg.api.user_agent.clone(),
        base_url: Some(cfg.api.base_url.clone()),
        http_client: None,
    }) {
        Ok(client) => {
            service = Some(Arc::new(ApiPostService::new(Arc::new(client))));
            status = "Loading posts…".to_string();
        }
        Err(err) => {
            status = format!("Error: could not build API client: {err}");
        }
    }

    let options = ui::Options {
        status_message: status,
        categories: cfg.categories,
        service,
        config_path: display_path,
    };

    let mut model = ui::Model::new(options);
    model.run()
}

fn friendly_path(path: Option<&std::path::PathBuf>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "~/.config/tagfeed/config.yaml".to_string()
    }
}
