pub mod config;
pub mod preset;
pub mod run;
pub mod simulate;

use std::path::Path;

use belltimer_core::{Config, Preset};

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;
    Ok(config)
}

/// Command-line preset wins over the configured default; a URL wins over a
/// bare query.
pub fn resolve_preset(config: &Config, query: Option<&str>, url: Option<&str>) -> Preset {
    match (url, query) {
        (Some(url), _) => Preset::from_url(url),
        (None, Some(query)) => Preset::from_query(query),
        (None, None) => config.default_preset(),
    }
}
