//! Config command implementation

use std::path::Path;

use anyhow::Result;
use glyco_core::default_config_path;

use super::load_config;

/// Where the effective config comes from
pub fn config_source(path: Option<&Path>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => match default_config_path().filter(|p| p.exists()) {
            Some(p) => p.display().to_string(),
            None => "built-in defaults".to_string(),
        },
    }
}

pub fn cmd_config(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;

    println!("⚙️  Engine configuration");
    println!("   Source: {}", config_source(path));
    if path.is_none() {
        if let Some(p) = default_config_path() {
            println!("   Override location: {}", p.display());
        }
    }
    println!();
    print!("{}", config.to_toml()?);

    Ok(())
}
