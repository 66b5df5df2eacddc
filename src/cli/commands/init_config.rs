use crate::config::Config;
use std::path::Path;

pub fn cmd_init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        println!("Config file already exists: {}", path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    Config::default().save_to_path(path)?;
    println!("✓ Wrote default config to {}", path.display());
    Ok(())
}
