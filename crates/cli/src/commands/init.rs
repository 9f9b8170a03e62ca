//! `leetdigest init` — Write the default config file.

use leetdigest_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_path(config_path);

    println!("🧩 leetdigest — Setup");
    println!("=====================\n");

    if path.exists() && !force {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or re-run with --force to overwrite.\n");
        return Ok(());
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created config directory: {}", dir.display());
        }
    }

    std::fs::write(&path, AppConfig::default_toml())?;
    println!("✅ Wrote config.toml to: {}", path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set DISCORD_WEBHOOK_URL (or discord.webhook_url)");
    println!("   2. Optionally set GEMINI_API_KEY for the study narrative");
    println!("   3. Preview with: leetdigest run --dry-run\n");

    Ok(())
}
