use std::path::Path;

use anyhow::Result;
use mimic_config::Config;

use crate::cli::ConfigCommands;

pub fn handle(cmd: ConfigCommands, path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            let config = Config::load_from(path)?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigCommands::Init { force } => init(path, force),
    }
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Config already exists: {}", path.display());
        println!("  Use --force to overwrite it with defaults.");
        return Ok(());
    }
    Config::default().save_to(path)?;
    println!("✓ Wrote default config: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_respects_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "dictionary = \"file:mine.txt\"\n").unwrap();

        init(&path, false).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().dictionary, "file:mine.txt");

        init(&path, true).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
