//! `config show` and `config init`.

use std::path::PathBuf;

use mandi_client::{ClientConfig, ClientResult};

pub fn show(config: &ClientConfig) -> ClientResult<()> {
    if let Some(path) = ClientConfig::default_config_path() {
        println!("# default location: {}", path.display());
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

pub fn init(config: &ClientConfig, path: Option<PathBuf>) -> ClientResult<()> {
    let written = config.save(path)?;
    println!("Wrote {}", written.display());
    Ok(())
}
