mod app;
mod config;
mod db;
mod error;
mod models;
mod storage;
mod store;

use std::fs::{self, File};

use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::{
    app::App,
    config::{Args, Config},
    db::SqliteStorage,
    store::NoteStore,
};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::resolve(Args::parse());
    init_logging(&config)?;

    log::info!("using {}", config.db_path.display());
    let storage = SqliteStorage::open(&config.db_path)?;
    let store = NoteStore::load(storage);

    let mut app = App::new(store);
    ratatui::run(|t| app.run(t))?;

    Ok(())
}

fn init_logging(config: &Config) -> color_eyre::Result<()> {
    if let Some(parent) = config.log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let log_file = File::create(&config.log_path)?;
    WriteLogger::init(config.log_level, log_config, log_file)?;

    Ok(())
}
