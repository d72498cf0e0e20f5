use std::path::PathBuf;

use clap::Parser;
use simplelog::LevelFilter;

const APP_DIR: &str = "notes";
const DB_FILE: &str = "notes.db";
const LOG_FILE: &str = "notes.log";

#[derive(Parser, Debug)]
#[command(name = "notes", about, version)]
pub struct Args {
    /// SQLite file the notes are saved in
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Where to write the log
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn resolve(args: Args) -> Config {
        let dir = data_dir();
        Config {
            db_path: args.db.unwrap_or_else(|| dir.join(DB_FILE)),
            log_path: args.log_file.unwrap_or_else(|| dir.join(LOG_FILE)),
            log_level: match args.verbose {
                0 => LevelFilter::Info,
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            },
        }
    }
}

/// `<platform data dir>/notes`, or the working directory if there is none.
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Config {
        Config::resolve(Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn defaults_live_in_the_data_dir() {
        let config = parse(&["notes"]);
        assert_eq!(config.db_path, data_dir().join("notes.db"));
        assert_eq!(config.log_path, data_dir().join("notes.log"));
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn explicit_paths_win() {
        let config = parse(&["notes", "--db", "/tmp/x.db", "--log-file", "/tmp/x.log"]);
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/x.log"));
    }

    #[test]
    fn verbosity_raises_log_level() {
        assert_eq!(parse(&["notes", "-v"]).log_level, LevelFilter::Debug);
        assert_eq!(parse(&["notes", "-vv"]).log_level, LevelFilter::Trace);
        assert_eq!(parse(&["notes", "-vvv"]).log_level, LevelFilter::Trace);
    }

    #[test]
    fn about_comes_from_the_package_description() {
        let command = <Args as clap::CommandFactory>::command();
        assert_eq!(
            command.get_about().map(|about| about.to_string()),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["notes", "--sync"]).is_err());
    }
}
