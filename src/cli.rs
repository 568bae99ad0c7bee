//! Startup options and their validation. Argument parsing itself is clap's
//! job; `resolve` turns the raw flags into a checked `Launch` configuration
//! so the rest of the program never has to re-validate paths.

use std::env;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

/// Window title used when `--title` is not given.
pub const DEFAULT_TITLE: &str = "Database Control Interface";

/// Administer records in a single-table SQLite database through a form.
#[derive(Parser, Debug)]
#[command(name = "dbform")]
#[command(version)]
#[command(about = "View, search, add, update, and delete records in an embedded database table")]
pub struct Cli {
    /// Base filename of the database file (NAME.db) and seed file (NAME.csv)
    pub name: String,

    /// Populate the database from NAME.csv, replacing any existing NAME.db
    #[arg(short, long)]
    pub seed: bool,

    /// Title text for the application window
    #[arg(short, long, default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Directory holding the database and seed files. Defaults to a `data`
    /// directory next to the executable; relative paths resolve against the
    /// current working directory
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

/// Path problems caught before anything is opened or written.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("directory not found, \"{}\"", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("seed file not found, \"{}\"", .0.display())]
    SeedFileNotFound(PathBuf),

    #[error("database file not found, \"{}\"", .0.display())]
    DatabaseNotFound(PathBuf),
}

/// Validated startup configuration handed to `main`.
#[derive(Debug, Clone)]
pub struct Launch {
    pub name: String,
    pub title: String,
    pub seed: bool,
    pub data_dir: PathBuf,
}

impl Cli {
    /// Check that the data directory and the required input file exist. When
    /// seeding, the seed file must be present (the database file is about to
    /// be replaced anyway); otherwise the database file must be present.
    pub fn resolve(self) -> Result<Launch, LaunchError> {
        let data_dir = self.path.unwrap_or_else(default_data_dir);
        if !data_dir.is_dir() {
            return Err(LaunchError::DirectoryNotFound(data_dir));
        }

        if self.seed {
            let seed_file = data_dir.join(format!("{}.csv", self.name));
            if !seed_file.is_file() {
                return Err(LaunchError::SeedFileNotFound(seed_file));
            }
        } else {
            let db_file = data_dir.join(format!("{}.db", self.name));
            if !db_file.is_file() {
                return Err(LaunchError::DatabaseNotFound(db_file));
            }
        }

        Ok(Launch {
            name: self.name,
            title: self.title,
            seed: self.seed,
            data_dir,
        })
    }
}

/// The application-relative default: a `data` directory next to the
/// executable. Falls back to a plain `data` in the working directory when the
/// executable path cannot be determined.
fn default_data_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join("data")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn name_is_required() {
        assert!(Cli::try_parse_from(["dbform"]).is_err());
    }

    #[test]
    fn defaults_apply_when_flags_are_omitted() {
        let cli = parse(&["dbform", "people"]);
        assert_eq!(cli.name, "people");
        assert!(!cli.seed);
        assert_eq!(cli.title, DEFAULT_TITLE);
        assert!(cli.path.is_none());
    }

    #[test]
    fn short_and_long_flags_parse() {
        let cli = parse(&["dbform", "-s", "-t", "People", "-p", "/tmp/data", "people"]);
        assert!(cli.seed);
        assert_eq!(cli.title, "People");
        assert_eq!(cli.path.as_deref(), Some(Path::new("/tmp/data")));

        let cli = parse(&[
            "dbform", "--seed", "--title", "People", "--path", "/tmp/data", "people",
        ]);
        assert!(cli.seed);
    }

    #[test]
    fn missing_directory_is_rejected() {
        let mut cli = parse(&["dbform", "people"]);
        cli.path = Some(PathBuf::from("/definitely/not/a/real/directory"));
        let err = cli.resolve().unwrap_err();
        assert!(matches!(err, LaunchError::DirectoryNotFound(_)));
    }

    #[test]
    fn seeding_requires_the_seed_file() {
        let dir = tempdir().expect("tempdir");
        let mut cli = parse(&["dbform", "--seed", "people"]);
        cli.path = Some(dir.path().to_path_buf());

        let err = cli.resolve().unwrap_err();
        assert!(matches!(err, LaunchError::SeedFileNotFound(_)));
        // Validation must not leave a database file behind.
        assert!(!dir.path().join("people.db").exists());
    }

    #[test]
    fn opening_without_seed_requires_the_database_file() {
        let dir = tempdir().expect("tempdir");
        let mut cli = parse(&["dbform", "people"]);
        cli.path = Some(dir.path().to_path_buf());

        let err = cli.resolve().unwrap_err();
        assert!(matches!(err, LaunchError::DatabaseNotFound(_)));
    }

    #[test]
    fn resolve_accepts_a_complete_setup() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("people.csv"), "name,age\n").expect("write seed");

        let mut cli = parse(&["dbform", "--seed", "people"]);
        cli.path = Some(dir.path().to_path_buf());
        let launch = cli.resolve().expect("resolve");
        assert_eq!(launch.name, "people");
        assert!(launch.seed);
        assert_eq!(launch.data_dir, dir.path());
    }
}
