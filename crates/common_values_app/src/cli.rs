use std::path::PathBuf;

use clap::Parser;
use common_values_engine::{DatabaseOverrides, RunOptions, DEFAULT_CONFIG_FILE};
use engine_logging::Verbosity;

#[derive(Parser, Debug)]
#[command(
    name = "common-values",
    version,
    about = "Collect frequent values per key from a statistics service into a database table"
)]
pub struct Cli {
    /// Name of configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Don't update the database, only show values that would be uploaded
    #[arg(long)]
    pub no_update: bool,

    /// Write the table even if some key produced no values
    #[arg(long)]
    pub allow_empty: bool,

    /// Override database name to connect to
    #[arg(short = 'd', long)]
    pub database: Option<String>,

    /// Override database server host or socket directory
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Override database server port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Override database user name
    #[arg(short = 'U', long)]
    pub username: Option<String>,

    /// Override database password
    #[arg(short = 'w', long, env = "PGPASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Role to grant read access for rendering
    #[arg(short = 'R', long)]
    pub renderuser: Option<String>,

    /// Be more verbose; overrides -q
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Only report serious problems
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            no_update: self.no_update,
            allow_empty: self.allow_empty,
        }
    }

    pub fn database_overrides(&self) -> DatabaseOverrides {
        DatabaseOverrides {
            name: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            render_user: self.renderuser.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use engine_logging::Verbosity;
    use std::path::Path;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["common-values"]).unwrap();
        assert_eq!(cli.config, Path::new("common-values.toml"));
        assert!(!cli.no_update);
        assert_eq!(cli.verbosity(), Verbosity::Normal);
        assert_eq!(cli.run_options(), Default::default());
    }

    #[test]
    fn short_flags_map_to_overrides() {
        let cli = Cli::try_parse_from([
            "common-values",
            "-c",
            "other.toml",
            "-d",
            "gis",
            "-H",
            "/var/run/postgresql",
            "-p",
            "5433",
            "-U",
            "osm",
            "-w",
            "secret",
            "-R",
            "renderer",
        ])
        .unwrap();
        let overrides = cli.database_overrides();
        assert_eq!(cli.config, Path::new("other.toml"));
        assert_eq!(overrides.name.as_deref(), Some("gis"));
        assert_eq!(overrides.host.as_deref(), Some("/var/run/postgresql"));
        assert_eq!(overrides.port, Some(5433));
        assert_eq!(overrides.username.as_deref(), Some("osm"));
        assert_eq!(overrides.password.as_deref(), Some("secret"));
        assert_eq!(overrides.render_user.as_deref(), Some("renderer"));
    }

    #[test]
    fn verbose_wins_over_quiet() {
        let cli = Cli::try_parse_from(["common-values", "-q", "-v"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Verbose);
        let cli = Cli::try_parse_from(["common-values", "-q"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(Cli::try_parse_from(["common-values", "-p", "not-a-port"]).is_err());
    }
}
