//! [`Args`] definitions.

use clap::Parser;

/// HTTP server of the student-housing rental back-end.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    ///
    /// Missing file is fine: environment variables and defaults are used.
    #[arg(short, long, env = "CONF_FILE", default_value = "config.toml")]
    pub config: String,

    /// Starts serving without applying database migrations.
    #[arg(long)]
    pub skip_migrations: bool,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::Args;

    #[test]
    fn migrates_by_default() {
        let args = Args::try_parse_from(["application", "-c", "dev.toml"])
            .unwrap();

        assert_eq!(args.config, "dev.toml");
        assert!(!args.skip_migrations);
    }

    #[test]
    fn skips_migrations_on_flag() {
        let args =
            Args::try_parse_from(["application", "--skip-migrations"]).unwrap();

        assert!(args.skip_migrations);
    }
}
