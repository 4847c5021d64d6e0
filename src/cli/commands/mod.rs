pub mod auth;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_DB_PASSWORD: &str = "db-password";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("cedarcore")
        .about("Cedar Core site backend and content admin")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("CEDARCORE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .env("CEDARCORE_DSN")
                .required(true),
        )
        .arg(
            Arg::new(ARG_DB_PASSWORD)
                .long(ARG_DB_PASSWORD)
                .help("Database password, injected into the DSN when set")
                .env("CEDARCORE_DB_PASSWORD")
                .hide_env_values(true),
        );

    let command = auth::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DSN: &str = "postgres://cedarcore@localhost:5432/cedarcore";
    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "cedarcore");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Cedar Core site backend and content admin".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_port_and_dsn() {
        temp_env::with_vars([("CEDARCORE_DB_PASSWORD", None::<&str>)], || {
            let matches = new().get_matches_from(vec![
                "cedarcore",
                "--port",
                "9090",
                "--dsn",
                DSN,
                "--session-secret",
                SECRET,
            ]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9090));
            assert_eq!(
                matches.get_one::<String>(ARG_DSN).cloned(),
                Some(DSN.to_string())
            );
            assert_eq!(matches.get_one::<String>(ARG_DB_PASSWORD), None);
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("CEDARCORE_PORT", Some("443")),
                ("CEDARCORE_DSN", Some(DSN)),
                ("CEDARCORE_DB_PASSWORD", Some("s3cret")),
                ("CEDARCORE_SESSION_SECRET", Some(SECRET)),
                ("CEDARCORE_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["cedarcore"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>(ARG_DSN).cloned(),
                    Some(DSN.to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_DB_PASSWORD).cloned(),
                    Some("s3cret".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_missing_dsn_is_an_error() {
        temp_env::with_vars(
            [
                ("CEDARCORE_DSN", None::<&str>),
                ("CEDARCORE_SESSION_SECRET", Some(SECRET)),
            ],
            || {
                assert!(new().try_get_matches_from(vec!["cedarcore"]).is_err());
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("CEDARCORE_LOG_LEVEL", Some(level)),
                    ("CEDARCORE_DSN", Some(DSN)),
                    ("CEDARCORE_SESSION_SECRET", Some(SECRET)),
                ],
                || {
                    let matches = new().get_matches_from(vec!["cedarcore"]);
                    assert_eq!(
                        matches
                            .get_one::<u8>(logging::ARG_VERBOSITY)
                            .copied()
                            .map(usize::from),
                        Some(index)
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5 {
            temp_env::with_vars([("CEDARCORE_LOG_LEVEL", None::<&str>)], || {
                let mut args = vec![
                    "cedarcore".to_string(),
                    "--dsn".to_string(),
                    DSN.to_string(),
                    "--session-secret".to_string(),
                    SECRET.to_string(),
                ];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches
                        .get_one::<u8>(logging::ARG_VERBOSITY)
                        .copied()
                        .map(usize::from),
                    Some(index)
                );
            });
        }
    }
}
