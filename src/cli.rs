//!
//! Command line interface parsing
//!
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use clap::builder::BoolishValueParser;
use clap::{
    crate_description,
    crate_name,
    crate_version,
    Arg,
    ArgAction,
    ArgMatches,
    Command,
};
use tracing::debug;

mod validator;
use validator::*;

// Create a clap app
fn create_app() -> Command {
    debug!("Creating clap app");

    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .term_width(80)
        .arg(
            Arg::new("ES_URI")
                .env("ES_URI")
                .hide_env_values(true)
                .long("es.uri")
                .value_name("URI")
                .help("HTTP API address of an Elasticsearch node.")
                .default_value("http://localhost:9200")
                .value_parser(is_valid_es_uri)
        )
        .arg(
            Arg::new("ES_TIMEOUT")
                .env("ES_TIMEOUT")
                .hide_env_values(true)
                .long("es.timeout")
                .value_name("DURATION")
                .help("Timeout for requests to Elasticsearch, e.g. 500ms, 5s.")
                .default_value("5s")
                .value_parser(is_valid_timeout)
        )
        .arg(
            Arg::new("ES_SSL_SKIP_VERIFY")
                .env("ES_SSL_SKIP_VERIFY")
                .long("es.ssl-skip-verify")
                .help("Skip TLS certificate verification for Elasticsearch.")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new())
        )
        .arg(
            Arg::new("WEB_LISTEN_ADDRESS")
                .env("WEB_LISTEN_ADDRESS")
                .hide_env_values(true)
                .long("web.listen-address")
                .value_name("[ADDR:PORT]")
                .help("Address on which to expose metrics and web interface.")
                .default_value("127.0.0.1:9114")
                .value_parser(is_valid_socket_addr)
        )
        .arg(
            Arg::new("WEB_TELEMETRY_PATH")
                .env("WEB_TELEMETRY_PATH")
                .hide_env_values(true)
                .long("web.telemetry-path")
                .value_name("PATH")
                .help("Path under which to expose metrics.")
                .default_value("/metrics")
                .value_parser(is_valid_telemetry_path)
        )
        .arg(
            Arg::new("LOG_LEVEL")
                .env("LOG_LEVEL")
                .long("log.level")
                .value_name("LEVEL")
                .help("Only log messages with the given severity or above.")
                .default_value("info")
                .value_parser(is_valid_log_level)
        )
}

// Parses the command line arguments and returns the matches.
pub fn parse_args() -> ArgMatches {
    debug!("Parsing command line arguments");

    create_app().get_matches()
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use pretty_assertions::assert_eq;
    use reqwest::Url;
    use std::env;
    use std::panic;
    use std::sync::Mutex;
    use std::time::Duration;
    use tracing::Level;

    // Used during env_tests
    static LOCK: Lazy<Mutex<i8>> = Lazy::new(|| Mutex::new(0));

    // Wraps setting and unsetting of environment variables
    fn env_test<T>(key: &str, var: &str, test: T)
    where T: FnOnce() + panic::UnwindSafe {
        // This ensures that only one test can be manipulating the environment
        // at a time.
        let _locked = LOCK.lock().unwrap_or_else(|e| e.into_inner());

        env::set_var(key, var);

        let result = panic::catch_unwind(|| {
            test()
        });

        env::remove_var(key);

        assert!(result.is_ok())
    }

    // Matches for the given argv, taken while holding the env lock.
    fn matches_from(argv: &[&str]) -> ArgMatches {
        let _locked = LOCK.lock().unwrap_or_else(|e| e.into_inner());

        create_app().get_matches_from(argv)
    }

    #[test]
    fn default_es_uri() {
        let matches = matches_from(&["elasticsearch_exporter"]);
        let uri = matches.get_one::<Url>("ES_URI").map(Url::as_str);

        assert_eq!(uri, Some("http://localhost:9200/"));
    }

    #[test]
    fn default_es_timeout() {
        let matches = matches_from(&["elasticsearch_exporter"]);
        let timeout = matches.get_one::<Duration>("ES_TIMEOUT");

        assert_eq!(timeout, Some(&Duration::from_secs(5)));
    }

    #[test]
    fn default_es_ssl_skip_verify() {
        let matches = matches_from(&["elasticsearch_exporter"]);

        assert!(!matches.get_flag("ES_SSL_SKIP_VERIFY"));
    }

    #[test]
    fn default_web_listen_address() {
        let matches = matches_from(&["elasticsearch_exporter"]);
        let listen_address = matches.get_one::<String>("WEB_LISTEN_ADDRESS");

        assert_eq!(listen_address, Some(&"127.0.0.1:9114".into()));
    }

    #[test]
    fn default_web_telemetry_path() {
        let matches = matches_from(&["elasticsearch_exporter"]);
        let telemetry_path = matches.get_one::<String>("WEB_TELEMETRY_PATH");

        assert_eq!(telemetry_path, Some(&"/metrics".into()));
    }

    #[test]
    fn default_log_level() {
        let matches = matches_from(&["elasticsearch_exporter"]);
        let level = matches.get_one::<Level>("LOG_LEVEL");

        assert_eq!(level, Some(&Level::INFO));
    }

    #[test]
    fn cli_set_es_uri() {
        let matches = matches_from(&[
            "elasticsearch_exporter",
            "--es.uri=https://es.example.com:9243/prefix",
        ]);
        let uri = matches.get_one::<Url>("ES_URI").map(Url::as_str);

        assert_eq!(uri, Some("https://es.example.com:9243/prefix"));
    }

    #[test]
    fn cli_set_es_timeout() {
        let matches = matches_from(&[
            "elasticsearch_exporter",
            "--es.timeout=250ms",
        ]);
        let timeout = matches.get_one::<Duration>("ES_TIMEOUT");

        assert_eq!(timeout, Some(&Duration::from_millis(250)));
    }

    #[test]
    fn cli_set_es_ssl_skip_verify() {
        let matches = matches_from(&[
            "elasticsearch_exporter",
            "--es.ssl-skip-verify",
        ]);

        assert!(matches.get_flag("ES_SSL_SKIP_VERIFY"));
    }

    #[test]
    fn cli_set_web_telemetry_path() {
        let matches = matches_from(&[
            "elasticsearch_exporter",
            "--web.telemetry-path=/test",
        ]);
        let telemetry_path = matches.get_one::<String>("WEB_TELEMETRY_PATH");

        assert_eq!(telemetry_path, Some(&"/test".into()));
    }

    #[test]
    fn cli_invalid_es_uri() {
        let _locked = LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let res = create_app().try_get_matches_from([
            "elasticsearch_exporter",
            "--es.uri=ftp://localhost:9200",
        ]);

        assert!(res.is_err());
    }

    #[test]
    fn cli_invalid_es_timeout() {
        let _locked = LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let res = create_app().try_get_matches_from([
            "elasticsearch_exporter",
            "--es.timeout=0s",
        ]);

        assert!(res.is_err());
    }

    #[test]
    fn cli_override_env_es_uri() {
        env_test("ES_URI", "http://envvar:9200", || {
            let argv = vec![
                "elasticsearch_exporter",
                "--es.uri=http://clioverride:9200",
            ];

            let matches = create_app().get_matches_from(argv);
            let uri = matches.get_one::<Url>("ES_URI").map(Url::as_str);

            assert_eq!(uri, Some("http://clioverride:9200/"));
        });
    }

    #[test]
    fn cli_override_env_web_listen_address() {
        env_test("WEB_LISTEN_ADDRESS", "127.0.1.2:9114", || {
            let argv = vec![
                "elasticsearch_exporter",
                "--web.listen-address=127.0.1.3:9114",
            ];

            let matches = create_app().get_matches_from(argv);
            let listen_address = matches.get_one::<String>("WEB_LISTEN_ADDRESS");

            assert_eq!(listen_address, Some(&"127.0.1.3:9114".into()));
        });
    }

    #[test]
    fn env_set_es_uri() {
        env_test("ES_URI", "https://envvar:9243", || {
            let argv = vec!["elasticsearch_exporter"];
            let matches = create_app().get_matches_from(argv);
            let uri = matches.get_one::<Url>("ES_URI").map(Url::as_str);

            assert_eq!(uri, Some("https://envvar:9243/"));
        });
    }

    #[test]
    fn env_set_es_ssl_skip_verify() {
        env_test("ES_SSL_SKIP_VERIFY", "true", || {
            let argv = vec!["elasticsearch_exporter"];
            let matches = create_app().get_matches_from(argv);

            assert!(matches.get_flag("ES_SSL_SKIP_VERIFY"));
        });
    }

    #[test]
    fn env_set_log_level() {
        env_test("LOG_LEVEL", "debug", || {
            let argv = vec!["elasticsearch_exporter"];
            let matches = create_app().get_matches_from(argv);
            let level = matches.get_one::<Level>("LOG_LEVEL");

            assert_eq!(level, Some(&Level::DEBUG));
        });
    }

    #[test]
    fn env_set_web_telemetry_path() {
        env_test("WEB_TELEMETRY_PATH", "/test", || {
            let argv = vec!["elasticsearch_exporter"];
            let matches = create_app().get_matches_from(argv);
            let telemetry_path = matches.get_one::<String>("WEB_TELEMETRY_PATH");

            assert_eq!(telemetry_path, Some(&"/test".into()));
        });
    }
}
