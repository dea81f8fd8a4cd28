//! INI configuration loading.
//!
//! Options live in a `[gelf]` section whose keys mirror the builder
//! setters:
//!
//! ```ini
//! [gelf]
//! endpoint = /var/run/gelf.sock
//! hostname = web-1
//! default_level = info
//! autoflush = false
//! quiet_shutdown = yes
//! max_message_size = 8192
//! warn_interval_ms = 1000
//! ```

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::builder::{BuildError, GelfSocketBuilder};
use crate::level::GelfLevel;

/// Section holding client options.
pub const CONFIG_SECTION: &str = "gelf";

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("{} doesn't exist", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is an empty file", .path.display())]
    Empty { path: PathBuf },
    #[error("{} is invalid: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl GelfSocketBuilder {
    /// Load builder options from the `[gelf]` section of an INI file.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let text = read_file(path)?;
        if text.trim().is_empty() {
            return Err(ConfigFileError::Empty {
                path: path.to_path_buf(),
            });
        }
        Self::from_ini_str(&text).map_err(|err| match err {
            ConfigFileError::Parse { message, .. } => ConfigFileError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse builder options from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(text).map_err(|err| parse_error(err.to_string()))?;
        let section = ini
            .section(Some(CONFIG_SECTION))
            .ok_or_else(|| parse_error(format!("missing [{CONFIG_SECTION}] section")))?;
        let mut builder = GelfSocketBuilder::new();
        for (key, value) in section.iter() {
            builder = apply_option(builder, key, value.trim())?;
        }
        builder.build_config()?;
        Ok(builder)
    }
}

fn read_file(path: &Path) -> Result<String, ConfigFileError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigFileError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn parse_error(message: String) -> ConfigFileError {
    ConfigFileError::Parse {
        path: PathBuf::from("<string>"),
        message,
    }
}

fn apply_option(
    builder: GelfSocketBuilder,
    key: &str,
    value: &str,
) -> Result<GelfSocketBuilder, BuildError> {
    Ok(match key {
        "endpoint" => builder.with_endpoint(value),
        "hostname" => builder.with_hostname(value),
        "default_level" => builder.with_default_level(parse_level(value)?),
        "autoflush" => builder.with_autoflush(parse_bool(key, value)?),
        "quiet_shutdown" => builder.with_quiet_shutdown(parse_bool(key, value)?),
        "max_message_size" => builder.with_max_message_size(parse_number(key, value)?),
        "warn_interval_ms" => builder.with_warn_interval_ms(parse_number(key, value)?),
        other => {
            return Err(BuildError::InvalidConfig(format!(
                "unknown option {other} in [{CONFIG_SECTION}]"
            )));
        }
    })
}

fn parse_level(value: &str) -> Result<GelfLevel, BuildError> {
    value
        .parse::<u8>()
        .ok()
        .and_then(GelfLevel::from_code)
        .or_else(|| GelfLevel::from_str(value).ok())
        .ok_or_else(|| BuildError::InvalidConfig(format!("default_level {value:?} is not a level")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, BuildError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(BuildError::InvalidConfig(format!(
            "{key} must be a boolean, got {value:?}"
        ))),
    }
}

fn parse_number<N: FromStr>(key: &str, value: &str) -> Result<N, BuildError> {
    value.parse().map_err(|_| {
        BuildError::InvalidConfig(format!("{key} must be a non-negative integer, got {value:?}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[rstest]
    fn loads_all_options() {
        let builder = GelfSocketBuilder::from_ini_str(
            "[gelf]\n\
             endpoint = /tmp/collector.sock\n\
             hostname = web-1\n\
             default_level = info\n\
             autoflush = off\n\
             quiet_shutdown = yes\n\
             max_message_size = 4096\n\
             warn_interval_ms = 100\n",
        )
        .expect("valid ini");
        let config = builder.build_config().expect("valid config");
        assert_eq!(config.endpoint, PathBuf::from("/tmp/collector.sock"));
        assert_eq!(config.hostname.as_deref(), Some("web-1"));
        assert_eq!(config.default_level, GelfLevel::Info);
        assert!(!config.autoflush);
        assert!(config.quiet_shutdown);
        assert_eq!(config.max_message_size, 4096);
        assert_eq!(config.warn_interval, Duration::from_millis(100));
    }

    #[rstest]
    #[case("3", GelfLevel::Critical)]
    #[case("warning", GelfLevel::Warning)]
    #[case("core", GelfLevel::Trace)]
    fn default_level_accepts_codes_and_names(#[case] raw: &str, #[case] expected: GelfLevel) {
        let builder = GelfSocketBuilder::from_ini_str(&format!("[gelf]\ndefault_level = {raw}\n"))
            .expect("valid ini");
        assert_eq!(builder.build_config().expect("config").default_level, expected);
    }

    #[rstest]
    #[case("[gelf]\nautoflush = maybe\n", "autoflush")]
    #[case("[gelf]\ndefault_level = loud\n", "default_level")]
    #[case("[gelf]\nmax_message_size = -1\n", "max_message_size")]
    #[case("[gelf]\nwarn_interval_ms = 0\n", "warn_interval_ms")]
    #[case("[gelf]\ncolour = blue\n", "colour")]
    fn invalid_values_are_rejected(#[case] text: &str, #[case] field: &str) {
        let err = GelfSocketBuilder::from_ini_str(text).expect_err("invalid");
        assert!(
            matches!(err, ConfigFileError::Build(BuildError::InvalidConfig(ref msg)) if msg.contains(field)),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    fn missing_section_is_a_parse_error() {
        let err = GelfSocketBuilder::from_ini_str("[other]\nkey = value\n").expect_err("no section");
        assert!(matches!(err, ConfigFileError::Parse { ref message, .. } if message.contains("[gelf]")));
    }

    #[rstest]
    fn file_errors_name_the_path() {
        let missing = GelfSocketBuilder::from_ini_file("/nonexistent/gelf.ini").expect_err("missing");
        assert!(matches!(missing, ConfigFileError::NotFound { .. }));
        assert!(missing.to_string().contains("/nonexistent/gelf.ini"));

        let empty = NamedTempFile::new().expect("temp file");
        let err = GelfSocketBuilder::from_ini_file(empty.path()).expect_err("empty");
        assert!(matches!(err, ConfigFileError::Empty { .. }));
    }

    #[rstest]
    fn reads_builder_from_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "[gelf]\nhostname = from-file").expect("write ini");
        let config = GelfSocketBuilder::from_ini_file(file.path())
            .expect("valid file")
            .build_config()
            .expect("valid config");
        assert_eq!(config.hostname.as_deref(), Some("from-file"));
    }
}
