//! Configuration commands.

use std::io::Write;

use crate::cli::Cli;
use crate::commands::Output;
use crate::commands::booking::storage_path;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration.
pub fn dump<W: Write>(config: &ClientConfig, out: &mut Output<W>) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    out.line(format!(
        "# config.toml ({})",
        ClientConfig::default_path().display()
    ))?;
    out.line(toml_str)?;

    Ok(())
}

/// Validate the configuration.
pub fn validate<W: Write>(config: &ClientConfig, out: &mut Output<W>) -> ClientResult<()> {
    config.validate().map_err(ClientError::Config)?;
    out.line("Configuration is valid.")?;
    Ok(())
}

/// Show the configuration and storage file paths.
pub fn path<W: Write>(cli: &Cli, config: &ClientConfig, out: &mut Output<W>) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    out.line(format!("config: {}", config_path.display()))?;
    out.line(format!("storage: {}", storage_path(cli, config).display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn output() -> Output<Vec<u8>> {
        Output::new(Vec::new(), false)
    }

    fn text(out: Output<Vec<u8>>) -> String {
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn validate_reports_bad_values() {
        let mut config = ClientConfig::default();
        assert!(validate(&config, &mut output()).is_ok());

        config.display.feedback_ms = 0;
        let err = validate(&config, &mut output()).unwrap_err();
        assert!(err.to_string().contains("feedback_ms"));
    }

    #[test]
    fn path_prefers_command_line() {
        let cli = Cli::parse_from([
            "roombook",
            "--config",
            "/etc/roombook.toml",
            "--storage",
            "/var/lib/roombook.json",
            "config",
            "path",
        ]);
        let mut out = output();
        path(&cli, &ClientConfig::default(), &mut out).unwrap();
        assert_eq!(
            text(out),
            "config: /etc/roombook.toml\nstorage: /var/lib/roombook.json\n"
        );
    }

    #[test]
    fn dump_is_valid_toml() {
        let mut out = output();
        dump(&ClientConfig::default(), &mut out).unwrap();
        let dumped = text(out);
        let body = dumped.split_once('\n').map(|(_, rest)| rest).unwrap();
        let parsed: ClientConfig = toml::from_str(body).unwrap();
        assert_eq!(parsed, ClientConfig::default());
    }
}
