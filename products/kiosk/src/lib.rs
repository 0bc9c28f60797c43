use anyhow::{Result, bail};
use std::path::PathBuf;

pub const USAGE: &str = "usage: revend [config.json] [--log-dir <dir>]";

/// Command line of the `revend` binary.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    /// JSON config file; defaults apply when absent.
    pub config: Option<PathBuf>,
    /// Write dated log files here instead of stdout.
    pub log_dir: Option<PathBuf>,
}

impl Args {
    /// Parse arguments, excluding the program name.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--log-dir" => match args.next() {
                    Some(dir) => parsed.log_dir = Some(dir.into()),
                    None => bail!("--log-dir needs a directory"),
                },
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                _ if parsed.config.is_none() => parsed.config = Some(arg.into()),
                _ => bail!("unexpected argument {arg}"),
            }
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_arguments_uses_defaults() {
        assert_eq!(parse(&[]).unwrap(), Args::default());
    }

    #[test]
    fn test_config_and_log_dir_in_any_order() {
        let expected = Args {
            config: Some("kiosk.json".into()),
            log_dir: Some("/var/log/revend".into()),
        };
        assert_eq!(parse(&["kiosk.json", "--log-dir", "/var/log/revend"]).unwrap(), expected);
        assert_eq!(parse(&["--log-dir", "/var/log/revend", "kiosk.json"]).unwrap(), expected);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(parse(&["--log-dir"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
    }
}
