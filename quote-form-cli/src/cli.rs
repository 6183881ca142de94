use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use quote_form::DEFAULT_CONFIG_LOCATION;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "quote-form",
    version,
    about = "Render JSON-configured quote forms and compute their totals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Form description: a file path or an http(s) URL
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_LOCATION)]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the HTML host page
    Html {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Set a control before rendering (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_set)]
        sets: Vec<(String, String)>,

        /// Render the result area as after pressing submit
        #[arg(long)]
        submit: bool,

        /// Emit only the body markup instead of a full document
        #[arg(long)]
        fragment: bool,

        /// Leave out the embedded stylesheet
        #[arg(long)]
        no_styles: bool,
    },

    /// Fill in the form interactively in the terminal
    Tui,

    /// Submit without interaction and print the result
    Submit {
        /// Set a control before submitting (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_set)]
        sets: Vec<(String, String)>,

        /// Print the values and total as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load the description and report problems with it
    Check,
}

/// Parse a `NAME=VALUE` assignment. The value may be empty or contain `=`.
pub fn parse_set(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{arg}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Log filter directive for a `-v` count.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn set_assignments() {
        assert_eq!(
            parse_set("hours=3.5"),
            Ok(("hours".to_string(), "3.5".to_string()))
        );
        assert_eq!(
            parse_set("notes=a=b"),
            Ok(("notes".to_string(), "a=b".to_string()))
        );
        assert_eq!(parse_set("rush="), Ok(("rush".to_string(), String::new())));
        assert!(parse_set("hours").is_err());
        assert!(parse_set(" =1").is_err());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(log_filter(0), "warn");
        assert_eq!(log_filter(2), "debug");
        assert_eq!(log_filter(9), "trace");
    }

    #[test]
    fn parses_html_arguments() {
        let cli = Cli::try_parse_from([
            "quote-form",
            "html",
            "--config",
            "https://example.com/form.json",
            "--set",
            "hours=2",
            "--set",
            "rush=on",
            "--submit",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, "https://example.com/form.json");
        let Commands::Html { sets, submit, fragment, .. } = cli.command else {
            panic!("Expected html");
        };
        assert_eq!(sets.len(), 2);
        assert!(submit);
        assert!(!fragment);
    }

    #[test]
    fn config_defaults_to_form_config_json() {
        let cli = Cli::try_parse_from(["quote-form", "check"]).unwrap();
        assert_eq!(cli.config, "formConfig.json");
        assert!(Cli::try_parse_from(["quote-form", "submit", "--set", "oops"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
