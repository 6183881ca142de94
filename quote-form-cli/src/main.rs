use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use quote_form_cli::cli::{Cli, Commands};
use quote_form_cli::commands::{HtmlRequest, cmd_check, cmd_html, cmd_submit, cmd_tui, init_logging};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    match cli.command {
        Commands::Html {
            output,
            sets,
            submit,
            fragment,
            no_styles,
        } => {
            let request = HtmlRequest {
                sets,
                submit,
                fragment,
                no_styles,
            };
            let mut out: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path)
                        .with_context(|| format!("cannot create {}", path.display()))?,
                )),
                None => Box::new(stdout.lock()),
            };
            let code = cmd_html(&cli.config, &request, &mut out)?;
            out.flush()?;
            Ok(code)
        }
        Commands::Tui => cmd_tui(&cli.config, &mut stdout.lock()),
        Commands::Submit { sets, json } => cmd_submit(&cli.config, &sets, json, &mut stdout.lock()),
        Commands::Check => cmd_check(&cli.config, &mut stdout.lock()),
    }
}
