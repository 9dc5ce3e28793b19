#![deny(rust_2018_idioms)]

use anyhow::{Context, Result};
use chrono::Utc;
use console::{style, Term};
use ghglance::{
    app::{resolve_root, App, AppConfig},
    github::{Authentication, GhCli, GhClient},
    AppEnv, Strategy,
};
use std::io;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let cmd = cli::cmd();
    debug!(?cmd, "launched");

    let root = resolve_root(&cmd.root)?;
    let app_env = AppEnv::from_env();
    debug!(?app_env);

    let mut stdout = Term::buffered_stdout();
    let color = app_env.use_color(cmd.no_color, stdout.is_term());
    if cmd.no_color {
        console::set_colors_enabled_stderr(false);
    }
    let config = AppConfig { root: &root, recursive: cmd.recursive, color };
    let now = Utc::now();

    match app_env.strategy() {
        Strategy::Graphql { program } => {
            let app = App::new(config, GhCli::new(program));
            app.print_status_table(&mut stdout, &now).await?;
        }
        Strategy::Rest => {
            let credential = app_env.credential();
            if credential.is_none() {
                eprintln!(
                    "{} GITHUB_TOKEN/GH_TOKEN not set; GitHub API rate limits apply.",
                    style("Warning:").yellow().for_stderr()
                );
            }
            let client = GhClient::new(None, credential.map(|x| x as &dyn Authentication))
                .context("Failed to create GitHub client")?;
            let app = App::new(config, client);
            app.print_status_table(&mut stdout, &now).await?;
        }
    }
    stdout.flush().context("Failed to write output")?;

    debug!("exiting");
    Ok(())
}
