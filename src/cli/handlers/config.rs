//! `pagelens config`: show the effective configuration.

use anyhow::Result;

use crate::cli::output::{output_json, print_hint, OutputMode};
use crate::config::default_config_path;
use crate::init::AppContext;

pub fn handle_config(ctx: &AppContext, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Json => output_json(&ctx.config),
        OutputMode::Human => {
            if let Some(path) = default_config_path() {
                print_hint(&format!("# default location: {}", path.display()));
            }
            print!("{}", ctx.config.to_toml()?);
        }
    }
    Ok(())
}
