mod agreement;
mod command;

use crate::agreement::{AgreementWizard, Flow};
use crate::command::Command;
use anyhow::Context;
use fleetdesk::domain::config::{AppConfig, LoggingConfig};
use fleetdesk::kernel::config::load_config;
use fleetdesk_logger::{Logger, parse_level};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};

#[fleetdesk_runtime::main(event_loop)]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config: AppConfig =
        load_config(config_path.as_ref()).context("Critical: Configuration is malformed")?;

    let _log = init_logging(&config.logging)?;

    let store = fleetdesk::open_store(&config.storage).context("Draft storage unavailable")?;
    let (mut wizard, banner) = AgreementWizard::mount(&config.wizard, store)?;

    let mut out = tokio::io::stdout();
    if let Some(banner) = banner {
        reply(&mut out, &banner).await?;
    }
    reply(&mut out, "type `help` for commands").await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let (text, flow) = match Command::parse(&line) {
            Ok(command) => wizard.apply(command),
            Err(err) => (err.to_string(), Flow::Continue),
        };
        reply(&mut out, &text).await?;
        if flow == Flow::Exit {
            break;
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<Logger> {
    let builder =
        Logger::builder().name(env!("CARGO_BIN_NAME")).level(parse_level(&config.level)?).console(true);

    let logger = match &config.dir {
        Some(dir) => builder.path(dir).json(config.json).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}

async fn reply(out: &mut Stdout, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}
