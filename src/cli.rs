// src/cli.rs
//
// Process entry: parse flags/env, start logging, drive the poll loop on a
// single-threaded runtime until something fatal happens.

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::info;

use crate::config::{Options, Settings};
use crate::runner::Runner;

pub fn run() -> Result<()> {
    let opts = Options::parse();
    crate::log::init().map_err(|e| eyre!("cannot start logging: {e}"))?;

    let settings = Settings::from_options(opts)?;
    info!(
        terminals = ?settings.terminals,
        add_rows = settings.add_rows,
        show_rows = settings.show_rows,
        database = settings.db_url.is_some(),
        "starting"
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("cannot build runtime")?;

    rt.block_on(async {
        let mut runner = Runner::connect(settings).await?;
        runner.run().await
    })?;
    Ok(())
}
