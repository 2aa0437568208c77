#![warn(rust_2018_idioms)]

use std::str::FromStr;

use flexi_logger::{LogSpecBuilder, LoggerHandle};
use log::{error, info, LevelFilter};
use tokio::io::{stdin, stdout, BufReader};

use oddsboard_client::{run, settings, OddsClient, Session};
use oddsboard_game::model::Variant;
use oddsboard_game::OddsController;

fn main() -> anyhow::Result<()> {
    let settings = settings::load()?;
    let _logger = setup_logger(&settings.logging)?;
    let variant = settings.table.variant()?;
    let runtime = setup_runtime(&settings.runtime)?;

    let result = runtime.block_on(serve(&settings.service, variant));
    // A blocked stdin read would otherwise hold the runtime open.
    runtime.shutdown_background();
    result?;
    info!("good-bye, world!");
    Ok(())
}

async fn serve(service: &settings::Service, variant: Variant) -> anyhow::Result<()> {
    let (client, connection) = OddsClient::connect(service.addr.as_str()).await?;
    let board = OddsController::new(variant, client)?;
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("cannot listen for interrupts: {}", e);
            futures::future::pending::<()>().await;
        }
    };
    let result = run(Session::new(board), BufReader::new(stdin()), stdout(), shutdown).await;
    // Stop reading replies nobody is waiting for.
    connection.abort();
    result
}

fn setup_logger(l: &settings::Logging) -> anyhow::Result<LoggerHandle> {
    let mut spec_builder = LogSpecBuilder::new();
    spec_builder.default(LevelFilter::from_str(&l.level)?);
    let spec = spec_builder.build();
    let handle = flexi_logger::Logger::with(spec)
        .format(flexi_logger::default_format)
        .start()?;
    Ok(handle)
}

fn setup_runtime(r: &settings::Runtime) -> anyhow::Result<tokio::runtime::Runtime> {
    let mut builder = if r.threaded {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder.worker_threads(r.worker_threads.max(1));
        builder
    } else {
        tokio::runtime::Builder::new_current_thread()
    };
    builder.enable_all().thread_name(&r.thread_name);
    Ok(builder.build()?)
}
