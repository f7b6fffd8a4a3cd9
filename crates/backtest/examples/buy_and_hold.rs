//! Replays daily CSV bars through a buy-and-hold strategy.
//!
//! Usage: `buy_and_hold <CSV_DIR> <TICKER>...`
//!
//! With no arguments a small bundled fixture is replayed, so the example
//! runs standalone.

use std::path::PathBuf;

use anyhow::{Context, Result};

use tape_backtest::{
    BuyAndHoldStrategy, NaivePortfolio, ReplayEngine, SimulatedExecution,
    SimulatedExecutionConfig,
};
use tape_core::{Error, ExecutionConfig};
use tape_feed::{HistoricCsvPriceSource, PriceSource};

const SPY_CSV: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2017-01-03,2,3,1,2.5,2.75,1000
2017-01-04,2.5,3.5,1.5,3.0,3.25,1050
2017-01-05,3.0,4.0,2.0,3.5,3.75,1100
2017-01-06,3.5,4.5,2.5,4.0,4.25,1200
2017-01-09,4.0,5.0,3.0,4.5,4.75,800
";

const AGG_CSV: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2017-01-04,5,6,4,5.5,5,2000
2017-01-05,4.5,5.5,3.5,5,4.5,500
2017-01-06,4,5,3,4.5,4,1000
";

fn write_fixture() -> Result<(PathBuf, tempfile::TempDir)> {
    let dir = tempfile::tempdir().context("creating fixture directory")?;
    std::fs::write(dir.path().join("SPY.csv"), SPY_CSV)?;
    std::fs::write(dir.path().join("AGG.csv"), AGG_CSV)?;
    Ok((dir.path().to_path_buf(), dir))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (csv_dir, tickers, _fixture) = match args.split_first() {
        Some((dir, rest)) if !rest.is_empty() => {
            (PathBuf::from(dir), rest.to_vec(), None)
        }
        _ => {
            let (dir, guard) = write_fixture()?;
            (dir, vec!["SPY".to_string(), "AGG".to_string()], Some(guard))
        }
    };

    let mut source = HistoricCsvPriceSource::new(&csv_dir).with_adj_returns();
    for ticker in &tickers {
        match source.subscribe(ticker) {
            Ok(()) | Err(Error::SourceNotFound(_)) | Err(Error::AlreadySubscribed(_)) => {}
            Err(e) => return Err(e).context(format!("subscribing {ticker}")),
        }
    }

    let execution_config = ExecutionConfig::default();
    let mut engine = ReplayEngine::new(
        source,
        BuyAndHoldStrategy::new(tickers[0].clone(), execution_config.base_quantity),
        NaivePortfolio::new(execution_config.base_quantity),
        SimulatedExecution::new(SimulatedExecutionConfig {
            exchange: execution_config.exchange,
        }),
    );
    let summary = engine.run();

    println!(
        "dispatched {} events: {} bars, {} signals, {} orders, {} fills",
        summary.total(),
        summary.bars,
        summary.signals,
        summary.orders,
        summary.fills
    );
    for fill in engine.portfolio().fills() {
        println!(
            "filled {} {} x{} @ {} (commission {})",
            fill.exchange, fill.ticker, fill.quantity, fill.fill_cost, fill.commission
        );
    }
    for ticker in &tickers {
        if let Ok(snapshot) = engine.source().latest_price(ticker) {
            println!("{ticker} last close {}", snapshot.close);
        }
    }

    let returns = engine.source().adj_close_returns();
    if !returns.is_empty() {
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        println!("mean adjusted-close return {:.6}", mean);
    }

    Ok(())
}
