use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use belltimer_core::{
    BellPlayer, BellScheduler, Command, JsonLinesSink, TerminalBell, TimerEngine, TimerRunner,
    TracingBell,
};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::{load_config, resolve_preset};

#[derive(Args)]
pub struct RunArgs {
    /// Preset query string, e.g. "bell_count=3&w1=300&w2=600&w3=900"
    #[arg(long)]
    preset: Option<String>,
    /// Full URL carrying a preset query
    #[arg(long, conflicts_with = "preset")]
    url: Option<String>,
    /// Start the timer immediately
    #[arg(long)]
    autostart: bool,
    /// Quit after this many seconds instead of at end of input
    #[arg(long)]
    duration: Option<u64>,
    /// Log bells instead of ringing the terminal bell
    #[arg(long)]
    silent: bool,
}

/// Commands read from stdin, one per line.
const HELP: &str = "commands: start | pause | reset | lap | clear | + | - | count N | set N SECS | status | quit";

pub fn run(args: RunArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let preset = resolve_preset(&config, args.preset.as_deref(), args.url.as_deref());
    let engine = TimerEngine::from_preset(&preset).with_policy(config.timer.threshold_policy);

    let player: Arc<dyn BellPlayer> = if config.bells.audible && !args.silent {
        Arc::new(TerminalBell)
    } else {
        Arc::new(TracingBell {
            tone: Some(config.bells.tone()),
        })
    };
    let bells = BellScheduler::with_interval(player, config.bells.interval());
    let sink = JsonLinesSink::new(std::io::stdout());
    let runner = TimerRunner::new(engine, bells, sink).with_tick_period(config.timer.tick_period());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (tx, rx) = mpsc::channel(32);
        if args.autostart {
            tx.send(Command::Start).await?;
        }

        eprintln!("{HELP}");
        tokio::spawn(read_commands(tx.clone()));

        match args.duration {
            Some(secs) => {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(secs)).await;
                    let _ = tx.send(Command::Quit).await;
                });
            }
            None => drop(tx),
        }

        let (engine, _sink) = runner.run(rx).await;
        tracing::info!(elapsed_secs = engine.elapsed_secs(), "timer stopped");
        Ok::<_, Box<dyn std::error::Error>>(())
    })?;

    // Bell tasks still in flight are dropped with the runtime.
    runtime.shutdown_timeout(Duration::from_millis(100));
    Ok(())
}

async fn read_commands(tx: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if tx.send(command).await.is_err() {
                    break;
                }
            }
            Err(err) => eprintln!("{err}; {HELP}"),
        }
    }
}
