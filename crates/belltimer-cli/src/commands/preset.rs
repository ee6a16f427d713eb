use belltimer_core::{Preset, TimerEngine};
use clap::Args;

#[derive(Args)]
pub struct PresetArgs {
    /// Number of warnings
    #[arg(long)]
    bell_count: Option<usize>,
    /// Warning thresholds in seconds, in order (repeatable)
    #[arg(long = "warning", short = 'w')]
    warnings: Vec<u64>,
    /// Start from an existing query string; explicit flags override it
    #[arg(long)]
    from: Option<String>,
    /// Print a full URL on this base instead of a bare query
    #[arg(long)]
    base: Option<String>,
}

pub fn run(args: PresetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut preset = args.from.as_deref().map(Preset::from_query).unwrap_or_default();
    if let Some(count) = args.bell_count {
        preset.bell_count = Some(count);
    }
    for (i, secs) in args.warnings.iter().enumerate() {
        preset.warnings.insert(i + 1, *secs);
    }
    if preset.bell_count.is_none() && !args.warnings.is_empty() {
        preset.bell_count = Some(args.warnings.len());
    }

    // Normalize through the engine so the output always carries every
    // warning, with invalid entries replaced by their fallbacks.
    let normalized = Preset::from_engine(&TimerEngine::from_preset(&Preset::from_query(
        &preset.to_query(),
    )));

    match args.base {
        Some(base) => println!("{}", normalized.to_url(&base)?),
        None => println!("{}", normalized.to_query()),
    }
    Ok(())
}
