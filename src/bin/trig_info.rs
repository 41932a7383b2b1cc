//! Inspect a digitizer recording: print the file header and the first
//! few triggers.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rawtrig_rs::{DaqVariant, Session, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "trig_info", about = "Inspect a CAEN digitizer recording")]
struct Args {
    /// Recording to inspect
    file: PathBuf,

    /// DAQ variant: rawcaen or wavedump (overrides the config file)
    #[arg(short, long)]
    variant: Option<String>,

    /// Digitizer channel count (overrides the config file)
    #[arg(short, long)]
    channels: Option<u32>,

    /// Number of triggers to print
    #[arg(short = 'n', long, default_value_t = 10)]
    count: usize,

    /// TOML configuration file
    #[arg(short = 'f', long = "config")]
    config_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("rawtrig_rs=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config_file {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(variant) = &args.variant {
        match variant.as_str() {
            "rawcaen" => config.variant = DaqVariant::RawCaen,
            "wavedump" => {
                config = SessionConfig {
                    variant: DaqVariant::WaveDump,
                    channel_count: 1,
                    ..config
                };
            }
            other => anyhow::bail!("unknown variant: {other} (expected rawcaen or wavedump)"),
        }
    }
    if let Some(channels) = args.channels {
        config.channel_count = channels;
    }

    let mut session = Session::open(&args.file, config)
        .with_context(|| format!("opening {}", args.file.display()))?;

    let header = session.header();
    println!("File:          {}", args.file.display());
    println!("Variant:       {}", header.variant);
    println!("Record length: {}", header.record_length);
    println!("Start epoch:   {:.3}", header.start_epoch);
    if header.used_fallback {
        println!("               (from file creation time)");
    }
    if let (Some(series), Some(file_number)) = (header.series, header.file_number) {
        println!("Series/file:   s{series} f{file_number}");
    }
    println!();

    let mut printed = 0;
    while printed < args.count {
        match session.next_trigger()? {
            Some(trigger) => {
                println!("{trigger}");
                for trace in &trigger.traces {
                    println!("    {}: {} samples", trace.name, trace.samples.len());
                }
                printed += 1;
            }
            None => break,
        }
    }

    println!();
    println!(
        "Printed {} trigger(s); next event offset {}, rollovers {}",
        printed,
        session.position(),
        session.rollover_count()
    );
    Ok(())
}
