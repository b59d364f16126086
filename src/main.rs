use color_eyre::eyre::Result;
use log::debug;
use structopt::StructOpt;

use restoggle::{
    platform_provider, supported_modes, switch_mode, RefreshRate, Resolution, TargetRequest,
};

/// Toggle the primary display between two resolutions.
#[derive(Debug, StructOpt)]
#[structopt(name = "restoggle")]
struct Opt {
    /// Set a specific resolution instead of toggling between the presets
    #[structopt(long, value_name = "WIDTHxHEIGHT")]
    set: Option<Resolution>,

    /// Force a refresh rate (Hz). Defaults to the maximum available for the chosen resolution
    #[structopt(long, value_name = "HZ")]
    refresh: Option<u32>,

    /// List the modes supported by the primary display and exit
    #[structopt(long)]
    list: bool,

    /// Print the mode list as JSON
    #[structopt(long, requires = "list")]
    json: bool,

    /// Resolve the target mode without applying it
    #[structopt(long)]
    dry_run: bool,

    /// Log more (-v info, -vv debug)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let provider = platform_provider()?;
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    debug!("{:?}", opt);

    if opt.list {
        let modes = supported_modes(&*provider);
        if opt.json {
            println!("{}", serde_json::to_string_pretty(&modes)?);
        } else {
            for mode in modes {
                println!("{}", mode);
            }
        }
        return Ok(());
    }

    let request = TargetRequest {
        resolution: opt.set,
        refresh_rate: opt.refresh.map(RefreshRate),
    };
    let outcome = switch_mode(&*provider, request, opt.dry_run)?;
    println!("{}", outcome);

    Ok(())
}
