use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ksp_transfer_window::catalog::{Catalog, LoadPolicy};
use ksp_transfer_window::config::load_or_default;
use ksp_transfer_window::core::time::{KerbinTime, format_duration};
use ksp_transfer_window::export::report::{to_json_string, write_windows_csv_to};
use ksp_transfer_window::orbits::{AnomalyMethod, Body};
use ksp_transfer_window::planner::Planner;
use ksp_transfer_window::transfer::TransferReport;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Next Hohmann transfer windows between bodies sharing a parent"
)]
struct Cli {
    /// Departure body name or catalog code
    #[arg(required_unless_present = "info")]
    from: Option<String>,

    /// Destination body name or catalog code
    #[arg(required_unless_present = "info")]
    to: Option<String>,

    /// Current time: seconds since epoch, or a Kerbin date as YEAR:DAY
    #[arg(short, long, default_value = "0")]
    time: String,

    /// Number of upcoming windows to list
    #[arg(short = 'n', long, default_value_t = 1)]
    windows: usize,

    /// Show orbital state of a single body instead of planning a transfer
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    info: Option<String>,

    /// Catalog CSV (defaults to the configured path)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// TOML or YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// True anomaly strategy (overrides the configuration)
    #[arg(long, value_enum)]
    anomaly: Option<AnomalyArg>,

    /// Fail on the first malformed catalog row
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Also write the windows as CSV (`-` for stdout)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum AnomalyArg {
    Series,
    Iterative,
}

impl From<AnomalyArg> for AnomalyMethod {
    fn from(value: AnomalyArg) -> Self {
        match value {
            AnomalyArg::Series => AnomalyMethod::Series,
            AnomalyArg::Iterative => AnomalyMethod::Iterative,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_or_default(cli.config.as_deref()).context("loading configuration")?;
    let policy = if cli.strict || !config.catalog.skip_invalid {
        LoadPolicy::Strict
    } else {
        LoadPolicy::SkipInvalid
    };
    let mut planner = Planner::from_config(&config, cli.catalog.as_deref(), policy)?;
    if let Some(anomaly) = cli.anomaly {
        planner.settings_mut().anomaly = anomaly.into();
    }
    debug!(settings = ?planner.settings(), "solver settings");

    let time = KerbinTime::parse(&cli.time).context("parsing --time")?;

    if let Some(name) = &cli.info {
        let body = planner.catalog().find(name)?;
        return print_info(planner.catalog(), body, time);
    }

    let (Some(from), Some(to)) = (cli.from.as_deref(), cli.to.as_deref()) else {
        bail!("both a departure and a destination body are required");
    };
    let report = planner.plan(from, to, time.as_seconds(), cli.windows)?;
    let record = report.to_export();

    if cli.json {
        println!("{}", to_json_string(&record)?);
    } else {
        print_report(&report, time);
    }

    if let Some(path) = &cli.csv {
        write_windows_csv_to(path, &record.windows)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}

fn print_info(catalog: &Catalog, body: &Body, time: KerbinTime) -> anyhow::Result<()> {
    let t = time.as_seconds();
    let nu_series = body.true_anomaly(t);
    let nu_exact = body.true_anomaly_with(t, AnomalyMethod::Iterative)?;
    let eccentric = body.eccentric_anomaly(t)?;

    println!("{body}");
    println!("At {} ({:.0} s):", time, t);
    println!("  Mean anomaly        : {:.3} deg", body.mean_anomaly(t).to_degrees());
    println!("  Eccentric anomaly   : {:.3} deg", eccentric.to_degrees());
    println!("  True anomaly        : {:.3} deg (series)", nu_series.to_degrees());
    println!("  True anomaly        : {:.3} deg (iterative)", nu_exact.to_degrees());
    println!("  Radius              : {:.0} km", body.radius_at(nu_series));
    println!(
        "  Parent GM           : {:.6e} km^3/s^2",
        body.parent_mu()
    );

    let satellites = catalog.satellites_of(body.code());
    if !satellites.is_empty() {
        let names: Vec<&str> = satellites.iter().map(|s| s.name()).collect();
        println!("  Satellites          : {}", names.join(", "));
    }
    Ok(())
}

fn print_report(report: &TransferReport, time: KerbinTime) {
    println!("=== Transfer Window: {} -> {} ===", report.origin, report.destination);
    println!("Reference time : {} ({:.0} s)", time, report.reference_time_s);
    println!(
        "Synodic period : {:.0} s ({})",
        report.synodic_period_s,
        format_duration(report.synodic_period_s.abs())
    );
    println!(
        "Phase angle    : current {:.2} deg, required {:.2} deg",
        report.current_phase_rad.to_degrees(),
        report.desired_phase_rad.to_degrees()
    );
    println!(
        "Hohmann est.   : TOF = {:.0} s ({}), dv1 = {:.3} km/s, dv2 = {:.3} km/s, total = {:.3} km/s",
        report.hohmann.tof_seconds,
        format_duration(report.hohmann.tof_seconds),
        report.hohmann.dv1_km_s,
        report.hohmann.dv2_km_s,
        report.hohmann.dv_total_km_s
    );

    for (index, window) in report.windows.iter().enumerate() {
        let status = if window.converged {
            format!("converged in {} iterations", window.iterations)
        } else {
            format!(
                "NOT converged after {} iterations, error {:.2} deg",
                window.iterations,
                window.final_error_rad.to_degrees()
            )
        };
        let departure = KerbinTime::from_seconds(window.time_s);
        println!(
            "Window {:<7} : {} (t = {:.0} s, wait {}) {}",
            index + 1,
            departure,
            window.time_s,
            format_duration(window.time_s - report.reference_time_s),
            status
        );
        println!(
            "  Arrival      : {}",
            departure.add_seconds(report.hohmann.tof_seconds)
        );
    }
}
