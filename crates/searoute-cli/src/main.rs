use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use searoute_cli::output::{
    render_mask_info, render_route, render_snap, MaskSummary, OutputFormat,
};
use searoute_cli::terminal::ColorPalette;
use searoute_lib::{
    resolve_mask_location, save_mask_file, CostModel, GeoCoordinate, MaskFormat, MaskSource,
    RouterConfig, SeaRouter, SimplifyMode, WaterGrid, WaterGridStore, DEFAULT_MAX_SNAP_RADIUS,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Water mask and sea-route utilities")]
struct Cli {
    /// Water mask path or http(s) URL. Defaults to SEAROUTE_MASK_PATH, then
    /// the platform data directory.
    #[arg(long, global = true)]
    mask: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Disable ANSI colors in text output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find a sea route between two coordinates.
    Route(RouteArgs),
    /// Move a coordinate onto the nearest navigable water cell.
    Snap(SnapArgs),
    /// Inspect or convert the water mask.
    #[command(subcommand)]
    Mask(MaskCommand),
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Departure as LAT,LON.
    #[arg(long, allow_hyphen_values = true)]
    from: GeoCoordinate,
    /// Arrival as LAT,LON.
    #[arg(long, allow_hyphen_values = true)]
    to: GeoCoordinate,
    /// Rings searched when snapping endpoints onto water.
    #[arg(long, default_value_t = DEFAULT_MAX_SNAP_RADIUS)]
    max_snap_radius: u32,
    /// Edge cost metric.
    #[arg(long, default_value_t = CostModel::Geographic)]
    cost: CostModel,
    /// Path thinning applied to the result.
    #[arg(long, default_value_t = SimplifyMode::Collinear)]
    simplify: SimplifyMode,
    /// Give up after settling this many cells.
    #[arg(long)]
    max_expansions: Option<usize>,
    /// Give up after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Disallow diagonal moves between two land cells.
    #[arg(long)]
    block_corner_cutting: bool,
    /// Require endpoints to already be on water instead of snapping them.
    #[arg(long)]
    no_snap: bool,
    /// Exit with an error instead of printing the straight-line fallback.
    #[arg(long)]
    strict: bool,
}

impl RouteArgs {
    fn router_config(&self) -> RouterConfig {
        RouterConfig {
            max_snap_radius: self.max_snap_radius,
            snap_endpoints: !self.no_snap,
            cost_model: self.cost,
            simplify: self.simplify,
            max_expansions: self.max_expansions,
            timeout_ms: self.timeout_ms,
            block_corner_cutting: self.block_corner_cutting,
        }
    }
}

#[derive(Args, Debug)]
struct SnapArgs {
    /// Coordinate as LAT,LON.
    #[arg(long, allow_hyphen_values = true)]
    at: GeoCoordinate,
    #[arg(long, default_value_t = DEFAULT_MAX_SNAP_RADIUS)]
    max_snap_radius: u32,
}

#[derive(Subcommand, Debug)]
enum MaskCommand {
    /// Print the mask geometry and water coverage.
    Info,
    /// Re-encode the mask as binary or JSON.
    Convert {
        /// Destination file.
        #[arg(long)]
        output: PathBuf,
        /// Target encoding; inferred from the output extension when omitted.
        #[arg(long)]
        to: Option<MaskFormat>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let palette = if cli.no_color {
        ColorPalette::plain()
    } else {
        ColorPalette::detect()
    };

    let (location, grid) = load_grid(cli.mask.as_deref()).await?;

    match cli.command {
        Command::Route(args) => handle_route(grid, &args, cli.format, &palette),
        Command::Snap(args) => handle_snap(grid, &args, cli.format, &palette),
        Command::Mask(MaskCommand::Info) => {
            let summary = MaskSummary::new(location, &grid);
            emit(render_mask_info(&summary, cli.format, &palette)?);
            Ok(())
        }
        Command::Mask(MaskCommand::Convert { output, to }) => {
            let format = to.unwrap_or_else(|| MaskFormat::from_path(&output));
            save_mask_file(&grid, &output, format)
                .with_context(|| format!("failed to write mask to {}", output.display()))?;
            println!("Mask written to {}", output.display());
            Ok(())
        }
    }
}

async fn load_grid(mask: Option<&str>) -> Result<(String, Arc<WaterGrid>)> {
    let location =
        resolve_mask_location(mask).context("failed to resolve the water mask location")?;
    let store = WaterGridStore::new(MaskSource::open(&location));
    let grid = store
        .load()
        .await
        .with_context(|| format!("failed to load water mask from {location}"))?;
    Ok((location, grid))
}

fn handle_route(
    grid: Arc<WaterGrid>,
    args: &RouteArgs,
    format: OutputFormat,
    palette: &ColorPalette,
) -> Result<()> {
    let router = SeaRouter::new(grid, args.router_config());
    let outcome = router.route(args.from, args.to);

    if let Some(reason) = outcome.reason() {
        if args.strict {
            bail!("no sea route from {} to {}: {reason}", args.from, args.to);
        }
        tracing::warn!(from = %args.from, to = %args.to, %reason, "using straight-line fallback");
    }

    emit(render_route(args.from, args.to, &outcome, format, palette)?);
    Ok(())
}

fn handle_snap(
    grid: Arc<WaterGrid>,
    args: &SnapArgs,
    format: OutputFormat,
    palette: &ColorPalette,
) -> Result<()> {
    let snapped = searoute_lib::snap(&grid, args.at, args.max_snap_radius);
    emit(render_snap(args.at, snapped.as_ref(), format, palette)?);
    Ok(())
}

fn emit(rendered: String) {
    if rendered.ends_with('\n') {
        print!("{rendered}");
    } else {
        println!("{rendered}");
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
