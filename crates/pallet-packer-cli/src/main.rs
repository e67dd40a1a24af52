use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use clap::{ArgAction, Args, Parser, Subcommand};
use handlebars::Handlebars;
use pallet_packer_core::config::{
    AlgorithmFamily, AutoMode, GuillotineChoice, GuillotineSplit, MaxRectsHeuristic,
    SkylineHeuristic,
};
use pallet_packer_core::render::{RenderOptions, render_svg_2d, render_svg_3d, save_png_2d};
use pallet_packer_core::{
    CartonSpec, PackerConfig, PalletPlan, SpecialLayout, StackConstraint, append_csv, plan,
    to_json, to_json_pretty,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

const DEFAULT_MAX_HEIGHT: u32 = 59;

#[derive(Parser, Debug)]
#[command(
    name = "pallet-packer",
    about = "Plan carton layers on a pallet",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan one carton: summary plus optional JSON/CSV/SVG/PNG/report outputs
    Plan(PlanArgs),
    /// Print the layer layout as JSON
    Layout(LayoutArgs),
    /// Plan every carton listed in a YAML file and append the rows to a CSV
    Batch(BatchArgs),
    /// Simple timing bench (plans one carton repeatedly, prints time + count)
    Bench(BenchArgs),
}

#[derive(Args, Debug, Clone)]
struct CartonArgs {
    /// Carton length (inches)
    #[arg(long, short = 'l', help_heading = "Carton")]
    length: u32,
    /// Carton width (inches)
    #[arg(long, short = 'w', help_heading = "Carton")]
    width: u32,
    /// Carton height (inches)
    #[arg(long, short = 'H', help_heading = "Carton")]
    height: u32,
    /// Maximum stack height above the pallet base (inches)
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT, help_heading = "Carton")]
    max_height: u32,
}

impl CartonArgs {
    fn specs(&self) -> anyhow::Result<(CartonSpec, StackConstraint)> {
        let carton = CartonSpec::new(self.length, self.width, self.height)?;
        let stack = StackConstraint::new(self.max_height)?;
        Ok((carton, stack))
    }
}

#[derive(Args, Debug, Clone)]
struct AlgoArgs {
    /// YAML config file path (overrides algorithm-related options)
    #[arg(long, help_heading = "Config")]
    config: Option<PathBuf>,

    // Pallet
    /// Pallet length (inches)
    #[arg(long, default_value_t = 48, help_heading = "Pallet")]
    pallet_length: u32,
    /// Pallet width (inches)
    #[arg(long, default_value_t = 40, help_heading = "Pallet")]
    pallet_width: u32,
    /// Pallet base block height (inches, rendering only)
    #[arg(long, default_value_t = 6, help_heading = "Pallet")]
    base_height: u32,

    // Algorithms/Heuristics/Auto
    /// Algorithm: skyline | maxrects | guillotine | auto
    #[arg(long, value_parser = ["skyline", "maxrects", "guillotine", "auto"], default_value = "auto", help_heading = "Algorithms")]
    algorithm: String,
    /// MaxRects heuristic: baf|bssf|blsf|bl|cp
    #[arg(long, default_value = "bssf", help_heading = "Heuristics")]
    heuristic: String,
    /// Skyline heuristic: bl|minwaste
    #[arg(long, default_value = "bl", help_heading = "Heuristics")]
    skyline: String,
    /// Guillotine choice: baf|bssf|blsf|waf|wssf|wlsf
    #[arg(long, default_value = "baf", help_heading = "Heuristics")]
    g_choice: String,
    /// Guillotine split: slas|llas|minas|maxas|sas|las
    #[arg(long, default_value = "slas", help_heading = "Heuristics")]
    g_split: String,
    /// Use waste map for skyline
    #[arg(long, default_value_t = false, help_heading = "Heuristics")]
    use_waste_map: bool,
    /// Let the mixed heuristic turn cartons 90deg
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Heuristics")]
    allow_rotation: bool,
    /// Candidates per orientation fed to the mixed heuristic
    #[arg(long, default_value_t = 1000, help_heading = "Heuristics")]
    candidate_supply: u32,
    /// Skip the built-in hand-tuned layouts
    #[arg(long, default_value_t = false, help_heading = "Heuristics")]
    no_special: bool,
    /// Auto mode: fast | quality
    #[arg(long, default_value = "quality", help_heading = "Auto/Portfolio")]
    auto_mode: String,
    /// Time budget for auto mode (ms)
    #[arg(long, help_heading = "Auto/Portfolio")]
    time_budget: Option<u64>,
    /// Evaluate auto candidates in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Auto/Portfolio")]
    parallel: bool,
}

/// Carton arguments of `plan`; only optional when `--print-config` is given.
#[derive(Args, Debug, Clone)]
struct PlanCartonArgs {
    /// Carton length (inches)
    #[arg(long, short = 'l', required_unless_present = "print_config", help_heading = "Carton")]
    length: Option<u32>,
    /// Carton width (inches)
    #[arg(long, short = 'w', required_unless_present = "print_config", help_heading = "Carton")]
    width: Option<u32>,
    /// Carton height (inches)
    #[arg(long, short = 'H', required_unless_present = "print_config", help_heading = "Carton")]
    height: Option<u32>,
    /// Maximum stack height above the pallet base (inches)
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT, help_heading = "Carton")]
    max_height: u32,
}

impl PlanCartonArgs {
    fn specs(&self) -> anyhow::Result<(CartonSpec, StackConstraint)> {
        match (self.length, self.width, self.height) {
            (Some(length), Some(width), Some(height)) => CartonArgs {
                length,
                width,
                height,
                max_height: self.max_height,
            }
            .specs(),
            _ => Err(anyhow!("--length, --width and --height are required")),
        }
    }
}

#[derive(Args, Debug, Clone)]
struct PlanArgs {
    #[command(flatten)]
    carton: PlanCartonArgs,
    #[command(flatten)]
    algo: AlgoArgs,

    // Export
    /// Write the plan as JSON to this file
    #[arg(long, help_heading = "Export")]
    json: Option<PathBuf>,
    /// Append a CSV row to this file (header written when the file is new)
    #[arg(long, help_heading = "Export")]
    export_csv: Option<PathBuf>,
    /// Render the layer diagram (.svg or .png)
    #[arg(long, help_heading = "Export")]
    render_2d: Option<PathBuf>,
    /// Render an isometric view of the stack (.svg)
    #[arg(long, help_heading = "Export")]
    render_3d: Option<PathBuf>,
    /// Pixels per inch for renders
    #[arg(long, default_value_t = 10, help_heading = "Export")]
    scale: u32,
    /// Handlebars report template (built-in text report when only --report is set)
    #[arg(long, help_heading = "Export")]
    template: Option<PathBuf>,
    /// Write the rendered report here instead of stdout
    #[arg(long, help_heading = "Export")]
    report: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit: json|yaml
    #[arg(long, num_args = 0..=1, default_missing_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config: Option<String>,
    /// Dry run: compute the plan but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Args, Debug, Clone)]
struct LayoutArgs {
    #[command(flatten)]
    carton: CartonArgs,
    #[command(flatten)]
    algo: AlgoArgs,
}

#[derive(Args, Debug, Clone)]
struct BatchArgs {
    /// YAML list of cartons: [{length, width, height, max_height?}, ...]
    input: PathBuf,
    #[command(flatten)]
    algo: AlgoArgs,
    /// CSV file the rows are appended to
    #[arg(long, default_value = "pallet_plans.csv")]
    export_csv: PathBuf,
    /// Max stack height for entries that do not set one
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT)]
    max_height: u32,
    /// Dry run: plan and log but do not write the CSV
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Args, Debug, Clone)]
struct BenchArgs {
    #[command(flatten)]
    carton: CartonArgs,
    #[command(flatten)]
    algo: AlgoArgs,
    /// Number of timed runs
    #[arg(long, default_value_t = 10)]
    iterations: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Plan(args) => run_plan(args),
        Commands::Layout(args) => run_layout(args),
        Commands::Batch(args) => run_batch(args, cli.progress && !cli.quiet),
        Commands::Bench(args) => run_bench(args),
    }
}

fn run_plan(args: &PlanArgs) -> anyhow::Result<()> {
    if let Some(path) = &args.render_3d {
        ensure_svg_path(path)?;
    }
    let cfg = build_config(&args.algo)?;
    if let Some(format) = &args.print_config {
        match format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let (carton, stack) = args.carton.specs()?;
    let out = plan(carton, stack, &cfg).with_context(|| {
        format!(
            "plan {}x{}x{} (max height {})",
            carton.length, carton.width, carton.height, stack.max_height
        )
    })?;

    println!("{}", out.stats().summary());
    if !out.fits() {
        println!("carton does not fit on the pallet");
    }

    if let Some(path) = &args.json {
        write_output(path, to_json_pretty(&out)?, args.dry_run)?;
    }
    if let Some(path) = &args.export_csv {
        if !args.dry_run {
            append_csv(path, std::slice::from_ref(&out))
                .with_context(|| format!("append {}", path.display()))?;
            info!(?path, "csv row appended");
        }
    }

    let opts = RenderOptions {
        scale: args.scale,
        ..RenderOptions::default()
    };
    if out.fits() {
        if let Some(path) = &args.render_2d {
            if is_png(path) {
                if !args.dry_run {
                    save_png_2d(&out, &opts, path)
                        .with_context(|| format!("write {}", path.display()))?;
                    info!(?path, "layer diagram written");
                }
            } else {
                write_output(path, render_svg_2d(&out, &opts), args.dry_run)?;
            }
        }
        if let Some(path) = &args.render_3d {
            write_output(path, render_svg_3d(&out, &opts), args.dry_run)?;
        }
    } else if args.render_2d.is_some() || args.render_3d.is_some() {
        warn!("nothing to draw");
    }

    if args.template.is_some() || args.report.is_some() {
        let rendered = render_report(&out, args.template.as_deref())?;
        match &args.report {
            Some(path) => write_output(path, rendered, args.dry_run)?,
            None => print!("{rendered}"),
        }
    }
    Ok(())
}

fn run_layout(args: &LayoutArgs) -> anyhow::Result<()> {
    let cfg = build_config(&args.algo)?;
    let (carton, stack) = args.carton.specs()?;
    let out = plan(carton, stack, &cfg)?;
    let json = to_json(&out);
    println!("{}", serde_json::to_string_pretty(&json["layer"])?);
    Ok(())
}

#[derive(Debug, Deserialize)]
struct BatchCarton {
    length: u32,
    width: u32,
    height: u32,
    max_height: Option<u32>,
}

fn run_batch(args: &BatchArgs, show_progress: bool) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    let cfg = build_config(&args.algo)?;
    let file = fs::read_to_string(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;
    let entries: Vec<BatchCarton> = serde_yaml::from_str(&file)
        .with_context(|| format!("parse {}", args.input.display()))?;
    info!(count = entries.len(), "loaded cartons");

    let bar = if show_progress {
        let b = ProgressBar::new(entries.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} planning {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };

    let mut plans: Vec<PalletPlan> = Vec::with_capacity(entries.len());
    for e in &entries {
        let max_height = e.max_height.unwrap_or(args.max_height);
        if let Some(b) = &bar {
            b.set_message(format!("{}x{}x{}", e.length, e.width, e.height));
        }
        let result = CartonSpec::new(e.length, e.width, e.height)
            .and_then(|c| Ok((c, StackConstraint::new(max_height)?)))
            .and_then(|(c, s)| plan(c, s, &cfg));
        match result {
            Ok(p) => plans.push(p),
            Err(err) => {
                error!(
                    length = e.length,
                    width = e.width,
                    height = e.height,
                    error = %err,
                    "skip carton"
                );
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }

    let infeasible = plans.iter().filter(|p| !p.fits()).count();
    let total: u64 = plans.iter().map(|p| p.total_cartons).sum();
    info!(
        planned = plans.len(),
        skipped = entries.len() - plans.len(),
        infeasible,
        total,
        "batch done"
    );
    if !args.dry_run {
        append_csv(&args.export_csv, &plans)
            .with_context(|| format!("append {}", args.export_csv.display()))?;
        info!(path = ?args.export_csv, rows = plans.len(), "csv written");
    }
    Ok(())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    let cfg = build_config(&b.algo)?;
    let (carton, stack) = b.carton.specs()?;
    let runs = b.iterations.max(1);
    let mut best = Duration::MAX;
    let mut last = None;
    for _ in 0..runs {
        let start = Instant::now();
        let out = plan(carton, stack, &cfg)?;
        best = best.min(start.elapsed());
        last = Some(out);
    }
    let out = last.ok_or_else(|| anyhow!("no runs"))?;
    println!(
        "kind={} per_layer={} total={} time={} (best of {})",
        out.layout.kind,
        out.layout.cartons_per_layer,
        out.total_cartons,
        bench_fmt_dur(best),
        runs
    );
    Ok(())
}

fn bench_fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn build_config(args: &AlgoArgs) -> anyhow::Result<PackerConfig> {
    let mut cfg = PackerConfig::builder()
        .with_pallet(args.pallet_length, args.pallet_width)
        .base_height(args.base_height)
        .allow_rotation(args.allow_rotation)
        .candidate_supply(args.candidate_supply)
        .family(parse_opt::<AlgorithmFamily>(&args.algorithm, "algorithm")?)
        .mr_heuristic(parse_opt::<MaxRectsHeuristic>(&args.heuristic, "heuristic")?)
        .skyline_heuristic(parse_opt::<SkylineHeuristic>(&args.skyline, "skyline heuristic")?)
        .g_choice(parse_opt::<GuillotineChoice>(&args.g_choice, "guillotine choice")?)
        .g_split(parse_opt::<GuillotineSplit>(&args.g_split, "guillotine split")?)
        .auto_mode(parse_opt::<AutoMode>(&args.auto_mode, "auto mode")?)
        .use_waste_map(args.use_waste_map)
        .time_budget_ms(args.time_budget)
        .parallel(args.parallel)
        .builtin_special_layouts(!args.no_special)
        .build();

    // Config file sets algorithm-related options en bloc
    if let Some(path) = &args.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let y: YamlConfig =
            serde_yaml::from_str(&file).with_context(|| format!("parse {}", path.display()))?;
        cfg = y.into_packer_config(cfg);
    }
    cfg.validate()?;
    Ok(cfg)
}

fn parse_opt<T: std::str::FromStr>(value: &str, what: &str) -> anyhow::Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("unknown {}: {}", what, value))
}

/// The 3D view is only rendered as SVG.
fn ensure_svg_path(path: &Path) -> anyhow::Result<()> {
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if !is_svg {
        anyhow::bail!("--render-3d writes SVG only: {}", path.display());
    }
    Ok(())
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

fn write_output(path: &Path, contents: String, dry_run: bool) -> anyhow::Result<()> {
    if dry_run {
        info!(?path, bytes = contents.len(), "dry run: skip write");
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))?;
    info!(?path, "written");
    Ok(())
}

#[derive(Serialize)]
struct ReportContext {
    app: &'static str,
    version: &'static str,
    fits: bool,
    area_pct: String,
    volume_pct: String,
    plan: serde_json::Value,
}

fn render_report(out: &PalletPlan, template: Option<&Path>) -> anyhow::Result<String> {
    let tpl_owned_from_file: Option<String> = match template {
        Some(path) => Some(
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?,
        ),
        None => None,
    };
    let tpl_ref: &str = match &tpl_owned_from_file {
        Some(s) => s.as_str(),
        None => include_str!("templates/report.hbs"),
    };
    let ctx = ReportContext {
        app: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        fits: out.fits(),
        area_pct: format!("{:.2}", out.area_utilization),
        volume_pct: format!("{:.2}", out.volume_utilization),
        plan: to_json(out),
    };

    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    reg.register_template_string("tpl", tpl_ref)?;
    Ok(reg.render("tpl", &ctx)?)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    family: Option<String>,
    heuristic: Option<String>,
    skyline: Option<String>,
    g_choice: Option<String>,
    g_split: Option<String>,
    auto_mode: Option<String>,
    pallet_length: Option<u32>,
    pallet_width: Option<u32>,
    base_height: Option<u32>,
    allow_rotation: Option<bool>,
    candidate_supply: Option<u32>,
    use_waste_map: Option<bool>,
    time_budget_ms: Option<u64>,
    parallel: Option<bool>,
    builtin_special_layouts: Option<bool>,
    special_layouts: Option<Vec<SpecialLayout>>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> PackerConfig {
        if let Some(v) = self.pallet_length {
            cfg.pallet.length = v;
        }
        if let Some(v) = self.pallet_width {
            cfg.pallet.width = v;
        }
        if let Some(v) = self.base_height {
            cfg.pallet.base_height = v;
        }
        if let Some(v) = self.allow_rotation {
            cfg.allow_rotation = v;
        }
        if let Some(v) = self.candidate_supply {
            cfg.candidate_supply = v;
        }
        if let Some(v) = self.use_waste_map {
            cfg.use_waste_map = v;
        }
        if let Some(v) = self.time_budget_ms {
            cfg.time_budget_ms = Some(v);
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        if let Some(v) = self.builtin_special_layouts {
            cfg.builtin_special_layouts = v;
        }
        if let Some(v) = self.special_layouts {
            cfg.special_layouts = v;
        }
        if let Some(v) = self.family {
            cfg.family = v.parse().unwrap_or(cfg.family);
        }
        if let Some(v) = self.heuristic {
            cfg.mr_heuristic = v.parse().unwrap_or(cfg.mr_heuristic);
        }
        if let Some(v) = self.skyline {
            cfg.skyline_heuristic = v.parse().unwrap_or(cfg.skyline_heuristic);
        }
        if let Some(v) = self.g_choice {
            cfg.g_choice = v.parse().unwrap_or(cfg.g_choice);
        }
        if let Some(v) = self.g_split {
            cfg.g_split = v.parse().unwrap_or(cfg.g_split);
        }
        if let Some(v) = self.auto_mode {
            cfg.auto_mode = v.parse().unwrap_or(cfg.auto_mode);
        }
        cfg
    }
}
