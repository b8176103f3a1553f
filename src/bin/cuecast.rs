use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cuecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a request and print its commands without running them.
    Plan(PlanArgs),
    /// Compile a request and render it (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Composer config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// `{ "path": seconds }` JSON used instead of ffprobe.
    #[arg(long)]
    durations: Option<PathBuf>,

    /// Directory caption and list files are written under.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Seconds after which a single ffprobe call is abandoned.
    #[arg(long)]
    probe_timeout: Option<f64>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Composer config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory all relative paths resolve against.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Seconds after which a single ffprobe call is abandoned.
    #[arg(long)]
    probe_timeout: Option<f64>,

    /// Seconds after which a single ffmpeg step is killed.
    #[arg(long)]
    render_timeout: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cuecast=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_request(path: &Path) -> anyhow::Result<cuecast::RenderRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read request '{}'", path.display()))?;
    Ok(cuecast::RenderRequest::from_json_str(&text)?)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<cuecast::ComposerConfig> {
    match path {
        Some(p) => Ok(cuecast::ComposerConfig::from_json_file(p)?),
        None => Ok(cuecast::ComposerConfig::default()),
    }
}

fn timeout(secs: Option<f64>) -> anyhow::Result<Option<Duration>> {
    secs.map(|s| {
        Duration::try_from_secs_f64(s).with_context(|| format!("invalid timeout '{s}'"))
    })
    .transpose()
}

fn ffprobe(work_dir: &Path, secs: Option<f64>) -> anyhow::Result<cuecast::FfprobeDurationProbe> {
    let probe = cuecast::FfprobeDurationProbe::in_dir(work_dir);
    Ok(match timeout(secs)? {
        Some(t) => probe.with_timeout(t),
        None => probe,
    })
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let request = read_request(&args.in_path)?;
    let cfg = load_config(args.config.as_deref())?;
    let probe: Arc<dyn cuecast::DurationProbe> = match &args.durations {
        Some(p) => Arc::new(cuecast::StaticDurationProbe::from_json_file(p)?),
        None => Arc::new(ffprobe(&args.work_dir, args.probe_timeout)?),
    };

    let composer = cuecast::Composer::new(cfg, probe, Arc::new(cuecast::RecordingRenderer::new()));
    let ws = cuecast::Workspace::new(&args.work_dir);
    let comp = composer.plan(&request, &ws)?;

    for failure in &comp.timeline.probe_failures {
        eprintln!(
            "warning: no duration for {}: {}",
            failure.source.display(),
            failure.reason
        );
    }
    for step in &comp.steps {
        println!("# {}", step.label);
        println!("{}", step.command);
    }
    eprintln!(
        "total {:.2}s, output {}",
        comp.timeline.total_duration,
        comp.output_path.display()
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    for tool in ["ffmpeg", "ffprobe"] {
        if !cuecast::is_tool_on_path(tool) {
            anyhow::bail!("{tool} is required for rendering, but was not found on PATH");
        }
    }

    let request = read_request(&args.in_path)?;
    let cfg = load_config(args.config.as_deref())?;
    let mut renderer = cuecast::ShellRenderer::in_dir(&args.work_dir);
    if let Some(t) = timeout(args.render_timeout)? {
        renderer = renderer.with_timeout(t);
    }
    let composer = cuecast::Composer::new(
        cfg,
        Arc::new(ffprobe(&args.work_dir, args.probe_timeout)?),
        Arc::new(renderer),
    );
    let ws = cuecast::Workspace::new(&args.work_dir);
    let comp = composer.run(&request, &ws)?;

    println!("{}", comp.url);
    eprintln!("wrote {}", ws.resolve(&comp.output_path).display());
    Ok(())
}
