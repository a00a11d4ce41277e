use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use particle_painting::{
    AssetFormat, ExternalConversion, ExternalScript, FrameIndex, GenerationRequest,
    GeneratorConfig, Pipeline, SourceImage, UploadRecord,
};

#[derive(Parser, Debug)]
#[command(name = "particle-painting", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the readiness payload.
    Status,
    /// Run an image file through the upload handler and print the JSON response.
    Generate(GenerateArgs),
    /// Render a single animation frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory for published animations (overrides config).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Directory for saved uploads (overrides config).
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatChoice::Gif)]
    format: FormatChoice,

    /// How the animation is produced.
    #[arg(long, value_enum, default_value_t = StrategyChoice::Native)]
    strategy: StrategyChoice,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Generator config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Conversion script (external strategy only).
    #[arg(long)]
    script: Option<PathBuf>,

    /// Interpreter used to run `--script`.
    #[arg(long, default_value = "python3")]
    interpreter: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Generator config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Gif,
    Mp4,
    Still,
}

impl From<FormatChoice> for AssetFormat {
    fn from(c: FormatChoice) -> Self {
        match c {
            FormatChoice::Gif => AssetFormat::Gif,
            FormatChoice::Mp4 => AssetFormat::Mp4,
            FormatChoice::Still => AssetFormat::StillPng,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyChoice {
    Native,
    External,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Status => cmd_status(),
        Command::Generate(args) => cmd_generate(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<GeneratorConfig> {
    let cfg = match path {
        Some(p) => GeneratorConfig::from_json_path(p)?,
        None => GeneratorConfig::default(),
    };
    let cfg = cfg.with_env_overrides()?;
    Ok(match seed {
        Some(s) => cfg.with_seed(s),
        None => cfg,
    })
}

fn cmd_status() -> anyhow::Result<()> {
    let resp = particle_painting::handle_status();
    println!("{}", serde_json::to_string_pretty(&resp.body)?);
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref(), args.seed)?;
    if let Some(dir) = args.out_dir {
        cfg.paths.output_dir = dir;
    }
    if let Some(dir) = args.upload_dir {
        cfg.paths.upload_dir = dir;
    }

    let pipeline = match (args.strategy, args.script) {
        (StrategyChoice::External, Some(script)) => {
            let backend = ExternalScript::new(args.interpreter, script)
                .with_output_dir(cfg.paths.output_dir.clone());
            let strategy = ExternalConversion::new(backend, cfg.paths.clone());
            Pipeline::new(cfg, strategy)?
        }
        (StrategyChoice::External, None) => {
            anyhow::bail!("--script is required with --strategy external")
        }
        (StrategyChoice::Native, _) => Pipeline::native(cfg)?,
    };

    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?;
    let file_name = args
        .in_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    let record = UploadRecord::new(file_name, media_type_for(&args.in_path), bytes);

    let request = GenerationRequest::new(args.format.into());
    let resp = particle_painting::handle_upload(&pipeline, Some(record), &request);
    println!("{}", serde_json::to_string_pretty(&resp.body)?);

    if !resp.is_success() {
        anyhow::bail!("generation failed with status {}", resp.status);
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref(), args.seed)?;
    let source = SourceImage::open(&args.in_path, cfg.max_dimension)?;
    let frame = particle_painting::render_frame_at(source, &cfg, FrameIndex(args.frame))?;

    particle_painting::encode::assembler::write_png(&frame, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn media_type_for(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}
