use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "segmask", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render annotation payloads into a class mask PNG.
    Render(RenderArgs),
    /// Process a HIT payload JSON into a mask submission JSON.
    Hit(HitArgs),
    /// Print the colour assigned to each class.
    Color(ColorArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Hyphen-joined class vocabulary.
    #[arg(long, default_value = segmask::DEFAULT_CLASS_LIST)]
    classes: String,

    /// Image width in pixels.
    #[arg(long)]
    width: u32,

    /// Image height in pixels.
    #[arg(long)]
    height: u32,

    /// File holding the in-progress annotation payload.
    #[arg(long = "in-progress")]
    in_progress: Option<PathBuf>,

    /// File holding the finalized annotation payload.
    #[arg(long = "final")]
    finalized: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Print the SHA-256 of the raw mask pixels.
    #[arg(long)]
    digest: bool,
}

#[derive(Parser, Debug)]
struct HitArgs {
    /// Input HIT payload JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output submission JSON.
    #[arg(long)]
    out: PathBuf,

    /// Also write the mask as a PNG.
    #[arg(long)]
    png: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ColorArgs {
    /// Hyphen-joined class vocabulary.
    #[arg(long, default_value = segmask::DEFAULT_CLASS_LIST)]
    classes: String,

    /// Classes to look up.
    #[arg(required = true)]
    names: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Hit(args) => cmd_hit(args),
        Command::Color(args) => cmd_color(args),
    }
}

fn read_payload(path: Option<&Path>) -> anyhow::Result<Option<String>> {
    path.map(|p| {
        std::fs::read_to_string(p).with_context(|| format!("read payload '{}'", p.display()))
    })
    .transpose()
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let in_progress = read_payload(args.in_progress.as_deref())?;
    let finalized = read_payload(args.finalized.as_deref())?;

    let loaded = segmask::load_annotations(in_progress.as_deref(), finalized.as_deref());

    let colors = segmask::ColorAssigner::from_class_list(&args.classes);
    let settings = segmask::RenderSettings::from_env();
    let request = segmask::RenderRequest::from_loaded(args.width, args.height, loaded)?;
    let surface = segmask::MaskCompositor::new(&colors)
        .with_settings(settings)
        .render(&request)
        .context("render mask")?;

    segmask::write_png(&surface, &args.out)?;
    if args.digest {
        println!("{}", sha256_hex(&surface.data));
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_hit(args: HitArgs) -> anyhow::Result<()> {
    let f = File::open(&args.in_path)
        .with_context(|| format!("open HIT payload '{}'", args.in_path.display()))?;
    let payload: segmask::HitPayload =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse HIT payload JSON")?;

    let outcome = segmask::process_hit(&payload, &segmask::RenderSettings::from_env())?;

    if let Some(png) = &args.png {
        segmask::write_png(&outcome.surface, png)?;
    }
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let out = File::create(&args.out)
        .with_context(|| format!("create submission '{}'", args.out.display()))?;
    serde_json::to_writer_pretty(out, &outcome.submission)
        .with_context(|| "write submission JSON")?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_color(args: ColorArgs) -> anyhow::Result<()> {
    let colors = segmask::ColorAssigner::from_class_list(&args.classes);
    for name in &args.names {
        let index = colors
            .index_of(name)
            .with_context(|| format!("class '{name}' is not in the vocabulary"))?;
        let rgb = colors.color_for(name)?;
        println!("{name} {index} {} {} {}", rgb.r, rgb.g, rgb.b);
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
