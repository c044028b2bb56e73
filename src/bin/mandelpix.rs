use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mandelpix::{
    BackendKind, BackendPrefs, RenderSpec, RenderThreading, render_image, write_pgm, write_png,
};

#[derive(Parser, Debug)]
#[command(name = "mandelpix", version, about = "Render the Mandelbrot set as a grayscale raster")]
struct Cli {
    /// Output image width in pixels.
    #[arg(short = 'w', long, default_value_t = 1440)]
    width: u32,

    /// Output image height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Maximum escape-time iterations (1..=65535). Above 256 the output switches to
    /// 16-bit samples.
    #[arg(short = 'k', long, default_value_t = 256)]
    iterations: u32,

    /// Real-axis bounds as 'lo:hi'.
    #[arg(short = 'x', long, value_parser = parse_limits, default_value = "-2.5:1.5", allow_hyphen_values = true)]
    xlim: [f32; 2],

    /// Imaginary-axis bounds as 'lo:hi'.
    #[arg(short = 'y', long, value_parser = parse_limits, default_value = "-1.5:1.5", allow_hyphen_values = true)]
    ylim: [f32; 2],

    /// Load the render spec from a JSON file instead of the geometry flags.
    #[arg(long, conflicts_with_all = ["width", "height", "iterations", "xlim", "ylim"])]
    spec: Option<PathBuf>,

    /// Force a specific compute backend instead of auto-selection.
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Disable the AVX backend.
    #[cfg(target_arch = "x86_64")]
    #[arg(short = 'A', long, default_value_t = false)]
    no_avx: bool,

    /// Disable the SSE2 backend.
    #[cfg(target_arch = "x86_64")]
    #[arg(short = 'S', long, default_value_t = false)]
    no_sse2: bool,

    /// Disable the NEON backend.
    #[cfg(target_arch = "aarch64")]
    #[arg(short = 'N', long, default_value_t = false)]
    no_neon: bool,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Output path. Without it, PGM goes to stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "pgm")]
    format: Format,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Format {
    /// Binary netpbm graymap (P5).
    Pgm,
    /// Grayscale PNG (8- or 16-bit to match the sample width).
    Png,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum BackendArg {
    Scalar,
    #[cfg(target_arch = "x86_64")]
    Avx,
    #[cfg(target_arch = "x86_64")]
    Sse2,
    #[cfg(target_arch = "aarch64")]
    Neon,
}

impl BackendArg {
    fn kind(self) -> BackendKind {
        match self {
            BackendArg::Scalar => BackendKind::Scalar,
            #[cfg(target_arch = "x86_64")]
            BackendArg::Avx => BackendKind::Avx,
            #[cfg(target_arch = "x86_64")]
            BackendArg::Sse2 => BackendKind::Sse2,
            #[cfg(target_arch = "aarch64")]
            BackendArg::Neon => BackendKind::Neon,
        }
    }
}

fn parse_limits(s: &str) -> Result<[f32; 2], String> {
    let (lo, hi) = s
        .split_once(':')
        .ok_or_else(|| format!("expected 'lo:hi', got '{s}'"))?;
    let lo: f32 = lo
        .trim()
        .parse()
        .map_err(|e| format!("bad lower bound '{lo}': {e}"))?;
    let hi: f32 = hi
        .trim()
        .parse()
        .map_err(|e| format!("bad upper bound '{hi}': {e}"))?;
    Ok([lo, hi])
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let spec = match &args.spec {
        Some(path) => RenderSpec::from_path(path)
            .with_context(|| format!("load render spec '{}'", path.display()))?,
        None => RenderSpec::new(args.width, args.height, args.iterations, args.xlim, args.ylim)?,
    };

    let mut prefs = BackendPrefs {
        force: args.backend.map(BackendArg::kind),
        ..BackendPrefs::default()
    };
    #[cfg(target_arch = "x86_64")]
    {
        prefs.use_avx = !args.no_avx;
        prefs.use_sse2 = !args.no_sse2;
    }
    #[cfg(target_arch = "aarch64")]
    {
        prefs.use_neon = !args.no_neon;
    }

    let threading = RenderThreading {
        threads: args.threads,
    };
    let image = render_image(&spec, &prefs, &threading)?;

    match (args.format, &args.out) {
        (Format::Png, None) => anyhow::bail!("--format png requires --out"),
        (Format::Png, Some(path)) => {
            ensure_parent_dir(path)?;
            write_png(path, &spec, &image)?;
            eprintln!("wrote {}", path.display());
        }
        (Format::Pgm, Some(path)) => {
            ensure_parent_dir(path)?;
            let file = std::fs::File::create(path)
                .with_context(|| format!("create '{}'", path.display()))?;
            let mut w = std::io::BufWriter::new(file);
            write_pgm(&mut w, &spec, &image)?;
            w.flush()?;
            eprintln!("wrote {}", path.display());
        }
        (Format::Pgm, None) => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_pgm(&mut lock, &spec, &image)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn ensure_parent_dir(path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
