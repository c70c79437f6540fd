use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use flipbook::{
    AnimationKind, CueBuffer, CueSink, Flipbook, FlipbookConfig, FrameRGBA, PageBitmap, PageBox,
    PageSequence, Point, RenderSettings, compose_frame, synthesize_flip_cue, write_cue_f32le,
};

#[derive(Parser, Debug)]
#[command(name = "flipbook", version)]
struct Cli {
    /// Optional configuration JSON; defaults apply to missing fields.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one curl frame as a PNG.
    Frame(FrameArgs),
    /// Simulate a drag and release, writing every frame and the flip cue.
    Flip(FlipArgs),
    /// Write one synthesized flip cue as raw little-endian f32 mono PCM.
    Cue(CueArgs),
}

#[derive(Parser, Debug)]
struct PageArgs {
    /// Directory of page images (PNG/JPEG), ordered by file name. Solid demo
    /// pages are generated when omitted.
    #[arg(long)]
    pages: Option<PathBuf>,

    /// Number of demo pages.
    #[arg(long, default_value_t = 4)]
    demo_pages: usize,

    /// Page box width in logical units.
    #[arg(long, default_value_t = 420.0)]
    width: f64,

    /// Page box height; derived from the first page's aspect ratio when omitted.
    #[arg(long)]
    height: Option<f64>,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// Corner the drag starts from.
    #[arg(long, value_enum, default_value_t = CornerChoice::BottomRight)]
    corner: CornerChoice,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    pages: PageArgs,

    /// Pointer position as `x,y` in page units.
    #[arg(long, value_parser = parse_point)]
    pointer: Point,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FlipArgs {
    #[command(flatten)]
    pages: PageArgs,

    /// Release position as `x,y` in page units.
    #[arg(long, value_parser = parse_point)]
    release: Point,

    /// Frames spent dragging from the corner to the release point.
    #[arg(long, default_value_t = 12)]
    drag_frames: u32,

    /// Frame rate of the simulated host.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Output directory for `frame_NNNN.png` and `cue_NN.f32le`.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct CueArgs {
    #[arg(long, default_value_t = 48_000)]
    sample_rate: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output `.f32le` path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CornerChoice {
    BottomRight,
    TopRight,
    BottomLeft,
    TopLeft,
}

impl CornerChoice {
    /// A press point just inside the corner.
    fn press_point(self, page_box: PageBox) -> Point {
        let (w, h) = (page_box.width, page_box.height);
        match self {
            Self::BottomRight => Point::new(w - 2.0, h - 2.0),
            Self::TopRight => Point::new(w - 2.0, 2.0),
            Self::BottomLeft => Point::new(2.0, h - 2.0),
            Self::TopLeft => Point::new(2.0, 2.0),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args, config),
        Command::Flip(args) => cmd_flip(args, config),
        Command::Cue(args) => cmd_cue(args),
    }
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    Ok(Point::new(x, y))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FlipbookConfig> {
    let mut config = match path {
        Some(p) => FlipbookConfig::from_json_file(p)?,
        None => FlipbookConfig::default(),
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn demo_pages(n: usize) -> anyhow::Result<PageSequence> {
    const COLORS: [[u8; 4]; 4] = [
        [236, 228, 212, 255],
        [196, 214, 230, 255],
        [214, 230, 196, 255],
        [230, 200, 196, 255],
    ];
    let mut pages = Vec::with_capacity(n.max(1));
    for i in 0..n.max(1) {
        pages.push(PageBitmap::solid(210, 297, COLORS[i % COLORS.len()])?);
    }
    Ok(PageSequence::new(pages))
}

fn open_book(args: &PageArgs, config: FlipbookConfig) -> anyhow::Result<Flipbook> {
    let pages = match &args.pages {
        Some(dir) => flipbook::load_page_dir(dir)?,
        None => demo_pages(args.demo_pages)?,
    };
    let aspect = flipbook::PageSource::aspect_ratio(&pages)
        .unwrap_or(config.layout.default_aspect_ratio);
    let height = args.height.unwrap_or((args.width / aspect).round());
    let page_box = PageBox::new(args.width, height, args.dpr)?;
    Ok(Flipbook::new(pages, page_box, config, 0.0)?)
}

fn render(book: &Flipbook, backend: &mut flipbook::CpuBackend) -> anyhow::Result<FrameRGBA> {
    let stack = compose_frame(&book.curl_frame(), book.config());
    Ok(backend.render(&stack, book.pages())?)
}

fn backend_for(config: &FlipbookConfig) -> flipbook::CpuBackend {
    flipbook::CpuBackend::new(RenderSettings::with_clear(config.palette.clear))
}

fn write_png(frame: &FrameRGBA, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))
}

fn cmd_frame(args: FrameArgs, config: FlipbookConfig) -> anyhow::Result<()> {
    let mut backend = backend_for(&config);
    let mut book = open_book(&args.pages, config)?;
    let press = args.pages.corner.press_point(book.page_box());
    if book.pointer_down(press) {
        book.pointer_move(args.pointer);
    } else {
        eprintln!("no neighbor page for that corner; rendering flat");
    }

    let frame = render(&book, &mut backend)?;
    write_png(&frame, &args.out)?;
    eprintln!(
        "wrote {} (progress {:.3})",
        args.out.display(),
        book.curl_frame().progress()
    );
    Ok(())
}

/// Writes each cue it receives as `cue_NN.f32le`.
struct FileCueSink {
    dir: PathBuf,
    written: usize,
}

impl CueSink for FileCueSink {
    fn play(&mut self, cue: &CueBuffer) -> anyhow::Result<()> {
        let path = self.dir.join(format!("cue_{:02}.f32le", self.written));
        write_cue_f32le(cue, &path)?;
        self.written += 1;
        Ok(())
    }
}

fn cmd_flip(args: FlipArgs, config: FlipbookConfig) -> anyhow::Result<()> {
    anyhow::ensure!(args.fps > 0.0, "fps must be > 0");
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut backend = backend_for(&config);
    let sink = FileCueSink {
        dir: args.out_dir.clone(),
        written: 0,
    };
    let mut book = open_book(&args.pages, config)?.with_cue_sink(Box::new(sink));

    let frame_ms = 1000.0 / args.fps;
    let mut now = 0.0;
    let mut index = 0u32;
    let mut emit = |book: &Flipbook, index: &mut u32| -> anyhow::Result<()> {
        let frame = render(book, &mut backend)?;
        write_png(&frame, &args.out_dir.join(format!("frame_{:04}.png", *index)))?;
        *index += 1;
        Ok(())
    };

    let press = args.pages.corner.press_point(book.page_box());
    anyhow::ensure!(
        book.pointer_down(press),
        "the chosen corner has no neighbor page to flip to"
    );
    let steps = args.drag_frames.max(1);
    for i in 1..=steps {
        let t = f64::from(i) / f64::from(steps);
        book.pointer_move(press.lerp(args.release, t));
        emit(&book, &mut index)?;
        now += frame_ms;
    }

    let kind = book
        .pointer_up(now)
        .context("release did not start an animation")?;
    eprintln!("released: {kind:?}");

    // A generous cap; every animation ends in well under a second.
    for _ in 0..(args.fps * 10.0).ceil() as u32 {
        now += frame_ms;
        let tick = book.tick(now);
        emit(&book, &mut index)?;
        if matches!(
            tick.finished,
            Some(AnimationKind::CompleteFlip | AnimationKind::SnapBack)
        ) {
            break;
        }
    }

    eprintln!(
        "wrote {index} frames to {}; now on page {}",
        args.out_dir.display(),
        book.status().label()
    );
    Ok(())
}

fn cmd_cue(args: CueArgs) -> anyhow::Result<()> {
    let cue = synthesize_flip_cue(args.sample_rate, args.seed)?;
    write_cue_f32le(&cue, &args.out)?;
    eprintln!(
        "wrote {} ({} samples, peak {:.3})",
        args.out.display(),
        cue.samples.len(),
        cue.peak()
    );
    Ok(())
}
