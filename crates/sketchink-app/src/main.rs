//! Command-line entry point.
//!
//! Replays a saved drawing through a session and writes it out:
//!
//! ```text
//! sketchink <drawing.json> [--events] [--config <file.json>] [--size <W>x<H>]
//!           [--background <#hex>] [--out <file.png|jpg|webp>]
//!           [--format png|jpeg|webp] [--quality <0-100>]
//! ```
//!
//! The input is a point dump, or with `--events` a list of recorded pointer
//! events. Without `--out` or `--format` the SVG document goes to stdout.
//! `--format` prints a base64 snapshot instead and `--out` writes raw image
//! bytes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use kurbo::Size;
use sketchink_core::{
    CodecError, Color, ImageFormat, PointerEvent, SessionConfig, SessionController, SnapshotOptions,
};
use sketchink_render::{RasterRenderer, RenderContext, Renderer, RendererError};
use thiserror::Error;

const DEFAULT_SIZE: Size = Size::new(800.0, 600.0);

#[derive(Debug, Error)]
enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Render(#[from] RendererError),
}

#[derive(Debug, Default)]
struct Args {
    input: PathBuf,
    events: bool,
    config: Option<PathBuf>,
    size: Option<Size>,
    background: Option<Color>,
    out: Option<PathBuf>,
    format: Option<ImageFormat>,
    quality: Option<u8>,
}

fn parse_format(name: &str) -> Option<ImageFormat> {
    match name.to_ascii_lowercase().as_str() {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "webp" => Some(ImageFormat::Webp),
        _ => None,
    }
}

fn usage(message: String) -> AppError {
    AppError::Usage(message)
}

fn parse_size(value: &str) -> Option<Size> {
    let (w, h) = value.split_once(['x', 'X'])?;
    Some(Size::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, AppError> {
        let mut parsed = Args::default();
        let mut input = None;

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| AppError::Usage(format!("{flag} needs a value")))
            };
            match arg.as_str() {
                "--events" => parsed.events = true,
                "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
                "--out" => parsed.out = Some(PathBuf::from(value("--out")?)),
                "--size" => {
                    let raw = value("--size")?;
                    let size = parse_size(&raw).ok_or_else(|| usage(format!("bad size: {raw}")))?;
                    parsed.size = Some(size);
                }
                "--background" => {
                    let raw = value("--background")?;
                    let color =
                        Color::from_hex(&raw).ok_or_else(|| usage(format!("bad color: {raw}")))?;
                    parsed.background = Some(color);
                }
                "--format" => {
                    let raw = value("--format")?;
                    let format =
                        parse_format(&raw).ok_or_else(|| usage(format!("bad format: {raw}")))?;
                    parsed.format = Some(format);
                }
                "--quality" => {
                    let raw = value("--quality")?;
                    let quality = raw.parse().map_err(|_| usage(format!("bad quality: {raw}")))?;
                    parsed.quality = Some(quality);
                }
                flag if flag.starts_with("--") => {
                    return Err(usage(format!("unknown flag: {flag}")));
                }
                _ if input.is_none() => input = Some(PathBuf::from(&arg)),
                _ => return Err(AppError::Usage(format!("unexpected argument: {arg}"))),
            }
        }

        parsed.input = input.ok_or_else(|| AppError::Usage("missing input file".to_string()))?;
        Ok(parsed)
    }
}

fn read(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn build_session(args: &Args) -> Result<SessionController, AppError> {
    let config = match &args.config {
        Some(path) => SessionConfig::from_json(&read(path)?)?,
        None => SessionConfig::default(),
    };
    let mut session = SessionController::new(config);

    let input = read(&args.input)?;
    if args.events {
        let events: Vec<PointerEvent> = serde_json::from_str(&input)?;
        log::info!("Replaying {} pointer events", events.len());
        for event in events {
            session.handle_pointer_event(event);
        }
    } else {
        let count = session.import_json(&input)?;
        log::info!("Loaded {count} curves");
    }
    Ok(session)
}

fn run(args: Args) -> Result<(), AppError> {
    let session = build_session(&args)?;
    let size = args.size.unwrap_or(DEFAULT_SIZE);

    if args.out.is_none() && args.format.is_none() {
        print!("{}", session.to_svg(size.width, size.height, args.background));
        return Ok(());
    }

    let mut renderer = RasterRenderer::new();
    let ctx = RenderContext::for_session(&session, size)
        .with_background(args.background.map(Into::into));
    renderer.build_scene(&ctx);

    if let Some(out) = &args.out {
        let format = args
            .format
            .or_else(|| out.extension().and_then(|ext| ext.to_str()).and_then(parse_format))
            .unwrap_or_default();
        let bytes = renderer.encode(SnapshotOptions::resolve(Some(format), args.quality))?;
        std::fs::write(out, &bytes).map_err(|source| AppError::Io {
            path: out.clone(),
            source,
        })?;
        log::info!("Wrote {} ({} bytes)", out.display(), bytes.len());
    } else if let Some(encoded) = session.to_base64(&renderer, args.format, args.quality) {
        println!("{encoded}");
    } else {
        return Err(RendererError::EmptySurface.into());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let result = Args::parse(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("sketchink: {e}");
            ExitCode::FAILURE
        }
    }
}
