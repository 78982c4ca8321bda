use clap::{Args, Parser, Subcommand};
use framesmith::config::{self, Config};
use framesmith::imaging::{
    self, Color, FitMode, FitResult, FrameOptions, GlyphFont, Gutter, HorizontalAlign,
    OutputFormat, PixelBuffer, VerticalAlign,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "framesmith")]
#[command(about = "Fit, frame, caption and warp raster images")]
#[command(long_about = "\
Fit, frame, caption and warp raster images

Images are read as JPEG, PNG, GIF, TIFF or WebP and written as JPEG, PNG or
WebP depending on the output file's extension.

Defaults for backgrounds, gutters, fonts and quality come from
framesmith.toml in the working directory (or --config). Flags override them.

Run 'framesmith gen-config' to generate a documented framesmith.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log debug detail (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Background and padding flags shared by framing commands.
#[derive(Args, Clone, Default)]
struct FrameArgs {
    /// Background color (#rgb, #rrggbb or #rrggbbaa)
    #[arg(long)]
    background: Option<Color>,

    /// Clip the background to a rounded rectangle
    #[arg(long)]
    rounded: bool,

    /// Padding around the source: "10%" or "10" (dimension + pixels)
    #[arg(long)]
    gutter: Option<Gutter>,
}

impl FrameArgs {
    fn options(&self, config: &Config) -> FrameOptions {
        let defaults = config.frame.options();
        FrameOptions {
            background: self.background.or(defaults.background),
            rounded: self.rounded || defaults.rounded,
            gutter: self.gutter.or(defaults.gutter),
        }
    }
}

#[derive(Args)]
struct TextArgs {
    input: PathBuf,

    /// Text to draw
    #[arg(long)]
    text: String,

    /// Anchor x coordinate
    #[arg(long, allow_hyphen_values = true)]
    x: i32,

    /// Anchor y coordinate
    #[arg(long, allow_hyphen_values = true)]
    y: i32,

    /// Font file (.ttf loads as TrueType, anything else through FreeType)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Font size in points
    #[arg(long)]
    size: Option<f32>,

    #[arg(long)]
    color: Option<Color>,

    /// Outline thickness in pixels
    #[arg(long)]
    stroke: Option<u32>,

    #[arg(long)]
    stroke_color: Option<Color>,

    /// none | left | center | right
    #[arg(long)]
    horizontal: Option<HorizontalAlign>,

    /// none | bottom | middle | top
    #[arg(long)]
    vertical: Option<VerticalAlign>,

    /// Shrink the font until the text fits this many pixels
    #[arg(long)]
    max_width: Option<u32>,

    /// Squeeze the text horizontally to this percentage of its width
    #[arg(long)]
    condensed: Option<u32>,

    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty canvas, optionally with a background
    Blank {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[command(flatten)]
        frame: FrameArgs,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Frame images into a fixed size, in parallel
    Resize {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[command(flatten)]
        frame: FrameArgs,
        /// Output directory
        #[arg(short, long, default_value = "resized")]
        output_dir: PathBuf,
        /// Output extension: png, jpg or webp
        #[arg(long, default_value = "png")]
        ext: String,
    },
    /// Fit an image onto a canvas, letterboxing or cropping
    Fit {
        input: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Fill the canvas and crop the overflow instead of letterboxing
        #[arg(long)]
        cover: bool,
        #[command(flatten)]
        frame: FrameArgs,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Pad an image with a transparent gutter
    Gutter {
        input: PathBuf,
        /// "10%" or "10" (dimension + pixels)
        gutter: Gutter,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Draw text onto an image
    Text(TextArgs),
    /// Bend an image along a parabolic arch
    Arch {
        input: PathBuf,
        /// Arch strength; negative values invert it
        #[arg(long, allow_hyphen_values = true)]
        magnitude: f64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Scale an image's alpha channel
    Opacity {
        input: PathBuf,
        /// Percentage of the current opacity to keep
        #[arg(long)]
        percent: f64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Encode a JPEG within the [constrained] size and byte budget
    Thumbnail {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print a stock framesmith.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // gen-config works even when the config file is unreadable
    let config = match cli.command {
        Command::GenConfig => Config::default(),
        _ => config::load_config(&cli.config)?,
    };
    let quality = config.output.quality();

    match cli.command {
        Command::Blank {
            width,
            height,
            frame,
            output,
        } => {
            let canvas = imaging::build_background(width, height, frame.options(&config).fill_spec())?;
            imaging::save(&canvas, &output, quality)?;
            tracing::info!(output = %output.display(), width, height, "blank canvas written");
        }
        Command::Resize {
            inputs,
            width,
            height,
            frame,
            output_dir,
            ext,
        } => {
            let ext = OutputFormat::from_extension(&ext)
                .map(|_| ext.to_ascii_lowercase())
                .ok_or_else(|| format!("cannot write '{ext}' (expected png, jpg or webp)"))?;
            std::fs::create_dir_all(&output_dir)?;
            init_thread_pool(&config.processing);

            let options = frame.options(&config);
            let inputs = supported_inputs(inputs);
            let results: Vec<_> = inputs
                .par_iter()
                .map(|input| {
                    let output = output_path(input, &output_dir, &ext);
                    let result = imaging::open(input, None)
                        .and_then(|src| imaging::resize(&src, width, height, &options))
                        .and_then(|img| imaging::save(&img, &output, quality));
                    (input, output, result)
                })
                .collect();

            let mut failed = 0;
            for (input, output, result) in results {
                match result {
                    Ok(()) => tracing::info!(input = %input.display(), output = %output.display(), "resized"),
                    Err(e) => {
                        failed += 1;
                        tracing::error!(input = %input.display(), error = %e, "resize failed");
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{failed} of {} images failed", inputs.len()).into());
            }
        }
        Command::Fit {
            input,
            width,
            height,
            cover,
            frame,
            output,
        } => {
            let src = imaging::open(&input, None)?;
            let mode = if cover { FitMode::Cover } else { FitMode::Contain };
            let (canvas, fit) = fit_framed(src, width, height, &frame.options(&config), mode)?;
            imaging::save(&canvas, &output, quality)?;
            tracing::info!(output = %output.display(), scale = fit.scale_percent, "fitted");
        }
        Command::Gutter {
            input,
            gutter,
            output,
        } => {
            let src = imaging::open(&input, None)?;
            let padded = imaging::add_gutter(src, gutter)?;
            imaging::save(&padded, &output, quality)?;
            tracing::info!(output = %output.display(), size = ?padded.dimensions(), "gutter added");
        }
        Command::Text(args) => {
            let mut img = imaging::open(&args.input, None)?;
            stamp_text(&mut img, &args, &config)?;
            imaging::save(&img, &args.output, quality)?;
            tracing::info!(output = %args.output.display(), "text written");
        }
        Command::Arch {
            input,
            magnitude,
            output,
        } => {
            let src = imaging::open(&input, None)?;
            let arched = imaging::apply_arch(src, magnitude)?;
            imaging::save(&arched, &output, quality)?;
            tracing::info!(output = %output.display(), size = ?arched.dimensions(), "arched");
        }
        Command::Opacity {
            input,
            percent,
            output,
        } => {
            let mut img = imaging::open(&input, None)?;
            imaging::set_opacity(&mut img, percent);
            imaging::save(&img, &output, quality)?;
            tracing::info!(output = %output.display(), percent, "opacity set");
        }
        Command::Thumbnail { input, output } => {
            let src = imaging::open(&input, None)?;
            let target = config.constrained;
            let encoded = imaging::resize_for_constrained_file_size(
                &src,
                target.width,
                target.height,
                target.max_bytes,
            )?;
            std::fs::write(&output, &encoded.bytes)?;
            tracing::info!(
                output = %output.display(),
                bytes = encoded.bytes.len(),
                quality = encoded.quality.value(),
                "thumbnail written"
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Pad `src` by the frame's gutter and fit it onto a fresh background.
fn fit_framed(
    src: PixelBuffer,
    width: u32,
    height: u32,
    options: &FrameOptions,
    mode: FitMode,
) -> imaging::Result<(PixelBuffer, FitResult)> {
    let src = match options.gutter {
        Some(gutter) => imaging::add_gutter(src, gutter)?,
        None => src,
    };
    let mut canvas = imaging::build_background(width, height, options.fill_spec())?;
    let fit = imaging::fit_to_image(&mut canvas, &src, mode)?;
    Ok((canvas, fit))
}

/// Draw the text described by `args` onto `img`, with unset flags taken from config.
fn stamp_text(
    img: &mut PixelBuffer,
    args: &TextArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let font_path = args
        .font
        .clone()
        .or_else(|| config.text.font.clone())
        .ok_or("no font given: pass --font or set [text] font")?;
    let font = GlyphFont::open(&font_path)?;

    let mut style = config.text.style();
    style.size = args.size.unwrap_or(style.size);
    style.color = args.color.unwrap_or(style.color);
    style.stroke = args.stroke.unwrap_or(style.stroke);
    style.stroke_color = args.stroke_color.or(style.stroke_color);
    style.horizontal = args.horizontal.unwrap_or(style.horizontal);
    style.vertical = args.vertical.unwrap_or(style.vertical);
    style.max_width = args.max_width;

    match args.condensed {
        Some(percent) => imaging::write_condensed_text(
            img,
            &font,
            &args.text,
            style.size,
            style.color,
            percent,
            args.x,
            args.y,
            style.horizontal,
            style.vertical,
        )?,
        None => {
            let layout = imaging::write_text(img, &font, &args.text, args.x, args.y, &style)?;
            tracing::debug!(size = layout.size, x = layout.x, y = layout.y, "text laid out");
        }
    }
    Ok(())
}

/// Install the log subscriber. `-v` raises the default level to debug.
fn init_tracing(verbose: bool) {
    let default = if verbose { "framesmith=debug" } else { "framesmith=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. Users can lower it, not raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Drop inputs whose extension has no decoder, with a warning for each.
fn supported_inputs(inputs: Vec<PathBuf>) -> Vec<PathBuf> {
    let supported = imaging::supported_input_extensions();
    inputs
        .into_iter()
        .filter(|input| {
            let ext = input
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            let ok = supported.contains(&ext.as_str());
            if !ok {
                tracing::warn!(input = %input.display(), "skipping unsupported file type");
            }
            ok
        })
        .collect()
}

fn output_path(input: &Path, output_dir: &Path, ext: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    output_dir.join(stem).with_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const NAVY: Color = Color::rgb(0, 0, 128);

    #[test]
    fn fit_applies_frame_gutter() {
        let src = PixelBuffer::filled(100, 100, RED).unwrap();
        let options = FrameOptions {
            background: Some(NAVY),
            rounded: false,
            gutter: Some(Gutter::Percent(10)),
        };
        let (canvas, fit) = fit_framed(src, 60, 60, &options, FitMode::Contain).unwrap();
        // 120x120 padded source scaled to 60x60: a 5px gutter on each side
        assert_eq!((fit.src_w, fit.src_h), (120, 120));
        assert_eq!(canvas.get_pixel(2, 30), Some(NAVY));
        assert_eq!(canvas.get_pixel(30, 30), Some(RED));
    }

    #[test]
    fn fit_without_gutter_fills_canvas() {
        let src = PixelBuffer::filled(100, 100, RED).unwrap();
        let (canvas, _) =
            fit_framed(src, 60, 60, &FrameOptions::default(), FitMode::Cover).unwrap();
        assert_eq!(canvas.get_pixel(0, 0), Some(RED));
    }

    #[test]
    fn output_path_swaps_directory_and_extension() {
        let out = output_path(Path::new("in/photo.jpeg"), Path::new("out"), "png");
        assert_eq!(out, PathBuf::from("out/photo.png"));
    }
}
