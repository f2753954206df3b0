use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use qrstyle_renderer::{
    Color, ExportFormat, LabelAlign, LabelSize, LabelSpec, LabelWeight, LogoImage, LogoSettings,
    RenderProfile, Renderer, StyleId,
};

#[derive(Parser)]
#[command(name = "qr-render")]
#[command(version)]
#[command(about = "Render a styled QR code to PNG, JPEG, WEBP or SVG", long_about = None)]
struct Cli {
    #[arg(help = "Text or URL to encode", required_unless_present = "profile")]
    payload: Option<String>,

    #[arg(
        long,
        help = "Load settings from a JSON profile",
        long_help = "Load settings from a JSON profile. Flags given on the command line \
        override the values stored in the profile."
    )]
    profile: Option<PathBuf>,

    #[arg(long, help = "Write the effective settings as a JSON profile and exit")]
    save_profile: Option<PathBuf>,

    #[arg(short, long, help = "Side length of the code in pixels")]
    size: Option<u32>,

    #[arg(long, help = "Module style: classic, rounded, dots, pills or outline")]
    style: Option<StyleId>,

    #[arg(long, value_parser = parse_color, help = "Foreground color as #rgb or #rrggbb")]
    fg: Option<Color>,

    #[arg(long, value_parser = parse_color, help = "Background color as #rgb or #rrggbb")]
    bg: Option<Color>,

    #[arg(long, help = "Leave the background transparent (ignored for JPEG)")]
    transparent: bool,

    #[arg(short, long, default_value = "png", help = "Output format: png, jpeg, webp or svg")]
    format: ExportFormat,

    #[arg(short, long, help = "Output file, named after the payload if unspecified")]
    out: Option<PathBuf>,

    #[arg(long, help = "Image placed in the center of the code")]
    logo: Option<PathBuf>,

    #[arg(long, default_value_t = 20.0, help = "Logo size as a percentage of the code (10-40)")]
    logo_size: f32,

    #[arg(long, help = "Keep the modules under the logo")]
    no_safe_zone: bool,

    #[arg(long, help = "Caption printed under the code")]
    label: Option<String>,

    #[arg(long, value_enum, default_value_t = SizeArg::Md)]
    label_size: SizeArg,

    #[arg(long, value_enum, default_value_t = WeightArg::Regular)]
    label_weight: WeightArg,

    #[arg(long, value_enum, default_value_t = AlignArg::Center)]
    label_align: AlignArg,

    #[arg(long, help = "Print the caption on foreground colored bars")]
    label_invert: bool,

    #[arg(long, help = "Prefer installed fonts over the bundled font for captions")]
    system_fonts: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SizeArg {
    Sm,
    Md,
    Lg,
}

#[derive(Clone, Copy, ValueEnum)]
enum WeightArg {
    Regular,
    Bold,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlignArg {
    Left,
    Center,
    Right,
}

impl From<SizeArg> for LabelSize {
    fn from(arg: SizeArg) -> Self {
        match arg {
            SizeArg::Sm => Self::Sm,
            SizeArg::Md => Self::Md,
            SizeArg::Lg => Self::Lg,
        }
    }
}

impl From<WeightArg> for LabelWeight {
    fn from(arg: WeightArg) -> Self {
        match arg {
            WeightArg::Regular => Self::Regular,
            WeightArg::Bold => Self::Bold,
        }
    }
}

impl From<AlignArg> for LabelAlign {
    fn from(arg: AlignArg) -> Self {
        match arg {
            AlignArg::Left => Self::Left,
            AlignArg::Center => Self::Center,
            AlignArg::Right => Self::Right,
        }
    }
}

fn parse_color(s: &str) -> std::result::Result<Color, String> {
    Color::from_hex(s).ok_or_else(|| format!("invalid color '{s}'"))
}

impl Cli {
    /// Merges the profile file, if any, with the flags given on the command line.
    fn profile(&self) -> Result<RenderProfile> {
        let mut profile = match &self.profile {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read profile {}", path.display()))?;
                RenderProfile::from_json(&json)
                    .with_context(|| format!("invalid profile {}", path.display()))?
            }
            None => RenderProfile::new(String::new()),
        };

        if let Some(payload) = &self.payload {
            profile.payload = payload.clone();
        }
        if let Some(size) = self.size {
            profile.size = size;
        }
        if let Some(style) = self.style {
            profile.style.style_id = style;
        }
        if let Some(fg) = self.fg {
            profile.style.foreground = fg;
        }
        if let Some(bg) = self.bg {
            profile.style.background = bg;
        }
        if self.transparent {
            profile.style.transparent_background = true;
        }
        if self.logo.is_some() {
            profile.logo = Some(LogoSettings {
                size_percent: self.logo_size,
                safe_zone: !self.no_safe_zone,
            });
        }
        if let Some(text) = &self.label {
            profile.label = Some(
                LabelSpec::new(text.clone())
                    .with_size(self.label_size.into())
                    .with_weight(self.label_weight.into())
                    .with_align(self.label_align.into())
                    .inverted(self.label_invert),
            );
        }
        Ok(profile)
    }
}

/// Reads and decodes the logo. Failures are reported but not fatal: the
/// logo area stays reserved and blank.
fn load_logo(path: &Path) -> Option<Arc<LogoImage>> {
    let decoded = std::fs::read(path)
        .with_context(|| format!("failed to read logo {}", path.display()))
        .and_then(|bytes| Ok(LogoImage::decode(&bytes)?));
    match decoded {
        Ok(image) => Some(Arc::new(image)),
        Err(err) => {
            tracing::warn!(path = %path.display(), "{err:#}, rendering without the logo image");
            None
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile()?;

    if let Some(path) = &cli.save_profile {
        std::fs::write(path, profile.to_json_pretty()?)
            .with_context(|| format!("failed to write profile {}", path.display()))?;
        return Ok(());
    }

    let image = cli.logo.as_deref().and_then(load_logo);
    let request = profile.to_request(image);

    let renderer = if cli.system_fonts {
        Renderer::with_system_fonts()
    } else {
        Renderer::headless()
    };

    let timestamp = chrono::Local::now().naive_local();
    let artifact = qrstyle_renderer::export(&renderer, cli.format, &request, timestamp)?;
    let path = cli.out.unwrap_or_else(|| PathBuf::from(&artifact.filename));

    std::fs::write(&path, &artifact.bytes).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = artifact.bytes.len(), "saved export");
    println!("{}", path.display());
    Ok(())
}
