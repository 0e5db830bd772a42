use clap::Parser;
use rosto::AppConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Image to analyse (PNG, JPEG, WebP, ...)
    #[arg(short, long)]
    pub image: PathBuf,

    /// Where to write the annotated image (default: <image stem>_mesh.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, default_value = AppConfig::DEFAULT_PATH)]
    pub config: PathBuf,

    /// Print the analysis as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write the effective configuration back to --config
    #[arg(long, default_value_t = false)]
    pub write_config: bool,
}

impl Args {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = self
                .image
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            self.image.with_file_name(format!("{}_mesh.png", stem))
        })
    }
}
