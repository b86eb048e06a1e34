//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Point your webcam at a written question and get an answer
#[derive(Parser, Debug)]
#[command(name = "snapask")]
#[command(version, about = "Camera-to-answer: OCR a photographed question and ask a model", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Camera device index (from list-cameras; overrides config)
    #[arg(long)]
    pub camera: Option<u32>,

    /// OCR language code (Tesseract-style, e.g. eng, deu, fra)
    #[arg(long)]
    pub lang: Option<String>,

    /// Model identifier for the answer endpoint
    #[arg(long)]
    pub model: Option<String>,

    /// Mirror the camera horizontally
    #[arg(long)]
    pub mirror: bool,

    /// Capture a single frame, answer, and exit
    #[arg(long)]
    pub once: bool,

    /// Write the captured (grayscale) frame as PNG to this path
    #[arg(long, value_name = "PATH")]
    pub save_frame: Option<PathBuf>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available cameras
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["snapask"]);
        assert!(args.command.is_none());
        assert!(args.camera.is_none());
        assert!(args.lang.is_none());
        assert!(args.model.is_none());
        assert!(!args.mirror);
        assert!(!args.once);
        assert!(args.save_frame.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_flags_parse() {
        let args = Args::parse_from([
            "snapask",
            "--camera",
            "2",
            "--lang",
            "deu",
            "--model",
            "my-model",
            "--once",
            "--save-frame",
            "/tmp/frame.png",
        ]);
        assert_eq!(args.camera, Some(2));
        assert_eq!(args.lang.as_deref(), Some("deu"));
        assert_eq!(args.model.as_deref(), Some("my-model"));
        assert!(args.once);
        assert_eq!(
            args.save_frame.as_deref(),
            Some(std::path::Path::new("/tmp/frame.png"))
        );
    }

    #[test]
    fn test_list_cameras_subcommand() {
        let args = Args::parse_from(["snapask", "list-cameras"]);
        assert!(matches!(args.command, Some(Command::ListCameras)));
    }

    #[test]
    fn test_config_subcommands() {
        let args = Args::parse_from(["snapask", "config", "show"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));

        let args = Args::parse_from(["snapask", "config", "init"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Init
            })
        ));
    }
}
