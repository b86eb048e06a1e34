//! Subcommand handlers for list-cameras and config actions.

use super::args::ConfigAction;
use crate::camera;
use crate::config::default_path as get_config_path;

/// List available cameras and print them to stdout.
pub fn list_cameras() {
    match camera::list_devices() {
        Ok(devices) => {
            if devices.is_empty() {
                println!("No cameras found.");
                println!();
                println!("Make sure your camera is connected and permissions are granted.");
                println!(
                    "On macOS, grant access in System Settings > Privacy & Security > Camera."
                );
            } else {
                println!("Available cameras:");
                for device in devices {
                    println!("  {}", device);
                }
                println!();
                println!("Use --camera <index> to select a camera.");
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction) {
    match action {
        ConfigAction::Show => {
            let config_path = get_config_path();
            match crate::config::Config::load(None) {
                Ok(config) => {
                    println!("Current configuration:");
                    println!("  Camera device: {}", config.camera.device);
                    println!("  Mirror: {}", if config.camera.mirror { "yes" } else { "no" });
                    println!(
                        "  Resolution: {}",
                        config.camera.resolution.as_deref().unwrap_or("high")
                    );
                    println!("  OCR language: {}", config.ocr.language);
                    println!("  Model: {}", config.llm.model);
                    println!("  Endpoint: {}", config.llm.base_url);
                    println!();
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            let config_path = get_config_path();

            if config_path.exists() {
                eprintln!("Config file already exists: {}", config_path.display());
                eprintln!("Use 'snapask config show' to view current settings.");
                std::process::exit(1);
            }

            if let Some(parent) = config_path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Error creating config directory: {}", e);
                    std::process::exit(1);
                }
            }

            let default_config = r#"# snapask configuration
# The API credential is not stored here. Set the OPENAI_API_KEY
# environment variable (a .env file in the working directory works too).

[camera]
# Camera device index (see `snapask list-cameras`)
# device = 0
# Mirror horizontally. Leave off for OCR: mirrored text does not recognize.
# mirror = false
# Capture resolution: "low", "medium", or "high"
# resolution = "high"

[ocr]
# Tesseract language code
# language = "eng"

[llm]
# Model identifier sent to the completion endpoint
# model = "gpt-4o-mini"
# OpenAI-compatible API base URL
# base_url = "https://api.openai.com/v1"
"#;

            match std::fs::write(&config_path, default_config) {
                Ok(()) => println!("Created config file: {}", config_path.display()),
                Err(e) => {
                    eprintln!("Error writing config file: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
