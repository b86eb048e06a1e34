use std::io::Write as _;
use std::path::Path;
use std::time::{Duration, Instant};

use clap::Parser;

use snapask::camera::{CameraCapture, CameraSettings, Resolution};
use snapask::cli::{handle_config_action, list_cameras, Args, Command};
use snapask::config::Config;
use snapask::llm::{LlmClient, API_KEY_ENV};
use snapask::ocr::TesseractEngine;
use snapask::pipeline::{AskOutcome, AskPipeline, FrameSource};

/// How long to wait for the camera to deliver its first frame.
const CAMERA_WARMUP: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Some(Command::ListCameras) => {
            list_cameras();
            return;
        }
        Some(Command::Config { action }) => {
            handle_config_action(action);
            return;
        }
        None => {}
    }

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(args.config.as_deref())?;

    let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
        format!(
            "{} is not set. Export it or put it in a .env file.",
            API_KEY_ENV
        )
    })?;
    let mut client = LlmClient::with_base_url(api_key, config.llm.base_url.clone())?;
    client.set_model(args.model.clone().unwrap_or_else(|| config.llm.model.clone()));

    let settings = CameraSettings {
        device_index: args.camera.unwrap_or(config.camera.device),
        resolution: parse_resolution(config.camera.resolution.as_deref()),
        fps: 30,
        mirror: args.mirror || config.camera.mirror,
    };

    let mut camera = CameraCapture::open(settings)?;
    camera.start()?;
    if let Some(res) = camera.actual_resolution() {
        log::info!("Camera streaming at {}x{}", res.width, res.height);
    }
    wait_for_first_frame(&camera)?;

    let language = args.lang.clone().unwrap_or_else(|| config.ocr.language.clone());
    let pipeline = AskPipeline::new(camera, TesseractEngine, client, language);

    if args.once {
        capture_and_print(&pipeline, args.save_frame.as_deref()).await;
        return Ok(());
    }

    println!("snapask ready. Press Enter to capture, q then Enter to quit.");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }

        capture_and_print(&pipeline, args.save_frame.as_deref()).await;
    }

    Ok(())
}

/// Run one capture cycle and print its result to the terminal.
async fn capture_and_print<S, E>(pipeline: &AskPipeline<S, E>, save_frame: Option<&Path>)
where
    S: FrameSource,
    E: snapask::ocr::OcrEngine + 'static,
{
    match pipeline.ask_once().await {
        Ok(AskOutcome::Answered { question, answer }) => {
            println!("Q: {}", question);
            println!("A: {}", answer);
        }
        Ok(AskOutcome::NoText) => {
            println!("{}", snapask::pipeline::NO_TEXT_SENTINEL);
        }
        Ok(AskOutcome::Busy) => {
            println!("Still working on the previous capture...");
        }
        Err(e) => {
            log::error!("Capture cycle failed: {}", e);
            eprintln!("Capture failed: {}", e);
        }
    }

    if let Some(path) = save_frame {
        if let Some(png) = pipeline.display().snapshot_png {
            match std::fs::write(path, png) {
                Ok(()) => println!("Saved captured frame to {}", path.display()),
                Err(e) => eprintln!("Could not save frame: {}", e),
            }
        }
    }
}

/// Block until the camera produces its first frame, or time out.
fn wait_for_first_frame(camera: &CameraCapture) -> Result<(), Box<dyn std::error::Error>> {
    let deadline = Instant::now() + CAMERA_WARMUP;
    while camera.latest_frame().is_none() {
        if Instant::now() >= deadline {
            return Err("Camera produced no frames; is it in use by another application?".into());
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    Ok(())
}

fn parse_resolution(name: Option<&str>) -> Resolution {
    match name {
        Some("low") => Resolution::LOW,
        Some("medium") => Resolution::MEDIUM,
        Some("high") | None => Resolution::HIGH,
        Some(other) => {
            log::warn!("Unknown resolution '{}', using high", other);
            Resolution::HIGH
        }
    }
}
