//! The capture -> recognize -> filter -> answer pipeline.
//!
//! One user trigger runs the whole chain strictly in order. Pipeline state is
//! an explicit enum rather than a busy boolean, and the guard covers the
//! answer stage too, so overlapping cycles cannot race on the display state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::camera::{CameraCapture, CameraError, Frame};
use crate::filter::filter_question;
use crate::llm::LlmClient;
use crate::ocr::{OcrEngine, OcrError};
use crate::preprocess::{encode_png, grayscale_in_place, EncodeError};

/// Shown when OCR returns nothing usable.
pub const NO_TEXT_SENTINEL: &str = "no text recognized";

/// Shown when the answer request fails for any reason.
pub const APOLOGY: &str = "Sorry, I could not get an answer. Please try again.";

/// Default timeout for one OCR run (30 seconds).
const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the pipeline currently is within a capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Waiting for a trigger
    Idle,
    /// Copying and preprocessing a frame
    Capturing,
    /// OCR in flight
    Recognizing,
    /// Answer request in flight
    Answering,
}

/// Result of one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// Text was recognized and an answer (or the apology) was produced.
    Answered { question: String, answer: String },
    /// OCR found no usable text; the answer endpoint was not contacted.
    NoText,
    /// A cycle was already in flight; this trigger was a no-op.
    Busy,
}

/// Errors that abort a capture cycle.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Camera capture failed: {0}")]
    Capture(#[from] CameraError),

    #[error("Frame encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Text recognition failed: {0}")]
    Recognition(#[from] OcrError),

    #[error("Text recognition timed out")]
    RecognitionTimeout,

    #[error("Recognition task failed: {0}")]
    TaskFailed(String),

    #[error("Capture cycle was superseded")]
    Superseded,
}

/// Source of frames for the pipeline.
///
/// The production implementation is [`CameraCapture`]; tests substitute a
/// stub that serves canned frames.
pub trait FrameSource: Send + Sync {
    /// Take the current frame at its native resolution.
    fn frame(&self) -> Result<Frame, CameraError>;
}

impl FrameSource for CameraCapture {
    fn frame(&self) -> Result<Frame, CameraError> {
        self.latest_frame().ok_or(CameraError::NoFrame)
    }
}

/// Display state for the user-facing surface.
///
/// Each field is replaced wholesale by the next cycle; nothing persists
/// across sessions.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    /// PNG encoding of the last captured (grayscale) frame
    pub snapshot_png: Option<Vec<u8>>,
    /// Last recognized text, or the no-text sentinel
    pub recognized_text: Option<String>,
    /// Last answer, or the apology string
    pub answer_text: Option<String>,
}

/// The capture/recognize/answer pipeline.
///
/// All methods take `&self`; the pipeline can be shared behind an [`Arc`]
/// and triggered from multiple tasks. Only one cycle runs at a time.
pub struct AskPipeline<S, E> {
    source: S,
    engine: Arc<E>,
    client: LlmClient,
    language: String,
    ocr_timeout: Duration,
    state: Mutex<PipelineState>,
    display: Mutex<DisplayState>,
    /// Bumped by `cancel()`; a cycle whose generation is stale aborts.
    generation: AtomicU64,
}

impl<S, E> AskPipeline<S, E>
where
    S: FrameSource,
    E: OcrEngine + 'static,
{
    /// Build a pipeline from its collaborators.
    ///
    /// `language` is the OCR language hint (e.g. "eng"). The answer
    /// credential travels inside `client`, injected at its construction.
    pub fn new(source: S, engine: E, client: LlmClient, language: impl Into<String>) -> Self {
        Self {
            source,
            engine: Arc::new(engine),
            client,
            language: language.into(),
            ocr_timeout: DEFAULT_OCR_TIMEOUT,
            state: Mutex::new(PipelineState::Idle),
            display: Mutex::new(DisplayState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Override the OCR timeout.
    pub fn with_ocr_timeout(mut self, timeout: Duration) -> Self {
        self.ocr_timeout = timeout;
        self
    }

    /// Current pipeline state.
    pub fn state(&self) -> PipelineState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the display state (captured frame, recognized text, answer).
    pub fn display(&self) -> DisplayState {
        self.display
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Supersede any in-flight cycle.
    ///
    /// The running cycle notices at its next stage boundary, aborts with
    /// [`PipelineError::Superseded`], and returns the pipeline to Idle, after
    /// which a fresh trigger proceeds normally.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Run one capture cycle.
    ///
    /// If a cycle is already in flight this is a no-op returning
    /// [`AskOutcome::Busy`]. Otherwise the pipeline walks
    /// Capturing -> Recognizing -> Answering and returns to Idle on every
    /// exit path. Answer-stage failures never surface as errors; they become
    /// the fixed apology string (and are logged). Recognition failures do
    /// surface, so a broken OCR installation is visible instead of silent.
    pub async fn ask_once(&self) -> Result<AskOutcome, PipelineError> {
        let generation = self.generation.load(Ordering::SeqCst);

        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state != PipelineState::Idle {
                log::debug!("Capture trigger ignored: pipeline is {:?}", *state);
                return Ok(AskOutcome::Busy);
            }
            *state = PipelineState::Capturing;
        }

        let result = self.run_cycle(generation).await;

        // Back to Idle no matter how the cycle ended
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = PipelineState::Idle;

        if matches!(result, Err(PipelineError::Superseded)) {
            log::info!("Capture cycle superseded by cancel()");
        }
        result
    }

    async fn run_cycle(&self, generation: u64) -> Result<AskOutcome, PipelineError> {
        // Capture: take the frame at native size, flatten it, encode it
        let mut frame = self.source.frame()?;
        grayscale_in_place(&mut frame);
        let png = encode_png(&frame)?;
        self.with_display(|d| d.snapshot_png = Some(png.clone()));

        // Recognize
        self.set_state(PipelineState::Recognizing);
        let recognized = self.recognize(png).await?;
        self.check_generation(generation)?;

        let recognized = recognized.trim().to_string();
        if recognized.is_empty() {
            log::info!("OCR found no text in the captured frame");
            self.with_display(|d| {
                d.recognized_text = Some(NO_TEXT_SENTINEL.to_string());
                d.answer_text = None;
            });
            return Ok(AskOutcome::NoText);
        }
        self.with_display(|d| d.recognized_text = Some(recognized.clone()));

        // Filter; if nothing survives the whitelist there is no question to ask
        let question = filter_question(&recognized);
        if question.is_empty() {
            log::info!("Recognized text was entirely outside the allowed character set");
            self.with_display(|d| {
                d.recognized_text = Some(NO_TEXT_SENTINEL.to_string());
                d.answer_text = None;
            });
            return Ok(AskOutcome::NoText);
        }

        // Answer: one shot, failures collapse into the apology string
        self.set_state(PipelineState::Answering);
        let answer = match self.client.ask(&question).await {
            Ok(answer) => answer,
            Err(e) => {
                log::error!("Answer request failed: {}", e);
                APOLOGY.to_string()
            }
        };
        self.check_generation(generation)?;

        self.with_display(|d| d.answer_text = Some(answer.clone()));
        Ok(AskOutcome::Answered { question, answer })
    }

    /// Run the (blocking) OCR engine on a worker thread, bounded by the
    /// configured timeout.
    async fn recognize(&self, png: Vec<u8>) -> Result<String, PipelineError> {
        let engine = Arc::clone(&self.engine);
        let language = self.language.clone();

        let task = tokio::task::spawn_blocking(move || engine.recognize(&png, &language));

        let joined = tokio::time::timeout(self.ocr_timeout, task)
            .await
            .map_err(|_| PipelineError::RecognitionTimeout)?;

        let recognized = joined.map_err(|e| PipelineError::TaskFailed(e.to_string()))??;
        Ok(recognized)
    }

    fn set_state(&self, next: PipelineState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn with_display(&self, f: impl FnOnce(&mut DisplayState)) {
        let mut display = self.display.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut display);
    }

    fn check_generation(&self, generation: u64) -> Result<(), PipelineError> {
        if self.generation.load(Ordering::SeqCst) != generation {
            return Err(PipelineError::Superseded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Frame, FrameFormat};
    use std::time::Instant;

    struct StubSource;

    impl FrameSource for StubSource {
        fn frame(&self) -> Result<Frame, CameraError> {
            Ok(Frame {
                data: vec![255; 4 * 2 * 2],
                width: 2,
                height: 2,
                format: FrameFormat::Rgba,
                timestamp: Instant::now(),
            })
        }
    }

    struct FailingSource;

    impl FrameSource for FailingSource {
        fn frame(&self) -> Result<Frame, CameraError> {
            Err(CameraError::NoFrame)
        }
    }

    struct FixedEngine(&'static str);

    impl OcrEngine for FixedEngine {
        fn recognize(&self, _png: &[u8], _language: &str) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    fn test_client() -> LlmClient {
        // Points at a closed port; only used where the answer stage is
        // never reached or where the apology path is acceptable
        LlmClient::with_base_url("test-key".to_string(), "http://127.0.0.1:9".to_string())
            .unwrap()
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let pipeline = AskPipeline::new(StubSource, FixedEngine(""), test_client(), "eng");
        assert_eq!(pipeline.state(), PipelineState::Idle);
        let display = pipeline.display();
        assert!(display.snapshot_png.is_none());
        assert!(display.recognized_text.is_none());
        assert!(display.answer_text.is_none());
    }

    #[tokio::test]
    async fn test_empty_ocr_yields_sentinel_and_returns_idle() {
        let pipeline = AskPipeline::new(StubSource, FixedEngine("   \n  "), test_client(), "eng");
        let outcome = pipeline.ask_once().await.unwrap();
        assert_eq!(outcome, AskOutcome::NoText);
        assert_eq!(pipeline.state(), PipelineState::Idle);
        let display = pipeline.display();
        assert_eq!(display.recognized_text.as_deref(), Some(NO_TEXT_SENTINEL));
        assert!(display.answer_text.is_none());
        assert!(display.snapshot_png.is_some());
    }

    #[tokio::test]
    async fn test_whitelist_rejecting_everything_yields_sentinel() {
        // All recognized characters are outside the allowed set
        let pipeline = AskPipeline::new(StubSource, FixedEngine("@#$%^&*"), test_client(), "eng");
        let outcome = pipeline.ask_once().await.unwrap();
        assert_eq!(outcome, AskOutcome::NoText);
        assert_eq!(
            pipeline.display().recognized_text.as_deref(),
            Some(NO_TEXT_SENTINEL)
        );
    }

    #[tokio::test]
    async fn test_capture_failure_surfaces_and_returns_idle() {
        let pipeline = AskPipeline::new(FailingSource, FixedEngine("hi"), test_client(), "eng");
        let result = pipeline.ask_once().await;
        assert!(matches!(result, Err(PipelineError::Capture(_))));
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_ocr_failure_surfaces_and_returns_idle() {
        struct BrokenEngine;
        impl OcrEngine for BrokenEngine {
            fn recognize(&self, _png: &[u8], _language: &str) -> Result<String, OcrError> {
                Err(OcrError::EngineFailed("tesseract missing".to_string()))
            }
        }

        let pipeline = AskPipeline::new(StubSource, BrokenEngine, test_client(), "eng");
        let result = pipeline.ask_once().await;
        assert!(matches!(result, Err(PipelineError::Recognition(_))));
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_cancel_supersedes_in_flight_cycle() {
        struct SlowEngine;
        impl OcrEngine for SlowEngine {
            fn recognize(&self, _png: &[u8], _language: &str) -> Result<String, OcrError> {
                std::thread::sleep(std::time::Duration::from_millis(300));
                Ok("What is 2?".to_string())
            }
        }

        let pipeline = Arc::new(AskPipeline::new(StubSource, SlowEngine, test_client(), "eng"));
        let p = Arc::clone(&pipeline);
        let cycle = tokio::spawn(async move { p.ask_once().await });

        // Let the cycle reach the recognition stage, then supersede it
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        pipeline.cancel();

        let result = cycle.await.unwrap();
        assert!(matches!(result, Err(PipelineError::Superseded)));
        assert_eq!(pipeline.state(), PipelineState::Idle);

        // A fresh trigger after the abort proceeds normally (apology path,
        // since the client points at a closed port)
        let outcome = pipeline.ask_once().await.unwrap();
        match outcome {
            AskOutcome::Answered { answer, .. } => assert_eq!(answer, APOLOGY),
            other => panic!("Expected Answered, got {:?}", other),
        }
    }
}
