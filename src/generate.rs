//! Icon generation through a text model.
//!
//! The model itself is behind [`IconModel`]; [`CommandModel`] drives any
//! external program that reads the prompts on stdin and prints a response.

use std::fmt;
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::icon::Icon;
use crate::ingest::{IngestError, ingest};

pub const MIN_PROMPT_CHARS: usize = 3;
pub const MAX_PROMPT_CHARS: usize = 500;
pub const MAX_ICON_COUNT: usize = 8;
pub const DEFAULT_ICON_COUNT: usize = 6;
/// How long a [`CommandModel`] may run before it is killed.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(300);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Visual style requested from the model.
#[derive(
    clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IconStyle {
    #[default]
    Modern,
    Classic,
    Minimal,
    Detailed,
}

impl IconStyle {
    const fn description(self) -> &'static str {
        match self {
            Self::Modern => "modern flat design with clean geometric shapes",
            Self::Classic => "classic, familiar symbols with balanced detail",
            Self::Minimal => "minimal line icons using as few strokes as possible",
            Self::Detailed => "detailed icons with layered shapes and fine features",
        }
    }
}

impl fmt::Display for IconStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Modern => "modern",
            Self::Classic => "classic",
            Self::Minimal => "minimal",
            Self::Detailed => "detailed",
        };
        f.write_str(name)
    }
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    prompt: String,
    style: IconStyle,
    count: usize,
}

impl GenerateRequest {
    /// Check and build a request. The prompt is trimmed before its length
    /// is counted.
    ///
    /// # Errors
    /// Returns [`GenerateError::InvalidRequest`] for a prompt outside
    /// 3..=500 characters or a count outside 1..=8.
    pub fn new(prompt: &str, style: IconStyle, count: Option<usize>) -> Result<Self, GenerateError> {
        let prompt = prompt.trim();
        let chars = prompt.chars().count();
        if chars < MIN_PROMPT_CHARS {
            return Err(GenerateError::InvalidRequest(format!(
                "prompt must be at least {MIN_PROMPT_CHARS} characters long"
            )));
        }
        if chars > MAX_PROMPT_CHARS {
            return Err(GenerateError::InvalidRequest(format!(
                "prompt must not exceed {MAX_PROMPT_CHARS} characters"
            )));
        }
        let count = count.unwrap_or(DEFAULT_ICON_COUNT);
        if !(1..=MAX_ICON_COUNT).contains(&count) {
            return Err(GenerateError::InvalidRequest(format!(
                "count must be between 1 and {MAX_ICON_COUNT}, got {count}"
            )));
        }
        Ok(Self {
            prompt: prompt.to_string(),
            style,
            count,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub const fn style(&self) -> IconStyle {
        self.style
    }

    pub const fn count(&self) -> usize {
        self.count
    }
}

/// Instructions describing the JSON shape the model must return.
pub fn system_prompt() -> String {
    r#"You are a professional SVG icon designer. Generate high quality, modern SVG icons from the user's description.

Requirements:
1. Generate several related SVG icon variants
2. Keep every icon simple, clear and modern
3. Use solid colors suitable for user interfaces
4. Keep the SVG code short, using basic elements such as path, circle and rect
5. Use a 24x24 or 32x32 viewBox
6. Give each icon a short description

Respond with JSON only, in this format:
{
  "icons": [
    {
      "name": "icon name",
      "description": "icon description",
      "svg": "<svg>...</svg>",
      "category": "category"
    }
  ]
}"#
    .to_string()
}

pub fn user_prompt(request: &GenerateRequest) -> String {
    format!(
        "Generate a set of {} SVG icons for the following description: {}\nStyle: {}",
        request.count,
        request.prompt,
        request.style.description()
    )
}

/// Errors from a model backend.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to start model command `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("model command I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("model command exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("model command `{program}` timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("model output is not UTF-8")]
    NonUtf8Output,
}

/// Text completion backend.
pub trait IconModel {
    /// Return the model's raw response to the two prompts.
    fn complete(&self, system: &str, user: &str) -> Result<String, ModelError>;
}

/// Runs an external program as the model.
///
/// The program receives `{"system": ..., "user": ...}` on stdin and must
/// print the model response on stdout. It is killed once `timeout` elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandModel {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandModel {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl IconModel for CommandModel {
    fn complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
        let _scope = crate::perf::scope("generate.model");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ModelError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Pipes drain on their own threads while the deadline is polled.
        let payload = json!({ "system": system, "user": user }).to_string();
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(payload.as_bytes()),
            None => Ok(()),
        });
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                // The child may exit on its own between the check and the kill.
                let _ = child.kill();
                child.wait()?;
                warn!(program = %self.program, timeout = ?self.timeout, "model command timed out");
                return Err(ModelError::Timeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        match join_pipe(writer) {
            Err(err) if err.kind() != io::ErrorKind::BrokenPipe => return Err(err.into()),
            _ => {}
        }
        let stdout = join_pipe(stdout)?;
        let stderr = join_pipe(stderr)?;
        if !status.success() {
            return Err(ModelError::Failed {
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }
        String::from_utf8(stdout).map_err(|_| ModelError::NonUtf8Output)
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_pipe<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("model pipe thread panicked")))
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("model failed: {0}")]
    Model(#[from] ModelError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Result of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generated {
    pub prompt: String,
    pub style: IconStyle,
    pub icons: Vec<Icon>,
    /// Icons were recovered from free text rather than structured output.
    pub used_fallback: bool,
    pub generated_at: DateTime<Utc>,
}

/// Ask `model` for icons and ingest its response.
///
/// # Errors
/// Fails when the model fails or its response holds no usable icon.
pub fn generate(model: &dyn IconModel, request: &GenerateRequest) -> Result<Generated, GenerateError> {
    let _scope = crate::perf::scope("generate");
    info!(prompt = request.prompt(), style = %request.style(), count = request.count(), "generating icons");

    let raw = model.complete(&system_prompt(), &user_prompt(request))?;
    crate::perf::log_event("generate.response", format!("len={}", raw.len()));

    let mut ingestion = ingest(&raw)?;
    ingestion.truncate(request.count());
    let used_fallback = ingestion.used_fallback();
    let icons = ingestion.into_icons();
    info!(icons = icons.len(), used_fallback, "generated icons");

    Ok(Generated {
        prompt: request.prompt().to_string(),
        style: request.style(),
        icons,
        used_fallback,
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeModel {
        response: Result<String, ()>,
        seen: RefCell<Vec<String>>,
    }

    impl FakeModel {
        fn answering(response: &str) -> Self {
            Self {
                response: Ok(response.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl IconModel for FakeModel {
        fn complete(&self, _system: &str, user: &str) -> Result<String, ModelError> {
            self.seen.borrow_mut().push(user.to_string());
            self.response.clone().map_err(|()| ModelError::NonUtf8Output)
        }
    }

    #[test]
    fn test_request_validation() {
        assert!(GenerateRequest::new("  ab  ", IconStyle::Modern, None).is_err());
        assert!(GenerateRequest::new(&"x".repeat(501), IconStyle::Modern, None).is_err());
        assert!(GenerateRequest::new("gear", IconStyle::Modern, Some(0)).is_err());
        assert!(GenerateRequest::new("gear", IconStyle::Modern, Some(9)).is_err());

        let request = GenerateRequest::new("  gear  ", IconStyle::Minimal, None).unwrap();
        assert_eq!(request.prompt(), "gear");
        assert_eq!(request.count(), DEFAULT_ICON_COUNT);
    }

    #[test]
    fn test_user_prompt_mentions_count_and_style() {
        let request = GenerateRequest::new("cloud upload", IconStyle::Minimal, Some(3)).unwrap();
        let prompt = user_prompt(&request);
        assert!(prompt.contains("3 SVG icons"));
        assert!(prompt.contains("cloud upload"));
        assert!(prompt.contains("minimal"));
        assert!(system_prompt().contains("\"icons\""));
    }

    #[test]
    fn test_generate_truncates_to_count() {
        let svg = "<svg><path d=\\\"M0 0\\\"/></svg>";
        let icons: Vec<String> = (0..5)
            .map(|i| format!("{{\"name\":\"n{i}\",\"svg\":\"{svg}\"}}"))
            .collect();
        let model = FakeModel::answering(&format!("{{\"icons\":[{}]}}", icons.join(",")));
        let request = GenerateRequest::new("gear", IconStyle::Modern, Some(2)).unwrap();

        let generated = generate(&model, &request).unwrap();
        assert_eq!(generated.icons.len(), 2);
        assert_eq!(generated.icons[0].name, "n0");
        assert!(!generated.used_fallback);
        assert_eq!(model.seen.borrow().len(), 1);
    }

    #[test]
    fn test_generate_reports_fallback() {
        let model = FakeModel::answering("Sure! <svg><rect/></svg>");
        let request = GenerateRequest::new("square", IconStyle::Classic, None).unwrap();
        let generated = generate(&model, &request).unwrap();
        assert!(generated.used_fallback);
        assert_eq!(generated.icons[0].name, "Icon 1");
    }

    #[test]
    fn test_generate_propagates_errors() {
        let request = GenerateRequest::new("gear", IconStyle::Modern, None).unwrap();
        let empty = FakeModel::answering("no icons here");
        assert!(matches!(generate(&empty, &request), Err(GenerateError::Ingest(_))));

        let failing = FakeModel {
            response: Err(()),
            seen: RefCell::new(Vec::new()),
        };
        assert!(matches!(generate(&failing, &request), Err(GenerateError::Model(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_model_pipes_prompts_through_program() {
        let model = CommandModel::new("cat", Vec::new());
        let out = model.complete("sys", "usr").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["system"], "sys");
        assert_eq!(value["user"], "usr");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_model_kills_program_after_timeout() {
        let model = CommandModel::new("sleep", vec!["5".to_string()])
            .with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let err = model.complete("a", "b").unwrap_err();
        assert!(matches!(
            err,
            ModelError::Timeout { ref program, timeout }
                if program == "sleep" && timeout == Duration::from_millis(200)
        ));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_model_failure_reports_stderr() {
        let model = CommandModel::new(
            "sh",
            vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()],
        );
        match model.complete("a", "b") {
            Err(ModelError::Failed { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_command_model_defaults_to_five_minute_timeout() {
        let model = CommandModel::new("cat", Vec::new());
        assert_eq!(model.timeout, DEFAULT_MODEL_TIMEOUT);
        assert_eq!(DEFAULT_MODEL_TIMEOUT, Duration::from_secs(300));
    }

    #[test]
    fn test_command_model_missing_program_is_spawn_error() {
        let model = CommandModel::new("icon-factory-no-such-program", Vec::new());
        assert!(matches!(model.complete("a", "b"), Err(ModelError::Spawn { .. })));
    }
}
