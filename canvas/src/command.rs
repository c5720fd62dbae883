//! Engine protocol: typed inbound commands and outbound requests.
//!
//! Commands arrive as a syscall name plus a JSON payload and are parsed into
//! [`Command`] before anything touches scene state. Requests flow the other
//! way: the scene asks the engine to start, pause, resume or halt a run,
//! reports observations, and acknowledges the image barrier.

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use serde_json::{Map, Value};

/// Error parsing an inbound command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownSyscall(String),
    #[error("{syscall}: missing field `{field}`")]
    MissingField { syscall: String, field: &'static str },
    #[error("{syscall}: invalid field `{field}`")]
    InvalidField { syscall: String, field: &'static str },
}

/// A command from the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// The engine accepted the program and is running it.
    Started,
    /// The engine finished or stopped the run.
    Halted,
    /// The engine failed; the run is over.
    EngineError { message: String },
    /// Something worth showing the user; no state change.
    Warning { message: String },
    /// Create an object. `id: None` makes an anonymous, drawable-only object.
    DefineObject { id: Option<String>, descriptor: Map<String, Value> },
    /// Overwrite properties of a registered object.
    UpdateObject { id: String, properties: Map<String, Value> },
    /// Animate properties of a registered object.
    AnimateObject { id: String, duration_ms: f64, properties: Map<String, Value> },
    /// Start loading an image resource.
    LoadImage { id: String, url: String },
    /// Reply once every outstanding image load has settled.
    WaitImagesLoaded,
    /// Run time plus metric snapshot.
    TimeUpdate { snapshot: Map<String, Value> },
}

impl Command {
    /// Parse a syscall and payload.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for unknown syscalls and missing or
    /// mistyped fields.
    pub fn parse(syscall: &str, data: &Value) -> Result<Self, CommandError> {
        let p = Payload { syscall, data };
        match syscall {
            "canvas:lpsStart" => Ok(Self::Started),
            "canvas:lpsHalted" => Ok(Self::Halted),
            "canvas:lpsErrorred" => Ok(Self::EngineError { message: p.message() }),
            "canvas:lpsWarning" => Ok(Self::Warning { message: p.message() }),
            "canvas:defineObject" => {
                let descriptor = p.object()?.clone();
                let id = match descriptor.get("id") {
                    None | Some(Value::Null) => None,
                    Some(v) => Some(identifier(v).ok_or_else(|| p.invalid("id"))?),
                };
                Ok(Self::DefineObject { id, descriptor })
            }
            "canvas:updateObject" => Ok(Self::UpdateObject {
                id: p.id()?,
                properties: p.map("properties")?,
            }),
            "canvas:animateObject" => Ok(Self::AnimateObject {
                id: p.id()?,
                duration_ms: p
                    .object()?
                    .get("duration")
                    .ok_or_else(|| p.missing("duration"))?
                    .as_f64()
                    .ok_or_else(|| p.invalid("duration"))?,
                properties: p.map("properties")?,
            }),
            "canvas:loadImage" => Ok(Self::LoadImage {
                id: p.id()?,
                url: p.string("url")?,
            }),
            "canvas:waitImagesLoaded" => Ok(Self::WaitImagesLoaded),
            "canvas:lpsTimeUpdate" => Ok(Self::TimeUpdate { snapshot: p.object()?.clone() }),
            other => Err(CommandError::UnknownSyscall(other.to_owned())),
        }
    }
}

/// Identifiers may be strings or numbers on the wire.
fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

struct Payload<'a> {
    syscall: &'a str,
    data: &'a Value,
}

impl Payload<'_> {
    fn missing(&self, field: &'static str) -> CommandError {
        CommandError::MissingField { syscall: self.syscall.to_owned(), field }
    }

    fn invalid(&self, field: &'static str) -> CommandError {
        CommandError::InvalidField { syscall: self.syscall.to_owned(), field }
    }

    fn object(&self) -> Result<&Map<String, Value>, CommandError> {
        self.data.as_object().ok_or_else(|| self.invalid("data"))
    }

    fn id(&self) -> Result<String, CommandError> {
        let value = self.object()?.get("id").ok_or_else(|| self.missing("id"))?;
        identifier(value).ok_or_else(|| self.invalid("id"))
    }

    fn string(&self, field: &'static str) -> Result<String, CommandError> {
        self.object()?
            .get(field)
            .ok_or_else(|| self.missing(field))?
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.invalid(field))
    }

    fn map(&self, field: &'static str) -> Result<Map<String, Value>, CommandError> {
        match self.object()?.get(field) {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(m)) => Ok(m.clone()),
            Some(_) => Err(self.invalid(field)),
        }
    }

    /// Engine messages come either bare or as `{"message": ...}`.
    fn message(&self) -> String {
        match self.data {
            Value::String(s) => s.clone(),
            Value::Object(m) => match m.get("message") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            },
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// A request from the scene to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Load and run the program at `pathname`.
    Start { pathname: String },
    Pause,
    Unpause,
    Halt,
    /// A comma-joined batch of observation literals, or verbatim console input.
    Observe { input: String },
    /// Every image requested before the barrier has loaded.
    ImagesLoaded,
}

impl Request {
    /// Wire syscall name.
    #[must_use]
    pub fn syscall(&self) -> &'static str {
        match self {
            Self::Start { .. } => "lps:start",
            Self::Pause => "lps:pause",
            Self::Unpause => "lps:unpause",
            Self::Halt => "lps:halt",
            Self::Observe { .. } => "lps:observe",
            Self::ImagesLoaded => "lps:canvasImagesLoaded",
        }
    }

    /// Wire payload, without the window tag the host adds.
    #[must_use]
    pub fn payload(&self) -> Map<String, Value> {
        let mut data = Map::new();
        match self {
            Self::Start { pathname } => {
                data.insert("pathname".into(), Value::String(pathname.clone()));
            }
            Self::Observe { input } => {
                data.insert("input".into(), Value::String(input.clone()));
            }
            Self::Pause | Self::Unpause | Self::Halt | Self::ImagesLoaded => {}
        }
        data
    }
}
