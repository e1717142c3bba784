use std::fmt::{Debug, Write};
use std::{borrow::Cow, panic::Location};

use serde::{ser::SerializeStruct, Deserialize, Serialize};
use strum_macros::IntoStaticStr;

/// User provided input could not be loaded.
#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidInputError {
    #[error("Failed to load build configuration file from '{path}'")]
    LoadBuildConfiguration { path: String },
    #[error("Failed to parse build configuration")]
    ParseBuildConfiguration,
    #[error("Failed to write output to '{path}'")]
    WriteOutput { path: String },
}

/// The storage tree could not be turned into a consistent set of stages.
#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestError {
    #[error("Unsupported filesystem type '{fs_type}'")]
    UnsupportedFilesystem { fs_type: String },
    #[error("The device name '{name}' has been generated for two different devices")]
    DeviceNameCollision { name: String },
    #[error("No mount found for the filesystem root")]
    MissingRootMount,
}

/// A bug was encountered. None of these are reachable with a well-formed
/// storage tree.
#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum InternalError {
    #[error("Internal error: {0}")]
    Internal(&'static str),
    #[error("Entity of kind '{kind}' has no device name")]
    UnnamedEntity { kind: String },
    #[error("Partition encountered outside of a partition table")]
    MissingPartitionTable,
    #[error("No device precedes {kind} '{name}'")]
    EmptyDeviceChain { kind: String, name: String },
    #[error("Failed to serialize manifest")]
    SerializeManifest,
    #[error("Stagehand panicked: {0}")]
    Panic(String),
}

/// Each variant of `ErrorKind` corresponds to a different category of error.
#[derive(Debug, Eq, thiserror::Error, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    /// The build configuration could not be read or written.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// The storage tree is inconsistent with the stages it should produce.
    /// These are attributable to the input and can be fixed by the caller.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// An internal invariant was violated. This indicates a problem with
    /// Stagehand, not with its input.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(Debug)]
struct StagehandErrorInner {
    kind: ErrorKind,
    location: &'static Location<'static>,
    source: Option<anyhow::Error>,
    context: Vec<(Cow<'static, str>, &'static Location<'static>)>,
}

pub struct StagehandError(Box<StagehandErrorInner>);
impl StagehandError {
    #[track_caller]
    pub fn new(kind: impl Into<ErrorKind>) -> Self {
        StagehandError(Box::new(StagehandErrorInner {
            kind: kind.into(),
            location: Location::caller(),
            source: None,
            context: Vec::new(),
        }))
    }

    /// Returns a reference to the inner ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.0.kind
    }

    /// Returns whether this error is an internal defect rather than an
    /// input problem.
    pub fn is_internal(&self) -> bool {
        matches!(self.0.kind, ErrorKind::Internal(_))
    }
}

pub trait ReportError<T, K> {
    /// Convert this error into a structured StagehandError.
    fn structured(self, kind: K) -> Result<T, StagehandError>;
}

impl<T, K> ReportError<T, K> for Option<T>
where
    K: Into<ErrorKind>,
{
    #[track_caller]
    fn structured(self, kind: K) -> Result<T, StagehandError> {
        match self {
            Some(t) => Ok(t),
            None => Err(StagehandError::new(kind)),
        }
    }
}

impl<T, E, K> ReportError<T, K> for Result<T, E>
where
    E: Into<anyhow::Error>,
    K: Into<ErrorKind>,
{
    #[track_caller]
    fn structured(self, kind: K) -> Result<T, StagehandError> {
        match self {
            Ok(o) => Ok(o),
            Err(e) => Err(StagehandError(Box::new(StagehandErrorInner {
                kind: kind.into(),
                location: Location::caller(),
                source: Some(e.into()),
                context: Vec::new(),
            }))),
        }
    }
}

pub trait StagehandResultExt<T> {
    /// Attach a context message to the error.
    fn message(self, context: impl Into<Cow<'static, str>>) -> Result<T, StagehandError>;
}
impl<T> StagehandResultExt<T> for Result<T, StagehandError> {
    #[track_caller]
    fn message(mut self, context: impl Into<Cow<'static, str>>) -> Result<T, StagehandError> {
        if let Err(ref mut e) = self {
            e.0.context.push((context.into(), Location::caller()));
        }
        self
    }
}

impl Serialize for StagehandError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("stagehand-error", 5)?;
        state.serialize_field("message", &self.0.kind.to_string())?;
        match self.0.kind {
            ErrorKind::InvalidInput(ref e) => state.serialize_field("error", e)?,
            ErrorKind::Manifest(ref e) => state.serialize_field("error", e)?,
            ErrorKind::Internal(ref e) => state.serialize_field("error", e)?,
        }
        state.serialize_field("category", <&str>::from(&self.0.kind))?;
        state.serialize_field(
            "location",
            &format!("{}:{}", self.0.location.file(), self.0.location.line()),
        )?;
        match self.0.source {
            Some(ref e) => state.serialize_field("cause", &Some(format!("{:?}", e)))?,
            None => state.serialize_field("cause", &None::<String>)?,
        }
        state.end()
    }
}

impl Debug for StagehandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.0.kind,
            self.0.location.file(),
            self.0.location.line()
        )?;

        if !self.0.context.is_empty() {
            writeln!(f, "\n\nContext:")?;
            for (i, (context, location)) in self.0.context.iter().enumerate() {
                for (j, line) in context.split('\n').enumerate() {
                    if j == 0 {
                        write!(f, "{: >5}: ", i)?;
                    } else {
                        f.write_str("\n       ")?;
                    }
                    f.write_str(line)?;
                }
                writeln!(f, " at {}:{}", location.file(), location.line())?;
            }
        }

        if let Some(ref source) = self.0.source {
            writeln!(f, "\n\nCaused by:")?;
            let mut index = 0;
            let mut source: Option<&dyn std::error::Error> = Some(source.as_ref());
            while let Some(e) = source {
                for (i, line) in e.to_string().split('\n').enumerate() {
                    if i == 0 {
                        write!(f, "{: >5}: ", index)?;
                    } else {
                        f.write_str("\n       ")?;
                    }
                    f.write_str(line)?;
                }
                f.write_char('\n')?;
                source = e.source();
                index += 1;
            }
        }
        Ok(())
    }
}
