//! Compiled commands

use crate::error::{Result, TabulaError};
use crate::param::Parameter;

/// How the executor should interpret [`Command::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandKind {
    #[default]
    Text,
    StoredRoutine,
}

/// Statement category derived from the leading keyword of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Select,
    Insert,
    Update,
    Delete,
    Truncate,
    Unknown,
}

/// Compiled text plus its ordered parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Command {
    text: String,
    parameters: Vec<Parameter>,
    kind: CommandKind,
    follow_up: Option<Box<Command>>,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A call of a stored routine by name.
    pub fn stored_routine(name: impl Into<String>) -> Self {
        Self {
            text: name.into(),
            kind: CommandKind::StoredRoutine,
            ..Self::default()
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Attach a command to run right after this one on the same connection.
    pub fn with_follow_up(mut self, follow_up: Command) -> Self {
        self.follow_up = Some(Box::new(follow_up));
        self
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[inline]
    pub fn parameters_mut(&mut self) -> &mut [Parameter] {
        &mut self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The first parameter the executor writes back, if any.
    pub fn output_parameter(&self) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.is_output())
    }

    pub fn output_parameter_mut(&mut self) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.is_output())
    }

    #[inline]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    #[inline]
    pub fn follow_up(&self) -> Option<&Command> {
        self.follow_up.as_deref()
    }

    pub fn follow_up_mut(&mut self) -> Option<&mut Command> {
        self.follow_up.as_deref_mut()
    }

    /// A command is initialized iff it has text.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Guard used before handing a command to an executor.
    pub fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(TabulaError::InvalidOperation(
                "command has no text and cannot be executed".into(),
            ))
        }
    }

    pub fn transaction_kind(&self) -> TransactionKind {
        let keyword = self
            .text
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default();
        match keyword.to_ascii_uppercase().as_str() {
            "SELECT" | "WITH" => TransactionKind::Select,
            "INSERT" => TransactionKind::Insert,
            "UPDATE" => TransactionKind::Update,
            "DELETE" => TransactionKind::Delete,
            "TRUNCATE" => TransactionKind::Truncate,
            _ => TransactionKind::Unknown,
        }
    }
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.text)
    }
}
