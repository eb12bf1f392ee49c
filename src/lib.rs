//! Slash-command chain engine for chat-style multiplayer clients.
//!
//! One line of user input (the part after the `/` trigger) is resolved
//! against a [`registry::CommandRegistry`], tokenized and validated through
//! a chain of typed argument selectors, and either dispatched to a handler
//! or turned into autocomplete suggestions for the cursor position. The
//! engine owns no domain data: entity rosters etc. are supplied by the
//! embedding client through the [`ExecutionContext`].

pub mod chain;
pub mod entity;
pub mod input;
pub mod registry;
pub mod selector;
pub mod session;
pub mod token;

use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use entity::{Character, CharacterRoster};

pub use chain::{ChainBuilder, Handler, RunnerNode};
pub use registry::{CommandDefinition, CommandRegistry};
pub use session::{TabCompleteResult, TabCompleteSession};

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Character(Character),
}

impl ArgValue {
    /// Convert value to string representation (for headers and messages).
    pub fn to_string_value(&self) -> String {
        match self {
            ArgValue::Str(s) => s.clone(),
            ArgValue::Int(i) => i.to_string(),
            ArgValue::Float(f) => f.to_string(),
            ArgValue::Character(c) => c.name.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ArgValue::Float(f) => Some(*f),
            ArgValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_character(&self) -> Option<&Character> {
        match self {
            ArgValue::Character(c) => Some(c),
            _ => None,
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

/// Arguments accumulated along a runner chain.
///
/// Append-only: [`Args::with`] produces a new record, so every node sees a
/// stable view of the values parsed before it. Duplicate names are rejected
/// when the chain is built, not here.
#[derive(Debug, Clone, Default)]
pub struct Args(HashMap<String, ArgValue>);

impl Args {
    pub fn new() -> Self {
        Args::default()
    }

    /// A copy of this record extended by one more argument.
    pub fn with(&self, name: impl Into<String>, value: ArgValue) -> Args {
        let mut map = self.0.clone();
        map.insert(name.into(), value);
        Args(map)
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ArgValue::as_int)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ArgValue::as_float)
    }

    pub fn get_character(&self, name: &str) -> Option<&Character> {
        self.get(name).and_then(ArgValue::as_character)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a chain invocation is being walked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Help,
    Run,
    Autocomplete,
}

/// Per-invocation state threaded through a chain walk.
///
/// Error strings are collected rather than logged; the embedding UI drains
/// [`ExecutionContext::errors`] and decides how to display them.
pub struct ExecutionContext {
    pub mode: ExecMode,
    /// Canonical name of the command being processed, set by the registry.
    pub command_name: String,
    /// User-facing error messages produced by this invocation.
    pub errors: Vec<String>,
    /// Caller-supplied lookup of addressable characters, if any.
    pub roster: Option<Rc<dyn CharacterRoster>>,
}

impl ExecutionContext {
    pub fn new(mode: ExecMode) -> Self {
        ExecutionContext {
            mode,
            command_name: String::new(),
            errors: Vec::new(),
            roster: None,
        }
    }

    pub fn with_roster(mode: ExecMode, roster: Rc<dyn CharacterRoster>) -> Self {
        ExecutionContext {
            roster: Some(roster),
            ..ExecutionContext::new(mode)
        }
    }

    /// Queue a user-facing error message.
    pub fn report(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// A single autocomplete candidate.
///
/// `replace` is what gets spliced into the input line, `display` is what
/// the suggestion list shows.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
    pub replace: String,
    pub display: String,
}

impl Suggestion {
    pub fn new(replace: impl Into<String>, display: impl Into<String>) -> Self {
        Suggestion {
            replace: replace.into(),
            display: display.into(),
        }
    }

    /// A candidate whose replacement and display text are the same.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Suggestion {
            display: value.clone(),
            replace: value,
        }
    }
}

/// One autocomplete answer: a header describing the argument shape plus the
/// candidate list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Completions {
    pub header: String,
    pub options: Vec<Suggestion>,
}

fn list_message(prefix: &str, selector: &str, names: &[String]) -> String {
    format!("{} '{}': {}", prefix, selector, names.join(", "))
}

fn not_found_message(selector: &str, allowed: &[String]) -> String {
    list_message("No match for", selector, allowed)
}

fn ambiguous_message(selector: &str, candidates: &[String]) -> String {
    list_message("More than one match for", selector, candidates)
}

/// Recoverable, user-facing failures produced while running a command.
///
/// Every failure is reported at the node where it occurs and short-circuits
/// the rest of the chain; nothing unwinds and nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No registered alias matched the leading token.
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),
    /// A single argument failed its selector's validation.
    #[error("{0}")]
    ParseFailure(String),
    /// More than one candidate survived the match ladder.
    #[error("{}", ambiguous_message(.selector, .candidates))]
    AmbiguousSelection {
        selector: String,
        candidates: Vec<String>,
    },
    /// The candidate universe contained zero matches.
    #[error("{}", not_found_message(.selector, .allowed))]
    NotFound {
        selector: String,
        allowed: Vec<String>,
    },
    /// A match was found but the targeting policy disallows it.
    #[error("{0}")]
    RestrictionViolation(String),
}

/// Failures detected while assembling a runner chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("duplicate argument name '{0}' in command chain")]
    DuplicateArgName(String),
}
