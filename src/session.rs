//! Per-widget tab-completion cycling.
//!
//! Turns the one-shot, recompute-everything registry autocomplete into the
//! conventional "press Tab repeatedly to cycle suggestions" interaction.
//! One session belongs to exactly one input widget; two widgets must never
//! share a session.

use serde::{Deserialize, Serialize};

use crate::registry::CommandRegistry;
use crate::{ExecutionContext, Suggestion};

/// What one tab press produced.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TabCompleteResult {
    /// Text to place in the input box.
    pub result: String,
    /// Candidate list for on-screen display.
    pub options: Vec<Suggestion>,
    /// Highlighted option while actively cycling, if any.
    pub index: Option<usize>,
}

/// Cycling state for one input widget.
///
/// A query that matches the previous result continues the cycle; any other
/// text resets the session and recomputes from scratch.
#[derive(Debug, Default)]
pub struct TabCompleteSession {
    last_query: Option<String>,
    last_options: Vec<Suggestion>,
    next_index: usize,
}

impl TabCompleteSession {
    pub fn new() -> Self {
        TabCompleteSession::default()
    }

    pub fn reset(&mut self) {
        self.last_query = None;
        self.last_options.clear();
        self.next_index = 0;
    }

    /// Complete `query` (an input line without its trigger character).
    pub fn complete(
        &mut self,
        registry: &CommandRegistry,
        ctx: &mut ExecutionContext,
        query: &str,
    ) -> TabCompleteResult {
        if self.last_query.as_deref() == Some(query)
            && self.next_index < self.last_options.len()
        {
            // Same text as last time: hand out the next option in the ring.
            let index = self.next_index;
            let result = self.last_options[index].replace.trim().to_string();
            self.next_index = (index + 1) % self.last_options.len();
            self.last_query = Some(result.clone());
            return TabCompleteResult {
                result,
                options: self.last_options.clone(),
                index: Some(index),
            };
        }

        // Fresh query: recompute the option list from scratch.
        let options = registry
            .autocomplete(ctx, query)
            .map(|c| c.options)
            .unwrap_or_default();

        match options.len() {
            0 => {
                self.last_query = Some(query.to_string());
                self.last_options.clear();
                self.next_index = 0;
                TabCompleteResult {
                    result: query.to_string(),
                    options,
                    index: None,
                }
            }
            1 => {
                // Unambiguous: commit it fully, no cycle to populate.
                self.reset();
                TabCompleteResult {
                    result: format!("{} ", options[0].replace),
                    options,
                    index: None,
                }
            }
            _ => {
                let values: Vec<&str> =
                    options.iter().map(|o| o.replace.as_str()).collect();
                let prefix = longest_common_prefix(&values);
                self.last_query = Some(query.to_string());
                self.last_options = options.clone();
                self.next_index = 0;
                TabCompleteResult {
                    result: prefix,
                    options,
                    index: None,
                }
            }
        }
    }
}

/// Character-by-character common prefix; empty for an empty candidate set.
pub fn longest_common_prefix(values: &[&str]) -> String {
    let Some(first) = values.first() else {
        return String::new();
    };
    let mut end = first.len();
    for value in &values[1..] {
        let common: usize = first
            .chars()
            .zip(value.chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .sum();
        end = end.min(common);
    }
    first[..end].to_string()
}
