//! The runner chain: an immutable tree of argument parsers ending in a
//! handler, walked by recursive descent for both execution and
//! autocomplete.
//!
//! There is no separate state machine; node identity is the state, and the
//! chain is walked top to bottom exactly once per invocation with no
//! backtracking.

use std::collections::HashSet;

use crate::selector::StepProcessor;
use crate::token::{needs_quoting, quote_for_insertion};
use crate::{Args, BuildError, Completions, ExecutionContext, Suggestion};

/// Terminal handler: receives the full accumulated arguments and whatever
/// trailing text remains after the last parsed argument.
pub type Handler = Box<dyn Fn(&mut ExecutionContext, &Args, &str) -> bool>;

/// One node of a command's runner chain. Built once, immutable thereafter.
pub enum RunnerNode {
    /// Terminal node owning the command handler.
    Executor { handler: Handler },
    /// Composite node: parses one named argument, then hands the rest of
    /// the line to its single child.
    ArgParser {
        name: String,
        step: Box<dyn StepProcessor>,
        child: Box<RunnerNode>,
    },
}

impl RunnerNode {
    /// Execute the chain against `input`.
    ///
    /// The first parse failure is reported through the context and stops
    /// the walk, so no handler runs after a failed argument.
    pub fn run(&self, ctx: &mut ExecutionContext, args: &Args, input: &str) -> bool {
        match self {
            RunnerNode::Executor { handler } => handler(ctx, args, input),
            RunnerNode::ArgParser { name, step, child } => {
                let token = step.split(input);
                match step.parse(&token.value, ctx, args) {
                    Ok(value) => {
                        child.run(ctx, &args.with(name.as_str(), value), &token.rest)
                    }
                    Err(err) => {
                        ctx.report(err.to_string());
                        false
                    }
                }
            }
        }
    }

    /// Compute suggestions for the argument the cursor is in.
    ///
    /// Arguments before the cursor must parse for completion to continue;
    /// there are no suggestions past an invalid argument.
    pub fn autocomplete(
        &self,
        ctx: &ExecutionContext,
        args: &Args,
        input: &str,
    ) -> Option<Completions> {
        let RunnerNode::ArgParser { name, step, child } = self else {
            return None;
        };
        let token = step.split(input);
        let quote_aware = step.preparse().is_quote_aware();
        let shown = step.display_name().unwrap_or(name);

        if token.rest.is_empty() && token.spacing.is_empty() {
            // Nothing follows: this is the argument being completed.
            let mut options = step.autocomplete(&token.value, ctx, args);
            if options.is_empty() {
                return None;
            }
            if quote_aware && options.iter().any(|o| needs_quoting(&o.replace)) {
                for o in &mut options {
                    o.replace = quote_for_insertion(&o.replace, true);
                }
            }
            return Some(Completions {
                header: format!("\u{2192}{}\u{2190} {}", shown, child.predict_header()),
                options,
            });
        }

        let value = step.parse(&token.value, ctx, args).ok()?;
        let extended = args.with(name.as_str(), value.clone());
        let inner = child.autocomplete(ctx, &extended, &token.rest)?;

        let own = if quote_aware {
            quote_for_insertion(&token.value, false)
        } else {
            token.value.clone()
        };
        let label = if step.show_value_in_header() {
            format!("{}({})", shown, value.to_string_value())
        } else {
            shown.to_string()
        };
        let options = inner
            .options
            .into_iter()
            .map(|o| Suggestion {
                replace: format!("{} {}", own, o.replace),
                display: o.display,
            })
            .collect();
        Some(Completions {
            header: format!("{} {}", label, inner.header),
            options,
        })
    }

    /// Preview of the remaining argument shape, without consuming input.
    pub fn predict_header(&self) -> String {
        match self {
            RunnerNode::Executor { .. } => String::new(),
            RunnerNode::ArgParser { name, step, child } => {
                let shown = step.display_name().unwrap_or(name);
                format!("{} {}", shown, child.predict_header())
            }
        }
    }
}

/// Assembles a runner chain from an ordered list of named selectors plus a
/// terminal handler.
#[derive(Default)]
pub struct ChainBuilder {
    steps: Vec<(String, Box<dyn StepProcessor>)>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        ChainBuilder { steps: Vec::new() }
    }

    pub fn arg(
        mut self,
        name: impl Into<String>,
        step: impl StepProcessor + 'static,
    ) -> Self {
        self.steps.push((name.into(), Box::new(step)));
        self
    }

    /// Finish the chain. Fails fast on duplicate argument names.
    pub fn build(
        self,
        handler: impl Fn(&mut ExecutionContext, &Args, &str) -> bool + 'static,
    ) -> Result<RunnerNode, BuildError> {
        let mut seen = HashSet::new();
        for (name, _) in &self.steps {
            if !seen.insert(name.clone()) {
                return Err(BuildError::DuplicateArgName(name.clone()));
            }
        }

        let mut node = RunnerNode::Executor {
            handler: Box::new(handler),
        };
        for (name, step) in self.steps.into_iter().rev() {
            node = RunnerNode::ArgParser {
                name,
                step,
                child: Box::new(node),
            };
        }
        Ok(node)
    }
}
