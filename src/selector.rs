//! Argument selectors: the per-argument parse/autocomplete contract and
//! the built-in selector kinds.
//!
//! Every selector implements [`StepProcessor`], a narrow capability trait:
//! how to tokenize the argument, how to validate it, and (optionally) how
//! to suggest completions for it. Selection-based selectors share the
//! three-stage match ladder in [`run_ladder`].

use crate::token::{next_token, Preparse, Token};
use crate::{ArgValue, Args, CommandError, ExecutionContext, Suggestion};

/// Largest integer exactly representable in an f64 (2^53 - 1). Numeric
/// selector bounds default to this range.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// How one command argument is consumed.
///
/// `parse` must be total and side-effect-free: all failure is conveyed
/// through the returned `Result`, never by panicking.
pub trait StepProcessor {
    /// Tokenizing strategy applied before `parse` sees the text.
    fn preparse(&self) -> Preparse {
        Preparse::Quoted
    }

    /// Split the next token off `input`. The default applies `preparse`;
    /// override for fully custom tokenization.
    fn split(&self, input: &str) -> Token {
        next_token(input, self.preparse())
    }

    fn parse(
        &self,
        value: &str,
        ctx: &ExecutionContext,
        args: &Args,
    ) -> Result<ArgValue, CommandError>;

    /// Completion candidates for a partial token. Default: none.
    fn autocomplete(
        &self,
        _value: &str,
        _ctx: &ExecutionContext,
        _args: &Args,
    ) -> Vec<Suggestion> {
        Vec::new()
    }

    /// Show the resolved value next to the argument name in suggestion
    /// headers for later arguments.
    fn show_value_in_header(&self) -> bool {
        false
    }

    /// Override the argument name shown in headers.
    fn display_name(&self) -> Option<&str> {
        None
    }
}

/// Outcome of the match ladder over a candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LadderOutcome {
    /// Exactly one candidate survived; its index.
    Hit(usize),
    /// No stage produced a candidate.
    Missing,
    /// More than one candidate tied; their indices.
    Tie(Vec<usize>),
}

/// Resolve `input` against `names`: exact match, then case-insensitive
/// exact, then case-insensitive prefix. The first stage with at least one
/// hit decides the outcome.
pub fn run_ladder(input: &str, names: &[&str]) -> LadderOutcome {
    let mut hits: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, n)| **n == input)
        .map(|(i, _)| i)
        .collect();

    if hits.is_empty() {
        let lower = input.to_lowercase();
        hits = names
            .iter()
            .enumerate()
            .filter(|(_, n)| n.to_lowercase() == lower)
            .map(|(i, _)| i)
            .collect();
        if hits.is_empty() {
            hits = names
                .iter()
                .enumerate()
                .filter(|(_, n)| n.to_lowercase().starts_with(&lower))
                .map(|(i, _)| i)
                .collect();
        }
    }

    match hits.len() {
        0 => LadderOutcome::Missing,
        1 => LadderOutcome::Hit(hits[0]),
        _ => LadderOutcome::Tie(hits),
    }
}

fn ladder_select<'a>(
    input: &str,
    names: &[&'a str],
) -> Result<usize, CommandError> {
    match run_ladder(input, names) {
        LadderOutcome::Hit(idx) => Ok(idx),
        LadderOutcome::Missing => Err(CommandError::NotFound {
            selector: input.to_string(),
            allowed: names.iter().map(|n| n.to_string()).collect(),
        }),
        LadderOutcome::Tie(indices) => Err(CommandError::AmbiguousSelection {
            selector: input.to_string(),
            candidates: indices.iter().map(|&i| names[i].to_string()).collect(),
        }),
    }
}

fn prefix_filter(value: &str, names: &[&str]) -> Vec<usize> {
    let lower = value.to_lowercase();
    names
        .iter()
        .enumerate()
        .filter(|(_, n)| n.to_lowercase().starts_with(&lower))
        .map(|(i, _)| i)
        .collect()
}

/// One option of an [`EnumSelector`].
#[derive(Debug, Clone)]
pub struct EnumOption {
    pub value: String,
    pub description: Option<String>,
}

/// Selects one of a fixed set of literal values.
pub struct EnumSelector {
    options: Vec<EnumOption>,
}

impl EnumSelector {
    pub fn new<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        EnumSelector {
            options: values
                .into_iter()
                .map(|v| EnumOption {
                    value: v.to_string(),
                    description: None,
                })
                .collect(),
        }
    }

    /// Options paired with a human description for the suggestion list.
    pub fn with_descriptions<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        EnumSelector {
            options: pairs
                .into_iter()
                .map(|(v, d)| EnumOption {
                    value: v.to_string(),
                    description: Some(d.to_string()),
                })
                .collect(),
        }
    }

    fn names(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.value.as_str()).collect()
    }
}

impl StepProcessor for EnumSelector {
    fn parse(
        &self,
        value: &str,
        _ctx: &ExecutionContext,
        _args: &Args,
    ) -> Result<ArgValue, CommandError> {
        let idx = ladder_select(value, &self.names())?;
        Ok(ArgValue::Str(self.options[idx].value.clone()))
    }

    fn autocomplete(
        &self,
        value: &str,
        _ctx: &ExecutionContext,
        _args: &Args,
    ) -> Vec<Suggestion> {
        prefix_filter(value, &self.names())
            .into_iter()
            .map(|i| {
                let opt = &self.options[i];
                let display = match &opt.description {
                    Some(d) => format!("{} - {}", opt.value, d),
                    None => opt.value.clone(),
                };
                Suggestion::new(opt.value.clone(), display)
            })
            .collect()
    }
}

/// One option of a [`NamedSelector`]: a display name carrying a payload.
#[derive(Debug, Clone)]
pub struct NamedOption {
    pub name: String,
    pub value: ArgValue,
}

/// Selects a payload value by display name.
///
/// Duplicate names are disambiguated at construction by appending an
/// incrementing numeric suffix to later duplicates, so the ladder only
/// ever sees unique names.
pub struct NamedSelector {
    options: Vec<NamedOption>,
}

impl NamedSelector {
    pub fn new(options: impl IntoIterator<Item = (String, ArgValue)>) -> Self {
        let mut counts: std::collections::HashMap<String, usize> =
            std::collections::HashMap::new();
        let options = options
            .into_iter()
            .map(|(name, value)| {
                let seen = counts.entry(name.clone()).or_insert(0);
                let unique = if *seen == 0 {
                    name.clone()
                } else {
                    format!("{}{}", name, seen)
                };
                *seen += 1;
                NamedOption {
                    name: unique,
                    value,
                }
            })
            .collect();
        NamedSelector { options }
    }

    fn names(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.name.as_str()).collect()
    }
}

impl StepProcessor for NamedSelector {
    fn parse(
        &self,
        value: &str,
        _ctx: &ExecutionContext,
        _args: &Args,
    ) -> Result<ArgValue, CommandError> {
        let idx = ladder_select(value, &self.names())?;
        Ok(self.options[idx].value.clone())
    }

    fn autocomplete(
        &self,
        value: &str,
        _ctx: &ExecutionContext,
        _args: &Args,
    ) -> Vec<Suggestion> {
        prefix_filter(value, &self.names())
            .into_iter()
            .map(|i| Suggestion::plain(self.options[i].name.clone()))
            .collect()
    }
}

/// Selects a number within an inclusive range.
pub struct NumberSelector {
    min: f64,
    max: f64,
    allow_decimals: bool,
}

impl NumberSelector {
    pub fn new() -> Self {
        NumberSelector {
            min: -MAX_SAFE_INTEGER,
            max: MAX_SAFE_INTEGER,
            allow_decimals: false,
        }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = min;
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }

    pub fn allow_decimals(mut self, allow: bool) -> Self {
        self.allow_decimals = allow;
        self
    }

    /// Optional `-`, digits, optional fractional part after `.` or `,`.
    fn is_number_syntax(s: &str) -> bool {
        let digits = s.strip_prefix('-').unwrap_or(s);
        if digits.is_empty() {
            return false;
        }
        let mut parts = digits.splitn(2, ['.', ',']);
        let whole = parts.next().unwrap_or("");
        let all_digits =
            |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) {
            return false;
        }
        match parts.next() {
            Some(frac) => all_digits(frac),
            None => true,
        }
    }
}

impl Default for NumberSelector {
    fn default() -> Self {
        NumberSelector::new()
    }
}

impl StepProcessor for NumberSelector {
    fn parse(
        &self,
        value: &str,
        _ctx: &ExecutionContext,
        _args: &Args,
    ) -> Result<ArgValue, CommandError> {
        if !Self::is_number_syntax(value) {
            return Err(CommandError::ParseFailure(format!(
                "'{}' is not a number",
                value
            )));
        }
        let normalized = value.replace(',', ".");
        let number: f64 = normalized.parse().map_err(|_| {
            CommandError::ParseFailure(format!("'{}' is not a number", value))
        })?;

        if number < self.min || number > self.max {
            return Err(CommandError::ParseFailure(format!(
                "Value must be between {} and {}",
                self.min, self.max
            )));
        }

        // Whole-number check comes after range validation.
        if !self.allow_decimals {
            if number.fract() != 0.0 || number.abs() > MAX_SAFE_INTEGER {
                return Err(CommandError::ParseFailure(format!(
                    "Expected a whole number, got '{}'",
                    value
                )));
            }
            return Ok(ArgValue::Int(number as i64));
        }
        Ok(ArgValue::Float(number))
    }
}

type SelectorFactory =
    Box<dyn Fn(&ExecutionContext, &Args) -> Box<dyn StepProcessor>>;

/// A selector whose option universe is regenerated on every call, so it can
/// depend on previously parsed arguments or live external state.
pub struct DynamicSelector {
    factory: SelectorFactory,
    preparse: Preparse,
    name: Option<String>,
}

impl DynamicSelector {
    pub fn new(
        factory: impl Fn(&ExecutionContext, &Args) -> Box<dyn StepProcessor> + 'static,
    ) -> Self {
        DynamicSelector {
            factory: Box::new(factory),
            preparse: Preparse::Quoted,
            name: None,
        }
    }

    pub fn with_preparse(mut self, preparse: Preparse) -> Self {
        self.preparse = preparse;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl StepProcessor for DynamicSelector {
    fn preparse(&self) -> Preparse {
        self.preparse
    }

    fn parse(
        &self,
        value: &str,
        ctx: &ExecutionContext,
        args: &Args,
    ) -> Result<ArgValue, CommandError> {
        (self.factory)(ctx, args).parse(value, ctx, args)
    }

    fn autocomplete(
        &self,
        value: &str,
        ctx: &ExecutionContext,
        args: &Args,
    ) -> Vec<Suggestion> {
        // An inner selector without autocomplete yields an empty list.
        (self.factory)(ctx, args).autocomplete(value, ctx, args)
    }

    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Pass-through selector for free text; always succeeds with the verbatim
/// token value.
pub struct TextSelector {
    preparse: Preparse,
}

impl TextSelector {
    /// Consumes the whole remaining line, for message-body tails.
    pub fn rest_of_line() -> Self {
        TextSelector {
            preparse: Preparse::Raw,
        }
    }

    /// Consumes a single (possibly quoted) word.
    pub fn word() -> Self {
        TextSelector {
            preparse: Preparse::Quoted,
        }
    }
}

impl StepProcessor for TextSelector {
    fn preparse(&self) -> Preparse {
        self.preparse
    }

    fn parse(
        &self,
        value: &str,
        _ctx: &ExecutionContext,
        _args: &Args,
    ) -> Result<ArgValue, CommandError> {
        Ok(ArgValue::Str(value.to_string()))
    }
}
