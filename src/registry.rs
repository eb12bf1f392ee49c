//! Command registry and top-level dispatch.
//!
//! A flat list of command definitions, built once at startup and read-only
//! afterwards. The leading token of an input line is lowercased and matched
//! against every alias; the rest of the line goes to that command's runner
//! chain.

use strsim::levenshtein;

use crate::chain::RunnerNode;
use crate::{CommandError, Args, Completions, ExecutionContext, Suggestion};

/// One registered command.
pub struct CommandDefinition {
    /// Match keys for dispatch; the first is canonical and is the one
    /// shown in suggestions. Aliases are expected lowercase.
    pub aliases: Vec<String>,
    pub usage: String,
    pub description: String,
    pub root: RunnerNode,
}

impl CommandDefinition {
    pub fn new(
        aliases: &[&str],
        usage: impl Into<String>,
        description: impl Into<String>,
        root: RunnerNode,
    ) -> Self {
        CommandDefinition {
            aliases: aliases.iter().map(|a| a.to_lowercase()).collect(),
            usage: usage.into(),
            description: description.into(),
            root,
        }
    }

    pub fn canonical(&self) -> &str {
        self.aliases.first().map(String::as_str).unwrap_or("")
    }
}

/// Flat lookup of all registered commands.
///
/// Alias lists are assumed globally non-overlapping; on overlap the first
/// registered command wins.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDefinition>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        CommandRegistry::default()
    }

    pub fn register(&mut self, definition: CommandDefinition) {
        self.commands.push(definition);
    }

    pub fn commands(&self) -> &[CommandDefinition] {
        &self.commands
    }

    fn find(&self, lowered: &str) -> Option<&CommandDefinition> {
        self.commands
            .iter()
            .find(|c| c.aliases.iter().any(|a| a == lowered))
    }

    /// Execute one input line (without its leading trigger character).
    ///
    /// Returns the handler's result; an unmatched command name produces
    /// exactly one error report and no side effects.
    pub fn run(&self, ctx: &mut ExecutionContext, line: &str) -> bool {
        let trimmed = line.trim_start();
        let split = trimmed
            .find(|c: char| c.is_whitespace())
            .unwrap_or(trimmed.len());
        let head = &trimmed[..split];
        let rest = trimmed[split..].trim_start();
        let name = head.to_lowercase();

        match self.find(&name) {
            Some(def) => {
                ctx.command_name = def.canonical().to_string();
                def.root.run(ctx, &Args::new(), rest)
            }
            None => {
                // Echo the name as typed; matching is case-insensitive but
                // the message should not rewrite the user's input.
                let mut message =
                    CommandError::UnknownCommand(head.to_string()).to_string();
                let near = self.near_misses(&name);
                if !near.is_empty() {
                    message.push_str(&format!(" (did you mean {}?)", near.join(" or ")));
                }
                ctx.report(message);
                false
            }
        }
    }

    /// Canonical aliases within edit distance 3 of `name`, closest first.
    fn near_misses(&self, name: &str) -> Vec<String> {
        let mut candidates: Vec<(String, usize)> = self
            .commands
            .iter()
            .map(|c| c.canonical())
            .filter(|a| {
                let len_diff = (a.len() as i32 - name.len() as i32).abs();
                !a.is_empty() && len_diff <= 3
            })
            .map(|a| (a.to_string(), levenshtein(name, a)))
            .filter(|(_, dist)| *dist <= 3)
            .collect();
        candidates.sort_by_key(|(_, dist)| *dist);
        candidates.truncate(2);
        candidates.into_iter().map(|(a, _)| a).collect()
    }

    /// Suggestions for the cursor position in `line`.
    ///
    /// While the command name itself is still being typed (no space yet),
    /// commands whose canonical alias starts with the token are offered;
    /// after that, the command's chain takes over and its replace values
    /// are prefixed back up to full-line replacements.
    pub fn autocomplete(
        &self,
        ctx: &mut ExecutionContext,
        line: &str,
    ) -> Option<Completions> {
        let trimmed = line.trim_start();
        let split = trimmed.find(|c: char| c.is_whitespace());

        let Some(split) = split else {
            let typed = trimmed.to_lowercase();
            let options: Vec<Suggestion> = self
                .commands
                .iter()
                .filter(|c| c.canonical().starts_with(&typed))
                .map(|c| {
                    Suggestion::new(
                        c.canonical(),
                        format!("{} {} - {}", c.canonical(), c.usage, c.description),
                    )
                })
                .collect();
            if options.is_empty() {
                return None;
            }
            return Some(Completions {
                header: "command".to_string(),
                options,
            });
        };

        let head = &trimmed[..split];
        let rest = trimmed[split..].trim_start();
        let def = self.find(&head.to_lowercase())?;
        ctx.command_name = def.canonical().to_string();

        let inner = def.root.autocomplete(ctx, &Args::new(), rest)?;
        let options = inner
            .options
            .into_iter()
            .map(|o| Suggestion {
                replace: format!("{} {}", head, o.replace),
                display: o.display,
            })
            .collect();
        Some(Completions {
            header: format!("{} {}", def.canonical(), inner.header),
            options,
        })
    }

    /// One usage line per command, for a help surface.
    pub fn usage_lines(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|c| format!("{} - {}", c.usage, c.description))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainBuilder;
    use crate::selector::{EnumSelector, TextSelector};
    use crate::ExecMode;
    use std::cell::Cell;
    use std::rc::Rc;

    fn registry() -> (CommandRegistry, Rc<Cell<u32>>) {
        let invocations = Rc::new(Cell::new(0));
        let mut registry = CommandRegistry::new();

        let count = invocations.clone();
        registry.register(CommandDefinition::new(
            &["whisper", "w"],
            "/whisper <target> <message>",
            "Send a private message",
            ChainBuilder::new()
                .arg("target", EnumSelector::new(["Alice", "Bob"]))
                .arg("message", TextSelector::rest_of_line())
                .build(move |_, _, _| {
                    count.set(count.get() + 1);
                    true
                })
                .unwrap(),
        ));

        let count = invocations.clone();
        registry.register(CommandDefinition::new(
            &["whistle"],
            "/whistle",
            "Make some noise",
            ChainBuilder::new()
                .build(move |_, _, _| {
                    count.set(count.get() + 1);
                    true
                })
                .unwrap(),
        ));

        (registry, invocations)
    }

    #[test]
    fn test_dispatch_by_alias() {
        let (registry, invocations) = registry();
        let mut ctx = ExecutionContext::new(ExecMode::Run);
        assert!(registry.run(&mut ctx, "w Alice hello"));
        assert_eq!(invocations.get(), 1);
        assert_eq!(ctx.command_name, "whisper");
    }

    #[test]
    fn test_dispatch_is_case_insensitive() {
        let (registry, invocations) = registry();
        let mut ctx = ExecutionContext::new(ExecMode::Run);
        assert!(registry.run(&mut ctx, "WHISPER Bob hi"));
        assert_eq!(invocations.get(), 1);
    }

    #[test]
    fn test_unknown_command_reports_once_runs_nothing() {
        let (registry, invocations) = registry();
        let mut ctx = ExecutionContext::new(ExecMode::Run);
        assert!(!registry.run(&mut ctx, "nonexistent arg"));
        assert_eq!(invocations.get(), 0);
        assert_eq!(ctx.errors.len(), 1);
        assert!(ctx.errors[0].starts_with("Unknown command 'nonexistent'"));
    }

    #[test]
    fn test_unknown_command_echoes_typed_name() {
        let (registry, _) = registry();
        let mut ctx = ExecutionContext::new(ExecMode::Run);
        assert!(!registry.run(&mut ctx, "Frob x"));
        assert_eq!(ctx.errors[0], "Unknown command 'Frob'");
    }

    #[test]
    fn test_unknown_command_near_miss() {
        let (registry, _) = registry();
        let mut ctx = ExecutionContext::new(ExecMode::Run);
        registry.run(&mut ctx, "wisper someone hi");
        assert_eq!(
            ctx.errors[0],
            "Unknown command 'wisper' (did you mean whisper?)"
        );
    }

    #[test]
    fn test_command_name_completion() {
        let (registry, _) = registry();
        let mut ctx = ExecutionContext::new(ExecMode::Autocomplete);
        let c = registry.autocomplete(&mut ctx, "whis").unwrap();
        let replaces: Vec<&str> =
            c.options.iter().map(|o| o.replace.as_str()).collect();
        assert_eq!(replaces, vec!["whisper", "whistle"]);
        assert_eq!(
            c.options[0].display,
            "whisper /whisper <target> <message> - Send a private message"
        );
    }

    #[test]
    fn test_alias_not_in_name_completion() {
        // Only canonical aliases are offered while typing the name.
        let (registry, _) = registry();
        let mut ctx = ExecutionContext::new(ExecMode::Autocomplete);
        let c = registry.autocomplete(&mut ctx, "w").unwrap();
        assert_eq!(c.options.len(), 2);
        assert!(c.options.iter().all(|o| o.replace != "w"));
    }

    #[test]
    fn test_completion_delegates_after_space() {
        let (registry, _) = registry();
        let mut ctx = ExecutionContext::new(ExecMode::Autocomplete);
        let c = registry.autocomplete(&mut ctx, "w Al").unwrap();
        assert_eq!(c.options.len(), 1);
        // Replace values are full-line replacements using the typed alias.
        assert_eq!(c.options[0].replace, "w Alice");
        assert_eq!(c.header, "whisper \u{2192}target\u{2190} message ");
    }

    #[test]
    fn test_completion_unknown_command_is_none() {
        let (registry, _) = registry();
        let mut ctx = ExecutionContext::new(ExecMode::Autocomplete);
        assert!(registry.autocomplete(&mut ctx, "zzz arg").is_none());
    }

    #[test]
    fn test_usage_lines() {
        let (registry, _) = registry();
        let lines = registry.usage_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "/whistle - Make some noise");
    }
}
