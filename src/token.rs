//! Argument tokenizer and quoting helpers.
//!
//! Splits the next argument token off an input line according to a preparse
//! strategy, and re-quotes values for splicing autocomplete results back
//! into the line. Known limitation: the quoting grammar has no escape for
//! the delimiting quote character inside a quoted value.

/// One token split off the front of an input line.
///
/// Transient: recomputed on every parse, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token text, with any surrounding quotes consumed.
    pub value: String,
    /// The run of whitespace that followed the token.
    pub spacing: String,
    /// Everything after the spacing.
    pub rest: String,
}

/// How a step processor wants its token split off the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preparse {
    /// The entire remaining input, verbatim.
    Raw,
    /// The entire remaining input, trimmed of surrounding whitespace.
    RawTrimmed,
    /// One whitespace-delimited word, or a quoted run if it starts with
    /// `"` or `'`.
    #[default]
    Quoted,
    /// Like `Quoted`, with the extracted value additionally trimmed.
    QuotedTrimmed,
}

impl Preparse {
    /// Quote-aware strategies need their values re-quoted when spliced back
    /// into the line.
    pub fn is_quote_aware(&self) -> bool {
        matches!(self, Preparse::Quoted | Preparse::QuotedTrimmed)
    }
}

/// Split the next token off `input` using the given strategy.
pub fn next_token(input: &str, preparse: Preparse) -> Token {
    match preparse {
        Preparse::Raw => Token {
            value: input.to_string(),
            spacing: String::new(),
            rest: String::new(),
        },
        Preparse::RawTrimmed => Token {
            value: input.trim().to_string(),
            spacing: String::new(),
            rest: String::new(),
        },
        Preparse::Quoted => split_quoted(input, false),
        Preparse::QuotedTrimmed => split_quoted(input, true),
    }
}

fn split_quoted(input: &str, trim: bool) -> Token {
    let first = input.chars().next();
    let (mut value, consumed) = match first {
        Some(quote @ ('"' | '\'')) => {
            // Quoted token: up to the matching close quote, or end of input
            // if the quote is unterminated.
            match input[1..].find(quote) {
                Some(rel) => (input[1..1 + rel].to_string(), 1 + rel + 1),
                None => (input[1..].to_string(), input.len()),
            }
        }
        _ => {
            let end = input
                .find(|c: char| c.is_whitespace())
                .unwrap_or(input.len());
            (input[..end].to_string(), end)
        }
    };

    let tail = &input[consumed..];
    let spacing_len = tail
        .find(|c: char| !c.is_whitespace())
        .unwrap_or(tail.len());
    if trim {
        value = value.trim().to_string();
    }
    Token {
        value,
        spacing: tail[..spacing_len].to_string(),
        rest: tail[spacing_len..].to_string(),
    }
}

/// Whether `s` would be misread if spliced into a line bare.
pub fn needs_quoting(s: &str) -> bool {
    s.contains(' ') || s.starts_with('"') || s.starts_with('\'')
}

/// Wrap `s` in quotes so it survives a round trip through the tokenizer.
///
/// The quote character is chosen to avoid the one `s` starts with (and,
/// failing that, one it contains); a value containing both quote characters
/// cannot round-trip and is wrapped on a best-effort basis.
pub fn quote_for_insertion(s: &str, force: bool) -> String {
    if s.starts_with('"') {
        format!("'{}'", s)
    } else if s.starts_with('\'') {
        format!("\"{}\"", s)
    } else if needs_quoting(s) || force {
        if s.contains('"') {
            format!("'{}'", s)
        } else {
            format!("\"{}\"", s)
        }
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted(input: &str) -> Token {
        next_token(input, Preparse::Quoted)
    }

    #[test]
    fn test_raw_strategies() {
        let t = next_token("  hello world  ", Preparse::Raw);
        assert_eq!(t.value, "  hello world  ");
        assert_eq!(t.spacing, "");
        assert_eq!(t.rest, "");

        let t = next_token("  hello world  ", Preparse::RawTrimmed);
        assert_eq!(t.value, "hello world");
        assert_eq!(t.rest, "");
    }

    #[test]
    fn test_unquoted_word() {
        let t = quoted("hello world");
        assert_eq!(t.value, "hello");
        assert_eq!(t.spacing, " ");
        assert_eq!(t.rest, "world");
    }

    #[test]
    fn test_double_quoted_value() {
        let t = quoted("\"hello world\" tail");
        assert_eq!(t.value, "hello world");
        assert_eq!(t.spacing, " ");
        assert_eq!(t.rest, "tail");
    }

    #[test]
    fn test_single_quoted_value() {
        let t = quoted("'he said \"hi\"' tail");
        assert_eq!(t.value, "he said \"hi\"");
        assert_eq!(t.rest, "tail");
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        // No tokenizer-level error: the value is everything after the quote.
        let t = quoted("\"hello world");
        assert_eq!(t.value, "hello world");
        assert_eq!(t.spacing, "");
        assert_eq!(t.rest, "");
    }

    #[test]
    fn test_mid_token_quote_is_plain_text() {
        let t = quoted("it's fine");
        assert_eq!(t.value, "it's");
        assert_eq!(t.rest, "fine");
    }

    #[test]
    fn test_no_trailing_text() {
        let t = quoted("word");
        assert_eq!(t.value, "word");
        assert_eq!(t.spacing, "");
        assert_eq!(t.rest, "");

        let t = quoted("word  ");
        assert_eq!(t.value, "word");
        assert_eq!(t.spacing, "  ");
        assert_eq!(t.rest, "");
    }

    #[test]
    fn test_quoted_trimmed() {
        let t = next_token("\"  padded  \" x", Preparse::QuotedTrimmed);
        assert_eq!(t.value, "padded");
        assert_eq!(t.rest, "x");
    }

    #[test]
    fn test_retokenizing_rest_terminates() {
        let mut remaining = "a \"b c\" d  'e'   f".to_string();
        let mut values = Vec::new();
        while !remaining.is_empty() {
            let t = quoted(&remaining);
            values.push(t.value);
            remaining = t.rest;
        }
        assert_eq!(values, vec!["a", "b c", "d", "e", "f"]);
    }

    #[test]
    fn test_needs_quoting() {
        assert!(needs_quoting("two words"));
        assert!(needs_quoting("\"starts"));
        assert!(needs_quoting("'starts"));
        assert!(!needs_quoting("single"));
    }

    #[test]
    fn test_quote_for_insertion() {
        assert_eq!(quote_for_insertion("plain", false), "plain");
        assert_eq!(quote_for_insertion("plain", true), "\"plain\"");
        assert_eq!(quote_for_insertion("two words", false), "\"two words\"");
        assert_eq!(quote_for_insertion("say \"hi\"", false), "'say \"hi\"'");
        assert_eq!(quote_for_insertion("\"lead", false), "'\"lead'");
        assert_eq!(quote_for_insertion("'lead", false), "\"'lead\"");
    }

    #[test]
    fn test_round_trip_spaced_value() {
        // Re-quoting a spaced value must survive tokenization intact.
        for s in ["hello world", "a b c", "trailing space "] {
            let wrapped = quote_for_insertion(s, true);
            let t = quoted(&wrapped);
            assert_eq!(t.value, s, "round trip failed for {:?}", s);
            assert_eq!(t.rest, "");
        }
    }
}
