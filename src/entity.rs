//! Character targeting: the roster dependency shape and the character
//! selector.
//!
//! The engine never owns character data; the embedding client supplies a
//! [`CharacterRoster`] through the execution context at call time.

use crate::selector::{run_ladder, LadderOutcome, StepProcessor};
use crate::{ArgValue, Args, CommandError, ExecutionContext, Suggestion};

/// An addressable character as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: u32,
    pub name: String,
    /// Account the character belongs to, for own-account restrictions.
    pub account: u64,
}

impl Character {
    pub fn new(id: u32, name: impl Into<String>, account: u64) -> Self {
        Character {
            id,
            name: name.into(),
            account,
        }
    }
}

/// Caller-supplied lookup of addressable characters.
pub trait CharacterRoster {
    /// Every character currently addressable by the client.
    fn characters(&self) -> Vec<Character>;

    /// The character the local player is controlling, if any.
    fn active(&self) -> Option<Character>;
}

/// Which matched characters a command may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetRestriction {
    /// Neither the caller's own character nor any other character on the
    /// caller's account.
    #[default]
    None,
    /// Any character except the caller's own.
    OtherCharacter,
    /// No restriction.
    Any,
}

/// Selects a character by numeric id or by display name.
///
/// An all-digit token is looked up directly as an id; anything else goes
/// through the match ladder over display names. The targeting restriction
/// is checked only after a match is found, so a disallowed target yields a
/// restriction error rather than a not-found error.
pub struct CharacterSelector {
    restriction: TargetRestriction,
}

impl CharacterSelector {
    pub fn new(restriction: TargetRestriction) -> Self {
        CharacterSelector { restriction }
    }

    fn check_restriction(
        &self,
        target: &Character,
        active: Option<&Character>,
    ) -> Result<(), CommandError> {
        let Some(active) = active else {
            return Ok(());
        };
        match self.restriction {
            TargetRestriction::Any => Ok(()),
            TargetRestriction::OtherCharacter => {
                if target.id == active.id {
                    Err(CommandError::RestrictionViolation(
                        "You cannot target yourself".to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
            TargetRestriction::None => {
                if target.id == active.id {
                    Err(CommandError::RestrictionViolation(
                        "You cannot target yourself".to_string(),
                    ))
                } else if target.account == active.account {
                    Err(CommandError::RestrictionViolation(
                        "You cannot target a character on your own account"
                            .to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn allowed(&self, target: &Character, active: Option<&Character>) -> bool {
        self.check_restriction(target, active).is_ok()
    }
}

impl StepProcessor for CharacterSelector {
    fn parse(
        &self,
        value: &str,
        ctx: &ExecutionContext,
        _args: &Args,
    ) -> Result<ArgValue, CommandError> {
        let Some(roster) = ctx.roster.as_ref() else {
            return Err(CommandError::ParseFailure(
                "No characters available".to_string(),
            ));
        };
        let characters = roster.characters();
        let names: Vec<&str> =
            characters.iter().map(|c| c.name.as_str()).collect();

        let target = if !value.is_empty()
            && value.chars().all(|c| c.is_ascii_digit())
        {
            // Numeric id: direct lookup, no ladder.
            let id: u32 = value.parse().map_err(|_| CommandError::NotFound {
                selector: value.to_string(),
                allowed: names.iter().map(|n| n.to_string()).collect(),
            })?;
            characters
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| CommandError::NotFound {
                    selector: value.to_string(),
                    allowed: names.iter().map(|n| n.to_string()).collect(),
                })?
        } else {
            match run_ladder(value, &names) {
                LadderOutcome::Hit(idx) => characters[idx].clone(),
                LadderOutcome::Missing => {
                    return Err(CommandError::NotFound {
                        selector: value.to_string(),
                        allowed: names.iter().map(|n| n.to_string()).collect(),
                    })
                }
                LadderOutcome::Tie(indices) => {
                    return Err(CommandError::AmbiguousSelection {
                        selector: value.to_string(),
                        candidates: indices
                            .iter()
                            .map(|&i| names[i].to_string())
                            .collect(),
                    })
                }
            }
        };

        self.check_restriction(&target, roster.active().as_ref())?;
        Ok(ArgValue::Character(target))
    }

    fn autocomplete(
        &self,
        value: &str,
        ctx: &ExecutionContext,
        _args: &Args,
    ) -> Vec<Suggestion> {
        let Some(roster) = ctx.roster.as_ref() else {
            return Vec::new();
        };
        let active = roster.active();
        let lower = value.to_lowercase();
        roster
            .characters()
            .iter()
            // Never suggest a target that parse would then refuse.
            .filter(|c| self.allowed(c, active.as_ref()))
            .filter(|c| c.name.to_lowercase().starts_with(&lower))
            .map(|c| Suggestion::plain(c.name.clone()))
            .collect()
    }

    fn show_value_in_header(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExecMode;
    use std::rc::Rc;

    struct FixedRoster {
        characters: Vec<Character>,
        active: Option<Character>,
    }

    impl CharacterRoster for FixedRoster {
        fn characters(&self) -> Vec<Character> {
            self.characters.clone()
        }

        fn active(&self) -> Option<Character> {
            self.active.clone()
        }
    }

    fn ctx_with(characters: Vec<Character>, active: Option<Character>) -> ExecutionContext {
        ExecutionContext::with_roster(
            ExecMode::Run,
            Rc::new(FixedRoster { characters, active }),
        )
    }

    fn roster() -> Vec<Character> {
        vec![
            Character::new(1, "Alice", 100),
            Character::new(2, "Alfred", 100),
            Character::new(3, "Bob", 200),
        ]
    }

    #[test]
    fn test_numeric_id_lookup() {
        let sel = CharacterSelector::new(TargetRestriction::Any);
        let ctx = ctx_with(roster(), None);
        let v = sel.parse("3", &ctx, &Args::new()).unwrap();
        assert_eq!(v.as_character().unwrap().name, "Bob");

        let err = sel.parse("99", &ctx, &Args::new()).unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
    }

    #[test]
    fn test_name_ladder() {
        let sel = CharacterSelector::new(TargetRestriction::Any);
        let ctx = ctx_with(roster(), None);

        let v = sel.parse("bob", &ctx, &Args::new()).unwrap();
        assert_eq!(v.as_character().unwrap().id, 3);

        // "Al" is a prefix of both Alice and Alfred.
        let err = sel.parse("Al", &ctx, &Args::new()).unwrap_err();
        assert!(matches!(err, CommandError::AmbiguousSelection { .. }));

        let v = sel.parse("Ali", &ctx, &Args::new()).unwrap();
        assert_eq!(v.as_character().unwrap().name, "Alice");
    }

    #[test]
    fn test_self_targeting_rejected() {
        let me = Character::new(1, "Alice", 100);
        let ctx = ctx_with(roster(), Some(me));

        let sel = CharacterSelector::new(TargetRestriction::OtherCharacter);
        let err = sel.parse("Alice", &ctx, &Args::new()).unwrap_err();
        assert_eq!(
            err,
            CommandError::RestrictionViolation(
                "You cannot target yourself".to_string()
            )
        );

        // Another character on the same account is fine for OtherCharacter.
        assert!(sel.parse("Alfred", &ctx, &Args::new()).is_ok());
    }

    #[test]
    fn test_own_account_rejected_under_none() {
        let me = Character::new(1, "Alice", 100);
        let ctx = ctx_with(roster(), Some(me));

        let sel = CharacterSelector::new(TargetRestriction::None);
        let err = sel.parse("Alfred", &ctx, &Args::new()).unwrap_err();
        assert_eq!(
            err,
            CommandError::RestrictionViolation(
                "You cannot target a character on your own account".to_string()
            )
        );
        assert!(sel.parse("Bob", &ctx, &Args::new()).is_ok());
    }

    #[test]
    fn test_any_allows_self() {
        let me = Character::new(1, "Alice", 100);
        let ctx = ctx_with(roster(), Some(me));
        let sel = CharacterSelector::new(TargetRestriction::Any);
        assert!(sel.parse("Alice", &ctx, &Args::new()).is_ok());
    }

    #[test]
    fn test_restriction_beats_not_found() {
        // A disallowed match reports the restriction, not "no match".
        let me = Character::new(3, "Bob", 200);
        let ctx = ctx_with(roster(), Some(me));
        let sel = CharacterSelector::new(TargetRestriction::OtherCharacter);
        let err = sel.parse("Bob", &ctx, &Args::new()).unwrap_err();
        assert!(matches!(err, CommandError::RestrictionViolation(_)));
    }

    #[test]
    fn test_autocomplete_filters_restricted_targets() {
        let me = Character::new(1, "Alice", 100);
        let ctx = ctx_with(roster(), Some(me));

        let sel = CharacterSelector::new(TargetRestriction::None);
        let opts = sel.autocomplete("", &ctx, &Args::new());
        // Alice (self) and Alfred (same account) are filtered out.
        assert_eq!(opts.len(), 1);
        assert_eq!(opts[0].replace, "Bob");

        let sel = CharacterSelector::new(TargetRestriction::Any);
        assert_eq!(sel.autocomplete("al", &ctx, &Args::new()).len(), 2);
    }

    #[test]
    fn test_missing_roster() {
        let sel = CharacterSelector::new(TargetRestriction::Any);
        let ctx = ExecutionContext::new(ExecMode::Run);
        assert!(sel.parse("Alice", &ctx, &Args::new()).is_err());
        assert!(sel.autocomplete("", &ctx, &Args::new()).is_empty());
    }
}
