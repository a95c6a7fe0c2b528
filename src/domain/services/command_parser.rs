//! Command parser - turns a free-text sentence into a verb and phrases
//!
//! Grammar (case-insensitive, whitespace separated):
//!
//! ```text
//! <verb> [<target-phrase>] [with <object-phrase>]
//! verb      ::= look | <direction> | move | equip | stash | drop | attack
//! direction ::= north | northeast | east | southeast | south
//!             | southwest | west | northwest | up | down
//! ```

use crate::domain::value_objects::{Direction, Verb};

/// A parsed sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: Verb,
    /// Primary target phrase, lowercased and whitespace-normalised
    pub target: Option<String>,
    /// Phrase introduced by "with"
    pub with: Option<String>,
}

impl Command {
    fn new(verb: Verb, target: Option<String>, with: Option<String>) -> Self {
        Self { verb, target, with }
    }

    /// Direction named by the target phrase, if it is a direction keyword
    pub fn direction(&self) -> Option<Direction> {
        self.target.as_deref().and_then(Direction::parse)
    }
}

/// Why a sentence could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Nothing to do: the command is empty")]
    Empty,

    #[error("Unknown command: {0}")]
    UnknownVerb(String),

    #[error("The {0} command needs a target")]
    MissingTarget(Verb),

    #[error("Unexpected words after {verb}: {rest}")]
    UnexpectedWords { verb: Verb, rest: String },

    #[error("The {0} command does not take \"with\"")]
    UnexpectedWith(Verb),

    #[error("Nothing named after \"with\"")]
    MissingWithObject,

    #[error("You cannot attack {0}")]
    NotAttackable(String),
}

/// Parse a sentence into a [`Command`]
pub fn parse_command(sentence: &str) -> Result<Command, CommandError> {
    let tokens: Vec<String> = sentence.split_whitespace().map(str::to_lowercase).collect();
    let (first, rest) = tokens.split_first().ok_or(CommandError::Empty)?;

    if let Some(direction) = Direction::parse(first) {
        return direction_command(Verb::Move, direction, rest);
    }

    let verb = match first.as_str() {
        "look" => Verb::Look,
        "move" => Verb::Move,
        "equip" => Verb::Equip,
        "stash" => Verb::Stash,
        "drop" => Verb::Drop,
        "attack" => Verb::Attack,
        other => return Err(CommandError::UnknownVerb(other.to_string())),
    };

    let (target_tokens, with_tokens) = split_with(rest);
    if with_tokens.is_some() && verb != Verb::Attack {
        return Err(CommandError::UnexpectedWith(verb));
    }

    match verb {
        Verb::Look => {
            let target_tokens = match target_tokens.split_first() {
                Some((at, remaining)) if at == "at" => remaining,
                _ => target_tokens,
            };
            Ok(Command::new(Verb::Look, join(target_tokens), None))
        }
        Verb::Move => {
            let (word, remaining) = target_tokens
                .split_first()
                .ok_or(CommandError::MissingTarget(Verb::Move))?;
            let direction = Direction::parse(word)
                .ok_or_else(|| CommandError::UnknownVerb(format!("move {}", word)))?;
            direction_command(Verb::Move, direction, remaining)
        }
        Verb::Equip | Verb::Stash | Verb::Drop => {
            let target = join(target_tokens).ok_or(CommandError::MissingTarget(verb))?;
            Ok(Command::new(verb, Some(target), None))
        }
        Verb::Attack => {
            let target = join(target_tokens).ok_or(CommandError::MissingTarget(verb))?;
            let with = match with_tokens {
                Some(tokens) => Some(join(tokens).ok_or(CommandError::MissingWithObject)?),
                None => None,
            };
            Ok(Command::new(verb, Some(target), with))
        }
    }
}

fn direction_command(
    verb: Verb,
    direction: Direction,
    rest: &[String],
) -> Result<Command, CommandError> {
    if !rest.is_empty() {
        return Err(CommandError::UnexpectedWords {
            verb,
            rest: rest.join(" "),
        });
    }
    Ok(Command::new(verb, Some(direction.as_str().to_string()), None))
}

/// Split tokens at the first "with"
fn split_with(tokens: &[String]) -> (&[String], Option<&[String]>) {
    match tokens.iter().position(|t| t == "with") {
        Some(index) => (&tokens[..index], Some(&tokens[index + 1..])),
        None => (tokens, None),
    }
}

fn join(tokens: &[String]) -> Option<String> {
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_look() {
        let command = parse_command("look").unwrap();
        assert_eq!(command.verb, Verb::Look);
        assert_eq!(command.target, None);

        let command = parse_command("  LOOK   North ").unwrap();
        assert_eq!(command.target.as_deref(), Some("north"));
        assert_eq!(command.direction(), Some(Direction::North));

        let command = parse_command("look at Grumpy Dwarf").unwrap();
        assert_eq!(command.target.as_deref(), Some("grumpy dwarf"));
        assert_eq!(command.direction(), None);
    }

    #[test]
    fn test_bare_direction_is_move() {
        let command = parse_command("Southwest").unwrap();
        assert_eq!(command.verb, Verb::Move);
        assert_eq!(command.direction(), Some(Direction::Southwest));

        let command = parse_command("move up").unwrap();
        assert_eq!(command.verb, Verb::Move);
        assert_eq!(command.direction(), Some(Direction::Up));
    }

    #[test]
    fn test_direction_with_trailing_words_is_rejected() {
        assert!(matches!(
            parse_command("north quickly"),
            Err(CommandError::UnexpectedWords { .. })
        ));
        assert!(matches!(
            parse_command("move sideways"),
            Err(CommandError::UnknownVerb(_))
        ));
    }

    #[test]
    fn test_object_verbs_need_a_target() {
        assert_eq!(
            parse_command("equip dull bronze ring").unwrap(),
            Command::new(Verb::Equip, Some("dull bronze ring".to_string()), None)
        );
        assert_eq!(
            parse_command("stash"),
            Err(CommandError::MissingTarget(Verb::Stash))
        );
        assert_eq!(parse_command("drop"), Err(CommandError::MissingTarget(Verb::Drop)));
    }

    #[test]
    fn test_attack_with_weapon() {
        let command = parse_command("attack grumpy dwarf with stone mace").unwrap();
        assert_eq!(command.verb, Verb::Attack);
        assert_eq!(command.target.as_deref(), Some("grumpy dwarf"));
        assert_eq!(command.with.as_deref(), Some("stone mace"));

        let command = parse_command("attack grumpy dwarf").unwrap();
        assert_eq!(command.with, None);

        assert_eq!(
            parse_command("attack grumpy dwarf with"),
            Err(CommandError::MissingWithObject)
        );
        assert_eq!(
            parse_command("attack with stone mace"),
            Err(CommandError::MissingTarget(Verb::Attack))
        );
    }

    #[test]
    fn test_with_only_allowed_on_attack() {
        assert_eq!(
            parse_command("equip ring with tongs"),
            Err(CommandError::UnexpectedWith(Verb::Equip))
        );
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("dance wildly"),
            Err(CommandError::UnknownVerb("dance".to_string()))
        );
    }
}
