//! Confirmation prompts for gated provisioning steps
//!
//! Business logic never talks to the terminal directly: it asks a
//! [`Confirmer`] and gets back a plain yes/no. The interactive adapter only
//! accepts `y`/`Y`/`n`/`N` and re-prompts on anything else; `--yes` swaps in
//! [`AssumeYes`] so unattended runs never block on a prompt.

use inquire::Confirm;

use crate::error::{Result, SetupError};

/// Interpretation of one line of operator input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    /// Anything else; the prompt is asked again
    Invalid,
}

impl Answer {
    /// Strict parse: only `y`, `Y`, `n`, `N` are accepted
    pub fn parse(input: &str) -> Answer {
        match input.trim() {
            "y" | "Y" => Answer::Yes,
            "n" | "N" => Answer::No,
            _ => Answer::Invalid,
        }
    }
}

/// Capability for asking the operator a yes/no question
pub trait Confirmer {
    /// Returns true when the operator confirmed. An `Invalid` answer is
    /// handled inside the adapter by asking again, never by defaulting.
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Terminal-backed confirmer using the strict answer parser
pub struct InteractiveConfirmer;

fn parse_for_prompt(input: &str) -> std::result::Result<bool, ()> {
    match Answer::parse(input) {
        Answer::Yes => Ok(true),
        Answer::No => Ok(false),
        Answer::Invalid => Err(()),
    }
}

impl Confirmer for InteractiveConfirmer {
    fn confirm(&self, question: &str) -> Result<bool> {
        Confirm::new(question)
            .with_parser(&parse_for_prompt)
            .with_error_message("Please answer 'y' or 'n'")
            .with_help_message("y = proceed, n = decline")
            .prompt()
            .map_err(|e| SetupError::Io {
                message: format!("Failed to read confirmation: {e}"),
            })
    }
}

/// Non-interactive confirmer that accepts every gate
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, question: &str) -> Result<bool> {
        println!("{question} [assumed yes]");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_both_cases() {
        assert_eq!(Answer::parse("y"), Answer::Yes);
        assert_eq!(Answer::parse("Y"), Answer::Yes);
        assert_eq!(Answer::parse("n"), Answer::No);
        assert_eq!(Answer::parse("N"), Answer::No);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(Answer::parse(" y "), Answer::Yes);
        assert_eq!(Answer::parse("\tn\n"), Answer::No);
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        for input in ["", "yes", "no", "Yes", "No", "q", "0", "1", "ny", "y n"] {
            assert_eq!(Answer::parse(input), Answer::Invalid, "input: {input:?}");
        }
    }

    #[test]
    fn test_prompt_parser_maps_invalid_to_retry() {
        // Err(()) is what makes the interactive prompt ask again
        assert_eq!(parse_for_prompt("y"), Ok(true));
        assert_eq!(parse_for_prompt("N"), Ok(false));
        assert_eq!(parse_for_prompt("maybe"), Err(()));
        assert_eq!(parse_for_prompt(""), Err(()));
    }

    #[test]
    fn test_assume_yes_always_confirms() {
        let confirmer = AssumeYes;
        assert!(confirmer.confirm("Proceed?").unwrap());
    }
}
