//! Command-line grammar.
//!
//! ```text
//! command := section (WS action)? (WS extra)?
//! section := "help" | "?" | "quit" | "q" | "rpc" | "message"
//! action  := any non-whitespace token
//! extra   := rest of line, trimmed
//! ```

pub const SECTIONS: [&str; 6] = ["help", "?", "quit", "q", "rpc", "message"];

/// One parsed line. `validated` is false when the section is not part of the
/// grammar; the other fields are still filled in for error reporting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    pub section: String,
    pub action: String,
    pub extra: String,
    pub validated: bool,
}

pub fn parse_command(line: &str) -> Command {
    let (section, rest) = split_token(line.trim());
    let (action, rest) = split_token(rest);
    Command {
        validated: SECTIONS.contains(&section),
        section: section.to_string(),
        action: action.to_string(),
        extra: rest.trim().to_string(),
    }
}

/// First whitespace-delimited token and the remainder with leading
/// whitespace removed.
pub fn split_token(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(index) => (&input[..index], input[index..].trim_start()),
        None => (input, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, split_token, Command};

    #[test]
    fn parses_section_action_and_extra() {
        assert_eq!(
            parse_command("rpc call echo {\"msg\": \"hi\"}  "),
            Command {
                section: "rpc".to_string(),
                action: "call".to_string(),
                extra: "echo {\"msg\": \"hi\"}".to_string(),
                validated: true,
            }
        );
    }

    #[test]
    fn missing_parts_are_empty() {
        let command = parse_command("rpc");
        assert_eq!(command.action, "");
        assert_eq!(command.extra, "");
        assert!(command.validated);

        let command = parse_command("  help   ");
        assert_eq!(command.section, "help");
        assert!(command.validated);
    }

    #[test]
    fn unknown_section_is_not_validated() {
        let command = parse_command("exit now");
        assert!(!command.validated);
        assert_eq!(command.section, "exit");
        assert!(!parse_command("RPC list").validated);
    }

    #[test]
    fn every_grammar_section_validates() {
        for section in ["help", "?", "quit", "q", "rpc", "message"] {
            assert!(parse_command(section).validated, "{section}");
        }
    }

    #[test]
    fn split_token_handles_tabs_and_runs_of_spaces() {
        assert_eq!(split_token("echo\t  {}"), ("echo", "{}"));
        assert_eq!(split_token("echo"), ("echo", ""));
        assert_eq!(split_token(""), ("", ""));
    }
}
