use crate::schema::StoredCommand;

/// Commands of every well-formed line, in file order.
///
/// Blank lines and lines that do not parse as an object with a string
/// `command` field are skipped.
#[must_use]
pub fn replay_commands(contents: &str) -> Vec<String> {
    let mut commands = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<StoredCommand>(line) {
            Ok(stored) => commands.push(stored.command),
            Err(err) => {
                tracing::warn!(line = index + 1, error = %err, "skipping malformed history line");
            }
        }
    }
    commands
}
