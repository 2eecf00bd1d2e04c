//! Log line classification.
//!
//! The server streams semi-structured text lines over UDP. Each supported
//! event is a fixed timestamp prefix followed by a literal sub-pattern;
//! lines are tested in a fixed priority order and the first match wins.
//! Lines matching nothing (world events and the like) are expected and
//! silently dropped.

use fancy_regex::{Captures, Regex};

/// A structured event extracted from one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Say { name: String, text: String },
    Suicide { name: String, weapon: String },
    Killed { killer: String, victim: String, weapon: String },
    Kicked { name: String, reason: String },
    NameChange { old: String, new: String },
    Entered { name: String },
    Disconnected { name: String },
    MapStarted { map: String },
    Connected { name: String },
}

impl LogEvent {
    /// Render the event for the chat channel.
    pub fn render(&self) -> String {
        match self {
            Self::Say { name, text } => format!("{name}: {text}"),
            Self::Suicide { name, weapon } => {
                format!("\"{name}\" committed suicide with \"{weapon}\"")
            }
            Self::Killed {
                killer,
                victim,
                weapon,
            } => format!("\"{killer}\" killed \"{victim}\" with \"{weapon}\""),
            Self::Kicked { name, reason } => {
                format!("Player \"{name}\" was kicked with message: \"{reason}\"")
            }
            Self::NameChange { old, new } => {
                format!("Player \"{old}\" changed name to: \"{new}\"")
            }
            Self::Entered { name } => format!("Player \"{name}\" has joined the game"),
            Self::Disconnected { name } => format!("Player \"{name}\" has left the game"),
            Self::MapStarted { map } => format!("Started map \"{map}\""),
            Self::Connected { name } => format!("Player \"{name}\" connected"),
        }
    }

    /// Whether this event is covered by the per-server frag suppression flag.
    pub fn is_frag(&self) -> bool {
        matches!(self, Self::Suicide { .. } | Self::Killed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
enum EventKind {
    Say,
    Suicide,
    Killed,
    Kicked,
    NameChange,
    Entered,
    Disconnected,
    MapStarted,
    Connected,
}

/// Compiled grammar table for one log-prefix configuration.
///
/// Compiled once per monitoring session and reused for every line.
pub struct EventGrammar {
    patterns: Vec<(EventKind, Regex)>,
}

impl EventGrammar {
    /// Build the grammar for a given log prefix (`"log"` or `"log L"`,
    /// selected per server at setup time).
    pub fn new(log_prefix: &str) -> Self {
        let head = format!(r"^{log_prefix} \d\d/\d\d/\d\d\d\d - \d\d:\d\d:\d\d: ");
        let compile = |kind: EventKind, tail: &str| {
            let regex = Regex::new(&format!("{head}{tail}"))
                .expect("hardcoded log event pattern compiles");
            (kind, regex)
        };

        // Priority order; a line matches at most one event
        let patterns = vec![
            compile(EventKind::Say, r#""(.*)<[^>]+><(.*)><[^>]+>" say "(.*)""#),
            compile(
                EventKind::Suicide,
                r#""(.*)<[^>]+><(.*)><[^>]+>" committed suicide with "(.*)""#,
            ),
            compile(
                EventKind::Killed,
                r#""(.*)<[^>]+><(.*)><[^>]+>" killed "(.*)<[^>]+><(.*)><[^>]+>" with "(.*)""#,
            ),
            compile(
                EventKind::Kicked,
                r#"Kick: "(.*)<[^>]+><(.*)><>" was kicked by "(.*)" \(message "(.*)"\)"#,
            ),
            compile(
                EventKind::NameChange,
                r#""(.*)<[^>]+><(.*)><[^>]+>" changed name to "(.*)""#,
            ),
            compile(
                EventKind::Entered,
                r#""(.*)<[^>]+><(.*)><[^>]+>" entered the game"#,
            ),
            compile(
                EventKind::Disconnected,
                r#""(.*)<[^>]+><(.*)><[^>]+>" disconnected"#,
            ),
            compile(EventKind::MapStarted, r#"Started map "(.*?)""#),
            compile(
                EventKind::Connected,
                r#""(.*)<[^>]+><(.*)><>" connected, address "([^"]+)""#,
            ),
        ];

        Self { patterns }
    }

    /// Classify one preprocessed log line.
    ///
    /// Returns `None` for lines matching no grammar; that is an ordinary
    /// outcome, not an error.
    pub fn parse(&self, line: &str) -> Option<LogEvent> {
        for (kind, regex) in &self.patterns {
            if let Ok(Some(caps)) = regex.captures(line) {
                return Some(build_event(*kind, &caps));
            }
        }
        None
    }
}

fn group(caps: &Captures, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn build_event(kind: EventKind, caps: &Captures) -> LogEvent {
    match kind {
        EventKind::Say => LogEvent::Say {
            name: group(caps, 1),
            text: group(caps, 3),
        },
        EventKind::Suicide => LogEvent::Suicide {
            name: group(caps, 1),
            weapon: group(caps, 3),
        },
        EventKind::Killed => LogEvent::Killed {
            killer: group(caps, 1),
            victim: group(caps, 3),
            weapon: group(caps, 5),
        },
        EventKind::Kicked => LogEvent::Kicked {
            name: group(caps, 1),
            reason: group(caps, 4),
        },
        EventKind::NameChange => LogEvent::NameChange {
            old: group(caps, 1),
            new: group(caps, 3),
        },
        EventKind::Entered => LogEvent::Entered {
            name: group(caps, 1),
        },
        EventKind::Disconnected => LogEvent::Disconnected {
            name: group(caps, 1),
        },
        EventKind::MapStarted => LogEvent::MapStarted {
            map: group(caps, 1),
        },
        EventKind::Connected => LogEvent::Connected {
            name: group(caps, 1),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> EventGrammar {
        EventGrammar::new("log")
    }

    #[test]
    fn test_say_event() {
        let event = grammar()
            .parse(r#"log 04/01/2024 - 12:00:00: "Alice<5><STEAM_1><2>" say "hello world""#)
            .expect("say line should match");
        assert_eq!(event.render(), "Alice: hello world");
    }

    #[test]
    fn test_suicide_event() {
        let event = grammar()
            .parse(r#"log 04/01/2024 - 12:00:00: "Bob<2><STEAM_2><1>" committed suicide with "world""#)
            .expect("suicide line should match");
        assert_eq!(event.render(), "\"Bob\" committed suicide with \"world\"");
        assert!(event.is_frag());
    }

    #[test]
    fn test_suicide_with_trailing_clause() {
        // Some server revisions append a parenthesized clause; it folds into
        // the same Suicide event
        let event = grammar()
            .parse(r#"log 04/01/2024 - 12:00:00: "Bob<2><STEAM_2><1>" committed suicide with "world" (crushed)"#)
            .expect("line should match");
        assert!(matches!(event, LogEvent::Suicide { .. }));
    }

    #[test]
    fn test_killed_event() {
        let event = grammar()
            .parse(r#"log 04/01/2024 - 12:00:00: "Alice<5><STEAM_1><2>" killed "Bob<2><STEAM_2><1>" with "crowbar""#)
            .expect("kill line should match");
        assert_eq!(
            event.render(),
            "\"Alice\" killed \"Bob\" with \"crowbar\""
        );
        assert!(event.is_frag());
    }

    #[test]
    fn test_kicked_event() {
        let event = grammar()
            .parse(r#"log 04/01/2024 - 12:00:00: Kick: "Bob<2><STEAM_2><>" was kicked by "Console" (message "bye")"#)
            .expect("kick line should match");
        assert_eq!(
            event.render(),
            "Player \"Bob\" was kicked with message: \"bye\""
        );
    }

    #[test]
    fn test_name_change_event() {
        let event = grammar()
            .parse(r#"log 04/01/2024 - 12:00:00: "Bob<2><STEAM_2><1>" changed name to "Rob""#)
            .expect("name change line should match");
        assert_eq!(event.render(), "Player \"Bob\" changed name to: \"Rob\"");
    }

    #[test]
    fn test_entered_and_disconnected() {
        let grammar = grammar();
        let entered = grammar
            .parse(r#"log 04/01/2024 - 12:00:00: "Alice<5><STEAM_1><2>" entered the game"#)
            .expect("entered line should match");
        assert_eq!(entered.render(), "Player \"Alice\" has joined the game");

        let left = grammar
            .parse(r#"log 04/01/2024 - 12:00:00: "Alice<5><STEAM_1><2>" disconnected"#)
            .expect("disconnect line should match");
        assert_eq!(left.render(), "Player \"Alice\" has left the game");
    }

    #[test]
    fn test_map_started_event() {
        let event = grammar()
            .parse(r#"log 04/01/2024 - 12:00:00: Started map "crossfire" (CRC "123")"#)
            .expect("map line should match");
        assert_eq!(event.render(), "Started map \"crossfire\"");
    }

    #[test]
    fn test_connected_event() {
        let event = grammar()
            .parse(r#"log 04/01/2024 - 12:00:00: "Alice<5><STEAM_1><>" connected, address "10.0.0.2:27005""#)
            .expect("connected line should match");
        assert_eq!(event.render(), "Player \"Alice\" connected");
    }

    #[test]
    fn test_first_match_wins() {
        // A chat message that quotes a kill line matches both the Say and
        // Killed grammars; only Say may fire
        let event = grammar()
            .parse(r#"log 04/01/2024 - 12:00:00: "A<1><U1><0>" say "B<2><U2><0>" killed "C<3><U3><0>" with "crowbar""#)
            .expect("line should match");
        assert!(matches!(event, LogEvent::Say { .. }));
    }

    #[test]
    fn test_unmatched_line_is_dropped() {
        let grammar = grammar();
        assert!(grammar
            .parse(r#"log 04/01/2024 - 12:00:00: World triggered "Round_Start""#)
            .is_none());
        assert!(grammar.parse("completely unrelated text").is_none());
    }

    #[test]
    fn test_name_with_special_characters() {
        let event = grammar()
            .parse(r#"log 04/01/2024 - 12:00:00: "[^_^] x.y|z<7><STEAM_9><1>" say "hi""#)
            .expect("line should match");
        assert_eq!(event.render(), "[^_^] x.y|z: hi");
    }

    #[test]
    fn test_old_engine_prefix() {
        let grammar = EventGrammar::new("log L");
        let event = grammar
            .parse(r#"log L 04/01/2024 - 12:00:00: "Alice<5><STEAM_1><2>" say "hi""#)
            .expect("old engine line should match");
        assert_eq!(event.render(), "Alice: hi");

        // The current-engine prefix must not match old-engine lines
        assert!(EventGrammar::new("log")
            .parse(r#"log L 04/01/2024 - 12:00:00: "Alice<5><STEAM_1><2>" say "hi""#)
            .is_none());
    }
}
