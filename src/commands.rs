// Fixed command table for the terminal: first word in, canned lines out.

const HELP: &[&str] = &[
    "Available commands:",
    "  help   - Show this help message",
    "  access - Simulate system access",
    "  exit   - Exit the terminal",
];
const ACCESS: &[&str] = &["ACCESS GRANTED.", "Welcome, Operator. System ready for input."];
const EXIT: &[&str] = &["Exiting terminal..."];

/// What a submitted line produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub lines: Vec<String>,
    /// The terminal should close once these lines are shown.
    pub quit: bool,
}

/// Look up the first whitespace-separated word (case-insensitive).
/// Blank input yields an empty response.
pub fn handle(line: &str) -> Response {
    let Some(cmd) = line.split_whitespace().next() else {
        return Response { lines: Vec::new(), quit: false };
    };
    let cmd = cmd.to_lowercase();
    let (lines, quit) = match cmd.as_str() {
        "help" => (HELP, false),
        "access" => (ACCESS, false),
        "exit" => (EXIT, true),
        _ => {
            return Response {
                lines: vec![format!("Unknown command: {cmd}. Type 'help' for a list of commands.")],
                quit: false,
            };
        }
    };
    Response { lines: lines.iter().map(|s| s.to_string()).collect(), quit }
}
