//! Terminal prompts for patch selection and confirmation

use std::io::{self, BufRead, Write};

/// Line-based user interaction
pub trait Prompter {
    /// Show `prompt` and read one line.
    ///
    /// Returns `None` when input is closed.
    fn read_line(&self, prompt: &str) -> Option<String>;

    fn display_message(&self, message: &str);

    fn display_warning(&self, message: &str);

    /// Ask a yes/no question; only `y` (any case) counts as yes.
    fn confirm(&self, prompt: &str) -> bool {
        self.read_line(prompt)
            .is_some_and(|answer| answer.trim().eq_ignore_ascii_case("y"))
    }
}

/// Prompter over stdin/stdout.
///
/// Ctrl+C while waiting here never reaches the caller: before writes start
/// the handler in `main` exits the process.
pub struct CliPrompter;

impl Prompter for CliPrompter {
    fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        io::stdout().flush().ok();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                eprintln!("Failed to read input: {}", e);
                None
            }
        }
    }

    fn display_message(&self, message: &str) {
        println!("{}", message);
    }

    fn display_warning(&self, message: &str) {
        eprintln!("{}", message);
    }
}


#[cfg(test)]
mod tests {
    use super::mock::ScriptedPrompter;
    use super::*;

    #[test]
    fn test_confirm_accepts_only_y() {
        assert!(ScriptedPrompter::new(&["y"]).confirm("? "));
        assert!(ScriptedPrompter::new(&[" Y "]).confirm("? "));
        assert!(!ScriptedPrompter::new(&["yes"]).confirm("? "));
        assert!(!ScriptedPrompter::new(&[""]).confirm("? "));
        assert!(!ScriptedPrompter::new(&[]).confirm("? "));
    }
}
