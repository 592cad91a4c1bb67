//! Interactive patch selection.

use std::num::ParseIntError;

use gbpatch_core::PatchCatalog;

use crate::commands::list::format_patch_list;
use crate::prompter::Prompter;

const SELECTION_PROMPT: &str =
    "\nEnter patch numbers (comma-separated), 'all' for all patches, or 'done' to finish: ";

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
pub enum SelectionInput {
    Done,
    All,
    Numbers(Vec<usize>),
    Empty,
}

/// Parse a selection line. Keywords are case-insensitive; a single bad
/// number rejects the whole line.
pub fn parse_selection(line: &str) -> Result<SelectionInput, ParseIntError> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("done") {
        return Ok(SelectionInput::Done);
    }
    if line.eq_ignore_ascii_case("all") {
        return Ok(SelectionInput::All);
    }
    if line.is_empty() {
        return Ok(SelectionInput::Empty);
    }

    line.split(',')
        .map(|part| part.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map(SelectionInput::Numbers)
}

/// Let the user pick patches by number.
///
/// Returns the chosen names in the order they were added. Closing input or
/// pressing Ctrl+C returns an empty selection.
pub fn interactive_select<P: Prompter>(catalog: &PatchCatalog, prompter: &P) -> Vec<String> {
    if catalog.is_empty() {
        prompter.display_message("No patches available.");
        return Vec::new();
    }

    prompter.display_message(&format_patch_list(catalog));

    let names: Vec<&str> = catalog.names().collect();
    let mut selected: Vec<String> = Vec::new();

    loop {
        let Some(line) = prompter.read_line(SELECTION_PROMPT) else {
            prompter.display_message("\nOperation cancelled.");
            return Vec::new();
        };

        match parse_selection(&line) {
            Ok(SelectionInput::Done) => break,
            Ok(SelectionInput::All) => {
                selected = names.iter().map(|n| n.to_string()).collect();
                break;
            }
            Ok(SelectionInput::Empty) => {}
            Ok(SelectionInput::Numbers(numbers)) => {
                for num in numbers {
                    let Some(name) = num.checked_sub(1).and_then(|i| names.get(i)) else {
                        prompter.display_warning(&format!("Invalid patch number: {}", num));
                        continue;
                    };
                    if selected.iter().any(|s| s == name) {
                        prompter.display_message(&format!("Already selected: {}", name));
                    } else {
                        selected.push(name.to_string());
                        prompter.display_message(&format!("Added: {}", name));
                    }
                }
            }
            Err(_) => {
                prompter.display_warning("Invalid input. Please enter numbers separated by commas.");
            }
        }
    }

    selected
}
