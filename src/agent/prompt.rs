// Prompt construction and the constrained output grammar

use super::types::AgentStep;
use std::fmt::Write as _;
use std::path::Path;

/// Marker opening the reasoning line
pub const THOUGHT_MARKER: &str = "THOUGHT:";
/// Marker opening the command line
pub const COMMAND_MARKER: &str = "CMD:";

/// Results longer than this are cut in the prompt
const MAX_RESULT_CHARS: usize = 1000;

/// Fixed preamble: allowed verbs, one worked example, rules
pub const SYSTEM_PREAMBLE: &str = "\
You are a code assistant working inside one directory. You never see whole files; use the commands to inspect and edit them.
Reply with exactly two lines: a THOUGHT line and a CMD line.

Commands:
  LIST <path>                        list a directory
  FILE_INFO <path>                   size and line count, no content
  READ_LINES <path> <start>-<end>    read at most 50 lines
  GREP <pattern> <path>              case-insensitive regex, at most 20 matches
  CREATE <path>                      create an empty file
  WRITE <path> <start>-<end>         replace lines with the block that follows, closed by END_WRITE
  INSERT <path> <after_line>         insert the block that follows after a line (0 = top), closed by END_INSERT
  DELETE_LINES <path> <start>-<end>  delete lines
  FINISH <answer>                    end the task with the full answer

Example:
TASK: List files in src/
THOUGHT: I will list the src directory.
CMD: LIST src/
RESULT: main.rs lib.rs util/
THOUGHT: I found the files. I will tell the user.
CMD: FINISH The files in src/ are: main.rs, lib.rs, util/

RULES:
1. Only use commands listed above
2. FINISH must include the actual answer with details
3. Do NOT create or modify files unless explicitly asked";

/// GBNF grammar forcing one THOUGHT line and one CMD in the verb syntax
pub const AGENT_GRAMMAR: &str = r#"root ::= thought command

thought ::= "THOUGHT: " thought-text "\n"
thought-text ::= [^\n]+

command ::= "CMD: " cmd-body

cmd-body ::= read-cmd | grep-cmd | list-cmd | file-info-cmd | create-cmd | write-cmd | insert-cmd | delete-cmd | finish-cmd

read-cmd ::= "READ_LINES " path " " line-range "\n"
grep-cmd ::= "GREP " pattern " " path "\n"
list-cmd ::= "LIST " path "\n"
file-info-cmd ::= "FILE_INFO " path "\n"
create-cmd ::= "CREATE " path "\n"
write-cmd ::= "WRITE " path " " line-range "\n" content-block "END_WRITE\n"
insert-cmd ::= "INSERT " path " " number "\n" content-block "END_INSERT\n"
delete-cmd ::= "DELETE_LINES " path " " line-range "\n"
finish-cmd ::= "FINISH " [^\n]+ "\n"

line-range ::= number "-" number
number ::= [0-9]+
path ::= [a-zA-Z0-9_./-]+
pattern ::= "\"" [^"]* "\"" | [a-zA-Z0-9_.*?|\\^$]+
content-block ::= content-line*
content-line ::= [^\n]* "\n"
"#;

/// Build the prompt for the next step.
///
/// Only the last `window` exchanges are shown; the full history stays with
/// the controller.
pub fn build_prompt(task: &str, working_dir: &Path, history: &[AgentStep], window: usize) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "{}\n", SYSTEM_PREAMBLE);
    let _ = writeln!(prompt, "TASK: {}", task);
    let _ = writeln!(prompt, "DIR: {}\n", working_dir.display());

    let recent = &history[history.len().saturating_sub(window.max(1))..];
    if recent.is_empty() {
        prompt.push_str("Begin by exploring. What is your first action?\n\n");
    } else {
        if recent.len() == 1 {
            prompt.push_str("YOUR LAST ACTION:\n");
        } else {
            prompt.push_str("YOUR RECENT ACTIONS (oldest first):\n");
        }
        for step in recent {
            let _ = writeln!(prompt, "{} {}", COMMAND_MARKER, step.command);
            prompt.push_str("RESULT:\n");
            let _ = writeln!(prompt, "{}", truncate(&step.result.observation(), MAX_RESULT_CHARS));
        }
        prompt.push_str("\nBased on this result, what is your NEXT action? (Use FINISH if done)\n\n");
    }

    prompt.push_str(THOUGHT_MARKER);
    prompt
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...[truncated]", &text[..cut]),
        None => text.to_string(),
    }
}
