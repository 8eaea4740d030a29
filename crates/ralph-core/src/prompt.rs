//! Instructions handed to the coding agent to run the loop.
//!
//! The prompt tells the agent where its files live and which format to log in,
//! so it has to stay in step with [`crate::progress`] and [`crate::config`].

use crate::config::{LEARNINGS_FILE, PRD_FILE, PROGRESS_FILE, RALPH_DIR, SESSION_FILE};

/// Build the loop prompt for the given iteration cap.
pub fn loop_prompt(max_iterations: u32) -> String {
    let prd = format!("{}/{}", RALPH_DIR, PRD_FILE);
    let progress = format!("{}/{}", RALPH_DIR, PROGRESS_FILE);
    let learnings = format!("{}/{}", RALPH_DIR, LEARNINGS_FILE);
    let session = format!("{}/{}", RALPH_DIR, SESSION_FILE);

    format!(
        r#"# Ralph Autonomous Loop

You are running a Ralph loop. Read the PRD and work through its stories on your own.

## Setup
1. Read `{prd}` for the story list
2. Read `{progress}` for what earlier iterations did
3. Read `{learnings}` for accumulated knowledge
4. Read `CLAUDE.md` for project context

## Loop
Repeat until every story passes or the iteration cap is reached.

1. **Pick a story**: the first story with `"passes": false` and `"status": "backlog"`
2. **Mark it started**: set its status to `"in_progress"` in `{prd}`
3. **Log the start**: append to `{progress}`:
   ```
   === ITERATION {{n}} ===
   Timestamp: {{ISO date}}
   Story: {{id}} - {{title}}
   Status: STARTED
   ```
4. **Implement** the story so every acceptance criterion holds
5. **Test** each acceptance criterion
6. **Log progress**: append timestamped lines (`[HH:MM:SS] message`), then
   ```
   Files Changed:
   - path/to/file.ts (+10/-2)

   Learnings:
   - anything worth remembering
   ---
   ```
7. **Update the story** in `{prd}`:
   - `status`: "done" if all criteria pass, "failed" if not
   - `passes`: true/false
   - `iteration`: current iteration number
   - `completedAt`: ISO timestamp
   - `filesChanged`: array of modified files
8. **Commit**: `git commit -m "Ralph: {{story title}}"`
9. **Record learnings** worth keeping in `{learnings}`
10. **Update the session**: increment `currentIteration` in `{session}`

## Rules
- One story per iteration
- Every story must fit in one context window
- Always update the files before moving to the next story
- If a story fails twice, mark it "failed" and move on
- Stop after {max_iterations} iterations

## prd.json updates
Preserve every other field and only change:
```json
{{
  "status": "done",
  "passes": true,
  "iteration": 1,
  "completedAt": "2025-01-08T...",
  "filesChanged": ["path/to/file.ts"],
  "notes": "Optional implementation notes"
}}
```

Begin by reading the files and starting iteration 1."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::parse_progress;

    #[test]
    fn test_prompt_mentions_cap_and_files() {
        let prompt = loop_prompt(7);
        assert!(prompt.contains("Stop after 7 iterations"));
        assert!(prompt.contains(".ralph/prd.json"));
        assert!(prompt.contains(".ralph/progress.txt"));
        assert!(prompt.contains(".ralph/session.json"));
    }

    #[test]
    fn test_prompt_block_format_matches_parser() {
        let prompt = loop_prompt(10);
        assert!(prompt.contains("=== ITERATION {n} ==="));

        let sample = "=== ITERATION 1 ===\nStory: story-1 - Title\nStatus: STARTED\n";
        assert_eq!(parse_progress(sample).len(), 1);
    }
}
