// Integration tests for Executor module
// This file should be run with cargo test --test test_executor

#[path = "../src/executor/mod.rs"]
mod executor;

use executor::{Executor, ExecutorConfig, ToolCommand, ToolResult};
use std::path::Path;
use tempfile::TempDir;

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    });
}

fn numbered(n: usize) -> String {
    (1..=n).map(|i| format!("line{}\n", i)).collect()
}

fn create_executor() -> (Executor, TempDir) {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let executor = Executor::new(ExecutorConfig::with_working_dir(dir.path())).unwrap();
    (executor, dir)
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

fn lines_of(dir: &Path, name: &str) -> Vec<String> {
    read(dir, name).lines().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod read_lines {
        use super::*;

        /// Lines come back numbered from `start`
        #[tokio::test]
        async fn test_read_span() {
            let (executor, dir) = create_executor();
            write(dir.path(), "a.txt", &numbered(10));

            let result = executor.execute("READ_LINES a.txt 3-5").await;

            assert!(result.success, "{}", result.error);
            assert_eq!(result.output, "3: line3\n4: line4\n5: line5\n");
            assert_eq!(result.lines_returned, 3);
            assert!(!result.truncated);
        }

        /// Reading past the end returns what exists plus an EOF marker
        #[tokio::test]
        async fn test_read_past_eof() {
            let (executor, dir) = create_executor();
            write(dir.path(), "a.txt", &numbered(10));

            let result = executor.execute("READ_LINES a.txt 8-15").await;

            assert!(result.success, "{}", result.error);
            assert_eq!(result.lines_returned, 3);
            assert!(result.output.starts_with("8: line8\n9: line9\n10: line10\n"));
            assert!(result.output.contains("[EOF at line 10]"));
        }

        /// The span cap applies before the file is even looked at
        #[tokio::test]
        async fn test_span_over_cap_fails() {
            let (executor, dir) = create_executor();
            write(dir.path(), "a.txt", &numbered(100));

            let existing = executor.execute("READ_LINES a.txt 1-51").await;
            let missing = executor.execute("READ_LINES nope.txt 10-60").await;

            for result in [existing, missing] {
                assert!(!result.success);
                assert!(result.error.contains("Narrow your request"), "{}", result.error);
            }
        }

        #[tokio::test]
        async fn test_span_at_cap_succeeds() {
            let (executor, dir) = create_executor();
            write(dir.path(), "a.txt", &numbered(100));

            let result = executor.execute("READ_LINES a.txt 51-100").await;

            assert!(result.success, "{}", result.error);
            assert_eq!(result.lines_returned, 50);
        }

        #[tokio::test]
        async fn test_invalid_ranges() {
            let (executor, dir) = create_executor();
            write(dir.path(), "a.txt", &numbered(10));

            assert!(!executor.execute("READ_LINES a.txt 0-3").await.success);
            assert!(!executor.execute("READ_LINES a.txt 5-2").await.success);
            assert!(!executor.execute("READ_LINES a.txt five").await.success);
        }

        #[tokio::test]
        async fn test_read_missing_file() {
            let (executor, _dir) = create_executor();

            let result = executor.execute("READ_LINES ghost.rs 1-5").await;

            assert!(!result.success);
            assert!(result.error.contains("ghost.rs"));
        }
    }

    mod edits {
        use super::*;

        /// Replacing 2 lines with 3 shifts the tail down
        #[tokio::test]
        async fn test_write_replaces_range() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", &numbered(5));

            let result = executor
                .run(ToolCommand::Write {
                    path: "f.txt".to_string(),
                    start: 2,
                    end: 3,
                    content: "A\nB\nC".to_string(),
                })
                .await;

            assert!(result.success, "{}", result.error);
            assert_eq!(
                lines_of(dir.path(), "f.txt"),
                vec!["line1", "A", "B", "C", "line4", "line5"]
            );
        }

        /// Starting past EOF pads the gap with empty lines
        #[tokio::test]
        async fn test_write_past_eof_pads() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", "a\nb\n");

            let result = executor.execute("WRITE f.txt 5-6\nX\nEND_WRITE").await;

            assert!(result.success, "{}", result.error);
            assert_eq!(lines_of(dir.path(), "f.txt"), vec!["a", "b", "", "", "X"]);
        }

        /// An end past EOF replaces everything from `start` on
        #[tokio::test]
        async fn test_write_end_clamped() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", &numbered(3));

            let result = executor.execute("WRITE f.txt 2-10\nX\nEND_WRITE").await;

            assert!(result.success, "{}", result.error);
            assert_eq!(lines_of(dir.path(), "f.txt"), vec!["line1", "X"]);
        }

        /// A start line far past EOF is refused before anything is allocated
        #[tokio::test]
        async fn test_write_start_far_past_eof_rejected() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", &numbered(2));

            for command in [
                "WRITE f.txt 18446744073709551615-18446744073709551615\nX\nEND_WRITE",
                "WRITE f.txt 10000000000-10000000001\nX\nEND_WRITE",
                "WRITE f.txt 204-204\nX\nEND_WRITE",
            ] {
                let result = executor.execute(command).await;
                assert!(!result.success, "{} should fail", command);
                assert!(
                    result.error.contains("too far past end of file (2 lines)"),
                    "{} -> {}",
                    command,
                    result.error
                );
            }
            assert_eq!(read(dir.path(), "f.txt"), numbered(2));

            let result = executor.execute("WRITE f.txt 203-203\nX\nEND_WRITE").await;
            assert!(result.success, "{}", result.error);
            assert_eq!(lines_of(dir.path(), "f.txt").len(), 203);
        }

        #[tokio::test]
        async fn test_write_block_through_text_protocol() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", &numbered(3));

            let result = executor
                .execute("WRITE f.txt 2-2\n    indented\n\n  tail\nEND_WRITE")
                .await;

            assert!(result.success, "{}", result.error);
            assert_eq!(
                read(dir.path(), "f.txt"),
                "line1\n    indented\n\n  tail\nline3\n"
            );
        }

        #[tokio::test]
        async fn test_write_requires_existing_file() {
            let (executor, dir) = create_executor();

            let result = executor.execute("WRITE new.txt 1-1\nx\nEND_WRITE").await;

            assert!(!result.success);
            assert!(result.error.contains("CREATE"), "{}", result.error);
            assert!(!dir.path().join("new.txt").exists());
        }

        #[tokio::test]
        async fn test_write_over_line_cap_fails() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", &numbered(3));
            let body = "x\n".repeat(201);

            let result = executor
                .execute(&format!("WRITE f.txt 1-1\n{}END_WRITE", body))
                .await;

            assert!(!result.success);
            assert_eq!(read(dir.path(), "f.txt"), numbered(3));
        }

        #[tokio::test]
        async fn test_insert_prepends_at_zero() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", &numbered(3));

            let result = executor.execute("INSERT f.txt 0\nheader\nEND_INSERT").await;

            assert!(result.success, "{}", result.error);
            assert_eq!(
                lines_of(dir.path(), "f.txt"),
                vec!["header", "line1", "line2", "line3"]
            );
        }

        #[tokio::test]
        async fn test_insert_past_end_appends() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", &numbered(3));

            let at_end = executor.execute("INSERT f.txt 3\nfour\nEND_INSERT").await;
            let beyond = executor.execute("INSERT f.txt 99\nfive\nEND_INSERT").await;

            assert!(at_end.success && beyond.success);
            assert_eq!(
                lines_of(dir.path(), "f.txt"),
                vec!["line1", "line2", "line3", "four", "five"]
            );
        }

        #[tokio::test]
        async fn test_delete_range() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", &numbered(5));

            let result = executor.execute("DELETE_LINES f.txt 2-4").await;

            assert!(result.success, "{}", result.error);
            assert_eq!(lines_of(dir.path(), "f.txt"), vec!["line1", "line5"]);
        }

        #[tokio::test]
        async fn test_delete_start_beyond_end_fails() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", &numbered(5));

            let result = executor.execute("DELETE_LINES f.txt 7-9").await;

            assert!(!result.success);
            assert_eq!(read(dir.path(), "f.txt"), numbered(5));
        }

        #[tokio::test]
        async fn test_crlf_lines_survive_edits() {
            let (executor, dir) = create_executor();
            write(dir.path(), "w.txt", "a\r\nb\r\nc\r\n");

            let result = executor.execute("DELETE_LINES w.txt 2-2").await;

            assert!(result.success, "{}", result.error);
            assert_eq!(read(dir.path(), "w.txt"), "a\r\nc\r\n");
        }
    }

    mod create {
        use super::*;

        #[tokio::test]
        async fn test_create_existing_fails() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", "keep\n");

            let result = executor.execute("CREATE f.txt").await;

            assert!(!result.success);
            assert!(result.error.contains("already exists"), "{}", result.error);
            assert_eq!(read(dir.path(), "f.txt"), "keep\n");
        }

        #[tokio::test]
        async fn test_create_makes_parents() {
            let (executor, dir) = create_executor();

            let result = executor.execute("CREATE src/deep/mod.rs").await;

            assert!(result.success, "{}", result.error);
            assert!(dir.path().join("src/deep/mod.rs").is_file());
            assert_eq!(read(dir.path(), "src/deep/mod.rs"), "");
        }
    }

    mod sandbox {
        use super::*;

        /// Escapes fail for every verb and touch nothing
        #[tokio::test]
        async fn test_escape_fails_everywhere() {
            let (executor, dir) = create_executor();
            let outside = tempfile::tempdir().unwrap();
            let outside_file = outside.path().join("victim.txt");
            std::fs::write(&outside_file, "safe\n").unwrap();
            let abs = outside_file.display().to_string();

            let commands = vec![
                "READ_LINES ../../etc/passwd 1-5".to_string(),
                "LIST ../".to_string(),
                "FILE_INFO /etc".to_string(),
                "GREP root /etc".to_string(),
                format!("CREATE {}.new", abs),
                format!("WRITE {} 1-1\npwned\nEND_WRITE", abs),
                format!("INSERT {} 0\npwned\nEND_INSERT", abs),
                format!("DELETE_LINES {} 1-1", abs),
            ];

            for command in &commands {
                let result = executor.execute(command).await;
                assert!(!result.success, "{} should fail", command);
                assert!(
                    result.error.contains("Path outside working directory"),
                    "{} -> {}",
                    command,
                    result.error
                );
            }

            assert_eq!(std::fs::read_to_string(&outside_file).unwrap(), "safe\n");
            assert!(!outside.path().join("victim.txt.new").exists());
            assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
        }

        /// A symlink reached after `missing/..` is still resolved
        #[cfg(unix)]
        #[tokio::test]
        async fn test_symlink_after_missing_parent_fails() {
            let (executor, dir) = create_executor();
            let outside = tempfile::tempdir().unwrap();
            std::fs::write(outside.path().join("secret.txt"), "top secret\n").unwrap();
            std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

            for command in [
                "READ_LINES nope/../link/secret.txt 1-1",
                "CREATE nope/../link/planted.txt",
                "WRITE nope/../link/secret.txt 1-1\npwned\nEND_WRITE",
            ] {
                let result = executor.execute(command).await;
                assert!(!result.success, "{} should fail", command);
                assert!(
                    result.error.contains("Path outside working directory"),
                    "{} -> {}",
                    command,
                    result.error
                );
            }

            assert!(!outside.path().join("planted.txt").exists());
            assert_eq!(
                std::fs::read_to_string(outside.path().join("secret.txt")).unwrap(),
                "top secret\n"
            );
        }

        /// A sibling sharing the root's name prefix is outside
        #[tokio::test]
        async fn test_sibling_prefix_is_outside() {
            init_tracing();
            let base = tempfile::tempdir().unwrap();
            std::fs::create_dir(base.path().join("project")).unwrap();
            write(base.path(), "project2/secret.txt", "s\n");
            let executor =
                Executor::new(ExecutorConfig::with_working_dir(base.path().join("project"))).unwrap();

            let result = executor.execute("READ_LINES ../project2/secret.txt 1-1").await;

            assert!(!result.success);
            assert!(result.error.contains("Path outside working directory"));
        }

        #[tokio::test]
        async fn test_dotdot_inside_root_is_allowed() {
            let (executor, dir) = create_executor();
            write(dir.path(), "a/b.txt", "x\n");

            let result = executor.execute("READ_LINES a/../a/b.txt 1-1").await;

            assert!(result.success, "{}", result.error);
        }

        #[tokio::test]
        async fn test_set_working_dir() {
            let (mut executor, _dir) = create_executor();
            let next = tempfile::tempdir().unwrap();
            write(next.path(), "there.txt", "here\n");

            assert!(executor.set_working_dir(next.path().join("missing")).is_err());
            executor.set_working_dir(next.path()).unwrap();

            assert_eq!(executor.working_dir(), next.path().canonicalize().unwrap());
            assert!(executor.execute("READ_LINES there.txt 1-1").await.success);
        }
    }

    mod grep {
        use super::*;

        #[tokio::test]
        async fn test_grep_file_case_insensitive() {
            let (executor, dir) = create_executor();
            write(dir.path(), "main.rs", "fn main() {\n    Main();\n}\n");

            let result = executor.execute("GREP main main.rs").await;

            assert!(result.success, "{}", result.error);
            assert_eq!(result.lines_returned, 2);
            assert!(result.output.contains("main.rs:1: fn main() {"));
            assert!(result.output.contains("main.rs:2:     Main();"));
        }

        /// Matches are capped across files and subdirectories are skipped
        #[tokio::test]
        async fn test_grep_directory_caps_and_skips_subdirs() {
            let (executor, dir) = create_executor();
            write(dir.path(), "a.txt", &"needle\n".repeat(15));
            write(dir.path(), "b.txt", &"needle\n".repeat(15));
            write(dir.path(), "sub/c.txt", "needle\n");

            let result = executor.execute("GREP needle .").await;

            assert!(result.success, "{}", result.error);
            assert_eq!(result.lines_returned, 20);
            assert!(result.truncated);
            assert!(result.output.contains("[Results truncated at 20 matches]"));
            assert!(!result.output.contains("c.txt"));
        }

        #[tokio::test]
        async fn test_grep_exactly_cap_not_truncated() {
            let (executor, dir) = create_executor();
            write(dir.path(), "a.txt", &"needle\n".repeat(20));

            let result = executor.execute("GREP needle a.txt").await;

            assert_eq!(result.lines_returned, 20);
            assert!(!result.truncated);
        }

        #[tokio::test]
        async fn test_grep_no_matches() {
            let (executor, dir) = create_executor();
            write(dir.path(), "a.txt", "hay\n");

            let result = executor.execute("GREP needle a.txt").await;

            assert!(result.success);
            assert!(result.output.contains("No matches found for pattern: needle"));
        }

        #[tokio::test]
        async fn test_grep_quoted_pattern_and_bad_regex() {
            let (executor, dir) = create_executor();
            write(dir.path(), "a.txt", "fn foo bar\n");

            let quoted = executor.execute("GREP \"foo bar\" a.txt").await;
            let broken = executor.execute("GREP ([ a.txt").await;

            assert_eq!(quoted.lines_returned, 1);
            assert!(!broken.success);
            assert!(broken.error.contains("Invalid regex pattern"));
        }
    }

    mod listing {
        use super::*;

        #[tokio::test]
        async fn test_list_marks_directories() {
            let (executor, dir) = create_executor();
            write(dir.path(), "b.txt", "");
            write(dir.path(), "a/inner.txt", "");

            let result = executor.execute("LIST .").await;

            assert!(result.success, "{}", result.error);
            assert_eq!(result.output, "a/\nb.txt\n");
            assert_eq!(result.lines_returned, 2);
        }

        #[tokio::test]
        async fn test_list_caps_entries() {
            let (executor, dir) = create_executor();
            for i in 0..105 {
                write(dir.path(), &format!("f{:03}.txt", i), "");
            }

            let result = executor.execute("LIST .").await;

            assert_eq!(result.lines_returned, 100);
            assert!(result.truncated);
            assert!(result.output.contains("[... 5 more entries]"));
        }

        #[tokio::test]
        async fn test_list_empty_and_file() {
            let (executor, dir) = create_executor();
            std::fs::create_dir(dir.path().join("empty")).unwrap();
            write(dir.path(), "f.txt", "");

            let empty = executor.execute("LIST empty").await;
            let file = executor.execute("LIST f.txt").await;

            assert!(empty.output.contains("[Empty directory]"));
            assert!(!file.success);
        }

        #[tokio::test]
        async fn test_file_info() {
            let (executor, dir) = create_executor();
            write(dir.path(), "f.txt", "one\ntwo\n");

            let file = executor.execute("FILE_INFO f.txt").await;
            let missing = executor.execute("FILE_INFO nope.txt").await;

            assert!(file.success);
            assert!(file.output.contains("line_count: 2"), "{}", file.output);
            assert!(file.output.contains("size_bytes: 8"), "{}", file.output);
            assert!(missing.success);
            assert!(missing.output.contains("exists: false"), "{}", missing.output);
        }

        /// Directories report how many entries they hold
        #[tokio::test]
        async fn test_file_info_directory() {
            let (executor, dir) = create_executor();
            write(dir.path(), "src/a.rs", "a\n");
            write(dir.path(), "src/b.rs", "b\n");
            write(dir.path(), "src/nested/c.rs", "c\n");

            let result = executor.execute("FILE_INFO src").await;

            assert!(result.success, "{}", result.error);
            assert!(result.output.contains("type: directory"), "{}", result.output);
            assert!(result.output.contains("entries: 3"), "{}", result.output);
        }
    }

    mod protocol {
        use super::*;

        #[tokio::test]
        async fn test_finish_sets_flag() {
            let (executor, _dir) = create_executor();

            let result = executor.execute("FINISH Found 3 bugs: a, b, c").await;

            assert_eq!(result, ToolResult::finish("Found 3 bugs: a, b, c"));
            assert!(result.finished);
        }

        #[tokio::test]
        async fn test_unknown_and_empty_commands() {
            let (executor, _dir) = create_executor();

            let unknown = executor.execute("RM -rf /").await;
            let empty = executor.execute("   ").await;

            assert!(!unknown.success);
            assert!(unknown.error.contains("READ_LINES"));
            assert!(!empty.success);
        }

        #[tokio::test]
        async fn test_verbs_are_case_insensitive() {
            let (executor, dir) = create_executor();
            write(dir.path(), "a.txt", "x\n");

            assert!(executor.execute("read_lines a.txt 1-1").await.success);
            assert!(executor.execute("List .").await.success);
        }

        #[tokio::test]
        async fn test_result_serializes_as_json() {
            let (executor, _dir) = create_executor();

            let result = executor.execute("FINISH done").await;
            let json = serde_json::to_value(&result).unwrap();

            assert_eq!(json["finished"], true);
            assert_eq!(json["output"], "done");
        }
    }
}
