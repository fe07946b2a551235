//! Rendering of a single result's error and captured output.

use std::io;

use crate::{
    config::CollapseSettings,
    events::{MessageCategory, TestResult},
    output::AnsiColor,
    printer::Printer,
    section::{SectionHeader, SectionWriter},
};

/// Prefix for every line of captured text.
const INDENT: &str = "  ";

/// Writes the error message, stack trace and captured output of `result`, one section each.
///
/// Empty or whitespace-only fields get no section at all.
pub(super) fn write_result_details(
    result: &TestResult,
    collapse: &CollapseSettings,
    sections: &mut SectionWriter,
    printer: &mut Printer,
) -> io::Result<()> {
    let error_message = result.error_message.as_deref().unwrap_or_default();
    let stack_trace = result.error_stack_trace.as_deref().unwrap_or_default();
    let stdout = result.messages_in(MessageCategory::StandardOutput);
    let stderr = result.messages_in(MessageCategory::StandardError);
    let debug_trace = result.messages_in(MessageCategory::DebugTrace);
    let additional_info = result.messages_in(MessageCategory::AdditionalInfo);

    let blocks = [
        (
            SectionHeader::new("Error Message:")
                .color(AnsiColor::Red)
                .collapsed(collapse.error_messages),
            error_message,
        ),
        (
            SectionHeader::new("Stack Trace:").collapsed(collapse.stack_traces),
            stack_trace,
        ),
        (
            SectionHeader::new("Standard Output Messages:").collapsed(collapse.stdout),
            stdout.as_str(),
        ),
        (
            SectionHeader::new("Standard Error Messages:").collapsed(collapse.stderr),
            stderr.as_str(),
        ),
        (
            SectionHeader::new("Debug Trace Messages:"),
            debug_trace.as_str(),
        ),
        (
            SectionHeader::new("Additional Information Messages:"),
            additional_info.as_str(),
        ),
    ];

    for (header, text) in blocks {
        if is_blank(text) {
            continue;
        }
        sections.section(printer, header, |printer| {
            printer.write_line(&indent_text(text), AnsiColor::Default)
        })?;
    }

    // Only an error message or stdout gets the trailing spacer.
    if !is_blank(error_message) || !is_blank(&stdout) {
        printer.write_line("", AnsiColor::Default)?;
    }

    Ok(())
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Prefixes every line of `text` with [`INDENT`] and drops the indentation left dangling
/// after a final line break. Line breaks themselves are kept.
fn indent_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let indented = format!("{INDENT}{}", text.replace('\n', &format!("\n{INDENT}")));
    indented.trim_end_matches(' ').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::{TestCase, TestOutcome, TestResultMessage},
        printer::test_helpers::SharedBuffer,
        section::Clock,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct ZeroClock;

    impl Clock for ZeroClock {
        fn now_millis(&self) -> i64 {
            0
        }
    }

    fn result() -> TestResult {
        TestResult::new(
            TestCase {
                display_name: "Tests.Math.Add".to_owned(),
                source: "/out/Tests.dll".into(),
            },
            TestOutcome::Failed,
        )
    }

    fn message(category: MessageCategory, text: &str) -> TestResultMessage {
        TestResultMessage {
            category,
            text: text.to_owned(),
        }
    }

    fn render(result: &TestResult) -> String {
        let buf = SharedBuffer::default();
        let mut printer = Printer::new(Box::new(buf.clone()), false);
        let mut sections = SectionWriter::new(Arc::new(ZeroClock));
        write_result_details(
            result,
            &CollapseSettings::default(),
            &mut sections,
            &mut printer,
        )
        .unwrap();
        buf.contents()
    }

    #[test]
    fn indents_every_line() {
        assert_eq!(indent_text("one\ntwo"), "  one\n  two");
        assert_eq!(indent_text("single"), "  single");
        assert_eq!(indent_text("single  "), "  single");
    }

    #[test]
    fn trailing_line_breaks_are_kept() {
        assert_eq!(indent_text("hello\n"), "  hello\n");
        assert_eq!(indent_text("one\ntwo\n"), "  one\n  two\n");
        assert_eq!(indent_text("one\r\ntwo\r\n\r\n"), "  one\n  two\n  \n");
    }

    #[test]
    fn captured_output_keeps_its_final_newline() {
        let mut result = result();
        result.messages = vec![message(MessageCategory::StandardOutput, "hello\n")];

        assert_eq!(
            render(&result),
            "section_start:0:section_1[collapsed=true]\rStandard Output Messages:\n  hello\n\nsection_end:0:section_1\r\n\n"
        );
    }

    #[test]
    fn separate_messages_stay_on_separate_lines() {
        let mut result = result();
        result.messages = vec![
            message(MessageCategory::StandardError, "a"),
            message(MessageCategory::StandardError, "b"),
        ];

        assert_eq!(
            render(&result),
            "section_start:0:section_1[collapsed=true]\rStandard Error Messages:\n  a\n  b\nsection_end:0:section_1\r\n"
        );
    }

    #[test]
    fn nothing_to_render() {
        let mut result = result();
        result.messages = vec![
            message(MessageCategory::StandardOutput, ""),
            message(MessageCategory::StandardError, "  \n"),
        ];
        result.error_message = Some(" ".to_owned());
        assert_eq!(render(&result), "");
    }

    #[test]
    fn all_sections_in_order() {
        let mut result = result();
        result.error_message = Some("Assert.Equal() Failure".to_owned());
        result.error_stack_trace = Some("at Tests.Math.Add()\nat Runner.Invoke()".to_owned());
        result.messages = vec![
            message(MessageCategory::AdditionalInfo, "retry 1 of 3"),
            message(MessageCategory::StandardError, "warning: slow\n"),
            message(MessageCategory::StandardOutput, "first\n"),
            message(MessageCategory::DebugTrace, "trace"),
            message(MessageCategory::StandardOutput, "second\n"),
        ];

        assert_eq!(
            render(&result),
            "section_start:0:section_1\rError Message:\n  Assert.Equal() Failure\nsection_end:0:section_1\r\n\
             section_start:0:section_2\rStack Trace:\n  at Tests.Math.Add()\n  at Runner.Invoke()\nsection_end:0:section_2\r\n\
             section_start:0:section_3[collapsed=true]\rStandard Output Messages:\n  first\n  second\n\nsection_end:0:section_3\r\n\
             section_start:0:section_4[collapsed=true]\rStandard Error Messages:\n  warning: slow\n\nsection_end:0:section_4\r\n\
             section_start:0:section_5\rDebug Trace Messages:\n  trace\nsection_end:0:section_5\r\n\
             section_start:0:section_6\rAdditional Information Messages:\n  retry 1 of 3\nsection_end:0:section_6\r\n\
             \n"
        );
    }

    #[test]
    fn spacer_only_after_error_message_or_stdout() {
        let mut stack_only = result();
        stack_only.error_stack_trace = Some("at Foo()".to_owned());
        assert!(!render(&stack_only).ends_with("\r\n\n"));

        let mut stderr_only = result();
        stderr_only.messages = vec![message(MessageCategory::StandardError, "oops")];
        assert!(!render(&stderr_only).ends_with("\r\n\n"));

        let mut stdout_only = result();
        stdout_only.messages = vec![message(MessageCategory::StandardOutput, "hi")];
        assert!(render(&stdout_only).ends_with("\r\n\n"));

        let mut error_only = result();
        error_only.error_message = Some("boom".to_owned());
        assert!(render(&error_only).ends_with("\r\n\n"));
    }
}
