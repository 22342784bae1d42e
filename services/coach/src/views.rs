//! Text renderings of the static content and session state.
//!
//! Pure read-and-render: every function maps domain data to a string for
//! the terminal front-end and touches no state.

use crate::session::{SessionStatus, UiEvent};
use cadence_core::drill::{self, DrillProgress};
use cadence_core::lesson;
use cadence_core::{Message, Sender};
use std::fmt::Write;

/// The lesson program overview.
pub fn lessons_index() -> String {
    let mut out = String::from("8-Day Lesson Program\n");
    for lesson in lesson::all() {
        let _ = writeln!(out, "  day {}  {}", lesson.day, lesson.title);
    }
    out
}

/// One lesson in full, or `None` for a day that does not exist.
pub fn lesson_detail(day: u32) -> Option<String> {
    let lesson = lesson::by_day(day)?;
    let mut out = String::new();
    let _ = writeln!(out, "Day {}: {}", lesson.day, lesson.title);
    let _ = writeln!(out, "{}\n", lesson.description);

    if !lesson.audio_samples.is_empty() {
        let _ = writeln!(out, "Audio samples (play with `play {} <n>`):", lesson.day);
        for (index, sample) in lesson.audio_samples.iter().enumerate() {
            let _ = writeln!(out, "  [{}] {}", index + 1, sample.title);
            let _ = writeln!(out, "      \"{}\"", sample.text);
        }
    }
    if let Some(script) = &lesson.practice_script {
        let _ = writeln!(out, "{}\n{}", script.title, script.script);
    }
    Some(out)
}

/// The warm-up routine with its completion state.
pub fn drills_view(progress: &DrillProgress) -> String {
    let drills = drill::all();
    let mut out = String::from("Daily Warm-Up\n");
    let _ = writeln!(
        out,
        "Progress: {} / {} completed ({:.0}%)\n",
        progress.completed_count(),
        drills.len(),
        progress.percent()
    );
    for (index, drill) in drills.iter().enumerate() {
        let mark = if progress.is_completed(drill.title) {
            "x"
        } else {
            " "
        };
        let _ = writeln!(
            out,
            "  [{mark}] {}. {} ({})\n      {}",
            index + 1,
            drill.title,
            drill.duration,
            drill.description
        );
    }
    out
}

/// The one-line connection/activity indicator.
///
/// Derived, never stored: while a session is active the in-flight
/// accumulators decide between listening, speaking and idle.
pub fn status_line(
    status: SessionStatus,
    current_input: &str,
    current_output: &str,
) -> &'static str {
    match status {
        SessionStatus::Connecting => "Connecting...",
        SessionStatus::Inactive => "Inactive",
        SessionStatus::Active(_) => {
            if !current_output.is_empty() {
                "Speaking..."
            } else if !current_input.is_empty() {
                "Listening..."
            } else {
                "Idle"
            }
        }
    }
}

/// One transcript line.
pub fn transcript_line(message: &Message) -> String {
    match message.sender {
        Sender::User => format!("you:   {}", message.text),
        Sender::Model => format!("coach: {}", message.text),
        Sender::System => format!("-- {} --", message.text),
    }
}

/// Renders one session event, or `None` for events with no visible line.
pub fn render_ui_event(event: &UiEvent) -> Option<String> {
    match event {
        UiEvent::Status(status) => Some(format!("[{}]", status_line(*status, "", ""))),
        UiEvent::Committed(messages) => {
            let lines: Vec<String> = messages.iter().map(transcript_line).collect();
            Some(lines.join("\n"))
        }
        UiEvent::SessionError(message) => Some(format!("Error: {message}")),
        UiEvent::SessionClosed => Some("-- Session closed. --".to_string()),
        // Partial snapshots redraw too often to print line-by-line.
        UiEvent::PartialInput(_) | UiEvent::PartialOutput(_) => None,
    }
}
