//! System instructions and seed messages for live sessions.

use cadence_core::lesson::Lesson;
use cadence_core::{Message, Sender};

/// Persona for the open-ended coaching conversation.
pub const COACH_INSTRUCTION: &str = "You are a friendly and encouraging public speaking coach. \
Your goal is to help the user practice their vocal cadence. Engage in a natural conversation, \
provide feedback, and offer tips on pacing, pausing, and emphasis.";

/// Persona for a practice session scoped to one lesson. Embeds the lesson
/// material so feedback targets the technique of the day.
pub fn lesson_practice_instruction(lesson: &Lesson) -> String {
    let mut instruction = format!(
        "You are a friendly and encouraging public speaking coach. The user is practicing \
         day {} of their cadence program: \"{}\". {} Listen to the user, then give specific \
         feedback on how well they applied this technique.",
        lesson.day, lesson.title, lesson.description
    );
    if let Some(script) = &lesson.practice_script {
        instruction.push_str(&format!(
            " The user will read this practice script aloud:\n\n{}\n\n{}",
            script.title, script.script
        ));
    }
    instruction
}

/// The system message seeded into the transcript when a session starts.
pub fn session_greeting() -> Message {
    Message::new(
        0,
        Sender::System,
        "Your practice session has started. Speak into your microphone.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::lesson;

    #[test]
    fn practice_instruction_embeds_the_lesson_material() {
        let day2 = lesson::by_day(2).unwrap();
        let instruction = lesson_practice_instruction(day2);
        assert!(instruction.contains("day 2"));
        assert!(instruction.contains("Mastering Pauses"));
        assert!(instruction.contains(day2.description));
    }

    #[test]
    fn practice_instruction_includes_the_script_when_present() {
        let day7 = lesson::by_day(7).unwrap();
        let instruction = lesson_practice_instruction(day7);
        let script = day7.practice_script.as_ref().unwrap();
        assert!(instruction.contains(script.title));
        assert!(instruction.contains(script.script));
    }

    #[test]
    fn greeting_is_a_system_message_with_id_zero() {
        let greeting = session_greeting();
        assert_eq!(greeting.id, 0);
        assert_eq!(greeting.sender, Sender::System);
        assert!(greeting.text.contains("microphone"));
    }
}
