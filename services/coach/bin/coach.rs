//! Main Entrypoint for the Cadence Coach client
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Wiring the session manager and clip player to the Gemini clients.
//! 4. Running the interactive terminal loop that renders lesson/drill views
//!    and the live conversation transcript.

use anyhow::Result;
use cadence_coach::{
    clip::{ClipEvent, ClipPlayer, ClipState},
    config::Config,
    prompt,
    session::{LiveSettings, SessionKind, SessionManager, UiEvent},
    views,
};
use cadence_core::drill::{self, DrillProgress};
use cadence_core::lesson;
use gemini_live::{GeminiTts, SpeechSynthesizer, TtsConfig};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

const HELP: &str = "\
Commands:
  lessons            list the 8-day lesson program
  lesson <day>       show one lesson
  play <day> <n>     play audio sample n of a lesson (again to re-play)
  pause              stop the playing clip
  drills             show the daily warm-up and progress
  toggle <n>         toggle completion of drill n
  start              start a live coaching session
  practice <day>     start a live practice session for one lesson
  stop               end the live session
  transcript         print the committed conversation so far
  status             show the session status
  quit               exit";

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env()?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();

    // --- 3. Initialize Clients ---
    // A missing key disables the session features but not the content
    // browser; the message is surfaced once, here.
    if config.gemini_api_key.is_none() {
        println!("Failed to initialize AI. Please check the API key.");
    }
    let settings = config.gemini_api_key.clone().map(|api_key| LiveSettings {
        api_key,
        model: config.live_model.clone(),
        voice: config.live_voice.clone(),
    });
    let synthesizer: Option<Arc<dyn SpeechSynthesizer>> =
        config.gemini_api_key.clone().map(|api_key| {
            Arc::new(GeminiTts::new(TtsConfig {
                api_key,
                model: config.tts_model.clone(),
                voice: config.tts_voice.clone(),
            })) as Arc<dyn SpeechSynthesizer>
        });

    let (ui_tx, mut ui_rx) = mpsc::channel(256);
    let (clip_tx, mut clip_rx) = mpsc::channel(64);
    let mut manager = SessionManager::new(settings, ui_tx);
    let mut clips = ClipPlayer::new(synthesizer, clip_tx);
    let mut drills = DrillProgress::new();

    // Live transcription snapshots, for the derived status line.
    let mut current_input = String::new();
    let mut current_output = String::new();

    info!("cadence coach started");
    println!("AI Cadence Coach. Type `help` for commands.");

    // --- 4. Interactive Loop ---
    // One logical UI task: commands, session events and clip events are all
    // handled here, in arrival order.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let keep_going = handle_command(
                    line.trim(),
                    &mut manager,
                    &mut clips,
                    &mut drills,
                    (&current_input, &current_output),
                )
                .await;
                if !keep_going {
                    break;
                }
            }
            Some(event) = ui_rx.recv() => {
                match &event {
                    UiEvent::PartialInput(text) => current_input = text.clone(),
                    UiEvent::PartialOutput(text) => current_output = text.clone(),
                    UiEvent::SessionError(_) | UiEvent::SessionClosed => {
                        // Either way the session is gone; finish the teardown.
                        current_input.clear();
                        current_output.clear();
                        if let Some(text) = views::render_ui_event(&event) {
                            println!("{text}");
                        }
                        manager.stop().await;
                        continue;
                    }
                    _ => {}
                }
                if let Some(text) = views::render_ui_event(&event) {
                    println!("{text}");
                }
            }
            Some(event) = clip_rx.recv() => {
                if let ClipEvent::Finished = event {
                    clips.on_finished();
                }
            }
        }
    }

    manager.stop().await;
    clips.reset();
    Ok(())
}

/// Executes one command line. Returns `false` when the user quits.
async fn handle_command(
    line: &str,
    manager: &mut SessionManager,
    clips: &mut ClipPlayer,
    drills: &mut DrillProgress,
    partials: (&str, &str),
) -> bool {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => {}
        Some("help") => println!("{HELP}"),
        Some("lessons") => print!("{}", views::lessons_index()),
        Some("lesson") => match parts.next().and_then(|arg| arg.parse::<u32>().ok()) {
            Some(day) => match views::lesson_detail(day) {
                Some(view) => print!("{view}"),
                None => println!("No lesson for day {day}."),
            },
            None => println!("Usage: lesson <day>"),
        },
        Some("play") => {
            let day = parts.next().and_then(|arg| arg.parse::<u32>().ok());
            let index = parts.next().and_then(|arg| arg.parse::<usize>().ok());
            match (day, index) {
                (Some(day), Some(index)) => play_sample(clips, day, index).await,
                _ => println!("Usage: play <day> <sample>"),
            }
        }
        Some("pause") => {
            clips.stop();
            println!("Clip stopped.");
        }
        Some("drills") => print!("{}", views::drills_view(drills)),
        Some("toggle") => match parts.next().and_then(|arg| arg.parse::<usize>().ok()) {
            Some(number) => {
                match drill::all()
                    .get(number.wrapping_sub(1))
                    .and_then(|d| drills.toggle(d.title))
                {
                    Some(_) => print!("{}", views::drills_view(drills)),
                    None => println!("No drill number {number}."),
                }
            }
            None => println!("Usage: toggle <n>"),
        },
        Some("start") => {
            match manager
                .start(
                    SessionKind::Coaching,
                    prompt::COACH_INSTRUCTION,
                    vec![prompt::session_greeting()],
                )
                .await
            {
                Ok(()) => println!("Connecting... speak once the session is active."),
                Err(e) => println!("{e}"),
            }
        }
        Some("practice") => match parts.next().and_then(|arg| arg.parse::<u32>().ok()) {
            Some(day) => match lesson::by_day(day) {
                Some(lesson) => {
                    let instruction = prompt::lesson_practice_instruction(lesson);
                    match manager
                        .start(
                            SessionKind::LessonPractice,
                            &instruction,
                            vec![prompt::session_greeting()],
                        )
                        .await
                    {
                        Ok(()) => println!("Connecting... day {day} practice."),
                        Err(e) => println!("{e}"),
                    }
                }
                None => println!("No lesson for day {day}."),
            },
            None => println!("Usage: practice <day>"),
        },
        Some("stop") => manager.stop().await,
        Some("transcript") => {
            for message in manager.history() {
                println!("{}", views::transcript_line(&message));
            }
        }
        Some("status") => {
            println!(
                "[{}]",
                views::status_line(manager.status(), partials.0, partials.1)
            );
        }
        Some("quit") | Some("exit") => return false,
        Some(other) => println!("Unknown command `{other}`; try `help`."),
    }
    true
}

/// Plays (or replays) one audio sample of a lesson.
async fn play_sample(clips: &mut ClipPlayer, day: u32, index: usize) {
    let Some(lesson) = lesson::by_day(day) else {
        println!("No lesson for day {day}.");
        return;
    };
    let Some(sample) = lesson.audio_samples.get(index.wrapping_sub(1)) else {
        println!("Lesson {day} has no sample {index}.");
        return;
    };

    if clips.state() == ClipState::Playing {
        clips.stop();
    }
    println!("Playing: {}", sample.title);
    if let Err(e) = clips.play(sample.text).await {
        println!("{e}");
    }
}
