use std::io::{self, BufRead, Write};
use std::sync::mpsc::Sender;

use mangaview_core::{
    KeyValueStore, PageSource, PageTurnCue, ReaderEvent, ReaderSession, SessionStatus,
};
use tracing::{debug, error};

use crate::commands::{parse_command, Parsed, HELP};

/// Rings the terminal bell on page turns.
pub struct Bell;

impl PageTurnCue for Bell {
    fn page_turn(&self) {
        let mut out = io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }
}

/// Read commands from stdin on a dedicated thread until `quit` or EOF.
pub fn spawn_stdin_reader(events: Sender<ReaderEvent>) -> io::Result<()> {
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            debug!("stdin reader started");
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        error!("Failed to read stdin: {e}");
                        break;
                    }
                };
                match parse_command(&line) {
                    Ok(Parsed::Event(event)) => {
                        let quit = event == ReaderEvent::Shutdown;
                        if events.send(event).is_err() || quit {
                            return;
                        }
                    }
                    Ok(Parsed::Help) => println!("{HELP}"),
                    Ok(Parsed::Empty) => {}
                    Err(e) => eprintln!("{e}"),
                }
            }
            let _ = events.send(ReaderEvent::Shutdown);
        })?;
    Ok(())
}

pub fn status_line<P, S, C>(session: &ReaderSession<P, S, C>) -> String
where
    P: PageSource,
    S: KeyValueStore,
    C: PageTurnCue,
{
    let prefs = session.preferences();
    let engine = session.engine();
    let mut line = format!(
        "[{}] {} {}",
        session.location(),
        prefs.reading_mode,
        prefs.flip_direction.label()
    );

    match session.status() {
        SessionStatus::Loading => line.push_str(" | loading chapter"),
        SessionStatus::Ready => {
            let (_, _, loaded, failed) = session.registry().counts();
            line.push_str(&format!(
                " | page {}/{} | loaded {loaded} failed {failed}",
                engine.page(),
                engine.page_count()
            ));
        }
    }
    if let Some(index) = engine.chapter_index() {
        line.push_str(&format!(" | chapter {}/{}", index + 1, engine.chapters().len()));
    }
    if prefs.reading_mode.is_scroll() {
        let (x, y) = session.scroll_offset();
        line.push_str(&format!(" | scroll {x},{y}"));
    }
    if prefs.auto_play {
        line.push_str(&format!(" | auto {}s", prefs.auto_play_speed));
    }
    if session.show_settings() {
        line.push_str(" | settings open");
    }
    if !prefs.show_ui {
        line.push_str(" | ui hidden");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use mangaview_core::{
        ChapterRequest, Location, MemoryStore, PageRequest, PreferenceStore,
    };

    struct Idle;

    impl PageSource for Idle {
        fn request_page(&self, _: PageRequest) {}
        fn request_chapter(&self, _: ChapterRequest) {}
    }

    #[test]
    fn status_while_loading() {
        let location: Location = "w/3?chapter=c".parse().unwrap();
        let session = ReaderSession::new(
            &location,
            PreferenceStore::open(MemoryStore::new()),
            Idle,
            (),
        );
        assert_eq!(
            status_line(&session),
            "[w/3?chapter=c] single rtl | loading chapter"
        );
    }
}
