//! Line commands read from stdin.

use mangaview_core::{FlipDirection, InputEvent, Key, PreferencesPatch, ReaderEvent, ReadingMode};
use thiserror::Error;

pub const HELP: &str = "\
keys:     left right up down a d f h s space esc
gestures: tap X WIDTH | swipe-left | swipe-right
settings: mode single|double|webtoon|scroll-vertical|scroll-horizontal
          dir rtl|ltr | preload 1-5 | sound on|off | autoplay SECONDS
other:    help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Event(ReaderEvent),
    Help,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CommandError(String);

fn key(k: Key) -> Parsed {
    Parsed::Event(ReaderEvent::Input(InputEvent::Key(k)))
}

fn prefs(patch: PreferencesPatch) -> Parsed {
    Parsed::Event(ReaderEvent::Preferences(patch))
}

fn arg<'a>(args: &[&'a str], i: usize, usage: &str) -> Result<&'a str, CommandError> {
    args.get(i)
        .copied()
        .ok_or_else(|| CommandError(format!("usage: {usage}")))
}

fn number<T: std::str::FromStr>(raw: &str, usage: &str) -> Result<T, CommandError> {
    raw.parse()
        .map_err(|_| CommandError(format!("not a number: {raw} (usage: {usage})")))
}

pub fn parse_command(line: &str) -> Result<Parsed, CommandError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = words.split_first() else {
        return Ok(Parsed::Empty);
    };

    let parsed = match head.to_ascii_lowercase().as_str() {
        "left" => key(Key::ArrowLeft),
        "right" => key(Key::ArrowRight),
        "up" => key(Key::ArrowUp),
        "down" => key(Key::ArrowDown),
        "a" => key(Key::A),
        "d" => key(Key::D),
        "f" => key(Key::F),
        "h" => key(Key::H),
        "s" => key(Key::S),
        "space" => key(Key::Space),
        "esc" | "escape" => key(Key::Escape),
        "swipe-left" => Parsed::Event(ReaderEvent::Input(InputEvent::SwipeLeft)),
        "swipe-right" => Parsed::Event(ReaderEvent::Input(InputEvent::SwipeRight)),
        "tap" => {
            const USAGE: &str = "tap X WIDTH";
            let x: f32 = number(arg(args, 0, USAGE)?, USAGE)?;
            let width: f32 = number(arg(args, 1, USAGE)?, USAGE)?;
            if width.is_nan() || width <= 0.0 {
                return Err(CommandError("tap width must be positive".into()));
            }
            Parsed::Event(ReaderEvent::Input(InputEvent::Tap { x, width }))
        }
        "mode" => {
            let name = arg(args, 0, "mode NAME")?;
            let mode: ReadingMode = name.parse().map_err(|e| CommandError(format!("{e}")))?;
            prefs(PreferencesPatch {
                reading_mode: Some(mode),
                ..Default::default()
            })
        }
        "dir" => {
            let name = arg(args, 0, "dir rtl|ltr")?;
            let dir: FlipDirection = name.parse().map_err(|e| CommandError(format!("{e}")))?;
            prefs(PreferencesPatch {
                flip_direction: Some(dir),
                ..Default::default()
            })
        }
        "preload" => {
            const USAGE: &str = "preload N";
            let n: u32 = number(arg(args, 0, USAGE)?, USAGE)?;
            prefs(PreferencesPatch {
                preload_pages: Some(n),
                ..Default::default()
            })
        }
        "sound" => {
            let enabled = match arg(args, 0, "sound on|off")? {
                "on" => true,
                "off" => false,
                other => return Err(CommandError(format!("expected on or off, got {other}"))),
            };
            prefs(PreferencesPatch {
                sound_enabled: Some(enabled),
                ..Default::default()
            })
        }
        "autoplay" => {
            const USAGE: &str = "autoplay SECONDS";
            let secs: f64 = number(arg(args, 0, USAGE)?, USAGE)?;
            prefs(PreferencesPatch {
                auto_play_speed: Some(secs),
                ..Default::default()
            })
        }
        "help" | "?" => Parsed::Help,
        "quit" | "q" | "exit" => Parsed::Event(ReaderEvent::Shutdown),
        other => return Err(CommandError(format!("unknown command: {other} (try help)"))),
    };
    Ok(parsed)
}
