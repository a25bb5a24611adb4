//! Line-driven session loop.
//!
//! Two helper threads feed one channel: a 1 Hz ticker and a stdin reader.
//! The session itself only lives on the main thread, so the countdown and
//! data entry are applied strictly one after another.

use setlog_core::history::summarize;
use setlog_core::timer::format_clock;
use setlog_core::*;
use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Countdown is echoed at this interval
const ANNOUNCE_EVERY_SECS: u32 = 15;

const HELP: &str = "\
Commands (exercise and set numbers start at 1):
  show                                   list exercises and sets
  add <ex>                               add a set
  set <ex> <set> [w=..] [r=..] [t=..]    enter weight, reps or time
  done <ex> <set> / undo <ex> <set>      mark a set done or not done
  del <ex> <set>                         delete a set
  rest [secs] / skip                     start or stop the rest timer
  finish                                 save the workout
  abandon                                discard the workout
  quit                                   leave, keeping the workout for `setlog resume`";

enum Input {
    Line(String),
    Tick,
    Eof,
}

#[derive(Debug, PartialEq)]
enum Command {
    Show,
    Add(usize),
    Set {
        exercise: usize,
        set: usize,
        patch: SetPatch,
    },
    Done(usize, usize),
    Undo(usize, usize),
    Delete(usize, usize),
    Rest(Option<u32>),
    Skip,
    Finish,
    Abandon,
    Quit,
    Help,
}

/// A 1-based number from the user, returned 0-based
fn index(word: Option<&str>, what: &str) -> std::result::Result<usize, String> {
    let word = word.ok_or_else(|| format!("missing {} number", what))?;
    match word.parse::<usize>() {
        Ok(0) => Err(format!("{} numbers start at 1", what)),
        Ok(n) => Ok(n - 1),
        Err(_) => Err(format!("'{}' is not a {} number", word, what)),
    }
}

impl Command {
    fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb.to_lowercase().as_str() {
            "show" | "ls" => Command::Show,
            "add" => Command::Add(index(words.next(), "exercise")?),
            "set" => {
                let exercise = index(words.next(), "exercise")?;
                let set = index(words.next(), "set")?;
                let mut patch = SetPatch::new();
                for field in words.by_ref() {
                    let (key, value) = field
                        .split_once('=')
                        .ok_or_else(|| format!("expected key=value, got '{}'", field))?;
                    patch = match key {
                        "w" | "weight" => patch.weight(value),
                        "r" | "reps" => patch.reps(value),
                        "t" | "time" => patch.time(value),
                        other => return Err(format!("unknown field '{}'", other)),
                    };
                }
                if patch.is_empty() {
                    return Err("nothing to set; use w=, r= or t=".into());
                }
                Command::Set {
                    exercise,
                    set,
                    patch,
                }
            }
            "done" => Command::Done(index(words.next(), "exercise")?, index(words.next(), "set")?),
            "undo" => Command::Undo(index(words.next(), "exercise")?, index(words.next(), "set")?),
            "del" | "delete" => {
                Command::Delete(index(words.next(), "exercise")?, index(words.next(), "set")?)
            }
            "rest" => match words.next() {
                Some(secs) => Command::Rest(Some(
                    secs.parse()
                        .map_err(|_| format!("'{}' is not a number of seconds", secs))?,
                )),
                None => Command::Rest(None),
            },
            "skip" => Command::Skip,
            "finish" => Command::Finish,
            "abandon" => Command::Abandon,
            "quit" | "exit" | "q" => Command::Quit,
            "help" | "?" => Command::Help,
            other => return Err(format!("unknown command '{}' (try `help`)", other)),
        };

        if let Some(extra) = words.next() {
            return Err(format!("unexpected '{}'", extra));
        }
        Ok(Some(command))
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Drive the session until it is finished, abandoned, or the user leaves
pub fn run(
    mut session: WorkoutSession<'_>,
    mut live: ActiveSessionFile,
    mut gateway: JsonlWorkoutStore,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();

    let ticker = tx.clone();
    thread::spawn(move || loop {
        thread::sleep(Duration::from_secs(1));
        if ticker.send(Input::Tick).is_err() {
            break;
        }
    });

    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Input::Line(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
        let _ = tx.send(Input::Eof);
    });

    let mut out = io::stdout();
    show(&session, &mut out)?;
    prompt(&mut out)?;

    while let Ok(input) = rx.recv() {
        match input {
            Input::Tick => match session.tick() {
                Some(TimerEvent::Tick(left)) if left % ANNOUNCE_EVERY_SECS == 0 => {
                    writeln!(out, "\n  Rest: {}", format_clock(left))?;
                    prompt(&mut out)?;
                }
                Some(TimerEvent::Finished) => {
                    writeln!(out, "\x07\n  Rest over. Next set!")?;
                    prompt(&mut out)?;
                }
                _ => {}
            },
            Input::Line(line) => {
                let flow = handle_line(&mut session, &mut live, &mut gateway, &line, &mut out)?;
                if let Flow::Exit = flow {
                    return Ok(());
                }
                prompt(&mut out)?;
            }
            Input::Eof => {
                writeln!(out)?;
                leave(&session, &mut live, &mut out)?;
                return Ok(());
            }
        }
    }
    Ok(())
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

fn handle_line(
    session: &mut WorkoutSession<'_>,
    live: &mut ActiveSessionFile,
    gateway: &mut JsonlWorkoutStore,
    line: &str,
    out: &mut impl Write,
) -> Result<Flow> {
    let command = match Command::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Ok(Flow::Continue),
        Err(message) => {
            writeln!(out, "  ! {}", message)?;
            return Ok(Flow::Continue);
        }
    };
    tracing::debug!("Command: {:?}", command);

    let changed = match command {
        Command::Show => {
            show(session, out)?;
            false
        }
        Command::Help => {
            writeln!(out, "{}", HELP)?;
            false
        }
        Command::Add(exercise) => match session.add_set(exercise)? {
            Some(updated) => {
                writeln!(out, "  Added set {}", updated.sets.len())?;
                true
            }
            None => {
                writeln!(out, "  ! No exercise {}", exercise + 1)?;
                false
            }
        },
        Command::Set {
            exercise,
            set,
            patch,
        } => report(session.update_set(exercise, set, patch)?, exercise, set, out)?,
        Command::Done(exercise, set) => match session.set_completion(exercise, set, true)? {
            Some(outcome) => {
                if outcome.timer_started {
                    writeln!(out, "  ✓ Rest {}", format_clock(session.rest_secs()))?;
                }
                true
            }
            None => report(None, exercise, set, out)?,
        },
        Command::Undo(exercise, set) => {
            let outcome = session.set_completion(exercise, set, false)?;
            report(outcome.map(|o| o.exercise), exercise, set, out)?
        }
        Command::Delete(exercise, set) => {
            report(session.delete_set(exercise, set)?, exercise, set, out)?
        }
        Command::Rest(secs) => {
            let secs = secs.unwrap_or(session.rest_secs());
            session.start_rest(secs)?;
            writeln!(out, "  Rest {}", format_clock(secs))?;
            false
        }
        Command::Skip => {
            session.skip_rest();
            writeln!(out, "  Rest skipped")?;
            false
        }
        Command::Finish => return finish(session, live, gateway, out),
        Command::Abandon => {
            session.abandon(live)?;
            writeln!(out, "  Workout abandoned")?;
            return Ok(Flow::Exit);
        }
        Command::Quit => {
            leave(session, live, out)?;
            return Ok(Flow::Exit);
        }
    };

    if changed {
        if let Err(e) = live.checkpoint(&session.checkpoint()) {
            tracing::warn!("Failed to checkpoint session: {}", e);
            writeln!(out, "  ! Progress not saved: {}", e)?;
        }
    }
    Ok(Flow::Continue)
}

fn report(
    updated: Option<std::sync::Arc<ActiveExercise>>,
    exercise: usize,
    set: usize,
    out: &mut impl Write,
) -> Result<bool> {
    if updated.is_none() {
        writeln!(out, "  ! No set {} for exercise {}", set + 1, exercise + 1)?;
    }
    Ok(updated.is_some())
}

fn finish(
    session: &mut WorkoutSession<'_>,
    live: &mut ActiveSessionFile,
    gateway: &mut JsonlWorkoutStore,
    out: &mut impl Write,
) -> Result<Flow> {
    match session.finish(gateway, live) {
        Ok(snapshot) => {
            let summary = summarize(&snapshot, get_default_catalog());
            writeln!(out, "✓ Workout saved: {}", snapshot.name)?;
            writeln!(out, "  id: {}", snapshot.id)?;
            writeln!(
                out,
                "  volume {} lb · {} reps",
                summary.total_volume, summary.total_reps
            )?;
            Ok(Flow::Exit)
        }
        Err(Error::Validation(issues)) => {
            writeln!(out, "  ! Cannot finish yet:")?;
            for issue in issues {
                writeln!(out, "    ✗ {}", issue)?;
            }
            Ok(Flow::Continue)
        }
        Err(e) if e.is_retryable() => {
            writeln!(out, "  ! Could not save workout: {}", e)?;
            writeln!(out, "    Your sets are kept; run `finish` again to retry.")?;
            Ok(Flow::Continue)
        }
        Err(e) => Err(e),
    }
}

fn leave(
    session: &WorkoutSession<'_>,
    live: &mut ActiveSessionFile,
    out: &mut impl Write,
) -> Result<()> {
    live.checkpoint(&session.checkpoint())?;
    writeln!(out, "Workout kept. Run `setlog resume` to continue.")?;
    Ok(())
}

fn show(session: &WorkoutSession<'_>, out: &mut impl Write) -> Result<()> {
    write!(out, "{}", session.name())?;
    if let Some(left) = session.timer().time_remaining() {
        write!(out, "  (rest {})", format_clock(left))?;
    }
    writeln!(out)?;

    for (i, exercise) in session.ledger().exercises().iter().enumerate() {
        // Exercises missing from the catalog are not shown
        let Some(definition) = session.definition(i) else {
            continue;
        };
        match session.target(i) {
            Some(target) => writeln!(out, "{}. {}  [{}]", i + 1, definition.name, target)?,
            None => writeln!(out, "{}. {}", i + 1, definition.name)?,
        }
        for (j, set) in exercise.sets.iter().enumerate() {
            let mark = if set.completed { "✓" } else { " " };
            writeln!(out, "   {} {}. {}", mark, j + 1, describe(set))?;
        }
    }
    Ok(())
}

fn describe(set: &WorkingSet) -> String {
    match &set.values {
        SetValues::Load { weight, reps } => {
            let field = |e: &Option<Entry>| e.as_ref().map(ToString::to_string).unwrap_or("-".into());
            format!("{} × {}", field(weight), field(reps))
        }
        SetValues::Timed { time } if time.trim().is_empty() => "-:--".into(),
        SetValues::Timed { time } => time.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_command() {
        let command = Command::parse("set 1 2 w=95 r=8").unwrap().unwrap();
        assert_eq!(
            command,
            Command::Set {
                exercise: 0,
                set: 1,
                patch: SetPatch::new().weight("95").reps("8"),
            }
        );
    }

    #[test]
    fn test_parse_keeps_raw_text_for_later_validation() {
        let command = Command::parse("set 1 1 r=abc").unwrap().unwrap();
        assert_eq!(
            command,
            Command::Set {
                exercise: 0,
                set: 0,
                patch: SetPatch::new().reps("abc"),
            }
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("  ").unwrap(), None);
        assert_eq!(Command::parse("add 3").unwrap(), Some(Command::Add(2)));
        assert_eq!(Command::parse("done 1 1").unwrap(), Some(Command::Done(0, 0)));
        assert_eq!(Command::parse("rest").unwrap(), Some(Command::Rest(None)));
        assert_eq!(Command::parse("rest 30").unwrap(), Some(Command::Rest(Some(30))));
        assert_eq!(Command::parse("FINISH").unwrap(), Some(Command::Finish));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("add 0").unwrap_err().contains("start at 1"));
        assert!(Command::parse("add").is_err());
        assert!(Command::parse("del 1").is_err());
        assert!(Command::parse("set 1 1").is_err());
        assert!(Command::parse("set 1 1 x=3").is_err());
        assert!(Command::parse("rest soon").is_err());
        assert!(Command::parse("skip now").is_err());
        assert!(Command::parse("jump").is_err());
    }

    #[test]
    fn test_describe_sets() {
        assert_eq!(describe(&Category::Barbell.new_set()), "- × -");
        assert_eq!(describe(&Category::Duration.new_set()), "-:--");
    }
}
