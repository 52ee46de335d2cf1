//! Gesture scripts: editor events replayed against a `Session`.
//!
//! One event per line, `#` starts a comment:
//!
//! ```text
//! pause            # space
//! tick [n]         # n animation frames (default 1)
//! down x y | move x y | up x y
//! click x y        # down + up at the same spot
//! esc | rotary | trace | delete
//! ```

use anyhow::{anyhow, bail, Context, Result};
use linkage::api::Session;
use linkage::Point;
use nalgebra::vector;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Pause,
    Tick(usize),
    Down(Point),
    Move(Point),
    Up(Point),
    Click(Point),
    Esc,
    Rotary,
    Trace,
    Delete,
}

fn point(args: &[&str]) -> Result<Point> {
    let [x, y] = args else {
        bail!("expected two coordinates, got {}", args.len());
    };
    let (x, y): (f64, f64) = (x.parse()?, y.parse()?);
    Ok(vector![x, y])
}

fn parse_line(line: &str) -> Result<Option<Event>> {
    let line = line.split('#').next().unwrap_or("").trim();
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let event = match verb {
        "pause" => Event::Pause,
        "tick" => Event::Tick(match args.first() {
            Some(n) => n.parse()?,
            None => 1,
        }),
        "down" => Event::Down(point(&args)?),
        "move" => Event::Move(point(&args)?),
        "up" => Event::Up(point(&args)?),
        "click" => Event::Click(point(&args)?),
        "esc" => Event::Esc,
        "rotary" => Event::Rotary,
        "trace" => Event::Trace,
        "delete" => Event::Delete,
        other => return Err(anyhow!("unknown event {other:?}")),
    };
    Ok(Some(event))
}

pub fn parse(text: &str) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(e) = parse_line(line).with_context(|| format!("line {}", i + 1))? {
            events.push(e);
        }
    }
    Ok(events)
}

/// Counters collected while replaying.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Replay {
    pub added: usize,
    pub removed: usize,
    pub skipped_frames: usize,
}

fn release(session: &mut Session, pos: Point, stats: &mut Replay) {
    if session.pointer_up(pos).is_some() {
        stats.added += 1;
    }
}

pub fn replay(session: &mut Session, events: &[Event]) -> Replay {
    let mut stats = Replay::default();
    for &e in events {
        match e {
            Event::Pause => session.toggle_pause(),
            Event::Tick(n) => {
                for _ in 0..n {
                    if !session.tick() {
                        stats.skipped_frames += 1;
                    }
                }
            }
            Event::Down(p) => session.pointer_down(p),
            Event::Move(p) => session.pointer_move(p),
            Event::Up(p) => release(session, p, &mut stats),
            Event::Click(p) => {
                session.pointer_down(p);
                release(session, p, &mut stats);
            }
            Event::Esc => session.cancel(),
            Event::Rotary => session.arm_rotary(),
            Event::Trace => {
                session.trace_hovered();
            }
            Event::Delete => {
                if session.delete_hovered() {
                    stats.removed += 1;
                }
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkage::api::presets;
    use linkage::SessionCfg;

    fn session() -> Session {
        let lk = presets::four_bar_coupler();
        Session::new(&lk, lk.point_by_suffix(4), SessionCfg::default()).unwrap()
    }

    #[test]
    fn parse_events_and_comments() {
        let events = parse("# header\npause\n\ntick 3\nclick 0.5 -1  # ground\nesc\n").unwrap();
        assert_eq!(
            events,
            vec![
                Event::Pause,
                Event::Tick(3),
                Event::Click(vector![0.5, -1.0]),
                Event::Esc
            ]
        );
    }

    #[test]
    fn parse_errors_name_the_line() {
        let err = parse("pause\njump 1 2\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        assert!(parse("click 1\n").is_err());
        assert!(parse("tick many\n").is_err());
    }

    #[test]
    fn ground_ground_point_script_adds_one_hinge() {
        let mut s = session();
        let events = parse("pause\nclick 0.6 0\nclick 0.45 0.2\nclick 0.3 0\n").unwrap();
        let stats = replay(&mut s, &events);
        assert_eq!(stats.added, 1);
        assert_eq!(s.linkage().structures.len(), 4);
    }

    #[test]
    fn escape_mid_gesture_adds_nothing() {
        let mut s = session();
        let events = parse("pause\nclick 0.6 0\nclick 0.45 0.2\nesc\nclick 0.3 0\n").unwrap();
        let stats = replay(&mut s, &events);
        assert_eq!(stats.added, 0);
        assert_eq!(s.linkage().structures.len(), 3);
    }
}
