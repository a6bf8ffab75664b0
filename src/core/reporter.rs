//! Run reporter - start/end events, timestamps and elapsed-time formatting
//!
//! Every task invocation made by the engine is bracketed by a `Started` event and
//! either a `Finished` (success) or a `Failed` event. A failing task never gets a
//! `Finished` event.

use crate::style::{cyan, gray, purple, red};
use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::sync::mpsc;

/// Task execution event
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Started {
        label: String,
        at: DateTime<Local>,
    },
    Finished {
        label: String,
        at: DateTime<Local>,
        elapsed: Duration,
    },
    Failed {
        label: String,
        at: DateTime<Local>,
        elapsed: Duration,
    },
}

impl TaskEvent {
    pub fn label(&self) -> &str {
        match self {
            Self::Started { label, .. } | Self::Finished { label, .. } | Self::Failed { label, .. } => {
                label
            }
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Human-readable line for this event
    pub fn to_line(&self) -> String {
        match self {
            Self::Started { label, at } => {
                format!("{} Starting 🚀 {}", gray(&format_timestamp(at)), cyan(label))
            }
            Self::Finished { label, at, elapsed } => format!(
                "{} Finished ✅ {} after {}",
                gray(&format_timestamp(at)),
                cyan(label),
                purple(&format_elapsed(*elapsed))
            ),
            Self::Failed { label, at, elapsed } => format!(
                "{} {} {} after {}",
                gray(&format_timestamp(at)),
                red("Failed ❌"),
                cyan(label),
                purple(&format_elapsed(*elapsed))
            ),
        }
    }
}

/// Sink for task events
pub trait Reporter: Send + Sync {
    fn report(&self, event: TaskEvent);
}

/// Prints one line per event to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, event: TaskEvent) {
        log::debug!("{:?}", event);
        println!("{}", event.to_line());
    }
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&self, _event: TaskEvent) {}
}

/// Forwards events to a channel; a closed receiver is ignored
impl Reporter for mpsc::UnboundedSender<TaskEvent> {
    fn report(&self, event: TaskEvent) {
        let _ = self.send(event);
    }
}

/// Wall-clock prefix, `[HH:MM:SS.mmm]`
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format("[%H:%M:%S%.3f]").to_string()
}

/// Milliseconds below one second, then seconds, minutes and hours with two decimals
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    if ms < 1000 {
        return format!("{} ms", ms);
    }

    let secs = elapsed.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2} seconds", secs)
    } else if secs < 3600.0 {
        format!("{:.2} minutes", secs / 60.0)
    } else {
        format!("{:.2} hours", secs / 3600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(0)), "0 ms");
        assert_eq!(format_elapsed(Duration::from_millis(999)), "999 ms");
        assert_eq!(format_elapsed(Duration::from_millis(1000)), "1.00 seconds");
        assert_eq!(format_elapsed(Duration::from_millis(12_346)), "12.35 seconds");
        assert_eq!(format_elapsed(Duration::from_secs(90)), "1.50 minutes");
        assert_eq!(format_elapsed(Duration::from_secs(5400)), "1.50 hours");
    }

    #[test]
    fn test_format_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(format_timestamp(&at), "[07:05:03.042]");
    }

    #[test]
    fn test_event_lines() {
        let at = Local::now();
        let started = TaskEvent::Started { label: "build".into(), at };
        let finished = TaskEvent::Finished {
            label: "build".into(),
            at,
            elapsed: Duration::from_millis(12),
        };

        assert!(started.to_line().contains("Starting"));
        assert!(started.to_line().contains("build"));
        assert!(finished.to_line().contains("Finished"));
        assert!(finished.to_line().contains("12 ms"));
        assert!(finished.is_finished() && !finished.is_failed());
    }

    #[test]
    fn test_channel_reporter() {
        let (tx, mut rx) = mpsc::unbounded_channel::<TaskEvent>();
        tx.report(TaskEvent::Started { label: "a".into(), at: Local::now() });

        let event = rx.try_recv().unwrap();
        assert_eq!(event.label(), "a");
        assert!(event.is_started());

        drop(rx);
        tx.report(TaskEvent::Started { label: "b".into(), at: Local::now() });
    }
}
