//! Parser for the `time -p` report a shell writes at the end of stderr.
//!
//! The report must be the last three non-blank lines, in `real`, `user`,
//! `sys` order. Tool output before it is ignored; a truncated report is an
//! error even when an earlier report or a stray `user 1.0` line exists.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLabel {
    Real,
    User,
    Sys,
}

impl TimeLabel {
    pub const ALL: [TimeLabel; 3] = [TimeLabel::Real, TimeLabel::User, TimeLabel::Sys];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeLabel::Real => "real",
            TimeLabel::User => "user",
            TimeLabel::Sys => "sys",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TimingError {
    #[error("'{0}' line missing from the timing report at the end of stderr")]
    Missing(TimeLabel),

    #[error("'{label}' line has non-numeric value '{value}'")]
    InvalidValue { label: TimeLabel, value: String },
}

/// Seconds reported for a single trial.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrialTiming {
    pub real: f64,
    pub user: f64,
    pub sys: f64,
}

/// Extracts `real`, `user` and `sys` from the tail of `stderr`.
///
/// Trailing blank lines are skipped; the next three lines, read backwards,
/// must be `sys`, `user` and `real`, each with exactly one value.
pub fn parse_timing(stderr: &str) -> Result<TrialTiming, TimingError> {
    let mut lines = stderr.lines().rev().skip_while(|line| line.trim().is_empty());
    let mut seconds = [0.0f64; 3];

    for label in TimeLabel::ALL.into_iter().rev() {
        let line = lines.next().ok_or(TimingError::Missing(label))?;
        seconds[label.index()] = parse_line(line, label)?;
    }

    Ok(TrialTiming {
        real: seconds[TimeLabel::Real.index()],
        user: seconds[TimeLabel::User.index()],
        sys: seconds[TimeLabel::Sys.index()],
    })
}

fn parse_line(line: &str, label: TimeLabel) -> Result<f64, TimingError> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(name), Some(value), None) if name == label.as_str() => {
            value.parse::<f64>().map_err(|_| TimingError::InvalidValue {
                label,
                value: value.to_string(),
            })
        }
        _ => Err(TimingError::Missing(label)),
    }
}
