//! Human-readable durations such as `"2h 30m"`, `"1.5h"`, `"90m"` or `"90"`.
//!
//! Durations are always whole minutes. The grammar is an optional hours
//! token (`<number>h`, fractional allowed) and an optional minutes token
//! (`<integer>m`), searched anywhere in the input after lowercasing and
//! stripping whitespace. When neither token is present and the input is
//! all digits, the input is taken as minutes. Anything else parses to 0.

use crate::error::{Result, TaskboardError};

/// Parses a duration string into whole minutes, returning 0 when nothing matches
pub fn parse_duration(input: &str) -> u32 {
    let normalized: Vec<char> = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    let hours = find_hours_token(&normalized);
    let minutes = find_minutes_token(&normalized);

    let total = match (hours, minutes) {
        (None, None) => {
            if !normalized.is_empty() && normalized.iter().all(char::is_ascii_digit) {
                digits_value(&normalized)
            } else {
                0.0
            }
        }
        (h, m) => h.unwrap_or(0.0) * 60.0 + m.unwrap_or(0.0),
    };

    // Float to int casts saturate, so absurdly long inputs clamp to u32::MAX
    total.floor() as u32
}

/// Parses a duration and rejects anything that does not amount to at least one minute
pub fn parse_duration_strict(input: &str) -> Result<u32> {
    match parse_duration(input) {
        0 => Err(TaskboardError::InvalidDuration(input.to_string())),
        minutes => Ok(minutes),
    }
}

/// Formats whole minutes as `"{h}h {m}m"`, `"{h}h"` or `"{m}m"`
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    match (hours, mins) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Leftmost `\d+(\.\d+)?h`
fn find_hours_token(s: &[char]) -> Option<f64> {
    for start in 0..s.len() {
        let int_end = digit_run_end(s, start);
        if int_end == start {
            continue;
        }

        if s.get(int_end) == Some(&'h') {
            return Some(digits_value(&s[start..int_end]));
        }

        if s.get(int_end) == Some(&'.') {
            let frac_end = digit_run_end(s, int_end + 1);
            if frac_end > int_end + 1 && s.get(frac_end) == Some(&'h') {
                let text: String = s[start..frac_end].iter().collect();
                return text.parse::<f64>().ok();
            }
        }
    }
    None
}

/// Leftmost `\d+m`
fn find_minutes_token(s: &[char]) -> Option<f64> {
    for start in 0..s.len() {
        let end = digit_run_end(s, start);
        if end > start && s.get(end) == Some(&'m') {
            return Some(digits_value(&s[start..end]));
        }
    }
    None
}

fn digit_run_end(s: &[char], start: usize) -> usize {
    let mut end = start;
    while end < s.len() && s[end].is_ascii_digit() {
        end += 1;
    }
    end
}

fn digits_value(digits: &[char]) -> f64 {
    digits
        .iter()
        .filter_map(|c| c.to_digit(10))
        .fold(0.0, |acc, d| acc * 10.0 + f64::from(d))
}
