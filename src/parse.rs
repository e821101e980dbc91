//! Reads the line-oriented trip format:
//!
//! ```text
//! N
//! BASE_NAME BASE_CODE
//! NAME CODE STAY_DAYS          (N times)
//! M
//! DD/MM FROM TO DEP_TIME ARR_TIME COST   (M times)
//! ```
//!
//! Blank lines are skipped. Errors carry the 1-based line they occur on.

use crate::error::{Error, Result};
use crate::model::{Date, Trip, TripBuilder};
use log::*;
use std::str::FromStr;

struct Lines<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Lines { lines: input.lines().enumerate() }
    }

    /// Next non-blank line split into exactly `n` fields, with its number.
    fn fields(&mut self, n: usize, expected: &'static str) -> Result<(usize, Vec<&'a str>)> {
        loop {
            let (idx, line) = self.lines.next().ok_or(Error::UnexpectedEof { expected })?;
            let fields = line.split_whitespace().collect::<Vec<_>>();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != n {
                return Err(Error::FieldCount { expected: n, found: fields.len() }.at_line(idx + 1));
            }
            return Ok((idx + 1, fields));
        }
    }
}

fn number<T: FromStr>(text: &str) -> Result<T> {
    text.parse::<T>().map_err(|_| Error::InvalidInteger(text.to_string()))
}

/// `DD/MM` in the given year.
pub fn parse_date(text: &str, year: i32) -> Result<Date> {
    let invalid = || Error::InvalidDate(text.to_string());
    let mut parts = text.split('/');
    let (day, month) = match (parts.next(), parts.next(), parts.next()) {
        (Some(d), Some(m), None) => (d, m),
        _ => return Err(invalid()),
    };
    let day = day.parse::<u32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    Date::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn add_flight(builder: &mut TripBuilder, f: &[&str], year: i32) -> Result<()> {
    let date = parse_date(f[0], year)?;
    let cost = number::<u64>(f[5])?;
    builder.add_flight(date, f[1], f[2], f[3], f[4], cost)?;
    Ok(())
}

pub fn parse_trip(input: &str, year: i32) -> Result<Trip> {
    let mut lines = Lines::new(input);

    let (line, f) = lines.fields(1, "city count")?;
    let n_cities = number::<usize>(f[0]).map_err(|e| e.at_line(line))?;

    let (_, f) = lines.fields(2, "base city")?;
    let mut builder = TripBuilder::new(f[0], f[1]);

    for _ in 0..n_cities {
        let (line, f) = lines.fields(3, "city")?;
        let stay = number::<u32>(f[2]).map_err(|e| e.at_line(line))?;
        builder.add_city(f[0], f[1], stay).map_err(|e| e.at_line(line))?;
    }

    let (line, f) = lines.fields(1, "flight count")?;
    let n_flights = number::<usize>(f[0]).map_err(|e| e.at_line(line))?;

    for _ in 0..n_flights {
        let (line, f) = lines.fields(6, "flight")?;
        add_flight(&mut builder, &f, year).map_err(|e| e.at_line(line))?;
    }

    if let Some((idx, _)) = lines.lines.find(|(_, l)| !l.trim().is_empty()) {
        warn!("ignoring input from line {} on", idx + 1);
    }

    let trip = builder.build();
    info!("Parsed {} cities and {} flights", trip.cities().count(), trip.num_flights());
    Ok(trip)
}
