//! Cities, flights and the trip they form.

use crate::error::{Error, Result};
use crate::formula::Lit;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::fmt;

/// Reference year used when the input gives only day and month.
pub const DEFAULT_YEAR: i32 = 2024;

/// Flight dates. Ordering is chronological.
pub type Date = NaiveDate;

/// The day a stay of `stay` days starting on `arrival` ends. `None` past the
/// end of the calendar.
pub fn leave_date(arrival: Date, stay: u32) -> Option<Date> {
    arrival.checked_add_signed(Duration::days(i64::from(stay)))
}

/// Identifier of a flight. Doubles as its Boolean decision variable:
/// literal `id` means "flight taken", `-id` means "flight not taken".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlightId(u32);

impl FlightId {
    /// Panics on zero; ids start at 1.
    pub fn new(id: u32) -> FlightId {
        assert!(id > 0, "flight ids start at 1");
        FlightId(id)
    }

    pub fn get(self) -> u32 { self.0 }

    /// The positive literal of this flight's variable.
    pub fn lit(self) -> Lit { self.0 as Lit }

    /// The variable of a literal of either sign.
    pub fn from_lit(lit: Lit) -> Option<FlightId> {
        if lit == 0 { None } else { Some(FlightId(lit.unsigned_abs())) }
    }
}

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Index of a city in its trip, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CityId(usize);

impl CityId {
    pub fn index(self) -> usize { self.0 }
}

#[derive(Debug, Clone)]
pub struct City {
    pub code: String,
    pub name: String,
    /// Days to stay before leaving again. `None` only for the base.
    pub stay: Option<u32>,
    pub arrivals: Vec<FlightId>,
    pub departures: Vec<FlightId>,
}

#[derive(Debug, Clone)]
pub struct Flight {
    pub id: FlightId,
    pub from: CityId,
    pub to: CityId,
    pub date: Date,
    pub departure_time: String,
    pub arrival_time: String,
    pub cost: u64,
}

/// An immutable trip-planning instance.
#[derive(Debug, Clone)]
pub struct Trip {
    base: CityId,
    cities: Vec<City>,
    codes: HashMap<String, CityId>,
    flights: Vec<Flight>,
}

impl Trip {
    pub fn base(&self) -> CityId { self.base }

    pub fn is_base(&self, city: CityId) -> bool { city == self.base }

    pub fn cities(&self) -> impl Iterator<Item = (CityId, &City)> {
        self.cities.iter().enumerate().map(|(idx, c)| (CityId(idx), c))
    }

    pub fn city(&self, id: CityId) -> &City { &self.cities[id.0] }

    pub fn lookup(&self, code: &str) -> Result<CityId> {
        self.codes.get(code).copied().ok_or_else(|| Error::UnknownCity(code.to_string()))
    }

    /// All flights in id order.
    pub fn flights(&self) -> &[Flight] { &self.flights }

    pub fn flight(&self, id: FlightId) -> &Flight { &self.flights[id.0 as usize - 1] }

    pub fn num_flights(&self) -> usize { self.flights.len() }
}

/// Builds a [`Trip`], handing out flight ids from 1 in insertion order.
#[derive(Debug)]
pub struct TripBuilder {
    trip: Trip,
    next_id: u32,
    total_cost: u64,
}

impl TripBuilder {
    pub fn new(base_name: &str, base_code: &str) -> TripBuilder {
        let base = City {
            code: base_code.to_string(),
            name: base_name.to_string(),
            stay: None,
            arrivals: Vec::new(),
            departures: Vec::new(),
        };
        let mut codes = HashMap::new();
        codes.insert(base_code.to_string(), CityId(0));
        TripBuilder {
            trip: Trip { base: CityId(0), cities: vec![base], codes, flights: Vec::new() },
            next_id: 1,
            total_cost: 0,
        }
    }

    pub fn add_city(&mut self, name: &str, code: &str, stay: u32) -> Result<CityId> {
        if self.trip.codes.contains_key(code) {
            return Err(Error::DuplicateCity(code.to_string()));
        }
        let id = CityId(self.trip.cities.len());
        self.trip.cities.push(City {
            code: code.to_string(),
            name: name.to_string(),
            stay: Some(stay),
            arrivals: Vec::new(),
            departures: Vec::new(),
        });
        self.trip.codes.insert(code.to_string(), id);
        Ok(id)
    }

    /// Fails on unknown city codes, and when the fares summed so far no
    /// longer fit in a `u64`.
    pub fn add_flight(
        &mut self,
        date: Date,
        from_code: &str,
        to_code: &str,
        departure_time: &str,
        arrival_time: &str,
        cost: u64,
    ) -> Result<FlightId> {
        let from = self.trip.lookup(from_code)?;
        let to = self.trip.lookup(to_code)?;
        self.total_cost = self.total_cost.checked_add(cost).ok_or(Error::CostOverflow(cost))?;
        let id = FlightId::new(self.next_id);
        self.next_id += 1;

        self.trip.cities[from.0].departures.push(id);
        self.trip.cities[to.0].arrivals.push(id);
        self.trip.flights.push(Flight {
            id,
            from,
            to,
            date,
            departure_time: departure_time.to_string(),
            arrival_time: arrival_time.to_string(),
            cost,
        });
        Ok(id)
    }

    pub fn build(self) -> Trip {
        self.trip
    }
}
