//! From a solver outcome back to a dated itinerary.

use crate::model::{leave_date, FlightId, Trip};
use crate::oracle::Outcome;
use log::*;
use std::collections::HashSet;

/// Selected flights in travel order, with the total cost the oracle reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    pub cost: u64,
    pub flights: Vec<FlightId>,
}

/// `None` when the oracle found no feasible trip.
pub fn decode(trip: &Trip, outcome: &Outcome) -> Option<Itinerary> {
    let (assignment, cost) = match outcome {
        Outcome::Optimal { assignment, cost } => (assignment, *cost),
        Outcome::Infeasible => return None,
    };

    // Every flight is exactly one city's arrival.
    let mut flights = trip.cities()
        .flat_map(|(_, city)| city.arrivals.iter().copied())
        .filter(|f| assignment.is_selected(*f))
        .collect::<Vec<_>>();
    flights.sort_by_key(|f| trip.flight(*f).date);

    Some(Itinerary { cost, flights })
}

/// One `DD/MM ORIGIN DEST DEP_TIME COST` line per flight.
pub fn format_itinerary(trip: &Trip, itinerary: &Itinerary) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    for id in itinerary.flights.iter().copied() {
        let flight = trip.flight(id);
        writeln!(&mut out, "{} {} {} {} {}",
                 flight.date.format("%d/%m"),
                 trip.city(flight.from).name,
                 trip.city(flight.to).name,
                 flight.departure_time,
                 flight.cost).unwrap();
    }
    out
}

/// Checks a selection of flights against the trip rules without going
/// through the formula. Logs the first broken rule.
pub fn verify_itinerary(trip: &Trip, flights: &[FlightId]) -> bool {
    let selected = flights.iter().copied().collect::<HashSet<_>>();

    for (city_id, city) in trip.cities() {
        let arrivals = city.arrivals.iter().filter(|f| selected.contains(*f)).count();
        let departures = city.departures.iter().filter(|f| selected.contains(*f)).count();
        if arrivals != 1 || departures != 1 {
            warn!("{} has {} arrivals and {} departures", city.code, arrivals, departures);
            return false;
        }

        if trip.is_base(city_id) { continue; }
        let stay = match city.stay {
            Some(stay) => stay,
            None => continue,
        };
        for a in city.arrivals.iter().filter(|f| selected.contains(*f)) {
            let leave = leave_date(trip.flight(*a).date, stay);
            let left_on_time = city.departures.iter()
                .any(|d| selected.contains(d) && Some(trip.flight(*d).date) == leave);
            if !left_on_time {
                warn!("arrived in {} with {} but did not leave {} days later", city.code, a, stay);
                return false;
            }
        }
    }

    for d in trip.city(trip.base()).departures.iter().filter(|f| selected.contains(*f)) {
        let leave = trip.flight(*d).date;
        let premature = selected.iter().copied().find(|f| {
            let flight = trip.flight(*f);
            !trip.is_base(flight.from) && !(flight.date > leave)
        });
        if let Some(f) = premature {
            warn!("{} departs on or before the base departure {}", f, d);
            return false;
        }
    }

    true
}
