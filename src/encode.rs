//! Translation of a [`Trip`] into a weighted MaxSAT formula.
//!
//! One Boolean variable per flight (its [`FlightId`] literal). Hard clauses
//! describe feasible itineraries, soft clauses charge each taken flight its
//! cost, so an optimal assignment is a cheapest itinerary.

use crate::card::{self, CardEncoding};
use crate::error::Result;
use crate::formula::{Lit, WeightedCnf};
use crate::model::{leave_date, FlightId, Trip};
use log::*;

fn lits(flights: &[FlightId]) -> Vec<Lit> {
    flights.iter().map(|f| f.lit()).collect()
}

pub fn encode(trip: &Trip, encoding: CardEncoding) -> Result<WeightedCnf> {
    let mut formula = WeightedCnf::with_vars(trip.num_flights() as u32);

    encode_base_departure(&mut formula, trip);
    let n_sequencing = formula.hard().len();
    encode_stays(&mut formula, trip);
    let n_stays = formula.hard().len() - n_sequencing;
    encode_visits(&mut formula, trip, encoding)?;
    let n_visits = formula.hard().len() - n_sequencing - n_stays;

    // Leaving a flight out is free; taking it costs its fare.
    for flight in trip.flights() {
        formula.add_soft(vec![-flight.id.lit()], flight.cost);
    }

    info!("Encoded {} flights: {} sequencing, {} stay, {} visit clauses ({} encoding), {} soft, {} vars",
          trip.num_flights(), n_sequencing, n_stays, n_visits, encoding,
          formula.soft().len(), formula.num_vars());
    Ok(formula)
}

/// Nothing departs from another city on or before the day we leave the base.
fn encode_base_departure(formula: &mut WeightedCnf, trip: &Trip) {
    for d in trip.city(trip.base()).departures.iter().copied() {
        let leave = trip.flight(d).date;
        for (city_id, city) in trip.cities() {
            if trip.is_base(city_id) { continue; }
            for f in city.departures.iter().copied() {
                if !(trip.flight(f).date > leave) {
                    formula.add_hard(vec![-d.lit(), -f.lit()]);
                }
            }
        }
    }
}

/// Arriving in a city means leaving it exactly `stay` days later.
fn encode_stays(formula: &mut WeightedCnf, trip: &Trip) {
    for (city_id, city) in trip.cities() {
        if trip.is_base(city_id) { continue; }
        let stay = match city.stay {
            Some(stay) => stay,
            None => continue,
        };
        for a in city.arrivals.iter().copied() {
            let leave = leave_date(trip.flight(a).date, stay);
            let onward = city.departures.iter().copied()
                .filter(|d| Some(trip.flight(*d).date) == leave)
                .map(|d| d.lit());
            let clause = std::iter::once(-a.lit()).chain(onward).collect::<Vec<_>>();
            if clause.len() == 1 {
                debug!("no departure from {} {} days after arrival {}", city.code, stay, a);
            }
            formula.add_hard(clause);
        }
    }
}

/// Every city, the base included, is entered once and left once.
fn encode_visits(formula: &mut WeightedCnf, trip: &Trip, encoding: CardEncoding) -> Result<()> {
    for (_, city) in trip.cities() {
        if city.arrivals.is_empty() || city.departures.is_empty() {
            warn!("{} has {} arrivals and {} departures; the trip is infeasible",
                  city.code, city.arrivals.len(), city.departures.len());
        }
        card::exactly_one(formula, &lits(&city.arrivals), encoding)?;
        card::exactly_one(formula, &lits(&city.departures), encoding)?;
    }
    Ok(())
}
