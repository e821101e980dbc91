//! Cheapest multi-city round trips through weighted MaxSAT.
//!
//! A [`Trip`] (a home base, cities with fixed stay lengths, dated flights
//! with fares) is encoded into a [`WeightedCnf`] with one variable per
//! flight. Hard clauses admit exactly the feasible itineraries, soft clauses
//! charge each taken flight its fare. Any [`Oracle`] can optimize the
//! formula; [`decode`] turns its answer back into dated flights.

pub mod card;
pub mod core_guided;
pub mod decode;
pub mod encode;
pub mod error;
pub mod formula;
pub mod model;
pub mod oracle;
pub mod parse;

pub use card::CardEncoding;
pub use core_guided::CadicalOracle;
pub use decode::{decode, format_itinerary, verify_itinerary, Itinerary};
pub use encode::encode;
pub use error::{Error, Result};
pub use formula::{Lit, WeightedCnf};
pub use model::{City, CityId, Date, Flight, FlightId, Trip, TripBuilder};
pub use oracle::{Assignment, Oracle, Outcome};
pub use parse::parse_trip;

/// Encodes, solves once and decodes. `Ok(None)` means no feasible trip.
pub fn plan(trip: &Trip, encoding: CardEncoding, oracle: &mut impl Oracle) -> Result<Option<Itinerary>> {
    let formula = encode(trip, encoding)?;
    let outcome = oracle.solve(&formula)?;
    Ok(decode(trip, &outcome))
}
