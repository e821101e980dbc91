//! End-to-end trips solved with the CaDiCaL-backed oracle.

use flightsat::model::{leave_date, DEFAULT_YEAR};
use flightsat::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ENCODINGS: [CardEncoding; 3] = [CardEncoding::Bitwise, CardEncoding::Pairwise, CardEncoding::Sequential];

fn solve(trip: &Trip, encoding: CardEncoding) -> Option<Itinerary> {
    plan(trip, encoding, &mut CadicalOracle::default()).unwrap()
}

fn trip(input: &str) -> Trip {
    parse_trip(input, DEFAULT_YEAR).unwrap()
}

fn ids(ids: &[u32]) -> Vec<FlightId> {
    ids.iter().copied().map(FlightId::new).collect()
}

const ROUND_TRIP: &str = "\
1
Home HOM
Away AWY 2
2
01/03 HOM AWY 10:00 12:00 100
03/03 AWY HOM 14:00 16:00 80
";

#[test]
fn single_round_trip() {
    let trip = trip(ROUND_TRIP);
    for encoding in ENCODINGS.iter().copied() {
        let itinerary = solve(&trip, encoding).expect("feasible");
        assert_eq!(itinerary.cost, 180);
        assert_eq!(format_itinerary(&trip, &itinerary),
                   "01/03 Home Away 10:00 100\n03/03 Away Home 14:00 80\n");
    }
}

#[test]
fn return_on_the_wrong_day_is_infeasible() {
    let trip = trip(&ROUND_TRIP.replace("03/03 AWY", "02/03 AWY"));
    for encoding in ENCODINGS.iter().copied() {
        assert_eq!(solve(&trip, encoding), None);
    }
}

#[test]
fn city_without_flights_is_infeasible() {
    let trip = trip("\
2
Home HOM
Away AWY 2
Far FAR 1
2
01/03 HOM AWY 10:00 12:00 100
03/03 AWY HOM 14:00 16:00 80
");
    assert_eq!(solve(&trip, CardEncoding::Bitwise), None);
}

const TOUR: &str = "\
2
Lisbon LIS
Paris CDG 3
Rome FCO 2
10
01/03 LIS CDG 10:00 12:30 120
01/03 LIS FCO 07:00 10:00 200
02/03 LIS CDG 09:00 11:30 90
03/03 FCO CDG 16:00 18:00 60
04/03 CDG FCO 08:15 10:20 90
05/03 CDG FCO 11:00 13:00 40
06/03 FCO LIS 19:00 21:45 150
07/03 FCO LIS 06:00 08:45 70
04/03 CDG LIS 20:00 22:30 10
06/03 CDG LIS 18:00 20:30 200
";

#[test]
fn cheapest_tour() {
    let trip = trip(TOUR);
    // LIS-CDG 01/03 120, CDG-FCO 04/03 90, FCO-LIS 06/03 150 = 360
    // LIS-CDG 02/03 90, CDG-FCO 05/03 40, FCO-LIS 07/03 70 = 200
    // LIS-FCO 01/03 200, FCO-CDG 03/03 60, CDG-LIS 06/03 200 = 460
    for encoding in ENCODINGS.iter().copied() {
        let itinerary = solve(&trip, encoding).expect("feasible");
        assert_eq!(itinerary.cost, 200);
        assert_eq!(itinerary.flights, ids(&[3, 6, 8]));
        assert!(verify_itinerary(&trip, &itinerary.flights));
    }
}

#[test]
fn raising_a_selected_fare_switches_itinerary() {
    let before = solve(&trip(TOUR), CardEncoding::Bitwise).unwrap();
    let after = solve(&trip(&TOUR.replace("05/03 CDG FCO 11:00 13:00 40", "05/03 CDG FCO 11:00 13:00 400")),
                      CardEncoding::Bitwise).unwrap();
    assert!(after.cost >= before.cost);
    assert_eq!(after.cost, 360);
    assert!(!after.flights.contains(&FlightId::new(6)));
}

#[test]
fn forcing_the_decoded_flights_reproduces_the_optimum() {
    let trip = trip(TOUR);
    let formula = encode(&trip, CardEncoding::Bitwise).unwrap();
    let outcome = CadicalOracle::default().solve(&formula).unwrap();
    let itinerary = decode(&trip, &outcome).unwrap();

    let mut forced = formula.clone();
    forced.require_selected(itinerary.flights.iter().copied());
    let again = CadicalOracle::default().solve(&forced).unwrap();

    assert_eq!(again.cost(), outcome.cost());
    let (first, second) = (outcome.assignment().unwrap(), again.assignment().unwrap());
    for flight in trip.flights() {
        assert_eq!(first.is_selected(flight.id), second.is_selected(flight.id));
    }
    assert_eq!(decode(&trip, &again), Some(itinerary));
}

#[test]
fn selected_flights_respect_every_rule() {
    let trip = trip(TOUR);
    let formula = encode(&trip, CardEncoding::Sequential).unwrap();
    let outcome = CadicalOracle { stratification: 1 }.solve(&formula).unwrap();
    let assignment = outcome.assignment().unwrap();
    assert_eq!(assignment.num_vars(), formula.num_vars());
    assert!(formula.satisfies_hard(|l| assignment.value(l)));

    for (_, city) in trip.cities() {
        assert_eq!(city.arrivals.iter().filter(|f| assignment.is_selected(**f)).count(), 1);
        assert_eq!(city.departures.iter().filter(|f| assignment.is_selected(**f)).count(), 1);
        if let Some(stay) = city.stay {
            for a in city.arrivals.iter().filter(|f| assignment.is_selected(**f)) {
                let d = city.departures.iter().find(|f| assignment.is_selected(**f)).unwrap();
                assert_eq!(Some(trip.flight(*d).date), leave_date(trip.flight(*a).date, stay));
            }
        }
    }
}

/// A random trip over a base and two or three cities in early March.
fn random_trip(rng: &mut StdRng) -> Trip {
    let n_cities = rng.gen_range(2, 4);
    let codes = ["HOM", "AAA", "BBB", "CCC"];
    let mut b = TripBuilder::new("Home", codes[0]);
    for code in &codes[1..=n_cities] {
        b.add_city(code, code, rng.gen_range(1, 3)).unwrap();
    }
    let n_flights = rng.gen_range(6, 12);
    for _ in 0..n_flights {
        let from = rng.gen_range(0, n_cities + 1);
        let mut to = rng.gen_range(0, n_cities);
        if to >= from {
            to += 1;
        }
        let date = Date::from_ymd_opt(DEFAULT_YEAR, 3, rng.gen_range(1, 9)).unwrap();
        b.add_flight(date, codes[from], codes[to], "12:00", "13:00", rng.gen_range(1, 50)).unwrap();
    }
    b.build()
}

/// Cheapest selection of flights that satisfies the rules, by enumeration.
fn brute_force(trip: &Trip) -> Option<u64> {
    let m = trip.num_flights();
    (0u32..(1 << m))
        .filter_map(|mask| {
            let selected = (0..m).filter(|i| mask & (1 << i) != 0)
                .map(|i| FlightId::new(i as u32 + 1))
                .collect::<Vec<_>>();
            if verify_itinerary(trip, &selected) {
                Some(selected.iter().map(|f| trip.flight(*f).cost).sum())
            } else {
                None
            }
        })
        .min()
}

#[test]
fn random_trips_match_enumeration() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut feasible = 0;
    for _ in 0..60 {
        let trip = random_trip(&mut rng);
        let expected = brute_force(&trip);
        for encoding in ENCODINGS.iter().copied() {
            let found = solve(&trip, encoding);
            assert_eq!(found.as_ref().map(|i| i.cost), expected);
            if let Some(itinerary) = found {
                assert!(verify_itinerary(&trip, &itinerary.flights));
                let sum: u64 = itinerary.flights.iter().map(|f| trip.flight(*f).cost).sum();
                assert_eq!(sum, itinerary.cost);
            }
        }
        if expected.is_some() {
            feasible += 1;
        }
    }
    assert!(feasible > 0);
}

#[test]
fn raising_a_fare_never_lowers_the_optimum() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..40 {
        let trip = random_trip(&mut rng);
        let before = match solve(&trip, CardEncoding::Bitwise) {
            Some(itinerary) => itinerary,
            None => continue,
        };

        let bumped = rng.gen_range(0, trip.num_flights());
        let mut b = TripBuilder::new("Home", "HOM");
        for (_, city) in trip.cities().skip(1) {
            b.add_city(&city.name, &city.code, city.stay.unwrap()).unwrap();
        }
        for (idx, f) in trip.flights().iter().enumerate() {
            let cost = if idx == bumped { f.cost + rng.gen_range(1, 100) } else { f.cost };
            b.add_flight(f.date, &trip.city(f.from).code, &trip.city(f.to).code,
                         &f.departure_time, &f.arrival_time, cost).unwrap();
        }
        let bumped_trip = b.build();

        let after = solve(&bumped_trip, CardEncoding::Bitwise).expect("still feasible");
        assert!(after.cost >= before.cost);
        assert_eq!(Some(after.cost), brute_force(&bumped_trip));
    }
}
