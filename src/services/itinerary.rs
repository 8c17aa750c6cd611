//! Itinerary timing engine.
//!
//! Walks the sorted stops of a route against the legs of a directions
//! result and fills in arrival/exit timestamps, per-leg distance and travel
//! time, and route totals. Two entry points:
//!
//! - [`compute_fixed_order`] keeps the caller's stop order.
//! - [`compute_optimized`] first writes the provider's optimized order back
//!   onto the stops, then walks them the same way.
//!
//! Both are pure: no I/O, no shared state. The updated stops are collected
//! in a fresh vector and swapped into the route only once the walk succeeded.

use chrono::{NaiveDateTime, TimeDelta};
use tracing::debug;

use crate::error::{ItineraryError, ItineraryResult};
use crate::services::waypoints::{sort_stops, stop_roles, StopRole};
use crate::types::{DirectionsResult, Leg, Route, Stop, TimingConfiguration, WaypointOrder};

/// Sequence key the optimized order starts at; 0 is the start point, 1 stays free.
const OPTIMIZED_ORDER_OFFSET: i32 = 2;

/// Compute the itinerary keeping the stops in their caller-given order.
pub fn compute_fixed_order(
    route: Route,
    departure: NaiveDateTime,
    config: &TimingConfiguration,
    directions: &DirectionsResult,
) -> ItineraryResult<Route> {
    if route.stops.is_empty() {
        return Ok(route);
    }

    let legs = chosen_legs(directions)?;

    let mut stops = route.stops.clone();
    sort_stops(&mut stops);

    walk(route, stops, departure, config, legs, directions)
}

/// Compute the itinerary in the order the provider optimized.
pub fn compute_optimized(
    route: Route,
    departure: NaiveDateTime,
    config: &TimingConfiguration,
    directions: &DirectionsResult,
) -> ItineraryResult<Route> {
    if route.stops.is_empty() {
        return Ok(route);
    }

    let legs = chosen_legs(directions)?;
    let order = directions
        .optimized_order
        .as_deref()
        .ok_or_else(|| ItineraryError::provider_routing(directions, "no optimized waypoint order returned"))?;

    let mut stops = route.stops.clone();
    sort_stops(&mut stops);
    reconcile_order(&mut stops, route.start_id(), order)
        .map_err(|message| ItineraryError::provider_routing(directions, message))?;
    sort_stops(&mut stops);

    walk(route, stops, departure, config, legs, directions)
}

/// Legs of the first candidate route, after the status checks.
fn chosen_legs(directions: &DirectionsResult) -> ItineraryResult<&[Leg]> {
    if !directions.status.is_success() {
        return Err(ItineraryError::provider_routing(
            directions,
            "provider returned a non-success status",
        ));
    }

    let route = directions
        .routes
        .as_deref()
        .and_then(|routes| routes.first())
        .ok_or_else(|| ItineraryError::provider_routing(directions, "no route found"))?;

    match route.legs.as_deref() {
        Some(legs) if !legs.is_empty() => Ok(legs),
        Some(_) => Err(ItineraryError::provider_routing(directions, "empty route returned")),
        None => Err(ItineraryError::provider_routing(directions, "route has no legs")),
    }
}

/// Write the optimized positions back onto the sorted stops as sequence keys.
///
/// The waypoint sent at `optimized_index` gets `provided_index + 2`, the
/// mapping both providers' order lists are applied with. A leading start
/// marker gets 0 and
/// a trailing return marker gets the key after the last waypoint. Stops that
/// were never sent keep their key.
pub(crate) fn reconcile_order(
    stops: &mut [Stop],
    start_id: Option<&str>,
    order: &[WaypointOrder],
) -> Result<(), String> {
    let roles = stop_roles(stops, start_id);
    let sent: Vec<usize> = roles
        .iter()
        .enumerate()
        .filter(|(_, role)| **role == StopRole::Waypoint)
        .map(|(pos, _)| pos)
        .collect();

    if order.len() != sent.len() {
        return Err(format!(
            "optimized order has {} entries for {} waypoints",
            order.len(),
            sent.len()
        ));
    }

    let mut provided_seen = vec![false; sent.len()];
    let mut optimized_seen = vec![false; sent.len()];

    for entry in order {
        let (provided, optimized) = (entry.provided_index, entry.optimized_index);
        if provided >= sent.len() || optimized >= sent.len() {
            return Err(format!(
                "optimized order entry {} -> {} is out of range for {} waypoints",
                provided,
                optimized,
                sent.len()
            ));
        }
        if provided_seen[provided] || optimized_seen[optimized] {
            return Err(format!(
                "optimized order entry {} -> {} repeats a waypoint",
                provided, optimized
            ));
        }
        provided_seen[provided] = true;
        optimized_seen[optimized] = true;

        stops[sent[optimized]].order = provided as i32 + OPTIMIZED_ORDER_OFFSET;
    }

    for (stop, role) in stops.iter_mut().zip(&roles) {
        match role {
            StopRole::StartMarker => stop.order = 0,
            StopRole::ReturnMarker => stop.order = sent.len() as i32 + OPTIMIZED_ORDER_OFFSET,
            StopRole::Waypoint | StopRole::Skipped => {}
        }
    }

    Ok(())
}

/// Walk sorted stops against the legs and swap the result into the route.
fn walk(
    mut route: Route,
    sorted: Vec<Stop>,
    departure: NaiveDateTime,
    config: &TimingConfiguration,
    legs: &[Leg],
    directions: &DirectionsResult,
) -> ItineraryResult<Route> {
    let roles = stop_roles(&sorted, route.start_id());
    let mut acc = ItineraryAccumulator::new(departure, config, legs, sorted.len());

    for (stop, role) in sorted.into_iter().zip(roles) {
        match role {
            StopRole::Waypoint => {
                if !acc.visit(stop) {
                    return Err(ItineraryError::provider_routing(
                        directions,
                        format!("provider returned {} legs, fewer than the waypoints sent", legs.len()),
                    ));
                }
            }
            StopRole::StartMarker | StopRole::ReturnMarker | StopRole::Skipped => acc.pass(stop),
        }
    }

    let totals = acc.finish();
    debug!(
        "Itinerary computed: {} legs consumed, {:.3} km, {}s",
        totals.legs_consumed,
        totals.distance_km,
        totals.duration.num_seconds()
    );

    route.stops = totals.stops;
    route.distance_total_km = totals.distance_km;
    route.duration_total = totals.duration;
    Ok(route)
}

/// Running state of one itinerary walk
struct ItineraryAccumulator<'a> {
    config: &'a TimingConfiguration,
    legs: &'a [Leg],
    next_leg: usize,
    cursor: NaiveDateTime,
    distance_km: f64,
    duration: TimeDelta,
    stops: Vec<Stop>,
}

/// Outcome of a finished walk
struct ItineraryTotals {
    stops: Vec<Stop>,
    distance_km: f64,
    duration: TimeDelta,
    legs_consumed: usize,
}

impl<'a> ItineraryAccumulator<'a> {
    fn new(departure: NaiveDateTime, config: &'a TimingConfiguration, legs: &'a [Leg], capacity: usize) -> Self {
        Self {
            config,
            legs,
            next_leg: 0,
            cursor: departure,
            distance_km: 0.0,
            duration: TimeDelta::zero(),
            stops: Vec::with_capacity(capacity),
        }
    }

    /// Keep a stop that consumes no leg.
    fn pass(&mut self, stop: Stop) {
        self.stops.push(stop);
    }

    /// Time a stop against the next leg. Returns `false` when legs ran out.
    fn visit(&mut self, mut stop: Stop) -> bool {
        let Some(leg) = self.legs.get(self.next_leg).copied() else {
            return false;
        };
        self.next_leg += 1;

        let travel = leg.duration();
        self.cursor = self.cursor + travel;
        stop.arrival = Some(self.cursor);

        let service = self.config.service_for(&stop.stop_type);
        self.cursor = self.cursor + service;
        stop.exit = Some(self.cursor);

        stop.time_course = Some(travel);
        stop.time_service = Some(service);
        stop.distance_km = Some(leg.distance_km());

        self.distance_km += leg.distance_km();
        self.duration = self.duration + travel + service;
        self.stops.push(stop);
        true
    }

    /// Leg back to the start point: the provider's last leg, when it was not
    /// already consumed by a stop.
    fn return_leg(&self) -> Option<Leg> {
        if self.legs.len() > self.next_leg {
            self.legs.last().copied()
        } else {
            None
        }
    }

    fn finish(mut self) -> ItineraryTotals {
        if self.config.return_to_base {
            if let Some(leg) = self.return_leg() {
                let travel = leg.duration();
                self.distance_km += leg.distance_km();
                self.duration = self.duration + travel;
                self.cursor = self.cursor + travel;

                if let Some(last) = self.stops.last_mut().filter(|s| s.is_depot()) {
                    last.arrival = Some(self.cursor);
                    last.exit = Some(self.cursor);
                    last.distance_km = Some(last.distance_km.unwrap_or(0.0) + leg.distance_km());
                    last.time_course = Some(last.time_course.unwrap_or_else(TimeDelta::zero) + travel);
                }
            }
        }

        ItineraryTotals {
            stops: self.stops,
            distance_km: self.distance_km,
            duration: self.duration,
            legs_consumed: self.next_leg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    use crate::types::{Coordinates, DirectionsRoute, StartPoint, StopType};

    fn departure() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn config(return_to_base: bool) -> TimingConfiguration {
        TimingConfiguration::new(TimeDelta::minutes(10), TimeDelta::minutes(5), return_to_base)
    }

    fn directions(legs: &[(f64, i64)]) -> DirectionsResult {
        DirectionsResult::success(vec![DirectionsRoute::from_legs(
            legs.iter().map(|(d, t)| Leg::new(*d, *t)).collect(),
        )])
    }

    fn route(stops: Vec<Stop>) -> Route {
        Route::new(StartPoint::new("base", Coordinates::new(0.0, 0.0)), stops)
    }

    fn two_stop_route() -> Route {
        route(vec![
            Stop::new("s1", 1, StopType::Delivery).at(Coordinates::new(0.01, 0.0)),
            Stop::new("s2", 2, StopType::Collect).at(Coordinates::new(0.02, 0.0)),
        ])
    }

    fn ids(route: &Route) -> Vec<String> {
        route.stops.iter().map(|s| s.id.clone().unwrap_or_default()).collect()
    }

    #[test]
    fn test_two_stop_scenario() {
        let result = compute_fixed_order(
            two_stop_route(),
            departure(),
            &config(false),
            &directions(&[(5000.0, 600), (3000.0, 300)]),
        )
        .unwrap();

        let s1 = &result.stops[0];
        assert_eq!(s1.arrival, Some(at(8, 10)));
        assert_eq!(s1.exit, Some(at(8, 15)));
        assert_eq!(s1.distance_km, Some(5.0));
        assert_eq!(s1.time_course, Some(TimeDelta::minutes(10)));
        assert_eq!(s1.time_service, Some(TimeDelta::minutes(5)));

        let s2 = &result.stops[1];
        assert_eq!(s2.arrival, Some(at(8, 20)));
        assert_eq!(s2.exit, Some(at(8, 30)));
        assert_eq!(s2.distance_km, Some(3.0));
        assert_eq!(s2.time_service, Some(TimeDelta::minutes(10)));

        assert!((result.distance_total_km - 8.0).abs() < 1e-9);
        // 15 min driving + 15 min service
        assert_eq!(result.duration_total, TimeDelta::minutes(30));
    }

    #[test]
    fn test_arrival_follows_previous_exit() {
        let r = route(
            (1..=5)
                .map(|i| Stop::new(format!("s{i}"), i, if i % 2 == 0 { "collect" } else { "delivery" }))
                .collect(),
        );
        let legs: Vec<(f64, i64)> = (1..=6).map(|i| (1000.0 * i as f64, 60 * i)).collect();
        let result = compute_fixed_order(r, departure(), &config(false), &directions(&legs)).unwrap();

        let mut previous_exit = departure();
        for (i, stop) in result.stops.iter().enumerate() {
            let leg = Leg::new(legs[i].0, legs[i].1);
            assert_eq!(stop.arrival, Some(previous_exit + leg.duration()));
            previous_exit = stop.exit.unwrap();
        }
    }

    #[test]
    fn test_return_leg_excluded_without_return_to_base() {
        let result = compute_fixed_order(
            two_stop_route(),
            departure(),
            &config(false),
            &directions(&[(5000.0, 600), (3000.0, 300), (7000.0, 900)]),
        )
        .unwrap();

        assert!((result.distance_total_km - 8.0).abs() < 1e-9);
        assert_eq!(result.duration_total, TimeDelta::minutes(30));
    }

    #[test]
    fn test_return_leg_included_with_return_to_base() {
        let result = compute_fixed_order(
            two_stop_route(),
            departure(),
            &config(true),
            &directions(&[(5000.0, 600), (3000.0, 300), (7000.0, 900)]),
        )
        .unwrap();

        assert!((result.distance_total_km - 15.0).abs() < 1e-9);
        assert_eq!(result.duration_total, TimeDelta::minutes(45));
        // no depot stop, so no stop absorbs the return leg
        assert_eq!(result.stops[1].exit, Some(at(8, 30)));
    }

    #[test]
    fn test_depot_return_stop_gets_return_leg() {
        let mut stops = two_stop_route().stops;
        stops.push(Stop::new("base", 3, StopType::Depot));
        let result = compute_fixed_order(
            route(stops),
            departure(),
            &config(true),
            &directions(&[(5000.0, 600), (3000.0, 300), (7000.0, 900)]),
        )
        .unwrap();

        let depot = &result.stops[2];
        assert_eq!(depot.arrival, Some(at(8, 45)));
        assert_eq!(depot.exit, Some(at(8, 45)));
        assert_eq!(depot.distance_km, Some(7.0));
        assert_eq!(depot.time_course, Some(TimeDelta::minutes(15)));
        assert!((result.distance_total_km - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_depot_return_stop_untimed_without_return_to_base() {
        let mut stops = two_stop_route().stops;
        stops.push(Stop::new("base", 3, StopType::Depot));
        let result = compute_fixed_order(
            route(stops),
            departure(),
            &config(false),
            &directions(&[(5000.0, 600), (3000.0, 300), (7000.0, 900)]),
        )
        .unwrap();

        assert!(result.stops[2].arrival.is_none());
        assert!((result.distance_total_km - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_sent_depot_stop_accrues_return_leg() {
        let r = route(vec![
            Stop::new("s1", 1, StopType::Delivery),
            Stop::new("yard", 2, StopType::Depot),
        ]);
        let result = compute_fixed_order(
            r,
            departure(),
            &config(true),
            &directions(&[(5000.0, 600), (2000.0, 120), (1000.0, 60)]),
        )
        .unwrap();

        // yard: arrives 8:17, 5 min delivery service, then 1 min back to base
        let yard = &result.stops[1];
        assert_eq!(yard.distance_km, Some(3.0));
        assert_eq!(yard.time_course, Some(TimeDelta::minutes(3)));
        assert_eq!(yard.time_service, Some(TimeDelta::minutes(5)));
        assert_eq!(yard.arrival, Some(at(8, 23)));
        assert_eq!(yard.exit, Some(at(8, 23)));
    }

    #[test]
    fn test_service_classification_by_substring() {
        let r = route(vec![
            Stop::new("a", 1, "collect_priority"),
            Stop::new("b", 2, "delivery"),
            Stop::new("c", 3, "Collect"),
            Stop::new("d", 4, "dropoff"),
        ]);
        let result = compute_fixed_order(
            r,
            departure(),
            &config(false),
            &directions(&[(0.0, 0), (0.0, 0), (0.0, 0), (0.0, 0)]),
        )
        .unwrap();

        assert_eq!(result.stops[0].time_service, Some(TimeDelta::minutes(10)));
        assert_eq!(result.stops[1].time_service, Some(TimeDelta::minutes(5)));
        // anything without `collect` is serviced as a delivery
        assert_eq!(result.stops[2].time_service, Some(TimeDelta::minutes(5)));
        assert_eq!(result.stops[3].time_service, Some(TimeDelta::minutes(5)));
        assert_eq!(result.duration_total, TimeDelta::minutes(25));
    }

    #[test]
    fn test_stops_are_returned_sorted() {
        let r = route(vec![
            Stop::new("late", 9, StopType::Delivery),
            Stop::new("early", 1, StopType::Delivery),
        ]);
        let result = compute_fixed_order(r, departure(), &config(false), &directions(&[(1000.0, 60), (2000.0, 120)]))
            .unwrap();

        assert_eq!(ids(&result), vec!["early", "late"]);
        assert_eq!(result.stops[0].distance_km, Some(1.0));
    }

    #[test]
    fn test_stop_without_identity_consumes_no_leg() {
        let r = route(vec![
            Stop::new("s1", 1, StopType::Delivery),
            Stop { id: None, ..Stop::new("", 2, StopType::Delivery) },
            Stop::new("s3", 3, StopType::Delivery),
        ]);
        let result = compute_fixed_order(r, departure(), &config(false), &directions(&[(1000.0, 60), (2000.0, 120)]))
            .unwrap();

        assert!(result.stops[1].arrival.is_none());
        assert_eq!(result.stops[2].distance_km, Some(2.0));
        assert_eq!(result.stops.len(), 3);
    }

    #[test]
    fn test_empty_stops_is_a_no_op() {
        let r = route(vec![]);
        let broken = DirectionsResult::failed("ERROR", "{}");
        let result = compute_fixed_order(r.clone(), departure(), &config(false), &broken).unwrap();
        assert_eq!(result, r);

        let result = compute_optimized(r.clone(), departure(), &config(false), &broken).unwrap();
        assert_eq!(result, r);
    }

    #[test]
    fn test_missing_routes_is_provider_error() {
        let mut result = directions(&[(1000.0, 60)]);
        result.routes = None;
        result.raw = Some(r#"{"formatVersion":"0.0.12"}"#.into());

        let err = compute_fixed_order(two_stop_route(), departure(), &config(false), &result).unwrap_err();
        match err {
            ItineraryError::ProviderRouting { message, payload, .. } => {
                assert_eq!(message, "no route found");
                assert!(payload.unwrap().contains("formatVersion"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_success_status_is_provider_error() {
        let result = DirectionsResult::failed("ZERO_RESULTS", r#"{"status":"ZERO_RESULTS"}"#);
        let err = compute_fixed_order(two_stop_route(), departure(), &config(false), &result).unwrap_err();
        assert!(matches!(err, ItineraryError::ProviderRouting { ref status, .. } if status == "ZERO_RESULTS"));
    }

    #[test]
    fn test_missing_legs_is_provider_error() {
        let mut result = directions(&[]);
        result.routes.as_mut().unwrap()[0].legs = None;
        let err = compute_fixed_order(two_stop_route(), departure(), &config(false), &result).unwrap_err();
        assert!(matches!(err, ItineraryError::ProviderRouting { ref message, .. } if message == "route has no legs"));
    }

    #[test]
    fn test_too_few_legs_is_provider_error() {
        let err = compute_fixed_order(two_stop_route(), departure(), &config(false), &directions(&[(1000.0, 60)]))
            .unwrap_err();
        assert!(matches!(err, ItineraryError::ProviderRouting { .. }));
    }

    #[test]
    fn test_fixed_order_is_idempotent() {
        let result = directions(&[(5000.0, 600), (3000.0, 300), (1000.0, 60)]);
        let first = compute_fixed_order(two_stop_route(), departure(), &config(true), &result).unwrap();
        let second = compute_fixed_order(two_stop_route(), departure(), &config(true), &result).unwrap();
        assert_eq!(first, second);
    }

    fn optimized(legs: &[(f64, i64)], order: &[(usize, usize)]) -> DirectionsResult {
        directions(legs).with_optimized_order(
            order
                .iter()
                .map(|(provided, optimized)| WaypointOrder {
                    provided_index: *provided,
                    optimized_index: *optimized,
                })
                .collect(),
        )
    }

    fn three_stop_route() -> Route {
        route(vec![
            Stop::new("a", 1, StopType::Delivery),
            Stop::new("b", 2, StopType::Collect),
            Stop::new("c", 3, StopType::Delivery),
        ])
    }

    #[test]
    fn test_optimized_reorders_and_times_stops() {
        // b sits at optimized 1 -> key 2, c at 2 -> key 3, a at 0 -> key 4
        let result = compute_optimized(
            three_stop_route(),
            departure(),
            &config(false),
            &optimized(
                &[(1000.0, 60), (2000.0, 120), (3000.0, 180), (4000.0, 240)],
                &[(0, 1), (1, 2), (2, 0)],
            ),
        )
        .unwrap();

        assert_eq!(ids(&result), vec!["b", "c", "a"]);
        let orders: Vec<i32> = result.stops.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![2, 3, 4]);

        assert_eq!(result.stops[0].distance_km, Some(1.0));
        assert_eq!(result.stops[0].arrival, Some(at(8, 1)));
        // b: collect 10 min, then 2 min to c
        assert_eq!(result.stops[1].arrival, Some(at(8, 13)));
        assert!((result.distance_total_km - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_optimized_is_a_permutation() {
        let stops: Vec<Stop> = (0..6).map(|i| Stop::new(format!("s{i}"), i + 1, StopType::Delivery)).collect();
        let r = route(stops);
        let legs: Vec<(f64, i64)> = (0..7).map(|_| (1000.0, 60)).collect();
        let order = [(0, 3), (1, 5), (2, 0), (3, 1), (4, 4), (5, 2)];

        let result = compute_optimized(r.clone(), departure(), &config(false), &optimized(&legs, &order)).unwrap();

        let before: HashSet<String> = ids(&r).into_iter().collect();
        let after: Vec<String> = ids(&result);
        assert_eq!(after.len(), before.len());
        assert_eq!(after.iter().cloned().collect::<HashSet<_>>(), before);
        assert_eq!(after, vec!["s3", "s5", "s0", "s1", "s4", "s2"]);
    }

    #[test]
    fn test_optimized_start_marker_consumes_no_leg() {
        let mut r = three_stop_route();
        r.stops.insert(0, Stop::new("base", 0, StopType::Depot));
        r.stops.push(Stop::new("base", 4, StopType::Depot));

        let result = compute_optimized(
            r,
            departure(),
            &config(true),
            &optimized(
                &[(1000.0, 60), (2000.0, 120), (3000.0, 180), (4000.0, 240)],
                &[(0, 2), (1, 0), (2, 1)],
            ),
        )
        .unwrap();

        assert_eq!(ids(&result), vec!["base", "c", "a", "b", "base"]);
        assert!(result.stops[0].arrival.is_none());
        assert_eq!(result.stops[1].distance_km, Some(1.0));
        assert_eq!(result.stops[4].order, 5);
        assert_eq!(result.stops[4].distance_km, Some(4.0));
        assert!((result.distance_total_km - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_optimized_missing_order_is_provider_error() {
        let err = compute_optimized(
            three_stop_route(),
            departure(),
            &config(false),
            &directions(&[(1000.0, 60), (1000.0, 60), (1000.0, 60), (1000.0, 60)]),
        )
        .unwrap_err();
        assert!(matches!(err, ItineraryError::ProviderRouting { ref message, .. } if message.contains("optimized")));
    }

    #[test]
    fn test_optimized_missing_routes_is_provider_error() {
        let mut result = optimized(&[(1000.0, 60)], &[(0, 0), (1, 1), (2, 2)]);
        result.routes = None;
        let err = compute_optimized(three_stop_route(), departure(), &config(false), &result).unwrap_err();
        assert!(matches!(err, ItineraryError::ProviderRouting { .. }));
    }

    #[test]
    fn test_optimized_rejects_non_permutation() {
        let legs = [(1000.0, 60), (1000.0, 60), (1000.0, 60), (1000.0, 60)];

        let duplicate = optimized(&legs, &[(0, 0), (1, 0), (2, 2)]);
        assert!(compute_optimized(three_stop_route(), departure(), &config(false), &duplicate).is_err());

        let out_of_range = optimized(&legs, &[(0, 0), (1, 1), (2, 7)]);
        assert!(compute_optimized(three_stop_route(), departure(), &config(false), &out_of_range).is_err());

        let short = optimized(&legs, &[(0, 0), (1, 1)]);
        assert!(compute_optimized(three_stop_route(), departure(), &config(false), &short).is_err());
    }

    #[test]
    fn test_reconcile_order_keys() {
        let mut stops = vec![
            Stop::new("base", 0, StopType::Depot),
            Stop::new("a", 1, StopType::Delivery),
            Stop::new("b", 2, StopType::Delivery),
            Stop::new("c", 3, StopType::Delivery),
            Stop::new("base", 4, StopType::Depot),
        ];
        let order = [
            WaypointOrder { provided_index: 0, optimized_index: 1 },
            WaypointOrder { provided_index: 1, optimized_index: 2 },
            WaypointOrder { provided_index: 2, optimized_index: 0 },
        ];
        reconcile_order(&mut stops, Some("base"), &order).unwrap();

        // waypoint at optimized_index takes provided_index + 2
        let keys: Vec<(&str, i32)> = stops.iter().map(|s| (s.identity().unwrap(), s.order)).collect();
        assert_eq!(keys, vec![("base", 0), ("a", 4), ("b", 2), ("c", 3), ("base", 5)]);
    }
}
