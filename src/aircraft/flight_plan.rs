use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::airspace::Waypoint;
use crate::utils::Vector;

const ORIGIN: usize = 0;
const DESTINATION: usize = 1;

/// Planned route between two entry/exit points.
///
/// `route` only ever holds interior waypoints. The origin and destination sit outside it, and
/// `total_distance` is the planned length from origin through every route waypoint to the
/// destination. It is fixed when the plan is built and survives reroutes unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPlan {
    origin_name: String,
    destination_name: String,
    route: Vec<Waypoint>,
    origin: Vector,
    destination: Vector,
    total_distance: f64,
}

impl FlightPlan {
    /// Plans a route with no limit on leg length.
    pub fn new(waypoints: &[Waypoint], origin: &Waypoint, destination: &Waypoint) -> Self {
        Self::with_max_leg(waypoints, origin, destination, None)
    }

    /// Plans a route whose legs are no longer than `max_leg_length` where possible.
    ///
    /// Falls back to an unbounded search when the limit leaves the destination unreachable.
    pub fn with_max_leg(
        waypoints: &[Waypoint],
        origin: &Waypoint,
        destination: &Waypoint,
        max_leg_length: Option<f64>,
    ) -> Self {
        let interior: Vec<&Waypoint> = waypoints.iter().filter(|w| !w.is_entry_or_exit()).collect();

        let route = if interior.is_empty() {
            warn!(
                "[AIRCRAFT] No interior waypoints, {} -> {} flies direct",
                origin.name(),
                destination.name()
            );
            Vec::new()
        } else {
            let bounded = max_leg_length
                .and_then(|limit| shortest_route(origin, destination, &interior, Some(limit)));
            match bounded {
                Some(route) => route,
                None => {
                    if max_leg_length.is_some() {
                        debug!(
                            "[AIRCRAFT] No route {} -> {} within leg limit, planning unbounded",
                            origin.name(),
                            destination.name()
                        );
                    }
                    shortest_route(origin, destination, &interior, None).unwrap_or_default()
                }
            }
        };

        let total_distance = planned_distance(origin, &route, destination);

        Self {
            origin_name: origin.name().to_string(),
            destination_name: destination.name().to_string(),
            route,
            origin: origin.location(),
            destination: destination.location(),
            total_distance,
        }
    }

    pub fn route(&self) -> &[Waypoint] {
        &self.route
    }

    pub fn origin(&self) -> Vector {
        self.origin
    }

    pub fn destination(&self) -> Vector {
        self.destination
    }

    pub fn origin_name(&self) -> &str {
        &self.origin_name
    }

    pub fn destination_name(&self) -> &str {
        &self.destination_name
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Replaces `route[stage]`. Refuses entry/exit waypoints and out-of-range stages.
    pub fn alter_path(&mut self, stage: usize, waypoint: Waypoint) -> bool {
        if waypoint.is_entry_or_exit() {
            debug!("[AIRCRAFT] Refusing reroute through boundary point {}", waypoint.name());
            return false;
        }
        match self.route.get_mut(stage) {
            Some(slot) => {
                *slot = waypoint;
                true
            }
            None => false,
        }
    }

    pub fn index_of_waypoint(&self, waypoint: &Waypoint) -> Option<usize> {
        self.route.iter().position(|w| w == waypoint)
    }
}

fn planned_distance(origin: &Waypoint, route: &[Waypoint], destination: &Waypoint) -> f64 {
    let mut total = 0.0;
    let mut previous = origin;
    for waypoint in route {
        total += previous.cost(waypoint);
        previous = waypoint;
    }
    total + previous.cost(destination)
}

/// Dijkstra over origin, destination and the interior waypoints.
///
/// Node 0 is the origin, node 1 the destination, interior waypoint `i` is node `i + 2`.
/// There is no direct origin-destination edge. Ties settle the lowest node index first and a
/// predecessor is only replaced by a strictly cheaper one.
fn shortest_route(
    origin: &Waypoint,
    destination: &Waypoint,
    interior: &[&Waypoint],
    max_leg_length: Option<f64>,
) -> Option<Vec<Waypoint>> {
    let node = |index: usize| match index {
        ORIGIN => origin,
        DESTINATION => destination,
        i => interior[i - 2],
    };
    let count = interior.len() + 2;

    let mut distance = vec![f64::INFINITY; count];
    let mut previous: Vec<Option<usize>> = vec![None; count];
    let mut settled = vec![false; count];
    distance[ORIGIN] = 0.0;

    loop {
        let current = (0..count)
            .filter(|&i| !settled[i] && distance[i].is_finite())
            .fold(None, |best: Option<usize>, i| match best {
                Some(b) if distance[b] <= distance[i] => Some(b),
                _ => Some(i),
            })?;

        if current == DESTINATION {
            break;
        }
        settled[current] = true;

        for next in 0..count {
            if settled[next] || next == current || next == ORIGIN {
                continue;
            }
            if current == ORIGIN && next == DESTINATION {
                continue;
            }

            let leg = node(current).cost(node(next));
            if max_leg_length.is_some_and(|limit| leg > limit) {
                continue;
            }

            let candidate = distance[current] + leg;
            if candidate < distance[next] {
                distance[next] = candidate;
                previous[next] = Some(current);
            }
        }
    }

    let mut route = Vec::new();
    let mut step = previous[DESTINATION];
    while let Some(index) = step {
        if index == ORIGIN {
            break;
        }
        route.push(node(index).clone());
        step = previous[index];
    }
    route.reverse();
    Some(route)
}
