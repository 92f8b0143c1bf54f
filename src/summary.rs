//! Trip summary and comparison chart metrics

use serde::{Deserialize, Serialize};

use crate::budget::{BudgetBreakdown, BudgetPlan};
use crate::models::{Place, Route};
use crate::session::TripSnapshot;

/// Places listed on the summary card
pub const SUMMARY_PLACE_LIMIT: usize = 5;

/// Trip length shown before any search
pub const DEFAULT_TRIP_DAYS: u32 = 3;

/// Series for the comparison bar chart
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonMetrics {
    pub distance_km: u64,
    pub duration_minutes: u64,
    /// Transport share in thousands of won
    pub cost_thousands: u64,
}

impl ComparisonMetrics {
    #[must_use]
    pub fn new(route: &Route, breakdown: &BudgetBreakdown) -> Self {
        Self {
            distance_km: route.distance_km().round() as u64,
            duration_minutes: route.duration_minutes(),
            cost_thousands: (breakdown.transport as f64 / 1000.0).round() as u64,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlaceSummary {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TripSummary {
    pub departure: Option<String>,
    pub destination: Option<String>,
    pub distance_text: Option<String>,
    pub duration_days: u32,
    pub travel_time: Option<String>,
    pub total_budget: u64,
    pub estimated_spending: u64,
    pub places: Vec<PlaceSummary>,
    pub comparison: Option<ComparisonMetrics>,
}

impl TripSummary {
    /// Summarize the displayed trip. `places` is the recommendation list as
    /// currently filtered on the page.
    #[must_use]
    pub fn build(trip: Option<&TripSnapshot>, places: &[Place], plan: &BudgetPlan) -> Self {
        let route = trip.map(|t| &t.route);

        Self {
            departure: trip.map(|t| t.trip.departure.clone()),
            destination: trip.map(|t| t.trip.destination.clone()),
            distance_text: route.map(|r| r.distance_text.clone()),
            duration_days: trip.map_or(DEFAULT_TRIP_DAYS, |t| t.trip.duration_days),
            travel_time: route.map(|r| r.duration_text.clone()),
            total_budget: plan.summary.total_budget,
            estimated_spending: plan.summary.estimated_spending,
            places: places
                .iter()
                .take(SUMMARY_PLACE_LIMIT)
                .map(|place| PlaceSummary {
                    name: place.name.clone(),
                    address: place.address.clone(),
                })
                .collect(),
            comparison: route.map(|r| ComparisonMetrics::new(r, &plan.breakdown)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetWeights;
    use crate::provider::testing::sample_route;

    #[test]
    fn test_comparison_metrics() {
        let mut route = sample_route(325_400);
        route.duration_seconds = 14_520;
        let breakdown = BudgetBreakdown::compute(500_000, &BudgetWeights::default()).unwrap();

        let metrics = ComparisonMetrics::new(&route, &breakdown);
        assert_eq!(metrics.distance_km, 325);
        assert_eq!(metrics.duration_minutes, 242);
        assert_eq!(metrics.cost_thousands, 150);
    }

    #[test]
    fn test_empty_summary() {
        let plan = BudgetPlan::build(0, &BudgetWeights::default()).unwrap();
        let summary = TripSummary::build(None, &[], &plan);

        assert!(summary.departure.is_none());
        assert_eq!(summary.duration_days, DEFAULT_TRIP_DAYS);
        assert!(summary.comparison.is_none());
        assert!(summary.places.is_empty());
    }
}
