//! Planner session
//!
//! Everything the page shows lives here: the active map, the displayed
//! route and places, and the budget. A search only touches displayed state
//! through [`PlannerSession::commit`], once the route and places are both
//! in hand, so readers see either the previous trip or the new one.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregator::PlaceAggregator;
use crate::budget::{BudgetPlan, BudgetWeights, MAX_BUDGET};
use crate::models::{Place, PlaceFilter, Route, TravelMode};
use crate::notice::Notice;
use crate::selector::{MapView, ProviderKind, ProviderSelector, Selection};
use crate::summary::{DEFAULT_TRIP_DAYS, TripSummary};
use crate::{Result, TripSyncError};

/// Where the current search cycle stands
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchPhase {
    #[default]
    Idle,
    Validating,
    Resolving,
    Aggregating,
    Displayed,
}

fn default_duration_days() -> u32 {
    DEFAULT_TRIP_DAYS
}

/// A numeric form field. Pages may submit it as a JSON number or as the
/// raw text of an input element.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum FormNumber {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FormNumber {
    /// The whole-number value, if the field holds one
    #[must_use]
    pub fn as_whole(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Decimal(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(*f as i64),
            Self::Decimal(_) => None,
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl From<i64> for FormNumber {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

/// Form input as submitted by the page
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TripRequest {
    #[serde(default)]
    pub departure: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub departure_date: Option<NaiveDateTime>,
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
    #[serde(default)]
    pub budget: Option<FormNumber>,
    /// Travel mode name; blank means driving
    #[serde(default)]
    pub mode: Option<String>,
}

/// A request that passed validation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Trip {
    pub departure: String,
    pub destination: String,
    pub departure_date: Option<NaiveDateTime>,
    pub duration_days: u32,
    pub budget: u64,
    pub mode: TravelMode,
}

impl TripRequest {
    pub fn validate(&self) -> Result<Trip> {
        let departure = self.departure.trim();
        let destination = self.destination.trim();
        if departure.is_empty() || destination.is_empty() {
            return Err(TripSyncError::validation(
                "Please enter a departure and a destination.",
            ));
        }

        let budget = match self.budget.as_ref().and_then(FormNumber::as_whole) {
            Some(budget) if budget > 0 && budget as u64 <= MAX_BUDGET => budget as u64,
            Some(budget) if budget > 0 => {
                return Err(TripSyncError::validation(format!(
                    "Budget cannot exceed {MAX_BUDGET} won."
                )));
            }
            _ => return Err(TripSyncError::validation("Please enter a budget.")),
        };

        let mode = match self.mode.as_deref().map(str::trim) {
            None | Some("") => TravelMode::default(),
            Some(raw) => raw.parse()?,
        };

        Ok(Trip {
            departure: departure.to_string(),
            destination: destination.to_string(),
            departure_date: self.departure_date,
            duration_days: self.duration_days.max(1),
            budget,
            mode,
        })
    }
}

/// The displayed trip. Replaced as a whole by every successful search.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TripSnapshot {
    pub trip: Trip,
    pub route: Route,
    pub places: Vec<Place>,
}

impl TripSnapshot {
    #[must_use]
    pub fn transport_cost(&self) -> u64 {
        self.trip.mode.estimate_cost(self.route.distance_meters)
    }
}

/// Result of a successful search
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchOutcome {
    pub route: Route,
    pub places: Vec<Place>,
    pub transport_cost: u64,
    pub notice: Notice,
}

#[derive(Debug)]
pub struct PlannerSession {
    selector: ProviderSelector,
    aggregator: PlaceAggregator,
    phase: SearchPhase,
    snapshot: Option<TripSnapshot>,
    filter: PlaceFilter,
    weights: BudgetWeights,
    plan: BudgetPlan,
    last_notice: Option<Notice>,
}

impl PlannerSession {
    pub fn new(selector: ProviderSelector, aggregator: PlaceAggregator) -> Self {
        Self {
            selector,
            aggregator,
            phase: SearchPhase::Idle,
            snapshot: None,
            filter: PlaceFilter::All,
            plan: BudgetPlan::empty(),
            weights: BudgetWeights::default(),
            last_notice: None,
        }
    }

    /// Run one search cycle. Exactly one of a displayed route (with a
    /// success notice) or an error notice results.
    pub async fn search(&mut self, request: TripRequest) -> Result<SearchOutcome> {
        self.phase = SearchPhase::Validating;
        let trip = match request.validate() {
            Ok(trip) => trip,
            Err(e) => return Err(self.fail(e)),
        };

        self.phase = SearchPhase::Resolving;
        let Some(provider) = self.selector.active_provider() else {
            return Err(self.fail(TripSyncError::provider_unavailable(
                "no map provider selected",
            )));
        };

        let route = match provider
            .resolve_route(&trip.departure, &trip.destination, trip.mode)
            .await
        {
            Ok(route) => route,
            Err(e) => return Err(self.fail(e)),
        };

        self.phase = SearchPhase::Aggregating;
        let places = self
            .aggregator
            .find_nearby(provider.as_ref(), route.destination)
            .await;

        let snapshot = TripSnapshot {
            trip,
            route,
            places,
        };
        let transport_cost = snapshot.transport_cost();
        let outcome_route = snapshot.route.clone();
        let outcome_places = snapshot.places.clone();
        self.commit(Some(snapshot))?;

        let notice = Notice::success("Route found!");
        self.last_notice = Some(notice.clone());
        info!(
            "Displayed route ({}, {} places) via {}",
            outcome_route.distance_text,
            outcome_places.len(),
            provider.name()
        );

        Ok(SearchOutcome {
            route: outcome_route,
            places: outcome_places,
            transport_cost,
            notice,
        })
    }

    /// Replace the displayed trip. The only place displayed state changes.
    fn commit(&mut self, snapshot: Option<TripSnapshot>) -> Result<()> {
        let plan = match &snapshot {
            Some(s) => BudgetPlan::build(s.trip.budget, &self.weights)?,
            None => self.plan.clone(),
        };

        self.phase = if snapshot.is_some() {
            SearchPhase::Displayed
        } else {
            SearchPhase::Idle
        };
        self.snapshot = snapshot;
        self.filter = PlaceFilter::All;
        self.plan = plan;
        Ok(())
    }

    /// Abandon the current cycle. Input errors reset to idle; backend
    /// errors fall back to whatever was displayed before.
    fn fail(&mut self, err: TripSyncError) -> TripSyncError {
        warn!("Search failed: {}", err);
        let keeps_display =
            self.snapshot.is_some() && !matches!(err, TripSyncError::Validation { .. });
        self.phase = if keeps_display {
            SearchPhase::Displayed
        } else {
            SearchPhase::Idle
        };
        self.last_notice = Some(Notice::from(&err));
        err
    }

    /// Record a request that could not even be read as a trip form
    pub fn reject_input(&mut self, err: TripSyncError) -> TripSyncError {
        self.phase = SearchPhase::Validating;
        self.fail(err)
    }

    /// Switch map backend. The displayed trip belongs to the old map and is
    /// cleared whenever a new view is created.
    pub async fn select_provider(&mut self, kind: ProviderKind) -> Result<Selection> {
        let previous = self.selector.active_view().map(|view| view.instance_id);
        let selection = self.selector.select(kind).await?;

        if previous != Some(selection.view.instance_id) {
            self.commit(None)?;
        }
        if let Some(notice) = &selection.notice {
            self.last_notice = Some(notice.clone());
        }
        Ok(selection)
    }

    /// Displayed places matching `filter`; the filter sticks for the summary
    pub fn recommendations(&mut self, filter: PlaceFilter) -> Vec<Place> {
        self.filter = filter;
        self.filtered_places()
    }

    fn filtered_places(&self) -> Vec<Place> {
        self.snapshot
            .as_ref()
            .map(|s| {
                s.places
                    .iter()
                    .filter(|place| self.filter.matches(place))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Recompute the budget split. Nothing changes when validation fails.
    pub fn update_budget(&mut self, budget: u64, weights: BudgetWeights) -> Result<BudgetPlan> {
        if weights.total() == 0 {
            return Err(TripSyncError::validation(
                "At least one budget category needs a non-zero weight.",
            ));
        }
        let plan = BudgetPlan::build(budget, &weights)?;
        self.weights = weights;
        self.plan = plan.clone();
        Ok(plan)
    }

    #[must_use]
    pub fn summary(&self) -> TripSummary {
        TripSummary::build(self.snapshot.as_ref(), &self.filtered_places(), &self.plan)
    }

    /// Transport cost of the displayed route for the requested mode
    #[must_use]
    pub fn estimated_transport_cost(&self) -> Option<u64> {
        self.snapshot.as_ref().map(TripSnapshot::transport_cost)
    }

    #[must_use]
    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&TripSnapshot> {
        self.snapshot.as_ref()
    }

    #[must_use]
    pub fn budget_plan(&self) -> &BudgetPlan {
        &self.plan
    }

    #[must_use]
    pub fn active_view(&self) -> Option<&MapView> {
        self.selector.active_view()
    }

    #[must_use]
    pub fn last_notice(&self) -> Option<&Notice> {
        self.last_notice.as_ref()
    }
}
