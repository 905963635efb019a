//! Scope descriptors: the parent chain a request addressed a collection through.
//!
//! A [`ScopeDescriptor`] is static and names the parent levels of a route shape. Extracting
//! it against the request path yields a [`ScopePath`] of concrete ids, which resolves against a
//! collection into the filters and parent guards the record store enforces.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use super::collection::Collection;
use crate::core::error::{AppError, Result};
use crate::modules::records::{ParentGuard, Record, ScopeConstraints};

/// A record type that can act as a scope level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    Aircraft,
    AdMonitoring,
}

impl ParentKind {
    pub fn table(&self) -> &'static str {
        match self {
            ParentKind::Aircraft => "aircrafts",
            ParentKind::AdMonitoring => "ad_monitoring",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParentKind::Aircraft => "Aircraft",
            ParentKind::AdMonitoring => "AD monitoring",
        }
    }

    /// Route segment introducing this level
    pub fn segment(&self) -> &'static str {
        match self {
            ParentKind::Aircraft => "aircraft",
            ParentKind::AdMonitoring => "ad_monitoring",
        }
    }

    /// Path parameter carrying the id of this level
    pub fn param(&self) -> &'static str {
        match self {
            ParentKind::Aircraft => "aircraft_id",
            ParentKind::AdMonitoring => "ad_monitoring_id",
        }
    }

    /// The level this one hangs off and the column on this level's table pointing at it
    pub fn link(&self) -> Option<(ParentKind, &'static str)> {
        match self {
            ParentKind::Aircraft => None,
            ParentKind::AdMonitoring => Some((ParentKind::Aircraft, "aircraft_fk")),
        }
    }
}

/// Ordered parent levels of a route shape, outermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeDescriptor {
    pub levels: &'static [ParentKind],
}

impl ScopeDescriptor {
    pub const GLOBAL: ScopeDescriptor = ScopeDescriptor { levels: &[] };
    pub const AIRCRAFT: ScopeDescriptor = ScopeDescriptor {
        levels: &[ParentKind::Aircraft],
    };
    pub const AIRCRAFT_AD_MONITORING: ScopeDescriptor = ScopeDescriptor {
        levels: &[ParentKind::Aircraft, ParentKind::AdMonitoring],
    };

    pub fn is_global(&self) -> bool {
        self.levels.is_empty()
    }

    /// `/aircraft/{aircraft_id}/ad_monitoring/{ad_monitoring_id}` style prefix; empty when global
    pub fn route_prefix(&self) -> String {
        self.levels
            .iter()
            .map(|kind| format!("/{}/{{{}}}", kind.segment(), kind.param()))
            .collect()
    }

    /// A descriptor fits a collection when every level links to the one before it and the
    /// collection stores the id of the deepest level.
    pub fn supports(&self, collection: &Collection) -> bool {
        let chained = self.levels.windows(2).all(|pair| {
            pair[1]
                .link()
                .map(|(outer, _)| outer == pair[0])
                .unwrap_or(false)
        });
        let anchored = self
            .levels
            .last()
            .map(|deepest| collection.parent_column(*deepest).is_some())
            .unwrap_or(true);
        chained && anchored
    }

    /// Read the level ids from the matched path parameters
    pub fn extract(&self, params: &HashMap<String, String>) -> Result<ScopePath> {
        let elements = self
            .levels
            .iter()
            .map(|kind| {
                let raw = params.get(kind.param()).ok_or_else(|| {
                    AppError::Internal(format!("Route is missing path parameter {}", kind.param()))
                })?;
                Ok((*kind, parse_id(kind.param(), raw)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ScopePath { elements })
    }
}

/// Parse a positive integer id from a path segment
pub fn parse_id(name: &str, raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid {}: '{}' is not a positive integer",
                name, raw
            ))
        })
}

/// Concrete parent ids of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePath {
    pub elements: Vec<(ParentKind, i64)>,
}

impl ScopePath {
    pub fn global() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn resolve(&self, collection: &Collection) -> ResolvedScope {
        let filters = self
            .elements
            .iter()
            .filter_map(|(kind, id)| collection.parent_column(*kind).map(|column| (column, *id)))
            .collect();

        let guards = self
            .elements
            .iter()
            .enumerate()
            .map(|(depth, (kind, id))| {
                let link = match (kind.link(), depth.checked_sub(1)) {
                    (Some((outer, column)), Some(prev)) => {
                        let (prev_kind, prev_id) = self.elements[prev];
                        (prev_kind == outer).then_some((column, prev_id))
                    }
                    _ => None,
                };
                ParentGuard {
                    table: kind.table(),
                    label: kind.label(),
                    id: *id,
                    link,
                }
            })
            .collect();

        ResolvedScope {
            constraints: ScopeConstraints { filters, guards },
        }
    }
}

/// A scope path applied to one collection
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedScope {
    pub constraints: ScopeConstraints,
}

impl ResolvedScope {
    /// Write the path-derived foreign keys into `record`; the path always wins.
    pub fn reconcile(&self, record: &mut Record) {
        for (column, id) in &self.constraints.filters {
            let scoped = Value::from(*id);
            match record.get(*column) {
                Some(Value::Null) | None => {}
                Some(supplied) if *supplied == scoped => {}
                Some(supplied) => warn!(
                    column = *column,
                    supplied = %supplied,
                    scoped = *id,
                    "Body foreign key overridden by path scope"
                ),
            }
            record.insert(column.to_string(), scoped);
        }
    }

    /// Error for a missing, deleted or mismatched parent chain
    pub fn parent_not_found(&self) -> AppError {
        let label = self
            .constraints
            .guards
            .last()
            .map(|guard| guard.label)
            .unwrap_or("Parent");
        AppError::NotFound(format!("{} not found", label))
    }
}
