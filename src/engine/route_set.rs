//! The mutable collection of routes on the active map.
//!
//! Manages:
//! - Upsert/remove keyed by route id, in insertion order
//! - Stable colour assignment (never re-derived from position)
//! - Enabled flags, hover state and category/vehicle filters
//! - The derived visible and rendered subsets

use std::collections::HashMap;

use log::debug;

use crate::palette::DEFAULT_PALETTE;
use crate::{OptionExt, Result, Route, RouteMetadata};

/// Category and vehicle selection.
///
/// An empty list matches everything; a non-empty list restricts. Both
/// fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteFilter {
    pub categories: Vec<String>,
    pub vehicles: Vec<String>,
}

impl RouteFilter {
    pub fn new(categories: Vec<String>, vehicles: Vec<String>) -> Self {
        Self {
            categories,
            vehicles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.vehicles.is_empty()
    }

    pub fn matches(&self, metadata: &RouteMetadata) -> bool {
        (self.categories.is_empty() || self.categories.contains(&metadata.category))
            && (self.vehicles.is_empty() || self.vehicles.contains(&metadata.vehicle))
    }
}

/// Routes of one map, keyed by id.
///
/// Colour indices are handed out by insertion count modulo the palette
/// size. Removing a route does not free its colour and updating a route
/// never changes it.
#[derive(Debug)]
pub struct RouteSet {
    routes: HashMap<String, Route>,
    /// Insertion order of the ids in `routes`
    order: Vec<String>,
    /// Number of insertions since the last clear
    inserted: usize,
    palette_size: usize,
    filter: RouteFilter,
}

impl Default for RouteSet {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.len())
    }
}

impl RouteSet {
    /// Create an empty route set cycling through `palette_size` colours.
    pub fn new(palette_size: usize) -> Self {
        Self {
            routes: HashMap::new(),
            order: Vec::new(),
            inserted: 0,
            palette_size: palette_size.max(1),
            filter: RouteFilter::default(),
        }
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Insert a route, or replace the route with the same id.
    ///
    /// A new route gets the next colour index. A replacement keeps the
    /// existing colour index, enabled flag and hover state, and bumps the
    /// revision. Returns the route's colour index.
    pub fn upsert(&mut self, mut route: Route) -> usize {
        if let Some(existing) = self.routes.get(&route.id) {
            route.color_index = existing.color_index;
            route.enabled = existing.enabled;
            route.hover = existing.hover;
            route.revision = existing.revision + 1;
            debug!(
                "[RouteSet] Updated '{}' (revision {})",
                route.id, route.revision
            );
        } else {
            route.color_index = self.inserted % self.palette_size;
            route.revision = 0;
            self.inserted += 1;
            self.order.push(route.id.clone());
            debug!(
                "[RouteSet] Inserted '{}' with colour {}",
                route.id, route.color_index
            );
        }

        let color_index = route.color_index;
        self.routes.insert(route.id.clone(), route);
        color_index
    }

    /// Remove a route by id.
    ///
    /// Returns the removed route if it existed.
    pub fn remove(&mut self, id: &str) -> Option<Route> {
        let removed = self.routes.remove(id)?;
        self.order.retain(|o| o != id);
        debug!("[RouteSet] Removed '{}'", id);
        Some(removed)
    }

    /// Drop every route and restart colour assignment.
    pub fn clear(&mut self) {
        self.routes.clear();
        self.order.clear();
        self.inserted = 0;
    }

    pub fn get(&self, id: &str) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.routes.contains_key(id)
    }

    /// All routes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.order.iter().filter_map(|id| self.routes.get(id))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    // ========================================================================
    // Flags
    // ========================================================================

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<()> {
        self.routes.get_mut(id).ok_or_unknown_route(id)?.enabled = enabled;
        Ok(())
    }

    /// Set whether the route's list entry is hovered.
    ///
    /// Returns true if the highlight state changed.
    pub fn set_toolbar_hovered(&mut self, id: &str, hovered: bool) -> Result<bool> {
        let route = self.routes.get_mut(id).ok_or_unknown_route(id)?;
        let before = route.highlighted();
        route.hover.toolbar_entry = hovered;
        Ok(before != route.highlighted())
    }

    /// Set whether the route's drawn geometry is hovered.
    ///
    /// Returns true if the highlight state changed.
    pub fn set_element_hovered(&mut self, id: &str, hovered: bool) -> Result<bool> {
        let route = self.routes.get_mut(id).ok_or_unknown_route(id)?;
        let before = route.highlighted();
        route.hover.element = hovered;
        Ok(before != route.highlighted())
    }

    /// Enable every route in the filtered listing. Returns the number changed.
    pub fn enable_all(&mut self) -> usize {
        self.update_filtered(|_| true)
    }

    /// Disable every route in the filtered listing. Returns the number changed.
    pub fn disable_all(&mut self) -> usize {
        self.update_filtered(|_| false)
    }

    /// Flip the enabled flag of every route in the filtered listing.
    pub fn invert_enabled(&mut self) -> usize {
        self.update_filtered(|enabled| !enabled)
    }

    fn update_filtered(&mut self, next: impl Fn(bool) -> bool) -> usize {
        let ids: Vec<String> = self.filtered().iter().map(|r| r.id.clone()).collect();
        let mut changed = 0;
        for id in ids {
            if let Some(route) = self.routes.get_mut(&id) {
                let enabled = next(route.enabled);
                if enabled != route.enabled {
                    route.enabled = enabled;
                    changed += 1;
                }
            }
        }
        changed
    }

    // ========================================================================
    // Filtering
    // ========================================================================

    pub fn set_filter(&mut self, categories: Vec<String>, vehicles: Vec<String>) {
        self.filter = RouteFilter::new(categories, vehicles);
    }

    pub fn filter(&self) -> &RouteFilter {
        &self.filter
    }

    /// Drop selected categories and vehicles that no route carries anymore.
    ///
    /// Returns true if the filter changed.
    pub fn prune_filter(&mut self) -> bool {
        let categories = self.categories();
        let vehicles = self.vehicles();
        let before = self.filter.clone();
        self.filter.categories.retain(|c| categories.contains(c));
        self.filter.vehicles.retain(|v| vehicles.contains(v));
        before != self.filter
    }

    /// Distinct categories of routes with a path, in insertion order.
    pub fn categories(&self) -> Vec<String> {
        self.distinct(|m| &m.category)
    }

    /// Distinct vehicles of routes with a path, in insertion order.
    pub fn vehicles(&self) -> Vec<String> {
        self.distinct(|m| &m.vehicle)
    }

    fn distinct(&self, field: impl Fn(&RouteMetadata) -> &String) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for route in self.iter().filter(|r| r.has_path()) {
            let value = field(&route.metadata);
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        values
    }

    /// Routes with a path that pass the filter, enabled or not.
    pub fn filtered(&self) -> Vec<&Route> {
        self.iter()
            .filter(|r| r.has_path() && self.filter.matches(&r.metadata))
            .collect()
    }

    /// The filtered listing sorted by name for display.
    pub fn entries_by_name(&self) -> Vec<&Route> {
        let mut entries = self.filtered();
        entries.sort_by(|a, b| {
            a.metadata
                .name
                .cmp(&b.metadata.name)
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
    }

    /// Visible routes: filtered, enabled, with a non-empty path.
    pub fn visible(&self) -> Vec<&Route> {
        self.iter()
            .filter(|r| r.enabled && r.has_path() && self.filter.matches(&r.metadata))
            .collect()
    }

    /// Routes to draw: the visible ones plus disabled routes that are
    /// highlighted, which are shown as a preview.
    pub fn rendered(&self) -> Vec<&Route> {
        self.iter()
            .filter(|r| {
                (r.enabled || r.highlighted()) && r.has_path() && self.filter.matches(&r.metadata)
            })
            .collect()
    }
}
