//! The state of one calculator session: selected stamps, target, and the AI suggestion.
//!
//! Everything shown to the user is derived from three pieces of state (ledger, target text and
//! the current suggestion) each time it is read. Suggestion requests are asynchronous, so each one
//! is issued with a sequence number and a resolution is only applied if it belongs to the most
//! recently issued request.

use crate::model::{Amount, Catalog, Ledger, Suggestion, TargetTracker};
use crate::summary::{InventoryLine, Summary};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

/// Where the suggestion request lifecycle currently stands.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RequestState {
    /// No request has been made since the session started or was last cleared.
    #[default]
    Idle,
    /// A request is outstanding.
    InFlight { seq: u64 },
    /// The last request finished; `found` is false when it produced no suggestion.
    Resolved { found: bool },
}

/// Handed out by `Session::begin_request` and given back to `Session::resolve`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RequestTicket {
    seq: u64,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    catalog: Catalog,
    ledger: Ledger,
    target: TargetTracker,
    suggestion: Option<Suggestion>,
    request: RequestState,
    /// Advanced by every request and every clear, so older tickets never match again.
    latest_seq: u64,
}

impl Session {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ledger: Ledger::new(),
            target: TargetTracker::new(),
            suggestion: None,
            request: RequestState::Idle,
            latest_seq: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn target(&self) -> &TargetTracker {
        &self.target
    }

    pub fn suggestion(&self) -> Option<&Suggestion> {
        self.suggestion.as_ref()
    }

    pub fn request_state(&self) -> RequestState {
        self.request
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.request, RequestState::InFlight { .. })
    }

    pub fn add(&mut self, id: &str) {
        self.ledger.add(id);
    }

    pub fn add_n(&mut self, id: &str, n: u64) {
        self.ledger.add_n(id, n);
    }

    pub fn remove(&mut self, id: &str) {
        self.ledger.remove(id);
    }

    pub fn set_target(&mut self, text: impl Into<String>) {
        self.target.set_target(text);
    }

    /// Resets the ledger, the target text and the suggestion together.
    ///
    /// Every ticket issued so far is retired, so a late or repeated resolution is ignored and a
    /// new request may be issued right away.
    pub fn clear(&mut self) {
        self.ledger.clear();
        self.target.clear();
        self.suggestion = None;
        self.latest_seq += 1;
        self.request = RequestState::Idle;
        debug!("Session cleared");
    }

    pub fn total_value(&self) -> Amount {
        self.ledger.total_value(&self.catalog)
    }

    pub fn remaining(&self) -> Amount {
        self.target.remaining(self.total_value())
    }

    pub fn progress_percent(&self) -> Decimal {
        self.target.progress_percent(self.total_value())
    }

    /// Starts a suggestion request for `query`.
    ///
    /// Returns `None` when no external call should be made: the query is blank, or a request is
    /// already in flight. Otherwise the current suggestion is cleared and a ticket is issued.
    pub fn begin_request(&mut self, query: &str) -> Option<RequestTicket> {
        if query.trim().is_empty() {
            debug!("Ignoring blank suggestion query");
            return None;
        }
        if self.is_in_flight() {
            info!("A suggestion request is already in progress");
            return None;
        }
        self.latest_seq += 1;
        self.suggestion = None;
        self.request = RequestState::InFlight {
            seq: self.latest_seq,
        };
        Some(RequestTicket {
            seq: self.latest_seq,
        })
    }

    /// Applies the outcome of the request identified by `ticket`.
    ///
    /// Returns false, changing nothing, unless `ticket` belongs to the request in flight. A
    /// suggestion replaces the target text with its price; `None` leaves the target untouched.
    pub fn resolve(&mut self, ticket: RequestTicket, outcome: Option<Suggestion>) -> bool {
        let current = matches!(self.request, RequestState::InFlight { seq } if seq == ticket.seq);
        if !current {
            debug!(
                "Discarding stale suggestion result {} (latest is {})",
                ticket.seq, self.latest_seq
            );
            return false;
        }
        self.request = RequestState::Resolved {
            found: outcome.is_some(),
        };
        if let Some(suggestion) = outcome {
            self.target.set_target_from_suggestion(suggestion.price);
            self.suggestion = Some(suggestion);
        }
        true
    }

    /// One line per selected denomination that is in the catalog, in catalog order.
    pub fn inventory(&self) -> Vec<InventoryLine> {
        self.catalog
            .iter()
            .filter_map(|d| {
                let count = self.ledger.count(&d.id);
                (count > 0).then(|| InventoryLine {
                    id: d.id.clone(),
                    label: d.label.clone(),
                    value: d.value,
                    count,
                    subtotal: d.value * count,
                })
            })
            .collect()
    }

    /// A snapshot of everything derived from the current state.
    pub fn summary(&self) -> Summary {
        Summary {
            total: self.total_value(),
            target_text: self.target.text().to_string(),
            target: self.target.parsed(),
            remaining: self.remaining(),
            progress_percent: self.progress_percent(),
            distinct: self.ledger.len(),
            inventory: self.inventory(),
            suggestion: self.suggestion.clone(),
            request: self.request,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn suggestion(price: &str) -> Suggestion {
        Suggestion {
            category: "Local Letter".to_string(),
            weight: "Up to 30g".to_string(),
            price: amt(price),
            description: "Standard local letter".to_string(),
            tips: vec!["Write the postcode".to_string()],
        }
    }

    #[test]
    fn test_target_scenario() {
        let mut session = Session::default();
        session.add("d6");
        session.set_target("5");
        assert_eq!(session.total_value(), amt("2"));
        assert_eq!(session.remaining(), amt("3"));
        assert_eq!(session.progress_percent(), Decimal::from(40));
    }

    #[test]
    fn test_successful_resolution_sets_target() {
        let mut session = Session::default();
        session.set_target("3");
        let ticket = session.begin_request("50g local letter").unwrap();
        assert!(session.is_in_flight());
        assert!(session.resolve(ticket, Some(suggestion("12.5"))));
        assert_eq!(session.target().text(), "12.5");
        assert_eq!(session.remaining(), amt("12.5"));
        assert_eq!(
            session.request_state(),
            RequestState::Resolved { found: true }
        );
        assert_eq!(session.suggestion().unwrap().price, amt("12.5"));
    }

    #[test]
    fn test_empty_resolution_keeps_target() {
        let mut session = Session::default();
        session.set_target("4.");
        let ticket = session.begin_request("airmail to UK").unwrap();
        assert!(session.resolve(ticket, None));
        assert_eq!(session.target().text(), "4.");
        assert!(session.suggestion().is_none());
        assert_eq!(
            session.request_state(),
            RequestState::Resolved { found: false }
        );
    }

    #[test]
    fn test_blank_query_issues_nothing() {
        let mut session = Session::default();
        assert!(session.begin_request("   ").is_none());
        assert!(session.begin_request("").is_none());
        assert_eq!(session.request_state(), RequestState::Idle);
    }

    #[test]
    fn test_no_second_request_while_in_flight() {
        let mut session = Session::default();
        let first = session.begin_request("letter").unwrap();
        assert!(session.begin_request("parcel").is_none());
        assert!(session.resolve(first, None));
        assert!(session.begin_request("parcel").is_some());
    }

    #[test]
    fn test_new_request_clears_previous_suggestion() {
        let mut session = Session::default();
        let ticket = session.begin_request("letter").unwrap();
        session.resolve(ticket, Some(suggestion("2.2")));
        assert!(session.suggestion().is_some());
        let _ = session.begin_request("parcel").unwrap();
        assert!(session.suggestion().is_none());
        assert_eq!(session.target().text(), "2.2");
    }

    #[test]
    fn test_stale_resolution_after_clear_is_discarded() {
        let mut session = Session::default();
        let ticket = session.begin_request("letter").unwrap();
        session.add("d4");
        session.clear();
        session.set_target("9");
        assert_eq!(session.request_state(), RequestState::Idle);
        assert!(!session.resolve(ticket, Some(suggestion("12.5"))));
        assert_eq!(session.target().text(), "9");
        assert!(session.suggestion().is_none());
        assert!(session.begin_request("parcel").is_some());
    }

    #[test]
    fn test_resolved_ticket_cannot_resolve_again() {
        let mut session = Session::default();
        let ticket = session.begin_request("letter").unwrap();
        assert!(session.resolve(ticket, Some(suggestion("2.2"))));
        assert!(!session.resolve(ticket, Some(suggestion("7"))));
        assert_eq!(session.target().text(), "2.2");

        session.clear();
        assert!(!session.resolve(ticket, Some(suggestion("12.5"))));
        assert_eq!(session.target().text(), "");
        assert!(session.suggestion().is_none());
        assert_eq!(session.request_state(), RequestState::Idle);
    }

    #[test]
    fn test_add_n() {
        let mut session = Session::default();
        session.add_n("d4", u64::MAX);
        session.add_n("d1", 2);
        assert_eq!(session.ledger().count("d4"), u64::MAX);
        assert_eq!(session.ledger().count("d1"), 2);
        assert!(session.total_value() > amt("1000"));
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut session = Session::default();
        let old = session.begin_request("letter").unwrap();
        session.resolve(old, None);
        let new = session.begin_request("parcel").unwrap();
        assert!(!session.resolve(old, Some(suggestion("99"))));
        assert!(session.is_in_flight());
        assert!(session.resolve(new, Some(suggestion("3.7"))));
        assert_eq!(session.target().text(), "3.7");
    }

    #[test]
    fn test_ledger_edits_while_in_flight() {
        let mut session = Session::default();
        let ticket = session.begin_request("letter").unwrap();
        session.add("d14");
        session.add("d1");
        assert_eq!(session.total_value(), amt("5.1"));
        session.resolve(ticket, Some(suggestion("5.1")));
        assert_eq!(session.remaining(), Amount::ZERO);
        assert_eq!(session.progress_percent(), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = Session::default();
        session.add("d4");
        session.add("d5");
        let ticket = session.begin_request("letter").unwrap();
        session.resolve(ticket, Some(suggestion("4.9")));
        session.clear();
        assert!(session.ledger().is_empty());
        assert_eq!(session.target().text(), "");
        assert!(session.suggestion().is_none());
        assert_eq!(session.request_state(), RequestState::Idle);
        assert_eq!(session.total_value(), Amount::ZERO);
    }

    #[test]
    fn test_inventory_in_catalog_order() {
        let mut session = Session::default();
        session.add("d17");
        session.add("d1");
        session.add("d1");
        session.add("unknown");
        let inventory = session.inventory();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory[0].id, "d1");
        assert_eq!(inventory[0].count, 2);
        assert_eq!(inventory[0].subtotal, amt("0.2"));
        assert_eq!(inventory[1].id, "d17");
        assert_eq!(session.summary().distinct, 3);
    }
}
