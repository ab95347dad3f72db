//! Dashboard statistics

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{Documentation, Evenement, Publicite};

/// One stat card: total and how many fall in the current month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub total: usize,
    /// `None` when the records carry no date
    pub this_month: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub events: StatCard,
    pub documents: StatCard,
    pub ads: StatCard,
}

fn same_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}

impl DashboardStats {
    /// Events count by event date, ads by publication date.
    /// Documentation has no date on the wire, so only its total is known.
    pub fn compute(
        events: &[Evenement],
        documents: &[Documentation],
        ads: &[Publicite],
        today: NaiveDate,
    ) -> Self {
        let events_this_month = events
            .iter()
            .filter_map(|e| e.date)
            .filter(|d| same_month(*d, today))
            .count();
        let ads_this_month = ads
            .iter()
            .filter_map(|a| a.published_at)
            .filter(|d| same_month(d.date_naive(), today))
            .count();

        Self {
            events: StatCard {
                total: events.len(),
                this_month: Some(events_this_month),
            },
            documents: StatCard {
                total: documents.len(),
                this_month: None,
            },
            ads: StatCard {
                total: ads.len(),
                this_month: Some(ads_this_month),
            },
        }
    }
}
