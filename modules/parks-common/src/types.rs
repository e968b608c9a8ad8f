use chrono::{DateTime, Utc};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::slug::slugify;

// --- Classification ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighborhood {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Neighborhood {
    pub fn url(&self) -> String {
        format!("/neighborhood/{}/", self.slug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parktype {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facilitytype {
    pub id: i64,
    pub name: String,
}

// --- Parks ---

/// A park as loaded from the store.
///
/// `area` is the raw geometric area reported by the store in the native unit
/// of the stored geometry (square metres for the projected SRID we use).
/// `boundary` is always in WGS84 longitude/latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct Park {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parktype: Option<String>,
    pub boundary: MultiPolygon<f64>,
    pub area: f64,
}

impl Park {
    /// Canonical detail page URL.
    pub fn url(&self) -> String {
        format!("/park/{}/", self.slug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: i64,
    pub name: String,
    pub park_id: i64,
    pub facilitytype_id: Option<i64>,
}

/// Which neighborhoods a play/explore query is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighborhoodScope {
    All,
    One(Neighborhood),
}

impl NeighborhoodScope {
    /// Literal path segment that selects every neighborhood.
    pub const ALL_SLUG: &'static str = "all";

    pub fn slug(&self) -> &str {
        match self {
            NeighborhoodScope::All => Self::ALL_SLUG,
            NeighborhoodScope::One(n) => &n.slug,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            NeighborhoodScope::All => "All neighborhoods",
            NeighborhoodScope::One(n) => &n.name,
        }
    }
}

/// Navigation data rendered at the top of every page.
#[derive(Debug, Clone, Default)]
pub struct TopNav {
    pub neighborhoods: Vec<Neighborhood>,
    pub activities: Vec<Activity>,
}

/// One element of the `activity` list in the neighborhood/activity JSON feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivitySlug {
    pub slug: String,
}

/// JSON shape of a park in the neighborhood/activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkSummary {
    pub activity: Vec<ActivitySlug>,
    pub name: String,
    pub slug: String,
    pub description: String,
}

// --- Events ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub park_id: Option<i64>,
}

impl Event {
    /// The trailing name segment is cosmetic; lookups only use the id.
    pub fn url(&self) -> String {
        let name = slugify(&self.name);
        if name.is_empty() {
            format!("/event/{}/event/", self.id)
        } else {
            format!("/event/{}/{}/", self.id, name)
        }
    }
}

// --- Stories ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub park_id: i64,
    pub title: String,
    pub text: String,
    pub email: Option<String>,
    pub date: DateTime<Utc>,
    pub objectionable_content: bool,
}

impl Story {
    pub fn url(&self) -> String {
        format!("/story/{}/", self.id)
    }
}

/// A validated story ready to be inserted. The store assigns id and date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub park_id: i64,
    pub title: String,
    pub text: String,
    pub email: Option<String>,
}
