// In-memory ParkStore for tests.
//
// MockParkStore mirrors the relational layout (junction tables for
// park↔neighborhood and facility↔activity) so query-layer semantics are the
// same as against Postgres. Builder methods take slugs and assign ids in
// insertion order starting at 1.

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use geo::{polygon, MultiPolygon};

use parks_common::{
    Activity, Event, Facility, Facilitytype, Neighborhood, NeighborhoodScope, NewStory, Park,
    ParkFilter, Parktype, Story,
};

use crate::store::ParkStore;

/// A small square near Franklin Park, Boston.
pub fn sample_boundary() -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: -71.0950, y: 42.3030),
        (x: -71.0850, y: 42.3030),
        (x: -71.0850, y: 42.3120),
        (x: -71.0950, y: 42.3120),
    ]])
}

/// A park with the sample boundary and a 10,000 m² area. The id is assigned
/// when the park is added to a store.
pub fn sample_park(name: &str, slug: &str) -> Park {
    Park {
        id: 0,
        name: name.to_string(),
        slug: slug.to_string(),
        description: format!("{name} description"),
        parktype: None,
        boundary: sample_boundary(),
        area: 10_000.0,
    }
}

#[derive(Default)]
struct MockParkStoreInner {
    neighborhoods: Vec<Neighborhood>,
    activities: Vec<Activity>,
    parktypes: Vec<Parktype>,
    facilitytypes: Vec<Facilitytype>,
    parks: Vec<Park>,
    /// (park_id, neighborhood_id)
    park_neighborhoods: Vec<(i64, i64)>,
    facilities: Vec<Facility>,
    /// (facility_id, activity_id)
    facility_activities: Vec<(i64, i64)>,
    events: Vec<Event>,
    stories: Vec<Story>,
    objectionable_updates: usize,
    fail_reads: bool,
}

impl MockParkStoreInner {
    fn check(&self) -> Result<()> {
        if self.fail_reads {
            bail!("mock store unavailable");
        }
        Ok(())
    }

    fn neighborhood_id(&self, slug: &str) -> i64 {
        self.neighborhoods
            .iter()
            .find(|n| n.slug == slug)
            .unwrap_or_else(|| panic!("unknown neighborhood slug {slug}"))
            .id
    }

    fn activity_id(&self, slug: &str) -> i64 {
        self.activities
            .iter()
            .find(|a| a.slug == slug)
            .unwrap_or_else(|| panic!("unknown activity slug {slug}"))
            .id
    }

    fn park_id(&self, slug: &str) -> i64 {
        self.parks
            .iter()
            .find(|p| p.slug == slug)
            .unwrap_or_else(|| panic!("unknown park slug {slug}"))
            .id
    }

    fn parktype_id(&self, name: &str) -> Option<i64> {
        self.parktypes.iter().find(|t| t.name == name).map(|t| t.id)
    }

    fn in_neighborhood(&self, park_id: i64, neighborhood_id: Option<i64>) -> bool {
        self.park_neighborhoods
            .iter()
            .any(|(p, n)| *p == park_id && neighborhood_id.map_or(true, |id| id == *n))
    }

    fn sorted(&self, mut parks: Vec<Park>) -> Vec<Park> {
        parks.sort_by(|a, b| a.name.cmp(&b.name));
        parks
    }
}

/// Stateful in-memory store. Thread-safe via interior Mutex.
pub struct MockParkStore {
    inner: Mutex<MockParkStoreInner>,
}

impl Default for MockParkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockParkStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MockParkStoreInner::default()),
        }
    }

    /// Make every read and write return an error.
    pub fn failing_reads(self) -> Self {
        self.inner.lock().unwrap().fail_reads = true;
        self
    }

    pub fn with_neighborhood(self, name: &str, slug: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.neighborhoods.len() as i64 + 1;
            inner.neighborhoods.push(Neighborhood {
                id,
                name: name.to_string(),
                slug: slug.to_string(),
            });
        }
        self
    }

    pub fn with_activity(self, name: &str, slug: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.activities.len() as i64 + 1;
            inner.activities.push(Activity {
                id,
                name: name.to_string(),
                slug: slug.to_string(),
            });
        }
        self
    }

    pub fn with_parktype(self, name: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.parktypes.len() as i64 + 1;
            inner.parktypes.push(Parktype {
                id,
                name: name.to_string(),
            });
        }
        self
    }

    pub fn with_facilitytype(self, name: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.facilitytypes.len() as i64 + 1;
            inner.facilitytypes.push(Facilitytype {
                id,
                name: name.to_string(),
            });
        }
        self
    }

    /// Add a park and link it to the given neighborhoods.
    pub fn with_park(self, mut park: Park, neighborhood_slugs: &[&str]) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            park.id = inner.parks.len() as i64 + 1;
            for slug in neighborhood_slugs {
                let neighborhood_id = inner.neighborhood_id(slug);
                inner.park_neighborhoods.push((park.id, neighborhood_id));
            }
            inner.parks.push(park);
        }
        self
    }

    /// Add a facility to a park offering the given activities.
    pub fn with_facility(self, park_slug: &str, name: &str, activity_slugs: &[&str]) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let park_id = inner.park_id(park_slug);
            let id = inner.facilities.len() as i64 + 1;
            inner.facilities.push(Facility {
                id,
                name: name.to_string(),
                park_id,
                facilitytype_id: None,
            });
            for slug in activity_slugs {
                let activity_id = inner.activity_id(slug);
                inner.facility_activities.push((id, activity_id));
            }
        }
        self
    }

    pub fn with_event(self, name: &str, description: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.events.len() as i64 + 1;
            inner.events.push(Event {
                id,
                name: name.to_string(),
                description: description.to_string(),
                starts_at: None,
                ends_at: None,
                park_id: None,
            });
        }
        self
    }

    /// Add a story. Dates increase with insertion order.
    pub fn with_story(self, park_slug: &str, title: &str, text: &str, flagged: bool) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let park_id = inner.park_id(park_slug);
            let id = inner.stories.len() as i64 + 1;
            let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
            inner.stories.push(Story {
                id,
                park_id,
                title: title.to_string(),
                text: text.to_string(),
                email: None,
                date: base + Duration::days(id),
                objectionable_content: flagged,
            });
        }
        self
    }

    // --- Assertion helpers ---

    pub fn story(&self, id: i64) -> Option<Story> {
        self.inner
            .lock()
            .unwrap()
            .stories
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn story_count(&self) -> usize {
        self.inner.lock().unwrap().stories.len()
    }

    /// Number of times `set_story_objectionable` was called.
    pub fn objectionable_updates(&self) -> usize {
        self.inner.lock().unwrap().objectionable_updates
    }
}

#[async_trait]
impl ParkStore for MockParkStore {
    async fn neighborhoods(&self) -> Result<Vec<Neighborhood>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        let mut all = inner.neighborhoods.clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn activities(&self) -> Result<Vec<Activity>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        let mut all = inner.activities.clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn facilitytypes(&self) -> Result<Vec<Facilitytype>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        let mut all = inner.facilitytypes.clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn parks(&self) -> Result<Vec<Park>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner.sorted(inner.parks.clone()))
    }

    async fn neighborhood_by_slug(&self, slug: &str) -> Result<Option<Neighborhood>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner.neighborhoods.iter().find(|n| n.slug == slug).cloned())
    }

    async fn activity_by_slug(&self, slug: &str) -> Result<Option<Activity>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner.activities.iter().find(|a| a.slug == slug).cloned())
    }

    async fn park_by_slug(&self, slug: &str) -> Result<Option<Park>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner.parks.iter().find(|p| p.slug == slug).cloned())
    }

    async fn parks_in_neighborhood(&self, neighborhood_id: i64) -> Result<Vec<Park>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        let parks = inner
            .parks
            .iter()
            .filter(|p| inner.in_neighborhood(p.id, Some(neighborhood_id)))
            .cloned()
            .collect();
        Ok(inner.sorted(parks))
    }

    async fn facility_ids_for_activity(&self, activity_id: i64) -> Result<Vec<i64>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner
            .facility_activities
            .iter()
            .filter(|(_, a)| *a == activity_id)
            .map(|(f, _)| *f)
            .collect())
    }

    async fn parks_with_facilities(
        &self,
        scope: &NeighborhoodScope,
        facility_ids: &[i64],
    ) -> Result<Vec<Park>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;

        let wanted: HashSet<i64> = facility_ids.iter().copied().collect();
        let owning: HashSet<i64> = inner
            .facilities
            .iter()
            .filter(|f| wanted.contains(&f.id))
            .map(|f| f.park_id)
            .collect();
        let neighborhood_id = match scope {
            NeighborhoodScope::All => None,
            NeighborhoodScope::One(n) => Some(n.id),
        };

        let parks = inner
            .parks
            .iter()
            .filter(|p| owning.contains(&p.id) && inner.in_neighborhood(p.id, neighborhood_id))
            .cloned()
            .collect();
        Ok(inner.sorted(parks))
    }

    async fn filter_parks(&self, filter: &ParkFilter) -> Result<Vec<Park>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;

        let neighborhood_id = match &filter.neighborhood {
            Some(slug) => match inner.neighborhoods.iter().find(|n| &n.slug == slug) {
                Some(n) => Some(n.id),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        let parks = inner
            .parks
            .iter()
            .filter(|p| filter.id.map_or(true, |id| p.id == id))
            .filter(|p| filter.name.as_ref().map_or(true, |name| &p.name == name))
            .filter(|p| filter.slug.as_ref().map_or(true, |slug| &p.slug == slug))
            .filter(|p| {
                filter.parktype_id.map_or(true, |id| {
                    p.parktype.as_deref().and_then(|t| inner.parktype_id(t)) == Some(id)
                })
            })
            .filter(|p| {
                filter
                    .parktype
                    .as_ref()
                    .map_or(true, |t| p.parktype.as_ref() == Some(t))
            })
            .filter(|p| neighborhood_id.is_none() || inner.in_neighborhood(p.id, neighborhood_id))
            .cloned()
            .collect();
        Ok(inner.sorted(parks))
    }

    async fn park_activity_slugs(&self, park_id: i64) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;

        let mut slugs = Vec::new();
        for facility in inner.facilities.iter().filter(|f| f.park_id == park_id) {
            let mut activity_ids: Vec<i64> = inner
                .facility_activities
                .iter()
                .filter(|(f, _)| *f == facility.id)
                .map(|(_, a)| *a)
                .collect();
            activity_ids.sort_unstable();
            for id in activity_ids {
                if let Some(activity) = inner.activities.iter().find(|a| a.id == id) {
                    slugs.push(activity.slug.clone());
                }
            }
        }
        Ok(slugs)
    }

    async fn event_by_id(&self, id: i64) -> Result<Option<Event>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner.events.iter().find(|e| e.id == id).cloned())
    }

    async fn story_by_id(&self, id: i64) -> Result<Option<Story>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner.stories.iter().find(|s| s.id == id).cloned())
    }

    async fn stories_for_park(&self, park_id: i64) -> Result<Vec<Story>> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        let mut stories: Vec<Story> = inner
            .stories
            .iter()
            .filter(|s| s.park_id == park_id)
            .cloned()
            .collect();
        stories.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(stories)
    }

    async fn create_story(&self, story: &NewStory) -> Result<Story> {
        let mut inner = self.inner.lock().unwrap();
        inner.check()?;
        let id = inner.stories.len() as i64 + 1;
        let created = Story {
            id,
            park_id: story.park_id,
            title: story.title.clone(),
            text: story.text.clone(),
            email: story.email.clone(),
            date: Utc::now(),
            objectionable_content: false,
        };
        inner.stories.push(created.clone());
        Ok(created)
    }

    async fn set_story_objectionable(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.check()?;
        inner.objectionable_updates += 1;
        if let Some(story) = inner.stories.iter_mut().find(|s| s.id == id) {
            story.objectionable_content = true;
        }
        Ok(())
    }
}
