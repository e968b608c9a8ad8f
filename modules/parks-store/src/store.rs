// ParkStore: every read and write the site makes against the parks database.
//
// PgParkStore is the production implementation (Postgres + PostGIS).
// MockParkStore in `testing` keeps everything in memory so handlers and the
// query layer can be tested without Docker.

use anyhow::Result;
use async_trait::async_trait;

use parks_common::{
    Activity, Event, Facilitytype, Neighborhood, NeighborhoodScope, NewStory, Park, ParkFilter,
    Story,
};

#[async_trait]
pub trait ParkStore: Send + Sync {
    // --- Listings (ordered by name) ---

    async fn neighborhoods(&self) -> Result<Vec<Neighborhood>>;

    async fn activities(&self) -> Result<Vec<Activity>>;

    async fn facilitytypes(&self) -> Result<Vec<Facilitytype>>;

    async fn parks(&self) -> Result<Vec<Park>>;

    // --- Slug lookups ---

    async fn neighborhood_by_slug(&self, slug: &str) -> Result<Option<Neighborhood>>;

    async fn activity_by_slug(&self, slug: &str) -> Result<Option<Activity>>;

    async fn park_by_slug(&self, slug: &str) -> Result<Option<Park>>;

    // --- Relations ---

    /// Parks linked to one neighborhood, ordered by name.
    async fn parks_in_neighborhood(&self, neighborhood_id: i64) -> Result<Vec<Park>>;

    /// Ids of every facility offering the activity.
    async fn facility_ids_for_activity(&self, activity_id: i64) -> Result<Vec<i64>>;

    /// Distinct parks inside `scope` that own at least one of `facility_ids`,
    /// ordered by name. `NeighborhoodScope::All` means "linked to any
    /// neighborhood".
    async fn parks_with_facilities(
        &self,
        scope: &NeighborhoodScope,
        facility_ids: &[i64],
    ) -> Result<Vec<Park>>;

    /// Parks matching every field set on the filter, ordered by name.
    async fn filter_parks(&self, filter: &ParkFilter) -> Result<Vec<Park>>;

    /// Activity slugs of every facility in the park, facility by facility.
    /// An activity offered by two facilities appears twice.
    async fn park_activity_slugs(&self, park_id: i64) -> Result<Vec<String>>;

    // --- Events ---

    async fn event_by_id(&self, id: i64) -> Result<Option<Event>>;

    // --- Stories ---

    async fn story_by_id(&self, id: i64) -> Result<Option<Story>>;

    /// Stories for a park, newest first.
    async fn stories_for_park(&self, park_id: i64) -> Result<Vec<Story>>;

    async fn create_story(&self, story: &NewStory) -> Result<Story>;

    async fn set_story_objectionable(&self, id: i64) -> Result<()>;
}
