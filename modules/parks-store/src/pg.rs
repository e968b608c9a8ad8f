use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use parks_common::geometry::parse_boundary;
use parks_common::{
    Activity, Event, Facilitytype, Neighborhood, NeighborhoodScope, NewStory, Park, ParkFilter,
    Story,
};

use crate::store::ParkStore;

/// Columns every park query selects. Boundaries are reprojected to WGS84 for
/// the map; area stays in the stored projection's units.
const PARK_SELECT: &str = r#"
    SELECT p.id, p.name, p.slug, p.description, pt.name AS parktype,
           ST_AsGeoJSON(ST_Transform(p.geometry, 4326)) AS boundary,
           ST_Area(p.geometry) AS area
    FROM parks p
    LEFT JOIN parktypes pt ON pt.id = p.parktype_id
"#;

const STORY_COLUMNS: &str = "id, park_id, title, text, email, date, objectionable_content";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct ParkRow {
    id: i64,
    name: String,
    slug: String,
    description: String,
    parktype: Option<String>,
    boundary: String,
    area: f64,
}

impl ParkRow {
    fn into_park(self) -> Result<Park> {
        Ok(Park {
            boundary: parse_boundary(&self.boundary)?,
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            parktype: self.parktype,
            area: self.area,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StoryRow {
    id: i64,
    park_id: i64,
    title: String,
    text: String,
    email: Option<String>,
    date: DateTime<Utc>,
    objectionable_content: bool,
}

impl From<StoryRow> for Story {
    fn from(row: StoryRow) -> Self {
        Story {
            id: row.id,
            park_id: row.park_id,
            title: row.title,
            text: row.text,
            email: row.email,
            date: row.date,
            objectionable_content: row.objectionable_content,
        }
    }
}

type EventRow = (
    i64,
    String,
    String,
    Option<DateTime<Utc>>,
    Option<DateTime<Utc>>,
    Option<i64>,
);

fn into_parks(rows: Vec<ParkRow>) -> Result<Vec<Park>> {
    rows.into_iter().map(ParkRow::into_park).collect()
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgParkStore {
    pool: PgPool,
}

impl PgParkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!(max_connections, "Connected to database");
        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_parks(&self, mut query: QueryBuilder<'_, Postgres>) -> Result<Vec<Park>> {
        query.push(" ORDER BY p.name");
        let rows = query
            .build_query_as::<ParkRow>()
            .fetch_all(&self.pool)
            .await?;
        into_parks(rows)
    }
}

#[async_trait]
impl ParkStore for PgParkStore {
    async fn neighborhoods(&self) -> Result<Vec<Neighborhood>> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, name, slug FROM neighborhoods ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, slug)| Neighborhood { id, name, slug })
            .collect())
    }

    async fn activities(&self) -> Result<Vec<Activity>> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, name, slug FROM activities ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, slug)| Activity { id, name, slug })
            .collect())
    }

    async fn facilitytypes(&self) -> Result<Vec<Facilitytype>> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, name FROM facilitytypes ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Facilitytype { id, name })
            .collect())
    }

    async fn parks(&self) -> Result<Vec<Park>> {
        self.fetch_parks(QueryBuilder::new(PARK_SELECT)).await
    }

    async fn neighborhood_by_slug(&self, slug: &str) -> Result<Option<Neighborhood>> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, name, slug FROM neighborhoods WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, slug)| Neighborhood { id, name, slug }))
    }

    async fn activity_by_slug(&self, slug: &str) -> Result<Option<Activity>> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, name, slug FROM activities WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, slug)| Activity { id, name, slug }))
    }

    async fn park_by_slug(&self, slug: &str) -> Result<Option<Park>> {
        let mut query = QueryBuilder::<Postgres>::new(PARK_SELECT);
        query.push(" WHERE p.slug = ").push_bind(slug.to_string());

        let row = query
            .build_query_as::<ParkRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(ParkRow::into_park).transpose()
    }

    async fn parks_in_neighborhood(&self, neighborhood_id: i64) -> Result<Vec<Park>> {
        let mut query = QueryBuilder::<Postgres>::new(PARK_SELECT);
        query
            .push(
                " WHERE EXISTS (SELECT 1 FROM park_neighborhoods pn \
                 WHERE pn.park_id = p.id AND pn.neighborhood_id = ",
            )
            .push_bind(neighborhood_id)
            .push(")");

        self.fetch_parks(query).await
    }

    async fn facility_ids_for_activity(&self, activity_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT facility_id FROM facility_activities WHERE activity_id = $1 ORDER BY facility_id",
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn parks_with_facilities(
        &self,
        scope: &NeighborhoodScope,
        facility_ids: &[i64],
    ) -> Result<Vec<Park>> {
        if facility_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Postgres>::new(PARK_SELECT);
        query.push(" WHERE EXISTS (SELECT 1 FROM park_neighborhoods pn WHERE pn.park_id = p.id");
        if let NeighborhoodScope::One(neighborhood) = scope {
            query
                .push(" AND pn.neighborhood_id = ")
                .push_bind(neighborhood.id);
        }
        query
            .push(") AND EXISTS (SELECT 1 FROM facilities f WHERE f.park_id = p.id AND f.id = ANY(")
            .push_bind(facility_ids.to_vec())
            .push("))");

        self.fetch_parks(query).await
    }

    async fn filter_parks(&self, filter: &ParkFilter) -> Result<Vec<Park>> {
        let mut query = QueryBuilder::<Postgres>::new(PARK_SELECT);
        query.push(" WHERE TRUE");

        if let Some(id) = filter.id {
            query.push(" AND p.id = ").push_bind(id);
        }
        if let Some(name) = &filter.name {
            query.push(" AND p.name = ").push_bind(name.clone());
        }
        if let Some(slug) = &filter.slug {
            query.push(" AND p.slug = ").push_bind(slug.clone());
        }
        if let Some(parktype_id) = filter.parktype_id {
            query.push(" AND p.parktype_id = ").push_bind(parktype_id);
        }
        if let Some(parktype) = &filter.parktype {
            query.push(" AND pt.name = ").push_bind(parktype.clone());
        }
        if let Some(neighborhood) = &filter.neighborhood {
            query
                .push(
                    " AND EXISTS (SELECT 1 FROM park_neighborhoods pn \
                     JOIN neighborhoods n ON n.id = pn.neighborhood_id \
                     WHERE pn.park_id = p.id AND n.slug = ",
                )
                .push_bind(neighborhood.clone())
                .push(")");
        }

        self.fetch_parks(query).await
    }

    async fn park_activity_slugs(&self, park_id: i64) -> Result<Vec<String>> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT a.slug
            FROM facilities f
            JOIN facility_activities fa ON fa.facility_id = f.id
            JOIN activities a ON a.id = fa.activity_id
            WHERE f.park_id = $1
            ORDER BY f.id, a.id
            "#,
        )
        .bind(park_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs)
    }

    async fn event_by_id(&self, id: i64) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT id, name, description, starts_at, ends_at, park_id FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(id, name, description, starts_at, ends_at, park_id)| Event {
                id,
                name,
                description,
                starts_at,
                ends_at,
                park_id,
            },
        ))
    }

    async fn story_by_id(&self, id: i64) -> Result<Option<Story>> {
        let row = sqlx::query_as::<_, StoryRow>(&format!(
            "SELECT {STORY_COLUMNS} FROM stories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Story::from))
    }

    async fn stories_for_park(&self, park_id: i64) -> Result<Vec<Story>> {
        let rows = sqlx::query_as::<_, StoryRow>(&format!(
            "SELECT {STORY_COLUMNS} FROM stories WHERE park_id = $1 ORDER BY date DESC, id DESC"
        ))
        .bind(park_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Story::from).collect())
    }

    async fn create_story(&self, story: &NewStory) -> Result<Story> {
        let row = sqlx::query_as::<_, StoryRow>(&format!(
            "INSERT INTO stories (park_id, title, text, email) VALUES ($1, $2, $3, $4) \
             RETURNING {STORY_COLUMNS}"
        ))
        .bind(story.park_id)
        .bind(&story.title)
        .bind(&story.text)
        .bind(&story.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn set_story_objectionable(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE stories SET objectionable_content = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
