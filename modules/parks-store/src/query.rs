//! Request-level queries: request parameters in, entities out.
//!
//! Lookups by slug or id that miss return `ParksError::NotFound`; handlers
//! decide whether that becomes a 404, an empty JSON object or a redirect.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use parks_common::{
    slugify, Activity, ActivitySlug, Event, Neighborhood, NeighborhoodScope, Park, ParkFilter,
    ParkSummary, ParksError, Story, TopNav,
};

use crate::store::ParkStore;

/// Neighborhoods and activities for the navigation bar.
pub async fn top_nav(store: &dyn ParkStore) -> Result<TopNav, ParksError> {
    Ok(TopNav {
        neighborhoods: store.neighborhoods().await?,
        activities: store.activities().await?,
    })
}

/// Park search over whitelisted fields, as a map of park name to detail URL.
///
/// Returns `None` for a rejected filter or a failed query; callers answer
/// that with an empty "no content" response rather than an error.
pub async fn filter_parks(
    store: &dyn ParkStore,
    params: &HashMap<String, String>,
) -> Option<BTreeMap<String, String>> {
    let filter = match ParkFilter::from_params(params) {
        Ok(filter) => filter,
        Err(e) => {
            debug!(error = %e, "Rejected park filter");
            return None;
        }
    };

    match store.filter_parks(&filter).await {
        Ok(parks) => Some(parks.into_iter().map(|p| (p.name.clone(), p.url())).collect()),
        Err(e) => {
            warn!(error = %e, "Park filter query failed");
            None
        }
    }
}

/// Parks within a neighborhood (or every neighborhood for `"all"`) that have
/// at least one facility offering the activity, with the resolved activity
/// and scope.
pub async fn parks_in_neighborhood_with_activity(
    store: &dyn ParkStore,
    neighborhood_slug: &str,
    activity_slug: &str,
) -> Result<(Activity, NeighborhoodScope, Vec<Park>), ParksError> {
    let activity = activity(store, activity_slug).await?;
    let facility_ids = store.facility_ids_for_activity(activity.id).await?;

    let scope = if neighborhood_slug == NeighborhoodScope::ALL_SLUG {
        NeighborhoodScope::All
    } else {
        NeighborhoodScope::One(neighborhood(store, neighborhood_slug).await?)
    };

    let parks = store.parks_with_facilities(&scope, &facility_ids).await?;
    Ok((activity, scope, parks))
}

/// JSON summaries for the neighborhood/activity feed.
pub async fn park_summaries(
    store: &dyn ParkStore,
    parks: &[Park],
) -> Result<Vec<ParkSummary>, ParksError> {
    let mut summaries = Vec::with_capacity(parks.len());
    for park in parks {
        let activity = store
            .park_activity_slugs(park.id)
            .await?
            .into_iter()
            .map(|slug| ActivitySlug { slug })
            .collect();

        summaries.push(ParkSummary {
            activity,
            name: park.name.clone(),
            slug: park.slug.clone(),
            description: park.description.clone(),
        });
    }
    Ok(summaries)
}

/// A neighborhood and the parks inside it.
pub async fn neighborhood_parks(
    store: &dyn ParkStore,
    slug: &str,
) -> Result<(Neighborhood, Vec<Park>), ParksError> {
    let neighborhood = neighborhood(store, slug).await?;
    let parks = store.parks_in_neighborhood(neighborhood.id).await?;
    Ok((neighborhood, parks))
}

/// Look a park up by its display name, via its slug.
pub async fn park_by_name(store: &dyn ParkStore, name: &str) -> Result<Option<Park>, ParksError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Ok(None);
    }
    Ok(store.park_by_slug(&slug).await?)
}

// --- Required lookups ---

pub async fn park(store: &dyn ParkStore, slug: &str) -> Result<Park, ParksError> {
    store
        .park_by_slug(slug)
        .await?
        .ok_or_else(|| ParksError::not_found("park", slug))
}

pub async fn neighborhood(store: &dyn ParkStore, slug: &str) -> Result<Neighborhood, ParksError> {
    store
        .neighborhood_by_slug(slug)
        .await?
        .ok_or_else(|| ParksError::not_found("neighborhood", slug))
}

pub async fn activity(store: &dyn ParkStore, slug: &str) -> Result<Activity, ParksError> {
    store
        .activity_by_slug(slug)
        .await?
        .ok_or_else(|| ParksError::not_found("activity", slug))
}

pub async fn event(store: &dyn ParkStore, id: &str) -> Result<Event, ParksError> {
    let numeric = parse_id(id).ok_or_else(|| ParksError::not_found("event", id))?;
    store
        .event_by_id(numeric)
        .await?
        .ok_or_else(|| ParksError::not_found("event", id))
}

pub async fn story(store: &dyn ParkStore, id: &str) -> Result<Story, ParksError> {
    let numeric = parse_id(id).ok_or_else(|| ParksError::not_found("story", id))?;
    store
        .story_by_id(numeric)
        .await?
        .ok_or_else(|| ParksError::not_found("story", id))
}

/// Ids in URLs are plain decimal digits; anything else cannot match a row.
fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_park, MockParkStore};

    /// Three neighborhoods, tennis and swimming spread across four parks.
    fn fixture() -> MockParkStore {
        MockParkStore::new()
            .with_neighborhood("Dorchester", "dorchester")
            .with_neighborhood("Jamaica Plain", "jamaica-plain")
            .with_neighborhood("Roxbury", "roxbury")
            .with_activity("Tennis", "tennis")
            .with_activity("Swimming", "swimming")
            .with_activity("Sledding", "sledding")
            .with_park(sample_park("Franklin Park", "franklin-park"), &["dorchester", "jamaica-plain"])
            .with_park(sample_park("Ronan Park", "ronan-park"), &["dorchester"])
            .with_park(sample_park("Jamaica Pond", "jamaica-pond"), &["jamaica-plain"])
            .with_park(sample_park("Orphan Lot", "orphan-lot"), &[])
            .with_facility("franklin-park", "Tennis Courts", &["tennis"])
            .with_facility("franklin-park", "Pool", &["swimming", "tennis"])
            .with_facility("ronan-park", "Courts", &["tennis"])
            .with_facility("jamaica-pond", "Boathouse", &["swimming"])
            .with_facility("orphan-lot", "Net", &["tennis"])
    }

    fn names(parks: &[Park]) -> Vec<&str> {
        parks.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn neighborhood_scope_intersects_with_activity() {
        let store = fixture();
        let (activity, scope, parks) =
            parks_in_neighborhood_with_activity(&store, "dorchester", "tennis")
                .await
                .unwrap();

        assert_eq!(activity.slug, "tennis");
        assert_eq!(scope.slug(), "dorchester");
        assert_eq!(names(&parks), vec!["Franklin Park", "Ronan Park"]);
    }

    #[tokio::test]
    async fn neighborhood_without_matching_facilities_is_empty() {
        let store = fixture();
        let (_, _, parks) = parks_in_neighborhood_with_activity(&store, "roxbury", "tennis")
            .await
            .unwrap();
        assert!(parks.is_empty());
    }

    #[tokio::test]
    async fn all_scope_is_union_over_neighborhoods() {
        let store = fixture();
        let (_, scope, parks) = parks_in_neighborhood_with_activity(&store, "all", "tennis")
            .await
            .unwrap();

        assert_eq!(scope, NeighborhoodScope::All);
        // Franklin Park has two tennis facilities and two neighborhoods but
        // appears once; the orphan lot belongs to no neighborhood.
        assert_eq!(names(&parks), vec!["Franklin Park", "Ronan Park"]);

        let mut union = Vec::new();
        for slug in ["dorchester", "jamaica-plain", "roxbury"] {
            let (_, _, parks) = parks_in_neighborhood_with_activity(&store, slug, "tennis")
                .await
                .unwrap();
            for park in parks {
                if !union.contains(&park.name) {
                    union.push(park.name);
                }
            }
        }
        union.sort();
        assert_eq!(union, vec!["Franklin Park", "Ronan Park"]);
    }

    #[tokio::test]
    async fn activity_without_facilities_yields_no_parks() {
        let store = fixture();
        let (_, _, parks) = parks_in_neighborhood_with_activity(&store, "all", "sledding")
            .await
            .unwrap();
        assert!(parks.is_empty());
    }

    #[tokio::test]
    async fn unknown_activity_is_not_found() {
        let store = fixture();
        let err = parks_in_neighborhood_with_activity(&store, "dorchester", "curling")
            .await
            .unwrap_err();
        assert!(matches!(err, ParksError::NotFound { entity: "activity", .. }));
    }

    #[tokio::test]
    async fn unknown_neighborhood_is_not_found() {
        let store = fixture();
        let err = parks_in_neighborhood_with_activity(&store, "atlantis", "tennis")
            .await
            .unwrap_err();
        assert!(matches!(err, ParksError::NotFound { entity: "neighborhood", .. }));
    }

    #[tokio::test]
    async fn summaries_list_activity_slugs_per_facility() {
        let store = fixture();
        let park = park(&store, "franklin-park").await.unwrap();
        let summaries = park_summaries(&store, &[park]).await.unwrap();

        let slugs: Vec<&str> = summaries[0].activity.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["tennis", "tennis", "swimming"]);
        assert_eq!(summaries[0].slug, "franklin-park");
        assert_eq!(summaries[0].description, "Franklin Park description");
    }

    #[tokio::test]
    async fn filter_maps_names_to_urls() {
        let store = fixture();
        let params = HashMap::from([("neighborhood".to_string(), "dorchester".to_string())]);

        let links = filter_parks(&store, &params).await.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links["Franklin Park"], "/park/franklin-park/");
        assert_eq!(links["Ronan Park"], "/park/ronan-park/");
    }

    #[tokio::test]
    async fn filter_without_params_lists_every_park() {
        let store = fixture();
        let links = filter_parks(&store, &HashMap::new()).await.unwrap();
        assert_eq!(links.len(), 4);
    }

    #[tokio::test]
    async fn filter_with_unknown_field_is_none() {
        let store = fixture();
        let params = HashMap::from([("geometry".to_string(), "x".to_string())]);
        assert!(filter_parks(&store, &params).await.is_none());
    }

    #[tokio::test]
    async fn filter_with_failing_store_is_none() {
        let store = fixture().failing_reads();
        assert!(filter_parks(&store, &HashMap::new()).await.is_none());
    }

    #[tokio::test]
    async fn park_by_name_goes_through_slug() {
        let store = fixture();
        let found = park_by_name(&store, "  Franklin   PARK ").await.unwrap();
        assert_eq!(found.map(|p| p.slug), Some("franklin-park".to_string()));

        assert!(park_by_name(&store, "Nonexistent Place").await.unwrap().is_none());
        assert!(park_by_name(&store, "???").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn neighborhood_parks_lists_members() {
        let store = fixture();
        let (neighborhood, parks) = neighborhood_parks(&store, "jamaica-plain").await.unwrap();
        assert_eq!(neighborhood.name, "Jamaica Plain");
        assert_eq!(names(&parks), vec!["Franklin Park", "Jamaica Pond"]);
    }

    #[tokio::test]
    async fn non_numeric_ids_are_not_found() {
        let store = fixture();
        assert!(story(&store, "abc").await.unwrap_err().is_not_found());
        assert!(event(&store, "-1").await.unwrap_err().is_not_found());
        assert!(story(&store, "99").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn top_nav_is_sorted_by_name() {
        let store = fixture();
        let nav = top_nav(&store).await.unwrap();
        let activities: Vec<&str> = nav.activities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(activities, vec!["Sledding", "Swimming", "Tennis"]);
        assert_eq!(nav.neighborhoods.len(), 3);
    }
}
