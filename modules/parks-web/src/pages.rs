use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use tracing::{debug, info, warn};

use parks_common::geometry::{approximate_area_acres, encode_park_boundary, map_center};
use parks_common::{ParksError, TopNav};
use parks_store::query;

use crate::error::{not_found_response, AppError};
use crate::forms::{ExploreForm, ExploreQuery, FormErrors, SearchForm, StoryForm};
use crate::moderation::{flag_story, FlagOutcome};
use crate::templates::*;
use crate::AppState;

type PageResult = Result<Html<String>, AppError>;

async fn nav(state: &AppState) -> Result<TopNav, ParksError> {
    query::top_nav(state.store.as_ref()).await
}

// --- Static-ish pages ---

pub async fn home(State(state): State<Arc<AppState>>) -> PageResult {
    Ok(Html(render_home(&nav(&state).await?)))
}

pub async fn trip(State(state): State<Arc<AppState>>) -> PageResult {
    Ok(Html(render_trip(&nav(&state).await?)))
}

pub async fn policy(State(state): State<Arc<AppState>>) -> PageResult {
    Ok(Html(render_policy(&nav(&state).await?)))
}

pub async fn not_found(State(state): State<Arc<AppState>>) -> Response {
    match nav(&state).await {
        Ok(nav) => (
            StatusCode::NOT_FOUND,
            Html(render_not_found(&nav)),
        )
            .into_response(),
        Err(_) => not_found_response(),
    }
}

// --- Browsing ---

pub async fn neighborhood(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> PageResult {
    let (neighborhood, parks) = query::neighborhood_parks(state.store.as_ref(), &slug).await?;
    Ok(Html(render_neighborhood(
        &nav(&state).await?,
        &neighborhood,
        &parks,
    )))
}

pub async fn play(State(state): State<Arc<AppState>>) -> PageResult {
    let nav = nav(&state).await?;
    Ok(Html(render_play(
        &nav,
        &nav.activities,
        &nav.neighborhoods,
        None,
    )))
}

pub async fn play_filtered(
    State(state): State<Arc<AppState>>,
    Path((activity_slug, neighborhood_slug)): Path<(String, String)>,
) -> PageResult {
    let store = state.store.as_ref();
    let (activity, scope, parks) =
        query::parks_in_neighborhood_with_activity(store, &neighborhood_slug, &activity_slug)
            .await?;
    let nav = nav(&state).await?;

    let selection = PlaySelection {
        activity: &activity,
        scope: &scope,
        parks: &parks,
    };
    Ok(Html(render_play(
        &nav,
        &nav.activities,
        &nav.neighborhoods,
        Some(&selection),
    )))
}

pub async fn event(
    State(state): State<Arc<AppState>>,
    Path((id, _name)): Path<(String, String)>,
) -> PageResult {
    let event = query::event(state.store.as_ref(), &id).await?;
    Ok(Html(render_event(&nav(&state).await?, &event)))
}

pub async fn explore(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExploreQuery>,
) -> PageResult {
    explore_page(&state, params, None).await
}

pub async fn explore_submit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExploreQuery>,
    form: Result<Form<ExploreForm>, FormRejection>,
) -> PageResult {
    let parkname = form.ok().and_then(|Form(f)| f.parkname);
    explore_page(&state, params, parkname).await
}

async fn explore_page(
    state: &AppState,
    params: ExploreQuery,
    parkname: Option<String>,
) -> PageResult {
    let store = state.store.as_ref();

    let selected = match params.neighborhood.as_deref().filter(|s| !s.is_empty()) {
        Some(slug) => Some(query::neighborhood(store, slug).await?),
        None => None,
    };
    let neighborhoods = store.neighborhoods().await?;
    let parks = store.parks().await?;
    let facilitytypes = store.facilitytypes().await?;

    Ok(Html(render_explore(
        &nav(state).await?,
        &neighborhoods,
        &parks,
        &facilitytypes,
        selected.as_ref(),
        parkname.as_deref(),
    )))
}

// --- Park detail and stories ---

pub async fn park(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> PageResult {
    park_page(&state, &slug, &StoryForm::default(), &FormErrors::new()).await
}

pub async fn park_story(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    form: Result<Form<StoryForm>, FormRejection>,
) -> PageResult {
    let park = query::park(state.store.as_ref(), &slug).await?;
    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => {
            debug!(park = %park.slug, error = %e, "Unreadable story form");
            StoryForm::default()
        }
    };

    match form.validate_for(park.id) {
        Ok(new_story) => {
            let story = state.store.create_story(&new_story).await?;
            info!(story_id = story.id, park = %park.slug, "Story submitted");
            park_page(&state, &slug, &StoryForm::default(), &FormErrors::new()).await
        }
        Err(errors) => {
            debug!(park = %park.slug, fields = errors.len(), "Story rejected");
            park_page(&state, &slug, &form, &errors).await
        }
    }
}

async fn park_page(
    state: &AppState,
    slug: &str,
    form: &StoryForm,
    errors: &FormErrors,
) -> PageResult {
    let store = state.store.as_ref();
    let park = query::park(store, slug).await?;
    let polyline = encode_park_boundary(&park)?;
    let stories = store.stories_for_park(park.id).await?;

    let page = ParkPage {
        park: &park,
        polyline: &polyline,
        center: map_center(&park),
        acres: approximate_area_acres(&park),
        stories: &stories,
        form,
        errors,
    };
    Ok(Html(render_park(&nav(state).await?, &page)))
}

pub async fn story(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> PageResult {
    let story = query::story(state.store.as_ref(), &id).await?;
    Ok(Html(render_story(&nav(&state).await?, &story)))
}

pub async fn story_flag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<&'static str, AppError> {
    let outcome = flag_story(
        state.store.as_ref(),
        state.mailer.as_ref(),
        &state.site_domain,
        &state.admins,
        &id,
    )
    .await?;

    if outcome == FlagOutcome::AlreadyFlagged {
        debug!(story_id = %id, "Story already flagged");
    }
    Ok("")
}

// --- Search ---

pub async fn search(
    State(state): State<Arc<AppState>>,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Response {
    let name = match form {
        Ok(Form(SearchForm { parkname: Some(name) })) if !name.trim().is_empty() => name,
        _ => return found("/"),
    };

    match query::park_by_name(state.store.as_ref(), &name).await {
        Ok(Some(park)) => found(&park.url()),
        Ok(None) => found("/"),
        Err(e) => {
            warn!(error = %e, "Park search failed");
            found("/")
        }
    }
}

pub async fn search_redirect() -> Response {
    found("/")
}

/// 302 Found, as browsers expect after a form post.
fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}
