use parks_common::{
    Activity, Event, Facilitytype, Neighborhood, NeighborhoodScope, Park, Story, TopNav,
};

use crate::forms::{FormErrors, StoryForm};

/// Everything the park detail page shows.
pub struct ParkPage<'a> {
    pub park: &'a Park,
    pub polyline: &'a str,
    pub center: Option<(f64, f64)>,
    pub acres: f64,
    pub stories: &'a [Story],
    pub form: &'a StoryForm,
    pub errors: &'a FormErrors,
}

/// The filtered half of the play page.
pub struct PlaySelection<'a> {
    pub activity: &'a Activity,
    pub scope: &'a NeighborhoodScope,
    pub parks: &'a [Park],
}

/// Render the home page.
pub fn render_home(nav: &TopNav) -> String {
    let content = r#"<div class="container">
    <h2>Find a park</h2>
    <form method="post" action="/search/" class="search-form">
        <input type="text" name="parkname" placeholder="Park name">
        <button type="submit">Go</button>
    </form>
    <p><a href="/play/">Browse by activity</a> &middot; <a href="/explore/">Explore the map</a> &middot; <a href="/trip/">Plan a trip</a></p>
</div>"#;

    build_page("Boston Parks", nav, content)
}

pub fn render_neighborhood(nav: &TopNav, neighborhood: &Neighborhood, parks: &[Park]) -> String {
    let content = format!(
        r#"<div class="container"><h2>Parks in {name}</h2>{list}</div>"#,
        name = html_escape(&neighborhood.name),
        list = park_list(parks, "No parks in this neighborhood yet."),
    );

    build_page(&neighborhood.name, nav, &content)
}

/// Render a park with its map, stories and story form.
pub fn render_park(nav: &TopNav, page: &ParkPage<'_>) -> String {
    let park = page.park;
    let (lat, lon) = page.center.unwrap_or((42.3601, -71.0589));
    let polyline_js = serde_json::to_string(page.polyline).unwrap_or_else(|_| "\"\"".to_string());

    let parktype = park
        .parktype
        .as_deref()
        .map(|t| format!(r#"<span class="badge">{}</span>"#, html_escape(t)))
        .unwrap_or_default();

    let mut stories = String::new();
    if page.stories.is_empty() {
        stories.push_str(r#"<p class="muted">No stories yet. Be the first to share one.</p>"#);
    }
    for story in page.stories {
        stories.push_str(&format!(
            r#"<div class="card">
    <h3><a href="{url}">{title}</a></h3>
    <p class="muted">{date}</p>
    <p>{text}</p>
    <form method="post" action="{url}flag/"><button type="submit" class="link-btn">Flag as objectionable</button></form>
</div>"#,
            url = story.url(),
            title = html_escape(&story.title),
            date = story.date.format("%B %-d, %Y"),
            text = html_escape(&story.text),
        ));
    }

    let content = format!(
        r#"<div class="container">
    <h2>{name} {parktype}</h2>
    <p>{description}</p>
    <p class="muted">About {acres:.2} acres</p>
    <div id="map"></div>
    <h3>Stories</h3>
    {stories}
    <h3>Share a story</h3>
    <form method="post" action="{url}" class="story-form">
        <label>Title <input type="text" name="title" maxlength="100" value="{title}"></label>{title_errors}
        <label>Story <textarea name="text" rows="6">{text}</textarea></label>{text_errors}
        <label>Email (optional) <input type="email" name="email" value="{email}"></label>{email_errors}
        <button type="submit">Submit</button>
    </form>
</div>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script>
function decodePolyline(str) {{
    let index = 0, lat = 0, lng = 0, points = [];
    while (index < str.length) {{
        let b, shift = 0, result = 0;
        do {{ b = str.charCodeAt(index++) - 63; result |= (b & 0x1f) << shift; shift += 5; }} while (b >= 0x20);
        lat += (result & 1) ? ~(result >> 1) : (result >> 1);
        shift = 0; result = 0;
        do {{ b = str.charCodeAt(index++) - 63; result |= (b & 0x1f) << shift; shift += 5; }} while (b >= 0x20);
        lng += (result & 1) ? ~(result >> 1) : (result >> 1);
        points.push([lat / 1e5, lng / 1e5]);
    }}
    return points;
}}
const map = L.map('map').setView([{lat}, {lon}], 15);
L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
    attribution: '&copy; OpenStreetMap contributors',
    maxZoom: 18,
}}).addTo(map);
const boundary = decodePolyline({polyline_js});
if (boundary.length) {{
    const shape = L.polygon(boundary, {{ color: '#2e7d32', weight: 2 }}).addTo(map);
    map.fitBounds(shape.getBounds());
}}
</script>"#,
        name = html_escape(&park.name),
        description = html_escape(&park.description),
        acres = page.acres,
        url = park.url(),
        title = html_escape(&page.form.title),
        text = html_escape(&page.form.text),
        email = html_escape(&page.form.email),
        title_errors = field_errors(page.errors, "title"),
        text_errors = field_errors(page.errors, "text"),
        email_errors = field_errors(page.errors, "email"),
    );

    build_page(&park.name, nav, &content)
}

/// Render the play page, optionally narrowed to one activity and scope.
pub fn render_play(
    nav: &TopNav,
    activities: &[Activity],
    neighborhoods: &[Neighborhood],
    selection: Option<&PlaySelection<'_>>,
) -> String {
    let scope_slug = selection
        .map(|s| s.scope.slug().to_string())
        .unwrap_or_else(|| NeighborhoodScope::ALL_SLUG.to_string());

    let activity_links: String = activities
        .iter()
        .map(|a| {
            let active = selection.is_some_and(|s| s.activity.id == a.id);
            format!(
                r#"<a href="/play/{slug}/{scope}/" class="chip{class}">{name}</a>"#,
                slug = a.slug,
                scope = scope_slug,
                class = if active { " chip-active" } else { "" },
                name = html_escape(&a.name),
            )
        })
        .collect();

    let neighborhood_links: String = neighborhoods
        .iter()
        .map(|n| match selection {
            Some(s) => format!(
                r#"<a href="/play/{activity}/{slug}/" class="chip">{name}</a>"#,
                activity = s.activity.slug,
                slug = n.slug,
                name = html_escape(&n.name),
            ),
            None => format!(
                r#"<a href="{url}" class="chip">{name}</a>"#,
                url = n.url(),
                name = html_escape(&n.name),
            ),
        })
        .collect();

    let results = match selection {
        Some(s) => format!(
            r#"<h3>{activity} in {scope}</h3>{list}"#,
            activity = html_escape(&s.activity.name),
            scope = html_escape(s.scope.label()),
            list = park_list(s.parks, "No parks match."),
        ),
        None => String::new(),
    };

    let content = format!(
        r#"<div class="container">
    <h2>Play</h2>
    <div class="chips">{activity_links}</div>
    <div class="chips">{neighborhood_links}</div>
    {results}
</div>"#
    );

    build_page("Play", nav, &content)
}

pub fn render_event(nav: &TopNav, event: &Event) -> String {
    let when = match (event.starts_at, event.ends_at) {
        (Some(start), Some(end)) => format!(
            "{} to {}",
            start.format("%B %-d, %Y %-I:%M %p"),
            end.format("%B %-d, %Y %-I:%M %p")
        ),
        (Some(start), None) => start.format("%B %-d, %Y %-I:%M %p").to_string(),
        _ => String::new(),
    };

    let content = format!(
        r#"<div class="container"><h2>{name}</h2><p class="muted">{when}</p><p>{description}</p></div>"#,
        name = html_escape(&event.name),
        description = html_escape(&event.description),
    );

    build_page(&event.name, nav, &content)
}

/// Render the explore page.
pub fn render_explore(
    nav: &TopNav,
    neighborhoods: &[Neighborhood],
    parks: &[Park],
    facilitytypes: &[Facilitytype],
    selected: Option<&Neighborhood>,
    parkname: Option<&str>,
) -> String {
    let neighborhood_options: String = neighborhoods
        .iter()
        .map(|n| {
            let is_selected = selected.is_some_and(|s| s.id == n.id);
            format!(
                r#"<option value="{slug}"{sel}>{name}</option>"#,
                slug = n.slug,
                sel = if is_selected { " selected" } else { "" },
                name = html_escape(&n.name),
            )
        })
        .collect();

    let park_options: String = parks
        .iter()
        .map(|p| format!(r#"<option value="{}">"#, html_escape(&p.name)))
        .collect();

    let facility_checks: String = facilitytypes
        .iter()
        .map(|f| {
            format!(
                r#"<label class="chip"><input type="checkbox" name="facilitytype" value="{id}"> {name}</label>"#,
                id = f.id,
                name = html_escape(&f.name),
            )
        })
        .collect();

    let content = format!(
        r#"<div class="container">
    <h2>Explore</h2>
    <form method="post" action="/explore/">
        <select name="neighborhood"><option value="">All neighborhoods</option>{neighborhood_options}</select>
        <input type="text" name="parkname" list="parknames" value="{parkname}" placeholder="Park name">
        <datalist id="parknames">{park_options}</datalist>
        <div class="chips">{facility_checks}</div>
        <button type="submit">Explore</button>
    </form>
    <div id="map"></div>
</div>"#,
        parkname = html_escape(parkname.unwrap_or_default()),
    );

    build_page("Explore", nav, &content)
}

pub fn render_trip(nav: &TopNav) -> String {
    let content = r#"<div class="container">
    <h2>Plan a trip</h2>
    <p>Pick a starting point and a park to see how to get there by foot, bike or transit.</p>
    <form class="trip-form">
        <input type="text" name="from" placeholder="Starting address">
        <input type="text" name="to" placeholder="Park name">
        <button type="submit">Plan</button>
    </form>
    <div id="map"></div>
</div>"#;

    build_page("Plan a trip", nav, content)
}

pub fn render_story(nav: &TopNav, story: &Story) -> String {
    let content = format!(
        r#"<div class="container">
    <h2>{title}</h2>
    <p class="muted">{date}</p>
    <p>{text}</p>
    <form method="post" action="{url}flag/"><button type="submit" class="link-btn">Flag as objectionable</button></form>
</div>"#,
        title = html_escape(&story.title),
        date = story.date.format("%B %-d, %Y"),
        text = html_escape(&story.text),
        url = story.url(),
    );

    build_page(&story.title, nav, &content)
}

pub fn render_policy(nav: &TopNav) -> String {
    let content = r#"<div class="container">
    <h2>Story policy</h2>
    <p>Stories are shared publicly on the park page they were written for. Do not post personal information about other people.</p>
    <p>Anyone can flag a story as objectionable. Flagged stories are reviewed by site administrators and may be removed.</p>
    <p>Email addresses given with a story are only used to contact the author and are never displayed.</p>
</div>"#;

    build_page("Policy", nav, content)
}

pub fn render_not_found(nav: &TopNav) -> String {
    let content = r#"<div class="container"><h2>Page not found</h2><p><a href="/">Back to the home page</a></p></div>"#;
    build_page("Not found", nav, content)
}

pub fn render_error() -> String {
    let content = r#"<div class="container"><h2>Something went wrong</h2><p>Please try again later.</p></div>"#;
    build_page("Error", &TopNav::default(), content)
}

// --- Helpers ---

fn park_list(parks: &[Park], empty: &str) -> String {
    if parks.is_empty() {
        return format!(r#"<p class="muted">{}</p>"#, html_escape(empty));
    }

    let items: String = parks
        .iter()
        .map(|p| {
            format!(
                r#"<li><a href="{url}">{name}</a></li>"#,
                url = p.url(),
                name = html_escape(&p.name),
            )
        })
        .collect();
    format!(r#"<ul class="park-list">{items}</ul>"#)
}

fn field_errors(errors: &FormErrors, field: &str) -> String {
    errors
        .get(field)
        .map(|messages| {
            messages
                .iter()
                .map(|m| format!(r#"<p class="error">{}</p>"#, html_escape(m)))
                .collect()
        })
        .unwrap_or_default()
}

fn build_page(title: &str, nav: &TopNav, content: &str) -> String {
    let neighborhood_links: String = nav
        .neighborhoods
        .iter()
        .map(|n| format!(r#"<a href="{}">{}</a>"#, n.url(), html_escape(&n.name)))
        .collect();
    let activity_links: String = nav
        .activities
        .iter()
        .map(|a| {
            format!(
                r#"<a href="/play/{}/all/">{}</a>"#,
                a.slug,
                html_escape(&a.name)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Boston Parks</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.header{{background:#2e7d32;color:#fff;padding:12px 24px;display:flex;align-items:center;justify-content:space-between;}}
.header h1{{font-size:18px;font-weight:600;}}
.header h1 a{{color:#fff;text-decoration:none;}}
.header nav a{{color:#e8f5e9;text-decoration:none;margin-left:20px;font-size:14px;}}
.menu{{position:relative;display:inline-block;margin-left:20px;font-size:14px;}}
.menu-items{{display:none;position:absolute;background:#fff;border:1px solid #ddd;padding:8px;z-index:1000;min-width:200px;}}
.menu:hover .menu-items{{display:block;}}
.menu-items a{{display:block;color:#1a1a1a;margin:4px 0;}}
.container{{max-width:960px;margin:0 auto;padding:24px;}}
.container h2{{margin-bottom:16px;}}
.container h3{{margin:20px 0 8px;}}
#map{{height:420px;border-radius:8px;margin:16px 0;border:1px solid #ddd;}}
.card{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:16px;margin-bottom:12px;}}
.muted{{color:#888;font-size:13px;}}
.badge{{display:inline-block;padding:2px 8px;border-radius:12px;font-size:11px;font-weight:600;background:#e8f5e9;color:#2e7d32;}}
.chips{{display:flex;gap:6px;flex-wrap:wrap;margin-bottom:12px;}}
.chip{{background:#f0f0f0;padding:4px 10px;border-radius:12px;font-size:13px;color:#333;text-decoration:none;}}
.chip-active{{background:#2e7d32;color:#fff;}}
.park-list li{{margin:4px 0 4px 20px;}}
.story-form label{{display:block;margin:8px 0;}}
.story-form input,.story-form textarea{{display:block;width:100%;padding:6px;}}
.error{{color:#c62828;font-size:13px;}}
.link-btn{{background:none;border:none;color:#c62828;cursor:pointer;font-size:12px;}}
</style>
</head>
<body>
<div class="header">
    <h1><a href="/">Boston Parks</a></h1>
    <nav>
        <span class="menu">Neighborhoods<span class="menu-items">{neighborhood_links}</span></span>
        <span class="menu">Activities<span class="menu-items">{activity_links}</span></span>
        <a href="/explore/">Explore</a><a href="/policy/">Policy</a>
    </nav>
</div>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<b>"Tom's" & co</b>"#),
            "&lt;b&gt;&quot;Tom&#39;s&quot; &amp; co&lt;/b&gt;"
        );
    }

    #[test]
    fn page_carries_nav_links() {
        let nav = TopNav {
            neighborhoods: vec![Neighborhood {
                id: 1,
                name: "Dorchester".into(),
                slug: "dorchester".into(),
            }],
            activities: vec![Activity {
                id: 1,
                name: "Tennis".into(),
                slug: "tennis".into(),
            }],
        };
        let html = render_home(&nav);
        assert!(html.contains(r#"href="/neighborhood/dorchester/""#));
        assert!(html.contains(r#"href="/play/tennis/all/""#));
    }

    #[test]
    fn form_errors_render_per_field() {
        let mut errors = FormErrors::new();
        errors.insert("title".into(), vec!["Too long".into()]);
        assert_eq!(field_errors(&errors, "title"), r#"<p class="error">Too long</p>"#);
        assert_eq!(field_errors(&errors, "text"), "");
    }
}
