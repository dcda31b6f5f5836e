//! Page routes.

use comicmaker_types::EntityId;
use std::fmt;
use std::str::FromStr;

/// A page of the studio.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Materials,
    Works,
    WorkDetail(EntityId),
    /// Episode editor reached from a work
    WorkEpisode {
        work_id: EntityId,
        episode_id: EntityId,
    },
    Episodes,
    EpisodeDetail(EntityId),
    EpisodeEdit(EntityId),
    Styles,
    Tools,
    /// Any path without a page
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("No page at '{0}'")]
    NotFound(String),
}

impl Route {
    /// Resolve a path (optionally with a `#` prefix, query or fragment).
    /// Unknown paths resolve to [`Route::NotFound`].
    pub fn parse(path: &str) -> Route {
        let cleaned = clean(path);
        let segments: Vec<&str> = cleaned.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["materials"] => Route::Materials,
            ["works"] => Route::Works,
            ["works", work] => Route::WorkDetail(decode_id(work)),
            ["works", work, "episodes", episode] => Route::WorkEpisode {
                work_id: decode_id(work),
                episode_id: decode_id(episode),
            },
            ["episodes"] => Route::Episodes,
            ["episodes", episode] => Route::EpisodeDetail(decode_id(episode)),
            ["episodes", episode, "edit"] => Route::EpisodeEdit(decode_id(episode)),
            ["styles"] => Route::Styles,
            ["tools"] => Route::Tools,
            _ => {
                tracing::debug!("No route for {}", path);
                Route::NotFound(format!("/{}", segments.join("/")))
            }
        }
    }

    /// Canonical path of the route.
    pub fn path(&self) -> String {
        let seg = |id: &EntityId| urlencoding::encode(id.as_str()).into_owned();
        match self {
            Route::Home => "/".to_string(),
            Route::Materials => "/materials".to_string(),
            Route::Works => "/works".to_string(),
            Route::WorkDetail(id) => format!("/works/{}", seg(id)),
            Route::WorkEpisode {
                work_id,
                episode_id,
            } => format!("/works/{}/episodes/{}", seg(work_id), seg(episode_id)),
            Route::Episodes => "/episodes".to_string(),
            Route::EpisodeDetail(id) => format!("/episodes/{}", seg(id)),
            Route::EpisodeEdit(id) => format!("/episodes/{}/edit", seg(id)),
            Route::Styles => "/styles".to_string(),
            Route::Tools => "/tools".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Page name shown in navigation.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Materials => "Materials",
            Route::Works => "Works",
            Route::WorkDetail(_) => "Work",
            Route::WorkEpisode { .. } | Route::EpisodeEdit(_) => "Episode editor",
            Route::Episodes => "Episodes",
            Route::EpisodeDetail(_) => "Episode",
            Route::Styles => "Styles",
            Route::Tools => "Tools",
            Route::NotFound(_) => "Not found",
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    /// Strict parse: unknown paths are an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Route::parse(s) {
            Route::NotFound(path) => Err(RouteError::NotFound(path)),
            route => Ok(route),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn decode_id(segment: &str) -> EntityId {
    match urlencoding::decode(segment) {
        Ok(decoded) => EntityId::from(decoded.into_owned()),
        Err(_) => EntityId::from(segment),
    }
}

fn clean(path: &str) -> &str {
    let path = path.trim().trim_start_matches('#');
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}
