//! Merging of AlloCiné and TMDB records into [`NormalizedMetadata`].
//!
//! Everything here is a pure function of its inputs. AlloCiné is the
//! authoritative source: descriptive fields come only from it, TMDB only
//! fills fields AlloCiné never provides (tagline, studios, collection) and
//! contributes artwork ranked after AlloCiné's own.

use std::collections::BTreeMap;

use crate::metadata::record::{
    activity, media_type, CastEntry, EnrichmentRecord, Fanart, MovieRecord, NormalizedMetadata,
    Rating, VideoInfo, ALLOCINE_NAMESPACE, IMDB_NAMESPACE, TMDB_NAMESPACE,
};

/// Size token of full-resolution TMDB images.
const TMDB_ORIGINAL_SIZE: &str = "original";
/// Size token of TMDB backdrop previews.
const TMDB_PREVIEW_SIZE: &str = "w780";

/// Which parts of the enrichment record are merged.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Merge text fields and identifiers.
    pub tmdb_data: bool,
    /// Merge posters and backdrops.
    pub tmdb_artwork: bool,
    /// TMDB image URL prefix, e.g. `https://image.tmdb.org/t/p`.
    pub image_base_url: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            tmdb_data: true,
            tmdb_artwork: true,
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
        }
    }
}

/// Merge a movie with its optional enrichment and resolved trailer URL.
pub fn merge(
    movie: &MovieRecord,
    enrichment: Option<&EnrichmentRecord>,
    trailer: Option<String>,
    options: &MergeOptions,
) -> NormalizedMetadata {
    let data = enrichment.filter(|_| options.tmdb_data);
    let artwork = enrichment.filter(|_| options.tmdb_artwork);

    NormalizedMetadata {
        info: video_info(movie, data, trailer),
        cast: cast(movie),
        posters: posters(movie, artwork, &options.image_base_url),
        fanart: fanart(movie, artwork, &options.image_base_url),
        unique_ids: unique_ids(movie, data),
        default_id: ALLOCINE_NAMESPACE.to_string(),
        rating: rating(movie),
    }
}

fn video_info(
    movie: &MovieRecord,
    enrichment: Option<&EnrichmentRecord>,
    trailer: Option<String>,
) -> VideoInfo {
    VideoInfo {
        title: movie.title.clone(),
        original_title: movie.original_title.clone(),
        top250: movie.statistics.rank.and_then(top250),
        plot_outline: movie.synopsis_short.clone(),
        plot: movie.synopsis.clone(),
        duration: movie.runtime_secs.and_then(runtime_minutes),
        mpaa: movie.certification.clone(),
        genre: movie.genres.iter().map(|g| capitalize(g)).collect(),
        country: movie.countries.clone(),
        tag: movie.tags.iter().map(|t| capitalize(t)).collect(),
        credits: names_with_activity(movie, &[activity::SCREENWRITER, activity::WRITER]),
        director: names_with_activity(movie, &[activity::DIRECTOR]),
        premiered: movie.release_date.clone(),
        year: movie.production_year,
        trailer,
        tagline: enrichment.and_then(|e| e.tagline.clone()),
        studio: enrichment.map(|e| e.studios.clone()).unwrap_or_default(),
        set: enrichment.and_then(|e| e.collection.clone()),
    }
}

/// Chart rank reported as `top250`, kept from rank 250 on. 0 means unranked.
pub fn top250(rank: u32) -> Option<u32> {
    (rank >= 250).then_some(rank)
}

/// Seconds to minutes, rounding halves to even. A zero runtime is unknown.
pub fn runtime_minutes(secs: u64) -> Option<u64> {
    if secs == 0 {
        return None;
    }
    Some((secs as f64 / 60.0).round_ties_even() as u64)
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn names_with_activity(movie: &MovieRecord, codes: &[u64]) -> Vec<String> {
    movie
        .credits
        .iter()
        .filter(|c| c.activity.is_some_and(|a| codes.contains(&a)))
        .filter_map(|c| c.name.clone())
        .collect()
}

/// Actors in credit order.
pub fn cast(movie: &MovieRecord) -> Vec<CastEntry> {
    movie
        .credits
        .iter()
        .filter(|c| c.activity == Some(activity::ACTOR))
        .filter_map(|c| {
            Some(CastEntry {
                name: c.name.clone()?,
                role: c.role.clone(),
                thumbnail: c.thumbnail.clone(),
            })
        })
        .collect()
}

/// Portrait images at least 400 pixels wide.
pub fn is_valid_poster(width: Option<u32>, height: Option<u32>) -> bool {
    match (width, height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => 400 <= w && w <= h,
        _ => false,
    }
}

/// HD 16:9 landscape images.
pub fn is_valid_fanart(width: Option<u32>, height: Option<u32>) -> bool {
    match (width, height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => {
            // two-decimal rounding of the exact quotient, so 1.775 gives 1.77
            let ratio = format!("{:.2}", f64::from(w) / f64::from(h));
            720 <= h && h < w && w >= 1280 && ratio == "1.78"
        }
        _ => false,
    }
}

fn tmdb_image_url(base: &str, size: &str, file_path: &str) -> String {
    format!("{}/{}{}", base.trim_end_matches('/'), size, file_path)
}

/// AlloCiné posters first (the main poster leading), then TMDB posters.
pub fn posters(
    movie: &MovieRecord,
    enrichment: Option<&EnrichmentRecord>,
    image_base_url: &str,
) -> Vec<String> {
    let mut posters: Vec<String> = Vec::new();
    for media in movie
        .media
        .iter()
        .filter(|m| m.kind == Some(media_type::POSTER))
        .filter(|m| is_valid_poster(m.width, m.height))
    {
        let Some(url) = media.url.clone() else {
            continue;
        };
        if movie.main_poster.as_deref() == Some(url.as_str()) {
            posters.insert(0, url);
        } else {
            posters.push(url);
        }
    }

    if let Some(enrichment) = enrichment {
        posters.extend(
            enrichment
                .posters
                .iter()
                .map(|p| tmdb_image_url(image_base_url, TMDB_ORIGINAL_SIZE, &p.file_path)),
        );
    }

    posters
}

/// Preview of an AlloCiné picture, resized to 780 pixels wide.
pub fn fanart_preview(url: &str) -> String {
    url.replace("/pictures/", "/r_780_0/pictures/")
}

/// AlloCiné HD fanarts, then TMDB backdrops.
pub fn fanart(
    movie: &MovieRecord,
    enrichment: Option<&EnrichmentRecord>,
    image_base_url: &str,
) -> Vec<Fanart> {
    let mut fanart: Vec<Fanart> = movie
        .media
        .iter()
        .filter(|m| m.kind == Some(media_type::FANART))
        .filter(|m| is_valid_fanart(m.width, m.height))
        .filter_map(|m| m.url.as_deref())
        .map(|url| Fanart {
            image: url.to_string(),
            preview: fanart_preview(url),
        })
        .collect();

    if let Some(enrichment) = enrichment {
        fanart.extend(enrichment.backdrops.iter().map(|b| Fanart {
            image: tmdb_image_url(image_base_url, TMDB_ORIGINAL_SIZE, &b.file_path),
            preview: tmdb_image_url(image_base_url, TMDB_PREVIEW_SIZE, &b.file_path),
        }));
    }

    fanart
}

pub fn unique_ids(
    movie: &MovieRecord,
    enrichment: Option<&EnrichmentRecord>,
) -> BTreeMap<String, String> {
    let mut ids = BTreeMap::new();
    ids.insert(ALLOCINE_NAMESPACE.to_string(), movie.code.to_string());
    if let Some(enrichment) = enrichment {
        ids.insert(TMDB_NAMESPACE.to_string(), enrichment.tmdb_id.to_string());
        if let Some(imdb_id) = &enrichment.imdb_id {
            ids.insert(IMDB_NAMESPACE.to_string(), imdb_id.clone());
        }
    }
    ids
}

/// AlloCiné rates out of 5; the output scale is 10.
pub fn rating(movie: &MovieRecord) -> Option<Rating> {
    let value = movie.statistics.user_rating.filter(|r| *r > 0.0)?;
    Some(Rating {
        source: ALLOCINE_NAMESPACE.to_string(),
        value: value * 2.0,
        votes: movie.statistics.user_rating_count.unwrap_or(0),
        default: true,
    })
}
