//! AlloCiné response shapes and their conversion into domain records.
//!
//! Every field is optional on the wire: these types only describe what the
//! API may send. The `into_*` conversions flatten them once, so the merge
//! code never walks raw JSON.

use serde::Deserialize;

use crate::metadata::record::{Candidate, Credit, MediaAsset, MovieRecord, Rendition, Statistics};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiError {
    #[serde(rename = "$")]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchEnvelope {
    pub feed: Option<SearchFeed>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchFeed {
    pub movie: Option<Vec<SearchMovie>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchMovie {
    pub code: Option<u64>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub production_year: Option<i32>,
    pub poster: Option<Href>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MovieEnvelope {
    pub movie: Option<WireMovie>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireMovie {
    pub code: Option<u64>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub synopsis: Option<String>,
    pub synopsis_short: Option<String>,
    pub runtime: Option<u64>,
    pub movie_certificate: Option<MovieCertificate>,
    pub genre: Option<Vec<Text>>,
    pub nationality: Option<Vec<Text>>,
    pub tag: Option<Vec<Text>>,
    pub cast_member: Option<Vec<CastMember>>,
    pub release: Option<Release>,
    pub production_year: Option<i32>,
    pub statistics: Option<WireStatistics>,
    pub poster: Option<Href>,
    pub media: Option<Vec<WireMedia>>,
    pub trailer: Option<Coded>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MovieCertificate {
    pub certificate: Option<Text>,
}

/// `{"$": "..."}` text node.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Text {
    #[serde(rename = "$")]
    pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Href {
    pub href: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Coded {
    pub code: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Person {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CastMember {
    pub person: Option<Person>,
    pub activity: Option<Coded>,
    pub role: Option<String>,
    pub picture: Option<Href>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Release {
    pub release_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireStatistics {
    pub user_rating: Option<f64>,
    pub user_rating_count: Option<u64>,
    pub rank_top_movie: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireMedia {
    pub code: Option<u64>,
    #[serde(rename = "type")]
    pub kind: Option<Coded>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub thumbnail: Option<Href>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MediaEnvelope {
    pub media: Option<WireMediaDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireMediaDetail {
    pub rendition: Option<Vec<WireRendition>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireRendition {
    pub href: Option<String>,
    pub bandwidth: Option<Coded>,
}

fn href(h: Option<Href>) -> Option<String> {
    h.and_then(|h| h.href).filter(|s| !s.is_empty())
}

fn texts(nodes: Option<Vec<Text>>) -> Vec<String> {
    nodes
        .unwrap_or_default()
        .into_iter()
        .filter_map(|t| t.value)
        .collect()
}

impl WireMovie {
    /// Flatten into a [`MovieRecord`]; `requested` is used when the response
    /// carries no code of its own.
    pub fn into_record(self, requested: u64) -> MovieRecord {
        let statistics = self.statistics.unwrap_or_default();

        MovieRecord {
            code: self.code.unwrap_or(requested),
            title: self.title,
            original_title: self.original_title,
            synopsis: self.synopsis,
            synopsis_short: self.synopsis_short,
            runtime_secs: self.runtime,
            certification: self
                .movie_certificate
                .and_then(|c| c.certificate)
                .and_then(|t| t.value),
            genres: texts(self.genre),
            countries: texts(self.nationality),
            tags: texts(self.tag),
            credits: self
                .cast_member
                .unwrap_or_default()
                .into_iter()
                .map(|m| Credit {
                    name: m.person.and_then(|p| p.name),
                    role: m.role,
                    thumbnail: href(m.picture),
                    activity: m.activity.and_then(|a| a.code),
                })
                .collect(),
            release_date: self.release.and_then(|r| r.release_date),
            production_year: self.production_year,
            statistics: Statistics {
                user_rating: statistics.user_rating,
                user_rating_count: statistics.user_rating_count,
                rank: statistics.rank_top_movie,
            },
            main_poster: href(self.poster),
            media: self
                .media
                .unwrap_or_default()
                .into_iter()
                .map(|m| MediaAsset {
                    code: m.code,
                    kind: m.kind.and_then(|k| k.code),
                    width: m.width,
                    height: m.height,
                    url: href(m.thumbnail),
                })
                .collect(),
            trailer_code: self.trailer.and_then(|t| t.code),
        }
    }
}

impl SearchMovie {
    /// Entries without a code or any title are not candidates.
    pub fn into_candidate(self) -> Option<Candidate> {
        let id = self.code?;
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .or(self.original_title.filter(|t| !t.is_empty()))?;
        Some(Candidate::new(id, title, self.production_year, href(self.poster)))
    }
}

impl WireMediaDetail {
    pub fn into_renditions(self) -> Vec<Rendition> {
        self.rendition
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| {
                Some(Rendition {
                    url: r.href.filter(|h| !h.is_empty())?,
                    quality: r.bandwidth.and_then(|b| b.code)?,
                })
            })
            .collect()
    }
}
