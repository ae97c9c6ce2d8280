//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which starts one wiremock [`MockServer`] standing
//! in for AlloCiné, Wikidata and TMDB, and builds a [`Config`] pointing every
//! endpoint at it with a zero-delay retry policy.

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use sha1::{Digest, Sha1};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use allocine_scraper::config::{Config, TrailerQuality};
use allocine_scraper::Dispatcher;

pub const ALLOCINE_ID: u64 = 12345;
pub const IMDB_ID: &str = "tt0113247";
pub const TMDB_ID: u64 = 406;
pub const TRAILER_CODE: u64 = 19540000;

/// Matches AlloCiné requests whose `sig` is the SHA-1 of the last path
/// segment, the query before `&sig=`, and `secret`, and whose `sed` is a
/// `YYYYMMDD` date.
pub struct SignedWith {
    pub secret: String,
}

impl Match for SignedWith {
    fn matches(&self, request: &Request) -> bool {
        let Some(query) = request.url.query() else {
            return false;
        };
        let Some((signed, _)) = query.split_once("&sig=") else {
            return false;
        };
        let sed_ok = request
            .url
            .query_pairs()
            .any(|(k, v)| k == "sed" && v.len() == 8 && v.bytes().all(|b| b.is_ascii_digit()));
        let Some(sig) = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "sig")
            .map(|(_, v)| v.into_owned())
        else {
            return false;
        };
        let endpoint = request
            .url
            .path_segments()
            .and_then(|mut s| s.next_back())
            .unwrap_or_default();

        let mut hasher = Sha1::new();
        hasher.update(endpoint.as_bytes());
        hasher.update(signed.as_bytes());
        hasher.update(self.secret.as_bytes());
        sed_ok && STANDARD.encode(hasher.finalize()) == sig
    }
}

pub struct TestHarness {
    pub server: MockServer,
    pub config: Config,
}

impl TestHarness {
    /// Start a mock server with enrichment enabled and three retries.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let uri = server.uri();

        let mut config = Config::default();
        config.allocine.base_url = format!("{uri}/rest/v3");
        config.allocine.site_domain = "example.fr".to_string();
        config.wikidata.endpoint = format!("{uri}/sparql");
        config.tmdb.base_url = format!("{uri}/3");
        config.retry.max_retries = 3;
        config.retry.backoff_factor_secs = 0.0;
        config.retry.request_timeout_secs = 5;
        config.scraper.tmdb_data = true;
        config.scraper.tmdb_artwork = true;
        config.scraper.trailer_quality = TrailerQuality::Mq;

        Self { server, config }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.config.clone()).expect("dispatcher")
    }

    pub async fn mount_json(&self, endpoint: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Matcher for a correctly signed AlloCiné request under this config.
    pub fn signed(&self) -> SignedWith {
        SignedWith {
            secret: self.config.allocine.secret_key.clone(),
        }
    }

    pub async fn mount_movie(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v3/movie"))
            .and(query_param("code", ALLOCINE_ID.to_string()))
            .and(query_param("profile", "large"))
            .and(query_param("partner", self.config.allocine.partner_key.as_str()))
            .and(self.signed())
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount the movie, its trailer, the Wikidata binding and the TMDB
    /// records used by the full details scenario.
    pub async fn mount_full_pipeline(&self) {
        self.mount_movie(allocine_movie()).await;
        Mock::given(method("GET"))
            .and(path("/rest/v3/media"))
            .and(query_param("code", TRAILER_CODE.to_string()))
            .and(self.signed())
            .respond_with(ResponseTemplate::new(200).set_body_json(allocine_media()))
            .mount(&self.server)
            .await;
        self.mount_json("/sparql", wikidata_bindings(Some(IMDB_ID))).await;
        Mock::given(method("GET"))
            .and(path(format!("/3/find/{IMDB_ID}")))
            .and(query_param("external_source", "imdb_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_find(Some(TMDB_ID))))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/3/movie/{TMDB_ID}")))
            .and(query_param("language", "fr"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_movie()))
            .mount(&self.server)
            .await;
        // original language `en` is asked for after the preferred one and untexted
        Mock::given(method("GET"))
            .and(path(format!("/3/movie/{TMDB_ID}/images")))
            .and(query_param("language", "fr"))
            .and(query_param("include_image_language", "fr,null,en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tmdb_images()))
            .mount(&self.server)
            .await;
    }
}

pub fn allocine_movie() -> Value {
    json!({
        "movie": {
            "code": ALLOCINE_ID,
            "title": "La Haine",
            "originalTitle": "La Haine",
            "synopsis": "Trois jeunes de banlieue.",
            "synopsisShort": "Vingt-quatre heures.",
            "runtime": 5880,
            "movieCertificate": {"certificate": {"code": 14001, "$": "Interdit aux moins de 12 ans"}},
            "genre": [{"code": 13008, "$": "DRAME"}],
            "nationality": [{"code": 5001, "$": "France"}],
            "tag": [{"$": "banlieue"}],
            "castMember": [
                {"person": {"name": "Mathieu Kassovitz"}, "activity": {"code": 8002, "$": "Réalisateur"}},
                {"person": {"name": "Vincent Cassel"}, "activity": {"code": 8001, "$": "Acteur"},
                 "role": "Vinz", "picture": {"href": "https://img.example.fr/cassel.jpg"}},
                {"person": {"name": "Hubert Koundé"}, "activity": {"code": 8001, "$": "Acteur"}, "role": "Hubert"},
                {"person": {"name": "Mathieu Kassovitz"}, "activity": {"code": 8004, "$": "Scénariste"}}
            ],
            "release": {"releaseDate": "1995-05-31"},
            "productionYear": 1995,
            "statistics": {"userRating": 4.3, "userRatingCount": 1200, "rankTopMovie": 312},
            "poster": {"href": "https://img.example.fr/pictures/main.jpg"},
            "media": [
                {"code": 1, "type": {"code": 31001}, "width": 600, "height": 800,
                 "thumbnail": {"href": "https://img.example.fr/pictures/other.jpg"}},
                {"code": 2, "type": {"code": 31001}, "width": 1200, "height": 1600,
                 "thumbnail": {"href": "https://img.example.fr/pictures/main.jpg"}},
                {"code": 3, "type": {"code": 31006}, "width": 1920, "height": 1080,
                 "thumbnail": {"href": "https://img.example.fr/pictures/still.jpg"}},
                {"code": 4, "type": {"code": 31006}, "width": 1024, "height": 576,
                 "thumbnail": {"href": "https://img.example.fr/pictures/small.jpg"}}
            ],
            "trailer": {"code": TRAILER_CODE}
        }
    })
}

pub fn allocine_media() -> Value {
    json!({
        "media": {
            "code": TRAILER_CODE,
            "rendition": [
                {"href": "https://video.example.fr/lq.mp4", "bandwidth": {"code": 104001}},
                {"href": "https://video.example.fr/mq.mp4", "bandwidth": {"code": 104003}},
                {"href": "https://video.example.fr/hq.mp4", "bandwidth": {"code": 104004}}
            ]
        }
    })
}

pub fn allocine_search() -> Value {
    json!({
        "feed": {
            "totalResults": 3,
            "movie": [
                {"code": ALLOCINE_ID, "title": "La Haine", "productionYear": 1995,
                 "poster": {"href": "https://img.example.fr/pictures/main.jpg"}},
                {"code": 54321, "originalTitle": "Hate"},
                {"title": "No code"}
            ]
        }
    })
}

pub fn wikidata_bindings(imdb_id: Option<&str>) -> Value {
    let bindings: Vec<Value> = imdb_id
        .map(|id| json!({"imdb": {"type": "literal", "value": id}}))
        .into_iter()
        .collect();
    json!({"head": {"vars": ["imdb"]}, "results": {"bindings": bindings}})
}

pub fn tmdb_find(tmdb_id: Option<u64>) -> Value {
    let results: Vec<Value> = tmdb_id.map(|id| json!({"id": id})).into_iter().collect();
    json!({"movie_results": results, "tv_results": []})
}

pub fn tmdb_movie() -> Value {
    json!({
        "id": TMDB_ID,
        "imdb_id": IMDB_ID,
        "tagline": "Jusqu'ici tout va bien...",
        "production_companies": [{"id": 1, "name": "Lazennec"}, {"id": 2, "name": "Canal+"}],
        "belongs_to_collection": null,
        "original_language": "en",
        "title": "La Haine (TMDB)"
    })
}

pub fn tmdb_images() -> Value {
    json!({
        "id": TMDB_ID,
        "posters": [
            {"file_path": "/untexted.jpg", "iso_639_1": null},
            {"file_path": "/fr.jpg", "iso_639_1": "fr"}
        ],
        "backdrops": [
            {"file_path": "/backdrop.jpg", "iso_639_1": null}
        ]
    })
}
