use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use axum_extra::extract::cookie::Key;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::Value;
use tower::ServiceExt;

use engine::{ElectionInput, Engine, PositionInput};
use server::{Config, ServerState, router};

const BOUNDARY: &str = "BallotBoxBoundary";

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Browser stand-in: keeps the cookies the server sets.
struct Client {
    app: Router,
    cookies: BTreeMap<String, String>,
}

impl Client {
    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Reply {
        let cookie_header = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        let builder = if cookie_header.is_empty() {
            builder
        } else {
            builder.header(header::COOKIE, cookie_header)
        };

        let res = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        for set_cookie in res.headers().get_all(header::SET_COOKIE) {
            let raw = set_cookie.to_str().unwrap();
            let pair = raw.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            if value.is_empty() || raw.contains("Max-Age=0") {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }

        let status = res.status();
        let headers = res.headers().clone();
        let body = res.into_body().collect().await.unwrap().to_bytes().to_vec();
        Reply {
            status,
            headers,
            body,
        }
    }

    async fn get(&mut self, uri: &str) -> Reply {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    async fn post_form(&mut self, uri: &str, body: &str) -> Reply {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body.to_string()),
        )
        .await
    }

    async fn post_json(&mut self, uri: &str, body: &str) -> Reply {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json"),
            Body::from(body.to_string()),
        )
        .await
    }

    async fn post_multipart(&mut self, uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Reply {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        self.send(
            Request::builder().method("POST").uri(uri).header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ),
            Body::from(body),
        )
        .await
    }

    /// Messages flashed so far, read through the login page.
    async fn flash(&mut self) -> Vec<String> {
        let page = self.get("/").await.json();
        page["flash"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["message"].as_str().unwrap().to_string())
            .collect()
    }
}

async fn setup() -> (Client, ServerState) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .password_cost(4)
        .build()
        .await
        .unwrap();
    engine.create_admin("admin", "admin-pass").await.unwrap();

    let uploads: PathBuf =
        std::env::temp_dir().join(format!("ballotbox-portal-{}", uuid::Uuid::new_v4()));
    let state = ServerState {
        engine: Arc::new(engine),
        config: Arc::new(Config::new(Key::derive_from(&[42; 64]), uploads)),
    };
    let client = Client {
        app: router(state.clone()),
        cookies: BTreeMap::new(),
    };
    (client, state)
}

async fn register_and_login(client: &mut Client) {
    let reply = client
        .post_form(
            "/voter/register",
            "school_id=S100&full_name=Jane+Doe&grade=10&password=secret&confirm_password=secret",
        )
        .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), Some("/"));

    let reply = client
        .post_form("/", "school_id=S100&password=secret")
        .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), Some("/voter/select"));
}

async fn admin_login(client: &mut Client) {
    let reply = client
        .post_form("/admin/login", "username=admin&password=admin-pass")
        .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), Some("/admin/dashboard"));
    client.flash().await;
}

#[tokio::test]
async fn register_login_and_select() {
    let (mut client, _state) = setup().await;

    let page = client.get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.json()["template"], "voter/login.html");

    register_and_login(&mut client).await;

    let page = client.get("/voter/select").await;
    assert_eq!(page.status, StatusCode::OK);
    let page = page.json();
    assert_eq!(page["template"], "voter/select.html");
    assert_eq!(page["context"]["voter_name"], "Jane Doe");
    assert_eq!(page["context"]["elections"], serde_json::json!([]));
    assert_eq!(page["flash"][0]["level"], "success");
}

#[tokio::test]
async fn registration_errors_flash_back() {
    let (mut client, _state) = setup().await;
    register_and_login(&mut client).await;

    let reply = client
        .post_form(
            "/voter/register",
            "school_id=S100&full_name=Copy&password=a&confirm_password=a",
        )
        .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), Some("/voter/register"));

    let flash = client.flash().await;
    assert!(flash.iter().any(|m| m.contains("already registered")));
}

#[tokio::test]
async fn failed_logins_look_the_same() {
    let (mut client, _state) = setup().await;
    client
        .post_form(
            "/voter/register",
            "school_id=S100&full_name=Jane+Doe&password=secret&confirm_password=secret",
        )
        .await;
    client.flash().await;

    let wrong = client.post_form("/", "school_id=S100&password=nope").await;
    assert_eq!(wrong.location(), Some("/"));
    let wrong_flash = client.flash().await;

    let unknown = client.post_form("/", "school_id=S404&password=secret").await;
    assert_eq!(unknown.location(), Some("/"));
    let unknown_flash = client.flash().await;

    assert_eq!(wrong_flash, vec!["Invalid credentials."]);
    assert_eq!(wrong_flash, unknown_flash);
    assert!(!client.cookies.contains_key("session"));
}

#[tokio::test]
async fn admin_pages_redirect_without_admin_session() {
    let (mut client, _state) = setup().await;
    register_and_login(&mut client).await;

    for path in [
        "/admin/dashboard",
        "/admin/voters",
        "/admin/elections",
        "/admin/candidates",
        "/admin/position",
    ] {
        let reply = client.get(path).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(reply.location(), Some("/admin/login"), "{path}");
    }

    let reply = client
        .post_form("/admin/elections/delete", "election_id=1")
        .await;
    assert_eq!(reply.location(), Some("/admin/login"));
}

#[tokio::test]
async fn voter_pages_redirect_without_session() {
    let (mut client, _state) = setup().await;
    let reply = client.get("/voter/select").await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), Some("/"));
}

#[tokio::test]
async fn admin_login_logout() {
    let (mut client, _state) = setup().await;

    let reply = client
        .post_form("/admin/login", "username=admin&password=wrong")
        .await;
    assert_eq!(reply.location(), Some("/admin/login"));

    admin_login(&mut client).await;
    let page = client.get("/admin/dashboard").await;
    assert_eq!(page.status, StatusCode::OK);
    let page = page.json();
    assert_eq!(page["context"]["username"], "admin");
    assert_eq!(page["context"]["voters"], 0);

    let reply = client.post_form("/logout", "").await;
    assert_eq!(reply.location(), Some("/admin/login"));
    let reply = client.get("/admin/dashboard").await;
    assert_eq!(reply.location(), Some("/admin/login"));
}

#[tokio::test]
async fn election_forms() {
    let (mut client, _state) = setup().await;
    admin_login(&mut client).await;

    let reply = client
        .post_form(
            "/admin/elections",
            "title=Council&start_date=2026-05-10&end_date=2026-05-01",
        )
        .await;
    assert_eq!(reply.location(), Some("/admin/elections"));
    let page = client.get("/admin/elections").await.json();
    assert_eq!(page["context"]["elections"], serde_json::json!([]));
    assert_eq!(page["flash"][0]["level"], "error");

    client
        .post_form(
            "/admin/elections",
            "title=Council&start_date=2026-05-01&end_date=2026-05-10&status=active",
        )
        .await;
    let page = client.get("/admin/elections").await.json();
    let elections = page["context"]["elections"].as_array().unwrap();
    assert_eq!(elections.len(), 1);
    assert_eq!(elections[0]["status"], "active");
    assert_eq!(page["flash"][0]["message"], "Election \"Council\" created.");

    let id = elections[0]["id"].as_i64().unwrap();
    client
        .post_form("/admin/elections/delete", &format!("election_id={id}"))
        .await;
    let page = client.get("/admin/elections").await.json();
    assert_eq!(page["context"]["elections"], serde_json::json!([]));
}

#[tokio::test]
async fn position_forms_default_counts() {
    let (mut client, _state) = setup().await;
    admin_login(&mut client).await;

    client
        .post_form("/admin/position", "title=President&max_winners=0")
        .await;
    let page = client.get("/admin/position").await.json();
    assert_eq!(page["context"]["positions"], serde_json::json!([]));
    assert_eq!(
        page["flash"][0]["message"],
        "Max winners must be a positive integer."
    );

    client
        .post_form("/admin/position", "title=President&max_winners=&votes_allowed=")
        .await;
    let page = client.get("/admin/position").await.json();
    assert_eq!(page["context"]["positions"][0]["max_winners"], 1);
    assert_eq!(page["context"]["positions"][0]["votes_allowed"], 1);
}

#[tokio::test]
async fn candidate_photo_lifecycle() {
    let (mut client, state) = setup().await;
    admin_login(&mut client).await;
    let position = state
        .engine
        .save_position(PositionInput {
            title: Some("President".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let position_id = position.id.to_string();

    let reply = client
        .post_multipart(
            "/admin/candidates",
            &[
                ("full_name", None, b"Ann Lee"),
                ("position_id", None, position_id.as_bytes()),
                ("photo", Some("my face.png"), b"PNGDATA"),
            ],
        )
        .await;
    assert_eq!(reply.location(), Some("/admin/candidates"));

    let page = client.get("/admin/candidates").await.json();
    let row = &page["context"]["candidates"][0];
    let stored = row["photo_filename"].as_str().unwrap().to_string();
    assert!(stored.ends_with("_my_face.png"));
    assert_eq!(row["position_title"], "President");
    let path = state.config.uploads_dir.join(&stored);
    assert!(path.exists());

    let served = client.get(row["photo_url"].as_str().unwrap()).await;
    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(served.body, b"PNGDATA");

    let id = row["id"].as_i64().unwrap();
    client
        .post_form("/admin/candidates/delete", &format!("candidate_id={id}"))
        .await;
    assert!(!path.exists());
    let page = client.get("/admin/candidates").await.json();
    assert_eq!(page["context"]["candidates"], serde_json::json!([]));
    assert_eq!(page["flash"][0]["level"], "success");

    let _ = std::fs::remove_dir_all(&state.config.uploads_dir);
}

#[tokio::test]
async fn deleting_a_candidate_without_its_file_still_succeeds() {
    let (mut client, state) = setup().await;
    admin_login(&mut client).await;
    let position = state
        .engine
        .save_position(PositionInput {
            title: Some("President".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let saved = state
        .engine
        .save_candidate(engine::CandidateInput {
            full_name: Some("Ghost".to_string()),
            position_id: Some(position.id.to_string()),
            photo_filename: Some("20260101000000_missing.png".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let reply = client
        .post_form(
            "/admin/candidates/delete",
            &format!("candidate_id={}", saved.candidate.id),
        )
        .await;
    assert_eq!(reply.location(), Some("/admin/candidates"));
    let page = client.get("/admin/candidates").await.json();
    assert_eq!(page["flash"][0]["message"], "Candidate \"Ghost\" deleted.");
}

#[tokio::test]
async fn ballot_page_and_submission() {
    let (mut client, state) = setup().await;

    let unauthenticated = client
        .post_json("/voter/submit_votes", r#"{"election_id": 1, "selections": {}}"#)
        .await;
    assert_eq!(unauthenticated.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unauthenticated.json()["success"], false);

    register_and_login(&mut client).await;
    let election = state
        .engine
        .save_election(ElectionInput {
            title: Some("Council".to_string()),
            start_date: Some("2026-05-01".to_string()),
            end_date: Some("2026-05-02".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let reply = client.get("/voter/vote").await;
    assert_eq!(reply.location(), Some("/voter/select"));

    let page = client
        .get(&format!("/voter/vote?election_id={}", election.id))
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.json()["context"]["groups"], serde_json::json!([]));

    let president = state
        .engine
        .save_position(PositionInput {
            title: Some("President".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let ann = state
        .engine
        .save_candidate(engine::CandidateInput {
            full_name: Some("Ann".to_string()),
            position_id: Some(president.id.to_string()),
            election_id: Some(election.id.to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
        .candidate;

    let page = client
        .get(&format!("/voter/vote?election_id={}", election.id))
        .await
        .json();
    let groups = page["context"]["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["key"], president.id.to_string());
    assert_eq!(page["context"]["already_voted"], false);

    let missing = client
        .post_json(
            "/voter/submit_votes",
            &format!(r#"{{"election_id": {}}}"#, election.id),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.json()["success"], false);

    let malformed = client.post_json("/voter/submit_votes", "{not json").await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.json()["success"], false);

    let ballot = format!(
        r#"{{"election_id": "{}", "selections": {{"{}": {}}}}}"#,
        election.id, president.id, ann.id
    );
    let accepted = client.post_json("/voter/submit_votes", &ballot).await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.json()["success"], true);

    let again = client.post_json("/voter/submit_votes", &ballot).await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(
        again.json()["message"],
        "You have already voted in this election."
    );

    let page = client
        .get(&format!("/voter/vote?election_id={}", election.id))
        .await
        .json();
    assert_eq!(page["context"]["already_voted"], true);
}
