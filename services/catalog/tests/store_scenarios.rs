//! Catalog store scenarios against a scripted API
//!
//! The session store supplies credentials exactly as it does at runtime, so
//! these tests also cover the hand-off of a rejected token between stores.

use std::sync::Arc;
use std::time::Duration;

use auth::{AuthEndpoints, SESSION_STORAGE_KEY, SessionStore};
use catalog::{CatalogStore, LoadStatus, MovieForm, SortField, SortOrder};
use common::{
    Anonymous, ApiClient, Method, MemoryStorage, Storage, TransportResponse,
    testing::MockTransport,
};
use serde_json::{Value, json};
use tokio_test::{assert_err, assert_ok};

fn movie(id: &str, title: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "year": 2021,
        "rating": 7.5,
        "duration": 120,
        "description": format!("About {title}"),
        "genres": ["Drama"],
        "cast": []
    })
}

fn listing(movies: Vec<Value>, current_page: u32, total_pages: u32, total: u64) -> Value {
    json!({
        "movies": movies,
        "currentPage": current_page,
        "totalPages": total_pages,
        "totalMovies": total
    })
}

fn admin_record() -> Value {
    json!({
        "user": {"_id": "a1", "name": "Admin", "email": "admin@movieapp.com", "role": "admin"},
        "token": "admin-token"
    })
}

fn client(mock: &Arc<MockTransport>) -> ApiClient {
    ApiClient::with_transport("http://api.test/api", mock.clone())
}

fn session(mock: &Arc<MockTransport>, record: Option<Value>) -> Arc<SessionStore> {
    let storage = Arc::new(MemoryStorage::new());
    if let Some(record) = record {
        assert_ok!(storage.set(SESSION_STORAGE_KEY, &record.to_string()));
    }
    Arc::new(SessionStore::new(
        client(mock),
        storage,
        AuthEndpoints::default(),
    ))
}

fn catalog(mock: &Arc<MockTransport>, session: Arc<SessionStore>) -> CatalogStore {
    CatalogStore::new(client(mock), session, 12)
}

fn query_of(mock: &MockTransport, index: usize) -> Vec<(String, String)> {
    mock.requests()[index]
        .url
        .query_pairs()
        .into_owned()
        .collect()
}

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn dune_form() -> MovieForm {
    MovieForm {
        title: "Dune".to_string(),
        year: "2021".to_string(),
        rating: "8.0".to_string(),
        duration: "155".to_string(),
        description: "Spice must flow.".to_string(),
        genres: "Sci-Fi, Adventure".to_string(),
        ..MovieForm::default()
    }
}

#[tokio::test]
async fn test_fetch_page_respects_page_and_limit() {
    for (page, limit) in [(1u32, 12u32), (2, 5), (3, 1)] {
        let mock = Arc::new(MockTransport::new());
        let movies = (0..limit)
            .map(|i| movie(&format!("m{i}"), &format!("Movie {i}")))
            .collect();
        mock.respond(
            Method::GET,
            "/movies",
            200,
            listing(movies, page, 3, u64::from(limit) * 3),
        );
        let store = catalog(&mock, session(&mock, None));

        assert_ok!(store.fetch_page(page, limit).await);

        let state = store.snapshot();
        assert!(state.items.len() <= limit as usize);
        assert_eq!(state.pagination.current_page, page);
        assert_eq!(state.status, LoadStatus::Idle);
        assert_eq!(
            query_of(&mock, 0),
            vec![pair("page", &page.to_string()), pair("limit", &limit.to_string())]
        );
        assert_eq!(mock.requests()[0].bearer, None);
    }
}

#[tokio::test]
async fn test_over_delivered_page_is_truncated() {
    let mock = Arc::new(MockTransport::new());
    let movies = (0..5).map(|i| movie(&format!("m{i}"), "Extra")).collect();
    mock.respond(Method::GET, "/movies", 200, listing(movies, 1, 1, 5));
    let store = catalog(&mock, session(&mock, None));

    assert_ok!(store.fetch_page(1, 3).await);
    assert_eq!(store.snapshot().items.len(), 3);
}

#[tokio::test]
async fn test_fetch_default_uses_configured_page_size() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::GET, "/movies", 200, listing(vec![], 1, 1, 0));
    let store = catalog(&mock, session(&mock, None));

    assert_ok!(store.fetch_default(1).await);
    assert_eq!(
        query_of(&mock, 0),
        vec![pair("page", "1"), pair("limit", "12")]
    );

    let state = store.snapshot();
    assert!(state.items.is_empty());
    assert_eq!(state.pagination.total_pages, 1);
}

#[tokio::test]
async fn test_search_replaces_page() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::GET,
        "/movies",
        200,
        listing(vec![movie("old", "Old")], 1, 5, 60),
    );
    mock.respond(
        Method::GET,
        "/movies/search",
        200,
        listing(
            vec![
                movie("d1", "Dune"),
                movie("d2", "Dune: Part Two"),
                movie("d3", "Dune (1984)"),
            ],
            1,
            1,
            3,
        ),
    );
    let store = catalog(&mock, session(&mock, None));

    assert_ok!(store.fetch_default(1).await);
    assert_ok!(store.search("dune", 1).await);

    let state = store.snapshot();
    assert_eq!(state.items.len(), 3);
    assert_eq!(state.pagination.total_pages, 1);
    assert_eq!(state.pagination.total_items, 3);
    assert!(state.items.iter().all(|m| m.id != "old"));
    assert_eq!(
        query_of(&mock, 1),
        vec![pair("query", "dune"), pair("page", "1")]
    );
}

#[tokio::test]
async fn test_sort_sends_field_and_order() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::GET,
        "/movies/sorted",
        200,
        listing(vec![movie("b", "B"), movie("a", "A")], 2, 2, 14),
    );
    let store = catalog(&mock, session(&mock, None));

    assert_ok!(store.sort(SortField::Rating, SortOrder::Desc, 2).await);

    assert_eq!(
        query_of(&mock, 0),
        vec![pair("sortBy", "rating"), pair("order", "desc"), pair("page", "2")]
    );
    // Server order is kept
    let ids: Vec<String> = store.snapshot().items.into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[tokio::test]
async fn test_failed_listing_keeps_items_and_reports() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::GET,
        "/movies",
        200,
        listing(vec![movie("m1", "Kept")], 1, 1, 1),
    );
    mock.respond(Method::GET, "/movies/search", 500, json!({"message": "Search index offline"}));
    mock.respond(Method::GET, "/movies/sorted", 502, json!({}));
    let store = catalog(&mock, session(&mock, None));

    assert_ok!(store.fetch_default(1).await);
    let err = assert_err!(store.search("dune", 1).await);
    assert_eq!(err.message(), "Search index offline");

    let state = store.snapshot();
    assert_eq!(state.status, LoadStatus::Error);
    assert_eq!(state.last_error.as_deref(), Some("Search index offline"));
    assert_eq!(state.items.len(), 1);

    let err = assert_err!(store.sort(SortField::Year, SortOrder::Asc, 1).await);
    assert_eq!(err.message(), "Failed to sort movies");
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn test_loading_status_while_in_flight() {
    let mock = Arc::new(MockTransport::new());
    let reply = mock.defer(Method::GET, "/movies", &[("page", "1")]);
    let store = catalog(&mock, session(&mock, None));

    let (result, ()) = tokio::join!(store.fetch_page(1, 12), async {
        assert!(store.snapshot().is_loading());
        reply
            .send(TransportResponse::json(200, &listing(vec![], 1, 1, 0)))
            .expect("request still waiting");
    });

    assert_ok!(result);
    assert_eq!(store.snapshot().status, LoadStatus::Idle);
}

#[tokio::test]
async fn test_cancelled_listing_does_not_stay_loading() {
    let mock = Arc::new(MockTransport::new());
    mock.respond_matching(
        Method::GET,
        "/movies",
        &[("page", "1")],
        200,
        listing(vec![movie("m1", "Kept")], 1, 2, 13),
    );
    // Never answered while the caller waits
    let _reply = mock.defer(Method::GET, "/movies", &[("page", "2")]);
    let store = catalog(&mock, session(&mock, None));
    assert_ok!(store.fetch_page(1, 12).await);

    let timed_out = tokio::time::timeout(Duration::from_millis(50), store.fetch_page(2, 12)).await;
    assert!(timed_out.is_err());

    let state = store.snapshot();
    assert_eq!(state.status, LoadStatus::Idle);
    assert_eq!(state.pagination.current_page, 1);
    assert_eq!(state.items.len(), 1);
}

#[tokio::test]
async fn test_movie_id_stays_one_path_segment() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::GET,
        "/movies/abc%3Fx=1%23frag",
        200,
        movie("abc?x=1#frag", "Odd id"),
    );
    let session = session(&mock, Some(admin_record()));
    let store = catalog(&mock, session.clone());

    let found = assert_ok!(store.get("abc?x=1#frag").await);
    assert_eq!(found.id, "abc?x=1#frag");

    let err = assert_err!(store.delete("..").await);
    assert_eq!(err.message(), "Failed to delete movie");
    assert_eq!(err.status(), None);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.as_str(),
        "http://api.test/api/movies/abc%3Fx=1%23frag"
    );
    assert_eq!(session.token().as_deref(), Some("admin-token"));
}

#[tokio::test]
async fn test_last_response_to_arrive_wins() {
    let mock = Arc::new(MockTransport::new());
    let page_one = mock.defer(Method::GET, "/movies", &[("page", "1")]);
    let page_two = mock.defer(Method::GET, "/movies", &[("page", "2")]);
    let store = catalog(&mock, session(&mock, None));
    let mut rx = store.subscribe();

    let (first, second, ()) = tokio::join!(
        store.fetch_page(1, 2),
        store.fetch_page(2, 2),
        async {
            page_two
                .send(TransportResponse::json(
                    200,
                    &listing(vec![movie("p2a", "Page two")], 2, 2, 3),
                ))
                .expect("page 2 waiting");
            rx.wait_for(|state| state.pagination.current_page == 2)
                .await
                .expect("store alive");
            page_one
                .send(TransportResponse::json(
                    200,
                    &listing(vec![movie("p1a", "Page one"), movie("p1b", "Page one")], 1, 2, 3),
                ))
                .expect("page 1 waiting");
        }
    );

    assert_ok!(first);
    assert_ok!(second);

    // Page 1 was requested first but completed last, so it overwrote page 2
    let state = store.snapshot();
    assert_eq!(state.pagination.current_page, 1);
    let ids: Vec<String> = state.items.into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["p1a", "p1b"]);
}

#[tokio::test]
async fn test_get_leaves_page_alone() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::GET, "/movies/m1", 200, movie("m1", "Dune"));
    mock.respond(Method::GET, "/movies/missing", 404, json!({"message": "Movie not found"}));
    let store = catalog(&mock, session(&mock, None));
    let before = store.snapshot();

    let found = assert_ok!(store.get("m1").await);
    assert_eq!(found.title, "Dune");

    let err = assert_err!(store.get("missing").await);
    assert_eq!(err.message(), "Movie not found");
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn test_create_without_token_fails_with_server_message() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::GET,
        "/movies",
        200,
        listing(vec![movie("m1", "Existing")], 1, 1, 1),
    );
    mock.respond(
        Method::POST,
        "/movies",
        401,
        json!({"message": "Not authorized, no token"}),
    );
    let store = catalog(&mock, session(&mock, None));
    assert_ok!(store.fetch_default(1).await);
    let before = store.snapshot();

    let input = assert_ok!(dune_form().parse());
    let err = assert_err!(store.create(&input).await);

    assert_eq!(err.message(), "Not authorized, no token");
    assert!(err.is_unauthorized());
    assert_eq!(store.snapshot(), before);
    assert_eq!(mock.requests()[1].bearer, None);
}

#[tokio::test]
async fn test_admin_mutations_send_token_and_leave_items() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::GET,
        "/movies",
        200,
        listing(vec![movie("m1", "Existing")], 1, 1, 1),
    );
    mock.respond(Method::POST, "/movies", 201, movie("m2", "Dune"));
    mock.respond(Method::PUT, "/movies/m1", 200, movie("m1", "Renamed"));
    mock.respond(Method::DELETE, "/movies/m1", 200, json!({"message": "Movie removed"}));
    let session = session(&mock, Some(admin_record()));
    let store = catalog(&mock, session.clone());
    assert_ok!(store.fetch_default(1).await);
    let before = store.snapshot();

    let input = assert_ok!(dune_form().parse());
    assert_ok!(store.create(&input).await);
    assert_ok!(store.update("m1", &input).await);
    assert_ok!(store.delete("m1").await);

    assert_eq!(store.snapshot(), before);
    let requests = mock.requests();
    assert_eq!(requests.len(), 4);
    for request in &requests[1..] {
        assert_eq!(request.bearer.as_deref(), Some("admin-token"));
    }
    assert_eq!(requests[1].method, Method::POST);
    assert_eq!(
        requests[1].body.as_ref().map(|b| b["genres"].clone()),
        Some(json!(["Sci-Fi", "Adventure"]))
    );
    assert_eq!(requests[2].method, Method::PUT);
    assert_eq!(requests[3].method, Method::DELETE);
    assert_eq!(requests[3].body, None);
    assert!(session.is_admin());
}

#[tokio::test]
async fn test_rejected_token_clears_session() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::DELETE,
        "/movies/m1",
        401,
        json!({"message": "Not authorized, token failed"}),
    );
    let session = session(&mock, Some(admin_record()));
    let store = catalog(&mock, session.clone());

    let err = assert_err!(store.delete("m1").await);

    assert_eq!(err.message(), "Not authorized, token failed");
    assert_eq!(session.token(), None);
    assert!(!session.is_admin());
}

#[tokio::test]
async fn test_forbidden_keeps_session() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::DELETE,
        "/movies/m1",
        403,
        json!({"message": "Not authorized as an admin"}),
    );
    mock.fail(
        Method::DELETE,
        "/movies/m2",
        common::ApiError::Network("connection reset".to_string()),
    );
    let session = session(&mock, Some(admin_record()));
    let store = catalog(&mock, session.clone());

    let err = assert_err!(store.delete("m1").await);
    assert_eq!(err.message(), "Not authorized as an admin");
    assert_eq!(err.status(), Some(403));

    let err = assert_err!(store.delete("m2").await);
    assert_eq!(err.message(), "Failed to delete movie");

    assert_eq!(session.token().as_deref(), Some("admin-token"));
}

#[tokio::test]
async fn test_anonymous_store_browses_without_session() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::GET,
        "/movies/search",
        200,
        listing(vec![movie("d1", "Dune")], 1, 1, 1),
    );
    mock.respond(Method::DELETE, "/movies/d1", 401, json!({"message": "Not authorized, no token"}));
    let store = CatalogStore::new(client(&mock), Arc::new(Anonymous), 12);

    assert_ok!(store.search("dune", 1).await);
    assert_eq!(store.snapshot().items.len(), 1);

    let err = assert_err!(store.delete("d1").await);
    assert!(err.is_unauthorized());
    assert!(mock.requests().iter().all(|r| r.bearer.is_none()));
}
