use std::sync::Arc;
use std::time::{Duration, Instant};

use watchlist_core::{
    CandidateRecord, ClientConfig, DetailEnricher, MemoryStore, RecordId, RecordStore,
    RecordUpdate, WatchlistClient,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROOKIES_PAGE: &str = r#"<html><body>
    <h1>Rookies</h1>
    <aside class="portable-infobox">
      <div class="pi-item pi-data" data-source="season">
        <h3 class="pi-data-label">Season</h3>
        <div class="pi-data-value pi-font"><a href="/wiki/Season_One">One</a></div>
      </div>
      <div class="pi-item pi-data" data-source="episode">
        <h3 class="pi-data-label">Episode</h3>
        <div class="pi-data-value pi-font">5 (production 1.05)</div>
      </div>
    </aside>
    <h2>Plot summary</h2>
</body></html>"#;

const INFOBOX_PAGE: &str = r#"<html><body>
    <table class="infobox">
      <tr><th>Season</th><td>2</td></tr>
      <tr><th>Episode number</th><td>16</td></tr>
    </table>
</body></html>"#;

const PLAIN_PAGE: &str = "<html><body><h2>Plot</h2><p>Nothing to see.</p></body></html>";

fn client(delay_ms: u64) -> Arc<WatchlistClient> {
    Arc::new(
        WatchlistClient::with_config(ClientConfig {
            request_delay_ms: delay_ms,
            timeout_secs: 5,
            ..ClientConfig::default()
        })
        .unwrap(),
    )
}

fn tv(title: &str, episode_url: String) -> CandidateRecord {
    CandidateRecord {
        year: Some("22 BBY".to_string()),
        content_type: Some("TV".to_string()),
        title: Some("Star Wars: The Clone Wars".to_string()),
        episode_title: Some(title.to_string()),
        episode_url: Some(episode_url),
        released: Some("2008".to_string()),
        ..CandidateRecord::default()
    }
}

async fn page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_enrich_updates_matching_records() {
    let server = MockServer::start().await;
    page(&server, "/wiki/Rookies", 200, ROOKIES_PAGE).await;
    page(&server, "/wiki/Lethal_Trackdown", 200, INFOBOX_PAGE).await;
    page(&server, "/wiki/Plain", 200, PLAIN_PAGE).await;
    page(&server, "/wiki/Gone", 404, "not found").await;

    let store = Arc::new(MemoryStore::new());
    let rookies = store
        .insert(tv("Rookies", format!("{}/wiki/Rookies", server.uri())))
        .unwrap();
    let trackdown = store
        .insert(tv("Lethal Trackdown", format!("{}/wiki/Lethal_Trackdown", server.uri())))
        .unwrap();
    let plain = store
        .insert(tv("Plain", format!("{}/wiki/Plain", server.uri())))
        .unwrap();
    let gone = store
        .insert(tv("Gone", format!("{}/wiki/Gone", server.uri())))
        .unwrap();
    store.update(rookies, &RecordUpdate::watched(true)).unwrap();

    let report = DetailEnricher::new(client(0), store.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.eligible, 4);
    assert_eq!(report.updated, 2);
    assert_eq!(report.unmatched, 1);
    assert_eq!(report.failed, 1);

    let record = store.get(rookies).unwrap().unwrap();
    assert_eq!(record.season, "S01");
    assert_eq!(record.episode, "E05");
    assert!(record.watched);

    let record = store.get(trackdown).unwrap().unwrap();
    assert_eq!(record.season, "2");
    assert_eq!(record.episode, "16");

    for id in [plain, gone] {
        let record = store.get(id).unwrap().unwrap();
        assert!(record.season.is_empty());
        assert!(record.episode.is_empty());
    }
}

#[tokio::test]
async fn test_enrich_skips_non_tv_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROOKIES_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut novel = tv("Lost Stars", format!("{}/wiki/Lost_Stars", server.uri()));
    novel.content_type = Some("N".to_string());
    store.insert(novel).unwrap();

    let mut no_link = tv("Unlinked", String::new());
    no_link.episode_url = None;
    store.insert(no_link).unwrap();

    let report = DetailEnricher::new(client(0), store).run().await.unwrap();
    assert_eq!(report.eligible, 0);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_codes() {
    let server = MockServer::start().await;
    page(&server, "/wiki/Rookies", 500, "").await;

    let store = Arc::new(MemoryStore::new());
    let id = store
        .insert(tv("Rookies", format!("{}/wiki/Rookies", server.uri())))
        .unwrap();
    store
        .update(
            id,
            &RecordUpdate {
                season: Some("S01".to_string()),
                episode: Some("E05".to_string()),
                ..RecordUpdate::default()
            },
        )
        .unwrap();

    let report = DetailEnricher::new(client(0), store.clone())
        .run()
        .await
        .unwrap();
    assert_eq!(report.failed, 1);

    let record = store.get(id).unwrap().unwrap();
    assert_eq!(record.season, "S01");
    assert_eq!(record.episode, "E05");
}

#[tokio::test]
async fn test_delay_is_per_task() {
    let server = MockServer::start().await;
    page(&server, "/wiki/Rookies", 200, ROOKIES_PAGE).await;

    let store = Arc::new(MemoryStore::new());
    for i in 0..5 {
        store
            .insert(tv(&format!("Episode {}", i), format!("{}/wiki/Rookies", server.uri())))
            .unwrap();
    }

    let start = Instant::now();
    let report = DetailEnricher::with_workers(client(300), store.clone(), 5)
        .run()
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.updated, 5);
    assert!(elapsed >= Duration::from_millis(300));
    // a shared limiter would need at least 1.5s
    assert!(elapsed < Duration::from_millis(1200));

    for record in store.list().unwrap() {
        assert_eq!(record.season, "S01");
    }
    assert!(store.get(RecordId(5)).unwrap().is_some());
}

#[tokio::test]
async fn test_worker_cap_limits_requests_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Rookies"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ROOKIES_PAGE)
                .set_delay(Duration::from_millis(200)),
        )
        .expect(3)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    for i in 0..3 {
        store
            .insert(tv(&format!("Episode {}", i), format!("{}/wiki/Rookies", server.uri())))
            .unwrap();
    }

    let start = Instant::now();
    let report = DetailEnricher::with_workers(client(0), store, 1)
        .run()
        .await
        .unwrap();

    assert_eq!(report.updated, 3);
    // one worker serves the slow responses back to back
    assert!(start.elapsed() >= Duration::from_millis(600));
}
