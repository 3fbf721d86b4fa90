//! Integration test: run `HttpVariantStore` against an in-process mock
//! store bound to an ephemeral port, then drive it through the dispatcher.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use dnaerys_core::query::{
    AnnotationInput, Dispatcher, EMPTY_SENTINEL, PageInput, QueryError, QueryPolicy, RegionInput,
    SexFilter, Zygosity,
};
use dnaerys_core::store::{
    Endpoint, HttpVariantStore, StoreChannel, StoreConfig, StoreError, TrioRoles,
};
use serde_json::{Value, json};

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

fn remember(seen: &Seen, endpoint: &str, body: Value) {
    seen.lock().unwrap().push((endpoint.to_string(), body));
}

async fn count_variants(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    remember(&seen, "countVariantsInRegion", body);
    Json(json!({ "count": 12 }))
}

async fn select_variants(State(seen): State<Seen>, Json(body): Json<Value>) -> String {
    remember(&seen, "selectVariantsInRegion", body);
    concat!(
        "{\"alleles\":[{\"pos\":101,\"alt\":\"T\"}]}\n",
        "{\"alleles\":[]}\n",
        "{\"alleles\":[{\"pos\":150,\"alt\":\"G\"},{\"pos\":160,\"alt\":\"C\"}]}\n",
    )
    .to_string()
}

async fn select_de_novo(State(seen): State<Seen>, Json(body): Json<Value>) -> String {
    remember(&seen, "selectDeNovo", body);
    String::new()
}

async fn select_samples(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    remember(&seen, "selectSamplesInRegion", body);
    Json(json!({ "samples": ["HG00096", "HG00097"] }))
}

async fn count_samples(State(seen): State<Seen>, Json(body): Json<Value>) -> StatusCode {
    remember(&seen, "countSamplesInRegion", body);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn kinship(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    remember(&seen, "kinshipDuo", body);
    Json(json!({ "rel": [{ "sample1": "S1", "sample2": "S2", "degree": "FIRST_DEGREE" }] }))
}

async fn dataset_info(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    remember(&seen, "datasetInfo", body);
    Json(json!({
        "variantsTotal": 138044723,
        "samplesTotal": 3,
        "femalesTotal": 2,
        "malesTotal": 1,
        "ringsTotal": 2,
        "cohorts": [
            { "cohortName": "a", "femaleSamplesNames": ["F1"], "maleSamplesNames": ["M1"] },
            { "cohortName": "b", "femaleSamplesNames": ["F2"], "maleSamplesNames": [] }
        ]
    }))
}

/// Start the mock store, returning its base URL and the request log.
async fn spawn_mock_store() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/api/countVariantsInRegion", post(count_variants))
        .route("/api/selectVariantsInRegion", post(select_variants))
        .route("/api/selectDeNovo", post(select_de_novo))
        .route("/api/selectSamplesInRegion", post(select_samples))
        .route("/api/countSamplesInRegion", post(count_samples))
        .route("/api/kinshipDuo", post(kinship))
        .route("/api/datasetInfo", post(dataset_info))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock store");
    });

    (format!("http://{addr}/api"), seen)
}

fn dispatcher_for(base_url: String) -> (Dispatcher, Arc<StoreChannel>) {
    let channel = Arc::new(
        StoreChannel::new(StoreConfig {
            base_url,
            ..StoreConfig::default()
        })
        .expect("channel"),
    );
    let store = Arc::new(HttpVariantStore::new(channel.clone()));
    (Dispatcher::new(store, QueryPolicy::default()), channel)
}

#[tokio::test]
async fn count_round_trips_through_http() {
    let (base, seen) = spawn_mock_store().await;
    let (dispatcher, _) = dispatcher_for(base);

    let region = RegionInput {
        ref_allele: Some("A".into()),
        ..RegionInput::new("chr17", 43044295, 43125364)
    };
    let ann = AnnotationInput {
        clin_significance: Some("pathogenic,likely_pathogenic".into()),
        gnomad_af_less_than: Some(0.01),
        ..Default::default()
    };
    let outcome = dispatcher
        .count_variants(&region, Zygosity::HET, None, &ann)
        .await;
    assert_eq!(outcome.into_value(), 12);

    let seen = seen.lock().unwrap();
    let (endpoint, body) = &seen[0];
    assert_eq!(endpoint, "countVariantsInRegion");
    assert_eq!(body["assembly"], "GRCh38");
    assert_eq!(body["chr"], "17");
    assert_eq!(body["ref"], "A");
    assert_eq!(body["alt"], "");
    assert_eq!(body["hom"], false);
    assert_eq!(body["het"], true);
    assert_eq!(body["variantMinLength"], 0);
    assert_eq!(body["variantMaxLength"], i32::MAX);
    assert_eq!(
        body["ann"]["clnsgn"],
        json!(["PATHOGENIC", "LIKELY_PATHOGENIC"])
    );
    assert!(body["ann"]["gnomadAfLt"].as_f64().is_some());
}

#[tokio::test]
async fn ndjson_select_is_drained_in_order() {
    let (base, seen) = spawn_mock_store().await;
    let (dispatcher, _) = dispatcher_for(base);

    let page = PageInput {
        skip: Some(10),
        limit: Some(25),
    };
    let records = dispatcher
        .select_variants(
            &RegionInput::new("1", 100, 200),
            Zygosity::ANY,
            None,
            &AnnotationInput::default(),
            &page,
        )
        .await
        .into_value();

    assert_eq!(records.len(), 3);
    let first: Value = serde_json::from_str(&records[0]).expect("record json");
    let last: Value = serde_json::from_str(&records[2]).expect("record json");
    assert_eq!(first["pos"], 101);
    assert_eq!(last["pos"], 160);

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].1["skip"], 10);
    assert_eq!(seen[0].1["limit"], 25);
}

#[tokio::test]
async fn empty_trio_select_returns_sentinel() {
    let (base, seen) = spawn_mock_store().await;
    let (dispatcher, _) = dispatcher_for(base);

    let trio = TrioRoles::DeNovo {
        parent1: "P1".into(),
        parent2: "P2".into(),
        proband: "C".into(),
    };
    let records = dispatcher
        .select_inheritance(
            &trio,
            &RegionInput::new("X", 1, 1_000_000),
            &AnnotationInput::default(),
            &PageInput::default(),
        )
        .await
        .into_value();
    assert_eq!(records, vec![EMPTY_SENTINEL.to_string()]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].1["parent1"], "P1");
    assert_eq!(seen[0].1["proband"], "C");
    assert_eq!(seen[0].1["limit"], 100);
}

#[tokio::test]
async fn server_error_becomes_neutral_default() {
    let (base, _) = spawn_mock_store().await;
    let (dispatcher, _) = dispatcher_for(base);

    let outcome = dispatcher
        .count_samples(
            &RegionInput::new("2", 1, 10),
            Zygosity::ANY,
            &AnnotationInput::default(),
        )
        .await;
    match outcome.reason() {
        Some(QueryError::Store {
            endpoint,
            source: StoreError::Status { status, .. },
        }) => {
            assert_eq!(*endpoint, Endpoint::CountSamplesInRegion);
            assert_eq!(*status, 500);
        }
        other => panic!("unexpected reason: {other:?}"),
    }
    assert_eq!(outcome.into_value(), 0);
}

#[tokio::test]
async fn unreachable_store_becomes_neutral_default() {
    // Bind then drop a listener so the port is closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let (dispatcher, _) = dispatcher_for(format!("http://{addr}"));
    let degree = dispatcher.kinship("S1", "S2").await;
    assert!(matches!(
        degree.reason(),
        Some(QueryError::Store {
            source: StoreError::Transport(_),
            ..
        })
    ));
    assert_eq!(degree.into_value(), "");
}

#[tokio::test]
async fn kinship_samples_and_dataset_info_over_http() {
    let (base, seen) = spawn_mock_store().await;
    let (dispatcher, channel) = dispatcher_for(base);

    assert_eq!(dispatcher.kinship("S1", "S2").await.into_value(), "FIRST_DEGREE");
    assert_eq!(
        dispatcher
            .select_samples(
                &RegionInput::new("MT", 1, 16569),
                Zygosity::HOM,
                &AnnotationInput::default(),
            )
            .await
            .into_value(),
        vec!["HG00096", "HG00097"]
    );
    assert_eq!(
        dispatcher.sample_ids(SexFilter::All).await.into_value(),
        vec!["F1", "F2", "M1"]
    );
    let summary = dispatcher.dataset_info(false).await.into_value();
    assert_eq!(summary.variants_total, 138044723);
    assert_eq!(summary.nodes_total, 2);

    // The HTTP client is created once and reused.
    let first = channel.client().await.expect("client") as *const _;
    let second = channel.client().await.expect("client") as *const _;
    assert_eq!(first, second);

    let seen = seen.lock().unwrap();
    let kinship = seen.iter().find(|(e, _)| e == "kinshipDuo").expect("kinship call");
    assert_eq!(kinship.1, json!({ "sample1": "S1", "sample2": "S2", "seq": true }));
    let info = seen.iter().find(|(e, _)| e == "datasetInfo").expect("info call");
    assert_eq!(info.1["returnSamplesNames"], true);
}
