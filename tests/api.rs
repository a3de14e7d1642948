//! End-to-end tests of the domain endpoints.

use agro_geo_api::AppConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

fn field_polygon() -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [73.856, 18.516],
            [73.858, 18.516],
            [73.858, 18.518],
            [73.856, 18.518],
            [73.856, 18.516]
        ]]
    })
}

#[tokio::test]
async fn test_root_health_and_security_headers() {
    let server = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let res = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Welcome to the Agro Geospatial API");

    let health: Value = client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["timestamp"].is_string());

    server.stop().await;
}

#[tokio::test]
async fn test_search_location() {
    let server = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let body: Value = client
        .get(server.url("/search_location?q=Pune"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["query"], "Pune");
    assert_eq!(body["results"][0]["name"], "Sample location for Pune");
    assert_eq!(body["results"][0]["address"], "Sample address for Pune, India");

    let res = client.get(server.url("/search_location")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("'q'"));

    server.stop().await;
}

#[tokio::test]
async fn test_vector_endpoints() {
    let server = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let upload = json!({
        "type": "FeatureCollection",
        "features": [{ "type": "Feature", "properties": {}, "geometry": field_polygon() }]
    });
    let body: Value = client
        .post(server.url("/vector/upload"))
        .json(&upload)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["feature_count"], 1);

    let res = client
        .post(server.url("/vector/upload"))
        .json(&json!({ "type": "FeatureCollection" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let user: Value = client
        .get(server.url("/vector/user-data"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user["features"][0]["properties"]["name"], "Sample Field");

    let layers: Value = client
        .post(server.url("/vector/get_vector_data"))
        .json(&json!({ "coordinates": { "lat": 18.5, "lng": 73.85 } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(layers["soil"]["features"][0]["properties"]["soil_type"], "Alluvial");
    assert_eq!(layers["crop_suitability"]["features"].as_array().unwrap().len(), 2);
    assert_eq!(layers["rainfall"]["features"][0]["geometry"]["type"], "Polygon");

    let res = client
        .post(server.url("/vector/get_vector_data"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    server.stop().await;
}

#[tokio::test]
async fn test_raster_endpoints() {
    let server = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let body: Value = client
        .post(server.url("/raster/get_raster_data"))
        .json(&json!({
            "polygon": field_polygon(),
            "raster_type": "NDVI",
            "start_date": "2024-01-01",
            "end_date": "2024-01-31"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["raster_type"], "NDVI");
    assert_eq!(body["width"], 100);
    assert_eq!(body["height"], 100);
    assert_eq!(body["crs"], "EPSG:4326");
    assert_eq!(body["start_date"], "2024-01-01");
    let min = body["ndvi_min"].as_f64().unwrap();
    let max = body["ndvi_max"].as_f64().unwrap();
    let mean = body["ndvi_mean"].as_f64().unwrap();
    assert!(-1.0 <= min && min <= mean && mean <= max && max <= 1.0);
    let url = body["ndviUrl"].as_str().unwrap();
    assert!(url.starts_with("/raster/get_raster_file?filename=ndvi_"));

    let file: Value = client
        .get(server.url(url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(file["message"].as_str().unwrap().contains("ndvi_"));

    let res = client
        .post(server.url("/raster/get_raster_data"))
        .json(&json!({ "polygon": field_polygon(), "raster_type": "evi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Unsupported raster type: evi");

    let res = client
        .post(server.url("/raster/get_raster_data"))
        .json(&json!({ "raster_type": "ndvi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    server.stop().await;
}

#[tokio::test]
async fn test_report_endpoints() {
    let server = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let body: Value = client
        .post(server.url("/report/generate_report"))
        .json(&json!({ "polygon": field_polygon() }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let url = body["report_url"].as_str().unwrap();
    assert!(url.starts_with("/report/download_report?filename=report_"));
    assert_eq!(body["summary"]["title"], "Agricultural Intelligence Report");
    assert_eq!(body["summary"]["ndvi"]["health_status"], "Excellent");

    let download: Value = client
        .get(server.url(url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(download["message"].as_str().unwrap().ends_with(".pdf"));

    let res = client
        .post(server.url("/report/generate_report"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Polygon must be provided");

    let res = client
        .get(server.url("/report/download_report?filename=../secret"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_bodies_use_detail_shape() {
    let server = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let cases = [
        ("/raster/get_raster_data", json!({ "polygon": 5, "raster_type": 3 })),
        ("/vector/get_vector_data", json!({ "coordinates": { "lat": "x" } })),
        ("/report/generate_report", json!("not an object")),
    ];
    for (path, body) in cases {
        let res = client.post(server.url(path)).json(&body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "{path}");
        assert!(res.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        let body: Value = res.json().await.unwrap();
        assert!(body["detail"].is_string(), "{path}: {body}");
    }

    let res = client
        .post(server.url("/vector/upload"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["detail"].is_string());

    server.stop().await;
}
