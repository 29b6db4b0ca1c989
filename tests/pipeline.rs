//! End-to-end runs of the consumer-facing operations against a local server.

use std::time::{Duration, Instant};

use skrapa::config::RetrySettings;
use skrapa::{NewsSource, Pipeline, ScrapeError, Settings, WeatherSource};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const YR_FIXTURE: &str = include_str!("fixtures/yr_karlstad.html");

fn fast_settings(max_attempts: u32) -> Settings {
    Settings {
        retry: RetrySettings {
            max_attempts,
            base_delay_ms: 0,
            max_delay_ms: 0,
        },
        rate_limit_ms: 0,
        ..Settings::default()
    }
}

#[tokio::test]
async fn yr_weather_from_recorded_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/yr"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(YR_FIXTURE),
        )
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(fast_settings(3))
        .unwrap()
        .with_yr(WeatherSource::yr().with_url(format!("{}/yr", server.uri())));
    let record = pipeline.yr_weather().await.unwrap();

    assert_eq!(
        serde_json::to_string(&record).unwrap(),
        r#"{"Temperatur":"11°","Väder":"Delvis skyet","Vind":"3","Nederbörd":"0,2"}"#
    );
}

#[tokio::test]
async fn deadline_bounds_unlimited_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let settings = Settings {
        retry: RetrySettings {
            max_attempts: 0,
            base_delay_ms: 10,
            max_delay_ms: 50,
        },
        deadline_secs: Some(1),
        ..Settings::default()
    };
    let pipeline = Pipeline::new(settings)
        .unwrap()
        .with_klart(WeatherSource::klart().with_url(server.uri()));

    let t0 = Instant::now();
    let err = pipeline.klart_weather().await.unwrap_err();

    assert!(matches!(err, ScrapeError::Deadline(d) if d == Duration::from_secs(1)));
    assert!(t0.elapsed() < Duration::from_secs(5));
    assert!(server.received_requests().await.unwrap().len() > 1);
}

#[tokio::test]
async fn independent_operations_run_concurrently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/yr"))
        .respond_with(ResponseTemplate::new(200).set_body_string(YR_FIXTURE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="c-teaser"><a class="c-teaser__link" href="/nyhet">x</a></div>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nyhet"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<h1 class="c-article__heading">Bro stängd</h1>
               <div class="c-article__body">Klarälvsbron är avstängd.</div>"#,
        ))
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(fast_settings(1))
        .unwrap()
        .with_yr(WeatherSource::yr().with_url(format!("{}/yr", server.uri())))
        .with_gp(NewsSource::gp().with_urls(server.uri(), server.uri()));

    let (weather, news) = tokio::join!(pipeline.yr_weather(), pipeline.gp_articles());

    assert_eq!(weather.unwrap().temperature, "11°");
    let news = news.unwrap();
    assert_eq!(
        serde_json::to_string(&news).unwrap(),
        r#"[{"Bro stängd":"Klarälvsbron är avstängd."}]"#
    );
}

#[tokio::test]
async fn pipeline_futures_can_be_spawned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(YR_FIXTURE))
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(fast_settings(1))
        .unwrap()
        .with_yr(WeatherSource::yr().with_url(server.uri()));

    let handle = tokio::spawn(async move { pipeline.yr_weather().await });
    let record = handle.await.unwrap().unwrap();
    assert_eq!(record.condition, "Delvis skyet");
}
