//! Quote page scraping against a mock server

use test_log::test;
use pretty_assertions::assert_eq;
use assert_matches::assert_matches;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use intraday_landmarks::api::{FinvizClient, FundamentalsError, FundamentalsSource};
use intraday_landmarks::models::FieldValue;

use crate::common::fixtures::quote_page;

#[test(tokio::test)]
async fn test_fetches_and_parses_quote_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/quote.ashx"))
        .and(query_param("t", "AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_string(quote_page(&[
            ("Market Cap", "2.95T"),
            ("Shs Float", "15.28B"),
        ])))
        .mount(&server)
        .await;

    let client = FinvizClient::with_base_url(&server.uri()).unwrap();
    let row = client.fetch_fundamentals("AAPL").await.unwrap();

    assert_eq!(row.market_cap, FieldValue::Found("2.95T".to_string()));
    assert_eq!(row.float, FieldValue::Found("15.28B".to_string()));
    assert_eq!(row.missing_count(), 4);
}

#[test(tokio::test)]
async fn test_non_200_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/quote.ashx"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = FinvizClient::with_base_url(&server.uri()).unwrap();
    let err = client.fetch_fundamentals("ZZZZ").await.unwrap_err();

    assert_matches!(err, FundamentalsError::Status(404));
    assert_eq!(err.to_string(), "Failed to fetch the webpage. Status code: 404");
}
