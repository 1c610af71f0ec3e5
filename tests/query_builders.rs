use soda_api::types::Options;
use soda_api::{Client, Error};

const BASE: &str = "https://data.example.gov";

fn client() -> Client {
    Client::with_base_url(BASE, "abcd-1234", Options::default()).unwrap()
}

#[test]
fn factory_rejects_empty_resource_id() {
    let result = Client::new("", Options::default());
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn unconfigured_client_requests_bare_resource() {
    let client = client();
    assert_eq!(
        client.request_url(),
        "https://data.example.gov/resource/abcd-1234.json?"
    );
}

#[test]
fn csv_output_changes_extension() {
    let options = Options {
        output: soda_api::types::OutputFormat::Csv,
        ..Options::default()
    };
    let client = Client::with_base_url(BASE, "abcd-1234", options).unwrap();
    assert_eq!(
        client.request_url(),
        "https://data.example.gov/resource/abcd-1234.csv?"
    );
}

#[test]
fn select_string_and_sequence_are_equivalent() {
    let mut a = client();
    a.select("name,state");
    let mut b = client();
    b.select(["name", "state"]);
    assert_eq!(a.request_url(), b.request_url());

    let mut c = client();
    c.select(vec!["name".to_string(), "state".to_string()]);
    assert_eq!(a.request_url(), c.request_url());
}

#[test]
fn select_replaces_prior_selection() {
    let mut client = client();
    client.select("name").select("state");
    assert!(client.request_url().ends_with("?$select=state"));
}

#[test]
fn filter_requires_both_column_and_value() {
    let mut client = client();
    assert!(matches!(
        client.filter("state", ""),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        client.filter("", "CA"),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn failed_filter_leaves_prior_filter_intact() {
    let mut client = client();
    client.filter("state", "CA").unwrap();
    assert!(client.filter("state", "").is_err());
    assert!(client.request_url().ends_with("?state=CA"));
}

#[test]
fn second_filter_replaces_the_first() {
    let mut client = client();
    client.filter("state", "CA").unwrap();
    client.filter("county", "Alameda").unwrap();
    let url = client.request_url();
    assert!(url.ends_with("?county=Alameda"));
    assert!(!url.contains("state=CA"));
}

#[test]
fn zero_limit_is_a_no_op() {
    let mut client = client();
    client.limit(5).limit(0);
    let url = client.request_url();
    assert!(url.ends_with("?$limit=5"));
    assert_eq!(url.matches("$limit").count(), 1);
}

#[test]
fn parameters_compose_in_fixed_order() {
    let mut client = client();
    client
        .limit(5)
        .filter("state", "CA")
        .unwrap()
        .select("name");
    assert_eq!(
        client.request_url(),
        "https://data.example.gov/resource/abcd-1234.json?$limit=5&state=CA&$select=name"
    );
}

// The original JS wrapper joined the filter with an unconditional `&`, which
// produced `?&state=CA` whenever no limit was set. The composer builds an
// ordered parameter list instead, so the filter joins cleanly when first.
#[test]
fn filter_without_limit_has_no_leading_ampersand() {
    let mut client = client();
    client.filter("state", "CA").unwrap();
    assert!(client.request_url().ends_with("?state=CA"));
    assert!(!client.request_url().contains("?&"));
}

#[test]
fn composing_repeatedly_is_idempotent() {
    let mut client = client();
    client.limit(5).select("name");
    let first = client.request_url();
    let second = client.request_url();
    assert_eq!(first, second);
    assert_eq!(second.matches("$limit=5").count(), 1);
}
