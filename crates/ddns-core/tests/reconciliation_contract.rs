//! Contract Test: Per-Family Reconciliation
//!
//! Constraints verified:
//! - No update is sent when the published address matches
//! - Exactly one update per mismatching family, carrying the discovered address
//! - A missing record is skipped (or published, per policy)
//! - IPv4 and IPv6 are evaluated independently of each other

mod common;

use common::*;
use ddns_core::{DomainRecord, IpFamily, MissingRecordPolicy, Secret};

#[tokio::test]
async fn matching_addresses_send_no_update() {
    let source = FixedAddressSource::new(Some("203.0.113.5"), Some("2001:db8::1"));
    let resolver = ScriptedResolver::new()
        .answer("home.example.com", IpFamily::V4, Answer::Record("203.0.113.5"))
        .answer("home.example.com", IpFamily::V6, Answer::Record("2001:db8::1"));
    let provider = RecordingProvider::new();

    let report = engine(&source, resolver, provider.clone(), MissingRecordPolicy::Skip)
        .run(&[dual_stack("home.example.com")])
        .await;

    assert!(provider.calls().is_empty(), "no update expected");
    assert_eq!(report.attempted(), 0);
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes.iter().all(|o| o.detail == "up to date"));
}

#[tokio::test]
async fn only_changed_family_is_updated() {
    // discovered = {203.0.113.5, 2001:db8::1}; published = {203.0.113.4, 2001:db8::1}
    let source = FixedAddressSource::new(Some("203.0.113.5"), Some("2001:db8::1"));
    let resolver = ScriptedResolver::new()
        .answer("home.example.com", IpFamily::V4, Answer::Record("203.0.113.4"))
        .answer("home.example.com", IpFamily::V6, Answer::Record("2001:db8::1"));
    let provider = RecordingProvider::new();

    let report = engine(&source, resolver, provider.clone(), MissingRecordPolicy::Skip)
        .run(&[dual_stack("home.example.com")])
        .await;

    assert_eq!(
        provider.calls(),
        vec![UpdateCall {
            domain: "home.example.com".to_string(),
            family: IpFamily::V4,
            credential: "home.example.com-v4".to_string(),
            myip: ip("203.0.113.5"),
        }]
    );
    assert!(provider.calls_for(IpFamily::V6).is_empty());
    assert_eq!(report.succeeded(), 1);
}

#[tokio::test]
async fn both_families_changed_send_one_update_each() {
    let source = FixedAddressSource::new(Some("203.0.113.5"), Some("2001:db8::2"));
    let resolver = ScriptedResolver::new()
        .answer("home.example.com", IpFamily::V4, Answer::Record("203.0.113.4"))
        .answer("home.example.com", IpFamily::V6, Answer::Record("2001:db8::1"));
    let provider = RecordingProvider::new();

    engine(&source, resolver, provider.clone(), MissingRecordPolicy::Skip)
        .run(&[dual_stack("home.example.com")])
        .await;

    let v4 = provider.calls_for(IpFamily::V4);
    let v6 = provider.calls_for(IpFamily::V6);
    assert_eq!(v4.len(), 1);
    assert_eq!(v4[0].myip, ip("203.0.113.5"));
    assert_eq!(v6.len(), 1);
    assert_eq!(v6[0].myip, ip("2001:db8::2"));
    assert_eq!(v6[0].credential, "home.example.com-v6");
}

#[tokio::test]
async fn missing_v6_record_is_skipped_and_v4_proceeds() {
    let source = FixedAddressSource::new(Some("203.0.113.5"), Some("2001:db8::1"));
    let resolver = ScriptedResolver::new()
        .answer("home.example.com", IpFamily::V4, Answer::Record("203.0.113.4"))
        .answer("home.example.com", IpFamily::V6, Answer::Missing);
    let provider = RecordingProvider::new();
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let report = engine(&source, resolver, provider.clone(), MissingRecordPolicy::Skip)
        .run(&[dual_stack("home.example.com")])
        .await;

    assert_eq!(logs.lines_containing("publishes no AAAA record"), 1);
    assert_eq!(logs.lines_containing("publishes no A record"), 0);
    assert!(provider.calls_for(IpFamily::V6).is_empty());
    assert_eq!(provider.calls_for(IpFamily::V4).len(), 1);

    let v6: Vec<_> = report.outcomes_for("home.example.com", IpFamily::V6).collect();
    assert_eq!(v6.len(), 1);
    assert!(!v6[0].attempted);
    assert_eq!(v6[0].detail, "no AAAA record published");
}

#[tokio::test]
async fn publish_policy_creates_missing_record() {
    let source = FixedAddressSource::new(Some("203.0.113.5"), Some("2001:db8::1"));
    let resolver = ScriptedResolver::new()
        .answer("home.example.com", IpFamily::V4, Answer::Record("203.0.113.5"))
        .answer("home.example.com", IpFamily::V6, Answer::Missing);
    let provider = RecordingProvider::new();

    engine(&source, resolver, provider.clone(), MissingRecordPolicy::Publish)
        .run(&[dual_stack("home.example.com")])
        .await;

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].family, IpFamily::V6);
    assert_eq!(calls[0].myip, ip("2001:db8::1"));
}

#[tokio::test]
async fn v6_lookup_failure_does_not_block_v4() {
    let source = FixedAddressSource::new(Some("203.0.113.5"), Some("2001:db8::1"));
    let resolver = ScriptedResolver::new()
        .answer("home.example.com", IpFamily::V4, Answer::Record("203.0.113.4"))
        .answer("home.example.com", IpFamily::V6, Answer::Unreachable);
    let provider = RecordingProvider::new();

    let report = engine(&source, resolver, provider.clone(), MissingRecordPolicy::Publish)
        .run(&[dual_stack("home.example.com")])
        .await;

    assert_eq!(provider.calls_for(IpFamily::V4).len(), 1);
    assert!(provider.calls_for(IpFamily::V6).is_empty());

    let v6: Vec<_> = report.outcomes_for("home.example.com", IpFamily::V6).collect();
    assert!(!v6[0].attempted);
    assert!(v6[0].detail.contains("Resolver error"));
}

#[tokio::test]
async fn v4_lookup_failure_does_not_block_v6() {
    let source = FixedAddressSource::new(Some("203.0.113.5"), Some("2001:db8::2"));
    let resolver = ScriptedResolver::new()
        .answer("home.example.com", IpFamily::V4, Answer::Unreachable)
        .answer("home.example.com", IpFamily::V6, Answer::Record("2001:db8::1"));
    let provider = RecordingProvider::new();

    engine(&source, resolver, provider.clone(), MissingRecordPolicy::Skip)
        .run(&[dual_stack("home.example.com")])
        .await;

    assert!(provider.calls_for(IpFamily::V4).is_empty());
    assert_eq!(provider.calls_for(IpFamily::V6).len(), 1);
}

#[tokio::test]
async fn failed_v6_discovery_skips_v6_everywhere() {
    let source = FixedAddressSource::new(Some("203.0.113.5"), None);
    let resolver = ScriptedResolver::new()
        .answer("a.example.com", IpFamily::V4, Answer::Record("203.0.113.4"))
        .answer("b.example.com", IpFamily::V4, Answer::Record("203.0.113.4"));
    let provider = RecordingProvider::new();

    let report = engine(&source, resolver.clone(), provider.clone(), MissingRecordPolicy::Publish)
        .run(&[dual_stack("a.example.com"), dual_stack("b.example.com")])
        .await;

    assert_eq!(source.calls(), vec![IpFamily::V4, IpFamily::V6]);
    assert_eq!(provider.calls_for(IpFamily::V4).len(), 2);
    assert!(provider.calls_for(IpFamily::V6).is_empty());
    assert!(resolver.calls().iter().all(|(_, family)| *family == IpFamily::V4));
    assert!(
        report
            .outcomes_for("b.example.com", IpFamily::V6)
            .all(|o| o.detail == "IPv6 address unavailable")
    );
}

#[tokio::test]
async fn legacy_record_never_touches_v6() {
    let source = FixedAddressSource::new(Some("203.0.113.5"), Some("2001:db8::1"));
    let resolver = ScriptedResolver::new()
        .answer("nas.example.com", IpFamily::V4, Answer::Record("203.0.113.4"));
    let provider = RecordingProvider::new();

    let record = DomainRecord::legacy("nas.example.com", Secret::new("legacy-key"));
    let report = engine(&source, resolver.clone(), provider.clone(), MissingRecordPolicy::Publish)
        .run(&[record])
        .await;

    assert_eq!(source.calls(), vec![IpFamily::V4], "v6 discovery not needed");
    assert_eq!(resolver.calls(), vec![("nas.example.com".to_string(), IpFamily::V4)]);
    assert_eq!(provider.calls().len(), 1);
    assert_eq!(provider.calls()[0].credential, "legacy-key");
    assert_eq!(report.outcomes.len(), 1);
}
