use std::collections::BTreeMap;

use super::*;

fn checkout_labels() -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), "checkout".to_string());
    labels.insert("tier".to_string(), "web".to_string());
    labels
}

fn viewer_claims() -> RoleClaims {
    RoleClaims {
        jti: "00000000-0000-0000-0000-000000000001".into(),
        sub: "viewer".into(),
        namespaces: vec!["prod".into()],
        workloads: vec![LabelMatch { key: "app".into(), value: "*".into() }],
        env_vars: vec![LabelMatch { key: "app".into(), value: "payments".into() }],
    }
}

#[test]
fn namespace_access_honors_explicit_and_wildcard_grants() {
    let claims = viewer_claims();
    assert!(claims.can_access_namespace("prod"), "expected access to explicitly granted namespace");
    assert!(!claims.can_access_namespace("kube-system"), "expected no access to ungranted namespace");

    let mut wildcard = viewer_claims();
    wildcard.namespaces = vec!["*".into()];
    assert!(wildcard.can_access_namespace("kube-system"), "expected wildcard grant to cover any namespace");
}

#[test]
fn workload_access_requires_a_matching_label() {
    let claims = viewer_claims();
    assert!(claims.can_access_workload(&checkout_labels()), "expected wildcard app matcher to admit checkout labels");

    let mut unlabelled = BTreeMap::new();
    unlabelled.insert("tier".to_string(), "web".to_string());
    assert!(!claims.can_access_workload(&unlabelled), "expected no access without the matched label key");
}

#[test]
fn env_var_access_is_narrower_than_workload_access() {
    let claims = viewer_claims();
    assert!(!claims.can_access_env_vars(&checkout_labels()), "expected env var access denied for checkout");

    let mut payments = BTreeMap::new();
    payments.insert("app".to_string(), "payments".to_string());
    assert!(claims.can_access_env_vars(&payments), "expected env var access granted for payments");
}

#[test]
fn app_filter_matches_any_label_value_and_defaults_open() {
    let claims = viewer_claims();
    let labels = checkout_labels();
    assert!(claims.matches_app_filter(&labels, None), "expected no filter to match unconditionally");
    assert!(claims.matches_app_filter(&labels, Some("checkout")), "expected filter to match a label value");
    assert!(!claims.matches_app_filter(&labels, Some("payments")), "expected filter miss for unrelated app name");
}
