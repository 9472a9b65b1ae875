use femfund::prequalify::{prequalify, score_recommendations, PreQualification};

#[test]
fn score_60_unlocks_microloan_and_peer_to_peer() {
    let result = prequalify(Some(60), 0);
    assert!(result.microloan);
    assert!(result.peer_to_peer);
    assert!(!result.grant);
    assert!(!result.venture_capital);
    assert_eq!(result.recommended_amount, 6000);
}

#[test]
fn score_90_with_track_record_unlocks_everything() {
    let result = prequalify(Some(90), 2);
    assert!(result.microloan);
    assert!(result.peer_to_peer);
    assert!(result.grant);
    assert!(result.venture_capital);
    // 5000 * 1.8 * 1.4
    assert_eq!(result.recommended_amount, 12600);
}

#[test]
fn threshold_boundaries() {
    let result = prequalify(Some(59), 0);
    assert!(!result.microloan && !result.peer_to_peer);

    let result = prequalify(Some(75), 0);
    assert!(result.grant);
    assert!(!result.venture_capital);

    let result = prequalify(Some(85), 0);
    assert!(result.venture_capital);
}

#[test]
fn missing_score_defaults_to_50() {
    let result = prequalify(None, 0);
    assert!(!result.microloan);
    assert!(!result.grant);
    assert!(!result.venture_capital);
    assert!(!result.peer_to_peer);
    assert_eq!(result.recommended_amount, 5000);
}

#[test]
fn successful_history_raises_the_recommendation() {
    // 5000 * 1.0 * 1.2
    assert_eq!(prequalify(Some(50), 1).recommended_amount, 6000);
    // 5000 * 2.0 * 2.0
    assert_eq!(prequalify(Some(100), 5).recommended_amount, 20000);
}

#[test]
fn conservative_default_shape() {
    let result = PreQualification::conservative_default();
    assert!(result.microloan);
    assert!(result.peer_to_peer);
    assert!(!result.grant);
    assert!(!result.venture_capital);
    assert_eq!(result.recommended_amount, 5000);
}

#[test]
fn serializes_with_funding_type_keys() {
    let json = serde_json::to_value(prequalify(Some(60), 0)).unwrap();
    assert_eq!(json["microloan"], true);
    assert_eq!(json["peer_to_peer"], true);
    assert_eq!(json["grant"], false);
    assert_eq!(json["venture_capital"], false);
    assert_eq!(json["recommendedAmount"], 6000);
}

#[test]
fn recommendations_follow_score_brackets() {
    let low = score_recommendations(40);
    assert_eq!(low.len(), 4);
    assert!(low[0].contains("debt-to-income"));

    let mid = score_recommendations(65);
    assert!(mid[0].contains("business plan"));

    let high = score_recommendations(85);
    assert!(high[0].contains("strong financial position"));

    // Bracket edges
    assert_eq!(score_recommendations(49), score_recommendations(40));
    assert_eq!(score_recommendations(50), score_recommendations(69));
    assert_eq!(score_recommendations(70), score_recommendations(100));
}
