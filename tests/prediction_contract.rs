/// Integration tests for the prediction request/response contract.
///
/// Run with: cargo test --test prediction_contract -- --nocapture
///
/// None of these require the model artifacts: they exercise the validation,
/// ranking, and response-assembly layers through the library API.

use crop_predictor::catalog;
use crop_predictor::model::rank_descending;
use crop_predictor::schema::{format_violations, CropInput, FIELD_RANGES};
use crop_predictor::server::build_response;

fn example_body() -> serde_json::Value {
    serde_json::json!({
        "N": 70, "P": 40, "K": 60, "ph": 6.5, "temperature": 22.0,
        "humidity": 65.0, "rainfall": 1100.0, "altitude_m": 2400.0,
        "Zn": 5.0, "S": 20.0, "soil_moisture": 0.6
    })
}

#[test]
fn test_documented_example_validates() {
    println!("\n=== Test: Documented Example Validates ===");
    let input: CropInput = serde_json::from_value(example_body()).unwrap();
    let fv = input.validate().expect("documented example must be accepted");
    println!("✓ Feature vector: {:?}", fv.as_slice());
    assert_eq!(fv.as_slice().len(), FIELD_RANGES.len());
}

#[test]
fn test_every_missing_field_is_named() {
    println!("\n=== Test: Aggregated Missing-Field Errors ===");
    let input: CropInput = serde_json::from_value(serde_json::json!({
        "N": 70, "ph": 6.5, "temperature": 22.0
    }))
    .unwrap();
    let violations = input.validate().expect_err("partial body must fail");
    let message = format_violations(&violations);
    println!("✓ Aggregate message:\n{}", message);

    for field in ["P", "K", "humidity", "rainfall", "altitude_m", "Zn", "S", "soil_moisture"] {
        assert!(
            message.lines().any(|l| l.starts_with(&format!("{}:", field))),
            "message missing field {}",
            field
        );
    }
    assert_eq!(violations.len(), 8);
}

#[test]
fn test_out_of_range_ph_names_the_field() {
    println!("\n=== Test: Out-of-Range ph ===");
    let mut body = example_body();
    body["ph"] = serde_json::json!(11.0);
    let input: CropInput = serde_json::from_value(body).unwrap();
    let violations = input.validate().expect_err("ph=11 must be rejected");
    let message = format_violations(&violations);
    println!("✓ Rejection: {}", message);
    assert!(message.contains("ph"));
}

#[test]
fn test_ranking_and_response_assembly_end_to_end() {
    println!("\n=== Test: Ranking + Response Assembly ===");
    // A softmax-shaped distribution over the full catalog label set.
    let classes: Vec<String> = catalog::known_groups().map(String::from).collect();
    let probs = vec![0.02, 0.55, 0.08, 0.20, 0.05, 0.07, 0.03];
    assert_eq!(classes.len(), probs.len());

    let ranked: Vec<(String, f64)> = rank_descending(&probs)
        .into_iter()
        .map(|i| (classes[i].clone(), probs[i]))
        .collect();
    let resp = build_response(&ranked).expect("non-empty ranking");

    println!(
        "✓ recommended={} confidence={}%",
        resp.recommended_crop, resp.confidence_pct
    );
    assert_eq!(resp.recommended_crop, "Pulses");
    assert_eq!(resp.confidence_pct, 55.0);
    assert_eq!(resp.top3_recommendations.len(), 3);
    assert_eq!(resp.top3_recommendations[0].crop, resp.recommended_crop);
    assert_eq!(resp.top3_recommendations[1].crop, "Root_Crops");

    let pcts: Vec<f64> = resp
        .top3_recommendations
        .iter()
        .map(|e| e.probability_pct)
        .collect();
    assert!(pcts.windows(2).all(|w| w[0] >= w[1]), "not sorted: {:?}", pcts);

    assert_eq!(
        resp.crops_in_group,
        catalog::crops_for("Pulses")
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
    );
    assert!(!resp.explanation.is_empty());
}

#[test]
fn test_response_wire_format() {
    println!("\n=== Test: Response JSON Shape ===");
    let ranked = vec![
        ("Major_Cereals".to_string(), 0.7),
        ("Pulses".to_string(), 0.2),
        ("Oilseeds".to_string(), 0.1),
    ];
    let body = serde_json::to_value(build_response(&ranked).unwrap()).unwrap();
    println!("✓ Body: {}", body);

    for key in [
        "recommended_crop",
        "crops_in_group",
        "explanation",
        "confidence_pct",
        "top3_recommendations",
    ] {
        assert!(body.get(key).is_some(), "missing key {}", key);
    }
    let first = &body["top3_recommendations"][0];
    assert_eq!(first["crop"], "Major_Cereals");
    assert!(first["crops_in_group"].is_array());
    assert_eq!(first["probability_pct"], 70.0);
}
