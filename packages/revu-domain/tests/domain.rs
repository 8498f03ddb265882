use serde_json::json;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use revu_domain::{
	AnalysisFocus, AnalysisRecord, AnalysisStatus, AnalysisType, Error, Review,
	planned_types,
	result::{AnalysisPayload, validate_result},
	scoring::{ScoreBreakdown, ScoringProfile, length_fitness, rating_relevance},
	sizing::target_sample_size,
};

#[test]
fn planned_types_skip_competitor_types_without_competitors() {
	let without = planned_types(0);
	let with = planned_types(2);

	assert_eq!(without.len(), 11);
	assert_eq!(with.len(), 13);
	assert!(!without.contains(&AnalysisType::Competition));
	assert!(!without.contains(&AnalysisType::CrossComparison));
	assert_eq!(with.last(), Some(&AnalysisType::StrategicRecommendations));
}

#[test]
fn cross_comparison_depends_on_four_product_analyses() {
	let required = AnalysisType::CrossComparison.requirements();

	assert_eq!(
		required,
		&[
			AnalysisType::Description,
			AnalysisType::Swot,
			AnalysisType::Stp,
			AnalysisType::CustomerJourney
		]
	);
	assert_eq!(AnalysisType::CrossComparison.competitor_subanalyses().len(), 4);
	assert!(AnalysisType::Sentiment.requirements().is_empty());
}

#[test]
fn analysis_type_round_trips_through_its_wire_name() {
	for analysis_type in AnalysisType::ALL {
		let parsed: AnalysisType = analysis_type.as_str().parse().expect("Known type must parse.");
		let encoded = serde_json::to_value(analysis_type).expect("Type must serialize.");

		assert_eq!(parsed, analysis_type);
		assert_eq!(encoded, json!(analysis_type.as_str()));
	}

	let err = "word_cloud".parse::<AnalysisType>().expect_err("Unknown type must be rejected.");

	assert!(matches!(err, Error::UnknownAnalysisType { .. }));
}

#[test]
fn sample_sizes_follow_corpus_tiers() {
	assert_eq!(target_sample_size(AnalysisType::Description, 30), 30);
	assert_eq!(target_sample_size(AnalysisType::Description, 1_000), 250);
	assert_eq!(target_sample_size(AnalysisType::Stp, 1_000), 375);
}

#[test]
fn score_breakdown_applies_fixed_weights() {
	let breakdown = ScoreBreakdown::combine(100.0, 100.0, 100.0, 100.0, 100.0);

	assert!((breakdown.total - 100.0).abs() < 1e-9);

	let semantic_only = ScoreBreakdown::combine(50.0, 0.0, 0.0, 0.0, 0.0);

	assert!((semantic_only.total - 20.0).abs() < 1e-9);
}

#[test]
fn swot_profile_prefers_long_extreme_reviews() {
	let profile = ScoringProfile::for_type(AnalysisType::Swot);

	assert_eq!(length_fitness(100, profile.length), 100.0);
	assert!(
		rating_relevance(Some(1.0), profile.rating_regime)
			> rating_relevance(Some(3.0), profile.rating_regime)
	);
	assert_eq!(profile.query_text(Some("Kettle")), format!("Kettle: {}", profile.relevance_query));
}

#[test]
fn valid_swot_result_is_accepted() {
	let value = json!({
		"strengths": ["sturdy"],
		"weaknesses": ["heavy"],
		"opportunities": [],
		"threats": ["cheaper rivals"]
	});
	let payload = validate_result(AnalysisType::Swot, AnalysisFocus::Full, value)
		.expect("Result must validate.");

	assert_eq!(payload.analysis_type(), AnalysisType::Swot);
	assert_eq!(payload.to_data()["threats"][0], "cheaper rivals");
}

#[test]
fn strengths_weaknesses_focus_accepts_reduced_swot() {
	let value = json!({ "strengths": ["quiet"], "weaknesses": [] });
	let payload = validate_result(AnalysisType::Swot, AnalysisFocus::StrengthsWeaknesses, value)
		.expect("Reduced result must validate.");

	assert!(matches!(payload, AnalysisPayload::SwotStrengthsWeaknesses(_)));
}

#[test]
fn service_reported_error_is_surfaced() {
	let value = json!({ "error": "Context window exceeded." });
	let err = validate_result(AnalysisType::Sentiment, AnalysisFocus::Full, value)
		.expect_err("Error field must fail validation.");

	assert!(matches!(err, Error::ServiceReported { ref message } if message == "Context window exceeded."));
}

#[test]
fn malformed_and_empty_results_are_rejected() {
	let missing = validate_result(AnalysisType::Personas, AnalysisFocus::Full, json!({ "x": 1 }));
	let empty = validate_result(AnalysisType::Personas, AnalysisFocus::Full, json!({ "personas": [] }));
	let bad_share = validate_result(
		AnalysisType::Sentiment,
		AnalysisFocus::Full,
		json!({ "overall": "mixed", "positive": 140.0, "neutral": 0.0, "negative": 0.0 }),
	);
	let bad_stars = validate_result(
		AnalysisType::RatingBreakdown,
		AnalysisFocus::Full,
		json!({ "ratings": [{ "stars": 6, "reasons": [] }] }),
	);

	for outcome in [missing, empty, bad_share, bad_stars] {
		assert!(matches!(outcome, Err(Error::MalformedResult { .. })));
	}
}

#[test]
fn review_serializes_dates_as_rfc3339() {
	let review = Review {
		review_id: Uuid::nil(),
		product_id: Uuid::nil(),
		competitor_id: None,
		text: "Works well".to_string(),
		rating: Some(4.6),
		date: Some(OffsetDateTime::UNIX_EPOCH + Duration::days(1)),
		word_count: 2,
	};
	let encoded = serde_json::to_value(&review).expect("Review must serialize.");

	assert_eq!(encoded["date"], "1970-01-02T00:00:00Z");
	assert_eq!(review.rating_bucket(), Some(5));

	let decoded: Review = serde_json::from_value(encoded).expect("Review must deserialize.");

	assert_eq!(decoded, review);
}

#[test]
fn failed_record_carries_error_and_no_data() {
	let record = AnalysisRecord::failed(
		Uuid::nil(),
		AnalysisType::Competition,
		"No reviews found.",
		OffsetDateTime::UNIX_EPOCH,
	);

	assert_eq!(record.status, AnalysisStatus::Failed);
	assert_eq!(record.error.as_deref(), Some("No reviews found."));
	assert!(record.data.is_null());
}
