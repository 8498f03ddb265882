//! Chat-completions client for the analysis service.
//!
//! Every analysis type has a fixed result contract that is sent as the system message; the
//! selected reviews (or, for synthesis types, prior analyses) travel as a JSON user message.

use std::{collections::BTreeMap, time::Duration};

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use revu_domain::{AnalysisFocus, AnalysisType, Review};

use crate::{Error, Result};

#[derive(Clone, Debug, Serialize)]
pub struct CompetitorReviews {
	pub competitor_id: Uuid,
	pub name: String,
	pub reviews: Vec<Review>,
}

/// Sub-analysis results of one competitor, keyed by type.
#[derive(Clone, Debug, Serialize)]
pub struct CompetitorAnalyses {
	pub competitor_id: Uuid,
	pub name: String,
	pub analyses: BTreeMap<AnalysisType, Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalysisRequest {
	pub analysis_type: AnalysisType,
	pub focus: AnalysisFocus,
	pub product_name: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub reviews: Vec<Review>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub competitor_reviews: Vec<CompetitorReviews>,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub prior_analyses: BTreeMap<AnalysisType, Value>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub competitor_analyses: Vec<CompetitorAnalyses>,
}
impl AnalysisRequest {
	pub fn new(analysis_type: AnalysisType, focus: AnalysisFocus, product_name: &str) -> Self {
		Self {
			analysis_type,
			focus,
			product_name: product_name.to_string(),
			reviews: Vec::new(),
			competitor_reviews: Vec::new(),
			prior_analyses: BTreeMap::new(),
			competitor_analyses: Vec::new(),
		}
	}
}

pub async fn analyze(
	cfg: &revu_config::AnalysisProviderConfig,
	request: &AnalysisRequest,
) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let messages = build_messages(request)?;

	for attempt in 1..=cfg.max_attempts {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"response_format": { "type": "json_object" },
			"messages": messages,
		});
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		match parse_analysis_json(json) {
			Ok(parsed) => return Ok(parsed),
			Err(err) => tracing::warn!(
				analysis_type = %request.analysis_type,
				attempt,
				error = %err,
				"Analysis response is not usable JSON."
			),
		}
	}

	Err(Error::InvalidResponse {
		message: format!("Analysis response for {} is not valid JSON.", request.analysis_type),
	})
}

pub fn build_messages(request: &AnalysisRequest) -> Result<Vec<Value>> {
	let system = format!(
		"You analyse customer reviews of the product \"{}\". Respond with one JSON object and \
		 nothing else. If the input is insufficient, respond with {{\"error\": \"<reason>\"}}. {}",
		request.product_name,
		contract(request.analysis_type, request.focus)
	);
	let user = serde_json::to_string(request)?;

	Ok(vec![
		serde_json::json!({ "role": "system", "content": system }),
		serde_json::json!({ "role": "user", "content": user }),
	])
}

/// Shape of the JSON object expected back for a type.
pub fn contract(analysis_type: AnalysisType, focus: AnalysisFocus) -> &'static str {
	if analysis_type == AnalysisType::Swot && focus == AnalysisFocus::StrengthsWeaknesses {
		return "Return {\"strengths\": [string], \"weaknesses\": [string]}.";
	}

	match analysis_type {
		AnalysisType::Description =>
			"Describe the product. Return {\"summary\": string, \"key_features\": [string], \
			 \"use_cases\": [string]}.",
		AnalysisType::Sentiment =>
			"Measure sentiment. Return {\"overall\": string, \"positive\": number, \"neutral\": \
			 number, \"negative\": number, \"drivers\": [{\"theme\": string, \"detail\": string, \
			 \"quotes\": [string]}]} with percentages between 0 and 100.",
		AnalysisType::VoiceOfCustomer =>
			"Summarise recurring customer themes in their own words. Return {\"themes\": \
			 [{\"theme\": string, \"detail\": string, \"quotes\": [string]}]}.",
		AnalysisType::RatingBreakdown =>
			"Explain what drives each star rating. Return {\"ratings\": [{\"stars\": 1-5, \
			 \"reasons\": [string]}]}.",
		AnalysisType::FourAxisMatrix =>
			"Map usage context. Return {\"who\": [string], \"what\": [string], \"when\": \
			 [string], \"where\": [string]}.",
		AnalysisType::JobsToBeDone =>
			"Identify jobs to be done. Return {\"jobs\": [{\"job\": string, \"pains\": [string], \
			 \"gains\": [string]}]}.",
		AnalysisType::Stp =>
			"Segment, target and position. Return {\"segments\": [{\"name\": string, \
			 \"description\": string}], \"targeting\": string, \"positioning\": string}.",
		AnalysisType::Swot =>
			"Run a SWOT analysis. Return {\"strengths\": [string], \"weaknesses\": [string], \
			 \"opportunities\": [string], \"threats\": [string]}.",
		AnalysisType::CustomerJourney =>
			"Trace the customer journey. Return {\"stages\": [{\"stage\": string, \
			 \"touchpoints\": [string], \"pain_points\": [string]}]}.",
		AnalysisType::Personas =>
			"Derive customer personas. Return {\"personas\": [{\"name\": string, \"description\": \
			 string, \"goals\": [string], \"frustrations\": [string]}]}.",
		AnalysisType::Competition =>
			"Compare the product head to head with each competitor using both review sets. \
			 Return {\"summary\": string, \"competitors\": [{\"competitor\": string, \
			 \"advantages\": [string], \"disadvantages\": [string]}]}.",
		AnalysisType::CrossComparison =>
			"Synthesise the prior analyses of the product and its competitors. Return \
			 {\"summary\": string, \"product_position\": string, \"comparisons\": \
			 [{\"competitor\": string, \"advantages\": [string], \"disadvantages\": [string]}]}.",
		AnalysisType::StrategicRecommendations =>
			"Recommend strategic actions. Return {\"recommendations\": [{\"title\": string, \
			 \"rationale\": string, \"priority\": string}]}.",
	}
}

fn parse_analysis_json(json: Value) -> Result<Value> {
	let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	else {
		return Err(Error::InvalidResponse {
			message: "Analysis response is missing message content.".to_string(),
		});
	};
	let parsed: Value = serde_json::from_str(strip_code_fence(content))?;

	if !parsed.is_object() {
		return Err(Error::InvalidResponse {
			message: "Analysis content must be a JSON object.".to_string(),
		});
	}

	Ok(parsed)
}

fn strip_code_fence(content: &str) -> &str {
	let trimmed = content.trim();
	let Some(rest) = trimmed.strip_prefix("```") else { return trimmed };
	let rest = rest.strip_prefix("json").unwrap_or(rest);

	rest.strip_suffix("```").unwrap_or(rest).trim()
}
