//! Typed result shapes for every analysis type.
//!
//! The analysis service answers with free-form JSON. [`validate_result`] decodes it into the
//! variant for the requested type and rejects answers that are structurally empty, so only
//! well-formed results are ever persisted as completed.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{AnalysisFocus, AnalysisType, Error};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Insight {
	pub theme: String,
	#[serde(default)]
	pub detail: String,
	#[serde(default)]
	pub quotes: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DescriptionResult {
	pub summary: String,
	#[serde(default)]
	pub key_features: Vec<String>,
	#[serde(default)]
	pub use_cases: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SentimentResult {
	pub overall: String,
	/// Percentages, 0-100.
	pub positive: f64,
	pub neutral: f64,
	pub negative: f64,
	#[serde(default)]
	pub drivers: Vec<Insight>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VoiceOfCustomerResult {
	pub themes: Vec<Insight>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RatingReasons {
	pub stars: u8,
	#[serde(default)]
	pub reasons: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RatingBreakdownResult {
	pub ratings: Vec<RatingReasons>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FourAxisMatrixResult {
	pub who: Vec<String>,
	pub what: Vec<String>,
	pub when: Vec<String>,
	#[serde(rename = "where")]
	pub where_: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Job {
	pub job: String,
	#[serde(default)]
	pub pains: Vec<String>,
	#[serde(default)]
	pub gains: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct JobsToBeDoneResult {
	pub jobs: Vec<Job>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Segment {
	pub name: String,
	#[serde(default)]
	pub description: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StpResult {
	pub segments: Vec<Segment>,
	pub targeting: String,
	pub positioning: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SwotResult {
	pub strengths: Vec<String>,
	pub weaknesses: Vec<String>,
	pub opportunities: Vec<String>,
	pub threats: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StrengthsWeaknessesResult {
	pub strengths: Vec<String>,
	pub weaknesses: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct JourneyStage {
	pub stage: String,
	#[serde(default)]
	pub touchpoints: Vec<String>,
	#[serde(default)]
	pub pain_points: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CustomerJourneyResult {
	pub stages: Vec<JourneyStage>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Persona {
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub goals: Vec<String>,
	#[serde(default)]
	pub frustrations: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PersonasResult {
	pub personas: Vec<Persona>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CompetitorComparison {
	pub competitor: String,
	#[serde(default)]
	pub advantages: Vec<String>,
	#[serde(default)]
	pub disadvantages: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CompetitionResult {
	pub summary: String,
	pub competitors: Vec<CompetitorComparison>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CrossComparisonResult {
	pub summary: String,
	#[serde(default)]
	pub product_position: String,
	#[serde(default)]
	pub comparisons: Vec<CompetitorComparison>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Recommendation {
	pub title: String,
	#[serde(default)]
	pub rationale: String,
	#[serde(default)]
	pub priority: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StrategicRecommendationsResult {
	pub recommendations: Vec<Recommendation>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AnalysisPayload {
	Description(DescriptionResult),
	Sentiment(SentimentResult),
	VoiceOfCustomer(VoiceOfCustomerResult),
	RatingBreakdown(RatingBreakdownResult),
	FourAxisMatrix(FourAxisMatrixResult),
	JobsToBeDone(JobsToBeDoneResult),
	Stp(StpResult),
	Swot(SwotResult),
	SwotStrengthsWeaknesses(StrengthsWeaknessesResult),
	CustomerJourney(CustomerJourneyResult),
	Personas(PersonasResult),
	Competition(CompetitionResult),
	CrossComparison(CrossComparisonResult),
	StrategicRecommendations(StrategicRecommendationsResult),
}
impl AnalysisPayload {
	pub fn analysis_type(&self) -> AnalysisType {
		match self {
			Self::Description(_) => AnalysisType::Description,
			Self::Sentiment(_) => AnalysisType::Sentiment,
			Self::VoiceOfCustomer(_) => AnalysisType::VoiceOfCustomer,
			Self::RatingBreakdown(_) => AnalysisType::RatingBreakdown,
			Self::FourAxisMatrix(_) => AnalysisType::FourAxisMatrix,
			Self::JobsToBeDone(_) => AnalysisType::JobsToBeDone,
			Self::Stp(_) => AnalysisType::Stp,
			Self::Swot(_) | Self::SwotStrengthsWeaknesses(_) => AnalysisType::Swot,
			Self::CustomerJourney(_) => AnalysisType::CustomerJourney,
			Self::Personas(_) => AnalysisType::Personas,
			Self::Competition(_) => AnalysisType::Competition,
			Self::CrossComparison(_) => AnalysisType::CrossComparison,
			Self::StrategicRecommendations(_) => AnalysisType::StrategicRecommendations,
		}
	}

	/// The result body as stored in an analysis record, without the type tag.
	pub fn to_data(&self) -> Value {
		let tagged = serde_json::to_value(self).unwrap_or(Value::Null);

		match tagged {
			Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
			_ => Value::Null,
		}
	}
}

pub fn validate_result(
	analysis_type: AnalysisType,
	focus: AnalysisFocus,
	value: Value,
) -> Result<AnalysisPayload, Error> {
	if let Some(message) = value.get("error").and_then(Value::as_str) {
		return Err(Error::ServiceReported { message: message.to_string() });
	}

	let payload = match (analysis_type, focus) {
		(AnalysisType::Swot, AnalysisFocus::StrengthsWeaknesses) => {
			let result: StrengthsWeaknessesResult = decode(analysis_type, value)?;

			require(
				analysis_type,
				!(result.strengths.is_empty() && result.weaknesses.is_empty()),
				"strengths and weaknesses are both empty",
			)?;

			AnalysisPayload::SwotStrengthsWeaknesses(result)
		},
		(AnalysisType::Description, _) => {
			let result: DescriptionResult = decode(analysis_type, value)?;

			require(analysis_type, !result.summary.trim().is_empty(), "summary is empty")?;

			AnalysisPayload::Description(result)
		},
		(AnalysisType::Sentiment, _) => {
			let result: SentimentResult = decode(analysis_type, value)?;
			let in_range = [result.positive, result.neutral, result.negative]
				.iter()
				.all(|share| share.is_finite() && (0.0..=100.0).contains(share));

			require(analysis_type, in_range, "sentiment shares must be within 0-100")?;

			AnalysisPayload::Sentiment(result)
		},
		(AnalysisType::VoiceOfCustomer, _) => {
			let result: VoiceOfCustomerResult = decode(analysis_type, value)?;

			require(analysis_type, !result.themes.is_empty(), "themes are empty")?;

			AnalysisPayload::VoiceOfCustomer(result)
		},
		(AnalysisType::RatingBreakdown, _) => {
			let result: RatingBreakdownResult = decode(analysis_type, value)?;
			let valid_stars = result.ratings.iter().all(|entry| (1..=5).contains(&entry.stars));

			require(analysis_type, !result.ratings.is_empty(), "ratings are empty")?;
			require(analysis_type, valid_stars, "stars must be within 1-5")?;

			AnalysisPayload::RatingBreakdown(result)
		},
		(AnalysisType::FourAxisMatrix, _) => {
			let result: FourAxisMatrixResult = decode(analysis_type, value)?;
			let empty = result.who.is_empty()
				&& result.what.is_empty()
				&& result.when.is_empty()
				&& result.where_.is_empty();

			require(analysis_type, !empty, "every axis is empty")?;

			AnalysisPayload::FourAxisMatrix(result)
		},
		(AnalysisType::JobsToBeDone, _) => {
			let result: JobsToBeDoneResult = decode(analysis_type, value)?;

			require(analysis_type, !result.jobs.is_empty(), "jobs are empty")?;

			AnalysisPayload::JobsToBeDone(result)
		},
		(AnalysisType::Stp, _) => {
			let result: StpResult = decode(analysis_type, value)?;

			require(analysis_type, !result.segments.is_empty(), "segments are empty")?;

			AnalysisPayload::Stp(result)
		},
		(AnalysisType::Swot, AnalysisFocus::Full) => {
			let result: SwotResult = decode(analysis_type, value)?;
			let empty = result.strengths.is_empty()
				&& result.weaknesses.is_empty()
				&& result.opportunities.is_empty()
				&& result.threats.is_empty();

			require(analysis_type, !empty, "every quadrant is empty")?;

			AnalysisPayload::Swot(result)
		},
		(AnalysisType::CustomerJourney, _) => {
			let result: CustomerJourneyResult = decode(analysis_type, value)?;

			require(analysis_type, !result.stages.is_empty(), "stages are empty")?;

			AnalysisPayload::CustomerJourney(result)
		},
		(AnalysisType::Personas, _) => {
			let result: PersonasResult = decode(analysis_type, value)?;

			require(analysis_type, !result.personas.is_empty(), "personas are empty")?;

			AnalysisPayload::Personas(result)
		},
		(AnalysisType::Competition, _) => {
			let result: CompetitionResult = decode(analysis_type, value)?;

			require(analysis_type, !result.competitors.is_empty(), "competitors are empty")?;

			AnalysisPayload::Competition(result)
		},
		(AnalysisType::CrossComparison, _) => {
			let result: CrossComparisonResult = decode(analysis_type, value)?;

			require(analysis_type, !result.summary.trim().is_empty(), "summary is empty")?;

			AnalysisPayload::CrossComparison(result)
		},
		(AnalysisType::StrategicRecommendations, _) => {
			let result: StrategicRecommendationsResult = decode(analysis_type, value)?;

			require(analysis_type, !result.recommendations.is_empty(), "recommendations are empty")?;

			AnalysisPayload::StrategicRecommendations(result)
		},
	};

	Ok(payload)
}

fn decode<T>(analysis_type: AnalysisType, value: Value) -> Result<T, Error>
where
	T: DeserializeOwned,
{
	serde_json::from_value(value)
		.map_err(|err| Error::MalformedResult { analysis_type, message: err.to_string() })
}

fn require(analysis_type: AnalysisType, condition: bool, message: &str) -> Result<(), Error> {
	if condition {
		return Ok(());
	}

	Err(Error::MalformedResult { analysis_type, message: message.to_string() })
}
