use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
	Description,
	Sentiment,
	VoiceOfCustomer,
	RatingBreakdown,
	FourAxisMatrix,
	JobsToBeDone,
	Stp,
	Swot,
	CustomerJourney,
	Personas,
	Competition,
	CrossComparison,
	StrategicRecommendations,
}
impl AnalysisType {
	/// Declared execution order for a full run. Every type appears after the types it requires.
	pub const ALL: [Self; 13] = [
		Self::Description,
		Self::Sentiment,
		Self::VoiceOfCustomer,
		Self::RatingBreakdown,
		Self::FourAxisMatrix,
		Self::JobsToBeDone,
		Self::Stp,
		Self::Swot,
		Self::CustomerJourney,
		Self::Personas,
		Self::Competition,
		Self::CrossComparison,
		Self::StrategicRecommendations,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Description => "description",
			Self::Sentiment => "sentiment",
			Self::VoiceOfCustomer => "voice_of_customer",
			Self::RatingBreakdown => "rating_breakdown",
			Self::FourAxisMatrix => "four_axis_matrix",
			Self::JobsToBeDone => "jobs_to_be_done",
			Self::Stp => "stp",
			Self::Swot => "swot",
			Self::CustomerJourney => "customer_journey",
			Self::Personas => "personas",
			Self::Competition => "competition",
			Self::CrossComparison => "cross_comparison",
			Self::StrategicRecommendations => "strategic_recommendations",
		}
	}

	/// Types whose records must be `completed` before this type may run in a full run.
	pub fn requirements(self) -> &'static [AnalysisType] {
		match self {
			Self::CrossComparison =>
				&[Self::Description, Self::Swot, Self::Stp, Self::CustomerJourney],
			_ => &[],
		}
	}

	pub fn precondition(self) -> Precondition {
		match self {
			Self::Competition | Self::CrossComparison => Precondition::HasCompetitors,
			_ => Precondition::None,
		}
	}

	/// Reduced pipeline run once per competitor before this type's own call.
	pub fn competitor_subanalyses(self) -> &'static [SubAnalysis] {
		const CROSS_COMPARISON: [SubAnalysis; 4] = [
			SubAnalysis { analysis_type: AnalysisType::Description, focus: AnalysisFocus::Full },
			SubAnalysis {
				analysis_type: AnalysisType::Swot,
				focus: AnalysisFocus::StrengthsWeaknesses,
			},
			SubAnalysis { analysis_type: AnalysisType::Stp, focus: AnalysisFocus::Full },
			SubAnalysis {
				analysis_type: AnalysisType::CustomerJourney,
				focus: AnalysisFocus::Full,
			},
		];

		match self {
			Self::CrossComparison => &CROSS_COMPARISON,
			_ => &[],
		}
	}

	pub fn input(self) -> AnalysisInput {
		match self {
			Self::CrossComparison => AnalysisInput::Synthesis,
			Self::Competition => AnalysisInput::ReviewsWithCompetitors,
			_ => AnalysisInput::Reviews,
		}
	}

	/// Minimum sample before dynamic scaling.
	pub fn base_sample_size(self) -> usize {
		match self {
			Self::Description => 50,
			Self::VoiceOfCustomer | Self::Stp | Self::Personas => 150,
			Self::FourAxisMatrix | Self::CustomerJourney => 120,
			Self::Sentiment
			| Self::RatingBreakdown
			| Self::JobsToBeDone
			| Self::Swot
			| Self::Competition
			| Self::CrossComparison
			| Self::StrategicRecommendations => 100,
		}
	}

	/// Types that need a wider spread of voices get a larger sample.
	pub fn is_breadth_sensitive(self) -> bool {
		matches!(self, Self::Personas | Self::Stp)
	}
}
impl fmt::Display for AnalysisType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for AnalysisType {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let trimmed = raw.trim();

		Self::ALL
			.into_iter()
			.find(|analysis_type| analysis_type.as_str().eq_ignore_ascii_case(trimmed))
			.ok_or_else(|| Error::UnknownAnalysisType { value: trimmed.to_string() })
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Precondition {
	None,
	HasCompetitors,
}
impl Precondition {
	pub fn holds(self, competitor_count: usize) -> bool {
		match self {
			Self::None => true,
			Self::HasCompetitors => competitor_count > 0,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnalysisInput {
	Reviews,
	ReviewsWithCompetitors,
	/// Prior analyses of the product and its competitors instead of raw reviews.
	Synthesis,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisFocus {
	#[default]
	Full,
	StrengthsWeaknesses,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SubAnalysis {
	pub analysis_type: AnalysisType,
	pub focus: AnalysisFocus,
}

/// Types that apply to a product with the given number of competitors, in declared order.
pub fn planned_types(competitor_count: usize) -> Vec<AnalysisType> {
	AnalysisType::ALL
		.into_iter()
		.filter(|analysis_type| analysis_type.precondition().holds(competitor_count))
		.collect()
}
