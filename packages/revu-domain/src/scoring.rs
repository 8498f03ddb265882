//! Per-type relevance profiles and the individual scoring factors.
//!
//! Every factor yields a value on a 0-100 scale; [`ScoreBreakdown::combine`] blends them with
//! fixed weights. Nothing here performs I/O, so identical inputs always produce identical scores.

use serde::Serialize;
use time::OffsetDateTime;

use crate::AnalysisType;

pub const SEMANTIC_WEIGHT: f64 = 0.4;
pub const LENGTH_WEIGHT: f64 = 0.2;
pub const RECENCY_WEIGHT: f64 = 0.1;
pub const RATING_WEIGHT: f64 = 0.2;
pub const KEYWORD_WEIGHT: f64 = 0.1;

pub const UNDATED_RECENCY: f64 = 50.0;
const KEYWORD_HIT_POINTS: f64 = 20.0;
const MAX_FACTOR: f64 = 100.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LengthBand {
	pub min_words: u32,
	pub ideal_words: u32,
	pub max_words: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RatingRegime {
	/// Strong opinions carry the signal.
	PreferExtremes,
	/// Every rating band is equally useful.
	Balanced,
	Default,
}

#[derive(Clone, Copy, Debug)]
pub struct ScoringProfile {
	pub relevance_query: &'static str,
	pub length: LengthBand,
	pub rating_regime: RatingRegime,
	pub keywords: &'static [&'static str],
}
impl ScoringProfile {
	pub fn for_type(analysis_type: AnalysisType) -> Self {
		match analysis_type {
			AnalysisType::Description => Self {
				relevance_query: "what the product is, its features, quality, materials, design and how it is used",
				length: band(10, 60, 250),
				rating_regime: RatingRegime::Default,
				keywords: &["quality", "feature", "design", "material", "size", "easy to use"],
			},
			AnalysisType::Sentiment => Self {
				relevance_query: "overall satisfaction, what customers like and dislike, how they feel about the product",
				length: band(5, 50, 200),
				rating_regime: RatingRegime::PreferExtremes,
				keywords: &[
					"love",
					"hate",
					"disappointed",
					"happy",
					"recommend",
					"worst",
					"best",
					"satisfied",
				],
			},
			AnalysisType::VoiceOfCustomer => Self {
				relevance_query: "customer opinions in their own words, complaints, praise and suggestions",
				length: band(5, 40, 150),
				rating_regime: RatingRegime::Default,
				keywords: &["wish", "should", "would be", "needs", "expected", "suggest"],
			},
			AnalysisType::RatingBreakdown => Self {
				relevance_query: "reasons behind the star rating, why customers rated the product high or low",
				length: band(5, 45, 200),
				rating_regime: RatingRegime::Balanced,
				keywords: &["star", "rating", "because", "reason", "overall"],
			},
			AnalysisType::FourAxisMatrix => Self {
				relevance_query: "who uses the product, what they use it for, when and where they use it",
				length: band(10, 70, 250),
				rating_regime: RatingRegime::Balanced,
				keywords: &["use it for", "every day", "at home", "at work", "when i", "gift"],
			},
			AnalysisType::JobsToBeDone => Self {
				relevance_query: "the goal the customer wanted to achieve, the problem solved, the job the product does",
				length: band(15, 80, 300),
				rating_regime: RatingRegime::Default,
				keywords: &["needed", "so that", "in order to", "problem", "helps me", "replaced"],
			},
			AnalysisType::Stp => Self {
				relevance_query: "customer demographics, lifestyle, needs, usage context and what sets the product apart",
				length: band(10, 70, 250),
				rating_regime: RatingRegime::Balanced,
				keywords: &["as a", "for my", "professional", "beginner", "budget", "premium", "family"],
			},
			AnalysisType::Swot => Self {
				relevance_query: "strengths, weaknesses, advantages, defects, problems and opportunities for improvement",
				length: band(15, 100, 300),
				rating_regime: RatingRegime::PreferExtremes,
				keywords: &[
					"strength",
					"weakness",
					"problem",
					"issue",
					"broke",
					"durable",
					"better than",
					"worse than",
					"improve",
				],
			},
			AnalysisType::CustomerJourney => Self {
				relevance_query: "discovering, buying, delivery, unboxing, first use, long-term use, support and repurchase",
				length: band(15, 90, 300),
				rating_regime: RatingRegime::Default,
				keywords: &[
					"ordered",
					"arrived",
					"delivery",
					"packaging",
					"setup",
					"customer service",
					"return",
					"reorder",
				],
			},
			AnalysisType::Personas => Self {
				relevance_query: "who the customer is, their background, motivations, habits and frustrations",
				length: band(15, 90, 300),
				rating_regime: RatingRegime::Balanced,
				keywords: &["i am", "as a mom", "my husband", "my wife", "retired", "student"],
			},
			AnalysisType::Competition => Self {
				relevance_query: "comparisons with other brands and alternatives, switching, price versus value",
				length: band(10, 70, 250),
				rating_regime: RatingRegime::Default,
				keywords: &[
					"compared to",
					"other brand",
					"switched",
					"alternative",
					"cheaper",
					"versus",
				],
			},
			AnalysisType::CrossComparison => Self {
				relevance_query: "overall strengths and weaknesses of the product against competing products",
				length: band(10, 80, 300),
				rating_regime: RatingRegime::Default,
				keywords: &["compared to", "better", "worse", "competitor"],
			},
			AnalysisType::StrategicRecommendations => Self {
				relevance_query: "improvement suggestions, unmet needs, deal breakers and reasons to buy again",
				length: band(15, 90, 300),
				rating_regime: RatingRegime::PreferExtremes,
				keywords: &["improve", "wish", "would buy again", "deal breaker", "missing", "fix"],
			},
		}
	}

	/// Text sent to the embedding provider for this profile.
	pub fn query_text(&self, product_name: Option<&str>) -> String {
		match product_name.map(str::trim).filter(|name| !name.is_empty()) {
			Some(name) => format!("{name}: {}", self.relevance_query),
			None => self.relevance_query.to_string(),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
	pub semantic: f64,
	pub length: f64,
	pub recency: f64,
	pub rating: f64,
	pub keyword: f64,
	pub total: f64,
}
impl ScoreBreakdown {
	pub fn combine(semantic: f64, length: f64, recency: f64, rating: f64, keyword: f64) -> Self {
		let total = semantic * SEMANTIC_WEIGHT
			+ length * LENGTH_WEIGHT
			+ recency * RECENCY_WEIGHT
			+ rating * RATING_WEIGHT
			+ keyword * KEYWORD_WEIGHT;

		Self { semantic, length, recency, rating, keyword, total }
	}
}

/// Cosine similarity mapped onto 0-100. Opposed or unknown vectors score zero.
pub fn semantic_score(similarity: Option<f32>) -> f64 {
	match similarity {
		Some(value) if value.is_finite() => f64::from(value.clamp(0.0, 1.0)) * MAX_FACTOR,
		_ => 0.0,
	}
}

pub fn length_fitness(word_count: u32, length: LengthBand) -> f64 {
	let words = f64::from(word_count);
	let min = f64::from(length.min_words);
	let ideal = f64::from(length.ideal_words);
	let max = f64::from(length.max_words);

	if words < min {
		return 0.0;
	}
	if words <= ideal {
		return 50.0 + 50.0 * (words - min) / (ideal - min).max(1.0);
	}
	if words <= max {
		return MAX_FACTOR - 50.0 * (words - ideal) / (max - ideal).max(1.0);
	}

	50.0 * max / words
}

pub fn recency_score(date: Option<OffsetDateTime>, now: OffsetDateTime) -> f64 {
	let Some(date) = date else { return UNDATED_RECENCY };
	let age_days = (now - date).whole_days();

	match age_days {
		..=180 => 100.0,
		181..=360 => 80.0,
		361..=720 => 60.0,
		721..=1_095 => 40.0,
		_ => 20.0,
	}
}

pub fn rating_relevance(rating: Option<f32>, regime: RatingRegime) -> f64 {
	if regime == RatingRegime::Balanced {
		return 80.0;
	}

	let Some(rating) = rating.filter(|value| value.is_finite()) else { return 0.0 };
	let extreme = rating <= 2.0 || rating >= 4.5;

	match regime {
		RatingRegime::PreferExtremes if extreme => 100.0,
		RatingRegime::PreferExtremes if rating <= 2.5 || rating >= 4.0 => 70.0,
		RatingRegime::PreferExtremes => 40.0,
		RatingRegime::Default if extreme => 90.0,
		RatingRegime::Default | RatingRegime::Balanced => 70.0,
	}
}

pub fn keyword_score(text: &str, keywords: &[&str]) -> f64 {
	let lowered = text.to_lowercase();
	let hits = keywords
		.iter()
		.filter(|keyword| !keyword.is_empty() && lowered.contains(&keyword.to_lowercase()))
		.count();

	(hits as f64 * KEYWORD_HIT_POINTS).min(MAX_FACTOR)
}

const fn band(min_words: u32, ideal_words: u32, max_words: u32) -> LengthBand {
	LengthBand { min_words, ideal_words, max_words }
}
