pub mod result;
pub mod scoring;
pub mod sizing;
pub mod time_serde;

mod analysis_type;
mod error;
mod model;

pub use analysis_type::{
	AnalysisFocus, AnalysisInput, AnalysisType, Precondition, SubAnalysis, planned_types,
};
pub use error::{Error, Result};
pub use model::{
	AnalysisRecord, AnalysisStatus, Competitor, Product, RATING_BUCKETS, Review, count_words,
	rating_bucket,
};
