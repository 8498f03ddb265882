use crate::AnalysisType;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Unknown analysis type: {value}.")]
	UnknownAnalysisType { value: String },
	#[error("Unknown analysis status: {value}.")]
	UnknownStatus { value: String },
	/// The analysis service answered with an explicit `error` field.
	#[error("{message}")]
	ServiceReported { message: String },
	#[error("Malformed {analysis_type} result: {message}.")]
	MalformedResult { analysis_type: AnalysisType, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
