pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Unauthorized: {message}")]
	Unauthorized { message: String },
	#[error("{message}")]
	EmptySelection { message: String },
	#[error("External service error: {message}")]
	ExternalService { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<revu_storage::Error> for Error {
	fn from(err: revu_storage::Error) -> Self {
		match err {
			revu_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			revu_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}

impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant { message: err.to_string() }
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::ExternalService { message: err.to_string() }
	}
}

impl From<revu_domain::Error> for Error {
	fn from(err: revu_domain::Error) -> Self {
		match err {
			revu_domain::Error::UnknownAnalysisType { .. } | revu_domain::Error::UnknownStatus { .. } =>
				Self::InvalidRequest { message: err.to_string() },
			revu_domain::Error::ServiceReported { message } => Self::ExternalService { message },
			revu_domain::Error::MalformedResult { .. } =>
				Self::ExternalService { message: err.to_string() },
		}
	}
}
