//! Postgres implementation of [`AnalysisStore`].

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use revu_domain::{AnalysisRecord, AnalysisStatus, AnalysisType, Competitor, Product};
use revu_storage::{
	db::Db,
	models::{AnalysisRecordRow, CompetitorRow, ProductRow},
	queries,
};

use crate::{AnalysisStore, BoxFuture, Result};

pub struct PgAnalysisStore {
	db: Db,
}
impl PgAnalysisStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl AnalysisStore for PgAnalysisStore {
	fn get_product(&self, product_id: Uuid) -> BoxFuture<'_, Result<Option<Product>>> {
		Box::pin(async move {
			let row = queries::get_product(&self.db.pool, product_id).await?;

			Ok(row.map(product_from_row))
		})
	}

	fn list_competitors(&self, product_id: Uuid) -> BoxFuture<'_, Result<Vec<Competitor>>> {
		Box::pin(async move {
			let rows = queries::list_competitors(&self.db.pool, product_id).await?;

			Ok(rows.into_iter().map(competitor_from_row).collect())
		})
	}

	fn list_analyses(&self, product_id: Uuid) -> BoxFuture<'_, Result<Vec<AnalysisRecord>>> {
		Box::pin(async move {
			let rows = queries::list_analysis_records(&self.db.pool, product_id).await?;

			Ok(rows.into_iter().filter_map(record_from_row).collect())
		})
	}

	fn upsert_analysis<'a>(&'a self, record: &'a AnalysisRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let row = AnalysisRecordRow {
				product_id: record.product_id,
				analysis_type: record.analysis_type.as_str().to_string(),
				status: record.status.as_str().to_string(),
				data: record.data.clone(),
				error: record.error.clone(),
				updated_at: record.updated_at,
			};

			queries::upsert_analysis_record(&self.db.pool, &row).await?;

			Ok(())
		})
	}

	fn try_begin_processing(
		&self,
		product_id: Uuid,
		now: OffsetDateTime,
		lease: Duration,
	) -> BoxFuture<'_, Result<Option<OffsetDateTime>>> {
		Box::pin(async move {
			Ok(queries::try_begin_processing(&self.db.pool, product_id, now, lease).await?)
		})
	}

	fn end_processing(
		&self,
		product_id: Uuid,
		started_at: OffsetDateTime,
	) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			Ok(queries::end_processing(&self.db.pool, product_id, started_at).await?)
		})
	}
}

fn product_from_row(row: ProductRow) -> Product {
	Product {
		product_id: row.product_id,
		brand_id: row.brand_id,
		owner_user_id: row.owner_user_id,
		name: row.name,
		reviews_count: u64::try_from(row.reviews_count).unwrap_or(0),
		is_processing: row.is_processing,
	}
}

fn competitor_from_row(row: CompetitorRow) -> Competitor {
	Competitor {
		competitor_id: row.competitor_id,
		product_id: row.product_id,
		name: row.name,
		reviews_count: u64::try_from(row.reviews_count).unwrap_or(0),
	}
}

fn record_from_row(row: AnalysisRecordRow) -> Option<AnalysisRecord> {
	let analysis_type = match row.analysis_type.parse::<AnalysisType>() {
		Ok(analysis_type) => analysis_type,
		Err(err) => {
			tracing::warn!(product_id = %row.product_id, error = %err, "Ignoring stored analysis record.");

			return None;
		},
	};
	let status = match row.status.parse::<AnalysisStatus>() {
		Ok(status) => status,
		Err(err) => {
			tracing::warn!(product_id = %row.product_id, error = %err, "Ignoring stored analysis record.");

			return None;
		},
	};

	Some(AnalysisRecord {
		product_id: row.product_id,
		analysis_type,
		status,
		data: row.data,
		error: row.error,
		updated_at: row.updated_at,
	})
}
