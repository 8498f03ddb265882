use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use revu_domain::{AnalysisStatus, AnalysisType, planned_types};

use crate::{Result, RevuService};

#[derive(Clone, Debug, Serialize)]
pub struct TypeStatus {
	pub status: AnalysisStatus,
	pub error: Option<String>,
	#[serde(with = "revu_domain::time_serde::option")]
	pub updated_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalysisStatusSummary {
	pub product_id: Uuid,
	pub is_processing: bool,
	pub completed_types: Vec<AnalysisType>,
	pub failed_types: Vec<AnalysisType>,
	/// Number of types a full run would plan for the product's current competitor count.
	pub total_expected: usize,
	pub per_type: BTreeMap<AnalysisType, TypeStatus>,
	/// Set by the run registry when a tracked run is still in flight.
	pub active_run_id: Option<Uuid>,
}

impl RevuService {
	pub async fn analysis_status(
		&self,
		product_id: Uuid,
		user_id: Uuid,
	) -> Result<AnalysisStatusSummary> {
		let product = self.authorized_product(product_id, user_id).await?;
		let competitors = self.store.list_competitors(product_id).await?;
		let records = self.store.list_analyses(product_id).await?;
		let plan = planned_types(competitors.len());
		let mut per_type = plan
			.iter()
			.map(|analysis_type| {
				(
					*analysis_type,
					TypeStatus { status: AnalysisStatus::Pending, error: None, updated_at: None },
				)
			})
			.collect::<BTreeMap<_, _>>();
		let mut completed_types = Vec::new();
		let mut failed_types = Vec::new();

		// Records for types outside the current plan (competitors removed since) are ignored.
		for record in records.into_iter().filter(|record| plan.contains(&record.analysis_type)) {
			match record.status {
				AnalysisStatus::Completed => completed_types.push(record.analysis_type),
				AnalysisStatus::Failed => failed_types.push(record.analysis_type),
				AnalysisStatus::Pending => {},
			}

			per_type.insert(
				record.analysis_type,
				TypeStatus {
					status: record.status,
					error: record.error,
					updated_at: Some(record.updated_at),
				},
			);
		}

		completed_types.sort();
		failed_types.sort();

		Ok(AnalysisStatusSummary {
			product_id,
			is_processing: product.is_processing,
			completed_types,
			failed_types,
			total_expected: plan.len(),
			per_type,
			active_run_id: None,
		})
	}
}
