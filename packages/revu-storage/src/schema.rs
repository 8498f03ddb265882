pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_brands.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_brands.sql")),
				"tables/002_products.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_products.sql")),
				"tables/003_competitors.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_competitors.sql")),
				"tables/004_reviews.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_reviews.sql")),
				"tables/005_analysis_records.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_analysis_records.sql")),
				"tables/006_review_indexing_outbox.sql" => out
					.push_str(include_str!("../../../sql/tables/006_review_indexing_outbox.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
