use super::{DataQualityWarning, Detection, FeatureDetector};
use crate::{
    batch::TransactionBatch,
    config::GeolocationParams,
    geo::haversine_km,
    transaction::columns,
    types::RowIndex,
};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Flags a sender location far from the client's previous one within a
/// short time. A client's first transaction has no predecessor and is
/// never flagged.
pub struct GeolocationDetector {
    params: GeolocationParams,
}

impl GeolocationDetector {
    pub fn new(params: GeolocationParams) -> Self {
        Self { params }
    }
}

impl FeatureDetector for GeolocationDetector {
    fn column(&self) -> &'static str {
        columns::GEOLOCATION_CHANGE
    }

    fn detect(&self, batch: &TransactionBatch) -> Detection {
        let rows = batch.rows();
        let per_client = batch.partitions().map_partitions(|partition| {
            let mut flags: Vec<(RowIndex, bool)> = Vec::with_capacity(partition.rows.len());
            let mut warnings = Vec::new();

            if let Some(&first) = partition.rows.first() {
                flags.push((first, false));
            }

            for pair in partition.rows.windows(2) {
                let (prev, cur) = (&rows[pair[0]], &rows[pair[1]]);

                let Some(here) = cur.sender_location() else {
                    warnings.push(DataQualityWarning {
                        transaction_id: cur.transaction_id.clone(),
                        client_id:      cur.client_id.clone(),
                        column:         columns::GEOLOCATION_CHANGE,
                        message:        "missing or unparseable sender coordinates".into(),
                    });
                    flags.push((pair[1], false));
                    continue;
                };

                let distance_km = prev
                    .sender_location()
                    .map(|there| haversine_km(there, here))
                    .unwrap_or(0.0);
                let hours = (cur.date_time - prev.date_time).num_milliseconds() as f64
                    / MILLIS_PER_HOUR;

                let jumped =
                    distance_km > self.params.distance_km && hours <= self.params.max_hours;
                flags.push((pair[1], jumped));
            }

            (flags, warnings)
        });

        let mut all_flags = Vec::with_capacity(per_client.len());
        let mut warnings = Vec::new();
        for (flags, client_warnings) in per_client {
            all_flags.push(flags);
            warnings.extend(client_warnings);
        }

        for w in &warnings {
            log::warn!(
                "Data quality: transaction {} of client {}: {}",
                w.transaction_id,
                w.client_id,
                w.message
            );
        }

        Detection {
            flags: crate::window::scatter(rows.len(), all_flags),
            warnings,
        }
    }
}
