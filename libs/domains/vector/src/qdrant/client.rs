use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder,
    DeletePointsBuilder, Distance, FieldType, Filter, PointId, PointStruct, PointsIdsList,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use uuid::Uuid;

use super::QdrantConfig;
use crate::error::{VectorError, VectorResult};
use crate::models::{CollectionConfig, DistanceMetric, SearchQuery, SearchResult, Vector};
use crate::repository::VectorRepository;

/// Qdrant-backed implementation of VectorRepository
pub struct QdrantRepository {
    client: Qdrant,
}

impl QdrantRepository {
    /// Builds the gRPC client. No request is made until the first call.
    pub fn new(config: QdrantConfig) -> VectorResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        let client = builder
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VectorError::Qdrant(format!("Failed to build client: {}", e)))?;

        tracing::info!(url = %config.url, "Qdrant client initialized");
        Ok(Self { client })
    }
}

fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
    match metric {
        DistanceMetric::Cosine => Distance::Cosine,
        DistanceMetric::Euclidean => Distance::Euclid,
        DistanceMetric::DotProduct => Distance::Dot,
    }
}

fn uuid_to_point_id(id: Uuid) -> PointId {
    PointId::from(id.to_string())
}

fn point_id_to_uuid(point_id: &PointId) -> VectorResult<Uuid> {
    match &point_id.point_id_options {
        Some(qdrant::point_id::PointIdOptions::Uuid(uuid_str)) => Uuid::parse_str(uuid_str)
            .map_err(|e| VectorError::Internal(format!("Invalid UUID: {}", e))),
        Some(qdrant::point_id::PointIdOptions::Num(num)) => Ok(Uuid::from_u128(*num as u128)),
        None => Err(VectorError::Internal("Missing point ID".to_string())),
    }
}

fn payload_to_qdrant(payload: HashMap<String, serde_json::Value>) -> HashMap<String, QdrantValue> {
    payload
        .into_iter()
        .filter_map(|(key, val)| json_to_qdrant_value(val).map(|v| (key, v)))
        .collect()
}

fn qdrant_to_payload(payload: HashMap<String, QdrantValue>) -> HashMap<String, serde_json::Value> {
    payload
        .into_iter()
        .filter_map(|(key, val)| qdrant_value_to_json(val).map(|v| (key, v)))
        .collect()
}

fn json_to_qdrant_value(val: serde_json::Value) -> Option<QdrantValue> {
    match val {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(QdrantValue::from(b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(QdrantValue::from(i)),
            None => n.as_f64().map(QdrantValue::from),
        },
        serde_json::Value::String(s) => Some(QdrantValue::from(s)),
        // Nested values are stored as their JSON text
        other => Some(QdrantValue::from(other.to_string())),
    }
}

fn qdrant_value_to_json(val: QdrantValue) -> Option<serde_json::Value> {
    use qdrant::value::Kind;

    match val.kind {
        Some(Kind::NullValue(_)) => Some(serde_json::Value::Null),
        Some(Kind::BoolValue(b)) => Some(serde_json::Value::Bool(b)),
        Some(Kind::IntegerValue(i)) => Some(serde_json::Value::Number(i.into())),
        Some(Kind::DoubleValue(f)) => {
            serde_json::Number::from_f64(f).map(serde_json::Value::Number)
        }
        Some(Kind::StringValue(s)) => Some(serde_json::Value::String(s)),
        _ => None,
    }
}

fn build_filter(must_match: Vec<(String, String)>) -> Option<Filter> {
    if must_match.is_empty() {
        return None;
    }
    Some(Filter::must(
        must_match
            .into_iter()
            .map(|(key, value)| Condition::matches(key, value)),
    ))
}

#[async_trait]
impl VectorRepository for QdrantRepository {
    async fn collection_exists(&self, name: &str) -> VectorResult<bool> {
        Ok(self.client.collection_exists(name).await?)
    }

    async fn create_collection(&self, config: &CollectionConfig) -> VectorResult<()> {
        if config.dimension == 0 {
            return Err(VectorError::Validation(
                "Collection dimension must be positive".to_string(),
            ));
        }

        let builder = CreateCollectionBuilder::new(&config.name).vectors_config(
            VectorParamsBuilder::new(config.dimension as u64, to_qdrant_distance(config.distance)),
        );
        self.client.create_collection(builder).await?;

        for field in &config.keyword_indexes {
            self.client
                .create_field_index(
                    CreateFieldIndexCollectionBuilder::new(
                        &config.name,
                        field.as_str(),
                        FieldType::Keyword,
                    )
                    .wait(true),
                )
                .await?;
        }

        tracing::info!(
            collection = %config.name,
            dimension = config.dimension,
            keyword_indexes = ?config.keyword_indexes,
            "Created vector collection"
        );
        Ok(())
    }

    async fn upsert(&self, collection: &str, vector: Vector, wait: bool) -> VectorResult<Uuid> {
        let id = vector.id;
        let point = PointStruct::new(
            uuid_to_point_id(id),
            vector.values,
            payload_to_qdrant(vector.payload),
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, vec![point]).wait(wait))
            .await?;

        tracing::debug!(collection, point_id = %id, "Upserted vector");
        Ok(id)
    }

    async fn delete(&self, collection: &str, ids: Vec<Uuid>, wait: bool) -> VectorResult<u32> {
        let point_ids: Vec<PointId> = ids.iter().map(|id| uuid_to_point_id(*id)).collect();
        let count = point_ids.len() as u32;

        self.client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(PointsIdsList { ids: point_ids })
                    .wait(wait),
            )
            .await?;

        tracing::debug!(collection, count, "Deleted vectors");
        Ok(count)
    }

    async fn search(
        &self,
        collection: &str,
        query: SearchQuery,
    ) -> VectorResult<Vec<SearchResult>> {
        let mut builder = SearchPointsBuilder::new(collection, query.vector, query.limit)
            .with_payload(true);

        if let Some(filter) = build_filter(query.must_match) {
            builder = builder.filter(filter);
        }

        let results = self.client.search_points(builder).await?;

        results
            .result
            .into_iter()
            .map(|point| {
                let id = point
                    .id
                    .as_ref()
                    .map(point_id_to_uuid)
                    .transpose()?
                    .ok_or_else(|| VectorError::Internal("Missing point ID".to_string()))?;

                Ok(SearchResult {
                    id,
                    score: point.score,
                    payload: qdrant_to_payload(point.payload),
                })
            })
            .collect()
    }

    async fn health_check(&self) -> VectorResult<()> {
        self.client.health_check().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_id_round_trip() {
        let id = Uuid::now_v7();
        assert_eq!(point_id_to_uuid(&uuid_to_point_id(id)).unwrap(), id);
    }

    #[test]
    fn test_missing_point_id_is_an_error() {
        let empty = PointId {
            point_id_options: None,
        };
        assert!(point_id_to_uuid(&empty).is_err());
    }

    #[test]
    fn test_payload_conversion_keeps_scalars_and_drops_nulls() {
        let payload = HashMap::from([
            ("user_id".to_string(), serde_json::json!("user_1")),
            ("pinned".to_string(), serde_json::json!(true)),
            ("rank".to_string(), serde_json::json!(3)),
            ("removed".to_string(), serde_json::Value::Null),
        ]);

        let back = qdrant_to_payload(payload_to_qdrant(payload));
        assert_eq!(back.len(), 3);
        assert_eq!(back["user_id"], serde_json::json!("user_1"));
        assert_eq!(back["pinned"], serde_json::json!(true));
        assert_eq!(back["rank"], serde_json::json!(3));
    }

    #[test]
    fn test_filter_only_built_when_matches_present() {
        assert!(build_filter(Vec::new()).is_none());

        let filter = build_filter(vec![("user_id".to_string(), "user_1".to_string())]).unwrap();
        assert_eq!(filter.must.len(), 1);
    }

    #[tokio::test]
    async fn test_client_builds_without_connecting() {
        let config = QdrantConfig::new("http://localhost:6334").with_api_key("key");
        assert!(QdrantRepository::new(config).is_ok());
    }
}
