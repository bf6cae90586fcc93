use async_trait::async_trait;

use super::{ProcessingStage, StageError, StageInput, StageKind, StageOutput};

/// Infers a field/type schema from the documents a parser produced.
///
/// Not implemented.
pub struct SchemaInference;

#[async_trait]
impl ProcessingStage for SchemaInference {
    fn kind(&self) -> StageKind {
        StageKind::SchemaInference
    }

    async fn process(&self, _input: &StageInput) -> Result<StageOutput, StageError> {
        Err(StageError::NotImplemented(StageKind::SchemaInference))
    }
}
