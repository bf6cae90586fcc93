use async_trait::async_trait;

use super::{ProcessingStage, StageError, StageInput, StageKind, StageOutput};

/// Normalizes parsed documents against an inferred schema.
///
/// Not implemented.
pub struct Transformer;

#[async_trait]
impl ProcessingStage for Transformer {
    fn kind(&self) -> StageKind {
        StageKind::Transformer
    }

    async fn process(&self, _input: &StageInput) -> Result<StageOutput, StageError> {
        Err(StageError::NotImplemented(StageKind::Transformer))
    }
}
