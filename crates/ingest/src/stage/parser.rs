use async_trait::async_trait;

use super::{ProcessingStage, StageError, StageInput, StageKind, StageOutput};

/// Extracts structured fragments (JSON objects, tables, key/value pairs) from a raw payload.
///
/// Not implemented.
pub struct Parser;

#[async_trait]
impl ProcessingStage for Parser {
    fn kind(&self) -> StageKind {
        StageKind::Parser
    }

    async fn process(&self, _input: &StageInput) -> Result<StageOutput, StageError> {
        Err(StageError::NotImplemented(StageKind::Parser))
    }
}
