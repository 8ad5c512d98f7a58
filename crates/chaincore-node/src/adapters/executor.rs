use async_trait::async_trait;
use chaincore_core::ports::Executor;
use chaincore_types::{Block, InvokeResult};

/// Stands in for the on-chain application ("score"): echoes each
/// transaction's payload back as its invoke result and accepts every
/// block. A real `Executor` runs channel-specific application logic.
pub struct EchoExecutor;

#[async_trait]
impl Executor for EchoExecutor {
    async fn invoke(&self, block: &Block) -> Vec<InvokeResult> {
        block
            .confirmed_transaction_list
            .iter()
            .map(|tx| InvokeResult::new(tx.tx_hash, true, tx.data.clone()))
            .collect()
    }

    async fn accepts(&self, _block: &Block) -> bool {
        true
    }
}
