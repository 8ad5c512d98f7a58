use chaincore_core::ports::Authority;
use chaincore_types::{Block, Transaction};

/// Stands in for cryptographic identity/certificate handling: accepts
/// everything. A real `Authority` verifies transaction and block
/// signatures against channel membership certificates.
pub struct MockAuthority;

impl Authority for MockAuthority {
    fn verify_transaction(&self, _tx: &Transaction) -> bool {
        true
    }

    fn verify_block(&self, _block: &Block) -> bool {
        true
    }
}
