//! Embedded build artifacts and call types for the ledger contract
//! (`contracts/Ledger.sol`).

use alloy_sol_types::sol;

sol! {
    function lastTransaction() external view returns (address sender, address recipient, uint256 amount, uint256 timestamp);
}

/// Creation bytecode produced by solc, hex without 0x prefix.
pub const LEDGER_BYTECODE_HEX: &str = include_str!("../../contracts/ledger.bin");

pub const LEDGER_ABI_JSON: &str = include_str!("../../contracts/ledger.abi.json");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_artifacts_parse() {
        let abi: serde_json::Value = serde_json::from_str(LEDGER_ABI_JSON).unwrap();
        assert!(abi.as_array().is_some_and(|a| !a.is_empty()));

        let code = hex::decode(LEDGER_BYTECODE_HEX.trim()).unwrap();
        assert!(!code.is_empty());
    }
}
