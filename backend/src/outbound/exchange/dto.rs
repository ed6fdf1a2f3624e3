//! Wire types for the exchange API.

use serde::Deserialize;

use crate::domain::ports::{AssetBalance, ExchangeTransaction, SendReceipt};

/// Envelope around the balance list.
#[derive(Debug, Deserialize)]
pub struct BalanceListDto {
    /// Per-asset balances.
    #[serde(default)]
    pub balance: Vec<AssetBalance>,
}

/// Envelope around the transaction list.
#[derive(Debug, Deserialize)]
pub struct TransactionListDto {
    /// Account transactions, newest first.
    #[serde(default)]
    pub transactions: Vec<ExchangeTransaction>,
}

/// Send acknowledgement with lenient field defaults.
#[derive(Debug, Deserialize)]
pub struct SendReceiptDto {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    withdrawal_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl From<SendReceiptDto> for SendReceipt {
    fn from(dto: SendReceiptDto) -> Self {
        Self {
            id: dto.id.or(dto.withdrawal_id).unwrap_or_default(),
            status: dto.status.unwrap_or_else(|| "PENDING".to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use serde_json::json;

    #[test]
    fn send_receipt_falls_back_to_withdrawal_id_and_pending() {
        let dto: SendReceiptDto =
            serde_json::from_value(json!({ "withdrawal_id": "w-9" })).expect("dto decodes");
        let receipt = SendReceipt::from(dto);
        assert_eq!(receipt.id, "w-9");
        assert_eq!(receipt.status, "PENDING");
    }

    #[test]
    fn balance_list_decodes_the_wire_shape() {
        let dto: BalanceListDto = serde_json::from_value(json!({
            "balance": [
                { "asset": "XBT", "balance": "0.01", "reserved": "0", "unconfirmed": "0" }
            ]
        }))
        .expect("dto decodes");
        assert_eq!(dto.balance.len(), 1);
        assert_eq!(dto.balance[0].asset, "XBT");
    }
}
