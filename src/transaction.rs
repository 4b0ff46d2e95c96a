use serde::Serialize;

pub const CURRENCY: &str = "XCH";

/// Column names of the Koinly custom import layout, in output order.
pub const HEADER: [&str; 9] = [
    "Koinly Date",
    "Amount",
    "Currency",
    "Label",
    "TxHash",
    "Fee",
    "ToAddress",
    "FromAddress",
    "TxType",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Mining,
    #[serde(rename = "Mining (Block Reward)")]
    BlockReward,
    Transfer,
    Unknown,
}

impl Label {
    /// Classify an amount line by the kind word the wallet prints in it.
    /// The first match wins: `received`, then `rewarded`, then `sent`.
    pub fn classify(line: &str) -> Self {
        if line.contains("received") {
            Label::Mining
        } else if line.contains("rewarded") {
            Label::BlockReward
        } else if line.contains("sent") {
            Label::Transfer
        } else {
            Label::Unknown
        }
    }
}

/// One row of the output. Field order matches [`HEADER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub date: String,
    pub amount: String,
    pub currency: &'static str,
    pub label: Label,
    pub tx_id: String,
    pub fee: u8,
    pub to_address: String,
    pub from_address: String,
    pub tx_type: u8,
}

impl TransactionRecord {
    pub fn new(
        date: String,
        amount: String,
        label: Label,
        tx_id: String,
        to_address: String,
        from_address: String,
    ) -> Self {
        TransactionRecord {
            date,
            amount,
            currency: CURRENCY,
            label,
            tx_id,
            fee: 0,
            to_address,
            from_address,
            tx_type: 0,
        }
    }
}
