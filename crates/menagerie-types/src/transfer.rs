//! Transfer events at the ingestion boundary.
//!
//! The ingestion collaborator delivers loosely-typed records ([`RawTransfer`])
//! with the amount as a decimal string. [`TransferEvent::from_raw`] turns
//! them into a validated event, clamping anything out of range instead of
//! rejecting it: a missing animal is worse than a mis-sized one.

use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::TransferKind;

/// Largest transfer value the simulation accepts; larger amounts are clamped.
pub const MAX_TRANSFER_VALUE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// A transfer as delivered by the ingestion feed, before validation.
///
/// Every field defaults so that partially-populated payloads still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTransfer {
    /// Ticker symbol, e.g. `"USDC"`.
    pub stablecoin: String,
    /// Human-readable amount as a decimal string, e.g. `"100.50"`.
    pub amount: String,
    /// Sending address.
    pub from: String,
    /// Receiving address.
    pub to: String,
    /// Block the transfer was included in.
    pub block_number: u64,
    /// Transaction hash.
    pub tx_hash: String,
}

/// Something that had to be corrected while validating a [`RawTransfer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferAnomaly {
    /// The amount could not be parsed and was treated as zero.
    UnparseableAmount {
        /// The offending amount string.
        amount: String,
    },
    /// The amount was negative and was clamped to zero.
    NegativeAmount,
    /// The amount exceeded [`MAX_TRANSFER_VALUE`] and was clamped.
    AmountTooLarge,
    /// The symbol was not recognised and was mapped to [`TransferKind::Other`].
    UnknownSymbol {
        /// The offending symbol.
        symbol: String,
    },
}

/// A validated transfer event, ready for the spawn queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TransferEvent {
    /// Currency of the transfer.
    pub kind: TransferKind,
    /// Transfer value, always within `[0, MAX_TRANSFER_VALUE]`.
    #[ts(as = "String")]
    pub value: Decimal,
    /// Sending participant.
    pub participant_a: String,
    /// Receiving participant.
    pub participant_b: String,
    /// Block reference.
    pub block_ref: u64,
    /// Transaction reference.
    pub tx_ref: String,
}

impl TransferEvent {
    /// Build an event directly from a kind and value, clamping the value.
    ///
    /// Participants and references are left empty; useful for synthetic feeds
    /// and tests.
    pub fn new(kind: TransferKind, value: Decimal) -> Self {
        Self {
            kind,
            value: clamp_value(value),
            participant_a: String::new(),
            participant_b: String::new(),
            block_ref: 0,
            tx_ref: String::new(),
        }
    }

    /// Validate a raw transfer, clamping out-of-range values.
    ///
    /// Returns the event together with every anomaly that was corrected so
    /// the caller can log them.
    pub fn from_raw(raw: RawTransfer) -> (Self, Vec<TransferAnomaly>) {
        let mut anomalies = Vec::new();

        let kind = TransferKind::from_symbol(&raw.stablecoin);
        if kind == TransferKind::Other {
            anomalies.push(TransferAnomaly::UnknownSymbol {
                symbol: raw.stablecoin.clone(),
            });
        }

        let trimmed = raw.amount.trim();
        let parsed = Decimal::from_str(trimmed).or_else(|_err| Decimal::from_scientific(trimmed));
        let value = match parsed {
            Ok(value) if value.is_sign_negative() && !value.is_zero() => {
                anomalies.push(TransferAnomaly::NegativeAmount);
                Decimal::ZERO
            }
            Ok(value) if value > MAX_TRANSFER_VALUE => {
                anomalies.push(TransferAnomaly::AmountTooLarge);
                MAX_TRANSFER_VALUE
            }
            Ok(value) => value,
            Err(_err) => {
                anomalies.push(TransferAnomaly::UnparseableAmount {
                    amount: raw.amount.clone(),
                });
                Decimal::ZERO
            }
        };

        let event = Self {
            kind,
            value,
            participant_a: raw.from,
            participant_b: raw.to,
            block_ref: raw.block_number,
            tx_ref: raw.tx_hash,
        };
        (event, anomalies)
    }

    /// The value as a float for size derivation.
    pub fn value_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or(0.0).max(0.0)
    }

    /// Short single-line description with addresses truncated to
    /// `address_length` characters.
    pub fn display_line(&self, address_length: usize) -> String {
        format!(
            "{} {} from {}... to {}... (block: {})",
            self.value.round_dp(2),
            self.kind.symbol(),
            truncate(&self.participant_a, address_length),
            truncate(&self.participant_b, address_length),
            self.block_ref
        )
    }
}

fn clamp_value(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        Decimal::ZERO
    } else if value > MAX_TRANSFER_VALUE {
        MAX_TRANSFER_VALUE
    } else {
        value
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| text.get(..idx).unwrap_or(text))
}
