//! Action (transaction) arguments and results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Arguments for creating a new action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionArgs {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_beef: Option<Vec<u8>>,
    #[serde(default)]
    pub inputs: Vec<CreateActionInput>,
    #[serde(default)]
    pub outputs: Vec<CreateActionOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub options: CreateActionOptions,
}

/// An input the caller supplies to a new action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionInput {
    /// `txid.vout` of the output being spent.
    pub outpoint: String,
    pub input_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocking_script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocking_script_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u32>,
    /// Value of the spent output, when the caller knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_satoshis: Option<u64>,
}

/// An output the caller asks the new action to create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionOutput {
    pub locking_script: String,
    pub satoshis: u64,
    pub output_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionOptions {
    /// Sign and broadcast immediately (the wallet default is `true`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_and_process: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_delayed_broadcast: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_send: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub randomize_outputs: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signable_transaction: Option<SignableTransaction>,
}

/// A staged, unsigned transaction awaiting `sign_action` or `abort_action`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignableTransaction {
    pub tx: Vec<u8>,
    pub reference: String,
    /// Network fee the wallet attached to the staged transaction.
    #[serde(default)]
    pub fee: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignActionArgs {
    pub reference: String,
    /// Unlocking scripts keyed by input index.
    #[serde(default)]
    pub spends: BTreeMap<u32, SignActionSpend>,
    #[serde(default)]
    pub options: SignActionOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignActionSpend {
    pub unlocking_script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignActionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_delayed_broadcast: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_send: Option<bool>,
}

impl From<&CreateActionOptions> for SignActionOptions {
    fn from(options: &CreateActionOptions) -> Self {
        Self {
            accept_delayed_broadcast: options.accept_delayed_broadcast,
            no_send: options.no_send,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignActionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortActionArgs {
    pub reference: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortActionResult {
    pub aborted: bool,
}

/// How multiple label or tag filters combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    Any,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActionsArgs {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub label_query_mode: QueryMode,
    #[serde(default)]
    pub include_inputs: bool,
    #[serde(default)]
    pub include_outputs: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    #[default]
    Completed,
    Unprocessed,
    Sending,
    Unproven,
    Unsigned,
    Nosend,
    Nonfinal,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAction {
    pub txid: String,
    /// Net effect of the action on the wallet balance.
    pub satoshis: i64,
    pub status: ActionStatus,
    pub is_outgoing: bool,
    pub description: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub version: u32,
    pub lock_time: u32,
    #[serde(default)]
    pub inputs: Vec<WalletActionInput>,
    #[serde(default)]
    pub outputs: Vec<WalletActionOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletActionInput {
    pub source_outpoint: String,
    pub source_satoshis: u64,
    pub input_description: String,
    pub sequence_number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletActionOutput {
    pub output_index: u32,
    pub satoshis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locking_script: Option<String>,
    pub spendable: bool,
    pub output_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basket: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActionsResult {
    pub total_actions: u32,
    pub actions: Vec<WalletAction>,
}

/// Arguments for accepting an incoming transaction into the wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalizeActionArgs {
    pub tx: Vec<u8>,
    pub outputs: Vec<InternalizeOutput>,
    pub description: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalizeOutput {
    pub output_index: u32,
    #[serde(flatten)]
    pub protocol: InternalizeProtocol,
}

/// How an internalized output is taken into the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "kebab-case")]
pub enum InternalizeProtocol {
    /// A payment to the wallet's own derived key.
    #[serde(rename_all = "camelCase")]
    WalletPayment { payment_remittance: PaymentRemittance },
    /// An output tracked in a named basket.
    #[serde(rename_all = "camelCase")]
    BasketInsertion {
        insertion_remittance: BasketInsertionRemittance,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRemittance {
    pub derivation_prefix: String,
    pub derivation_suffix: String,
    pub sender_identity_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketInsertionRemittance {
    pub basket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalizeActionResult {
    pub accepted: bool,
}
