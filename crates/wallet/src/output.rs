//! Basket output arguments and results.

use crate::QueryMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOutputsArgs {
    pub basket: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tag_query_mode: QueryMode,
    #[serde(default)]
    pub include_custom_instructions: bool,
    #[serde(default)]
    pub include_tags: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletOutput {
    /// `txid.vout` of this output.
    pub outpoint: String,
    pub satoshis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locking_script: Option<String>,
    pub spendable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOutputsResult {
    pub total_outputs: u32,
    pub outputs: Vec<WalletOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelinquishOutputArgs {
    pub basket: String,
    pub output: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelinquishOutputResult {
    pub relinquished: bool,
}
