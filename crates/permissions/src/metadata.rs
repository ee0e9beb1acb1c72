//! Encryption of action and output metadata with the wallet's own keys.
//!
//! Descriptions and custom instructions are encrypted under a fixed admin
//! protocol before they reach the wallet, and decrypted on the way out.
//! Decryption is advisory: anything that does not decrypt (records written
//! with encryption disabled, corrupted blobs) is returned as stored.

use crate::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use wallet::{
    Counterparty, CreateActionArgs, DecryptArgs, EncryptArgs, InternalizeActionArgs,
    InternalizeProtocol, KeyDerivation, Protocol, SecurityLevel, WalletAction, WalletInterface,
    WalletOutput,
};

/// Protocol name reserved for metadata encryption.
pub const METADATA_PROTOCOL_NAME: &str = "admin metadata encryption";

/// Key id used with [`METADATA_PROTOCOL_NAME`].
pub const METADATA_KEY_ID: &str = "1";

/// The reserved metadata protocol, `[2, "admin metadata encryption"]`.
pub fn metadata_protocol() -> Protocol {
    Protocol::new(SecurityLevel::Counterparty, METADATA_PROTOCOL_NAME)
}

fn metadata_key() -> KeyDerivation {
    KeyDerivation::new(metadata_protocol(), METADATA_KEY_ID).with_counterparty(Counterparty::Myself)
}

/// Encrypts and decrypts metadata strings through a wallet.
pub struct MetadataCipher<'a, W> {
    wallet: &'a W,
    admin_originator: &'a str,
}

impl<'a, W> MetadataCipher<'a, W>
where
    W: WalletInterface<Error = wallet::Error>,
{
    pub fn new(wallet: &'a W, admin_originator: &'a str) -> Self {
        Self {
            wallet,
            admin_originator,
        }
    }

    /// Encrypt a field, returning the base64 ciphertext to store.
    pub async fn encrypt_field(&self, plaintext: &str) -> Result<String> {
        let result = self
            .wallet
            .encrypt(
                EncryptArgs {
                    key: metadata_key(),
                    plaintext: plaintext.as_bytes().to_vec(),
                },
                self.admin_originator,
            )
            .await?;
        Ok(STANDARD.encode(result.ciphertext))
    }

    /// Decrypt a stored field, falling back to the stored value on any failure.
    pub async fn decrypt_field(&self, stored: &str) -> String {
        if stored.is_empty() {
            return String::new();
        }
        let Ok(ciphertext) = STANDARD.decode(stored) else {
            return stored.to_string();
        };
        let args = DecryptArgs {
            key: metadata_key(),
            ciphertext,
        };
        match self.wallet.decrypt(args, self.admin_originator).await {
            Ok(result) => match String::from_utf8(result.plaintext) {
                Ok(plaintext) => plaintext,
                Err(_) => stored.to_string(),
            },
            Err(e) => {
                tracing::debug!(error = %e, "metadata not decryptable; returning stored value");
                stored.to_string()
            }
        }
    }

    /// Encrypt the description of an action and of each of its inputs and outputs.
    pub async fn encrypt_action(&self, args: &mut CreateActionArgs) -> Result<()> {
        args.description = self.encrypt_field(&args.description).await?;
        for input in &mut args.inputs {
            input.input_description = self.encrypt_field(&input.input_description).await?;
        }
        for output in &mut args.outputs {
            output.output_description = self.encrypt_field(&output.output_description).await?;
            if let Some(instructions) = &output.custom_instructions {
                output.custom_instructions = Some(self.encrypt_field(instructions).await?);
            }
        }
        Ok(())
    }

    /// Encrypt an internalization's description and basket instructions.
    pub async fn encrypt_internalization(&self, args: &mut InternalizeActionArgs) -> Result<()> {
        args.description = self.encrypt_field(&args.description).await?;
        for output in &mut args.outputs {
            if let InternalizeProtocol::BasketInsertion {
                insertion_remittance,
            } = &mut output.protocol
            {
                if let Some(instructions) = &insertion_remittance.custom_instructions {
                    insertion_remittance.custom_instructions =
                        Some(self.encrypt_field(instructions).await?);
                }
            }
        }
        Ok(())
    }

    pub async fn decrypt_actions(&self, actions: &mut [WalletAction]) {
        for action in actions {
            action.description = self.decrypt_field(&action.description).await;
            for input in &mut action.inputs {
                input.input_description = self.decrypt_field(&input.input_description).await;
            }
            for output in &mut action.outputs {
                output.output_description = self.decrypt_field(&output.output_description).await;
                if let Some(instructions) = &output.custom_instructions {
                    output.custom_instructions = Some(self.decrypt_field(instructions).await);
                }
            }
        }
    }

    pub async fn decrypt_outputs(&self, outputs: &mut [WalletOutput]) {
        for output in outputs {
            if let Some(instructions) = &output.custom_instructions {
                output.custom_instructions = Some(self.decrypt_field(instructions).await);
            }
        }
    }
}
