//! The challenge transaction envelope and its wire codec.
//!
//! This is the ledger's `ENVELOPE_TYPE_TX` envelope: an ed25519 source
//! account, fee, sequence number, optional time bounds, memo, operation
//! list and decorated signatures, carried as base64 over the transport.
//! Encoding is canonical, so `decode(encode(e))` is byte-identical.
//!
//! The codec carries authentication artifacts only. Envelope kinds,
//! operation types and assets outside that shape are rejected at decode
//! time rather than skipped.

use base64::prelude::*;
use sha2::{Digest, Sha256};

use crate::{
    config::Network,
    error::{AuthError, Result},
    xdr::{Reader, Writer},
};

const ENVELOPE_TYPE_TX: u32 = 2;
const KEY_TYPE_ED25519: u32 = 0;

const MEMO_NONE: u32 = 0;
const MEMO_TEXT: u32 = 1;
const MEMO_ID: u32 = 2;
const MEMO_HASH: u32 = 3;
const MEMO_RETURN: u32 = 4;

const OPERATION_PAYMENT: u32 = 1;
const ASSET_NATIVE: u32 = 0;

const MAX_OPERATIONS: usize = 100;
const MAX_SIGNATURES: usize = 20;
const MAX_SIGNATURE_LEN: usize = 64;

/// Memo text is capped by the wire format.
pub const MAX_MEMO_TEXT_LEN: usize = 28;

/// A raw ed25519 account id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    fn write(&self, w: &mut Writer) {
        w.put_u32(KEY_TYPE_ED25519);
        w.put_opaque(&self.0);
    }

    fn read(r: &mut Reader) -> Result<Self> {
        let key_type = r.u32()?;
        if key_type != KEY_TYPE_ED25519 {
            return Err(AuthError::Decode(format!(
                "unsupported account key type {key_type}"
            )));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(r.opaque(32)?);
        Ok(Self(bytes))
    }
}

/// Inclusive validity window in seconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Memo {
    None,
    Text(String),
    Id(u64),
    Hash([u8; 32]),
    Return([u8; 32]),
}

impl Memo {
    /// Build a text memo, enforcing the wire format's 28-byte cap.
    pub fn text(value: &str) -> Result<Self> {
        if value.len() > MAX_MEMO_TEXT_LEN {
            return Err(AuthError::Decode(format!(
                "memo text exceeds {MAX_MEMO_TEXT_LEN} bytes"
            )));
        }
        Ok(Memo::Text(value.to_string()))
    }

    fn write(&self, w: &mut Writer) {
        match self {
            Memo::None => w.put_u32(MEMO_NONE),
            Memo::Text(text) => {
                w.put_u32(MEMO_TEXT);
                w.put_string(text);
            }
            Memo::Id(id) => {
                w.put_u32(MEMO_ID);
                w.put_u64(*id);
            }
            Memo::Hash(hash) => {
                w.put_u32(MEMO_HASH);
                w.put_opaque(hash);
            }
            Memo::Return(hash) => {
                w.put_u32(MEMO_RETURN);
                w.put_opaque(hash);
            }
        }
    }

    fn read(r: &mut Reader) -> Result<Self> {
        let memo_type = r.u32()?;
        match memo_type {
            MEMO_NONE => Ok(Memo::None),
            MEMO_TEXT => Ok(Memo::Text(r.string(MAX_MEMO_TEXT_LEN)?)),
            MEMO_ID => Ok(Memo::Id(r.u64()?)),
            MEMO_HASH | MEMO_RETURN => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(r.opaque(32)?);
                if memo_type == MEMO_HASH {
                    Ok(Memo::Hash(hash))
                } else {
                    Ok(Memo::Return(hash))
                }
            }
            other => Err(AuthError::Decode(format!("unknown memo type {other}"))),
        }
    }
}

/// A native-asset payment, the single operation every challenge carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentOp {
    pub destination: AccountId,
    pub amount: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationBody {
    Payment(PaymentOp),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operation {
    pub source_account: Option<AccountId>,
    pub body: OperationBody,
}

impl Operation {
    fn write(&self, w: &mut Writer) {
        match &self.source_account {
            Some(account) => {
                w.put_u32(1);
                account.write(w);
            }
            None => w.put_u32(0),
        }
        match &self.body {
            OperationBody::Payment(payment) => {
                w.put_u32(OPERATION_PAYMENT);
                payment.destination.write(w);
                w.put_u32(ASSET_NATIVE);
                w.put_i64(payment.amount);
            }
        }
    }

    fn read(r: &mut Reader) -> Result<Self> {
        let source_account = match r.u32()? {
            0 => None,
            1 => Some(AccountId::read(r)?),
            other => {
                return Err(AuthError::Decode(format!(
                    "invalid optional-account flag {other}"
                )))
            }
        };
        let op_type = r.u32()?;
        if op_type != OPERATION_PAYMENT {
            return Err(AuthError::Decode(format!(
                "unsupported operation type {op_type}"
            )));
        }
        let destination = AccountId::read(r)?;
        let asset_type = r.u32()?;
        if asset_type != ASSET_NATIVE {
            return Err(AuthError::Decode(format!(
                "unsupported asset type {asset_type}"
            )));
        }
        let amount = r.i64()?;
        Ok(Self {
            source_account,
            body: OperationBody::Payment(PaymentOp {
                destination,
                amount,
            }),
        })
    }
}

/// A signature paired with the advisory hint of the key that produced it.
///
/// The hint speeds up signer lookup only; verification always checks the
/// claimed public key directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: Vec<u8>,
}

/// The transaction body, everything a signature digest covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub source_account: AccountId,
    pub fee: u32,
    pub seq_num: i64,
    pub time_bounds: Option<TimeBounds>,
    pub memo: Memo,
    pub operations: Vec<Operation>,
}

impl Transaction {
    fn write(&self, w: &mut Writer) {
        self.source_account.write(w);
        w.put_u32(self.fee);
        w.put_i64(self.seq_num);
        match &self.time_bounds {
            Some(bounds) => {
                w.put_u32(1);
                w.put_u64(bounds.min_time);
                w.put_u64(bounds.max_time);
            }
            None => w.put_u32(0),
        }
        self.memo.write(w);
        w.put_u32(self.operations.len() as u32);
        for operation in &self.operations {
            operation.write(w);
        }
        // ext, reserved
        w.put_u32(0);
    }

    fn read(r: &mut Reader) -> Result<Self> {
        let source_account = AccountId::read(r)?;
        let fee = r.u32()?;
        let seq_num = r.i64()?;
        let time_bounds = match r.u32()? {
            0 => None,
            1 => Some(TimeBounds {
                min_time: r.u64()?,
                max_time: r.u64()?,
            }),
            other => {
                return Err(AuthError::Decode(format!(
                    "invalid time-bounds flag {other}"
                )))
            }
        };
        let memo = Memo::read(r)?;
        let count = r.u32()? as usize;
        if count > MAX_OPERATIONS {
            return Err(AuthError::Decode(format!("too many operations: {count}")));
        }
        let mut operations = Vec::with_capacity(count);
        for _ in 0..count {
            operations.push(Operation::read(r)?);
        }
        if r.u32()? != 0 {
            return Err(AuthError::Decode("unknown transaction extension".to_string()));
        }
        Ok(Self {
            source_account,
            fee,
            seq_num,
            time_bounds,
            memo,
            operations,
        })
    }
}

/// A transaction plus its signatures, the artifact that travels between
/// issuer and subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionEnvelope {
    pub tx: Transaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl TransactionEnvelope {
    /// Parse a base64 transport string into an envelope.
    pub fn decode(input: &str) -> Result<Self> {
        let bytes = BASE64_STANDARD
            .decode(input)
            .map_err(|e| AuthError::Decode(format!("invalid base64: {e}")))?;
        let mut r = Reader::new(&bytes);
        let envelope = Self::read(&mut r)?;
        r.finish()?;
        Ok(envelope)
    }

    /// Serialize to the canonical base64 transport string.
    pub fn encode(&self) -> String {
        let mut w = Writer::new();
        self.write(&mut w);
        BASE64_STANDARD.encode(w.into_bytes())
    }

    /// The value that is hashed and signed: the network id, the envelope
    /// type tag, and the exact body bytes. Signatures are excluded.
    pub fn signature_base(&self, network: Option<Network>) -> Result<Vec<u8>> {
        let network = network.ok_or(AuthError::UnconfiguredNetwork)?;
        let mut w = Writer::new();
        w.put_opaque(&network.id());
        w.put_u32(ENVELOPE_TYPE_TX);
        self.tx.write(&mut w);
        Ok(w.into_bytes())
    }

    /// SHA-256 of the signature base; the only thing ever signed or
    /// verified.
    pub fn signature_digest(&self, network: Option<Network>) -> Result<[u8; 32]> {
        Ok(Sha256::digest(self.signature_base(network)?).into())
    }

    /// SHA-256 over the full canonical envelope bytes, signatures
    /// included. Changes if any byte of the artifact changes.
    pub fn content_hash(&self) -> [u8; 32] {
        let mut w = Writer::new();
        self.write(&mut w);
        Sha256::digest(w.into_bytes()).into()
    }

    fn write(&self, w: &mut Writer) {
        w.put_u32(ENVELOPE_TYPE_TX);
        self.tx.write(w);
        w.put_u32(self.signatures.len() as u32);
        for signature in &self.signatures {
            w.put_opaque(&signature.hint);
            w.put_var_opaque(&signature.signature);
        }
    }

    fn read(r: &mut Reader) -> Result<Self> {
        let envelope_type = r.u32()?;
        if envelope_type != ENVELOPE_TYPE_TX {
            return Err(AuthError::Decode(format!(
                "unsupported envelope type {envelope_type}"
            )));
        }
        let tx = Transaction::read(r)?;
        let count = r.u32()? as usize;
        if count > MAX_SIGNATURES {
            return Err(AuthError::Decode(format!("too many signatures: {count}")));
        }
        let mut signatures = Vec::with_capacity(count);
        for _ in 0..count {
            let mut hint = [0u8; 4];
            hint.copy_from_slice(r.opaque(4)?);
            let signature = r.var_opaque(MAX_SIGNATURE_LEN)?.to_vec();
            signatures.push(DecoratedSignature { hint, signature });
        }
        Ok(Self { tx, signatures })
    }
}
