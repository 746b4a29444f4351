#[macro_use]
extern crate anyhow;

#[macro_use]
mod macros;

mod account;
mod account_info;
mod amount;
mod block_hash;
mod blocks;
mod confirmation_height;
mod epoch;
mod key_pair;
mod pending;
mod root;
mod signature;
mod unchecked_info;
mod vote;

pub mod utils;
pub mod work;

pub use account::{Account, PublicKey};
pub use account_info::AccountInfo;
pub use amount::Amount;
pub use block_hash::{BlockHash, BlockHashBuilder};
pub use blocks::*;
pub use confirmation_height::ConfirmationHeightInfo;
pub use epoch::{Epoch, Epochs};
pub use key_pair::{sign_message, validate_message, PrivateKey, RawKey, NOT_AN_ACCOUNT};
pub use pending::{PendingInfo, PendingKey};
pub use root::{Link, QualifiedRoot, Root};
pub use signature::Signature;
pub use unchecked_info::{UncheckedInfo, UncheckedKey};
pub use vote::{Vote, VoteCode, VoteSource};
