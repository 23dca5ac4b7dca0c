//! Token amounts, denominations and account names.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Integer amount of a token in its smallest unit.
pub type TokenAmount = u128;

const DENOM_MIN_LEN: usize = 3;
const DENOM_MAX_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenomError {
    #[error("denom length {0} outside [3, 128]")]
    Length(usize),
    #[error("denom must start with an ASCII letter: {0:?}")]
    Leading(String),
    #[error("denom contains invalid character {ch:?}: {denom:?}")]
    Character { denom: String, ch: char },
}

/// Token identifier, e.g. `umint` or `ibc/27394FB0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Denom(pub(crate) String);

impl Denom {
    pub fn new(denom: impl Into<String>) -> Result<Self, DenomError> {
        let denom = denom.into();
        validate_denom(&denom)?;
        Ok(Self(denom))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_denom(denom: &str) -> Result<(), DenomError> {
    let len = denom.chars().count();
    if !(DENOM_MIN_LEN..=DENOM_MAX_LEN).contains(&len) {
        return Err(DenomError::Length(len));
    }
    if !denom.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(DenomError::Leading(denom.to_string()));
    }
    if let Some(ch) = denom
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-')))
    {
        return Err(DenomError::Character {
            denom: denom.to_string(),
            ch,
        });
    }
    Ok(())
}

impl TryFrom<String> for Denom {
    type Error = DenomError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Denom> for String {
    fn from(denom: Denom) -> Self {
        denom.0
    }
}

impl FromStr for Denom {
    type Err = DenomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Denom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const ACCOUNT_MAX_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountNameError {
    #[error("account name must not be empty")]
    Empty,
    #[error("account name length {0} exceeds 128 bytes")]
    Length(usize),
    #[error("account name contains control character {ch:?}: {name:?}")]
    Control { name: String, ch: char },
}

/// Name of an account in the ledger. Module accounts use fixed names.
///
/// Names never contain NUL, which separates the account from the denom in
/// balance keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(Cow<'static, str>);

impl AccountName {
    pub fn new(name: impl Into<String>) -> Result<Self, AccountNameError> {
        let name = name.into();
        validate_account_name(&name)?;
        Ok(Self(Cow::Owned(name)))
    }

    /// Fixed module account name. Only for compile-time names made of
    /// printable characters.
    pub const fn module(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_account_name(name: &str) -> Result<(), AccountNameError> {
    if name.is_empty() {
        return Err(AccountNameError::Empty);
    }
    if name.len() > ACCOUNT_MAX_LEN {
        return Err(AccountNameError::Length(name.len()));
    }
    if let Some(ch) = name.chars().find(|c| c.is_control()) {
        return Err(AccountNameError::Control {
            name: name.to_string(),
            ch,
        });
    }
    Ok(())
}

impl TryFrom<String> for AccountName {
    type Error = AccountNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountName> for String {
    fn from(name: AccountName) -> Self {
        name.0.into_owned()
    }
}

impl FromStr for AccountName {
    type Err = AccountNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
