use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div, Sub, SubAssign},
};

/// Balance and voting weight, kept in raw units (native endian u128)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount {
    raw: u128,
}

impl Amount {
    pub const MAX: Amount = Amount::raw(u128::MAX);

    pub const fn raw(value: u128) -> Self {
        Self { raw: value }
    }

    /// 10^30 raw, one vanta
    pub const fn vanta(value: u128) -> Self {
        Self {
            raw: value * 10u128.pow(30),
        }
    }

    /// 10^27 raw or 0.001 vanta
    pub const fn millivanta(value: u128) -> Self {
        Self {
            raw: value * 10u128.pow(27),
        }
    }

    pub const fn zero() -> Self {
        Self::raw(0)
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    pub fn number(&self) -> u128 {
        self.raw
    }

    pub fn to_be_bytes(self) -> [u8; 16] {
        self.raw.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 16]) -> Self {
        Self {
            raw: u128::from_be_bytes(bytes),
        }
    }

    pub fn encode_hex(&self) -> String {
        format!("{:032X}", self.raw)
    }

    pub fn decode_hex(s: impl AsRef<str>) -> anyhow::Result<Self> {
        Ok(Self::raw(u128::from_str_radix(s.as_ref(), 16)?))
    }

    pub fn decode_dec(s: impl AsRef<str>) -> anyhow::Result<Self> {
        Ok(Self::raw(s.as_ref().parse::<u128>()?))
    }

    pub fn wrapping_add(&self, other: Amount) -> Amount {
        Self::raw(self.raw.wrapping_add(other.raw))
    }

    pub fn wrapping_sub(&self, other: Amount) -> Amount {
        Self::raw(self.raw.wrapping_sub(other.raw))
    }

    pub fn checked_sub(&self, other: Amount) -> Option<Amount> {
        self.raw.checked_sub(other.raw).map(Self::raw)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Amount::raw(value)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount::raw(self.raw + rhs.raw)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.raw += rhs.raw;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount::raw(self.raw.saturating_sub(rhs.raw))
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.raw = self.raw.saturating_sub(rhs.raw);
    }
}

impl Div<u128> for Amount {
    type Output = Amount;

    fn div(self, rhs: u128) -> Self::Output {
        Amount::raw(self.raw / rhs)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |a, b| a + b)
    }
}

impl std::fmt::Debug for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl serde::Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.raw.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::decode_dec(&s).map_err(serde::de::Error::custom)
    }
}
