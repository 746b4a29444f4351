/// Implements the common surface of a 256 bit identifier: byte conversions,
/// hex encoding, ordering and formatting.
macro_rules! u256_struct {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const fn zero() -> Self {
                Self([0; 32])
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0; 32]
            }

            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                match bytes.try_into() {
                    Ok(value) => Some(Self(value)),
                    Err(_) => None,
                }
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn number(&self) -> primitive_types::U256 {
                primitive_types::U256::from_big_endian(&self.0)
            }

            pub fn inc(&self) -> Option<Self> {
                self.number().checked_add(primitive_types::U256::from(1)).map(|i| {
                    let mut buffer = [0; 32];
                    i.to_big_endian(&mut buffer);
                    Self(buffer)
                })
            }

            pub fn encode_hex(&self) -> String {
                use std::fmt::Write;
                let mut result = String::with_capacity(64);
                for byte in self.0 {
                    write!(&mut result, "{:02X}", byte).unwrap();
                }
                result
            }

            pub fn decode_hex(s: impl AsRef<str>) -> anyhow::Result<Self> {
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(s.as_ref(), &mut bytes)?;
                Ok(Self(bytes))
            }

            pub fn random() -> Self {
                Self(rand::random())
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                let mut bytes = [0; 32];
                bytes[24..].copy_from_slice(&value.to_be_bytes());
                Self(bytes)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.encode_hex())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.encode_hex())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.encode_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::decode_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
