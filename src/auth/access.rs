use std::{fmt, str::FromStr};

use num_enum::TryFromPrimitive;

/// Тип доступа, запрашиваемый клиентом брокера.
///
/// Значения совпадают с числовыми кодами, которые брокер передаёт в
/// ACL-проверку.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum Access {
    None = 0x00,
    Read = 0x01,
    Write = 0x02,
    Subscribe = 0x04,
}

impl Access {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Входит ли этот тип доступа в маску `mask` (например, `3` = read+write).
    pub fn is_in(
        self,
        mask: u8,
    ) -> bool {
        self != Access::None && mask & self.bits() != 0
    }
}

impl fmt::Display for Access {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Access::None => "none",
            Access::Read => "read",
            Access::Write => "write",
            Access::Subscribe => "subscribe",
        };
        f.write_str(s)
    }
}

impl FromStr for Access {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Access::None),
            "read" | "r" => Ok(Access::Read),
            "write" | "w" => Ok(Access::Write),
            "subscribe" | "sub" | "s" => Ok(Access::Subscribe),
            other => other
                .parse::<u8>()
                .ok()
                .and_then(|n| Access::try_from(n).ok())
                .ok_or_else(|| format!("unknown access type `{s}`")),
        }
    }
}
