//! Radio network types and the generation text shown on the tile.

use std::{fmt, str::FromStr};

use crate::error::TileError;
use crate::network::types::{CellularDisplayInfo, SignalLevel};

/// Radio access technology of the data connection
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkType {
    Gsm,
    Gprs,
    Edge,
    Cdma,
    OneXRtt,
    Iden,
    Evdo0,
    EvdoA,
    EvdoB,
    Ehrpd,
    Hsupa,
    Hsdpa,
    Hspa,
    Hspap,
    Umts,
    TdScdma,
    Lte,
    Iwlan,
    Nr,
    #[default]
    Unknown,
}

impl FromStr for NetworkType {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', '.', ' '], "_");
        let network_type = match normalized.as_str() {
            "GSM" => NetworkType::Gsm,
            "GPRS" => NetworkType::Gprs,
            "EDGE" => NetworkType::Edge,
            "CDMA" | "IS95A" | "IS95B" => NetworkType::Cdma,
            "1XRTT" | "CDMA_1XRTT" => NetworkType::OneXRtt,
            "IDEN" => NetworkType::Iden,
            "EVDO_0" | "EVDO_REV_0" => NetworkType::Evdo0,
            "EVDO_A" | "EVDO_REV_A" => NetworkType::EvdoA,
            "EVDO_B" | "EVDO_REV_B" => NetworkType::EvdoB,
            "EHRPD" => NetworkType::Ehrpd,
            "HSUPA" => NetworkType::Hsupa,
            "HSDPA" => NetworkType::Hsdpa,
            "HSPA" => NetworkType::Hspa,
            "HSPA+" | "HSPAP" => NetworkType::Hspap,
            "UMTS" => NetworkType::Umts,
            "TD_SCDMA" | "TDSCDMA" => NetworkType::TdScdma,
            "LTE" | "LTE_CA" => NetworkType::Lte,
            "IWLAN" => NetworkType::Iwlan,
            "NR" | "NR_SA" => NetworkType::Nr,
            "UNKNOWN" | "" => NetworkType::Unknown,
            _ => return Err(TileError::UnknownNetworkType(s.to_string())),
        };
        Ok(network_type)
    }
}

/// Carrier-aggregation / 5G marketing override reported alongside the radio type
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideNetworkType {
    #[default]
    None,
    LteCa,
    LteAdvancedPro,
    NrNsa,
    NrAdvanced,
}

impl FromStr for OverrideNetworkType {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" | "" => Ok(OverrideNetworkType::None),
            "LTE_CA" => Ok(OverrideNetworkType::LteCa),
            "LTE_ADV_PRO" | "LTE_ADVANCED_PRO" => Ok(OverrideNetworkType::LteAdvancedPro),
            "NR_NSA" => Ok(OverrideNetworkType::NrNsa),
            // mmWave was folded into NR_ADVANCED on newer releases
            "NR_ADVANCED" | "NR_NSA_MMWAVE" => Ok(OverrideNetworkType::NrAdvanced),
            other => Err(TileError::UnknownNetworkType(other.to_string())),
        }
    }
}

/// Generation label shown next to the carrier name
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioGeneration {
    G2,
    G3,
    G4,
    G4Plus,
    G5,
    G5e,
    G5Plus,
    #[default]
    None,
}

impl RadioGeneration {
    pub fn label(self) -> Option<&'static str> {
        match self {
            RadioGeneration::G2 => Some("2G"),
            RadioGeneration::G3 => Some("3G"),
            RadioGeneration::G4 => Some("4G"),
            RadioGeneration::G4Plus => Some("4G+"),
            RadioGeneration::G5 => Some("5G"),
            RadioGeneration::G5e => Some("5Ge"),
            RadioGeneration::G5Plus => Some("5G+"),
            RadioGeneration::None => None,
        }
    }
}

impl fmt::Display for RadioGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label().unwrap_or("none"))
    }
}

impl From<NetworkType> for RadioGeneration {
    fn from(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Gsm
            | NetworkType::Gprs
            | NetworkType::Edge
            | NetworkType::Cdma
            | NetworkType::OneXRtt
            | NetworkType::Iden => RadioGeneration::G2,
            NetworkType::Evdo0
            | NetworkType::EvdoA
            | NetworkType::EvdoB
            | NetworkType::Ehrpd
            | NetworkType::Hsupa
            | NetworkType::Hsdpa
            | NetworkType::Hspa
            | NetworkType::Hspap
            | NetworkType::Umts
            | NetworkType::TdScdma => RadioGeneration::G3,
            NetworkType::Lte | NetworkType::Iwlan => RadioGeneration::G4,
            NetworkType::Nr => RadioGeneration::G5,
            NetworkType::Unknown => RadioGeneration::None,
        }
    }
}

/// The override wins over the raw radio type when one is reported
pub fn generation_for(network_type: NetworkType, override_type: OverrideNetworkType) -> RadioGeneration {
    match override_type {
        OverrideNetworkType::LteCa => RadioGeneration::G4Plus,
        OverrideNetworkType::LteAdvancedPro => RadioGeneration::G5e,
        OverrideNetworkType::NrNsa => RadioGeneration::G5,
        OverrideNetworkType::NrAdvanced => RadioGeneration::G5Plus,
        OverrideNetworkType::None => RadioGeneration::from(network_type),
    }
}

/// Raw cellular link state as reported by the platform
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CellularLink {
    pub carrier: Option<String>,
    pub network_type: NetworkType,
    pub override_type: OverrideNetworkType,
    pub signal: Option<SignalLevel>,
}

impl CellularLink {
    /// Build what the tile displays. Without the carrier-info permission the
    /// carrier identity is dropped so the label degrades instead of failing.
    pub fn display_info(&self, has_carrier_permission: bool) -> CellularDisplayInfo {
        let carrier = match has_carrier_permission {
            true => self
                .carrier
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            false => None,
        };
        CellularDisplayInfo {
            carrier,
            generation: generation_for(self.network_type, self.override_type),
            signal: self.signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getprop_network_types_parse() {
        assert_eq!("LTE".parse::<NetworkType>().unwrap(), NetworkType::Lte);
        assert_eq!("HSPA+".parse::<NetworkType>().unwrap(), NetworkType::Hspap);
        assert_eq!("EvDo-rev.A".parse::<NetworkType>().unwrap(), NetworkType::EvdoA);
        assert_eq!("nr".parse::<NetworkType>().unwrap(), NetworkType::Nr);
        assert_eq!("".parse::<NetworkType>().unwrap(), NetworkType::Unknown);
        assert!("WIMAX".parse::<NetworkType>().is_err());
    }

    #[test]
    fn generation_follows_radio_type() {
        assert_eq!(RadioGeneration::from(NetworkType::Edge), RadioGeneration::G2);
        assert_eq!(RadioGeneration::from(NetworkType::Umts), RadioGeneration::G3);
        assert_eq!(RadioGeneration::from(NetworkType::Iwlan), RadioGeneration::G4);
        assert_eq!(RadioGeneration::from(NetworkType::Nr), RadioGeneration::G5);
        assert_eq!(RadioGeneration::from(NetworkType::Unknown).label(), None);
    }

    #[test]
    fn override_takes_precedence() {
        let cases = [
            (OverrideNetworkType::LteCa, "4G+"),
            (OverrideNetworkType::LteAdvancedPro, "5Ge"),
            (OverrideNetworkType::NrNsa, "5G"),
            (OverrideNetworkType::NrAdvanced, "5G+"),
            (OverrideNetworkType::None, "4G"),
        ];
        for (override_type, expected) in cases {
            assert_eq!(
                generation_for(NetworkType::Lte, override_type).label(),
                Some(expected)
            );
        }
    }

    #[test]
    fn missing_permission_drops_carrier() {
        let link = CellularLink {
            carrier: Some("Proximus".to_string()),
            network_type: NetworkType::Lte,
            override_type: OverrideNetworkType::None,
            signal: Some(SignalLevel::new(2)),
        };
        assert_eq!(link.display_info(true).carrier.as_deref(), Some("Proximus"));
        let degraded = link.display_info(false);
        assert_eq!(degraded.carrier, None);
        assert_eq!(degraded.generation, RadioGeneration::G4);
        assert_eq!(degraded.signal, Some(SignalLevel::new(2)));
    }
}
