//! Structured MDP addresses and their packed index-offset encoding.

use serde::{Deserialize, Serialize};

/// The region of the device manager a table lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum MdpArea {
    /// General device data (serial number, hardware version, ...).
    General = 0x1,
    /// Per-module configuration tables.
    Config = 0x8,
    /// Functional access via the service transfer area.
    Service = 0xB,
    /// Device-level tables, including the module enumeration.
    Device = 0xF,
}

/// A structured address of a single MDP parameter.
///
/// The five fields are packed into one 32-bit index offset on the wire,
/// see [`MdpAddress::index_offset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MdpAddress {
    pub area: MdpArea,
    /// Dynamic module instance id (0x00..=0xFF).
    pub module_id: u8,
    /// Table selector (0x0..=0xF).
    pub table_id: u8,
    /// Reserved, always 0 in the current protocol.
    pub flag: u8,
    /// Field selector within the table.
    pub sub_index: u8,
}

impl MdpAddress {
    /// Address of a parameter in the configuration area of a module.
    pub fn config(module_id: u8, table_id: u8, sub_index: u8) -> Self {
        MdpAddress {
            area: MdpArea::Config,
            module_id,
            table_id,
            flag: 0,
            sub_index,
        }
    }

    /// Packs the address into the 32-bit index offset the target expects.
    ///
    /// ```text
    /// 31     28 27     20 19   16 15      8 7       0
    /// |  area  | moduleId | table |  flags | subIndex|
    /// ```
    ///
    /// The layout is a fixed wire contract with the device-management
    /// subsystem; every read and write in this crate goes through it.
    pub fn index_offset(&self) -> u32 {
        debug_assert!(self.table_id <= 0xF, "table id exceeds its 4-bit field");

        ((self.area as u32) << 28)
            | ((self.module_id as u32) << 20)
            | (((self.table_id & 0xF) as u32) << 16)
            | ((self.flag as u32) << 8)
            | (self.sub_index as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_documented_bit_layout() {
        let address = MdpAddress::config(1, 1, 1);
        assert_eq!(address.index_offset(), 0x8011_0001);
    }

    #[test]
    fn each_field_lands_in_its_bits() {
        let address = MdpAddress {
            area: MdpArea::Device,
            module_id: 0xAB,
            table_id: 0xC,
            flag: 0xDE,
            sub_index: 0xF0,
        };
        assert_eq!(address.index_offset(), 0xFABC_DEF0);
    }

    #[test]
    fn area_codes_match_the_device_manager() {
        assert_eq!(MdpArea::General as u8, 0x1);
        assert_eq!(MdpArea::Config as u8, 0x8);
        assert_eq!(MdpArea::Service as u8, 0xB);
        assert_eq!(MdpArea::Device as u8, 0xF);
    }

    #[test]
    fn zero_fields_pack_to_area_only() {
        let address = MdpAddress::config(0, 0, 0);
        assert_eq!(address.index_offset(), 0x8000_0000);
    }
}
