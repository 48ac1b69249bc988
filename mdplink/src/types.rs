//! Module and scalar type identifiers of the Modular Device Profile.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Logical module types reported by the device manager.
///
/// The numeric values are the high 16 bits of the module-info word the
/// target publishes during module enumeration. Types this crate does not
/// know are preserved as [`ModuleType::Vendor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleType {
    /// Network interface card configuration.
    Nic,
    /// System time and time zone configuration.
    Time,
    /// User accounts and permissions.
    UserManagement,
    /// Remote access service.
    Ras,
    /// FTP server configuration.
    Ftp,
    /// SMB/CIFS file sharing.
    Smb,
    /// Runtime configuration of the automation system.
    TwinCat,
    /// Persistent data storage.
    Datastore,
    /// Software management and installation.
    Software,
    /// CPU information.
    Cpu,
    /// Memory information.
    Memory,
    /// Firewall configuration.
    Firewall,
    /// File system object management.
    FileSystemObject,
    /// Programmable logic controller.
    Plc,
    /// Display device configuration.
    DisplayDevice,
    /// Enhanced write filter (disk write protection).
    Ewf,
    /// File-based write filter.
    Fbwf,
    /// Silicon drive (SSD) management.
    SiliconDrive,
    /// Operating system information.
    OperatingSystem,
    /// RAID configuration and status.
    Raid,
    /// Fan monitoring and control.
    Fan,
    /// Mainboard information.
    Mainboard,
    /// Disk partitioning and formatting.
    DiskManagement,
    /// Uninterruptible power supply monitoring.
    Ups,
    /// Physical drive information and SMART data.
    PhysicalDrive,
    /// Mass storage device management.
    MassStorage,
    /// Miscellaneous functionality.
    Misc,
    /// A module type not covered by the known table.
    Vendor(u16),
}

impl ModuleType {
    /// Decodes the 16-bit type code reported by the target.
    pub fn from_raw(raw: u16) -> ModuleType {
        match raw {
            0x0002 => ModuleType::Nic,
            0x0003 => ModuleType::Time,
            0x0004 => ModuleType::UserManagement,
            0x0005 => ModuleType::Ras,
            0x0006 => ModuleType::Ftp,
            0x0007 => ModuleType::Smb,
            0x0008 => ModuleType::TwinCat,
            0x0009 => ModuleType::Datastore,
            0x000A => ModuleType::Software,
            0x000B => ModuleType::Cpu,
            0x000C => ModuleType::Memory,
            0x000E => ModuleType::Firewall,
            0x0010 => ModuleType::FileSystemObject,
            0x0012 => ModuleType::Plc,
            0x0013 => ModuleType::DisplayDevice,
            0x0014 => ModuleType::Ewf,
            0x0015 => ModuleType::Fbwf,
            0x0017 => ModuleType::SiliconDrive,
            0x0018 => ModuleType::OperatingSystem,
            0x0019 => ModuleType::Raid,
            0x001B => ModuleType::Fan,
            0x001C => ModuleType::Mainboard,
            0x001D => ModuleType::DiskManagement,
            0x001E => ModuleType::Ups,
            0x001F => ModuleType::PhysicalDrive,
            0x0020 => ModuleType::MassStorage,
            0x0100 => ModuleType::Misc,
            other => ModuleType::Vendor(other),
        }
    }

    /// The 16-bit type code used on the wire.
    pub fn raw(&self) -> u16 {
        match self {
            ModuleType::Nic => 0x0002,
            ModuleType::Time => 0x0003,
            ModuleType::UserManagement => 0x0004,
            ModuleType::Ras => 0x0005,
            ModuleType::Ftp => 0x0006,
            ModuleType::Smb => 0x0007,
            ModuleType::TwinCat => 0x0008,
            ModuleType::Datastore => 0x0009,
            ModuleType::Software => 0x000A,
            ModuleType::Cpu => 0x000B,
            ModuleType::Memory => 0x000C,
            ModuleType::Firewall => 0x000E,
            ModuleType::FileSystemObject => 0x0010,
            ModuleType::Plc => 0x0012,
            ModuleType::DisplayDevice => 0x0013,
            ModuleType::Ewf => 0x0014,
            ModuleType::Fbwf => 0x0015,
            ModuleType::SiliconDrive => 0x0017,
            ModuleType::OperatingSystem => 0x0018,
            ModuleType::Raid => 0x0019,
            ModuleType::Fan => 0x001B,
            ModuleType::Mainboard => 0x001C,
            ModuleType::DiskManagement => 0x001D,
            ModuleType::Ups => 0x001E,
            ModuleType::PhysicalDrive => 0x001F,
            ModuleType::MassStorage => 0x0020,
            ModuleType::Misc => 0x0100,
            ModuleType::Vendor(raw) => *raw,
        }
    }

    fn name(&self) -> Option<&'static str> {
        let name = match self {
            ModuleType::Nic => "nic",
            ModuleType::Time => "time",
            ModuleType::UserManagement => "user-management",
            ModuleType::Ras => "ras",
            ModuleType::Ftp => "ftp",
            ModuleType::Smb => "smb",
            ModuleType::TwinCat => "twincat",
            ModuleType::Datastore => "datastore",
            ModuleType::Software => "software",
            ModuleType::Cpu => "cpu",
            ModuleType::Memory => "memory",
            ModuleType::Firewall => "firewall",
            ModuleType::FileSystemObject => "file-system-object",
            ModuleType::Plc => "plc",
            ModuleType::DisplayDevice => "display-device",
            ModuleType::Ewf => "ewf",
            ModuleType::Fbwf => "fbwf",
            ModuleType::SiliconDrive => "silicon-drive",
            ModuleType::OperatingSystem => "operating-system",
            ModuleType::Raid => "raid",
            ModuleType::Fan => "fan",
            ModuleType::Mainboard => "mainboard",
            ModuleType::DiskManagement => "disk-management",
            ModuleType::Ups => "ups",
            ModuleType::PhysicalDrive => "physical-drive",
            ModuleType::MassStorage => "mass-storage",
            ModuleType::Misc => "misc",
            ModuleType::Vendor(_) => return None,
        };
        Some(name)
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "vendor({:#06x})", self.raw()),
        }
    }
}

impl FromStr for ModuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(hex) = s.strip_prefix("0x") {
            let raw = u16::from_str_radix(hex, 16)
                .map_err(|_| format!("invalid module type code '{s}'"))?;
            return Ok(ModuleType::from_raw(raw));
        }

        // Probe the known table by name.
        for raw in 0x0001..=0x0100u16 {
            let ty = ModuleType::from_raw(raw);
            if ty.name() == Some(s) {
                return Ok(ty);
            }
        }

        Err(format!("unknown module type '{s}'"))
    }
}

/// One entry of the module enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Unique instance id, stable for the lifetime of a connection.
    pub id: u16,
    /// Logical type of the module.
    pub module_type: ModuleType,
}

impl ModuleInfo {
    /// Decodes a 32-bit module-info word: high 16 bits are the type,
    /// low 16 bits the instance id.
    pub fn from_word(word: u32) -> Self {
        ModuleInfo {
            id: (word & 0xFFFF) as u16,
            module_type: ModuleType::from_raw((word >> 16) as u16),
        }
    }
}

/// The closed set of scalar types an MDP parameter can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MdpDataType {
    Bool,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Fixed-length ASCII string, at most [`MAX_STRING_LEN`](crate::value::MAX_STRING_LEN) bytes.
    String,
}

impl MdpDataType {
    /// Encoded size in bytes, or `None` for the variable-length string.
    pub fn byte_len(&self) -> Option<usize> {
        match self {
            MdpDataType::Bool | MdpDataType::U8 => Some(1),
            MdpDataType::I16 | MdpDataType::U16 => Some(2),
            MdpDataType::I32 | MdpDataType::U32 | MdpDataType::F32 => Some(4),
            MdpDataType::I64 | MdpDataType::U64 | MdpDataType::F64 => Some(8),
            MdpDataType::String => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MdpDataType::Bool => "bool",
            MdpDataType::I16 => "i16",
            MdpDataType::I32 => "i32",
            MdpDataType::I64 => "i64",
            MdpDataType::U8 => "u8",
            MdpDataType::U16 => "u16",
            MdpDataType::U32 => "u32",
            MdpDataType::U64 => "u64",
            MdpDataType::F32 => "f32",
            MdpDataType::F64 => "f64",
            MdpDataType::String => "string",
        }
    }
}

impl fmt::Display for MdpDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MdpDataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s {
            "bool" => MdpDataType::Bool,
            "i16" => MdpDataType::I16,
            "i32" => MdpDataType::I32,
            "i64" => MdpDataType::I64,
            "u8" => MdpDataType::U8,
            "u16" => MdpDataType::U16,
            "u32" => MdpDataType::U32,
            "u64" => MdpDataType::U64,
            "f32" => MdpDataType::F32,
            "f64" => MdpDataType::F64,
            "string" => MdpDataType::String,
            other => return Err(format!("unknown data type '{other}'")),
        };
        Ok(ty)
    }
}
