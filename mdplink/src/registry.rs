//! Module discovery and the type-to-instance-id registry.

use tracing::{debug, info, warn};

use crate::error::{MdpError, Result};
use crate::transport::Transport;
use crate::types::{ModuleInfo, ModuleType};

/// Index group of the device-management subsystem; every operation in
/// this crate addresses it.
pub(crate) const MDP_INDEX_GROUP: u32 = 0xF302;

/// Base offset of the module enumeration in the device area. `base + 0`
/// holds the 16-bit module count, `base + 1 ..= base + count` one 32-bit
/// module-info word per slot.
pub(crate) const MODULE_ENUM_BASE: u32 = 0xF020_0000;

/// The modules the connected target reported, in discovery order.
///
/// Built once per successful connect, cleared on disconnect. Duplicate
/// ids are ignored (first seen wins), and same-type lookups enumerate in
/// insertion order, so instance indices are stable.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    entries: Vec<ModuleInfo>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        ModuleRegistry::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All discovered modules, in discovery order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.entries.iter()
    }

    /// Whether at least one module of the given type is present.
    pub fn contains_type(&self, module_type: ModuleType) -> bool {
        self.entries.iter().any(|m| m.module_type == module_type)
    }

    /// Inserts a discovered module unless its id is already known.
    pub fn insert(&mut self, info: ModuleInfo) {
        if self.entries.iter().any(|m| m.id == info.id) {
            debug!(id = info.id, "duplicate module id ignored");
            return;
        }
        self.entries.push(info);
    }

    /// Resolves a module type and 1-based instance index to the unique
    /// instance id reported by the target.
    pub fn resolve(&self, module_type: ModuleType, instance: u32) -> Result<u16> {
        if !self.contains_type(module_type) {
            return Err(MdpError::ModuleNotPresent(module_type));
        }

        let out_of_range = || MdpError::InstanceOutOfRange {
            module_type,
            instance,
        };
        let nth = instance.checked_sub(1).ok_or_else(out_of_range)? as usize;

        self.entries
            .iter()
            .filter(|m| m.module_type == module_type)
            .nth(nth)
            .map(|m| m.id)
            .ok_or_else(out_of_range)
    }

    /// Runs the discovery protocol against a connected transport.
    ///
    /// A failing count read aborts the scan; a failing slot read is
    /// logged and skipped so one bad probe cannot hide the remaining
    /// modules.
    pub(crate) async fn scan(&mut self, transport: &dyn Transport) -> Result<()> {
        self.clear();

        let mut count_buf = [0u8; 2];
        let n = transport
            .read(MDP_INDEX_GROUP, MODULE_ENUM_BASE, &mut count_buf)
            .await?;
        if n != count_buf.len() {
            return Err(MdpError::ReplyLength {
                expected: count_buf.len(),
                actual: n,
            });
        }
        let count = u16::from_le_bytes(count_buf) as u32;

        for slot in 1..=count {
            let mut word_buf = [0u8; 4];
            match transport
                .read(MDP_INDEX_GROUP, MODULE_ENUM_BASE + slot, &mut word_buf)
                .await
            {
                Ok(4) => {
                    let info = ModuleInfo::from_word(u32::from_le_bytes(word_buf));
                    debug!(slot, id = info.id, module_type = %info.module_type, "module discovered");
                    self.insert(info);
                }
                Ok(n) => {
                    warn!(slot, bytes = n, "module slot reply truncated, skipping");
                }
                Err(e) => {
                    warn!(slot, error = %e, "module slot read failed, skipping");
                }
            }
        }

        info!(declared = count, registered = self.len(), "module scan complete");
        Ok(())
    }
}
