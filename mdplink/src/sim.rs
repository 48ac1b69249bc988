//! An in-memory device-manager target.
//!
//! `DeviceSim` implements [`Transport`] against a register map held in
//! memory: the module enumeration lives at its protocol offsets, and
//! parameters registered with [`DeviceSim::set_parameter`] are served at
//! their packed config-area index offsets. Reads can be scripted as value
//! sequences and individual enumeration slots can be made to fail, which
//! is what the integration tests (and the diagnostic CLI) run against.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::address::MdpAddress;
use crate::netid::AmsNetId;
use crate::registry::{MDP_INDEX_GROUP, MODULE_ENUM_BASE};
use crate::transport::{Transport, TransportError};
use crate::types::ModuleType;
use crate::value::MdpValue;

struct SimParameter {
    /// Pending reply values; reads consume all but the last.
    values: VecDeque<Vec<u8>>,
    read_only: bool,
}

struct SimState {
    connected: bool,
    local: bool,
    timeout: Duration,
    /// `(id, type)` per enumeration slot, in registration order.
    modules: Vec<(u16, ModuleType)>,
    parameters: HashMap<u32, SimParameter>,
    /// Enumeration slots that answer with a transport error. Slot 0 is
    /// the module-count word itself.
    failing_slots: HashSet<u32>,
}

/// A simulated MDP target. Cloning yields another handle onto the same
/// device, so tests can keep mutating it after the client took ownership
/// of a clone.
#[derive(Clone)]
pub struct DeviceSim {
    state: Arc<Mutex<SimState>>,
}

impl Default for DeviceSim {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSim {
    pub fn new() -> Self {
        DeviceSim {
            state: Arc::new(Mutex::new(SimState {
                connected: false,
                local: false,
                timeout: Duration::from_secs(5),
                modules: Vec::new(),
                parameters: HashMap::new(),
                failing_slots: HashSet::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a module in the next enumeration slot.
    pub fn add_module(&self, id: u16, module_type: ModuleType) {
        self.lock().modules.push((id, module_type));
    }

    /// Registers a writable parameter in the configuration area.
    pub fn set_parameter(&self, module_id: u8, table_id: u8, sub_index: u8, value: &MdpValue) {
        self.register(module_id, table_id, sub_index, value, false);
    }

    /// Registers a read-only parameter; writes to it fail with
    /// [`TransportError::ACCESS_DENIED`].
    pub fn set_parameter_read_only(
        &self,
        module_id: u8,
        table_id: u8,
        sub_index: u8,
        value: &MdpValue,
    ) {
        self.register(module_id, table_id, sub_index, value, true);
    }

    /// Scripts a parameter to reply with `values` in order; the last
    /// value repeats once the script is exhausted.
    pub fn set_parameter_sequence(
        &self,
        module_id: u8,
        table_id: u8,
        sub_index: u8,
        values: &[MdpValue],
    ) {
        let offset = MdpAddress::config(module_id, table_id, sub_index).index_offset();
        let script: VecDeque<Vec<u8>> = values
            .iter()
            .map(|v| v.to_wire().expect("scripted value must be encodable"))
            .collect();
        self.lock().parameters.insert(
            offset,
            SimParameter {
                values: script,
                read_only: true,
            },
        );
    }

    /// Makes one enumeration slot fail. Slot 0 fails the count read and
    /// with it the whole scan.
    pub fn fail_slot(&self, slot: u32) {
        self.lock().failing_slots.insert(slot);
    }

    fn register(
        &self,
        module_id: u8,
        table_id: u8,
        sub_index: u8,
        value: &MdpValue,
        read_only: bool,
    ) {
        let offset = MdpAddress::config(module_id, table_id, sub_index).index_offset();
        let bytes = value.to_wire().expect("registered value must be encodable");
        self.lock().parameters.insert(
            offset,
            SimParameter {
                values: VecDeque::from([bytes]),
                read_only,
            },
        );
    }

    fn reply(buf: &mut [u8], data: &[u8]) -> usize {
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        n
    }
}

#[async_trait]
impl Transport for DeviceSim {
    async fn open(&self, target: &AmsNetId) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.connected = true;
        state.local = target.is_local();
        Ok(())
    }

    async fn close(&self) -> bool {
        let mut state = self.lock();
        std::mem::replace(&mut state.connected, false)
    }

    fn is_connected(&self) -> bool {
        self.lock().connected
    }

    fn is_local(&self) -> bool {
        self.lock().local
    }

    fn timeout(&self) -> Duration {
        self.lock().timeout
    }

    fn set_timeout(&self, timeout: Duration) {
        self.lock().timeout = timeout;
    }

    async fn read(
        &self,
        index_group: u32,
        index_offset: u32,
        buf: &mut [u8],
    ) -> Result<usize, TransportError> {
        let mut state = self.lock();
        if !state.connected {
            return Err(TransportError::new(
                TransportError::TARGET_NOT_FOUND,
                "no session open",
            ));
        }
        if index_group != MDP_INDEX_GROUP {
            return Err(TransportError::new(
                TransportError::SERVICE_NOT_SUPPORTED,
                format!("unsupported index group {index_group:#06x}"),
            ));
        }

        // Module enumeration area.
        if (MODULE_ENUM_BASE..=MODULE_ENUM_BASE + state.modules.len() as u32)
            .contains(&index_offset)
        {
            let slot = index_offset - MODULE_ENUM_BASE;
            if state.failing_slots.contains(&slot) {
                return Err(TransportError::new(
                    TransportError::SERVICE_NOT_SUPPORTED,
                    format!("enumeration slot {slot} is faulty"),
                ));
            }
            if slot == 0 {
                let count = (state.modules.len() as u16).to_le_bytes();
                return Ok(Self::reply(buf, &count));
            }
            let (id, module_type) = state.modules[slot as usize - 1];
            let word = ((module_type.raw() as u32) << 16) | id as u32;
            return Ok(Self::reply(buf, &word.to_le_bytes()));
        }
        let parameter = state.parameters.get_mut(&index_offset).ok_or_else(|| {
            TransportError::new(
                TransportError::SYMBOL_NOT_FOUND,
                format!("no object at offset {index_offset:#010x}"),
            )
        })?;
        let data = if parameter.values.len() > 1 {
            parameter.values.pop_front().unwrap()
        } else {
            parameter.values.front().cloned().unwrap_or_default()
        };
        Ok(Self::reply(buf, &data))
    }

    async fn write(
        &self,
        index_group: u32,
        index_offset: u32,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let mut state = self.lock();
        if !state.connected {
            return Err(TransportError::new(
                TransportError::TARGET_NOT_FOUND,
                "no session open",
            ));
        }
        if index_group != MDP_INDEX_GROUP {
            return Err(TransportError::new(
                TransportError::SERVICE_NOT_SUPPORTED,
                format!("unsupported index group {index_group:#06x}"),
            ));
        }

        let parameter = state.parameters.get_mut(&index_offset).ok_or_else(|| {
            TransportError::new(
                TransportError::SYMBOL_NOT_FOUND,
                format!("no object at offset {index_offset:#010x}"),
            )
        })?;
        if parameter.read_only {
            return Err(TransportError::new(
                TransportError::ACCESS_DENIED,
                format!("offset {index_offset:#010x} is read-only"),
            ));
        }
        parameter.values = VecDeque::from([data.to_vec()]);
        Ok(())
    }
}
