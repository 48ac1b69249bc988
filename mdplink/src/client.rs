//! The MDP client: connection lifecycle, typed parameter access and raw
//! access by structured address.

use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use crate::address::MdpAddress;
use crate::error::{MdpError, Result};
use crate::netid::AmsNetId;
use crate::registry::{MDP_INDEX_GROUP, ModuleRegistry};
use crate::transport::Transport;
use crate::types::{MdpDataType, ModuleInfo, ModuleType};
use crate::value::{MAX_STRING_LEN, MdpValue};

/// Lifecycle state of an [`MdpClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session to a target is open. This is the initial state.
    Disconnected,
    /// A session is open and the module registry has been scanned.
    Connected,
    /// The client has been closed. Terminal.
    Closed,
}

/// Session settings applied to the transport on construction.
#[derive(Debug, Clone, Copy)]
pub struct ClientSettings {
    /// Request timeout for transport operations.
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            timeout: Duration::from_secs(5),
        }
    }
}

/// A client for the Modular Device Profile of a device-management target.
///
/// The client adapts a raw [`Transport`] into structured parameter access:
/// it discovers the modules present on the target at connect time, resolves
/// `(module type, table, sub-index)` tuples into packed index offsets and
/// marshals the closed set of [`MdpValue`] scalar types.
pub struct MdpClient {
    transport: Box<dyn Transport>,
    registry: ModuleRegistry,
    target: Option<AmsNetId>,
    closed: bool,
    state_tx: watch::Sender<ConnectionState>,
}

impl MdpClient {
    /// Creates a client over the given transport with default settings.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self::with_settings(transport, ClientSettings::default())
    }

    /// Creates a client over the given transport.
    pub fn with_settings(transport: Box<dyn Transport>, settings: ClientSettings) -> Self {
        transport.set_timeout(settings.timeout);
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        MdpClient {
            transport,
            registry: ModuleRegistry::new(),
            target: None,
            closed: false,
            state_tx,
        }
    }

    // --- lifecycle -------------------------------------------------------

    /// Connects to the target and scans its modules.
    ///
    /// An already connected client disconnects first, so reconnecting is
    /// idempotent. If the module scan fails after the session opened, the
    /// client stays connected with a possibly incomplete registry and the
    /// scan error is returned.
    pub async fn connect(&mut self, target: AmsNetId) -> Result<()> {
        self.guard_open()?;

        if self.transport.is_connected() {
            self.disconnect_session().await;
        }

        self.target = Some(target);
        self.transport.open(&target).await?;
        self.set_state(ConnectionState::Connected);
        info!(%target, "connected to MDP target");

        self.registry.scan(self.transport.as_ref()).await
    }

    /// Connects to a target given as a net id string.
    pub async fn connect_to(&mut self, target: &str) -> Result<()> {
        let target: AmsNetId = target.parse()?;
        self.connect(target).await
    }

    /// Connects to the local device.
    pub async fn connect_local(&mut self) -> Result<()> {
        self.connect(AmsNetId::LOCAL).await
    }

    /// Clears the module registry and closes the session.
    ///
    /// Returns whether a session had been open.
    pub async fn disconnect(&mut self) -> Result<bool> {
        self.guard_open()?;
        Ok(self.disconnect_session().await)
    }

    /// Closes the client for good. Idempotent; every later operation
    /// fails with [`MdpError::Closed`].
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        if self.transport.is_connected() {
            self.disconnect_session().await;
        }
        self.closed = true;
        self.set_state(ConnectionState::Closed);
    }

    async fn disconnect_session(&mut self) -> bool {
        self.registry.clear();
        let was_connected = self.transport.close().await;
        self.set_state(ConnectionState::Disconnected);
        was_connected
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_connected(&self) -> bool {
        !self.closed && self.transport.is_connected()
    }

    /// Whether the open session targets the local device.
    pub fn is_local(&self) -> bool {
        self.transport.is_local()
    }

    /// The target of the current (or last) connection.
    pub fn target(&self) -> Option<AmsNetId> {
        self.target
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Subscribes to connection state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.transport.set_timeout(timeout);
    }

    // --- module registry --------------------------------------------------

    /// The modules the target reported, in discovery order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.registry.modules()
    }

    pub fn module_count(&self) -> usize {
        self.registry.len()
    }

    /// Resolves a module type and 1-based instance index to its unique id.
    pub fn module_id(&self, module_type: ModuleType, instance: u32) -> Result<u16> {
        self.registry.resolve(module_type, instance)
    }

    // --- typed parameter access --------------------------------------------

    /// Reads a parameter of the first instance of a module type.
    pub async fn read_parameter(
        &self,
        module_type: ModuleType,
        table_id: u8,
        sub_index: u8,
        data_type: MdpDataType,
    ) -> Result<MdpValue> {
        self.read_parameter_at(module_type, table_id, sub_index, data_type, 1)
            .await
    }

    /// Reads a parameter of the `instance`-th module of a type (1-based).
    pub async fn read_parameter_at(
        &self,
        module_type: ModuleType,
        table_id: u8,
        sub_index: u8,
        data_type: MdpDataType,
        instance: u32,
    ) -> Result<MdpValue> {
        self.guard_connected()?;
        let address = self.parameter_address(module_type, table_id, sub_index, instance)?;
        self.read_value(address, data_type).await
    }

    /// Writes a parameter of the first instance of a module type.
    pub async fn write_parameter(
        &self,
        module_type: ModuleType,
        table_id: u8,
        sub_index: u8,
        value: &MdpValue,
    ) -> Result<()> {
        self.write_parameter_at(module_type, table_id, sub_index, value, 1)
            .await
    }

    /// Writes a parameter of the `instance`-th module of a type (1-based).
    pub async fn write_parameter_at(
        &self,
        module_type: ModuleType,
        table_id: u8,
        sub_index: u8,
        value: &MdpValue,
        instance: u32,
    ) -> Result<()> {
        self.guard_connected()?;
        let address = self.parameter_address(module_type, table_id, sub_index, instance)?;
        let data = value.to_wire()?;
        self.transport
            .write(MDP_INDEX_GROUP, address.index_offset(), &data)
            .await?;
        Ok(())
    }

    // --- raw access ---------------------------------------------------------

    /// Reads raw bytes from a structured address. No module or data-type
    /// validation is applied, only the lifecycle guards.
    pub async fn read_raw(&self, address: MdpAddress, buf: &mut [u8]) -> Result<usize> {
        self.guard_connected()?;
        let n = self
            .transport
            .read(MDP_INDEX_GROUP, address.index_offset(), buf)
            .await?;
        Ok(n)
    }

    /// Writes raw bytes to a structured address.
    pub async fn write_raw(&self, address: MdpAddress, data: &[u8]) -> Result<()> {
        self.guard_connected()?;
        self.transport
            .write(MDP_INDEX_GROUP, address.index_offset(), data)
            .await?;
        Ok(())
    }

    // --- internals -----------------------------------------------------------

    fn guard_open(&self) -> Result<()> {
        if self.closed {
            return Err(MdpError::Closed);
        }
        Ok(())
    }

    /// Checks closed first, then connected; a closed client never reports
    /// a connectivity error.
    fn guard_connected(&self) -> Result<()> {
        self.guard_open()?;
        if !self.transport.is_connected() {
            return Err(MdpError::NotConnected);
        }
        Ok(())
    }

    fn parameter_address(
        &self,
        module_type: ModuleType,
        table_id: u8,
        sub_index: u8,
        instance: u32,
    ) -> Result<MdpAddress> {
        let id = self.registry.resolve(module_type, instance)?;
        let module_id = u8::try_from(id).map_err(|_| MdpError::ModuleIdOutOfRange(id))?;
        Ok(MdpAddress::config(module_id, table_id, sub_index))
    }

    async fn read_value(&self, address: MdpAddress, data_type: MdpDataType) -> Result<MdpValue> {
        let offset = address.index_offset();
        match data_type.byte_len() {
            None => {
                let mut buf = [0u8; MAX_STRING_LEN];
                let n = self.transport.read(MDP_INDEX_GROUP, offset, &mut buf).await?;
                MdpValue::from_wire_string(&buf[..n])
            }
            Some(len) => {
                let mut buf = [0u8; 8];
                let n = self
                    .transport
                    .read(MDP_INDEX_GROUP, offset, &mut buf[..len])
                    .await?;
                if n != len {
                    return Err(MdpError::ReplyLength {
                        expected: len,
                        actual: n,
                    });
                }
                MdpValue::from_wire(data_type, &buf[..len])
            }
        }
    }
}
