//! Integration tests for the MDP client against the simulated target.

use mdplink::{
    ConnectionState, DeviceSim, MdpAddress, MdpClient, MdpDataType, MdpError, MdpValue, ModuleType,
    TransportError,
};

/// A target resembling a small industrial PC: one CPU module, two NICs
/// and a time module with writable parameters.
fn device() -> DeviceSim {
    let sim = DeviceSim::new();
    sim.add_module(1, ModuleType::Cpu);
    sim.add_module(2, ModuleType::Nic);
    sim.add_module(3, ModuleType::Nic);
    sim.add_module(4, ModuleType::Time);

    // CPU frequency in MHz.
    sim.set_parameter_read_only(1, 1, 1, &MdpValue::U32(2496));
    // NIC names.
    sim.set_parameter_read_only(2, 0, 3, &MdpValue::from("em0"));
    sim.set_parameter_read_only(3, 0, 3, &MdpValue::from("em1"));
    // NIC DHCP flag.
    sim.set_parameter(2, 1, 4, &MdpValue::Bool(true));
    // SNTP server and refresh interval.
    sim.set_parameter(4, 1, 1, &MdpValue::from("111.111.111.111"));
    sim.set_parameter(4, 1, 2, &MdpValue::I32(32));
    sim
}

async fn connected_client() -> MdpClient {
    let mut client = MdpClient::new(Box::new(device()));
    client.connect_local().await.unwrap();
    client
}

#[tokio::test]
async fn connect_discovers_all_modules() {
    let client = connected_client().await;

    assert_eq!(client.module_count(), 4);
    assert!(client.is_connected());
    assert!(client.is_local());
    assert_eq!(client.connection_state(), ConnectionState::Connected);

    let types: Vec<ModuleType> = client.modules().map(|m| m.module_type).collect();
    assert_eq!(
        types,
        vec![
            ModuleType::Cpu,
            ModuleType::Nic,
            ModuleType::Nic,
            ModuleType::Time
        ]
    );
}

#[tokio::test]
async fn module_ids_resolve_by_type_and_instance() {
    let client = connected_client().await;

    assert_eq!(client.module_id(ModuleType::Cpu, 1).unwrap(), 1);
    assert_eq!(client.module_id(ModuleType::Nic, 1).unwrap(), 2);
    assert_eq!(client.module_id(ModuleType::Nic, 2).unwrap(), 3);

    assert!(matches!(
        client.module_id(ModuleType::Nic, 0),
        Err(MdpError::InstanceOutOfRange { instance: 0, .. })
    ));
    assert!(matches!(
        client.module_id(ModuleType::Nic, 3),
        Err(MdpError::InstanceOutOfRange { instance: 3, .. })
    ));
    assert!(matches!(
        client.module_id(ModuleType::Ups, 1),
        Err(MdpError::ModuleNotPresent(ModuleType::Ups))
    ));
}

#[tokio::test]
async fn typed_round_trips_for_bool_int_and_string() {
    let client = connected_client().await;

    client
        .write_parameter(ModuleType::Nic, 1, 4, &MdpValue::Bool(false))
        .await
        .unwrap();
    let dhcp = client
        .read_parameter(ModuleType::Nic, 1, 4, MdpDataType::Bool)
        .await
        .unwrap();
    assert_eq!(dhcp, MdpValue::Bool(false));

    client
        .write_parameter(ModuleType::Time, 1, 2, &MdpValue::I32(-600))
        .await
        .unwrap();
    let refresh = client
        .read_parameter(ModuleType::Time, 1, 2, MdpDataType::I32)
        .await
        .unwrap();
    assert_eq!(refresh, MdpValue::I32(-600));

    client
        .write_parameter(ModuleType::Time, 1, 1, &MdpValue::from("pool.ntp.org"))
        .await
        .unwrap();
    let server = client
        .read_parameter(ModuleType::Time, 1, 1, MdpDataType::String)
        .await
        .unwrap();
    assert_eq!(server, MdpValue::from("pool.ntp.org"));
}

#[tokio::test]
async fn instance_index_picks_the_right_module() {
    let client = connected_client().await;

    let first = client
        .read_parameter_at(ModuleType::Nic, 0, 3, MdpDataType::String, 1)
        .await
        .unwrap();
    let second = client
        .read_parameter_at(ModuleType::Nic, 0, 3, MdpDataType::String, 2)
        .await
        .unwrap();
    assert_eq!(first, MdpValue::from("em0"));
    assert_eq!(second, MdpValue::from("em1"));
}

#[tokio::test]
async fn writes_to_read_only_parameters_surface_the_device_code() {
    let client = connected_client().await;

    let err = client
        .write_parameter(ModuleType::Cpu, 1, 1, &MdpValue::U32(0))
        .await
        .unwrap_err();
    match err {
        MdpError::Transport(e) => assert_eq!(e.code, TransportError::ACCESS_DENIED),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn raw_access_skips_type_and_module_validation() {
    let client = connected_client().await;

    let mut buf = [0u8; 4];
    let n = client
        .read_raw(MdpAddress::config(1, 1, 1), &mut buf)
        .await
        .unwrap();
    assert_eq!(n, 4);
    assert_eq!(u32::from_le_bytes(buf), 2496);

    // An unknown address is a transport failure, not a resolution error.
    let err = client
        .read_raw(MdpAddress::config(99, 7, 7), &mut buf)
        .await
        .unwrap_err();
    match err {
        MdpError::Transport(e) => assert_eq!(e.code, TransportError::SYMBOL_NOT_FOUND),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn operations_before_connect_fail_not_connected() {
    let client = MdpClient::new(Box::new(device()));

    let err = client
        .read_parameter(ModuleType::Cpu, 1, 1, MdpDataType::U32)
        .await
        .unwrap_err();
    assert!(matches!(err, MdpError::NotConnected));

    let err = client
        .write_raw(MdpAddress::config(1, 1, 1), &[0])
        .await
        .unwrap_err();
    assert!(matches!(err, MdpError::NotConnected));

    assert_eq!(client.module_count(), 0);
    assert_eq!(client.modules().count(), 0);
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn closed_takes_precedence_over_not_connected() {
    let mut client = connected_client().await;
    client.close().await;

    assert!(client.is_closed());
    assert!(!client.is_connected());
    assert_eq!(client.connection_state(), ConnectionState::Closed);

    let err = client
        .read_parameter(ModuleType::Cpu, 1, 1, MdpDataType::U32)
        .await
        .unwrap_err();
    assert!(matches!(err, MdpError::Closed));

    let err = client.connect_local().await.unwrap_err();
    assert!(matches!(err, MdpError::Closed));

    let err = client.disconnect().await.unwrap_err();
    assert!(matches!(err, MdpError::Closed));

    // Closing again is a no-op.
    client.close().await;
    assert!(client.is_closed());
}

#[tokio::test]
async fn disconnect_empties_the_registry() {
    let mut client = connected_client().await;
    assert_eq!(client.module_count(), 4);

    assert!(client.disconnect().await.unwrap());
    assert_eq!(client.module_count(), 0);
    assert_eq!(client.modules().count(), 0);
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);

    // A second disconnect reports that no session had been open.
    assert!(!client.disconnect().await.unwrap());
}

#[tokio::test]
async fn reconnect_disconnects_first_and_rescans() {
    let sim = device();
    let mut client = MdpClient::new(Box::new(sim.clone()));
    client.connect_local().await.unwrap();
    assert_eq!(client.module_count(), 4);

    sim.add_module(5, ModuleType::Ups);
    client.connect_local().await.unwrap();
    assert_eq!(client.module_count(), 5);
    assert_eq!(client.module_id(ModuleType::Ups, 1).unwrap(), 5);
}

#[tokio::test]
async fn scan_skips_faulty_slots_and_keeps_the_rest() {
    let sim = device();
    sim.fail_slot(2);

    let mut client = MdpClient::new(Box::new(sim));
    client.connect_local().await.unwrap();

    assert_eq!(client.module_count(), 3);
    assert!(matches!(
        client.module_id(ModuleType::Nic, 2),
        Err(MdpError::InstanceOutOfRange { .. })
    ));
    assert_eq!(client.module_id(ModuleType::Time, 1).unwrap(), 4);
}

#[tokio::test]
async fn failing_count_read_aborts_the_scan_but_not_the_session() {
    let sim = device();
    sim.fail_slot(0);

    let mut client = MdpClient::new(Box::new(sim));
    let err = client.connect_local().await.unwrap_err();
    assert!(matches!(err, MdpError::Transport(_)));

    // The session stays open with an empty registry.
    assert!(client.is_connected());
    assert_eq!(client.module_count(), 0);
}

#[tokio::test]
async fn state_transitions_are_published() {
    let mut client = MdpClient::new(Box::new(device()));
    let rx = client.subscribe_state();
    assert_eq!(*rx.borrow(), ConnectionState::Disconnected);

    client.connect_local().await.unwrap();
    assert_eq!(*rx.borrow(), ConnectionState::Connected);

    client.disconnect().await.unwrap();
    assert_eq!(*rx.borrow(), ConnectionState::Disconnected);

    client.close().await;
    assert_eq!(*rx.borrow(), ConnectionState::Closed);
}

#[tokio::test]
async fn connect_to_parses_the_target_string() {
    let mut client = MdpClient::new(Box::new(device()));

    client.connect_to("10.0.0.42.1.1").await.unwrap();
    assert_eq!(client.target().unwrap().to_string(), "10.0.0.42.1.1");
    assert!(!client.is_local());

    let err = client.connect_to("not-a-net-id").await.unwrap_err();
    assert!(matches!(err, MdpError::InvalidTarget(_)));
}
