//! Integration tests for the polling and change-notification streams.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use mdplink::{
    DeviceSim, MdpClient, MdpDataType, MdpError, MdpValue, ModuleType, Parameter, TransportError,
};

fn counter_parameter() -> Parameter {
    Parameter::new(ModuleType::Cpu, 1, 2, MdpDataType::I32)
}

fn device_with_script(values: &[i32]) -> DeviceSim {
    let sim = DeviceSim::new();
    sim.add_module(1, ModuleType::Cpu);
    let script: Vec<MdpValue> = values.iter().map(|&v| MdpValue::I32(v)).collect();
    sim.set_parameter_sequence(1, 1, 2, &script);
    sim
}

async fn connected(sim: DeviceSim) -> MdpClient {
    let mut client = MdpClient::new(Box::new(sim));
    client.connect_local().await.unwrap();
    client
}

#[tokio::test(start_paused = true)]
async fn fixed_period_polling_samples_every_tick() {
    let client = connected(device_with_script(&[1, 2, 3])).await;

    let mut poll = client.poll(counter_parameter(), Duration::from_secs(1));
    for expected in [1, 2, 3] {
        let value = poll.next().await.unwrap().unwrap();
        assert_eq!(value, MdpValue::I32(expected));
    }
}

#[tokio::test(start_paused = true)]
async fn first_sample_is_taken_without_initial_delay() {
    let client = connected(device_with_script(&[42])).await;

    let mut poll = client.poll(counter_parameter(), Duration::from_secs(3600));
    let started = tokio::time::Instant::now();
    let value = poll.next().await.unwrap().unwrap();
    assert_eq!(value, MdpValue::I32(42));
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn change_detection_suppresses_consecutive_duplicates() {
    let client = connected(device_with_script(&[5, 5, 7, 7, 7, 9])).await;

    let mut changes = client.observe(counter_parameter(), Duration::from_millis(100));
    let mut emitted = Vec::new();
    for _ in 0..3 {
        emitted.push(changes.next().await.unwrap().unwrap());
    }
    assert_eq!(
        emitted,
        vec![MdpValue::I32(5), MdpValue::I32(7), MdpValue::I32(9)]
    );
}

#[tokio::test(start_paused = true)]
async fn triggered_polling_samples_once_per_event() {
    let client = connected(device_with_script(&[10, 20, 30])).await;

    let (tx, rx) = mpsc::channel(4);
    let mut poll = client.poll_triggered(counter_parameter(), rx);

    tx.send(()).await.unwrap();
    assert_eq!(poll.next().await.unwrap().unwrap(), MdpValue::I32(10));

    tx.send(()).await.unwrap();
    assert_eq!(poll.next().await.unwrap().unwrap(), MdpValue::I32(20));

    // Closing the trigger ends the stream.
    drop(tx);
    assert!(poll.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn cancellation_token_ends_a_timer_stream() {
    let client = connected(device_with_script(&[1])).await;

    let token = CancellationToken::new();
    let mut poll = client
        .poll(counter_parameter(), Duration::from_secs(1))
        .cancelled_by(token.clone());

    assert_eq!(poll.next().await.unwrap().unwrap(), MdpValue::I32(1));

    token.cancel();
    assert!(poll.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn read_failures_are_yielded_and_the_stream_continues() {
    let sim = DeviceSim::new();
    sim.add_module(1, ModuleType::Cpu);
    // No parameter registered at the polled address.
    let client = connected(sim).await;

    let mut poll = client.poll(counter_parameter(), Duration::from_millis(50));
    for _ in 0..2 {
        let err = poll.next().await.unwrap().unwrap_err();
        match err {
            MdpError::Transport(e) => assert_eq!(e.code, TransportError::SYMBOL_NOT_FOUND),
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn streams_on_the_same_client_are_independent() {
    let sim = device_with_script(&[1, 2]);
    sim.set_parameter_read_only(1, 1, 3, &MdpValue::U32(7));
    let client = connected(sim).await;

    let mut counter = client.poll(counter_parameter(), Duration::from_secs(1));
    let other = Parameter::new(ModuleType::Cpu, 1, 3, MdpDataType::U32);
    let mut gauge = client.poll(other, Duration::from_secs(1));

    assert_eq!(counter.next().await.unwrap().unwrap(), MdpValue::I32(1));
    assert_eq!(gauge.next().await.unwrap().unwrap(), MdpValue::U32(7));
    assert_eq!(counter.next().await.unwrap().unwrap(), MdpValue::I32(2));
    assert_eq!(gauge.next().await.unwrap().unwrap(), MdpValue::U32(7));
}
