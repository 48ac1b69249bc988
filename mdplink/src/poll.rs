//! Polling and change-notification streams.
//!
//! The transport has no push primitive, so observation is built from
//! recurring reads: a tick source (a timer or an external trigger
//! channel) drives [`MdpClient::read_parameter_at`] samples. The streams
//! are pull-based: each call to [`ParameterPoll::next`] awaits one tick
//! and performs one read, so a slow target never piles up overlapping
//! requests. Dropping a stream, closing its trigger channel or cancelling
//! its token stops future ticks; it does not affect other streams of the
//! same client.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use serde::{Deserialize, Serialize};

use crate::client::MdpClient;
use crate::error::Result;
use crate::types::{MdpDataType, ModuleType};
use crate::value::MdpValue;

/// A fully specified parameter to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub module_type: ModuleType,
    pub table_id: u8,
    pub sub_index: u8,
    pub data_type: MdpDataType,
    /// 1-based instance index of the module type.
    #[serde(default = "default_instance")]
    pub instance: u32,
}

fn default_instance() -> u32 {
    1
}

impl Parameter {
    pub fn new(
        module_type: ModuleType,
        table_id: u8,
        sub_index: u8,
        data_type: MdpDataType,
    ) -> Self {
        Parameter {
            module_type,
            table_id,
            sub_index,
            data_type,
            instance: 1,
        }
    }

    pub fn with_instance(mut self, instance: u32) -> Self {
        self.instance = instance;
        self
    }
}

enum TickSource {
    Interval(Interval),
    Trigger(mpsc::Receiver<()>),
}

/// A stream of parameter samples, one per tick.
///
/// Timer-driven streams emit their first sample immediately, then once
/// per period. Trigger-driven streams emit one sample per trigger event
/// and end when the trigger channel closes.
pub struct ParameterPoll<'a> {
    client: &'a MdpClient,
    parameter: Parameter,
    ticks: TickSource,
    cancel: Option<CancellationToken>,
}

impl<'a> ParameterPoll<'a> {
    fn new(client: &'a MdpClient, parameter: Parameter, ticks: TickSource) -> Self {
        ParameterPoll {
            client,
            parameter,
            ticks,
            cancel: None,
        }
    }

    /// Stops the stream when `token` is cancelled. Cancellation ends the
    /// stream at the next tick boundary; it does not abort a sample that
    /// is already being read.
    pub fn cancelled_by(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Suppresses consecutive duplicate values.
    pub fn distinct(self) -> ChangePoll<'a> {
        ChangePoll {
            inner: self,
            last: None,
        }
    }

    /// Awaits the next tick and samples the parameter.
    ///
    /// Returns `None` once the stream is over (trigger channel closed or
    /// token cancelled). Read failures are yielded as `Some(Err(..))`;
    /// the stream itself keeps running.
    pub async fn next(&mut self) -> Option<Result<MdpValue>> {
        if !self.tick().await {
            return None;
        }

        let p = self.parameter;
        Some(
            self.client
                .read_parameter_at(p.module_type, p.table_id, p.sub_index, p.data_type, p.instance)
                .await,
        )
    }

    async fn tick(&mut self) -> bool {
        let cancel = self.cancel.clone();
        let ticks = &mut self.ticks;
        let fired = async move {
            match ticks {
                TickSource::Interval(interval) => {
                    interval.tick().await;
                    true
                }
                TickSource::Trigger(trigger) => trigger.recv().await.is_some(),
            }
        };

        match cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => false,
                ticked = fired => ticked,
            },
            None => fired.await,
        }
    }
}

/// A [`ParameterPoll`] that only yields values differing from the
/// previously emitted one. The first sampled value is always emitted.
pub struct ChangePoll<'a> {
    inner: ParameterPoll<'a>,
    last: Option<MdpValue>,
}

impl ChangePoll<'_> {
    /// Awaits the next changed value. Errors pass through unfiltered.
    pub async fn next(&mut self) -> Option<Result<MdpValue>> {
        loop {
            match self.inner.next().await? {
                Ok(value) => {
                    if self.last.as_ref() == Some(&value) {
                        continue;
                    }
                    self.last = Some(value.clone());
                    return Some(Ok(value));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl MdpClient {
    /// Samples a parameter every `period`, starting immediately.
    ///
    /// Each stream runs its own independent timer; ticks missed while a
    /// sample is in flight are skipped rather than bursted.
    pub fn poll(&self, parameter: Parameter, period: Duration) -> ParameterPoll<'_> {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ParameterPoll::new(self, parameter, TickSource::Interval(ticks))
    }

    /// Samples a parameter once per event on `trigger`. The stream ends
    /// when the trigger channel closes.
    pub fn poll_triggered(
        &self,
        parameter: Parameter,
        trigger: mpsc::Receiver<()>,
    ) -> ParameterPoll<'_> {
        ParameterPoll::new(self, parameter, TickSource::Trigger(trigger))
    }

    /// Samples a parameter every `period` and emits only on change.
    pub fn observe(&self, parameter: Parameter, period: Duration) -> ChangePoll<'_> {
        self.poll(parameter, period).distinct()
    }
}
