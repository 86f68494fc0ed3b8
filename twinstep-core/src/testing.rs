//! Host-side test doubles

use embedded_hal::delay::DelayNs;

use crate::traits::{CarrierRate, Channel, MotorOutputBackend, Polarity};

/// Everything the backend was asked to do, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    Initialize,
    Carrier(CarrierRate),
    Drive(Channel, Polarity, u8),
    Stop(Channel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusError;

/// Backend that records calls and can be told to fail
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<BackendCall>,
    /// Fail every call once this many calls have succeeded
    pub fail_after: Option<usize>,
}

impl RecordingBackend {
    pub fn failing_after(calls: usize) -> Self {
        Self {
            calls: Vec::new(),
            fail_after: Some(calls),
        }
    }

    fn record(&mut self, call: BackendCall) -> Result<(), BusError> {
        if self.fail_after.is_some_and(|limit| self.calls.len() >= limit) {
            return Err(BusError);
        }
        self.calls.push(call);
        Ok(())
    }

    /// Only the channel drive calls
    pub fn drives(&self) -> Vec<(Channel, Polarity)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                BackendCall::Drive(channel, polarity, _) => Some((channel, polarity)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: BackendCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl MotorOutputBackend for RecordingBackend {
    type Error = BusError;

    fn initialize(&mut self) -> Result<(), Self::Error> {
        self.record(BackendCall::Initialize)
    }

    fn set_carrier_rate(&mut self, rate: CarrierRate) -> Result<(), Self::Error> {
        self.record(BackendCall::Carrier(rate))
    }

    fn drive_channel(
        &mut self,
        channel: Channel,
        polarity: Polarity,
        duty_percent: u8,
    ) -> Result<(), Self::Error> {
        self.record(BackendCall::Drive(channel, polarity, duty_percent))
    }

    fn stop_channel(&mut self, channel: Channel) -> Result<(), Self::Error> {
        self.record(BackendCall::Stop(channel))
    }
}

/// Delay provider that records requested waits instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub waits_us: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_us.push(ns / 1_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.waits_us.push(us);
    }
}
