//! Scripted modem and serial-port doubles for the bearer tests.
//!
//! The modem double serializes every command through its real
//! [`atat::AtatCmd::write`] implementation and replays canned response
//! bytes through the command's own `parse`, so tests exercise the actual
//! wire format both ways. Port operations and AT commands share one
//! transcript, which lets tests assert cross-object ordering (deactivation
//! before reopen before flash, and so on).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use atat::AtatCmd;
use embassy_time::Duration;

use crate::cancel::CancelToken;
use crate::config::IpFamily;
use crate::error::Error;
use crate::modem::Modem;
use crate::port::{FlowControl, PortError, PortKind, SerialPort};

pub type Transcript = Rc<RefCell<Vec<String>>>;

#[derive(Debug)]
pub struct PortState {
    pub open_count: usize,
    pub connected: bool,
    pub init_sequence_enabled: bool,
    pub flow_control: Option<FlowControl>,
    pub fail_open: bool,
    pub flash_error: Option<PortError>,
    pub reopen_error: Option<PortError>,
}

impl Default for PortState {
    fn default() -> Self {
        Self {
            open_count: 0,
            connected: false,
            init_sequence_enabled: true,
            flow_control: None,
            fail_open: false,
            flash_error: None,
            reopen_error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakePort {
    kind: PortKind,
    device: &'static str,
    state: Rc<RefCell<PortState>>,
    transcript: Transcript,
}

impl FakePort {
    pub fn new(kind: PortKind, device: &'static str, transcript: Transcript) -> Self {
        Self {
            kind,
            device,
            state: Rc::new(RefCell::new(PortState::default())),
            transcript,
        }
    }

    pub fn open_count(&self) -> usize {
        self.state.borrow().open_count
    }

    pub fn connected(&self) -> bool {
        self.state.borrow().connected
    }

    pub fn flow_control(&self) -> Option<FlowControl> {
        self.state.borrow().flow_control
    }

    pub fn fail_next_open(&self) {
        self.state.borrow_mut().fail_open = true;
    }

    pub fn fail_flash(&self, error: PortError) {
        self.state.borrow_mut().flash_error = Some(error);
    }

    pub fn fail_reopen(&self, error: PortError) {
        self.state.borrow_mut().reopen_error = Some(error);
    }

    fn record(&self, event: &str) {
        self.transcript
            .borrow_mut()
            .push(format!("[{}] {}", self.device, event));
    }
}

impl SerialPort for FakePort {
    fn kind(&self) -> PortKind {
        self.kind
    }

    fn device(&self) -> &str {
        self.device
    }

    fn open(&self) -> Result<(), PortError> {
        let mut state = self.state.borrow_mut();
        if state.fail_open {
            state.fail_open = false;
            return Err(PortError::OpenFailed);
        }
        state.open_count += 1;
        drop(state);
        self.record("open");
        Ok(())
    }

    fn close(&self) {
        let mut state = self.state.borrow_mut();
        assert!(state.open_count > 0, "close without matching open");
        state.open_count -= 1;
        drop(state);
        self.record("close");
    }

    async fn reopen(&self, _delay: Duration) -> Result<(), PortError> {
        self.record("reopen");
        match self.state.borrow().reopen_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn flash(&self, _duration: Duration) -> Result<(), PortError> {
        self.record("flash");
        match self.state.borrow().flash_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn set_flow_control(&self, flow_control: FlowControl) -> Result<(), PortError> {
        self.state.borrow_mut().flow_control = Some(flow_control);
        Ok(())
    }

    fn get_connected(&self) -> bool {
        self.state.borrow().connected
    }

    fn set_connected(&self, connected: bool) {
        self.state.borrow_mut().connected = connected;
    }

    fn set_init_sequence_enabled(&self, enabled: bool) {
        self.state.borrow_mut().init_sequence_enabled = enabled;
    }

    async fn run_init_sequence(&self) -> Result<(), PortError> {
        assert!(
            self.state.borrow().init_sequence_enabled,
            "init sequence replayed while disabled"
        );
        self.record("init-replay");
        Ok(())
    }
}

pub struct Exchange {
    expect: &'static str,
    reply: Result<&'static [u8], Error>,
    cancel_after: bool,
}

pub struct FakeModem {
    pub is_3gpp: bool,
    pub is_cdma: bool,
    pub default_family: IpFamily,
    pub primary: Option<FakePort>,
    pub secondary: Option<FakePort>,
    pub data: Option<FakePort>,
    script: RefCell<VecDeque<Exchange>>,
    pub transcript: Transcript,
}

impl FakeModem {
    pub fn new_3gpp() -> Self {
        Self::new(true, false)
    }

    pub fn new_cdma() -> Self {
        Self::new(false, true)
    }

    pub fn new(is_3gpp: bool, is_cdma: bool) -> Self {
        let transcript: Transcript = Rc::new(RefCell::new(Vec::new()));
        Self {
            is_3gpp,
            is_cdma,
            default_family: IpFamily::V4,
            primary: Some(FakePort::new(PortKind::At, "ttyACM0", transcript.clone())),
            secondary: None,
            data: None,
            script: RefCell::new(VecDeque::new()),
            transcript,
        }
    }

    /// Adds a separate AT data port, so the primary stays in command mode
    /// through dial and disconnect.
    pub fn with_data_port(mut self, device: &'static str) -> Self {
        self.data = Some(FakePort::new(PortKind::At, device, self.transcript.clone()));
        self
    }

    pub fn expect(&self, expect: &'static str, reply: Result<&'static [u8], Error>) {
        self.script.borrow_mut().push_back(Exchange {
            expect,
            reply,
            cancel_after: false,
        });
    }

    /// Like [`FakeModem::expect`], but fires the cancellation token right
    /// after the exchange completes.
    pub fn expect_then_cancel(&self, expect: &'static str, reply: Result<&'static [u8], Error>) {
        self.script.borrow_mut().push_back(Exchange {
            expect,
            reply,
            cancel_after: true,
        });
    }

    /// Every scripted exchange must have been consumed.
    pub fn verify(&self) {
        let remaining: Vec<&'static str> =
            self.script.borrow().iter().map(|e| e.expect).collect();
        assert!(remaining.is_empty(), "unconsumed exchanges: {remaining:?}");
    }

    pub fn transcript_lines(&self) -> Vec<String> {
        self.transcript.borrow().clone()
    }

    /// Transcript entries that are AT commands (port events filtered out).
    pub fn at_lines(&self) -> Vec<String> {
        self.transcript
            .borrow()
            .iter()
            .filter(|line| line.contains(" AT"))
            .cloned()
            .collect()
    }
}

impl Modem for FakeModem {
    type Port = FakePort;

    fn is_3gpp(&self) -> bool {
        self.is_3gpp
    }

    fn is_cdma(&self) -> bool {
        self.is_cdma
    }

    fn port_primary(&self) -> Option<FakePort> {
        self.primary.clone()
    }

    fn port_secondary(&self) -> Option<FakePort> {
        self.secondary.clone()
    }

    fn best_data_port(&self, kind: PortKind) -> Option<FakePort> {
        self.data.clone().filter(|port| port.kind() == kind)
    }

    fn best_command_port(&self) -> Option<FakePort> {
        self.primary.clone()
    }

    fn default_ip_family(&self) -> IpFamily {
        self.default_family
    }

    async fn command<C: AtatCmd>(
        &self,
        port: &FakePort,
        cmd: &C,
        cancel: &CancelToken,
    ) -> Result<C::Response, Error> {
        cancel.check()?;

        let mut buf = [0u8; 256];
        let len = cmd.write(&mut buf);
        let line = core::str::from_utf8(&buf[..len])
            .unwrap()
            .trim_end_matches(['\r', '\n'])
            .to_string();
        let entry = format!("[{}] {}", port.device(), line);
        self.transcript.borrow_mut().push(entry.clone());

        let exchange = self
            .script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected AT command: {entry}"));
        assert_eq!(entry, exchange.expect, "AT command mismatch");

        if exchange.cancel_after {
            cancel.cancel();
        }

        match exchange.reply {
            Ok(bytes) => cmd.parse(Ok(bytes)).map_err(Error::from),
            Err(e) => Err(e),
        }
    }
}
