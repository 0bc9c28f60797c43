use revend_serial::Outbound;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Scanning,
}

/// Snapshot published after every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
    pub state: SessionState,
    pub count: u32,
}

/// The single scan session.
///
/// `latched` is set once the object currently in the chute has been counted
/// and cleared by the next negative classification, so a bottle that stays in
/// view across many object signals is counted once.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    count: u32,
    latched: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Scanning
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn status(&self) -> Status {
        Status {
            state: self.state,
            count: self.count,
        }
    }

    /// Start a fresh scan, discarding any scan in progress.
    pub fn begin(&mut self) {
        *self = Self {
            state: SessionState::Scanning,
            count: 0,
            latched: false,
        };
    }

    /// Close the scan and return its final count, or `None` if no scan was open.
    pub fn end(&mut self) -> Option<u32> {
        if !self.is_active() {
            return None;
        }
        let count = self.count;
        *self = Self::default();
        Some(count)
    }

    /// Apply one classification result and return the acknowledgement to send.
    ///
    /// A positive result while latched changes nothing and sends nothing.
    /// Results outside a scan are dropped.
    pub fn record(&mut self, bottle_present: bool) -> Option<Outbound> {
        if !self.is_active() {
            return None;
        }

        match (bottle_present, self.latched) {
            (true, false) => {
                self.count += 1;
                self.latched = true;
                Some(Outbound::BottleDetected)
            }
            (true, true) => None,
            (false, _) => {
                self.latched = false;
                Some(Outbound::NoBottleDetected)
            }
        }
    }
}
