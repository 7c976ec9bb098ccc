use std::fmt;
use std::str::FromStr;

/// An inclusive range of TCP ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    pub start_port: u16,
    pub end_port: u16,
}

impl PortRange {
    pub fn new(start_port: u16, end_port: u16) -> Self {
        Self {
            start_port,
            end_port,
        }
    }

    /// Ports in strictly ascending order.
    pub fn to_iter(&self) -> impl Iterator<Item = u16> + use<> {
        self.start_port..=self.end_port
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        usize::from(self.end_port - self.start_port) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.start_port > self.end_port
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.start_port..=self.end_port).contains(&port)
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::new(1, 10_000)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_port, self.end_port)
    }
}

impl FromStr for PortRange {
    type Err = String;

    /// Parses a port range.
    ///
    /// Supported formats:
    /// * **Single**: "22".
    /// * **Range**: "Start-End" (e.g., "1-10000").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some((start, end)) = s.split_once('-') {
            let start: u16 = parse_port(start)?;
            let end: u16 = parse_port(end)?;
            if start > end {
                return Err(format!("invalid port range: {s} (start is after end)"));
            }
            return Ok(Self::new(start, end));
        }

        let port: u16 = parse_port(s)?;
        Ok(Self::new(port, port))
    }
}

fn parse_port(s: &str) -> Result<u16, String> {
    s.trim()
        .parse::<u16>()
        .map_err(|_| format!("invalid port: {s}"))
}
