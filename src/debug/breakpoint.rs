use super::state::CpuState;
use std::collections::BTreeMap;
use std::collections::btree_map;

//===========================================================================//

/// A breakpoint (or logpoint) on a program address.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Breakpoint {
    /// The address that triggers this breakpoint.
    pub address: u16,
    /// The last address covered by this breakpoint, if it covers a range.
    pub address_end: Option<u16>,
    /// The source file this breakpoint was set in, if any.
    pub source: Option<String>,
    /// The source line this breakpoint was set on, if any.
    pub line: Option<u32>,
    /// If set, this is a logpoint: hitting it emits the formatted message
    /// and execution continues.
    pub log_message: Option<String>,
    /// Disabled breakpoints never trigger.
    pub enabled: bool,
}

impl Breakpoint {
    /// Returns a new enabled breakpoint at the given address.
    pub fn new(address: u16) -> Breakpoint {
        Breakpoint {
            address,
            address_end: None,
            source: None,
            line: None,
            log_message: None,
            enabled: true,
        }
    }

    /// Makes this breakpoint cover `address..=end`.
    pub fn with_range(mut self, end: u16) -> Breakpoint {
        self.address_end = Some(end.max(self.address));
        self
    }

    /// Attaches a source location.
    pub fn with_source(mut self, source: impl Into<String>, line: u32) -> Breakpoint {
        self.source = Some(source.into());
        self.line = Some(line);
        self
    }

    /// Turns this breakpoint into a logpoint.
    pub fn with_log_message(mut self, message: impl Into<String>) -> Breakpoint {
        self.log_message = Some(message.into());
        self
    }

    /// Sets whether this breakpoint is enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Breakpoint {
        self.enabled = enabled;
        self
    }

    /// Returns true if this breakpoint only logs.
    pub fn is_logpoint(&self) -> bool {
        self.log_message.is_some()
    }

    /// Returns the last address covered by this breakpoint.
    pub fn end(&self) -> u16 {
        self.address_end.unwrap_or(self.address)
    }

    /// Returns true if `addr` lies within this breakpoint's range.
    pub fn covers(&self, addr: u16) -> bool {
        addr >= self.address && addr <= self.end()
    }

    /// Expands the logpoint message for the given processor state.  The
    /// placeholders `{a}`, `{x}`, `{y}`, `{sp}`, `{pc}` and `{cycles}` (in
    /// any case) are replaced with hex register values; anything else in
    /// braces is left alone.
    pub fn format_message(&self, state: &CpuState) -> Option<String> {
        let template = self.log_message.as_ref()?;
        let regs = &state.registers;
        let mut output = String::with_capacity(template.len());
        let mut rest = template.as_str();
        while let Some(open) = rest.find('{') {
            output.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                rest = &rest[open..];
                break;
            };
            let name = after[..close].to_ascii_lowercase();
            let value = match name.as_str() {
                "a" => Some(format!("${:02x}", regs.a)),
                "x" => Some(format!("${:02x}", regs.x)),
                "y" => Some(format!("${:02x}", regs.y)),
                "sp" => Some(format!("${:02x}", regs.s)),
                "pc" => Some(format!("${:04x}", regs.pc)),
                "cycles" => Some(state.info.cycles.to_string()),
                _ => None,
            };
            match value {
                Some(value) => output.push_str(&value),
                None => output.push_str(&rest[open..open + close + 2]),
            }
            rest = &after[close + 1..];
        }
        output.push_str(rest);
        Some(output)
    }
}

//===========================================================================//

/// A set of breakpoints, ordered and unique by address.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Breakpoints {
    map: BTreeMap<u16, Breakpoint>,
}

impl Breakpoints {
    /// Returns an empty set.
    pub fn new() -> Breakpoints {
        Breakpoints { map: BTreeMap::new() }
    }

    /// Adds a breakpoint, replacing any existing one at the same address.
    pub fn insert(&mut self, breakpoint: Breakpoint) -> Option<Breakpoint> {
        self.map.insert(breakpoint.address, breakpoint)
    }

    /// Removes the breakpoint at the given address.
    pub fn remove(&mut self, address: u16) -> Option<Breakpoint> {
        self.map.remove(&address)
    }

    /// Removes all breakpoints.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns the number of breakpoints.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if there are no breakpoints.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the breakpoint whose address is exactly `address`.
    pub fn get(&self, address: u16) -> Option<&Breakpoint> {
        self.map.get(&address)
    }

    /// Returns the enabled breakpoint that triggers when the program counter
    /// reaches `pc`.
    pub fn triggered_at(&self, pc: u16) -> Option<&Breakpoint> {
        self.map.get(&pc).filter(|bp| bp.enabled)
    }

    /// Returns the breakpoint with the highest start address whose range
    /// covers `addr`.
    pub fn find_covering(&self, addr: u16) -> Option<&Breakpoint> {
        self.map.range(..=addr).rev().map(|(_, bp)| bp).find(|bp| bp.covers(addr))
    }

    /// Iterates over the breakpoints in address order.
    pub fn iter(&self) -> btree_map::Values<'_, u16, Breakpoint> {
        self.map.values()
    }
}

impl FromIterator<Breakpoint> for Breakpoints {
    fn from_iter<I: IntoIterator<Item = Breakpoint>>(iter: I) -> Breakpoints {
        let mut breakpoints = Breakpoints::new();
        for breakpoint in iter {
            breakpoints.insert(breakpoint);
        }
        breakpoints
    }
}

impl<'a> IntoIterator for &'a Breakpoints {
    type Item = &'a Breakpoint;
    type IntoIter = btree_map::Values<'a, u16, Breakpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//===========================================================================//


//===========================================================================//
