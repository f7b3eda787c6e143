use std::collections::BTreeMap;

//===========================================================================//

/// The source location that a range of program addresses was built from.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AddressInfo {
    /// The first address of the range.
    pub address: u16,
    /// The last address of the range (inclusive).
    pub address_end: u16,
    /// The source file, if known.
    pub source: Option<String>,
    /// The source line.
    pub line: u32,
}

impl AddressInfo {
    /// Returns true if `addr` lies within this range.
    pub fn contains(&self, addr: u16) -> bool {
        addr >= self.address && addr <= self.address_end
    }
}

//===========================================================================//

/// A read-only lookup from program addresses to source lines.
pub trait DebugInfo: Send + Sync {
    /// Returns the source line range that contains `addr`, if any.
    fn address_info(&self, addr: u16) -> Option<AddressInfo>;

    /// Returns true if this table maps any addresses at all.  A debugger
    /// with an empty table falls back to instruction-level stepping.
    fn has_addresses(&self) -> bool;
}

//===========================================================================//

/// A simple in-memory [`DebugInfo`] built from address ranges.
#[derive(Clone, Debug, Default)]
pub struct LineTable {
    ranges: BTreeMap<u16, AddressInfo>,
}

impl LineTable {
    /// Returns an empty table.
    pub fn new() -> LineTable {
        LineTable { ranges: BTreeMap::new() }
    }

    /// Adds a line covering `start..=end`.  Overlapping an existing range
    /// with the same start replaces it.
    pub fn add_line(
        &mut self,
        start: u16,
        end: u16,
        source: Option<&str>,
        line: u32,
    ) {
        let info = AddressInfo {
            address: start,
            address_end: end.max(start),
            source: source.map(str::to_string),
            line,
        };
        self.ranges.insert(start, info);
    }

    /// Returns the number of lines in this table.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns true if this table is empty.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl DebugInfo for LineTable {
    fn address_info(&self, addr: u16) -> Option<AddressInfo> {
        self.ranges
            .range(..=addr)
            .next_back()
            .map(|(_, info)| info)
            .filter(|info| info.contains(addr))
            .cloned()
    }

    fn has_addresses(&self) -> bool {
        !self.ranges.is_empty()
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{DebugInfo, LineTable};

    #[test]
    fn lookup_by_range() {
        let mut table = LineTable::new();
        table.add_line(0xc000, 0xc001, Some("main.s"), 3);
        table.add_line(0xc002, 0xc004, Some("main.s"), 4);
        table.add_line(0xc010, 0xc010, None, 9);
        assert_eq!(table.address_info(0xc001).map(|info| info.line), Some(3));
        assert_eq!(table.address_info(0xc004).map(|info| info.line), Some(4));
        assert!(table.address_info(0xc005).is_none());
        assert!(table.address_info(0xbfff).is_none());
        assert_eq!(table.address_info(0xc010).map(|info| info.line), Some(9));
        assert!(table.has_addresses());
        assert!(!LineTable::new().has_addresses());
    }
}

//===========================================================================//
